//! Wallets hold money in a single currency and track a running balance.

mod core;
mod create;
mod delete;
mod list;

pub use core::{
    Currency, NewWallet, Wallet, WalletKind, WalletName, adjust_wallet_balance,
    create_wallet, create_wallet_table, delete_wallet, get_all_wallets, get_total_balance,
    get_wallet,
};
pub use create::{create_wallet_endpoint, get_new_wallet_page};
pub use delete::delete_wallet_endpoint;
pub use list::get_wallets_page;
