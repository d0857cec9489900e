//! Income and expense transactions.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions that keep wallet balances in step with transactions
//! - Filtering by wallet, category and period
//! - View handlers for the transaction pages

mod core;
mod create;
mod delete;
mod edit;
mod filter;
mod form;
mod list;

pub use core::{
    Transaction, TransactionBuilder, TransactionType, create_transaction,
    create_transaction_table, delete_transaction, get_all_transactions, get_transaction,
    get_transactions_in_date_range, update_transaction,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use list::get_transactions_page;

#[cfg(test)]
pub use core::count_transactions;
