//! Displays wallets and their balances.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    endpoints::{self, format_endpoint},
    html::{
        BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, delete_button, format_currency, format_money,
    },
    navigation::NavBar,
    wallet::{Wallet, get_all_wallets, get_total_balance},
};

/// The state needed for the wallets page.
#[derive(Debug, Clone)]
pub struct WalletsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for WalletsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Renders the wallets page showing all wallets and their combined balance.
pub async fn get_wallets_page(State(state): State<WalletsPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let wallets = get_all_wallets(&connection)
        .inspect_err(|error| tracing::error!("could not get all wallets: {error}"))?;
    let total_balance = get_total_balance(&connection)
        .inspect_err(|error| tracing::error!("could not get total balance: {error}"))?;

    Ok(wallets_view(&wallets, total_balance).into_response())
}

fn wallets_view(wallets: &[Wallet], total_balance: f64) -> Markup {
    let new_wallet_url = endpoints::NEW_WALLET_VIEW;
    let nav_bar = NavBar::new(endpoints::WALLETS_VIEW).into_html();

    let table_row = |wallet: &Wallet| {
        let delete_url = format_endpoint(endpoints::DELETE_WALLET, wallet.id);
        let confirm_message = format!(
            "Are you sure you want to delete the wallet '{}'? \
            Its transactions and budgets will be deleted too. This cannot be undone.",
            wallet.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (wallet.name)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class=(BADGE_STYLE) { (wallet.kind.label()) }
                }

                td class="px-6 py-4 text-right tabular-nums"
                {
                    (format_money(wallet.balance, wallet.currency.as_ref()))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (wallet.description.as_deref().unwrap_or("-"))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (delete_button(&delete_url, &confirm_message, "closest tr", "delete"))
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { "Wallets" }
                        p class="text-sm text-gray-600 dark:text-gray-400"
                        {
                            "Total balance: "
                            span data-total-balance="true" { (format_currency(total_balance)) }
                        }
                    }

                    a href=(new_wallet_url) class=(LINK_STYLE) { "Add Wallet" }
                }

                section class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class="px-6 py-3 text-right" { "Balance" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for wallet in wallets {
                                (table_row(wallet))
                            }

                            @if wallets.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No wallets found. Create a wallet "
                                        a href=(new_wallet_url) class=(LINK_STYLE) { "here" }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Wallets", &[], &content)
}
