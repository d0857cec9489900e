//! The transactions page with filters for wallet, category and period.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    database_id::{CategoryId, WalletId},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_SECONDARY_STYLE, DEFAULT_CURRENCY, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        edit_delete_action_links, format_currency, format_money,
    },
    navigation::NavBar,
    timezone::local_today,
    transaction::{
        Transaction, TransactionType,
        filter::{Period, TransactionFilter, filter_transactions},
        get_all_transactions,
    },
    wallet::{Wallet, get_all_wallets},
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsViewState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionsViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The filter as sent by the filter form, "all" or an empty value means no filter.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    pub wallet: Option<String>,
    pub category: Option<String>,
    pub period: Option<String>,
}

impl TransactionsQuery {
    fn to_filter(&self) -> TransactionFilter {
        TransactionFilter {
            wallet_id: parse_id(self.wallet.as_deref()),
            category_id: parse_id(self.category.as_deref()),
            period: self
                .period
                .as_deref()
                .and_then(|period| period.parse().ok())
                .unwrap_or_default(),
        }
    }
}

fn parse_id(value: Option<&str>) -> Option<i64> {
    value.and_then(|value| value.trim().parse().ok())
}

/// The query string that reproduces `filter`, e.g. "wallet=1&category=all&period=this_month".
fn filter_query_string(filter: &TransactionFilter) -> String {
    let wallet = filter
        .wallet_id
        .map_or_else(|| "all".to_owned(), |id| id.to_string());
    let category = filter
        .category_id
        .map_or_else(|| "all".to_owned(), |id| id.to_string());

    serde_urlencoded::to_string([
        ("wallet", wallet.as_str()),
        ("category", category.as_str()),
        ("period", filter.period.as_str()),
    ])
    .unwrap_or_default()
}

/// A transaction joined with the names needed to display it.
struct TransactionRow<'a> {
    transaction: &'a Transaction,
    wallet: Option<&'a Wallet>,
    category_label: String,
    edit_url: String,
    delete_url: String,
}

/// Render the transactions page.
pub async fn get_transactions_page(
    State(state): State<TransactionsViewState>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    let wallets = get_all_wallets(&connection)
        .inspect_err(|error| tracing::error!("could not get wallets: {error}"))?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let filter = query.to_filter();
    let filtered = filter_transactions(&transactions, &filter, today);

    let current_url = format!(
        "{}?{}",
        endpoints::TRANSACTIONS_VIEW,
        filter_query_string(&filter)
    );
    let edit_query = serde_urlencoded::to_string([("redirect_url", current_url.as_str())])
        .unwrap_or_default();

    let wallets_by_id: HashMap<WalletId, &Wallet> =
        wallets.iter().map(|wallet| (wallet.id, wallet)).collect();
    let categories_by_id: HashMap<CategoryId, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let rows: Vec<TransactionRow> = filtered
        .into_iter()
        .map(|transaction| TransactionRow {
            transaction,
            wallet: wallets_by_id.get(&transaction.wallet_id).copied(),
            category_label: transaction
                .category_id
                .and_then(|id| categories_by_id.get(&id))
                .map_or_else(|| "Uncategorized".to_owned(), |category| category.label()),
            edit_url: format!(
                "{}?{edit_query}",
                format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id)
            ),
            delete_url: format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id),
        })
        .collect();

    Ok(transactions_view(&rows, &filter, &wallets, &categories).into_response())
}

fn transactions_view(
    rows: &[TransactionRow],
    filter: &TransactionFilter,
    wallets: &[Wallet],
    categories: &[Category],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let total_of = |type_: TransactionType| -> f64 {
        rows.iter()
            .filter(|row| row.transaction.type_ == type_)
            .map(|row| row.transaction.amount)
            .sum()
    };
    let income = total_of(TransactionType::Income);
    let expense = total_of(TransactionType::Expense);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-5xl"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add Transaction"
                    }
                }

                (filter_form_view(filter, wallets, categories))

                div class="flex gap-6 text-sm" data-summary="true"
                {
                    span class="text-green-600 dark:text-green-400"
                    {
                        "Income: " (format_currency(income))
                    }
                    span class="text-red-600 dark:text-red-400"
                    {
                        "Expenses: " (format_currency(expense))
                    }
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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Wallet" }
                                th scope="col" class="px-6 py-3 text-right" { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (transaction_row_view(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No transactions found."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Transactions", &[], &content)
}

fn transaction_row_view(row: &TransactionRow) -> Markup {
    let transaction = row.transaction;
    let (amount_style, signed_amount) = match transaction.type_ {
        TransactionType::Income => ("text-green-600 dark:text-green-400", transaction.amount),
        TransactionType::Expense => ("text-red-600 dark:text-red-400", -transaction.amount),
    };
    let currency = row
        .wallet
        .map_or(DEFAULT_CURRENCY, |wallet| wallet.currency.as_ref());
    let confirm_message = format!(
        "Are you sure you want to delete the transaction '{}'? This cannot be undone.",
        transaction.description
    );

    html!(
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class="px-6 py-4 whitespace-nowrap" { (transaction.date) }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) { (row.category_label) }
            td class=(TABLE_CELL_STYLE)
            {
                (row.wallet.map_or("Wallet", |wallet| wallet.name.as_ref()))
            }
            td class={ "px-6 py-4 text-right tabular-nums " (amount_style) }
            {
                (format_money(signed_amount, currency))
            }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &row.edit_url,
                        &row.delete_url,
                        &confirm_message,
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    )
}

fn filter_form_view(
    filter: &TransactionFilter,
    wallets: &[Wallet],
    categories: &[Category],
) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="grid grid-cols-1 sm:grid-cols-4 gap-4 items-end"
        {
            div
            {
                label for="wallet" class=(FORM_LABEL_STYLE) { "Wallet" }

                select id="wallet" name="wallet" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="all" selected[filter.wallet_id.is_none()] { "All wallets" }

                    @for wallet in wallets {
                        option value=(wallet.id) selected[filter.wallet_id == Some(wallet.id)]
                        {
                            (wallet.name)
                        }
                    }
                }
            }

            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category" name="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="all" selected[filter.category_id.is_none()] { "All categories" }

                    @for category in categories {
                        option
                            value=(category.id)
                            selected[filter.category_id == Some(category.id)]
                        {
                            (category.label())
                        }
                    }
                }
            }

            div
            {
                label for="period" class=(FORM_LABEL_STYLE) { "Period" }

                select id="period" name="period" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for period in Period::ALL {
                        option value=(period.as_str()) selected[filter.period == period]
                        {
                            (period.label())
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Filter" }
        }
    )
}
