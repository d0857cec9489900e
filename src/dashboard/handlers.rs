//! Dashboard HTTP handler and view rendering.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    budget::{
        BudgetPeriod, BudgetProgress, budget_alert, budget_progress_view,
        calculate_budget_progress, get_budgets_for_period,
    },
    category::{Category, get_all_categories},
    dashboard::{
        aggregation::{
            UNCATEGORIZED_LABEL, expense_breakdown, expense_ratio, income_expense_trend,
            monthly_expense, monthly_income, savings_rate, top_category, total_balance,
        },
        cards::{Summary, summary_cards_view},
        charts::{
            DashboardChart, chart_container, chart_head_elements, income_expense_chart,
            spending_pie_chart,
        },
    },
    endpoints,
    html::{CARD_STYLE, DEFAULT_CURRENCY, LINK_STYLE, base, format_money, link},
    navigation::NavBar,
    timezone::local_today,
    transaction::{Transaction, TransactionType, get_all_transactions},
    wallet::{Wallet, get_all_wallets},
};

/// The number of transactions listed under "Recent Transactions".
const RECENT_TRANSACTION_COUNT: usize = 5;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading wallets, transactions and budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display a page with an overview of the user's finances for the current month.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let wallets = get_all_wallets(&connection)
        .inspect_err(|error| tracing::error!("could not get wallets: {error}"))?;

    if wallets.is_empty() {
        return Ok(dashboard_no_data_view().into_response());
    }

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;
    let transactions = get_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;
    let period = BudgetPeriod::containing(today);
    let budgets = get_budgets_for_period(period, &connection)
        .inspect_err(|error| tracing::error!("could not get budgets for {period}: {error}"))?;

    let progress = calculate_budget_progress(&budgets, &transactions, &wallets, &categories);

    Ok(dashboard_view(
        today,
        period,
        &wallets,
        &categories,
        &transactions,
        &progress,
    )
    .into_response())
}

fn dashboard_no_data_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let new_wallet_link = link(endpoints::NEW_WALLET_VIEW, "add a wallet");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your balances, budgets and charts will show up here once you "
                (new_wallet_link) " and record some transactions."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn dashboard_view(
    today: Date,
    period: BudgetPeriod,
    wallets: &[Wallet],
    categories: &[Category],
    transactions: &[Transaction],
    progress: &[BudgetProgress],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let month_label = period.to_string();

    let income = monthly_income(transactions, today);
    let expense = monthly_expense(transactions, today);
    let breakdown = expense_breakdown(transactions, categories, today);
    let summary = Summary {
        month_label: &month_label,
        total_balance: total_balance(wallets),
        monthly_income: income,
        monthly_expense: expense,
        expense_ratio: expense_ratio(income, expense),
        savings_rate: savings_rate(income, expense),
        top_category: top_category(&breakdown, expense),
        budget_alert: budget_alert(progress),
    };

    let charts = [
        DashboardChart {
            id: "spending-pie-chart",
            options: spending_pie_chart(&breakdown).to_string(),
        },
        DashboardChart {
            id: "income-expense-chart",
            options: income_expense_chart(&income_expense_trend(transactions, today)).to_string(),
        },
    ];

    let recent: Vec<&Transaction> = transactions.iter().take(RECENT_TRANSACTION_COUNT).collect();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center gap-4 px-2 lg:px-6 py-4 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            h1 class="text-xl font-bold self-start" { "Overview for " (month_label) }

            (summary_cards_view(&summary))

            section id="charts" class="w-full"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    @for chart in &charts {
                        (chart_container(chart))
                    }
                }
            }

            div class="grid grid-cols-1 xl:grid-cols-2 gap-4 w-full"
            {
                (budgets_overview_view(progress))
                (recent_transactions_view(&recent, wallets, categories))
            }
        }
    );

    base("Dashboard", &chart_head_elements(&charts), &content)
}

fn budgets_overview_view(progress: &[BudgetProgress]) -> Markup {
    html!(
        section class={ (CARD_STYLE) " space-y-4" } id="budgets-overview"
        {
            div class="flex justify-between items-baseline"
            {
                h3 class="text-lg font-semibold" { "Budgets" }
                a href=(endpoints::BUDGETS_VIEW) class=(LINK_STYLE) { "Manage" }
            }

            @for budget_progress in progress {
                (budget_progress_view(budget_progress))
            }

            @if progress.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "No budgets set for this month."
                }
            }
        }
    )
}

fn recent_transactions_view(
    recent: &[&Transaction],
    wallets: &[Wallet],
    categories: &[Category],
) -> Markup {
    let wallets_by_id: HashMap<_, _> = wallets.iter().map(|wallet| (wallet.id, wallet)).collect();
    let categories_by_id: HashMap<_, _> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    html!(
        section class={ (CARD_STYLE) " space-y-4" } id="recent-transactions"
        {
            div class="flex justify-between items-baseline"
            {
                h3 class="text-lg font-semibold" { "Recent Transactions" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "View all" }
            }

            ul class="divide-y divide-gray-200 dark:divide-gray-700"
            {
                @for transaction in recent {
                    @let wallet = wallets_by_id.get(&transaction.wallet_id);
                    @let category_label = transaction
                        .category_id
                        .and_then(|id| categories_by_id.get(&id))
                        .map_or_else(|| UNCATEGORIZED_LABEL.to_owned(), |category| category.label());
                    @let currency = wallet.map_or(DEFAULT_CURRENCY, |wallet| wallet.currency.as_ref());
                    @let (amount_style, amount) = signed_amount(transaction);

                    li class="flex justify-between py-2 text-sm" data-transaction-id=(transaction.id)
                    {
                        div
                        {
                            p class="font-medium"
                            {
                                @if transaction.description.is_empty() {
                                    (category_label)
                                } @else {
                                    (transaction.description)
                                }
                            }
                            p class="text-xs text-gray-500 dark:text-gray-400"
                            {
                                (transaction.date) " · " (category_label)
                            }
                        }

                        span class={ "tabular-nums " (amount_style) }
                        {
                            (format_money(amount, currency))
                        }
                    }
                }
            }

            @if recent.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400"
                {
                    "No transactions yet. "
                    (link(endpoints::NEW_TRANSACTION_VIEW, "Add one"))
                    "."
                }
            }
        }
    )
}

/// The text colour and signed amount, negative for expenses.
fn signed_amount(transaction: &Transaction) -> (&'static str, f64) {
    match transaction.type_ {
        TransactionType::Income => ("text-green-600 dark:text-green-400", transaction.amount),
        TransactionType::Expense => ("text-red-600 dark:text-red-400", -transaction.amount),
    }
}
