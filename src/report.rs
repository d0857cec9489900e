//! The reports page with the month's spending composition and the six month
//! income vs expense trend.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error,
    budget::BudgetPeriod,
    category::get_all_categories,
    dashboard::{
        DashboardChart, breakdown_percentages, chart_container, chart_head_elements,
        expense_breakdown, income_expense_chart, income_expense_trend, spending_pie_chart,
    },
    endpoints,
    html::{
        CARD_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_currency, format_percentage,
    },
    navigation::NavBar,
    timezone::local_today,
    transaction::get_all_transactions,
};

/// The state needed for the reports page.
#[derive(Debug, Clone)]
pub struct ReportsState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub local_timezone: String,
}

impl FromRef<AppState> for ReportsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Display the spending breakdown for the current month and the income vs
/// expense totals for the last six months.
pub async fn get_reports_page(State(state): State<ReportsState>) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let (categories, transactions) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let categories = get_all_categories(&connection)
            .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;
        let transactions = get_all_transactions(&connection)
            .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

        (categories, transactions)
    };

    let breakdown = expense_breakdown(&transactions, &categories, today);
    let percentages = breakdown_percentages(&breakdown);
    let trend = income_expense_trend(&transactions, today);

    let charts = [
        DashboardChart {
            id: "report-spending-chart",
            options: spending_pie_chart(&breakdown).to_string(),
        },
        DashboardChart {
            id: "report-trend-chart",
            options: income_expense_chart(&trend).to_string(),
        },
    ];

    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();
    let month_label = BudgetPeriod::containing(today).to_string();

    let content = html! {
        (nav_bar)

        div class={ (PAGE_CONTAINER_STYLE) " max-w-screen-xl gap-6" }
        {
            section class={ (CARD_STYLE) " w-full space-y-4" } id="spending-composition"
            {
                h2 class="text-xl font-bold" { "Spending in " (month_label) }

                (chart_container(&charts[0]))

                @if breakdown.is_empty() {
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "No expenses recorded this month."
                    }
                } @else {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Share" }
                            }
                        }

                        tbody
                        {
                            @for (entry, percentage) in breakdown.iter().zip(&percentages) {
                                tr class=(TABLE_ROW_STYLE) data-breakdown-row="true"
                                {
                                    td class=(TABLE_CELL_STYLE) { (entry.label) }
                                    td class=(TABLE_CELL_STYLE) { (format_currency(entry.value)) }
                                    td class=(TABLE_CELL_STYLE) { (format_percentage(*percentage)) }
                                }
                            }
                        }
                    }
                }
            }

            section class={ (CARD_STYLE) " w-full space-y-4" } id="income-expense-trend"
            {
                h2 class="text-xl font-bold" { "Income vs Expense" }

                (chart_container(&charts[1]))

                table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Income" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Expense" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Net" }
                        }
                    }

                    tbody
                    {
                        @for month in &trend {
                            tr class=(TABLE_ROW_STYLE) data-trend-row="true"
                            {
                                td class=(TABLE_CELL_STYLE) { (month.label) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(month.income)) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(month.expense)) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(month.income - month.expense)) }
                            }
                        }
                    }
                }
            }
        }
    };

    Ok(base("Reports", &chart_head_elements(&charts), &content).into_response())
}
