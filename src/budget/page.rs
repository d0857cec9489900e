//! The budgets page and the endpoint for setting a budget.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Month;

use crate::{
    AppState, Error,
    budget::{
        BudgetPeriod, MAX_BUDGET_YEAR, MIN_BUDGET_YEAR,
        core::BudgetForm,
        get_budgets_for_period,
        progress::{BudgetProgress, calculate_budget_progress},
        upsert_budget,
    },
    category::{Category, CategoryKind, get_all_categories},
    endpoints,
    html::{
        CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        base, format_currency, format_percentage, link, submit_button,
    },
    navigation::NavBar,
    timezone::local_today,
    transaction::get_transactions_in_date_range,
    wallet::{Wallet, get_all_wallets},
};

/// The state needed for the budgets page and endpoint.
#[derive(Debug, Clone)]
pub struct BudgetsState {
    /// The database connection for managing budgets.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Which month to show, defaults to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetsQuery {
    pub month: Option<u8>,
    pub year: Option<i32>,
}

fn budgets_url(period: BudgetPeriod) -> String {
    format!(
        "{}?month={}&year={}",
        endpoints::BUDGETS_VIEW,
        period.month() as u8,
        period.year()
    )
}

/// Renders the budgets for a month with their progress and a form for setting budgets.
pub async fn get_budgets_page(
    State(state): State<BudgetsState>,
    Query(query): Query<BudgetsQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let period = match (query.month, query.year) {
        (Some(month), Some(year)) => BudgetPeriod::new(month, year)
            .unwrap_or_else(|_| BudgetPeriod::containing(today)),
        _ => BudgetPeriod::containing(today),
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets_for_period(period, &connection)
        .inspect_err(|error| tracing::error!("could not get budgets for {period}: {error}"))?;
    let wallets = get_all_wallets(&connection)
        .inspect_err(|error| tracing::error!("could not get wallets: {error}"))?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let (first_day, last_day) = period.date_range()?;
    let transactions = get_transactions_in_date_range(first_day, last_day, &connection)
        .inspect_err(|error| tracing::error!("could not get transactions for {period}: {error}"))?;

    let progress = calculate_budget_progress(&budgets, &transactions, &wallets, &categories);

    Ok(budgets_view(period, &progress, &wallets, &categories).into_response())
}

/// A route handler for setting a budget, redirects to the budget's month on success.
pub async fn upsert_budget_endpoint(
    State(state): State<BudgetsState>,
    Form(form): Form<BudgetForm>,
) -> Response {
    let new_budget = match form.into_new_budget() {
        Ok(new_budget) => new_budget,
        Err(error) => return error.into_alert_response(),
    };
    let period = new_budget.period;

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = upsert_budget(new_budget, &connection) {
        tracing::error!("could not set budget: {error}");
        return error.into_alert_response();
    }

    (HxRedirect(budgets_url(period)), StatusCode::SEE_OTHER).into_response()
}

/// A labelled progress bar for one budget.
pub(crate) fn budget_progress_view(progress: &BudgetProgress) -> Markup {
    let width = format!("width: {:.1}%", progress.display_percentage());

    html!(
        div class="space-y-1" data-budget-id=(progress.budget.id)
        {
            div class="flex justify-between text-sm"
            {
                span class="font-medium"
                {
                    (progress.category_name)
                    span class="text-gray-500 dark:text-gray-400" { " · " (progress.wallet_name) }
                }

                span class="tabular-nums"
                {
                    (format_currency(progress.spent))
                    " / "
                    (format_currency(progress.budget.amount_limit))
                }
            }

            div class="w-full h-2.5 bg-gray-200 rounded-full dark:bg-gray-700"
            {
                div
                    class={ "h-2.5 rounded-full " (progress.level.bar_style()) }
                    style=(width)
                {}
            }

            div class="flex justify-between text-xs text-gray-500 dark:text-gray-400"
            {
                span data-usage="true" { (format_percentage(progress.usage * 100.0)) " used" }
                span { (format_currency(progress.remaining)) " left" }
            }
        }
    )
}

fn budgets_view(
    period: BudgetPeriod,
    progress: &[BudgetProgress],
    wallets: &[Wallet],
    categories: &[Category],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 w-full lg:max-w-3xl"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Budgets for " (period) }

                    nav class="flex gap-4 text-sm"
                    {
                        @if let Some(previous) = period.previous() {
                            a href=(budgets_url(previous)) class=(LINK_STYLE) { "Previous month" }
                        }

                        @if let Some(next) = period.next() {
                            a href=(budgets_url(next)) class=(LINK_STYLE) { "Next month" }
                        }
                    }
                }

                div class={ (CARD_STYLE) " space-y-4" } id="budget-progress"
                {
                    @for budget_progress in progress {
                        (budget_progress_view(budget_progress))
                    }

                    @if progress.is_empty() {
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            "No budgets set for " (period) "."
                        }
                    }
                }

                div class=(CARD_STYLE)
                {
                    @if wallets.is_empty() {
                        p
                        {
                            "You need a wallet before you can set budgets. "
                            (link(endpoints::NEW_WALLET_VIEW, "Create a wallet"))
                            "."
                        }
                    } @else {
                        (budget_form_view(period, wallets, categories))
                    }
                }
            }
        }
    );

    base("Budgets", &[], &content)
}

fn budget_form_view(period: BudgetPeriod, wallets: &[Wallet], categories: &[Category]) -> Markup {
    let months = (1..=12u8).filter_map(|number| Month::try_from(number).ok());

    html!(
        form
            hx-post=(endpoints::POST_BUDGET)
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            h2 class="text-lg font-bold" { "Set a Budget" }

            p class="text-sm text-gray-500 dark:text-gray-400"
            {
                "Setting a budget for a wallet and category that already has one replaces its limit."
            }

            div class="grid grid-cols-1 sm:grid-cols-2 gap-4"
            {
                div
                {
                    label for="wallet_id" class=(FORM_LABEL_STYLE) { "Wallet" }

                    select name="wallet_id" id="wallet_id" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for wallet in wallets {
                            option value=(wallet.id) { (wallet.name) }
                        }
                    }
                }

                div
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                    select name="category_id" id="category_id" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for category in categories
                            .iter()
                            .filter(|category| category.kind == CategoryKind::Expense)
                        {
                            option value=(category.id) { (category.label()) }
                        }
                    }
                }

                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                    select name="month" id="month" required class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for month in months {
                            option value=(month as u8) selected[month == period.month()]
                            {
                                (month)
                            }
                        }
                    }
                }

                div
                {
                    label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                    input
                        name="year"
                        id="year"
                        type="number"
                        min=(MIN_BUDGET_YEAR)
                        max=(MAX_BUDGET_YEAR)
                        value=(period.year())
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="amount_limit" class=(FORM_LABEL_STYLE) { "Limit" }

                input
                    name="amount_limit"
                    id="amount_limit"
                    type="number"
                    step="0.01"
                    min="0.01"
                    placeholder="0"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            (submit_button("Save Budget"))
        }
    )
}


#[cfg(test)]
mod upsert_budget_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        budget::{
            BudgetPeriod, core::BudgetForm, get_budgets_for_period, page::BudgetsState,
            upsert_budget_endpoint,
        },
        category::{CategoryKind, get_categories_by_kind},
        db::initialize,
        test_utils::assert_hx_redirect,
        wallet::{Currency, NewWallet, WalletKind, WalletName, create_wallet},
    };

    fn get_state() -> BudgetsState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        create_wallet(
            NewWallet {
                name: WalletName::new_unchecked("Cash"),
                currency: Currency::default(),
                balance: 0.0,
                kind: WalletKind::Cash,
                description: None,
            },
            &connection,
        )
        .unwrap();

        BudgetsState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    fn category_id(state: &BudgetsState, kind: CategoryKind) -> i64 {
        get_categories_by_kind(kind, &state.db_connection.lock().unwrap()).unwrap()[0].id
    }

    #[tokio::test]
    async fn sets_budget_and_redirects_to_its_month() {
        let state = get_state();
        let form = BudgetForm {
            wallet_id: 1,
            category_id: category_id(&state, CategoryKind::Expense),
            amount_limit: 250_000.0,
            month: 5,
            year: 2025,
        };

        let response = upsert_budget_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/budgets?month=5&year=2025");
        let budgets = get_budgets_for_period(
            BudgetPeriod::new(5, 2025).unwrap(),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount_limit, 250_000.0);
    }

    #[tokio::test]
    async fn rejects_invalid_input() {
        let state = get_state();
        let expense_id = category_id(&state, CategoryKind::Expense);
        let income_id = category_id(&state, CategoryKind::Income);
        let cases = [
            (expense_id, 100.0, 13, 2025),
            (expense_id, 100.0, 1, 2101),
            (expense_id, 0.0, 1, 2025),
            (income_id, 100.0, 1, 2025),
        ];

        for (category_id, amount_limit, month, year) in cases {
            let form = BudgetForm {
                wallet_id: 1,
                category_id,
                amount_limit,
                month,
                year,
            };

            let response = upsert_budget_endpoint(State(state.clone()), Form(form)).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }
}
