//! Monthly budgets per wallet and expense category, and how much of them has
//! been spent.

mod core;
mod page;
mod progress;

pub use core::{
    Budget, BudgetPeriod, MAX_BUDGET_YEAR, MIN_BUDGET_YEAR, NewBudget, create_budget_table,
    get_budgets_for_period, upsert_budget,
};
pub use page::{get_budgets_page, upsert_budget_endpoint};
pub(crate) use page::budget_progress_view;
pub use progress::{BudgetProgress, budget_alert, calculate_budget_progress};

#[cfg(test)]
pub use progress::UsageLevel;
