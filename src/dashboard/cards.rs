//! Summary cards shown at the top of the dashboard.

use maud::{Markup, html};

use crate::{
    budget::BudgetProgress,
    dashboard::aggregation::TopCategory,
    html::{BADGE_STYLE, CARD_STYLE, format_currency, format_percentage},
};

/// The savings rate to aim for, as a percentage of income.
pub const SAVINGS_TARGET: f64 = 30.0;

/// The figures the summary cards display.
pub(super) struct Summary<'a> {
    pub month_label: &'a str,
    pub total_balance: f64,
    pub monthly_income: f64,
    pub monthly_expense: f64,
    pub expense_ratio: f64,
    pub savings_rate: f64,
    pub top_category: Option<TopCategory>,
    pub budget_alert: Option<&'a BudgetProgress>,
}

pub(super) fn summary_cards_view(summary: &Summary) -> Markup {
    // Negative savings are shown as zero.
    let savings_rate = summary.savings_rate.max(0.0);
    let savings_bar_width = format!("width: {:.1}%", savings_rate.min(100.0));

    html! {
        section class="grid grid-cols-1 md:grid-cols-2 xl:grid-cols-4 gap-4 w-full"
        {
            div class=(CARD_STYLE) data-card="balance"
            {
                h3 class="text-sm font-medium text-gray-600 dark:text-gray-400" { "Total Balance" }
                div class="text-3xl font-semibold mt-2" { (format_currency(summary.total_balance)) }
                p class="text-sm text-gray-500 dark:text-gray-400" { "Across all wallets" }
            }

            div class=(CARD_STYLE) data-card="income"
            {
                div class="flex justify-between items-start"
                {
                    div
                    {
                        h3 class="text-sm font-medium text-gray-600 dark:text-gray-400" { "Income" }
                        p class="text-xs text-gray-500 dark:text-gray-400" { (summary.month_label) }
                    }
                    span class=(BADGE_STYLE) { "Income" }
                }
                div class="text-3xl font-semibold mt-2 text-green-600 dark:text-green-400"
                {
                    (format_currency(summary.monthly_income))
                }
            }

            div class=(CARD_STYLE) data-card="expense"
            {
                div class="flex justify-between items-start"
                {
                    div
                    {
                        h3 class="text-sm font-medium text-gray-600 dark:text-gray-400" { "Expenses" }
                        p class="text-xs text-gray-500 dark:text-gray-400" { (summary.month_label) }
                    }
                    span
                        class="text-xs font-semibold text-red-600 dark:text-red-400"
                        title="Expenses as a share of income"
                        data-expense-ratio="true"
                    {
                        "-" (format_percentage(summary.expense_ratio))
                    }
                }
                div class="text-3xl font-semibold mt-2 text-red-600 dark:text-red-400"
                {
                    (format_currency(summary.monthly_expense))
                }

                @if let Some(top) = &summary.top_category {
                    p class="text-sm text-gray-500 dark:text-gray-400" data-top-category="true"
                    {
                        (top.label) " made up "
                        span class="font-medium"
                        {
                            (format_currency(top.value)) " (" (format_percentage(top.percentage)) ")"
                        }
                        " of spending."
                    }
                } @else {
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "No expenses this month yet."
                    }
                }
            }

            div class={ (CARD_STYLE) " space-y-3" } data-card="savings"
            {
                h3 class="text-sm font-medium text-gray-600 dark:text-gray-400" { "Savings Rate" }

                div class="flex items-baseline justify-between"
                {
                    span class="text-3xl font-semibold" data-savings-rate="true"
                    {
                        (format!("{savings_rate:.1}%"))
                    }
                    span class="text-xs text-gray-500 dark:text-gray-400"
                    {
                        "Target: " (format_percentage(SAVINGS_TARGET))
                    }
                }

                div class="w-full h-2 bg-gray-200 rounded-full dark:bg-gray-700"
                {
                    div class="h-2 rounded-full bg-blue-600" style=(savings_bar_width) {}
                }

                @if let Some(progress) = summary.budget_alert {
                    div
                        class="rounded-lg border border-amber-200 bg-amber-50 px-3 py-2 text-xs
                            text-amber-900 dark:border-amber-500/40 dark:bg-amber-500/10
                            dark:text-amber-100"
                        role="alert"
                        data-budget-alert="true"
                    {
                        p class="font-medium" { "Budget running low" }
                        p
                        {
                            (progress.name()) " has used "
                            span class="font-semibold" { (format_percentage(progress.usage * 100.0)) }
                            " (" (format_currency(progress.spent)) " of "
                            (format_currency(progress.budget.amount_limit)) ")."
                        }
                    }
                } @else {
                    p class="text-xs text-gray-500 dark:text-gray-400"
                    {
                        "All budgets are below 70% of their limit this month."
                    }
                }
            }
        }
    }
}
