//! Summaries derived from the transaction list for the dashboard and reports.
//!
//! Every function here is pure and takes `today` explicitly so that the
//! results only depend on their inputs.

use std::collections::HashMap;

use time::{Date, Month};

use crate::{
    category::Category,
    database_id::CategoryId,
    transaction::{Transaction, TransactionType},
    wallet::Wallet,
};

/// The label for expenses without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The number of months shown in the income vs expense trend.
pub const TREND_MONTHS: usize = 6;

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    /// `None` for uncategorized expenses.
    pub category_id: Option<CategoryId>,
    /// The emoji and name, e.g. "🍜 Food & Drinks".
    pub label: String,
    pub value: f64,
}

/// The category with the most spending and its share of all spending.
#[derive(Debug, Clone, PartialEq)]
pub struct TopCategory {
    pub label: String,
    pub value: f64,
    /// The share of the month's expenses as a percentage.
    pub percentage: f64,
}

/// Income and expenses for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyTotals {
    /// The first day of the month.
    pub month: Date,
    /// A short label, e.g. "Feb '25".
    pub label: String,
    pub income: f64,
    pub expense: f64,
}

fn same_month(a: Date, b: Date) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn sum_of_type<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    type_: TransactionType,
) -> f64 {
    transactions
        .into_iter()
        .filter(|transaction| transaction.type_ == type_)
        .map(|transaction| transaction.amount)
        .sum()
}

/// The transactions dated in the same calendar month as `today`.
pub fn current_month_transactions(transactions: &[Transaction], today: Date) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|transaction| same_month(transaction.date, today))
        .collect()
}

/// Total income in the current month.
pub fn monthly_income(transactions: &[Transaction], today: Date) -> f64 {
    sum_of_type(
        current_month_transactions(transactions, today),
        TransactionType::Income,
    )
}

/// Total expenses in the current month.
pub fn monthly_expense(transactions: &[Transaction], today: Date) -> f64 {
    sum_of_type(
        current_month_transactions(transactions, today),
        TransactionType::Expense,
    )
}

/// The sum of all wallet balances.
pub fn total_balance(wallets: &[Wallet]) -> f64 {
    wallets.iter().map(|wallet| wallet.balance).sum()
}

/// The percentage of income that was not spent, or zero without income.
///
/// Negative when more was spent than earned.
pub fn savings_rate(income: f64, expense: f64) -> f64 {
    if income > 0.0 {
        (income - expense) * 100.0 / income
    } else {
        0.0
    }
}

/// Expenses as a percentage of income, treating income below 1 as 1.
pub fn expense_ratio(income: f64, expense: f64) -> f64 {
    expense * 100.0 / income.max(1.0)
}

/// The current month's expenses grouped by category, largest first.
pub fn expense_breakdown(
    transactions: &[Transaction],
    categories: &[Category],
    today: Date,
) -> Vec<CategoryTotal> {
    let categories_by_id: HashMap<CategoryId, &Category> = categories
        .iter()
        .map(|category| (category.id, category))
        .collect();

    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index_by_category: HashMap<Option<CategoryId>, usize> = HashMap::new();

    for transaction in current_month_transactions(transactions, today)
        .into_iter()
        .filter(|transaction| transaction.type_ == TransactionType::Expense)
    {
        // A category that was deleted after the fact counts as uncategorized.
        let category = transaction
            .category_id
            .and_then(|id| categories_by_id.get(&id));
        let key = category.map(|category| category.id);

        match index_by_category.get(&key) {
            Some(&index) => totals[index].value += transaction.amount,
            None => {
                index_by_category.insert(key, totals.len());
                totals.push(CategoryTotal {
                    category_id: key,
                    label: category.map_or_else(
                        || UNCATEGORIZED_LABEL.to_owned(),
                        |category| category.label(),
                    ),
                    value: transaction.amount,
                });
            }
        }
    }

    // Stable, so ties keep the order the categories were first seen in.
    totals.sort_by(|a, b| b.value.total_cmp(&a.value));
    totals
}

/// The largest entry of `breakdown` with its share of `monthly_expense`.
pub fn top_category(breakdown: &[CategoryTotal], monthly_expense: f64) -> Option<TopCategory> {
    breakdown.first().map(|total| TopCategory {
        label: total.label.clone(),
        value: total.value,
        percentage: if monthly_expense > 0.0 {
            total.value * 100.0 / monthly_expense
        } else {
            0.0
        },
    })
}

/// The share of each breakdown entry in the total, as percentages.
pub fn breakdown_percentages(breakdown: &[CategoryTotal]) -> Vec<f64> {
    let total: f64 = breakdown.iter().map(|entry| entry.value).sum();

    breakdown
        .iter()
        .map(|entry| {
            if total > 0.0 {
                entry.value * 100.0 / total
            } else {
                0.0
            }
        })
        .collect()
}

/// The first day of each of the `count` months ending with the current month,
/// oldest first.
pub fn month_windows(today: Date, count: usize) -> Vec<Date> {
    let mut month = today.month();
    let mut year = today.year();
    let mut windows = Vec::with_capacity(count);

    for _ in 0..count {
        if let Ok(first_day) = Date::from_calendar_date(year, month, 1) {
            windows.push(first_day);
        }

        if month == Month::January {
            year -= 1;
        }
        month = month.previous();
    }

    windows.reverse();
    windows
}

/// A short month label, e.g. "Feb '25".
pub fn month_label(date: Date) -> String {
    let month = match date.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!("{month} '{:02}", date.year().rem_euclid(100))
}

/// Income and expenses for each of the last [TREND_MONTHS] months, oldest first.
pub fn income_expense_trend(transactions: &[Transaction], today: Date) -> Vec<MonthlyTotals> {
    month_windows(today, TREND_MONTHS)
        .into_iter()
        .map(|month| {
            let in_month = || {
                transactions
                    .iter()
                    .filter(move |transaction| same_month(transaction.date, month))
            };

            MonthlyTotals {
                month,
                label: month_label(month),
                income: sum_of_type(in_month(), TransactionType::Income),
                expense: sum_of_type(in_month(), TransactionType::Expense),
            }
        })
        .collect()
}
