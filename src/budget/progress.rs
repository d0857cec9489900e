//! How much of each budget has been used up by the month's expenses.

use std::collections::HashMap;

use crate::{
    budget::Budget,
    category::Category,
    database_id::{CategoryId, WalletId},
    transaction::{Transaction, TransactionType},
    wallet::Wallet,
};

/// Usage at or above this fraction of the limit is a warning.
pub const WARNING_USAGE: f64 = 0.7;
/// Usage at or above this fraction of the limit is critical.
pub const CRITICAL_USAGE: f64 = 0.9;

/// How close spending is to the budget limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageLevel {
    /// Under 70% of the limit.
    Normal,
    /// At least 70% of the limit.
    Warning,
    /// At least 90% of the limit.
    Critical,
}

impl UsageLevel {
    fn from_usage(usage: f64) -> Self {
        if usage >= CRITICAL_USAGE {
            UsageLevel::Critical
        } else if usage >= WARNING_USAGE {
            UsageLevel::Warning
        } else {
            UsageLevel::Normal
        }
    }

    /// The Tailwind background colour for a progress bar at this level.
    pub fn bar_style(&self) -> &'static str {
        match self {
            UsageLevel::Normal => "bg-green-500",
            UsageLevel::Warning => "bg-yellow-400",
            UsageLevel::Critical => "bg-red-600",
        }
    }
}

/// A budget joined with what has been spent against it.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetProgress {
    pub budget: Budget,
    pub wallet_name: String,
    pub category_name: String,
    /// Total expenses in the budget's wallet, category and month.
    pub spent: f64,
    /// `spent / amount_limit`, may be above 1.
    pub usage: f64,
    /// What is left before the limit is reached, never negative.
    pub remaining: f64,
    pub level: UsageLevel,
}

impl BudgetProgress {
    /// The category and wallet, e.g. "Food & Drinks (Cash)".
    pub fn name(&self) -> String {
        format!("{} ({})", self.category_name, self.wallet_name)
    }

    /// The usage as a percentage capped at 100 for drawing progress bars.
    pub fn display_percentage(&self) -> f64 {
        (self.usage * 100.0).min(100.0)
    }
}

/// Calculate the progress of each budget from the expense transactions.
///
/// Transactions outside a budget's month, wallet or category are ignored, as
/// is all income.
pub fn calculate_budget_progress(
    budgets: &[Budget],
    transactions: &[Transaction],
    wallets: &[Wallet],
    categories: &[Category],
) -> Vec<BudgetProgress> {
    let wallet_names: HashMap<WalletId, &str> = wallets
        .iter()
        .map(|wallet| (wallet.id, wallet.name.as_ref()))
        .collect();
    let category_names: HashMap<CategoryId, String> = categories
        .iter()
        .map(|category| (category.id, category.name.to_string()))
        .collect();

    budgets
        .iter()
        .map(|budget| {
            let spent: f64 = transactions
                .iter()
                .filter(|transaction| {
                    transaction.type_ == TransactionType::Expense
                        && transaction.wallet_id == budget.wallet_id
                        && transaction.category_id == Some(budget.category_id)
                        && budget.period.contains(transaction.date)
                })
                .map(|transaction| transaction.amount)
                .sum();

            let usage = if budget.amount_limit > 0.0 {
                spent / budget.amount_limit
            } else {
                0.0
            };

            BudgetProgress {
                budget: budget.clone(),
                wallet_name: wallet_names
                    .get(&budget.wallet_id)
                    .map_or_else(|| "Wallet".to_owned(), |name| (*name).to_owned()),
                category_name: category_names
                    .get(&budget.category_id)
                    .cloned()
                    .unwrap_or_else(|| "Category".to_owned()),
                spent,
                usage,
                remaining: (budget.amount_limit - spent).max(0.0),
                level: UsageLevel::from_usage(usage),
            }
        })
        .collect()
}

/// The budget closest to (or furthest over) its limit, if it has reached the
/// warning level. Ties go to the budget that comes first.
pub fn budget_alert(progress: &[BudgetProgress]) -> Option<&BudgetProgress> {
    progress
        .iter()
        .filter(|progress| progress.usage >= WARNING_USAGE)
        .fold(None, |highest: Option<&BudgetProgress>, progress| match highest {
            Some(highest) if highest.usage >= progress.usage => Some(highest),
            _ => Some(progress),
        })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{
        budget::{Budget, BudgetPeriod},
        category::{Category, CategoryKind, CategoryName, Emoji},
        transaction::{Transaction, TransactionType},
        wallet::{Currency, Wallet, WalletKind, WalletName},
    };

    use super::{UsageLevel, budget_alert, calculate_budget_progress};

    fn budget(id: i64, category_id: i64, amount_limit: f64) -> Budget {
        Budget {
            id,
            wallet_id: 1,
            category_id,
            amount_limit,
            period: BudgetPeriod::new(3, 2025).unwrap(),
        }
    }

    fn expense(id: i64, category_id: i64, amount: f64, date: time::Date) -> Transaction {
        Transaction {
            id,
            wallet_id: 1,
            category_id: Some(category_id),
            type_: TransactionType::Expense,
            amount,
            description: String::new(),
            date,
        }
    }

    fn wallets() -> Vec<Wallet> {
        vec![Wallet {
            id: 1,
            name: WalletName::new_unchecked("Cash"),
            currency: Currency::default(),
            balance: 0.0,
            kind: WalletKind::Cash,
            description: None,
        }]
    }

    fn categories() -> Vec<Category> {
        vec![Category {
            id: 10,
            name: CategoryName::new_unchecked("Food & Drinks"),
            kind: CategoryKind::Expense,
            emoji: Emoji::new("🍜").unwrap(),
            is_default: true,
        }]
    }

    #[test]
    fn sums_matching_expenses_only() {
        let budgets = [budget(1, 10, 1_000.0)];
        let mut other_wallet = expense(4, 10, 300.0, date!(2025 - 03 - 05));
        other_wallet.wallet_id = 2;
        let mut income = expense(5, 10, 400.0, date!(2025 - 03 - 05));
        income.type_ = TransactionType::Income;
        let transactions = [
            expense(1, 10, 200.0, date!(2025 - 03 - 01)),
            expense(2, 10, 300.0, date!(2025 - 03 - 31)),
            expense(3, 10, 999.0, date!(2025 - 04 - 01)),
            expense(6, 11, 999.0, date!(2025 - 03 - 10)),
            other_wallet,
            income,
        ];

        let progress = calculate_budget_progress(&budgets, &transactions, &wallets(), &categories());

        assert_eq!(progress.len(), 1);
        assert_eq!(progress[0].spent, 500.0);
        assert_eq!(progress[0].usage, 0.5);
        assert_eq!(progress[0].remaining, 500.0);
        assert_eq!(progress[0].level, UsageLevel::Normal);
        assert_eq!(progress[0].wallet_name, "Cash");
        assert_eq!(progress[0].category_name, "Food & Drinks");
    }

    #[test]
    fn overspending_caps_display_and_remaining() {
        let budgets = [budget(1, 10, 100.0)];
        let transactions = [expense(1, 10, 150.0, date!(2025 - 03 - 10))];

        let progress = calculate_budget_progress(&budgets, &transactions, &wallets(), &categories());

        assert_eq!(progress[0].usage, 1.5);
        assert_eq!(progress[0].display_percentage(), 100.0);
        assert_eq!(progress[0].remaining, 0.0);
        assert_eq!(progress[0].level, UsageLevel::Critical);
    }

    #[test]
    fn usage_levels_switch_at_thresholds() {
        let cases = [
            (69.0, UsageLevel::Normal),
            (70.0, UsageLevel::Warning),
            (89.0, UsageLevel::Warning),
            (90.0, UsageLevel::Critical),
        ];

        for (spent, want) in cases {
            let progress = calculate_budget_progress(
                &[budget(1, 10, 100.0)],
                &[expense(1, 10, spent, date!(2025 - 03 - 10))],
                &wallets(),
                &categories(),
            );

            assert_eq!(progress[0].level, want, "spent {spent}");
        }
    }

    #[test]
    fn missing_names_fall_back_to_placeholders() {
        let progress = calculate_budget_progress(&[budget(1, 99, 100.0)], &[], &[], &[]);

        assert_eq!(progress[0].wallet_name, "Wallet");
        assert_eq!(progress[0].category_name, "Category");
        assert_eq!(progress[0].spent, 0.0);
    }

    #[test]
    fn alert_picks_highest_usage_over_warning() {
        let budgets = [budget(1, 10, 100.0), budget(2, 11, 100.0), budget(3, 12, 100.0)];
        let transactions = [
            expense(1, 10, 75.0, date!(2025 - 03 - 10)),
            expense(2, 11, 95.0, date!(2025 - 03 - 10)),
            expense(3, 12, 10.0, date!(2025 - 03 - 10)),
        ];
        let progress = calculate_budget_progress(&budgets, &transactions, &wallets(), &categories());

        let alert = budget_alert(&progress).unwrap();

        assert_eq!(alert.budget.id, 2);
    }

    #[test]
    fn alert_tie_goes_to_first_budget() {
        let budgets = [budget(1, 10, 100.0), budget(2, 11, 100.0)];
        let transactions = [
            expense(1, 10, 100.0, date!(2025 - 03 - 10)),
            expense(2, 11, 100.0, date!(2025 - 03 - 10)),
        ];
        let progress = calculate_budget_progress(&budgets, &transactions, &wallets(), &categories());

        let alert = budget_alert(&progress).unwrap();

        assert_eq!(alert.budget.id, 1);
    }

    #[test]
    fn no_alert_below_warning() {
        let progress = calculate_budget_progress(
            &[budget(1, 10, 100.0)],
            &[expense(1, 10, 69.9, date!(2025 - 03 - 10))],
            &wallets(),
            &categories(),
        );

        assert!(budget_alert(&progress).is_none());
    }
}
