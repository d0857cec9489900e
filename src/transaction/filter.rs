//! Filtering transactions by wallet, category and period.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    database_id::{CategoryId, WalletId},
    transaction::Transaction,
};

/// How far back the transactions page looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// The calendar month containing today.
    #[default]
    ThisMonth,
    /// The calendar month before this one.
    LastMonth,
    /// The 90 days up to and including today.
    Last90Days,
    /// Every transaction.
    All,
}

impl Period {
    /// All periods in display order.
    pub const ALL: [Period; 4] = [
        Period::ThisMonth,
        Period::LastMonth,
        Period::Last90Days,
        Period::All,
    ];

    /// The value used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::ThisMonth => "this_month",
            Period::LastMonth => "last_month",
            Period::Last90Days => "last_90_days",
            Period::All => "all",
        }
    }

    /// The human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            Period::ThisMonth => "This month",
            Period::LastMonth => "Last month",
            Period::Last90Days => "Last 90 days",
            Period::All => "All time",
        }
    }

    /// Whether `date` falls in this period relative to `today`.
    pub fn contains(&self, date: Date, today: Date) -> bool {
        match self {
            Period::ThisMonth => same_month(date, today),
            Period::LastMonth => same_month(date, last_day_of_previous_month(today)),
            Period::Last90Days => date >= today.saturating_sub(Duration::days(90)),
            Period::All => true,
        }
    }
}

/// Returned when a string is not a period.
#[derive(Debug, thiserror::Error)]
#[error("unknown period \"{0}\"")]
pub struct UnknownPeriod(String);

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|period| period.as_str() == s)
            .ok_or_else(|| UnknownPeriod(s.to_owned()))
    }
}

/// Which transactions to show. `None` means any wallet or category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub wallet_id: Option<WalletId>,
    pub category_id: Option<CategoryId>,
    pub period: Period,
}

impl TransactionFilter {
    /// Whether `transaction` passes every part of the filter.
    pub fn matches(&self, transaction: &Transaction, today: Date) -> bool {
        self.wallet_id
            .is_none_or(|wallet_id| transaction.wallet_id == wallet_id)
            && self
                .category_id
                .is_none_or(|category_id| transaction.category_id == Some(category_id))
            && self.period.contains(transaction.date, today)
    }
}

/// The transactions that match `filter`, in their original order.
pub fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    filter: &TransactionFilter,
    today: Date,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|transaction| filter.matches(transaction, today))
        .collect()
}

fn same_month(a: Date, b: Date) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn last_day_of_previous_month(date: Date) -> Date {
    let first_of_month = date.replace_day(1).unwrap_or(date);
    first_of_month.previous_day().unwrap_or(first_of_month)
}
