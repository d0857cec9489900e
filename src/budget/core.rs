//! Monthly spending limits per wallet and expense category.

use std::fmt::Display;

use rusqlite::{Connection, Row, types::Type};
use serde::Deserialize;
use time::{Date, Month};

use crate::{
    Error,
    category::{CategoryKind, get_category},
    database_id::{BudgetId, CategoryId, WalletId},
    wallet::get_wallet,
};

/// The earliest year a budget can be set for.
pub const MIN_BUDGET_YEAR: i32 = 2023;
/// The latest year a budget can be set for.
pub const MAX_BUDGET_YEAR: i32 = 2100;

/// A calendar month that a budget applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BudgetPeriod {
    month: Month,
    year: i32,
}

impl BudgetPeriod {
    /// Create a budget period from a month number (1-12) and a year.
    ///
    /// # Errors
    /// Returns [Error::InvalidBudgetPeriod] if the month is not 1-12 or the
    /// year is outside [MIN_BUDGET_YEAR] to [MAX_BUDGET_YEAR].
    pub fn new(month: u8, year: i32) -> Result<Self, Error> {
        if !(MIN_BUDGET_YEAR..=MAX_BUDGET_YEAR).contains(&year) {
            return Err(Error::InvalidBudgetPeriod { month, year });
        }

        let month = Month::try_from(month).map_err(|_| Error::InvalidBudgetPeriod { month, year })?;

        Ok(Self { month, year })
    }

    /// The period containing `date`, clamped to the supported years.
    pub fn containing(date: Date) -> Self {
        Self {
            month: date.month(),
            year: date.year().clamp(MIN_BUDGET_YEAR, MAX_BUDGET_YEAR),
        }
    }

    /// The month of the year.
    pub fn month(&self) -> Month {
        self.month
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The first and last day of the month.
    ///
    /// # Errors
    /// Returns [Error::InvalidBudgetPeriod] if the month has no valid dates.
    pub fn date_range(&self) -> Result<(Date, Date), Error> {
        let invalid = |_| Error::InvalidBudgetPeriod {
            month: self.month as u8,
            year: self.year,
        };
        let first_day = Date::from_calendar_date(self.year, self.month, 1).map_err(invalid)?;
        let next_year = if self.month == Month::December {
            self.year + 1
        } else {
            self.year
        };
        let last_day = Date::from_calendar_date(next_year, self.month.next(), 1)
            .map_err(invalid)?
            .previous_day()
            .ok_or(Error::InvalidBudgetPeriod {
                month: self.month as u8,
                year: self.year,
            })?;

        Ok((first_day, last_day))
    }

    /// Whether `date` falls in this month.
    pub fn contains(&self, date: Date) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    /// The month before this one, or `None` before [MIN_BUDGET_YEAR].
    pub fn previous(&self) -> Option<Self> {
        let year = if self.month == Month::January {
            self.year - 1
        } else {
            self.year
        };

        Self::new(self.month.previous() as u8, year).ok()
    }

    /// The month after this one, or `None` after [MAX_BUDGET_YEAR].
    pub fn next(&self) -> Option<Self> {
        let year = if self.month == Month::December {
            self.year + 1
        } else {
            self.year
        };

        Self::new(self.month.next() as u8, year).ok()
    }
}

impl Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}

/// A spending limit for one expense category in one wallet for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The wallet the expenses are paid from.
    pub wallet_id: WalletId,
    /// The expense category being limited.
    pub category_id: CategoryId,
    /// The most that should be spent in the month.
    pub amount_limit: f64,
    /// The month the limit applies to.
    pub period: BudgetPeriod,
}

/// The data needed to set a budget.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The wallet the expenses are paid from.
    pub wallet_id: WalletId,
    /// The expense category being limited.
    pub category_id: CategoryId,
    /// The most that should be spent in the month, must be greater than zero.
    pub amount_limit: f64,
    /// The month the limit applies to.
    pub period: BudgetPeriod,
}

/// The form data for setting a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetForm {
    pub wallet_id: WalletId,
    pub category_id: CategoryId,
    pub amount_limit: f64,
    pub month: u8,
    pub year: i32,
}

impl BudgetForm {
    /// Validate the period and convert to a [NewBudget].
    ///
    /// # Errors
    /// Returns [Error::InvalidBudgetPeriod] if the month or year is out of range.
    pub fn into_new_budget(self) -> Result<NewBudget, Error> {
        Ok(NewBudget {
            wallet_id: self.wallet_id,
            category_id: self.category_id,
            amount_limit: self.amount_limit,
            period: BudgetPeriod::new(self.month, self.year)?,
        })
    }
}

/// Create the budget table in the database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            wallet_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            amount_limit REAL NOT NULL CHECK (amount_limit > 0),
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            year INTEGER NOT NULL CHECK (year BETWEEN 2023 AND 2100),
            UNIQUE(wallet_id, category_id, month, year),
            FOREIGN KEY(wallet_id) REFERENCES wallet(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Set the limit for a wallet, category and month, replacing any existing limit.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the limit is not greater than zero,
/// - [Error::InvalidWallet] if the wallet does not exist,
/// - [Error::InvalidCategory] if the category does not exist,
/// - [Error::CategoryTypeMismatch] if the category is not an expense category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn upsert_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    if !(new_budget.amount_limit > 0.0 && new_budget.amount_limit.is_finite()) {
        return Err(Error::NonPositiveAmount);
    }

    match get_wallet(new_budget.wallet_id, connection) {
        Ok(_) => {}
        Err(Error::NotFound) => return Err(Error::InvalidWallet(new_budget.wallet_id)),
        Err(error) => return Err(error),
    }

    let category = match get_category(new_budget.category_id, connection) {
        Ok(category) => category,
        Err(Error::NotFound) => return Err(Error::InvalidCategory(Some(new_budget.category_id))),
        Err(error) => return Err(error),
    };

    if category.kind != CategoryKind::Expense {
        return Err(Error::CategoryTypeMismatch);
    }

    connection
        .prepare(
            "INSERT INTO budget (wallet_id, category_id, amount_limit, month, year)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(wallet_id, category_id, month, year)
             DO UPDATE SET amount_limit = excluded.amount_limit
             RETURNING id, wallet_id, category_id, amount_limit, month, year",
        )?
        .query_row(
            (
                new_budget.wallet_id,
                new_budget.category_id,
                new_budget.amount_limit,
                new_budget.period.month as u8,
                new_budget.period.year,
            ),
            map_budget_row,
        )
        .map_err(Error::from)
}

/// Retrieve the budgets for `period` in the order they were first set.
pub fn get_budgets_for_period(
    period: BudgetPeriod,
    connection: &Connection,
) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, wallet_id, category_id, amount_limit, month, year FROM budget
             WHERE month = ?1 AND year = ?2 ORDER BY id ASC",
        )?
        .query_map((period.month as u8, period.year), map_budget_row)?
        .map(|budget_result| budget_result.map_err(Error::from))
        .collect()
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let wallet_id = row.get(1)?;
    let category_id = row.get(2)?;
    let amount_limit = row.get(3)?;
    let month: u8 = row.get(4)?;
    let year = row.get(5)?;

    let period = BudgetPeriod::new(month, year).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(error))
    })?;

    Ok(Budget {
        id,
        wallet_id,
        category_id,
        amount_limit,
        period,
    })
}

#[cfg(test)]
mod budget_period_tests {
    use time::{Month, macros::date};

    use crate::{Error, budget::BudgetPeriod};

    #[test]
    fn accepts_months_and_supported_years() {
        let period = BudgetPeriod::new(2, 2025).unwrap();

        assert_eq!(period.month(), Month::February);
        assert_eq!(period.year(), 2025);
        assert_eq!(period.to_string(), "February 2025");
    }

    #[test]
    fn rejects_out_of_range_values() {
        for (month, year) in [(0, 2025), (13, 2025), (1, 2022), (1, 2101)] {
            assert_eq!(
                BudgetPeriod::new(month, year),
                Err(Error::InvalidBudgetPeriod { month, year })
            );
        }
    }

    #[test]
    fn date_range_covers_whole_month() {
        let period = BudgetPeriod::new(2, 2024).unwrap();

        assert_eq!(
            period.date_range(),
            Ok((date!(2024 - 02 - 01), date!(2024 - 02 - 29)))
        );
    }

    #[test]
    fn contains_only_dates_in_month() {
        let period = BudgetPeriod::new(3, 2025).unwrap();

        assert!(period.contains(date!(2025 - 03 - 01)));
        assert!(period.contains(date!(2025 - 03 - 31)));
        assert!(!period.contains(date!(2025 - 04 - 01)));
        assert!(!period.contains(date!(2024 - 03 - 15)));
    }

    #[test]
    fn previous_and_next_cross_year_boundaries() {
        let january = BudgetPeriod::new(1, 2025).unwrap();

        assert_eq!(january.previous(), Some(BudgetPeriod::new(12, 2024).unwrap()));
        assert_eq!(
            BudgetPeriod::new(12, 2025).unwrap().next(),
            Some(BudgetPeriod::new(1, 2026).unwrap())
        );
        assert_eq!(BudgetPeriod::new(1, 2023).unwrap().previous(), None);
        assert_eq!(BudgetPeriod::new(12, 2100).unwrap().next(), None);
    }
}

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        budget::{BudgetPeriod, NewBudget, get_budgets_for_period, upsert_budget},
        category::{CategoryKind, get_categories_by_kind},
        db::initialize,
        wallet::{Currency, NewWallet, WalletKind, WalletName, create_wallet, delete_wallet},
    };

    fn get_test_connection() -> Connection {
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

        connection
    }

    fn expense_category_id(connection: &Connection) -> i64 {
        get_categories_by_kind(CategoryKind::Expense, connection).unwrap()[0].id
    }

    #[test]
    fn upsert_creates_then_replaces_limit() {
        let connection = get_test_connection();
        let category_id = expense_category_id(&connection);
        let period = BudgetPeriod::new(3, 2025).unwrap();
        let new_budget = NewBudget {
            wallet_id: 1,
            category_id,
            amount_limit: 500_000.0,
            period,
        };

        let first = upsert_budget(new_budget.clone(), &connection).unwrap();
        let second = upsert_budget(
            NewBudget {
                amount_limit: 750_000.0,
                ..new_budget
            },
            &connection,
        )
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.amount_limit, 750_000.0);
        let budgets = get_budgets_for_period(period, &connection).unwrap();
        assert_eq!(budgets, vec![second]);
    }

    #[test]
    fn budgets_are_separate_per_month() {
        let connection = get_test_connection();
        let category_id = expense_category_id(&connection);
        let march = BudgetPeriod::new(3, 2025).unwrap();
        let april = BudgetPeriod::new(4, 2025).unwrap();

        for period in [march, april] {
            upsert_budget(
                NewBudget {
                    wallet_id: 1,
                    category_id,
                    amount_limit: 100.0,
                    period,
                },
                &connection,
            )
            .unwrap();
        }

        assert_eq!(get_budgets_for_period(march, &connection).unwrap().len(), 1);
        assert_eq!(get_budgets_for_period(april, &connection).unwrap().len(), 1);
    }

    #[test]
    fn rejects_non_positive_limit() {
        let connection = get_test_connection();
        let category_id = expense_category_id(&connection);

        for amount_limit in [0.0, -10.0, f64::NAN] {
            let result = upsert_budget(
                NewBudget {
                    wallet_id: 1,
                    category_id,
                    amount_limit,
                    period: BudgetPeriod::new(3, 2025).unwrap(),
                },
                &connection,
            );

            assert_eq!(result, Err(Error::NonPositiveAmount));
        }
    }

    #[test]
    fn rejects_income_category() {
        let connection = get_test_connection();
        let income_id = get_categories_by_kind(CategoryKind::Income, &connection).unwrap()[0].id;

        let result = upsert_budget(
            NewBudget {
                wallet_id: 1,
                category_id: income_id,
                amount_limit: 100.0,
                period: BudgetPeriod::new(3, 2025).unwrap(),
            },
            &connection,
        );

        assert_eq!(result, Err(Error::CategoryTypeMismatch));
    }

    #[test]
    fn rejects_missing_wallet_and_category() {
        let connection = get_test_connection();
        let category_id = expense_category_id(&connection);
        let period = BudgetPeriod::new(3, 2025).unwrap();

        assert_eq!(
            upsert_budget(
                NewBudget {
                    wallet_id: 42,
                    category_id,
                    amount_limit: 100.0,
                    period,
                },
                &connection,
            ),
            Err(Error::InvalidWallet(42))
        );
        assert_eq!(
            upsert_budget(
                NewBudget {
                    wallet_id: 1,
                    category_id: 999,
                    amount_limit: 100.0,
                    period,
                },
                &connection,
            ),
            Err(Error::InvalidCategory(Some(999)))
        );
    }

    #[test]
    fn deleting_wallet_removes_its_budgets() {
        let connection = get_test_connection();
        let category_id = expense_category_id(&connection);
        let period = BudgetPeriod::new(3, 2025).unwrap();
        upsert_budget(
            NewBudget {
                wallet_id: 1,
                category_id,
                amount_limit: 100.0,
                period,
            },
            &connection,
        )
        .unwrap();

        delete_wallet(1, &connection).unwrap();

        assert!(get_budgets_for_period(period, &connection).unwrap().is_empty());
    }
}
