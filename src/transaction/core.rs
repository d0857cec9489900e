//! Defines the core data models and database queries for transactions.
//!
//! Every write keeps the balance of the affected wallets in step with the
//! transactions recorded against them.

use std::str::FromStr;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    category::{CategoryKind, get_category},
    database_id::{CategoryId, TransactionId, WalletId},
    db::get_parsed,
    wallet::{adjust_wallet_balance, get_wallet},
};

/// The maximum number of characters in a transaction description.
pub const MAX_DESCRIPTION_LENGTH: usize = 160;

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned.
    Income,
    /// Money spent.
    #[default]
    Expense,
}

impl TransactionType {
    /// The value stored in the database and sent in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// The kind of category that transactions of this type must use.
    pub fn category_kind(&self) -> CategoryKind {
        match self {
            TransactionType::Income => CategoryKind::Income,
            TransactionType::Expense => CategoryKind::Expense,
        }
    }
}

/// Returned when a string is not a transaction type.
#[derive(Debug, thiserror::Error)]
#[error("unknown transaction type \"{0}\"")]
pub struct UnknownTransactionType(String);

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(UnknownTransactionType(other.to_owned())),
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// The amount is always positive, `type_` says which way the money went.
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The wallet the money came out of or went into.
    pub wallet_id: WalletId,
    /// The category of the transaction, e.g. "Food & Drinks" or "Salary".
    pub category_id: Option<CategoryId>,
    /// Whether this is income or an expense.
    pub type_: TransactionType,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// A text description of what the transaction was for.
    pub description: String,
    /// When the transaction happened.
    pub date: Date,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        wallet_id: WalletId,
        type_: TransactionType,
        amount: f64,
        date: Date,
    ) -> TransactionBuilder {
        TransactionBuilder {
            wallet_id,
            category_id: None,
            type_,
            amount,
            description: String::new(),
            date,
        }
    }

    /// The signed change this transaction makes to its wallet's balance.
    pub fn balance_effect(&self) -> f64 {
        balance_effect(self.type_, self.amount)
    }
}

/// A builder for creating [Transaction] instances.
///
/// ```ignore
/// use time::macros::date;
///
/// use crate::transaction::{Transaction, TransactionType};
///
/// let lunch = Transaction::build(1, TransactionType::Expense, 45_000.0, date!(2025-01-15))
///     .category_id(Some(3))
///     .description("Nasi goreng");
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The wallet the money came out of or went into.
    pub wallet_id: WalletId,
    /// The category, which must be of the same kind as `type_`.
    pub category_id: Option<CategoryId>,
    /// Whether this is income or an expense.
    pub type_: TransactionType,
    /// The amount of money, must be greater than zero.
    pub amount: f64,
    /// At most [MAX_DESCRIPTION_LENGTH] characters.
    pub description: String,
    /// When the money moved, not when it was recorded.
    pub date: Date,
}

impl TransactionBuilder {
    /// Set the category for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.trim().to_owned();
        self
    }
}

/// `+amount` for income and `-amount` for expenses.
pub fn balance_effect(type_: TransactionType, amount: f64) -> f64 {
    match type_ {
        TransactionType::Income => amount,
        TransactionType::Expense => -amount,
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const SELECT_TRANSACTION: &str =
    "SELECT id, wallet_id, category_id, type, amount, description, date FROM \"transaction\"";

/// Create a new transaction in the database from a builder and apply it to
/// the wallet's balance.
///
/// # Errors
/// This function will return a:
/// - [Error::NonPositiveAmount] if the amount is not greater than zero,
/// - [Error::DescriptionTooLong] if the description is too long,
/// - [Error::InvalidWallet] if the wallet does not exist,
/// - [Error::InvalidCategory] if the category does not exist,
/// - [Error::CategoryTypeMismatch] if the category kind does not match the transaction type,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate(&builder, connection)?;

    let db_transaction = connection.unchecked_transaction()?;

    let transaction = db_transaction
        .prepare(
            "INSERT INTO \"transaction\" (wallet_id, category_id, type, amount, description, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, wallet_id, category_id, type, amount, description, date",
        )?
        .query_row(
            (
                builder.wallet_id,
                builder.category_id,
                builder.type_.as_str(),
                builder.amount,
                &builder.description,
                builder.date,
            ),
            map_transaction_row,
        )?;

    adjust_wallet_balance(
        transaction.wallet_id,
        transaction.balance_effect(),
        &db_transaction,
    )?;

    db_transaction.commit()?;

    Ok(transaction)
}

/// Replace the transaction `id` with the contents of `builder`.
///
/// The old amount is taken off the old wallet and the new amount applied to
/// the new wallet, so moving a transaction between wallets keeps both
/// balances correct.
///
/// # Errors
/// Returns [Error::UpdateMissingTransaction] if there is no transaction with
/// `id`, otherwise the same errors as [create_transaction].
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    validate(&builder, connection)?;

    let db_transaction = connection.unchecked_transaction()?;

    let old_transaction = match get_transaction(id, &db_transaction) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Err(Error::UpdateMissingTransaction),
        Err(error) => return Err(error),
    };

    adjust_wallet_balance(
        old_transaction.wallet_id,
        -old_transaction.balance_effect(),
        &db_transaction,
    )?;

    let transaction = db_transaction
        .prepare(
            "UPDATE \"transaction\"
             SET wallet_id = ?1, category_id = ?2, type = ?3, amount = ?4, description = ?5, date = ?6
             WHERE id = ?7
             RETURNING id, wallet_id, category_id, type, amount, description, date",
        )?
        .query_row(
            (
                builder.wallet_id,
                builder.category_id,
                builder.type_.as_str(),
                builder.amount,
                &builder.description,
                builder.date,
                id,
            ),
            map_transaction_row,
        )?;

    adjust_wallet_balance(
        transaction.wallet_id,
        transaction.balance_effect(),
        &db_transaction,
    )?;

    db_transaction.commit()?;

    Ok(transaction)
}

/// Delete a transaction and revert its effect on the wallet balance.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if there is no transaction with `id`.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let db_transaction = connection.unchecked_transaction()?;

    let transaction = match get_transaction(id, &db_transaction) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Err(Error::DeleteMissingTransaction),
        Err(error) => return Err(error),
    };

    db_transaction.execute("DELETE FROM \"transaction\" WHERE id = ?1", [id])?;

    adjust_wallet_balance(
        transaction.wallet_id,
        -transaction.balance_effect(),
        &db_transaction,
    )?;

    db_transaction.commit()?;

    Ok(())
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!("{SELECT_TRANSACTION} WHERE id = :id"))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all transactions, newest first.
///
/// Transactions on the same date are ordered by newest ID first.
pub fn get_all_transactions(connection: &Connection) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!("{SELECT_TRANSACTION} ORDER BY date DESC, id DESC"))?
        .query_map([], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Retrieve the transactions dated from `start` to `end` inclusive, newest first.
pub fn get_transactions_in_date_range(
    start: Date,
    end: Date,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_TRANSACTION} WHERE date BETWEEN ?1 AND ?2 ORDER BY date DESC, id DESC"
        ))?
        .query_map((start, end), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

fn validate(builder: &TransactionBuilder, connection: &Connection) -> Result<(), Error> {
    if !(builder.amount > 0.0 && builder.amount.is_finite()) {
        return Err(Error::NonPositiveAmount);
    }

    if builder.description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(Error::DescriptionTooLong(MAX_DESCRIPTION_LENGTH));
    }

    match get_wallet(builder.wallet_id, connection) {
        Ok(_) => {}
        Err(Error::NotFound) => return Err(Error::InvalidWallet(builder.wallet_id)),
        Err(error) => return Err(error),
    }

    if let Some(category_id) = builder.category_id {
        let category = match get_category(category_id, connection) {
            Ok(category) => category,
            Err(Error::NotFound) => return Err(Error::InvalidCategory(Some(category_id))),
            Err(error) => return Err(error),
        };

        if category.kind != builder.type_.category_kind() {
            return Err(Error::CategoryTypeMismatch);
        }
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            wallet_id INTEGER NOT NULL,
            category_id INTEGER,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            amount REAL NOT NULL CHECK (amount > 0),
            description TEXT NOT NULL DEFAULT '',
            date TEXT NOT NULL,
            FOREIGN KEY(wallet_id) REFERENCES wallet(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);
        CREATE INDEX IF NOT EXISTS idx_transaction_wallet ON \"transaction\"(wallet_id);",
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let wallet_id = row.get(1)?;
    let category_id = row.get(2)?;
    let type_ = get_parsed(row, 3)?;
    let amount = row.get(4)?;
    let description = row.get(5)?;
    let date = row.get(6)?;

    Ok(Transaction {
        id,
        wallet_id,
        category_id,
        type_,
        amount,
        description,
        date,
    })
}

// ============================================================================
// TESTS
// ============================================================================
