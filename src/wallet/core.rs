//! Wallet domain types and database queries.

use std::{fmt::Display, str::FromStr};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::WalletId, db::get_parsed, html::DEFAULT_CURRENCY};

/// The minimum number of characters in a wallet name.
pub const MIN_WALLET_NAME_LENGTH: usize = 3;
/// The maximum number of characters in a wallet description.
pub const MAX_WALLET_DESCRIPTION_LENGTH: usize = 120;

/// What sort of money a wallet holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    /// Physical cash.
    #[default]
    Cash,
    /// A bank account.
    Bank,
    /// A savings account.
    Savings,
}

impl WalletKind {
    /// All wallet kinds in display order.
    pub const ALL: [WalletKind; 3] = [WalletKind::Cash, WalletKind::Bank, WalletKind::Savings];

    /// The value stored in the database and sent in forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletKind::Cash => "cash",
            WalletKind::Bank => "bank",
            WalletKind::Savings => "savings",
        }
    }

    /// The human readable name.
    pub fn label(&self) -> &'static str {
        match self {
            WalletKind::Cash => "Cash",
            WalletKind::Bank => "Bank",
            WalletKind::Savings => "Savings",
        }
    }
}

/// Returned when a string is not one of the wallet kinds.
#[derive(Debug, thiserror::Error)]
#[error("unknown wallet kind \"{0}\"")]
pub struct UnknownWalletKind(String);

impl FromStr for WalletKind {
    type Err = UnknownWalletKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(WalletKind::Cash),
            "bank" => Ok(WalletKind::Bank),
            "savings" => Ok(WalletKind::Savings),
            other => Err(UnknownWalletKind(other.to_owned())),
        }
    }
}

/// A validated wallet name with at least [MIN_WALLET_NAME_LENGTH] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletName(String);

impl WalletName {
    /// Create a wallet name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// Returns [Error::WalletNameTooShort] if the trimmed name is shorter than
    /// [MIN_WALLET_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.chars().count() < MIN_WALLET_NAME_LENGTH {
            Err(Error::WalletNameTooShort(MIN_WALLET_NAME_LENGTH))
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a wallet name without validation.
    ///
    /// The caller should ensure that the name is long enough.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for WalletName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for WalletName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An upper case currency code such as "IDR" or "USD".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency(String);

impl Currency {
    /// Create a currency code from `code`, ignoring surrounding whitespace and case.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCurrency] unless the code is 3 to 5 ASCII letters.
    pub fn new(code: &str) -> Result<Self, Error> {
        let normalized = code.trim().to_ascii_uppercase();

        if (3..=5).contains(&normalized.len())
            && normalized.chars().all(|c| c.is_ascii_alphabetic())
        {
            Ok(Self(normalized))
        } else {
            Err(Error::InvalidCurrency(code.to_owned()))
        }
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self(DEFAULT_CURRENCY.to_owned())
    }
}

impl AsRef<str> for Currency {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Currency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::new(s)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named store of money, e.g. a cash wallet or a bank account.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    /// The ID of the wallet.
    pub id: WalletId,
    /// The unique name of the wallet.
    pub name: WalletName,
    /// The currency of the balance.
    pub currency: Currency,
    /// The running balance, updated by every transaction on the wallet.
    pub balance: f64,
    /// What sort of wallet this is.
    pub kind: WalletKind,
    /// Optional notes about the wallet.
    pub description: Option<String>,
}

/// The data needed to create a wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWallet {
    /// The unique name of the wallet.
    pub name: WalletName,
    /// The currency of the balance.
    pub currency: Currency,
    /// The starting balance, must not be negative.
    pub balance: f64,
    /// What sort of wallet this is.
    pub kind: WalletKind,
    /// Optional notes, at most [MAX_WALLET_DESCRIPTION_LENGTH] characters.
    pub description: Option<String>,
}

/// Create the wallet table in the database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_wallet_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS wallet (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            currency TEXT NOT NULL DEFAULT 'IDR',
            balance REAL NOT NULL DEFAULT 0,
            kind TEXT NOT NULL DEFAULT 'cash' CHECK (kind IN ('cash', 'bank', 'savings')),
            description TEXT,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        (),
    )?;

    Ok(())
}

/// Create a new wallet.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeBalance] if the starting balance is below zero or not finite,
/// - [Error::DescriptionTooLong] if the description is too long,
/// - [Error::DuplicateWalletName] if a wallet with the same name exists,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_wallet(new_wallet: NewWallet, connection: &Connection) -> Result<Wallet, Error> {
    if !(new_wallet.balance.is_finite() && new_wallet.balance >= 0.0) {
        return Err(Error::NegativeBalance);
    }

    let description = normalize_description(new_wallet.description)?;

    connection
        .prepare(
            "INSERT INTO wallet (name, currency, balance, kind, description)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, name, currency, balance, kind, description",
        )?
        .query_row(
            (
                new_wallet.name.as_ref(),
                new_wallet.currency.as_ref(),
                new_wallet.balance,
                new_wallet.kind.as_str(),
                description,
            ),
            map_wallet_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateWalletName(new_wallet.name.to_string()),
            error => error.into(),
        })
}

fn normalize_description(description: Option<String>) -> Result<Option<String>, Error> {
    let Some(description) = description else {
        return Ok(None);
    };

    let description = description.trim();

    if description.is_empty() {
        Ok(None)
    } else if description.chars().count() > MAX_WALLET_DESCRIPTION_LENGTH {
        Err(Error::DescriptionTooLong(MAX_WALLET_DESCRIPTION_LENGTH))
    } else {
        Ok(Some(description.to_owned()))
    }
}

/// Retrieve a wallet by its `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a wallet.
pub fn get_wallet(id: WalletId, connection: &Connection) -> Result<Wallet, Error> {
    connection
        .prepare(
            "SELECT id, name, currency, balance, kind, description FROM wallet WHERE id = :id",
        )?
        .query_row(&[(":id", &id)], map_wallet_row)
        .map_err(Error::from)
}

/// Retrieve all wallets in the order they were created.
pub fn get_all_wallets(connection: &Connection) -> Result<Vec<Wallet>, Error> {
    connection
        .prepare("SELECT id, name, currency, balance, kind, description FROM wallet ORDER BY id ASC")?
        .query_map([], map_wallet_row)?
        .map(|wallet_result| wallet_result.map_err(Error::from))
        .collect()
}

/// Get the total balance across all wallets.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_total_balance(connection: &Connection) -> Result<f64, Error> {
    let total = connection.query_row("SELECT COALESCE(SUM(balance), 0) FROM wallet", [], |row| {
        row.get(0)
    })?;

    Ok(total)
}

/// Add `delta` to the balance of the wallet `id`.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a wallet.
pub fn adjust_wallet_balance(id: WalletId, delta: f64, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE wallet SET balance = balance + ?1 WHERE id = ?2",
        (delta, id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Delete the wallet `id` along with its transactions and budgets.
///
/// # Errors
/// Returns [Error::DeleteMissingWallet] if `id` does not refer to a wallet.
pub fn delete_wallet(id: WalletId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM wallet WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingWallet);
    }

    Ok(())
}

/// Map a database row to a [Wallet].
pub fn map_wallet_row(row: &Row) -> Result<Wallet, rusqlite::Error> {
    let id = row.get(0)?;
    let name: String = row.get(1)?;
    let currency: String = row.get(2)?;
    let balance = row.get(3)?;
    let kind = get_parsed(row, 4)?;
    let description = row.get(5)?;

    Ok(Wallet {
        id,
        name: WalletName::new_unchecked(&name),
        currency: Currency(currency),
        balance,
        kind,
        description,
    })
}

#[cfg(test)]
mod wallet_name_tests {
    use crate::{
        Error,
        wallet::{Currency, WalletName},
    };

    #[test]
    fn new_fails_on_short_name() {
        assert_eq!(WalletName::new(" ab "), Err(Error::WalletNameTooShort(3)));
    }

    #[test]
    fn new_trims_whitespace() {
        let name = WalletName::new("  Main wallet\n").unwrap();

        assert_eq!(name.as_ref(), "Main wallet");
    }

    #[test]
    fn currency_is_upper_cased() {
        assert_eq!(Currency::new(" usd ").unwrap().as_ref(), "USD");
    }

    #[test]
    fn currency_rejects_digits_and_short_codes() {
        assert_eq!(
            Currency::new("US1"),
            Err(Error::InvalidCurrency("US1".to_owned()))
        );
        assert_eq!(
            Currency::new("RP"),
            Err(Error::InvalidCurrency("RP".to_owned()))
        );
    }
}
