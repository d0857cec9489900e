//! Database schema setup.

use std::str::FromStr;

use rusqlite::{Connection, Row, types::Type};

use crate::{
    Error,
    budget::create_budget_table,
    category::{create_category_table, insert_default_categories},
    transaction::create_transaction_table,
    wallet::create_wallet_table,
};

/// Create the tables for all domain models and add the default categories.
///
/// Safe to call on an existing database, tables that already exist are left alone.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Needed for the cascading deletes from wallets and categories.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = connection.unchecked_transaction()?;

    create_wallet_table(&transaction)?;
    create_category_table(&transaction)?;
    create_transaction_table(&transaction)?;
    create_budget_table(&transaction)?;
    insert_default_categories(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Read a text column and parse it with [FromStr], e.g. for enums stored as strings.
pub(crate) fn get_parsed<T>(row: &Row, index: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text: String = row.get(index)?;

    text.parse()
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(error)))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn initialize_is_idempotent() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).expect("first initialize failed");
        initialize(&connection).expect("second initialize failed");

        let default_count: i64 = connection
            .query_row(
                "SELECT COUNT(*) FROM category WHERE is_default = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(default_count, 9);
    }

    #[test]
    fn enables_foreign_keys() {
        let connection = Connection::open_in_memory().unwrap();

        initialize(&connection).unwrap();

        let enabled: i64 = connection
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
