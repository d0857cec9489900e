//! Database operations for categories.

use std::collections::HashMap;

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryKind, CategoryName, Emoji},
    database_id::CategoryId,
    db::get_parsed,
};

/// The categories every database starts with.
const DEFAULT_CATEGORIES: [(&str, &str, CategoryKind); 9] = [
    ("Food & Drinks", "🍜", CategoryKind::Expense),
    ("Transport", "🚌", CategoryKind::Expense),
    ("Bills", "💡", CategoryKind::Expense),
    ("Entertainment", "🎮", CategoryKind::Expense),
    ("Health", "💊", CategoryKind::Expense),
    ("Education", "📚", CategoryKind::Expense),
    ("Salary", "💼", CategoryKind::Income),
    ("Freelance", "🧑‍💻", CategoryKind::Income),
    ("Business", "🏪", CategoryKind::Income),
];

const SELECT_CATEGORY: &str = "SELECT id, name, kind, emoji, is_default FROM category";

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
            emoji TEXT,
            is_default INTEGER NOT NULL DEFAULT 0,
            UNIQUE(name, kind)
        );

        CREATE INDEX IF NOT EXISTS idx_category_kind ON category(kind);",
    )?;

    Ok(())
}

/// Add the default categories, skipping any that already exist.
pub fn insert_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut statement = connection.prepare(
        "INSERT OR IGNORE INTO category (name, kind, emoji, is_default) VALUES (?1, ?2, ?3, 1)",
    )?;

    for (name, emoji, kind) in DEFAULT_CATEGORIES {
        statement.execute((name, kind.as_str(), emoji))?;
    }

    Ok(())
}

/// Create a user category and return it with its generated ID.
///
/// # Errors
/// Returns [Error::DuplicateCategoryName] if a category of the same kind
/// already has `name`.
pub fn create_category(
    name: CategoryName,
    emoji: Emoji,
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(
            "INSERT INTO category (name, kind, emoji, is_default) VALUES (?1, ?2, ?3, 0)
             RETURNING id, name, kind, emoji, is_default",
        )?
        .query_row((name.as_ref(), kind.as_str(), emoji.as_ref()), map_row)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_string()),
            error => error.into(),
        })
}

/// Retrieve a single category by ID.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare(&format!("{SELECT_CATEGORY} WHERE id = :id;"))?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| error.into())
}

/// Retrieve all categories, default categories first and then by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CATEGORY} ORDER BY is_default DESC, name ASC;"
        ))?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the categories of one kind, default categories first and then by name.
pub fn get_categories_by_kind(
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CATEGORY} WHERE kind = ?1 ORDER BY is_default DESC, name ASC;"
        ))?
        .query_map([kind.as_str()], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Change a user category's name and emoji.
///
/// # Errors
/// Returns [Error::UpdateMissingCategory] if the category does not exist,
/// [Error::DefaultCategoryLocked] for default categories and
/// [Error::DuplicateCategoryName] if the new name is taken.
pub fn update_category(
    category_id: CategoryId,
    name: CategoryName,
    emoji: Emoji,
    connection: &Connection,
) -> Result<(), Error> {
    match is_default_category(category_id, connection) {
        Ok(true) => return Err(Error::DefaultCategoryLocked),
        Ok(false) => {}
        Err(Error::NotFound) => return Err(Error::UpdateMissingCategory),
        Err(error) => return Err(error),
    }

    connection
        .execute(
            "UPDATE category SET name = ?1, emoji = ?2 WHERE id = ?3",
            (name.as_ref(), emoji.as_ref(), category_id),
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategoryName(name.to_string()),
            error => error.into(),
        })?;

    Ok(())
}

/// Delete a user category and the budgets set for it.
///
/// # Errors
/// Returns [Error::DeleteMissingCategory] if the category does not exist,
/// [Error::DefaultCategoryLocked] for default categories and
/// [Error::CategoryInUse] if any transaction refers to the category.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    match is_default_category(category_id, connection) {
        Ok(true) => return Err(Error::DefaultCategoryLocked),
        Ok(false) => {}
        Err(Error::NotFound) => return Err(Error::DeleteMissingCategory),
        Err(error) => return Err(error),
    }

    let transaction_count: i64 = connection.query_row(
        "SELECT COUNT(1) FROM \"transaction\" WHERE category_id = ?1",
        [category_id],
        |row| row.get(0),
    )?;

    if transaction_count > 0 {
        return Err(Error::CategoryInUse);
    }

    // Budgets are removed by the foreign key cascade.
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

/// Count the transactions for each category that has any.
pub fn count_transactions_per_category(
    connection: &Connection,
) -> Result<HashMap<CategoryId, u32>, Error> {
    let result: Result<HashMap<CategoryId, u32>, rusqlite::Error> = connection
        .prepare(
            "SELECT category_id, COUNT(1) FROM \"transaction\"
            WHERE category_id IS NOT NULL GROUP BY category_id",
        )?
        .query_map((), |row| {
            let category_id = row.get(0)?;
            let count = row.get(1)?;

            Ok((category_id, count))
        })?
        .collect();

    result.map_err(Error::from)
}

fn is_default_category(category_id: CategoryId, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT is_default FROM category WHERE id = ?1",
            [category_id],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let kind = get_parsed(row, 2)?;
    let emoji = Emoji::from_stored(row.get(3)?);
    let is_default = row.get(4)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        kind,
        emoji,
        is_default,
    })
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        budget::{BudgetPeriod, NewBudget, get_budgets_for_period, upsert_budget},
        category::{
            CategoryKind, CategoryName, Emoji, create_category, delete_category,
            get_all_categories, get_categories_by_kind, get_category, update_category,
        },
        db::initialize,
        transaction::{Transaction, TransactionType, create_transaction},
        wallet::{Currency, NewWallet, WalletKind, WalletName, create_wallet},
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    fn create_test_category(connection: &Connection) -> crate::category::Category {
        create_category(
            CategoryName::new_unchecked("Groceries"),
            Emoji::new("🛒").unwrap(),
            CategoryKind::Expense,
            connection,
        )
        .expect("Could not create test category")
    }

    #[test]
    fn defaults_are_seeded() {
        let connection = get_test_connection();

        let expense = get_categories_by_kind(CategoryKind::Expense, &connection).unwrap();
        let income = get_categories_by_kind(CategoryKind::Income, &connection).unwrap();

        assert_eq!(expense.len(), 6);
        assert_eq!(income.len(), 3);
        assert!(expense.iter().chain(&income).all(|category| category.is_default));
        let names: Vec<&str> = income.iter().map(|category| category.name.as_ref()).collect();
        assert_eq!(names, ["Business", "Freelance", "Salary"]);
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_connection();

        let category = create_test_category(&connection);

        assert!(category.id > 0);
        assert!(!category.is_default);
        assert_eq!(get_category(category.id, &connection), Ok(category));
    }

    #[test]
    fn create_category_fails_on_duplicate_name_and_kind() {
        let connection = get_test_connection();

        let result = create_category(
            CategoryName::new_unchecked("Salary"),
            Emoji::default(),
            CategoryKind::Income,
            &connection,
        );

        assert_eq!(result, Err(Error::DuplicateCategoryName("Salary".to_owned())));
    }

    #[test]
    fn same_name_is_allowed_for_different_kinds() {
        let connection = get_test_connection();

        let result = create_category(
            CategoryName::new_unchecked("Salary"),
            Emoji::default(),
            CategoryKind::Expense,
            &connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn all_categories_lists_defaults_first() {
        let connection = get_test_connection();
        let category = create_category(
            CategoryName::new_unchecked("Aardvark food"),
            Emoji::default(),
            CategoryKind::Expense,
            &connection,
        )
        .unwrap();

        let categories = get_all_categories(&connection).unwrap();

        assert_eq!(categories.len(), 10);
        assert_eq!(categories.last(), Some(&category));
    }

    #[test]
    fn get_category_with_invalid_id_returns_not_found() {
        let connection = get_test_connection();

        assert_eq!(get_category(999, &connection), Err(Error::NotFound));
    }

    #[test]
    fn update_category_succeeds() {
        let connection = get_test_connection();
        let category = create_test_category(&connection);

        update_category(
            category.id,
            CategoryName::new_unchecked("Supermarket"),
            Emoji::new("🥦").unwrap(),
            &connection,
        )
        .unwrap();

        let updated = get_category(category.id, &connection).unwrap();
        assert_eq!(updated.name.as_ref(), "Supermarket");
        assert_eq!(updated.emoji.as_ref(), "🥦");
        assert_eq!(updated.kind, CategoryKind::Expense);
    }

    #[test]
    fn update_default_category_fails() {
        let connection = get_test_connection();
        let salary = get_categories_by_kind(CategoryKind::Income, &connection).unwrap()[2].clone();

        let result = update_category(
            salary.id,
            CategoryName::new_unchecked("Wages"),
            Emoji::default(),
            &connection,
        );

        assert_eq!(result, Err(Error::DefaultCategoryLocked));
    }

    #[test]
    fn update_missing_category_fails() {
        let connection = get_test_connection();

        let result = update_category(
            999,
            CategoryName::new_unchecked("Wages"),
            Emoji::default(),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingCategory));
    }

    #[test]
    fn delete_default_category_fails() {
        let connection = get_test_connection();
        let bills = get_categories_by_kind(CategoryKind::Expense, &connection).unwrap()[0].clone();

        assert_eq!(
            delete_category(bills.id, &connection),
            Err(Error::DefaultCategoryLocked)
        );
    }

    #[test]
    fn delete_missing_category_fails() {
        let connection = get_test_connection();

        assert_eq!(
            delete_category(999, &connection),
            Err(Error::DeleteMissingCategory)
        );
    }

    #[test]
    fn delete_category_in_use_fails() {
        let connection = get_test_connection();
        let category = create_test_category(&connection);
        let wallet = create_wallet(
            NewWallet {
                name: WalletName::new_unchecked("Cash"),
                currency: Currency::default(),
                balance: 100.0,
                kind: WalletKind::Cash,
                description: None,
            },
            &connection,
        )
        .unwrap();
        create_transaction(
            Transaction::build(wallet.id, TransactionType::Expense, 10.0, date!(2025 - 03 - 01))
                .category_id(Some(category.id)),
            &connection,
        )
        .unwrap();

        assert_eq!(
            delete_category(category.id, &connection),
            Err(Error::CategoryInUse)
        );
    }

    #[test]
    fn delete_category_removes_its_budgets() {
        let connection = get_test_connection();
        let category = create_test_category(&connection);
        let wallet = create_wallet(
            NewWallet {
                name: WalletName::new_unchecked("Cash"),
                currency: Currency::default(),
                balance: 100.0,
                kind: WalletKind::Cash,
                description: None,
            },
            &connection,
        )
        .unwrap();
        let period = BudgetPeriod::new(3, 2025).unwrap();
        upsert_budget(
            NewBudget {
                wallet_id: wallet.id,
                category_id: category.id,
                amount_limit: 500_000.0,
                period,
            },
            &connection,
        )
        .unwrap();

        delete_category(category.id, &connection).unwrap();

        assert_eq!(get_category(category.id, &connection), Err(Error::NotFound));
        assert!(get_budgets_for_period(period, &connection).unwrap().is_empty());
    }
}
