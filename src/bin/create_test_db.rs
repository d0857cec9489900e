use std::collections::HashMap;
use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use dompet_rs::{
    BudgetPeriod, CategoryKind, Currency, NewBudget, NewWallet, Transaction, TransactionType,
    WalletKind, WalletName, create_transaction, create_wallet, get_categories_by_kind,
    initialize_db, upsert_budget,
};

/// A utility for creating a demo database for the dompet_rs server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// How many days of transactions to generate, ending today.
const DAYS_OF_HISTORY: i64 = 180;

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating wallets...");
    let cash = create_wallet(
        NewWallet {
            name: WalletName::new("Cash")?,
            currency: Currency::default(),
            balance: 1_500_000.0,
            kind: WalletKind::Cash,
            description: Some("Pocket money".to_owned()),
        },
        &conn,
    )?;
    let bank = create_wallet(
        NewWallet {
            name: WalletName::new("BCA")?,
            currency: Currency::default(),
            balance: 12_000_000.0,
            kind: WalletKind::Bank,
            description: None,
        },
        &conn,
    )?;
    create_wallet(
        NewWallet {
            name: WalletName::new("Emergency Fund")?,
            currency: Currency::default(),
            balance: 25_000_000.0,
            kind: WalletKind::Savings,
            description: Some("Six months of expenses".to_owned()),
        },
        &conn,
    )?;

    let category_ids: HashMap<String, i64> = get_categories_by_kind(CategoryKind::Income, &conn)?
        .into_iter()
        .chain(get_categories_by_kind(CategoryKind::Expense, &conn)?)
        .map(|category| (category.name.to_string(), category.id))
        .collect();
    let category = |name: &str| {
        category_ids
            .get(name)
            .copied()
            .ok_or_else(|| format!("missing default category {name}"))
    };

    println!("Creating transactions...");
    let today = OffsetDateTime::now_utc().date();
    let mut count = 0;

    for days_ago in (0..DAYS_OF_HISTORY).rev() {
        let date = today - Duration::days(days_ago);
        let day = date.day();

        let mut entries = Vec::new();

        if day == 1 {
            entries.push((bank.id, TransactionType::Income, 9_500_000.0, "Salary", "Monthly salary"));
            entries.push((bank.id, TransactionType::Expense, 2_500_000.0, "Bills", "Rent"));
        }
        if day == 15 {
            entries.push((bank.id, TransactionType::Income, 1_750_000.0, "Freelance", "Logo design"));
            entries.push((bank.id, TransactionType::Expense, 450_000.0, "Bills", "Electricity"));
        }
        if day % 3 == 0 {
            entries.push((cash.id, TransactionType::Expense, 35_000.0 + f64::from(day) * 1_000.0, "Food & Drinks", "Lunch"));
        }
        if day % 5 == 0 {
            entries.push((cash.id, TransactionType::Expense, 20_000.0, "Transport", "Ojek"));
        }
        if day % 10 == 0 {
            entries.push((bank.id, TransactionType::Expense, 150_000.0, "Entertainment", "Cinema"));
        }
        if day == 20 {
            entries.push((bank.id, TransactionType::Expense, 300_000.0, "Education", "Online course"));
        }

        for (wallet_id, type_, amount, category_name, description) in entries {
            create_transaction(
                Transaction::build(wallet_id, type_, amount, date)
                    .category_id(Some(category(category_name)?))
                    .description(description),
                &conn,
            )?;
            count += 1;
        }
    }

    println!("Created {count} transactions.");

    println!("Creating budgets...");
    let period = BudgetPeriod::containing(today);

    for (wallet_id, category_name, amount_limit) in [
        (cash.id, "Food & Drinks", 1_200_000.0),
        (cash.id, "Transport", 150_000.0),
        (bank.id, "Bills", 3_000_000.0),
        (bank.id, "Entertainment", 500_000.0),
    ] {
        upsert_budget(
            NewBudget {
                wallet_id,
                category_id: category(category_name)?,
                amount_limit,
                period,
            },
            &conn,
        )?;
    }

    println!("Success!");

    Ok(())
}
