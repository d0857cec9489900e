//! Defines the endpoint for deleting a wallet.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{AppState, Error, alert::Alert, database_id::WalletId, wallet::delete_wallet};

/// The state needed to delete a wallet.
#[derive(Debug, Clone)]
pub struct DeleteWalletState {
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteWalletState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a wallet, responds with an alert.
pub async fn delete_wallet_endpoint(
    State(state): State<DeleteWalletState>,
    Path(wallet_id): Path<WalletId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_wallet(wallet_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => Alert::Success {
            message: "Wallet deleted".to_owned(),
            details: "Its transactions and budgets were deleted too.".to_owned(),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Could not delete wallet {wallet_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::{CategoryKind, get_categories_by_kind},
        db::initialize,
        transaction::{Transaction, TransactionType, create_transaction, get_transaction},
        wallet::{
            Currency, NewWallet, WalletKind, WalletName, create_wallet, delete::DeleteWalletState,
            delete_wallet_endpoint, get_wallet,
        },
    };

    fn get_state() -> DeleteWalletState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        DeleteWalletState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn deletes_wallet_and_its_transactions() {
        let state = get_state();
        let (wallet_id, transaction_id) = {
            let connection = state.db_connection.lock().unwrap();
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
            let category = get_categories_by_kind(CategoryKind::Expense, &connection).unwrap()[0]
                .clone();
            let transaction = create_transaction(
                Transaction::build(wallet.id, TransactionType::Expense, 10.0, date!(2025 - 01 - 10))
                    .category_id(Some(category.id)),
                &connection,
            )
            .unwrap();
            (wallet.id, transaction.id)
        };

        let response = delete_wallet_endpoint(State(state.clone()), Path(wallet_id)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_wallet(wallet_id, &connection), Err(Error::NotFound));
        assert_eq!(
            get_transaction(transaction_id, &connection),
            Err(Error::NotFound)
        );
    }

    #[tokio::test]
    async fn missing_wallet_returns_not_found() {
        let response = delete_wallet_endpoint(State(get_state()), Path(99)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
