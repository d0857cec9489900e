//! Defines the endpoint for deleting a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, Error, alert::Alert, database_id::TransactionId, transaction::delete_transaction,
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction, responds with an alert.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, &connection) {
        // The status code has to be 200 OK or HTMX will not delete the table row.
        Ok(()) => Alert::SuccessSimple {
            message: "Transaction deleted".to_owned(),
        }
        .into_response(),
        Err(Error::DeleteMissingTransaction) => {
            Error::DeleteMissingTransaction.into_alert_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
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
        db::initialize,
        transaction::{
            Transaction, TransactionType, create_transaction, delete::DeleteTransactionState,
            delete_transaction_endpoint, get_transaction,
        },
        wallet::{Currency, NewWallet, WalletKind, WalletName, create_wallet, get_wallet},
    };

    fn get_state() -> DeleteTransactionState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        DeleteTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn can_delete_transaction() {
        let state = get_state();
        {
            let connection = state.db_connection.lock().unwrap();
            let wallet = create_wallet(
                NewWallet {
                    name: WalletName::new_unchecked("Cash"),
                    currency: Currency::default(),
                    balance: 50.0,
                    kind: WalletKind::Cash,
                    description: None,
                },
                &connection,
            )
            .unwrap();
            create_transaction(
                Transaction::build(wallet.id, TransactionType::Income, 25.0, date!(2025 - 02 - 01)),
                &connection,
            )
            .unwrap();
        }

        let response = delete_transaction_endpoint(State(state.clone()), Path(1)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_transaction(1, &connection), Err(Error::NotFound));
        assert_eq!(get_wallet(1, &connection).unwrap().balance, 50.0);
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let response = delete_transaction_endpoint(State(get_state()), Path(1)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
