//! The page and endpoint for editing a transaction.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, Query, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    database_id::TransactionId,
    endpoints::{self, format_endpoint},
    html::{FORM_CONTAINER_STYLE, base, submit_button},
    navigation::NavBar,
    timezone::local_today,
    transaction::{
        Transaction,
        form::{TransactionForm, TransactionFormDefaults, transaction_form_fields},
        get_transaction, update_transaction,
    },
    wallet::{Wallet, get_all_wallets},
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Where to send the user after saving, e.g. the filtered transactions page
/// they came from.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

impl RedirectQuery {
    /// The redirect URL if it is a path on this site, otherwise the transactions page.
    fn target(&self) -> String {
        match self.redirect_url.as_deref() {
            Some(url) if is_local_path(url) => url.to_owned(),
            _ => endpoints::TRANSACTIONS_VIEW.to_owned(),
        }
    }
}

/// Whether `url` is an absolute path on this site.
///
/// Browsers read a backslash as a slash, so "/\\host" is as off-site as "//host".
fn is_local_path(url: &str) -> bool {
    let mut chars = url.chars();

    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/' | '\\'))
        && !url.chars().any(|c| c.is_control())
        && url
            .parse::<Uri>()
            .is_ok_and(|uri| uri.scheme().is_none() && uri.authority().is_none())
}

/// Renders the page for editing a transaction.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<RedirectQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = get_transaction(transaction_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
        }
    })?;
    let wallets = get_all_wallets(&connection)
        .inspect_err(|error| tracing::error!("could not get wallets: {error}"))?;
    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let update_url = format_endpoint(endpoints::PUT_TRANSACTION, transaction_id);
    let update_url = match query
        .redirect_url
        .as_deref()
        .map(|url| serde_urlencoded::to_string([("redirect_url", url)]))
    {
        Some(Ok(query_string)) => format!("{update_url}?{query_string}"),
        Some(Err(error)) => {
            tracing::warn!("could not encode redirect URL: {error}");
            update_url
        }
        None => update_url,
    };

    Ok(edit_transaction_view(&transaction, &update_url, today, &wallets, &categories)
        .into_response())
}

/// A route handler for updating a transaction, redirects to `redirect_url` on success.
pub async fn update_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<RedirectQuery>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    if form.date > today {
        return Error::FutureDate(form.date).into_alert_response();
    }

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    if let Err(error) = update_transaction(transaction_id, form.into_builder(), &connection) {
        tracing::error!("Could not update transaction {transaction_id}: {error}");
        return error.into_alert_response();
    }

    (HxRedirect(query.target()), StatusCode::SEE_OTHER).into_response()
}

fn edit_transaction_view(
    transaction: &Transaction,
    update_url: &str,
    today: Date,
    wallets: &[Wallet],
    categories: &[Category],
) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let nav_bar = NavBar::new(&edit_url).into_html();
    let description =
        (!transaction.description.is_empty()).then_some(transaction.description.as_str());

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Edit Transaction" }

                (transaction_form_fields(
                    &TransactionFormDefaults {
                        transaction_type: transaction.type_,
                        wallet_id: Some(transaction.wallet_id),
                        category_id: transaction.category_id,
                        amount: Some(transaction.amount),
                        date: transaction.date,
                        description,
                        max_date: today,
                        autofocus_amount: false,
                    },
                    wallets,
                    categories,
                ))

                (submit_button("Update Transaction"))
            }
        }
    };

    base("Edit Transaction", &[], &content)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::OffsetDateTime;

    use crate::{
        Error,
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_get_form, parse_html_document,
        },
        transaction::{
            Transaction, TransactionType, create_transaction,
            edit::{EditTransactionState, RedirectQuery},
            form::TransactionForm,
            get_edit_transaction_page, get_transaction, update_transaction_endpoint,
        },
        wallet::{Currency, NewWallet, WalletKind, WalletName, create_wallet, get_wallet},
    };

    fn get_state_with_transaction() -> EditTransactionState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let wallet = create_wallet(
            NewWallet {
                name: WalletName::new_unchecked("Cash"),
                currency: Currency::default(),
                balance: 1_000.0,
                kind: WalletKind::Cash,
                description: None,
            },
            &connection,
        )
        .unwrap();
        create_transaction(
            Transaction::build(
                wallet.id,
                TransactionType::Expense,
                100.0,
                OffsetDateTime::now_utc().date(),
            )
            .description("Groceries"),
            &connection,
        )
        .unwrap();

        EditTransactionState {
            db_connection: Arc::new(Mutex::new(connection)),
            local_timezone: "Etc/UTC".to_owned(),
        }
    }

    #[tokio::test]
    async fn edit_page_renders_filled_form() {
        let state = get_state_with_transaction();
        let query = RedirectQuery {
            redirect_url: Some("/transactions?period=all".to_owned()),
        };

        let response = get_edit_transaction_page(State(state), Path(1), Query(query))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            "/api/transactions/1?redirect_url=%2Ftransactions%3Fperiod%3Dall",
            "hx-put",
        );
        assert_form_input_with_value(&form, "amount", "number", "100.00");
    }

    #[tokio::test]
    async fn edit_page_for_missing_transaction_is_not_found() {
        let state = get_state_with_transaction();

        let result =
            get_edit_transaction_page(State(state), Path(99), Query(RedirectQuery::default()))
                .await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn update_changes_transaction_and_balance() {
        let state = get_state_with_transaction();
        let form = TransactionForm {
            type_: TransactionType::Expense,
            wallet_id: 1,
            category_id: None,
            amount: 250.0,
            date: OffsetDateTime::now_utc().date(),
            description: Some("Weekly groceries".to_owned()),
        };
        let query = RedirectQuery {
            redirect_url: Some("/transactions?period=all".to_owned()),
        };

        let response =
            update_transaction_endpoint(State(state.clone()), Path(1), Query(query), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, "/transactions?period=all");
        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(1, &connection).unwrap();
        assert_eq!(transaction.amount, 250.0);
        assert_eq!(transaction.description, "Weekly groceries");
        assert_eq!(get_wallet(1, &connection).unwrap().balance, 750.0);
    }

    #[tokio::test]
    async fn external_redirect_urls_are_ignored() {
        let state = get_state_with_transaction();
        let form = TransactionForm {
            type_: TransactionType::Income,
            wallet_id: 1,
            category_id: None,
            amount: 1.0,
            date: OffsetDateTime::now_utc().date(),
            description: None,
        };
        let query = RedirectQuery {
            redirect_url: Some("https://example.com".to_owned()),
        };

        let response =
            update_transaction_endpoint(State(state), Path(1), Query(query), Form(form)).await;

        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
    }

    #[tokio::test]
    async fn backslash_redirect_urls_are_ignored() {
        for redirect_url in ["/\\evil.example", "//evil.example", "/\tevil.example"] {
            let state = get_state_with_transaction();
            let form = TransactionForm {
                type_: TransactionType::Income,
                wallet_id: 1,
                category_id: None,
                amount: 1.0,
                date: OffsetDateTime::now_utc().date(),
                description: None,
            };
            let query = RedirectQuery {
                redirect_url: Some(redirect_url.to_owned()),
            };

            let response =
                update_transaction_endpoint(State(state), Path(1), Query(query), Form(form)).await;

            assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        }
    }

    #[test]
    fn local_redirect_urls_are_kept() {
        let query = RedirectQuery {
            redirect_url: Some("/transactions?page=2".to_owned()),
        };

        assert_eq!(query.target(), "/transactions?page=2");
    }

    #[tokio::test]
    async fn update_missing_transaction_is_not_found() {
        let state = get_state_with_transaction();
        let form = TransactionForm {
            type_: TransactionType::Income,
            wallet_id: 1,
            category_id: None,
            amount: 1.0,
            date: OffsetDateTime::now_utc().date(),
            description: None,
        };

        let response = update_transaction_endpoint(
            State(state),
            Path(99),
            Query(RedirectQuery::default()),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
