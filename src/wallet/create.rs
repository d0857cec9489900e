//! The page and endpoint for creating a wallet.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, endpoints,
    html::{
        DEFAULT_CURRENCY, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        submit_button,
    },
    navigation::NavBar,
    wallet::{
        Currency, NewWallet, WalletKind, WalletName, create_wallet,
        core::{MAX_WALLET_DESCRIPTION_LENGTH, MIN_WALLET_NAME_LENGTH},
    },
};

/// The state needed to create a wallet.
#[derive(Debug, Clone)]
pub struct CreateWalletState {
    /// The database connection for managing wallets.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateWalletState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a wallet.
#[derive(Debug, Deserialize)]
pub struct WalletForm {
    pub name: String,
    pub currency: String,
    /// The starting balance.
    pub balance: f64,
    #[serde(default)]
    pub kind: WalletKind,
    pub description: Option<String>,
}

/// Renders the page for creating a wallet.
pub async fn get_new_wallet_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_WALLET_VIEW).into_html();
    let form = new_wallet_form_view(None, "");

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Wallet" }
            (form)
        }
    };

    base("New Wallet", &[], &content).into_response()
}

/// A route handler for creating a new wallet, redirects to the wallets view on success.
///
/// Invalid input re-renders the form with an error message.
pub async fn create_wallet_endpoint(
    State(state): State<CreateWalletState>,
    Form(form): Form<WalletForm>,
) -> Response {
    let new_wallet = match parse_form(&form) {
        Ok(new_wallet) => new_wallet,
        Err(error) => {
            return new_wallet_form_view(Some(&form), &format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_wallet(new_wallet, &connection) {
        Ok(wallet) => {
            tracing::info!("Created wallet {} ({})", wallet.name, wallet.id);
            (
                HxRedirect(endpoints::WALLETS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error @ (Error::NegativeBalance | Error::DescriptionTooLong(_))) => {
            new_wallet_form_view(Some(&form), &format!("Error: {error}")).into_response()
        }
        Err(error) => {
            tracing::error!("Could not create wallet with {form:?}: {error}");
            error.into_alert_response()
        }
    }
}

fn parse_form(form: &WalletForm) -> Result<NewWallet, Error> {
    Ok(NewWallet {
        name: WalletName::new(&form.name)?,
        currency: Currency::new(&form.currency)?,
        balance: form.balance,
        kind: form.kind,
        description: form.description.clone(),
    })
}

fn new_wallet_form_view(form: Option<&WalletForm>, error_message: &str) -> Markup {
    let name = form.map(|form| form.name.as_str());
    let currency = form.map_or(DEFAULT_CURRENCY, |form| form.currency.as_str());
    let balance = form.map(|form| form.balance);
    let selected_kind = form.map(|form| form.kind).unwrap_or_default();
    let description = form.and_then(|form| form.description.as_deref());

    html! {
        form
            hx-post=(endpoints::POST_WALLET)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Main wallet"
                    required
                    autofocus
                    minlength=(MIN_WALLET_NAME_LENGTH)
                    value=[name]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                input
                    id="currency"
                    type="text"
                    name="currency"
                    required
                    minlength="3"
                    maxlength="5"
                    value=(currency)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="balance" class=(FORM_LABEL_STYLE) { "Starting balance" }

                input
                    id="balance"
                    type="number"
                    name="balance"
                    step="any"
                    min="0"
                    placeholder="0"
                    required
                    value=[balance]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="kind" class=(FORM_LABEL_STYLE) { "Type" }

                select id="kind" name="kind" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for kind in WalletKind::ALL {
                        option value=(kind.as_str()) selected[kind == selected_kind]
                        {
                            (kind.label())
                        }
                    }
                }
            }

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                textarea
                    id="description"
                    name="description"
                    rows="2"
                    maxlength=(MAX_WALLET_DESCRIPTION_LENGTH)
                    placeholder="Optional"
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    (description.unwrap_or_default())
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            (submit_button("Create Wallet"))
        }
    }
}

#[cfg(test)]
mod new_wallet_page_tests {
    use axum::http::StatusCode;

    use crate::{
        endpoints,
        test_utils::{
            assert_form_input, assert_form_submit_button, assert_hx_endpoint, assert_valid_html,
            must_get_form, parse_html_document,
        },
        wallet::get_new_wallet_page,
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_new_wallet_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_WALLET, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "currency", "text");
        assert_form_input(&form, "balance", "number");
        assert_form_submit_button(&form);
    }
}
