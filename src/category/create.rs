//! Category creation form and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        CategoryKind, CategoryName, create_category,
        domain::{CategoryFormData, MIN_CATEGORY_NAME_LENGTH, parse_form_emoji},
    },
    endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, submit_button},
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle category creation form submission.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let parsed = CategoryName::new(&form.name)
        .and_then(|name| Ok((name, parse_form_emoji(form.emoji.as_deref())?)));

    let (name, emoji) = match parsed {
        Ok(parsed) => parsed,
        Err(error) => {
            return new_category_form_view(Some(&form), &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(name, emoji, form.kind, &connection) {
        Ok(category) => {
            tracing::info!("Created category {} ({})", category.label(), category.id);
            (
                HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

pub(super) fn new_category_form_view(
    form: Option<&CategoryFormData>,
    error_message: &str,
) -> Markup {
    let name = form.map(|form| form.name.as_str());
    let emoji = form.and_then(|form| form.emoji.as_deref());
    let selected_kind = form.map_or(CategoryKind::Expense, |form| form.kind);

    html! {
        form
            hx-post=(endpoints::POST_CATEGORY)
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="w-full space-y-4"
        {
            div class="grid grid-cols-1 sm:grid-cols-[1fr_6rem_10rem] gap-4"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        placeholder="Groceries"
                        required
                        minlength=(MIN_CATEGORY_NAME_LENGTH)
                        value=[name]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="emoji" class=(FORM_LABEL_STYLE) { "Emoji" }

                    input
                        id="emoji"
                        type="text"
                        name="emoji"
                        placeholder="🏷️"
                        value=[emoji]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="kind" class=(FORM_LABEL_STYLE) { "Type" }

                    select id="kind" name="kind" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for kind in [CategoryKind::Expense, CategoryKind::Income] {
                            option value=(kind.as_str()) selected[kind == selected_kind]
                            {
                                (kind.label())
                            }
                        }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            (submit_button("Add Category"))
        }
    }
}

#[cfg(test)]
mod create_category_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        category::{
            CategoryKind, create::CreateCategoryEndpointState, create_category_endpoint,
            domain::CategoryFormData, get_categories_by_kind,
        },
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_fragment,
        },
    };

    fn get_state() -> CreateCategoryEndpointState {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        CreateCategoryEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn can_create_category() {
        let state = get_state();
        let form = CategoryFormData {
            name: "Groceries".to_owned(),
            emoji: Some("🛒".to_owned()),
            kind: CategoryKind::Expense,
        };

        let response = create_category_endpoint(State(state.clone()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::CATEGORIES_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let categories = get_categories_by_kind(CategoryKind::Expense, &connection).unwrap();
        let created = categories
            .iter()
            .find(|category| category.name.as_ref() == "Groceries")
            .expect("category was not created");
        assert_eq!(created.emoji.as_ref(), "🛒");
        assert!(!created.is_default);
    }

    #[tokio::test]
    async fn blank_emoji_uses_default() {
        let state = get_state();
        let form = CategoryFormData {
            name: "Side hustle".to_owned(),
            emoji: None,
            kind: CategoryKind::Income,
        };

        create_category_endpoint(State(state.clone()), Form(form)).await;

        let connection = state.db_connection.lock().unwrap();
        let categories = get_categories_by_kind(CategoryKind::Income, &connection).unwrap();
        let created = categories
            .iter()
            .find(|category| category.name.as_ref() == "Side hustle")
            .expect("category was not created");
        assert_eq!(created.emoji.as_ref(), "🏷️");
    }

    #[tokio::test]
    async fn invalid_emoji_renders_form_with_error() {
        let form = CategoryFormData {
            name: "Groceries".to_owned(),
            emoji: Some("food".to_owned()),
            kind: CategoryKind::Expense,
        };

        let response = create_category_endpoint(State(get_state()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_form_error_message(
            &must_get_form(&html),
            "Error: Emoji must be one or two characters",
        );
    }

    #[tokio::test]
    async fn duplicate_name_returns_alert() {
        let form = CategoryFormData {
            name: "Transport".to_owned(),
            emoji: None,
            kind: CategoryKind::Expense,
        };

        let response = create_category_endpoint(State(get_state()), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
