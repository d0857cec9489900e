//! Categories listing page.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{
        Category, CategoryKind, count_transactions_per_category, create::new_category_form_view,
        get_all_categories,
    },
    database_id::CategoryId,
    endpoints,
    html::{
        BADGE_STYLE, CARD_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, edit_delete_action_links,
    },
    navigation::NavBar,
};

/// The state needed for the categories listing page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the categories page, grouped by kind, with a form for adding categories.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_all_categories(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let transaction_counts = count_transactions_per_category(&connection).inspect_err(|error| {
        tracing::error!("Could not count transactions per category: {error}")
    })?;

    Ok(categories_view(&categories, &transaction_counts).into_response())
}

fn categories_view(
    categories: &[Category],
    transaction_counts: &HashMap<CategoryId, u32>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-6 w-full lg:max-w-5xl"
            {
                h1 class="text-xl font-bold" { "Categories" }

                div class=(CARD_STYLE)
                {
                    h2 class="text-lg font-semibold mb-4" { "New category" }
                    (new_category_form_view(None, ""))
                }

                @for kind in [CategoryKind::Expense, CategoryKind::Income] {
                    (category_table(kind, categories, transaction_counts))
                }
            }
        }
    );

    base("Categories", &[], &content)
}

fn category_table(
    kind: CategoryKind,
    categories: &[Category],
    transaction_counts: &HashMap<CategoryId, u32>,
) -> Markup {
    let categories: Vec<&Category> = categories
        .iter()
        .filter(|category| category.kind == kind)
        .collect();

    let table_row = |category: &Category| {
        let transaction_count = *transaction_counts.get(&category.id).unwrap_or(&0);
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id);
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? Budgets for this category will be deleted too.",
            category.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE) data-category-id=(category.id)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    span class="mr-2" { (category.emoji) }
                    (category.name)

                    @if category.is_default {
                        span class=(format!("{BADGE_STYLE} ml-2")) { "Default" }
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (transaction_count)
                }

                td class=(TABLE_CELL_STYLE)
                {
                    @if !category.is_default {
                        div class="flex gap-4"
                        {
                            (edit_delete_action_links(
                                &edit_url,
                                &delete_url,
                                &confirm_message,
                                "closest tr",
                                "delete",
                            ))
                        }
                    }
                }
            }
        )
    };

    html!(
        section class="w-full overflow-x-auto dark:bg-gray-800"
        {
            h2 class="text-lg font-semibold mb-2" { (kind.label()) " categories" }

            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Transactions" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for category in &categories {
                        (table_row(category))
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Selector;

    use crate::{
        category::{
            CategoryKind, CategoryName, Emoji, create_category, get_categories_page,
            list::CategoriesPageState,
        },
        db::initialize,
        endpoints,
        test_utils::{assert_hx_endpoint, assert_valid_html, must_get_form, parse_html_document},
    };

    #[tokio::test]
    async fn lists_default_and_user_categories() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let category = create_category(
            CategoryName::new_unchecked("Groceries"),
            Emoji::new("🛒").unwrap(),
            CategoryKind::Expense,
            &connection,
        )
        .unwrap();
        let state = CategoriesPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_categories_page(State(state)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_hx_endpoint(&must_get_form(&html), endpoints::POST_CATEGORY, "hx-post");

        let rows = html
            .select(&Selector::parse("tbody tr").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(rows.len(), 10);

        // Only user categories can be edited.
        let edit_links = html
            .select(&Selector::parse("tbody a").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect::<Vec<_>>();
        let want_edit_url = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id);
        assert_eq!(edit_links, [want_edit_url.as_str()]);
    }
}
