//! Application router configuration.

use axum::{
    Router,
    response::Redirect,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    budget::{get_budgets_page, upsert_budget_endpoint},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_edit_category_page, update_category_endpoint,
    },
    dashboard::get_dashboard_page,
    endpoints,
    error_page::get_404_not_found,
    report::get_reports_page,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_edit_transaction_page,
        get_new_transaction_page, get_transactions_page, update_transaction_endpoint,
    },
    wallet::{
        create_wallet_endpoint, delete_wallet_endpoint, get_new_wallet_page, get_wallets_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::NEW_TRANSACTION_VIEW, get(get_new_transaction_page))
        .route(
            endpoints::EDIT_TRANSACTION_VIEW,
            get(get_edit_transaction_page),
        )
        .route(endpoints::WALLETS_VIEW, get(get_wallets_page))
        .route(endpoints::NEW_WALLET_VIEW, get(get_new_wallet_page))
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::EDIT_CATEGORY_VIEW, get(get_edit_category_page))
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page));

    let api_routes = Router::new()
        .route(endpoints::POST_WALLET, post(create_wallet_endpoint))
        .route(endpoints::DELETE_WALLET, delete(delete_wallet_endpoint))
        .route(endpoints::POST_CATEGORY, post(create_category_endpoint))
        .route(
            endpoints::PUT_CATEGORY,
            put(update_category_endpoint).delete(delete_category_endpoint),
        )
        .route(endpoints::POST_TRANSACTION, post(create_transaction_endpoint))
        .route(
            endpoints::PUT_TRANSACTION,
            put(update_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::POST_BUDGET, post(upsert_budget_endpoint));

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}


#[cfg(test)]
mod router_tests {
    use axum_test::TestServer;
    use rusqlite::Connection;

    use crate::{AppState, endpoints, endpoints::format_endpoint};

    use super::build_router;

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, "Etc/UTC").expect("Could not create app state");

        TestServer::new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn pages_are_routed() {
        let server = get_test_server();

        for page in [
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::WALLETS_VIEW,
            endpoints::NEW_WALLET_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::BUDGETS_VIEW,
            endpoints::REPORTS_VIEW,
        ] {
            let response = server.get(page).await;

            assert_eq!(response.status_code(), 200, "GET {page}");
        }
    }

    #[tokio::test]
    async fn edit_category_page_is_routed() {
        let server = get_test_server();

        server
            .get(&format_endpoint(endpoints::EDIT_CATEGORY_VIEW, 1))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let server = get_test_server();

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::DASHBOARD_VIEW);
    }

    #[tokio::test]
    async fn unknown_route_returns_not_found() {
        let server = get_test_server();

        server
            .get("/definitely/not/a/page")
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn missing_transaction_returns_not_found() {
        let server = get_test_server();

        server
            .get(&format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, 999))
            .await
            .assert_status_not_found();
    }
}
