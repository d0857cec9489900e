//! The endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/wallets/{wallet_id}', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page with the monthly overview.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing an existing transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page for listing wallets.
pub const WALLETS_VIEW: &str = "/wallets";
/// The page for creating a new wallet.
pub const NEW_WALLET_VIEW: &str = "/wallets/new";
/// The page for listing and creating categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for editing an existing category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page for the current month's budgets.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page with the spending composition and trend charts.
pub const REPORTS_VIEW: &str = "/reports";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to create a wallet.
pub const POST_WALLET: &str = "/api/wallets";
/// The route to delete a wallet.
pub const DELETE_WALLET: &str = "/api/wallets/{wallet_id}";
/// The route to create a category.
pub const POST_CATEGORY: &str = "/api/categories";
/// The route to update a category.
pub const PUT_CATEGORY: &str = "/api/categories/{category_id}";
/// The route to delete a category.
pub const DELETE_CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create a transaction.
pub const POST_TRANSACTION: &str = "/api/transactions";
/// The route to update a transaction.
pub const PUT_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to create or update a budget.
pub const POST_BUDGET: &str = "/api/budgets";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/wallets/{wallet_id}', '{wallet_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    #[track_caller]
    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok(), "{uri} is not a valid URI");
    }

    #[test]
    fn endpoints_are_valid_uris() {
        let all_endpoints = [
            endpoints::ROOT,
            endpoints::DASHBOARD_VIEW,
            endpoints::TRANSACTIONS_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
            endpoints::EDIT_TRANSACTION_VIEW,
            endpoints::WALLETS_VIEW,
            endpoints::NEW_WALLET_VIEW,
            endpoints::CATEGORIES_VIEW,
            endpoints::EDIT_CATEGORY_VIEW,
            endpoints::BUDGETS_VIEW,
            endpoints::REPORTS_VIEW,
            endpoints::STATIC,
            endpoints::POST_WALLET,
            endpoints::DELETE_WALLET,
            endpoints::POST_CATEGORY,
            endpoints::PUT_CATEGORY,
            endpoints::DELETE_CATEGORY,
            endpoints::POST_TRANSACTION,
            endpoints::PUT_TRANSACTION,
            endpoints::DELETE_TRANSACTION,
            endpoints::POST_BUDGET,
        ];

        for endpoint in all_endpoints {
            assert_endpoint_is_valid_uri(endpoint);
            assert_endpoint_is_valid_uri(&format_endpoint(endpoint, 1));
        }
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/wallets/{wallet_id}/edit", 42);

        assert_eq!(formatted_path, "/wallets/42/edit");
    }
}
