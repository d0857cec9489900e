//! Full-page responses for missing pages and server errors.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

/// An error page with its status code.
pub struct ErrorPage {
    status: StatusCode,
    description: &'static str,
    fix: String,
}

impl ErrorPage {
    /// The 404 page for routes and records that do not exist.
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            description: "Page not found.",
            fix: "Sorry, we can't find that page. Your wallets and budgets are on the dashboard."
                .to_owned(),
        }
    }

    /// The generic 500 page.
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs".to_owned(),
        }
    }

    /// The 500 page for a server started with an unknown timezone.
    pub fn invalid_timezone(timezone: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            description: "Invalid Timezone Settings",
            fix: format!(
                "Could not get local timezone \"{timezone}\". Check your server settings and \
                ensure the timezone has been set to valid, canonical timezone string"
            ),
        }
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let (title, header) = match self.status {
            StatusCode::NOT_FOUND => ("Not Found", "404"),
            _ => ("Internal Server Error", "500"),
        };
        let page = error_view(title, header, self.description, &self.fix);

        (self.status, Html(page.into_string())).into_response()
    }
}

/// The fallback handler for unknown routes.
pub async fn get_404_not_found() -> Response {
    ErrorPage::not_found().into_response()
}
