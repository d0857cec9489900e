//! Alert messages shown to the user after an HTMX request.
//!
//! Alerts are swapped into the `#alert-container` element of the base page.

use axum::response::{IntoResponse, Response};
use maud::{Markup, html};

/// A success or error message for the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// A success message with extra details.
    Success { message: String, details: String },
    /// A success message without details.
    SuccessSimple { message: String },
    /// An error message with details on how to fix the problem.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        let (container_style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, Some(details)),
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, None),
            Alert::Error { message, details } => (ERROR_STYLE, message, Some(details)),
        };

        html! {
            div
                role="alert"
                class=(container_style)
            {
                div class="flex items-start justify-between gap-4"
                {
                    div
                    {
                        p class="font-semibold" { (message) }

                        @if let Some(details) = details.filter(|details| !details.is_empty()) {
                            p class="mt-1" { (details) }
                        }
                    }

                    button
                        type="button"
                        aria-label="Dismiss"
                        class="font-bold"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "×"
                    }
                }
            }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

const SUCCESS_STYLE: &str = "p-4 mb-4 text-sm rounded-lg shadow-lg text-green-800 \
    bg-green-50 border border-green-300 dark:bg-gray-800 dark:text-green-400 \
    dark:border-green-800";

const ERROR_STYLE: &str = "p-4 mb-4 text-sm rounded-lg shadow-lg text-red-800 \
    bg-red-50 border border-red-300 dark:bg-gray-800 dark:text-red-400 \
    dark:border-red-800";

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::{alert::Alert, test_utils::assert_valid_html};

    #[test]
    fn error_alert_shows_message_and_details() {
        let alert = Alert::Error {
            message: "Could not delete wallet".to_owned(),
            details: "The wallet could not be found.".to_owned(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());

        assert_valid_html(&html);
        let paragraphs = html
            .select(&Selector::parse("p").unwrap())
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(
            paragraphs,
            vec!["Could not delete wallet", "The wallet could not be found."]
        );
    }

    #[test]
    fn simple_success_alert_has_no_details() {
        let alert = Alert::SuccessSimple {
            message: "Deleted".to_owned(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());

        let paragraph_count = html.select(&Selector::parse("p").unwrap()).count();
        assert_eq!(paragraph_count, 1);
    }
}
