//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use time::Date;

use crate::{
    alert::Alert,
    database_id::{CategoryId, WalletId},
    error_page::ErrorPage,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A wallet name was shorter than the minimum length.
    #[error("Wallet name must be at least {0} characters long")]
    WalletNameTooShort(usize),

    /// A currency code was not made up of 3 to 5 ASCII letters.
    #[error("\"{0}\" is not a valid currency code")]
    InvalidCurrency(String),

    /// A wallet was created with a negative or non-finite starting balance.
    #[error("the starting balance must be a finite amount of zero or more")]
    NegativeBalance,

    /// A free text description exceeded the maximum number of characters.
    #[error("Description must be at most {0} characters long")]
    DescriptionTooLong(usize),

    /// The specified wallet name already exists in the database.
    #[error("the wallet \"{0}\" already exists in the database")]
    DuplicateWalletName(String),

    /// The wallet ID used for a transaction or budget did not match a wallet.
    #[error("the wallet ID {0} does not refer to a valid wallet")]
    InvalidWallet(WalletId),

    /// A category name was shorter than the minimum length.
    #[error("Category name must be at least {0} characters long")]
    CategoryNameTooShort(usize),

    /// A category emoji was empty or longer than two characters.
    #[error("Emoji must be one or two characters")]
    InvalidEmoji,

    /// A category with the same name and kind already exists.
    #[error("the category \"{0}\" already exists in the database")]
    DuplicateCategoryName(String),

    /// The category ID used for a transaction or budget did not match a category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// Tried to modify one of the built-in categories.
    #[error("default categories cannot be changed or deleted")]
    DefaultCategoryLocked,

    /// Tried to delete a category that transactions still refer to.
    #[error("the category is used by existing transactions")]
    CategoryInUse,

    /// The category kind does not fit how it was used, e.g. an income
    /// category on an expense or a budget for an income category.
    #[error("the category type does not match")]
    CategoryTypeMismatch,

    /// An amount that must be strictly positive was zero or negative.
    #[error("the amount must be greater than zero")]
    NonPositiveAmount,

    /// A budget month or year was outside of the supported range.
    #[error("invalid budget period {month}/{year}")]
    InvalidBudgetPeriod {
        /// The month number that was given.
        month: u8,
        /// The year that was given.
        year: i32,
    },

    /// A date in the future was used to create a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a wallet that does not exist
    #[error("tried to delete a wallet that is not in the database")]
    DeleteMissingWallet,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => ErrorPage::not_found().into_response(),
            Error::InvalidTimezoneError(timezone) => {
                ErrorPage::invalid_timezone(&timezone).into_response()
            }
            Error::DatabaseLockError => ErrorPage::internal().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                ErrorPage::internal().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, message, details) = match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Invalid Timezone Settings",
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            ),
            Error::FutureDate(date) => (
                StatusCode::BAD_REQUEST,
                "Invalid transaction date",
                format!(
                    "{date} is a date in the future, which is not allowed. \
                    Change the date to today or earlier."
                ),
            ),
            Error::InvalidWallet(wallet_id) => (
                StatusCode::BAD_REQUEST,
                "Invalid wallet",
                format!("Could not find a wallet with the ID {wallet_id}."),
            ),
            Error::InvalidCategory(category_id) => (
                StatusCode::BAD_REQUEST,
                "Invalid category",
                format!("Could not find a category with the ID {category_id:?}."),
            ),
            Error::CategoryTypeMismatch => (
                StatusCode::BAD_REQUEST,
                "Category type does not match",
                "Income transactions need an income category and expenses need an expense \
                category. Budgets can only be set for expense categories."
                    .to_owned(),
            ),
            Error::NonPositiveAmount => (
                StatusCode::BAD_REQUEST,
                "Invalid amount",
                "The amount must be greater than zero.".to_owned(),
            ),
            Error::NegativeBalance => (
                StatusCode::BAD_REQUEST,
                "Invalid balance",
                "The starting balance must be a finite amount of zero or more.".to_owned(),
            ),
            Error::DescriptionTooLong(max_length) => (
                StatusCode::BAD_REQUEST,
                "Description too long",
                format!("Descriptions can be at most {max_length} characters long."),
            ),
            Error::InvalidBudgetPeriod { month, year } => (
                StatusCode::BAD_REQUEST,
                "Invalid budget period",
                format!(
                    "{month}/{year} is not a valid budget period. \
                    Pick a month between 1 and 12 and a year between 2023 and 2100."
                ),
            ),
            Error::DefaultCategoryLocked => (
                StatusCode::BAD_REQUEST,
                "Default category",
                "Default categories cannot be edited or deleted.".to_owned(),
            ),
            Error::CategoryInUse => (
                StatusCode::BAD_REQUEST,
                "Category in use",
                "This category is used by existing transactions. \
                Move or delete those transactions first."
                    .to_owned(),
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                "Could not update transaction",
                "The transaction could not be found.".to_owned(),
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                "Could not delete transaction",
                "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted."
                    .to_owned(),
            ),
            Error::DeleteMissingWallet => (
                StatusCode::NOT_FOUND,
                "Could not delete wallet",
                "The wallet could not be found. \
                Try refreshing the page to see if the wallet has already been deleted."
                    .to_owned(),
            ),
            Error::UpdateMissingCategory => (
                StatusCode::NOT_FOUND,
                "Could not update category",
                "The category could not be found.".to_owned(),
            ),
            Error::DeleteMissingCategory => (
                StatusCode::NOT_FOUND,
                "Could not delete category",
                "The category could not be found. \
                Try refreshing the page to see if the category has already been deleted."
                    .to_owned(),
            ),
            Error::DuplicateWalletName(name) => (
                StatusCode::BAD_REQUEST,
                "Duplicate Wallet Name",
                format!(
                    "The wallet {name} already exists. \
                    Choose a different wallet name, or delete the existing wallet.",
                ),
            ),
            Error::DuplicateCategoryName(name) => (
                StatusCode::BAD_REQUEST,
                "Duplicate Category Name",
                format!("The category {name} already exists. Choose a different name."),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.".to_owned(),
            ),
        };

        let alert = Alert::Error {
            message: message.to_owned(),
            details,
        };

        (status_code, alert.into_html()).into_response()
    }
}
