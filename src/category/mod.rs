//! Categories for classifying income and expense transactions.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::create_category_endpoint;
pub use db::{
    count_transactions_per_category, create_category, create_category_table, delete_category,
    get_all_categories, get_categories_by_kind, get_category, insert_default_categories,
    update_category,
};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryKind, CategoryName, Emoji};
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use list::get_categories_page;
