//! Categories: income or expense labels for transactions.

mod api;
mod db;
mod domain;
mod service;
mod web;

pub use api::{
    CategoryResponse, create_category_handler, delete_category_handler, get_category_handler,
    list_categories, update_category_handler,
};
pub(crate) use api::parse_category_id;
pub use db::{create_category_table, get_all_categories, get_categories_by_type, get_category};
pub(crate) use db::{CATEGORY_COLUMNS, map_category_columns};
#[cfg(test)]
pub(crate) use db::insert_category;
pub use domain::{
    Category, CategoryForm, CategoryId, CategoryType, DEFAULT_CATEGORY_COLOR, ValidatedCategory,
};
pub use service::{create_category, delete_category, update_category};
pub use web::{
    create_category_endpoint, delete_category_endpoint, get_categories_page,
    get_categories_partial, get_edit_category_page, get_new_category_page,
    update_category_endpoint,
};
