//! Accounts: where money is held or owed.

mod api;
mod db;
mod domain;
mod service;
mod web;

pub use api::{
    AccountResponse, create_account_handler, delete_account_handler, get_account_handler,
    list_accounts, update_account_handler,
};
pub(crate) use api::parse_account_id;
pub use db::{create_account_table, get_account, get_all_accounts};
pub(crate) use db::{ACCOUNT_COLUMN_COUNT, ACCOUNT_COLUMNS, map_account_columns};
#[cfg(test)]
pub(crate) use db::insert_account;
pub use domain::{Account, AccountForm, AccountId, AccountType, ValidatedAccount};
pub use service::{create_account, delete_account, update_account};
pub use web::{
    create_account_endpoint, delete_account_endpoint, get_accounts_page, get_accounts_partial,
    get_edit_account_page, get_new_account_page, update_account_endpoint,
};
