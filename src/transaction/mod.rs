//! Transactions: signed amounts moving money in or out of an account.

mod api;
mod db;
mod domain;
mod service;
mod web;

pub use api::{
    TransactionResponse, create_transaction_handler, delete_transaction_handler,
    get_transaction_handler, list_transactions_handler, update_transaction_handler,
    update_transaction_status_handler,
};
pub use db::{TransactionQuery, create_transaction_table, get_transaction, get_transaction_details};
#[cfg(test)]
pub(crate) use db::insert_transaction;
pub use domain::{
    Transaction, TransactionDetails, TransactionId, TransactionInput, TransactionStatus,
    parse_amount, parse_date, start_of_day,
};
pub use service::{
    MAX_TRANSACTION_LIMIT, create_transaction, delete_transaction, list_transactions,
    update_transaction, update_transaction_status,
};
pub use web::{
    create_transaction_endpoint, delete_transaction_endpoint, get_edit_transaction_page,
    get_new_transaction_page, get_transactions_page, get_transactions_partial,
    update_transaction_endpoint,
};
pub(crate) use web::transactions_table;
