//! Balances: per-account totals cached from the transaction table.

mod api;
mod db;
mod domain;
mod service;
mod web;

pub use api::{
    BalanceResponse, BalanceState, BalanceSummaryResponse, get_balance_handler,
    get_balance_summary_handler, list_balances, refresh_all_balances_handler,
    refresh_balance_handler,
};
pub use db::{create_balance_table, get_balance};
pub use domain::{Balance, BalanceSummary, BalanceWithAccount};
pub use service::{
    get_all_balances, get_balance_by_account_id, get_balance_summary, refresh_account_balance,
    refresh_all_balances, refresh_balance_best_effort,
};
pub use web::{
    get_balance_summary_partial, get_balances_page, refresh_all_balances_endpoint,
    refresh_balance_endpoint,
};
pub(crate) use web::{balances_table, summary_cards};
