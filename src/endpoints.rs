//! The URIs served by the application.
//!
//! For endpoints that take a parameter, e.g., '/accounts/{account_id}', use [format_endpoint].

use std::fmt::Display;

/// The dashboard: summary cards, balances and recent transactions.
pub const DASHBOARD_VIEW: &str = "/";
/// The page listing accounts.
pub const ACCOUNTS_VIEW: &str = "/accounts";
/// The page for creating an account.
pub const NEW_ACCOUNT_VIEW: &str = "/accounts/new";
/// The page for editing an account.
pub const EDIT_ACCOUNT_VIEW: &str = "/accounts/{account_id}/edit";
/// The page listing categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for editing a category.
pub const EDIT_CATEGORY_VIEW: &str = "/categories/{category_id}/edit";
/// The page listing transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for editing a transaction.
pub const EDIT_TRANSACTION_VIEW: &str = "/transactions/{transaction_id}/edit";
/// The page listing account balances.
pub const BALANCES_VIEW: &str = "/balances";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// Form target for creating an account.
pub const POST_ACCOUNT: &str = "/accounts";
/// Form target for updating an account.
pub const PUT_ACCOUNT: &str = "/accounts/{account_id}";
/// Deletes an account.
pub const DELETE_ACCOUNT: &str = "/accounts/{account_id}";
/// Form target for creating a category.
pub const POST_CATEGORY: &str = "/categories";
/// Form target for updating a category.
pub const PUT_CATEGORY: &str = "/categories/{category_id}";
/// Deletes a category.
pub const DELETE_CATEGORY: &str = "/categories/{category_id}";
/// Form target for creating a transaction.
pub const POST_TRANSACTION: &str = "/transactions";
/// Form target for updating a transaction.
pub const PUT_TRANSACTION: &str = "/transactions/{transaction_id}";
/// Deletes a transaction.
pub const DELETE_TRANSACTION: &str = "/transactions/{transaction_id}";
/// Recalculates the balance of one account.
pub const REFRESH_BALANCE: &str = "/balances/{account_id}/refresh";
/// Recalculates the balance of every account.
pub const REFRESH_ALL_BALANCES: &str = "/balances/refresh";

/// HTMX partial with the accounts table.
pub const ACCOUNTS_PARTIAL: &str = "/htmx/accounts";
/// HTMX partial with the categories table.
pub const CATEGORIES_PARTIAL: &str = "/htmx/categories";
/// HTMX partial with the transactions table.
pub const TRANSACTIONS_PARTIAL: &str = "/htmx/transactions";
/// HTMX partial with the summary cards.
pub const BALANCE_SUMMARY_PARTIAL: &str = "/htmx/balance-summary";

/// Liveness check.
pub const HEALTH: &str = "/health";

// JSON API, all under /api/v1.
pub const API_ACCOUNTS: &str = "/api/v1/accounts";
pub const API_ACCOUNT: &str = "/api/v1/accounts/{account_id}";
pub const API_CATEGORIES: &str = "/api/v1/categories";
pub const API_CATEGORY: &str = "/api/v1/categories/{category_id}";
pub const API_TRANSACTIONS: &str = "/api/v1/transactions";
pub const API_TRANSACTION: &str = "/api/v1/transactions/{transaction_id}";
pub const API_TRANSACTION_STATUS: &str = "/api/v1/transactions/{transaction_id}/status";
pub const API_BALANCES: &str = "/api/v1/balances";
pub const API_BALANCE_SUMMARY: &str = "/api/v1/balances/summary";
pub const API_BALANCES_REFRESH: &str = "/api/v1/balances/refresh";
pub const API_BALANCE: &str = "/api/v1/balances/{account_id}";
pub const API_BALANCE_REFRESH: &str = "/api/v1/balances/{account_id}/refresh";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/accounts/{account_id}', '{account_id}' is the parameter.
///
/// Only the first parameter is replaced. If no parameter is found in
/// `endpoint_path`, the original `endpoint_path` is returned.
pub fn format_endpoint(endpoint_path: &str, id: impl Display) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map_or(endpoint_path.len(), |offset| start + offset + 1);

    format!("{}{id}{}", &endpoint_path[..start], &endpoint_path[end..])
}
