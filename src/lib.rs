//! A personal-finance ledger: accounts, categories, transactions and cached
//! account balances.
//!
//! The library exposes a JSON REST API under `/api/v1` and a server-rendered
//! HTMX web frontend, both backed by a single SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod api;
mod app_state;
mod balance;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod money;
mod navigation;
mod not_found;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use money::{Asset, Money};
pub use routing::build_router;

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used as an account name.
    #[error("account name cannot be empty")]
    EmptyAccountName,

    /// The account type is not one of the supported account types.
    #[error("invalid parameter type: \"{0}\" is not a valid account type")]
    InvalidAccountType(String),

    /// The asset code does not match any recognized currency or asset.
    #[error("invalid parameter asset: \"{0}\" is not a recognized asset")]
    UnknownAsset(String),

    /// An empty string was used as a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// The category type is neither income nor expense.
    #[error("invalid parameter type: \"{0}\" is not a valid category type")]
    InvalidCategoryType(String),

    /// The category color is not a hex color string.
    #[error("invalid parameter color: \"{0}\" must be a hex color such as #6B7280")]
    InvalidColor(String),

    /// A transaction was submitted without an account ID.
    #[error("account ID cannot be empty")]
    MissingAccountId,

    /// A transaction was submitted without a category ID.
    #[error("category ID cannot be empty")]
    MissingCategoryId,

    /// A transaction amount of zero was submitted.
    #[error("amount cannot be zero")]
    ZeroAmount,

    /// An empty string was used as a transaction description.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// The transaction status is not one of pending, cleared or cancelled.
    #[error("invalid parameter status: \"{0}\" is not a valid transaction status")]
    InvalidStatus(String),

    /// The amount could not be parsed as a decimal number.
    #[error("invalid parameter amount: must be a valid decimal number")]
    InvalidAmount,

    /// The date was not in the `YYYY-MM-DD` format.
    #[error("invalid parameter date: must be in format YYYY-MM-DD")]
    InvalidDate,

    /// The start of a date range is after its end, or only one end was given.
    #[error("invalid parameter date range: start_date and end_date must both be set and start_date must not be after end_date")]
    InvalidDateRange,

    /// The page size is outside the accepted range.
    #[error("invalid parameter limit: must be between 1 and {0}")]
    InvalidLimit(u32),

    /// A query string or request body could not be decoded.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The account could not be found.
    #[error("account not found")]
    AccountNotFound,

    /// The category could not be found.
    #[error("category not found")]
    CategoryNotFound,

    /// The transaction could not be found.
    #[error("transaction not found")]
    TransactionNotFound,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A category with the same name and type already exists.
    #[error("a category with this name and type already exists")]
    DuplicateCategory,

    /// The category is referenced by at least one transaction and cannot be deleted.
    #[error("the category is used by one or more transactions and cannot be deleted")]
    CategoryInUse,

    /// A FOREIGN KEY constraint failed.
    #[error("a referenced record does not exist or is still in use")]
    ForeignKeyViolation,

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("category.name") =>
            {
                Error::DuplicateCategory
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787 => {
                Error::ForeignKeyViolation
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that best describes this error.
    ///
    /// Every missing resource maps to 404 and every malformed or invalid
    /// input maps to 400, regardless of the handler that produced it.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::EmptyAccountName
            | Error::InvalidAccountType(_)
            | Error::UnknownAsset(_)
            | Error::EmptyCategoryName
            | Error::InvalidCategoryType(_)
            | Error::InvalidColor(_)
            | Error::MissingAccountId
            | Error::MissingCategoryId
            | Error::ZeroAmount
            | Error::EmptyDescription
            | Error::InvalidStatus(_)
            | Error::InvalidAmount
            | Error::InvalidDate
            | Error::InvalidDateRange
            | Error::InvalidLimit(_)
            | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::AccountNotFound
            | Error::CategoryNotFound
            | Error::TransactionNotFound
            | Error::NotFound => StatusCode::NOT_FOUND,
            Error::DuplicateCategory | Error::CategoryInUse | Error::ForeignKeyViolation => {
                StatusCode::CONFLICT
            }
            Error::DatabaseLockError | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to show to a client.
    ///
    /// Internal errors are logged and replaced with a generic message.
    pub fn client_message(&self) -> String {
        match self {
            Error::DatabaseLockError | Error::SqlError(_) => {
                tracing::error!("internal error: {self}");
                "internal server error".to_owned()
            }
            error => error.to_string(),
        }
    }

    /// Render the error as an alert fragment for `#alert-container`.
    pub(crate) fn into_alert_response(self) -> Response {
        let status_code = self.status_code();

        let alert = match &self {
            Error::AccountNotFound => Alert::Error {
                message: "Account not found".to_owned(),
                details: "The account could not be found. \
                    Try refreshing the page to see if the account has already been deleted."
                    .to_owned(),
            },
            Error::CategoryNotFound => Alert::Error {
                message: "Category not found".to_owned(),
                details: "The category could not be found. \
                    Try refreshing the page to see if the category has already been deleted."
                    .to_owned(),
            },
            Error::TransactionNotFound => Alert::Error {
                message: "Transaction not found".to_owned(),
                details: "The transaction could not be found. \
                    Try refreshing the page to see if the transaction has already been deleted."
                    .to_owned(),
            },
            Error::DuplicateCategory => Alert::Error {
                message: "Duplicate category".to_owned(),
                details: "A category with this name and type already exists. \
                    Choose a different name, or edit the existing category."
                    .to_owned(),
            },
            Error::CategoryInUse => Alert::Error {
                message: "Category in use".to_owned(),
                details: "Transactions still use this category. \
                    Move or delete those transactions first."
                    .to_owned(),
            },
            error if status_code == StatusCode::BAD_REQUEST => Alert::Error {
                message: "Invalid input".to_owned(),
                details: error.to_string(),
            },
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                Alert::ErrorSimple {
                    message: "Something went wrong, check the server logs for more details."
                        .to_owned(),
                }
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.status_code() {
            StatusCode::NOT_FOUND => get_404_not_found_response(),
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {self}");
                InternalServerError::default().into_response()
            }
            _ => self.into_alert_response(),
        }
    }
}
