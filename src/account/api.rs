//! JSON REST handlers for accounts.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{
        Account, AccountForm, AccountId, AccountType, create_account, delete_account, get_account,
        get_all_accounts, update_account,
    },
    api::ApiError,
    database_id::parse_id,
    db::lock_connection,
    money::Asset,
};

/// The state needed by the account handlers.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// An account as returned by the API.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: AccountId,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub asset: Asset,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            account_type: account.account_type,
            asset: account.asset,
            description: account.description,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

pub(crate) fn parse_account_id(raw_id: &str) -> Result<AccountId, Error> {
    parse_id(raw_id, Error::AccountNotFound)
}

/// `GET /api/v1/accounts`
pub async fn list_accounts(
    State(state): State<AccountState>,
) -> Result<Json<Vec<AccountResponse>>, ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    let accounts = get_all_accounts(&connection)?;

    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// `POST /api/v1/accounts`
pub async fn create_account_handler(
    State(state): State<AccountState>,
    payload: Result<Json<AccountForm>, JsonRejection>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let Json(form) = payload?;
    let connection = lock_connection(&state.db_connection)?;
    let account = create_account(form, &connection)?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// `GET /api/v1/accounts/{account_id}`
pub async fn get_account_handler(
    State(state): State<AccountState>,
    Path(account_id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = parse_account_id(&account_id)?;
    let connection = lock_connection(&state.db_connection)?;
    let account = get_account(account_id, &connection)?;

    Ok(Json(account.into()))
}

/// `PUT /api/v1/accounts/{account_id}`
pub async fn update_account_handler(
    State(state): State<AccountState>,
    Path(account_id): Path<String>,
    payload: Result<Json<AccountForm>, JsonRejection>,
) -> Result<Json<AccountResponse>, ApiError> {
    let Json(form) = payload?;
    let account_id = parse_account_id(&account_id)?;
    let connection = lock_connection(&state.db_connection)?;
    let account = update_account(account_id, form, &connection)?;

    Ok(Json(account.into()))
}

/// `DELETE /api/v1/accounts/{account_id}`
pub async fn delete_account_handler(
    State(state): State<AccountState>,
    Path(account_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let account_id = parse_account_id(&account_id)?;
    let connection = lock_connection(&state.db_connection)?;
    delete_account(account_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
