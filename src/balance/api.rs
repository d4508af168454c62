//! JSON REST handlers for balances.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Path, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    AppState,
    account::{AccountId, AccountType, parse_account_id},
    api::{ApiError, MoneyResponse},
    balance::{
        BalanceSummary, BalanceWithAccount, get_all_balances, get_balance_by_account_id,
        get_balance_summary, refresh_account_balance, refresh_all_balances,
    },
    db::lock_connection,
    money::Asset,
};

/// The state needed by the balance handlers.
#[derive(Debug, Clone)]
pub struct BalanceState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The asset used to label the summary totals.
    pub summary_asset: Asset,
}

impl FromRef<AppState> for BalanceState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            summary_asset: state.summary_asset,
        }
    }
}

/// An account balance as returned by the API.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account_id: AccountId,
    pub account_name: String,
    pub account_type: AccountType,
    pub current: MoneyResponse,
    pub pending: MoneyResponse,
    pub available: MoneyResponse,
    #[serde(with = "time::serde::rfc3339")]
    pub last_calculated: OffsetDateTime,
}

impl From<BalanceWithAccount> for BalanceResponse {
    fn from(BalanceWithAccount { account, balance }: BalanceWithAccount) -> Self {
        Self {
            account_id: account.id,
            account_name: account.name,
            account_type: account.account_type,
            current: balance.current.into(),
            pending: balance.pending.into(),
            available: balance.available.into(),
            last_calculated: balance.last_calculated,
        }
    }
}

/// The totals across all accounts as returned by the API.
#[derive(Debug, Serialize)]
pub struct BalanceSummaryResponse {
    pub total_assets: MoneyResponse,
    pub total_liabilities: MoneyResponse,
    pub net_worth: MoneyResponse,
    #[serde(with = "time::serde::rfc3339")]
    pub last_calculated: OffsetDateTime,
}

impl From<BalanceSummary> for BalanceSummaryResponse {
    fn from(summary: BalanceSummary) -> Self {
        Self {
            total_assets: summary.total_assets.into(),
            total_liabilities: summary.total_liabilities.into(),
            net_worth: summary.net_worth.into(),
            last_calculated: summary.last_calculated,
        }
    }
}

/// `GET /api/v1/balances`
pub async fn list_balances(
    State(state): State<BalanceState>,
) -> Result<Json<Vec<BalanceResponse>>, ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    let balances = get_all_balances(&connection)?;

    Ok(Json(balances.into_iter().map(BalanceResponse::from).collect()))
}

/// `GET /api/v1/balances/summary`
pub async fn get_balance_summary_handler(
    State(state): State<BalanceState>,
) -> Result<Json<BalanceSummaryResponse>, ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    let summary = get_balance_summary(state.summary_asset, &connection)?;

    Ok(Json(summary.into()))
}

/// `GET /api/v1/balances/{account_id}`
pub async fn get_balance_handler(
    State(state): State<BalanceState>,
    Path(account_id): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let account_id = parse_account_id(&account_id)?;
    let connection = lock_connection(&state.db_connection)?;

    Ok(Json(get_balance_by_account_id(account_id, &connection)?.into()))
}

/// `POST /api/v1/balances/{account_id}/refresh`
pub async fn refresh_balance_handler(
    State(state): State<BalanceState>,
    Path(account_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let account_id = parse_account_id(&account_id)?;
    let connection = lock_connection(&state.db_connection)?;
    refresh_account_balance(account_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/balances/refresh`
pub async fn refresh_all_balances_handler(
    State(state): State<BalanceState>,
) -> Result<StatusCode, ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    refresh_all_balances(&connection)?;

    Ok(StatusCode::NO_CONTENT)
}
