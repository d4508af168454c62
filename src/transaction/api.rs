//! JSON REST handlers for transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{
        FromRef, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::{AccountId, AccountResponse, parse_account_id},
    api::{ApiError, MoneyResponse},
    category::{CategoryId, CategoryResponse, parse_category_id},
    database_id::parse_id,
    db::lock_connection,
    transaction::{
        Transaction, TransactionDetails, TransactionId, TransactionInput, TransactionQuery,
        TransactionStatus, create_transaction, delete_transaction, get_transaction_details,
        list_transactions, parse_date, update_transaction, update_transaction_status,
    },
};

/// The state needed by the transaction handlers.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// An amount sent either as a decimal string ("12.50") or a JSON number (12.5).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountField {
    Text(String),
    Number(f64),
}

impl AmountField {
    fn into_text(self) -> String {
        match self {
            AmountField::Text(text) => text,
            AmountField::Number(number) => number.to_string(),
        }
    }
}

/// The body of a create or update request.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRequest {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub category_id: String,
    pub amount: AmountField,
    #[serde(default)]
    pub description: String,
    /// `YYYY-MM-DD`, or empty.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl TryFrom<TransactionRequest> for TransactionInput {
    type Error = Error;

    fn try_from(request: TransactionRequest) -> Result<Self, Self::Error> {
        TransactionInput::parse(
            request.account_id,
            request.category_id,
            &request.amount.into_text(),
            request.description,
            &request.date,
            request.status,
        )
    }
}

/// The body of a status change request.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// Optional filters and paging for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListParams {
    pub account_id: Option<String>,
    pub category_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl TryFrom<TransactionListParams> for TransactionQuery {
    type Error = Error;

    fn try_from(params: TransactionListParams) -> Result<Self, Self::Error> {
        let defaults = TransactionQuery::default();

        let account_id: Option<AccountId> = non_empty(params.account_id)
            .map(|id| parse_account_id(&id))
            .transpose()?;
        let category_id: Option<CategoryId> = non_empty(params.category_id)
            .map(|id| parse_category_id(&id))
            .transpose()?;

        let start = parse_date(params.start_date.as_deref().unwrap_or_default())?;
        let end = parse_date(params.end_date.as_deref().unwrap_or_default())?;
        let date_range = match (start, end) {
            (Some(start), Some(end)) => Some((start, end)),
            (None, None) => None,
            _ => return Err(Error::InvalidDateRange),
        };

        Ok(TransactionQuery {
            account_id,
            category_id,
            date_range,
            limit: params.limit.unwrap_or(defaults.limit),
            offset: params.offset.unwrap_or(defaults.offset),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// A transaction as returned by the API.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub category_id: CategoryId,
    pub amount: MoneyResponse,
    pub description: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub status: TransactionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryResponse>,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            account_id: transaction.account_id,
            category_id: transaction.category_id,
            amount: transaction.amount.into(),
            description: transaction.description,
            date: transaction.date.date().to_string(),
            status: transaction.status,
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
            account: None,
            category: None,
        }
    }
}

impl From<TransactionDetails> for TransactionResponse {
    fn from(details: TransactionDetails) -> Self {
        Self {
            account: Some(details.account.into()),
            category: Some(details.category.into()),
            ..details.transaction.into()
        }
    }
}

pub(crate) fn parse_transaction_id(raw_id: &str) -> Result<TransactionId, Error> {
    parse_id(raw_id, Error::TransactionNotFound)
}

/// `GET /api/v1/transactions`
///
/// Without parameters this returns the 50 newest transactions.
pub async fn list_transactions_handler(
    State(state): State<TransactionState>,
    params: Result<Query<TransactionListParams>, QueryRejection>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    let Query(params) = params?;
    let query = TransactionQuery::try_from(params)?;
    let connection = lock_connection(&state.db_connection)?;
    let transactions = list_transactions(&query, &connection)?;

    Ok(Json(
        transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    ))
}

/// `POST /api/v1/transactions`
pub async fn create_transaction_handler(
    State(state): State<TransactionState>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError> {
    let Json(request) = payload?;
    // Amount and date are checked before touching the database.
    let input = TransactionInput::try_from(request)?;
    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(input, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction.into())))
}

/// `GET /api/v1/transactions/{transaction_id}`
pub async fn get_transaction_handler(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;

    Ok(Json(get_transaction_details(transaction_id, &connection)?.into()))
}

/// `PUT /api/v1/transactions/{transaction_id}`
pub async fn update_transaction_handler(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let Json(request) = payload?;
    let input = TransactionInput::try_from(request)?;
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;
    let transaction = update_transaction(transaction_id, input, &connection)?;

    Ok(Json(transaction.into()))
}

/// `PATCH /api/v1/transactions/{transaction_id}/status`
pub async fn update_transaction_status_handler(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
    payload: Result<Json<StatusRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let Json(request) = payload?;
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;
    let transaction = update_transaction_status(transaction_id, &request.status, &connection)?;

    Ok(Json(transaction.into()))
}

/// `DELETE /api/v1/transactions/{transaction_id}`
pub async fn delete_transaction_handler(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let transaction_id = parse_transaction_id(&transaction_id)?;
    let connection = lock_connection(&state.db_connection)?;
    delete_transaction(transaction_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod transaction_request_tests {
    use time::macros::date;

    use crate::{
        Error,
        transaction::{TransactionInput, TransactionQuery},
    };

    use super::{AmountField, TransactionListParams, TransactionRequest};

    fn request(amount: AmountField, date: &str) -> TransactionRequest {
        TransactionRequest {
            account_id: "a".to_owned(),
            category_id: "b".to_owned(),
            amount,
            description: "Lunch".to_owned(),
            date: date.to_owned(),
            status: None,
        }
    }

    #[test]
    fn accepts_numeric_amount() {
        let input = TransactionInput::try_from(request(AmountField::Number(100.5), "")).unwrap();

        assert_eq!(input.amount.minor_units(), 10050);
    }

    #[test]
    fn rejects_unparseable_amount() {
        let result =
            TransactionInput::try_from(request(AmountField::Text("ten".to_owned()), ""));

        assert_eq!(result, Err(Error::InvalidAmount));
    }

    #[test]
    fn rejects_us_ordered_date() {
        let result =
            TransactionInput::try_from(request(AmountField::Text("1".to_owned()), "01/15/2024"));

        assert_eq!(result, Err(Error::InvalidDate));
    }

    #[test]
    fn list_params_default_to_first_page() {
        let query = TransactionQuery::try_from(TransactionListParams::default()).unwrap();

        assert_eq!(query, TransactionQuery::default());
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn list_params_need_both_range_ends() {
        let params = TransactionListParams {
            start_date: Some("2024-01-01".to_owned()),
            ..Default::default()
        };

        assert_eq!(
            TransactionQuery::try_from(params),
            Err(Error::InvalidDateRange)
        );
    }

    #[test]
    fn list_params_parse_range() {
        let params = TransactionListParams {
            start_date: Some("2024-01-01".to_owned()),
            end_date: Some("2024-01-31".to_owned()),
            limit: Some(10),
            ..Default::default()
        };

        let query = TransactionQuery::try_from(params).unwrap();

        assert_eq!(
            query.date_range,
            Some((date!(2024 - 01 - 01), date!(2024 - 01 - 31)))
        );
        assert_eq!(query.limit, 10);
    }
}
