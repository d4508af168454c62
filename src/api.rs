//! Plumbing shared by the JSON REST API handlers.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{
    Error,
    money::{Asset, Money},
};

/// The body of every error response, e.g. `{"error": "account not found"}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// An [Error] rendered as a JSON response.
#[derive(Debug, PartialEq)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(Error::InvalidRequest(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(Error::InvalidRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let error = self.0.client_message();

        (status, Json(ErrorBody { error })).into_response()
    }
}

/// A monetary value as returned by the API.
#[derive(Debug, PartialEq, Serialize)]
pub struct MoneyResponse {
    /// The display form, e.g. "[USD ($) 100.50]".
    pub display: String,
    pub amount: String,
    pub minor_units: i64,
    pub asset: Asset,
}

impl From<Money> for MoneyResponse {
    fn from(money: Money) -> Self {
        Self {
            display: money.to_string(),
            amount: money.to_decimal_string(),
            minor_units: money.minor_units(),
            asset: money.asset(),
        }
    }
}

/// Liveness check. Always succeeds with an empty body.
pub async fn get_health() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod api_error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{Error, api::ApiError};

    async fn body_json(error: Error) -> (StatusCode, serde_json::Value) {
        let response = ApiError(error).into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read body");

        (status, serde_json::from_slice(&body).expect("Body is not JSON"))
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let (status, body) = body_json(Error::TransactionNotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "transaction not found");
    }

    #[tokio::test]
    async fn validation_maps_to_400() {
        let (status, body) = body_json(Error::InvalidDate).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "invalid parameter date: must be in format YYYY-MM-DD"
        );
    }

    #[tokio::test]
    async fn conflict_maps_to_409() {
        let (status, _) = body_json(Error::CategoryInUse).await;

        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn sql_error_is_masked() {
        let (status, body) = body_json(Error::DatabaseLockError).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal server error");
    }
}
