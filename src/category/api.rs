//! JSON REST handlers for categories.

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
    api::ApiError,
    category::{
        Category, CategoryForm, CategoryId, CategoryType, create_category, delete_category,
        get_all_categories, get_categories_by_type, get_category, update_category,
    },
    database_id::parse_id,
    db::lock_connection,
};

/// The state needed by the category handlers.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A category as returned by the API.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    pub description: String,
    pub color: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            category_type: category.category_type,
            description: category.description,
            color: category.color,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// Optional filters for listing categories.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    #[serde(rename = "type")]
    pub category_type: Option<String>,
}

pub(crate) fn parse_category_id(raw_id: &str) -> Result<CategoryId, Error> {
    parse_id(raw_id, Error::CategoryNotFound)
}

/// `GET /api/v1/categories`, optionally filtered with `?type=income|expense`.
pub async fn list_categories(
    State(state): State<CategoryState>,
    query: Result<Query<CategoryQuery>, QueryRejection>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let Query(query) = query?;
    let category_type = query
        .category_type
        .filter(|category_type| !category_type.is_empty())
        .map(|category_type| category_type.parse::<CategoryType>())
        .transpose()?;

    let connection = lock_connection(&state.db_connection)?;
    let categories = match category_type {
        Some(category_type) => get_categories_by_type(category_type, &connection)?,
        None => get_all_categories(&connection)?,
    };

    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// `POST /api/v1/categories`
pub async fn create_category_handler(
    State(state): State<CategoryState>,
    payload: Result<Json<CategoryForm>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let Json(form) = payload?;
    let connection = lock_connection(&state.db_connection)?;
    let category = create_category(form, &connection)?;

    Ok((StatusCode::CREATED, Json(category.into())))
}

/// `GET /api/v1/categories/{category_id}`
pub async fn get_category_handler(
    State(state): State<CategoryState>,
    Path(category_id): Path<String>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category_id = parse_category_id(&category_id)?;
    let connection = lock_connection(&state.db_connection)?;

    Ok(Json(get_category(category_id, &connection)?.into()))
}

/// `PUT /api/v1/categories/{category_id}`
pub async fn update_category_handler(
    State(state): State<CategoryState>,
    Path(category_id): Path<String>,
    payload: Result<Json<CategoryForm>, JsonRejection>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let Json(form) = payload?;
    let category_id = parse_category_id(&category_id)?;
    let connection = lock_connection(&state.db_connection)?;
    let category = update_category(category_id, form, &connection)?;

    Ok(Json(category.into()))
}

/// `DELETE /api/v1/categories/{category_id}`
pub async fn delete_category_handler(
    State(state): State<CategoryState>,
    Path(category_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let category_id = parse_category_id(&category_id)?;
    let connection = lock_connection(&state.db_connection)?;
    delete_category(category_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
