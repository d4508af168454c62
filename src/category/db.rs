//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryType},
};

/// The category columns in the order expected by [map_category_columns].
pub(crate) const CATEGORY_COLUMNS: &str = "category.id, category.name, category.type, \
    category.description, category.color, category.created_at, category.updated_at";

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id BLOB PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            description TEXT NOT NULL DEFAULT '',
            color TEXT NOT NULL DEFAULT '#6B7280',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE(name, type)
        );",
    )?;

    Ok(())
}

/// Insert a new category.
///
/// # Errors
/// Returns [Error::DuplicateCategory] if a category with the same name and type exists.
pub fn insert_category(category: &Category, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO category (id, name, type, description, color, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            category.id,
            &category.name,
            category.category_type,
            &category.description,
            &category.color,
            category.created_at,
            category.updated_at,
        ),
    )?;

    Ok(())
}

/// Retrieve a single category by ID.
///
/// # Errors
/// Returns [Error::CategoryNotFound] if there is no category with `category_id`.
pub fn get_category(category_id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE category.id = ?1"
        ))?
        .query_row([category_id], map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::CategoryNotFound,
            error => error.into(),
        })
}

/// Retrieve all categories ordered by type and then name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category ORDER BY category.type ASC, category.name ASC"
        ))?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Retrieve the categories of one type ordered by name.
pub fn get_categories_by_type(
    category_type: CategoryType,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE category.type = ?1 \
            ORDER BY category.name ASC"
        ))?
        .query_map([category_type], map_row)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Overwrite the mutable fields of an existing category.
///
/// # Errors
/// Returns [Error::CategoryNotFound] if the category does not exist, or
/// [Error::DuplicateCategory] if the new name and type clash with another category.
pub fn update_category(category: &Category, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE category SET name = ?1, type = ?2, description = ?3, color = ?4, updated_at = ?5
        WHERE id = ?6",
        (
            &category.name,
            category.category_type,
            &category.description,
            &category.color,
            category.updated_at,
            category.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::CategoryNotFound);
    }

    Ok(())
}

/// Delete a category by ID.
///
/// # Errors
/// Returns [Error::CategoryNotFound] if the category does not exist, or
/// [Error::ForeignKeyViolation] if transactions still reference it.
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [category_id])?;

    if rows_affected == 0 {
        return Err(Error::CategoryNotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    map_category_columns(row, 0)
}

/// Map the [CATEGORY_COLUMNS] starting at column index `start` to a [Category].
pub(crate) fn map_category_columns(row: &Row, start: usize) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(start)?,
        name: row.get(start + 1)?,
        category_type: row.get(start + 2)?,
        description: row.get(start + 3)?,
        color: row.get(start + 4)?,
        created_at: row.get(start + 5)?,
        updated_at: row.get(start + 6)?,
    })
}
