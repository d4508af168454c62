//! Database operations for transactions.

use rusqlite::{Connection, Row, ToSql, params_from_iter};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    account::{ACCOUNT_COLUMN_COUNT, ACCOUNT_COLUMNS, AccountId, map_account_columns},
    category::{CATEGORY_COLUMNS, CategoryId, map_category_columns},
    money::Money,
    transaction::{Transaction, TransactionDetails, TransactionId, TransactionStatus, start_of_day},
};

/// The transaction columns in the order expected by [map_transaction_columns].
///
/// The asset comes from the owning account, so queries must join `account`.
const TRANSACTION_COLUMNS: &str = "\"transaction\".id, \"transaction\".account_id, \
    \"transaction\".category_id, \"transaction\".amount, account.asset, \
    \"transaction\".description, \"transaction\".date, \"transaction\".status, \
    \"transaction\".created_at, \"transaction\".updated_at";

const TRANSACTION_COLUMN_COUNT: usize = 10;

/// Filters and paging for [query_transaction_details].
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    pub account_id: Option<AccountId>,
    pub category_id: Option<CategoryId>,
    /// Inclusive start and end dates.
    pub date_range: Option<(Date, Date)>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            account_id: None,
            category_id: None,
            date_range: None,
            limit: 50,
            offset: 0,
        }
    }
}

/// Initialize the transaction table and indexes.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id BLOB PRIMARY KEY,
            account_id BLOB NOT NULL REFERENCES account(id) ON DELETE CASCADE,
            category_id BLOB NOT NULL REFERENCES category(id) ON DELETE RESTRICT,
            amount INTEGER NOT NULL CHECK (amount != 0),
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('pending', 'cleared', 'cancelled')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_account ON \"transaction\"(account_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
    )?;

    Ok(())
}

/// Insert a new transaction.
pub fn insert_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO \"transaction\"
            (id, account_id, category_id, amount, description, date, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            transaction.id,
            transaction.account_id,
            transaction.category_id,
            transaction.amount.minor_units(),
            &transaction.description,
            transaction.date,
            transaction.status,
            transaction.created_at,
            transaction.updated_at,
        ),
    )?;

    Ok(())
}

/// Retrieve a single transaction by ID.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if there is no transaction with `transaction_id`.
pub fn get_transaction(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" \
            INNER JOIN account ON account.id = \"transaction\".account_id \
            WHERE \"transaction\".id = ?1"
        ))?
        .query_row([transaction_id], |row| map_transaction_columns(row, 0))
        .map_err(not_found_as_missing_transaction)
}

/// Retrieve a single transaction with its account and category.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if there is no transaction with `transaction_id`.
pub fn get_transaction_details(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<TransactionDetails, Error> {
    connection
        .prepare(&format!("{} WHERE \"transaction\".id = ?1", details_select()))?
        .query_row([transaction_id], map_details_row)
        .map_err(not_found_as_missing_transaction)
}

/// Retrieve transactions with their account and category, newest first.
pub fn query_transaction_details(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<TransactionDetails>, Error> {
    let mut conditions: Vec<&str> = Vec::new();
    let mut params: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(account_id) = query.account_id {
        conditions.push("\"transaction\".account_id = ?");
        params.push(Box::new(account_id));
    }

    if let Some(category_id) = query.category_id {
        conditions.push("\"transaction\".category_id = ?");
        params.push(Box::new(category_id));
    }

    if let Some((start, end)) = query.date_range {
        conditions.push("\"transaction\".date >= ?");
        params.push(Box::new(start_of_day(start)));

        if let Some(day_after_end) = end.next_day() {
            conditions.push("\"transaction\".date < ?");
            params.push(Box::new(start_of_day(day_after_end)));
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    params.push(Box::new(query.limit));
    params.push(Box::new(query.offset));

    // Order by creation time second to keep same-day transactions stable.
    let sql = format!(
        "{} {where_clause} \
        ORDER BY \"transaction\".date DESC, \"transaction\".created_at DESC \
        LIMIT ? OFFSET ?",
        details_select()
    );

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(params.iter()), map_details_row)?
        .map(|maybe_details| maybe_details.map_err(Error::from))
        .collect()
}

/// Overwrite the mutable fields of an existing transaction.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if the transaction does not exist.
pub fn update_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
        SET account_id = ?1, category_id = ?2, amount = ?3, description = ?4, date = ?5,
            status = ?6, updated_at = ?7
        WHERE id = ?8",
        (
            transaction.account_id,
            transaction.category_id,
            transaction.amount.minor_units(),
            &transaction.description,
            transaction.date,
            transaction.status,
            transaction.updated_at,
            transaction.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound);
    }

    Ok(())
}

/// Set the status of an existing transaction.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if the transaction does not exist.
pub fn update_transaction_status(
    transaction_id: TransactionId,
    status: TransactionStatus,
    updated_at: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET status = ?1, updated_at = ?2 WHERE id = ?3",
        (status, updated_at, transaction_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound);
    }

    Ok(())
}

/// Delete a transaction by ID.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if the transaction does not exist.
pub fn delete_transaction(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1",
        [transaction_id],
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound);
    }

    Ok(())
}

fn details_select() -> String {
    format!(
        "SELECT {TRANSACTION_COLUMNS}, {ACCOUNT_COLUMNS}, {CATEGORY_COLUMNS} \
        FROM \"transaction\" \
        INNER JOIN account ON account.id = \"transaction\".account_id \
        INNER JOIN category ON category.id = \"transaction\".category_id"
    )
}

fn not_found_as_missing_transaction(error: rusqlite::Error) -> Error {
    match error {
        rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound,
        error => error.into(),
    }
}

fn map_transaction_columns(row: &Row, start: usize) -> Result<Transaction, rusqlite::Error> {
    let minor_units = row.get(start + 3)?;
    let asset = row.get(start + 4)?;

    Ok(Transaction {
        id: row.get(start)?,
        account_id: row.get(start + 1)?,
        category_id: row.get(start + 2)?,
        amount: Money::new(asset, minor_units),
        description: row.get(start + 5)?,
        date: row.get(start + 6)?,
        status: row.get(start + 7)?,
        created_at: row.get(start + 8)?,
        updated_at: row.get(start + 9)?,
    })
}

fn map_details_row(row: &Row) -> Result<TransactionDetails, rusqlite::Error> {
    Ok(TransactionDetails {
        transaction: map_transaction_columns(row, 0)?,
        account: map_account_columns(row, TRANSACTION_COLUMN_COUNT)?,
        category: map_category_columns(row, TRANSACTION_COLUMN_COUNT + ACCOUNT_COLUMN_COUNT)?,
    })
}
