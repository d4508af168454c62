//! Database operations for accounts.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    account::{Account, AccountId},
};

/// The account columns in the order expected by [map_account_columns].
pub(crate) const ACCOUNT_COLUMNS: &str = "account.id, account.name, account.type, account.asset, \
    account.description, account.created_at, account.updated_at";

/// The number of columns in [ACCOUNT_COLUMNS].
pub(crate) const ACCOUNT_COLUMN_COUNT: usize = 7;

/// Initialize the account table.
pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS account (
            id BLOB PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL
                CHECK (type IN ('checking', 'savings', 'credit', 'investment', 'cash')),
            asset TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_account_name ON account(name);",
    )?;

    Ok(())
}

/// Insert a new account.
pub fn insert_account(account: &Account, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO account (id, name, type, asset, description, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        (
            account.id,
            &account.name,
            account.account_type,
            account.asset,
            &account.description,
            account.created_at,
            account.updated_at,
        ),
    )?;

    Ok(())
}

/// Retrieve a single account by ID.
///
/// # Errors
/// Returns [Error::AccountNotFound] if there is no account with `account_id`.
pub fn get_account(account_id: AccountId, connection: &Connection) -> Result<Account, Error> {
    connection
        .prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account WHERE account.id = ?1"
        ))?
        .query_row([account_id], map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::AccountNotFound,
            error => error.into(),
        })
}

/// Retrieve all accounts ordered alphabetically by name.
pub fn get_all_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM account
            ORDER BY account.name ASC, account.created_at ASC"
        ))?
        .query_map([], map_row)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Overwrite the mutable fields of an existing account.
///
/// # Errors
/// Returns [Error::AccountNotFound] if the account does not exist.
pub fn update_account(account: &Account, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE account SET name = ?1, type = ?2, asset = ?3, description = ?4, updated_at = ?5
        WHERE id = ?6",
        (
            &account.name,
            account.account_type,
            account.asset,
            &account.description,
            account.updated_at,
            account.id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::AccountNotFound);
    }

    Ok(())
}

/// Delete an account along with its transactions and balance.
///
/// # Errors
/// Returns [Error::AccountNotFound] if the account does not exist.
pub fn delete_account(account_id: AccountId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM account WHERE id = ?1", [account_id])?;

    if rows_affected == 0 {
        return Err(Error::AccountNotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Account, rusqlite::Error> {
    map_account_columns(row, 0)
}

/// Map the [ACCOUNT_COLUMNS] starting at column index `start` to an [Account].
pub(crate) fn map_account_columns(row: &Row, start: usize) -> Result<Account, rusqlite::Error> {
    Ok(Account {
        id: row.get(start)?,
        name: row.get(start + 1)?,
        account_type: row.get(start + 2)?,
        asset: row.get(start + 3)?,
        description: row.get(start + 4)?,
        created_at: row.get(start + 5)?,
        updated_at: row.get(start + 6)?,
    })
}
