//! Database operations for balances.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    account::{ACCOUNT_COLUMN_COUNT, ACCOUNT_COLUMNS, AccountId, map_account_columns},
    balance::{Balance, BalanceSummary, BalanceWithAccount},
    money::{Asset, Money},
};

/// The balance columns in the order expected by [map_balance_columns].
///
/// The asset comes from the owning account, so queries must join `account`.
const BALANCE_COLUMNS: &str = "balance.account_id, balance.current, balance.pending, \
    balance.available, balance.last_calculated, account.asset";

/// Initialize the balance table.
pub fn create_balance_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS balance (
            account_id BLOB PRIMARY KEY REFERENCES account(id) ON DELETE CASCADE,
            current INTEGER NOT NULL,
            pending INTEGER NOT NULL,
            available INTEGER NOT NULL,
            last_calculated TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// Recompute the balance of `account_id` from its transactions and store it.
///
/// An account without transactions gets a zero balance.
///
/// # Errors
/// Returns [Error::ForeignKeyViolation] if the account does not exist.
pub fn recalculate_balance(
    account_id: AccountId,
    calculated_at: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO balance (account_id, current, pending, available, last_calculated)
        SELECT
            ?1,
            COALESCE(SUM(CASE WHEN status = 'cleared' THEN amount END), 0),
            COALESCE(SUM(CASE WHEN status = 'pending' THEN amount END), 0),
            COALESCE(SUM(CASE WHEN status IN ('cleared', 'pending') THEN amount END), 0),
            ?2
        FROM \"transaction\"
        WHERE account_id = ?1
        ON CONFLICT(account_id) DO UPDATE SET
            current = excluded.current,
            pending = excluded.pending,
            available = excluded.available,
            last_calculated = excluded.last_calculated",
        (account_id, calculated_at),
    )?;

    Ok(())
}

/// Retrieve the stored balance of an account.
///
/// # Errors
/// Returns [Error::NotFound] if no balance has been calculated for the account.
pub fn get_balance(account_id: AccountId, connection: &Connection) -> Result<Balance, Error> {
    let balance = connection.query_row(
        &format!(
            "SELECT {BALANCE_COLUMNS} FROM balance
            INNER JOIN account ON account.id = balance.account_id
            WHERE balance.account_id = ?1"
        ),
        [account_id],
        |row| map_balance_columns(row, 0),
    )?;

    Ok(balance)
}

/// Retrieve every stored balance with its account, ordered by account name.
pub fn get_all_balances(connection: &Connection) -> Result<Vec<BalanceWithAccount>, Error> {
    connection
        .prepare(&format!(
            "SELECT {ACCOUNT_COLUMNS}, {BALANCE_COLUMNS} FROM balance
            INNER JOIN account ON account.id = balance.account_id
            ORDER BY account.name ASC"
        ))?
        .query_map([], |row| {
            Ok(BalanceWithAccount {
                account: map_account_columns(row, 0)?,
                balance: map_balance_columns(row, ACCOUNT_COLUMN_COUNT)?,
            })
        })?
        .map(|maybe_balance| maybe_balance.map_err(Error::from))
        .collect()
}

/// Total the stored balances, splitting liability accounts out.
///
/// Minor units from every account are added as they are and labelled `asset`.
/// Which accounts are liabilities is decided by [AccountType::is_liability].
///
/// [AccountType::is_liability]: crate::account::AccountType::is_liability
pub fn get_balance_summary(asset: Asset, connection: &Connection) -> Result<BalanceSummary, Error> {
    let mut assets: i64 = 0;
    let mut liabilities: i64 = 0;
    let mut last_calculated: Option<OffsetDateTime> = None;

    for BalanceWithAccount { account, balance } in get_all_balances(connection)? {
        let total = if account.account_type.is_liability() {
            &mut liabilities
        } else {
            &mut assets
        };
        *total = total.saturating_add(balance.current.minor_units());
        last_calculated = last_calculated.max(Some(balance.last_calculated));
    }

    let total_assets = Money::new(asset, assets);
    let total_liabilities = Money::new(asset, liabilities).abs();

    Ok(BalanceSummary {
        total_assets,
        total_liabilities,
        net_worth: Money::new(
            asset,
            total_assets
                .minor_units()
                .saturating_sub(total_liabilities.minor_units()),
        ),
        last_calculated: last_calculated.unwrap_or_else(OffsetDateTime::now_utc),
    })
}

fn map_balance_columns(row: &Row, start: usize) -> Result<Balance, rusqlite::Error> {
    let asset: Asset = row.get(start + 5)?;

    Ok(Balance {
        account_id: row.get(start)?,
        current: Money::new(asset, row.get(start + 1)?),
        pending: Money::new(asset, row.get(start + 2)?),
        available: Money::new(asset, row.get(start + 3)?),
        last_calculated: row.get(start + 4)?,
    })
}
