//! Balance use cases.
//!
//! Balances are only ever written through [recalculate_balance], so a stale
//! row is repaired by the next refresh of the same account.

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    account::{AccountId, get_account, get_all_accounts},
    balance::{
        BalanceSummary, BalanceWithAccount,
        db::{self, get_balance, recalculate_balance},
    },
    money::Asset,
};

/// Recompute the balance of `account_id`, logging instead of failing.
///
/// Used after a write that has already succeeded.
pub fn refresh_balance_best_effort(account_id: AccountId, connection: &Connection) {
    if let Err(error) = recalculate_balance(account_id, OffsetDateTime::now_utc(), connection) {
        tracing::warn!("could not refresh the balance of account {account_id}: {error}");
    }
}

/// Get the balance of an account, calculating it first if it has never been.
///
/// # Errors
/// Returns [Error::AccountNotFound] if the account does not exist.
pub fn get_balance_by_account_id(
    account_id: AccountId,
    connection: &Connection,
) -> Result<BalanceWithAccount, Error> {
    let account = get_account(account_id, connection)?;

    let balance = match get_balance(account_id, connection) {
        Ok(balance) => balance,
        Err(Error::NotFound) => {
            recalculate_balance(account_id, OffsetDateTime::now_utc(), connection)?;
            get_balance(account_id, connection)?
        }
        Err(error) => return Err(error),
    };

    Ok(BalanceWithAccount { account, balance })
}

/// Get every stored balance with its account.
pub fn get_all_balances(connection: &Connection) -> Result<Vec<BalanceWithAccount>, Error> {
    db::get_all_balances(connection)
}

/// Recompute the balance of one account.
///
/// # Errors
/// Returns [Error::AccountNotFound] if the account does not exist.
pub fn refresh_account_balance(
    account_id: AccountId,
    connection: &Connection,
) -> Result<(), Error> {
    get_account(account_id, connection)?;

    recalculate_balance(account_id, OffsetDateTime::now_utc(), connection)
}

/// Recompute the balance of every account.
///
/// An account whose balance cannot be recomputed is logged and skipped.
///
/// # Errors
/// Returns an error only if the accounts cannot be listed.
pub fn refresh_all_balances(connection: &Connection) -> Result<(), Error> {
    for account in get_all_accounts(connection)? {
        refresh_balance_best_effort(account.id, connection);
    }

    Ok(())
}

/// Total assets, liabilities and net worth, labelled with `asset`.
///
/// No exchange rates are applied.
pub fn get_balance_summary(asset: Asset, connection: &Connection) -> Result<BalanceSummary, Error> {
    db::get_balance_summary(asset, connection)
}
