//! Rows inserted straight through the repositories.
//!
//! Fixtures bypass the use cases, so no balance rows are written.

use rusqlite::Connection;
use time::{Date, OffsetDateTime};

use crate::{
    account::{Account, AccountType, insert_account},
    category::{Category, CategoryType, DEFAULT_CATEGORY_COLOR, insert_category},
    database_id::new_id,
    money::{Asset, Money},
    transaction::{Transaction, TransactionStatus, insert_transaction, start_of_day},
};

#[track_caller]
pub(crate) fn create_test_account(
    connection: &Connection,
    account_type: &str,
    asset: &str,
) -> Account {
    let now = OffsetDateTime::now_utc();
    let account_type: AccountType = account_type.parse().expect("Invalid account type");
    let account = Account {
        id: new_id(),
        name: format!("Test {account_type}"),
        account_type,
        asset: Asset::parse(asset).expect("Invalid asset"),
        description: String::new(),
        created_at: now,
        updated_at: now,
    };

    insert_account(&account, connection).expect("Could not insert test account");

    account
}

#[track_caller]
pub(crate) fn create_test_category(
    connection: &Connection,
    name: &str,
    category_type: CategoryType,
) -> Category {
    let now = OffsetDateTime::now_utc();
    let category = Category {
        id: new_id(),
        name: name.to_owned(),
        category_type,
        description: String::new(),
        color: DEFAULT_CATEGORY_COLOR.to_owned(),
        created_at: now,
        updated_at: now,
    };

    insert_category(&category, connection).expect("Could not insert test category");

    category
}

/// Insert a transaction of `minor_units` in the account's asset, dated now.
#[track_caller]
pub(crate) fn create_test_transaction(
    connection: &Connection,
    account: &Account,
    category: &Category,
    minor_units: i64,
    status: TransactionStatus,
) -> Transaction {
    insert_test_transaction(
        connection,
        account,
        category,
        minor_units,
        status,
        OffsetDateTime::now_utc(),
    )
}

/// Insert a cleared transaction dated at the start of `date`.
#[track_caller]
pub(crate) fn create_test_transaction_on(
    connection: &Connection,
    account: &Account,
    category: &Category,
    date: Date,
) -> Transaction {
    insert_test_transaction(
        connection,
        account,
        category,
        -100,
        TransactionStatus::Cleared,
        start_of_day(date),
    )
}

#[track_caller]
fn insert_test_transaction(
    connection: &Connection,
    account: &Account,
    category: &Category,
    minor_units: i64,
    status: TransactionStatus,
    date: OffsetDateTime,
) -> Transaction {
    let now = OffsetDateTime::now_utc();
    let transaction = Transaction {
        id: new_id(),
        account_id: account.id,
        category_id: category.id,
        amount: Money::new(account.asset, minor_units),
        description: format!("Test {}", category.name),
        date,
        status,
        created_at: now,
        updated_at: now,
    };

    insert_transaction(&transaction, connection).expect("Could not insert test transaction");

    transaction
}
