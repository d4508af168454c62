//! Transaction use cases.
//!
//! Every mutation keeps two rules: a stored amount is denominated in the
//! owning account's asset, and its sign follows the category type (income
//! positive, expense negative). Balances of every affected account are
//! refreshed after the write; a failed refresh is logged and left for the
//! next mutation to repair.

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    account::{AccountId, get_account, parse_account_id},
    balance::refresh_balance_best_effort,
    category::{CategoryId, CategoryType, get_category, parse_category_id},
    database_id::new_id,
    money::Money,
    transaction::{
        Transaction, TransactionDetails, TransactionId, TransactionInput, TransactionQuery,
        TransactionStatus,
        db::{
            delete_transaction as delete_transaction_row, get_transaction, insert_transaction,
            query_transaction_details, update_transaction as update_transaction_row,
            update_transaction_status as update_transaction_status_row,
        },
    },
};

/// The largest page of transactions that can be requested at once.
pub const MAX_TRANSACTION_LIMIT: u32 = 500;

/// The fields of a [TransactionInput] that pass validation.
struct ValidatedInput {
    account_id: AccountId,
    category_id: CategoryId,
    description: String,
    status: Option<TransactionStatus>,
}

fn validate(input: &TransactionInput) -> Result<ValidatedInput, Error> {
    if input.account_id.trim().is_empty() {
        return Err(Error::MissingAccountId);
    }

    if input.category_id.trim().is_empty() {
        return Err(Error::MissingCategoryId);
    }

    if input.amount.is_zero() {
        return Err(Error::ZeroAmount);
    }

    let description = input.description.trim();

    if description.is_empty() {
        return Err(Error::EmptyDescription);
    }

    let status = input
        .status
        .as_deref()
        .map(str::parse::<TransactionStatus>)
        .transpose()?;

    Ok(ValidatedInput {
        account_id: parse_account_id(&input.account_id)?,
        category_id: parse_category_id(&input.category_id)?,
        description: description.to_owned(),
        status,
    })
}

/// Force the sign of `amount` to match the category: income positive, expense negative.
fn apply_category_sign(amount: Money, category_type: CategoryType) -> Money {
    match category_type {
        CategoryType::Income => amount.abs(),
        CategoryType::Expense => amount.negative(),
    }
}

/// Load the account and category and produce the amount that should be stored.
fn resolve_amount(
    amount: Money,
    validated: &ValidatedInput,
    connection: &Connection,
) -> Result<Money, Error> {
    let account = get_account(validated.account_id, connection)?;
    let amount = amount.with_asset(account.asset);
    let category = get_category(validated.category_id, connection)?;

    Ok(apply_category_sign(amount, category.category_type))
}

/// Validate and store a new transaction, then refresh the account's balance.
///
/// The status defaults to cleared and the date defaults to now.
pub fn create_transaction(
    input: TransactionInput,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let validated = validate(&input)?;
    let amount = resolve_amount(input.amount, &validated, connection)?;
    let now = OffsetDateTime::now_utc();

    let transaction = Transaction {
        id: new_id(),
        account_id: validated.account_id,
        category_id: validated.category_id,
        amount,
        description: validated.description,
        date: input.date.unwrap_or(now),
        status: validated.status.unwrap_or(TransactionStatus::Cleared),
        created_at: now,
        updated_at: now,
    };

    insert_transaction(&transaction, connection)?;
    refresh_balance_best_effort(transaction.account_id, connection);

    Ok(transaction)
}

/// Validate and overwrite an existing transaction, then refresh the balance
/// of its account, and of its previous account if it moved.
///
/// An unset date or status keeps the stored value.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if the transaction does not exist.
pub fn update_transaction(
    transaction_id: TransactionId,
    input: TransactionInput,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let validated = validate(&input)?;
    let existing = get_transaction(transaction_id, connection)?;
    let previous_account_id = existing.account_id;
    let amount = resolve_amount(input.amount, &validated, connection)?;

    let transaction = Transaction {
        account_id: validated.account_id,
        category_id: validated.category_id,
        amount,
        description: validated.description,
        date: input.date.unwrap_or(existing.date),
        status: validated.status.unwrap_or(existing.status),
        updated_at: OffsetDateTime::now_utc(),
        ..existing
    };

    update_transaction_row(&transaction, connection)?;

    refresh_balance_best_effort(transaction.account_id, connection);
    if previous_account_id != transaction.account_id {
        refresh_balance_best_effort(previous_account_id, connection);
    }

    Ok(transaction)
}

/// Change only the status of a transaction and refresh its account's balance.
pub fn update_transaction_status(
    transaction_id: TransactionId,
    status: &str,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let status: TransactionStatus = status.parse()?;
    let existing = get_transaction(transaction_id, connection)?;
    let updated_at = OffsetDateTime::now_utc();

    update_transaction_status_row(transaction_id, status, updated_at, connection)?;
    refresh_balance_best_effort(existing.account_id, connection);

    Ok(Transaction {
        status,
        updated_at,
        ..existing
    })
}

/// Delete a transaction and refresh its account's balance.
///
/// # Errors
/// Returns [Error::TransactionNotFound] if the transaction does not exist.
pub fn delete_transaction(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let existing = get_transaction(transaction_id, connection)?;

    delete_transaction_row(transaction_id, connection)?;
    refresh_balance_best_effort(existing.account_id, connection);

    Ok(())
}

/// List transactions with their account and category.
///
/// # Errors
/// Returns [Error::AccountNotFound] or [Error::CategoryNotFound] if a filter
/// names a missing account or category, [Error::InvalidLimit] if the limit is zero or above
/// [MAX_TRANSACTION_LIMIT], and [Error::InvalidDateRange] if the range ends
/// before it starts.
pub fn list_transactions(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<TransactionDetails>, Error> {
    if query.limit == 0 || query.limit > MAX_TRANSACTION_LIMIT {
        return Err(Error::InvalidLimit(MAX_TRANSACTION_LIMIT));
    }

    if query.date_range.is_some_and(|(start, end)| start > end) {
        return Err(Error::InvalidDateRange);
    }

    if let Some(account_id) = query.account_id {
        get_account(account_id, connection)?;
    }

    if let Some(category_id) = query.category_id {
        get_category(category_id, connection)?;
    }

    query_transaction_details(query, connection)
}

#[cfg(test)]
mod transaction_service_tests {
    use time::{Duration, OffsetDateTime, macros::{date, datetime}};

    use crate::{
        Error,
        account::Account,
        balance::get_balance,
        category::{Category, CategoryType},
        database_id::new_id,
        db::get_test_connection,
        money::{Asset, Money},
        test_utils::{create_test_account, create_test_category},
        transaction::{
            TransactionInput, TransactionQuery, TransactionStatus, create_transaction,
            delete_transaction, get_transaction, list_transactions, update_transaction,
            update_transaction_status,
        },
    };

    fn input(account: &Account, category: &Category, amount: &str, date: &str) -> TransactionInput {
        TransactionInput::parse(
            account.id.to_string(),
            category.id.to_string(),
            amount,
            "Groceries".to_owned(),
            date,
            None,
        )
        .expect("Could not parse transaction input")
    }

    #[test]
    fn create_defaults_date_to_now_and_status_to_cleared() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let category = create_test_category(&connection, "Salary", CategoryType::Income);
        let before = OffsetDateTime::now_utc();

        let transaction = create_transaction(input(&account, &category, "10", ""), &connection)
            .expect("Could not create transaction");

        let after = OffsetDateTime::now_utc();
        assert!(transaction.date >= before && transaction.date <= after);
        assert!(after - transaction.date < Duration::seconds(5));
        assert_eq!(transaction.status, TransactionStatus::Cleared);
    }

    #[test]
    fn create_uses_given_date_at_midnight_utc() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let category = create_test_category(&connection, "Salary", CategoryType::Income);

        let transaction =
            create_transaction(input(&account, &category, "10", "2024-01-15"), &connection)
                .unwrap();

        assert_eq!(transaction.date, datetime!(2024-01-15 00:00 UTC));
        let stored = get_transaction(transaction.id, &connection).unwrap();
        assert_eq!(stored.date, datetime!(2024-01-15 00:00 UTC));
    }

    #[test]
    fn create_relabels_amount_with_account_asset() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "BRL");
        let category = create_test_category(&connection, "Salary", CategoryType::Income);

        let transaction =
            create_transaction(input(&account, &category, "100.50", ""), &connection).unwrap();

        assert_eq!(transaction.amount, Money::new(Asset::BRL, 10050));
        let stored = get_transaction(transaction.id, &connection).unwrap();
        assert_eq!(stored.amount, Money::new(Asset::BRL, 10050));
    }

    #[test]
    fn create_with_expense_category_stores_negative_amount() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let category = create_test_category(&connection, "Rent", CategoryType::Expense);

        let transaction =
            create_transaction(input(&account, &category, "1200", ""), &connection).unwrap();

        assert_eq!(transaction.amount.minor_units(), -120000);
        let stored = get_transaction(transaction.id, &connection).unwrap();
        assert!(stored.amount.is_negative());
    }

    #[test]
    fn create_with_income_category_stores_positive_amount() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let category = create_test_category(&connection, "Salary", CategoryType::Income);

        let transaction =
            create_transaction(input(&account, &category, "-50", ""), &connection).unwrap();

        assert_eq!(transaction.amount.minor_units(), 5000);
    }

    #[test]
    fn create_rejects_invalid_input() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let category = create_test_category(&connection, "Salary", CategoryType::Income);

        let mut zero = input(&account, &category, "0", "");
        assert_eq!(
            create_transaction(zero.clone(), &connection),
            Err(Error::ZeroAmount)
        );

        zero.amount = Money::new(Asset::USD, 1);
        zero.account_id = String::new();
        assert_eq!(
            create_transaction(zero.clone(), &connection),
            Err(Error::MissingAccountId)
        );

        let mut no_category = input(&account, &category, "1", "");
        no_category.category_id = " ".to_owned();
        assert_eq!(
            create_transaction(no_category, &connection),
            Err(Error::MissingCategoryId)
        );

        let mut no_description = input(&account, &category, "1", "");
        no_description.description = "   ".to_owned();
        assert_eq!(
            create_transaction(no_description, &connection),
            Err(Error::EmptyDescription)
        );

        let mut bad_status = input(&account, &category, "1", "");
        bad_status.status = Some("settled".to_owned());
        assert_eq!(
            create_transaction(bad_status, &connection),
            Err(Error::InvalidStatus("settled".to_owned()))
        );
    }

    #[test]
    fn create_against_missing_account_or_category_fails() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let category = create_test_category(&connection, "Salary", CategoryType::Income);

        let mut missing_account = input(&account, &category, "1", "");
        missing_account.account_id = new_id().to_string();
        assert_eq!(
            create_transaction(missing_account, &connection),
            Err(Error::AccountNotFound)
        );

        let mut missing_category = input(&account, &category, "1", "");
        missing_category.category_id = new_id().to_string();
        assert_eq!(
            create_transaction(missing_category, &connection),
            Err(Error::CategoryNotFound)
        );
    }

    #[test]
    fn create_refreshes_balance() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let salary = create_test_category(&connection, "Salary", CategoryType::Income);
        let food = create_test_category(&connection, "Food", CategoryType::Expense);

        create_transaction(input(&account, &salary, "100", ""), &connection).unwrap();
        create_transaction(input(&account, &food, "30.25", ""), &connection).unwrap();

        let balance = get_balance(account.id, &connection).unwrap();
        assert_eq!(balance.current, Money::new(Asset::USD, 6975));
    }

    #[test]
    fn update_sign_corrects_for_new_category() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let salary = create_test_category(&connection, "Salary", CategoryType::Income);
        let food = create_test_category(&connection, "Food", CategoryType::Expense);
        let transaction =
            create_transaction(input(&account, &salary, "40", ""), &connection).unwrap();

        let updated = update_transaction(
            transaction.id,
            input(&account, &food, "40", ""),
            &connection,
        )
        .expect("Could not update transaction");

        assert_eq!(updated.amount.minor_units(), -4000);
        let balance = get_balance(account.id, &connection).unwrap();
        assert_eq!(balance.current.minor_units(), -4000);
    }

    #[test]
    fn update_with_empty_date_keeps_stored_date() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let category = create_test_category(&connection, "Salary", CategoryType::Income);
        let transaction =
            create_transaction(input(&account, &category, "1", "2023-06-01"), &connection).unwrap();

        let updated = update_transaction(
            transaction.id,
            input(&account, &category, "2", ""),
            &connection,
        )
        .unwrap();

        assert_eq!(updated.date.date(), date!(2023 - 06 - 01));
        assert_eq!(updated.created_at, transaction.created_at);
    }

    #[test]
    fn moving_transaction_refreshes_both_accounts() {
        let connection = get_test_connection();
        let old_account = create_test_account(&connection, "checking", "USD");
        let new_account = create_test_account(&connection, "savings", "USD");
        let category = create_test_category(&connection, "Salary", CategoryType::Income);
        let transaction =
            create_transaction(input(&old_account, &category, "25", ""), &connection).unwrap();

        update_transaction(
            transaction.id,
            input(&new_account, &category, "25", ""),
            &connection,
        )
        .unwrap();

        let old_balance = get_balance(old_account.id, &connection).unwrap();
        let new_balance = get_balance(new_account.id, &connection).unwrap();
        assert!(old_balance.current.is_zero());
        assert_eq!(new_balance.current.minor_units(), 2500);
    }

    #[test]
    fn update_missing_transaction_is_not_found() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let category = create_test_category(&connection, "Salary", CategoryType::Income);

        let result = update_transaction(new_id(), input(&account, &category, "1", ""), &connection);

        assert_eq!(result, Err(Error::TransactionNotFound));
    }

    #[test]
    fn update_status_moves_amount_between_balances() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let category = create_test_category(&connection, "Salary", CategoryType::Income);
        let transaction =
            create_transaction(input(&account, &category, "5", ""), &connection).unwrap();

        let updated = update_transaction_status(transaction.id, "pending", &connection)
            .expect("Could not update status");

        assert_eq!(updated.status, TransactionStatus::Pending);
        let balance = get_balance(account.id, &connection).unwrap();
        assert!(balance.current.is_zero());
        assert_eq!(balance.pending.minor_units(), 500);
        assert_eq!(balance.available.minor_units(), 500);
    }

    #[test]
    fn delete_transaction_refreshes_balance() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let category = create_test_category(&connection, "Salary", CategoryType::Income);
        let transaction =
            create_transaction(input(&account, &category, "5", ""), &connection).unwrap();

        delete_transaction(transaction.id, &connection).expect("Could not delete transaction");

        assert_eq!(
            get_transaction(transaction.id, &connection),
            Err(Error::TransactionNotFound)
        );
        let balance = get_balance(account.id, &connection).unwrap();
        assert!(balance.current.is_zero());
    }

    #[test]
    fn delete_missing_transaction_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(
            delete_transaction(new_id(), &connection),
            Err(Error::TransactionNotFound)
        );
    }

    #[test]
    fn list_rejects_bad_paging_and_ranges() {
        let connection = get_test_connection();

        let zero_limit = TransactionQuery {
            limit: 0,
            ..Default::default()
        };
        let backwards = TransactionQuery {
            date_range: Some((date!(2024 - 02 - 01), date!(2024 - 01 - 01))),
            ..Default::default()
        };

        assert_eq!(
            list_transactions(&zero_limit, &connection),
            Err(Error::InvalidLimit(500))
        );
        assert_eq!(
            list_transactions(&backwards, &connection),
            Err(Error::InvalidDateRange)
        );
        assert_eq!(
            list_transactions(&TransactionQuery::default(), &connection),
            Ok(vec![])
        );
    }
}
