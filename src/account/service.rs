//! Account use cases: validation and orchestration on top of the account table.

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    account::{
        Account, AccountForm, AccountId, ValidatedAccount,
        db::{
            delete_account as delete_account_row, get_account, insert_account,
            update_account as update_account_row,
        },
    },
    balance::refresh_balance_best_effort,
    database_id::new_id,
};

/// Validate and store a new account, then initialize its balance.
///
/// A failure to initialize the balance is logged and does not fail the call.
pub fn create_account(form: AccountForm, connection: &Connection) -> Result<Account, Error> {
    let validated = ValidatedAccount::try_from(form)?;
    let now = OffsetDateTime::now_utc();

    let account = Account {
        id: new_id(),
        name: validated.name,
        account_type: validated.account_type,
        asset: validated.asset,
        description: validated.description,
        created_at: now,
        updated_at: now,
    };

    insert_account(&account, connection)?;
    refresh_balance_best_effort(account.id, connection);

    Ok(account)
}

/// Validate the new fields and overwrite an existing account.
///
/// # Errors
/// Returns [Error::AccountNotFound] if the account does not exist.
pub fn update_account(
    account_id: AccountId,
    form: AccountForm,
    connection: &Connection,
) -> Result<Account, Error> {
    let validated = ValidatedAccount::try_from(form)?;
    let existing = get_account(account_id, connection)?;

    let account = Account {
        name: validated.name,
        account_type: validated.account_type,
        asset: validated.asset,
        description: validated.description,
        updated_at: OffsetDateTime::now_utc(),
        ..existing
    };

    update_account_row(&account, connection)?;

    Ok(account)
}

/// Delete an account. Its transactions and balance are removed with it.
///
/// # Errors
/// Returns [Error::AccountNotFound] if the account does not exist.
pub fn delete_account(account_id: AccountId, connection: &Connection) -> Result<(), Error> {
    get_account(account_id, connection)?;
    delete_account_row(account_id, connection)
}

#[cfg(test)]
mod account_service_tests {
    use crate::{
        Error,
        account::{
            AccountForm, AccountType, create_account, delete_account, get_account, update_account,
        },
        balance::get_balance,
        database_id::new_id,
        db::get_test_connection,
        money::{Asset, Money},
    };

    fn account_form(name: &str, account_type: &str, asset: &str) -> AccountForm {
        AccountForm {
            name: name.to_owned(),
            account_type: account_type.to_owned(),
            asset: asset.to_owned(),
            description: String::new(),
        }
    }

    #[test]
    fn create_account_initializes_zero_balance() {
        let connection = get_test_connection();

        let account = create_account(account_form("Everyday", "checking", "BRL"), &connection)
            .expect("Could not create account");

        let balance = get_balance(account.id, &connection).expect("Balance was not initialized");
        assert_eq!(balance.current, Money::zero(Asset::BRL));
        assert_eq!(balance.pending, Money::zero(Asset::BRL));
        assert_eq!(balance.available, Money::zero(Asset::BRL));
    }

    #[test]
    fn create_account_rejects_invalid_form() {
        let connection = get_test_connection();

        let result = create_account(account_form("", "checking", "USD"), &connection);

        assert_eq!(result, Err(Error::EmptyAccountName));
    }

    #[test]
    fn update_account_keeps_creation_time() {
        let connection = get_test_connection();
        let account = create_account(account_form("Card", "checking", "USD"), &connection).unwrap();

        let updated = update_account(
            account.id,
            account_form("Card", "credit", "USD"),
            &connection,
        )
        .expect("Could not update account");

        assert_eq!(updated.created_at, account.created_at);
        assert_eq!(updated.account_type, AccountType::Credit);
        assert_eq!(
            get_account(account.id, &connection).unwrap().account_type,
            AccountType::Credit
        );
    }

    #[test]
    fn update_missing_account_is_not_found() {
        let connection = get_test_connection();

        let result = update_account(new_id(), account_form("Card", "credit", "USD"), &connection);

        assert_eq!(result, Err(Error::AccountNotFound));
    }

    #[test]
    fn delete_missing_account_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(
            delete_account(new_id(), &connection),
            Err(Error::AccountNotFound)
        );
    }

    #[test]
    fn delete_account_removes_balance() {
        let connection = get_test_connection();
        let account = create_account(account_form("Wallet", "cash", "USD"), &connection).unwrap();

        delete_account(account.id, &connection).expect("Could not delete account");

        assert_eq!(
            get_account(account.id, &connection),
            Err(Error::AccountNotFound)
        );
        assert_eq!(get_balance(account.id, &connection), Err(Error::NotFound));
    }
}
