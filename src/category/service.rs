//! Category use cases.

use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    category::{
        Category, CategoryForm, CategoryId, ValidatedCategory,
        db::{
            delete_category as delete_category_row, get_category, insert_category,
            update_category as update_category_row,
        },
    },
    database_id::new_id,
};

/// Validate and store a new category.
///
/// # Errors
/// Returns [Error::DuplicateCategory] if the name is taken for the same type.
pub fn create_category(form: CategoryForm, connection: &Connection) -> Result<Category, Error> {
    let validated = ValidatedCategory::try_from(form)?;
    let now = OffsetDateTime::now_utc();

    let category = Category {
        id: new_id(),
        name: validated.name,
        category_type: validated.category_type,
        description: validated.description,
        color: validated.color,
        created_at: now,
        updated_at: now,
    };

    insert_category(&category, connection)?;

    Ok(category)
}

/// Validate the new fields and overwrite an existing category.
pub fn update_category(
    category_id: CategoryId,
    form: CategoryForm,
    connection: &Connection,
) -> Result<Category, Error> {
    let validated = ValidatedCategory::try_from(form)?;
    let existing = get_category(category_id, connection)?;

    let category = Category {
        name: validated.name,
        category_type: validated.category_type,
        description: validated.description,
        color: validated.color,
        updated_at: OffsetDateTime::now_utc(),
        ..existing
    };

    update_category_row(&category, connection)?;

    Ok(category)
}

/// Delete a category.
///
/// The storage layer refuses to delete a category that transactions still
/// reference, which is reported as [Error::CategoryInUse].
pub fn delete_category(category_id: CategoryId, connection: &Connection) -> Result<(), Error> {
    match delete_category_row(category_id, connection) {
        Err(Error::ForeignKeyViolation) => Err(Error::CategoryInUse),
        result => result,
    }
}

#[cfg(test)]
mod category_service_tests {
    use crate::{
        Error,
        category::{
            CategoryForm, CategoryType, create_category, delete_category, get_category,
            update_category,
        },
        database_id::new_id,
        db::get_test_connection,
        test_utils::{create_test_account, create_test_category, create_test_transaction},
        transaction::TransactionStatus,
    };

    fn category_form(name: &str, category_type: &str) -> CategoryForm {
        CategoryForm {
            name: name.to_owned(),
            category_type: category_type.to_owned(),
            description: "".to_owned(),
            color: "".to_owned(),
        }
    }

    #[test]
    fn create_category_applies_default_color() {
        let connection = get_test_connection();

        let category = create_category(category_form("Rent", "expense"), &connection)
            .expect("Could not create category");

        assert_eq!(category.color, "#6B7280");
        assert_eq!(get_category(category.id, &connection).unwrap().name, "Rent");
    }

    #[test]
    fn create_duplicate_category_fails() {
        let connection = get_test_connection();
        create_category(category_form("Rent", "expense"), &connection).unwrap();

        let result = create_category(category_form("Rent", "expense"), &connection);

        assert_eq!(result, Err(Error::DuplicateCategory));
    }

    #[test]
    fn update_category_changes_type() {
        let connection = get_test_connection();
        let category = create_category(category_form("Refund", "expense"), &connection).unwrap();

        let updated = update_category(category.id, category_form("Refund", "income"), &connection)
            .expect("Could not update category");

        assert_eq!(updated.category_type, CategoryType::Income);
        assert_eq!(updated.created_at, category.created_at);
    }

    #[test]
    fn update_missing_category_is_not_found() {
        let connection = get_test_connection();

        let result = update_category(new_id(), category_form("Refund", "income"), &connection);

        assert_eq!(result, Err(Error::CategoryNotFound));
    }

    #[test]
    fn delete_unused_category_succeeds() {
        let connection = get_test_connection();
        let category = create_category(category_form("Rent", "expense"), &connection).unwrap();

        delete_category(category.id, &connection).expect("Could not delete category");

        assert_eq!(
            get_category(category.id, &connection),
            Err(Error::CategoryNotFound)
        );
    }

    #[test]
    fn delete_category_in_use_fails() {
        let connection = get_test_connection();
        let account = create_test_account(&connection, "checking", "USD");
        let category = create_test_category(&connection, "Rent", CategoryType::Expense);
        create_test_transaction(
            &connection,
            &account,
            &category,
            -100,
            TransactionStatus::Cleared,
        );

        let result = delete_category(category.id, &connection);

        assert_eq!(result, Err(Error::CategoryInUse));
        assert!(get_category(category.id, &connection).is_ok());
    }

    #[test]
    fn delete_missing_category_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(
            delete_category(new_id(), &connection),
            Err(Error::CategoryNotFound)
        );
    }
}
