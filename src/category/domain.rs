//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::DatabaseId};

/// Database identifier for a category.
pub type CategoryId = DatabaseId;

/// The color used when a category is created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6B7280";

/// Whether money in a category flows in or out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    /// Money coming in. Amounts are stored as positive numbers.
    Income,
    /// Money going out. Amounts are stored as negative numbers.
    Expense,
}

impl CategoryType {
    /// Every category type, in display order.
    pub const ALL: [CategoryType; 2] = [CategoryType::Income, CategoryType::Expense];

    /// The lowercase name used in requests and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "income",
            CategoryType::Expense => "expense",
        }
    }
}

impl FromStr for CategoryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "income" => Ok(CategoryType::Income),
            "expense" => Ok(CategoryType::Expense),
            _ => Err(Error::InvalidCategoryType(s.to_owned())),
        }
    }
}

impl Display for CategoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for CategoryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A label for grouping transactions (e.g., 'Groceries', 'Salary').
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub category_type: CategoryType,
    pub description: String,
    /// A hex color string such as "#6B7280".
    pub color: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Form data for category creation and editing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryForm {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
}

/// The validated fields of a [CategoryForm].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCategory {
    pub name: String,
    pub category_type: CategoryType,
    pub description: String,
    pub color: String,
}

impl TryFrom<CategoryForm> for ValidatedCategory {
    type Error = Error;

    fn try_from(form: CategoryForm) -> Result<Self, Self::Error> {
        let name = form.name.trim();

        if name.is_empty() {
            return Err(Error::EmptyCategoryName);
        }

        Ok(Self {
            name: name.to_owned(),
            category_type: form.category_type.parse()?,
            description: form.description.trim().to_owned(),
            color: parse_color(&form.color)?,
        })
    }
}

/// Accept `#RGB` or `#RRGGBB`, falling back to [DEFAULT_CATEGORY_COLOR] when blank.
fn parse_color(color: &str) -> Result<String, Error> {
    let color = color.trim();

    if color.is_empty() {
        return Ok(DEFAULT_CATEGORY_COLOR.to_owned());
    }

    let is_hex_color = color.strip_prefix('#').is_some_and(|digits| {
        matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
    });

    if is_hex_color {
        Ok(color.to_owned())
    } else {
        Err(Error::InvalidColor(color.to_owned()))
    }
}

#[cfg(test)]
mod validated_category_tests {
    use crate::{
        Error,
        category::{CategoryForm, CategoryType, DEFAULT_CATEGORY_COLOR, ValidatedCategory},
    };

    fn form(name: &str, category_type: &str, color: &str) -> CategoryForm {
        CategoryForm {
            name: name.to_owned(),
            category_type: category_type.to_owned(),
            description: String::new(),
            color: color.to_owned(),
        }
    }

    #[test]
    fn color_defaults_to_gray() {
        let got = ValidatedCategory::try_from(form("Groceries", "expense", "")).unwrap();

        assert_eq!(got.color, DEFAULT_CATEGORY_COLOR);
        assert_eq!(got.category_type, CategoryType::Expense);
    }

    #[test]
    fn accepts_short_and_long_hex_colors() {
        assert!(ValidatedCategory::try_from(form("Pay", "income", "#0f0")).is_ok());
        assert!(ValidatedCategory::try_from(form("Pay", "income", "#10B981")).is_ok());
    }

    #[test]
    fn rejects_bad_color() {
        let got = ValidatedCategory::try_from(form("Pay", "income", "green"));

        assert_eq!(got, Err(Error::InvalidColor("green".to_owned())));
    }

    #[test]
    fn rejects_empty_name() {
        let got = ValidatedCategory::try_from(form("  ", "income", ""));

        assert_eq!(got, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn rejects_unknown_type() {
        let got = ValidatedCategory::try_from(form("Transfer", "transfer", ""));

        assert_eq!(got, Err(Error::InvalidCategoryType("transfer".to_owned())));
    }
}
