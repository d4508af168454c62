//! Core account domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::DatabaseId, money::Asset};

/// Database identifier for an account.
pub type AccountId = DatabaseId;

/// The kind of financial account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// An everyday transaction account.
    Checking,
    /// A savings account.
    Savings,
    /// A credit card or other liability.
    Credit,
    /// A brokerage or other investment account.
    Investment,
    /// Physical cash.
    Cash,
}

impl AccountType {
    /// Every account type, in display order.
    pub const ALL: [AccountType; 5] = [
        AccountType::Checking,
        AccountType::Savings,
        AccountType::Credit,
        AccountType::Investment,
        AccountType::Cash,
    ];

    /// The lowercase name used in requests and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
            AccountType::Credit => "credit",
            AccountType::Investment => "investment",
            AccountType::Cash => "cash",
        }
    }

    /// Whether balances of this account type count as liabilities.
    pub fn is_liability(&self) -> bool {
        matches!(self, AccountType::Credit)
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountType::ALL
            .into_iter()
            .find(|account_type| account_type.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidAccountType(s.to_owned()))
    }
}

impl Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A financial account that transactions are recorded against.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The display name, e.g. "Everyday".
    pub name: String,
    /// What kind of account this is.
    pub account_type: AccountType,
    /// The asset every amount in this account is denominated in.
    pub asset: Asset,
    /// Free-form notes.
    pub description: String,
    /// When the account was created.
    pub created_at: OffsetDateTime,
    /// When the account was last modified.
    pub updated_at: OffsetDateTime,
}

/// The raw fields for creating or updating an account, as sent by clients.
///
/// Shared by the JSON API and the HTML forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountForm {
    /// The account name.
    pub name: String,
    /// One of the [AccountType] names.
    #[serde(rename = "type")]
    pub account_type: String,
    /// A recognized asset code, e.g. "USD".
    pub asset: String,
    /// Optional notes.
    #[serde(default)]
    pub description: String,
}

/// The validated fields of an [AccountForm].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedAccount {
    pub name: String,
    pub account_type: AccountType,
    pub asset: Asset,
    pub description: String,
}

impl TryFrom<AccountForm> for ValidatedAccount {
    type Error = Error;

    fn try_from(form: AccountForm) -> Result<Self, Self::Error> {
        let name = form.name.trim();

        if name.is_empty() {
            return Err(Error::EmptyAccountName);
        }

        Ok(Self {
            name: name.to_owned(),
            account_type: form.account_type.parse()?,
            asset: Asset::parse(&form.asset)?,
            description: form.description.trim().to_owned(),
        })
    }
}
