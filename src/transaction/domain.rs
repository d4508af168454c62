//! Core transaction domain types and request parsing.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, macros::format_description};

use crate::{
    Error,
    account::{Account, AccountId},
    category::{Category, CategoryId},
    database_id::DatabaseId,
    money::{Asset, Money},
};

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

/// The settlement state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Not yet settled. Counted in the pending balance.
    Pending,
    /// Settled. Counted in the current balance.
    Cleared,
    /// Voided. Not counted in any balance.
    Cancelled,
}

impl TransactionStatus {
    /// Every status, in display order.
    pub const ALL: [TransactionStatus; 3] = [
        TransactionStatus::Pending,
        TransactionStatus::Cleared,
        TransactionStatus::Cancelled,
    ];

    /// The lowercase name used in requests and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Cleared => "cleared",
            TransactionStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| Error::InvalidStatus(s.to_owned()))
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income recorded against an account.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub category_id: CategoryId,
    /// Always denominated in the owning account's asset. Income is positive
    /// and expenses are negative.
    pub amount: Money,
    pub description: String,
    /// When the transaction happened, in UTC.
    pub date: OffsetDateTime,
    pub status: TransactionStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A transaction together with its account and category.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDetails {
    pub transaction: Transaction,
    pub account: Account,
    pub category: Category,
}

/// A create or update request after the amount and date have been parsed.
///
/// The remaining fields are checked by the transaction use cases.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionInput {
    pub account_id: String,
    pub category_id: String,
    /// The amount as submitted. It is re-labelled with the account's asset
    /// and sign-corrected for the category before it is stored.
    pub amount: Money,
    pub description: String,
    /// `None` means "now" on create and "keep the stored date" on update.
    pub date: Option<OffsetDateTime>,
    pub status: Option<String>,
}

impl TransactionInput {
    /// Parse the raw text fields of a transaction request.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] or [Error::InvalidDate] if the amount or
    /// date cannot be parsed.
    pub fn parse(
        account_id: String,
        category_id: String,
        amount: &str,
        description: String,
        date: &str,
        status: Option<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            account_id,
            category_id,
            amount: parse_amount(amount)?,
            description,
            date: parse_date(date)?.map(start_of_day),
            status: status.filter(|status| !status.trim().is_empty()),
        })
    }
}

/// Parse a submitted amount.
///
/// The account is not known yet, so the amount is held as US dollars until
/// the use case re-labels it with the account's asset.
pub fn parse_amount(text: &str) -> Result<Money, Error> {
    Money::parse(Asset::USD, text)
}

/// Parse a `YYYY-MM-DD` date. An empty string means no date was given.
///
/// # Errors
/// Returns [Error::InvalidDate] for any other shape, including other
/// separators, day-first or month-first orderings and impossible dates.
pub fn parse_date(text: &str) -> Result<Option<Date>, Error> {
    let text = text.trim();

    if text.is_empty() {
        return Ok(None);
    }

    let bytes = text.as_bytes();
    let has_expected_shape = bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        });

    if !has_expected_shape {
        return Err(Error::InvalidDate);
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| Error::InvalidDate)
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: Date) -> OffsetDateTime {
    date.midnight().assume_utc()
}
