//! Cached account balances and the cross-account summary.

use time::OffsetDateTime;

use crate::{
    account::{Account, AccountId},
    money::Money,
};

/// The cached totals for one account.
///
/// `current` sums cleared transactions, `pending` sums pending ones and
/// `available` is their sum. Cancelled transactions count towards nothing.
/// The row can always be rebuilt from the transaction table.
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub account_id: AccountId,
    pub current: Money,
    pub pending: Money,
    pub available: Money,
    pub last_calculated: OffsetDateTime,
}

/// A balance together with the account it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceWithAccount {
    pub account: Account,
    pub balance: Balance,
}

/// Totals across every account, computed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceSummary {
    /// The sum of `current` over every account that is not a credit account.
    pub total_assets: Money,
    /// The absolute sum of `current` over credit accounts.
    pub total_liabilities: Money,
    pub net_worth: Money,
    pub last_calculated: OffsetDateTime,
}
