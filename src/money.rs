//! Monetary values stored as integer minor units of a recognized asset.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

use crate::Error;

/// A currency or other asset that amounts can be denominated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Asset {
    code: &'static str,
    symbol: &'static str,
    decimals: u32,
}

impl Asset {
    /// United States dollar.
    pub const USD: Asset = Asset::new("USD", "$", 2);
    /// Euro.
    pub const EUR: Asset = Asset::new("EUR", "€", 2);
    /// Pound sterling.
    pub const GBP: Asset = Asset::new("GBP", "£", 2);
    /// Brazilian real.
    pub const BRL: Asset = Asset::new("BRL", "R$", 2);
    /// Canadian dollar.
    pub const CAD: Asset = Asset::new("CAD", "CA$", 2);
    /// Australian dollar.
    pub const AUD: Asset = Asset::new("AUD", "A$", 2);
    /// New Zealand dollar.
    pub const NZD: Asset = Asset::new("NZD", "NZ$", 2);
    /// Swiss franc.
    pub const CHF: Asset = Asset::new("CHF", "CHF", 2);
    /// Japanese yen.
    pub const JPY: Asset = Asset::new("JPY", "¥", 0);
    /// Bitcoin, in satoshis.
    pub const BTC: Asset = Asset::new("BTC", "₿", 8);
    /// Ether.
    pub const ETH: Asset = Asset::new("ETH", "Ξ", 8);

    /// Every recognized asset.
    pub const ALL: [Asset; 11] = [
        Asset::USD,
        Asset::EUR,
        Asset::GBP,
        Asset::BRL,
        Asset::CAD,
        Asset::AUD,
        Asset::NZD,
        Asset::CHF,
        Asset::JPY,
        Asset::BTC,
        Asset::ETH,
    ];

    const fn new(code: &'static str, symbol: &'static str, decimals: u32) -> Self {
        Self {
            code,
            symbol,
            decimals,
        }
    }

    /// Look up a recognized asset by its code, ignoring case and surrounding whitespace.
    pub fn find(code: &str) -> Option<Asset> {
        let code = code.trim();

        Asset::ALL
            .into_iter()
            .find(|asset| asset.code.eq_ignore_ascii_case(code))
    }

    /// Look up a recognized asset by its code.
    ///
    /// # Errors
    /// Returns [Error::UnknownAsset] if `code` is not a recognized asset.
    pub fn parse(code: &str) -> Result<Asset, Error> {
        Asset::find(code).ok_or_else(|| Error::UnknownAsset(code.to_owned()))
    }

    /// The asset code, e.g. "USD".
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// The display symbol, e.g. "$".
    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// The number of decimal places in one whole unit.
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    fn minor_units_per_unit(&self) -> u64 {
        10u64.pow(self.decimals)
    }
}

impl Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl ToSql for Asset {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code))
    }
}

impl FromSql for Asset {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;

        Asset::find(code)
            .ok_or_else(|| FromSqlError::Other(Box::new(Error::UnknownAsset(code.to_owned()))))
    }
}

/// The largest magnitude, in minor units, that [Money::parse] accepts.
///
/// Keeps sums over thousands of transactions inside `i64`.
pub const MAX_PARSED_MINOR_UNITS: i64 = 1_000_000_000_000_000;

/// An amount of an asset, counted in the asset's smallest unit (cents, satoshis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Money {
    asset: Asset,
    minor_units: i64,
}

impl Money {
    /// Create an amount of `minor_units` of `asset`.
    pub fn new(asset: Asset, minor_units: i64) -> Self {
        Self { asset, minor_units }
    }

    /// Parse a decimal string such as "12.50" or "-3" into an amount of `asset`.
    ///
    /// Digits beyond the asset's precision are rounded half away from zero.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if `text` is not a plain decimal number
    /// or its magnitude exceeds [MAX_PARSED_MINOR_UNITS].
    pub fn parse(asset: Asset, text: &str) -> Result<Self, Error> {
        let mut decimal =
            Decimal::from_str_exact(text.trim()).map_err(|_| Error::InvalidAmount)?;
        decimal = decimal
            .round_dp_with_strategy(asset.decimals, RoundingStrategy::MidpointAwayFromZero);
        decimal.rescale(asset.decimals);

        let minor_units = i64::try_from(decimal.mantissa()).map_err(|_| Error::InvalidAmount)?;
        if minor_units.unsigned_abs() > MAX_PARSED_MINOR_UNITS.unsigned_abs() {
            return Err(Error::InvalidAmount);
        }

        Ok(Self::new(asset, minor_units))
    }

    /// A zero amount of `asset`.
    pub fn zero(asset: Asset) -> Self {
        Self::new(asset, 0)
    }

    /// The asset the amount is denominated in.
    pub fn asset(&self) -> Asset {
        self.asset
    }

    /// The amount in the asset's smallest unit.
    pub fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// The same number of minor units labelled with a different asset.
    ///
    /// No exchange rate is applied.
    pub fn with_asset(self, asset: Asset) -> Self {
        Self::new(asset, self.minor_units)
    }

    /// The amount with a positive sign.
    pub fn abs(self) -> Self {
        Self::new(self.asset, self.minor_units.saturating_abs())
    }

    /// The amount with a negative sign.
    pub fn negative(self) -> Self {
        Self::new(self.asset, -self.minor_units.saturating_abs())
    }

    /// Whether the amount is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.minor_units == 0
    }

    /// Whether the amount is below zero.
    pub fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    /// The whole and fractional parts of the absolute amount.
    pub(crate) fn split_units(&self) -> (u64, u64) {
        let per_unit = self.asset.minor_units_per_unit();
        let magnitude = self.minor_units.unsigned_abs();

        (magnitude / per_unit, magnitude % per_unit)
    }

    /// The amount as a plain decimal string, e.g. "-1234.50".
    pub fn to_decimal_string(&self) -> String {
        let (whole, fraction) = self.split_units();
        let sign = if self.is_negative() { "-" } else { "" };

        if self.asset.decimals == 0 {
            format!("{sign}{whole}")
        } else {
            format!(
                "{sign}{whole}.{fraction:0width$}",
                width = self.asset.decimals as usize
            )
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} ({}) {}]",
            self.asset.code,
            self.asset.symbol,
            self.to_decimal_string()
        )
    }
}
