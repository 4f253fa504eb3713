//! Common types used across the application

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::shared::errors::UnitsError;

/// Decimals used when the token refuses to report its own precision.
pub const FALLBACK_DECIMALS: u8 = 18;

/// Largest precision whose scale `10^decimals` still fits in a `U256`.
pub const MAX_DECIMALS: u8 = 77;

/// Precision state of the staked token.
///
/// `Pending` means the value has not been read yet and every human-unit
/// conversion must wait. `Fallback` is the last resort for a token whose
/// `decimals()` read failed outright: 18 is used, but results are only a
/// display approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Decimals {
    Pending,
    Known(u8),
    Fallback,
}

impl Decimals {
    pub fn value(&self) -> Option<u8> {
        match self {
            Decimals::Pending => None,
            Decimals::Known(d) => Some(*d),
            Decimals::Fallback => Some(FALLBACK_DECIMALS),
        }
    }

    pub fn is_approximate(&self) -> bool {
        matches!(self, Decimals::Fallback)
    }
}

/// Staked token metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: Decimals,
}

impl TokenInfo {
    pub fn pending(address: Address) -> Self {
        Self {
            address,
            symbol: DEFAULT_SYMBOL.to_string(),
            decimals: Decimals::Pending,
        }
    }
}

/// Symbol shown when the token does not answer `symbol()`.
pub const DEFAULT_SYMBOL: &str = "BARIN";

fn ten_pow(decimals: u8) -> U256 {
    U256::from(10u64).pow(U256::from(decimals))
}

/// Render a smallest-unit amount as a decimal string.
///
/// Trailing fractional zeros are dropped, so `500 * 10^18` with 18 decimals
/// renders as `"500"` and `15 * 10^17` as `"1.5"`.
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let base = ten_pow(decimals);
    let integer = value / base;
    let fraction = value % base;
    if fraction.is_zero() {
        return integer.to_string();
    }
    let padded = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    format!("{}.{}", integer, padded.trim_end_matches('0'))
}

/// Parse a human decimal string into smallest units.
///
/// Rejects signs, exponents and more fractional digits than the token has.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (integer, fraction) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };
    if integer.is_empty() && fraction.is_empty() {
        return Err(UnitsError::Malformed(amount.to_string()));
    }
    let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !digits_only(integer) || !digits_only(fraction) {
        return Err(UnitsError::Malformed(amount.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            amount: amount.to_string(),
            decimals,
        });
    }

    let digits = format!(
        "{}{:0<width$}",
        if integer.is_empty() { "0" } else { integer },
        fraction,
        width = decimals as usize
    );
    U256::from_str_radix(&digits, 10).map_err(|_| UnitsError::Overflow(amount.to_string()))
}

/// Convert smallest units into a float. Only for ratios such as APR.
pub fn to_human_f64(value: U256, decimals: u8) -> f64 {
    format_units(value, decimals).parse::<f64>().unwrap_or_default()
}
