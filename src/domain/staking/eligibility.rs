//! Stake / unstake eligibility predicates
//!
//! Amounts are compared in the token's smallest units, so a check never
//! accepts an amount that differs from the balance only past the precision
//! of a decimal type. A malformed amount is a rejected predicate, never an
//! error.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

use crate::shared::errors::UnitsError;
use crate::shared::types::{format_units, parse_units};

/// Why an amount cannot be staked or unstaked
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Ineligible {
    #[error("amount is not a number")]
    Malformed,

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("amount {amount} exceeds wallet balance {balance}")]
    ExceedsBalance { amount: String, balance: String },

    #[error("amount {amount} is below the pool minimum {minimum}")]
    BelowMinimum { amount: String, minimum: String },

    #[error("nothing staked in this pool")]
    NothingStaked,

    #[error("amount {amount} exceeds staked {staked}")]
    ExceedsStake { amount: String, staked: String },

    #[error("amount cannot be expressed in token units: {0}")]
    Unrepresentable(String),
}

/// Why a new pool's parameters were refused before submission
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidPool {
    #[error("reward per second must be greater than 0")]
    RewardRate,

    #[error("minimum stake must be greater than 0")]
    MinStake,

    #[error("end time must be in the future")]
    EndTimeNotFuture,
}

/// Parse a user-entered amount. `None` for empty or non-numeric input.
///
/// Only good for sign checks: `Decimal` keeps 28 significant digits.
pub fn parse_amount(amount: &str) -> Option<Decimal> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

/// Exact smallest-unit value of a positive user-entered amount
fn positive_units(amount: &str, decimals: u8) -> Result<U256, Ineligible> {
    match parse_units(amount, decimals) {
        Ok(units) if units.is_zero() => Err(Ineligible::NotPositive),
        Ok(units) => Ok(units),
        Err(UnitsError::Empty) => Err(Ineligible::Malformed),
        // signed input such as "-5" or "-0"
        Err(UnitsError::Malformed(_)) => match parse_amount(amount) {
            Some(value) if value <= Decimal::ZERO => Err(Ineligible::NotPositive),
            _ => Err(Ineligible::Malformed),
        },
        Err(e) => Err(Ineligible::Unrepresentable(e.to_string())),
    }
}

/// Accepts `amount` when `0 < amount <= balance` and `amount >= pool_min_stake`.
///
/// `balance` and `pool_min_stake` are smallest units; the accepted amount is
/// returned in smallest units too.
pub fn check_stake(
    amount: &str,
    balance: U256,
    pool_min_stake: U256,
    decimals: u8,
) -> Result<U256, Ineligible> {
    let value = positive_units(amount, decimals)?;
    if value > balance {
        return Err(Ineligible::ExceedsBalance {
            amount: format_units(value, decimals),
            balance: format_units(balance, decimals),
        });
    }
    if value < pool_min_stake {
        return Err(Ineligible::BelowMinimum {
            amount: format_units(value, decimals),
            minimum: format_units(pool_min_stake, decimals),
        });
    }
    Ok(value)
}

/// Accepts `amount` when something is staked and `0 < amount <= current_user_stake`.
pub fn check_unstake(
    amount: &str,
    current_user_stake: U256,
    decimals: u8,
) -> Result<U256, Ineligible> {
    if current_user_stake.is_zero() {
        return Err(Ineligible::NothingStaked);
    }
    let value = positive_units(amount, decimals)?;
    if value > current_user_stake {
        return Err(Ineligible::ExceedsStake {
            amount: format_units(value, decimals),
            staked: format_units(current_user_stake, decimals),
        });
    }
    Ok(value)
}

pub fn can_stake(amount: &str, balance: U256, pool_min_stake: U256, decimals: u8) -> bool {
    check_stake(amount, balance, pool_min_stake, decimals).is_ok()
}

pub fn can_unstake(amount: &str, current_user_stake: U256, decimals: u8) -> bool {
    check_unstake(amount, current_user_stake, decimals).is_ok()
}

/// Client-side checks for `addPool`: positive rate and minimum, future end
pub fn validate_new_pool(
    reward_per_second: &str,
    min_stake: &str,
    end_time: u64,
    now: u64,
) -> Result<(), InvalidPool> {
    match parse_amount(reward_per_second) {
        Some(v) if v > Decimal::ZERO => {}
        _ => return Err(InvalidPool::RewardRate),
    }
    match parse_amount(min_stake) {
        Some(v) if v > Decimal::ZERO => {}
        _ => return Err(InvalidPool::MinStake),
    }
    if end_time <= now {
        return Err(InvalidPool::EndTimeNotFuture);
    }
    Ok(())
}
