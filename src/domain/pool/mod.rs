//! Pool domain - staking pool snapshots and derived statistics

mod pool_manager;
mod pool_analyzer;

pub use pool_manager::PoolManager;
pub use pool_analyzer::{PoolAnalyzer, SECONDS_PER_YEAR};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::types::TokenInfo;

/// Pool record as returned by the staking contract's `pools(pid)` getter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPool {
    pub reward_per_second: U256,
    pub min_stake: U256,
    /// Unix seconds
    pub end_timestamp: u64,
    pub total_staked: U256,
    pub acc_reward_per_share: U256,
    pub last_reward_time: U256,
    pub exists: bool,
}

/// Point-in-time copy of one pool, optionally with the connected account's stake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool_id: u64,
    pub pool: RawPool,
    /// `None` when no account is connected
    pub user_staked: Option<U256>,
}

impl PoolSnapshot {
    pub fn new(pool_id: u64, pool: RawPool) -> Self {
        Self {
            pool_id,
            pool,
            user_staked: None,
        }
    }

    pub fn with_user_stake(mut self, amount: U256) -> Self {
        self.user_staked = Some(amount);
        self
    }

    pub fn is_active_at(&self, now: u64) -> bool {
        self.pool.end_timestamp > now
    }
}

/// Immutable set of snapshots from a single refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSet {
    pub pools: Vec<PoolSnapshot>,
    pub token: TokenInfo,
    pub account: Option<Address>,
    /// Wallet balance of the connected account, smallest units
    pub balance: Option<U256>,
    /// Unix seconds
    pub fetched_at: u64,
}

impl SnapshotSet {
    pub fn pool(&self, pool_id: u64) -> Option<&PoolSnapshot> {
        self.pools.iter().find(|p| p.pool_id == pool_id)
    }
}

/// Annualized yield of a pool.
///
/// A pool with nothing staked has no dilution, so its yield is reported as
/// `Unbounded` instead of a number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum AnnualYield {
    Unbounded,
    Percent(f64),
}

impl AnnualYield {
    pub fn percent(&self) -> Option<f64> {
        match self {
            AnnualYield::Unbounded => None,
            AnnualYield::Percent(p) => Some(*p),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, AnnualYield::Unbounded)
    }
}

impl fmt::Display for AnnualYield {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnualYield::Unbounded => write!(f, "∞"),
            AnnualYield::Percent(p) => write!(f, "{:.2}%", p),
        }
    }
}

/// Display fields derived from a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolView {
    pub pool_id: u64,
    pub annualized_yield: AnnualYield,
    pub total_value_locked: String,
    pub min_stake: String,
    /// `"<min>/∞"`, the contract has no per-pool cap
    pub min_max: String,
    pub reward_per_second: String,
    pub is_active: bool,
    pub exists: bool,
    pub end_date: String,
    pub end_time: String,
    pub user_staked: Option<String>,
}

/// Aggregates over the pools active at evaluation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTotals {
    pub active_pool_count: usize,
    /// Human units, two decimals
    pub active_total_staked: String,
    /// Human units per second
    pub active_total_reward_rate: String,
}

/// Output of the analyzer for a whole snapshot set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSetView {
    pub pools: Vec<PoolView>,
    pub totals: ActiveTotals,
    pub decimals: u8,
    /// Set when decimals came from the fallback instead of the token
    pub approximate: bool,
    pub evaluated_at: u64,
}

impl PoolSetView {
    pub fn pool(&self, pool_id: u64) -> Option<&PoolView> {
        self.pools.iter().find(|p| p.pool_id == pool_id)
    }
}
