// src/report.rs
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::pool::{ActiveTotals, PoolSetView, PoolView, SnapshotSet};
use crate::shared::types::format_units;

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardReport {
    // Token
    pub token: TokenDetails,

    // Wallet
    pub account: Option<Address>,
    pub balance: Option<String>,

    // Pools
    pub pools: Vec<PoolView>,
    pub totals: ActiveTotals,

    // Metadata
    pub generated_at: DateTime<Utc>,
    pub snapshot_fetched_at: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenDetails {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    /// Decimals came from the fallback, amounts may be off
    pub approximate: bool,
}

impl DashboardReport {
    pub fn new(set: &SnapshotSet, view: PoolSetView) -> Self {
        Self {
            token: TokenDetails {
                address: set.token.address,
                symbol: set.token.symbol.clone(),
                decimals: view.decimals,
                approximate: view.approximate,
            },
            account: set.account,
            balance: set.balance.map(|b| format_units(b, view.decimals)),
            pools: view.pools,
            totals: view.totals,
            generated_at: Utc::now(),
            snapshot_fetched_at: set.fetched_at,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
