//! Reads a full snapshot batch from the contracts

use alloy_primitives::Address;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::pool::{PoolSnapshot, SnapshotSet};
use crate::domain::staking::{StakingContract, TokenContract};
use crate::shared::errors::ContractError;
use crate::shared::types::{Decimals, TokenInfo, DEFAULT_SYMBOL, MAX_DECIMALS};
use crate::shared::utils::unix_now;

/// Fetches token metadata and every pool concurrently
pub struct PoolReader {
    staking: Arc<dyn StakingContract>,
    token: Arc<dyn TokenContract>,
    max_pools: Option<u64>,
}

impl PoolReader {
    pub fn new(
        staking: Arc<dyn StakingContract>,
        token: Arc<dyn TokenContract>,
        max_pools: Option<u64>,
    ) -> Self {
        Self {
            staking,
            token,
            max_pools,
        }
    }

    /// Token symbol and decimals.
    ///
    /// A failed `decimals()` read, or a precision too large to scale in a
    /// `U256`, falls back to 18 and is flagged approximate. A failed
    /// `symbol()` read falls back to the default symbol.
    pub async fn read_token_info(&self) -> TokenInfo {
        let (decimals, symbol) = tokio::join!(self.token.decimals(), self.token.symbol());

        let decimals = match decimals {
            Ok(d) if d > MAX_DECIMALS => {
                warn!("⚠️ Token reports {} decimals, using fallback of 18", d);
                Decimals::Fallback
            }
            Ok(d) => Decimals::Known(d),
            Err(e) => {
                warn!("⚠️ Token decimals unavailable, using fallback of 18: {}", e);
                Decimals::Fallback
            }
        };
        let symbol = symbol.unwrap_or_else(|e| {
            warn!("Token symbol unavailable: {}", e);
            DEFAULT_SYMBOL.to_string()
        });

        TokenInfo {
            address: self.token.address(),
            symbol,
            decimals,
        }
    }

    /// Read one pool and, with an account, its stake in that pool
    pub async fn read_pool(
        &self,
        pool_id: u64,
        account: Option<Address>,
    ) -> Result<PoolSnapshot, ContractError> {
        let pool = self.staking.get_pool(pool_id).await?;
        let snapshot = PoolSnapshot::new(pool_id, pool);
        match account {
            Some(account) => {
                let stake = self.staking.get_user_stake(account, pool_id).await?;
                Ok(snapshot.with_user_stake(stake.amount))
            }
            None => Ok(snapshot),
        }
    }

    /// Read the whole set. Every per-pool read must settle and succeed;
    /// a partial batch is never returned.
    pub async fn read_snapshot_set(
        &self,
        account: Option<Address>,
    ) -> Result<SnapshotSet, ContractError> {
        let token = self.read_token_info().await;
        let count = self.staking.pool_count().await?;
        let limit = self.max_pools.map_or(count, |max| count.min(max));
        if limit < count {
            info!("Reading first {} of {} pools", limit, count);
        }

        let reads = (0..limit).map(|pool_id| self.read_pool(pool_id, account));
        let results = join_all(reads).await;

        let mut pools = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(snapshot) => pools.push(snapshot),
                Err(e) => {
                    warn!("❌ Pool read failed: {}", e);
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let balance = match account {
            Some(account) => Some(self.token.balance_of(account).await?),
            None => None,
        };

        info!("✅ Read {} pools", pools.len());
        Ok(SnapshotSet {
            pools,
            token,
            account,
            balance,
            fetched_at: unix_now(),
        })
    }
}
