//! Application services - dashboard use cases

use alloy_primitives::{Address, TxHash, U256};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::context::{
    AppContext, LoadingKey, NotificationKind, TransactionRecord, TxKind, TxStatus,
};
use crate::domain::pool::{
    PoolAnalyzer, PoolManager, PoolSetView, PoolSnapshot, PoolView, SnapshotSet,
};
use crate::domain::staking::{
    check_stake, check_unstake, parse_amount, validate_new_pool, BestPool, Ineligible,
    InvalidPool, NewPool, StakingContract, TokenContract,
};
use crate::infrastructure::blockchain::PoolReader;
use crate::shared::errors::{AppError, ContractError, PoolError};
use crate::shared::types::parse_units;
use crate::shared::utils::{unix_now, unix_now_millis};

/// Result of an eligibility check: the accepted amount in smallest units,
/// or why it was refused
pub type Eligibility = Result<U256, Ineligible>;

/// Why a write was refused before anything was submitted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error(transparent)]
    Ineligible(#[from] Ineligible),

    #[error(transparent)]
    InvalidPool(#[from] InvalidPool),
}

/// Outcome of a write intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Hashes of the submitted transactions, in submission order
    Submitted(Vec<TxHash>),
    Rejected(Rejection),
}

/// Pool and user details for one pool
#[derive(Debug, Clone)]
pub struct PoolDetail {
    pub view: PoolView,
    pub snapshot: PoolSnapshot,
    pub unlock_time: Option<u64>,
    pub reward_debt: Option<U256>,
}

/// Dashboard use cases over the staking and token contracts
pub struct DashboardService {
    staking: Arc<dyn StakingContract>,
    token: Arc<dyn TokenContract>,
    reader: PoolReader,
    pools: PoolManager,
    account: Option<Address>,
}

impl DashboardService {
    pub fn new(
        staking: Arc<dyn StakingContract>,
        token: Arc<dyn TokenContract>,
        account: Option<Address>,
        max_pools: Option<u64>,
    ) -> Self {
        let reader = PoolReader::new(Arc::clone(&staking), Arc::clone(&token), max_pools);
        Self {
            staking,
            token,
            reader,
            pools: PoolManager::new(),
            account,
        }
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    fn require_account(&self) -> Result<Address, AppError> {
        self.account.ok_or_else(|| {
            AppError::WalletError("no account connected, pass --account".to_string())
        })
    }

    /// Read a full snapshot set and swap it in. On failure the previous set
    /// stays current.
    pub async fn refresh(&mut self, ctx: &mut AppContext) -> Result<Arc<SnapshotSet>, AppError> {
        ctx.set_loading(LoadingKey::Global, true);
        let result = self.reader.read_snapshot_set(self.account).await;
        ctx.set_loading(LoadingKey::Global, false);

        match result {
            Ok(set) => {
                info!("🔄 Snapshot refreshed: {} pools", set.pools.len());
                self.pools.replace(set);
                ctx.clear_error();
                Ok(self.pools.current()?)
            }
            Err(e) => {
                error!("❌ Refresh failed: {}", e);
                ctx.set_error(e.to_string());
                self.notify_error(ctx, "Failed to load pools", &e);
                Err(e.into())
            }
        }
    }

    pub fn snapshot(&self) -> Result<Arc<SnapshotSet>, PoolError> {
        self.pools.current()
    }

    /// Derived view of the current snapshot set, evaluated at `now`
    pub fn view_at(&self, now: u64) -> Result<PoolSetView, PoolError> {
        let set = self.pools.current()?;
        PoolAnalyzer::analyze(&set.pools, set.token.decimals, now)
            .ok_or(PoolError::DecimalsPending)
    }

    pub fn view(&self) -> Result<PoolSetView, PoolError> {
        self.view_at(unix_now())
    }

    /// Fresh read of a single pool plus the account's stake record
    pub async fn pool_detail(&self, pool_id: u64) -> Result<PoolDetail, AppError> {
        let decimals = self.decimals()?;

        let pool = self.staking.get_pool(pool_id).await?;
        if !pool.exists {
            return Err(ContractError::PoolNotFound(pool_id).into());
        }
        let mut snapshot = PoolSnapshot::new(pool_id, pool);
        let mut unlock_time = None;
        let mut reward_debt = None;
        if let Some(account) = self.account {
            let stake = self.staking.get_user_stake(account, pool_id).await?;
            unlock_time = Some(stake.unlock_time);
            reward_debt = Some(stake.reward_debt);
            snapshot = snapshot.with_user_stake(stake.amount);
        }

        Ok(PoolDetail {
            view: PoolAnalyzer::analyze_pool(&snapshot, decimals, unix_now()),
            snapshot,
            unlock_time,
            reward_debt,
        })
    }

    fn decimals(&self) -> Result<u8, AppError> {
        let set = self.pools.current()?;
        Ok(set.token.decimals.value().ok_or(PoolError::DecimalsPending)?)
    }

    /// Check a stake amount against the wallet balance and the pool minimum
    pub fn check_stake(&self, pool_id: u64, amount: &str) -> Result<Eligibility, AppError> {
        self.require_account()?;
        let decimals = self.decimals()?;
        let set = self.pools.current()?;
        let pool = set.pool(pool_id).ok_or(PoolError::UnknownPool(pool_id))?;
        let balance = set.balance.unwrap_or(U256::ZERO);
        Ok(check_stake(amount, balance, pool.pool.min_stake, decimals))
    }

    /// Check an unstake amount against the account's stake in the pool
    pub fn check_unstake(&self, pool_id: u64, amount: &str) -> Result<Eligibility, AppError> {
        self.require_account()?;
        let decimals = self.decimals()?;
        let set = self.pools.current()?;
        let pool = set.pool(pool_id).ok_or(PoolError::UnknownPool(pool_id))?;
        let staked = pool.user_staked.unwrap_or(U256::ZERO);
        Ok(check_unstake(amount, staked, decimals))
    }

    fn to_units(&self, amount: &str) -> Result<Result<U256, Ineligible>, AppError> {
        let decimals = self.decimals()?;
        Ok(parse_units(amount, decimals).map_err(|e| Ineligible::Unrepresentable(e.to_string())))
    }

    fn reject(&self, ctx: &mut AppContext, rejection: Rejection) -> WriteOutcome {
        warn!("Rejected: {}", rejection);
        ctx.notify(NotificationKind::Error, "Invalid Input", rejection.to_string());
        WriteOutcome::Rejected(rejection)
    }

    fn notify_error(&self, ctx: &mut AppContext, title: &str, err: &ContractError) {
        if ctx.preferences().notifications.on_error {
            ctx.notify(NotificationKind::Error, title, err.to_string());
        }
    }

    fn record(
        ctx: &mut AppContext,
        hash: TxHash,
        kind: TxKind,
        pool_id: Option<u64>,
        amount: &str,
    ) {
        ctx.add_transaction(TransactionRecord {
            hash: hash.to_string(),
            kind,
            pool_id,
            amount: amount.to_string(),
            status: TxStatus::Pending,
            timestamp_ms: unix_now_millis(),
            block_number: None,
        });
    }

    /// Approve the staking contract, then stake. Both are submitted without
    /// waiting for confirmation.
    pub async fn stake(
        &mut self,
        ctx: &mut AppContext,
        pool_id: u64,
        amount: &str,
    ) -> Result<WriteOutcome, AppError> {
        let from = self.require_account()?;
        let units = match self.check_stake(pool_id, amount)? {
            Ok(units) => units,
            Err(reason) => return Ok(self.reject(ctx, reason.into())),
        };

        let allowance = if ctx.preferences().auto_approve { U256::MAX } else { units };
        let spender = self.staking.address();

        ctx.set_loading(LoadingKey::Staking, true);
        let approve = self.token.approve(from, spender, allowance).await;
        let approve_hash = match approve {
            Ok(hash) => hash,
            Err(e) => {
                ctx.set_loading(LoadingKey::Staking, false);
                error!("❌ Approve failed: {}", e);
                self.notify_error(ctx, "Approval Failed", &e);
                return Err(e.into());
            }
        };
        Self::record(ctx, approve_hash, TxKind::Approve, Some(pool_id), amount);

        let stake = self.staking.stake(from, pool_id, units).await;
        ctx.set_loading(LoadingKey::Staking, false);
        match stake {
            Ok(hash) => {
                info!("✅ Stake of {} in pool {} submitted", amount, pool_id);
                Self::record(ctx, hash, TxKind::Stake, Some(pool_id), amount);
                ctx.clear_stake_amount();
                if ctx.preferences().notifications.on_stake {
                    ctx.notify(
                        NotificationKind::Info,
                        "Transaction Submitted",
                        format!("Staking {} in pool {}", amount, pool_id),
                    );
                }
                Ok(WriteOutcome::Submitted(vec![approve_hash, hash]))
            }
            Err(e) => {
                error!("❌ Stake failed: {}", e);
                self.notify_error(ctx, "Stake Failed", &e);
                Err(e.into())
            }
        }
    }

    pub async fn unstake(
        &mut self,
        ctx: &mut AppContext,
        pool_id: u64,
        amount: &str,
    ) -> Result<WriteOutcome, AppError> {
        let from = self.require_account()?;
        let units = match self.check_unstake(pool_id, amount)? {
            Ok(units) => units,
            Err(reason) => return Ok(self.reject(ctx, reason.into())),
        };

        ctx.set_loading(LoadingKey::Staking, true);
        let result = self.staking.unstake(from, pool_id, units).await;
        ctx.set_loading(LoadingKey::Staking, false);
        match result {
            Ok(hash) => {
                info!("✅ Unstake of {} from pool {} submitted", amount, pool_id);
                Self::record(ctx, hash, TxKind::Unstake, Some(pool_id), amount);
                if ctx.preferences().notifications.on_unstake {
                    ctx.notify(
                        NotificationKind::Info,
                        "Transaction Submitted",
                        format!("Unstaking {} from pool {}", amount, pool_id),
                    );
                }
                Ok(WriteOutcome::Submitted(vec![hash]))
            }
            Err(e) => {
                error!("❌ Unstake failed: {}", e);
                self.notify_error(ctx, "Unstake Failed", &e);
                Err(e.into())
            }
        }
    }

    pub async fn claim(
        &mut self,
        ctx: &mut AppContext,
        pool_id: u64,
    ) -> Result<WriteOutcome, AppError> {
        let from = self.require_account()?;

        ctx.set_loading(LoadingKey::Claiming, true);
        let result = self.staking.claim_rewards(from, pool_id).await;
        ctx.set_loading(LoadingKey::Claiming, false);
        match result {
            Ok(hash) => {
                info!("✅ Claim for pool {} submitted", pool_id);
                Self::record(ctx, hash, TxKind::Claim, Some(pool_id), "0");
                if ctx.preferences().notifications.on_claim {
                    ctx.notify(
                        NotificationKind::Info,
                        "Transaction Submitted",
                        format!("Claiming rewards from pool {}", pool_id),
                    );
                }
                Ok(WriteOutcome::Submitted(vec![hash]))
            }
            Err(e) => {
                error!("❌ Claim failed: {}", e);
                self.notify_error(ctx, "Claim Failed", &e);
                Err(e.into())
            }
        }
    }

    /// Submit a new pool. Amounts are human units of the staked token,
    /// `end_time` is unix seconds.
    pub async fn add_pool(
        &mut self,
        ctx: &mut AppContext,
        reward_per_second: &str,
        min_stake: &str,
        end_time: u64,
    ) -> Result<WriteOutcome, AppError> {
        let from = self.require_account()?;
        if let Err(reason) = validate_new_pool(reward_per_second, min_stake, end_time, unix_now()) {
            return Ok(self.reject(ctx, reason.into()));
        }

        let reward_units = match self.to_units(reward_per_second)? {
            Ok(units) => units,
            Err(reason) => return Ok(self.reject(ctx, reason.into())),
        };
        let min_units = match self.to_units(min_stake)? {
            Ok(units) => units,
            Err(reason) => return Ok(self.reject(ctx, reason.into())),
        };

        let pool = NewPool {
            reward_per_second: reward_units,
            min_stake: min_units,
            end_time,
            acc_reward_per_share: U256::ZERO,
        };
        match self.staking.add_pool(from, &pool).await {
            Ok(hash) => {
                info!("✅ addPool submitted: {}", hash);
                Self::record(ctx, hash, TxKind::AddPool, None, min_stake);
                ctx.notify(
                    NotificationKind::Info,
                    "Transaction Submitted",
                    "Adding new pool... Please wait for confirmation.",
                );
                Ok(WriteOutcome::Submitted(vec![hash]))
            }
            Err(e) => {
                error!("❌ addPool failed: {}", e);
                self.notify_error(ctx, "Add Pool Failed", &e);
                Err(e.into())
            }
        }
    }

    /// Contract recommendation for `amount`; `None` unless the amount is a
    /// positive number.
    pub async fn best_pool(
        &self,
        ctx: &mut AppContext,
        amount: &str,
    ) -> Result<Option<BestPool>, AppError> {
        ctx.set_stake_amount(amount);
        match parse_amount(amount) {
            Some(value) if value > Decimal::ZERO => {}
            _ => {
                ctx.set_best_pool_id(None);
                return Ok(None);
            }
        }
        let units = match self.to_units(amount)? {
            Ok(units) => units,
            Err(_) => {
                ctx.set_best_pool_id(None);
                return Ok(None);
            }
        };

        let best = self.staking.best_pool_for_staking(units).await?;
        ctx.set_best_pool_id(Some(best.pool_id));
        Ok(Some(best))
    }
}
