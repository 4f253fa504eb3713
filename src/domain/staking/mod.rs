//! Staking domain - contract interfaces and eligibility rules

pub mod eligibility;

pub use eligibility::{
    can_stake, can_unstake, check_stake, check_unstake, parse_amount, validate_new_pool,
    Ineligible, InvalidPool,
};

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::pool::RawPool;
use crate::shared::errors::ContractError;

/// Per-account stake as returned by `stakes(account, pid)`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStake {
    pub amount: U256,
    pub reward_debt: U256,
    /// Unix seconds
    pub unlock_time: u64,
}

/// Contract recommendation for a stake amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestPool {
    pub pool_id: u64,
    pub max_reward: U256,
}

/// Parameters of a new pool, smallest units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPool {
    pub reward_per_second: U256,
    pub min_stake: U256,
    /// Unix seconds
    pub end_time: u64,
    pub acc_reward_per_share: U256,
}

/// Read/write surface of the staking contract
#[async_trait]
pub trait StakingContract: Send + Sync {
    fn address(&self) -> Address;

    async fn pool_count(&self) -> Result<u64, ContractError>;

    async fn get_pool(&self, pool_id: u64) -> Result<RawPool, ContractError>;

    async fn get_user_stake(
        &self,
        account: Address,
        pool_id: u64,
    ) -> Result<UserStake, ContractError>;

    async fn best_pool_for_staking(&self, amount: U256) -> Result<BestPool, ContractError>;

    async fn stake(
        &self,
        from: Address,
        pool_id: u64,
        amount: U256,
    ) -> Result<TxHash, ContractError>;

    async fn unstake(
        &self,
        from: Address,
        pool_id: u64,
        amount: U256,
    ) -> Result<TxHash, ContractError>;

    async fn claim_rewards(&self, from: Address, pool_id: u64) -> Result<TxHash, ContractError>;

    async fn add_pool(&self, from: Address, pool: &NewPool) -> Result<TxHash, ContractError>;
}

/// ERC-20 surface of the staked token
#[async_trait]
pub trait TokenContract: Send + Sync {
    fn address(&self) -> Address;

    async fn decimals(&self) -> Result<u8, ContractError>;

    async fn symbol(&self) -> Result<String, ContractError>;

    async fn balance_of(&self, account: Address) -> Result<U256, ContractError>;

    async fn approve(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ContractError>;
}

#[cfg(test)]
pub mod mock;
