//! In-memory contract doubles for tests

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::{BestPool, NewPool, StakingContract, TokenContract, UserStake};
use crate::domain::pool::RawPool;
use crate::shared::errors::{ContractError, Operation, RpcError};

/// A write the double accepted, in submission order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub operation: Operation,
    pub from: Address,
    pub pool_id: Option<u64>,
    pub amount: Option<U256>,
}

fn rejected(operation: Operation, pool_id: Option<u64>, amount: Option<U256>) -> ContractError {
    ContractError::Call {
        operation,
        pool_id,
        amount: amount.map(|a| a.to_string()),
        source: RpcError::Node {
            code: -32000,
            message: "execution reverted".to_string(),
        },
    }
}

fn hash_for(n: usize) -> TxHash {
    TxHash::with_last_byte(n as u8)
}

pub fn units(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
}

#[derive(Default)]
pub struct MockStakingContract {
    pools: Mutex<Vec<RawPool>>,
    stakes: Mutex<HashMap<(Address, u64), U256>>,
    failing_pools: Mutex<HashSet<u64>>,
    reject_writes: Mutex<bool>,
    best_pool: Mutex<Option<BestPool>>,
    pub submitted: Mutex<Vec<Submitted>>,
}

impl MockStakingContract {
    /// `count` live pools, each with 500 tokens staked and 1 token/s rewards
    pub fn with_pools(count: u64) -> Self {
        let mock = Self::default();
        for _ in 0..count {
            mock.push_pool(RawPool {
                reward_per_second: units(1),
                min_stake: units(100),
                end_timestamp: u64::MAX / 2,
                total_staked: units(500),
                acc_reward_per_share: U256::ZERO,
                last_reward_time: U256::ZERO,
                exists: true,
            });
        }
        mock
    }

    pub fn push_pool(&self, pool: RawPool) {
        self.pools.lock().unwrap().push(pool);
    }

    pub fn set_user_stake(&self, account: Address, pool_id: u64, amount: U256) {
        self.stakes.lock().unwrap().insert((account, pool_id), amount);
    }

    pub fn fail_pool(&self, pool_id: u64) {
        self.failing_pools.lock().unwrap().insert(pool_id);
    }

    pub fn reject_writes(&self) {
        *self.reject_writes.lock().unwrap() = true;
    }

    pub fn set_best_pool(&self, best: BestPool) {
        *self.best_pool.lock().unwrap() = Some(best);
    }

    pub fn submissions(&self) -> Vec<Submitted> {
        self.submitted.lock().unwrap().clone()
    }

    fn submit(
        &self,
        operation: Operation,
        from: Address,
        pool_id: Option<u64>,
        amount: Option<U256>,
    ) -> Result<TxHash, ContractError> {
        if *self.reject_writes.lock().unwrap() {
            return Err(rejected(operation, pool_id, amount));
        }
        let mut submitted = self.submitted.lock().unwrap();
        submitted.push(Submitted {
            operation,
            from,
            pool_id,
            amount,
        });
        Ok(hash_for(submitted.len()))
    }
}

#[async_trait]
impl StakingContract for MockStakingContract {
    fn address(&self) -> Address {
        Address::repeat_byte(0xaa)
    }

    async fn pool_count(&self) -> Result<u64, ContractError> {
        Ok(self.pools.lock().unwrap().len() as u64)
    }

    async fn get_pool(&self, pool_id: u64) -> Result<RawPool, ContractError> {
        if self.failing_pools.lock().unwrap().contains(&pool_id) {
            return Err(rejected(Operation::GetPool, Some(pool_id), None));
        }
        let pools = self.pools.lock().unwrap();
        Ok(pools.get(pool_id as usize).cloned().unwrap_or(RawPool {
            reward_per_second: U256::ZERO,
            min_stake: U256::ZERO,
            end_timestamp: 0,
            total_staked: U256::ZERO,
            acc_reward_per_share: U256::ZERO,
            last_reward_time: U256::ZERO,
            exists: false,
        }))
    }

    async fn get_user_stake(
        &self,
        account: Address,
        pool_id: u64,
    ) -> Result<UserStake, ContractError> {
        let amount = self
            .stakes
            .lock()
            .unwrap()
            .get(&(account, pool_id))
            .copied()
            .unwrap_or(U256::ZERO);
        Ok(UserStake {
            amount,
            ..UserStake::default()
        })
    }

    async fn best_pool_for_staking(&self, _amount: U256) -> Result<BestPool, ContractError> {
        self.best_pool
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| rejected(Operation::BestPool, None, None))
    }

    async fn stake(
        &self,
        from: Address,
        pool_id: u64,
        amount: U256,
    ) -> Result<TxHash, ContractError> {
        self.submit(Operation::Stake, from, Some(pool_id), Some(amount))
    }

    async fn unstake(
        &self,
        from: Address,
        pool_id: u64,
        amount: U256,
    ) -> Result<TxHash, ContractError> {
        self.submit(Operation::Unstake, from, Some(pool_id), Some(amount))
    }

    async fn claim_rewards(&self, from: Address, pool_id: u64) -> Result<TxHash, ContractError> {
        self.submit(Operation::ClaimRewards, from, Some(pool_id), None)
    }

    async fn add_pool(&self, from: Address, pool: &NewPool) -> Result<TxHash, ContractError> {
        self.submit(Operation::AddPool, from, None, Some(pool.min_stake))
    }
}

pub struct MockTokenContract {
    decimals: u8,
    metadata_fails: Mutex<bool>,
    balances: Mutex<HashMap<Address, U256>>,
    pub approvals: Mutex<Vec<(Address, Address, U256)>>,
}

impl MockTokenContract {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals,
            metadata_fails: Mutex::new(false),
            balances: Mutex::new(HashMap::new()),
            approvals: Mutex::new(Vec::new()),
        }
    }

    pub fn set_balance(&self, account: Address, amount: U256) {
        self.balances.lock().unwrap().insert(account, amount);
    }

    pub fn fail_metadata(&self) {
        *self.metadata_fails.lock().unwrap() = true;
    }

    pub fn approval_count(&self) -> usize {
        self.approvals.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenContract for MockTokenContract {
    fn address(&self) -> Address {
        Address::repeat_byte(0xbb)
    }

    async fn decimals(&self) -> Result<u8, ContractError> {
        if *self.metadata_fails.lock().unwrap() {
            return Err(rejected(Operation::TokenDecimals, None, None));
        }
        Ok(self.decimals)
    }

    async fn symbol(&self) -> Result<String, ContractError> {
        if *self.metadata_fails.lock().unwrap() {
            return Err(rejected(Operation::TokenSymbol, None, None));
        }
        Ok("TST".to_string())
    }

    async fn balance_of(&self, account: Address) -> Result<U256, ContractError> {
        Ok(self.balances.lock().unwrap().get(&account).copied().unwrap_or(U256::ZERO))
    }

    async fn approve(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ContractError> {
        let mut approvals = self.approvals.lock().unwrap();
        approvals.push((from, spender, amount));
        Ok(TxHash::with_last_byte(0xf0 + approvals.len() as u8))
    }
}
