//! Staking contract and ERC-20 token over JSON-RPC

use alloy_primitives::{Address, TxHash, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::contract_abi::{self, decode_returns, IStaking, IERC20};
use super::rpc_client::JsonRpcClient;
use crate::domain::pool::RawPool;
use crate::domain::staking::{BestPool, NewPool, StakingContract, TokenContract, UserStake};
use crate::shared::errors::{ContractError, Operation};

/// Issues calls and transactions against one contract address
struct ContractCaller {
    rpc: Arc<JsonRpcClient>,
    address: Address,
}

impl ContractCaller {
    async fn call(
        &self,
        calldata: Vec<u8>,
        operation: Operation,
        pool_id: Option<u64>,
    ) -> Result<Vec<u8>, ContractError> {
        debug!("eth_call {} on {}", operation, self.address);
        self.rpc
            .eth_call(self.address, &calldata)
            .await
            .map_err(|source| ContractError::Call {
                operation,
                pool_id,
                amount: None,
                source,
            })
    }

    async fn send(
        &self,
        from: Address,
        calldata: Vec<u8>,
        operation: Operation,
        pool_id: Option<u64>,
        amount: Option<U256>,
    ) -> Result<TxHash, ContractError> {
        let hash = self
            .rpc
            .send_transaction(from, self.address, &calldata)
            .await
            .map_err(|source| ContractError::Call {
                operation,
                pool_id,
                amount: amount.map(|a| a.to_string()),
                source,
            })?;
        info!("📤 {} submitted: {}", operation, hash);
        Ok(hash)
    }
}

/// `StakingContract` backed by an EVM node
pub struct EvmStakingContract {
    caller: ContractCaller,
}

impl EvmStakingContract {
    pub fn new(rpc: Arc<JsonRpcClient>, address: Address) -> Self {
        Self {
            caller: ContractCaller { rpc, address },
        }
    }
}

#[async_trait]
impl StakingContract for EvmStakingContract {
    fn address(&self) -> Address {
        self.caller.address
    }

    async fn pool_count(&self) -> Result<u64, ContractError> {
        let data = self
            .caller
            .call(IStaking::poolCountCall {}.abi_encode(), Operation::PoolCount, None)
            .await?;
        let ret = decode_returns::<IStaking::poolCountCall>(&data, Operation::PoolCount, None)?;
        contract_abi::pool_count(ret)
    }

    async fn get_pool(&self, pool_id: u64) -> Result<RawPool, ContractError> {
        let calldata = IStaking::poolsCall { pid: U256::from(pool_id) }.abi_encode();
        let data = self.caller.call(calldata, Operation::GetPool, Some(pool_id)).await?;
        let ret = decode_returns::<IStaking::poolsCall>(&data, Operation::GetPool, Some(pool_id))?;
        contract_abi::raw_pool(ret, pool_id)
    }

    async fn get_user_stake(
        &self,
        account: Address,
        pool_id: u64,
    ) -> Result<UserStake, ContractError> {
        let calldata = IStaking::stakesCall {
            user: account,
            pid: U256::from(pool_id),
        }
        .abi_encode();
        let data = self.caller.call(calldata, Operation::GetUserStake, Some(pool_id)).await?;
        let ret =
            decode_returns::<IStaking::stakesCall>(&data, Operation::GetUserStake, Some(pool_id))?;
        contract_abi::user_stake(ret, pool_id)
    }

    async fn best_pool_for_staking(&self, amount: U256) -> Result<BestPool, ContractError> {
        let calldata = IStaking::getBestPoolForStakingCall { amount }.abi_encode();
        let data = self.caller.call(calldata, Operation::BestPool, None).await?;
        let ret = decode_returns::<IStaking::getBestPoolForStakingCall>(
            &data,
            Operation::BestPool,
            None,
        )?;
        contract_abi::best_pool(ret)
    }

    async fn stake(
        &self,
        from: Address,
        pool_id: u64,
        amount: U256,
    ) -> Result<TxHash, ContractError> {
        let calldata = IStaking::stakeCall {
            pid: U256::from(pool_id),
            amount,
        }
        .abi_encode();
        self.caller
            .send(from, calldata, Operation::Stake, Some(pool_id), Some(amount))
            .await
    }

    async fn unstake(
        &self,
        from: Address,
        pool_id: u64,
        amount: U256,
    ) -> Result<TxHash, ContractError> {
        let calldata = IStaking::unstakeCall {
            pid: U256::from(pool_id),
            amount,
        }
        .abi_encode();
        self.caller
            .send(from, calldata, Operation::Unstake, Some(pool_id), Some(amount))
            .await
    }

    async fn claim_rewards(&self, from: Address, pool_id: u64) -> Result<TxHash, ContractError> {
        let calldata = IStaking::claimRewardsCall { pid: U256::from(pool_id) }.abi_encode();
        self.caller
            .send(from, calldata, Operation::ClaimRewards, Some(pool_id), None)
            .await
    }

    async fn add_pool(&self, from: Address, pool: &NewPool) -> Result<TxHash, ContractError> {
        let calldata = IStaking::addPoolCall {
            rewardPerSec: pool.reward_per_second,
            minStake: pool.min_stake,
            endTime: U256::from(pool.end_time),
            accRewardPerShare: pool.acc_reward_per_share,
        }
        .abi_encode();
        self.caller.send(from, calldata, Operation::AddPool, None, None).await
    }
}

/// `TokenContract` backed by an EVM node
pub struct EvmTokenContract {
    caller: ContractCaller,
}

impl EvmTokenContract {
    pub fn new(rpc: Arc<JsonRpcClient>, address: Address) -> Self {
        Self {
            caller: ContractCaller { rpc, address },
        }
    }
}

#[async_trait]
impl TokenContract for EvmTokenContract {
    fn address(&self) -> Address {
        self.caller.address
    }

    async fn decimals(&self) -> Result<u8, ContractError> {
        let data = self
            .caller
            .call(IERC20::decimalsCall {}.abi_encode(), Operation::TokenDecimals, None)
            .await?;
        Ok(decode_returns::<IERC20::decimalsCall>(&data, Operation::TokenDecimals, None)?._0)
    }

    async fn symbol(&self) -> Result<String, ContractError> {
        let data = self
            .caller
            .call(IERC20::symbolCall {}.abi_encode(), Operation::TokenSymbol, None)
            .await?;
        Ok(decode_returns::<IERC20::symbolCall>(&data, Operation::TokenSymbol, None)?._0)
    }

    async fn balance_of(&self, account: Address) -> Result<U256, ContractError> {
        let data = self
            .caller
            .call(IERC20::balanceOfCall { account }.abi_encode(), Operation::Balance, None)
            .await?;
        Ok(decode_returns::<IERC20::balanceOfCall>(&data, Operation::Balance, None)?._0)
    }

    async fn approve(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, ContractError> {
        let calldata = IERC20::approveCall { spender, amount }.abi_encode();
        self.caller
            .send(from, calldata, Operation::Approve, None, Some(amount))
            .await
    }
}
