//! ABI of the staking contract and its token, plus checked conversion of
//! decoded return values into domain records

use alloy_primitives::U256;
use alloy_sol_types::{sol, SolCall};

use crate::domain::pool::RawPool;
use crate::domain::staking::{BestPool, UserStake};
use crate::shared::errors::{ContractError, Operation};

sol! {
    #[derive(Debug)]
    interface IStaking {
        function poolCount() external view returns (uint256 count);
        function pools(uint256 pid) external view returns (
            uint256 rewardPerSec,
            uint256 minStake,
            uint256 endTime,
            uint256 totalStaked,
            uint256 accRewardPerShare,
            uint256 lastRewardTime,
            bool exists
        );
        function stakes(address user, uint256 pid) external view returns (
            uint256 amount,
            uint256 rewardDebt,
            uint256 unlockTime
        );
        function getBestPoolForStaking(uint256 amount)
            external
            view
            returns (uint256 poolId, uint256 maxReward);

        function stake(uint256 pid, uint256 amount) external;
        function unstake(uint256 pid, uint256 amount) external;
        function claimRewards(uint256 pid) external;
        function addPool(
            uint256 rewardPerSec,
            uint256 minStake,
            uint256 endTime,
            uint256 accRewardPerShare
        ) external;
    }

    interface IERC20 {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// Decode return data, rejecting anything that does not match the ABI shape
pub fn decode_returns<C: SolCall>(
    data: &[u8],
    operation: Operation,
    pool_id: Option<u64>,
) -> Result<C::Return, ContractError> {
    if data.is_empty() {
        return Err(ContractError::MalformedResponse {
            operation,
            pool_id,
            reason: "empty return data, is the contract deployed at this address?".to_string(),
        });
    }
    C::abi_decode_returns(data, true).map_err(|e| ContractError::MalformedResponse {
        operation,
        pool_id,
        reason: e.to_string(),
    })
}

fn to_u64(
    value: U256,
    field: &str,
    operation: Operation,
    pool_id: Option<u64>,
) -> Result<u64, ContractError> {
    u64::try_from(value).map_err(|_| ContractError::MalformedResponse {
        operation,
        pool_id,
        reason: format!("{} out of range: {}", field, value),
    })
}

pub fn raw_pool(ret: IStaking::poolsReturn, pool_id: u64) -> Result<RawPool, ContractError> {
    Ok(RawPool {
        reward_per_second: ret.rewardPerSec,
        min_stake: ret.minStake,
        end_timestamp: to_u64(ret.endTime, "endTime", Operation::GetPool, Some(pool_id))?,
        total_staked: ret.totalStaked,
        acc_reward_per_share: ret.accRewardPerShare,
        last_reward_time: ret.lastRewardTime,
        exists: ret.exists,
    })
}

pub fn user_stake(ret: IStaking::stakesReturn, pool_id: u64) -> Result<UserStake, ContractError> {
    Ok(UserStake {
        amount: ret.amount,
        reward_debt: ret.rewardDebt,
        unlock_time: to_u64(ret.unlockTime, "unlockTime", Operation::GetUserStake, Some(pool_id))?,
    })
}

pub fn best_pool(ret: IStaking::getBestPoolForStakingReturn) -> Result<BestPool, ContractError> {
    Ok(BestPool {
        pool_id: to_u64(ret.poolId, "poolId", Operation::BestPool, None)?,
        max_reward: ret.maxReward,
    })
}

pub fn pool_count(ret: IStaking::poolCountReturn) -> Result<u64, ContractError> {
    to_u64(ret.count, "count", Operation::PoolCount, None)
}
