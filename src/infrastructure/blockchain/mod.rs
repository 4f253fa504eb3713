//! Blockchain infrastructure - JSON-RPC client and contract bindings

pub mod rpc_client;
pub mod contract_abi;
pub mod staking_contract;
pub mod pool_reader;

pub use rpc_client::JsonRpcClient;
pub use staking_contract::{EvmStakingContract, EvmTokenContract};
pub use pool_reader::PoolReader;
