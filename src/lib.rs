//! Stakeboard - staking pool dashboard for an EVM staking contract
//! Built with Domain-Driven Design principles

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod report;
pub mod shared;

// Re-export main types for convenience
pub use application::{AppContext, DashboardService};
pub use domain::pool::{PoolAnalyzer, PoolManager};
pub use infrastructure::blockchain::{JsonRpcClient, PoolReader};
