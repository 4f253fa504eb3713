//! Domain layer - pool snapshots, derived statistics and staking rules

pub mod pool;
pub mod staking;
