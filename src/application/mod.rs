//! Application layer - use cases and services

pub mod commands;
pub mod context;
pub mod services;

pub use commands::{Cli, CommandExecutor, Commands};
pub use context::AppContext;
pub use services::{DashboardService, Rejection, WriteOutcome};
