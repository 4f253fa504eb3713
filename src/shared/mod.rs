//! Shared components - config, token units, errors and time helpers

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;
