//! Infrastructure layer - EVM JSON-RPC access

pub mod blockchain;
