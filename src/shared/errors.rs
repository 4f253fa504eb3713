//! Error handling for the application

use thiserror::Error;

/// Human amount conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,

    #[error("malformed amount: {0}")]
    Malformed(String),

    #[error("amount {amount} has more than {decimals} fractional digits")]
    TooPrecise { amount: String, decimals: u8 },

    #[error("amount out of range: {0}")]
    Overflow(String),
}

/// Contract operation, used to give failures enough context for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    PoolCount,
    GetPool,
    GetUserStake,
    BestPool,
    TokenDecimals,
    TokenSymbol,
    Balance,
    Approve,
    Stake,
    Unstake,
    ClaimRewards,
    AddPool,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::PoolCount => "poolCount",
            Operation::GetPool => "pools",
            Operation::GetUserStake => "stakes",
            Operation::BestPool => "getBestPoolForStaking",
            Operation::TokenDecimals => "decimals",
            Operation::TokenSymbol => "symbol",
            Operation::Balance => "balanceOf",
            Operation::Approve => "approve",
            Operation::Stake => "stake",
            Operation::Unstake => "unstake",
            Operation::ClaimRewards => "claimRewards",
            Operation::AddPool => "addPool",
        };
        f.write_str(name)
    }
}

/// JSON-RPC transport errors
#[derive(Error, Debug, Clone)]
pub enum RpcError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("unexpected RPC response: {0}")]
    UnexpectedResponse(String),
}

/// External contract call errors
#[derive(Error, Debug, Clone)]
pub enum ContractError {
    #[error("{operation} failed{}: {source}", describe_target(.pool_id, .amount))]
    Call {
        operation: Operation,
        pool_id: Option<u64>,
        amount: Option<String>,
        #[source]
        source: RpcError,
    },

    #[error(
        "{operation} returned a malformed response{}: {reason}",
        describe_target(.pool_id, &None)
    )]
    MalformedResponse {
        operation: Operation,
        pool_id: Option<u64>,
        reason: String,
    },

    #[error("pool {0} does not exist")]
    PoolNotFound(u64),
}

impl ContractError {
    pub fn operation(&self) -> Option<Operation> {
        match self {
            ContractError::Call { operation, .. }
            | ContractError::MalformedResponse { operation, .. } => Some(*operation),
            ContractError::PoolNotFound(_) => Some(Operation::GetPool),
        }
    }

    pub fn pool_id(&self) -> Option<u64> {
        match self {
            ContractError::Call { pool_id, .. }
            | ContractError::MalformedResponse { pool_id, .. } => *pool_id,
            ContractError::PoolNotFound(id) => Some(*id),
        }
    }
}

fn describe_target(pool_id: &Option<u64>, amount: &Option<String>) -> String {
    match (pool_id, amount) {
        (Some(id), Some(a)) => format!(" (pool {}, amount {})", id, a),
        (Some(id), None) => format!(" (pool {})", id),
        (None, Some(a)) => format!(" (amount {})", a),
        (None, None) => String::new(),
    }
}

/// Pool snapshot errors
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("no snapshot loaded yet")]
    NoSnapshot,

    #[error("pool {0} not in snapshot")]
    UnknownPool(u64),

    #[error("token decimals not available yet")]
    DecimalsPending,
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Wallet error: {0}")]
    WalletError(String),

    #[error(transparent)]
    Contract(#[from] ContractError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Units(#[from] UnitsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_error_message_carries_context() {
        let err = ContractError::Call {
            operation: Operation::Stake,
            pool_id: Some(2),
            amount: Some("150".to_string()),
            source: RpcError::Node {
                code: -32000,
                message: "execution reverted".to_string(),
            },
        };
        let message = err.to_string();
        assert!(message.contains("stake failed"));
        assert!(message.contains("pool 2"));
        assert!(message.contains("amount 150"));
        assert_eq!(err.pool_id(), Some(2));
        assert_eq!(err.operation(), Some(Operation::Stake));
    }

    #[test]
    fn test_malformed_response_message() {
        let err = ContractError::MalformedResponse {
            operation: Operation::GetPool,
            pool_id: Some(0),
            reason: "short buffer".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "pools returned a malformed response (pool 0): short buffer"
        );
    }
}
