pub mod actor;

pub use actor::Actor;

/// Error taxonomy shared across the settlement crates. Repositories return
/// these directly and the orchestration layers propagate them unchanged, so
/// callers can branch on the kind without unwrapping wrapper types.
#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },

    #[error("journal entry is unbalanced: debits {debits}, credits {credits}")]
    UnbalancedEntry { debits: i64, credits: i64 },

    #[error("unknown or non-postable account: {0}")]
    UnknownAccount(String),

    #[error("invalid refund transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("booking has no commission model assigned: {0}")]
    NoCommissionModel(uuid::Uuid),

    #[error("invalid commission model: {0}")]
    InvalidCommissionModel(String),

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("concurrent update on {entity} {id}, reload and retry")]
    Conflict { entity: &'static str, id: String },

    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SettlementError {
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SettlementError::Storage(Box::new(err))
    }

    /// Message safe to show an end user. Recoverable kinds get actionable
    /// text; everything else maps to a generic line while the kind stays
    /// available for logging.
    pub fn user_message(&self) -> String {
        match self {
            SettlementError::InsufficientFunds { .. } => {
                "Your wallet balance is not sufficient for this booking. Please top up and try again.".to_string()
            }
            SettlementError::InvalidTransition { .. } | SettlementError::Conflict { .. } => {
                "This refund was already processed by someone else. Refresh to see its current state.".to_string()
            }
            SettlementError::NoCommissionModel(_) => {
                "This booking cannot be settled until an administrator assigns a commission model.".to_string()
            }
            _ => "The operation failed, please contact support.".to_string(),
        }
    }
}

pub type SettlementResult<T> = Result<T, SettlementError>;
