//! Error types for the staking ledger and the session layer

use axum::http::StatusCode;
use rust_decimal::Decimal;

/// Errors raised by ledger operations.
///
/// Every variant is returned before the position store is touched, so a
/// failed operation never leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StakingError {
    #[error("Amount must be greater than 0, got {amount}")]
    InvalidAmount { amount: Decimal },

    #[error("Staking position {position_id} not found")]
    PositionNotFound { position_id: String },

    #[error("No rewards available to claim on {position_id}")]
    NothingToClaim { position_id: String },

    #[error("APY must not be negative, got {apy}")]
    InvalidApy { apy: Decimal },

    #[error("Lock period must be at least one day")]
    InvalidLockPeriod,

    #[error("Staking position {position_id} already exists")]
    DuplicatePosition { position_id: String },

    #[error("Operation interrupted before completion")]
    Interrupted,
}

impl StakingError {
    pub fn position_not_found(position_id: impl Into<String>) -> Self {
        StakingError::PositionNotFound {
            position_id: position_id.into(),
        }
    }

    pub fn nothing_to_claim(position_id: impl Into<String>) -> Self {
        StakingError::NothingToClaim {
            position_id: position_id.into(),
        }
    }

    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            StakingError::InvalidAmount { .. } => "INVALID_AMOUNT",
            StakingError::PositionNotFound { .. } => "POSITION_NOT_FOUND",
            StakingError::NothingToClaim { .. } => "NOTHING_TO_CLAIM",
            StakingError::InvalidApy { .. } => "INVALID_APY",
            StakingError::InvalidLockPeriod => "INVALID_LOCK_PERIOD",
            StakingError::DuplicatePosition { .. } => "DUPLICATE_POSITION",
            StakingError::Interrupted => "OPERATION_INTERRUPTED",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            StakingError::PositionNotFound { .. } => StatusCode::NOT_FOUND,
            StakingError::DuplicatePosition { .. } => StatusCode::CONFLICT,
            StakingError::Interrupted => StatusCode::SERVICE_UNAVAILABLE,
            StakingError::NothingToClaim { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            StakingError::InvalidAmount { .. }
            | StakingError::InvalidApy { .. }
            | StakingError::InvalidLockPeriod => StatusCode::BAD_REQUEST,
        }
    }
}

/// Errors raised by the session manager and its storage backends
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("No user is signed in")]
    NotSignedIn,

    #[error("Session storage failed: {0}")]
    Storage(String),
}

impl SessionError {
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::InvalidCredentials => "INVALID_CREDENTIALS",
            SessionError::NotSignedIn => "UNAUTHORIZED",
            SessionError::Storage(_) => "SESSION_STORAGE_ERROR",
        }
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Storage(format!("Invalid session data: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, StakingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let error = StakingError::nothing_to_claim("btc");
        assert_eq!(error.error_code(), "NOTHING_TO_CLAIM");
        assert_eq!(error.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let error = StakingError::position_not_found("doge");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_error_display() {
        let error = StakingError::InvalidAmount {
            amount: Decimal::new(-5, 0),
        };
        assert!(error.to_string().contains("-5"));

        let error = StakingError::position_not_found("doge");
        assert!(error.to_string().contains("doge"));
    }
}
