//! Zentara Stake ledger
//!
//! In-memory staking positions with reward projection, claim and withdrawal
//! operations, exposed through an async service and a small HTTP surface.

pub mod config;
pub mod error;
pub mod position_store;
pub mod response;
pub mod reward_math;
pub mod scheduler;
pub mod seed_positions;
pub mod session;
pub mod staking_handlers;
pub mod staking_service;
pub mod telemetry;
pub mod transaction_log;
pub mod types;

pub use config::LedgerConfig;
pub use error::{SessionError, StakingError};
pub use position_store::PositionStore;
pub use staking_service::StakingService;
pub use transaction_log::{StakingTransaction, TransactionKind, TransactionStatus};
pub use types::{ClaimQuote, PortfolioSummary, StakingPosition};
