//! Simulated processing latency
//!
//! Ledger operations model chain confirmation time by waiting on a
//! [`Scheduler`] before they apply. Production uses the tokio timer; tests
//! swap in [`ImmediateScheduler`] so they never sleep.

use std::time::Duration;

use async_trait::async_trait;

use crate::transaction_log::TransactionKind;

#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Resolve once the simulated processing time for `kind` has passed
    async fn delay(&self, kind: TransactionKind);
}

/// Sleeps for a fixed duration on the tokio timer
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    latency: Duration,
}

impl TokioScheduler {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn delay(&self, _kind: TransactionKind) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

/// Completes immediately, only yielding to the runtime once
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateScheduler;

#[async_trait]
impl Scheduler for ImmediateScheduler {
    async fn delay(&self, _kind: TransactionKind) {
        tokio::task::yield_now().await;
    }
}
