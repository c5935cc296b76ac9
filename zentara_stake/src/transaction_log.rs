//! Bounded history of staking transactions

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Stake,
    Unstake,
    Claim,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Stake => "stake",
            TransactionKind::Unstake => "unstake",
            TransactionKind::Claim => "claim",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakingTransaction {
    pub id: Uuid,
    pub signature: String,
    pub kind: TransactionKind,
    pub position_id: String,
    /// Requested amount while pending, settled amount once confirmed
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl StakingTransaction {
    pub fn pending(kind: TransactionKind, position_id: impl Into<String>, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            signature: format!("{}_sig_{}", kind.as_str(), Uuid::new_v4().simple()),
            kind,
            position_id: position_id.into(),
            amount,
            status: TransactionStatus::Pending,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub(crate) fn confirm(&mut self, settled_amount: Decimal) {
        self.amount = settled_amount;
        self.status = TransactionStatus::Confirmed;
        self.completed_at = Some(Utc::now());
    }

    pub(crate) fn fail(&mut self, error: String) {
        self.status = TransactionStatus::Failed;
        self.error = Some(error);
        self.completed_at = Some(Utc::now());
    }
}

pub struct TransactionLog {
    entries: RwLock<VecDeque<StakingTransaction>>,
    capacity: usize,
}

impl TransactionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
        }
    }

    /// Record a new transaction, evicting the oldest entry when full
    pub async fn record(&self, transaction: StakingTransaction) {
        let mut entries = self.entries.write().await;
        entries.push_front(transaction);
        entries.truncate(self.capacity);
    }

    /// Mark a pending transaction confirmed. Terminal entries are left alone.
    pub async fn confirm(&self, id: Uuid, settled_amount: Decimal) -> Option<StakingTransaction> {
        self.update(id, |tx| tx.confirm(settled_amount)).await
    }

    pub async fn fail(&self, id: Uuid, error: impl Into<String>) -> Option<StakingTransaction> {
        let error = error.into();
        self.update(id, move |tx| tx.fail(error)).await
    }

    pub async fn get(&self, id: Uuid) -> Option<StakingTransaction> {
        let entries = self.entries.read().await;
        entries.iter().find(|tx| tx.id == id).cloned()
    }

    /// Most recent first
    pub async fn recent(&self, limit: usize) -> Vec<StakingTransaction> {
        let entries = self.entries.read().await;
        entries.iter().take(limit).cloned().collect()
    }

    pub async fn for_position(&self, position_id: &str) -> Vec<StakingTransaction> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|tx| tx.position_id == position_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn update(
        &self,
        id: Uuid,
        apply: impl FnOnce(&mut StakingTransaction),
    ) -> Option<StakingTransaction> {
        let mut entries = self.entries.write().await;
        let tx = entries.iter_mut().find(|tx| tx.id == id)?;
        if !tx.status.is_terminal() {
            apply(tx);
        }
        Some(tx.clone())
    }
}
