//! Staking service
//!
//! The boundary the presentation layer calls. Each mutating operation
//! validates its input, records a pending transaction, waits on the
//! scheduler to model chain latency and then applies the change to the
//! position store.
//!
//! Operations on the same position are serialized through a per-position
//! async mutex. The work runs on a spawned task, so dropping the returned
//! future does not cancel a mutation that has already started.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::{
    config::StakingConfig,
    error::{Result, StakingError},
    position_store::PositionStore,
    reward_math,
    scheduler::{Scheduler, TokioScheduler},
    seed_positions::create_seed_positions,
    transaction_log::{StakingTransaction, TransactionKind, TransactionLog},
    types::{ClaimQuote, PortfolioSummary, StakingPosition},
};

#[derive(Clone)]
pub struct StakingService {
    store: Arc<RwLock<PositionStore>>,
    position_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    scheduler: Arc<dyn Scheduler>,
    transactions: Arc<TransactionLog>,
    in_flight: Arc<AtomicUsize>,
    estimated_gas_fee: Decimal,
}

/// Keeps the in-flight counter raised for the lifetime of an operation
struct BusyGuard(Arc<AtomicUsize>);

impl BusyGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl StakingService {
    pub fn new(store: PositionStore, scheduler: Arc<dyn Scheduler>, config: &StakingConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            position_locks: Arc::new(DashMap::new()),
            scheduler,
            transactions: Arc::new(TransactionLog::new(config.transaction_history_limit)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            estimated_gas_fee: config.estimated_gas_fee,
        }
    }

    /// Seeded ledger with the configured tokio latency
    pub fn from_config(config: &StakingConfig) -> Result<Self> {
        let store = PositionStore::with_positions(create_seed_positions()?)?;
        let scheduler = Arc::new(TokioScheduler::new(config.simulated_latency));
        Ok(Self::new(store, scheduler, config))
    }

    pub async fn list(&self) -> Vec<StakingPosition> {
        self.store.read().await.list()
    }

    pub async fn get(&self, id: &str) -> Result<StakingPosition> {
        self.store.read().await.get(id).cloned()
    }

    pub async fn summary(&self) -> PortfolioSummary {
        self.store.read().await.summary()
    }

    pub fn transactions(&self) -> &TransactionLog {
        &self.transactions
    }

    /// True while any operation is waiting or applying
    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn add_stake(&self, id: &str, amount: Decimal) -> Result<StakingTransaction> {
        ensure_positive(amount)?;
        self.submit(TransactionKind::Stake, id, amount).await
    }

    pub async fn claim_rewards(&self, id: &str) -> Result<StakingTransaction> {
        self.submit(TransactionKind::Claim, id, Decimal::ZERO).await
    }

    pub async fn remove_stake(&self, id: &str, amount: Decimal) -> Result<StakingTransaction> {
        ensure_positive(amount)?;
        self.submit(TransactionKind::Unstake, id, amount).await
    }

    /// Claim every position that has pending rewards
    pub async fn claim_all(&self) -> Result<Vec<StakingTransaction>> {
        let claimable: Vec<String> = self
            .list()
            .await
            .into_iter()
            .filter(StakingPosition::has_claimable_rewards)
            .map(|p| p.id().to_string())
            .collect();

        let mut claimed = Vec::with_capacity(claimable.len());
        for id in claimable {
            match self.claim_rewards(&id).await {
                Ok(tx) => claimed.push(tx),
                // drained by a concurrent claim
                Err(StakingError::NothingToClaim { .. }) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(claimed)
    }

    /// Reward a prospective deposit of `amount` would project over one lock period
    pub async fn estimate_rewards(&self, id: &str, amount: Decimal) -> Result<Decimal> {
        ensure_positive(amount)?;
        let store = self.store.read().await;
        let position = store.get(id)?;
        reward_math::projected_reward(amount, position.apy, position.lock_days)
    }

    pub async fn claim_quote(&self, id: &str) -> Result<ClaimQuote> {
        let store = self.store.read().await;
        let position = store.get(id)?;
        Ok(ClaimQuote {
            position_id: id.to_string(),
            pending_rewards: position.pending_rewards,
            estimated_gas_fee: self.estimated_gas_fee,
            net_rewards: reward_math::net_of_fee(position.pending_rewards, self.estimated_gas_fee),
        })
    }

    async fn submit(
        &self,
        kind: TransactionKind,
        id: &str,
        amount: Decimal,
    ) -> Result<StakingTransaction> {
        if !self.store.read().await.contains(id) {
            return Err(StakingError::position_not_found(id));
        }

        // raised before spawning so the operation is visible until the task runs
        let busy = BusyGuard::enter(&self.in_flight);
        let service = self.clone();
        let id = id.to_string();
        let handle = tokio::spawn(async move {
            let _busy = busy;
            service.execute(kind, id, amount).await
        });

        match handle.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(StakingError::Interrupted),
        }
    }

    async fn execute(
        &self,
        kind: TransactionKind,
        id: String,
        amount: Decimal,
    ) -> Result<StakingTransaction> {
        let position_lock = self.position_lock(&id);
        let _serialized = position_lock.lock().await;

        let requested = {
            let store = self.store.read().await;
            let position = store.get(&id)?;
            match kind {
                TransactionKind::Claim if !position.has_claimable_rewards() => {
                    return Err(StakingError::nothing_to_claim(id.as_str()));
                }
                TransactionKind::Claim => position.pending_rewards,
                TransactionKind::Stake | TransactionKind::Unstake => amount,
            }
        };

        let mut tx = StakingTransaction::pending(kind, id.as_str(), requested);
        self.transactions.record(tx.clone()).await;
        debug!(
            tx_id = %tx.id,
            kind = kind.as_str(),
            position_id = %id,
            amount = %requested,
            "Staking transaction pending"
        );

        self.scheduler.delay(kind).await;

        let outcome = {
            let mut store = self.store.write().await;
            match kind {
                TransactionKind::Stake => store.apply_deposit(&id, amount).map(|_| amount),
                TransactionKind::Unstake => store.apply_withdrawal(&id, amount),
                TransactionKind::Claim => store.apply_claim(&id),
            }
        };

        match outcome {
            Ok(settled) => {
                tx.confirm(settled);
                self.transactions.confirm(tx.id, settled).await;
                info!(
                    signature = %tx.signature,
                    kind = kind.as_str(),
                    position_id = %id,
                    amount = %settled,
                    "Staking transaction confirmed"
                );
                Ok(tx)
            }
            Err(err) => {
                tx.fail(err.to_string());
                self.transactions.fail(tx.id, err.to_string()).await;
                warn!(
                    signature = %tx.signature,
                    kind = kind.as_str(),
                    position_id = %id,
                    error_code = err.error_code(),
                    "Staking transaction failed: {}", err
                );
                Err(err)
            }
        }
    }

    fn position_lock(&self, id: &str) -> Arc<Mutex<()>> {
        self.position_locks
            .entry(id.to_string())
            .or_default()
            .value()
            .clone()
    }
}

fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(StakingError::InvalidAmount { amount });
    }
    Ok(())
}
