//! In-memory collaborator implementations
//!
//! Thread-safe reference implementations of the collaborator traits, used by
//! the CLI's dry-run reconciliation and by tests. The status store is backed
//! by `DashMap`, whose per-entry locking gives the compare-and-set operations
//! real atomicity: concurrent workers racing on the same reference number
//! serialize on the entry, and exactly one CAS wins.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::core::traits::{DealStatusStore, EventPublisher, RewardScheduler};
use crate::types::{
    CreditStatus, RewardPayoutPayload, RewardPayoutStatus, SettledTransactionEvent,
    SettlementError,
};

/// DashMap-backed [`DealStatusStore`]
#[derive(Debug, Default)]
pub struct InMemoryDealStatusStore {
    credits: DashMap<String, CreditStatus>,
    payouts: DashMap<String, RewardPayoutStatus>,
}

impl InMemoryDealStatusStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a deal's credit status
    pub fn insert_credit(&self, reference_number: impl Into<String>, status: CreditStatus) {
        self.credits.insert(reference_number.into(), status);
    }

    /// Seed a reward's payout status
    pub fn insert_payout(&self, reward_id: impl Into<String>, status: RewardPayoutStatus) {
        self.payouts.insert(reward_id.into(), status);
    }

    /// Snapshot of a deal's credit status (test/CLI convenience)
    pub fn credit(&self, reference_number: &str) -> Option<CreditStatus> {
        self.credits.get(reference_number).map(|entry| *entry)
    }

    /// Snapshot of a reward's payout status (test/CLI convenience)
    pub fn payout(&self, reward_id: &str) -> Option<RewardPayoutStatus> {
        self.payouts.get(reward_id).map(|entry| *entry)
    }
}

#[async_trait]
impl DealStatusStore for InMemoryDealStatusStore {
    async fn credit_status(
        &self,
        reference_number: &str,
    ) -> Result<Option<CreditStatus>, SettlementError> {
        Ok(self.credit(reference_number))
    }

    async fn compare_and_set_credit_status(
        &self,
        reference_number: &str,
        expected: CreditStatus,
        target: CreditStatus,
    ) -> Result<bool, SettlementError> {
        // get_mut holds the entry's lock, making check-then-set atomic.
        match self.credits.get_mut(reference_number) {
            Some(mut entry) if *entry == expected => {
                *entry = target;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn reward_payout_status(
        &self,
        reward_id: &str,
    ) -> Result<Option<RewardPayoutStatus>, SettlementError> {
        Ok(self.payout(reward_id))
    }

    async fn compare_and_set_reward_payout_status(
        &self,
        reward_id: &str,
        expected: RewardPayoutStatus,
        target: RewardPayoutStatus,
    ) -> Result<bool, SettlementError> {
        match self.payouts.get_mut(reward_id) {
            Some(mut entry) if *entry == expected => {
                *entry = target;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// [`RewardScheduler`] that records every scheduled job
#[derive(Debug, Default)]
pub struct RecordingRewardScheduler {
    scheduled: Mutex<Vec<(RewardPayoutPayload, Duration)>>,
}

impl RecordingRewardScheduler {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every payout scheduled so far, in order
    pub fn scheduled_payouts(&self) -> Vec<(RewardPayoutPayload, Duration)> {
        self.scheduled
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RewardScheduler for RecordingRewardScheduler {
    async fn schedule_payout(
        &self,
        payload: RewardPayoutPayload,
        delay: Duration,
    ) -> Result<(), SettlementError> {
        self.scheduled
            .lock()
            .map_err(|_| SettlementError::downstream("schedule_payout", "scheduler poisoned"))?
            .push((payload, delay));
        Ok(())
    }
}

/// [`EventPublisher`] that records every published event
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    published: Mutex<Vec<SettledTransactionEvent>>,
}

impl RecordingEventPublisher {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event published so far, in order
    pub fn published_events(&self) -> Vec<SettledTransactionEvent> {
        self.published
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: SettledTransactionEvent) -> Result<(), SettlementError> {
        self.published
            .lock()
            .map_err(|_| SettlementError::downstream("publish", "publisher poisoned"))?
            .push(event);
        Ok(())
    }
}
