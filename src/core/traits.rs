//! Collaborator traits for the reconciliation engine
//!
//! The engine owns no infrastructure: the persistent status store, the
//! delayed-job scheduler, and the downstream queue are injected at
//! construction behind these traits. All three are async I/O boundaries;
//! failures propagate to the caller and the engine performs no retries.

use std::time::Duration;

use async_trait::async_trait;

use crate::types::{
    CreditStatus, RewardPayoutPayload, RewardPayoutStatus, SettledTransactionEvent,
    SettlementError,
};

/// Persistent store of settlement statuses, keyed by reference number
///
/// Settlement files arrive out of order and may be reprocessed, and multiple
/// worker processes run this logic concurrently. Status updates therefore go
/// through compare-and-set at the storage boundary (optimistic concurrency)
/// rather than an in-process lock: the caller reads the current status,
/// decides, and commits only if the stored value is still the one it read.
#[async_trait]
pub trait DealStatusStore: Send + Sync {
    /// Current credit status of a redeemed deal, if the deal is known
    async fn credit_status(
        &self,
        reference_number: &str,
    ) -> Result<Option<CreditStatus>, SettlementError>;

    /// Atomically set the credit status if it still equals `expected`
    ///
    /// Returns `false` when the stored status no longer matches (another
    /// worker won the race) or the deal is unknown; the caller re-reads and
    /// re-decides.
    async fn compare_and_set_credit_status(
        &self,
        reference_number: &str,
        expected: CreditStatus,
        target: CreditStatus,
    ) -> Result<bool, SettlementError>;

    /// Current reward payout status, if the reward is known
    async fn reward_payout_status(
        &self,
        reward_id: &str,
    ) -> Result<Option<RewardPayoutStatus>, SettlementError>;

    /// Atomically set the payout status if it still equals `expected`
    async fn compare_and_set_reward_payout_status(
        &self,
        reward_id: &str,
        expected: RewardPayoutStatus,
        target: RewardPayoutStatus,
    ) -> Result<bool, SettlementError>;
}

/// Delayed-job scheduler for reward payouts
#[async_trait]
pub trait RewardScheduler: Send + Sync {
    /// Schedule a payout job that becomes runnable after `delay`
    async fn schedule_payout(
        &self,
        payload: RewardPayoutPayload,
        delay: Duration,
    ) -> Result<(), SettlementError>;
}

/// Queue publisher for downstream settled-transaction events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one settled-transaction event
    async fn publish(&self, event: SettledTransactionEvent) -> Result<(), SettlementError>;
}
