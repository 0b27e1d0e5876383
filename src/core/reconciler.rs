//! Settlement reconciliation engine
//!
//! Advances persisted settlement statuses in response to parsed files while
//! enforcing the monotonicity invariant: a status only ever moves forward in
//! its ordinal order. Files can arrive out of order, be duplicated, or be
//! reprocessed; a stale file must never regress a deal that a newer file
//! already advanced.
//!
//! The guard is a read-modify-write against external persisted state. It is
//! implemented as a compare-and-set loop at the storage boundary so that
//! multiple worker processes can run it concurrently against the same
//! reference number: the loser of a race re-reads and re-decides instead of
//! clobbering.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::warn;

use crate::core::traits::{DealStatusStore, EventPublisher, RewardScheduler};
use crate::types::{
    CreditStatus, ParseWarning, ResultCode, RewardPayoutPayload, RewardPayoutStatus,
    SettledTransactionEvent, SettlementError,
};

/// Fixed delay before a scheduled reward payout becomes payable
///
/// The window exists so a later-arriving reversal for the same transaction
/// can rescind the payout before it is paid.
pub const REWARD_PAYOUT_DELAY: Duration = Duration::from_secs(30 * 60);

/// Credit statuses a caller may legally target
///
/// Anything else is a programming error in the caller, not a data problem.
const LEGAL_CREDIT_TARGETS: [CreditStatus; 4] = [
    CreditStatus::ClearingReceived,
    CreditStatus::StatementCreditRequested,
    CreditStatus::RejectedByPartner,
    CreditStatus::CreditGranted,
];

/// Payout statuses a caller may legally target
const LEGAL_PAYOUT_TARGETS: [RewardPayoutStatus; 2] =
    [RewardPayoutStatus::Rescinded, RewardPayoutStatus::Paid];

/// Per-batch outcome of a status advance
///
/// The batch never aborts on a single record: regressions and unknown
/// references are reported and collected, and the remaining records proceed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusAdvanceOutcome {
    /// References whose status was committed to the target
    pub applied: Vec<String>,
    /// References skipped because their stored status was already further
    /// along than the target
    pub skipped: Vec<String>,
    /// References with no stored status
    pub missing: Vec<String>,
}

/// Reconciliation engine over injected collaborators
///
/// Cheap to clone; all collaborators are shared behind `Arc`.
#[derive(Clone)]
pub struct SettlementReconciler {
    store: Arc<dyn DealStatusStore>,
    scheduler: Arc<dyn RewardScheduler>,
    publisher: Arc<dyn EventPublisher>,
}

impl SettlementReconciler {
    /// Create an engine over the given collaborators
    pub fn new(
        store: Arc<dyn DealStatusStore>,
        scheduler: Arc<dyn RewardScheduler>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        SettlementReconciler {
            store,
            scheduler,
            publisher,
        }
    }

    /// Advance the credit status of each referenced deal to `target`
    ///
    /// Per reference: commit when `target` is ordinally at or beyond the
    /// stored status, otherwise skip that record, report
    /// `CreditStatusTooAdvanced`, and continue with the rest of the batch.
    ///
    /// # Panics
    ///
    /// Panics when `target` is not a legal caller target. That is a caller
    /// bug, not a data problem.
    ///
    /// # Errors
    ///
    /// Propagates store failures; no internal retries beyond the
    /// compare-and-set reload loop.
    pub async fn advance_credit_status(
        &self,
        reference_numbers: &[String],
        target: CreditStatus,
    ) -> Result<StatusAdvanceOutcome, SettlementError> {
        assert!(
            LEGAL_CREDIT_TARGETS.contains(&target),
            "illegal credit status target: {target:?}"
        );

        let mut outcome = StatusAdvanceOutcome::default();

        for reference_number in reference_numbers {
            loop {
                let Some(current) = self.store.credit_status(reference_number).await? else {
                    warn!(
                        reference = %reference_number,
                        target = ?target,
                        "no stored credit status for reference"
                    );
                    outcome.missing.push(reference_number.clone());
                    break;
                };

                if target < current {
                    warn!(
                        code = ResultCode::CreditStatusTooAdvanced.code(),
                        reference = %reference_number,
                        current = ?current,
                        target = ?target,
                        "stored credit status is already beyond the target; skipping"
                    );
                    outcome.skipped.push(reference_number.clone());
                    break;
                }

                if self
                    .store
                    .compare_and_set_credit_status(reference_number, current, target)
                    .await?
                {
                    outcome.applied.push(reference_number.clone());
                    break;
                }
                // Lost the race to another worker: re-read and re-decide.
            }
        }

        Ok(outcome)
    }

    /// Advance the payout status of each referenced reward to `target`
    ///
    /// Identical contract to [`advance_credit_status`], reporting
    /// `PayoutStatusTooAdvanced` on regression.
    ///
    /// [`advance_credit_status`]: Self::advance_credit_status
    ///
    /// # Panics
    ///
    /// Panics when `target` is not a legal caller target.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn advance_reward_payout_status(
        &self,
        reward_ids: &[String],
        target: RewardPayoutStatus,
    ) -> Result<StatusAdvanceOutcome, SettlementError> {
        assert!(
            LEGAL_PAYOUT_TARGETS.contains(&target),
            "illegal reward payout status target: {target:?}"
        );

        let mut outcome = StatusAdvanceOutcome::default();

        for reward_id in reward_ids {
            loop {
                let Some(current) = self.store.reward_payout_status(reward_id).await? else {
                    warn!(
                        reward = %reward_id,
                        target = ?target,
                        "no stored payout status for reward"
                    );
                    outcome.missing.push(reward_id.clone());
                    break;
                };

                if target < current {
                    warn!(
                        code = ResultCode::PayoutStatusTooAdvanced.code(),
                        reward = %reward_id,
                        current = ?current,
                        target = ?target,
                        "stored payout status is already beyond the target; skipping"
                    );
                    outcome.skipped.push(reward_id.clone());
                    break;
                }

                if self
                    .store
                    .compare_and_set_reward_payout_status(reward_id, current, target)
                    .await?
                {
                    outcome.applied.push(reward_id.clone());
                    break;
                }
            }
        }

        Ok(outcome)
    }

    /// Check parsed record count and total amount against a footer's claims
    ///
    /// A mismatch on either dimension is an observability signal, not a
    /// transactional abort: it is logged, reported, and already-committed
    /// records stand.
    pub fn evaluate_metadata(
        &self,
        parsed_count: usize,
        declared_count: i64,
        parsed_total: Decimal,
        declared_total: Decimal,
    ) -> Vec<ParseWarning> {
        let mut warnings = Vec::new();

        if parsed_count as i64 != declared_count {
            warn!(
                code = ResultCode::RecordCountMismatch.code(),
                parsed = parsed_count,
                declared = declared_count,
                "parsed record count disagrees with footer"
            );
            warnings.push(ParseWarning::file_level(
                ResultCode::RecordCountMismatch,
                format!(
                    "parsed {} settlement records, footer declared {}",
                    parsed_count, declared_count
                ),
            ));
        }

        if parsed_total != declared_total {
            warn!(
                code = ResultCode::TotalAmountMismatch.code(),
                parsed = %parsed_total,
                declared = %declared_total,
                "parsed total amount disagrees with footer"
            );
            warnings.push(ParseWarning::file_level(
                ResultCode::TotalAmountMismatch,
                format!(
                    "parsed settlement total {}, footer declared {}",
                    parsed_total, declared_total
                ),
            ));
        }

        warnings
    }

    /// Schedule a reward payout with the fixed anti-race delay
    ///
    /// # Errors
    ///
    /// Propagates scheduler failures.
    pub async fn schedule_reward_payout(
        &self,
        payload: RewardPayoutPayload,
    ) -> Result<(), SettlementError> {
        self.scheduler
            .schedule_payout(payload, REWARD_PAYOUT_DELAY)
            .await
    }

    /// Publish a settled-transaction event downstream
    ///
    /// # Errors
    ///
    /// Propagates publisher failures.
    pub async fn publish_settled_event(
        &self,
        event: SettledTransactionEvent,
    ) -> Result<(), SettlementError> {
        self.publisher.publish(event).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::{
        InMemoryDealStatusStore, RecordingEventPublisher, RecordingRewardScheduler,
    };

    fn reconciler_with_store() -> (SettlementReconciler, Arc<InMemoryDealStatusStore>) {
        let store = Arc::new(InMemoryDealStatusStore::new());
        let reconciler = SettlementReconciler::new(
            store.clone(),
            Arc::new(RecordingRewardScheduler::new()),
            Arc::new(RecordingEventPublisher::new()),
        );
        (reconciler, store)
    }

    fn refs(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_advance_commits_forward_movement() {
        let (reconciler, store) = reconciler_with_store();
        store.insert_credit("00000001", CreditStatus::StatementCreditRequested);

        let outcome = reconciler
            .advance_credit_status(&refs(&["00000001"]), CreditStatus::CreditGranted)
            .await
            .unwrap();

        assert_eq!(outcome.applied, vec!["00000001"]);
        assert!(outcome.skipped.is_empty());
        assert_eq!(store.credit("00000001"), Some(CreditStatus::CreditGranted));
    }

    #[tokio::test]
    async fn test_stale_rejection_is_a_reported_no_op() {
        let (reconciler, store) = reconciler_with_store();
        store.insert_credit("00000001", CreditStatus::CreditGranted);

        let outcome = reconciler
            .advance_credit_status(&refs(&["00000001"]), CreditStatus::RejectedByPartner)
            .await
            .unwrap();

        // Stored status unchanged; the regression was skipped and reported.
        assert_eq!(store.credit("00000001"), Some(CreditStatus::CreditGranted));
        assert_eq!(outcome.skipped, vec!["00000001"]);
        assert!(outcome.applied.is_empty());
    }

    #[tokio::test]
    async fn test_equal_target_recommits_idempotently() {
        let (reconciler, store) = reconciler_with_store();
        store.insert_credit("00000001", CreditStatus::CreditGranted);

        // Reprocessing the same file targets the status already stored.
        let outcome = reconciler
            .advance_credit_status(&refs(&["00000001"]), CreditStatus::CreditGranted)
            .await
            .unwrap();

        assert_eq!(outcome.applied, vec!["00000001"]);
        assert_eq!(store.credit("00000001"), Some(CreditStatus::CreditGranted));
    }

    #[tokio::test]
    async fn test_batch_continues_past_skipped_records() {
        let (reconciler, store) = reconciler_with_store();
        store.insert_credit("00000001", CreditStatus::CreditGranted);
        store.insert_credit("00000002", CreditStatus::StatementCreditRequested);

        let outcome = reconciler
            .advance_credit_status(
                &refs(&["00000001", "00000002"]),
                CreditStatus::RejectedByPartner,
            )
            .await
            .unwrap();

        assert_eq!(outcome.skipped, vec!["00000001"]);
        assert_eq!(outcome.applied, vec!["00000002"]);
        assert_eq!(
            store.credit("00000002"),
            Some(CreditStatus::RejectedByPartner)
        );
    }

    #[tokio::test]
    async fn test_unknown_reference_is_collected_not_fatal() {
        let (reconciler, store) = reconciler_with_store();
        store.insert_credit("00000002", CreditStatus::StatementCreditRequested);

        let outcome = reconciler
            .advance_credit_status(
                &refs(&["00000001", "00000002"]),
                CreditStatus::CreditGranted,
            )
            .await
            .unwrap();

        assert_eq!(outcome.missing, vec!["00000001"]);
        assert_eq!(outcome.applied, vec!["00000002"]);
    }

    #[tokio::test]
    #[should_panic(expected = "illegal credit status target")]
    async fn test_illegal_credit_target_panics() {
        let (reconciler, _store) = reconciler_with_store();
        let _ = reconciler
            .advance_credit_status(&refs(&["00000001"]), CreditStatus::AuthorizationReceived)
            .await;
    }

    #[tokio::test]
    #[should_panic(expected = "illegal reward payout status target")]
    async fn test_illegal_payout_target_panics() {
        let (reconciler, _store) = reconciler_with_store();
        let _ = reconciler
            .advance_reward_payout_status(&refs(&["r-1"]), RewardPayoutStatus::Pending)
            .await;
    }

    #[tokio::test]
    async fn test_payout_rescind_after_paid_is_skipped() {
        let (reconciler, store) = reconciler_with_store();
        store.insert_payout("r-1", RewardPayoutStatus::Paid);

        let outcome = reconciler
            .advance_reward_payout_status(&refs(&["r-1"]), RewardPayoutStatus::Rescinded)
            .await
            .unwrap();

        assert_eq!(outcome.skipped, vec!["r-1"]);
        assert_eq!(store.payout("r-1"), Some(RewardPayoutStatus::Paid));
    }

    #[tokio::test]
    async fn test_payout_rescind_from_pending_commits() {
        let (reconciler, store) = reconciler_with_store();
        store.insert_payout("r-1", RewardPayoutStatus::Pending);

        let outcome = reconciler
            .advance_reward_payout_status(&refs(&["r-1"]), RewardPayoutStatus::Rescinded)
            .await
            .unwrap();

        assert_eq!(outcome.applied, vec!["r-1"]);
        assert_eq!(store.payout("r-1"), Some(RewardPayoutStatus::Rescinded));
    }

    #[test]
    fn test_evaluate_metadata_reports_both_dimensions() {
        let (reconciler, _store) = reconciler_with_store();

        let warnings = reconciler.evaluate_metadata(
            3,
            4,
            Decimal::new(1000, 2),
            Decimal::new(1250, 2),
        );

        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].code, ResultCode::RecordCountMismatch);
        assert_eq!(warnings[1].code, ResultCode::TotalAmountMismatch);
    }

    #[test]
    fn test_evaluate_metadata_silent_on_match() {
        let (reconciler, _store) = reconciler_with_store();

        let warnings =
            reconciler.evaluate_metadata(2, 2, Decimal::new(1250, 2), Decimal::new(1250, 2));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_reward_payout_delay_is_thirty_minutes() {
        assert_eq!(REWARD_PAYOUT_DELAY, Duration::from_secs(1800));
    }
}
