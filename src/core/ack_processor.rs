//! Acknowledgment file processing
//!
//! Consumes a parsed Acknowledgment and drives the settlement state machine:
//! the general record decides whether the submission cleared at all, and each
//! detail record then grants or rejects one redeemed deal's statement credit.
//! Detail records carrying the referred-redemption descriptor route to the
//! reward-payout lifecycle instead of the credit lifecycle.

use tracing::warn;

use crate::core::reconciler::{SettlementReconciler, StatusAdvanceOutcome};
use crate::parser::ParsedAcknowledgment;
use crate::types::{CreditStatus, ResultCode, RewardPayoutStatus, SettlementError};

/// Merchant descriptor marking a referred-redemption reward detail
///
/// Compared case-insensitively against each detail's descriptor.
pub const REFERRED_REDEMPTION_DESCRIPTOR: &str = "REFERRED REDEMPTION";

/// Outcome of processing one Acknowledgment file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AckProcessingSummary {
    /// Whether the general record reported the submission as accepted
    pub submission_accepted: bool,
    /// Credit advances for successfully redeemed deals
    pub granted: StatusAdvanceOutcome,
    /// Credit advances for deals the partner rejected
    pub rejected: StatusAdvanceOutcome,
    /// Payout advances for successful referred-redemption rewards
    pub referred_paid: StatusAdvanceOutcome,
    /// Payout advances for rejected referred-redemption rewards
    pub referred_rescinded: StatusAdvanceOutcome,
}

/// Processor for parsed Acknowledgment files
#[derive(Clone)]
pub struct AcknowledgmentProcessor {
    reconciler: SettlementReconciler,
}

impl AcknowledgmentProcessor {
    /// Create a processor over the given reconciliation engine
    pub fn new(reconciler: SettlementReconciler) -> Self {
        AcknowledgmentProcessor { reconciler }
    }

    /// Reconcile one parsed Acknowledgment against the persisted statuses
    ///
    /// A rejected (or absent) general record aborts processing of the file's
    /// details: no credit may be granted out of a submission the processor
    /// did not accept.
    ///
    /// # Errors
    ///
    /// Propagates store failures; per-record rejections are reported, not
    /// errors.
    pub async fn process(
        &self,
        parsed: &ParsedAcknowledgment,
    ) -> Result<AckProcessingSummary, SettlementError> {
        let mut summary = AckProcessingSummary::default();

        match parsed.acknowledgment.general() {
            Some(general) if general.is_accepted() => {}
            Some(general) => {
                warn!(
                    code = ResultCode::SubmissionRejected.code(),
                    ack_code = %general.acknowledgement_code.trim(),
                    submission = %general.submission_id,
                    "processor rejected the submission; skipping detail records"
                );
                return Ok(summary);
            }
            None => {
                warn!(
                    code = ResultCode::SubmissionRejected.code(),
                    "no valid general acknowledgment; skipping detail records"
                );
                return Ok(summary);
            }
        }
        summary.submission_accepted = true;

        let mut granted = Vec::new();
        let mut rejected = Vec::new();
        let mut referred_paid = Vec::new();
        let mut referred_rescinded = Vec::new();

        for detail in parsed.acknowledgment.valid_details() {
            let referred = detail
                .merchant_descriptor
                .trim()
                .eq_ignore_ascii_case(REFERRED_REDEMPTION_DESCRIPTOR);

            if !detail.is_successful() {
                warn!(
                    code = ResultCode::RedeemedDealRejectedByPartner.code(),
                    reference = %detail.reference_number,
                    ack_code = %detail.acknowledgement_code.trim(),
                    "partner rejected redeemed deal"
                );
            }

            match (referred, detail.is_successful()) {
                (false, true) => granted.push(detail.reference_number.clone()),
                (false, false) => rejected.push(detail.reference_number.clone()),
                (true, true) => referred_paid.push(detail.reference_number.clone()),
                (true, false) => referred_rescinded.push(detail.reference_number.clone()),
            }
        }

        summary.granted = self
            .reconciler
            .advance_credit_status(&granted, CreditStatus::CreditGranted)
            .await?;
        summary.rejected = self
            .reconciler
            .advance_credit_status(&rejected, CreditStatus::RejectedByPartner)
            .await?;
        summary.referred_paid = self
            .reconciler
            .advance_reward_payout_status(&referred_paid, RewardPayoutStatus::Paid)
            .await?;
        summary.referred_rescinded = self
            .reconciler
            .advance_reward_payout_status(&referred_rescinded, RewardPayoutStatus::Rescinded)
            .await?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory::{
        InMemoryDealStatusStore, RecordingEventPublisher, RecordingRewardScheduler,
    };
    use crate::parser::AcknowledgmentParser;
    use std::sync::Arc;

    fn detail_line(ack_code: &str, reference: &str, descriptor: &str) -> String {
        format!(
            "A{token:<16}6{amount:0>8}{date}{auth:<6}{auth_date}{ack:>4}{reference:0>8}{seq:0>6}{descriptor:<21}T",
            token = "4111222233334444",
            amount = "0000125E",
            date = "0314",
            auth = "A1B2C3",
            auth_date = "0315",
            ack = ack_code,
            reference = reference,
            seq = "2",
            descriptor = descriptor,
        )
    }

    fn general_line(ack_code: &str) -> String {
        format!(
            "B{sales:0>9}{credit:0>9}{cash:0>9}{ack:>4}     {seq:0>6}{submission:0>9}        {auth:0>9}{cash_auth:0>9}N ",
            sales = "00000000{",
            credit = "0000125E",
            cash = "00000000{",
            ack = ack_code,
            seq = "1",
            submission = "42",
            auth = "00000000{",
            cash_auth = "00000000{",
        )
    }

    fn parse(lines: &[String]) -> crate::parser::ParsedAcknowledgment {
        AcknowledgmentParser::new("ack.txt")
            .parse(lines.join("\n").as_bytes())
            .unwrap()
    }

    fn processor_with_store() -> (AcknowledgmentProcessor, Arc<InMemoryDealStatusStore>) {
        let store = Arc::new(InMemoryDealStatusStore::new());
        let reconciler = SettlementReconciler::new(
            store.clone(),
            Arc::new(RecordingRewardScheduler::new()),
            Arc::new(RecordingEventPublisher::new()),
        );
        (AcknowledgmentProcessor::new(reconciler), store)
    }

    #[tokio::test]
    async fn test_accepted_submission_grants_credits() {
        let (processor, store) = processor_with_store();
        store.insert_credit("00000001", CreditStatus::StatementCreditRequested);
        store.insert_credit("00000002", CreditStatus::StatementCreditRequested);

        let parsed = parse(&[
            general_line("98"),
            detail_line("8", "00000001", "BING OFFERS-CONTOSO"),
            detail_line("8", "00000002", "BING OFFERS-CONTOSO"),
        ]);

        let summary = processor.process(&parsed).await.unwrap();

        assert!(summary.submission_accepted);
        assert_eq!(summary.granted.applied.len(), 2);
        assert_eq!(store.credit("00000001"), Some(CreditStatus::CreditGranted));
        assert_eq!(store.credit("00000002"), Some(CreditStatus::CreditGranted));
    }

    #[tokio::test]
    async fn test_rejected_submission_skips_details() {
        let (processor, store) = processor_with_store();
        store.insert_credit("00000001", CreditStatus::StatementCreditRequested);

        let parsed = parse(&[
            general_line("99"),
            detail_line("8", "00000001", "BING OFFERS-CONTOSO"),
        ]);

        let summary = processor.process(&parsed).await.unwrap();

        assert!(!summary.submission_accepted);
        assert!(summary.granted.applied.is_empty());
        // Detail untouched: still awaiting a successful submission.
        assert_eq!(
            store.credit("00000001"),
            Some(CreditStatus::StatementCreditRequested)
        );
    }

    #[tokio::test]
    async fn test_missing_general_record_skips_details() {
        let (processor, store) = processor_with_store();
        store.insert_credit("00000001", CreditStatus::StatementCreditRequested);

        let parsed = parse(&[detail_line("8", "00000001", "BING OFFERS-CONTOSO")]);
        let summary = processor.process(&parsed).await.unwrap();

        assert!(!summary.submission_accepted);
        assert_eq!(
            store.credit("00000001"),
            Some(CreditStatus::StatementCreditRequested)
        );
    }

    #[tokio::test]
    async fn test_rejected_detail_moves_to_rejected_by_partner() {
        let (processor, store) = processor_with_store();
        store.insert_credit("00000001", CreditStatus::StatementCreditRequested);

        let parsed = parse(&[
            general_line("98"),
            detail_line("13", "00000001", "BING OFFERS-CONTOSO"),
        ]);

        let summary = processor.process(&parsed).await.unwrap();

        assert_eq!(summary.rejected.applied, vec!["00000001"]);
        assert_eq!(
            store.credit("00000001"),
            Some(CreditStatus::RejectedByPartner)
        );
    }

    #[tokio::test]
    async fn test_stale_rejection_does_not_regress_granted_credit() {
        let (processor, store) = processor_with_store();
        store.insert_credit("00000001", CreditStatus::CreditGranted);

        let parsed = parse(&[
            general_line("98"),
            detail_line("13", "00000001", "BING OFFERS-CONTOSO"),
        ]);

        let summary = processor.process(&parsed).await.unwrap();

        assert_eq!(summary.rejected.skipped, vec!["00000001"]);
        assert_eq!(store.credit("00000001"), Some(CreditStatus::CreditGranted));
    }

    #[tokio::test]
    async fn test_referred_redemption_routes_to_reward_bucket() {
        let (processor, store) = processor_with_store();
        store.insert_credit("00000001", CreditStatus::StatementCreditRequested);
        store.insert_payout("00000002", RewardPayoutStatus::Pending);

        let parsed = parse(&[
            general_line("98"),
            detail_line("8", "00000001", "BING OFFERS-CONTOSO"),
            // Descriptor match is case-insensitive.
            detail_line("8", "00000002", "Referred Redemption"),
        ]);

        let summary = processor.process(&parsed).await.unwrap();

        assert_eq!(summary.granted.applied, vec!["00000001"]);
        assert_eq!(summary.referred_paid.applied, vec!["00000002"]);
        assert_eq!(store.payout("00000002"), Some(RewardPayoutStatus::Paid));
        // The referred detail never touches the credit lifecycle.
        assert_eq!(store.credit("00000002"), None);
    }
}
