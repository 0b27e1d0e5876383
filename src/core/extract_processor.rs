//! Extract file processing
//!
//! Consumes a parsed Extract and reconciles each settled transaction:
//! redemptions advance the deal's credit status, schedule the (deliberately
//! delayed) reward payout, and publish a settled-transaction event;
//! reversals rescind any pending payout and never schedule one. The footer's
//! declared count and total are checked last as an integrity signal.

use crate::core::reconciler::{SettlementReconciler, StatusAdvanceOutcome};
use crate::parser::ParsedExtract;
use crate::types::{
    CreditStatus, ParseWarning, RewardPayoutPayload, RewardPayoutStatus, SettledTransactionEvent,
    SettlementDetail, SettlementError, SettlementType,
};

/// Outcome of processing one Extract file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractProcessingSummary {
    /// Credit advances for settled redemptions
    pub settled: StatusAdvanceOutcome,
    /// Payout advances for reversals
    pub rescinded: StatusAdvanceOutcome,
    /// Number of reward payouts handed to the scheduler
    pub rewards_scheduled: usize,
    /// Number of settled-transaction events published
    pub events_published: usize,
    /// Integrity warnings from the footer check
    pub metadata_warnings: Vec<ParseWarning>,
}

/// Processor for parsed Extract files
#[derive(Clone)]
pub struct ExtractProcessor {
    reconciler: SettlementReconciler,
}

impl ExtractProcessor {
    /// Create a processor over the given reconciliation engine
    pub fn new(reconciler: SettlementReconciler) -> Self {
        ExtractProcessor { reconciler }
    }

    /// Reconcile one parsed Extract against the persisted statuses
    ///
    /// # Errors
    ///
    /// Propagates store, scheduler, and publisher failures; integrity
    /// mismatches are reported in the summary, not errors.
    pub async fn process(
        &self,
        parsed: &ParsedExtract,
    ) -> Result<ExtractProcessingSummary, SettlementError> {
        let mut summary = ExtractProcessingSummary::default();

        let redemptions: Vec<String> = parsed
            .extract
            .valid_details()
            .filter(|d| d.settlement_type == SettlementType::Redemption)
            .map(|d| d.reference_number.clone())
            .collect();
        let reversals: Vec<String> = parsed
            .extract
            .valid_details()
            .filter(|d| d.settlement_type == SettlementType::Reversal)
            .map(|d| d.reference_number.clone())
            .collect();

        summary.settled = self
            .reconciler
            .advance_credit_status(&redemptions, CreditStatus::ClearingReceived)
            .await?;
        summary.rescinded = self
            .reconciler
            .advance_reward_payout_status(&reversals, RewardPayoutStatus::Rescinded)
            .await?;

        for detail in parsed.extract.valid_details() {
            // Only a settled redemption earns a reward; the payout is
            // scheduled with a fixed delay so a reversal arriving in a later
            // file can rescind it before it becomes payable. Reversals never
            // schedule anything.
            if detail.settlement_type == SettlementType::Redemption {
                self.reconciler
                    .schedule_reward_payout(payout_payload(detail))
                    .await?;
                summary.rewards_scheduled += 1;
            }

            self.reconciler
                .publish_settled_event(settled_event(detail))
                .await?;
            summary.events_published += 1;
        }

        if let Some(footer) = parsed.extract.footer() {
            // The count check runs against the positional record count,
            // invalid placeholders included, so a corrupted line still
            // counts toward what the file physically carried.
            summary.metadata_warnings = self.reconciler.evaluate_metadata(
                parsed.extract.settlement_details.len(),
                footer.declared_record_count,
                parsed.extract.parsed_total_amount(),
                footer.declared_total_amount,
            );
        }

        Ok(summary)
    }
}

fn payout_payload(detail: &SettlementDetail) -> RewardPayoutPayload {
    RewardPayoutPayload {
        consumer_id: detail.consumer_id.clone(),
        transaction_id: detail.transaction_id.clone(),
        reference_number: detail.reference_number.clone(),
        settlement_amount: detail.settlement_amount,
    }
}

fn settled_event(detail: &SettlementDetail) -> SettledTransactionEvent {
    SettledTransactionEvent {
        consumer_id: detail.consumer_id.clone(),
        transaction_id: detail.transaction_id.clone(),
        reference_number: detail.reference_number.clone(),
        settlement_type: detail.settlement_type,
        settlement_amount: detail.settlement_amount,
    }
}
