//! Extract (settlement) file record types
//!
//! An Extract file reports what the processor actually settled: one detail
//! record per settled transaction plus a footer declaring the expected record
//! count and total amount, which the reconciliation engine checks against
//! what was parsed.

use crate::types::acknowledgment::RecordOutcome;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a settlement detail represents a redemption or its reversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementType {
    /// The consumer's redemption settled
    Redemption,
    /// A previously settled redemption was reversed
    Reversal,
}

/// One settled transaction from an Extract file (record type "D")
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementDetail {
    /// Platform identifier of the consumer who redeemed the deal
    pub consumer_id: String,

    /// Platform identifier of the settled transaction
    pub transaction_id: String,

    /// Redemption or reversal
    pub settlement_type: SettlementType,

    /// Settled amount (implied two decimal places on the wire)
    pub settlement_amount: Decimal,

    /// Transaction date in `MMDD` wire format
    pub transaction_date: String,

    /// Reference number keying the redeemed deal in the platform's store
    pub reference_number: String,
}

/// Extract file footer (record type "T")
///
/// Declares what the file should have contained; disagreement with the parsed
/// records is an observability signal, not a transactional abort.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractFooter {
    /// Number of detail records the file claims to hold
    pub declared_record_count: i64,

    /// Total settled amount the file claims to hold
    pub declared_total_amount: Decimal,
}

/// Aggregate of one parsed Extract file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extract {
    /// Settlement detail records in file order, invalid placeholders included
    pub settlement_details: Vec<RecordOutcome<SettlementDetail>>,

    /// Footer records; conceptually exactly one
    pub footers: Vec<RecordOutcome<ExtractFooter>>,
}

impl Extract {
    /// Create an empty aggregate for a fresh file parse
    pub fn new() -> Self {
        Self::default()
    }

    /// The footer, if a valid one was decoded
    pub fn footer(&self) -> Option<&ExtractFooter> {
        self.footers.iter().find_map(RecordOutcome::as_valid)
    }

    /// Iterator over the valid settlement details in file order
    pub fn valid_details(&self) -> impl Iterator<Item = &SettlementDetail> {
        self.settlement_details
            .iter()
            .filter_map(RecordOutcome::as_valid)
    }

    /// Sum of the valid settlement details' amounts
    pub fn parsed_total_amount(&self) -> Decimal {
        self.valid_details().map(|d| d.settlement_amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(settlement_type: SettlementType, amount: Decimal) -> SettlementDetail {
        SettlementDetail {
            consumer_id: "consumer-0001".to_string(),
            transaction_id: "txn-0001".to_string(),
            settlement_type,
            settlement_amount: amount,
            transaction_date: "0314".to_string(),
            reference_number: "00000001".to_string(),
        }
    }

    #[test]
    fn test_parsed_total_sums_only_valid_details() {
        let extract = Extract {
            settlement_details: vec![
                RecordOutcome::Valid(detail(SettlementType::Redemption, Decimal::new(1000, 2))),
                RecordOutcome::Invalid,
                RecordOutcome::Valid(detail(SettlementType::Reversal, Decimal::new(250, 2))),
            ],
            footers: vec![],
        };

        assert_eq!(extract.parsed_total_amount(), Decimal::new(1250, 2));
    }

    #[test]
    fn test_footer_lookup() {
        let extract = Extract {
            settlement_details: vec![],
            footers: vec![RecordOutcome::Valid(ExtractFooter {
                declared_record_count: 2,
                declared_total_amount: Decimal::new(1250, 2),
            })],
        };

        assert_eq!(extract.footer().unwrap().declared_record_count, 2);
    }
}
