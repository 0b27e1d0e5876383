//! Outbound PTS file builder
//!
//! Assembles the platform's claim for statement credits into the processor's
//! fixed-width PTS format: 80-character records, `\n`-delimited (no carriage
//! return; the receiving system is non-Windows), one file-wide sequence
//! counter across every record.
//!
//! # File Shape
//!
//! Deals are grouped by [`PtsMerchantInfo`] value equality in first-seen
//! order. Each group opens with a Merchant and a Descriptor record; each deal
//! in the group then contributes exactly four records (Special-Condition,
//! Acquirer-Reference-Number, Tokenization, Transaction-Detail), and the file
//! closes with a single Total record carrying the summed discount amounts.

mod records;

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::types::{OutstandingRedeemedDealInfo, PtsMerchantInfo, SettlementError};

/// Exact length of every PTS record, in characters
pub const RECORD_LENGTH: usize = 80;

/// Record delimiter; deliberately bare `\n`
pub const RECORD_DELIMITER: char = '\n';

/// Submission-level inputs shared by every record in one build
#[derive(Debug, Clone)]
pub(crate) struct BuildContext {
    /// Date of this submission
    pub submission_date: NaiveDate,
    /// Sequence number of this submission (file-level, assigned by caller)
    pub submission_sequence_number: u32,
    /// Whether to build the partner-variant rendition of the format
    pub partner_variant: bool,
}

/// Builder for one outbound PTS file
///
/// # Examples
///
/// ```no_run
/// use chrono::NaiveDate;
/// use settlement_engine::builder::PtsFileBuilder;
/// use settlement_engine::types::OutstandingRedeemedDealInfo;
///
/// let deals: Vec<OutstandingRedeemedDealInfo> = Vec::new();
/// let builder = PtsFileBuilder::new(
///     NaiveDate::from_ymd_opt(2014, 3, 17).unwrap(),
///     1,
///     false,
/// );
/// let text = builder.build(&deals).expect("build failed");
/// ```
#[derive(Debug)]
pub struct PtsFileBuilder {
    context: BuildContext,
}

impl PtsFileBuilder {
    /// Create a builder for one submission
    ///
    /// # Arguments
    ///
    /// * `submission_date` - date stamped into every Merchant record
    /// * `submission_sequence_number` - caller-assigned submission counter
    /// * `partner_variant` - selects the partner rendition (content, not
    ///   layout, of a few fields)
    pub fn new(
        submission_date: NaiveDate,
        submission_sequence_number: u32,
        partner_variant: bool,
    ) -> Self {
        PtsFileBuilder {
            context: BuildContext {
                submission_date,
                submission_sequence_number,
                partner_variant,
            },
        }
    }

    /// Build the PTS file text for the given outstanding deals
    ///
    /// # Returns
    ///
    /// The complete file text, every record newline-terminated.
    ///
    /// # Errors
    ///
    /// Returns an error when a discount amount cannot be rendered as
    /// unsigned cents (negative or out of range).
    pub fn build(
        &self,
        deals: &[OutstandingRedeemedDealInfo],
    ) -> Result<String, SettlementError> {
        let groups = group_by_merchant(deals);

        let mut output = String::new();
        // One counter for the entire file: never reset per merchant or
        // per record type.
        let mut sequence_number: u64 = 1;
        let mut total_discount = Decimal::ZERO;
        let mut detail_count = 0usize;

        let emit = |output: &mut String, record: String| {
            output.push_str(&record);
            output.push(RECORD_DELIMITER);
        };

        for (merchant, merchant_deals) in &groups {
            emit(
                &mut output,
                records::merchant_record(sequence_number, merchant, &self.context),
            );
            sequence_number += 1;

            emit(
                &mut output,
                records::descriptor_record(sequence_number, merchant, &self.context),
            );
            sequence_number += 1;

            for deal in merchant_deals {
                emit(
                    &mut output,
                    records::special_condition_record(sequence_number, deal),
                );
                sequence_number += 1;

                emit(
                    &mut output,
                    records::acquirer_reference_record(sequence_number, deal, &self.context),
                );
                sequence_number += 1;

                emit(
                    &mut output,
                    records::tokenization_record(sequence_number, deal),
                );
                sequence_number += 1;

                emit(
                    &mut output,
                    records::transaction_detail_record(sequence_number, deal, &self.context)?,
                );
                sequence_number += 1;

                total_discount += deal.discount_amount;
                detail_count += 1;
            }
        }

        emit(
            &mut output,
            records::total_record(sequence_number, detail_count, total_discount)?,
        );

        Ok(output)
    }
}

/// Group deals by merchant value equality, preserving first-seen order
fn group_by_merchant(
    deals: &[OutstandingRedeemedDealInfo],
) -> Vec<(PtsMerchantInfo, Vec<&OutstandingRedeemedDealInfo>)> {
    let mut groups: Vec<(PtsMerchantInfo, Vec<&OutstandingRedeemedDealInfo>)> = Vec::new();
    let mut index: HashMap<PtsMerchantInfo, usize> = HashMap::new();

    for deal in deals {
        let key = PtsMerchantInfo::for_deal(deal);
        match index.get(&key) {
            Some(&position) => groups[position].1.push(deal),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![deal]));
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReimbursementTender;
    use rust_decimal::Decimal;

    fn deal(merchant_id: &str, merchant_name: &str, reference: &str, discount_cents: i64) -> OutstandingRedeemedDealInfo {
        OutstandingRedeemedDealInfo {
            partner_merchant_id: merchant_id.to_string(),
            merchant_name: merchant_name.to_string(),
            reimbursement_tender: ReimbursementTender::DealCurrency,
            discount_amount: Decimal::new(discount_cents, 2),
            settlement_amount: Decimal::new(discount_cents * 4, 2),
            token: "4111222233334444".to_string(),
            offer_id: "77".to_string(),
            transaction_date: chrono::NaiveDate::from_ymd_opt(2014, 3, 14).unwrap(),
            reference_number: reference.to_string(),
        }
    }

    fn builder() -> PtsFileBuilder {
        PtsFileBuilder::new(
            chrono::NaiveDate::from_ymd_opt(2014, 3, 17).unwrap(),
            1,
            false,
        )
    }

    #[test]
    fn test_two_merchants_emit_expected_record_mix() {
        let deals = vec![
            deal("M-A", "Contoso Coffee", "00000001", 500),
            deal("M-A", "Contoso Coffee", "00000002", 750),
            deal("M-B", "Fabrikam Diner", "00000003", 1000),
        ];

        let text = builder().build(&deals).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        // 2 Merchant/Descriptor pairs + 4 records per deal + 1 Total.
        assert_eq!(lines.len(), 2 * 2 + 4 * 3 + 1);

        let merchant_count = lines.iter().filter(|l| l.starts_with('M')).count();
        let descriptor_count = lines.iter().filter(|l| l.starts_with('N')).count();
        let total_count = lines.iter().filter(|l| l.starts_with('T')).count();
        assert_eq!(merchant_count, 2);
        assert_eq!(descriptor_count, 2);
        assert_eq!(total_count, 1);

        let detail_type_count = lines
            .iter()
            .filter(|l| {
                l.starts_with('S')
                    || l.starts_with("XR03")
                    || l.starts_with("XD67")
                    || l.starts_with('D')
            })
            .count();
        assert_eq!(detail_type_count, 12);
    }

    #[test]
    fn test_sequence_numbers_are_contiguous_in_emission_order() {
        let deals = vec![
            deal("M-A", "Contoso Coffee", "00000001", 500),
            deal("M-A", "Contoso Coffee", "00000002", 750),
            deal("M-B", "Fabrikam Diner", "00000003", 1000),
        ];

        let text = builder().build(&deals).unwrap();
        let sequences: Vec<u64> = text
            .lines()
            .map(|line| {
                let offset = if line.starts_with("XR03") || line.starts_with("XD67") {
                    4
                } else {
                    1
                };
                line[offset..offset + 6].parse().unwrap()
            })
            .collect();

        let expected: Vec<u64> = (1..=15).collect();
        assert_eq!(sequences, expected);
    }

    #[test]
    fn test_total_record_sums_discounts_exactly() {
        let deals = vec![
            deal("M-A", "Contoso Coffee", "00000001", 500),
            deal("M-A", "Contoso Coffee", "00000002", 750),
            deal("M-B", "Fabrikam Diner", "00000003", 1000),
        ];

        let text = builder().build(&deals).unwrap();
        let total_line = text.lines().find(|l| l.starts_with('T')).unwrap();

        // 5.00 + 7.50 + 10.00 = 22.50 → 2250 cents.
        assert_eq!(&total_line[13..25], "000000002250");
        // Detail count alongside.
        assert_eq!(&total_line[7..13], "000003");
    }

    #[test]
    fn test_every_line_is_eighty_characters_with_bare_newline() {
        let deals = vec![
            deal("M-A", "Contoso Coffee", "00000001", 500),
            deal("M-B", "Fabrikam Diner", "00000002", 1000),
        ];

        let text = builder().build(&deals).unwrap();

        assert!(!text.contains('\r'));
        assert!(text.ends_with('\n'));
        for line in text.lines() {
            assert_eq!(line.chars().count(), RECORD_LENGTH);
        }
    }

    #[test]
    fn test_grouping_preserves_first_seen_order() {
        let deals = vec![
            deal("M-B", "Fabrikam Diner", "00000001", 500),
            deal("M-A", "Contoso Coffee", "00000002", 750),
            deal("M-B", "Fabrikam Diner", "00000003", 1000),
        ];

        let text = builder().build(&deals).unwrap();
        let merchant_lines: Vec<&str> =
            text.lines().filter(|l| l.starts_with('M')).collect();

        assert!(merchant_lines[0].contains("Fabrikam Diner"));
        assert!(merchant_lines[1].contains("Contoso Coffee"));

        // Both Fabrikam deals land in the first group despite the interleave,
        // so the reference numbers appear regrouped in the output.
        let references: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("XR03"))
            .map(|l| &l[25..33])
            .collect();
        assert_eq!(references, vec!["00000001", "00000003", "00000002"]);
    }

    #[test]
    fn test_empty_input_emits_total_only() {
        let text = builder().build(&[]).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with('T'));
        assert_eq!(&lines[0][1..7], "000001");
        assert_eq!(&lines[0][13..25], "000000000000");
    }
}
