//! PTS record-type encoders
//!
//! One encoder per record type, each emitting exactly
//! [`RECORD_LENGTH`](super::RECORD_LENGTH) characters. The receiving
//! mainframe parses these records positionally, so the widths below are the
//! compatibility contract: change one and every downstream field shifts.
//!
//! Layouts (width in characters):
//!
//! | Merchant "M" | | Descriptor "N" | |
//! |---|---|---|---|
//! | record type | 1 | record type | 1 |
//! | sequence number | 6 | sequence number | 6 |
//! | file origin code | 2 | merchant descriptor | 22 |
//! | partner merchant id | 16 | customer service phone | 13 |
//! | merchant name | 25 | descriptor state | 2 |
//! | submission date MMDDYYYY | 8 | filler | 36 |
//! | submission sequence number | 6 | | |
//! | filler | 16 | | |
//!
//! | Special-Condition "S" | | Acquirer-Reference "XR03" | |
//! |---|---|---|---|
//! | record type | 1 | record type | 4 |
//! | sequence number | 6 | sequence number | 6 |
//! | condition indicator | 2 | acquirer reference number | 23 |
//! | token | 16 | filler | 47 |
//! | filler | 55 | | |
//!
//! | Tokenization "XD67" | | Transaction-Detail "D" | | Total "T" | |
//! |---|---|---|---|---|---|
//! | record type | 4 | record type | 1 | record type | 1 |
//! | sequence number | 6 | sequence number | 6 | sequence number | 6 |
//! | token | 16 | token | 16 | detail record count | 6 |
//! | token indicator | 1 | transaction code | 1 | total discount amount | 12 |
//! | filler | 53 | discount amount | 10 | filler | 55 |
//! | | | transaction date MMDD | 4 | | |
//! | | | reference number | 8 | | |
//! | | | offer id | 10 | | |
//! | | | merchant descriptor | 22 | | |
//! | | | filler | 2 | | |

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::builder::{BuildContext, RECORD_LENGTH};
use crate::types::{OutstandingRedeemedDealInfo, PtsMerchantInfo, SettlementError};

/// Condition indicator claiming a statement credit
const STATEMENT_CREDIT_CONDITION: &str = "01";

/// Transaction code for a statement credit detail
const STATEMENT_CREDIT_TRANSACTION_CODE: &str = "6";

/// Merchant descriptor literal used for the partner-variant program
const PROGRAM_DESCRIPTOR: &str = "EARN CREDIT REWARD";

/// Merchant descriptor prefix for the default program
const DESCRIPTOR_PREFIX: &str = "BING OFFERS-";

/// Customer service phone rendered on the consumer's statement
const CUSTOMER_SERVICE_PHONE: &str = "800-555-1212";

/// State rendered next to the descriptor on the consumer's statement
const DESCRIPTOR_STATE: &str = "WA";

/// Width of the merchant descriptor slot
const DESCRIPTOR_WIDTH: usize = 22;

/// Accumulates one fixed-width record
///
/// Values shorter than their slot are padded (space or zero per method);
/// values longer than their slot are truncated. `finish` pads the record to
/// its full length.
pub(crate) struct RecordWriter {
    buffer: String,
}

impl RecordWriter {
    /// Start a record with its type prefix
    pub(crate) fn new(record_type: &str) -> Self {
        RecordWriter {
            buffer: record_type.to_string(),
        }
    }

    /// Append a left-justified, space-padded text field
    pub(crate) fn text(&mut self, value: &str, width: usize) {
        let truncated: String = value.chars().take(width).collect();
        self.buffer.push_str(&truncated);
        self.buffer
            .extend(std::iter::repeat(' ').take(width - truncated.chars().count()));
    }

    /// Append a right-justified, zero-padded numeric field
    ///
    /// A value wider than the slot keeps its low-order digits.
    pub(crate) fn digits(&mut self, value: u64, width: usize) {
        self.numeric_text(&value.to_string(), width);
    }

    /// Append a digit string right-justified and zero-padded
    ///
    /// A value wider than the slot keeps its trailing characters.
    pub(crate) fn numeric_text(&mut self, value: &str, width: usize) {
        let count = value.chars().count();
        if count >= width {
            self.buffer.extend(value.chars().skip(count - width));
        } else {
            self.buffer
                .extend(std::iter::repeat('0').take(width - count));
            self.buffer.push_str(value);
        }
    }

    /// Append the file-wide record sequence number
    pub(crate) fn sequence(&mut self, sequence_number: u64) {
        self.digits(sequence_number, 6);
    }

    /// Append a space filler
    pub(crate) fn filler(&mut self, width: usize) {
        self.buffer.extend(std::iter::repeat(' ').take(width));
    }

    /// Pad to the full record length and return the record text
    pub(crate) fn finish(mut self) -> String {
        while self.buffer.chars().count() < RECORD_LENGTH {
            self.buffer.push(' ');
        }
        self.buffer
    }
}

/// File origin code identifying the submitting program
fn file_origin_code(partner_variant: bool) -> &'static str {
    if partner_variant {
        "MS"
    } else {
        "OW"
    }
}

/// Merchant descriptor as rendered on the consumer's statement
///
/// The partner variant substitutes the program literal for the
/// merchant-derived descriptor; the slot width is identical either way.
fn merchant_descriptor(merchant_name: &str, partner_variant: bool) -> String {
    let descriptor = if partner_variant {
        format!("{}{}", DESCRIPTOR_PREFIX, merchant_name)
    } else {
        PROGRAM_DESCRIPTOR.to_string()
    };
    descriptor.chars().take(DESCRIPTOR_WIDTH).collect()
}

/// Convert a non-negative amount to whole cents
///
/// # Errors
///
/// Returns an error for negative amounts or values too large for the wire.
fn amount_in_cents(field_name: &str, amount: Decimal) -> Result<u64, SettlementError> {
    (amount * Decimal::new(100, 0))
        .round()
        .to_u64()
        .ok_or_else(|| SettlementError::invalid_amount(field_name, &amount.to_string()))
}

/// Encode a Merchant ("M") record opening a merchant group
pub(crate) fn merchant_record(
    sequence_number: u64,
    merchant: &PtsMerchantInfo,
    context: &BuildContext,
) -> String {
    let mut writer = RecordWriter::new("M");
    writer.sequence(sequence_number);
    writer.text(file_origin_code(context.partner_variant), 2);
    writer.text(&merchant.partner_merchant_id, 16);
    writer.text(&merchant.merchant_name, 25);
    writer.text(&context.submission_date.format("%m%d%Y").to_string(), 8);
    writer.digits(u64::from(context.submission_sequence_number), 6);
    writer.filler(16);
    writer.finish()
}

/// Encode a Descriptor ("N") record for a merchant group
pub(crate) fn descriptor_record(
    sequence_number: u64,
    merchant: &PtsMerchantInfo,
    context: &BuildContext,
) -> String {
    let mut writer = RecordWriter::new("N");
    writer.sequence(sequence_number);
    writer.text(
        &merchant_descriptor(&merchant.merchant_name, context.partner_variant),
        DESCRIPTOR_WIDTH,
    );
    writer.text(CUSTOMER_SERVICE_PHONE, 13);
    writer.text(DESCRIPTOR_STATE, 2);
    writer.filler(36);
    writer.finish()
}

/// Encode a Special-Condition ("S") record for one deal
pub(crate) fn special_condition_record(
    sequence_number: u64,
    deal: &OutstandingRedeemedDealInfo,
) -> String {
    let mut writer = RecordWriter::new("S");
    writer.sequence(sequence_number);
    writer.text(STATEMENT_CREDIT_CONDITION, 2);
    writer.text(&deal.token, 16);
    writer.filler(55);
    writer.finish()
}

/// Encode an Acquirer-Reference-Number ("XR03") record for one deal
///
/// The default program passes the deal's reference number through; the
/// partner variant synthesizes a marker from the transaction date because
/// that partner does not retain our reference numbers.
pub(crate) fn acquirer_reference_record(
    sequence_number: u64,
    deal: &OutstandingRedeemedDealInfo,
    context: &BuildContext,
) -> String {
    let mut writer = RecordWriter::new("XR03");
    writer.sequence(sequence_number);

    if context.partner_variant {
        let marker = format!(
            "74{}{}",
            deal.transaction_date.format("%m%d"),
            deal.reference_number
        );
        writer.numeric_text(&marker, 23);
    } else {
        writer.numeric_text(&deal.reference_number, 23);
    }

    writer.filler(47);
    writer.finish()
}

/// Encode a Tokenization ("XD67") record for one deal
pub(crate) fn tokenization_record(
    sequence_number: u64,
    deal: &OutstandingRedeemedDealInfo,
) -> String {
    let mut writer = RecordWriter::new("XD67");
    writer.sequence(sequence_number);
    writer.text(&deal.token, 16);
    writer.text("1", 1);
    writer.filler(53);
    writer.finish()
}

/// Encode a Transaction-Detail ("D") record for one deal
///
/// # Errors
///
/// Returns an error when the discount amount cannot be rendered as
/// unsigned cents.
pub(crate) fn transaction_detail_record(
    sequence_number: u64,
    deal: &OutstandingRedeemedDealInfo,
    context: &BuildContext,
) -> Result<String, SettlementError> {
    let cents = amount_in_cents("discount amount", deal.discount_amount)?;

    let mut writer = RecordWriter::new("D");
    writer.sequence(sequence_number);
    writer.text(&deal.token, 16);
    writer.text(STATEMENT_CREDIT_TRANSACTION_CODE, 1);
    writer.digits(cents, 10);
    writer.text(&deal.transaction_date.format("%m%d").to_string(), 4);
    writer.numeric_text(&deal.reference_number, 8);

    // Offer id is right-padded with '0' before truncation.
    let offer_id: String = format!("{:0<10}", deal.offer_id).chars().take(10).collect();
    writer.text(&offer_id, 10);

    writer.text(
        &merchant_descriptor(&deal.merchant_name, context.partner_variant),
        DESCRIPTOR_WIDTH,
    );
    writer.filler(2);
    Ok(writer.finish())
}

/// Encode the file-closing Total ("T") record
///
/// # Errors
///
/// Returns an error when the summed discount amount cannot be rendered as
/// unsigned cents.
pub(crate) fn total_record(
    sequence_number: u64,
    detail_count: usize,
    total_discount: Decimal,
) -> Result<String, SettlementError> {
    let cents = amount_in_cents("total discount amount", total_discount)?;

    let mut writer = RecordWriter::new("T");
    writer.sequence(sequence_number);
    writer.digits(detail_count as u64, 6);
    writer.digits(cents, 12);
    writer.filler(55);
    Ok(writer.finish())
}
