//! Acknowledgment file record types
//!
//! An Acknowledgment file is the processor's response to a prior PTS
//! submission: one general record for the submission as a whole and one
//! detail record per submitted transaction.
//!
//! Records are value objects constructed by the parser and owned by the
//! caller; the aggregate is built fresh per file parse and discarded after
//! the caller extracts its reference-number sets.

use rust_decimal::Decimal;

/// Outcome of decoding a single record line
///
/// A record that fails field validation is still appended to the owning
/// collection as `Invalid`, preserving the positional record count even for
/// bad lines.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome<T> {
    /// The record decoded cleanly
    Valid(T),
    /// The record failed field validation and was kept as a placeholder
    Invalid,
}

impl<T> RecordOutcome<T> {
    /// Whether this outcome holds a decoded record
    pub fn is_valid(&self) -> bool {
        matches!(self, RecordOutcome::Valid(_))
    }

    /// The decoded record, if validation succeeded
    pub fn as_valid(&self) -> Option<&T> {
        match self {
            RecordOutcome::Valid(record) => Some(record),
            RecordOutcome::Invalid => None,
        }
    }
}

/// Submission-level acknowledgment (record type "B")
///
/// Exactly one is expected per file; the parser reports a warning when that
/// expectation is violated but still returns whatever was decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralAcknowledgment {
    /// Total sales deposit amount for the submission
    pub sales_deposit_amount: Decimal,

    /// Total credit amount for the submission
    pub credit_amount: Decimal,

    /// Total cash advance deposit amount
    pub cash_advance_deposit_amount: Decimal,

    /// Submission-level acknowledgement code; "98" means accepted
    pub acknowledgement_code: String,

    /// Sequence number of this record within the acknowledged submission
    pub record_sequence_number: i64,

    /// Identifier of the acknowledged submission
    pub submission_id: String,

    /// Total deposit authorization request amount
    pub deposit_auth_request_amount: Decimal,

    /// Total cash advance deposit authorization amount
    pub cash_advance_deposit_auth_amount: Decimal,

    /// Whether a follow-up acknowledgment will be sent
    pub follow_up_indicator: String,
}

impl GeneralAcknowledgment {
    /// Acknowledgement code signalling an accepted submission
    pub const ACCEPTED_CODE: &'static str = "98";

    /// Whether the processor accepted the submission as a whole
    pub fn is_accepted(&self) -> bool {
        self.acknowledgement_code.trim() == Self::ACCEPTED_CODE
    }
}

/// Per-transaction acknowledgment (record type "A")
#[derive(Debug, Clone, PartialEq)]
pub struct DetailAcknowledgment {
    /// Card token of the acknowledged transaction
    pub token: String,

    /// Transaction amount (implied two decimal places on the wire)
    pub transaction_amount: Decimal,

    /// Transaction date in `MMDD` wire format
    pub transaction_date: String,

    /// Authorization code issued for the transaction
    pub authorization_code: String,

    /// Authorization date in wire format
    pub authorization_date: String,

    /// Per-transaction acknowledgement code; "8" means redeemed successfully
    pub acknowledgement_code: String,

    /// Reference number keying the redeemed deal in the platform's store
    pub reference_number: String,

    /// Sequence number of this record within the acknowledged submission
    pub record_sequence_number: i64,

    /// Merchant descriptor echoed back from the submission
    pub merchant_descriptor: String,
}

impl DetailAcknowledgment {
    /// Acknowledgement code signalling a successful redemption
    pub const SUCCESS_CODE: &'static str = "8";

    /// Whether the processor accepted this redemption
    pub fn is_successful(&self) -> bool {
        self.acknowledgement_code.trim() == Self::SUCCESS_CODE
    }
}

/// Aggregate of one parsed Acknowledgment file
///
/// Holds every decoded record in file order, including invalid placeholders,
/// so record-count expectations can be validated positionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Acknowledgment {
    /// General (submission-level) records; conceptually exactly one
    pub general_acknowledgments: Vec<RecordOutcome<GeneralAcknowledgment>>,

    /// Detail (per-transaction) records
    pub detail_acknowledgments: Vec<RecordOutcome<DetailAcknowledgment>>,
}

impl Acknowledgment {
    /// Create an empty aggregate for a fresh file parse
    pub fn new() -> Self {
        Self::default()
    }

    /// The submission-level record, if a valid one was decoded
    pub fn general(&self) -> Option<&GeneralAcknowledgment> {
        self.general_acknowledgments
            .iter()
            .find_map(RecordOutcome::as_valid)
    }

    /// Iterator over the valid detail records in file order
    pub fn valid_details(&self) -> impl Iterator<Item = &DetailAcknowledgment> {
        self.detail_acknowledgments
            .iter()
            .filter_map(RecordOutcome::as_valid)
    }
}
