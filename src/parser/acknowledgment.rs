//! Acknowledgment file parser
//!
//! Parses the processor's response to a prior PTS submission. Each line is
//! dispatched by its leading record-type code: `"A"` to the detail decoder,
//! `"B"` to the general decoder. Any other code is silently ignored.
//!
//! # Error Handling
//!
//! - A missing file is fatal for the file only: `parse_file` returns
//!   `Ok(None)` after reporting `FileNotFound`.
//! - A line too short to carry a record-type code is reported and skipped.
//! - A record that fails field validation is appended as an invalid
//!   placeholder, preserving the positional record count.
//! - Zero detail records is informational (legitimately empty file); a
//!   general-record count other than one is a warning.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use tracing::{info, warn};

use crate::codec::FieldCursor;
use crate::parser::{decode_amount_field, decode_integer_field, RECORD_TYPE_WIDTH};
use crate::types::{
    Acknowledgment, DetailAcknowledgment, GeneralAcknowledgment, ParseWarning, RecordOutcome,
    ResultCode, SettlementError,
};

/// Record-type code of a detail (per-transaction) acknowledgment line
const DETAIL_RECORD_CODE: &str = "A";

/// Record-type code of a general (submission-level) acknowledgment line
const GENERAL_RECORD_CODE: &str = "B";

/// Result of parsing one Acknowledgment file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAcknowledgment {
    /// The decoded aggregate, invalid placeholders included
    pub acknowledgment: Acknowledgment,
    /// Every reported condition, in the order encountered
    pub warnings: Vec<ParseWarning>,
}

/// Parser for one Acknowledgment file
///
/// Holds only the file's own cursor state (line number, record collections);
/// separate files are parsed by separate instances with no shared state.
#[derive(Debug)]
pub struct AcknowledgmentParser {
    file_name: String,
    line_number: u64,
    acknowledgment: Acknowledgment,
    warnings: Vec<ParseWarning>,
}

impl AcknowledgmentParser {
    /// Create a parser for the named file
    ///
    /// The name is carried into every structured log entry for this parse.
    pub fn new(file_name: impl Into<String>) -> Self {
        AcknowledgmentParser {
            file_name: file_name.into(),
            line_number: 0,
            acknowledgment: Acknowledgment::new(),
            warnings: Vec::new(),
        }
    }

    /// Parse an Acknowledgment file from disk
    ///
    /// # Returns
    ///
    /// * `Ok(Some(parsed))` - the file was read; inspect its warnings
    /// * `Ok(None)` - the file does not exist; `FileNotFound` was reported
    ///   (fatal for this file, non-fatal for the caller's batch)
    ///
    /// # Errors
    ///
    /// Returns an error for I/O failures other than a missing file.
    pub fn parse_file(path: &Path) -> Result<Option<ParsedAcknowledgment>, SettlementError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                warn!(
                    code = ResultCode::FileNotFound.code(),
                    file = %path.display(),
                    "acknowledgment file not found"
                );
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        };

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| path.display().to_string());

        let parser = AcknowledgmentParser::new(file_name);
        parser.parse(BufReader::new(file)).map(Some)
    }

    /// Parse Acknowledgment records from a line-oriented reader
    ///
    /// Lines may be `\r\n` or `\n` delimited.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures; malformed content is reported
    /// and parsing continues.
    pub fn parse<R: BufRead>(mut self, reader: R) -> Result<ParsedAcknowledgment, SettlementError> {
        for line in reader.lines() {
            let line = line?;
            self.line_number += 1;
            self.process_line(line.trim_end_matches('\r'));
        }

        Ok(self.finish())
    }

    /// Dispatch one line by its leading record-type code
    fn process_line(&mut self, line: &str) {
        if line.len() <= RECORD_TYPE_WIDTH {
            warn!(
                code = ResultCode::UnexpectedEndOfRecord.code(),
                line = self.line_number,
                file = %self.file_name,
                "line too short to carry a record"
            );
            self.warnings.push(ParseWarning::at_line(
                ResultCode::UnexpectedEndOfRecord,
                self.line_number,
                "line too short to carry a record",
            ));
            return;
        }

        match line.get(..RECORD_TYPE_WIDTH) {
            Some(DETAIL_RECORD_CODE) => {
                let outcome = self.decode_detail(line);
                self.push_detail(outcome);
            }
            Some(GENERAL_RECORD_CODE) => {
                let outcome = self.decode_general(line);
                self.push_general(outcome);
            }
            // Unrecognized record types are dropped without a log entry.
            _ => {}
        }
    }

    /// Decode a detail ("A") record
    ///
    /// The cursor consumes every declared field even after a failure so that
    /// later offsets stay aligned; validity is checked once at the end.
    fn decode_detail(&self, line: &str) -> RecordOutcome<DetailAcknowledgment> {
        let mut cursor = FieldCursor::new(line, self.line_number, &self.file_name);

        cursor.verify_literal("record id", "A");
        let token = cursor.extract_field("token", 16);
        cursor.verify_literal("transaction code", "6");
        let amount = cursor.extract_field("transaction amount", 8);
        let transaction_date = cursor.extract_field("transaction date", 4);
        let authorization_code = cursor.extract_field("authorization code", 6);
        let authorization_date = cursor.extract_field("authorization date", 4);
        let acknowledgement_code = cursor.extract_field("acknowledgement code", 4);
        let reference_number = cursor.extract_field("reference number", 8);
        let sequence = cursor.extract_field("record sequence number", 6);
        let merchant_descriptor = cursor.extract_field("merchant descriptor", 21);
        cursor.verify_literal("card type", "T");

        let transaction_amount = decode_amount_field(&mut cursor, "transaction amount", amount);
        let record_sequence_number =
            decode_integer_field(&mut cursor, "record sequence number", sequence);

        if !cursor.is_valid() {
            return RecordOutcome::Invalid;
        }

        RecordOutcome::Valid(DetailAcknowledgment {
            token: token.unwrap_or_default().to_string(),
            transaction_amount,
            transaction_date: transaction_date.unwrap_or_default().to_string(),
            authorization_code: authorization_code.unwrap_or_default().to_string(),
            authorization_date: authorization_date.unwrap_or_default().to_string(),
            acknowledgement_code: acknowledgement_code.unwrap_or_default().to_string(),
            reference_number: reference_number.unwrap_or_default().to_string(),
            record_sequence_number,
            merchant_descriptor: merchant_descriptor.unwrap_or_default().to_string(),
        })
    }

    /// Decode a general ("B") record
    fn decode_general(&self, line: &str) -> RecordOutcome<GeneralAcknowledgment> {
        let mut cursor = FieldCursor::new(line, self.line_number, &self.file_name);

        cursor.verify_literal("record id", "B");
        let sales_deposit = cursor.extract_field("sales deposit amount", 9);
        let credit = cursor.extract_field("credit amount", 9);
        let cash_advance_deposit = cursor.extract_field("cash advance deposit amount", 9);
        let acknowledgement_code = cursor.extract_field("acknowledgement code", 4);
        cursor.verify_literal("filler", "     ");
        let sequence = cursor.extract_field("record sequence number", 6);
        let submission_id = cursor.extract_field("submission id", 9);
        cursor.verify_literal("filler", "        ");
        let deposit_auth_request = cursor.extract_field("deposit auth request amount", 9);
        let cash_advance_auth = cursor.extract_field("cash advance deposit auth amount", 9);
        let follow_up_indicator = cursor.extract_field("follow-up ack indicator", 1);
        cursor.verify_literal("filler", " ");

        let sales_deposit_amount =
            decode_amount_field(&mut cursor, "sales deposit amount", sales_deposit);
        let credit_amount = decode_amount_field(&mut cursor, "credit amount", credit);
        let cash_advance_deposit_amount = decode_amount_field(
            &mut cursor,
            "cash advance deposit amount",
            cash_advance_deposit,
        );
        let record_sequence_number =
            decode_integer_field(&mut cursor, "record sequence number", sequence);
        let deposit_auth_request_amount = decode_amount_field(
            &mut cursor,
            "deposit auth request amount",
            deposit_auth_request,
        );
        let cash_advance_deposit_auth_amount = decode_amount_field(
            &mut cursor,
            "cash advance deposit auth amount",
            cash_advance_auth,
        );

        if !cursor.is_valid() {
            return RecordOutcome::Invalid;
        }

        RecordOutcome::Valid(GeneralAcknowledgment {
            sales_deposit_amount,
            credit_amount,
            cash_advance_deposit_amount,
            acknowledgement_code: acknowledgement_code.unwrap_or_default().to_string(),
            record_sequence_number,
            submission_id: submission_id.unwrap_or_default().to_string(),
            deposit_auth_request_amount,
            cash_advance_deposit_auth_amount,
            follow_up_indicator: follow_up_indicator.unwrap_or_default().to_string(),
        })
    }

    fn push_detail(&mut self, outcome: RecordOutcome<DetailAcknowledgment>) {
        if !outcome.is_valid() {
            self.warnings.push(ParseWarning::at_line(
                ResultCode::InvalidRecord,
                self.line_number,
                "detail acknowledgment failed field validation",
            ));
        }
        self.acknowledgment.detail_acknowledgments.push(outcome);
    }

    fn push_general(&mut self, outcome: RecordOutcome<GeneralAcknowledgment>) {
        if !outcome.is_valid() {
            self.warnings.push(ParseWarning::at_line(
                ResultCode::InvalidRecord,
                self.line_number,
                "general acknowledgment failed field validation",
            ));
        }
        self.acknowledgment.general_acknowledgments.push(outcome);
    }

    /// Validate record-count expectations and hand back the aggregate
    ///
    /// Neither condition aborts the parse: an empty detail set may be
    /// legitimate, and a missing (or duplicated) general record still leaves
    /// the detail records usable.
    fn finish(mut self) -> ParsedAcknowledgment {
        if self.acknowledgment.detail_acknowledgments.is_empty() {
            info!(
                file = %self.file_name,
                "acknowledgment file contained no detail records"
            );
        }

        let general_count = self.acknowledgment.general_acknowledgments.len();
        if general_count != 1 {
            warn!(
                code = ResultCode::FileMissingExpectedRecord.code(),
                file = %self.file_name,
                count = general_count,
                "expected exactly one general acknowledgment record"
            );
            self.warnings.push(ParseWarning::file_level(
                ResultCode::FileMissingExpectedRecord,
                format!(
                    "expected exactly one general acknowledgment record, found {}",
                    general_count
                ),
            ));
        }

        ParsedAcknowledgment {
            acknowledgment: self.acknowledgment,
            warnings: self.warnings,
        }
    }
}
