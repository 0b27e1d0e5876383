//! Extract (settlement) file parser
//!
//! Parses the processor's report of actually-settled transactions: one
//! detail line per settlement (tagged redemption or reversal) plus a footer
//! declaring the expected record count and total amount. Same dispatch, same
//! latched field cursor, and same continue-on-bad-line tolerance as the
//! Acknowledgment parser.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::Path;

use tracing::{info, warn};

use crate::codec::FieldCursor;
use crate::parser::{decode_amount_field, decode_integer_field, RECORD_TYPE_WIDTH};
use crate::types::{
    Extract, ExtractFooter, ParseWarning, RecordOutcome, ResultCode, SettlementDetail,
    SettlementError, SettlementType,
};

/// Record-type code of a settlement detail line
const DETAIL_RECORD_CODE: &str = "D";

/// Record-type code of the footer line
const FOOTER_RECORD_CODE: &str = "T";

/// Settlement type code for a redemption
const REDEMPTION_TYPE_CODE: &str = "05";

/// Settlement type code for a reversal
const REVERSAL_TYPE_CODE: &str = "06";

/// Result of parsing one Extract file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExtract {
    /// The decoded aggregate, invalid placeholders included
    pub extract: Extract,
    /// Every reported condition, in the order encountered
    pub warnings: Vec<ParseWarning>,
}

/// Parser for one Extract file
#[derive(Debug)]
pub struct ExtractParser {
    file_name: String,
    line_number: u64,
    extract: Extract,
    warnings: Vec<ParseWarning>,
}

impl ExtractParser {
    /// Create a parser for the named file
    pub fn new(file_name: impl Into<String>) -> Self {
        ExtractParser {
            file_name: file_name.into(),
            line_number: 0,
            extract: Extract::new(),
            warnings: Vec::new(),
        }
    }

    /// Parse an Extract file from disk
    ///
    /// # Returns
    ///
    /// * `Ok(Some(parsed))` - the file was read; inspect its warnings
    /// * `Ok(None)` - the file does not exist; `FileNotFound` was reported
    ///
    /// # Errors
    ///
    /// Returns an error for I/O failures other than a missing file.
    pub fn parse_file(path: &Path) -> Result<Option<ParsedExtract>, SettlementError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                warn!(
                    code = ResultCode::FileNotFound.code(),
                    file = %path.display(),
                    "extract file not found"
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

        let parser = ExtractParser::new(file_name);
        parser.parse(BufReader::new(file)).map(Some)
    }

    /// Parse Extract records from a line-oriented reader
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures; malformed content is reported
    /// and parsing continues.
    pub fn parse<R: BufRead>(mut self, reader: R) -> Result<ParsedExtract, SettlementError> {
        for line in reader.lines() {
            let line = line?;
            self.line_number += 1;
            self.process_line(line.trim_end_matches('\r'));
        }

        Ok(self.finish())
    }

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
                if !outcome.is_valid() {
                    self.warnings.push(ParseWarning::at_line(
                        ResultCode::InvalidRecord,
                        self.line_number,
                        "settlement detail failed field validation",
                    ));
                }
                self.extract.settlement_details.push(outcome);
            }
            Some(FOOTER_RECORD_CODE) => {
                let outcome = self.decode_footer(line);
                if !outcome.is_valid() {
                    self.warnings.push(ParseWarning::at_line(
                        ResultCode::InvalidRecord,
                        self.line_number,
                        "extract footer failed field validation",
                    ));
                }
                self.extract.footers.push(outcome);
            }
            // Unrecognized record types are dropped without a log entry,
            // matching the Acknowledgment parser.
            _ => {}
        }
    }

    /// Decode a settlement detail ("D") record
    fn decode_detail(&self, line: &str) -> RecordOutcome<SettlementDetail> {
        let mut cursor = FieldCursor::new(line, self.line_number, &self.file_name);

        cursor.verify_literal("record id", "D");
        let consumer_id = cursor.extract_field("consumer id", 16);
        let transaction_id = cursor.extract_field("transaction id", 16);
        let type_code = cursor.extract_field("settlement type", 2);
        let amount = cursor.extract_field("settlement amount", 10);
        let transaction_date = cursor.extract_field("transaction date", 4);
        let reference_number = cursor.extract_field("reference number", 8);
        cursor.verify_literal("filler", &" ".repeat(23));

        let settlement_type = match type_code {
            Some(REDEMPTION_TYPE_CODE) => Some(SettlementType::Redemption),
            Some(REVERSAL_TYPE_CODE) => Some(SettlementType::Reversal),
            Some(other) => {
                warn!(
                    code = ResultCode::InvalidRecord.code(),
                    field = "settlement type",
                    actual = other,
                    line = self.line_number,
                    file = %self.file_name,
                    "unknown settlement type code"
                );
                cursor.invalidate();
                None
            }
            None => None,
        };

        let settlement_amount = decode_amount_field(&mut cursor, "settlement amount", amount);

        if !cursor.is_valid() {
            return RecordOutcome::Invalid;
        }

        let Some(settlement_type) = settlement_type else {
            return RecordOutcome::Invalid;
        };

        RecordOutcome::Valid(SettlementDetail {
            consumer_id: consumer_id.unwrap_or_default().trim().to_string(),
            transaction_id: transaction_id.unwrap_or_default().trim().to_string(),
            settlement_type,
            settlement_amount,
            transaction_date: transaction_date.unwrap_or_default().to_string(),
            reference_number: reference_number.unwrap_or_default().to_string(),
        })
    }

    /// Decode the footer ("T") record
    fn decode_footer(&self, line: &str) -> RecordOutcome<ExtractFooter> {
        let mut cursor = FieldCursor::new(line, self.line_number, &self.file_name);

        cursor.verify_literal("record id", "T");
        let record_count = cursor.extract_field("record count", 9);
        let total_amount = cursor.extract_field("total settled amount", 15);
        cursor.verify_literal("filler", &" ".repeat(55));

        let declared_record_count = decode_integer_field(&mut cursor, "record count", record_count);
        let declared_total_amount =
            decode_amount_field(&mut cursor, "total settled amount", total_amount);

        if !cursor.is_valid() {
            return RecordOutcome::Invalid;
        }

        RecordOutcome::Valid(ExtractFooter {
            declared_record_count,
            declared_total_amount,
        })
    }

    /// Validate record-count expectations and hand back the aggregate
    fn finish(mut self) -> ParsedExtract {
        if self.extract.settlement_details.is_empty() {
            info!(
                file = %self.file_name,
                "extract file contained no settlement details"
            );
        }

        let footer_count = self.extract.footers.len();
        if footer_count != 1 {
            warn!(
                code = ResultCode::FileMissingExpectedRecord.code(),
                file = %self.file_name,
                count = footer_count,
                "expected exactly one extract footer record"
            );
            self.warnings.push(ParseWarning::file_level(
                ResultCode::FileMissingExpectedRecord,
                format!(
                    "expected exactly one extract footer record, found {}",
                    footer_count
                ),
            ));
        }

        ParsedExtract {
            extract: self.extract,
            warnings: self.warnings,
        }
    }
}
