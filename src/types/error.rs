//! Error and reporting types for the settlement engine
//!
//! This module defines the error type used across parsing, building, and
//! reconciliation, plus the numeric result codes attached to every reported
//! condition.
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **Record Decode Errors**: Empty or malformed numeric fields
//! - **Build Errors**: Amounts that cannot be rendered into a fixed slot
//! - **Downstream Errors**: Store, scheduler, or queue failures
//!
//! Per-record field mismatches are deliberately *not* errors: the parsers
//! report them with a [`ResultCode`], mark the record invalid, and continue.

use thiserror::Error;

/// Main error type for the settlement engine
///
/// Represents the fatal failures of an operation. Recoverable per-record
/// conditions are reported as [`ParseWarning`]s instead so that valid data
/// in a partially-bad file is still committed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettlementError {
    /// File not found at the specified path
    ///
    /// Fatal for the file being processed, non-fatal for the caller's batch.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error while loading outstanding redeemed deals
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// A numeric field was empty where a value is required
    #[error("Empty numeric field '{field}'")]
    EmptyNumericField {
        /// Name of the offending field
        field: String,
    },

    /// A numeric field did not parse as an integer after overpunch decoding
    #[error("Invalid numeric field '{field}': '{value}'")]
    InvalidNumericField {
        /// Name of the offending field
        field: String,
        /// The raw value that failed to parse
        value: String,
    },

    /// An amount could not be rendered into its fixed-width slot
    ///
    /// Amounts in this domain are non-negative; a negative or
    /// out-of-range value is rejected rather than silently mangled.
    #[error("Invalid amount '{value}' for field '{field}'")]
    InvalidAmount {
        /// Name of the offending field
        field: String,
        /// The rejected value
        value: String,
    },

    /// A downstream collaborator (store, scheduler, queue) failed
    ///
    /// Propagated to the caller; the engine performs no internal retries.
    #[error("Downstream failure in {operation}: {message}")]
    Downstream {
        /// The collaborator operation that failed
        operation: String,
        /// Description of the failure
        message: String,
    },
}

impl From<std::io::Error> for SettlementError {
    fn from(error: std::io::Error) -> Self {
        SettlementError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for SettlementError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        SettlementError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl SettlementError {
    /// Create a FileNotFound error
    pub fn file_not_found(path: &str) -> Self {
        SettlementError::FileNotFound {
            path: path.to_string(),
        }
    }

    /// Create an EmptyNumericField error
    pub fn empty_numeric_field(field: &str) -> Self {
        SettlementError::EmptyNumericField {
            field: field.to_string(),
        }
    }

    /// Create an InvalidNumericField error
    pub fn invalid_numeric_field(field: &str, value: &str) -> Self {
        SettlementError::InvalidNumericField {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(field: &str, value: &str) -> Self {
        SettlementError::InvalidAmount {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a Downstream error
    pub fn downstream(operation: &str, message: &str) -> Self {
        SettlementError::Downstream {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }
}

/// Numeric result codes attached to every reported condition
///
/// Malformed input never silently produces a wrong financial result: each
/// reportable condition carries one of these codes, both in the structured
/// log entry and in the [`ParseWarning`] handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// Input file absent; no result produced for this file
    FileNotFound = 2001,
    /// A line ended before the field being read
    UnexpectedEndOfRecord = 2002,
    /// A record failed field validation and was kept as an invalid placeholder
    InvalidRecord = 2003,
    /// The file did not contain exactly one of an expected record type
    FileMissingExpectedRecord = 2004,
    /// The general acknowledgment reported the whole submission as rejected
    SubmissionRejected = 2101,
    /// A detail acknowledgment reported a single redemption as rejected
    RedeemedDealRejectedByPartner = 2102,
    /// A credit-status update targeted an earlier status than the stored one
    CreditStatusTooAdvanced = 2201,
    /// A payout-status update targeted an earlier status than the stored one
    PayoutStatusTooAdvanced = 2202,
    /// Parsed record count disagreed with the footer's declared count
    RecordCountMismatch = 2301,
    /// Parsed total amount disagreed with the footer's declared total
    TotalAmountMismatch = 2302,
}

impl ResultCode {
    /// The numeric code emitted in structured log entries
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// A reported, recoverable condition encountered while processing a file
///
/// Warnings preserve what was logged so callers (and tests) can inspect the
/// outcome of a parse without capturing log output.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseWarning {
    /// The numeric result code of the condition
    pub code: ResultCode,
    /// The 1-based line number, when the condition is tied to a line
    pub line: Option<u64>,
    /// Human-readable description
    pub message: String,
}

impl ParseWarning {
    /// Create a warning tied to a specific line
    pub fn at_line(code: ResultCode, line: u64, message: impl Into<String>) -> Self {
        ParseWarning {
            code,
            line: Some(line),
            message: message.into(),
        }
    }

    /// Create a file-level warning
    pub fn file_level(code: ResultCode, message: impl Into<String>) -> Self {
        ParseWarning {
            code,
            line: None,
            message: message.into(),
        }
    }
}
