//! Latched-validity field cursor over a fixed-width record line
//!
//! The cursor is the primitive both file parsers are built on. Its contract
//! is deliberately strict: every operation advances the position by the
//! declared field width *whether or not the field was valid*, and failures
//! are OR-ed into a latched validity flag instead of short-circuiting. A
//! mismatched literal early in a record therefore never shifts the offsets
//! of the fields after it. This offset preservation is load-bearing for
//! recovering the valid tail of a partially corrupt record.

use tracing::warn;

use crate::types::ResultCode;

/// Cursor over one record line with position tracking and latched validity
#[derive(Debug)]
pub struct FieldCursor<'a> {
    line: &'a str,
    file_name: &'a str,
    line_number: u64,
    position: usize,
    valid: bool,
}

impl<'a> FieldCursor<'a> {
    /// Create a cursor at the start of a line
    ///
    /// # Arguments
    ///
    /// * `line` - The record line, without its trailing delimiter
    /// * `line_number` - 1-based line number, for log context
    /// * `file_name` - Name of the file being parsed, for log context
    pub fn new(line: &'a str, line_number: u64, file_name: &'a str) -> Self {
        FieldCursor {
            line,
            file_name,
            line_number,
            position: 0,
            valid: true,
        }
    }

    /// Verify that the next field equals an expected literal
    ///
    /// Extracts `expected.len()` characters at the current position and
    /// compares them to `expected`. A mismatch (or a line too short to hold
    /// the field) logs a structured warning and latches the cursor invalid.
    /// The position advances by the field width regardless of the outcome.
    pub fn verify_literal(&mut self, field_name: &str, expected: &str) {
        let width = expected.len();
        let actual = self.line.get(self.position..self.position + width);

        match actual {
            Some(actual) if actual == expected => {}
            Some(actual) => {
                warn!(
                    code = ResultCode::InvalidRecord.code(),
                    field = field_name,
                    expected,
                    actual,
                    line = self.line_number,
                    file = self.file_name,
                    "record field did not match expected literal"
                );
                self.valid = false;
            }
            None => {
                self.warn_end_of_record(field_name);
                self.valid = false;
            }
        }

        self.position += width;
    }

    /// Extract the next field of the given width
    ///
    /// Returns the field slice, or `None` when the line is too short to
    /// contain it (logged as an unexpected end of record). The position
    /// advances by `width` and validity latches on failure, exactly as with
    /// [`verify_literal`].
    pub fn extract_field(&mut self, field_name: &str, width: usize) -> Option<&'a str> {
        let value = self.line.get(self.position..self.position + width);

        if value.is_none() {
            self.warn_end_of_record(field_name);
            self.valid = false;
        }

        self.position += width;
        value
    }

    /// Mark the record invalid from outside the cursor
    ///
    /// Used by parsers when a field extracted successfully but failed a
    /// decode step (e.g. a numeric field that does not parse).
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Whether every operation so far succeeded
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Current position within the line
    pub fn position(&self) -> usize {
        self.position
    }

    fn warn_end_of_record(&self, field_name: &str) {
        warn!(
            code = ResultCode::UnexpectedEndOfRecord.code(),
            field = field_name,
            line = self.line_number,
            file = self.file_name,
            "unexpected end of record"
        );
    }
}
