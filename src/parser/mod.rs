//! Inbound fixed-width file parsers
//!
//! Both parsers follow the same shape: a state machine over the lines of one
//! file, dispatching each line by its leading record-type code to a field
//! decoder built on [`crate::codec::FieldCursor`]. A bad line never aborts a
//! parse: it is reported and the parser continues, so valid data in a
//! partially corrupt file is still returned.

pub mod acknowledgment;
pub mod extract;

pub use acknowledgment::{AcknowledgmentParser, ParsedAcknowledgment};
pub use extract::{ExtractParser, ParsedExtract};

use rust_decimal::Decimal;
use tracing::warn;

use crate::codec::{self, FieldCursor};
use crate::types::ResultCode;

/// Width of the leading record-type code on every inbound line
pub(crate) const RECORD_TYPE_WIDTH: usize = 1;

/// Decode an already-extracted amount field, invalidating the cursor on failure
///
/// A `None` input means the extract itself already failed (and latched the
/// cursor), so only a decode failure logs here.
pub(crate) fn decode_amount_field(
    cursor: &mut FieldCursor<'_>,
    field_name: &str,
    raw: Option<&str>,
) -> Decimal {
    match raw.map(|value| codec::decode_amount(field_name, value)) {
        Some(Ok(amount)) => amount,
        Some(Err(error)) => {
            warn!(
                code = ResultCode::InvalidRecord.code(),
                field = field_name,
                %error,
                "numeric field failed to decode"
            );
            cursor.invalidate();
            Decimal::ZERO
        }
        None => Decimal::ZERO,
    }
}

/// Decode an already-extracted integer field, invalidating the cursor on failure
pub(crate) fn decode_integer_field(
    cursor: &mut FieldCursor<'_>,
    field_name: &str,
    raw: Option<&str>,
) -> i64 {
    match raw.map(|value| codec::decode_integer(field_name, value)) {
        Some(Ok(value)) => value,
        Some(Err(error)) => {
            warn!(
                code = ResultCode::InvalidRecord.code(),
                field = field_name,
                %error,
                "numeric field failed to decode"
            );
            cursor.invalidate();
            0
        }
        None => 0,
    }
}
