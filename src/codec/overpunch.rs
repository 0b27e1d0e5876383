//! Signed-overpunch numeric encoding
//!
//! The processor's mainframe packs the sign of a numeric field into its final
//! character. For a positive value the unit digit is replaced by a letter
//! from a fixed map ("overpunch"); all other characters are ordinary digits.
//! Negative values are unsupported in this domain; amounts are inherently
//! non-negative.
//!
//! Every numeric/signed field in every record layout goes through this
//! module; none are parsed ad hoc.

use crate::types::SettlementError;
use rust_decimal::Decimal;

/// Overpunch characters for a positive unit digit, in digit order 0..=9
const POSITIVE_OVERPUNCH: [char; 10] = ['{', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I'];

/// The digit encoded by an overpunch character, if it is one
fn overpunch_digit(c: char) -> Option<char> {
    POSITIVE_OVERPUNCH
        .iter()
        .position(|&candidate| candidate == c)
        .and_then(|digit| char::from_digit(digit as u32, 10))
}

/// The overpunch character for a unit digit, if the character is a digit
fn digit_overpunch(c: char) -> Option<char> {
    c.to_digit(10).map(|digit| POSITIVE_OVERPUNCH[digit as usize])
}

/// Decode a signed-overpunch field into a plain digit string
///
/// Replaces only the last character via the overpunch map. A last character
/// that is not one of the ten mapped letters (including an ordinary digit
/// 0-9) passes through unchanged.
pub fn decode_overpunch(field: &str) -> String {
    let mut chars: Vec<char> = field.chars().collect();
    if let Some(last) = chars.last_mut() {
        if let Some(digit) = overpunch_digit(*last) {
            *last = digit;
        }
    }
    chars.into_iter().collect()
}

/// Encode a plain digit string as a positive signed-overpunch field
///
/// Replaces the last character with its overpunch letter when it is a digit;
/// anything else passes through unchanged, mirroring [`decode_overpunch`].
pub fn encode_overpunch(field: &str) -> String {
    let mut chars: Vec<char> = field.chars().collect();
    if let Some(last) = chars.last_mut() {
        if let Some(encoded) = digit_overpunch(*last) {
            *last = encoded;
        }
    }
    chars.into_iter().collect()
}

/// Decode a signed-overpunch field and parse it as an integer
///
/// # Errors
///
/// Returns an error if the field is empty (after trimming) or does not parse
/// as an integer once the overpunch character is replaced.
pub fn decode_integer(field_name: &str, field: &str) -> Result<i64, SettlementError> {
    if field.trim().is_empty() {
        return Err(SettlementError::empty_numeric_field(field_name));
    }

    let decoded = decode_overpunch(field);
    decoded
        .trim()
        .parse::<i64>()
        .map_err(|_| SettlementError::invalid_numeric_field(field_name, field))
}

/// Decode a signed-overpunch amount field carrying implied cents
///
/// The wire value is the amount multiplied by 100; the result restores the
/// two decimal places.
///
/// # Errors
///
/// Same conditions as [`decode_integer`].
pub fn decode_amount(field_name: &str, field: &str) -> Result<Decimal, SettlementError> {
    let cents = decode_integer(field_name, field)?;
    Ok(Decimal::new(cents, 2))
}
