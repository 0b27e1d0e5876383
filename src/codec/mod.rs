//! Fixed-width field codec
//!
//! Primitives shared by every record layout in the system:
//!
//! - [`cursor`] - position-tracking field cursor with latched validity
//! - [`overpunch`] - legacy signed-numeric encoding for amount fields

pub mod cursor;
pub mod overpunch;

pub use cursor::FieldCursor;
pub use overpunch::{decode_amount, decode_integer, decode_overpunch, encode_overpunch};
