//! Settlement Engine Library
//! # Overview
//!
//! This library reconciles credit-card settlement activity for a
//! deal-redemption platform with an external payment processor that speaks
//! flat, fixed-width text files.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (records, statuses, events, errors)
//! - [`codec`] - Fixed-width field codec:
//!   - [`codec::cursor`] - latched-validity field cursor
//!   - [`codec::overpunch`] - legacy signed-numeric encoding
//! - [`parser`] - Inbound file parsers (Acknowledgment, Extract)
//! - [`builder`] - Outbound PTS file builder (seven record encoders plus the
//!   file-level orchestrator)
//! - [`core`] - Settlement reconciliation:
//!   - [`core::reconciler`] - monotonic status advancement, integrity checks
//!   - [`core::ack_processor`] / [`core::extract_processor`] - file-driven
//!     state transitions
//! - [`cli`] - CLI argument parsing and command execution
//!
//! # File Directions
//!
//! - **Acknowledgment** (inbound): did a submitted transaction clear?
//! - **Extract** (inbound): what did the processor actually settle?
//! - **PTS** (outbound): the platform's claim for statement credits.
//!
//! # Guarantees
//!
//! Parsing never lets one corrupt record poison a file: bad records are
//! reported with numeric result codes and kept as positional placeholders
//! while the valid remainder is committed. Status updates are strictly
//! monotonic, so out-of-order or reprocessed files can never regress a
//! deal's settlement state.

// Module declarations
pub mod builder;
pub mod cli;
pub mod codec;
pub mod core;
pub mod parser;
pub mod types;

pub use builder::PtsFileBuilder;
pub use crate::core::{
    AcknowledgmentProcessor, ExtractProcessor, SettlementReconciler, REWARD_PAYOUT_DELAY,
};
pub use parser::{AcknowledgmentParser, ExtractParser};
pub use types::{
    Acknowledgment, CreditStatus, Extract, OutstandingRedeemedDealInfo, ParseWarning,
    ResultCode, RewardPayoutStatus, SettlementError,
};
