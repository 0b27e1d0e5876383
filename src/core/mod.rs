//! Settlement reconciliation core
//!
//! The reconciliation engine and the file processors built on it:
//!
//! - [`traits`] - injected collaborator boundaries (store, scheduler, queue)
//! - [`reconciler`] - monotonic status advancement and integrity checks
//! - [`ack_processor`] - drives the state machine from Acknowledgment files
//! - [`extract_processor`] - drives the state machine from Extract files
//! - [`memory`] - in-memory collaborators for tests and CLI dry-runs

pub mod ack_processor;
pub mod extract_processor;
pub mod memory;
pub mod reconciler;
pub mod traits;

pub use ack_processor::{
    AckProcessingSummary, AcknowledgmentProcessor, REFERRED_REDEMPTION_DESCRIPTOR,
};
pub use extract_processor::{ExtractProcessingSummary, ExtractProcessor};
pub use memory::{InMemoryDealStatusStore, RecordingEventPublisher, RecordingRewardScheduler};
pub use reconciler::{SettlementReconciler, StatusAdvanceOutcome, REWARD_PAYOUT_DELAY};
pub use traits::{DealStatusStore, EventPublisher, RewardScheduler};
