//! Core data types for the settlement engine

pub mod acknowledgment;
pub mod deal;
pub mod error;
pub mod events;
pub mod extract;
pub mod status;

pub use acknowledgment::{
    Acknowledgment, DetailAcknowledgment, GeneralAcknowledgment, RecordOutcome,
};
pub use deal::{OutstandingRedeemedDealInfo, PtsMerchantInfo, ReimbursementTender};
pub use error::{ParseWarning, ResultCode, SettlementError};
pub use events::{RewardPayoutPayload, SettledTransactionEvent};
pub use extract::{Extract, ExtractFooter, SettlementDetail, SettlementType};
pub use status::{CreditStatus, RewardPayoutStatus};
