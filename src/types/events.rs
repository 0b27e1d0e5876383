//! Payloads handed to the downstream scheduler and queue publisher

use crate::types::extract::SettlementType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payload for a delayed reward-payout job
///
/// Scheduled when a redemption settles; the delay gives a later-arriving
/// reversal a window to rescind the payout before it becomes payable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardPayoutPayload {
    /// Consumer who earned the reward
    pub consumer_id: String,

    /// Settled transaction the reward is tied to
    pub transaction_id: String,

    /// Reference number of the redeemed deal
    pub reference_number: String,

    /// Settled amount the reward is computed from
    pub settlement_amount: Decimal,
}

/// Queue message published for each settled transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettledTransactionEvent {
    /// Consumer on the settled transaction
    pub consumer_id: String,

    /// Settled transaction identifier
    pub transaction_id: String,

    /// Reference number of the redeemed deal
    pub reference_number: String,

    /// Redemption or reversal
    pub settlement_type: SettlementType,

    /// Settled amount
    pub settlement_amount: Decimal,
}
