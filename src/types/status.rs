//! Ordinal settlement lifecycle statuses
//!
//! Settlement files can arrive out of order or be reprocessed, so both
//! lifecycles here are strictly forward-moving: a later file may never move a
//! deal or reward *backwards*. The reconciliation engine compares statuses by
//! ordinal position (declaration order) and refuses regressions.

use serde::{Deserialize, Serialize};

/// Lifecycle of a redeemed deal's settlement credit
///
/// Declaration order is the ordinal order used by the monotonicity guard:
/// an update may only move a deal to a status that compares greater than or
/// equal to the stored one.
///
/// `RejectedByPartner` deliberately orders *below* `CreditGranted`: once a
/// credit has been granted, a stale rejection replayed from an old file must
/// not regress it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CreditStatus {
    /// The card authorization for the redeemed deal has been seen
    AuthorizationReceived,

    /// The processor's extract reported the transaction as settled
    ClearingReceived,

    /// The deal was included in an outbound PTS submission
    StatementCreditRequested,

    /// The processor acknowledged the submission but rejected this deal
    RejectedByPartner,

    /// The processor granted the statement credit
    CreditGranted,
}

/// Lifecycle of a referral/redemption reward payout
///
/// Same monotonicity contract as [`CreditStatus`]: declaration order is
/// ordinal order, and updates never move backwards. A rescinded payout stays
/// rescindable into `Paid` only by a genuinely later signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RewardPayoutStatus {
    /// Payout scheduled but not yet payable
    Pending,

    /// Payout cancelled by a reversal before becoming payable
    Rescinded,

    /// Payout issued
    Paid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_status_ordering_is_monotonic() {
        assert!(CreditStatus::AuthorizationReceived < CreditStatus::ClearingReceived);
        assert!(CreditStatus::ClearingReceived < CreditStatus::StatementCreditRequested);
        assert!(CreditStatus::StatementCreditRequested < CreditStatus::RejectedByPartner);
        assert!(CreditStatus::RejectedByPartner < CreditStatus::CreditGranted);
    }

    #[test]
    fn test_rejection_does_not_outrank_granted_credit() {
        // A replayed rejection must compare below an already-granted credit.
        assert!(CreditStatus::RejectedByPartner < CreditStatus::CreditGranted);
    }

    #[test]
    fn test_reward_payout_status_ordering() {
        assert!(RewardPayoutStatus::Pending < RewardPayoutStatus::Rescinded);
        assert!(RewardPayoutStatus::Rescinded < RewardPayoutStatus::Paid);
    }
}
