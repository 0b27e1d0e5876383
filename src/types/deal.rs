//! Redeemed-deal types feeding the outbound PTS submission
//!
//! `OutstandingRedeemedDealInfo` is the unit of work for the PTS builder: a
//! redeemed deal whose statement credit has not yet been claimed from the
//! processor. Rows deserialize straight from the platform's CSV export.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reward program context of a redeemed deal
///
/// Determines which reward pool reimburses the merchant and how the merchant
/// descriptor is rendered on the consumer's statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReimbursementTender {
    /// Reimbursed from deal currency
    DealCurrency,
    /// Reimbursed from the earn program
    Earn,
}

/// A redeemed deal awaiting PTS submission
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OutstandingRedeemedDealInfo {
    /// Processor-side merchant identifier
    pub partner_merchant_id: String,

    /// Merchant display name
    pub merchant_name: String,

    /// Reward program context
    pub reimbursement_tender: ReimbursementTender,

    /// Discount claimed as a statement credit
    pub discount_amount: Decimal,

    /// Amount the transaction settled for
    pub settlement_amount: Decimal,

    /// Card token of the redeeming transaction
    pub token: String,

    /// Identifier of the redeemed offer
    pub offer_id: String,

    /// Date the redeeming transaction occurred
    pub transaction_date: NaiveDate,

    /// Reference number keying this deal in the platform's store
    pub reference_number: String,
}

/// Value-equality grouping key for PTS merchant sections
///
/// Two instances with equal field values are the same merchant for grouping
/// purposes, regardless of identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PtsMerchantInfo {
    /// Processor-side merchant identifier
    pub partner_merchant_id: String,

    /// Merchant display name
    pub merchant_name: String,

    /// Reward program context
    pub reimbursement_tender: ReimbursementTender,
}

impl PtsMerchantInfo {
    /// The grouping key of a redeemed deal
    pub fn for_deal(deal: &OutstandingRedeemedDealInfo) -> Self {
        PtsMerchantInfo {
            partner_merchant_id: deal.partner_merchant_id.clone(),
            merchant_name: deal.merchant_name.clone(),
            reimbursement_tender: deal.reimbursement_tender,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn deal(merchant_id: &str, reference: &str) -> OutstandingRedeemedDealInfo {
        OutstandingRedeemedDealInfo {
            partner_merchant_id: merchant_id.to_string(),
            merchant_name: "Contoso Coffee".to_string(),
            reimbursement_tender: ReimbursementTender::DealCurrency,
            discount_amount: Decimal::new(500, 2),
            settlement_amount: Decimal::new(2500, 2),
            token: "4111111111111111".to_string(),
            offer_id: "77".to_string(),
            transaction_date: NaiveDate::from_ymd_opt(2014, 3, 14).unwrap(),
            reference_number: reference.to_string(),
        }
    }

    #[test]
    fn test_merchant_info_value_equality() {
        let first = PtsMerchantInfo::for_deal(&deal("M-1", "00000001"));
        let second = PtsMerchantInfo::for_deal(&deal("M-1", "00000002"));

        // Distinct deal instances, same merchant by value.
        assert_eq!(first, second);

        let mut groups: HashMap<PtsMerchantInfo, usize> = HashMap::new();
        *groups.entry(first).or_default() += 1;
        *groups.entry(second).or_default() += 1;
        assert_eq!(groups.len(), 1);
    }

    #[test]
    fn test_merchant_info_distinguishes_tender() {
        let deal_currency = PtsMerchantInfo::for_deal(&deal("M-1", "00000001"));
        let mut earn_deal = deal("M-1", "00000001");
        earn_deal.reimbursement_tender = ReimbursementTender::Earn;
        let earn = PtsMerchantInfo::for_deal(&earn_deal);

        assert_ne!(deal_currency, earn);
    }

    #[test]
    fn test_deal_deserializes_from_csv_row() {
        let csv_content = "partner_merchant_id,merchant_name,reimbursement_tender,discount_amount,settlement_amount,token,offer_id,transaction_date,reference_number\n\
            M-1,Contoso Coffee,deal_currency,5.00,25.00,4111111111111111,77,2014-03-14,00000001\n";

        let mut reader = csv::Reader::from_reader(csv_content.as_bytes());
        let deals: Vec<OutstandingRedeemedDealInfo> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .expect("row should deserialize");

        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].reimbursement_tender, ReimbursementTender::DealCurrency);
        assert_eq!(deals[0].discount_amount, Decimal::new(500, 2));
        assert_eq!(
            deals[0].transaction_date,
            NaiveDate::from_ymd_opt(2014, 3, 14).unwrap()
        );
    }
}
