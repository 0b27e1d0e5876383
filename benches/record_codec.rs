//! Benchmark suite for the fixed-width record codec
//!
//! Measures the hot paths of a settlement batch: overpunch decoding,
//! Acknowledgment file parsing, and PTS file building.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;

use settlement_engine::builder::PtsFileBuilder;
use settlement_engine::codec;
use settlement_engine::parser::AcknowledgmentParser;
use settlement_engine::types::{OutstandingRedeemedDealInfo, ReimbursementTender};

fn main() {
    divan::main();
}

/// Build an in-memory Acknowledgment file with one general record and
/// `details` detail records
fn acknowledgment_file(details: usize) -> String {
    let mut lines = vec![format!(
        "B{sales:0>9}{credit:0>9}{cash:0>9}  98     {seq:0>6}{submission:0>9}        {auth:0>9}{cash_auth:0>9}N ",
        sales = "00000000{",
        credit = "0000125E",
        cash = "00000000{",
        seq = "1",
        submission = "42",
        auth = "00000000{",
        cash_auth = "00000000{",
    )];

    for index in 0..details {
        lines.push(format!(
            "A{token:<16}6{amount:0>8}0314A1B2C30315   8{reference:0>8}{seq:0>6}{descriptor:<21}T",
            token = "4111222233334444",
            amount = "0000125E",
            reference = index,
            seq = index + 2,
            descriptor = "BING OFFERS-CONTOSO",
        ));
    }

    lines.join("\n")
}

/// Build `count` outstanding deals spread over a handful of merchants
fn outstanding_deals(count: usize) -> Vec<OutstandingRedeemedDealInfo> {
    (0..count)
        .map(|index| OutstandingRedeemedDealInfo {
            partner_merchant_id: format!("M-{}", index % 5),
            merchant_name: format!("Merchant {}", index % 5),
            reimbursement_tender: ReimbursementTender::DealCurrency,
            discount_amount: Decimal::new(500 + index as i64, 2),
            settlement_amount: Decimal::new(2500, 2),
            token: "4111222233334444".to_string(),
            offer_id: format!("{}", index),
            transaction_date: NaiveDate::from_ymd_opt(2014, 3, 14).unwrap(),
            reference_number: format!("{:0>8}", index),
        })
        .collect()
}

#[divan::bench]
fn decode_overpunch_amount() -> Decimal {
    codec::decode_amount("transaction amount", divan::black_box("0000125E")).unwrap()
}

#[divan::bench]
fn encode_overpunch_amount() -> String {
    codec::encode_overpunch(divan::black_box("00001255"))
}

#[divan::bench(args = [100, 1000])]
fn parse_acknowledgment_file(bencher: divan::Bencher, details: usize) {
    let content = acknowledgment_file(details);

    bencher.bench(|| {
        AcknowledgmentParser::new("bench.txt")
            .parse(divan::black_box(content.as_bytes()))
            .expect("bench parse failed")
    });
}

#[divan::bench(args = [100, 1000])]
fn build_pts_file(bencher: divan::Bencher, deals: usize) {
    let deals = outstanding_deals(deals);
    let builder = PtsFileBuilder::new(NaiveDate::from_ymd_opt(2014, 3, 17).unwrap(), 1, false);

    bencher.bench(|| builder.build(divan::black_box(&deals)).expect("bench build failed"));
}
