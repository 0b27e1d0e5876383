//! CLI argument parsing and command execution
//!
//! The parse commands run a *dry-run* reconciliation: the parsed file is
//! processed against an in-memory status store seeded from the file's own
//! reference numbers, so an operator can see what a real run would commit
//! without touching the platform's store.

pub mod args;

pub use args::{parse_args, CliArgs, Command};

use std::path::Path;
use std::sync::Arc;

use csv::{ReaderBuilder, Trim};

use crate::builder::PtsFileBuilder;
use crate::core::{
    AcknowledgmentProcessor, ExtractProcessor, InMemoryDealStatusStore, RecordingEventPublisher,
    RecordingRewardScheduler, SettlementReconciler, REFERRED_REDEMPTION_DESCRIPTOR,
};
use crate::parser::{AcknowledgmentParser, ExtractParser};
use crate::types::{
    CreditStatus, OutstandingRedeemedDealInfo, ParseWarning, RewardPayoutStatus, SettlementError,
    SettlementType,
};

/// Execute a parsed CLI command
///
/// # Errors
///
/// Returns an error for fatal conditions (missing file, I/O failure,
/// unbuildable amounts); recoverable parse conditions are printed as
/// warnings instead.
pub fn run(args: CliArgs) -> Result<(), SettlementError> {
    match args.command {
        Command::ParseAck { file } => run_parse_ack(&file),
        Command::ParseExtract { file } => run_parse_extract(&file),
        Command::BuildPts {
            deals,
            date,
            sequence,
            partner_variant,
        } => run_build_pts(&deals, date, sequence, partner_variant),
    }
}

/// Build a reconciler over fresh in-memory collaborators
fn dry_run_reconciler() -> (
    SettlementReconciler,
    Arc<InMemoryDealStatusStore>,
    Arc<RecordingRewardScheduler>,
    Arc<RecordingEventPublisher>,
) {
    let store = Arc::new(InMemoryDealStatusStore::new());
    let scheduler = Arc::new(RecordingRewardScheduler::new());
    let publisher = Arc::new(RecordingEventPublisher::new());
    let reconciler =
        SettlementReconciler::new(store.clone(), scheduler.clone(), publisher.clone());
    (reconciler, store, scheduler, publisher)
}

fn print_warnings(warnings: &[ParseWarning]) {
    println!("warnings: {}", warnings.len());
    for warning in warnings {
        match warning.line {
            Some(line) => println!("  [{}] line {}: {}", warning.code.code(), line, warning.message),
            None => println!("  [{}] {}", warning.code.code(), warning.message),
        }
    }
}

fn run_parse_ack(file: &Path) -> Result<(), SettlementError> {
    let parsed = AcknowledgmentParser::parse_file(file)?
        .ok_or_else(|| SettlementError::file_not_found(&file.display().to_string()))?;

    println!(
        "general records: {} ({} valid)",
        parsed.acknowledgment.general_acknowledgments.len(),
        parsed
            .acknowledgment
            .general_acknowledgments
            .iter()
            .filter(|o| o.is_valid())
            .count(),
    );
    println!(
        "detail records: {} ({} valid)",
        parsed.acknowledgment.detail_acknowledgments.len(),
        parsed.acknowledgment.valid_details().count(),
    );
    print_warnings(&parsed.warnings);

    // Seed the dry-run store as if every acknowledged deal were awaiting
    // this acknowledgment.
    let (reconciler, store, _scheduler, _publisher) = dry_run_reconciler();
    for detail in parsed.acknowledgment.valid_details() {
        if detail
            .merchant_descriptor
            .trim()
            .eq_ignore_ascii_case(REFERRED_REDEMPTION_DESCRIPTOR)
        {
            store.insert_payout(detail.reference_number.clone(), RewardPayoutStatus::Pending);
        } else {
            store.insert_credit(
                detail.reference_number.clone(),
                CreditStatus::StatementCreditRequested,
            );
        }
    }

    let processor = AcknowledgmentProcessor::new(reconciler);
    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(processor.process(&parsed))?;

    println!("submission accepted: {}", summary.submission_accepted);
    println!(
        "credits granted: {} (skipped {}, missing {})",
        summary.granted.applied.len(),
        summary.granted.skipped.len(),
        summary.granted.missing.len(),
    );
    println!(
        "deals rejected by partner: {}",
        summary.rejected.applied.len()
    );
    println!(
        "referred rewards paid: {}, rescinded: {}",
        summary.referred_paid.applied.len(),
        summary.referred_rescinded.applied.len(),
    );

    Ok(())
}

fn run_parse_extract(file: &Path) -> Result<(), SettlementError> {
    let parsed = ExtractParser::parse_file(file)?
        .ok_or_else(|| SettlementError::file_not_found(&file.display().to_string()))?;

    println!(
        "settlement details: {} ({} valid)",
        parsed.extract.settlement_details.len(),
        parsed.extract.valid_details().count(),
    );
    println!("parsed total: {}", parsed.extract.parsed_total_amount());
    print_warnings(&parsed.warnings);

    let (reconciler, store, _scheduler, publisher) = dry_run_reconciler();
    for detail in parsed.extract.valid_details() {
        match detail.settlement_type {
            SettlementType::Redemption => store.insert_credit(
                detail.reference_number.clone(),
                CreditStatus::AuthorizationReceived,
            ),
            SettlementType::Reversal => store
                .insert_payout(detail.reference_number.clone(), RewardPayoutStatus::Pending),
        }
    }

    let processor = ExtractProcessor::new(reconciler);
    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(processor.process(&parsed))?;

    println!(
        "redemptions settled: {} (skipped {}, missing {})",
        summary.settled.applied.len(),
        summary.settled.skipped.len(),
        summary.settled.missing.len(),
    );
    println!("reward payouts scheduled: {}", summary.rewards_scheduled);
    println!(
        "reward payouts rescinded: {}",
        summary.rescinded.applied.len()
    );
    println!(
        "events published: {}",
        publisher.published_events().len()
    );
    print_warnings(&summary.metadata_warnings);

    Ok(())
}

fn run_build_pts(
    deals_csv: &Path,
    date: Option<chrono::NaiveDate>,
    sequence: u32,
    partner_variant: bool,
) -> Result<(), SettlementError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(deals_csv)
        .map_err(|e| {
            if let csv::ErrorKind::Io(io) = e.kind() {
                if io.kind() == std::io::ErrorKind::NotFound {
                    return SettlementError::file_not_found(&deals_csv.display().to_string());
                }
            }
            e.into()
        })?;

    let deals: Vec<OutstandingRedeemedDealInfo> =
        reader.deserialize().collect::<Result<_, csv::Error>>()?;

    let submission_date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let builder = PtsFileBuilder::new(submission_date, sequence, partner_variant);
    let text = builder.build(&deals)?;

    print!("{}", text);
    Ok(())
}
