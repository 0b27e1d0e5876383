use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reconcile First Data settlement files for the deal-redemption platform
#[derive(Parser, Debug)]
#[command(name = "settlement-engine")]
#[command(
    about = "Parse settlement acknowledgment/extract files and build PTS submissions",
    long_about = None
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse an Acknowledgment file and dry-run the reconciliation
    ParseAck {
        /// Path to the Acknowledgment file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Parse an Extract file and dry-run the reconciliation
    ParseExtract {
        /// Path to the Extract file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Build a PTS file from a CSV of outstanding redeemed deals
    BuildPts {
        /// Path to the outstanding-deals CSV
        #[arg(value_name = "DEALS_CSV")]
        deals: PathBuf,

        /// Submission date (YYYY-MM-DD); defaults to today
        #[arg(long, value_name = "DATE")]
        date: Option<NaiveDate>,

        /// Submission sequence number
        #[arg(long, default_value_t = 1, value_name = "N")]
        sequence: u32,

        /// Build the partner-variant rendition of the file
        #[arg(long)]
        partner_variant: bool,
    },
}

/// Parse command-line arguments
///
/// Exits the process with a usage message on invalid arguments,
/// as is standard for clap.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ack_command() {
        let args = CliArgs::try_parse_from(["settlement-engine", "parse-ack", "ack.txt"]).unwrap();
        assert!(matches!(args.command, Command::ParseAck { .. }));
    }

    #[test]
    fn test_build_pts_defaults() {
        let args =
            CliArgs::try_parse_from(["settlement-engine", "build-pts", "deals.csv"]).unwrap();
        match args.command {
            Command::BuildPts {
                date,
                sequence,
                partner_variant,
                ..
            } => {
                assert_eq!(date, None);
                assert_eq!(sequence, 1);
                assert!(!partner_variant);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_build_pts_with_options() {
        let args = CliArgs::try_parse_from([
            "settlement-engine",
            "build-pts",
            "deals.csv",
            "--date",
            "2014-03-17",
            "--sequence",
            "7",
            "--partner-variant",
        ])
        .unwrap();

        match args.command {
            Command::BuildPts {
                date,
                sequence,
                partner_variant,
                ..
            } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2014, 3, 17));
                assert_eq!(sequence, 7);
                assert!(partner_variant);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_argument_is_rejected() {
        assert!(CliArgs::try_parse_from(["settlement-engine", "parse-ack"]).is_err());
    }
}
