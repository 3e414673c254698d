//! Command-line argument definitions
//!
//! One command: search the archive around an observation date. Flags
//! override whatever the configuration file sets.

use crate::config::SearchOrder;
use crate::error::{CalibError, Result};
use crate::models::{CalibrationKind, parse_date};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "calib-finder",
    about = "Find KCWI calibration frames and a standard star around an observation date",
    long_about = "Starting from the observation date, inspects archive metadata for the night \
                  and then for neighbouring nights, nearest first, until every required \
                  calibration kind has its minimum number of frames and a standard star \
                  from the catalog has been observed.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Args {
    /// Observation date (YYYY-MM-DD)
    #[arg(value_name = "DATE", value_parser = parse_date)]
    pub date: NaiveDate,

    /// Nights to search on each side of the observation date
    #[arg(short = 'd', long = "days", value_name = "N")]
    pub days: Option<i64>,

    /// Standard-star match radius in arcseconds
    #[arg(short = 't', long = "tolerance", value_name = "ARCSEC")]
    pub tolerance: Option<f64>,

    /// Directory holding koa_metadata_<date>.tbl files
    #[arg(long = "metadata-dir", value_name = "PATH", default_value = ".")]
    pub metadata_dir: PathBuf,

    /// Standard-star catalog CSV (name, RA, DEC); the built-in catalog when omitted
    #[arg(long = "catalog", value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Write the text summary to the output directory
    #[arg(short = 's', long = "summary")]
    pub summary: bool,

    /// Directory for the summary file
    #[arg(short = 'o', long = "output-dir", value_name = "PATH", default_value = ".")]
    pub output_dir: PathBuf,

    /// Report format on stdout
    #[arg(short = 'f', long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the identifiers of every selected frame to this file
    #[arg(long = "download-list", value_name = "PATH")]
    pub download_list: Option<PathBuf>,

    /// Which neighbour of each pair is inspected first
    #[arg(long = "order", value_enum, value_name = "ORDER")]
    pub order: Option<SearchOrder>,

    /// Neighbour nights fetched ahead of the one being applied
    #[arg(long = "prefetch", value_name = "N")]
    pub prefetch: Option<usize>,

    /// Minimum bias frames
    #[arg(long = "bias", value_name = "N")]
    pub bias: Option<u32>,

    /// Minimum dark frames
    #[arg(long = "dark", value_name = "N")]
    pub dark: Option<u32>,

    /// Minimum dome flats
    #[arg(long = "domeflat", value_name = "N")]
    pub domeflat: Option<u32>,

    /// Minimum twilight flats
    #[arg(long = "twiflat", value_name = "N")]
    pub twiflat: Option<u32>,

    /// Minimum internal lamp flats
    #[arg(long = "flatlamp", value_name = "N")]
    pub flatlamp: Option<u32>,

    /// Minimum arc lamp frames
    #[arg(long = "arclamp", value_name = "N")]
    pub arclamp: Option<u32>,

    /// Minimum continuum bars frames
    #[arg(long = "contbars", value_name = "N")]
    pub contbars: Option<u32>,

    /// Logging verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Report format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON for scripting
    Json,
}

impl Args {
    /// Check paths given on the command line before any work starts
    pub fn validate(&self) -> Result<()> {
        if !self.metadata_dir.is_dir() {
            return Err(CalibError::configuration(format!(
                "Metadata directory does not exist: {}",
                self.metadata_dir.display()
            )));
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(CalibError::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if let Some(catalog) = &self.catalog {
            if !catalog.is_file() {
                return Err(CalibError::catalog(catalog, "file not found"));
            }
        }

        Ok(())
    }

    /// Per-kind minimum frame counts given on the command line
    pub fn requirement_overrides(&self) -> Vec<(CalibrationKind, u32)> {
        [
            (CalibrationKind::Bias, self.bias),
            (CalibrationKind::Dark, self.dark),
            (CalibrationKind::DomeFlat, self.domeflat),
            (CalibrationKind::TwilightFlat, self.twiflat),
            (CalibrationKind::LampFlat, self.flatlamp),
            (CalibrationKind::ArcLamp, self.arclamp),
            (CalibrationKind::ContinuumBars, self.contbars),
        ]
        .into_iter()
        .filter_map(|(kind, count)| count.map(|count| (kind, count)))
        .collect()
    }

    /// Determine the log level from the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Progress is shown for text output unless quiet
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("calib-finder").chain(args.iter().copied()))
    }

    #[test]
    fn test_date_is_required_and_parsed() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["20-05-2020"]).is_err());

        let args = parse(&["2020-05-20"]).unwrap();
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2020, 5, 20).unwrap());
        assert_eq!(args.format, OutputFormat::Text);
        assert!(args.days.is_none());
        assert!(!args.summary);
    }

    #[test]
    fn test_search_flags() {
        let args = parse(&[
            "2020-05-20",
            "--days",
            "3",
            "--tolerance",
            "2.5",
            "--order",
            "future-first",
            "--prefetch",
            "4",
            "--format",
            "json",
            "--summary",
        ])
        .unwrap();

        assert_eq!(args.days, Some(3));
        assert_eq!(args.tolerance, Some(2.5));
        assert_eq!(args.order, Some(SearchOrder::FutureFirst));
        assert_eq!(args.prefetch, Some(4));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.summary);
        assert!(!args.show_progress());
    }

    #[test]
    fn test_requirement_overrides_keep_only_given_kinds() {
        let args = parse(&["2020-05-20", "--bias", "10", "--twiflat", "0"]).unwrap();
        assert_eq!(
            args.requirement_overrides(),
            vec![
                (CalibrationKind::Bias, 10),
                (CalibrationKind::TwilightFlat, 0)
            ]
        );
    }

    #[test]
    fn test_log_level() {
        let mut args = parse(&["2020-05-20"]).unwrap();
        assert_eq!(args.get_log_level(), "warn");

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");

        args.verbose = 2;
        assert_eq!(args.get_log_level(), "debug");

        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
        assert!(!args.show_progress());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(parse(&["2020-05-20", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_validate_paths() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();

        let args = parse(&["2020-05-20", "--metadata-dir", dir]).unwrap();
        assert!(args.validate().is_ok());

        let missing = temp_dir.path().join("missing");
        let args = parse(&["2020-05-20", "--metadata-dir", missing.to_str().unwrap()]).unwrap();
        assert!(matches!(
            args.validate(),
            Err(CalibError::Configuration { .. })
        ));

        let args = parse(&[
            "2020-05-20",
            "--metadata-dir",
            dir,
            "--catalog",
            missing.to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(
            args.validate(),
            Err(CalibError::CatalogUnavailable { .. })
        ));
    }
}
