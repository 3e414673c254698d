//! Application constants for the calibration finder
//!
//! Default search parameters, archive column names and file naming
//! conventions shared by the library and the CLI.

use crate::models::CalibrationKind;

// =============================================================================
// Search Defaults
// =============================================================================

/// Days to search on each side of the anchor date
pub const DEFAULT_DAYS_TO_CHECK: i64 = 7;

/// Largest accepted search width, ten years on each side of the anchor
pub const MAX_DAYS_TO_CHECK: i64 = 3653;

/// Maximum accepted separation between a catalog star and a pointing
pub const DEFAULT_TOLERANCE_ARCSEC: f64 = 5.0;

/// Neighbour-date fetches kept in flight (1 = strictly sequential)
pub const DEFAULT_PREFETCH: usize = 1;

/// Minimum frame counts per calibration kind, in report order
pub const DEFAULT_REQUIREMENTS: &[(CalibrationKind, u32)] = &[
    (CalibrationKind::Bias, 7),
    (CalibrationKind::DomeFlat, 3),
    (CalibrationKind::TwilightFlat, 1),
    (CalibrationKind::LampFlat, 6),
    (CalibrationKind::ArcLamp, 1),
    (CalibrationKind::ContinuumBars, 1),
    (CalibrationKind::Dark, 3),
];

// =============================================================================
// Archive Metadata
// =============================================================================

/// Instrument whose archive metadata is searched
pub const INSTRUMENT: &str = "kcwi";

/// Date format used by the archive and in file names
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Columns read from archive metadata tables
pub mod columns {
    pub const IMAGE_TYPE: &str = "koaimtyp";
    pub const ID: &str = "koaid";
    pub const RA: &str = "ra";
    pub const DEC: &str = "dec";
}

/// Metadata table file name for one night, as written by the archive client
pub fn metadata_file_name(date: &chrono::NaiveDate) -> String {
    format!("koa_metadata_{}.tbl", date.format(DATE_FORMAT))
}

// =============================================================================
// Catalog and Report Output
// =============================================================================

/// Reference catalog compiled into the binary
pub const BUILTIN_CATALOG: &str = include_str!("../data/standard_stars.csv");

/// Name used for the built-in catalog in log and error messages
pub const BUILTIN_CATALOG_NAME: &str = "<builtin standard_stars.csv>";

/// Location of the user configuration file below the platform config directory
pub const CONFIG_DIR_NAME: &str = "calib-finder";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Summary artifact name for an anchor date and total search width in days
pub fn summary_file_name(date: &chrono::NaiveDate, days_to_check: i64) -> String {
    format!(
        "summary_{}_with_{}_days.txt",
        date.format(DATE_FORMAT),
        days_to_check.saturating_mul(2)
    )
}

pub const ARCSEC_PER_DEGREE: f64 = 3600.0;
pub const DEGREES_PER_HOUR: f64 = 15.0;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2020, 5, 20).unwrap();
        assert_eq!(metadata_file_name(&date), "koa_metadata_2020-05-20.tbl");
        assert_eq!(
            summary_file_name(&date, 7),
            "summary_2020-05-20_with_14_days.txt"
        );
        assert_eq!(
            summary_file_name(&date, i64::MAX),
            format!("summary_2020-05-20_with_{}_days.txt", i64::MAX)
        );
    }

    #[test]
    fn test_default_requirements_cover_every_kind_once() {
        assert_eq!(DEFAULT_REQUIREMENTS.len(), CalibrationKind::ALL.len());
        for kind in CalibrationKind::ALL {
            assert_eq!(
                DEFAULT_REQUIREMENTS.iter().filter(|(k, _)| *k == kind).count(),
                1
            );
        }
    }
}
