//! Configuration management and validation.
//!
//! Provides the search configuration (search width, match tolerance,
//! per-kind minimum frame counts, day ordering) with defaults, builder
//! methods, TOML loading and validation rules.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_DAYS_TO_CHECK, DEFAULT_PREFETCH,
    DEFAULT_REQUIREMENTS, DEFAULT_TOLERANCE_ARCSEC, MAX_DAYS_TO_CHECK,
};
use crate::error::{CalibError, Result};
use crate::models::CalibrationKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Minimum number of frames needed for one calibration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub kind: CalibrationKind,
    pub min_frames: u32,
}

impl Requirement {
    pub fn new(kind: CalibrationKind, min_frames: u32) -> Self {
        Self { kind, min_frames }
    }
}

/// Order in which the two dates at each offset are visited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SearchOrder {
    /// `anchor - offset` before `anchor + offset`
    #[default]
    PastFirst,
    /// `anchor + offset` before `anchor - offset`
    FutureFirst,
}

/// Configuration for one calibration search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Days to search on each side of the anchor date
    pub days_to_check: i64,

    /// Maximum accepted star separation in arcseconds (inclusive)
    pub tolerance_arcsec: f64,

    /// Required kinds in declaration order; reports follow this order
    pub requirements: Vec<Requirement>,

    /// Which side of the anchor is visited first at each offset
    pub search_order: SearchOrder,

    /// Neighbour-date fetches kept in flight; results are still applied in order
    pub prefetch: usize,

    /// Write the text summary to the output directory
    pub emit_summary_artifact: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            days_to_check: DEFAULT_DAYS_TO_CHECK,
            tolerance_arcsec: DEFAULT_TOLERANCE_ARCSEC,
            requirements: DEFAULT_REQUIREMENTS
                .iter()
                .map(|&(kind, min_frames)| Requirement::new(kind, min_frames))
                .collect(),
            search_order: SearchOrder::default(),
            prefetch: DEFAULT_PREFETCH,
            emit_summary_artifact: false,
        }
    }
}

impl SearchConfig {
    /// Set the number of days searched on each side of the anchor
    pub fn with_days_to_check(mut self, days: i64) -> Self {
        self.days_to_check = days;
        self
    }

    /// Set the star match tolerance
    pub fn with_tolerance_arcsec(mut self, tolerance: f64) -> Self {
        self.tolerance_arcsec = tolerance;
        self
    }

    /// Set the minimum frame count for a kind, appending it if not yet declared
    pub fn with_requirement(mut self, kind: CalibrationKind, min_frames: u32) -> Self {
        match self.requirements.iter_mut().find(|r| r.kind == kind) {
            Some(existing) => existing.min_frames = min_frames,
            None => self.requirements.push(Requirement::new(kind, min_frames)),
        }
        self
    }

    /// Replace the full requirement list
    pub fn with_requirements(mut self, requirements: Vec<Requirement>) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_search_order(mut self, order: SearchOrder) -> Self {
        self.search_order = order;
        self
    }

    pub fn with_prefetch(mut self, prefetch: usize) -> Self {
        self.prefetch = prefetch;
        self
    }

    /// Enable writing the summary artifact
    pub fn with_summary_artifact(mut self) -> Self {
        self.emit_summary_artifact = true;
        self
    }

    /// Minimum frame count configured for a kind
    pub fn min_frames(&self, kind: CalibrationKind) -> Option<u32> {
        self.requirements
            .iter()
            .find(|r| r.kind == kind)
            .map(|r| r.min_frames)
    }

    /// Parse a configuration from TOML; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: SearchConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CalibError::configuration(format!(
                "Cannot read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Per-user configuration file location, if the platform has a config directory
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Reject settings that make the search meaningless
    pub fn validate(&self) -> Result<()> {
        if self.days_to_check < 0 {
            return Err(CalibError::configuration(format!(
                "days_to_check must be non-negative, got {}",
                self.days_to_check
            )));
        }

        if self.days_to_check > MAX_DAYS_TO_CHECK {
            return Err(CalibError::configuration(format!(
                "days_to_check must be at most {}, got {}",
                MAX_DAYS_TO_CHECK, self.days_to_check
            )));
        }

        if !self.tolerance_arcsec.is_finite() || self.tolerance_arcsec < 0.0 {
            return Err(CalibError::configuration(format!(
                "tolerance_arcsec must be a non-negative number, got {}",
                self.tolerance_arcsec
            )));
        }

        if self.prefetch == 0 {
            return Err(CalibError::configuration("prefetch must be at least 1"));
        }

        let mut seen = HashSet::new();
        for requirement in &self.requirements {
            if !seen.insert(requirement.kind) {
                return Err(CalibError::configuration(format!(
                    "Calibration kind {} is declared more than once",
                    requirement.kind
                )));
            }
        }

        Ok(())
    }
}
