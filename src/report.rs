//! Search reports.
//!
//! Turns a finished search into a per-kind summary, the standard-star
//! outcome, an overall status and the log of nights inspected. The same
//! report renders as plain text (printed and persisted as the summary
//! artifact) or as JSON. Rendering is deterministic: identical searches
//! produce byte-identical reports.

use crate::constants::summary_file_name;
use crate::error::Result;
use crate::models::CalibrationKind;
use crate::search::{DateVisit, InventoryStatus, SearchOutcome, SearchStatus, StandardStarMatch};
use crate::tracker::FrameRef;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Frames found for one calibration kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindSummary {
    pub kind: CalibrationKind,
    pub required: u32,
    pub remaining: u32,
    pub frames: Vec<FrameRef>,
}

/// Calibration kind still short at the end of the search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub kind: CalibrationKind,
    pub missing: u32,
}

/// Overall result of the search
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Satisfied,
    Partial {
        shortfalls: Vec<Shortfall>,
        star_missing: bool,
    },
    NoData,
}

/// Structured summary of a finished search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub anchor: NaiveDate,
    pub days_to_check: i64,
    pub tolerance_arcsec: f64,
    pub outcome: ReportOutcome,
    pub calibrations: Vec<KindSummary>,
    pub standard_star: Option<StandardStarMatch>,
    pub dates_inspected: Vec<DateVisit>,
}

impl SearchReport {
    pub fn from_outcome(outcome: &SearchOutcome) -> Self {
        let state = &outcome.state;

        let calibrations: Vec<KindSummary> = state
            .tracker()
            .states()
            .iter()
            .map(|s| KindSummary {
                kind: s.kind,
                required: s.required,
                remaining: s.remaining,
                frames: s.satisfied_by.clone(),
            })
            .collect();

        let report_outcome = match outcome.status {
            SearchStatus::NoData => ReportOutcome::NoData,
            SearchStatus::Satisfied => ReportOutcome::Satisfied,
            SearchStatus::Exhausted | SearchStatus::Searching => ReportOutcome::Partial {
                shortfalls: state
                    .tracker()
                    .shortfalls()
                    .into_iter()
                    .map(|(kind, missing)| Shortfall { kind, missing })
                    .collect(),
                star_missing: state.star().is_none(),
            },
        };

        Self {
            anchor: state.anchor(),
            days_to_check: outcome.days_to_check,
            tolerance_arcsec: outcome.tolerance_arcsec,
            outcome: report_outcome,
            calibrations,
            standard_star: state.star().cloned(),
            dates_inspected: state.visits().to_vec(),
        }
    }

    /// Multi-line plain text report
    pub fn render_text(&self) -> String {
        self.to_string()
    }

    /// Pretty-printed JSON report
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Summary artifact file name for this search
    pub fn artifact_name(&self) -> String {
        summary_file_name(&self.anchor, self.days_to_check)
    }

    /// Write the text report into `dir`, returning the artifact path
    pub fn write_artifact(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.artifact_name());
        fs::write(&path, self.render_text())?;
        info!("Summary file saved to: {}", path.display());
        Ok(path)
    }

    /// Every accepted calibration frame followed by the standard star, without repeats
    pub fn download_list(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.calibrations
            .iter()
            .flat_map(|summary| summary.frames.iter().map(|frame| frame.id.as_str()))
            .chain(self.standard_star.iter().map(|star| star.observation_id.as_str()))
            .filter(|id| seen.insert(*id))
            .map(str::to_string)
            .collect()
    }

    /// Write the download list, one identifier per line
    pub fn write_download_list(&self, path: &Path) -> Result<usize> {
        let ids = self.download_list();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut contents = ids.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        fs::write(path, contents)?;
        Ok(ids.len())
    }

    pub fn is_satisfied(&self) -> bool {
        self.outcome == ReportOutcome::Satisfied
    }

    fn day_offset(&self, date: NaiveDate) -> i64 {
        (date - self.anchor).num_days()
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count.abs() == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Calibration search for {} (+/- {}, tolerance {}\")",
            self.anchor,
            plural(self.days_to_check, "day"),
            self.tolerance_arcsec
        )?;

        writeln!(f)?;
        writeln!(f, "Calibrations:")?;
        for summary in &self.calibrations {
            if summary.frames.is_empty() {
                let needed = match summary.required {
                    0 => "none required".to_string(),
                    n => format!("{} required", n),
                };
                writeln!(f, "  {}: none found ({})", summary.kind, needed)?;
                continue;
            }

            writeln!(
                f,
                "  {}: {} of {} frames found",
                summary.kind,
                summary.frames.len(),
                summary.required
            )?;
            for frame in &summary.frames {
                writeln!(f, "    - {}: {}", frame.date, frame.id)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Standard star:")?;
        match &self.standard_star {
            Some(star) if star.on_anchor_date => writeln!(
                f,
                "  {} found on the anchor date {}, file: {} ({:.2}\")",
                star.star_name, star.date, star.observation_id, star.separation_arcsec
            )?,
            Some(star) => {
                let offset = self.day_offset(star.date);
                writeln!(
                    f,
                    "  {} found on neighbouring date {} ({}{}), file: {} ({:.2}\")",
                    star.star_name,
                    star.date,
                    if offset > 0 { "+" } else { "" },
                    plural(offset, "day"),
                    star.observation_id,
                    star.separation_arcsec
                )?
            }
            None => writeln!(f, "  none found in the checked range of dates")?,
        }

        writeln!(f)?;
        match &self.outcome {
            ReportOutcome::Satisfied => writeln!(
                f,
                "Status: fully satisfied, all required calibrations and a standard star were found"
            )?,
            ReportOutcome::NoData => {
                writeln!(f, "Status: no data, the archive has no entries for {}", self.anchor)?
            }
            ReportOutcome::Partial {
                shortfalls,
                star_missing,
            } => {
                writeln!(f, "Status: partially satisfied, still missing:")?;
                for shortfall in shortfalls {
                    writeln!(f, "  - {}: {} more needed", shortfall.kind, shortfall.missing)?;
                }
                if *star_missing {
                    writeln!(f, "  - standard star: not found")?;
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "Dates inspected:")?;
        for visit in &self.dates_inspected {
            match &visit.status {
                InventoryStatus::Available { records } => {
                    writeln!(f, "  {}: {}", visit.date, plural(*records as i64, "record"))?
                }
                InventoryStatus::Unavailable { reason } => {
                    writeln!(f, "  {}: unavailable ({})", visit.date, reason)?
                }
            }
        }

        Ok(())
    }
}
