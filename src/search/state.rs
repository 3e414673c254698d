//! Search state aggregate.
//!
//! Everything the report needs is owned here: the completeness tracker,
//! the first standard-star match and the log of nights inspected. The
//! state only changes through [`SearchState::apply_date`].

use crate::config::Requirement;
use crate::error::Result;
use crate::matcher::StarMatcher;
use crate::models::ObservationRecord;
use crate::tracker::{Acceptance, CompletenessTracker};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

/// First standard star found by the search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandardStarMatch {
    pub date: NaiveDate,
    pub star_name: String,
    pub observation_id: String,
    pub separation_arcsec: f64,
    /// Found on the anchor night rather than a neighbour
    pub on_anchor_date: bool,
}

/// What the inventory source returned for a night
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InventoryStatus {
    Available { records: usize },
    Unavailable { reason: String },
}

/// One inspected night
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateVisit {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub status: InventoryStatus,
}

/// Changes made by one night
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateUpdate {
    pub accepted: Vec<Acceptance>,
    pub star_found: bool,
}

/// Mutable state of one calibration search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    anchor: NaiveDate,
    tracker: CompletenessTracker,
    star: Option<StandardStarMatch>,
    visits: Vec<DateVisit>,
}

impl SearchState {
    pub fn new(anchor: NaiveDate, requirements: &[Requirement]) -> Self {
        Self {
            anchor,
            tracker: CompletenessTracker::new(requirements),
            star: None,
            visits: Vec::new(),
        }
    }

    /// Record one night's fetch result and fold its records into the state.
    ///
    /// Unavailable nights are logged and leave the counts untouched. Nights
    /// already inspected are ignored.
    pub fn apply_date(
        &mut self,
        date: NaiveDate,
        fetched: Result<Vec<ObservationRecord>>,
        matcher: &StarMatcher,
    ) -> DateUpdate {
        if self.has_visited(date) {
            return DateUpdate::default();
        }

        let records = match fetched {
            Ok(records) => records,
            Err(e) => {
                warn!("Skipping {}: {}", date, e);
                self.visits.push(DateVisit {
                    date,
                    status: InventoryStatus::Unavailable {
                        reason: e.to_string(),
                    },
                });
                return DateUpdate::default();
            }
        };

        self.visits.push(DateVisit {
            date,
            status: InventoryStatus::Available {
                records: records.len(),
            },
        });

        let accepted = self.tracker.apply_inventory(date, &records);
        for acceptance in &accepted {
            info!(
                "Adding {} from {} (file: {})",
                acceptance.kind, date, acceptance.id
            );
        }

        let mut star_found = false;
        if self.star.is_none() {
            if let Some(hit) = matcher.find(&records) {
                info!(
                    "Standard star {} found on {}, file: {} ({:.2}\")",
                    hit.star_name, date, hit.record_id, hit.separation_arcsec
                );
                self.star = Some(StandardStarMatch {
                    date,
                    star_name: hit.star_name,
                    observation_id: hit.record_id,
                    separation_arcsec: hit.separation_arcsec,
                    on_anchor_date: date == self.anchor,
                });
                star_found = true;
            }
        }

        DateUpdate {
            accepted,
            star_found,
        }
    }

    /// Stop condition: every kind satisfied and a standard star found
    pub fn is_satisfied(&self) -> bool {
        self.tracker.is_complete() && self.star.is_some()
    }

    pub fn has_visited(&self, date: NaiveDate) -> bool {
        self.visits.iter().any(|visit| visit.date == date)
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn tracker(&self) -> &CompletenessTracker {
        &self.tracker
    }

    pub fn star(&self) -> Option<&StandardStarMatch> {
        self.star.as_ref()
    }

    pub fn visits(&self) -> &[DateVisit] {
        &self.visits
    }
}
