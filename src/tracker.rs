//! Completeness tracking for required calibration frames.
//!
//! Each configured calibration kind keeps a remaining count and the ordered
//! list of frames that satisfied it. Counts only ever go down, and a kind
//! that reaches zero is never looked at again.

use crate::config::Requirement;
use crate::models::{CalibrationKind, ObservationRecord};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

/// A frame accepted for a calibration kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameRef {
    pub date: NaiveDate,
    pub id: String,
}

/// Progress towards one calibration kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequirementState {
    pub kind: CalibrationKind,
    pub required: u32,
    pub remaining: u32,
    pub satisfied_by: Vec<FrameRef>,
}

impl RequirementState {
    fn new(requirement: &Requirement) -> Self {
        Self {
            kind: requirement.kind,
            required: requirement.min_frames,
            remaining: requirement.min_frames,
            satisfied_by: Vec::new(),
        }
    }

    pub fn is_satisfied(&self) -> bool {
        self.remaining == 0
    }

    fn already_has(&self, id: &str) -> bool {
        self.satisfied_by.iter().any(|frame| frame.id == id)
    }
}

/// Frame accepted by one tracker update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acceptance {
    pub kind: CalibrationKind,
    pub id: String,
}

/// Remaining counts and accepted frames for every required kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletenessTracker {
    states: Vec<RequirementState>,
}

impl CompletenessTracker {
    /// Seed one state per requirement, keeping declaration order
    pub fn new(requirements: &[Requirement]) -> Self {
        Self {
            states: requirements.iter().map(RequirementState::new).collect(),
        }
    }

    /// Accept frames from one night for every kind still short.
    ///
    /// Kinds are visited in declaration order and records in their native
    /// order; each kind takes at most its remaining count.
    pub fn apply_inventory(
        &mut self,
        date: NaiveDate,
        records: &[ObservationRecord],
    ) -> Vec<Acceptance> {
        let mut accepted = Vec::new();

        for state in self.states.iter_mut().filter(|s| !s.is_satisfied()) {
            for record in records {
                if state.remaining == 0 {
                    break;
                }
                if record.image_type().calibration_kind() != Some(state.kind)
                    || state.already_has(&record.id)
                {
                    continue;
                }

                state.remaining -= 1;
                state.satisfied_by.push(FrameRef {
                    date,
                    id: record.id.clone(),
                });
                accepted.push(Acceptance {
                    kind: state.kind,
                    id: record.id.clone(),
                });
            }
        }

        debug!("{}: accepted {} calibration frames", date, accepted.len());
        accepted
    }

    /// True when every kind has reached its minimum
    pub fn is_complete(&self) -> bool {
        self.states.iter().all(RequirementState::is_satisfied)
    }

    /// Kinds still short and by how many frames, in declaration order
    pub fn shortfalls(&self) -> Vec<(CalibrationKind, u32)> {
        self.states
            .iter()
            .filter(|s| !s.is_satisfied())
            .map(|s| (s.kind, s.remaining))
            .collect()
    }

    pub fn states(&self) -> &[RequirementState] {
        &self.states
    }

    pub fn state(&self, kind: CalibrationKind) -> Option<&RequirementState> {
        self.states.iter().find(|s| s.kind == kind)
    }
}
