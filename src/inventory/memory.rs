//! In-memory inventory source for demos and tests.

use super::InventorySource;
use crate::error::{CalibError, Result};
use crate::models::ObservationRecord;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Night {
    Records(Vec<ObservationRecord>),
    Failure(String),
}

/// Fixed date → records mapping; dates never inserted are unavailable
#[derive(Debug, Default)]
pub struct MemoryInventory {
    nights: HashMap<NaiveDate, Night>,
    fetched: Mutex<Vec<NaiveDate>>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the records served for a night
    pub fn with_night(mut self, date: NaiveDate, records: Vec<ObservationRecord>) -> Self {
        self.nights.insert(date, Night::Records(records));
        self
    }

    /// Make a night fail with the given reason
    pub fn with_failure(mut self, date: NaiveDate, reason: impl Into<String>) -> Self {
        self.nights.insert(date, Night::Failure(reason.into()));
        self
    }

    /// Dates requested so far, in request order
    pub fn fetched_dates(&self) -> Vec<NaiveDate> {
        self.fetched
            .lock()
            .map(|dates| dates.clone())
            .unwrap_or_default()
    }
}

impl InventorySource for MemoryInventory {
    fn describe(&self) -> String {
        format!("in-memory inventory ({} nights)", self.nights.len())
    }

    async fn fetch(&self, date: NaiveDate) -> Result<Vec<ObservationRecord>> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(date);
        }

        match self.nights.get(&date) {
            Some(Night::Records(records)) => Ok(records.clone()),
            Some(Night::Failure(reason)) => Err(CalibError::unavailable(date, reason.clone())),
            None => Err(CalibError::unavailable(date, "no archive entries for this night")),
        }
    }
}
