//! Expanding calibration search.
//!
//! Starts at the anchor night and widens symmetrically, one day at a time,
//! until every required calibration kind has its minimum number of frames
//! and a standard star has been observed, or the search width runs out.
//! Inventories may be fetched ahead of time, but they are always folded
//! into the state one night at a time in visit order.

pub mod order;
pub mod state;

#[cfg(test)]
pub mod tests;

pub use self::order::neighbour_dates;
pub use self::state::{DateUpdate, DateVisit, InventoryStatus, SearchState, StandardStarMatch};

use crate::catalog::Catalog;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::inventory::InventorySource;
use crate::matcher::StarMatcher;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::pin::pin;
use tracing::{debug, info};

/// Where the search state machine stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Searching,
    /// All calibrations and a standard star were found
    Satisfied,
    /// The search width ran out first
    Exhausted,
    /// The anchor night had no usable inventory; nothing else was searched
    NoData,
}

/// Final state of a search, ready for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub days_to_check: i64,
    pub tolerance_arcsec: f64,
    pub state: SearchState,
}

impl SearchOutcome {
    pub fn anchor(&self) -> NaiveDate {
        self.state.anchor()
    }
}

/// Drives the date-by-date search against an inventory source
#[derive(Debug)]
pub struct SearchDriver<S> {
    source: S,
    matcher: StarMatcher,
    config: SearchConfig,
}

impl<S: InventorySource> SearchDriver<S> {
    /// Validate the configuration and bind the catalog
    pub fn new(source: S, catalog: Catalog, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let matcher = StarMatcher::new(catalog, config.tolerance_arcsec);
        Ok(Self {
            source,
            matcher,
            config,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run the search around `anchor`
    pub async fn run(&self, anchor: NaiveDate) -> SearchOutcome {
        self.run_with_observer(anchor, |_, _| {}).await
    }

    /// Run the search, calling `observer` after each inspected night
    pub async fn run_with_observer<F>(&self, anchor: NaiveDate, mut observer: F) -> SearchOutcome
    where
        F: FnMut(&DateVisit, &SearchState),
    {
        let mut state = SearchState::new(anchor, &self.config.requirements);
        let mut status = SearchStatus::Searching;

        info!("Checking calibrations for {} ({})", anchor, self.source.describe());
        let fetched = self.source.fetch(anchor).await;
        let anchor_has_data = fetched.as_ref().is_ok_and(|records| !records.is_empty());
        state.apply_date(anchor, fetched, &self.matcher);
        notify(&mut observer, &state);

        if !anchor_has_data {
            info!("No archive data for anchor date {}", anchor);
            return self.finish(SearchStatus::NoData, state);
        }

        if state.is_satisfied() {
            info!("All required calibrations and a standard star are present on {}", anchor);
            return self.finish(SearchStatus::Satisfied, state);
        }

        let dates = neighbour_dates(anchor, self.config.days_to_check, self.config.search_order);
        debug!(
            "Expanding search to +/- {} days (prefetch {})",
            self.config.days_to_check, self.config.prefetch
        );

        let source = &self.source;
        let mut fetches = pin!(
            stream::iter(dates)
                .map(|date| async move { (date, source.fetch(date).await) })
                .buffered(self.config.prefetch)
        );

        while let Some((date, fetched)) = fetches.next().await {
            info!("Checking calibrations for {}", date);
            state.apply_date(date, fetched, &self.matcher);
            notify(&mut observer, &state);

            if state.is_satisfied() {
                status = SearchStatus::Satisfied;
                break;
            }
        }

        if status == SearchStatus::Searching {
            status = SearchStatus::Exhausted;
        }

        self.finish(status, state)
    }

    fn finish(&self, status: SearchStatus, state: SearchState) -> SearchOutcome {
        debug!(
            "Search around {} finished as {:?} after {} nights",
            state.anchor(),
            status,
            state.visits().len()
        );
        SearchOutcome {
            status,
            days_to_check: self.config.days_to_check,
            tolerance_arcsec: self.config.tolerance_arcsec,
            state,
        }
    }
}

fn notify<F>(observer: &mut F, state: &SearchState)
where
    F: FnMut(&DateVisit, &SearchState),
{
    if let Some(visit) = state.visits().last() {
        observer(visit, state);
    }
}
