//! Tests for the expanding search
//!
//! Fixtures build nights of archive records around a fixed anchor date and
//! a one-star catalog, then drive the search through [`MemoryInventory`].


use crate::catalog::Catalog;
use crate::config::{Requirement, SearchConfig};
use crate::inventory::MemoryInventory;
use crate::models::{CalibrationKind, ObservationRecord, ReferenceStar, SkyCoord};
use crate::search::SearchDriver;
use chrono::{Days, NaiveDate};

pub const STAR_RA: f64 = 159.902958;
pub const STAR_DEC: f64 = 43.102806;

pub fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 5, 20).unwrap()
}

/// Anchor shifted by `offset` days
pub fn day(offset: i64) -> NaiveDate {
    if offset >= 0 {
        anchor().checked_add_days(Days::new(offset as u64)).unwrap()
    } else {
        anchor().checked_sub_days(Days::new(offset.unsigned_abs())).unwrap()
    }
}

pub fn catalog() -> Catalog {
    Catalog::from_stars(vec![
        ReferenceStar {
            name: "feige34".to_string(),
            coord: SkyCoord::new(STAR_RA, STAR_DEC),
        },
        ReferenceStar {
            name: "bd+28d4211".to_string(),
            coord: SkyCoord::new(327.795917, 28.863889),
        },
    ])
}

/// `count` frames of one image type, ids unique per night
pub fn frames(date: NaiveDate, tag: &str, count: usize) -> Vec<ObservationRecord> {
    (0..count)
        .map(|i| ObservationRecord::new(format!("KB.{}.{}.{:02}", date, tag, i), tag))
        .collect()
}

/// Science frame pointed `offset_arcsec` north of feige34
pub fn star_frame(date: NaiveDate, offset_arcsec: f64) -> ObservationRecord {
    ObservationRecord::new(format!("KB.{}.object", date), "object")
        .at(STAR_RA, STAR_DEC + offset_arcsec / 3600.0)
}

/// Science frame far from every catalog star
pub fn field_frame(date: NaiveDate) -> ObservationRecord {
    ObservationRecord::new(format!("KB.{}.field", date), "object").at(10.0, -30.0)
}

/// Every default kind at its minimum, plus feige34
pub fn complete_night(date: NaiveDate) -> Vec<ObservationRecord> {
    let config = SearchConfig::default();
    let mut records: Vec<ObservationRecord> = config
        .requirements
        .iter()
        .flat_map(|r| frames(date, r.kind.archive_tag(), r.min_frames as usize))
        .collect();
    records.push(star_frame(date, 0.5));
    records
}

pub fn bias_only(min_frames: u32) -> Vec<Requirement> {
    vec![Requirement::new(CalibrationKind::Bias, min_frames)]
}

pub fn driver(
    source: MemoryInventory,
    config: SearchConfig,
) -> SearchDriver<MemoryInventory> {
    SearchDriver::new(source, catalog(), config).unwrap()
}
