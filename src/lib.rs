//! KCWI calibration finder
//!
//! Given the date of a KCWI science observation, finds the calibration
//! exposures (bias, dark, dome/twilight/lamp flats, arc lamps, continuum
//! bars) and a spectrophotometric standard star needed to reduce it.
//! When the observation night alone is incomplete, the search widens one
//! night at a time in both directions until every kind has its minimum
//! number of frames and a standard star has been seen, or the configured
//! search width runs out.
//!
//! This library provides:
//! - A standard-star catalog loader with sexagesimal coordinate parsing
//! - Great-circle coordinate matching against the catalog
//! - Archive inventory sources (metadata tables on disk, or in memory)
//! - Completeness tracking per calibration kind
//! - The expanding search driver and its report

pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod inventory;
pub mod matcher;
pub mod models;
pub mod report;
pub mod search;
pub mod tracker;

// Re-export commonly used types
pub use catalog::Catalog;
pub use config::{Requirement, SearchConfig, SearchOrder};
pub use error::{CalibError, Result};
pub use inventory::{InventorySource, MemoryInventory, MetadataDirectory};
pub use matcher::StarMatcher;
pub use models::{CalibrationKind, ObservationRecord, ReferenceStar, SkyCoord};
pub use report::SearchReport;
pub use search::{SearchDriver, SearchOutcome, SearchStatus};
