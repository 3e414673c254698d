//! Per-date archive inventories.
//!
//! The search core only needs, for one night, the list of archive entries
//! with their image type, identifier and pointing. [`InventorySource`] is
//! that boundary; querying the archive itself is left to the archive
//! client, which writes one metadata table per night.

pub mod directory;
pub mod ipac;
pub mod memory;

#[cfg(test)]
pub mod tests;

pub use self::{directory::MetadataDirectory, ipac::IpacTable, memory::MemoryInventory};

use crate::constants::columns;
use crate::error::{CalibError, Result};
use crate::models::ObservationRecord;
use chrono::NaiveDate;
use std::future::Future;
use std::path::Path;
use tracing::debug;

/// Source of observation records for a single night
pub trait InventorySource {
    /// Short description for log messages
    fn describe(&self) -> String;

    /// Records available for `date`, in the source's native order.
    ///
    /// An `Err` means the night is unavailable; callers treat it as "no data
    /// for that date" and never retry.
    fn fetch(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<Vec<ObservationRecord>>> + Send;
}

/// Convert a metadata table into observation records.
///
/// Rows without an identifier are skipped; unparseable, null or non-finite
/// (`nan`, `inf`) coordinates leave the record without a pointing.
pub fn records_from_table(table: &IpacTable, source: &Path) -> Result<Vec<ObservationRecord>> {
    let require = |name: &str| {
        table
            .column_index(name)
            .ok_or_else(|| CalibError::MetadataFormat {
                path: source.to_path_buf(),
                reason: format!("missing required column '{}'", name),
            })
    };

    let id_col = require(columns::ID)?;
    let type_col = require(columns::IMAGE_TYPE)?;
    let ra_col = require(columns::RA)?;
    let dec_col = require(columns::DEC)?;

    let parse_angle = |cell: &Option<String>| {
        cell.as_deref()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
    };

    let mut records = Vec::with_capacity(table.len());
    for (row_num, row) in table.rows().iter().enumerate() {
        let Some(id) = row.get(id_col).cloned().flatten() else {
            debug!("Skipping row {} of {}: no identifier", row_num + 1, source.display());
            continue;
        };

        let image_type = row.get(type_col).cloned().flatten().unwrap_or_default();
        let mut record = ObservationRecord::new(id, image_type);

        if let (Some(ra), Some(dec)) = (
            row.get(ra_col).and_then(parse_angle),
            row.get(dec_col).and_then(parse_angle),
        ) {
            record = record.at(ra, dec);
        }

        records.push(record);
    }

    Ok(records)
}
