//! Metadata directory inventory source.
//!
//! Reads the per-night metadata tables that the archive client leaves in a
//! local directory (`koa_metadata_<date>.tbl`).

use super::{InventorySource, IpacTable, records_from_table};
use crate::constants::{INSTRUMENT, metadata_file_name};
use crate::error::{CalibError, Result};
use crate::models::ObservationRecord;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Inventory backed by cached archive metadata tables
#[derive(Debug, Clone)]
pub struct MetadataDirectory {
    root: PathBuf,
}

impl MetadataDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the metadata table for one night
    pub fn table_path(&self, date: NaiveDate) -> PathBuf {
        self.root.join(metadata_file_name(&date))
    }
}

impl InventorySource for MetadataDirectory {
    fn describe(&self) -> String {
        format!("{} metadata in {}", INSTRUMENT, self.root.display())
    }

    async fn fetch(&self, date: NaiveDate) -> Result<Vec<ObservationRecord>> {
        let path = self.table_path(date);

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CalibError::unavailable(
                    date,
                    format!("no metadata table at {}", path.display()),
                ));
            }
            Err(e) => {
                return Err(CalibError::unavailable(
                    date,
                    format!("cannot read {}: {}", path.display(), e),
                ));
            }
        };

        let table = IpacTable::parse(&contents, &path)?;
        let records = records_from_table(&table, &path)?;
        debug!("{}: {} records from {}", date, records.len(), path.display());

        Ok(records)
    }
}
