//! In-memory source tests

use crate::error::CalibError;
use crate::inventory::{InventorySource, MemoryInventory};
use crate::models::ObservationRecord;
use chrono::NaiveDate;

#[tokio::test]
async fn test_memory_inventory_serves_and_fails() {
    let good = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
    let bad = NaiveDate::from_ymd_opt(2021, 3, 2).unwrap();
    let absent = NaiveDate::from_ymd_opt(2021, 3, 3).unwrap();

    let source = MemoryInventory::new()
        .with_night(good, vec![ObservationRecord::new("KB.1", "dark")])
        .with_failure(bad, "archive timeout");

    assert_eq!(source.fetch(good).await.unwrap().len(), 1);
    assert!(matches!(
        source.fetch(bad).await,
        Err(CalibError::InventoryUnavailable { reason, .. }) if reason == "archive timeout"
    ));
    assert!(source.fetch(absent).await.is_err());
    assert_eq!(source.fetched_dates(), vec![good, bad, absent]);
}
