//! Tests for archive inventory sources
//!
//! Covers metadata table conversion, the metadata directory source and the
//! in-memory source used by the search tests.

pub mod directory_tests;
pub mod memory_tests;

use crate::models::ObservationRecord;

/// Render records as an archive metadata table, the way the archive client writes them
pub fn metadata_table(records: &[ObservationRecord]) -> String {
    let mut table = String::from("\\fixlen = T\n");
    table.push_str(&format!(
        "|{:<30}|{:<10}|{:<12}|{:<12}|{:<10}|\n",
        "koaid", "koaimtyp", "ra", "dec", "targname"
    ));
    table.push_str(&format!(
        "|{:<30}|{:<10}|{:<12}|{:<12}|{:<10}|\n",
        "char", "char", "double", "double", "char"
    ));
    table.push_str(&format!(
        "|{:<30}|{:<10}|{:<12}|{:<12}|{:<10}|\n",
        "", "", "deg", "deg", ""
    ));
    table.push_str(&format!(
        "|{:<30}|{:<10}|{:<12}|{:<12}|{:<10}|\n",
        "null", "null", "null", "null", "null"
    ));

    for record in records {
        let (ra, dec) = match record.coord {
            Some(coord) => (format!("{:.6}", coord.ra_deg), format!("{:.6}", coord.dec_deg)),
            None => ("null".to_string(), "null".to_string()),
        };
        table.push_str(&format!(
            " {:<30} {:<10} {:<12} {:<12} {:<10}\n",
            record.id, record.image_type_tag, ra, dec, "null"
        ));
    }

    table
}
