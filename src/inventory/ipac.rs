//! IPAC ASCII table parsing.
//!
//! Archive metadata listings are written as IPAC tables: `\` keyword and
//! comment lines, up to four `|`-delimited header rows (names, types,
//! units, nulls) and fixed-width data rows aligned under the header cells.

use crate::error::{CalibError, Result};
use std::path::Path;
use tracing::debug;

const DEFAULT_NULL: &str = "null";

/// Column names and string cells of an IPAC table
#[derive(Debug, Clone, PartialEq)]
pub struct IpacTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl IpacTable {
    /// Parse table text; `source` is only used in error messages
    pub fn parse(contents: &str, source: &Path) -> Result<Self> {
        let malformed = |reason: String| CalibError::MetadataFormat {
            path: source.to_path_buf(),
            reason,
        };

        let mut header_rows: Vec<Vec<String>> = Vec::new();
        let mut boundaries: Option<Vec<usize>> = None;
        let mut data_lines: Vec<(usize, Vec<char>)> = Vec::new();

        for (line_num, line) in contents.lines().enumerate() {
            let trimmed = line.trim_end();
            if trimmed.is_empty() || trimmed.starts_with('\\') {
                continue;
            }

            let chars: Vec<char> = trimmed.chars().collect();

            if trimmed.starts_with('|') && data_lines.is_empty() {
                let pipes: Vec<usize> = chars
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| **c == '|')
                    .map(|(i, _)| i)
                    .collect();

                match &boundaries {
                    None => boundaries = Some(pipes.clone()),
                    Some(existing) if *existing != pipes => {
                        return Err(malformed(format!(
                            "header row on line {} is not aligned with the column names",
                            line_num + 1
                        )));
                    }
                    Some(_) => {}
                }

                header_rows.push(split_cells(&chars, &pipes));
                continue;
            }

            if boundaries.is_none() {
                return Err(malformed(format!(
                    "data on line {} before the column header",
                    line_num + 1
                )));
            }
            data_lines.push((line_num + 1, chars));
        }

        let boundaries = boundaries.ok_or_else(|| malformed("no column header".to_string()))?;
        if boundaries.len() < 2 {
            return Err(malformed("column header has no cells".to_string()));
        }

        let columns = header_rows[0].clone();
        let nulls: Vec<String> = header_rows
            .get(3)
            .cloned()
            .unwrap_or_else(|| vec![DEFAULT_NULL.to_string(); columns.len()]);

        let rows = data_lines
            .into_iter()
            .map(|(_, chars)| {
                split_cells(&chars, &boundaries)
                    .into_iter()
                    .zip(nulls.iter())
                    .map(|(cell, null)| {
                        let is_null = cell.is_empty()
                            || cell == *null
                            || cell.eq_ignore_ascii_case(DEFAULT_NULL);
                        (!is_null).then_some(cell)
                    })
                    .collect()
            })
            .collect::<Vec<Vec<Option<String>>>>();

        debug!(
            "Parsed IPAC table {}: {} columns, {} rows",
            source.display(),
            columns.len(),
            rows.len()
        );

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive column lookup
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    }
}

/// Slice a row into the cells between consecutive `|` positions.
///
/// A cell may use the character under its closing delimiter, as archive
/// writers right-align values up to that column.
fn split_cells(chars: &[char], pipes: &[usize]) -> Vec<String> {
    pipes
        .windows(2)
        .map(|bounds| {
            let start = (bounds[0] + 1).min(chars.len());
            let end = (bounds[1] + 1).min(chars.len());
            chars[start..end]
                .iter()
                .filter(|c| **c != '|')
                .collect::<String>()
                .trim()
                .to_string()
        })
        .collect()
}
