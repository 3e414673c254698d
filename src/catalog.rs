//! Spectrophotometric standard star catalog.
//!
//! Loads the reference list of standard stars from a CSV file (name, RA in
//! sexagesimal hours, DEC in sexagesimal degrees) and converts the
//! positions to degrees. The columns are read positionally through polars
//! as strings so that sexagesimal values are never type-inferred.

use crate::constants::{BUILTIN_CATALOG, BUILTIN_CATALOG_NAME, DEGREES_PER_HOUR};
use crate::error::{CalibError, Result};
use crate::models::{ReferenceStar, SkyCoord};
use polars::prelude::*;
use regex::Regex;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

static SEXAGESIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?(\d+(?:\.\d*)?)(?:[\s:]+(\d+(?:\.\d*)?))?(?:[\s:]+(\d+(?:\.\d*)?))?$")
        .expect("sexagesimal pattern is valid")
});

/// Sign and up to three sexagesimal components
struct Sexagesimal {
    negative: bool,
    whole: f64,
    minutes: f64,
    seconds: f64,
}

impl Sexagesimal {
    fn parse(value: &str) -> Result<Self> {
        let invalid = |reason: &str| CalibError::InvalidAngle {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let caps = SEXAGESIMAL
            .captures(value.trim())
            .ok_or_else(|| invalid("expected 'DD MM SS.s' or 'DD:MM:SS.s'"))?;

        let component = |index: usize| -> Result<f64> {
            caps.get(index)
                .map(|m| m.as_str().parse::<f64>())
                .transpose()
                .map_err(|_| invalid("unparseable component"))
                .map(|v| v.unwrap_or(0.0))
        };

        let parsed = Self {
            negative: caps.get(1).is_some_and(|m| m.as_str() == "-"),
            whole: component(2)?,
            minutes: component(3)?,
            seconds: component(4)?,
        };

        if parsed.minutes >= 60.0 || parsed.seconds >= 60.0 {
            return Err(invalid("minutes and seconds must be below 60"));
        }

        Ok(parsed)
    }

    fn magnitude(&self) -> f64 {
        self.whole + self.minutes / 60.0 + self.seconds / 3600.0
    }
}

/// Convert right ascension in sexagesimal hours to degrees
pub fn parse_ra_hours(value: &str) -> Result<f64> {
    let angle = Sexagesimal::parse(value)?;
    let hours = angle.magnitude();

    if angle.negative || hours >= 24.0 {
        return Err(CalibError::InvalidAngle {
            value: value.to_string(),
            reason: "right ascension must be within 0h..24h".to_string(),
        });
    }

    Ok(hours * DEGREES_PER_HOUR)
}

/// Convert declination in sexagesimal degrees to degrees
pub fn parse_dec_degrees(value: &str) -> Result<f64> {
    let angle = Sexagesimal::parse(value)?;
    let degrees = angle.magnitude();

    if degrees > 90.0 {
        return Err(CalibError::InvalidAngle {
            value: value.to_string(),
            reason: "declination must be within -90..+90 degrees".to_string(),
        });
    }

    Ok(if angle.negative { -degrees } else { degrees })
}

/// Ordered, read-only list of reference stars
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    source: PathBuf,
    stars: Vec<ReferenceStar>,
}

impl Catalog {
    /// Load a catalog CSV with a header row and name, RA, DEC columns
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CalibError::catalog(path, "file not found"));
        }

        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| CalibError::catalog(path, format!("unreadable CSV: {}", e)))?;

        let catalog = Self::from_frame(&frame, path)?;
        info!(
            "Loaded {} standard stars from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Catalog compiled into the binary
    pub fn builtin() -> Result<Self> {
        let source = Path::new(BUILTIN_CATALOG_NAME);
        let frame = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .into_reader_with_file_handle(Cursor::new(BUILTIN_CATALOG.as_bytes()))
            .finish()
            .map_err(|e| CalibError::catalog(source, format!("unreadable CSV: {}", e)))?;

        Self::from_frame(&frame, source)
    }

    /// Build a catalog from already-converted stars
    pub fn from_stars(stars: Vec<ReferenceStar>) -> Self {
        Self {
            source: PathBuf::from("<memory>"),
            stars,
        }
    }

    fn from_frame(frame: &DataFrame, source: &Path) -> Result<Self> {
        let columns = frame.get_columns();
        if columns.len() < 3 {
            return Err(CalibError::catalog(
                source,
                format!("expected name, RA and DEC columns, found {}", columns.len()),
            ));
        }

        let string_column = |index: usize| {
            columns[index]
                .str()
                .map_err(|e| CalibError::catalog(source, format!("column {}: {}", index, e)))
        };
        let names = string_column(0)?;
        let ras = string_column(1)?;
        let decs = string_column(2)?;

        let mut stars = Vec::with_capacity(frame.height());
        for (row, ((name, ra), dec)) in names
            .into_iter()
            .zip(ras.into_iter())
            .zip(decs.into_iter())
            .enumerate()
        {
            let line = row + 2;
            let name = name.map(str::trim).filter(|n| !n.is_empty()).ok_or_else(|| {
                CalibError::catalog(source, format!("line {}: missing star name", line))
            })?;
            let missing = |column: &str| {
                CalibError::catalog(source, format!("line {}: missing {} for {}", line, column, name))
            };
            let ra = ra.ok_or_else(|| missing("RA"))?;
            let dec = dec.ok_or_else(|| missing("DEC"))?;

            let angle_error = |e: CalibError| {
                CalibError::catalog(source, format!("line {} ({}): {}", line, name, e))
            };
            let coord = SkyCoord::new(
                parse_ra_hours(ra).map_err(angle_error)?,
                parse_dec_degrees(dec).map_err(angle_error)?,
            );

            stars.push(ReferenceStar {
                name: name.to_string(),
                coord,
            });
        }

        if stars.is_empty() {
            return Err(CalibError::catalog(source, "catalog has no stars"));
        }

        debug!("Parsed {} catalog rows from {}", stars.len(), source.display());

        Ok(Self {
            source: source.to_path_buf(),
            stars,
        })
    }

    pub fn stars(&self) -> &[ReferenceStar] {
        &self.stars
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}
