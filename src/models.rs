//! Core data structures for the calibration search.
//!
//! Defines calibration kinds and their archive vocabulary, sky coordinates,
//! per-date observation records and catalog reference stars.

use crate::error::{CalibError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calibration frame kinds required to reduce a science night
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationKind {
    Bias,
    Dark,
    DomeFlat,
    TwilightFlat,
    LampFlat,
    ArcLamp,
    ContinuumBars,
}

impl CalibrationKind {
    pub const ALL: [CalibrationKind; 7] = [
        CalibrationKind::Bias,
        CalibrationKind::DomeFlat,
        CalibrationKind::TwilightFlat,
        CalibrationKind::LampFlat,
        CalibrationKind::ArcLamp,
        CalibrationKind::ContinuumBars,
        CalibrationKind::Dark,
    ];

    /// Image type tag used by the archive (`koaimtyp` column)
    pub fn archive_tag(&self) -> &'static str {
        match self {
            CalibrationKind::Bias => "bias",
            CalibrationKind::Dark => "dark",
            CalibrationKind::DomeFlat => "domeflat",
            CalibrationKind::TwilightFlat => "twiflat",
            CalibrationKind::LampFlat => "flatlamp",
            CalibrationKind::ArcLamp => "arclamp",
            CalibrationKind::ContinuumBars => "contbars",
        }
    }

    /// Upper-case label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            CalibrationKind::Bias => "BIAS",
            CalibrationKind::Dark => "DARK",
            CalibrationKind::DomeFlat => "DOMEFLAT",
            CalibrationKind::TwilightFlat => "TWIFLAT",
            CalibrationKind::LampFlat => "FLATLAMP",
            CalibrationKind::ArcLamp => "ARCLAMP",
            CalibrationKind::ContinuumBars => "CONTBARS",
        }
    }
}

impl fmt::Display for CalibrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CalibrationKind {
    type Err = CalibError;

    /// Accepts archive tags (`twiflat`) and kind names (`twilight_flat`, `TwilightFlat`)
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "bias" => Ok(CalibrationKind::Bias),
            "dark" => Ok(CalibrationKind::Dark),
            "domeflat" => Ok(CalibrationKind::DomeFlat),
            "twiflat" | "twilightflat" => Ok(CalibrationKind::TwilightFlat),
            "flatlamp" | "lampflat" => Ok(CalibrationKind::LampFlat),
            "arclamp" | "arc" => Ok(CalibrationKind::ArcLamp),
            "contbars" | "continuumbars" => Ok(CalibrationKind::ContinuumBars),
            _ => Err(CalibError::configuration(format!(
                "Unknown calibration kind: '{}'",
                s
            ))),
        }
    }
}

/// Classification of a record's image type tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageType {
    Calibration(CalibrationKind),
    Science,
    Other(String),
}

impl ImageType {
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("object") {
            return ImageType::Science;
        }
        match tag.parse::<CalibrationKind>() {
            Ok(kind) => ImageType::Calibration(kind),
            Err(_) => ImageType::Other(tag.to_lowercase()),
        }
    }

    pub fn calibration_kind(&self) -> Option<CalibrationKind> {
        match self {
            ImageType::Calibration(kind) => Some(*kind),
            _ => None,
        }
    }
}

/// Equatorial sky position in degrees (ICRS)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyCoord {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

impl SkyCoord {
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self { ra_deg, dec_deg }
    }

    /// Great-circle separation to another position, in arcseconds
    pub fn separation_arcsec(&self, other: &SkyCoord) -> f64 {
        crate::matcher::angular_separation_arcsec(self, other)
    }
}

/// One archive entry for a given night
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRecord {
    /// Unique archive identifier (`koaid`)
    pub id: String,
    /// Raw image type tag (`koaimtyp`)
    pub image_type_tag: String,
    /// Telescope pointing; absent when the archive reports null RA/DEC
    pub coord: Option<SkyCoord>,
}

impl ObservationRecord {
    pub fn new(id: impl Into<String>, image_type_tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image_type_tag: image_type_tag.into(),
            coord: None,
        }
    }

    pub fn at(mut self, ra_deg: f64, dec_deg: f64) -> Self {
        self.coord = Some(SkyCoord::new(ra_deg, dec_deg));
        self
    }

    pub fn image_type(&self) -> ImageType {
        ImageType::from_tag(&self.image_type_tag)
    }
}

/// Spectrophotometric standard star from the reference catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceStar {
    pub name: String,
    pub coord: SkyCoord,
}

/// Parse an observation date in `YYYY-MM-DD` form
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), crate::constants::DATE_FORMAT).map_err(|_| {
        CalibError::InvalidDate {
            value: value.to_string(),
        }
    })
}
