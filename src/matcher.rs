//! Celestial coordinate matching.
//!
//! Great-circle separations on the celestial sphere, nearest-candidate
//! search, and the standard-star matcher that runs a catalog against one
//! night's pointings.

use crate::catalog::Catalog;
use crate::constants::ARCSEC_PER_DEGREE;
use crate::models::{ObservationRecord, SkyCoord};
use tracing::debug;

/// Great-circle separation in arcseconds (Vincenty formula)
pub fn angular_separation_arcsec(a: &SkyCoord, b: &SkyCoord) -> f64 {
    let (ra1, dec1) = (a.ra_deg.to_radians(), a.dec_deg.to_radians());
    let (ra2, dec2) = (b.ra_deg.to_radians(), b.dec_deg.to_radians());
    let delta_ra = ra2 - ra1;

    let (sin_dec1, cos_dec1) = dec1.sin_cos();
    let (sin_dec2, cos_dec2) = dec2.sin_cos();
    let (sin_dra, cos_dra) = delta_ra.sin_cos();

    let num1 = cos_dec2 * sin_dra;
    let num2 = cos_dec1 * sin_dec2 - sin_dec1 * cos_dec2 * cos_dra;
    let denominator = sin_dec1 * sin_dec2 + cos_dec1 * cos_dec2 * cos_dra;

    num1.hypot(num2)
        .atan2(denominator)
        .to_degrees()
        * ARCSEC_PER_DEGREE
}

/// Closest candidate to a target position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub index: usize,
    pub separation_arcsec: f64,
}

/// Find the candidate closest to `target`; ties go to the lowest index.
///
/// Candidates whose separation is not finite are ignored. Returns `None`
/// when no candidate remains.
pub fn nearest(target: &SkyCoord, candidates: &[SkyCoord]) -> Option<Nearest> {
    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| Nearest {
            index,
            separation_arcsec: angular_separation_arcsec(target, candidate),
        })
        .filter(|current| current.separation_arcsec.is_finite())
        .fold(None, |best: Option<Nearest>, current| match best {
            Some(best) if best.separation_arcsec <= current.separation_arcsec => Some(best),
            _ => Some(current),
        })
}

/// Inclusive tolerance check
pub fn within_tolerance(separation_arcsec: f64, tolerance_arcsec: f64) -> bool {
    separation_arcsec <= tolerance_arcsec
}

/// A catalog star matched to one of a night's observations
#[derive(Debug, Clone, PartialEq)]
pub struct StarHit {
    pub star_name: String,
    pub record_id: String,
    pub separation_arcsec: f64,
}

/// Matches a standard-star catalog against observation pointings
#[derive(Debug, Clone)]
pub struct StarMatcher {
    catalog: Catalog,
    tolerance_arcsec: f64,
}

impl StarMatcher {
    pub fn new(catalog: Catalog, tolerance_arcsec: f64) -> Self {
        Self {
            catalog,
            tolerance_arcsec,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tolerance_arcsec(&self) -> f64 {
        self.tolerance_arcsec
    }

    /// First catalog star, in catalog order, whose nearest pointing is within tolerance.
    ///
    /// Records without coordinates are ignored. Returns `None` when no record
    /// has coordinates or no star is close enough.
    pub fn find(&self, records: &[ObservationRecord]) -> Option<StarHit> {
        let (positions, candidates): (Vec<usize>, Vec<SkyCoord>) = records
            .iter()
            .enumerate()
            .filter_map(|(position, record)| record.coord.map(|coord| (position, coord)))
            .unzip();

        if candidates.is_empty() {
            debug!("No pointed observations to match against the catalog");
            return None;
        }

        self.catalog.stars().iter().find_map(|star| {
            let closest = nearest(&star.coord, &candidates)?;
            within_tolerance(closest.separation_arcsec, self.tolerance_arcsec).then(|| StarHit {
                star_name: star.name.clone(),
                record_id: records[positions[closest.index]].id.clone(),
                separation_arcsec: closest.separation_arcsec,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReferenceStar;

    fn coord(ra: f64, dec: f64) -> SkyCoord {
        SkyCoord::new(ra, dec)
    }

    #[test]
    fn test_separation_same_point_is_zero() {
        let p = coord(160.0, 43.1);
        assert_eq!(angular_separation_arcsec(&p, &p), 0.0);
    }

    #[test]
    fn test_separation_known_angles() {
        let quarter = angular_separation_arcsec(&coord(0.0, 0.0), &coord(90.0, 0.0));
        assert!((quarter - 90.0 * 3600.0).abs() < 1e-6);

        let pole = angular_separation_arcsec(&coord(0.0, 90.0), &coord(123.0, 0.0));
        assert!((pole - 90.0 * 3600.0).abs() < 1e-6);

        let antipode = angular_separation_arcsec(&coord(10.0, 20.0), &coord(190.0, -20.0));
        assert!((antipode - 180.0 * 3600.0).abs() < 1e-6);
    }

    #[test]
    fn test_separation_is_not_planar() {
        // 1 degree of RA at dec 60 spans half a degree on the sky
        let sep = angular_separation_arcsec(&coord(100.0, 60.0), &coord(101.0, 60.0));
        assert!((sep - 1800.0).abs() < 1.0, "got {}", sep);
    }

    #[test]
    fn test_separation_wraps_ra() {
        let sep = angular_separation_arcsec(&coord(359.999, 0.0), &coord(0.001, 0.0));
        assert!((sep - 7.2).abs() < 1e-6);
    }

    #[test]
    fn test_nearest_picks_closest() {
        let target = coord(10.0, 10.0);
        let candidates = [coord(10.0, 11.0), coord(10.0, 10.001), coord(10.0, 9.998)];
        let hit = nearest(&target, &candidates).unwrap();
        assert_eq!(hit.index, 1);
        assert!((hit.separation_arcsec - 3.6).abs() < 1e-3);

        assert!(nearest(&target, &[]).is_none());
    }

    #[test]
    fn test_nearest_ignores_non_finite_candidates() {
        let target = coord(159.903, 43.1028);
        let candidates = [
            coord(159.903, 43.1028),
            coord(f64::NAN, f64::NAN),
            coord(f64::INFINITY, 43.1028),
        ];
        let hit = nearest(&target, &candidates).unwrap();
        assert_eq!(hit.index, 0);
        assert_eq!(hit.separation_arcsec, 0.0);

        assert!(nearest(&target, &[coord(f64::NAN, 0.0)]).is_none());
    }

    #[test]
    fn test_tolerance_is_inclusive() {
        assert!(within_tolerance(5.0, 5.0));
        assert!(!within_tolerance(5.000001, 5.0));
        assert!(within_tolerance(0.0, 0.0));
        assert!(!within_tolerance(1e-9, 0.0));
    }

    fn matcher(tolerance: f64) -> StarMatcher {
        let catalog = Catalog::from_stars(vec![
            ReferenceStar {
                name: "feige34".to_string(),
                coord: coord(159.903, 43.1028),
            },
            ReferenceStar {
                name: "hz44".to_string(),
                coord: coord(200.897, 36.1333),
            },
        ]);
        StarMatcher::new(catalog, tolerance)
    }

    #[test]
    fn test_star_matcher_uses_catalog_order() {
        let records = vec![
            ObservationRecord::new("KB.1", "object").at(200.897, 36.1333),
            ObservationRecord::new("KB.2", "bias"),
            ObservationRecord::new("KB.3", "object").at(159.903, 43.1028),
        ];
        let hit = matcher(5.0).find(&records).unwrap();
        assert_eq!(hit.star_name, "feige34");
        assert_eq!(hit.record_id, "KB.3");
        assert_eq!(hit.separation_arcsec, 0.0);
    }

    #[test]
    fn test_star_matcher_boundary() {
        let records = vec![ObservationRecord::new("KB.9", "object").at(200.897, 36.1343)];
        let separation = angular_separation_arcsec(
            &coord(200.897, 36.1333),
            &coord(200.897, 36.1343),
        );

        assert!(matcher(separation).find(&records).is_some());
        assert!(matcher(separation * 0.999).find(&records).is_none());
        assert!(matcher(0.0).find(&records).is_none());
    }

    #[test]
    fn test_star_matcher_without_pointings() {
        let records = vec![ObservationRecord::new("KB.1", "bias")];
        assert!(matcher(5.0).find(&records).is_none());
        assert!(matcher(5.0).find(&[]).is_none());
    }
}
