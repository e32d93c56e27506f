//! Distance and scoring, both pure.

use crate::config::ScoringConfig;
use crate::types::Coordinate;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in kilometers.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Map a distance to points via the tier table.
///
/// Boundary values belong to the next, lower-scoring tier (strict less-than).
pub fn score_from_distance(km: f64, scoring: &ScoringConfig) -> u32 {
    for tier in &scoring.tiers {
        if km < tier.max_km {
            return tier.points;
        }
    }
    scoring.fallback_points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scoring() -> ScoringConfig {
        ScoringConfig::default()
    }

    #[test]
    fn test_score_at_zero_and_far() {
        assert_eq!(score_from_distance(0.0, &scoring()), 100);
        assert_eq!(score_from_distance(2500.0, &scoring()), 10);
    }

    #[test]
    fn test_score_tiers() {
        assert_eq!(score_from_distance(99.9, &scoring()), 100);
        assert_eq!(score_from_distance(499.9, &scoring()), 75);
        assert_eq!(score_from_distance(999.9, &scoring()), 50);
        assert_eq!(score_from_distance(1999.9, &scoring()), 25);
    }

    #[test]
    fn test_boundary_belongs_to_lower_tier() {
        assert_eq!(score_from_distance(100.0, &scoring()), 75);
        assert_eq!(score_from_distance(500.0, &scoring()), 50);
        assert_eq!(score_from_distance(1000.0, &scoring()), 25);
        assert_eq!(score_from_distance(2000.0, &scoring()), 10);
    }

    #[test]
    fn test_score_is_non_increasing() {
        let scoring = scoring();
        let mut previous = u32::MAX;
        for km in (0..3000).map(f64::from) {
            let points = score_from_distance(km, &scoring);
            assert!(points <= previous, "Score increased at {} km", km);
            previous = points;
        }
    }

    #[test]
    fn test_haversine_zero_for_identical_points() {
        let berlin = Coordinate::new(52.52, 13.405);
        assert!(haversine_km(berlin, berlin).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let berlin = Coordinate::new(52.52, 13.405);
        let paris = Coordinate::new(48.8566, 2.3522);
        let there = haversine_km(berlin, paris);
        let back = haversine_km(paris, berlin);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Berlin to Paris is roughly 878 km
        let berlin = Coordinate::new(52.52, 13.405);
        let paris = Coordinate::new(48.8566, 2.3522);
        let km = haversine_km(berlin, paris);
        assert!((km - 878.0).abs() < 5.0, "Got {} km", km);
    }

    #[test]
    fn test_haversine_antipodal() {
        // Half the Earth's circumference, a bit over 20000 km
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let km = haversine_km(a, b);
        assert!((km - 20015.0).abs() < 10.0, "Got {} km", km);
    }
}
