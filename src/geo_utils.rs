//! Geographic utilities: great-circle distance and initial bearing.
//!
//! All functions are pure and operate on a spherical-Earth approximation.
//! They are the leaf dependency of every analyzer in this crate.

use crate::LatLon;

/// Mean Earth radius in meters (spherical approximation).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate the great-circle distance between two points in meters using
/// the haversine formula.
///
/// Symmetric within floating-point tolerance; identical points return 0.
/// The haversine intermediate is clamped to `[0, 1]` so nearly-antipodal
/// pairs cannot push `sqrt`/`atan2` out of domain through floating-point
/// overshoot.
///
/// # Example
/// ```
/// use pylon_analyzer::geo_utils::haversine_distance;
/// use pylon_analyzer::GeoPoint;
///
/// let a = GeoPoint::new(32.76300740, -117.21375030, 0.0, 0);
/// let b = GeoPoint::new(32.76304460, -117.21412720, 0.0, 1);
/// let d = haversine_distance(&a, &b);
/// assert!((d - 35.5).abs() < 0.1);
/// ```
pub fn haversine_distance<A: LatLon, B: LatLon>(a: &A, b: &B) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let dlat = (b.latitude() - a.latitude()).to_radians();
    let dlon = (b.longitude() - a.longitude()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Clamp against floating-point overshoot for antipodal pairs
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Calculate the initial bearing along the great-circle path from `from` to
/// `to`, in degrees normalized to `[0, 360)`.
///
/// For identical points the direction is undefined; this function returns
/// `0.0` deterministically rather than failing.
pub fn initial_bearing<A: LatLon, B: LatLon>(from: &A, to: &B) -> f64 {
    let lat1 = from.latitude().to_radians();
    let lat2 = to.latitude().to_radians();
    let dlon = (to.longitude() - from.longitude()).to_radians();

    let x = dlon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    (x.atan2(y).to_degrees() + 360.0) % 360.0
}

/// Compute the error between a measured and an ideal bearing, in degrees.
///
/// The default (`circular = false`) is the naive absolute difference, which
/// overstates errors near the 0°/360° boundary; historical reports were
/// produced this way, so it stays the default. With `circular = true` the
/// shortest angular distance is used instead (always in `[0, 180]`).
pub fn bearing_error(measured: f64, ideal: f64, circular: bool) -> f64 {
    let naive = (measured - ideal).abs();
    if circular {
        let wrapped = naive % 360.0;
        wrapped.min(360.0 - wrapped)
    } else {
        naive
    }
}

/// Total length of a polyline in meters.
pub fn polyline_length<P: LatLon>(points: &[P]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeoPoint;

    fn pt(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon, 0.0, 0)
    }

    #[test]
    fn test_distance_symmetry() {
        let a = pt(32.76300740, -117.21375030);
        let b = pt(32.76351600, -117.21344860);
        let ab = haversine_distance(&a, &b);
        let ba = haversine_distance(&b, &a);
        assert!((ab - ba).abs() / ab < 1e-6);
    }

    #[test]
    fn test_distance_identity() {
        let a = pt(32.763, -117.213);
        assert_eq!(haversine_distance(&a, &a), 0.0);
    }

    #[test]
    fn test_distance_known_fixtures() {
        // Adjacent pylons on the SEFSD T-28 course
        let gate = pt(32.76300740, -117.21375030);
        let sw = pt(32.76304460, -117.21412720);
        let se = pt(32.76310780, -117.21337620);
        assert!((haversine_distance(&gate, &sw) - 35.484).abs() < 0.01);
        assert!((haversine_distance(&se, &gate) - 36.719).abs() < 0.01);

        // One degree of latitude at the equator is ~111.19 km on the
        // 6371 km sphere
        let d = haversine_distance(&pt(0.0, 0.0), &pt(1.0, 0.0));
        assert!((d - 111_194.9).abs() < 1.0);
    }

    #[test]
    fn test_distance_antipodal_is_finite() {
        // Exactly opposite points: half the Earth's circumference, and the
        // clamp keeps the intermediate inside the sqrt domain
        let d = haversine_distance(&pt(0.0, 0.0), &pt(0.0, 180.0));
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!(d.is_finite());
        assert!((d - half_circumference).abs() < 1.0);

        let d = haversine_distance(&pt(45.0, 10.0), &pt(-45.0, -170.0));
        assert!(d.is_finite());
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        assert!((initial_bearing(&pt(0.0, 0.0), &pt(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((initial_bearing(&pt(0.0, 0.0), &pt(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((initial_bearing(&pt(1.0, 0.0), &pt(0.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((initial_bearing(&pt(0.0, 1.0), &pt(0.0, 0.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_always_in_range() {
        let points = [
            pt(32.763, -117.2137),
            pt(32.7635, -117.2142),
            pt(-33.9, 151.2),
            pt(51.5, -0.13),
        ];
        for a in &points {
            for b in &points {
                let brg = initial_bearing(a, b);
                assert!((0.0..360.0).contains(&brg), "bearing {} out of range", brg);
            }
        }
    }

    #[test]
    fn test_bearing_identical_points_is_zero() {
        let a = pt(32.763, -117.213);
        assert_eq!(initial_bearing(&a, &a), 0.0);
    }

    #[test]
    fn test_bearing_course_fixture() {
        let gate = pt(32.76300740, -117.21375030);
        let sw = pt(32.76304460, -117.21412720);
        assert!((initial_bearing(&gate, &sw) - 276.69).abs() < 0.01);
    }

    #[test]
    fn test_bearing_error_naive_vs_circular() {
        // Away from the wraparound the two modes agree
        assert_eq!(bearing_error(100.0, 90.0, false), 10.0);
        assert_eq!(bearing_error(100.0, 90.0, true), 10.0);

        // Near 0/360 the naive difference is inflated, circular is not
        assert_eq!(bearing_error(355.0, 5.0, false), 350.0);
        assert_eq!(bearing_error(355.0, 5.0, true), 10.0);
        assert_eq!(bearing_error(5.0, 355.0, true), 10.0);
    }

    #[test]
    fn test_polyline_length() {
        let points = vec![pt(0.0, 0.0), pt(0.0, 1.0), pt(1.0, 1.0)];
        let len = polyline_length(&points);
        assert!(len > 200_000.0);

        assert_eq!(polyline_length(&[pt(0.0, 0.0)]), 0.0);
        let empty: Vec<GeoPoint> = vec![];
        assert_eq!(polyline_length(&empty), 0.0);
    }
}
