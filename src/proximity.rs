//! Waypoint proximity analysis.
//!
//! For each reference point on the course, finds the track's closest
//! approach with a full linear scan. No early termination: the global
//! minimum can occur anywhere, including on a later lap after a near-miss.

use std::collections::HashMap;

use crate::geo_utils::haversine_distance;
use crate::{Course, GeoPoint};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Closest approach of a track to one reference point.
///
/// `closest_index` is `None` only for an empty track, in which case
/// `min_distance_m` holds the `f64::INFINITY` sentinel. Callers rendering
/// output must check the index rather than the distance.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProximityResult {
    /// Minimum distance to the reference point in meters.
    pub min_distance_m: f64,
    /// Sequence index of the closest track point.
    pub closest_index: Option<usize>,
}

impl ProximityResult {
    /// Whether the track had any points to scan.
    pub fn has_data(&self) -> bool {
        self.closest_index.is_some()
    }
}

/// Find the closest approach to every reference point on the course.
///
/// Scans the full track once per reference point, O(|track| × |course|).
/// The course is small (single-digit corner count) and tracks are bounded
/// single-flight logs, so the quadratic shape is fine in practice.
///
/// The returned map is keyed by reference-point name; if the course carries
/// duplicate names the later entry's result overwrites the earlier one.
///
/// # Example
/// ```
/// use pylon_analyzer::{analyze_proximity, Course, GeoPoint, ReferencePoint};
///
/// let course = Course::new(vec![ReferencePoint::new("NE", 32.76351600, -117.21344860)]).unwrap();
/// let track = vec![GeoPoint::new(32.76352, -117.21345, 40.0, 0)];
///
/// let results = analyze_proximity(&track, &course);
/// assert_eq!(results["NE"].closest_index, Some(0));
/// ```
pub fn analyze_proximity(track: &[GeoPoint], course: &Course) -> HashMap<String, ProximityResult> {
    course
        .points()
        .iter()
        .map(|rp| (rp.name.clone(), closest_approach(track, rp)))
        .collect()
}

/// Parallel variant of [`analyze_proximity`]: one rayon task per reference
/// point. Behaviorally identical; worthwhile when analyzing many corners
/// over long tracks.
#[cfg(feature = "parallel")]
pub fn analyze_proximity_parallel(
    track: &[GeoPoint],
    course: &Course,
) -> HashMap<String, ProximityResult> {
    course
        .points()
        .par_iter()
        .map(|rp| (rp.name.clone(), closest_approach(track, rp)))
        .collect()
}

fn closest_approach(track: &[GeoPoint], reference: &crate::ReferencePoint) -> ProximityResult {
    let mut min_distance_m = f64::INFINITY;
    let mut closest_index = None;

    for point in track {
        let dist = haversine_distance(point, reference);
        if dist < min_distance_m {
            min_distance_m = dist;
            closest_index = Some(point.index);
        }
    }

    ProximityResult {
        min_distance_m,
        closest_index,
    }
}
