//! Corner-pass detection and entry/exit bearing metrics.
//!
//! A "pass" is one discrete traversal of the track through a corner's
//! proximity zone. Points inside the search radius are grouped by sequence
//! index: a gap of `max_index_gap` or more positions between neighboring
//! in-radius points splits two passes, while smaller gaps are treated as
//! telemetry jitter inside a single physical pass.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::geo_utils::{bearing_error, haversine_distance, initial_bearing};
use crate::{AnalysisConfig, Course, GeoPoint, ReferencePoint};

/// A track point inside a proximity zone, with its distance to the corner
/// retained from the radius filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassPoint {
    /// Sequence index within the originating track.
    pub index: usize,
    pub point: GeoPoint,
    /// Distance to the reference point in meters.
    pub distance_m: f64,
}

/// One discrete traversal through a corner's proximity zone.
///
/// Points preserve original sequence order. Passes from a single detection
/// run never overlap and are ordered by the index of their first point.
///
/// Only [`detect_passes`] constructs these, which guarantees every pass
/// holds at least one point; the accessors below rely on that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerPass {
    points: Vec<PassPoint>,
}

impl CornerPass {
    /// The in-zone points in original sequence order (never empty).
    pub fn points(&self) -> &[PassPoint] {
        &self.points
    }
    /// Sequence index of the first point in the pass.
    pub fn first_index(&self) -> usize {
        self.points[0].index
    }

    /// Sequence index of the last point in the pass.
    pub fn last_index(&self) -> usize {
        self.points[self.points.len() - 1].index
    }

    /// The point of closest approach within the pass.
    pub fn closest_approach(&self) -> &PassPoint {
        self.points
            .iter()
            .min_by(|a, b| a.distance_m.total_cmp(&b.distance_m))
            .expect("a pass always has at least one point")
    }
}

/// Detect all passes of `track` through the proximity zone of `reference`.
///
/// Returns passes in ascending order of first-point index, possibly empty.
/// Fails fast on a non-positive radius or a zero gap; those are caller
/// bugs, not data conditions.
///
/// # Example
/// ```
/// use pylon_analyzer::{detect_passes, GeoPoint, ReferencePoint};
///
/// let ne = ReferencePoint::new("NE", 32.76351600, -117.21344860);
/// let track = vec![
///     GeoPoint::new(32.76352, -117.21346, 40.0, 0),
///     GeoPoint::new(32.76351, -117.21344, 40.0, 1),
/// ];
/// let passes = detect_passes(&track, &ne, 50.0, 10).unwrap();
/// assert_eq!(passes.len(), 1);
/// assert_eq!(passes[0].points().len(), 2);
/// ```
pub fn detect_passes(
    track: &[GeoPoint],
    reference: &ReferencePoint,
    search_radius_m: f64,
    max_index_gap: usize,
) -> Result<Vec<CornerPass>> {
    if !(search_radius_m > 0.0) {
        return Err(AnalysisError::InvalidParameter {
            parameter: "search_radius_m",
            message: format!("must be positive, got {}", search_radius_m),
        });
    }
    if max_index_gap == 0 {
        return Err(AnalysisError::InvalidParameter {
            parameter: "max_index_gap",
            message: "must be at least 1".to_string(),
        });
    }

    // Step 1: radius filter, keeping the computed distance per point
    let in_zone: Vec<PassPoint> = track
        .iter()
        .filter_map(|point| {
            let distance_m = haversine_distance(point, reference);
            (distance_m <= search_radius_m).then(|| PassPoint {
                index: point.index,
                point: *point,
                distance_m,
            })
        })
        .collect();

    if in_zone.is_empty() {
        return Ok(vec![]);
    }

    // Step 2: split into passes wherever the index gap reaches the threshold
    let mut passes = Vec::new();
    let mut current = vec![in_zone[0]];
    for window in in_zone.windows(2) {
        let gap = window[1].index - window[0].index;
        if gap >= max_index_gap {
            passes.push(CornerPass {
                points: std::mem::take(&mut current),
            });
        }
        current.push(window[1]);
    }
    passes.push(CornerPass { points: current });

    Ok(passes)
}

/// Ideal geometry of one corner: the inbound and outbound course legs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseGeometry {
    pub corner: ReferencePoint,
    pub previous: ReferencePoint,
    pub next: ReferencePoint,
    /// Length of the leg from the previous corner, in meters.
    pub inbound_distance_m: f64,
    /// Ideal bearing flying from the previous corner into this one.
    pub inbound_bearing: f64,
    /// Length of the leg to the next corner, in meters.
    pub outbound_distance_m: f64,
    /// Ideal bearing flying from this corner to the next.
    pub outbound_bearing: f64,
    /// Naive angle between the inbound and outbound legs.
    pub turn_angle: f64,
}

impl CourseGeometry {
    /// Resolve the geometry for a named corner on a closed-loop course.
    ///
    /// Returns `None` when the name is not on the loop or the loop is too
    /// small for adjacency; bearing analysis then degrades to
    /// proximity-only reporting rather than erroring.
    pub fn for_corner(course: &Course, name: &str) -> Option<Self> {
        let corner = course.get(name)?.clone();
        let (previous, next) = course.neighbors(name)?;
        let previous = previous.clone();
        let next = next.clone();

        let inbound_bearing = initial_bearing(&previous, &corner);
        let outbound_bearing = initial_bearing(&corner, &next);

        Some(Self {
            inbound_distance_m: haversine_distance(&previous, &corner),
            inbound_bearing,
            outbound_distance_m: haversine_distance(&corner, &next),
            outbound_bearing,
            turn_angle: (outbound_bearing - inbound_bearing).abs(),
            corner,
            previous,
            next,
        })
    }
}

/// Entry and exit bearing metrics for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PassBearings {
    /// Bearing from the previous corner to the pass's first point.
    pub entry_bearing: f64,
    /// Ideal bearing from the previous corner into this corner.
    pub ideal_entry_bearing: f64,
    pub entry_error: f64,
    /// Bearing from the pass's last point to the next corner.
    pub exit_bearing: f64,
    /// Ideal bearing from this corner to the next.
    pub ideal_exit_bearing: f64,
    pub exit_error: f64,
}

/// Compute entry/exit bearing errors for a pass against the ideal course
/// legs.
///
/// Entry compares `bearing(previous, first point)` to the inbound leg;
/// exit compares `bearing(last point, next)` to the outbound leg. Errors
/// use the naive absolute difference unless
/// `config.circular_bearing_error` is set (see
/// [`bearing_error`](crate::geo_utils::bearing_error)).
pub fn pass_bearings(
    pass: &CornerPass,
    geometry: &CourseGeometry,
    config: &AnalysisConfig,
) -> PassBearings {
    let first = &pass.points[0].point;
    let last = &pass.points[pass.points.len() - 1].point;
    let circular = config.circular_bearing_error;

    let entry_bearing = initial_bearing(&geometry.previous, first);
    let exit_bearing = initial_bearing(last, &geometry.next);

    PassBearings {
        entry_bearing,
        ideal_entry_bearing: geometry.inbound_bearing,
        entry_error: bearing_error(entry_bearing, geometry.inbound_bearing, circular),
        exit_bearing,
        ideal_exit_bearing: geometry.outbound_bearing,
        exit_error: bearing_error(exit_bearing, geometry.outbound_bearing, circular),
    }
}
