//! Structured report assembly.
//!
//! Runs the proximity and pass analyzers over a full course and packages
//! the results as plain serializable data. Nothing here prints; rendering
//! (text tables, charts) belongs to the presentation layer.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::passes::{detect_passes, pass_bearings, CourseGeometry, PassBearings};
use crate::proximity::analyze_proximity;
use crate::{AnalysisConfig, Course, GeoPoint};

/// Metrics for one detected pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    /// Sequence index of the first point in the pass.
    pub first_index: usize,
    /// Sequence index of the last point in the pass.
    pub last_index: usize,
    /// Number of in-zone points.
    pub point_count: usize,
    /// Closest approach within the pass, in meters.
    pub closest_distance_m: f64,
    /// Sequence index of the closest-approach point.
    pub closest_index: usize,
    /// Whether the closest approach beat the validation threshold.
    pub within_threshold: bool,
    /// Entry/exit bearing metrics; absent when the corner has no
    /// resolvable neighbors on the course loop.
    pub bearings: Option<PassBearings>,
}

/// Full analysis of one corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerReport {
    pub name: String,
    /// Closest approach over the whole track; `None` for an empty track.
    pub min_distance_m: Option<f64>,
    /// Sequence index of the overall closest point; `None` for an empty
    /// track.
    pub closest_index: Option<usize>,
    /// Whether the closest approach beat the validation threshold; `None`
    /// for an empty track.
    pub within_threshold: Option<bool>,
    /// Ideal course geometry, when adjacency resolves.
    pub geometry: Option<CourseGeometry>,
    /// Detected passes in sequence order.
    pub passes: Vec<PassReport>,
}

/// Analysis of a whole flight against a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightReport {
    /// Number of track points analyzed.
    pub point_count: usize,
    /// Per-corner reports in course loop order.
    pub corners: Vec<CornerReport>,
}

impl FlightReport {
    /// Whether the track had any points at all.
    pub fn has_data(&self) -> bool {
        self.point_count > 0
    }

    /// Look up a corner report by name.
    pub fn corner(&self, name: &str) -> Option<&CornerReport> {
        self.corners.iter().find(|c| c.name == name)
    }
}

/// Analyze a full flight against a course.
///
/// Combines proximity analysis and per-corner pass detection into one
/// serializable report. An empty track is not an error: every corner
/// reports the no-data variant and callers decide how to render it.
///
/// Fails fast on invalid configuration parameters.
pub fn analyze_course(
    track: &[GeoPoint],
    course: &Course,
    config: &AnalysisConfig,
) -> Result<FlightReport> {
    config.validate()?;

    info!(
        "Analyzing {} track points against {} reference points",
        track.len(),
        course.len()
    );

    let proximity = analyze_proximity(track, course);

    let mut corners = Vec::with_capacity(course.len());
    for reference in course.points() {
        let result = proximity
            .get(&reference.name)
            .copied()
            .ok_or_else(|| AnalysisError::UnknownReferencePoint {
                name: reference.name.clone(),
            })?;

        let geometry = CourseGeometry::for_corner(course, &reference.name);
        let passes = detect_passes(track, reference, config.search_radius_m, config.max_index_gap)?;
        debug!("{}: {} passes", reference.name, passes.len());

        let pass_reports = passes
            .iter()
            .map(|pass| {
                let closest = pass.closest_approach();
                PassReport {
                    first_index: pass.first_index(),
                    last_index: pass.last_index(),
                    point_count: pass.points().len(),
                    closest_distance_m: closest.distance_m,
                    closest_index: closest.index,
                    within_threshold: closest.distance_m < config.validation_threshold_m,
                    bearings: geometry.as_ref().map(|g| pass_bearings(pass, g, config)),
                }
            })
            .collect();

        corners.push(CornerReport {
            name: reference.name.clone(),
            min_distance_m: result.has_data().then_some(result.min_distance_m),
            closest_index: result.closest_index,
            within_threshold: result
                .has_data()
                .then(|| result.min_distance_m < config.validation_threshold_m),
            geometry,
            passes: pass_reports,
        });
    }

    Ok(FlightReport {
        point_count: track.len(),
        corners,
    })
}

/// Focused analysis of a single named corner.
///
/// Unlike [`analyze_course`], asking for a corner that is not part of the
/// course is an explicit error rather than silent null geometry.
pub fn corner_detail(
    track: &[GeoPoint],
    course: &Course,
    name: &str,
    config: &AnalysisConfig,
) -> Result<CornerReport> {
    if course.get(name).is_none() {
        return Err(AnalysisError::UnknownReferencePoint {
            name: name.to_string(),
        });
    }
    let report = analyze_course(track, course, config)?;
    report
        .corners
        .into_iter()
        .find(|c| c.name == name)
        .ok_or_else(|| AnalysisError::UnknownReferencePoint {
            name: name.to_string(),
        })
}
