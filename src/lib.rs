//! # Pylon Analyzer
//!
//! Flight-track analysis for fixed-course pylon racing.
//!
//! This library takes a normalized GPS point stream (produced by external
//! log/track decoders) and evaluates how closely the flown path matches a
//! reference course defined by named waypoints ("gates"/corners):
//!
//! - Closest approach to every reference point
//! - Detection and grouping of distinct passes through a corner's
//!   proximity zone
//! - Entry/exit bearing errors against the ideal course legs
//! - Telemetry event scanning (mode changes, script messages, errors)
//!
//! ## Quick Start
//!
//! ```rust
//! use pylon_analyzer::{analyze_proximity, Course, GeoPoint, ReferencePoint};
//!
//! let course = Course::new(vec![
//!     ReferencePoint::new("GATE", 32.76300740, -117.21375030),
//!     ReferencePoint::new("SW", 32.76304460, -117.21412720),
//! ]).unwrap();
//!
//! let track = vec![
//!     GeoPoint::new(32.76301, -117.21376, 30.0, 0),
//!     GeoPoint::new(32.76305, -117.21410, 31.0, 1),
//! ];
//!
//! let results = analyze_proximity(&track, &course);
//! assert!(results["GATE"].min_distance_m < 5.0);
//! ```
//!
//! ## Features
//!
//! - **`parallel`** - Parallel proximity scans across reference points
//!   with rayon (identical results, pure optimization)

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{AnalysisError, Result};

// Geographic utilities (distance, bearing, polyline length)
pub mod geo_utils;
pub use geo_utils::{bearing_error, haversine_distance, initial_bearing, polyline_length};

// Waypoint proximity analysis
pub mod proximity;
pub use proximity::{analyze_proximity, ProximityResult};
#[cfg(feature = "parallel")]
pub use proximity::analyze_proximity_parallel;

// Corner-pass detection and bearing metrics
pub mod passes;
pub use passes::{
    detect_passes, pass_bearings, CornerPass, CourseGeometry, PassBearings, PassPoint,
};

// Telemetry event scanning (mode changes, script messages, GPS quality)
pub mod events;
pub use events::{
    scan_events, summarize_gps_quality, summarize_nav_targets, EventFilter, EventReport,
    GpsFixQuality, GpsQualityStats, GpsSample, Issue, IssueKind, ModeChange, NavSample,
    NavTargetSummary, StatusMessage, TelemetryEvent,
};

// Normalized-stream contracts for ingestion adapters
pub mod ingest;
pub use ingest::{
    parse_coordinate_block, EventSource, FieldMap, RawRecord, ResolvedSchema, TrackBuilder,
    TrackSource,
};

// Structured report assembly for the presentation layer
pub mod report;
pub use report::{analyze_course, corner_detail, CornerReport, FlightReport, PassReport};

// ============================================================================
// Core Types
// ============================================================================

/// Anything with a geographic position in decimal degrees.
///
/// Implemented by both [`GeoPoint`] (track samples) and [`ReferencePoint`]
/// (course corners) so the geodesy utilities work across the two.
pub trait LatLon {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

/// A single normalized track sample.
///
/// `index` is the sample's 0-based position in the originating track and is
/// strictly increasing; pass grouping keys off it rather than off the
/// timestamp, which some sources do not carry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude in meters (zero when the source does not provide it).
    pub altitude: f64,
    /// Sequence index within the originating track.
    pub index: usize,
    /// Source timestamp in seconds, when available.
    pub timestamp: Option<f64>,
}

impl GeoPoint {
    /// Create a new track point without a timestamp.
    pub fn new(latitude: f64, longitude: f64, altitude: f64, index: usize) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
            index,
            timestamp: None,
        }
    }

    /// Attach a source timestamp (seconds).
    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Check that the point has finite, in-range coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

impl LatLon for GeoPoint {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A fixed, named geographic location defining part of the race course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Unique name within a course (e.g. "GATE", "NE").
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ReferencePoint {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
        }
    }
}

impl LatLon for ReferencePoint {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// An ordered closed loop of reference points.
///
/// Ordering matters only for adjacency: the previous point of the first
/// element wraps to the last and the next point of the last wraps to the
/// first. Names are expected to be unique; lookups return the first match,
/// so a duplicate name shadows later entries rather than being deduped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    points: Vec<ReferencePoint>,
}

impl Course {
    /// Create a course from an ordered loop of reference points.
    ///
    /// Fails on an empty point list; a course needs at least one corner.
    pub fn new(points: Vec<ReferencePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(AnalysisError::InvalidCourse {
                message: "course must have at least one reference point".to_string(),
            });
        }
        Ok(Self { points })
    }

    /// All reference points in loop order.
    pub fn points(&self) -> &[ReferencePoint] {
        &self.points
    }

    /// Number of reference points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Look up a reference point by name (first match).
    pub fn get(&self, name: &str) -> Option<&ReferencePoint> {
        self.points.iter().find(|p| p.name == name)
    }

    /// The previous and next reference points on the closed loop, for
    /// adjacency-based bearing analysis. Returns `None` when the name is
    /// not part of the loop or when the loop has a single point (a corner
    /// cannot neighbor itself meaningfully).
    pub fn neighbors(&self, name: &str) -> Option<(&ReferencePoint, &ReferencePoint)> {
        if self.points.len() < 2 {
            return None;
        }
        let idx = self.points.iter().position(|p| p.name == name)?;
        let prev = &self.points[(idx + self.points.len() - 1) % self.points.len()];
        let next = &self.points[(idx + 1) % self.points.len()];
        Some((prev, next))
    }
}

/// Tunable parameters for corner-pass detection and report assembly.
///
/// Defaults match the thresholds used for historical race analysis; the
/// index gap in particular depends on the source sampling rate and should
/// be adjusted for sparsely-sampled tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Radius of a corner's proximity zone in meters.
    /// Default: 50.0
    pub search_radius_m: f64,

    /// Minimum sequence-index gap between in-radius points that splits two
    /// passes. Gaps smaller than this are treated as jitter within a single
    /// physical pass. Default: 10
    pub max_index_gap: usize,

    /// Closest-approach distance below which a corner counts as flown
    /// cleanly. Default: 15.0 meters
    pub validation_threshold_m: f64,

    /// Use shortest circular distance for bearing errors instead of the
    /// naive absolute difference. Off by default to keep parity with
    /// historical reports, which overstate errors near 0°/360°.
    /// Default: false
    pub circular_bearing_error: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            search_radius_m: 50.0,
            max_index_gap: 10,
            validation_threshold_m: 15.0,
            circular_bearing_error: false,
        }
    }
}

impl AnalysisConfig {
    /// Fail fast on parameters outside their valid range.
    pub fn validate(&self) -> Result<()> {
        if !(self.search_radius_m > 0.0) {
            return Err(AnalysisError::InvalidParameter {
                parameter: "search_radius_m",
                message: format!("must be positive, got {}", self.search_radius_m),
            });
        }
        if self.max_index_gap == 0 {
            return Err(AnalysisError::InvalidParameter {
                parameter: "max_index_gap",
                message: "must be at least 1".to_string(),
            });
        }
        if !(self.validation_threshold_m > 0.0) {
            return Err(AnalysisError::InvalidParameter {
                parameter: "validation_threshold_m",
                message: format!("must be positive, got {}", self.validation_threshold_m),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_validity() {
        assert!(GeoPoint::new(32.763, -117.213, 30.0, 0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, -117.213, 30.0, 0).is_valid());
        assert!(!GeoPoint::new(91.0, -117.213, 30.0, 0).is_valid());
        assert!(!GeoPoint::new(32.763, -181.0, 30.0, 0).is_valid());
    }

    #[test]
    fn test_geo_point_timestamp() {
        let p = GeoPoint::new(32.763, -117.213, 30.0, 7).with_timestamp(12.5);
        assert_eq!(p.timestamp, Some(12.5));
        assert_eq!(p.index, 7);
    }

    #[test]
    fn test_course_requires_points() {
        assert!(matches!(
            Course::new(vec![]),
            Err(AnalysisError::InvalidCourse { .. })
        ));
    }

    #[test]
    fn test_course_lookup() {
        let course = Course::new(vec![
            ReferencePoint::new("A", 0.0, 0.0),
            ReferencePoint::new("B", 1.0, 0.0),
        ])
        .unwrap();
        assert_eq!(course.get("B").unwrap().latitude, 1.0);
        assert!(course.get("C").is_none());
    }

    #[test]
    fn test_course_neighbors_wrap_around() {
        let course = Course::new(vec![
            ReferencePoint::new("GATE", 0.0, 0.0),
            ReferencePoint::new("SW", 0.0, 1.0),
            ReferencePoint::new("NW", 1.0, 1.0),
        ])
        .unwrap();

        let (prev, next) = course.neighbors("GATE").unwrap();
        assert_eq!(prev.name, "NW");
        assert_eq!(next.name, "SW");

        let (prev, next) = course.neighbors("NW").unwrap();
        assert_eq!(prev.name, "SW");
        assert_eq!(next.name, "GATE");

        assert!(course.neighbors("XX").is_none());
    }

    #[test]
    fn test_course_single_point_has_no_neighbors() {
        let course = Course::new(vec![ReferencePoint::new("ONLY", 0.0, 0.0)]).unwrap();
        assert!(course.neighbors("ONLY").is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(AnalysisConfig::default().validate().is_ok());

        let bad = AnalysisConfig {
            search_radius_m: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(AnalysisError::InvalidParameter {
                parameter: "search_radius_m",
                ..
            })
        ));

        let bad = AnalysisConfig {
            max_index_gap: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = AnalysisConfig {
            validation_threshold_m: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
