//! Normalized-stream contracts for track ingestion adapters.
//!
//! Container decoding (binary log schemas, KMZ/XML) lives outside this
//! crate; adapters implement [`TrackSource`]/[`EventSource`] and use the
//! helpers here to turn heterogeneous decoded records into the normalized
//! [`GeoPoint`] stream the analyzers consume:
//!
//! - [`FieldMap`] resolves which of several candidate field names a record
//!   type actually carries, once per type, instead of probing every record.
//! - [`TrackBuilder`] assigns sequence indices, validates coordinates, and
//!   gates on GPS fix quality.
//! - [`parse_coordinate_block`] handles KML-style `lon,lat[,alt]`
//!   coordinate text.

use std::collections::HashMap;

use log::{debug, info, warn};

use crate::error::{AnalysisError, Result};
use crate::events::{GpsFixQuality, TelemetryEvent};
use crate::GeoPoint;

/// An adapter that yields a normalized track.
///
/// Points must come out in strictly increasing sequence-index order with
/// finite latitude/longitude; altitude and timestamp may be absent.
pub trait TrackSource {
    fn decode_track(&mut self) -> Result<Vec<GeoPoint>>;
}

/// An adapter that yields a normalized telemetry event stream.
pub trait EventSource {
    fn decode_events(&mut self) -> Result<Vec<TelemetryEvent>>;
}

/// One decoded record's numeric fields, keyed by source field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub fields: HashMap<String, f64>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}

/// Prioritized candidate field names for each semantic value.
///
/// Telemetry formats disagree on naming (`Lat` vs `lat`, `Lng` vs `Lon`);
/// instead of probing every record, resolve the map once against a sample
/// record of each type and reuse the resulting [`ResolvedSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
    pub latitude: Vec<String>,
    pub longitude: Vec<String>,
    pub altitude: Vec<String>,
    pub timestamp: Vec<String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }
        Self {
            latitude: names(&["Lat", "lat", "latitude"]),
            longitude: names(&["Lng", "Lon", "lon", "longitude"]),
            altitude: names(&["Alt", "alt", "altitude"]),
            timestamp: names(&["TimeS", "time", "timestamp"]),
        }
    }
}

impl FieldMap {
    /// Resolve against a sample record, picking the highest-priority
    /// candidate present for each semantic value.
    ///
    /// Latitude and longitude are mandatory; altitude and timestamp resolve
    /// to `None` when no candidate is present.
    pub fn resolve(&self, sample: &RawRecord) -> Result<ResolvedSchema> {
        let pick = |candidates: &[String]| {
            candidates
                .iter()
                .find(|name| sample.fields.contains_key(*name))
                .cloned()
        };

        let latitude = pick(&self.latitude).ok_or_else(|| AnalysisError::FieldResolution {
            semantic: "latitude",
            candidates: self.latitude.clone(),
        })?;
        let longitude = pick(&self.longitude).ok_or_else(|| AnalysisError::FieldResolution {
            semantic: "longitude",
            candidates: self.longitude.clone(),
        })?;
        let altitude = pick(&self.altitude);
        let timestamp = pick(&self.timestamp);

        debug!(
            "Resolved record schema: lat={}, lon={}, alt={:?}, time={:?}",
            latitude, longitude, altitude, timestamp
        );

        Ok(ResolvedSchema {
            latitude,
            longitude,
            altitude,
            timestamp,
        })
    }
}

/// Concrete field names for one record type, produced by
/// [`FieldMap::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    pub latitude: String,
    pub longitude: String,
    pub altitude: Option<String>,
    pub timestamp: Option<String>,
}

impl ResolvedSchema {
    /// Extract the normalized values from a record of this type.
    ///
    /// Returns `None` when the record is missing its latitude or longitude
    /// field (a record of another type slipped through, or a sparse
    /// record); missing altitude defaults to 0.
    pub fn extract(&self, record: &RawRecord) -> Option<(f64, f64, f64, Option<f64>)> {
        let lat = record.get(&self.latitude)?;
        let lon = record.get(&self.longitude)?;
        let alt = self
            .altitude
            .as_ref()
            .and_then(|name| record.get(name))
            .unwrap_or(0.0);
        let ts = self.timestamp.as_ref().and_then(|name| record.get(name));
        Some((lat, lon, alt, ts))
    }
}

/// Accumulates normalized points, assigning strictly increasing sequence
/// indices and enforcing the ingestion contract (finite, in-range
/// coordinates; 3D-or-better fix when fix quality is known).
#[derive(Debug, Default)]
pub struct TrackBuilder {
    points: Vec<GeoPoint>,
    gated: usize,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a point, returning its assigned sequence index.
    pub fn push(&mut self, latitude: f64, longitude: f64, altitude: f64) -> Result<usize> {
        self.push_inner(latitude, longitude, altitude, None)
    }

    /// Append a point carrying a source timestamp in seconds.
    pub fn push_timestamped(
        &mut self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        timestamp: f64,
    ) -> Result<usize> {
        self.push_inner(latitude, longitude, altitude, Some(timestamp))
    }

    /// Append a point only if its GPS fix is 3D or better. Returns whether
    /// the point was kept.
    pub fn push_fixed(
        &mut self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        fix: GpsFixQuality,
    ) -> Result<bool> {
        if !fix.has_3d_fix() {
            self.gated += 1;
            return Ok(false);
        }
        self.push_inner(latitude, longitude, altitude, None)?;
        Ok(true)
    }

    fn push_inner(
        &mut self,
        latitude: f64,
        longitude: f64,
        altitude: f64,
        timestamp: Option<f64>,
    ) -> Result<usize> {
        let index = self.points.len();
        let mut point = GeoPoint::new(latitude, longitude, altitude, index);
        point.timestamp = timestamp;
        if !point.is_valid() {
            return Err(AnalysisError::InvalidCoordinates {
                index,
                message: format!("lat={}, lon={}", latitude, longitude),
            });
        }
        self.points.push(point);
        Ok(index)
    }

    /// Number of samples dropped by fix-quality gating so far.
    pub fn gated(&self) -> usize {
        self.gated
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Finish the track.
    pub fn finish(self) -> Vec<GeoPoint> {
        info!(
            "Ingested {} track points ({} gated on fix quality)",
            self.points.len(),
            self.gated
        );
        self.points
    }
}

/// Parse a KML-style coordinate block: whitespace-separated
/// `lon,lat[,alt]` entries.
///
/// Malformed entries are skipped with a warning rather than aborting the
/// track, matching how exported tracks with stray tokens have historically
/// been handled.
pub fn parse_coordinate_block(text: &str) -> Result<Vec<GeoPoint>> {
    let mut builder = TrackBuilder::new();
    let mut skipped = 0usize;

    for entry in text.split_whitespace() {
        let parts: Vec<&str> = entry.split(',').collect();
        if parts.len() < 2 {
            skipped += 1;
            continue;
        }
        let lon: f64 = match parts[0].parse() {
            Ok(v) => v,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        let lat: f64 = match parts[1].parse() {
            Ok(v) => v,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        let alt: f64 = parts
            .get(2)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        builder.push(lat, lon, alt)?;
    }

    if skipped > 0 {
        warn!("Skipped {} malformed coordinate entries", skipped);
    }

    Ok(builder.finish())
}
