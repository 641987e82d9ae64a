//! Telemetry event scanning.
//!
//! Classifies a decoded event stream into mode changes, script status
//! messages matching course keywords, and error/warning events, each tagged
//! with its source timestamp. Also buckets GPS fix-quality samples into
//! tiers and interval-samples navigation-target records. Pure
//! filter-and-collect; no geometry involved.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// One decoded telemetry event, as produced by an external log decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    /// Flight mode change.
    Mode { timestamp: f64, mode: String },
    /// Free-text status message (script output, GCS text).
    Message { timestamp: f64, text: String },
    /// Error event with subsystem and error code.
    Error {
        timestamp: f64,
        subsystem: u8,
        code: u8,
    },
}

impl TelemetryEvent {
    pub fn timestamp(&self) -> f64 {
        match self {
            TelemetryEvent::Mode { timestamp, .. }
            | TelemetryEvent::Message { timestamp, .. }
            | TelemetryEvent::Error { timestamp, .. } => *timestamp,
        }
    }
}

/// Keyword filters for classifying free-text messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFilter {
    /// A message containing any of these (case-insensitive) is collected
    /// as course-relevant script output.
    pub script_keywords: Vec<String>,
    /// A message containing any of these is collected as a warning.
    pub warning_keywords: Vec<String>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            script_keywords: ["PYLON", "LAP", "RACE", "GATE"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            warning_keywords: ["ERROR", "FAIL", "WARNING", "ERR"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl EventFilter {
    fn matches_script(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        self.script_keywords.iter().any(|k| upper.contains(k))
    }

    fn matches_warning(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        self.warning_keywords.iter().any(|k| upper.contains(k))
    }
}

/// A flight mode change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeChange {
    pub timestamp: f64,
    pub mode: String,
}

/// A course-relevant script message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub timestamp: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueKind {
    Error,
    Warning,
}

/// An error event or warning-keyword message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub timestamp: f64,
    pub kind: IssueKind,
    pub message: String,
}

/// Classified view of a telemetry event stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventReport {
    pub mode_changes: Vec<ModeChange>,
    pub script_messages: Vec<StatusMessage>,
    pub issues: Vec<Issue>,
}

/// Scan a decoded event stream and classify entries.
///
/// A single message can appear both as script output and as a warning when
/// it matches both keyword sets (e.g. "PYLON: GPS ERROR").
///
/// # Example
/// ```
/// use pylon_analyzer::{scan_events, EventFilter, TelemetryEvent};
///
/// let events = vec![
///     TelemetryEvent::Mode { timestamp: 1.0, mode: "AUTO".into() },
///     TelemetryEvent::Message { timestamp: 2.0, text: "PYLON: lap 1 started".into() },
/// ];
/// let report = scan_events(&events, &EventFilter::default());
/// assert_eq!(report.mode_changes.len(), 1);
/// assert_eq!(report.script_messages.len(), 1);
/// ```
pub fn scan_events(events: &[TelemetryEvent], filter: &EventFilter) -> EventReport {
    let mut report = EventReport::default();

    for event in events {
        match event {
            TelemetryEvent::Mode { timestamp, mode } => {
                report.mode_changes.push(ModeChange {
                    timestamp: *timestamp,
                    mode: mode.clone(),
                });
            }
            TelemetryEvent::Message { timestamp, text } => {
                if filter.matches_script(text) {
                    report.script_messages.push(StatusMessage {
                        timestamp: *timestamp,
                        text: text.clone(),
                    });
                }
                if filter.matches_warning(text) {
                    report.issues.push(Issue {
                        timestamp: *timestamp,
                        kind: IssueKind::Warning,
                        message: text.clone(),
                    });
                }
            }
            TelemetryEvent::Error {
                timestamp,
                subsystem,
                code,
            } => {
                report.issues.push(Issue {
                    timestamp: *timestamp,
                    kind: IssueKind::Error,
                    message: format!("Subsys={}, ECode={}", subsystem, code),
                });
            }
        }
    }

    report
}

// ============================================================================
// Navigation targets
// ============================================================================

/// One normalized navigation-target record: where the autopilot was trying
/// to go and how far off it was.
///
/// Telemetry formats carry these values under varying field names (or not
/// at all); ingestion adapters resolve that into the optional fields here,
/// typically via [`FieldMap`](crate::ingest::FieldMap).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NavSample {
    pub timestamp: f64,
    /// Distance to the target waypoint in meters.
    pub wp_distance_m: Option<f64>,
    /// Difference between commanded and target bearing in degrees.
    pub bearing_error_deg: Option<f64>,
    /// Altitude error in meters.
    pub altitude_error_m: Option<f64>,
}

/// Interval-sampled view of a navigation-target stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavTargetSummary {
    /// Records kept by interval sampling, in source order.
    pub samples: Vec<NavSample>,
    /// Mean waypoint distance over kept samples reporting one.
    pub avg_wp_distance_m: Option<f64>,
    /// Mean absolute bearing error over kept samples reporting one.
    pub avg_bearing_error_deg: Option<f64>,
    /// Mean absolute altitude error over kept samples reporting one.
    pub avg_altitude_error_m: Option<f64>,
}

/// Downsample a navigation-target stream to roughly one record per
/// `interval_s` seconds and average the reported errors.
///
/// Navigation records arrive at full telemetry rate; for reporting, one
/// sample every couple of seconds is plenty. The first record is always
/// kept, then any record closer than `interval_s` to the last kept one is
/// dropped. Fields absent from a record simply do not contribute to the
/// averages. Fails fast on a non-positive interval.
pub fn summarize_nav_targets(records: &[NavSample], interval_s: f64) -> Result<NavTargetSummary> {
    if !(interval_s > 0.0) {
        return Err(AnalysisError::InvalidParameter {
            parameter: "interval_s",
            message: format!("must be positive, got {}", interval_s),
        });
    }

    let mut summary = NavTargetSummary::default();
    let mut last_kept = f64::NEG_INFINITY;
    let mut wp_sum = 0.0;
    let mut wp_count = 0u32;
    let mut brg_sum = 0.0;
    let mut brg_count = 0u32;
    let mut alt_sum = 0.0;
    let mut alt_count = 0u32;

    for record in records {
        if record.timestamp - last_kept < interval_s {
            continue;
        }
        last_kept = record.timestamp;

        if let Some(d) = record.wp_distance_m {
            wp_sum += d;
            wp_count += 1;
        }
        if let Some(e) = record.bearing_error_deg {
            brg_sum += e.abs();
            brg_count += 1;
        }
        if let Some(e) = record.altitude_error_m {
            alt_sum += e.abs();
            alt_count += 1;
        }
        summary.samples.push(*record);
    }

    if wp_count > 0 {
        summary.avg_wp_distance_m = Some(wp_sum / wp_count as f64);
    }
    if brg_count > 0 {
        summary.avg_bearing_error_deg = Some(brg_sum / brg_count as f64);
    }
    if alt_count > 0 {
        summary.avg_altitude_error_m = Some(alt_sum / alt_count as f64);
    }

    Ok(summary)
}

// ============================================================================
// GPS fix quality
// ============================================================================

/// GPS fix-quality tier, decoded from the numeric status code carried in
/// telemetry GPS records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpsFixQuality {
    NoFix,
    Fix2D,
    Fix3D,
    Dgps,
    RtkFloat,
    RtkFixed,
}

impl GpsFixQuality {
    /// Decode a raw status code. Unknown codes below 2 map to `NoFix` and
    /// codes above 6 to `RtkFixed`, matching how autopilot firmwares extend
    /// the scale upward.
    pub fn from_status(status: u8) -> Self {
        match status {
            0 | 1 => GpsFixQuality::NoFix,
            2 => GpsFixQuality::Fix2D,
            3 => GpsFixQuality::Fix3D,
            4 => GpsFixQuality::Dgps,
            5 => GpsFixQuality::RtkFloat,
            _ => GpsFixQuality::RtkFixed,
        }
    }

    /// Whether this fix is good enough for position analysis (3D or
    /// better).
    pub fn has_3d_fix(&self) -> bool {
        !matches!(self, GpsFixQuality::NoFix | GpsFixQuality::Fix2D)
    }
}

/// One GPS quality sample from the decoded stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsSample {
    pub status: u8,
    pub num_sats: u8,
    pub hdop: f64,
}

/// Aggregated GPS signal quality over a flight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpsQualityStats {
    pub total_samples: u32,
    pub no_fix: u32,
    pub fix_2d: u32,
    pub fix_3d: u32,
    pub dgps: u32,
    pub rtk_float: u32,
    pub rtk_fixed: u32,
    /// Average satellite count over samples that saw any satellites.
    pub avg_sats: Option<f64>,
    pub min_sats: Option<u8>,
    pub max_sats: Option<u8>,
    /// Average HDOP over samples reporting one (lower is better).
    pub avg_hdop: Option<f64>,
}

/// Bucket GPS samples into fix-quality tiers and accumulate satellite and
/// HDOP statistics. Zero satellite counts and zero HDOP readings are
/// treated as "not reported" and excluded from the averages.
pub fn summarize_gps_quality(samples: &[GpsSample]) -> GpsQualityStats {
    let mut stats = GpsQualityStats::default();
    let mut sat_sum: u64 = 0;
    let mut sat_count: u32 = 0;
    let mut hdop_sum: f64 = 0.0;
    let mut hdop_count: u32 = 0;

    for sample in samples {
        stats.total_samples += 1;
        match GpsFixQuality::from_status(sample.status) {
            GpsFixQuality::NoFix => stats.no_fix += 1,
            GpsFixQuality::Fix2D => stats.fix_2d += 1,
            GpsFixQuality::Fix3D => stats.fix_3d += 1,
            GpsFixQuality::Dgps => stats.dgps += 1,
            GpsFixQuality::RtkFloat => stats.rtk_float += 1,
            GpsFixQuality::RtkFixed => stats.rtk_fixed += 1,
        }

        if sample.num_sats > 0 {
            sat_sum += sample.num_sats as u64;
            sat_count += 1;
            stats.min_sats = Some(stats.min_sats.map_or(sample.num_sats, |m| m.min(sample.num_sats)));
            stats.max_sats = Some(stats.max_sats.map_or(sample.num_sats, |m| m.max(sample.num_sats)));
        }
        if sample.hdop > 0.0 {
            hdop_sum += sample.hdop;
            hdop_count += 1;
        }
    }

    if sat_count > 0 {
        stats.avg_sats = Some(sat_sum as f64 / sat_count as f64);
    }
    if hdop_count > 0 {
        stats.avg_hdop = Some(hdop_sum / hdop_count as f64);
    }

    stats
}
