//! End-to-end analysis of a synthetic two-lap flight around the SEFSD
//! T-28 course.

use pylon_analyzer::{
    analyze_course, analyze_proximity, corner_detail, scan_events, summarize_gps_quality,
    AnalysisConfig, Course, EventFilter, FlightReport, GeoPoint, GpsSample, IssueKind,
    ReferencePoint, TelemetryEvent, TrackBuilder,
};

fn sefsd_course() -> Course {
    Course::new(vec![
        ReferencePoint::new("GATE", 32.76300740, -117.21375030),
        ReferencePoint::new("SW", 32.76304460, -117.21412720),
        ReferencePoint::new("NW", 32.76338970, -117.21420500),
        ReferencePoint::new("NE", 32.76351600, -117.21344860),
        ReferencePoint::new("SE", 32.76310780, -117.21337620),
    ])
    .unwrap()
}

/// Fly `laps` laps around the course, sampling each leg with
/// `points_per_leg` linearly interpolated points.
fn fly_laps(course: &Course, laps: usize, points_per_leg: usize) -> Vec<GeoPoint> {
    let corners = course.points();
    let mut builder = TrackBuilder::new();

    for _ in 0..laps {
        for leg in 0..corners.len() {
            let from = &corners[leg];
            let to = &corners[(leg + 1) % corners.len()];
            for step in 0..points_per_leg {
                let t = step as f64 / points_per_leg as f64;
                let lat = from.latitude + t * (to.latitude - from.latitude);
                let lon = from.longitude + t * (to.longitude - from.longitude);
                builder.push(lat, lon, 40.0).unwrap();
            }
        }
    }

    builder.finish()
}

fn tight_config() -> AnalysisConfig {
    // Radius below the ~35 m pylon spacing so adjacent proximity zones
    // do not overlap
    AnalysisConfig {
        search_radius_m: 20.0,
        ..Default::default()
    }
}

#[test]
fn two_lap_flight_hits_every_corner() {
    let course = sefsd_course();
    let track = fly_laps(&course, 2, 20);
    assert_eq!(track.len(), 200);

    let results = analyze_proximity(&track, &course);
    for corner in course.points() {
        let result = &results[&corner.name];
        assert!(result.has_data());
        assert!(
            result.min_distance_m < 5.0,
            "{} closest approach {:.1}m",
            corner.name,
            result.min_distance_m
        );
    }
}

#[test]
fn two_lap_flight_pass_structure() {
    let course = sefsd_course();
    let track = fly_laps(&course, 2, 20);
    let report = analyze_course(&track, &course, &tight_config()).unwrap();

    // Middle corners are rounded once per lap. The GATE is special: the
    // track starts there, crosses it again between laps (one contiguous
    // pass), and finishes approaching it.
    for name in ["SW", "NW", "NE", "SE"] {
        let corner = report.corner(name).unwrap();
        assert_eq!(corner.passes.len(), 2, "{} pass count", name);
        assert_eq!(corner.within_threshold, Some(true));
    }
    assert_eq!(report.corner("GATE").unwrap().passes.len(), 3);

    // Passes are ordered and disjoint across the whole report
    for corner in &report.corners {
        for pair in corner.passes.windows(2) {
            assert!(pair[0].last_index < pair[1].first_index);
        }
    }
}

#[test]
fn two_lap_flight_bearing_errors_are_small() {
    // The synthetic track flies straight down each leg, so entry and exit
    // bearings should sit close to the ideal course geometry
    let course = sefsd_course();
    let track = fly_laps(&course, 2, 20);
    let report = analyze_course(&track, &course, &tight_config()).unwrap();

    for name in ["SW", "NW", "NE", "SE"] {
        let corner = report.corner(name).unwrap();
        for pass in &corner.passes {
            let bearings = pass.bearings.as_ref().expect("course loop has adjacency");
            assert!(
                bearings.entry_error < 10.0,
                "{} entry error {:.1}",
                name,
                bearings.entry_error
            );
            assert!(
                bearings.exit_error < 10.0,
                "{} exit error {:.1}",
                name,
                bearings.exit_error
            );
        }
    }
}

#[test]
fn corner_detail_matches_full_report() {
    let course = sefsd_course();
    let track = fly_laps(&course, 2, 20);
    let config = tight_config();

    let report = analyze_course(&track, &course, &config).unwrap();
    let detail = corner_detail(&track, &course, "NE", &config).unwrap();
    assert_eq!(report.corner("NE").unwrap(), &detail);

    let geometry = detail.geometry.unwrap();
    assert_eq!(geometry.previous.name, "NW");
    assert_eq!(geometry.next.name, "SE");
    assert!((geometry.inbound_distance_m - 72.1).abs() < 0.5);
}

#[test]
fn report_round_trips_through_json() {
    let course = sefsd_course();
    let track = fly_laps(&course, 1, 10);
    let report = analyze_course(&track, &course, &tight_config()).unwrap();

    let json = serde_json::to_string(&report).unwrap();
    let parsed: FlightReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn telemetry_stream_classification() {
    let events = vec![
        TelemetryEvent::Mode {
            timestamp: 0.5,
            mode: "MANUAL".into(),
        },
        TelemetryEvent::Mode {
            timestamp: 10.0,
            mode: "AUTO".into(),
        },
        TelemetryEvent::Message {
            timestamp: 12.0,
            text: "PYLON: race started".into(),
        },
        TelemetryEvent::Message {
            timestamp: 45.0,
            text: "PYLON: LAP 1 time 33.2s".into(),
        },
        TelemetryEvent::Message {
            timestamp: 50.0,
            text: "Baro calibration complete".into(),
        },
        TelemetryEvent::Error {
            timestamp: 60.0,
            subsystem: 11,
            code: 2,
        },
    ];

    let report = scan_events(&events, &EventFilter::default());
    assert_eq!(report.mode_changes.len(), 2);
    assert_eq!(report.script_messages.len(), 2);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueKind::Error);

    let samples = vec![
        GpsSample {
            status: 3,
            num_sats: 11,
            hdop: 1.1,
        },
        GpsSample {
            status: 4,
            num_sats: 14,
            hdop: 0.8,
        },
    ];
    let stats = summarize_gps_quality(&samples);
    assert_eq!(stats.fix_3d, 1);
    assert_eq!(stats.dgps, 1);
    assert_eq!(stats.max_sats, Some(14));
}
