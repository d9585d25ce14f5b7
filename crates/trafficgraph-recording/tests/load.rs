//! Loading recordings from JSON files.

use std::io::Write;
use tempfile::NamedTempFile;
use trafficgraph_recording::{
    LaneType, Lifetime, Recording, RecordingError, RoadUserType, SignRef, StateValue,
};

const RECORDING: &str = r#"{
    "timestamps": [0.0, 0.04, 0.08, 0.12],
    "road_users": {
        "3": {
            "id": 3,
            "type": "bicycle",
            "birth": 1,
            "end": 3,
            "trajectory": {"pos_x": [1.0, 2.0, 3.0], "pos_y": [0.0, 0.0, 0.0]},
            "vehicle_lights": {"brake_lights": [-1, 0, 1]}
        }
    },
    "roads": {
        "1": {
            "location": "urban",
            "lanes": {"0": {"type": "sidewalk", "polygon": [[0, 0], [1, 0], [1, 1]]}},
            "signs": {"2": {"type": "traffic_light", "position": [0.5, 0.5, 2.0]}}
        }
    },
    "states": {"5": {"sign": {"road": 1, "sign": 2}, "values": ["red", "red_amber", "green"]}},
    "meta_data": {"reference_point_lat": 50.77, "reference_point_lon": 6.08},
    "snippets": [{"id": 0, "start_frame": 0, "end_frame": 2}]
}"#;

fn file_with(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn loads_a_recording_file() {
    let file = file_with(RECORDING);
    let recording = Recording::from_json_file(file.path()).unwrap();

    assert_eq!(recording.native_rate().unwrap(), 25.0);
    let cyclist = &recording.road_users[&3];
    assert_eq!(cyclist.kind, RoadUserType::Bicycle);
    assert!(cyclist.is_alive_at(3));
    assert_eq!(recording.roads[&1].lanes[&0].lane_type, LaneType::Sidewalk);
    assert!(recording.sign(SignRef { road: 1, sign: 2 }).is_some());
    assert_eq!(recording.states[&5].value_at(1), Some(StateValue::RedAmber));
    assert!(recording.weather.is_none());
}

#[test]
fn extracts_snippets_from_a_loaded_file() {
    let file = file_with(RECORDING);
    let recording = Recording::from_json_file(file.path()).unwrap();
    let bounds = recording.snippet_bounds(None).unwrap();
    let snippet = recording.extract(&bounds[0]).unwrap();

    assert_eq!(snippet.timestamps.len(), 3);
    let cyclist = &snippet.road_users[&3];
    assert_eq!((cyclist.birth, cyclist.end), (1, 2));
    assert_eq!(cyclist.trajectory.pos_x, vec![1.0, 2.0]);
    assert_eq!(snippet.states[&5].values.len(), 3);
}

#[test]
fn unreadable_files_report_their_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = Recording::from_json_file(&path).unwrap_err();
    assert!(matches!(err, RecordingError::Io { .. }));
    assert!(err.to_string().contains("missing.json"));
}

#[test]
fn malformed_json_is_rejected() {
    let file = file_with("{\"timestamps\": [0.0, 0.1,");
    let err = Recording::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, RecordingError::Json(_)));
}
