//! Conversion driven by JSON files on disk.

mod common;

use std::io::Write;
use tempfile::NamedTempFile;
use trafficgraph_pipeline::{convert, PipelineConfig, PipelineError, SpeedLimit};
use trafficgraph_recording::Recording;

fn write_json(value: &serde_json::Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{value}").unwrap();
    file
}

#[test]
fn converts_a_recording_file_with_a_config_file() {
    let mut recording = common::recording();
    recording.meta_data.location = Some("unknown crossing".to_string());
    let recording_file = write_json(&serde_json::to_value(&recording).unwrap());
    let config_file = write_json(&serde_json::json!({
        "hertz": 5,
        "end_offset": 0.2,
    }));

    let recording = Recording::from_json_file(recording_file.path()).unwrap();
    let config = PipelineConfig::from_json_file(config_file.path()).unwrap();
    let scenarios = convert(&recording, &config).unwrap();

    assert_eq!(scenarios.len(), 1);
    let frames: Vec<u32> = scenarios[0].scenes.iter().map(|s| s.frame).collect();
    assert_eq!(frames, vec![0, 2, 4, 6]);
    assert!(scenarios[0]
        .scenes
        .iter()
        .all(|s| s.speed_limit == SpeedLimit::Unknown));
}

#[test]
fn summaries_serialize_to_json() {
    let scenarios = convert(&common::recording(), &PipelineConfig::default()).unwrap();
    let summary = serde_json::to_value(scenarios[0].summary()).unwrap();
    assert_eq!(summary["scenes"], 10);
    assert_eq!(summary["speed_limit"], "unknown");
    assert_eq!(summary["dropped_relations"], 0);
}

#[test]
fn a_missing_config_file_names_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = PipelineConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, PipelineError::ConfigIo { .. }));
    assert!(err.to_string().contains("absent.json"));
}
