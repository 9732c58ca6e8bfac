//! End-to-end runs of the library pipeline with scripted answers.

use std::fs;
use std::path::{Path, PathBuf};

use gis_simplifier::prompt::{overwrite_question, PATH_QUESTION};
use gis_simplifier::{
    process_files, resolve_inputs, BatchMode, ConflictPolicy, Error, GeometryTable, Options, Scripted,
};
use serde_json::{json, Value};
use tempfile::TempDir;

/// Two adjacent parcels whose shared side and outer sides carry redundant vertices.
fn parcels() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"id": 1, "owner": "north"},
                "geometry": {"type": "Polygon", "coordinates": [[
                    [0.0, 0.0], [0.5, 0.0], [1.0, 0.0], [1.0, 0.5], [1.0, 1.0],
                    [0.5, 1.0], [0.0, 1.0], [0.0, 0.0]
                ]]}
            },
            {
                "type": "Feature",
                "properties": {"id": 2, "owner": "south"},
                "geometry": {"type": "Polygon", "coordinates": [[
                    [1.0, 0.0], [1.5, 0.0], [2.0, 0.0], [2.0, 1.0], [1.0, 1.0],
                    [1.0, 0.5], [1.0, 0.0]
                ]]}
            }
        ]
    })
}

fn write_input(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, parcels().to_string()).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn ring_len(feature: &Value) -> usize {
    feature["geometry"]["coordinates"][0].as_array().unwrap().len()
}

#[test]
fn writes_simplified_copy_next_to_input() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.geojson");
    let mut prompt = Scripted::default();

    let report = process_files(&[input.clone()], &Options::default(), &mut prompt).unwrap();

    let output = dir.path().join("data_simplified.geojson");
    assert_eq!(report.processed.len(), 1);
    assert_eq!(report.processed[0].output, output);
    assert_eq!(report.processed[0].features, 2);
    assert!(prompt.asked().is_empty());

    let written = read_json(&output);
    let features = written["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["properties"], json!({"id": 1, "owner": "north"}));
    assert_eq!(features[1]["properties"], json!({"id": 2, "owner": "south"}));
    assert_eq!(ring_len(&features[0]), 5);
    assert_eq!(ring_len(&features[1]), 5);

    // input untouched
    assert_eq!(read_json(&input), parcels());
}

#[test]
fn declined_overwrite_takes_next_free_number() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.geojson");
    let existing = dir.path().join("data_simplified.geojson");
    fs::write(&existing, "keep").unwrap();
    fs::write(dir.path().join("data_simplified_1.geojson"), "keep").unwrap();
    let mut prompt = Scripted::new(["n"]);

    let report = process_files(&[input], &Options::default(), &mut prompt).unwrap();

    assert_eq!(report.processed[0].output, dir.path().join("data_simplified_2.geojson"));
    assert_eq!(prompt.asked(), [overwrite_question(&existing)]);
    assert_eq!(fs::read_to_string(&existing).unwrap(), "keep");
    assert_eq!(read_json(&report.processed[0].output)["features"].as_array().unwrap().len(), 2);
}

#[test]
fn accepted_overwrite_replaces_the_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.geojson");
    let existing = dir.path().join("data_simplified.geojson");
    fs::write(&existing, json!({"type": "FeatureCollection", "features": []}).to_string()).unwrap();
    let mut prompt = Scripted::new(["Y"]);

    let report = process_files(&[input], &Options::default(), &mut prompt).unwrap();

    assert_eq!(report.processed[0].output, existing);
    assert_eq!(read_json(&existing)["features"].as_array().unwrap().len(), 2);
    assert!(!dir.path().join("data_simplified_1.geojson").exists());
}

#[test]
fn missing_input_aborts_before_writing() {
    let dir = TempDir::new().unwrap();
    let ghost = dir.path().join("ghost.geojson");
    let mut prompt = Scripted::default();

    let err = process_files(&[ghost.clone()], &Options::default(), &mut prompt).unwrap_err();

    assert!(matches!(err, Error::NotFound { ref path } if *path == ghost));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn fail_fast_keeps_earlier_outputs_and_skips_later_files() {
    let dir = TempDir::new().unwrap();
    let first = write_input(dir.path(), "a.geojson");
    let ghost = dir.path().join("ghost.geojson");
    let last = write_input(dir.path(), "c.geojson");

    let result = process_files(&[first, ghost, last], &Options::default(), &mut Scripted::default());

    assert!(matches!(result, Err(Error::NotFound { .. })));
    assert!(dir.path().join("a_simplified.geojson").exists());
    assert!(!dir.path().join("c_simplified.geojson").exists());
}

#[test]
fn keep_going_collects_failures() {
    let dir = TempDir::new().unwrap();
    let first = write_input(dir.path(), "a.geojson");
    let ghost = dir.path().join("ghost.geojson");
    let last = write_input(dir.path(), "c.geojson");
    let options = Options { batch: BatchMode::KeepGoing, ..Options::default() };

    let report = process_files(&[first, ghost.clone(), last], &options, &mut Scripted::default()).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.processed.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, ghost);
    assert!(dir.path().join("c_simplified.geojson").exists());
}

#[test]
fn earlier_outputs_affect_later_names() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.geojson");
    let options = Options { conflict: ConflictPolicy::Rename, ..Options::default() };

    let report = process_files(&[input.clone(), input], &options, &mut Scripted::default()).unwrap();

    assert_eq!(report.processed[0].output, dir.path().join("data_simplified.geojson"));
    assert_eq!(report.processed[1].output, dir.path().join("data_simplified_1.geojson"));
}

#[test]
fn conflict_policy_fail_leaves_existing_output() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.geojson");
    fs::write(dir.path().join("data_simplified.geojson"), "keep").unwrap();
    let options = Options { conflict: ConflictPolicy::Fail, ..Options::default() };

    let err = process_files(&[input], &options, &mut Scripted::default()).unwrap_err();

    assert!(matches!(err, Error::OutputExists { .. }));
    assert_eq!(fs::read_to_string(dir.path().join("data_simplified.geojson")).unwrap(), "keep");
}

#[test]
fn custom_suffix_and_tolerance() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.json");
    let options = Options {
        tolerance: 0.0,
        suffix: "_small".to_string(),
        ..Options::default()
    };

    let report = process_files(&[input], &options, &mut Scripted::default()).unwrap();

    assert_eq!(report.processed[0].output, dir.path().join("data_small.json"));
}

#[test]
fn invalid_tolerance_is_rejected_before_any_work() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.geojson");
    let options = Options { tolerance: f64::NAN, ..Options::default() };

    let err = process_files(&[input], &options, &mut Scripted::default()).unwrap_err();

    assert!(matches!(err, Error::InvalidTolerance(_)));
    assert!(!dir.path().join("data_simplified.geojson").exists());
}

#[test]
fn no_arguments_prompts_for_one_path() {
    let mut prompt = Scripted::new(["parcels.geojson"]);

    let files = resolve_inputs(Vec::new(), &mut prompt).unwrap();

    assert_eq!(files, vec![PathBuf::from("parcels.geojson")]);
    assert_eq!(prompt.asked(), [PATH_QUESTION]);
}

#[test]
fn arguments_are_used_as_given() {
    let mut prompt = Scripted::default();

    let files = resolve_inputs(vec!["b.geojson".into(), "a.geojson".into()], &mut prompt).unwrap();

    assert_eq!(files, vec![PathBuf::from("b.geojson"), PathBuf::from("a.geojson")]);
    assert!(prompt.asked().is_empty());
}

#[test]
fn prompted_path_behaves_like_an_argument() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.geojson");
    let mut prompt = Scripted::new([input.to_str().unwrap()]);

    let files = resolve_inputs(Vec::new(), &mut prompt).unwrap();
    process_files(&files, &Options::default(), &mut prompt).unwrap();

    assert!(dir.path().join("data_simplified.geojson").exists());
}

#[test]
fn resimplifying_output_is_stable() {
    let dir = TempDir::new().unwrap();
    let input = write_input(dir.path(), "data.geojson");
    let options = Options::default();

    let first = process_files(&[input], &options, &mut Scripted::default()).unwrap();
    let once = first.processed[0].output.clone();
    let second = process_files(&[once.clone()], &options, &mut Scripted::default()).unwrap();

    let twice = &second.processed[0].output;
    assert_eq!(twice, &dir.path().join("data_simplified_simplified.geojson"));
    assert_eq!(second.processed[0].simplify.vertices_before, second.processed[0].simplify.vertices_after);
    assert_eq!(GeometryTable::load(&once).unwrap(), GeometryTable::load(twice).unwrap());
}

#[test]
fn heights_are_carried_to_the_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("terrain.geojson");
    let terrain = json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"kind": "field"},
            "geometry": {"type": "Polygon", "coordinates": [[
                [0.0, 0.0, 5.0], [0.5, 0.0, 5.5], [1.0, 0.0, 6.0], [1.0, 1.0, 7.0], [0.0, 1.0, 8.0], [0.0, 0.0, 5.0]
            ]]}
        }]
    });
    fs::write(&input, terrain.to_string()).unwrap();

    let report = process_files(&[input], &Options::default(), &mut Scripted::default()).unwrap();

    let written = read_json(&report.processed[0].output);
    let feature = &written["features"][0];
    assert_eq!(ring_len(feature), 5);
    for position in feature["geometry"]["coordinates"][0].as_array().unwrap() {
        assert_eq!(position.as_array().unwrap().len(), 3);
    }
    assert!(!feature["geometry"]["coordinates"][0].as_array().unwrap().contains(&json!([0.5, 0.0, 5.5])));
}
