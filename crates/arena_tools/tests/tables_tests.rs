//! Shipped tables and simulator tests.

use std::path::PathBuf;
use std::sync::Arc;

use arena_core::data::ArenaTables;
use arena_tools::simulate::{self, SimulationOptions};
use arena_tools::validate::{validate_file, validate_path};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/data")
}

#[test]
fn shipped_tables_are_valid() {
    let files = validate_path(&data_dir()).unwrap();
    assert!(!files.is_empty());
}

#[test]
fn shipped_tables_match_builtin_defaults() {
    let tables = validate_file(&data_dir().join("arena_tables.ron")).unwrap();
    assert_eq!(tables, ArenaTables::default());
}

#[test]
fn simulation_replays_by_seed() {
    let tables = Arc::new(ArenaTables::default());
    let options = SimulationOptions {
        participants: 20,
        seed: 1234,
        ..SimulationOptions::default()
    };

    let a = simulate::run(Arc::clone(&tables), &options).unwrap();
    let b = simulate::run(tables, &options).unwrap();

    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(simulate::render_text(&a), simulate::render_text(&b));
}

#[test]
fn json_output_has_rounds_and_outcome() {
    let transcript = simulate::run(
        Arc::new(ArenaTables::default()),
        &SimulationOptions {
            participants: 6,
            seed: 3,
            ..SimulationOptions::default()
        },
    )
    .unwrap();

    let json = simulate::render_json(&transcript).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["status"], "Finished");
    assert_eq!(
        value["rounds"].as_array().unwrap().len(),
        transcript.rounds.len()
    );
    assert_eq!(value["outcome"]["participants"], 6);
}
