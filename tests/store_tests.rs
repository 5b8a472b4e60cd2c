// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pnlboard::error::PnlError;
use pnlboard::models::StateValue;
use pnlboard::store::{StateMap, StateStore};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use std::fs;

fn sample_state() -> StateMap {
    let mut state = StateMap::new();
    state.insert("Revenue_0".into(), StateValue::Number(dec!(1234.56)));
    state.insert("Revenue_1".into(), StateValue::Number(dec!(2000)));
    state.insert("tax_rate".into(), StateValue::Number(dec!(12.5)));
    state.insert("business_name".into(), StateValue::Text("Reclam Inc.".into()));
    state.insert("reset_triggered".into(), StateValue::Bool(false));
    state.insert(
        "history".into(),
        StateValue::Sequence(vec![dec!(1), dec!(2.5), dec!(0)]),
    );
    state
}

#[test]
fn missing_file_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    assert!(store.load("nobody").unwrap().is_empty());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    let state = sample_state();
    store.save("reclam_inc.", &state).unwrap();
    assert!(store.state_path("reclam_inc.").exists());

    let loaded = store.load("reclam_inc.").unwrap();
    assert_eq!(loaded, state);

    // A second save of the loaded state writes the same bytes.
    let first = fs::read(store.state_path("reclam_inc.")).unwrap();
    store.save("reclam_inc.", &loaded).unwrap();
    let second = fs::read(store.state_path("reclam_inc.")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn foreign_files_keep_supported_values_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    fs::write(
        store.state_path("acme"),
        r#"{"Revenue_0": 1000.0, "COGS_0": 400, "tax_rate": 10.0,
            "business_name": "Acme", "reset_triggered": false,
            "logo": null, "nested": {"a": 1}, "list": [1, 2.5], "mixed": [1, "a"]}"#,
    )
    .unwrap();

    let loaded = store.load("acme").unwrap();
    assert_eq!(loaded.get("Revenue_0"), Some(&StateValue::Number(dec!(1000))));
    assert_eq!(loaded.get("COGS_0"), Some(&StateValue::Number(dec!(400))));
    assert_eq!(loaded.get("reset_triggered"), Some(&StateValue::Bool(false)));
    assert_eq!(
        loaded.get("list"),
        Some(&StateValue::Sequence(vec![dec!(1), dec!(2.5)]))
    );
    assert!(!loaded.contains_key("logo"));
    assert!(!loaded.contains_key("nested"));
    assert!(!loaded.contains_key("mixed"));
}

#[test]
fn unreadable_json_is_a_corrupt_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    fs::write(store.state_path("acme"), "{not json").unwrap();
    assert!(matches!(
        store.load("acme"),
        Err(PnlError::CorruptState { .. })
    ));

    fs::write(store.state_path("acme"), "[1, 2]").unwrap();
    assert!(matches!(
        store.load("acme"),
        Err(PnlError::CorruptState { .. })
    ));

    let moved = store.quarantine("acme").unwrap();
    assert!(moved.exists());
    assert!(!store.state_path("acme").exists());
}

#[test]
fn repeated_quarantine_keeps_every_copy() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());

    fs::write(store.state_path("acme"), "{first").unwrap();
    let first = store.quarantine("acme").unwrap();
    fs::write(store.state_path("acme"), "{second").unwrap();
    let second = store.quarantine("acme").unwrap();

    assert_eq!(first, dir.path().join("stored_values_acme.json.corrupt"));
    assert_eq!(second, dir.path().join("stored_values_acme.json.corrupt.1"));
    assert_eq!(fs::read_to_string(&first).unwrap(), "{first");
    assert_eq!(fs::read_to_string(&second).unwrap(), "{second");
    // Quarantined copies are not listed as businesses.
    assert!(store.list_slugs().unwrap().is_empty());
}

#[test]
fn long_decimals_survive_a_save() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    let mut state = StateMap::new();
    state.insert(
        "Revenue_0".into(),
        StateValue::Number(dec!(1234567890.123456789)),
    );
    state.insert(
        "Revenue_1".into(),
        StateValue::Number(dec!(1000000000000000)),
    );
    state.insert(
        "history".into(),
        StateValue::Sequence(vec![dec!(0.1), dec!(98765432109876.54321)]),
    );
    store.save("acme", &state).unwrap();

    let text = fs::read_to_string(store.state_path("acme")).unwrap();
    assert!(text.contains("1234567890.123456789"));
    assert!(text.contains("1000000000000000"));
    assert!(text.contains("98765432109876.54321"));
    assert_eq!(store.load("acme").unwrap(), state);
}

#[test]
fn save_is_a_full_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    store.save("acme", &sample_state()).unwrap();

    let mut smaller = StateMap::new();
    smaller.insert("Rent_0".into(), StateValue::Number(dec!(500)));
    store.save("acme", &smaller).unwrap();

    assert_eq!(store.load("acme").unwrap(), smaller);
}

#[test]
fn saves_leave_no_temp_files_behind() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    store.save("acme", &sample_state()).unwrap();
    store.save("acme", &sample_state()).unwrap();
    store.save_logo("acme", b"\x89PNG").unwrap();

    let names: BTreeSet<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        BTreeSet::from([
            "logo_acme.png".to_string(),
            "stored_values_acme.json".to_string(),
        ])
    );
}

#[test]
fn delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    store.delete("ghost").unwrap();

    store.save("acme", &sample_state()).unwrap();
    store.delete("acme").unwrap();
    assert!(!store.state_path("acme").exists());
    assert!(store.load("acme").unwrap().is_empty());
}

#[test]
fn businesses_are_listed_from_state_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    store.save("reclam_inc.", &StateMap::new()).unwrap();
    store.save("distinct_ent.", &StateMap::new()).unwrap();
    fs::write(dir.path().join("logo_other.png"), b"x").unwrap();
    fs::write(dir.path().join("notes.txt"), b"x").unwrap();
    fs::write(dir.path().join("stored_values_old.json.corrupt"), b"x").unwrap();
    fs::create_dir(dir.path().join("stored_values_dir.json")).unwrap();

    assert_eq!(
        store.list_slugs().unwrap(),
        BTreeSet::from(["distinct_ent.".to_string(), "reclam_inc.".to_string()])
    );
    assert_eq!(
        store.list_businesses().unwrap(),
        BTreeSet::from(["Distinct Ent.".to_string(), "Reclam Inc.".to_string()])
    );
}

#[test]
fn missing_data_dir_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path().join("not-yet"));
    assert!(store.list_businesses().unwrap().is_empty());

    store.save("acme", &StateMap::new()).unwrap();
    assert_eq!(store.list_slugs().unwrap().len(), 1);
}

#[test]
fn logo_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = StateStore::new(dir.path());
    assert_eq!(store.load_logo("acme").unwrap(), None);

    store.save_logo("acme", b"image-bytes").unwrap();
    assert_eq!(store.load_logo("acme").unwrap(), Some(b"image-bytes".to_vec()));

    store.delete_logo("acme").unwrap();
    store.delete_logo("acme").unwrap();
    assert_eq!(store.load_logo("acme").unwrap(), None);
}
