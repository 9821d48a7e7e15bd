// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use chrono::NaiveDate;
use flightlog_core::map::SceneSurface;
use flightlog_core::storage::{FileStore, KeyValueStore};
use flightlog_core::store::FLIGHTS_KEY;
use flightlog_core::{AirportDirectory, FlightLogApp, FlightStore, FlightType, NoticeKind};
use std::fs;

fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

fn open(store: FileStore) -> FlightLogApp<FileStore, SceneSurface> {
    FlightLogApp::new(
        store,
        AirportDirectory::builtin(),
        None,
        SceneSurface::new(),
        Default::default(),
    )
    .with_clock(fixed_today)
}

#[test]
fn test_flights_survive_restart() -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let data_dir = temp_dir.path().join("data");

    let mut app = open(FileStore::new(&data_dir));
    {
        let form = app.form_mut();
        form.duration = "2.4".to_string();
        form.departure = "ksea".to_string();
        form.arrival = "kpdx".to_string();
        form.aircraft = "DA40".to_string();
        form.flight_type = "Cross Country".to_string();
        form.notes = "Headwind the whole way".to_string();
    }
    let notice = app.submit();
    assert_eq!(notice.kind, NoticeKind::Success);
    let id = app.records()[0].id.clone();
    assert!(!id.is_empty());
    drop(app);

    let mut reopened = open(FileStore::new(&data_dir));
    assert_eq!(reopened.records().len(), 1, "Flight should be persisted to disk");
    let flight = &reopened.records()[0];
    assert_eq!(flight.id, id);
    assert_eq!(flight.date, fixed_today());
    assert_eq!(flight.departure, "KSEA");
    assert_eq!(flight.flight_type, FlightType::CrossCountry);
    assert_eq!(flight.notes.as_deref(), Some("Headwind the whole way"));
    assert!(reopened.surface().lines.is_empty());
    assert_eq!(reopened.show_map(), 1);
    assert_eq!(reopened.surface().lines.len(), 1);

    Ok(())
}

#[test]
fn test_payload_uses_flat_field_names() -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let backend = FileStore::new(temp_dir.path());
    let mut app = open(backend.clone());
    {
        let form = app.form_mut();
        form.date = "2026-04-02".to_string();
        form.duration = "1.5".to_string();
        form.departure = "KBOS".to_string();
        form.arrival = "KJFK".to_string();
        form.aircraft = "C172".to_string();
        form.flight_type = "Training".to_string();
    }
    app.submit();

    let raw = fs::read_to_string(backend.slot_path(FLIGHTS_KEY))?;
    let payload: serde_json::Value = serde_json::from_str(&raw)?;
    let entry = &payload[0];
    assert_eq!(entry["date"], "2026-04-02");
    assert_eq!(entry["duration"], 1.5);
    assert_eq!(entry["type"], "Training");
    assert_eq!(entry["notes"], "");
    assert!(entry["id"].as_str().is_some_and(|id| !id.is_empty()));

    Ok(())
}

#[test]
fn test_legacy_payload_loads() -> anyhow::Result<()> {
    let temp_dir = tempfile::tempdir()?;
    let mut backend = FileStore::new(temp_dir.path());
    backend.set(
        FLIGHTS_KEY,
        r#"[{"id":"1712345678901","date":"2024-04-05","duration":1.2,"departure":"KSFO",
            "arrival":"KOAK","aircraft":"C152","type":"Aerobatics","notes":""}]"#,
    )?;

    let store = FlightStore::open(backend);
    let flight = store.get(0).unwrap();
    assert_eq!(flight.flight_type, FlightType::Other("Aerobatics".to_string()));
    assert_eq!(flight.notes, None);

    Ok(())
}

#[test]
fn test_corrupt_payload_starts_empty() -> anyhow::Result<()> {
    let _ = simplelog::TermLogger::init(
        simplelog::LevelFilter::Warn,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    );
    let temp_dir = tempfile::tempdir()?;
    let backend = FileStore::new(temp_dir.path());
    fs::write(backend.slot_path(FLIGHTS_KEY), "{ not json")?;

    let app = open(backend);
    assert!(app.records().is_empty());
    assert_eq!(app.statistics().total_flights, 0);
    assert!(app.surface().viewport.is_none());

    Ok(())
}
