// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

pub mod airports;
pub mod app;
pub mod autocomplete;
pub mod config;
pub mod export;
pub mod form;
pub mod map;
pub mod record;
pub mod search;
pub mod stats;
pub mod storage;
pub mod store;
pub mod table;
pub mod view;

use std::path::PathBuf;
use thiserror::Error;

pub use airports::{Airport, AirportDirectory};
pub use app::{FlightLogApp, Notice, NoticeKind};
pub use record::{FlightRecord, FlightType};
pub use store::FlightStore;

#[derive(Error, Debug)]
pub enum FlightLogError {
    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
    #[error("Validation error: {0}")]
    Validation(#[from] form::ValidationError),
    #[error("Export error: {0}")]
    Export(#[from] export::ExportError),
    #[error("Airport directory error: {0}")]
    Directory(#[from] airports::DirectoryError),
    #[error("Geocoding error: {0}")]
    Geocode(#[from] map::GeocodeError),
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "flightlog", "FlightLog")
}

/// Root directory for `config.json`.
pub fn get_config_root() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".flightlog"))
}

/// Default location of the persisted flight slots when no data dir is configured.
pub fn get_data_root() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".flightlog").join("data"))
}
