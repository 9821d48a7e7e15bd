// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::map::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl Airport {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Static code -> airport table.
///
/// ICAO and IATA codes for the same field are independent keys. When a source
/// defines a code twice the later definition replaces the earlier one but keeps
/// its original position, so search order stays the order of first appearance.
#[derive(Debug, Clone, Default)]
pub struct AirportDirectory {
    entries: Vec<Airport>,
    index: HashMap<String, usize>,
}

static BUILTIN: OnceLock<Arc<AirportDirectory>> = OnceLock::new();

impl AirportDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The directory compiled into the binary, parsed once per process.
    pub fn builtin() -> Arc<AirportDirectory> {
        Arc::clone(BUILTIN.get_or_init(|| {
            let directory = Self::from_json_str(include_str!("airports.json"))
                .expect("Failed to parse airports.json");
            Arc::new(directory)
        }))
    }

    pub fn from_airports<I: IntoIterator<Item = Airport>>(airports: I) -> Self {
        let mut directory = Self::new();
        for airport in airports {
            directory.insert(airport);
        }
        directory
    }

    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let airports: Vec<Airport> = serde_json::from_str(json)?;
        Ok(Self::from_airports(airports))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DirectoryError> {
        let airports: Vec<Airport> = serde_json::from_reader(reader)?;
        Ok(Self::from_airports(airports))
    }

    /// Loads an external directory asset (a JSON array of airports).
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self, DirectoryError> {
        let file = File::open(path.as_ref())?;
        let directory = Self::from_reader(BufReader::new(file))?;
        log::info!(
            "Loaded airport directory — path={} airports={}",
            path.as_ref().display(),
            directory.len()
        );
        Ok(directory)
    }

    fn insert(&mut self, mut airport: Airport) {
        airport.code = airport.code.trim().to_uppercase();
        if let Some(&i) = self.index.get(&airport.code) {
            log::warn!(
                "Duplicate airport code in directory; later definition wins — code={} previous={:?} replacement={:?}",
                airport.code,
                self.entries[i].name,
                airport.name
            );
            self.entries[i] = airport;
            return;
        }
        self.index.insert(airport.code.clone(), self.entries.len());
        self.entries.push(airport);
    }

    /// Exact key lookup.
    pub fn get(&self, code: &str) -> Option<&Airport> {
        self.index.get(code).map(|&i| &self.entries[i])
    }

    /// Lookup of user-entered text: case-folded and stripped of anything that
    /// is not an ASCII letter or digit first.
    pub fn lookup(&self, raw_code: &str) -> Option<&Airport> {
        self.get(&normalize_code(raw_code))
    }

    /// Entries in directory order.
    pub fn iter(&self) -> impl Iterator<Item = &Airport> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn normalize_code(raw: &str) -> String {
    raw.to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}
