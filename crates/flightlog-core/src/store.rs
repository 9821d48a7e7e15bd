// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::record::FlightRecord;
use crate::storage::{KeyValueStore, StorageError};
use std::collections::HashSet;
use thiserror::Error;

/// Storage slot holding the serialized flight list.
pub const FLIGHTS_KEY: &str = "flights";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to persist flights: {0}")]
    Storage(#[from] StorageError),
    #[error("Failed to serialize flights: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("No flight at index {index} (store holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Ordered flight list mirrored to a key-value slot after every mutation.
///
/// A failed write keeps the in-memory change (there is no rollback) and is
/// reported as [`StoreError::Storage`] or [`StoreError::Serialize`].
pub struct FlightStore<S: KeyValueStore> {
    records: Vec<FlightRecord>,
    backend: S,
}

impl<S: KeyValueStore> FlightStore<S> {
    /// Reads the whole slot. A missing or unreadable payload starts empty.
    pub fn open(backend: S) -> Self {
        let records = match backend.get(FLIGHTS_KEY) {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<FlightRecord>>(&payload) {
                Ok(records) => records,
                Err(e) => {
                    log::warn!("Stored flights are unreadable; starting empty — error={}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Flight storage unavailable; starting empty — error={}", e);
                Vec::new()
            }
        };

        log::debug!("Opened flight store — records={}", records.len());
        Self { records, backend }
    }

    pub fn all(&self) -> &[FlightRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&FlightRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Appends a record under a freshly assigned id; any id on `record` is ignored.
    pub fn add(&mut self, mut record: FlightRecord) -> Result<&FlightRecord, StoreError> {
        record.id = self.next_id();
        log::info!(
            "Adding flight — id={} route={} date={}",
            record.id,
            record.route(),
            record.date
        );
        self.records.push(record);
        self.persist()?;
        let last = self.records.len() - 1;
        Ok(&self.records[last])
    }

    /// Replaces the record at `index` wholesale, keeping the id already stored there.
    pub fn update(&mut self, index: usize, mut record: FlightRecord) -> Result<&FlightRecord, StoreError> {
        let len = self.records.len();
        let slot = self
            .records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        record.id = slot.id.clone();
        *slot = record;
        log::info!("Updated flight — index={} id={}", index, self.records[index].id);
        self.persist()?;
        Ok(&self.records[index])
    }

    pub fn remove(&mut self, index: usize) -> Result<FlightRecord, StoreError> {
        if index >= self.records.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        let removed = self.records.remove(index);
        log::info!("Removed flight — index={} id={}", index, removed.id);
        self.persist()?;
        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.records.clear();
        log::info!("Cleared flight store");
        self.persist()
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&self.records)?;
        self.backend.set(FLIGHTS_KEY, &payload).map_err(|e| {
            log::error!("Failed to persist flights — records={} error={}", self.records.len(), e);
            StoreError::from(e)
        })
    }

    /// Millisecond timestamp, bumped past any id already in the store.
    fn next_id(&self) -> String {
        let taken: HashSet<&str> = self.records.iter().map(|r| r.id.as_str()).collect();
        let mut candidate = chrono::Utc::now().timestamp_millis();
        while taken.contains(candidate.to_string().as_str()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}
