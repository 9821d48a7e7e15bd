// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::record::FlightRecord;
use serde::Serialize;
use std::collections::HashSet;

/// Summary over the whole store, ignoring filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total_hours: f64,
    pub total_flights: usize,
    /// Distinct codes across departure and arrival combined.
    pub unique_airports: usize,
}

impl Statistics {
    pub fn compute(records: &[FlightRecord]) -> Self {
        let total_hours = records.iter().map(|r| r.duration).sum();
        let unique_airports = records
            .iter()
            .flat_map(|r| [r.departure.as_str(), r.arrival.as_str()])
            .collect::<HashSet<_>>()
            .len();

        Self {
            total_hours,
            total_flights: records.len(),
            unique_airports,
        }
    }

    /// Hours as shown in the summary, one decimal place.
    pub fn total_hours_display(&self) -> String {
        format!("{:.1}", self.total_hours)
    }
}
