// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Derived table/map view: filter first, then a stable sort.

use crate::record::FlightRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A record together with its position in the store, so row actions can
/// address it after filtering and sorting.
pub type IndexedFlight<'a> = (usize, &'a FlightRecord);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// `YYYY-MM`
    pub month: Option<String>,
    /// Exact aircraft string.
    pub aircraft: Option<String>,
    /// Substring of `DEP-ARR` or `ARR-DEP`, case-insensitive.
    pub route: Option<String>,
}

impl FilterState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        active(&self.month).is_none() && active(&self.aircraft).is_none() && active(&self.route).is_none()
    }

    pub fn matches(&self, record: &FlightRecord) -> bool {
        if let Some(month) = active(&self.month) {
            if record.year_month() != month {
                return false;
            }
        }

        if let Some(aircraft) = active(&self.aircraft) {
            if record.aircraft != aircraft {
                return false;
            }
        }

        if let Some(route) = active(&self.route) {
            let needle = route.to_uppercase();
            let forward = record.route().to_uppercase();
            let reverse = record.reverse_route().to_uppercase();
            if !forward.contains(&needle) && !reverse.contains(&needle) {
                return false;
            }
        }

        true
    }
}

// Empty strings behave like "no filter", matching an unselected dropdown.
fn active(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortColumn {
    Date,
    Route,
    Aircraft,
    Type,
    Duration,
    Notes,
}

impl SortColumn {
    pub const ALL: [SortColumn; 6] = [
        SortColumn::Date,
        SortColumn::Route,
        SortColumn::Aircraft,
        SortColumn::Type,
        SortColumn::Duration,
        SortColumn::Notes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Date => "date",
            SortColumn::Route => "route",
            SortColumn::Aircraft => "aircraft",
            SortColumn::Type => "type",
            SortColumn::Duration => "duration",
            SortColumn::Notes => "notes",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortColumn::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort column '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    /// Newest flights first.
    fn default() -> Self {
        Self {
            column: SortColumn::Date,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Header click: the active column flips, any other column starts ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = SortDirection::Asc;
        }
    }

    pub fn compare(&self, a: &FlightRecord, b: &FlightRecord) -> Ordering {
        let ordering = match self.column {
            SortColumn::Date => a.date.cmp(&b.date),
            SortColumn::Route => a.route().cmp(&b.route()),
            SortColumn::Aircraft => a.aircraft.to_lowercase().cmp(&b.aircraft.to_lowercase()),
            SortColumn::Type => a
                .flight_type
                .as_str()
                .to_lowercase()
                .cmp(&b.flight_type.as_str().to_lowercase()),
            SortColumn::Duration => a.duration.partial_cmp(&b.duration).unwrap_or(Ordering::Equal),
            SortColumn::Notes => a.notes_str().to_lowercase().cmp(&b.notes_str().to_lowercase()),
        };

        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

pub fn filter<'a>(records: &'a [FlightRecord], state: &FilterState) -> Vec<IndexedFlight<'a>> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| state.matches(record))
        .collect()
}

/// Stable: equal keys keep their input order in both directions.
pub fn sort(flights: &mut [IndexedFlight<'_>], state: &SortState) {
    flights.sort_by(|(_, a), (_, b)| state.compare(a, b));
}

/// Filtered then sorted view of the store.
pub fn derive<'a>(records: &'a [FlightRecord], filters: &FilterState, sort_state: &SortState) -> Vec<IndexedFlight<'a>> {
    let mut view = filter(records, filters);
    sort(&mut view, sort_state);
    view
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthOption {
    /// `YYYY-MM`
    pub value: String,
    /// `October 2026`
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub months: Vec<MonthOption>,
    pub aircraft: Vec<String>,
}

/// Distinct, sorted choices for the month and aircraft dropdowns, taken from
/// the whole store regardless of the active filters.
pub fn filter_options(records: &[FlightRecord]) -> FilterOptions {
    let months: BTreeSet<String> = records.iter().map(FlightRecord::year_month).collect();
    let aircraft: BTreeSet<String> = records.iter().map(|r| r.aircraft.clone()).collect();

    FilterOptions {
        months: months
            .into_iter()
            .map(|value| {
                let label = NaiveDate::parse_from_str(&format!("{}-01", value), "%Y-%m-%d")
                    .map(|d| d.format("%B %Y").to_string())
                    .unwrap_or_else(|_| value.clone());
                MonthOption { value, label }
            })
            .collect(),
        aircraft: aircraft.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FlightType;

    fn flight(date: (i32, u32, u32), dep: &str, arr: &str, aircraft: &str, duration: f64) -> FlightRecord {
        FlightRecord {
            id: format!("{}{}", dep, arr),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            duration,
            departure: dep.to_string(),
            arrival: arr.to_string(),
            aircraft: aircraft.to_string(),
            flight_type: FlightType::Personal,
            notes: None,
        }
    }

    fn durations(view: &[IndexedFlight<'_>]) -> Vec<f64> {
        view.iter().map(|(_, r)| r.duration).collect()
    }

    #[test]
    fn test_filter_by_route_matches_either_end() {
        let records = vec![
            flight((2026, 1, 1), "JFK", "LAX", "C172", 5.0),
            flight((2026, 1, 2), "BOS", "JFK", "C172", 1.0),
            flight((2026, 1, 3), "SFO", "SEA", "C172", 2.0),
        ];
        let state = FilterState {
            route: Some("jfk".to_string()),
            ..Default::default()
        };

        let indices: Vec<usize> = filter(&records, &state).iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn test_route_filter_spans_the_hyphen() {
        let records = vec![flight((2026, 1, 1), "JFK", "LAX", "C172", 5.0)];
        let forward = FilterState {
            route: Some("K-L".to_string()),
            ..Default::default()
        };
        let reverse = FilterState {
            route: Some("x-j".to_string()),
            ..Default::default()
        };
        assert_eq!(filter(&records, &forward).len(), 1);
        assert_eq!(filter(&records, &reverse).len(), 1);
    }

    #[test]
    fn test_filter_by_exact_aircraft_and_month() {
        let records = vec![
            flight((2026, 1, 15), "A", "B", "C172", 1.0),
            flight((2026, 2, 1), "A", "B", "C172S", 1.0),
            flight((2026, 2, 9), "A", "B", "C172", 1.0),
        ];

        let by_aircraft = FilterState {
            aircraft: Some("C172".to_string()),
            ..Default::default()
        };
        let view = filter(&records, &by_aircraft);
        assert!(view.iter().all(|(_, r)| r.aircraft == "C172"));
        assert_eq!(view.len(), 2);

        let combined = FilterState {
            month: Some("2026-02".to_string()),
            aircraft: Some("C172".to_string()),
            route: Some(String::new()),
        };
        let indices: Vec<usize> = filter(&records, &combined).iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![2]);
    }

    #[test]
    fn test_sort_by_duration_both_directions() {
        let records = vec![
            flight((2026, 1, 1), "A", "B", "X", 2.5),
            flight((2026, 1, 2), "A", "B", "X", 1.0),
            flight((2026, 1, 3), "A", "B", "X", 3.2),
        ];

        let mut state = SortState::new(SortColumn::Date, SortDirection::Desc);
        state.toggle(SortColumn::Duration);
        assert_eq!(state.direction, SortDirection::Asc);
        assert_eq!(durations(&derive(&records, &FilterState::default(), &state)), vec![1.0, 2.5, 3.2]);

        state.toggle(SortColumn::Duration);
        assert_eq!(state.direction, SortDirection::Desc);
        assert_eq!(durations(&derive(&records, &FilterState::default(), &state)), vec![3.2, 2.5, 1.0]);
    }

    #[test]
    fn test_sort_is_stable_and_case_insensitive() {
        let records = vec![
            flight((2026, 1, 1), "A", "B", "piper", 1.0),
            flight((2026, 1, 2), "A", "B", "Cessna", 2.0),
            flight((2026, 1, 3), "A", "B", "PIPER", 3.0),
        ];
        let asc = derive(&records, &FilterState::default(), &SortState::new(SortColumn::Aircraft, SortDirection::Asc));
        assert_eq!(durations(&asc), vec![2.0, 1.0, 3.0]);

        let desc = derive(&records, &FilterState::default(), &SortState::new(SortColumn::Aircraft, SortDirection::Desc));
        assert_eq!(durations(&desc), vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_sort_dates_chronologically() {
        let records = vec![
            flight((2025, 12, 31), "A", "B", "X", 1.0),
            flight((2026, 1, 2), "A", "B", "X", 2.0),
            flight((2024, 6, 1), "A", "B", "X", 3.0),
        ];
        let view = derive(&records, &FilterState::default(), &SortState::default());
        assert_eq!(durations(&view), vec![2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_filter_options_are_distinct_and_sorted() {
        let records = vec![
            flight((2026, 10, 1), "A", "B", "PA28", 1.0),
            flight((2026, 2, 1), "A", "B", "C172", 1.0),
            flight((2026, 10, 9), "A", "B", "C172", 1.0),
        ];
        let options = filter_options(&records);
        let months: Vec<&str> = options.months.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(months, vec!["2026-02", "2026-10"]);
        assert_eq!(options.months[1].label, "October 2026");
        assert_eq!(options.aircraft, vec!["C172", "PA28"]);
    }

    #[test]
    fn test_sort_column_parse() {
        assert_eq!("Duration".parse::<SortColumn>(), Ok(SortColumn::Duration));
        assert!("altitude".parse::<SortColumn>().is_err());
    }
}
