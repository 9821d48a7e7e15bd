// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::view::{self, FilterState, IndexedFlight, SortColumn, SortDirection, SortState};
use crate::record::FlightRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;

pub const EMPTY_STATE: &str = "No flights found. Start by logging your first flight!";

/// `Oct 16, 2026`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    /// Position in the store; row actions address records by it.
    pub index: usize,
    pub id: String,
    pub date: String,
    pub departure: String,
    pub arrival: String,
    pub route: String,
    pub aircraft: String,
    pub flight_type: String,
    pub type_badge: String,
    pub duration: String,
    pub notes: String,
    pub notes_tooltip: String,
}

impl TableRow {
    pub fn project(index: usize, record: &FlightRecord) -> Self {
        Self {
            index,
            id: record.id.clone(),
            date: format_date(record.date),
            departure: record.departure.clone(),
            arrival: record.arrival.clone(),
            route: format!("{} → {}", record.departure, record.arrival),
            aircraft: record.aircraft.clone(),
            flight_type: record.flight_type.to_string(),
            type_badge: record.flight_type.badge_class(),
            duration: format!("{:.1}h", record.duration),
            notes: record.notes.clone().unwrap_or_else(|| "-".to_string()),
            notes_tooltip: record.notes.clone().unwrap_or_else(|| "No notes".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortIndicator {
    Inactive,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub rows: Vec<TableRow>,
    pub sort: SortState,
}

impl Table {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn indicator(&self, column: SortColumn) -> SortIndicator {
        if column != self.sort.column {
            SortIndicator::Inactive
        } else if self.sort.direction == SortDirection::Asc {
            SortIndicator::Ascending
        } else {
            SortIndicator::Descending
        }
    }

    /// Store index behind the row at `position`, for wiring row actions.
    pub fn index_at(&self, position: usize) -> Option<usize> {
        self.rows.get(position).map(|row| row.index)
    }

    /// Plain-text grid for terminals.
    pub fn to_text(&self) -> String {
        if self.rows.is_empty() {
            return format!("{}\n", EMPTY_STATE);
        }

        let headers = ["#", "Date", "Route", "Aircraft", "Type", "Hours", "Notes"];
        let cells: Vec<[String; 7]> = self
            .rows
            .iter()
            .map(|row| {
                [
                    row.index.to_string(),
                    row.date.clone(),
                    row.route.clone(),
                    row.aircraft.clone(),
                    row.flight_type.clone(),
                    row.duration.clone(),
                    row.notes.clone(),
                ]
            })
            .collect();

        let mut widths = headers.map(|h| h.chars().count());
        for row in &cells {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let columns = [
            None,
            Some(SortColumn::Date),
            Some(SortColumn::Route),
            Some(SortColumn::Aircraft),
            Some(SortColumn::Type),
            Some(SortColumn::Duration),
            Some(SortColumn::Notes),
        ];

        let mut out = String::new();
        let header_cells: Vec<String> = headers
            .iter()
            .zip(columns)
            .map(|(h, column)| {
                let marker = match column.map(|c| self.indicator(c)) {
                    Some(SortIndicator::Ascending) => " ▲",
                    Some(SortIndicator::Descending) => " ▼",
                    _ => "",
                };
                format!("{}{}", h, marker)
            })
            .collect();
        write_line(&mut out, &header_cells, &widths);
        for row in &cells {
            write_line(&mut out, row, &widths);
        }
        out
    }
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &w)| {
            let pad = (w + 2).saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    let _ = writeln!(out, "{}", line.concat().trim_end());
}

pub fn project(view: &[IndexedFlight<'_>], sort: SortState) -> Table {
    Table {
        rows: view
            .iter()
            .map(|(index, record)| TableRow::project(*index, record))
            .collect(),
        sort,
    }
}

/// Filters, sorts and projects the store in one go.
pub fn render(records: &[FlightRecord], filters: &FilterState, sort: &SortState) -> Table {
    project(&view::derive(records, filters, sort), *sort)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FlightType;

    fn flight(day: u32, notes: Option<&str>) -> FlightRecord {
        FlightRecord {
            id: format!("id{}", day),
            date: NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
            duration: 0.5 + day as f64,
            departure: "KJFK".to_string(),
            arrival: "KBOS".to_string(),
            aircraft: "PA28".to_string(),
            flight_type: FlightType::CrossCountry,
            notes: notes.map(str::to_string),
        }
    }

    #[test]
    fn test_row_projection() {
        let row = TableRow::project(3, &flight(6, None));
        assert_eq!(row.index, 3);
        assert_eq!(row.date, "Oct 6, 2026");
        assert_eq!(row.route, "KJFK → KBOS");
        assert_eq!(row.type_badge, "cross-country");
        assert_eq!(row.duration, "6.5h");
        assert_eq!(row.notes, "-");
        assert_eq!(row.notes_tooltip, "No notes");

        let row = TableRow::project(0, &flight(6, Some("night landing")));
        assert_eq!(row.notes, "night landing");
        assert_eq!(row.notes_tooltip, "night landing");
    }

    #[test]
    fn test_render_keeps_store_indices() {
        let records = vec![flight(1, None), flight(20, None), flight(9, None)];
        let table = render(&records, &FilterState::default(), &SortState::default());

        let indices: Vec<usize> = table.rows.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![1, 2, 0]);
        assert_eq!(table.index_at(0), Some(1));
        assert_eq!(table.indicator(SortColumn::Date), SortIndicator::Descending);
        assert_eq!(table.indicator(SortColumn::Notes), SortIndicator::Inactive);
    }

    #[test]
    fn test_text_output() {
        let empty = render(&[], &FilterState::default(), &SortState::default());
        assert!(empty.is_empty());
        assert_eq!(empty.to_text().trim(), EMPTY_STATE);

        let table = render(&[flight(2, Some("crosswind"))], &FilterState::default(), &SortState::default());
        let text = table.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("#"));
        assert!(lines[0].contains("Date ▼"));
        assert!(lines[1].contains("KJFK → KBOS"));
        assert!(lines[1].ends_with("crosswind"));
    }
}
