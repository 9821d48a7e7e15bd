// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::record::FlightRecord;
use chrono::NaiveDate;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

pub const HEADERS: [&str; 7] = ["Date", "Departure", "Arrival", "Aircraft", "Type", "Hours", "Notes"];

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No flights to export!")]
    Empty,
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// `flight-log-2026-10-16.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("flight-log-{}.csv", date.format("%Y-%m-%d"))
}

/// Writes every record, in store order, as CSV. The header row is bare;
/// every data field is quoted with embedded quotes doubled, so values such
/// as an aircraft named `737` stay text.
pub fn write_csv<W: Write>(records: &[FlightRecord], mut writer: W) -> Result<usize, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    {
        let mut header = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut writer);
        header.write_record(HEADERS)?;
        header.flush()?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(&mut writer);

    for record in records {
        let date = record.date.format("%Y-%m-%d").to_string();
        let duration = record.duration.to_string();
        wtr.write_record([
            date.as_str(),
            record.departure.as_str(),
            record.arrival.as_str(),
            record.aircraft.as_str(),
            record.flight_type.as_str(),
            duration.as_str(),
            record.notes_str(),
        ])?;
    }
    wtr.flush()?;

    log::debug!("Exported flights — count={}", records.len());
    Ok(records.len())
}

pub fn to_csv_string(records: &[FlightRecord]) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(records, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ExportError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Writes the export to `path`, creating parent directories as needed.
pub fn export_to_file<P: AsRef<Path>>(records: &[FlightRecord], path: P) -> Result<usize, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let count = write_csv(records, File::create(path)?)?;
    log::info!("Flight log exported — path={} count={}", path.display(), count);
    Ok(count)
}
