// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::record::{FlightRecord, FlightType};
use crate::storage::KeyValueStore;
use crate::store::{FlightStore, StoreError};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please fill in all required fields.")]
    MissingField(&'static str),
    #[error("Invalid date '{0}', expected YYYY-MM-DD.")]
    InvalidDate(String),
    #[error("Invalid flight duration '{0}'.")]
    InvalidDuration(String),
    #[error("Flight duration must be greater than 0.")]
    NonPositiveDuration,
}

#[derive(Error, Debug)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Raw entry-form contents, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightForm {
    pub date: String,
    pub duration: String,
    pub departure: String,
    pub arrival: String,
    pub aircraft: String,
    pub flight_type: String,
    pub notes: String,
}

impl FlightForm {
    /// Empty form dated today.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            date: today.format("%Y-%m-%d").to_string(),
            ..Default::default()
        }
    }

    pub fn from_record(record: &FlightRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            duration: record.duration.to_string(),
            departure: record.departure.clone(),
            arrival: record.arrival.clone(),
            aircraft: record.aircraft.clone(),
            flight_type: record.flight_type.to_string(),
            notes: record.notes_str().to_string(),
        }
    }

    /// Presence checks plus a positive duration. Codes are uppercased; the
    /// returned record has no id yet.
    pub fn validate(&self) -> Result<FlightRecord, ValidationError> {
        let date = required("date", &self.date)?;
        let duration = required("duration", &self.duration)?;
        let departure = required("departure", &self.departure)?;
        let arrival = required("arrival", &self.arrival)?;
        required("aircraft", &self.aircraft)?;
        let flight_type = required("type", &self.flight_type)?;

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;

        let duration = duration
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .ok_or_else(|| ValidationError::InvalidDuration(duration.to_string()))?;
        if duration <= 0.0 {
            return Err(ValidationError::NonPositiveDuration);
        }

        Ok(FlightRecord {
            id: String::new(),
            date,
            duration,
            departure: departure.to_uppercase(),
            arrival: arrival.to_uppercase(),
            // Free text is stored as typed; only the codes are normalized.
            aircraft: self.aircraft.clone(),
            flight_type: FlightType::from(flight_type),
            notes: (!self.notes.trim().is_empty()).then(|| self.notes.clone()),
        })
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(value)
    }
}

/// Which record, if any, the form is currently editing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    None,
    Editing(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitKind {
    Added,
    Updated,
}

#[derive(Debug)]
pub struct SubmitOutcome {
    pub kind: SubmitKind,
    pub index: usize,
    pub id: String,
    /// Set when the store changed in memory but could not be written out.
    pub persist_error: Option<StoreError>,
}

/// Owns the entry form and the single edit slot.
#[derive(Debug, Clone)]
pub struct FormController {
    pub form: FlightForm,
    session: EditSession,
}

impl FormController {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            form: FlightForm::blank(today),
            session: EditSession::None,
        }
    }

    pub fn session(&self) -> EditSession {
        self.session
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.session, EditSession::Editing(_))
    }

    /// Loads `record` into the form; it replaces any edit already in progress.
    pub fn begin_edit(&mut self, index: usize, record: &FlightRecord) {
        self.form = FlightForm::from_record(record);
        self.session = EditSession::Editing(index);
    }

    pub fn cancel_edit(&mut self, today: NaiveDate) {
        self.session = EditSession::None;
        self.reset(today);
    }

    pub fn reset(&mut self, today: NaiveDate) {
        self.form = FlightForm::blank(today);
    }

    /// Validates the form and writes it to the store: a replacement when
    /// editing, an append otherwise. A validation failure leaves both the
    /// store and the form untouched.
    pub fn submit<S: KeyValueStore>(
        &mut self,
        store: &mut FlightStore<S>,
        today: NaiveDate,
    ) -> Result<SubmitOutcome, FormError> {
        let record = self.form.validate()?;

        let (kind, result) = match self.session {
            EditSession::Editing(index) => (SubmitKind::Updated, store.update(index, record).map(|_| ())),
            EditSession::None => (SubmitKind::Added, store.add(record).map(|_| ())),
        };

        let persist_error = match result {
            Ok(()) => None,
            Err(e @ StoreError::IndexOutOfRange { .. }) => {
                self.session = EditSession::None;
                return Err(e.into());
            }
            Err(e) => Some(e),
        };

        let index = match self.session {
            EditSession::Editing(index) => index,
            EditSession::None => store.len() - 1,
        };
        let id = store.get(index).map(|r| r.id.clone()).unwrap_or_default();

        self.session = EditSession::None;
        self.reset(today);

        Ok(SubmitOutcome {
            kind,
            index,
            id,
            persist_error,
        })
    }

    /// Keeps the edit slot consistent after the store removed `removed`.
    /// Returns true when the removed record was the one being edited.
    pub fn on_removed(&mut self, removed: usize, today: NaiveDate) -> bool {
        match self.session {
            EditSession::Editing(index) if index == removed => {
                self.cancel_edit(today);
                true
            }
            EditSession::Editing(index) if index > removed => {
                self.session = EditSession::Editing(index - 1);
                false
            }
            _ => false,
        }
    }
}
