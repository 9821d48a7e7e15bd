// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! The controlling object: owns the store, view state, edit form and map, and
//! turns every user action into a [`Notice`].

use crate::airports::AirportDirectory;
use crate::autocomplete::Autocomplete;
use crate::config::Config;
use crate::export::{self, ExportError};
use crate::form::{EditSession, FlightForm, FormController, FormError, SubmitKind};
use crate::map::{BoundingBox, CoordinateResolver, Geocoder, MapPlotter, MapSurface};
use crate::record::FlightRecord;
use crate::stats::Statistics;
use crate::storage::KeyValueStore;
use crate::store::{FlightStore, StoreError};
use crate::table::{self, Table};
use crate::view::{self, FilterOptions, FilterState, SortColumn, SortState};
use crate::FlightLogError;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
    Warning,
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Warning,
            text: text.into(),
        }
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub struct FlightLogApp<S: KeyValueStore, M: MapSurface> {
    store: FlightStore<S>,
    directory: Arc<AirportDirectory>,
    filters: FilterState,
    sort: SortState,
    form: FormController,
    plotter: MapPlotter,
    surface: M,
    config: Config,
    today: fn() -> NaiveDate,
    /// Set once a host asks for the map; until then nothing is plotted.
    map_shown: bool,
}

impl<S: KeyValueStore, M: MapSurface> FlightLogApp<S, M> {
    /// Opens the store behind `backend`. The map stays empty until
    /// [`Self::show_map`] is called.
    pub fn new(
        backend: S,
        directory: Arc<AirportDirectory>,
        geocoder: Option<Box<dyn Geocoder>>,
        surface: M,
        config: Config,
    ) -> Self {
        let resolver = CoordinateResolver::new(Arc::clone(&directory), geocoder);
        let plotter = MapPlotter::new(resolver, &config.map);
        Self {
            store: FlightStore::open(backend),
            directory,
            filters: FilterState::default(),
            sort: SortState::default(),
            form: FormController::new(local_today()),
            plotter,
            surface,
            config,
            today: local_today,
            map_shown: false,
        }
    }

    /// Replaces the date source used for form resets.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self.form.reset(today());
        self
    }

    pub fn store(&self) -> &FlightStore<S> {
        &self.store
    }

    pub fn records(&self) -> &[FlightRecord] {
        self.store.all()
    }

    pub fn directory(&self) -> &Arc<AirportDirectory> {
        &self.directory
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn form(&self) -> &FlightForm {
        &self.form.form
    }

    pub fn form_mut(&mut self) -> &mut FlightForm {
        &mut self.form.form
    }

    pub fn edit_session(&self) -> EditSession {
        self.form.session()
    }

    // --- Form ---

    /// Validates and saves the form. On success the form resets and the map
    /// is redrawn; on a validation error nothing changes.
    pub fn submit(&mut self) -> Notice {
        let today = (self.today)();
        match self.form.submit(&mut self.store, today) {
            Ok(outcome) => {
                self.refresh_map();
                match (outcome.persist_error, outcome.kind) {
                    (Some(e), _) => Notice::warning(format!("Flight saved for this session only: {}", e)),
                    (None, SubmitKind::Added) => Notice::success("Flight logged successfully!"),
                    (None, SubmitKind::Updated) => Notice::success("Flight updated successfully!"),
                }
            }
            Err(FormError::Validation(e)) => Notice::error(e.to_string()),
            Err(FormError::Store(e)) => Notice::error(e.to_string()),
        }
    }

    /// Loads record `index` into the form for editing.
    pub fn edit(&mut self, index: usize) -> Result<&FlightForm, FlightLogError> {
        let record = self.record_at(index)?.clone();
        self.form.begin_edit(index, &record);
        Ok(&self.form.form)
    }

    pub fn cancel_edit(&mut self) {
        self.form.cancel_edit((self.today)());
    }

    // --- Row actions ---

    /// Removes record `index` once `confirm` agrees. Returns `Ok(None)` when
    /// the user declined.
    pub fn delete<F>(&mut self, index: usize, confirm: F) -> Result<Option<Notice>, FlightLogError>
    where
        F: FnOnce(&FlightRecord) -> bool,
    {
        let record = self.record_at(index)?;
        if !confirm(record) {
            log::debug!("Delete declined — index={}", index);
            return Ok(None);
        }

        let persist_error = match self.store.remove(index) {
            Ok(_) => None,
            Err(e @ StoreError::IndexOutOfRange { .. }) => return Err(e.into()),
            Err(e) => Some(e),
        };
        self.form.on_removed(index, (self.today)());
        self.refresh_map();

        Ok(Some(match persist_error {
            None => Notice::success("Flight deleted successfully!"),
            Some(e) => Notice::warning(format!("Flight deleted for this session only: {}", e)),
        }))
    }

    /// Fits the map to one flight's endpoints.
    pub fn locate(&mut self, index: usize) -> Result<(Notice, BoundingBox), FlightLogError> {
        let record = self.record_at(index)?.clone();
        let bounds = self.plotter.locate(&mut self.surface, &record);
        let notice = Notice::info(format!(
            "Highlighted flight: {} → {} on {}",
            record.departure,
            record.arrival,
            table::format_date(record.date)
        ));
        Ok((notice, bounds))
    }

    // --- View ---

    /// Replaces the filters. The map is redrawn only when they changed.
    pub fn set_filters(&mut self, filters: FilterState) {
        if filters == self.filters {
            return;
        }
        self.filters = filters;
        self.refresh_map();
    }

    pub fn clear_filters(&mut self) {
        self.set_filters(FilterState::default());
    }

    /// Header click: same column flips direction, a new column starts ascending.
    pub fn sort_by(&mut self, column: SortColumn) {
        self.sort.toggle(column);
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.sort = sort;
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::compute(self.store.all())
    }

    pub fn table(&self) -> Table {
        table::render(self.store.all(), &self.filters, &self.sort)
    }

    pub fn filter_options(&self) -> FilterOptions {
        view::filter_options(self.store.all())
    }

    // --- Map ---

    pub fn is_map_shown(&self) -> bool {
        self.map_shown
    }

    /// Draws the filtered flights and keeps the map in sync with later
    /// changes. Returns how many flights were drawn.
    pub fn show_map(&mut self) -> usize {
        self.map_shown = true;
        self.plot_view()
    }

    fn refresh_map(&mut self) {
        if self.map_shown {
            self.plot_view();
        }
    }

    /// Redraws the filtered flights in store order.
    fn plot_view(&mut self) -> usize {
        let flights: Vec<&FlightRecord> = view::filter(self.store.all(), &self.filters)
            .into_iter()
            .map(|(_, record)| record)
            .collect();
        self.plotter.plot(&mut self.surface, &flights)
    }

    pub fn clear_map(&mut self) {
        self.plotter.clear(&mut self.surface);
    }

    pub fn fit_map(&mut self) -> bool {
        self.plotter.fit(&mut self.surface)
    }

    fn record_at(&self, index: usize) -> Result<&FlightRecord, StoreError> {
        self.store.get(index).ok_or(StoreError::IndexOutOfRange {
            index,
            len: self.store.len(),
        })
    }

    // --- Export ---

    /// Default file name for an export made today.
    pub fn export_filename(&self) -> String {
        export::export_filename((self.today)())
    }

    /// Exports the whole store, ignoring filters.
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Notice {
        match export::export_to_file(self.store.all(), path) {
            Ok(_) => Notice::success("Flight log exported successfully!"),
            Err(ExportError::Empty) => Notice::warning(ExportError::Empty.to_string()),
            Err(e) => Notice::error(e.to_string()),
        }
    }

    // --- Autocomplete ---

    /// A fresh widget bound to the airport directory.
    pub fn autocomplete(&self) -> Autocomplete {
        Autocomplete::new(Arc::clone(&self.directory), &self.config.autocomplete)
    }
}
