// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Airport code autocomplete bound to one text input.
//!
//! Time is injected by the host (`now` arguments) so the widget has no
//! threads or timers of its own. The host calls [`Autocomplete::tick`] from its
//! event loop, or whenever [`Autocomplete::next_deadline`] passes.

use crate::airports::AirportDirectory;
use crate::config::AutocompleteConfig;
use crate::search;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Identifies one scheduled piece of work. Only the most recent ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// A cancelable single-slot timer. Scheduling replaces whatever was pending.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
        }
    }

    pub fn schedule(&mut self, payload: T, now: Instant) -> Ticket {
        self.generation += 1;
        self.pending = Some((now + self.delay, payload));
        Ticket(self.generation)
    }

    /// Drops the pending payload. Any ticket handed out so far becomes stale.
    pub fn cancel(&mut self) -> bool {
        self.generation += 1;
        self.pending.take().is_some()
    }

    /// Fires the pending payload once its quiet interval has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<(Ticket, T)> {
        let due = matches!(&self.pending, Some((deadline, _)) if now >= *deadline);
        if !due {
            return None;
        }
        let (_, payload) = self.pending.take()?;
        Some((Ticket(self.generation), payload))
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub score: u32,
}

impl From<search::SearchHit<'_>> for Suggestion {
    fn from(hit: search::SearchHit<'_>) -> Self {
        Self {
            code: hit.airport.code.clone(),
            name: hit.airport.name.clone(),
            city: hit.airport.city.clone(),
            country: hit.airport.country.clone(),
            score: hit.score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownState {
    Idle,
    Pending,
    Open,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Down,
    Up,
    Enter,
    Escape,
    Other,
}

pub struct Autocomplete {
    directory: Arc<AirportDirectory>,
    max_results: usize,
    input: String,
    query_timer: Debouncer<String>,
    close_timer: Debouncer<()>,
    options: Vec<Suggestion>,
    highlighted: usize,
    open: bool,
    touched: bool,
}

impl Autocomplete {
    pub fn new(directory: Arc<AirportDirectory>, config: &AutocompleteConfig) -> Self {
        Self {
            directory,
            max_results: config.max_results,
            input: String::new(),
            query_timer: Debouncer::new(Duration::from_millis(config.debounce_ms)),
            close_timer: Debouncer::new(Duration::from_millis(config.blur_grace_ms)),
            options: Vec::new(),
            highlighted: 0,
            open: false,
            touched: false,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn options(&self) -> &[Suggestion] {
        &self.options
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.open.then_some(self.highlighted)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self) -> DropdownState {
        if self.query_timer.is_pending() {
            DropdownState::Pending
        } else if self.open {
            DropdownState::Open
        } else if self.touched {
            DropdownState::Closed
        } else {
            DropdownState::Idle
        }
    }

    /// Earliest instant at which [`Self::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.query_timer.deadline(), self.close_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Keystroke: restarts the quiet interval for the new text.
    pub fn on_input(&mut self, text: &str, now: Instant) -> Ticket {
        self.touched = true;
        self.input = text.to_string();
        self.query_timer.schedule(self.input.clone(), now)
    }

    /// Focus re-opens the dropdown straight away when there is text to search.
    pub fn on_focus(&mut self) {
        self.close_timer.cancel();
        if self.input.is_empty() {
            return;
        }
        self.query_timer.cancel();
        let results = self.run_search(&self.input);
        self.show(results);
    }

    /// Blur closes after a grace period so a pointer selection still lands.
    pub fn on_blur(&mut self, now: Instant) {
        self.close_timer.schedule((), now);
    }

    /// Runs whatever timers have elapsed. Returns true when the dropdown changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if let Some((ticket, query)) = self.query_timer.poll(now) {
            let results = self.run_search(&query);
            changed |= self.apply_results(ticket, results);
        }

        if self.close_timer.poll(now).is_some() && self.open {
            self.close();
            changed = true;
        }

        changed
    }

    /// Installs results produced for `ticket`. Results for anything but the
    /// latest scheduled query are discarded.
    pub fn apply_results(&mut self, ticket: Ticket, results: Vec<Suggestion>) -> bool {
        if !self.query_timer.is_current(ticket) {
            log::debug!("Discarding stale autocomplete results — ticket={:?}", ticket);
            return false;
        }
        self.show(results);
        true
    }

    /// Keyboard navigation. Returns the committed code on Enter.
    pub fn on_key(&mut self, key: Key) -> Option<String> {
        if !self.open {
            return None;
        }

        match key {
            Key::Down => {
                self.highlighted = (self.highlighted + 1).min(self.options.len() - 1);
                None
            }
            Key::Up => {
                self.highlighted = self.highlighted.saturating_sub(1);
                None
            }
            Key::Enter => self.commit(self.highlighted),
            Key::Escape => {
                self.close();
                None
            }
            Key::Other => None,
        }
    }

    /// Pointer selection of an option.
    pub fn select(&mut self, index: usize) -> Option<String> {
        if !self.open {
            return None;
        }
        self.close_timer.cancel();
        self.commit(index)
    }

    fn commit(&mut self, index: usize) -> Option<String> {
        let code = self.options.get(index)?.code.clone();
        self.input = code.clone();
        self.query_timer.cancel();
        self.close();
        Some(code)
    }

    fn run_search(&self, query: &str) -> Vec<Suggestion> {
        search::search(&self.directory, query, self.max_results)
            .into_iter()
            .map(Suggestion::from)
            .collect()
    }

    fn show(&mut self, results: Vec<Suggestion>) {
        self.open = !results.is_empty();
        self.options = results;
        self.highlighted = 0;
    }

    fn close(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> Autocomplete {
        Autocomplete::new(AirportDirectory::builtin(), &AutocompleteConfig::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_debouncer_fires_after_quiet_interval() {
        let start = Instant::now();
        let mut timer = Debouncer::new(ms(150));
        timer.schedule("a", start);

        assert!(timer.poll(start + ms(100)).is_none());
        let (ticket, payload) = timer.poll(start + ms(150)).unwrap();
        assert_eq!(payload, "a");
        assert!(timer.is_current(ticket));
        assert!(timer.poll(start + ms(500)).is_none());
    }

    #[test]
    fn test_debouncer_reschedule_cancels_previous() {
        let start = Instant::now();
        let mut timer = Debouncer::new(ms(150));
        let first = timer.schedule("j", start);
        let second = timer.schedule("jf", start + ms(100));

        assert!(!timer.is_current(first));
        assert!(timer.is_current(second));
        assert!(timer.poll(start + ms(200)).is_none());
        assert_eq!(timer.poll(start + ms(250)).map(|(_, p)| p), Some("jf"));
    }

    #[test]
    fn test_typing_opens_dropdown_after_debounce() {
        let start = Instant::now();
        let mut ac = widget();
        ac.on_input("j", start);
        ac.on_input("jf", start + ms(50));
        ac.on_input("jfk", start + ms(100));
        assert_eq!(ac.state(), DropdownState::Pending);

        assert!(!ac.tick(start + ms(200)));
        assert!(ac.tick(start + ms(250)));
        assert_eq!(ac.state(), DropdownState::Open);
        assert_eq!(ac.options()[0].code, "JFK");
        assert_eq!(ac.highlighted(), Some(0));
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let start = Instant::now();
        let mut ac = widget();
        let old = ac.on_input("lax", start);
        let _new = ac.on_input("lh", start + ms(10));

        let stale = vec![Suggestion {
            code: "LAX".into(),
            name: "x".into(),
            city: "y".into(),
            country: "US".into(),
            score: 1000,
        }];
        assert!(!ac.apply_results(old, stale));
        assert!(!ac.is_open());
    }

    #[test]
    fn test_no_results_closes() {
        let start = Instant::now();
        let mut ac = widget();
        ac.on_input("qqqqqq", start);
        ac.tick(start + ms(150));
        assert!(!ac.is_open());
        assert_eq!(ac.state(), DropdownState::Closed);
    }

    #[test]
    fn test_keyboard_navigation_clamps_and_commits() {
        let start = Instant::now();
        let mut ac = widget();
        ac.on_input("new york", start);
        ac.tick(start + ms(150));
        let n = ac.options().len();
        assert!(n >= 2);

        ac.on_key(Key::Up);
        assert_eq!(ac.highlighted(), Some(0));
        for _ in 0..n + 3 {
            ac.on_key(Key::Down);
        }
        assert_eq!(ac.highlighted(), Some(n - 1));

        ac.on_key(Key::Up);
        let expected = ac.options()[n - 2].code.clone();
        let committed = ac.on_key(Key::Enter);
        assert_eq!(committed.as_deref(), Some(expected.as_str()));
        assert_eq!(ac.input(), expected);
        assert!(!ac.is_open());
    }

    #[test]
    fn test_escape_closes_without_commit() {
        let start = Instant::now();
        let mut ac = widget();
        ac.on_input("den", start);
        ac.tick(start + ms(150));
        assert!(ac.is_open());

        assert_eq!(ac.on_key(Key::Escape), None);
        assert!(!ac.is_open());
        assert_eq!(ac.input(), "den");
    }

    #[test]
    fn test_focus_reopens_without_debounce() {
        let start = Instant::now();
        let mut ac = widget();
        ac.on_input("lax", start);
        ac.tick(start + ms(150));
        ac.on_key(Key::Escape);

        ac.on_focus();
        assert!(ac.is_open());
        assert_eq!(ac.options()[0].code, "LAX");
    }

    #[test]
    fn test_blur_grace_allows_pointer_selection() {
        let start = Instant::now();
        let mut ac = widget();
        ac.on_input("lax", start);
        ac.tick(start + ms(150));

        ac.on_blur(start + ms(200));
        assert!(!ac.tick(start + ms(300)));
        assert!(ac.is_open());

        assert_eq!(ac.select(0).as_deref(), Some("LAX"));
        assert_eq!(ac.input(), "LAX");
        assert!(!ac.tick(start + ms(500)));
    }

    #[test]
    fn test_blur_closes_after_grace() {
        let start = Instant::now();
        let mut ac = widget();
        ac.on_input("lax", start);
        ac.tick(start + ms(150));

        ac.on_blur(start + ms(200));
        assert_eq!(ac.next_deadline(), Some(start + ms(400)));
        assert!(ac.tick(start + ms(400)));
        assert!(!ac.is_open());
    }
}
