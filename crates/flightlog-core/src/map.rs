// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Route plotting against an external map renderer.
//!
//! The renderer is reached only through [`MapSurface`]; [`SceneSurface`]
//! records the drawing as plain data for hosts that render elsewhere.

use crate::airports::{normalize_code, AirportDirectory};
use crate::config::{GeocodingConfig, MapConfig};
use crate::record::{FlightRecord, FlightType};
use crate::table::format_date;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Geographic center of the contiguous US.
pub const DEFAULT_FALLBACK: Coordinate = Coordinate::new(39.8283, -98.5795);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    pub fn around(point: Coordinate) -> Self {
        Self::new(point.lat, point.lat, point.lon, point.lon)
    }

    pub fn from_points<I: IntoIterator<Item = Coordinate>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::around(first), |mut bounds, p| {
            bounds.extend(p);
            bounds
        }))
    }

    pub fn extend(&mut self, point: Coordinate) {
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lat = self.max_lat.max(point.lat);
        self.min_lon = self.min_lon.min(point.lon);
        self.max_lon = self.max_lon.max(point.lon);
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

/// Line color per flight type.
pub fn route_color(flight_type: &FlightType) -> &'static str {
    match flight_type {
        FlightType::Training => "#f39c12",
        FlightType::Commercial => "#3498db",
        FlightType::Personal => "#27ae60",
        FlightType::CrossCountry => "#e74c3c",
        FlightType::Other(_) => "#95a5a6",
    }
}

// --- Geocoding ---

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Free-text place search used when the directory has no entry for a code.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Address search against a Nominatim-compatible endpoint.
pub struct NominatimGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        log::debug!("Geocoding — endpoint={} query={:?}", self.endpoint, query);

        let places: Vec<NominatimPlace> = self
            .client
            .get(&self.endpoint)
            .query(&[("format", "json"), ("q", query), ("limit", "1")])
            .send()?
            .error_for_status()?
            .json()?;

        parse_first_place(places)
    }
}

fn parse_first_place(places: Vec<NominatimPlace>) -> Result<Option<Coordinate>, GeocodeError> {
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };
    let lat = place
        .lat
        .parse::<f64>()
        .map_err(|e| GeocodeError::Parse(format!("lat {:?}: {}", place.lat, e)))?;
    let lon = place
        .lon
        .parse::<f64>()
        .map_err(|e| GeocodeError::Parse(format!("lon {:?}: {}", place.lon, e)))?;
    Ok(Some(Coordinate::new(lat, lon)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateSource {
    Directory,
    Geocoded,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Resolution {
    pub coordinate: Coordinate,
    pub source: CoordinateSource,
}

/// Directory first, then one geocoding attempt, then the fallback coordinate.
/// Never fails.
pub struct CoordinateResolver {
    directory: Arc<AirportDirectory>,
    geocoder: Option<Box<dyn Geocoder>>,
    fallback: Coordinate,
    geocoded: Mutex<HashMap<String, Coordinate>>,
}

impl CoordinateResolver {
    pub fn new(directory: Arc<AirportDirectory>, geocoder: Option<Box<dyn Geocoder>>) -> Self {
        Self {
            directory,
            geocoder,
            fallback: DEFAULT_FALLBACK,
            geocoded: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_fallback(mut self, fallback: Coordinate) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn directory(&self) -> &AirportDirectory {
        &self.directory
    }

    pub fn resolve(&self, code: &str) -> Resolution {
        if let Some(airport) = self.directory.get(&normalize_code(code)) {
            return Resolution {
                coordinate: airport.coordinate(),
                source: CoordinateSource::Directory,
            };
        }

        let fallback = Resolution {
            coordinate: self.fallback,
            source: CoordinateSource::Fallback,
        };
        let Some(geocoder) = &self.geocoder else {
            log::debug!("Airport not in directory and geocoding disabled — code={}", code);
            return fallback;
        };

        let cached = self.geocoded.lock().ok().and_then(|cache| cache.get(code).copied());
        if let Some(coordinate) = cached {
            return Resolution {
                coordinate,
                source: CoordinateSource::Geocoded,
            };
        }

        match geocoder.geocode(&format!("{} airport", code)) {
            Ok(Some(coordinate)) => {
                if let Ok(mut cache) = self.geocoded.lock() {
                    cache.insert(code.to_string(), coordinate);
                }
                Resolution {
                    coordinate,
                    source: CoordinateSource::Geocoded,
                }
            }
            Ok(None) => {
                log::warn!("Geocoding found no match; using fallback — code={}", code);
                fallback
            }
            Err(e) => {
                log::warn!("Geocoding failed; using fallback — code={} error={}", code, e);
                fallback
            }
        }
    }
}

// --- Drawing ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Departure,
    Arrival,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub coordinate: Coordinate,
    pub kind: MarkerKind,
    pub label: String,
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteLine {
    pub flight_id: String,
    pub from: Coordinate,
    pub to: Coordinate,
    pub color: String,
    pub popup: String,
}

/// The drawing primitives the plotter needs from a map renderer.
pub trait MapSurface {
    fn clear(&mut self);
    fn add_marker(&mut self, marker: Marker);
    fn add_line(&mut self, line: RouteLine);
    /// Bounds of everything currently drawn, `None` when empty.
    fn drawn_bounds(&self) -> Option<BoundingBox>;
    fn fit_bounds(&mut self, bounds: BoundingBox, padding_px: u32);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub bounds: BoundingBox,
    pub padding_px: u32,
}

/// A [`MapSurface`] that keeps the drawing as data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneSurface {
    pub markers: Vec<Marker>,
    pub lines: Vec<RouteLine>,
    pub viewport: Option<Viewport>,
}

impl SceneSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapSurface for SceneSurface {
    fn clear(&mut self) {
        self.markers.clear();
        self.lines.clear();
    }

    fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    fn add_line(&mut self, line: RouteLine) {
        self.lines.push(line);
    }

    fn drawn_bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.markers
                .iter()
                .map(|m| m.coordinate)
                .chain(self.lines.iter().flat_map(|l| [l.from, l.to])),
        )
    }

    fn fit_bounds(&mut self, bounds: BoundingBox, padding_px: u32) {
        self.viewport = Some(Viewport { bounds, padding_px });
    }
}

pub struct MapPlotter {
    resolver: CoordinateResolver,
    padding_px: u32,
}

impl MapPlotter {
    pub fn new(resolver: CoordinateResolver, config: &MapConfig) -> Self {
        let [lat, lon] = config.fallback;
        Self {
            resolver: resolver.with_fallback(Coordinate::new(lat, lon)),
            padding_px: config.fit_padding_px,
        }
    }

    pub fn resolver(&self) -> &CoordinateResolver {
        &self.resolver
    }

    /// Redraws `flights` from scratch and fits the viewport around them.
    ///
    /// Endpoints are resolved in parallel; drawing follows the order of
    /// `flights` so later routes layer over earlier ones.
    pub fn plot<M: MapSurface>(&self, surface: &mut M, flights: &[&FlightRecord]) -> usize {
        surface.clear();

        let endpoints: Vec<(Coordinate, Coordinate)> = flights
            .par_iter()
            .map(|flight| {
                (
                    self.resolver.resolve(&flight.departure).coordinate,
                    self.resolver.resolve(&flight.arrival).coordinate,
                )
            })
            .collect();

        for (flight, (dep, arr)) in flights.iter().zip(endpoints) {
            draw_flight(surface, flight, dep, arr);
        }

        self.fit(surface);
        log::debug!("Plotted flights — count={}", flights.len());
        flights.len()
    }

    /// Re-fits the viewport to what is drawn. No-op on an empty map.
    pub fn fit<M: MapSurface>(&self, surface: &mut M) -> bool {
        match surface.drawn_bounds() {
            Some(bounds) => {
                surface.fit_bounds(bounds, self.padding_px);
                true
            }
            None => false,
        }
    }

    pub fn clear<M: MapSurface>(&self, surface: &mut M) {
        surface.clear();
    }

    /// Focuses the viewport on one flight's endpoints without redrawing.
    pub fn locate<M: MapSurface>(&self, surface: &mut M, flight: &FlightRecord) -> BoundingBox {
        let dep = self.resolver.resolve(&flight.departure).coordinate;
        let arr = self.resolver.resolve(&flight.arrival).coordinate;
        let mut bounds = BoundingBox::around(dep);
        bounds.extend(arr);
        surface.fit_bounds(bounds, self.padding_px);
        bounds
    }
}

fn draw_flight<M: MapSurface>(surface: &mut M, flight: &FlightRecord, dep: Coordinate, arr: Coordinate) {
    surface.add_marker(Marker {
        coordinate: dep,
        kind: MarkerKind::Departure,
        label: flight.departure.clone(),
        popup: format!("{}\nDeparture", flight.departure),
    });
    surface.add_marker(Marker {
        coordinate: arr,
        kind: MarkerKind::Arrival,
        label: flight.arrival.clone(),
        popup: format!("{}\nArrival", flight.arrival),
    });

    let mut popup = format!(
        "{} → {}\nDate: {}\nAircraft: {}\nDuration: {}h\nType: {}",
        flight.departure,
        flight.arrival,
        format_date(flight.date),
        flight.aircraft,
        flight.duration,
        flight.flight_type
    );
    if let Some(notes) = &flight.notes {
        popup.push_str(&format!("\nNotes: {}", notes));
    }

    surface.add_line(RouteLine {
        flight_id: flight.id.clone(),
        from: dep,
        to: arr,
        color: route_color(&flight.flight_type).to_string(),
        popup,
    });
}
