// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One logged flight. Field names match the persisted layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    #[serde(default)]
    pub id: String,
    pub date: NaiveDate,
    /// Hours, always > 0 for records that went through the form.
    pub duration: f64,
    pub departure: String,
    pub arrival: String,
    pub aircraft: String,
    #[serde(rename = "type")]
    pub flight_type: FlightType,
    #[serde(
        default,
        serialize_with = "serialize_notes",
        deserialize_with = "deserialize_notes"
    )]
    pub notes: Option<String>,
}

impl FlightRecord {
    /// `DEP-ARR`, as used by the route filter and the route sort key.
    pub fn route(&self) -> String {
        format!("{}-{}", self.departure, self.arrival)
    }

    pub fn reverse_route(&self) -> String {
        format!("{}-{}", self.arrival, self.departure)
    }

    /// `YYYY-MM`.
    pub fn year_month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    pub fn notes_str(&self) -> &str {
        self.notes.as_deref().unwrap_or("")
    }
}

// Older payloads always carry `"notes": ""`; keep writing it that way.
fn serialize_notes<S: Serializer>(notes: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(notes.as_deref().unwrap_or(""))
}

fn deserialize_notes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// Flight category. Unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FlightType {
    Training,
    Commercial,
    Personal,
    CrossCountry,
    Other(String),
}

impl FlightType {
    pub fn as_str(&self) -> &str {
        match self {
            FlightType::Training => "Training",
            FlightType::Commercial => "Commercial",
            FlightType::Personal => "Personal",
            FlightType::CrossCountry => "Cross Country",
            FlightType::Other(label) => label,
        }
    }

    /// CSS-style badge class: lowercased, first space turned into a hyphen.
    pub fn badge_class(&self) -> String {
        self.as_str().to_lowercase().replacen(' ', "-", 1)
    }
}

impl fmt::Display for FlightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for FlightType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Training" => FlightType::Training,
            "Commercial" => FlightType::Commercial,
            "Personal" => FlightType::Personal,
            "Cross Country" => FlightType::CrossCountry,
            _ => FlightType::Other(label),
        }
    }
}

impl From<&str> for FlightType {
    fn from(label: &str) -> Self {
        FlightType::from(label.to_string())
    }
}

impl From<FlightType> for String {
    fn from(flight_type: FlightType) -> Self {
        match flight_type {
            FlightType::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for FlightType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FlightType::from(s))
    }
}
