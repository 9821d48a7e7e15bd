// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::airports::{Airport, AirportDirectory};
use serde::Serialize;

pub const DEFAULT_MAX_RESULTS: usize = 10;

const SCORE_EXACT_CODE: u32 = 1000;
const SCORE_CODE_PREFIX: u32 = 500;
const SCORE_CODE_CONTAINS: u32 = 200;
const SCORE_CITY_PREFIX: u32 = 300;
const SCORE_CITY_CONTAINS: u32 = 100;
const SCORE_NAME_CONTAINS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit<'a> {
    pub airport: &'a Airport,
    pub score: u32,
}

impl SearchHit<'_> {
    pub fn code(&self) -> &str {
        &self.airport.code
    }
}

/// Scores one entry against an already lowercased term. Zero means no match.
pub fn score(airport: &Airport, term: &str) -> u32 {
    let code = airport.code.to_lowercase();
    if code == term {
        return SCORE_EXACT_CODE;
    }

    let city = airport.city.to_lowercase();
    let name = airport.name.to_lowercase();
    let mut score = 0;

    if code.starts_with(term) {
        score += SCORE_CODE_PREFIX;
    }
    if code.contains(term) {
        score += SCORE_CODE_CONTAINS;
    }
    if city.starts_with(term) {
        score += SCORE_CITY_PREFIX;
    }
    if city.contains(term) {
        score += SCORE_CITY_CONTAINS;
    }
    if name.contains(term) {
        score += SCORE_NAME_CONTAINS;
    }

    score
}

/// Ranks the directory against a free-text query, best first.
///
/// Ties keep directory order. An empty query yields nothing.
pub fn search<'a>(directory: &'a AirportDirectory, query: &str, limit: usize) -> Vec<SearchHit<'a>> {
    let term = query.to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit<'a>> = directory
        .iter()
        .filter_map(|airport| {
            let score = score(airport, &term);
            (score > 0).then_some(SearchHit { airport, score })
        })
        .collect();

    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits.truncate(limit);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(code: &str, name: &str, city: &str) -> Airport {
        Airport {
            code: code.to_string(),
            name: name.to_string(),
            city: city.to_string(),
            country: "US".to_string(),
            lat: 0.0,
            lon: 0.0,
        }
    }

    #[test]
    fn test_exact_code_short_circuits() {
        let a = airport("JFK", "John F. Kennedy International Airport", "New York");
        assert_eq!(score(&a, "jfk"), 1000);
    }

    #[test]
    fn test_scores_are_additive() {
        // prefix + contains on the code
        assert_eq!(score(&airport("KJFK", "x", "y"), "kj"), 700);
        // contains only
        assert_eq!(score(&airport("KJFK", "x", "y"), "jf"), 200);
        // city prefix + contains + name contains
        assert_eq!(score(&airport("DENV", "Denver International", "Denver"), "den"), 500 + 200 + 300 + 100 + 50);
        assert_eq!(score(&airport("ABC", "Big Field", "Smallville"), "field"), 50);
        assert_eq!(score(&airport("ABC", "Big Field", "Smallville"), "zzz"), 0);
    }

    #[test]
    fn test_search_jfk_exact_first() {
        let directory = AirportDirectory::builtin();
        let hits = search(&directory, "jfk", DEFAULT_MAX_RESULTS);

        assert!(!hits.is_empty());
        assert_eq!(hits[0].code(), "JFK");
        assert_eq!(hits[0].score, 1000);
        assert!(hits.iter().any(|h| h.code() == "KJFK"));
    }

    #[test]
    fn test_city_prefix_outranks_name_only() {
        let directory = AirportDirectory::from_airports(vec![
            airport("NPT", "Newport State", "Middletown"),
            airport("XNY", "Metro Field", "New Haven"),
        ]);

        let hits = search(&directory, "new", DEFAULT_MAX_RESULTS);
        let codes: Vec<&str> = hits.iter().map(|h| h.code()).collect();
        assert_eq!(codes, vec!["XNY", "NPT"]);
        assert_eq!(hits[0].score, 400);
        assert_eq!(hits[1].score, 50);
    }

    #[test]
    fn test_ties_keep_directory_order() {
        let directory = AirportDirectory::from_airports(vec![
            airport("AAA", "Lake Field", "One"),
            airport("BBB", "Lake Strip", "Two"),
            airport("CCC", "Lake Park", "Three"),
        ]);
        let codes: Vec<String> = search(&directory, "lake", 10)
            .iter()
            .map(|h| h.code().to_string())
            .collect();
        assert_eq!(codes, vec!["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn test_empty_query_and_limit() {
        let directory = AirportDirectory::builtin();
        assert!(search(&directory, "", 10).is_empty());

        let hits = search(&directory, "a", DEFAULT_MAX_RESULTS);
        assert_eq!(hits.len(), DEFAULT_MAX_RESULTS);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
