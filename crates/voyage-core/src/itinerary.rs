//! Sailing itinerary reference data.
//!
//! The itinerary is read-only: a list of stops grouped into phases, loaded
//! from a JSON document of the form `{"stops": [...], "phases": [...]}`.
//! Journal entries, photos and comments refer to stops by [`Stop::id`].

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoyageError};

/// One port of call on the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub arrival: String,
    pub departure: String,
    pub duration: String,
    pub distance_to_next: f64,
    pub phase: String,
    pub schengen: bool,
    pub season: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marina_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marina_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture_highlight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub culture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adventure_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisions_url: Option<String>,
}

/// A leg of the voyage grouping consecutive stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub name: String,
    pub stops: u32,
    pub days: u32,
    pub schengen: bool,
    pub color: String,
}

/// The full route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default)]
    pub phases: Vec<Phase>,
}

impl Itinerary {
    /// Parse an itinerary from its JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let itinerary: Itinerary = serde_json::from_str(json)?;
        itinerary.validate()?;
        Ok(itinerary)
    }

    /// Load an itinerary document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            VoyageError::NotFound(format!("Itinerary {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for stop in &self.stops {
            if !seen.insert(stop.id) {
                return Err(VoyageError::Validation(format!(
                    "Duplicate stop id {} in itinerary",
                    stop.id
                )));
            }
        }
        Ok(())
    }

    /// Look up a stop by ID.
    pub fn stop(&self, id: i64) -> Option<&Stop> {
        self.stops.iter().find(|stop| stop.id == id)
    }

    /// Distinct countries on the route, sorted.
    pub fn countries(&self) -> Vec<String> {
        self.stops
            .iter()
            .map(|stop| stop.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Stops whose name or country contains `query` (case-insensitive),
    /// optionally restricted to one country. An empty query matches all.
    pub fn filter_stops(&self, query: &str, country: Option<&str>) -> Vec<&Stop> {
        let needle = query.trim().to_lowercase();
        self.stops
            .iter()
            .filter(|stop| {
                needle.is_empty()
                    || stop.name.to_lowercase().contains(&needle)
                    || stop.country.to_lowercase().contains(&needle)
            })
            .filter(|stop| country.map_or(true, |c| stop.country == c))
            .collect()
    }

    /// Names of the first and last stop, if any.
    pub fn route(&self) -> Option<(&str, &str)> {
        let first = self.stops.first()?;
        let last = self.stops.last()?;
        Some((first.name.as_str(), last.name.as_str()))
    }

    /// Phase a stop belongs to.
    pub fn phase_of(&self, stop: &Stop) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.id == stop.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "stops": [
            {"id": 1, "name": "Lefkada", "country": "Greece", "lat": 38.83, "lon": 20.71,
             "type": "marina", "arrival": "2026-05-01", "departure": "2026-05-04",
             "duration": "3 days", "distanceToNext": 42.5, "phase": "ionian",
             "schengen": true, "season": "spring", "marinaName": "Lefkas Marina"},
            {"id": 2, "name": "Kotor", "country": "Montenegro", "lat": 42.42, "lon": 18.77,
             "type": "anchorage", "arrival": "2026-05-10", "departure": "2026-05-12",
             "duration": "2 days", "distanceToNext": 0, "phase": "adriatic",
             "schengen": false, "season": "spring"},
            {"id": 3, "name": "Corfu", "country": "Greece", "lat": 39.62, "lon": 19.92,
             "type": "marina", "arrival": "2026-05-06", "departure": "2026-05-08",
             "duration": "2 days", "distanceToNext": 60, "phase": "ionian",
             "schengen": true, "season": "spring"}
        ],
        "phases": [
            {"id": "ionian", "name": "Ionian", "stops": 2, "days": 7, "schengen": true, "color": "#3b82f6"}
        ]
    }"##;

    #[test]
    fn test_parse_sample() {
        let itinerary = Itinerary::from_json(SAMPLE).unwrap();
        assert_eq!(itinerary.stops.len(), 3);
        let lefkada = itinerary.stop(1).unwrap();
        assert_eq!(lefkada.kind, "marina");
        assert_eq!(lefkada.marina_name.as_deref(), Some("Lefkas Marina"));
        assert!(itinerary.stop(99).is_none());
    }

    #[test]
    fn test_countries_sorted_unique() {
        let itinerary = Itinerary::from_json(SAMPLE).unwrap();
        assert_eq!(itinerary.countries(), vec!["Greece", "Montenegro"]);
    }

    #[test]
    fn test_filter_stops() {
        let itinerary = Itinerary::from_json(SAMPLE).unwrap();
        assert_eq!(itinerary.filter_stops("", None).len(), 3);
        assert_eq!(itinerary.filter_stops("GREE", None).len(), 2);
        let names: Vec<&str> = itinerary
            .filter_stops("k", Some("Greece"))
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Lefkada"]);
    }

    #[test]
    fn test_route_and_phase() {
        let itinerary = Itinerary::from_json(SAMPLE).unwrap();
        assert_eq!(itinerary.route(), Some(("Lefkada", "Corfu")));
        let kotor = itinerary.stop(2).unwrap();
        assert!(itinerary.phase_of(kotor).is_none());
        let corfu = itinerary.stop(3).unwrap();
        assert_eq!(itinerary.phase_of(corfu).unwrap().name, "Ionian");
    }

    #[test]
    fn test_duplicate_stop_ids_rejected() {
        let json = r#"{"stops": [
            {"id": 1, "name": "A", "country": "X", "lat": 0, "lon": 0, "type": "t",
             "arrival": "", "departure": "", "duration": "", "distanceToNext": 0,
             "phase": "p", "schengen": false, "season": ""},
            {"id": 1, "name": "B", "country": "X", "lat": 0, "lon": 0, "type": "t",
             "arrival": "", "departure": "", "duration": "", "distanceToNext": 0,
             "phase": "p", "schengen": false, "season": ""}
        ]}"#;
        assert!(matches!(
            Itinerary::from_json(json),
            Err(VoyageError::Validation(_))
        ));
    }
}
