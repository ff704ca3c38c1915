//! Candidate field resolvers for derived hit attributes.
//!
//! Backend records are loosely shaped: identifiers and coordinates show up
//! under several field names. Each derived attribute has an ordered list of
//! candidates and the first one that resolves wins.

use serde_json::{Map, Value};

use crate::types::Geo;

/// Identifier candidates, in priority order
pub const ID_FIELDS: &[&str] = &["id", "object_key", "objectID", "uuid"];

/// Where a coordinate pair can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoSource {
    /// Nested object with `lat` and `lng` keys
    Object(&'static str),
    /// Two top-level fields
    Pair {
        lat: &'static str,
        lng: &'static str,
    },
}

/// Coordinate candidates, in priority order
pub const GEO_SOURCES: &[GeoSource] = &[
    GeoSource::Object("_geo"),
    GeoSource::Pair {
        lat: "lat",
        lng: "lng",
    },
    GeoSource::Pair {
        lat: "lat",
        lng: "long",
    },
];

impl GeoSource {
    pub fn resolve(&self, record: &Map<String, Value>) -> Option<Geo> {
        match *self {
            GeoSource::Object(key) => {
                let obj = record.get(key)?.as_object()?;
                Some(Geo::new(
                    coordinate(obj.get("lat")?)?,
                    coordinate(obj.get("lng")?)?,
                ))
            }
            GeoSource::Pair { lat, lng } => Some(Geo::new(
                coordinate(record.get(lat)?)?,
                coordinate(record.get(lng)?)?,
            )),
        }
    }
}

/// Parse a coordinate given as a JSON number or numeric string.
pub fn coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// First identifier candidate with a usable value.
pub fn resolve_id(record: &Map<String, Value>) -> Option<String> {
    ID_FIELDS.iter().find_map(|field| match record.get(*field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First coordinate source where both coordinates resolve.
pub fn resolve_geo(record: &Map<String, Value>) -> Option<Geo> {
    GEO_SOURCES.iter().find_map(|source| source.resolve(record))
}

/// Fallback identifier for records without a usable key.
pub fn fallback_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
