//! Domain DTOs for the Pushwoosh API.
//!
//! # Design
//! Request-side types (`Content`, `Condition`, `Notification`, `ZoneSpec`)
//! serialize into the exact JSON shapes the remote API expects. Response-side
//! types (`Cluster`, `ZoneGroup`, `GeoZone`, `ResponseEnvelope`) are lenient:
//! optional fields default rather than fail, since the remote schema is not
//! under our control.

use std::collections::BTreeMap;

use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Push text: one string for every locale, or a per-language map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Localized(BTreeMap<String, String>),
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<BTreeMap<String, String>> for Content {
    fn from(map: BTreeMap<String, String>) -> Self {
        Content::Localized(map)
    }
}

/// Comparison used by a recipient filter condition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operator {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "EQ")]
    Eq,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::In => "IN",
            Operator::Eq => "EQ",
        }
    }
}

/// A recipient filter, sent as the 3-element array `[field, operator, value]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.field)?;
        tuple.serialize_element(&self.operator)?;
        tuple.serialize_element(&self.value)?;
        tuple.end()
    }
}

/// A single notification inside a `createMessage` request.
///
/// Backed by an ordered JSON object because callers may merge arbitrary
/// top-level keys into it (see `builder::build_notification`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Notification(Map<String, Value>);

impl Notification {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a top-level key, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Latitude or longitude as the caller supplied it.
///
/// The API takes numbers and decimal strings alike, so both are passed
/// through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
}

impl Default for Coordinate {
    fn default() -> Self {
        Coordinate::Number(0.0)
    }
}

impl From<f64> for Coordinate {
    fn from(value: f64) -> Self {
        Coordinate::Number(value)
    }
}

impl From<&str> for Coordinate {
    fn from(value: &str) -> Self {
        Coordinate::Text(value.to_string())
    }
}

impl From<String> for Coordinate {
    fn from(value: String) -> Self {
        Coordinate::Text(value)
    }
}

/// A geo-zone as submitted to `addGeoZone`.
///
/// `name`, `range` and `cooldown` are optional here; missing ones are filled
/// by `builder::apply_zone_defaults` right before the request is built. Keys
/// the API knows about but this type does not are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ZoneSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    pub lat: Coordinate,
    pub lng: Coordinate,
    /// Code of the cluster the zone joins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Radius in meters. The API accepts 50..=1000.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<u32>,
    /// Silent period after a push, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<u64>,
    #[serde(rename = "presetCode", skip_serializing_if = "Option::is_none")]
    pub preset_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ZoneSpec {
    pub fn new(lat: f64, lng: f64, content: impl Into<Content>) -> Self {
        Self {
            content: Some(content.into()),
            lat: Coordinate::Number(lat),
            lng: Coordinate::Number(lng),
            ..Self::default()
        }
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A geo-zone cluster as returned by `listGeoZoneClusters`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cluster {
    pub name: String,
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cooldown: u64,
    /// Number of zones in the cluster.
    #[serde(default, deserialize_with = "null_as_default")]
    pub geozones: u64,
}

/// A geo-zone as returned by `listGeoZones`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoZone {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cooldown: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub range: u32,
    #[serde(rename = "presetCode", default)]
    pub preset_code: Option<String>,
    #[serde(default)]
    pub content: Option<Content>,
}

/// Zones grouped under the cluster they belong to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneGroup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "geoZones", default, deserialize_with = "null_as_default")]
    pub geo_zones: Vec<GeoZone>,
}

/// The reply wrapper every endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope {
    pub status_code: i64,
    pub status_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
}

impl ResponseEnvelope {
    /// Both the code and the message must match; a 200 with any other
    /// message is still a failure.
    pub fn is_success(&self) -> bool {
        self.status_code == 200 && self.status_message == "OK"
    }
}
