//! GeoJSON Module
//!
//! The sole interchange format for layer geometry. A payload is either
//! a single feature, a feature collection, or a bare geometry.

mod feature;
mod geometry;

pub use feature::{Feature, FeatureCollection};
pub use geometry::{Geometry, GeometryKind, Position, GEOMETRY_TYPES};

use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{MapLayersError, Result};

/// Any top-level GeoJSON object
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJson {
    Feature(Feature),
    FeatureCollection(FeatureCollection),
    Geometry(Geometry),
}

impl GeoJson {
    /// An empty feature collection, the default layer payload
    pub fn empty() -> Self {
        GeoJson::FeatureCollection(FeatureCollection::default())
    }

    /// True for an empty feature collection
    pub fn is_empty_collection(&self) -> bool {
        matches!(self, GeoJson::FeatureCollection(fc) if fc.is_empty())
    }

    /// Features carried by this payload; bare geometry carries none
    pub fn features(&self) -> &[Feature] {
        match self {
            GeoJson::Feature(feature) => std::slice::from_ref(feature),
            GeoJson::FeatureCollection(fc) => &fc.features,
            GeoJson::Geometry(_) => &[],
        }
    }

    /// Consume the payload into its features
    pub fn into_features(self) -> Vec<Feature> {
        match self {
            GeoJson::Feature(feature) => vec![feature],
            GeoJson::FeatureCollection(fc) => fc.features,
            GeoJson::Geometry(_) => Vec::new(),
        }
    }
}

impl Default for GeoJson {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<FeatureCollection> for GeoJson {
    fn from(fc: FeatureCollection) -> Self {
        GeoJson::FeatureCollection(fc)
    }
}

impl From<Feature> for GeoJson {
    fn from(feature: Feature) -> Self {
        GeoJson::Feature(feature)
    }
}

impl From<Geometry> for GeoJson {
    fn from(geometry: Geometry) -> Self {
        GeoJson::Geometry(geometry)
    }
}

impl TryFrom<Value> for GeoJson {
    type Error = MapLayersError;

    fn try_from(value: Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| MapLayersError::InvalidGeoJson {
                reason: "missing 'type' member".to_string(),
            })?
            .to_string();

        match kind.as_str() {
            "Feature" => Ok(GeoJson::Feature(serde_json::from_value(value)?)),
            "FeatureCollection" => Ok(GeoJson::FeatureCollection(serde_json::from_value(value)?)),
            t if GEOMETRY_TYPES.contains(&t) => Ok(GeoJson::Geometry(serde_json::from_value(value)?)),
            other => Err(MapLayersError::InvalidGeoJson {
                reason: format!("unknown type '{}'", other),
            }),
        }
    }
}

impl FromStr for GeoJson {
    type Err = MapLayersError;

    fn from_str(s: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(s)?;
        GeoJson::try_from(value)
    }
}

impl Serialize for GeoJson {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            GeoJson::Feature(feature) => feature.serialize(serializer),
            GeoJson::FeatureCollection(fc) => fc.serialize(serializer),
            GeoJson::Geometry(geometry) => geometry.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for GeoJson {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        GeoJson::try_from(value).map_err(D::Error::custom)
    }
}
