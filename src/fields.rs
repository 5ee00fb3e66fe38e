//! Field Type Inference
//!
//! Derives a semantic type per property name from a GeoJSON payload.
//! A field seen with two different types, or with a value that fits no
//! type (null, object, array), degrades to `any` for good.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geojson::GeoJson;

/// Semantic type of a feature property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Any,
}

impl FieldType {
    /// Classify a single property value
    pub fn of(value: &Value) -> FieldType {
        match value {
            Value::Number(_) => FieldType::Number,
            Value::Bool(_) => FieldType::Boolean,
            Value::String(s) if is_iso_date(s) => FieldType::Date,
            Value::String(_) => FieldType::String,
            _ => FieldType::Any,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Any => "any",
        }
    }
}

/// Property name to inferred type
pub type FieldMap = BTreeMap<String, FieldType>;

/// Strict UTC timestamp: `YYYY-MM-DDTHH:MM:SS(.mmm)?Z`
pub fn is_iso_date(s: &str) -> bool {
    static ISO_DATE: OnceLock<Regex> = OnceLock::new();
    ISO_DATE
        .get_or_init(|| {
            Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{3})?Z$")
                .expect("static ISO-8601 pattern is valid")
        })
        .is_match(s)
}

/// Infer property types across every feature of a payload.
/// Bare geometry yields an empty map.
pub fn infer_fields(geojson: &GeoJson) -> FieldMap {
    let mut fields = FieldMap::new();
    for feature in geojson.features() {
        let Some(properties) = &feature.properties else {
            continue;
        };
        for (name, value) in properties {
            let seen = FieldType::of(value);
            fields
                .entry(name.clone())
                .and_modify(|current| {
                    if *current != seen {
                        *current = FieldType::Any;
                    }
                })
                .or_insert(seen);
        }
    }
    fields
}
