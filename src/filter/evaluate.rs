//! Filter evaluation against a feature's property bag
//!
//! Evaluation is total: unknown operators, non-array `in` values and
//! comparisons between values of different JSON types all yield `false`.

use std::cmp::Ordering;

use serde_json::Value;

use super::{Condition, FilterNode, Operator};
use crate::geojson::{Feature, FeatureCollection, GeoJson};

static MISSING: Value = Value::Null;

/// Check whether a feature satisfies a filter tree
pub fn satisfies(feature: &Feature, filter: &FilterNode) -> bool {
    match filter {
        FilterNode::Composite { condition, filters } => match condition {
            Condition::And => filters.iter().all(|f| satisfies(feature, f)),
            Condition::Or => filters.iter().any(|f| satisfies(feature, f)),
        },
        FilterNode::Leaf {
            field,
            operator,
            value,
        } => {
            let actual = feature.property(field).unwrap_or(&MISSING);
            compare(actual, operator, value)
        }
    }
}

/// Apply a filter to a GeoJSON payload without touching the input.
///
/// - a feature is kept as-is when it satisfies the filter, otherwise
///   an empty collection is returned
/// - a collection yields a new collection of the satisfying features
/// - bare geometry has no properties and always yields an empty collection
pub fn filter_geojson(geojson: &GeoJson, filter: &FilterNode) -> GeoJson {
    match geojson {
        GeoJson::Feature(feature) if satisfies(feature, filter) => GeoJson::Feature(feature.clone()),
        GeoJson::Feature(_) | GeoJson::Geometry(_) => GeoJson::empty(),
        GeoJson::FeatureCollection(fc) => GeoJson::FeatureCollection(FeatureCollection::new(
            fc.features
                .iter()
                .filter(|f| satisfies(f, filter))
                .cloned()
                .collect(),
        )),
    }
}

fn compare(actual: &Value, operator: &Operator, expected: &Value) -> bool {
    match operator {
        Operator::Eq => values_equal(actual, expected),
        Operator::Neq => !values_equal(actual, expected),
        Operator::Gt => ordering(actual, expected) == Some(Ordering::Greater),
        Operator::Gte => matches!(
            ordering(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lt => ordering(actual, expected) == Some(Ordering::Less),
        Operator::Lte => matches!(
            ordering(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::In => match expected {
            Value::Array(items) => items.iter().any(|item| values_equal(actual, item)),
            _ => false,
        },
        Operator::NotIn => match expected {
            Value::Array(items) => !items.iter().any(|item| values_equal(actual, item)),
            _ => false,
        },
        Operator::Contains => text_test(actual, expected, |a, e| a.contains(e)),
        Operator::DoesNotContain => text_test(actual, expected, |a, e| !a.contains(e)),
        Operator::StartsWith => text_test(actual, expected, |a, e| a.starts_with(e)),
        Operator::EndsWith => text_test(actual, expected, |a, e| a.ends_with(e)),
        Operator::IsNull => actual.is_null(),
        Operator::IsNotNull => !actual.is_null(),
        Operator::IsEmpty => actual.as_str() == Some(""),
        Operator::IsNotEmpty => actual.as_str().map_or(false, |s| !s.is_empty()),
        Operator::Unknown(_) => false,
    }
}

/// Numbers compare by value (`30` equals `30.0`), everything else by JSON equality.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering between two values of the same JSON type; `None` otherwise.
fn ordering(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Case-insensitive string predicate; non-strings never match.
fn text_test(actual: &Value, expected: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
    match (actual.as_str(), expected.as_str()) {
        (Some(a), Some(e)) => test(&a.to_lowercase(), &e.to_lowercase()),
        _ => false,
    }
}
