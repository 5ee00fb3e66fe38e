//! Administrative boundaries
//!
//! Boundary polygons are loaded once and published through a watch
//! channel. Lookups that join records to boundaries wait on the channel
//! until the first set is published.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use crate::error::{MapLayersError, Result};
use crate::geojson::{FeatureCollection, GeoJson, Geometry};

/// Boundary polygons keyed by region code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryIndex {
    by_code: HashMap<String, Geometry>,
}

impl BoundaryIndex {
    /// Index every feature that has a geometry and a code in `code_property`
    pub fn from_geojson(geojson: &GeoJson, code_property: &str) -> Self {
        let by_code = geojson
            .features()
            .iter()
            .filter_map(|feature| {
                let code = feature.property(code_property).and_then(code_of)?;
                let geometry = feature.geometry.clone()?;
                Some((code, geometry))
            })
            .collect();
        Self { by_code }
    }

    pub fn get(&self, code: &str) -> Option<&Geometry> {
        self.by_code.get(code)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Replace each feature's geometry with the boundary matching its
    /// `admin_field` value. Features without a match are dropped.
    pub fn join(&self, geojson: GeoJson, admin_field: &str) -> GeoJson {
        let features = geojson
            .into_features()
            .into_iter()
            .filter_map(|mut feature| {
                let code = feature.property(admin_field).and_then(code_of)?;
                feature.geometry = Some(self.get(&code)?.clone());
                Some(feature)
            })
            .collect();
        GeoJson::FeatureCollection(FeatureCollection::new(features))
    }
}

/// Region codes may arrive as strings or numbers
fn code_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Outcome of the one-time boundary load
type Loaded = std::result::Result<Arc<BoundaryIndex>, String>;

/// One-time readiness gate around the boundary index
#[derive(Debug)]
pub struct AdminBoundaries {
    sender: watch::Sender<Option<Loaded>>,
}

impl AdminBoundaries {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// True once the load has finished, successfully or not
    pub fn is_ready(&self) -> bool {
        self.sender.borrow().is_some()
    }

    /// Publish the boundary index, releasing every waiter
    pub fn publish(&self, index: BoundaryIndex) {
        self.sender.send_replace(Some(Ok(Arc::new(index))));
    }

    /// Record a failed load. Waiters are released with an error.
    pub fn fail(&self, reason: impl Into<String>) {
        self.sender.send_replace(Some(Err(reason.into())));
    }

    /// Wait until the load has finished
    ///
    /// # Errors
    /// `Transport` when the load failed
    pub async fn ready(&self) -> Result<Arc<BoundaryIndex>> {
        let mut receiver = self.sender.subscribe();
        let loaded = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| MapLayersError::transport("administrative boundaries channel closed"))?;
        match &*loaded {
            Some(Ok(index)) => Ok(Arc::clone(index)),
            Some(Err(reason)) => Err(MapLayersError::transport(format!(
                "administrative boundaries failed to load: {}",
                reason
            ))),
            None => Err(MapLayersError::transport("administrative boundaries missing")),
        }
    }
}

impl Default for AdminBoundaries {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::Feature;
    use serde_json::json;
    use std::time::Duration;

    fn square(size: f64) -> Geometry {
        Geometry::Polygon {
            coordinates: vec![vec![
                vec![0.0, 0.0],
                vec![size, 0.0],
                vec![size, size],
                vec![0.0, 0.0],
            ]],
        }
    }

    fn boundaries() -> GeoJson {
        GeoJson::FeatureCollection(FeatureCollection::new(vec![
            Feature::new(square(1.0), json!({"iso3": "FRA"}).as_object().cloned().unwrap()),
            Feature::new(square(2.0), json!({"iso3": "ESP"}).as_object().cloned().unwrap()),
            Feature {
                properties: json!({"iso3": "ITA"}).as_object().cloned(),
                ..Feature::default()
            },
        ]))
    }

    #[test]
    fn test_index_skips_features_without_geometry() {
        let index = BoundaryIndex::from_geojson(&boundaries(), "iso3");
        assert_eq!(index.len(), 2);
        assert!(!index.is_empty());
        assert_eq!(index.get("ESP"), Some(&square(2.0)));
    }

    #[test]
    fn test_join_substitutes_and_drops_unmatched() {
        let index = BoundaryIndex::from_geojson(&boundaries(), "iso3");
        let records = GeoJson::FeatureCollection(FeatureCollection::new(vec![
            Feature {
                properties: json!({"country": "FRA", "cases": 3}).as_object().cloned(),
                ..Feature::default()
            },
            Feature {
                properties: json!({"country": "DEU"}).as_object().cloned(),
                ..Feature::default()
            },
        ]));

        let joined = index.join(records, "country");
        assert_eq!(joined.features().len(), 1);
        assert_eq!(joined.features()[0].geometry, Some(square(1.0)));
        assert_eq!(joined.features()[0].property("cases"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn test_ready_waits_for_publish() {
        let gate = Arc::new(AdminBoundaries::new());
        assert!(!gate.is_ready());

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.ready().await.map(|index| index.len()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        gate.publish(BoundaryIndex::from_geojson(&boundaries(), "iso3"));
        assert_eq!(waiter.await.unwrap().unwrap(), 2);
        assert!(gate.is_ready());
    }

    #[tokio::test]
    async fn test_failed_load_releases_waiters() {
        let gate = Arc::new(AdminBoundaries::new());
        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.ready().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        gate.fail("connection refused");
        let err = waiter.await.unwrap().unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("connection refused"));
        assert!(gate.is_ready());
    }
}
