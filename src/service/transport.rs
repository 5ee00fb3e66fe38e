//! Remote collaborators
//!
//! The layer store persists definitions (GraphQL `addLayer`, `editLayer`,
//! `deleteLayer`, `layer`, `layers`); the feature client serves GeoJSON
//! from the GIS endpoint.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::geojson::GeoJson;
use crate::layers::{LayerDefinition, LayerQuery};

/// Query parameters of a GIS feature request
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FeatureQuery {
    params: BTreeMap<String, String>,
}

impl FeatureQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

/// Persistence of layer definitions
#[async_trait]
pub trait LayerStore: Send + Sync {
    /// Create a layer; the store assigns the id when it is empty
    async fn add_layer(&self, definition: LayerDefinition) -> Result<LayerDefinition>;

    /// Replace an existing layer definition
    async fn edit_layer(&self, id: &str, definition: LayerDefinition) -> Result<LayerDefinition>;

    /// Delete a layer, returning the removed definition
    async fn delete_layer(&self, id: &str) -> Result<LayerDefinition>;

    /// Fetch one definition; `None` when the id is unknown
    async fn layer(&self, id: &str) -> Result<Option<LayerDefinition>>;

    /// List definitions matching the query
    async fn layers(&self, query: &LayerQuery) -> Result<Vec<LayerDefinition>>;
}

/// Source of GeoJSON payloads (`GET /gis/feature`)
#[async_trait]
pub trait FeatureClient: Send + Sync {
    async fn fetch_features(&self, query: &FeatureQuery) -> Result<GeoJson>;
}
