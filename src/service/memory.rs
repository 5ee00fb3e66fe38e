//! In-memory layer store
//!
//! Keeps definitions in insertion order behind an async lock. Used by
//! the CLI and by tests in place of the GraphQL API.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::transport::LayerStore;
use crate::error::{MapLayersError, Result};
use crate::layers::{LayerDefinition, LayerQuery};

#[derive(Debug, Default)]
pub struct InMemoryLayerStore {
    layers: RwLock<Vec<LayerDefinition>>,
}

impl InMemoryLayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing definitions, keeping their ids
    pub fn with_layers(layers: Vec<LayerDefinition>) -> Self {
        Self {
            layers: RwLock::new(layers),
        }
    }

    pub async fn len(&self) -> usize {
        self.layers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.layers.read().await.is_empty()
    }
}

#[async_trait]
impl LayerStore for InMemoryLayerStore {
    async fn add_layer(&self, mut definition: LayerDefinition) -> Result<LayerDefinition> {
        let mut layers = self.layers.write().await;
        if definition.id.is_empty() {
            definition.id = Uuid::new_v4().to_string();
        } else if layers.iter().any(|l| l.id == definition.id) {
            return Err(MapLayersError::InvalidLayer {
                id: definition.id,
                reason: "a layer with this id already exists".to_string(),
            });
        }
        let now = Utc::now();
        definition.created_at = Some(now);
        definition.updated_at = Some(now);
        debug!(layer = %definition.id, "stored new layer");
        layers.push(definition.clone());
        Ok(definition)
    }

    async fn edit_layer(&self, id: &str, mut definition: LayerDefinition) -> Result<LayerDefinition> {
        let mut layers = self.layers.write().await;
        let slot = layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| MapLayersError::LayerNotFound { id: id.to_string() })?;
        definition.id = id.to_string();
        definition.created_at = slot.created_at;
        definition.updated_at = Some(Utc::now());
        *slot = definition.clone();
        Ok(definition)
    }

    async fn delete_layer(&self, id: &str) -> Result<LayerDefinition> {
        let mut layers = self.layers.write().await;
        let index = layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| MapLayersError::LayerNotFound { id: id.to_string() })?;
        Ok(layers.remove(index))
    }

    async fn layer(&self, id: &str) -> Result<Option<LayerDefinition>> {
        Ok(self.layers.read().await.iter().find(|l| l.id == id).cloned())
    }

    async fn layers(&self, query: &LayerQuery) -> Result<Vec<LayerDefinition>> {
        Ok(self
            .layers
            .read()
            .await
            .iter()
            .filter(|l| query.matches(l))
            .cloned()
            .collect())
    }
}
