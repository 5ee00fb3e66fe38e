//! Map Layers Service
//!
//! Orchestrates the layer store and the feature endpoint: persists
//! definitions, resolves each layer's GeoJSON from its datasource and
//! assembles layer trees for a map widget.

use std::sync::Arc;

use futures::future::{join_all, BoxFuture};
use futures::FutureExt;
use tracing::{debug, info, warn};

use super::admin::{AdminBoundaries, BoundaryIndex};
use super::transport::{FeatureClient, LayerStore};
use crate::config::MapLayersConfig;
use crate::datasource::Datasource;
use crate::error::{MapLayersError, Result};
use crate::geojson::GeoJson;
use crate::layers::{Layer, LayerContent, LayerDefinition, LayerQuery};

/// Layer orchestration over a store and a feature client
pub struct MapLayersService {
    store: Arc<dyn LayerStore>,
    features: Arc<dyn FeatureClient>,
    boundaries: AdminBoundaries,
    config: MapLayersConfig,
}

impl MapLayersService {
    pub fn new(
        store: Arc<dyn LayerStore>,
        features: Arc<dyn FeatureClient>,
        config: MapLayersConfig,
    ) -> Self {
        Self {
            store,
            features,
            boundaries: AdminBoundaries::new(),
            config,
        }
    }

    pub fn boundaries(&self) -> &AdminBoundaries {
        &self.boundaries
    }

    // === Definitions ===

    pub async fn add_layer(&self, definition: LayerDefinition) -> Result<LayerDefinition> {
        let added = self.store.add_layer(definition).await?;
        info!(layer = %added.id, name = %added.name, "layer added");
        Ok(added)
    }

    pub async fn edit_layer(&self, id: &str, definition: LayerDefinition) -> Result<LayerDefinition> {
        let edited = self.store.edit_layer(id, definition).await?;
        info!(layer = %id, "layer edited");
        Ok(edited)
    }

    pub async fn delete_layer(&self, id: &str) -> Result<LayerDefinition> {
        let deleted = self.store.delete_layer(id).await?;
        info!(layer = %id, "layer deleted");
        Ok(deleted)
    }

    /// Fetch one definition
    ///
    /// # Errors
    /// `LayerNotFound` when the store has no layer with this id
    pub async fn get_layer_by_id(&self, id: &str) -> Result<LayerDefinition> {
        self.store
            .layer(id)
            .await?
            .ok_or_else(|| MapLayersError::LayerNotFound { id: id.to_string() })
    }

    pub async fn get_layers(&self, query: &LayerQuery) -> Result<Vec<LayerDefinition>> {
        self.store.layers(query).await
    }

    // === Administrative boundaries ===

    /// Fetch the boundary polygons and open the readiness gate.
    /// Returns the number of indexed boundaries.
    ///
    /// A failed fetch still opens the gate: layers waiting on a join
    /// resolve to empty collections and the error is returned here.
    pub async fn load_admin_boundaries(&self) -> Result<usize> {
        let settings = &self.config.admin_boundaries;
        let geojson = match self.features.fetch_features(&settings.to_query()).await {
            Ok(geojson) => geojson,
            Err(e) => {
                warn!("administrative boundaries failed to load: {}", e);
                self.boundaries.fail(e.to_string());
                return Err(e);
            }
        };
        let index = BoundaryIndex::from_geojson(&geojson, &settings.code_property);
        let count = index.len();
        self.boundaries.publish(index);
        info!(count, boundary_type = %settings.boundary_type, "administrative boundaries ready");
        Ok(count)
    }

    // === GeoJSON resolution ===

    /// Resolve the GeoJSON behind a definition.
    ///
    /// - no datasource, or a static one: the stored geometry, else empty
    /// - an invalid remote datasource: empty, without any request
    /// - an admin-field join: waits for the boundaries, then fetches;
    ///   failures degrade to empty
    /// - any other remote datasource: one feature request
    pub async fn get_layer_geojson(&self, definition: &LayerDefinition) -> Result<GeoJson> {
        let datasource = match &definition.datasource {
            Some(ds) if ds.is_remote() => ds,
            _ => return Ok(definition.geojson.clone().unwrap_or_default()),
        };

        if !datasource.is_valid() {
            debug!(layer = %definition.id, "datasource cannot locate records, skipping fetch");
            return Ok(GeoJson::empty());
        }

        match datasource.admin_field.as_deref().filter(|f| !f.is_empty()) {
            Some(admin_field) => Ok(self.fetch_admin_joined(datasource, admin_field).await),
            None => self.features.fetch_features(&datasource.to_query()).await,
        }
    }

    async fn fetch_admin_joined(&self, datasource: &Datasource, admin_field: &str) -> GeoJson {
        let index = match self.boundaries.ready().await {
            Ok(index) => index,
            Err(e) => {
                warn!("administrative boundaries unavailable: {}", e);
                return GeoJson::empty();
            }
        };

        match self.features.fetch_features(&datasource.to_query()).await {
            Ok(geojson) => index.join(geojson, admin_field),
            Err(e) => {
                warn!("admin field fetch failed, using empty collection: {}", e);
                GeoJson::empty()
            }
        }
    }

    // === Layer assembly ===

    /// Fetch a definition by id and build its layer
    pub async fn create_layer(&self, id: &str) -> Result<Layer> {
        let definition = self.get_layer_by_id(id).await?;
        self.create_layer_from_definition(definition).await
    }

    /// Build a layer from a definition. Groups fetch and build their
    /// sublayers, keeping declaration order.
    pub async fn create_layer_from_definition(&self, definition: LayerDefinition) -> Result<Layer> {
        self.build_layer(definition, Vec::new()).await
    }

    /// Build one layer per id. Ids resolve concurrently and independently;
    /// once all have settled, results come back in input order, one per id.
    pub async fn create_layers_from_ids(&self, ids: &[String]) -> Vec<Result<Layer>> {
        let results = join_all(ids.iter().map(|id| self.create_layer(id))).await;
        for (id, result) in ids.iter().zip(&results) {
            if let Err(e) = result {
                warn!(layer = %id, "layer construction failed: {}", e);
            }
        }
        results
    }

    fn build_layer(
        &self,
        definition: LayerDefinition,
        ancestors: Vec<String>,
    ) -> BoxFuture<'_, Result<Layer>> {
        async move {
            if ancestors.contains(&definition.id) {
                return Err(MapLayersError::InvalidLayer {
                    id: definition.id,
                    reason: "group contains itself".to_string(),
                });
            }

            let content = if definition.layer_type.is_group() {
                let mut path = ancestors;
                path.push(definition.id.clone());
                let children = join_all(definition.sublayers.iter().map(|id| {
                    let path = path.clone();
                    async move {
                        let child = self.get_layer_by_id(id).await?;
                        self.build_layer(child, path).await
                    }
                }))
                .await
                .into_iter()
                .collect::<Result<Vec<_>>>()?;
                LayerContent::Group(children)
            } else {
                let geojson = self.get_layer_geojson(&definition).await?;
                let filter = definition.filter.clone().unwrap_or_default();
                LayerContent::data(geojson, filter)
            };

            let mut layer = Layer::new(definition, content)?;
            if !self.config.legend_enabled {
                layer.set_legend_enabled(false);
            }
            debug!(layer = %layer.id(), kind = %layer.layer_type(), "layer constructed");
            Ok(layer)
        }
        .boxed()
    }
}
