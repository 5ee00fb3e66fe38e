//! HTTP client for the GraphQL layer API and the GIS feature endpoint
//!
//! Compiled with the `http` feature.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::transport::{FeatureClient, FeatureQuery, LayerStore};
use crate::config::MapLayersConfig;
use crate::error::{MapLayersError, Result};
use crate::geojson::GeoJson;
use crate::layers::{LayerDefinition, LayerQuery};

const LAYER_FIELDS: &str = "id name type sublayers datasource geojson filter style \
                            popupInfo display cluster heatmap createdAt updatedAt";

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

/// Remote layer store and feature client
pub struct HttpClient {
    client: reqwest::Client,
    graphql_url: String,
    feature_url: String,
    timeout_ms: u64,
}

impl HttpClient {
    pub fn new(config: &MapLayersConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| MapLayersError::transport(e.to_string()))?;

        Ok(Self {
            client,
            graphql_url: config.graphql_url(),
            feature_url: config.feature_url(),
            timeout_ms: config.timeout_ms,
        })
    }

    fn map_request_error(&self, e: reqwest::Error) -> MapLayersError {
        if e.is_timeout() {
            MapLayersError::transport(format!("request timed out after {}ms", self.timeout_ms))
        } else if e.is_connect() {
            MapLayersError::transport(format!("cannot connect: {}", e))
        } else {
            MapLayersError::transport(e.to_string())
        }
    }

    /// Run a GraphQL operation and decode `data.<field>`
    async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value, field: &str) -> Result<T> {
        debug!(operation = field, "graphql request");
        let response = self
            .client
            .post(&self.graphql_url)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !response.status().is_success() {
            return Err(MapLayersError::transport(format!(
                "GraphQL endpoint returned {}",
                response.status()
            )));
        }

        let body: GraphqlResponse = response
            .json()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if let Some(first) = body.errors.first() {
            return Err(MapLayersError::Graphql {
                message: first.message.clone(),
            });
        }

        let value = body
            .data
            .and_then(|mut data| data.get_mut(field).map(Value::take))
            .unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl LayerStore for HttpClient {
    async fn add_layer(&self, definition: LayerDefinition) -> Result<LayerDefinition> {
        let query = format!(
            "mutation addLayer($layer: LayerInputType!) {{ addLayer(layer: $layer) {{ {} }} }}",
            LAYER_FIELDS
        );
        self.graphql(&query, json!({ "layer": definition }), "addLayer")
            .await
    }

    async fn edit_layer(&self, id: &str, definition: LayerDefinition) -> Result<LayerDefinition> {
        let query = format!(
            "mutation editLayer($id: ID!, $layer: LayerInputType!) {{ editLayer(id: $id, layer: $layer) {{ {} }} }}",
            LAYER_FIELDS
        );
        self.graphql(&query, json!({ "id": id, "layer": definition }), "editLayer")
            .await
    }

    async fn delete_layer(&self, id: &str) -> Result<LayerDefinition> {
        let query = format!(
            "mutation deleteLayer($id: ID!) {{ deleteLayer(id: $id) {{ {} }} }}",
            LAYER_FIELDS
        );
        let deleted: Option<LayerDefinition> =
            self.graphql(&query, json!({ "id": id }), "deleteLayer").await?;
        deleted.ok_or_else(|| MapLayersError::LayerNotFound { id: id.to_string() })
    }

    async fn layer(&self, id: &str) -> Result<Option<LayerDefinition>> {
        let query = format!("query getLayer($id: ID!) {{ layer(id: $id) {{ {} }} }}", LAYER_FIELDS);
        self.graphql(&query, json!({ "id": id }), "layer").await
    }

    async fn layers(&self, filter: &LayerQuery) -> Result<Vec<LayerDefinition>> {
        let query = format!(
            "query getLayers($filter: JSON) {{ layers(filter: $filter) {{ {} }} }}",
            LAYER_FIELDS
        );
        let layers: Option<Vec<LayerDefinition>> =
            self.graphql(&query, json!({ "filter": filter }), "layers").await?;
        Ok(layers.unwrap_or_default())
    }
}

#[async_trait]
impl FeatureClient for HttpClient {
    async fn fetch_features(&self, query: &FeatureQuery) -> Result<GeoJson> {
        debug!(params = ?query.params(), "feature request");
        let response = self
            .client
            .get(&self.feature_url)
            .query(query.params())
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        if !response.status().is_success() {
            return Err(MapLayersError::transport(format!(
                "feature endpoint returned {}",
                response.status()
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| self.map_request_error(e))?;
        GeoJson::try_from(value)
    }
}
