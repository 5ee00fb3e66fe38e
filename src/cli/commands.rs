//! CLI Command Implementations

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::MapLayersConfig;
use crate::error::Result;
use crate::fields::infer_fields;
use crate::filter::{filter_geojson, FilterNode};
use crate::geojson::GeoJson;
use crate::layers::{LayerDefinition, RenderKind, Renderable};
use crate::service::{FeatureClient, InMemoryLayerStore, MapLayersService};

/// Apply a filter file to a GeoJSON file and print the result.
pub fn filter(input: &Path, filter_path: &Path) -> Result<()> {
    let geojson = read_geojson(input)?;
    let filter: FilterNode = serde_json::from_str(&fs::read_to_string(filter_path)?)?;

    let filtered = filter_geojson(&geojson, &filter);
    info!(
        kept = filtered.features().len(),
        total = geojson.features().len(),
        "filter applied"
    );
    println!("{}", serde_json::to_string_pretty(&filtered)?);
    Ok(())
}

/// Print inferred field types.
pub fn fields(input: &Path) -> Result<()> {
    let geojson = read_geojson(input)?;
    let fields = infer_fields(&geojson);

    if fields.is_empty() {
        println!("No fields.");
        return Ok(());
    }
    for (name, field_type) in &fields {
        println!("{:<30} {}", name, field_type.as_str());
    }
    Ok(())
}

/// Build and print renderable layers.
pub async fn render(
    config: MapLayersConfig,
    definitions: &Path,
    ids: &[String],
    as_json: bool,
) -> Result<()> {
    let definitions = read_definitions(definitions)?;
    let ids = if ids.is_empty() {
        top_level_ids(&definitions)
    } else {
        ids.to_vec()
    };
    let service = build_service(config, definitions).await?;

    for (id, result) in ids.iter().zip(service.create_layers_from_ids(&ids).await) {
        match result {
            Ok(layer) if as_json => {
                println!("{}", serde_json::to_string_pretty(layer.get_layer())?)
            }
            Ok(layer) => print_tree(layer.get_layer(), 0),
            Err(e) => println!("{}: {}", id, e),
        }
    }
    Ok(())
}

/// Print the legend of one layer.
pub async fn legend(config: MapLayersConfig, definitions: &Path, id: &str) -> Result<()> {
    let service = build_service(config, read_definitions(definitions)?).await?;
    let layer = service.create_layer(id).await?;

    match layer.get_legend() {
        Some(legend) => println!("{}", serde_json::to_string_pretty(&legend)?),
        None => println!("No legend for layer '{}'.", layer.name()),
    }
    Ok(())
}

fn read_geojson(path: &Path) -> Result<GeoJson> {
    fs::read_to_string(path)?.parse()
}

fn read_definitions(path: &Path) -> Result<Vec<LayerDefinition>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

/// Ids not referenced as a sublayer of any group, in file order
fn top_level_ids(definitions: &[LayerDefinition]) -> Vec<String> {
    let children: HashSet<&str> = definitions
        .iter()
        .flat_map(|d| d.sublayers.iter().map(String::as_str))
        .collect();
    definitions
        .iter()
        .filter(|d| !children.contains(d.id.as_str()))
        .map(|d| d.id.clone())
        .collect()
}

/// Any definition joining records to administrative boundaries
fn joins_boundaries(definitions: &[LayerDefinition]) -> bool {
    definitions
        .iter()
        .filter_map(|d| d.datasource.as_ref())
        .any(|ds| ds.admin_field.as_deref().map_or(false, |f| !f.is_empty()))
}

/// Service over the definitions file. Boundaries are loaded up front when
/// a layer needs them; a failed load leaves those layers empty.
async fn build_service(
    config: MapLayersConfig,
    definitions: Vec<LayerDefinition>,
) -> Result<MapLayersService> {
    let needs_boundaries = joins_boundaries(&definitions);
    let store = Arc::new(InMemoryLayerStore::with_layers(definitions));
    let features = feature_client(&config)?;
    let service = MapLayersService::new(store, features, config);

    if needs_boundaries {
        if let Err(e) = service.load_admin_boundaries().await {
            warn!("admin-joined layers will be empty: {}", e);
        }
    }
    Ok(service)
}

#[cfg(feature = "http")]
fn feature_client(config: &MapLayersConfig) -> Result<Arc<dyn FeatureClient>> {
    Ok(Arc::new(crate::service::HttpClient::new(config)?))
}

#[cfg(not(feature = "http"))]
fn feature_client(_config: &MapLayersConfig) -> Result<Arc<dyn FeatureClient>> {
    Ok(Arc::new(offline::OfflineFeatureClient))
}

#[cfg(not(feature = "http"))]
mod offline {
    use async_trait::async_trait;
    use tracing::warn;

    use crate::error::Result;
    use crate::geojson::GeoJson;
    use crate::service::{FeatureClient, FeatureQuery};

    /// Feature client for builds without `http`: every remote datasource
    /// resolves to an empty collection.
    pub(super) struct OfflineFeatureClient;

    #[async_trait]
    impl FeatureClient for OfflineFeatureClient {
        async fn fetch_features(&self, query: &FeatureQuery) -> Result<GeoJson> {
            warn!(params = ?query.params(), "remote datasource skipped (built without `http`)");
            Ok(GeoJson::empty())
        }
    }
}

fn print_tree(renderable: &Renderable, depth: usize) {
    let indent = "  ".repeat(depth);
    match &renderable.kind {
        RenderKind::Group { children } => {
            println!(
                "{}{} [group] {} leaves",
                indent,
                renderable.name,
                renderable.leaf_count()
            );
            for child in children {
                print_tree(child, depth + 1);
            }
        }
        RenderKind::Vector { shapes, .. } => {
            println!("{}{} [vector] {} shapes", indent, renderable.name, shapes.len())
        }
        RenderKind::Cluster { points, .. } => {
            println!("{}{} [cluster] {} points", indent, renderable.name, points.len())
        }
        RenderKind::Heatmap { points, .. } => {
            println!("{}{} [heatmap] {} points", indent, renderable.name, points.len())
        }
    }
}
