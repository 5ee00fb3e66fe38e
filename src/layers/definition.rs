//! Layer definitions
//!
//! The persisted record of a layer, as exchanged with the layer store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::style::{ClusterOptions, DisplayOptions, HeatmapOptions, LayerStyle, PopupInfo};
use crate::datasource::Datasource;
use crate::filter::FilterNode;
use crate::geojson::GeoJson;

/// Layer variant; fixed for the lifetime of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Group,
    Feature,
    Sketch,
    Cluster,
    Heatmap,
}

impl LayerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Feature => "feature",
            Self::Sketch => "sketch",
            Self::Cluster => "cluster",
            Self::Heatmap => "heatmap",
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group)
    }
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted layer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDefinition {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    /// Child layer ids, groups only
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sublayers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<Datasource>,
    /// Geometry stored with the record (static and sketch layers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geojson: Option<GeoJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterNode>,
    #[serde(default)]
    pub style: LayerStyle,
    #[serde(default)]
    pub popup_info: PopupInfo,
    #[serde(default)]
    pub display: DisplayOptions,
    #[serde(default)]
    pub cluster: ClusterOptions,
    #[serde(default)]
    pub heatmap: HeatmapOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LayerDefinition {
    /// A bare definition with default styling
    pub fn new(id: &str, name: &str, layer_type: LayerType) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            layer_type,
            sublayers: Vec::new(),
            datasource: None,
            geojson: None,
            filter: None,
            style: LayerStyle::default(),
            popup_info: PopupInfo::default(),
            display: DisplayOptions::default(),
            cluster: ClusterOptions::default(),
            heatmap: HeatmapOptions::default(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_sublayers(mut self, ids: &[&str]) -> Self {
        self.sublayers = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_geojson(mut self, geojson: GeoJson) -> Self {
        self.geojson = Some(geojson);
        self
    }

    pub fn with_filter(mut self, filter: FilterNode) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_datasource(mut self, datasource: Datasource) -> Self {
        self.datasource = Some(datasource);
        self
    }
}

/// Criteria for listing layers from the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerQuery {
    /// Restrict to these ids; empty means no restriction
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_type: Option<LayerType>,
    /// Case-insensitive substring of the layer name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LayerQuery {
    pub fn matches(&self, definition: &LayerDefinition) -> bool {
        (self.ids.is_empty() || self.ids.contains(&definition.id))
            && self.layer_type.map_or(true, |t| t == definition.layer_type)
            && self.name.as_ref().map_or(true, |name| {
                definition
                    .name
                    .to_lowercase()
                    .contains(&name.to_lowercase())
            })
    }
}
