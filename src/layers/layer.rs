//! Layer Model
//!
//! A layer is either a group owning an ordered list of child layers, or
//! a data layer owning a GeoJSON payload, a filter and the field types
//! inferred from that payload. The renderable handle is built on first
//! request and kept until the payload or the filter is replaced.

use std::cell::OnceCell;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::definition::{LayerDefinition, LayerType};
use super::legend::Legend;
use super::renderable::{point_positions, vector_shapes, weighted_points, RenderKind, Renderable};
use super::style::{ClusterOptions, DisplayOptions, HeatmapOptions, LayerStyle, PopupInfo};
use crate::error::{MapLayersError, Result};
use crate::fields::{infer_fields, FieldMap};
use crate::filter::{filter_geojson, FilterNode};
use crate::geojson::GeoJson;

/// Payload and filter of a non-group layer
#[derive(Debug, Clone, PartialEq)]
pub struct LayerData {
    geojson: GeoJson,
    filter: FilterNode,
    fields: FieldMap,
}

impl LayerData {
    pub fn new(geojson: GeoJson, filter: FilterNode) -> Self {
        let fields = infer_fields(&geojson);
        Self {
            geojson,
            filter,
            fields,
        }
    }

    pub fn geojson(&self) -> &GeoJson {
        &self.geojson
    }

    pub fn filter(&self) -> &FilterNode {
        &self.filter
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }
}

impl Default for LayerData {
    fn default() -> Self {
        Self::new(GeoJson::empty(), FilterNode::default())
    }
}

/// What a layer holds, by variant
#[derive(Debug)]
pub enum LayerContent {
    Group(Vec<Layer>),
    Data(LayerData),
}

impl LayerContent {
    /// Data content with the given payload and filter
    pub fn data(geojson: GeoJson, filter: FilterNode) -> Self {
        LayerContent::Data(LayerData::new(geojson, filter))
    }
}

/// A map layer
#[derive(Debug)]
pub struct Layer {
    id: String,
    name: String,
    layer_type: LayerType,
    content: LayerContent,
    pub style: LayerStyle,
    pub popup_info: PopupInfo,
    pub display: DisplayOptions,
    pub cluster: ClusterOptions,
    pub heatmap: HeatmapOptions,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    renderable: OnceCell<Renderable>,
}

impl Layer {
    /// Build a layer from a definition that may be absent.
    ///
    /// # Errors
    /// - `MissingDefinition` when no definition is given
    /// - `InvalidLayer` when the content does not fit the layer type
    pub fn from_definition(
        definition: Option<LayerDefinition>,
        content: LayerContent,
    ) -> Result<Self> {
        let definition = definition.ok_or(MapLayersError::MissingDefinition)?;
        Self::new(definition, content)
    }

    /// Build a layer from its definition and resolved content.
    ///
    /// Group layers take `LayerContent::Group`, every other type takes
    /// `LayerContent::Data`.
    pub fn new(definition: LayerDefinition, content: LayerContent) -> Result<Self> {
        match (&definition.layer_type, &content) {
            (LayerType::Group, LayerContent::Data(_)) => {
                return Err(MapLayersError::InvalidLayer {
                    id: definition.id,
                    reason: "group layers hold sublayers, not data".to_string(),
                })
            }
            (t, LayerContent::Group(_)) if !t.is_group() => {
                return Err(MapLayersError::InvalidLayer {
                    id: definition.id,
                    reason: format!("{} layers cannot hold sublayers", t),
                })
            }
            _ => {}
        }

        Ok(Self {
            id: definition.id,
            name: definition.name,
            layer_type: definition.layer_type,
            content,
            style: definition.style,
            popup_info: definition.popup_info,
            display: definition.display,
            cluster: definition.cluster,
            heatmap: definition.heatmap,
            created_at: definition.created_at,
            updated_at: definition.updated_at,
            renderable: OnceCell::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer_type(&self) -> LayerType {
        self.layer_type
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Child layers; empty for data layers
    pub fn sublayers(&self) -> &[Layer] {
        match &self.content {
            LayerContent::Group(children) => children,
            LayerContent::Data(_) => &[],
        }
    }

    /// Stored payload, filter and fields; `None` for groups
    pub fn layer_data(&self) -> Option<&LayerData> {
        match &self.content {
            LayerContent::Data(data) => Some(data),
            LayerContent::Group(_) => None,
        }
    }

    pub fn geojson(&self) -> Option<&GeoJson> {
        self.layer_data().map(LayerData::geojson)
    }

    pub fn filter(&self) -> Option<&FilterNode> {
        self.layer_data().map(LayerData::filter)
    }

    pub fn fields(&self) -> Option<&FieldMap> {
        self.layer_data().map(LayerData::fields)
    }

    /// Stored payload with the filter applied. The stored payload is
    /// never modified. Groups have no data of their own.
    pub fn data(&self) -> GeoJson {
        match &self.content {
            LayerContent::Data(data) => filter_geojson(&data.geojson, &data.filter),
            LayerContent::Group(_) => GeoJson::empty(),
        }
    }

    /// Replace the payload; fields are re-inferred and the renderable dropped
    pub fn set_geojson(&mut self, geojson: GeoJson) -> Result<()> {
        let data = self.data_mut()?;
        data.fields = infer_fields(&geojson);
        data.geojson = geojson;
        self.invalidate();
        Ok(())
    }

    /// Replace the filter; fields are re-inferred and the renderable dropped
    pub fn set_filter(&mut self, filter: FilterNode) -> Result<()> {
        let data = self.data_mut()?;
        data.filter = filter;
        data.fields = infer_fields(&data.geojson);
        self.invalidate();
        Ok(())
    }

    pub fn set_legend_enabled(&mut self, enabled: bool) {
        self.display.legend_enabled = enabled;
        for child in self.sublayers_mut() {
            child.set_legend_enabled(enabled);
        }
    }

    /// Renderable handle, built once. Groups build their children in
    /// declaration order and wrap them.
    pub fn get_layer(&self) -> &Renderable {
        self.renderable.get_or_init(|| self.build_renderable())
    }

    /// Whether a renderable has been built since the last change
    pub fn is_rendered(&self) -> bool {
        self.renderable.get().is_some()
    }

    /// Legend description; `None` for groups or when legends are disabled
    pub fn get_legend(&self) -> Option<Legend> {
        if !self.display.legend_enabled {
            return None;
        }
        match self.layer_type {
            LayerType::Group => None,
            LayerType::Feature | LayerType::Sketch => {
                Some(Legend::for_features(&self.name, &self.style, &self.data()))
            }
            LayerType::Cluster => Some(Legend::Cluster {
                title: self.name.clone(),
                color: self.cluster.color.clone(),
                count: self.data().features().len(),
            }),
            LayerType::Heatmap => Some(Legend::Heatmap {
                title: self.name.clone(),
                gradient: self.heatmap.gradient.clone(),
            }),
        }
    }

    fn build_renderable(&self) -> Renderable {
        debug!(layer = %self.id, kind = %self.layer_type, "building renderable");
        let kind = match (&self.layer_type, &self.content) {
            (_, LayerContent::Group(children)) => RenderKind::Group {
                children: children.iter().map(|c| c.get_layer().clone()).collect(),
            },
            (LayerType::Cluster, LayerContent::Data(_)) => RenderKind::Cluster {
                options: self.cluster.clone(),
                points: point_positions(&self.data()),
            },
            (LayerType::Heatmap, LayerContent::Data(_)) => RenderKind::Heatmap {
                options: self.heatmap.clone(),
                points: weighted_points(&self.data(), self.heatmap.weight_field.as_deref()),
            },
            (_, LayerContent::Data(_)) => RenderKind::Vector {
                style: self.style.clone(),
                shapes: vector_shapes(&self.data()),
            },
        };

        Renderable {
            id: self.id.clone(),
            name: self.name.clone(),
            display: self.display.clone(),
            kind,
        }
    }

    fn data_mut(&mut self) -> Result<&mut LayerData> {
        match &mut self.content {
            LayerContent::Data(data) => Ok(data),
            LayerContent::Group(_) => Err(MapLayersError::InvalidLayer {
                id: self.id.clone(),
                reason: "group layers hold no data".to_string(),
            }),
        }
    }

    fn sublayers_mut(&mut self) -> &mut [Layer] {
        match &mut self.content {
            LayerContent::Group(children) => children,
            LayerContent::Data(_) => &mut [],
        }
    }

    fn invalidate(&mut self) {
        self.renderable = OnceCell::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::{Feature, FeatureCollection, Geometry};
    use crate::layers::renderable::Shape;
    use serde_json::json;

    fn points(values: &[i64]) -> GeoJson {
        GeoJson::FeatureCollection(FeatureCollection::new(
            values
                .iter()
                .map(|v| {
                    Feature::new(
                        Geometry::Point {
                            coordinates: vec![*v as f64, 0.0],
                        },
                        json!({"v": v}).as_object().cloned().unwrap(),
                    )
                })
                .collect(),
        ))
    }

    fn data_layer(id: &str, layer_type: LayerType, geojson: GeoJson) -> Layer {
        Layer::new(
            LayerDefinition::new(id, id, layer_type),
            LayerContent::data(geojson, FilterNode::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_definition_fails() {
        let err = Layer::from_definition(None, LayerContent::Group(Vec::new())).unwrap_err();
        assert!(matches!(err, MapLayersError::MissingDefinition));
    }

    #[test]
    fn test_content_must_match_type() {
        let err = Layer::new(
            LayerDefinition::new("g", "g", LayerType::Group),
            LayerContent::Data(LayerData::default()),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_LAYER");

        let err = Layer::new(
            LayerDefinition::new("f", "f", LayerType::Heatmap),
            LayerContent::Group(Vec::new()),
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_LAYER");
    }

    #[test]
    fn test_data_does_not_touch_stored_geojson() {
        let mut layer = data_layer("a", LayerType::Feature, points(&[1, 2, 3]));
        layer
            .set_filter(FilterNode::leaf("v", "lte", json!(2)))
            .unwrap();

        assert_eq!(layer.data().features().len(), 2);
        assert_eq!(layer.geojson().unwrap().features().len(), 3);
    }

    #[test]
    fn test_renderable_is_cached_until_filter_changes() {
        let mut layer = data_layer("a", LayerType::Feature, points(&[1, 2, 3]));
        assert!(!layer.is_rendered());
        assert_eq!(layer.get_layer().shapes().len(), 3);
        assert!(layer.is_rendered());
        assert!(std::ptr::eq(layer.get_layer(), layer.get_layer()));

        layer.set_filter(FilterNode::leaf("v", "eq", json!(1))).unwrap();
        assert!(!layer.is_rendered());
        assert_eq!(layer.get_layer().shapes().len(), 1);
    }

    #[test]
    fn test_set_geojson_reinfers_fields() {
        let mut layer = data_layer("a", LayerType::Feature, GeoJson::empty());
        assert!(layer.fields().unwrap().is_empty());
        layer.set_geojson(points(&[4])).unwrap();
        assert!(layer.fields().unwrap().contains_key("v"));
    }

    #[test]
    fn test_sketch_renders_vectors() {
        let layer = data_layer(
            "s",
            LayerType::Sketch,
            GeoJson::Feature(Feature::new(
                Geometry::Point {
                    coordinates: vec![0.0, 0.0],
                },
                json!({"radius": 500}).as_object().cloned().unwrap(),
            )),
        );
        assert!(matches!(layer.get_layer().shapes()[0], Shape::Circle { .. }));
    }

    #[test]
    fn test_group_has_no_data_and_no_legend() {
        let group = Layer::new(
            LayerDefinition::new("g", "g", LayerType::Group),
            LayerContent::Group(vec![data_layer("a", LayerType::Feature, points(&[1]))]),
        )
        .unwrap();
        assert!(group.data().is_empty_collection());
        assert!(group.fields().is_none());
        assert!(group.get_legend().is_none());
        assert_eq!(group.sublayers().len(), 1);
    }

    #[test]
    fn test_set_geojson_on_group_fails() {
        let mut group = Layer::new(
            LayerDefinition::new("g", "g", LayerType::Group),
            LayerContent::Group(Vec::new()),
        )
        .unwrap();
        assert!(group.set_geojson(GeoJson::empty()).is_err());
    }
}
