//! Renderable layer handles
//!
//! Engine-neutral output of [`Layer::get_layer`](super::Layer::get_layer).
//! A map widget turns these into its own layer objects.

use serde::Serialize;
use serde_json::{Map, Value};

use super::style::{ClusterOptions, DisplayOptions, HeatmapOptions, LayerStyle};
use crate::geojson::{Feature, GeoJson, Geometry, Position};

/// Property that turns a point feature into a circle of that radius (meters)
pub const RADIUS_PROPERTY: &str = "radius";

/// A drawable vector shape
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Shape {
    Circle {
        center: Position,
        radius: f64,
        properties: Map<String, Value>,
    },
    Marker {
        position: Position,
        properties: Map<String, Value>,
    },
    Path {
        geometry: Geometry,
        properties: Map<String, Value>,
    },
}

/// A point with a heat weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedPoint {
    pub position: Position,
    pub weight: f64,
}

/// Per-type payload of a renderable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RenderKind {
    Group {
        children: Vec<Renderable>,
    },
    Vector {
        style: LayerStyle,
        shapes: Vec<Shape>,
    },
    Cluster {
        options: ClusterOptions,
        points: Vec<Position>,
    },
    Heatmap {
        options: HeatmapOptions,
        points: Vec<WeightedPoint>,
    },
}

/// Renderable layer handle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Renderable {
    pub id: String,
    pub name: String,
    pub display: DisplayOptions,
    #[serde(flatten)]
    pub kind: RenderKind,
}

impl Renderable {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, RenderKind::Group { .. })
    }

    /// Number of non-group handles in the tree
    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            RenderKind::Group { children } => children.iter().map(Renderable::leaf_count).sum(),
            _ => 1,
        }
    }

    /// Ids of non-group handles, depth-first in declaration order
    pub fn leaf_ids(&self) -> Vec<&str> {
        match &self.kind {
            RenderKind::Group { children } => {
                children.iter().flat_map(Renderable::leaf_ids).collect()
            }
            _ => vec![self.id.as_str()],
        }
    }

    /// Vector shapes, empty for every other kind
    pub fn shapes(&self) -> &[Shape] {
        match &self.kind {
            RenderKind::Vector { shapes, .. } => shapes,
            _ => &[],
        }
    }
}

/// Convert features to shapes. Point features carrying a numeric
/// `radius` property become circles; other points become markers;
/// lines and polygons become paths. Features without geometry are skipped.
pub(crate) fn vector_shapes(data: &GeoJson) -> Vec<Shape> {
    let mut shapes = Vec::new();
    for feature in data.features() {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        let properties = feature.properties.clone().unwrap_or_default();
        if geometry.is_point_like() {
            let radius = feature.property(RADIUS_PROPERTY).and_then(Value::as_f64);
            for position in geometry.points() {
                shapes.push(match radius {
                    Some(radius) => Shape::Circle {
                        center: position,
                        radius,
                        properties: properties.clone(),
                    },
                    None => Shape::Marker {
                        position,
                        properties: properties.clone(),
                    },
                });
            }
        } else {
            shapes.push(Shape::Path {
                geometry: geometry.clone(),
                properties,
            });
        }
    }
    shapes
}

/// Point positions of the data, for cluster layers
pub(crate) fn point_positions(data: &GeoJson) -> Vec<Position> {
    data.features()
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .flat_map(Geometry::points)
        .collect()
}

/// Weighted point positions of the data, for heatmap layers
pub(crate) fn weighted_points(data: &GeoJson, weight_field: Option<&str>) -> Vec<WeightedPoint> {
    data.features()
        .iter()
        .flat_map(|feature| {
            let weight = point_weight(feature, weight_field);
            feature
                .geometry
                .iter()
                .flat_map(Geometry::points)
                .map(move |position| WeightedPoint { position, weight })
        })
        .collect()
}

fn point_weight(feature: &Feature, weight_field: Option<&str>) -> f64 {
    weight_field
        .and_then(|field| feature.property(field))
        .and_then(Value::as_f64)
        .unwrap_or(1.0)
}
