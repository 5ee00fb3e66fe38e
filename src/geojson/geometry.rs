//! GeoJSON geometry objects

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single coordinate tuple `[lng, lat(, alt)]`
pub type Position = Vec<f64>;

/// Every `type` value that denotes a bare geometry object.
pub const GEOMETRY_TYPES: [&str; 7] = [
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

/// GeoJSON geometry, tagged by its `type` member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

/// Coarse shape family, used for legends
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Line,
    Polygon,
}

impl Geometry {
    /// The GeoJSON `type` member for this geometry
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
            Geometry::GeometryCollection { .. } => "GeometryCollection",
        }
    }

    /// Returns true for `Point` and `MultiPoint`
    pub fn is_point_like(&self) -> bool {
        matches!(self, Geometry::Point { .. } | Geometry::MultiPoint { .. })
    }

    /// Point positions held by this geometry, descending into collections.
    /// Lines and polygons contribute nothing.
    pub fn points(&self) -> Vec<Position> {
        match self {
            Geometry::Point { coordinates } => vec![coordinates.clone()],
            Geometry::MultiPoint { coordinates } => coordinates.clone(),
            Geometry::GeometryCollection { geometries } => {
                geometries.iter().flat_map(Geometry::points).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Collect the shape families present in this geometry
    pub fn collect_kinds(&self, kinds: &mut BTreeSet<GeometryKind>) {
        match self {
            Geometry::Point { .. } | Geometry::MultiPoint { .. } => {
                kinds.insert(GeometryKind::Point);
            }
            Geometry::LineString { .. } | Geometry::MultiLineString { .. } => {
                kinds.insert(GeometryKind::Line);
            }
            Geometry::Polygon { .. } | Geometry::MultiPolygon { .. } => {
                kinds.insert(GeometryKind::Polygon);
            }
            Geometry::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.collect_kinds(kinds);
                }
            }
        }
    }
}
