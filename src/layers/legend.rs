//! Legend descriptions
//!
//! Each renderable layer type has its own legend shape.

use std::collections::BTreeSet;

use serde::Serialize;

use super::style::{GradientStop, LayerStyle};
use crate::geojson::{GeoJson, GeometryKind};

/// Legend row of a vector layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub kind: GeometryKind,
    pub label: String,
    pub color: String,
    pub fill_color: Option<String>,
    pub symbol: Option<String>,
}

/// Legend of a single layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Legend {
    Feature {
        title: String,
        entries: Vec<LegendEntry>,
    },
    Cluster {
        title: String,
        color: String,
        count: usize,
    },
    Heatmap {
        title: String,
        gradient: Vec<GradientStop>,
    },
}

impl Legend {
    /// One entry per geometry family present in the data
    pub(crate) fn for_features(title: &str, style: &LayerStyle, data: &GeoJson) -> Self {
        let mut kinds = BTreeSet::new();
        for geometry in data.features().iter().filter_map(|f| f.geometry.as_ref()) {
            geometry.collect_kinds(&mut kinds);
        }

        let entries = kinds
            .into_iter()
            .map(|kind| match kind {
                GeometryKind::Point => LegendEntry {
                    kind,
                    label: "Point".to_string(),
                    color: style.color.clone(),
                    fill_color: None,
                    symbol: Some(style.marker_symbol.clone()),
                },
                GeometryKind::Line => LegendEntry {
                    kind,
                    label: "Line".to_string(),
                    color: style.color.clone(),
                    fill_color: None,
                    symbol: None,
                },
                GeometryKind::Polygon => LegendEntry {
                    kind,
                    label: "Polygon".to_string(),
                    color: style.color.clone(),
                    fill_color: Some(style.effective_fill().to_string()),
                    symbol: None,
                },
            })
            .collect();

        Legend::Feature {
            title: title.to_string(),
            entries,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Legend::Feature { title, .. }
            | Legend::Cluster { title, .. }
            | Legend::Heatmap { title, .. } => title,
        }
    }
}
