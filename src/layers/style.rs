//! Styling and popup metadata
//!
//! Opaque to filtering and typing; carried through to renderables
//! and legends.

use serde::{Deserialize, Serialize};

/// Stroke, fill and marker settings of a vector layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayerStyle {
    pub color: String,
    pub fill_color: Option<String>,
    pub opacity: f64,
    pub fill_opacity: f64,
    /// Stroke width in pixels
    pub weight: f64,
    pub marker_symbol: String,
    /// Marker size in pixels
    pub marker_size: f64,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            color: "#0090d1".to_string(),
            fill_color: None,
            opacity: 1.0,
            fill_opacity: 0.5,
            weight: 2.0,
            marker_symbol: "location-dot".to_string(),
            marker_size: 24.0,
        }
    }
}

impl LayerStyle {
    /// Fill color, falling back to the stroke color
    pub fn effective_fill(&self) -> &str {
        self.fill_color.as_deref().unwrap_or(&self.color)
    }
}

/// What a feature popup shows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PopupInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Property names listed in the popup body
    pub fields: Vec<String>,
}

/// Grouping behavior of a cluster layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterOptions {
    /// Grouping radius in pixels
    pub radius: f64,
    /// Zoom level from which points are shown individually
    pub disable_at_zoom: Option<u8>,
    pub color: String,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius: 80.0,
            disable_at_zoom: None,
            color: "#0090d1".to_string(),
        }
    }
}

/// One color stop of a heatmap gradient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position in `0.0..=1.0`
    pub stop: f64,
    pub color: String,
}

impl GradientStop {
    pub fn new(stop: f64, color: &str) -> Self {
        Self {
            stop,
            color: color.to_string(),
        }
    }
}

/// Density rendering of a heatmap layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeatmapOptions {
    pub radius: f64,
    pub blur: f64,
    pub min_opacity: f64,
    /// Numeric property used as point weight; unweighted points count 1
    pub weight_field: Option<String>,
    pub gradient: Vec<GradientStop>,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            radius: 25.0,
            blur: 15.0,
            min_opacity: 0.05,
            weight_field: None,
            gradient: vec![
                GradientStop::new(0.4, "blue"),
                GradientStop::new(0.6, "cyan"),
                GradientStop::new(0.7, "lime"),
                GradientStop::new(0.8, "yellow"),
                GradientStop::new(1.0, "red"),
            ],
        }
    }
}

/// Visibility, opacity and zoom range of any layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayOptions {
    pub visible: bool,
    pub opacity: f64,
    pub min_zoom: Option<u8>,
    pub max_zoom: Option<u8>,
    pub legend_enabled: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            visible: true,
            opacity: 1.0,
            min_zoom: None,
            max_zoom: None,
            legend_enabled: true,
        }
    }
}

impl DisplayOptions {
    /// Whether the layer shows at a given zoom level
    pub fn visible_at(&self, zoom: u8) -> bool {
        self.visible
            && self.min_zoom.map_or(true, |min| zoom >= min)
            && self.max_zoom.map_or(true, |max| zoom <= max)
    }
}
