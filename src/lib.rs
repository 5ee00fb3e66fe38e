//! Maplayers - Map Layer Model
//!
//! Computes what a map widget shows for each configured layer:
//! 1. Feature filtering - boolean filter trees over GeoJSON properties
//! 2. Field inference - a semantic type per property name
//! 3. Layer model - group / feature / sketch / cluster / heatmap layers
//!    producing renderable handles and legends
//! 4. Service - datasource resolution and layer tree assembly over a
//!    remote layer store and GIS feature endpoint

pub mod cli;
pub mod config;
pub mod datasource;
pub mod error;
pub mod fields;
pub mod filter;
pub mod geojson;
pub mod layers;
pub mod service;

pub use config::MapLayersConfig;
pub use error::{MapLayersError, Result};
pub use fields::{infer_fields, FieldMap, FieldType};
pub use filter::{satisfies, FilterNode};
pub use geojson::GeoJson;
pub use layers::{Layer, LayerDefinition, LayerType, Renderable};
pub use service::MapLayersService;
