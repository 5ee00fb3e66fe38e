//! Configuration
//!
//! Defaults, then an optional JSON file, then environment overrides:
//! - `MAPLAYERS_API_URL`: base URL of the GraphQL / GIS API
//! - `MAPLAYERS_TIMEOUT_MS`: request timeout
//! - `MAPLAYERS_LEGEND`: `false`/`0` disables legends

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MapLayersError, Result};
use crate::service::FeatureQuery;

/// Request parameters for the administrative boundaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminBoundaryConfig {
    /// Boundary set requested from the GIS endpoint (`type` parameter)
    pub boundary_type: String,
    /// Simplification tolerance
    pub tolerance: f64,
    pub high_quality: bool,
    /// Boundary property holding the region code matched against `adminField`
    pub code_property: String,
}

impl Default for AdminBoundaryConfig {
    fn default() -> Self {
        Self {
            boundary_type: "admin0".to_string(),
            tolerance: 0.01,
            high_quality: false,
            code_property: "iso3".to_string(),
        }
    }
}

impl AdminBoundaryConfig {
    /// Query parameters for the boundary fetch
    pub fn to_query(&self) -> FeatureQuery {
        FeatureQuery::new()
            .with("type", &self.boundary_type)
            .with("tolerance", &self.tolerance.to_string())
            .with("highQuality", &self.high_quality.to_string())
    }
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapLayersConfig {
    pub api_url: String,
    pub graphql_path: String,
    pub feature_path: String,
    pub timeout_ms: u64,
    pub legend_enabled: bool,
    pub admin_boundaries: AdminBoundaryConfig,
}

impl Default for MapLayersConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            graphql_path: "/graphql".to_string(),
            feature_path: "/gis/feature".to_string(),
            timeout_ms: 30_000,
            legend_enabled: true,
            admin_boundaries: AdminBoundaryConfig::default(),
        }
    }
}

impl MapLayersConfig {
    /// Load from an optional JSON file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_env_overrides()
    }

    /// Read a JSON config file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| MapLayersError::Config {
            reason: format!("cannot read {}: {}", path.display(), e),
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Apply `MAPLAYERS_*` environment variables
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(url) = env::var("MAPLAYERS_API_URL") {
            self.api_url = url;
        }
        if let Ok(timeout) = env::var("MAPLAYERS_TIMEOUT_MS") {
            self.timeout_ms = timeout.parse().map_err(|_| MapLayersError::Config {
                reason: format!("MAPLAYERS_TIMEOUT_MS is not a number: {}", timeout),
            })?;
        }
        if let Ok(legend) = env::var("MAPLAYERS_LEGEND") {
            self.legend_enabled = !matches!(legend.to_lowercase().as_str(), "false" | "0" | "off");
        }
        Ok(self)
    }

    pub fn graphql_url(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), self.graphql_path)
    }

    pub fn feature_url(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), self.feature_path)
    }
}
