//! Error handling for map layers
//!
//! Filter evaluation and datasource validation never produce errors;
//! everything else reports through [`MapLayersError`].

use thiserror::Error;

/// Result type alias for map layer operations
pub type Result<T> = std::result::Result<T, MapLayersError>;

/// Main error type for map layer operations
#[derive(Error, Debug)]
pub enum MapLayersError {
    // Layer Errors
    #[error("Layer definition is missing")]
    MissingDefinition,

    #[error("Invalid layer '{id}': {reason}")]
    InvalidLayer { id: String, reason: String },

    #[error("Layer not found: {id}")]
    LayerNotFound { id: String },

    // Data Errors
    #[error("Invalid GeoJSON: {reason}")]
    InvalidGeoJson { reason: String },

    // Remote Errors
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("GraphQL error: {message}")]
    Graphql { message: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MapLayersError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            MapLayersError::MissingDefinition => "MISSING_DEFINITION",
            MapLayersError::InvalidLayer { .. } => "INVALID_LAYER",
            MapLayersError::LayerNotFound { .. } => "LAYER_NOT_FOUND",
            MapLayersError::InvalidGeoJson { .. } => "INVALID_GEOJSON",
            MapLayersError::Transport { .. } => "TRANSPORT_ERROR",
            MapLayersError::Graphql { .. } => "GRAPHQL_ERROR",
            MapLayersError::Config { .. } => "CONFIG_ERROR",
            MapLayersError::Io(_) => "IO_ERROR",
            MapLayersError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if retrying the operation could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MapLayersError::Transport { .. } | MapLayersError::LayerNotFound { .. }
        )
    }

    pub(crate) fn transport(message: impl Into<String>) -> Self {
        MapLayersError::Transport {
            message: message.into(),
        }
    }
}
