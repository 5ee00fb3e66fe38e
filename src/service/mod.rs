//! Map Layers Service Module
//!
//! Provides:
//! - `LayerStore` / `FeatureClient` traits for the remote collaborators
//! - an in-memory store and a scripted mock feature client
//! - the administrative boundaries gate
//! - `MapLayersService`, the orchestration layer
//! - `HttpClient` (feature `http`)

mod admin;
#[cfg(feature = "http")]
mod http;
mod layers_service;
mod memory;
mod mock;
mod transport;

pub use admin::{AdminBoundaries, BoundaryIndex};
#[cfg(feature = "http")]
pub use http::HttpClient;
pub use layers_service::MapLayersService;
pub use memory::InMemoryLayerStore;
pub use mock::MockFeatureClient;
pub use transport::{FeatureClient, FeatureQuery, LayerStore};
