//! Scripted feature client for testing
//!
//! Answers each query with a canned payload (or a failure) and records
//! every request it receives, so tests can assert how many round-trips
//! a resolution made.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::transport::{FeatureClient, FeatureQuery};
use crate::error::{MapLayersError, Result};
use crate::geojson::GeoJson;

/// Mock GIS feature endpoint
#[derive(Debug, Default)]
pub struct MockFeatureClient {
    responses: HashMap<FeatureQuery, GeoJson>,
    failures: HashSet<FeatureQuery>,
    delay: Option<Duration>,
    calls: Mutex<Vec<FeatureQuery>>,
}

impl MockFeatureClient {
    /// A client answering every query with an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `geojson`
    pub fn with_response(mut self, query: FeatureQuery, geojson: GeoJson) -> Self {
        self.responses.insert(query, geojson);
        self
    }

    /// Fail every request for `query`
    pub fn with_failure(mut self, query: FeatureQuery) -> Self {
        self.failures.insert(query);
        self
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, in arrival order
    pub fn calls(&self) -> Vec<FeatureQuery> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl FeatureClient for MockFeatureClient {
    async fn fetch_features(&self, query: &FeatureQuery) -> Result<GeoJson> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(query.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.failures.contains(query) {
            return Err(MapLayersError::transport(format!(
                "mock failure for {:?}",
                query.params()
            )));
        }
        Ok(self.responses.get(query).cloned().unwrap_or_default())
    }
}
