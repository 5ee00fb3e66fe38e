//! Datasource descriptors
//!
//! A datasource says where a layer's geometry comes from. Remote sources
//! are checked before any request is made: a source that cannot locate
//! its records on a map resolves to an empty collection instead.

use serde::{Deserialize, Serialize};

use crate::service::FeatureQuery;

/// Where the records behind a layer live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DatasourceOrigin {
    /// Geometry stored with the layer definition itself
    #[default]
    Static,
    /// Records of a resource, read through a layout or aggregation
    Resource,
    /// Reference data items
    RefData,
}

/// Declarative description of a layer's geometry source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datasource {
    #[serde(default)]
    pub origin: DatasourceOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude_field: Option<String>,
    /// Property holding an administrative-region code; geometry is
    /// replaced by the matching boundary polygon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_field: Option<String>,
}

fn present(field: &Option<String>) -> bool {
    field.as_deref().map_or(false, |s| !s.is_empty())
}

impl Datasource {
    /// Static source, resolved from the layer's stored geometry
    pub fn stored() -> Self {
        Self::default()
    }

    /// Resource source read through a layout
    pub fn resource(resource: &str, layout: &str) -> Self {
        Self {
            origin: DatasourceOrigin::Resource,
            resource: Some(resource.to_string()),
            layout: Some(layout.to_string()),
            ..Self::default()
        }
    }

    /// Reference-data source
    pub fn ref_data(ref_data: &str) -> Self {
        Self {
            origin: DatasourceOrigin::RefData,
            ref_data: Some(ref_data.to_string()),
            ..Self::default()
        }
    }

    pub fn with_geo_field(mut self, field: &str) -> Self {
        self.geo_field = Some(field.to_string());
        self
    }

    pub fn with_lat_long(mut self, latitude: &str, longitude: &str) -> Self {
        self.latitude_field = Some(latitude.to_string());
        self.longitude_field = Some(longitude.to_string());
        self
    }

    pub fn with_admin_field(mut self, field: &str) -> Self {
        self.admin_field = Some(field.to_string());
        self
    }

    /// A geo field, or both halves of a lat/long pair
    pub fn has_location(&self) -> bool {
        present(&self.geo_field) || (present(&self.latitude_field) && present(&self.longitude_field))
    }

    /// Whether the source fetches remotely
    pub fn is_remote(&self) -> bool {
        self.origin != DatasourceOrigin::Static
    }

    /// Check that a remote request could return located records.
    ///
    /// - reference data needs a location
    /// - a resource needs a layout or aggregation plus a location
    /// - static sources are always valid
    pub fn is_valid(&self) -> bool {
        match self.origin {
            DatasourceOrigin::Static => true,
            DatasourceOrigin::RefData => present(&self.ref_data) && self.has_location(),
            DatasourceOrigin::Resource => {
                present(&self.resource)
                    && (present(&self.layout) || present(&self.aggregation))
                    && self.has_location()
            }
        }
    }

    /// Query parameters for the GIS feature endpoint
    pub fn to_query(&self) -> FeatureQuery {
        let mut query = FeatureQuery::new();
        let params = [
            ("resource", &self.resource),
            ("refData", &self.ref_data),
            ("layout", &self.layout),
            ("aggregation", &self.aggregation),
            ("geoField", &self.geo_field),
            ("latitudeField", &self.latitude_field),
            ("longitudeField", &self.longitude_field),
            ("adminField", &self.admin_field),
        ];
        for (key, value) in params {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                query = query.with(key, value);
            }
        }
        query
    }
}
