//! Service Tests
//!
//! Datasource resolution, admin-boundary joins and layer assembly
//! against the in-memory store and the scripted feature client.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;

use maplayers::config::MapLayersConfig;
use maplayers::datasource::Datasource;
use maplayers::geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use maplayers::layers::{LayerDefinition, LayerQuery, LayerType, Shape};
use maplayers::service::{InMemoryLayerStore, MapLayersService, MockFeatureClient};
use maplayers::{FilterNode, MapLayersError};

fn points(n: usize) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection::new(
        (0..n)
            .map(|i| {
                Feature::new(
                    Geometry::Point {
                        coordinates: vec![i as f64, 0.0],
                    },
                    json!({"i": i}).as_object().cloned().unwrap(),
                )
            })
            .collect(),
    ))
}

fn boundaries() -> GeoJson {
    let square = |size: f64| Geometry::Polygon {
        coordinates: vec![vec![
            vec![0.0, 0.0],
            vec![size, 0.0],
            vec![size, size],
            vec![0.0, 0.0],
        ]],
    };
    GeoJson::FeatureCollection(FeatureCollection::new(vec![
        Feature::new(square(1.0), json!({"iso3": "KEN"}).as_object().cloned().unwrap()),
        Feature::new(square(2.0), json!({"iso3": "UGA"}).as_object().cloned().unwrap()),
    ]))
}

fn admin_records() -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection::new(vec![
        Feature {
            properties: json!({"country": "KEN", "cases": 10}).as_object().cloned(),
            ..Feature::default()
        },
        Feature {
            properties: json!({"country": "TZA", "cases": 4}).as_object().cloned(),
            ..Feature::default()
        },
    ]))
}

fn service(
    layers: Vec<LayerDefinition>,
    client: Arc<MockFeatureClient>,
) -> MapLayersService {
    MapLayersService::new(
        Arc::new(InMemoryLayerStore::with_layers(layers)),
        client,
        MapLayersConfig::default(),
    )
}

// === Datasource Resolution ===

#[tokio::test]
async fn test_resource_without_location_skips_fetch() {
    let client = Arc::new(MockFeatureClient::new());
    let svc = service(Vec::new(), Arc::clone(&client));

    let definition = LayerDefinition::new("r", "Records", LayerType::Feature)
        .with_datasource(Datasource::resource("resource-1", "layout-1"));
    let geojson = svc.get_layer_geojson(&definition).await.unwrap();

    assert!(geojson.is_empty_collection());
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_ref_data_without_location_skips_fetch() {
    let client = Arc::new(MockFeatureClient::new());
    let svc = service(Vec::new(), Arc::clone(&client));

    let definition = LayerDefinition::new("r", "Countries", LayerType::Feature)
        .with_datasource(Datasource::ref_data("countries"));

    assert!(svc.get_layer_geojson(&definition).await.unwrap().is_empty_collection());
    assert_eq!(client.call_count(), 0);
}

#[tokio::test]
async fn test_valid_resource_issues_one_fetch() {
    let datasource = Datasource::resource("resource-1", "layout-1").with_lat_long("lat", "lng");
    let client = Arc::new(MockFeatureClient::new().with_response(datasource.to_query(), points(3)));
    let svc = service(Vec::new(), Arc::clone(&client));

    let definition =
        LayerDefinition::new("r", "Records", LayerType::Feature).with_datasource(datasource);
    let geojson = svc.get_layer_geojson(&definition).await.unwrap();

    assert_eq!(geojson.features().len(), 3);
    assert_eq!(client.call_count(), 1);
}

#[tokio::test]
async fn test_static_layer_uses_stored_geojson() {
    let client = Arc::new(MockFeatureClient::new());
    let svc = service(Vec::new(), Arc::clone(&client));

    let definition = LayerDefinition::new("s", "Sketch", LayerType::Sketch)
        .with_datasource(Datasource::stored())
        .with_geojson(points(2));

    assert_eq!(svc.get_layer_geojson(&definition).await.unwrap(), points(2));
    assert_eq!(client.call_count(), 0);
}

// === Admin Field Join ===

#[tokio::test]
async fn test_admin_join_waits_for_boundaries() {
    let config = MapLayersConfig::default();
    let datasource = Datasource::resource("cases", "by-country")
        .with_geo_field("location")
        .with_admin_field("country");
    let client = Arc::new(
        MockFeatureClient::new()
            .with_response(config.admin_boundaries.to_query(), boundaries())
            .with_response(datasource.to_query(), admin_records()),
    );
    let svc = Arc::new(service(
        vec![LayerDefinition::new("a", "Cases", LayerType::Feature).with_datasource(datasource.clone())],
        Arc::clone(&client),
    ));

    let pending = {
        let svc = Arc::clone(&svc);
        tokio::spawn(async move { svc.create_layer("a").await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(client.call_count(), 0, "feature fetch must wait for boundaries");

    assert_eq!(svc.load_admin_boundaries().await.unwrap(), 2);
    assert!(svc.boundaries().is_ready());
    let layer = pending.await.unwrap().unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], config.admin_boundaries.to_query());
    assert_eq!(calls[1], datasource.to_query());

    let data = layer.data();
    assert_eq!(data.features().len(), 1);
    assert!(matches!(
        data.features()[0].geometry,
        Some(Geometry::Polygon { .. })
    ));
    assert_eq!(data.features()[0].property("cases"), Some(&json!(10)));
}

#[tokio::test]
async fn test_admin_join_failure_degrades_to_empty() {
    let config = MapLayersConfig::default();
    let datasource = Datasource::ref_data("cases")
        .with_geo_field("location")
        .with_admin_field("country");
    let client = Arc::new(
        MockFeatureClient::new()
            .with_response(config.admin_boundaries.to_query(), boundaries())
            .with_failure(datasource.to_query()),
    );
    let svc = service(Vec::new(), Arc::clone(&client));
    svc.load_admin_boundaries().await.unwrap();

    let definition =
        LayerDefinition::new("a", "Cases", LayerType::Feature).with_datasource(datasource);
    let geojson = svc.get_layer_geojson(&definition).await.unwrap();

    assert!(geojson.is_empty_collection());
    assert_eq!(client.call_count(), 2);
}

#[tokio::test]
async fn test_failed_boundary_load_releases_pending_join() {
    let config = MapLayersConfig::default();
    let datasource = Datasource::resource("cases", "by-country")
        .with_geo_field("location")
        .with_admin_field("country");
    let client = Arc::new(
        MockFeatureClient::new()
            .with_failure(config.admin_boundaries.to_query())
            .with_response(datasource.to_query(), admin_records()),
    );
    let svc = Arc::new(service(
        vec![LayerDefinition::new("a", "Cases", LayerType::Feature).with_datasource(datasource)],
        Arc::clone(&client),
    ));

    let pending = {
        let svc = Arc::clone(&svc);
        tokio::spawn(async move { svc.create_layer("a").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!svc.boundaries().is_ready());

    let err = svc.load_admin_boundaries().await.unwrap_err();
    assert_eq!(err.error_code(), "TRANSPORT_ERROR");
    assert!(svc.boundaries().is_ready());

    let layer = tokio::time::timeout(Duration::from_secs(2), pending)
        .await
        .expect("layer should resolve after a failed boundary load")
        .unwrap()
        .unwrap();
    assert!(layer.data().is_empty_collection());
    // Records are never requested once the boundaries are known to be missing
    assert_eq!(client.call_count(), 1);
}

// === Layer Assembly ===

#[tokio::test]
async fn test_group_tree_from_store() {
    let layers = vec![
        LayerDefinition::new("root", "Root", LayerType::Group).with_sublayers(&["g1", "g2"]),
        LayerDefinition::new("g1", "Group 1", LayerType::Group).with_sublayers(&["f1"]),
        LayerDefinition::new("g2", "Group 2", LayerType::Group).with_sublayers(&["f2"]),
        LayerDefinition::new("f1", "Feature 1", LayerType::Feature).with_geojson(points(1)),
        LayerDefinition::new("f2", "Feature 2", LayerType::Feature).with_geojson(points(2)),
    ];
    let svc = service(layers, Arc::new(MockFeatureClient::new()));

    let root = svc.create_layer("root").await.unwrap();
    let renderable = root.get_layer();

    assert_eq!(renderable.leaf_count(), 2);
    assert_eq!(renderable.leaf_ids(), vec!["f1", "f2"]);
    assert_eq!(root.sublayers()[1].sublayers()[0].name(), "Feature 2");
}

#[tokio::test]
async fn test_stored_filter_applies_to_data() {
    let definition = LayerDefinition::new("f", "Filtered", LayerType::Feature)
        .with_geojson(points(4))
        .with_filter(FilterNode::leaf("i", "in", json!([0, 2])));
    let svc = service(vec![definition], Arc::new(MockFeatureClient::new()));

    let layer = svc.create_layer("f").await.unwrap();
    assert_eq!(layer.data().features().len(), 2);
    assert!(layer
        .get_layer()
        .shapes()
        .iter()
        .all(|s| matches!(s, Shape::Marker { .. })));
}

#[tokio::test]
async fn test_batch_reports_each_id() {
    let broken = Datasource::resource("broken", "layout").with_geo_field("geo");
    let working = Datasource::resource("working", "layout").with_geo_field("geo");
    let client = Arc::new(
        MockFeatureClient::new()
            .with_failure(broken.to_query())
            .with_response(working.to_query(), points(2))
            .with_delay(Duration::from_millis(5)),
    );
    let svc = service(
        vec![
            LayerDefinition::new("ok", "Ok", LayerType::Cluster).with_datasource(working),
            LayerDefinition::new("bad", "Bad", LayerType::Feature).with_datasource(broken),
        ],
        Arc::clone(&client),
    );

    let ids = vec!["bad".to_string(), "ok".to_string(), "missing".to_string()];
    let results = svc.create_layers_from_ids(&ids).await;

    assert_eq!(results.len(), 3);
    assert!(matches!(results[0], Err(MapLayersError::Transport { .. })));
    assert_eq!(results[1].as_ref().unwrap().id(), "ok");
    assert!(matches!(results[2], Err(MapLayersError::LayerNotFound { .. })));
    assert_eq!(client.call_count(), 2);
}

// === Definitions ===

#[tokio::test]
async fn test_crud_roundtrip() {
    let svc = service(Vec::new(), Arc::new(MockFeatureClient::new()));

    let added = svc
        .add_layer(LayerDefinition::new("", "Clinics", LayerType::Heatmap))
        .await
        .unwrap();
    assert_eq!(svc.get_layer_by_id(&added.id).await.unwrap().name, "Clinics");

    let mut renamed = added.clone();
    renamed.name = "Health Clinics".to_string();
    svc.edit_layer(&added.id, renamed).await.unwrap();

    let found = svc
        .get_layers(&LayerQuery {
            name: Some("health".to_string()),
            ..LayerQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    svc.delete_layer(&added.id).await.unwrap();
    let err = svc.get_layer_by_id(&added.id).await.unwrap_err();
    assert!(matches!(err, MapLayersError::LayerNotFound { .. }));
}
