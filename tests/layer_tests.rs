//! Layer Model Tests
//!
//! Filtering, field inference and renderable construction through the
//! public API.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use maplayers::fields::{infer_fields, FieldType};
use maplayers::filter::{filter_geojson, satisfies, FilterNode};
use maplayers::geojson::{Feature, FeatureCollection, GeoJson, Geometry};
use maplayers::layers::{
    Layer, LayerContent, LayerDefinition, LayerType, Legend, RenderKind, Shape,
};

fn feature(geometry: Geometry, properties: Value) -> Feature {
    Feature::new(geometry, properties.as_object().cloned().unwrap_or_default())
}

fn point(x: f64, y: f64) -> Geometry {
    Geometry::Point {
        coordinates: vec![x, y],
    }
}

fn collection(features: Vec<Feature>) -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection::new(features))
}

fn data_layer(id: &str, layer_type: LayerType, geojson: GeoJson) -> Layer {
    Layer::new(
        LayerDefinition::new(id, id, layer_type),
        LayerContent::data(geojson, FilterNode::default()),
    )
    .unwrap()
}

fn group(id: &str, children: Vec<Layer>) -> Layer {
    Layer::new(
        LayerDefinition::new(id, id, LayerType::Group),
        LayerContent::Group(children),
    )
    .unwrap()
}

fn sample() -> GeoJson {
    collection(vec![
        feature(point(0.0, 0.0), json!({"age": 12, "status": "open"})),
        feature(point(1.0, 1.0), json!({"age": 40, "status": "closed"})),
        feature(point(2.0, 2.0), json!({"age": 65, "status": "open"})),
    ])
}

// === Filter Tests ===

#[test]
fn test_empty_composites_for_every_feature() {
    for f in sample().features() {
        assert!(satisfies(f, &FilterNode::all(vec![])));
        assert!(!satisfies(f, &FilterNode::any(vec![])));
    }
}

#[test]
fn test_filtering_twice_equals_filtering_once() {
    let filter = FilterNode::all(vec![
        FilterNode::leaf("age", "gte", json!(18)),
        FilterNode::leaf("status", "eq", json!("open")),
    ]);
    let once = filter_geojson(&sample(), &filter);
    let twice = filter_geojson(&once, &filter);

    assert_eq!(once.features().len(), 1);
    assert_eq!(once, twice);
}

#[test]
fn test_unknown_operator_hides_everything() {
    let filter: FilterNode =
        serde_json::from_value(json!({"field": "age", "operator": "approximately", "value": 40}))
            .unwrap();
    assert!(filter_geojson(&sample(), &filter).is_empty_collection());
}

// === Field Inference Tests ===

#[test]
fn test_age_conflict_resolves_to_any() {
    let geojson = collection(vec![
        feature(point(0.0, 0.0), json!({"age": "30"})),
        feature(point(0.0, 0.0), json!({"age": 30})),
    ]);
    assert_eq!(infer_fields(&geojson)["age"], FieldType::Any);
}

#[test]
fn test_date_boundary() {
    let geojson = collection(vec![feature(
        point(0.0, 0.0),
        json!({"full": "2023-05-01T12:00:00.000Z", "short": "2023-05-01"}),
    )]);
    let fields = infer_fields(&geojson);
    assert_eq!(fields["full"], FieldType::Date);
    assert_eq!(fields["short"], FieldType::String);
}

#[test]
fn test_layer_fields_follow_geojson() {
    let layer = data_layer("a", LayerType::Feature, sample());
    let fields = layer.fields().unwrap();
    assert_eq!(fields["age"], FieldType::Number);
    assert_eq!(fields["status"], FieldType::String);
}

// === Renderable Tests ===

#[test]
fn test_radius_point_becomes_circle() {
    let layer = data_layer(
        "r",
        LayerType::Feature,
        GeoJson::Feature(feature(point(5.0, 45.0), json!({"radius": 500}))),
    );

    match &layer.get_layer().shapes()[0] {
        Shape::Circle { center, radius, .. } => {
            assert_relative_eq!(*radius, 500.0);
            assert_eq!(center, &vec![5.0, 45.0]);
        }
        other => panic!("Expected circle, got {:?}", other),
    }
}

#[test]
fn test_point_without_radius_becomes_marker() {
    let layer = data_layer(
        "m",
        LayerType::Feature,
        GeoJson::Feature(feature(point(5.0, 45.0), json!({}))),
    );
    assert!(matches!(layer.get_layer().shapes()[0], Shape::Marker { .. }));
}

#[test]
fn test_nested_groups_flatten_in_declaration_order() {
    let tree = group(
        "root",
        vec![
            group("left", vec![data_layer("a", LayerType::Feature, sample())]),
            group("right", vec![data_layer("b", LayerType::Heatmap, sample())]),
        ],
    );

    let renderable = tree.get_layer();
    assert!(renderable.is_group());
    assert_eq!(renderable.leaf_count(), 2);
    assert_eq!(renderable.leaf_ids(), vec!["a", "b"]);

    match &renderable.kind {
        RenderKind::Group { children } => {
            let ids: Vec<&str> = children.iter().map(|c| c.id.as_str()).collect();
            assert_eq!(ids, vec!["left", "right"]);
        }
        other => panic!("Expected group, got {:?}", other),
    }
}

#[test]
fn test_cluster_uses_filtered_points() {
    let mut layer = data_layer("c", LayerType::Cluster, sample());
    layer
        .set_filter(FilterNode::leaf("status", "eq", json!("open")))
        .unwrap();

    match &layer.get_layer().kind {
        RenderKind::Cluster { points, options } => {
            assert_eq!(points.len(), 2);
            assert_relative_eq!(options.radius, 80.0);
        }
        other => panic!("Expected cluster, got {:?}", other),
    }
}

#[test]
fn test_heatmap_weights_from_property() {
    let mut definition = LayerDefinition::new("h", "Heat", LayerType::Heatmap);
    definition.heatmap.weight_field = Some("age".to_string());
    let layer = Layer::new(
        definition,
        LayerContent::data(sample(), FilterNode::default()),
    )
    .unwrap();

    match &layer.get_layer().kind {
        RenderKind::Heatmap { points, .. } => {
            let weights: Vec<f64> = points.iter().map(|p| p.weight).collect();
            assert_eq!(weights, vec![12.0, 40.0, 65.0]);
        }
        other => panic!("Expected heatmap, got {:?}", other),
    }
}

#[test]
fn test_bare_geometry_renders_nothing() {
    let layer = data_layer("g", LayerType::Feature, GeoJson::Geometry(point(0.0, 0.0)));
    assert!(layer.data().is_empty_collection());
    assert!(layer.get_layer().shapes().is_empty());
}

// === Legend Tests ===

#[test]
fn test_legend_shapes_by_type() {
    let mixed = collection(vec![
        feature(point(0.0, 0.0), json!({})),
        feature(
            Geometry::Polygon {
                coordinates: vec![vec![
                    vec![0.0, 0.0],
                    vec![1.0, 0.0],
                    vec![1.0, 1.0],
                    vec![0.0, 0.0],
                ]],
            },
            json!({}),
        ),
    ]);

    match data_layer("f", LayerType::Feature, mixed).get_legend() {
        Some(Legend::Feature { entries, .. }) => assert_eq!(entries.len(), 2),
        other => panic!("Expected feature legend, got {:?}", other),
    }

    match data_layer("c", LayerType::Cluster, sample()).get_legend() {
        Some(Legend::Cluster { count, .. }) => assert_eq!(count, 3),
        other => panic!("Expected cluster legend, got {:?}", other),
    }

    match data_layer("h", LayerType::Heatmap, sample()).get_legend() {
        Some(Legend::Heatmap { gradient, .. }) => assert_eq!(gradient.len(), 5),
        other => panic!("Expected heatmap legend, got {:?}", other),
    }

    let legend = data_layer("h", LayerType::Heatmap, sample()).get_legend().unwrap();
    assert_eq!(legend.title(), "h");
}

#[test]
fn test_legend_disabled() {
    let mut layer = data_layer("f", LayerType::Feature, sample());
    layer.set_legend_enabled(false);
    assert!(layer.get_legend().is_none());
}
