use super::*;
use crate::registry::TrackingRegistry;
use serde_json::json;

#[test]
fn test_view_from_registry_entity() {
    let mut registry = TrackingRegistry::default();
    registry.update_position("AA:BB:CC:DD:12:34", 10.0, -5.0, 0.0).unwrap();

    let views = registry.views();
    let view = &views[0];

    assert_eq!(view.label, "2:34");
    assert_eq!(view.position, Position::new(10.0, -5.0, 0.0));
    assert_eq!(view.previous, None);
    assert!(view.dirty);
    assert!(!view.animating);
}

#[test]
fn test_summary_with_metadata() {
    let view = EntityView {
        id: "AA:BB:CC:DD:12:34".to_string(),
        label: "2:34".to_string(),
        position: Position::new(12.7, -3.2, 0.0),
        previous: None,
        target: None,
        color: Rgb(255, 100, 100),
        animating: false,
        dirty: false,
        metadata: Metadata {
            tag: Some("990012345678".to_string()),
            balance: Some(9.5),
        },
    };

    assert_eq!(view.summary(), "2:34 : (12, -3) | 12345678 | 9.50");
}

#[test]
fn test_summary_without_metadata() {
    let mut registry = TrackingRegistry::default();
    registry.update_position("tag1", 1.0, 2.0, 0.0).unwrap();

    assert_eq!(registry.views()[0].summary(), "tag1 : (1, 2)");
}

#[test]
fn test_view_serialization_skips_empty_fields() {
    let mut registry = TrackingRegistry::default();
    registry.update_position("tag1", 1.0, 2.0, 0.0).unwrap();

    let value = serde_json::to_value(&registry.views()[0]).unwrap();
    assert!(value.get("previous").is_none());
    assert!(value.get("target").is_none());
    assert_eq!(value["position"], json!({"x": 1.0, "y": 2.0, "z": 0.0}));
    assert_eq!(value["metadata"], json!({}));
}

#[test]
fn test_frame_lookup() {
    let mut registry = TrackingRegistry::default();
    registry.update_position("a", 0.0, 0.0, 0.0).unwrap();
    registry.update_position("a", 100.0, 0.0, 0.0).unwrap();

    let frame = Frame::new(registry.views());
    assert!(frame.entity("a").is_some());
    assert!(frame.entity("b").is_none());
    assert!(frame.is_animating());
}

#[test]
fn test_viewport_mapping() {
    let viewport = Viewport::new(400.0, 100.0, 2.0);

    assert_eq!(viewport.to_screen(&Position::new(10.0, -20.0, 5.0)), (420.0, 60.0));
    assert_eq!(viewport.to_world(420.0, 60.0), Some((10.0, -20.0)));
    assert_eq!(Viewport::new(0.0, 0.0, 0.0).to_world(1.0, 1.0), None);
}
