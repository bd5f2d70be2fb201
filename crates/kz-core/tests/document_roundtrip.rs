//! Integration tests: persisted project → store → persisted project.
//!
//! Every field of the model must survive JSON and MessagePack round-trips,
//! including style keys the model has no typed field for.

use kz_core::*;
use pretty_assertions::assert_eq;

const PROJECT: &str = include_str!("fixtures/project.json");
const LEGACY: &str = include_str!("fixtures/legacy_groups.json");

fn id(s: &str) -> ElementId {
    ElementId::intern(s)
}

#[test]
fn json_roundtrip_is_lossless() {
    let doc = Document::from_json(PROJECT).expect("fixture parses");
    let text = doc.to_json().unwrap();
    let again = Document::from_json(&text).unwrap();
    assert_eq!(doc, again);
}

#[test]
fn msgpack_snapshot_matches_json() {
    let doc = Document::from_json(PROJECT).unwrap();
    let bytes = doc.to_msgpack().unwrap();
    let back = Document::from_msgpack(&bytes).unwrap();
    assert_eq!(doc, back);
}

#[test]
fn fixture_fields_are_typed() {
    let doc = Document::from_json(PROJECT).unwrap();
    assert_eq!(doc.elements.len(), 6);

    let frame = &doc.elements[1];
    assert!(frame.clip);
    assert_eq!(frame.shape_kind, Some(ShapeKind::Rectangle));
    let g = frame.style.gradient.as_ref().unwrap();
    assert_eq!(g.kind, GradientKind::Radial);
    // Stored descending, rendered ascending.
    assert_eq!(g.sorted_stops()[0].color, Rgb::from_hex("#3b82f6"));

    let photo = &doc.elements[2];
    assert_eq!(photo.parent_id, Some(id("hero-frame")));
    assert_eq!(photo.style.brightness, Some(110.0));

    let logo = &doc.elements[3];
    assert_eq!(logo.role, Some(ElementRole::Logo));
    assert_eq!(
        logo.constraints.as_slice(),
        &[Constraint::MarginBound, Constraint::AspectRatio, Constraint::GridSnap]
    );
    assert!(logo.style.extra.contains_key("textShadow"));

    let swoosh = &doc.elements[5];
    assert_eq!(swoosh.points.len(), 2);
    assert_eq!(swoosh.points[0].control2, Some(Point::new(60.0, 0.0)));
    assert_eq!(swoosh.points[0].control1, None);

    assert_eq!(doc.components[0].element.kind, ElementKind::Box);
    assert_eq!(doc.design_system["fonts"][0], "Inter");
}

#[test]
fn store_roundtrip_preserves_order_and_nesting() {
    let mut doc = Document::from_json(PROJECT).unwrap();
    let original = doc.elements.clone();
    let store = doc.into_store();
    assert_eq!(store.children(id("hero-frame")), vec![id("hero-photo")]);

    let back = Document::from_parts(
        &store,
        doc.grid_config.clone(),
        doc.components.clone(),
        doc.design_system.clone(),
    );
    assert_eq!(back.elements, original);
}

#[test]
fn legacy_group_tags_become_containers() {
    let mut doc = Document::from_json(LEGACY).unwrap();
    let store = doc.into_store();

    let names: Vec<&str> = store.elements().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(
        names,
        vec!["card", "card-bg", "loose", "card-title", "chip", "badge"]
    );

    let card = store.get(id("card")).unwrap();
    assert_eq!(card.kind, ElementKind::Group);
    assert!(!card.clip);
    assert_eq!(card.bounds(), Bounds::new(48.0, 54.0, 200.0, 120.0));
    assert_eq!(store.children(id("card")), vec![id("card-bg"), id("card-title")]);
    assert_eq!(store.get(id("loose")).unwrap().parent_id, None);

    // The tag is not written back out.
    let json = Document::from_parts(&store, doc.grid_config.clone(), Vec::new(), serde_json::Value::Null)
        .to_json()
        .unwrap();
    assert!(!json.contains("groupId"));
}
