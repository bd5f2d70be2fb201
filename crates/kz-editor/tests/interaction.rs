//! Integration tests: pointer and keyboard flows through the editor.

use kz_core::model::{Bounds, ComponentItem, Constraint, DesignElement, ElementKind, Point, Style};
use kz_core::{ElementId, ElementStore, Gradient, GridConfig, Mutation};
use kz_editor::{DropPayload, Editor, Modifiers, ToolKind};
use pretty_assertions::assert_eq;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn letter() -> GridConfig {
    GridConfig {
        columns: 12,
        gutter: 24.0,
        margin: 48.0,
        baseline: 18.0,
        width: 800.0,
        height: 600.0,
        ..GridConfig::default()
    }
}

fn editor() -> Editor {
    Editor::new(letter()).unwrap()
}

fn add(ed: &mut Editor, el: DesignElement) -> ElementId {
    ed.apply(Mutation::Create { element: Box::new(el) }).ids[0]
}

fn rect(ed: &mut Editor, kind: ElementKind, b: Bounds) -> ElementId {
    add(ed, DesignElement::generated(kind, b))
}

fn drag(ed: &mut Editor, from: (f32, f32), to: (f32, f32), mods: Modifiers) {
    ed.pointer_down(from.0, from.1, mods);
    ed.pointer_move(to.0, to.1, mods);
    ed.pointer_up(to.0, to.1, mods);
}

fn click(ed: &mut Editor, x: f32, y: f32, mods: Modifiers) {
    drag(ed, (x, y), (x, y), mods);
}

fn bounds(ed: &Editor, id: ElementId) -> Bounds {
    ed.store().get(id).unwrap().bounds()
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn drag_snaps_to_margins_and_baseline() {
    init();
    let mut ed = editor();
    let id = add(
        &mut ed,
        DesignElement::generated(ElementKind::Box, Bounds::new(0.0, 0.0, 100.0, 50.0))
            .with_constraints(&[Constraint::GridSnap, Constraint::BaselineSnap]),
    );

    drag(&mut ed, (10.0, 10.0), (54.0, 26.0), Modifiers::NONE);
    assert_eq!(bounds(&ed, id), Bounds::new(48.0, 18.0, 100.0, 50.0));

    // Deltas are measured from the drag start, not the previous frame.
    ed.pointer_down(60.0, 30.0, Modifiers::NONE);
    ed.pointer_move(200.0, 30.0, Modifiers::NONE);
    ed.pointer_move(767.0, 30.0, Modifiers::NONE);
    ed.pointer_up(767.0, 30.0, Modifiers::NONE);
    assert_eq!(bounds(&ed, id).x, 752.0);
}

#[test]
fn unconstrained_elements_move_freely() {
    init();
    let mut ed = editor();
    let id = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 100.0, 50.0));
    drag(&mut ed, (10.0, 10.0), (54.0, 26.0), Modifiers::NONE);
    assert_eq!(bounds(&ed, id), Bounds::new(44.0, 16.0, 100.0, 50.0));
}

#[test]
fn drag_under_zoom_uses_canvas_delta() {
    init();
    let mut ed = editor();
    let id = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 100.0, 100.0));
    ed.viewport_mut().set_zoom(2.0);
    ed.viewport_mut().pan = Point::new(100.0, 50.0);

    // canvas (10, 10) is screen (120, 70)
    drag(&mut ed, (120.0, 70.0), (160.0, 90.0), Modifiers::NONE);
    assert_eq!(bounds(&ed, id), Bounds::new(20.0, 10.0, 100.0, 100.0));
}

#[test]
fn multi_selection_resizes_proportionally() {
    init();
    let mut ed = editor();
    let a = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 100.0, 100.0));
    let b = rect(&mut ed, ElementKind::Box, Bounds::new(200.0, 0.0, 50.0, 50.0));
    ed.apply(Mutation::Select { ids: vec![a, b] });
    assert_eq!(ed.selection_bounds(), Some(Bounds::new(0.0, 0.0, 250.0, 100.0)));

    // East handle sits at the middle of the right edge.
    drag(&mut ed, (250.0, 50.0), (275.0, 50.0), Modifiers::NONE);

    let ba = bounds(&ed, a);
    let bb = bounds(&ed, b);
    assert!(close(ba.width, 110.0));
    assert!(close(bb.x, 220.0));
    assert!(close(bb.width, 55.0));
    assert!(close(ba.height, 100.0));
}

#[test]
fn aspect_constraint_locks_single_resize() {
    init();
    let mut ed = editor();
    let id = add(
        &mut ed,
        DesignElement::generated(ElementKind::Image, Bounds::new(100.0, 100.0, 200.0, 100.0))
            .with_constraints(&[Constraint::AspectRatio]),
    );
    ed.apply(Mutation::Select { ids: vec![id] });
    // South-east corner, grow width by 100.
    drag(&mut ed, (300.0, 200.0), (400.0, 200.0), Modifiers::NONE);
    assert_eq!(bounds(&ed, id), Bounds::new(100.0, 100.0, 300.0, 150.0));
}

#[test]
fn resizing_a_frame_scales_its_children() {
    init();
    let mut ed = editor();
    let frame = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 200.0, 200.0));
    let kid = add(
        &mut ed,
        DesignElement::generated(ElementKind::Text, Bounds::new(100.0, 100.0, 50.0, 20.0)).with_parent(frame),
    );
    ed.apply(Mutation::Select { ids: vec![frame] });
    drag(&mut ed, (200.0, 200.0), (400.0, 300.0), Modifiers::NONE);

    assert_eq!(bounds(&ed, frame), Bounds::new(0.0, 0.0, 400.0, 300.0));
    assert_eq!(bounds(&ed, kid), Bounds::new(200.0, 150.0, 100.0, 30.0));
}

#[test]
fn marquee_selects_overlapping_elements() {
    init();
    let mut ed = editor();
    let inside = rect(&mut ed, ElementKind::Box, Bounds::new(20.0, 20.0, 10.0, 10.0));
    let partial = rect(&mut ed, ElementKind::Box, Bounds::new(90.0, 90.0, 30.0, 30.0));
    let outside = rect(&mut ed, ElementKind::Box, Bounds::new(300.0, 300.0, 10.0, 10.0));
    let touching = rect(&mut ed, ElementKind::Box, Bounds::new(100.0, 40.0, 20.0, 20.0));

    ed.pointer_down(0.0, 0.0, Modifiers::NONE);
    ed.pointer_move(100.0, 100.0, Modifiers::NONE);
    assert_eq!(ed.marquee_rect(), Some(Bounds::new(0.0, 0.0, 100.0, 100.0)));
    ed.pointer_up(100.0, 100.0, Modifiers::NONE);

    assert_eq!(ed.store().selection(), &[inside, partial, touching]);
    assert!(!ed.store().is_selected(outside));
    assert_eq!(ed.marquee_rect(), None);
}

#[test]
fn shift_marquee_adds_to_selection() {
    init();
    let mut ed = editor();
    let far = rect(&mut ed, ElementKind::Box, Bounds::new(400.0, 400.0, 10.0, 10.0));
    let near = rect(&mut ed, ElementKind::Box, Bounds::new(20.0, 20.0, 10.0, 10.0));
    ed.apply(Mutation::Select { ids: vec![far] });

    drag(&mut ed, (0.0, 0.0), (50.0, 50.0), Modifiers::SHIFT);
    assert_eq!(ed.store().selection(), &[far, near]);
}

#[test]
fn escape_cancels_marquee_and_restores_selection() {
    init();
    let mut ed = editor();
    let boxed = rect(&mut ed, ElementKind::Box, Bounds::new(100.0, 100.0, 50.0, 50.0));

    ed.pointer_down(10.0, 10.0, Modifiers::NONE);
    ed.pointer_move(300.0, 300.0, Modifiers::NONE);
    assert!(ed.key_down("Escape", Modifiers::NONE));
    assert_eq!(ed.marquee_rect(), None);
    assert!(!ed.pointer_up(300.0, 300.0, Modifiers::NONE));
    assert!(ed.store().selection().is_empty());
    assert!(ed.store().contains(boxed));
}

#[test]
fn delete_during_marquee_keeps_elements_and_prior_selection() {
    init();
    let mut ed = editor();
    let kept = rect(&mut ed, ElementKind::Box, Bounds::new(400.0, 400.0, 10.0, 10.0));
    let crossed = rect(&mut ed, ElementKind::Box, Bounds::new(20.0, 20.0, 10.0, 10.0));
    ed.apply(Mutation::Select { ids: vec![kept] });

    ed.pointer_down(0.0, 0.0, Modifiers::NONE);
    ed.pointer_move(50.0, 50.0, Modifiers::NONE);
    // The press replaced the selection; cancelling puts it back.
    assert!(ed.store().selection().is_empty());
    assert!(ed.key_down("Delete", Modifiers::NONE));
    ed.pointer_up(50.0, 50.0, Modifiers::NONE);

    assert_eq!(ed.store().selection(), &[kept]);
    assert!(ed.store().contains(kept));
    assert!(ed.store().contains(crossed));
}

#[test]
fn click_selects_outermost_ancestor() {
    init();
    let mut ed = editor();
    let card = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 300.0, 200.0));
    let title = add(
        &mut ed,
        DesignElement::generated(ElementKind::Text, Bounds::new(20.0, 20.0, 200.0, 40.0)).with_parent(card),
    );

    click(&mut ed, 50.0, 30.0, Modifiers::NONE);
    assert_eq!(ed.store().selection(), &[card]);

    // Cmd drills into the element under the pointer.
    click(&mut ed, 50.0, 30.0, Modifiers::CMD);
    assert_eq!(ed.store().selection(), &[title]);
}

#[test]
fn shift_click_toggles() {
    init();
    let mut ed = editor();
    let a = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 50.0, 50.0));
    let b = rect(&mut ed, ElementKind::Box, Bounds::new(100.0, 0.0, 50.0, 50.0));

    click(&mut ed, 10.0, 10.0, Modifiers::NONE);
    click(&mut ed, 110.0, 10.0, Modifiers::SHIFT);
    assert_eq!(ed.store().selection(), &[a, b]);
    click(&mut ed, 10.0, 10.0, Modifiers::SHIFT);
    assert_eq!(ed.store().selection(), &[b]);

    // Plain click on empty canvas clears.
    click(&mut ed, 500.0, 500.0, Modifiers::NONE);
    assert!(ed.store().selection().is_empty());
}

#[test]
fn dragging_a_selected_element_moves_the_whole_selection() {
    init();
    let mut ed = editor();
    let a = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 50.0, 50.0));
    let b = rect(&mut ed, ElementKind::Box, Bounds::new(100.0, 0.0, 50.0, 50.0));
    ed.apply(Mutation::Select { ids: vec![a, b] });

    drag(&mut ed, (10.0, 10.0), (40.0, 30.0), Modifiers::NONE);
    assert_eq!(bounds(&ed, a), Bounds::new(30.0, 20.0, 50.0, 50.0));
    assert_eq!(bounds(&ed, b), Bounds::new(130.0, 20.0, 50.0, 50.0));

    // Shift keeps only the dominant axis.
    ed.pointer_down(40.0, 30.0, Modifiers::NONE);
    ed.pointer_move(45.0, 90.0, Modifiers::SHIFT);
    ed.pointer_up(45.0, 90.0, Modifiers::SHIFT);
    assert_eq!(bounds(&ed, a), Bounds::new(30.0, 80.0, 50.0, 50.0));
}

#[test]
fn shape_tool_drag_versus_click() {
    init();
    let mut ed = editor();
    ed.set_tool(ToolKind::Shape);
    ed.pointer_down(100.0, 100.0, Modifiers::NONE);
    ed.pointer_move(200.0, 160.0, Modifiers::NONE);
    assert_eq!(ed.ghost_rect(), Some(Bounds::new(100.0, 100.0, 100.0, 60.0)));
    ed.pointer_up(200.0, 160.0, Modifiers::NONE);

    let [dragged] = ed.store().selection() else {
        panic!("expected one new element");
    };
    assert_eq!(bounds(&ed, *dragged), Bounds::new(100.0, 100.0, 100.0, 60.0));
    assert_eq!(ed.tool(), ToolKind::Select);
    assert_eq!(ed.ghost_rect(), None);

    ed.set_tool(ToolKind::Shape);
    click(&mut ed, 300.0, 300.0, Modifiers::NONE);
    let [clicked] = ed.store().selection() else {
        panic!("expected one new element");
    };
    let b = bounds(&ed, *clicked);
    assert_eq!((b.width, b.height), (100.0, 100.0));
    assert_eq!(ed.store().len(), 2);
}

#[test]
fn shift_creation_makes_a_square() {
    init();
    let mut ed = editor();
    ed.set_tool(ToolKind::Frame);
    drag(&mut ed, (100.0, 100.0), (150.0, 190.0), Modifiers::SHIFT);
    let id = ed.store().selection()[0];
    let el = ed.store().get(id).unwrap();
    assert_eq!((el.width, el.height), (90.0, 90.0));
    assert!(el.clip);
}

#[test]
fn text_tool_enters_edit_mode() {
    init();
    let mut ed = editor();
    ed.set_tool(ToolKind::Type);
    click(&mut ed, 300.0, 300.0, Modifiers::NONE);
    let id = ed.editing_text().unwrap();
    let el = ed.store().get(id).unwrap();
    assert_eq!(el.kind, ElementKind::Text);
    assert_eq!((el.width, el.height), (300.0, 50.0));

    // Clicking elsewhere leaves edit mode.
    click(&mut ed, 700.0, 550.0, Modifiers::NONE);
    assert_eq!(ed.editing_text(), None);

    assert!(ed.double_click(310.0, 310.0));
    assert_eq!(ed.editing_text(), Some(id));
}

#[test]
fn image_drop_is_scaled_and_snapped() {
    init();
    let mut ed = editor();
    ed.set_tool(ToolKind::Image);
    let id = ed
        .drop(
            44.0,
            16.0,
            DropPayload::Image {
                src: "data:image/png;base64,AAAA".into(),
                width: 1200.0,
                height: 800.0,
            },
        )
        .unwrap();

    let el = ed.store().get(id).unwrap();
    assert_eq!(el.bounds(), Bounds::new(48.0, 18.0, 600.0, 400.0));
    assert_eq!(el.kind, ElementKind::Image);
    assert_eq!(el.constraints.as_slice(), &[Constraint::GridSnap]);
    assert_eq!(ed.store().selection(), &[id]);
    assert_eq!(ed.tool(), ToolKind::Select);
}

#[test]
fn image_tool_click_then_place() {
    init();
    let mut ed = editor();
    ed.set_tool(ToolKind::Image);
    click(&mut ed, 300.0, 300.0, Modifiers::NONE);
    let id = ed.place_pending_image("logo.png".into(), 120.0, 80.0).unwrap();
    assert_eq!(bounds(&ed, id).width, 120.0);
    assert!(ed.place_pending_image("again.png".into(), 10.0, 10.0).is_none());
}

#[test]
fn component_drop_centers_on_pointer() {
    init();
    let mut scratch = ElementStore::new();
    let src = scratch.create(
        DesignElement::generated(ElementKind::Box, Bounds::new(0.0, 0.0, 200.0, 100.0)).with_style(Style {
            background_color: Some("#2A4B8D".into()),
            ..Default::default()
        }),
    );
    let component: ComponentItem = scratch.componentize(src, "CTA").unwrap();
    let json = serde_json::to_string(&component).unwrap();

    let mut ed = editor();
    let id = ed.drop(400.0, 300.0, DropPayload::Component { json }).unwrap();
    let el = ed.store().get(id).unwrap();
    // (300, 250) before snapping; 250 is within the baseline tolerance of 252.
    assert_eq!(el.bounds(), Bounds::new(300.0, 252.0, 200.0, 100.0));
    assert_eq!(el.style.background_color.as_deref(), Some("#2A4B8D"));
    assert_ne!(id, src);
}

#[test]
fn malformed_component_drop_is_ignored() {
    init();
    let mut ed = editor();
    let out = ed.drop(
        10.0,
        10.0,
        DropPayload::Component {
            json: "{\"id\": \"comp_1\", \"name\":".into(),
        },
    );
    assert_eq!(out, None);
    assert!(ed.store().is_empty());
}

#[test]
fn tool_switch_selection_rules() {
    init();
    let mut ed = editor();
    let id = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 50.0, 50.0));
    ed.apply(Mutation::Select { ids: vec![id] });

    ed.set_tool(ToolKind::Hand);
    ed.set_tool(ToolKind::Gradient);
    assert_eq!(ed.store().selection(), &[id]);

    ed.set_tool(ToolKind::Shape);
    assert!(ed.store().selection().is_empty());
}

#[test]
fn blur_ends_gestures() {
    init();
    let mut ed = editor();
    let id = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 50.0, 50.0));

    ed.pointer_down(10.0, 10.0, Modifiers::NONE);
    ed.pointer_move(30.0, 10.0, Modifiers::NONE);
    assert!(ed.blur());
    assert!(!ed.is_interacting());
    // The drag keeps its last state and later moves do nothing.
    assert_eq!(bounds(&ed, id).x, 20.0);
    assert!(!ed.pointer_move(200.0, 10.0, Modifiers::NONE));
    assert_eq!(bounds(&ed, id).x, 20.0);

    // An interrupted marquee selects nothing.
    ed.apply(Mutation::Select { ids: vec![] });
    ed.pointer_down(300.0, 300.0, Modifiers::NONE);
    ed.pointer_move(0.0, 0.0, Modifiers::NONE);
    ed.blur();
    assert!(!ed.pointer_up(0.0, 0.0, Modifiers::NONE));
    assert!(ed.store().selection().is_empty());
}

#[test]
fn grouping_shortcuts() {
    init();
    let mut ed = editor();
    let a = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 50.0, 50.0));
    let b = rect(&mut ed, ElementKind::Text, Bounds::new(100.0, 0.0, 50.0, 50.0));
    ed.apply(Mutation::Select { ids: vec![a, b] });

    let cmd_shift = Modifiers {
        shift: true,
        ..Modifiers::CMD
    };
    assert!(ed.key_down("g", Modifiers::CMD));
    let [group] = ed.store().selection() else {
        panic!("group should be selected");
    };
    let group = *group;
    assert_eq!(ed.store().get(group).unwrap().kind, ElementKind::Group);
    assert_eq!(ed.store().children(group), vec![a, b]);

    assert!(ed.key_down("G", cmd_shift));
    assert!(ed.store().get(group).is_none());
    assert_eq!(ed.store().selection().len(), 2);
}

#[test]
fn mask_shortcut_clips_bottom_element() {
    init();
    let mut ed = editor();
    let plate = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 200.0, 200.0));
    let text = rect(&mut ed, ElementKind::Text, Bounds::new(20.0, 20.0, 300.0, 40.0));
    ed.apply(Mutation::Select { ids: vec![text, plate] });

    let cmd_shift = Modifiers {
        shift: true,
        ..Modifiers::CMD
    };
    assert!(ed.key_down("m", cmd_shift));
    assert!(ed.store().get(plate).unwrap().clip);
    assert_eq!(ed.store().get(text).unwrap().parent_id, Some(plate));
    assert_eq!(ed.store().selection(), &[plate]);

    let cmd_alt = Modifiers {
        alt: true,
        ..Modifiers::CMD
    };
    assert!(ed.key_down("m", cmd_alt));
    assert!(!ed.store().get(plate).unwrap().clip);
    assert_eq!(ed.store().get(text).unwrap().parent_id, None);
}

#[test]
fn delete_key_removes_descendants() {
    init();
    let mut ed = editor();
    let frame = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 200.0, 200.0));
    add(
        &mut ed,
        DesignElement::generated(ElementKind::Text, Bounds::new(10.0, 10.0, 50.0, 20.0)).with_parent(frame),
    );
    let keep = rect(&mut ed, ElementKind::Box, Bounds::new(400.0, 0.0, 20.0, 20.0));
    ed.apply(Mutation::Select { ids: vec![frame] });

    assert!(ed.key_down("Backspace", Modifiers::NONE));
    assert_eq!(ed.store().len(), 1);
    assert!(ed.store().contains(keep));
    assert!(ed.store().selection().is_empty());
}

#[test]
fn reorder_shortcut_moves_first_selected() {
    init();
    let mut ed = editor();
    let a = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 20.0, 20.0));
    let b = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 20.0, 20.0));
    let c = rect(&mut ed, ElementKind::Box, Bounds::new(0.0, 0.0, 20.0, 20.0));
    ed.apply(Mutation::Select { ids: vec![a] });

    let cmd_shift = Modifiers {
        shift: true,
        ..Modifiers::CMD
    };
    assert!(ed.key_down("]", cmd_shift));
    let order: Vec<ElementId> = ed.store().elements().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![b, c, a]);

    assert!(ed.key_down("[", Modifiers::CMD));
    let order: Vec<ElementId> = ed.store().elements().iter().map(|e| e.id).collect();
    assert_eq!(order, vec![b, a, c]);
}

#[test]
fn gradient_tool_drags_handles_without_moving_the_element() {
    init();
    let mut ed = editor();
    let id = add(
        &mut ed,
        DesignElement::generated(ElementKind::Box, Bounds::new(100.0, 100.0, 200.0, 100.0)).with_style(Style {
            gradient: Some(Gradient::default_linear()),
            ..Default::default()
        }),
    );
    ed.apply(Mutation::Select { ids: vec![id] });
    ed.set_tool(ToolKind::Gradient);

    let handles = ed.gradient_handles();
    assert_eq!(handles.len(), 2);
    let end = handles[1].position;

    drag(&mut ed, (end.x, end.y), (200.0, 260.0), Modifiers::NONE);
    let el = ed.store().get(id).unwrap();
    let angle = el.style.gradient.as_ref().unwrap().angle();
    assert!(close(angle, 90.0));
    assert_eq!(el.bounds(), Bounds::new(100.0, 100.0, 200.0, 100.0));
}

#[test]
fn document_survives_the_editor() {
    init();
    let doc = kz_core::Document::from_json(include_str!("../../kz-core/tests/fixtures/project.json")).unwrap();
    let count = doc.elements.len();
    let components = doc.components.len();
    let ed = Editor::from_document(doc).unwrap();
    assert_eq!(ed.store().len(), count);

    let out = ed.document();
    assert_eq!(out.elements.len(), count);
    assert_eq!(out.components.len(), components);
    assert_eq!(out.grid_config, *ed.grid());
}
