//! Integration tests: multi-segment edges and via-point dragging (fg-editor).

use fg_core::geometry::{PathKind, Point};
use fg_core::id::EdgeId;
use fg_editor::{EditorSession, HostEvent, Outcome};
use pretty_assertions::assert_eq;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn e12() -> EdgeId {
    EdgeId::intern("e1-2")
}

fn via(s: &EditorSession, edge: EdgeId) -> Vec<Point> {
    s.graph()
        .edge(edge)
        .map(|e| e.via_points.iter().map(|v| v.point()).collect())
        .unwrap_or_default()
}

fn active_count(s: &EditorSession, edge: EdgeId) -> usize {
    s.graph()
        .edge(edge)
        .map_or(0, |e| e.via_points.iter().filter(|v| v.active).count())
}

// ─── Segment enumeration ────────────────────────────────────────────────

#[test]
fn segment_count_tracks_via_points() {
    init();
    let mut s = EditorSession::default();
    for k in 0..5 {
        let snap = s.snapshot();
        let view = snap.edge(e12()).unwrap();
        assert_eq!(view.segments.len(), k + 1);
        assert_eq!(view.edge.segment_count(), k + 1);
        assert_eq!(view.label_anchor, Some(view.segments[(k + 1) / 2].anchor));

        s.insert_via_point(e12(), k, Point::new(400.0, 60.0 + 10.0 * k as f64));
    }
}

#[test]
fn straight_label_sits_on_middle_segment() {
    init();
    let mut s = EditorSession::default();
    s.set_edge_path_kind(e12(), PathKind::Straight);
    s.insert_via_point(e12(), 0, Point::new(400.0, 70.0));
    s.insert_via_point(e12(), 1, Point::new(400.0, 100.0));

    let snap = s.snapshot();
    let view = snap.edge(e12()).unwrap();
    assert_eq!(view.segments.len(), 3);
    assert_eq!(view.label_anchor, Some(Point::new(400.0, 85.0)));
    assert_eq!(view.segments[0].anchor, Point::new(370.0, 60.0));
}

// ─── Insertion ──────────────────────────────────────────────────────────

#[test]
fn double_click_splits_nearest_segment() {
    init();
    let mut s = EditorSession::default();
    // e1-2 runs from (340, 50) to (340, 120).
    let out = s.handle(HostEvent::EdgeDoubleClick {
        edge: e12(),
        point: Point::new(400.0, 85.0),
    });
    assert_eq!(out, Outcome::Changed);
    assert_eq!(via(&s, e12()), vec![Point::new(400.0, 85.0)]);

    // Nearer the second chord, so it lands after the first via-point.
    s.handle(HostEvent::EdgeDoubleClick {
        edge: e12(),
        point: Point::new(400.0, 110.0),
    });
    assert_eq!(
        via(&s, e12()),
        vec![Point::new(400.0, 85.0), Point::new(400.0, 110.0)]
    );

    // Nearer the first chord, so it goes in front.
    s.handle(HostEvent::EdgeDoubleClick {
        edge: e12(),
        point: Point::new(345.0, 52.0),
    });
    assert_eq!(via(&s, e12())[0], Point::new(345.0, 52.0));
    assert_eq!(via(&s, e12()).len(), 3);
}

#[test]
fn context_menu_and_reset_remove_points() {
    init();
    let mut s = EditorSession::default();
    for i in 0..3 {
        s.insert_via_point(e12(), i, Point::new(400.0, 60.0 + 20.0 * i as f64));
    }

    s.handle(HostEvent::ViaPointContextMenu { edge: e12(), index: 1 });
    assert_eq!(
        via(&s, e12()),
        vec![Point::new(400.0, 60.0), Point::new(400.0, 100.0)]
    );

    let out = s.handle(HostEvent::ViaPointContextMenu { edge: e12(), index: 7 });
    assert_eq!(out, Outcome::Unchanged);

    assert!(s.reset_edge_path(e12()));
    assert_eq!(via(&s, e12()), vec![]);
    assert!(!s.reset_edge_path(e12()));
}

// ─── Drag discipline ────────────────────────────────────────────────────

#[test]
fn only_one_point_active_at_a_time() {
    init();
    let mut s = EditorSession::default();
    for i in 0..3 {
        s.insert_via_point(e12(), i, Point::new(400.0, 60.0 + 20.0 * i as f64));
    }

    s.handle(HostEvent::ViaPointPointerDown { edge: e12(), index: 0 });
    s.handle(HostEvent::ViaPointPointerDown { edge: e12(), index: 2 });
    assert_eq!(active_count(&s, e12()), 1);
    assert_eq!(s.graph().edge(e12()).unwrap().active_via_point(), Some(2));

    s.handle(HostEvent::ViaPointPointerUp { edge: e12(), index: 2 });
    assert_eq!(active_count(&s, e12()), 0);
}

#[test]
fn move_requires_active_point() {
    init();
    let mut s = EditorSession::default();
    s.insert_via_point(e12(), 0, Point::new(400.0, 85.0));

    let idle = s.handle(HostEvent::ViaPointPointerMove {
        edge: e12(),
        index: 0,
        point: Point::new(500.0, 85.0),
    });
    assert_eq!(idle, Outcome::Unchanged);
    assert_eq!(via(&s, e12()), vec![Point::new(400.0, 85.0)]);

    s.handle(HostEvent::ViaPointPointerDown { edge: e12(), index: 0 });
    let dragged = s.handle(HostEvent::ViaPointPointerMove {
        edge: e12(),
        index: 0,
        point: Point::new(500.0, 90.0),
    });
    assert_eq!(dragged, Outcome::Changed);
    assert_eq!(via(&s, e12()), vec![Point::new(500.0, 90.0)]);

    s.handle(HostEvent::ViaPointPointerUp { edge: e12(), index: 0 });
    s.move_via_point(e12(), 0, Point::new(0.0, 0.0));
    assert_eq!(via(&s, e12()), vec![Point::new(500.0, 90.0)]);
}

#[test]
fn leaving_interactive_mode_ends_drag() {
    init();
    let mut s = EditorSession::default();
    s.insert_via_point(e12(), 0, Point::new(400.0, 85.0));
    s.handle(HostEvent::ViaPointPointerDown { edge: e12(), index: 0 });
    assert_eq!(active_count(&s, e12()), 1);

    s.set_interactive(false);
    assert_eq!(active_count(&s, e12()), 0);
    assert_eq!(via(&s, e12()), vec![Point::new(400.0, 85.0)]);
}

#[test]
fn edge_label_shows_in_snapshot() {
    init();
    let mut s = EditorSession::default();
    assert!(s.update_edge_label(e12(), Some("approved".into())));
    assert!(!s.update_edge_label(EdgeId::intern("ghost"), Some("x".into())));

    let snap = s.snapshot();
    assert_eq!(snap.edge(e12()).unwrap().edge.label.as_deref(), Some("approved"));
}

#[test]
fn nan_via_point_propagates_into_path_data() {
    init();
    let mut s = EditorSession::default();
    s.insert_via_point(e12(), 0, Point::new(f64::NAN, f64::NAN));

    // Every chord distance is NaN, so the click falls back to segment 0.
    let out = s.handle(HostEvent::EdgeDoubleClick {
        edge: e12(),
        point: Point::new(f64::NAN, 0.0),
    });
    assert_eq!(out, Outcome::Changed);
    assert_eq!(s.graph().edge(e12()).unwrap().via_points.len(), 2);

    let snap = s.snapshot();
    let view = snap.edge(e12()).unwrap();
    assert_eq!(view.segments.len(), 3);
    assert!(view.segments.iter().any(|seg| seg.path.contains("NaN")));
    assert!(s.graph().validate().is_ok());
}
