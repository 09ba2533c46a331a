//! Edge segment geometry.
//!
//! Pure functions that turn two endpoints (plus the side of the node each
//! endpoint leaves or enters) into SVG path data and a label anchor. An edge
//! with `k` via-points is drawn as `k + 1` independent segments; every segment
//! is computed with the edge's path kind and the edge's source/target sides.
//!
//! Nothing here validates its input: NaN coordinates produce NaN path data.

use kurbo::{BezPath, CubicBez, ParamCurve};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::{Add, Sub};

// ─── Primitives ──────────────────────────────────────────────────────────

/// A point in graph space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<Point> for kurbo::Point {
    fn from(p: Point) -> Self {
        kurbo::Point::new(p.x, p.y)
    }
}

impl From<kurbo::Point> for Point {
    fn from(p: kurbo::Point) -> Self {
        Point::new(p.x, p.y)
    }
}

/// Width and height of a node box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Nodes without a declared size are 180×50.
impl Default for Size {
    fn default() -> Self {
        Self::new(180.0, 50.0)
    }
}

/// The side of a node box an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// Unit vector pointing away from the node through this side.
    pub fn direction(self) -> (f64, f64) {
        match self {
            Side::Top => (0.0, -1.0),
            Side::Right => (1.0, 0.0),
            Side::Bottom => (0.0, 1.0),
            Side::Left => (-1.0, 0.0),
        }
    }

    fn is_horizontal(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }
}

/// Geometric family used to draw every segment of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathKind {
    Straight,
    SmoothStep,
    #[default]
    Bezier,
}

impl PathKind {
    /// Parse a host-supplied tag. Unknown tags fall back to `Bezier`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "straight" => PathKind::Straight,
            "smoothstep" => PathKind::SmoothStep,
            _ => PathKind::Bezier,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            PathKind::Straight => "straight",
            PathKind::SmoothStep => "smoothstep",
            PathKind::Bezier => "bezier",
        }
    }
}

impl Serialize for PathKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_tag())
    }
}

impl<'de> Deserialize<'de> for PathKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(PathKind::from_tag(&tag))
    }
}

/// One drawn sub-path of an edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// SVG path data.
    pub path: String,
    /// Where a label placed on this segment is centred.
    #[serde(rename = "anchorPoint")]
    pub anchor: Point,
}

// ─── Config ───────────────────────────────────────────────────────────────

/// Tuning for the curved path kinds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathOptions {
    /// Bezier control-point pull when the target lies behind the source side.
    pub curvature: f64,
    /// Distance a step path travels straight out of each endpoint.
    pub step_offset: f64,
    /// Corner radius of step paths.
    pub step_border_radius: f64,
}

impl Default for PathOptions {
    fn default() -> Self {
        Self {
            curvature: 0.25,
            step_offset: 20.0,
            step_border_radius: 5.0,
        }
    }
}

// ─── Segment computation ──────────────────────────────────────────────────

/// Compute the path and label anchor of one segment.
pub fn compute_segment(
    kind: PathKind,
    source: Point,
    source_side: Side,
    target: Point,
    target_side: Side,
    options: &PathOptions,
) -> Segment {
    match kind {
        PathKind::Straight => straight_segment(source, target),
        PathKind::SmoothStep => {
            smooth_step_segment(source, source_side, target, target_side, options)
        }
        PathKind::Bezier => bezier_segment(source, source_side, target, target_side, options),
    }
}

fn straight_segment(source: Point, target: Point) -> Segment {
    let mut path = BezPath::new();
    path.move_to(source);
    path.line_to(target);
    Segment {
        path: path.to_svg(),
        anchor: source.midpoint(target),
    }
}

fn bezier_segment(
    source: Point,
    source_side: Side,
    target: Point,
    target_side: Side,
    options: &PathOptions,
) -> Segment {
    let c1 = control_point(source_side, source, target, options.curvature);
    let c2 = control_point(target_side, target, source, options.curvature);

    let mut path = BezPath::new();
    path.move_to(source);
    path.curve_to(c1, c2, target);

    let curve = CubicBez::new(source, c1, c2, target);
    Segment {
        path: path.to_svg(),
        anchor: curve.eval(0.5).into(),
    }
}

/// Control point for the endpoint `from`, pulled out along `side`.
fn control_point(side: Side, from: Point, to: Point, curvature: f64) -> Point {
    match side {
        Side::Left => Point::new(from.x - control_offset(from.x - to.x, curvature), from.y),
        Side::Right => Point::new(from.x + control_offset(to.x - from.x, curvature), from.y),
        Side::Top => Point::new(from.x, from.y - control_offset(from.y - to.y, curvature)),
        Side::Bottom => Point::new(from.x, from.y + control_offset(to.y - from.y, curvature)),
    }
}

fn control_offset(distance: f64, curvature: f64) -> f64 {
    if distance >= 0.0 {
        0.5 * distance
    } else {
        curvature * 25.0 * (-distance).sqrt()
    }
}

fn smooth_step_segment(
    source: Point,
    source_side: Side,
    target: Point,
    target_side: Side,
    options: &PathOptions,
) -> Segment {
    let (points, anchor) = step_points(source, source_side, target, target_side, options);

    let mut path = BezPath::new();
    path.move_to(points[0]);
    for w in points.windows(3) {
        push_bend(&mut path, w[0], w[1], w[2], options.step_border_radius);
    }
    path.line_to(points[points.len() - 1]);

    Segment {
        path: path.to_svg(),
        anchor,
    }
}

/// Corner points of an orthogonal path from `source` to `target`, plus the
/// point the label sits on.
fn step_points(
    source: Point,
    source_side: Side,
    target: Point,
    target_side: Side,
    options: &PathOptions,
) -> (Vec<Point>, Point) {
    let (sdx, sdy) = source_side.direction();
    let (tdx, tdy) = target_side.direction();
    let source_gapped = Point::new(
        source.x + sdx * options.step_offset,
        source.y + sdy * options.step_offset,
    );
    let target_gapped = Point::new(
        target.x + tdx * options.step_offset,
        target.y + tdy * options.step_offset,
    );

    // Travel axis is decided by the source side.
    let horizontal = source_side.is_horizontal();
    let travel = if horizontal {
        if source_gapped.x < target_gapped.x { 1.0 } else { -1.0 }
    } else if source_gapped.y < target_gapped.y {
        1.0
    } else {
        -1.0
    };
    let (source_axis, target_axis) = if horizontal { (sdx, tdx) } else { (sdy, tdy) };

    let (corners, anchor) = if source_axis * target_axis == -1.0 {
        let center = source.midpoint(target);
        let vertical_split = [
            Point::new(center.x, source_gapped.y),
            Point::new(center.x, target_gapped.y),
        ];
        let horizontal_split = [
            Point::new(source_gapped.x, center.y),
            Point::new(target_gapped.x, center.y),
        ];
        let corners = if (source_axis == travel) == horizontal {
            vertical_split
        } else {
            horizontal_split
        };
        (corners.to_vec(), center)
    } else {
        let source_target = Point::new(source_gapped.x, target_gapped.y);
        let target_source = Point::new(target_gapped.x, source_gapped.y);
        let corner = if horizontal {
            if sdx == travel { target_source } else { source_target }
        } else if sdy == travel {
            source_target
        } else {
            target_source
        };
        (vec![corner], corner)
    };

    let mut points = Vec::with_capacity(corners.len() + 4);
    points.push(source);
    points.push(source_gapped);
    points.extend(corners);
    points.push(target_gapped);
    points.push(target);
    (points, anchor)
}

/// Append the leg ending at `b`, rounding the corner `a → b → c`.
fn push_bend(path: &mut BezPath, a: Point, b: Point, c: Point, radius: f64) {
    let bend = (a.distance(b) / 2.0).min(b.distance(c) / 2.0).min(radius);

    if (a.x == b.x && b.x == c.x) || (a.y == b.y && b.y == c.y) {
        path.line_to(b);
        return;
    }

    if a.y == b.y {
        let x_dir = if a.x < c.x { -1.0 } else { 1.0 };
        let y_dir = if a.y < c.y { 1.0 } else { -1.0 };
        path.line_to(Point::new(b.x + bend * x_dir, b.y));
        path.quad_to(b, Point::new(b.x, b.y + bend * y_dir));
    } else {
        let x_dir = if a.x < c.x { 1.0 } else { -1.0 };
        let y_dir = if a.y < c.y { -1.0 } else { 1.0 };
        path.line_to(Point::new(b.x, b.y + bend * y_dir));
        path.quad_to(b, Point::new(b.x + bend * x_dir, b.y));
    }
}

// ─── Edges as segment chains ─────────────────────────────────────────────

/// Where an edge attaches to a node: the centre of the given side.
pub fn connection_point(top_left: Point, size: Size, side: Side) -> Point {
    match side {
        Side::Top => Point::new(top_left.x + size.width / 2.0, top_left.y),
        Side::Right => Point::new(top_left.x + size.width, top_left.y + size.height / 2.0),
        Side::Bottom => Point::new(top_left.x + size.width / 2.0, top_left.y + size.height),
        Side::Left => Point::new(top_left.x, top_left.y + size.height / 2.0),
    }
}

/// Endpoints of every segment, in source → target order.
///
/// With `k` via-points this yields `k + 1` pairs.
pub fn segment_endpoints(
    source: Point,
    target: Point,
    via_points: impl IntoIterator<Item = Point>,
) -> Vec<(Point, Point)> {
    let mut chain = vec![source];
    chain.extend(via_points);
    chain.push(target);
    chain.windows(2).map(|w| (w[0], w[1])).collect()
}

/// Compute every segment of an edge.
pub fn edge_segments(
    kind: PathKind,
    source: Point,
    source_side: Side,
    target: Point,
    target_side: Side,
    via_points: impl IntoIterator<Item = Point>,
    options: &PathOptions,
) -> Vec<Segment> {
    segment_endpoints(source, target, via_points)
        .into_iter()
        .map(|(s, t)| compute_segment(kind, s, source_side, t, target_side, options))
        .collect()
}

/// Index of the segment that carries the edge label.
///
/// 1 segment → 0, 2 → 1, 3 → 1, 4 → 2.
pub fn label_segment_index(segment_count: usize) -> usize {
    segment_count / 2
}

/// Label anchor of a computed segment chain.
pub fn label_anchor(segments: &[Segment]) -> Option<Point> {
    segments
        .get(label_segment_index(segments.len()))
        .map(|s| s.anchor)
}

/// Index of the segment whose chord passes nearest to `point`.
/// Ties resolve to the earlier segment. Returns 0 for an empty chain.
pub fn segment_index_at(endpoints: &[(Point, Point)], point: Point) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &(a, b)) in endpoints.iter().enumerate() {
        let d = distance_to_chord(point, a, b);
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

fn distance_to_chord(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let ap = p - a;
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + ab.x * t, a.y + ab.y * t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> PathOptions {
        PathOptions::default()
    }

    #[test]
    fn straight_anchor_is_midpoint() {
        let seg = compute_segment(
            PathKind::Straight,
            Point::new(0.0, 0.0),
            Side::Bottom,
            Point::new(100.0, 40.0),
            Side::Top,
            &opts(),
        );
        assert_eq!(seg.anchor, Point::new(50.0, 20.0));
        assert!(seg.path.starts_with('M'));
        assert!(seg.path.contains('L'));
    }

    #[test]
    fn bezier_anchor_is_parametric_midpoint() {
        // Vertical drop: control points at (0,100) and (0,100); the curve
        // stays on x = 0 and passes through the middle at t = 0.5.
        let seg = compute_segment(
            PathKind::Bezier,
            Point::new(0.0, 0.0),
            Side::Bottom,
            Point::new(0.0, 200.0),
            Side::Top,
            &opts(),
        );
        assert!((seg.anchor.x).abs() < 1e-9);
        assert!((seg.anchor.y - 100.0).abs() < 1e-9);
        assert!(seg.path.contains('C'));
    }

    #[test]
    fn bezier_backward_target_uses_curvature_pull() {
        // Target above a bottom-side source: offset = 0.25 * 25 * sqrt(100).
        let c = control_point(Side::Bottom, Point::new(0.0, 100.0), Point::new(0.0, 0.0), 0.25);
        assert_eq!(c, Point::new(0.0, 162.5));
    }

    #[test]
    fn smooth_step_opposed_sides_split_at_center() {
        let seg = compute_segment(
            PathKind::SmoothStep,
            Point::new(0.0, 0.0),
            Side::Bottom,
            Point::new(100.0, 200.0),
            Side::Top,
            &opts(),
        );
        assert_eq!(seg.anchor, Point::new(50.0, 100.0));
        assert!(seg.path.contains('Q'), "corners should be rounded: {}", seg.path);
    }

    #[test]
    fn smooth_step_perpendicular_sides_meet_at_corner() {
        let (points, anchor) = step_points(
            Point::new(0.0, 0.0),
            Side::Right,
            Point::new(100.0, 100.0),
            Side::Top,
            &opts(),
        );
        assert_eq!(anchor, Point::new(100.0, 0.0));
        assert_eq!(points.len(), 5);
    }

    #[test]
    fn smooth_step_aligned_is_straight_line() {
        let seg = compute_segment(
            PathKind::SmoothStep,
            Point::new(0.0, 0.0),
            Side::Bottom,
            Point::new(0.0, 200.0),
            Side::Top,
            &opts(),
        );
        assert!(!seg.path.contains('Q'));
        assert_eq!(seg.anchor, Point::new(0.0, 100.0));
    }

    #[test]
    fn nan_input_propagates() {
        let seg = compute_segment(
            PathKind::Straight,
            Point::new(f64::NAN, 0.0),
            Side::Bottom,
            Point::new(10.0, 10.0),
            Side::Top,
            &opts(),
        );
        assert!(seg.anchor.x.is_nan());
    }

    #[test]
    fn unknown_tag_falls_back_to_bezier() {
        assert_eq!(PathKind::from_tag("smoothstep"), PathKind::SmoothStep);
        assert_eq!(PathKind::from_tag("straight"), PathKind::Straight);
        assert_eq!(PathKind::from_tag("step"), PathKind::Bezier);
        assert_eq!(PathKind::from_tag(""), PathKind::Bezier);
    }

    #[test]
    fn label_index_rounds_toward_later_segment() {
        assert_eq!(label_segment_index(1), 0);
        assert_eq!(label_segment_index(2), 1);
        assert_eq!(label_segment_index(3), 1);
        assert_eq!(label_segment_index(4), 2);
    }

    #[test]
    fn segments_chain_through_via_points() {
        let via = [Point::new(10.0, 10.0), Point::new(20.0, 20.0)];
        let ends = segment_endpoints(Point::new(0.0, 0.0), Point::new(30.0, 30.0), via);
        assert_eq!(ends.len(), 3);
        assert_eq!(ends[0], (Point::new(0.0, 0.0), Point::new(10.0, 10.0)));
        assert_eq!(ends[1], (Point::new(10.0, 10.0), Point::new(20.0, 20.0)));
        assert_eq!(ends[2], (Point::new(20.0, 20.0), Point::new(30.0, 30.0)));
    }

    #[test]
    fn label_anchor_uses_middle_segment() {
        let segs = edge_segments(
            PathKind::Straight,
            Point::new(0.0, 0.0),
            Side::Bottom,
            Point::new(0.0, 300.0),
            Side::Top,
            [Point::new(0.0, 100.0), Point::new(0.0, 200.0)],
            &opts(),
        );
        assert_eq!(segs.len(), 3);
        assert_eq!(label_anchor(&segs), Some(Point::new(0.0, 150.0)));
    }

    #[test]
    fn nearest_segment_by_chord() {
        let ends = segment_endpoints(
            Point::new(0.0, 0.0),
            Point::new(200.0, 0.0),
            [Point::new(100.0, 0.0)],
        );
        assert_eq!(segment_index_at(&ends, Point::new(30.0, 5.0)), 0);
        assert_eq!(segment_index_at(&ends, Point::new(170.0, -5.0)), 1);
        assert_eq!(segment_index_at(&[], Point::new(0.0, 0.0)), 0);
    }

    #[test]
    fn connection_points_sit_on_side_centres() {
        let p = Point::new(100.0, 300.0);
        let s = Size::default();
        assert_eq!(connection_point(p, s, Side::Top), Point::new(190.0, 300.0));
        assert_eq!(connection_point(p, s, Side::Bottom), Point::new(190.0, 350.0));
        assert_eq!(connection_point(p, s, Side::Left), Point::new(100.0, 325.0));
        assert_eq!(connection_point(p, s, Side::Right), Point::new(280.0, 325.0));
    }
}
