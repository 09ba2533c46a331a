//! Read snapshot handed to the renderer.
//!
//! Nodes carry owner-space positions. Edges carry their computed segment
//! chain and label anchor. Both carry a `highlighted` flag from the current
//! selection. The renderer draws; it never mutates.

use crate::selection::SelectionManager;
use fg_core::geometry::{self, PathOptions, Point, Segment};
use fg_core::id::{EdgeId, NodeId};
use fg_core::model::{Edge, GraphModel, NodeRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    #[serde(flatten)]
    pub node: NodeRecord,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    #[serde(flatten)]
    pub edge: Edge,
    pub segments: Vec<Segment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_anchor: Option<Point>,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RenderSnapshot {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl RenderSnapshot {
    pub fn capture(graph: &GraphModel, selection: &SelectionManager, options: &PathOptions) -> Self {
        let nodes = graph
            .records()
            .into_iter()
            .map(|node| NodeView {
                highlighted: selection.is_node_highlighted(node.id),
                node,
            })
            .collect();

        let edges = graph
            .edges()
            .filter_map(|edge| {
                let segments = edge_segments(graph, edge, options)?;
                Some(EdgeView {
                    label_anchor: geometry::label_anchor(&segments),
                    highlighted: selection.is_edge_highlighted(edge.id),
                    edge: edge.clone(),
                    segments,
                })
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeView> {
        self.nodes.iter().find(|v| v.node.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeView> {
        self.edges.iter().find(|v| v.edge.id == id)
    }

    /// Serialize for a web host.
    ///
    /// # Errors
    /// Returns the serializer's message if encoding fails.
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("snapshot encoding failed: {e}"))
    }
}

/// Chord endpoints of every segment of `edge`, in absolute coordinates.
/// `None` if an endpoint node is missing.
pub fn edge_endpoints(graph: &GraphModel, edge: &Edge) -> Option<Vec<(Point, Point)>> {
    let (source, target) = attachment_points(graph, edge)?;
    Some(geometry::segment_endpoints(
        source,
        target,
        edge.via_points.iter().map(|v| v.point()),
    ))
}

/// Computed segments of `edge`. `None` if an endpoint node is missing.
pub fn edge_segments(graph: &GraphModel, edge: &Edge, options: &PathOptions) -> Option<Vec<Segment>> {
    let source_side = graph.node(edge.source_id)?.source_side;
    let target_side = graph.node(edge.target_id)?.target_side;
    let (source, target) = attachment_points(graph, edge)?;
    Some(geometry::edge_segments(
        edge.path_kind,
        source,
        source_side,
        target,
        target_side,
        edge.via_points.iter().map(|v| v.point()),
        options,
    ))
}

fn attachment_points(graph: &GraphModel, edge: &Edge) -> Option<(Point, Point)> {
    let s = graph.node(edge.source_id)?;
    let t = graph.node(edge.target_id)?;
    Some((
        geometry::connection_point(s.position, s.size, s.source_side),
        geometry::connection_point(t.position, t.size, t.target_side),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fg_core::fixture;

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn fixture_snapshot_shape() {
        let g = fixture::workflow();
        let snap = RenderSnapshot::capture(&g, &SelectionManager::new(), &PathOptions::default());
        assert_eq!(snap.nodes.len(), 11);
        assert_eq!(snap.edges.len(), 10);
        assert!(snap.edges.iter().all(|e| e.segments.len() == 1));
        assert!(snap.nodes.iter().all(|n| !n.highlighted));
    }

    #[test]
    fn vertical_edge_anchor_is_between_nodes() {
        let g = fixture::workflow();
        let snap = RenderSnapshot::capture(&g, &SelectionManager::new(), &PathOptions::default());
        // Node 1 bottom centre (340, 50), node 2 top centre (340, 120).
        let view = snap.edge(EdgeId::intern("e1-2")).unwrap();
        assert!(close(view.label_anchor.unwrap(), Point::new(340.0, 85.0)));
        assert!(view.segments[0].path.starts_with("M340"));
    }

    #[test]
    fn highlight_follows_selection() {
        let g = fixture::workflow();
        let mut sel = SelectionManager::new();
        sel.click_node(&g, NodeId::intern("3"));
        let snap = RenderSnapshot::capture(&g, &sel, &PathOptions::default());
        let lit: Vec<&str> = snap
            .nodes
            .iter()
            .filter(|n| n.highlighted)
            .map(|n| n.node.id.as_str())
            .collect();
        assert_eq!(lit, vec!["3"]);
    }

    #[test]
    fn json_uses_camel_case() {
        let g = fixture::workflow();
        let mut sel = SelectionManager::new();
        sel.click_edge(&g, EdgeId::intern("e3-5"));
        let json = RenderSnapshot::capture(&g, &sel, &PathOptions::default())
            .to_json()
            .unwrap();
        assert!(json.contains(r#""sourceId":"3""#));
        assert!(json.contains(r#""labelAnchor""#));
        assert!(json.contains(r#""anchorPoint":{"x":"#));
        assert!(json.contains(r#""pathKind":"bezier""#));
        assert!(json.contains(r#""highlighted":true"#));
    }
}
