//! Diagram data model.
//!
//! The diagram is a directed multigraph: nodes are placed boxes (plain or
//! group), edges are source → target connections drawn as one or more
//! segments split by via-points. Self-loops and parallel edges are allowed.
//!
//! Positions are stored **absolute**. A grouped node additionally records its
//! `parent`; its owner-space (parent-relative) position is derived on read, so
//! grouping and ungrouping never rewrite the stored coordinates.

use crate::geometry::{PathKind, PathOptions, Point, Side, Size};
use crate::id::{EdgeId, NodeId};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

// ─── Config ───────────────────────────────────────────────────────────────

/// Editor-wide constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorConfig {
    /// Margin added on every side of a new group's bounding box.
    pub group_padding: f64,
    /// Height assumed for every member when sizing a new group, regardless of
    /// its declared size.
    pub group_child_height: f64,
    /// Path tuning for edge segments.
    pub path: PathOptions,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            group_padding: 30.0,
            group_child_height: 50.0,
            path: PathOptions::default(),
        }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Normal,
    Group,
}

/// Movement bound of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extent {
    /// Dragging keeps the node inside its parent group's box.
    Parent,
}

/// A placed node. `position` is absolute graph space.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: Point,
    pub size: Size,
    pub label: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub extent: Option<Extent>,
    /// Side used when this node is an edge's source.
    pub source_side: Side,
    /// Side used when this node is an edge's target.
    pub target_side: Side,
}

impl Node {
    pub fn new(id: NodeId, position: Point, label: impl Into<String>) -> Self {
        Self {
            id,
            position,
            size: Size::default(),
            label: label.into(),
            kind: NodeKind::Normal,
            parent: None,
            extent: None,
            source_side: Side::Bottom,
            target_side: Side::Top,
        }
    }

    pub fn group(id: NodeId, position: Point, size: Size) -> Self {
        Self {
            size,
            kind: NodeKind::Group,
            ..Self::new(id, position, "Group")
        }
    }

    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }
}

/// Boundary view of a node: `position` is owner-space (relative to the parent
/// when `parent_id` is set). Used for loading external data and for render
/// snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: NodeId,
    pub position: Point,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,
    #[serde(default = "default_source_side")]
    pub source_side: Side,
    #[serde(default = "default_target_side")]
    pub target_side: Side,
}

fn default_source_side() -> Side {
    Side::Bottom
}

fn default_target_side() -> Side {
    Side::Top
}

impl NodeRecord {
    pub fn new(id: &str, x: f64, y: f64, label: impl Into<String>) -> Self {
        Self {
            id: NodeId::intern(id),
            position: Point::new(x, y),
            size: Size::default(),
            label: label.into(),
            kind: NodeKind::Normal,
            parent_id: None,
            extent: None,
            source_side: default_source_side(),
            target_side: default_target_side(),
        }
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// An intermediate point splitting an edge into segments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViaPoint {
    pub x: f64,
    pub y: f64,
    /// Set while the point is being dragged.
    #[serde(default)]
    pub active: bool,
}

impl ViaPoint {
    pub fn at(point: Point) -> Self {
        Self {
            x: point.x,
            y: point.y,
            active: false,
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source_id: NodeId,
    pub target_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub path_kind: PathKind,
    #[serde(default)]
    pub via_points: SmallVec<[ViaPoint; 4]>,
}

impl Edge {
    pub fn new(id: EdgeId, source_id: NodeId, target_id: NodeId) -> Self {
        Self {
            id,
            source_id,
            target_id,
            label: None,
            path_kind: PathKind::default(),
            via_points: SmallVec::new(),
        }
    }

    /// Always `via_points.len() + 1`.
    pub fn segment_count(&self) -> usize {
        self.via_points.len() + 1
    }

    /// Index of the via-point currently being dragged.
    pub fn active_via_point(&self) -> Option<usize> {
        self.via_points.iter().position(|v| v.active)
    }
}

// ─── Graph ───────────────────────────────────────────────────────────────

/// Owner of all nodes and edges.
///
/// Read access is open. The mutating methods are the editor's internal
/// surface: hosts should go through the command engine, which keeps the
/// structural invariants checked by [`GraphModel::validate`].
#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    graph: StableDiGraph<Node, Edge>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
    /// Collection order of nodes (groups are prepended).
    node_order: Vec<NodeId>,
    edge_order: Vec<EdgeId>,
}

impl GraphModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from external records.
    ///
    /// Record positions are owner-space. Repairs applied with a warning:
    /// edges with a missing endpoint are dropped, parent references to a
    /// missing, non-group, or nested group node are cleared (the position is
    /// then taken as absolute), and drag state on via-points is reset.
    ///
    /// # Errors
    /// Returns an error if a node id or an edge id appears twice.
    pub fn from_records(nodes: Vec<NodeRecord>, edges: Vec<Edge>) -> Result<Self, String> {
        let mut by_id: HashMap<NodeId, &NodeRecord> = HashMap::with_capacity(nodes.len());
        for rec in &nodes {
            if by_id.insert(rec.id, rec).is_some() {
                return Err(format!("duplicate node id '{}'", rec.id));
            }
        }

        let mut model = Self::new();
        for rec in &nodes {
            let parent = rec.parent_id.and_then(|pid| {
                let valid = rec.kind == NodeKind::Normal
                    && by_id
                        .get(&pid)
                        .is_some_and(|p| p.kind == NodeKind::Group && p.parent_id.is_none());
                if !valid {
                    log::warn!("node '{}': dropping invalid parent '{}'", rec.id, pid);
                }
                valid.then(|| by_id[&pid])
            });

            let position = match parent {
                Some(p) => rec.position + p.position,
                None => rec.position,
            };
            model.push_node(Node {
                id: rec.id,
                position,
                size: rec.size,
                label: rec.label.clone(),
                kind: rec.kind,
                parent: parent.map(|p| p.id),
                extent: parent.and(rec.extent),
                source_side: rec.source_side,
                target_side: rec.target_side,
            });
        }

        let mut seen_edges = HashSet::with_capacity(edges.len());
        for mut edge in edges {
            if !seen_edges.insert(edge.id) {
                return Err(format!("duplicate edge id '{}'", edge.id));
            }
            if !model.contains_node(edge.source_id) || !model.contains_node(edge.target_id) {
                log::warn!(
                    "edge '{}': dropping, endpoint '{}' -> '{}' is dangling",
                    edge.id,
                    edge.source_id,
                    edge.target_id
                );
                continue;
            }
            for v in &mut edge.via_points {
                v.active = false;
            }
            model.insert_edge(edge);
        }

        debug_assert!(model.validate().is_ok(), "{:?}", model.validate());
        Ok(model)
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge_index.contains_key(&id)
    }

    /// Nodes in collection order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_order.iter().filter_map(|id| self.node(*id))
    }

    /// Edges in collection order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_order.iter().filter_map(|id| self.edge(*id))
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edge_order
    }

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    /// Members of a group, in collection order.
    pub fn children_of(&self, group: NodeId) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| n.parent == Some(group))
            .map(|n| n.id)
            .collect()
    }

    /// Owner-space position: absolute for top-level nodes, relative to the
    /// parent's origin for grouped nodes.
    pub fn owner_position(&self, id: NodeId) -> Option<Point> {
        let node = self.node(id)?;
        match node.parent.and_then(|p| self.node(p)) {
            Some(parent) => Some(node.position - parent.position),
            None => Some(node.position),
        }
    }

    /// Boundary view of one node.
    pub fn record(&self, id: NodeId) -> Option<NodeRecord> {
        let node = self.node(id)?;
        Some(NodeRecord {
            id: node.id,
            position: self.owner_position(id)?,
            size: node.size,
            label: node.label.clone(),
            kind: node.kind,
            parent_id: node.parent,
            extent: node.extent,
            source_side: node.source_side,
            target_side: node.target_side,
        })
    }

    /// Boundary view of every node, in collection order.
    pub fn records(&self) -> Vec<NodeRecord> {
        self.node_order
            .iter()
            .filter_map(|id| self.record(*id))
            .collect()
    }

    /// Ids of every edge starting or ending at `id` (self-loops once).
    pub fn incident_edges(&self, id: NodeId) -> Vec<EdgeId> {
        let Some(&idx) = self.node_index.get(&id) else {
            return Vec::new();
        };
        let mut out: Vec<EdgeId> = self
            .graph
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, petgraph::Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        out.sort_by_key(|e| self.edge_order.iter().position(|o| o == e));
        out.dedup();
        out
    }

    /// Check the structural invariants.
    ///
    /// # Errors
    /// Describes the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        if self.node_order.len() != self.node_index.len()
            || self.edge_order.len() != self.edge_index.len()
        {
            return Err("order and index are out of sync".into());
        }
        for node in self.nodes() {
            if self.node_index.get(&node.id).map(|i| self.graph[*i].id) != Some(node.id) {
                return Err(format!("node '{}' is indexed under another id", node.id));
            }
            if let Some(pid) = node.parent {
                let Some(parent) = self.node(pid) else {
                    return Err(format!("node '{}' has dangling parent '{}'", node.id, pid));
                };
                if !parent.is_group() {
                    return Err(format!("node '{}' has non-group parent '{}'", node.id, pid));
                }
                if parent.parent.is_some() || node.is_group() {
                    return Err(format!("group '{}' is nested", pid));
                }
            }
        }
        for edge in self.edges() {
            let idx = self.edge_index[&edge.id];
            let Some((s, t)) = self.graph.edge_endpoints(idx) else {
                return Err(format!("edge '{}' is not in the graph", edge.id));
            };
            if self.graph[s].id != edge.source_id || self.graph[t].id != edge.target_id {
                return Err(format!("edge '{}' endpoints are out of sync", edge.id));
            }
            if edge.via_points.iter().filter(|v| v.active).count() > 1 {
                return Err(format!("edge '{}' has more than one active via-point", edge.id));
            }
        }
        Ok(())
    }

    // ─── Mutation surface ────────────────────────────────────────────────

    /// Append a node. Returns `false` if the id is taken.
    pub fn insert_node(&mut self, node: Node) -> bool {
        if self.contains_node(node.id) {
            return false;
        }
        self.push_node(node);
        true
    }

    /// Insert a node at the front of the collection order. Returns `false`
    /// if the id is taken.
    pub fn prepend_node(&mut self, node: Node) -> bool {
        if self.contains_node(node.id) {
            return false;
        }
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        self.node_order.insert(0, id);
        true
    }

    fn push_node(&mut self, node: Node) {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        self.node_order.push(id);
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        for edge in self.incident_edges(id) {
            self.remove_edge(edge);
        }
        let idx = self.node_index.remove(&id)?;
        self.node_order.retain(|n| *n != id);
        self.graph.remove_node(idx)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.node_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    /// Append an edge. Returns `false` if the id is taken or an endpoint is
    /// missing.
    pub fn insert_edge(&mut self, edge: Edge) -> bool {
        if self.contains_edge(edge.id) {
            return false;
        }
        let (Some(&s), Some(&t)) = (
            self.node_index.get(&edge.source_id),
            self.node_index.get(&edge.target_id),
        ) else {
            return false;
        };
        let id = edge.id;
        let idx = self.graph.add_edge(s, t, edge);
        self.edge_index.insert(id, idx);
        self.edge_order.push(id);
        true
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let idx = self.edge_index.remove(&id)?;
        self.edge_order.retain(|e| *e != id);
        self.graph.remove_edge(idx)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edge_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    // ─── Id minting ──────────────────────────────────────────────────────

    /// Smallest integer id above the node count that is not in use.
    pub fn fresh_node_id(&self) -> NodeId {
        self.fresh_id(self.node_count() + 1, |n| n.to_string())
    }

    pub fn fresh_group_id(&self) -> NodeId {
        self.fresh_id(1, |n| format!("group_{n}"))
    }

    /// `e<source>-<target>`, suffixed when a parallel edge already took it.
    pub fn fresh_edge_id(&self, source: NodeId, target: NodeId) -> EdgeId {
        let base = format!("e{source}-{target}");
        if !self.contains_edge(EdgeId::intern(&base)) {
            return EdgeId::intern(&base);
        }
        let mut n = 2;
        loop {
            let id = EdgeId::intern(&format!("{base}-{n}"));
            if !self.contains_edge(id) {
                return id;
            }
            n += 1;
        }
    }

    fn fresh_id(&self, start: usize, make: impl Fn(usize) -> String) -> NodeId {
        let mut n = start;
        loop {
            let id = NodeId::intern(&make(n));
            if !self.contains_node(id) {
                return id;
            }
            n += 1;
        }
    }
}
