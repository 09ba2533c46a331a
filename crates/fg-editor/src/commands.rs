//! Command engine.
//!
//! Every change to a [`GraphModel`] is a `Command` applied through [`apply`].
//! Commands validate everything they need before touching the model, so a
//! command is either applied in full or not at all. Rejections are silent:
//! the caller observes [`Outcome::Unchanged`] and nothing else.

use fg_core::fixture;
use fg_core::geometry::{PathKind, Point, Size};
use fg_core::id::{EdgeId, NodeId};
use fg_core::model::{Edge, EditorConfig, Extent, GraphModel, Node, ViaPoint};

/// A mutation of the diagram.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a plain node of default size at an absolute position.
    AddNode { position: Point, label: String },
    /// Connect two nodes. Self-loops and parallel edges are allowed.
    Connect { source: NodeId, target: NodeId },
    UpdateNodeLabel { id: NodeId, label: String },
    UpdateEdgeLabel { id: EdgeId, label: Option<String> },
    /// Wrap two or more top-level plain nodes in a new group.
    Group { ids: Vec<NodeId> },
    /// Dissolve a group, keeping its members where they are.
    Ungroup { id: NodeId },
    /// Delete nodes (groups take their members with them) and every edge
    /// touching a deleted node.
    DeleteNodes { ids: Vec<NodeId> },
    DeleteEdge { id: EdgeId },
    /// Place a node. `position` is owner-space: parent-relative for grouped
    /// nodes.
    MoveNode { id: NodeId, position: Point },
    /// Split segment `segment` by a new via-point.
    InsertViaPoint {
        edge: EdgeId,
        segment: usize,
        point: Point,
    },
    SetViaPointActive {
        edge: EdgeId,
        index: usize,
        active: bool,
    },
    /// Drag a via-point. Only the active point moves.
    MoveViaPoint {
        edge: EdgeId,
        index: usize,
        point: Point,
    },
    RemoveViaPoint { edge: EdgeId, index: usize },
    /// Drop every via-point of an edge.
    ResetEdgePath { edge: EdgeId },
    SetEdgePathKind { edge: EdgeId, kind: PathKind },
    /// Replace the whole diagram with the initial workflow.
    ResetWorkflow,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddNode { .. } => "add node",
            Command::Connect { .. } => "connect",
            Command::UpdateNodeLabel { .. } => "update node label",
            Command::UpdateEdgeLabel { .. } => "update edge label",
            Command::Group { .. } => "group",
            Command::Ungroup { .. } => "ungroup",
            Command::DeleteNodes { .. } => "delete nodes",
            Command::DeleteEdge { .. } => "delete edge",
            Command::MoveNode { .. } => "move node",
            Command::InsertViaPoint { .. } => "insert via-point",
            Command::SetViaPointActive { .. } => "set via-point active",
            Command::MoveViaPoint { .. } => "move via-point",
            Command::RemoveViaPoint { .. } => "remove via-point",
            Command::ResetEdgePath { .. } => "reset edge path",
            Command::SetEdgePathKind { .. } => "set edge path kind",
            Command::ResetWorkflow => "reset workflow",
        }
    }
}

/// What a command did to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Rejected, or nothing to do. The model is untouched.
    Unchanged,
    Changed,
    NodeCreated(NodeId),
    EdgeCreated(EdgeId),
}

impl Outcome {
    pub fn is_changed(self) -> bool {
        self != Outcome::Unchanged
    }

    pub fn created_node(self) -> Option<NodeId> {
        match self {
            Outcome::NodeCreated(id) => Some(id),
            _ => None,
        }
    }

    pub fn created_edge(self) -> Option<EdgeId> {
        match self {
            Outcome::EdgeCreated(id) => Some(id),
            _ => None,
        }
    }

    fn from_changed(changed: bool) -> Self {
        if changed {
            Outcome::Changed
        } else {
            Outcome::Unchanged
        }
    }
}

/// Apply one command to the model.
pub fn apply(graph: &mut GraphModel, command: Command, config: &EditorConfig) -> Outcome {
    let name = command.name();
    let outcome = match command {
        Command::AddNode { position, label } => add_node(graph, position, label),
        Command::Connect { source, target } => connect(graph, source, target),
        Command::UpdateNodeLabel { id, label } => update_node_label(graph, id, label),
        Command::UpdateEdgeLabel { id, label } => update_edge_label(graph, id, label),
        Command::Group { ids } => group(graph, &ids, config),
        Command::Ungroup { id } => ungroup(graph, id),
        Command::DeleteNodes { ids } => delete_nodes(graph, &ids),
        Command::DeleteEdge { id } => Outcome::from_changed(graph.remove_edge(id).is_some()),
        Command::MoveNode { id, position } => move_node(graph, id, position),
        Command::InsertViaPoint {
            edge,
            segment,
            point,
        } => insert_via_point(graph, edge, segment, point),
        Command::SetViaPointActive {
            edge,
            index,
            active,
        } => set_via_point_active(graph, edge, index, active),
        Command::MoveViaPoint { edge, index, point } => move_via_point(graph, edge, index, point),
        Command::RemoveViaPoint { edge, index } => remove_via_point(graph, edge, index),
        Command::ResetEdgePath { edge } => reset_edge_path(graph, edge),
        Command::SetEdgePathKind { edge, kind } => set_edge_path_kind(graph, edge, kind),
        Command::ResetWorkflow => {
            *graph = fixture::workflow();
            Outcome::Changed
        }
    };

    match outcome {
        Outcome::Unchanged => log::trace!("{name}: no change"),
        _ => log::debug!("{name}: {outcome:?}"),
    }
    debug_assert!(graph.validate().is_ok(), "{name}: {:?}", graph.validate());
    outcome
}

// ─── Nodes & edges ───────────────────────────────────────────────────────

fn add_node(graph: &mut GraphModel, position: Point, label: String) -> Outcome {
    let id = graph.fresh_node_id();
    graph.insert_node(Node::new(id, position, label));
    Outcome::NodeCreated(id)
}

fn connect(graph: &mut GraphModel, source: NodeId, target: NodeId) -> Outcome {
    if !graph.contains_node(source) || !graph.contains_node(target) {
        return Outcome::Unchanged;
    }
    let id = graph.fresh_edge_id(source, target);
    if graph.insert_edge(Edge::new(id, source, target)) {
        Outcome::EdgeCreated(id)
    } else {
        Outcome::Unchanged
    }
}

fn update_node_label(graph: &mut GraphModel, id: NodeId, label: String) -> Outcome {
    match graph.node_mut(id) {
        Some(node) if node.label != label => {
            node.label = label;
            Outcome::Changed
        }
        _ => Outcome::Unchanged,
    }
}

fn update_edge_label(graph: &mut GraphModel, id: EdgeId, label: Option<String>) -> Outcome {
    match graph.edge_mut(id) {
        Some(edge) if edge.label != label => {
            edge.label = label;
            Outcome::Changed
        }
        _ => Outcome::Unchanged,
    }
}

fn move_node(graph: &mut GraphModel, id: NodeId, position: Point) -> Outcome {
    let Some(node) = graph.node(id) else {
        return Outcome::Unchanged;
    };

    let absolute = match node.parent.and_then(|p| graph.node(p)) {
        Some(parent) => {
            let mut relative = position;
            if node.extent == Some(Extent::Parent) {
                let max_x = (parent.size.width - node.size.width).max(0.0);
                let max_y = (parent.size.height - node.size.height).max(0.0);
                relative.x = relative.x.clamp(0.0, max_x);
                relative.y = relative.y.clamp(0.0, max_y);
            }
            parent.position + relative
        }
        None => position,
    };
    let delta = absolute - node.position;
    if delta == Point::default() {
        return Outcome::Unchanged;
    }

    // Members keep their place relative to a dragged group.
    let members = if node.is_group() {
        graph.children_of(id)
    } else {
        Vec::new()
    };
    if let Some(node) = graph.node_mut(id) {
        node.position = absolute;
    }
    for member in members {
        if let Some(m) = graph.node_mut(member) {
            m.position = m.position + delta;
        }
    }
    Outcome::Changed
}

fn delete_nodes(graph: &mut GraphModel, ids: &[NodeId]) -> Outcome {
    let mut doomed: Vec<NodeId> = Vec::with_capacity(ids.len());
    for &id in ids {
        let Some(node) = graph.node(id) else {
            continue;
        };
        if !doomed.contains(&id) {
            doomed.push(id);
        }
        if node.is_group() {
            for member in graph.children_of(id) {
                if !doomed.contains(&member) {
                    doomed.push(member);
                }
            }
        }
    }
    if doomed.is_empty() {
        return Outcome::Unchanged;
    }

    for id in doomed {
        graph.remove_node(id);
    }
    Outcome::Changed
}

// ─── Grouping ────────────────────────────────────────────────────────────

fn group(graph: &mut GraphModel, ids: &[NodeId], config: &EditorConfig) -> Outcome {
    let mut members: Vec<NodeId> = Vec::with_capacity(ids.len());
    for &id in ids {
        if !members.contains(&id) {
            members.push(id);
        }
    }
    if members.len() < 2 {
        return Outcome::Unchanged;
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &id in &members {
        let Some(node) = graph.node(id) else {
            return Outcome::Unchanged;
        };
        if node.is_group() || node.parent.is_some() {
            return Outcome::Unchanged;
        }
        let p = node.position;
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x + node.size.width);
        // Every member counts as `group_child_height` tall.
        max_y = max_y.max(p.y + config.group_child_height);
    }

    let pad = config.group_padding;
    let origin = Point::new(min_x - pad, min_y - pad);
    let size = Size::new(max_x - min_x + 2.0 * pad, max_y - min_y + 2.0 * pad);

    let group_id = graph.fresh_group_id();
    graph.prepend_node(Node::group(group_id, origin, size));
    for id in members {
        if let Some(node) = graph.node_mut(id) {
            node.parent = Some(group_id);
            node.extent = Some(Extent::Parent);
        }
    }
    Outcome::NodeCreated(group_id)
}

fn ungroup(graph: &mut GraphModel, id: NodeId) -> Outcome {
    if !graph.node(id).is_some_and(|n| n.is_group()) {
        return Outcome::Unchanged;
    }
    // Positions are stored absolute, so members stay exactly where they are.
    for member in graph.children_of(id) {
        if let Some(node) = graph.node_mut(member) {
            node.parent = None;
            node.extent = None;
        }
    }
    graph.remove_node(id);
    Outcome::Changed
}

// ─── Via-points ──────────────────────────────────────────────────────────

fn insert_via_point(graph: &mut GraphModel, edge: EdgeId, segment: usize, point: Point) -> Outcome {
    let Some(edge) = graph.edge_mut(edge) else {
        return Outcome::Unchanged;
    };
    let at = segment.min(edge.via_points.len());
    edge.via_points.insert(at, ViaPoint::at(point));
    Outcome::Changed
}

fn set_via_point_active(graph: &mut GraphModel, edge: EdgeId, index: usize, active: bool) -> Outcome {
    let Some(edge) = graph.edge_mut(edge) else {
        return Outcome::Unchanged;
    };
    if index >= edge.via_points.len() {
        return Outcome::Unchanged;
    }

    let mut changed = false;
    for (i, v) in edge.via_points.iter_mut().enumerate() {
        let want = if i == index { active } else { v.active && !active };
        changed |= v.active != want;
        v.active = want;
    }
    Outcome::from_changed(changed)
}

fn move_via_point(graph: &mut GraphModel, edge: EdgeId, index: usize, point: Point) -> Outcome {
    match graph
        .edge_mut(edge)
        .and_then(|e| e.via_points.get_mut(index))
    {
        Some(v) if v.active => {
            v.x = point.x;
            v.y = point.y;
            Outcome::Changed
        }
        _ => Outcome::Unchanged,
    }
}

fn remove_via_point(graph: &mut GraphModel, edge: EdgeId, index: usize) -> Outcome {
    match graph.edge_mut(edge) {
        Some(e) if index < e.via_points.len() => {
            e.via_points.remove(index);
            Outcome::Changed
        }
        _ => Outcome::Unchanged,
    }
}

fn reset_edge_path(graph: &mut GraphModel, edge: EdgeId) -> Outcome {
    match graph.edge_mut(edge) {
        Some(e) if !e.via_points.is_empty() => {
            e.via_points.clear();
            Outcome::Changed
        }
        _ => Outcome::Unchanged,
    }
}

fn set_edge_path_kind(graph: &mut GraphModel, edge: EdgeId, kind: PathKind) -> Outcome {
    match graph.edge_mut(edge) {
        Some(e) if e.path_kind != kind => {
            e.path_kind = kind;
            Outcome::Changed
        }
        _ => Outcome::Unchanged,
    }
}
