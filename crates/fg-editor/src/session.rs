//! Editor session: the graph, the selection, the interaction gate and the
//! in-progress label edit, owned together.
//!
//! Every mutation goes through [`EditorSession::execute`]. While the session
//! is not interactive, every command except `ResetWorkflow` is rejected.

use crate::commands::{self, Command, Outcome};
use crate::selection::{SelectMode, SelectionManager};
use crate::snapshot::RenderSnapshot;
use fg_core::fixture;
use fg_core::geometry::{PathKind, Point};
use fg_core::id::{EdgeId, NodeId};
use fg_core::model::{EditorConfig, GraphModel};

/// A node label being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEdit {
    pub node: NodeId,
    pub draft: String,
}

/// The editor state a host drives: one per open diagram.
#[derive(Debug, Clone)]
pub struct EditorSession {
    /// The diagram (single source of truth).
    graph: GraphModel,

    /// Selected nodes or edge, pruned after every applied command.
    selection: SelectionManager,

    /// Interaction gate: when `false`, only `ResetWorkflow` is accepted.
    interactive: bool,

    /// Label being typed, if any.
    label_edit: Option<LabelEdit>,

    /// Group sizing and path tuning.
    config: EditorConfig,
}

/// An interactive session over the initial workflow.
impl Default for EditorSession {
    fn default() -> Self {
        Self::new(fixture::workflow(), EditorConfig::default())
    }
}

impl EditorSession {
    /// Create an interactive session over `graph` with nothing selected.
    pub fn new(graph: GraphModel, config: EditorConfig) -> Self {
        Self {
            graph,
            selection: SelectionManager::new(),
            interactive: true,
            label_edit: None,
            config,
        }
    }

    /// Read access to the diagram.
    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    /// Current selection and select mode.
    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    /// Whether the interaction gate is open.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// The label edit in progress, if any.
    pub fn label_edit(&self) -> Option<&LabelEdit> {
        self.label_edit.as_ref()
    }

    /// Capture what the renderer should draw right now.
    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(&self.graph, &self.selection, &self.config.path)
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Run one command through the interaction gate.
    pub fn execute(&mut self, command: Command) -> Outcome {
        let reset = matches!(command, Command::ResetWorkflow);
        if !self.interactive && !reset {
            log::trace!("{}: rejected, session is not interactive", command.name());
            return Outcome::Unchanged;
        }

        let outcome = commands::apply(&mut self.graph, command, &self.config);
        if reset {
            self.selection.clear();
            self.label_edit = None;
        } else if outcome.is_changed() {
            self.selection.prune(&self.graph);
            if self
                .label_edit
                .as_ref()
                .is_some_and(|e| !self.graph.contains_node(e.node))
            {
                self.label_edit = None;
            }
        }
        outcome
    }

    /// Add a plain node at an absolute position. Returns its id.
    pub fn add_node(&mut self, position: Point, label: impl Into<String>) -> Option<NodeId> {
        self.execute(Command::AddNode {
            position,
            label: label.into(),
        })
        .created_node()
    }

    /// Connect two nodes. `None` if either id is unknown.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        self.execute(Command::Connect { source, target })
            .created_edge()
    }

    /// Relabel a node. Returns `true` if the label changed.
    pub fn update_node_label(&mut self, id: NodeId, label: impl Into<String>) -> bool {
        self.execute(Command::UpdateNodeLabel {
            id,
            label: label.into(),
        })
        .is_changed()
    }

    /// Set or clear an edge label. Returns `true` if it changed.
    pub fn update_edge_label(&mut self, id: EdgeId, label: Option<String>) -> bool {
        self.execute(Command::UpdateEdgeLabel { id, label })
            .is_changed()
    }

    /// Group two or more top-level plain nodes. Returns the group's id.
    pub fn group(&mut self, ids: &[NodeId]) -> Option<NodeId> {
        self.execute(Command::Group { ids: ids.to_vec() })
            .created_node()
    }

    /// Dissolve a group; members stay where they are.
    pub fn ungroup(&mut self, id: NodeId) -> bool {
        self.execute(Command::Ungroup { id }).is_changed()
    }

    /// Delete nodes, their incident edges, and the members of any deleted
    /// group.
    pub fn delete_nodes(&mut self, ids: &[NodeId]) -> bool {
        self.execute(Command::DeleteNodes { ids: ids.to_vec() })
            .is_changed()
    }

    /// Delete one edge. Returns `false` if it does not exist.
    pub fn delete_edge(&mut self, id: EdgeId) -> bool {
        self.execute(Command::DeleteEdge { id }).is_changed()
    }

    /// Place a node at an owner-space position.
    pub fn move_node(&mut self, id: NodeId, position: Point) -> bool {
        self.execute(Command::MoveNode { id, position })
            .is_changed()
    }

    /// Split segment `segment` of `edge` at `point`.
    pub fn insert_via_point(&mut self, edge: EdgeId, segment: usize, point: Point) -> bool {
        self.execute(Command::InsertViaPoint {
            edge,
            segment,
            point,
        })
        .is_changed()
    }

    /// Start or end a via-point drag. Starting one ends any other on the
    /// same edge.
    pub fn set_via_point_active(&mut self, edge: EdgeId, index: usize, active: bool) -> bool {
        self.execute(Command::SetViaPointActive {
            edge,
            index,
            active,
        })
        .is_changed()
    }

    /// Drag a via-point. Ignored unless it is the active one.
    pub fn move_via_point(&mut self, edge: EdgeId, index: usize, point: Point) -> bool {
        self.execute(Command::MoveViaPoint { edge, index, point })
            .is_changed()
    }

    /// Remove one via-point, merging its two segments.
    pub fn remove_via_point(&mut self, edge: EdgeId, index: usize) -> bool {
        self.execute(Command::RemoveViaPoint { edge, index })
            .is_changed()
    }

    /// Drop all via-points of `edge`.
    pub fn reset_edge_path(&mut self, edge: EdgeId) -> bool {
        self.execute(Command::ResetEdgePath { edge })
            .is_changed()
    }

    /// Choose how every segment of `edge` is drawn.
    pub fn set_edge_path_kind(&mut self, edge: EdgeId, kind: PathKind) -> bool {
        self.execute(Command::SetEdgePathKind { edge, kind })
            .is_changed()
    }

    /// Restore the initial workflow. Allowed even when not interactive.
    pub fn reset_workflow(&mut self) {
        self.execute(Command::ResetWorkflow);
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Switch selection mode. A real change clears the selection.
    pub fn set_select_mode(&mut self, mode: SelectMode) {
        self.selection.set_mode(mode);
    }

    /// Flip between single and multi select.
    pub fn toggle_select_mode(&mut self) {
        let mode = self.selection.mode().toggled();
        self.selection.set_mode(mode);
    }

    /// Select a node per the current mode. Ignored while not interactive.
    pub fn click_node(&mut self, id: NodeId) -> bool {
        self.interactive && self.selection.click_node(&self.graph, id)
    }

    /// Select an edge. Ignored in multi mode or while not interactive.
    pub fn click_edge(&mut self, id: EdgeId) -> bool {
        self.interactive && self.selection.click_edge(&self.graph, id)
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Group the selected nodes. The selection is cleared on success.
    pub fn group_selection(&mut self) -> Option<NodeId> {
        let ids = self.selection.selected_nodes().to_vec();
        let group = self.group(&ids)?;
        self.selection.clear();
        Some(group)
    }

    /// Ungroup when exactly one group node is selected.
    pub fn ungroup_selection(&mut self) -> bool {
        let &[id] = self.selection.selected_nodes() else {
            return false;
        };
        if !self.graph.node(id).is_some_and(|n| n.is_group()) {
            return false;
        }
        let done = self.ungroup(id);
        if done {
            self.selection.clear();
        }
        done
    }

    /// Delete the selected nodes, or the selected edge when no node is
    /// selected.
    pub fn delete_selection(&mut self) -> bool {
        let nodes = self.selection.selected_nodes().to_vec();
        if !nodes.is_empty() {
            return self.delete_nodes(&nodes);
        }
        match self.selection.selected_edge() {
            Some(edge) => self.delete_edge(edge),
            None => false,
        }
    }

    // ─── Interaction gate ────────────────────────────────────────────────

    /// Turn editing on or off. Turning it off drops the selection, cancels
    /// any label edit and ends any via-point drag.
    pub fn set_interactive(&mut self, interactive: bool) {
        if !interactive {
            let dragging: Vec<(EdgeId, usize)> = self
                .graph
                .edges()
                .filter_map(|e| e.active_via_point().map(|i| (e.id, i)))
                .collect();
            for (edge, index) in dragging {
                commands::apply(
                    &mut self.graph,
                    Command::SetViaPointActive {
                        edge,
                        index,
                        active: false,
                    },
                    &self.config,
                );
            }
            self.selection.clear();
            self.label_edit = None;
        }
        if self.interactive != interactive {
            log::debug!("interactive: {interactive}");
        }
        self.interactive = interactive;
    }

    // ─── Label editing ───────────────────────────────────────────────────

    /// Start editing a node's label, seeded with the current text.
    pub fn begin_label_edit(&mut self, node: NodeId) -> bool {
        if !self.interactive {
            return false;
        }
        let Some(n) = self.graph.node(node) else {
            return false;
        };
        self.label_edit = Some(LabelEdit {
            node,
            draft: n.label.clone(),
        });
        true
    }

    /// Replace the draft text of the current label edit, if any.
    pub fn set_label_draft(&mut self, text: impl Into<String>) {
        if let Some(edit) = &mut self.label_edit {
            edit.draft = text.into();
        }
    }

    /// Apply the draft. Returns `true` if the label changed.
    pub fn commit_label_edit(&mut self) -> bool {
        match self.label_edit.take() {
            Some(edit) => self.update_node_label(edit.node, edit.draft),
            None => false,
        }
    }

    /// Drop the label edit without applying it.
    pub fn cancel_label_edit(&mut self) {
        self.label_edit = None;
    }
}
