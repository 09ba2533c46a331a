//! Selection state.
//!
//! Node and edge selection are mutually exclusive. In `Single` mode a click
//! replaces the selection; in `Multi` mode a node click toggles membership and
//! edges cannot be selected at all.

use fg_core::id::{EdgeId, NodeId};
use fg_core::model::GraphModel;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectMode {
    #[default]
    Single,
    Multi,
}

impl SelectMode {
    pub fn toggled(self) -> Self {
        match self {
            SelectMode::Single => SelectMode::Multi,
            SelectMode::Multi => SelectMode::Single,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    mode: SelectMode,
    /// Selected nodes in click order.
    nodes: SmallVec<[NodeId; 4]>,
    edge: Option<EdgeId>,
}

impl SelectionManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    /// Switch mode. Any actual change of mode clears the selection.
    pub fn set_mode(&mut self, mode: SelectMode) {
        if self.mode != mode {
            log::trace!("select mode {:?} -> {mode:?}", self.mode);
            self.mode = mode;
            self.clear();
        }
    }

    /// Handle a click on a node. Returns `false` if the click was ignored.
    pub fn click_node(&mut self, graph: &GraphModel, id: NodeId) -> bool {
        if !graph.contains_node(id) {
            return false;
        }
        self.edge = None;
        match self.mode {
            SelectMode::Single => {
                self.nodes.clear();
                self.nodes.push(id);
            }
            SelectMode::Multi => {
                if let Some(at) = self.nodes.iter().position(|n| *n == id) {
                    self.nodes.remove(at);
                } else {
                    self.nodes.push(id);
                }
            }
        }
        log::trace!("selected nodes: {:?}", self.nodes);
        true
    }

    /// Handle a click on an edge. Ignored in multi mode.
    pub fn click_edge(&mut self, graph: &GraphModel, id: EdgeId) -> bool {
        if self.mode == SelectMode::Multi || !graph.contains_edge(id) {
            return false;
        }
        self.nodes.clear();
        self.edge = Some(id);
        log::trace!("selected edge: {id:?}");
        true
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edge = None;
    }

    /// Forget ids that no longer exist in `graph`.
    pub fn prune(&mut self, graph: &GraphModel) {
        self.nodes.retain(|id| graph.contains_node(*id));
        if self.edge.is_some_and(|e| !graph.contains_edge(e)) {
            self.edge = None;
        }
    }

    pub fn selected_nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn selected_edge(&self) -> Option<EdgeId> {
        self.edge
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edge.is_none()
    }

    pub fn is_node_highlighted(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    pub fn is_edge_highlighted(&self, id: EdgeId) -> bool {
        self.edge == Some(id)
    }
}
