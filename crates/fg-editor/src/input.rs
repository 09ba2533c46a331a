//! Inbound host events.
//!
//! The renderer hit-tests and converts screen coordinates to graph space,
//! then reports what happened as a `HostEvent`. The session turns each event
//! into selection changes or commands.

use crate::commands::{Command, Outcome};
use crate::session::EditorSession;
use crate::shortcuts::{EditAction, ShortcutMap};
use crate::snapshot;
use fg_core::geometry::{self, Point};
use fg_core::id::{EdgeId, NodeId};

/// An interaction reported by the host. Points are absolute graph space,
/// except `NodeDrag::position` which is owner-space.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    NodeClick { node: NodeId },
    EdgeClick { edge: EdgeId },
    NodeDoubleClick { node: NodeId },
    EdgeDoubleClick { edge: EdgeId, point: Point },
    ConnectGesture { source: NodeId, target: NodeId },
    NodeDrag { node: NodeId, position: Point },
    ViaPointPointerDown { edge: EdgeId, index: usize },
    ViaPointPointerMove {
        edge: EdgeId,
        index: usize,
        point: Point,
    },
    ViaPointPointerUp { edge: EdgeId, index: usize },
    ViaPointContextMenu { edge: EdgeId, index: usize },
    PaneClick,
    Key {
        key: String,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    },
}

impl EditorSession {
    /// Dispatch one host event. The returned outcome describes the graph;
    /// pure selection changes report `Unchanged`.
    pub fn handle(&mut self, event: HostEvent) -> Outcome {
        match event {
            HostEvent::NodeClick { node } => {
                self.click_node(node);
                Outcome::Unchanged
            }
            HostEvent::EdgeClick { edge } => {
                self.click_edge(edge);
                Outcome::Unchanged
            }
            HostEvent::NodeDoubleClick { node } => {
                self.begin_label_edit(node);
                Outcome::Unchanged
            }
            HostEvent::EdgeDoubleClick { edge, point } => {
                let Some(segment) = self
                    .graph()
                    .edge(edge)
                    .and_then(|e| snapshot::edge_endpoints(self.graph(), e))
                    .map(|chords| geometry::segment_index_at(&chords, point))
                else {
                    return Outcome::Unchanged;
                };
                self.execute(Command::InsertViaPoint {
                    edge,
                    segment,
                    point,
                })
            }
            HostEvent::ConnectGesture { source, target } => {
                self.execute(Command::Connect { source, target })
            }
            HostEvent::NodeDrag { node, position } => {
                self.execute(Command::MoveNode { id: node, position })
            }
            HostEvent::ViaPointPointerDown { edge, index } => self.execute(Command::SetViaPointActive {
                edge,
                index,
                active: true,
            }),
            HostEvent::ViaPointPointerMove { edge, index, point } => {
                self.execute(Command::MoveViaPoint { edge, index, point })
            }
            HostEvent::ViaPointPointerUp { edge, index } => self.execute(Command::SetViaPointActive {
                edge,
                index,
                active: false,
            }),
            HostEvent::ViaPointContextMenu { edge, index } => {
                self.execute(Command::RemoveViaPoint { edge, index })
            }
            HostEvent::PaneClick => {
                self.clear_selection();
                Outcome::Unchanged
            }
            HostEvent::Key {
                key,
                ctrl,
                shift,
                alt,
                meta,
            } => match ShortcutMap::resolve(&key, ctrl, shift, alt, meta) {
                Some(action) => self.perform(action),
                None => Outcome::Unchanged,
            },
        }
    }

    fn perform(&mut self, action: EditAction) -> Outcome {
        if !self.is_interactive() {
            return Outcome::Unchanged;
        }
        match action {
            EditAction::DeleteSelection => changed(self.delete_selection()),
            EditAction::Deselect => {
                self.clear_selection();
                self.cancel_label_edit();
                Outcome::Unchanged
            }
            EditAction::GroupSelection => self
                .group_selection()
                .map_or(Outcome::Unchanged, Outcome::NodeCreated),
            EditAction::UngroupSelection => changed(self.ungroup_selection()),
            EditAction::ToggleMultiSelect => {
                self.toggle_select_mode();
                Outcome::Unchanged
            }
        }
    }
}

fn changed(done: bool) -> Outcome {
    if done { Outcome::Changed } else { Outcome::Unchanged }
}
