//! The initial workflow diagram used for manual and functional testing.
//!
//! A review pipeline with one branch/merge: `3` fans out to the technical and
//! budget reviews, which join again at `6`. The follow-up chain `7 → … → 11`
//! starts unconnected; linking it to the decision is left to the user.

use crate::geometry::Point;
use crate::id::{EdgeId, NodeId};
use crate::model::{Edge, GraphModel, Node};

/// `(id, label, x, y)` for every fixture node.
pub const WORKFLOW_NODES: [(&str, &str, f64, f64); 11] = [
    ("1", "Proposal Submission", 250.0, 0.0),
    ("2", "Initial Review", 250.0, 120.0),
    ("3", "Committee Assignment", 250.0, 240.0),
    ("4", "Technical Review", 50.0, 360.0),
    ("5", "Budget Review", 450.0, 360.0),
    ("6", "Committee Decision", 250.0, 480.0),
    ("7", "Revision Request", 250.0, 600.0),
    ("8", "Final Approval", 250.0, 720.0),
    ("9", "Contract Preparation", 250.0, 840.0),
    ("10", "Project Kickoff", 250.0, 960.0),
    ("11", "Progress Monitoring", 250.0, 1080.0),
];

/// `(source, target)` for every fixture edge. Edge ids are `e<source>-<target>`.
pub const WORKFLOW_EDGES: [(&str, &str); 10] = [
    ("1", "2"),
    ("2", "3"),
    ("3", "4"),
    ("3", "5"),
    ("4", "6"),
    ("5", "6"),
    ("7", "8"),
    ("8", "9"),
    ("9", "10"),
    ("10", "11"),
];

/// Build a fresh copy of the workflow diagram.
pub fn workflow() -> GraphModel {
    let mut graph = GraphModel::new();
    for (id, label, x, y) in WORKFLOW_NODES {
        graph.insert_node(Node::new(NodeId::intern(id), Point::new(x, y), label));
    }
    for (source, target) in WORKFLOW_EDGES {
        let id = EdgeId::intern(&format!("e{source}-{target}"));
        graph.insert_edge(Edge::new(id, NodeId::intern(source), NodeId::intern(target)));
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_shape() {
        let g = workflow();
        assert_eq!(g.node_count(), 11);
        assert_eq!(g.edge_count(), 10);
        assert!(g.validate().is_ok());
        assert_eq!(
            g.node(NodeId::intern("1")).map(|n| n.label.as_str()),
            Some("Proposal Submission")
        );
    }

    #[test]
    fn branch_and_merge() {
        let g = workflow();
        assert_eq!(g.incident_edges(NodeId::intern("3")).len(), 3);
        assert_eq!(g.incident_edges(NodeId::intern("6")).len(), 2);
        assert!(g.contains_edge(EdgeId::intern("e5-6")));
    }
}
