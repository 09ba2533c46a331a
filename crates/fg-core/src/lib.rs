pub mod fixture;
pub mod geometry;
pub mod id;
pub mod model;

pub use geometry::{PathKind, PathOptions, Point, Segment, Side, Size};
pub use id::{EdgeId, NodeId};
pub use model::*;
