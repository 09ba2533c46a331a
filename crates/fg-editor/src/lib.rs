pub mod commands;
pub mod input;
pub mod selection;
pub mod session;
pub mod shortcuts;
pub mod snapshot;

pub use commands::{Command, Outcome};
pub use input::HostEvent;
pub use selection::{SelectMode, SelectionManager};
pub use session::{EditorSession, LabelEdit};
pub use shortcuts::{EditAction, ShortcutMap};
pub use snapshot::{EdgeView, NodeView, RenderSnapshot};
