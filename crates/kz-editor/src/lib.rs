pub mod config;
pub mod editor;
pub mod gradient;
pub mod input;
pub mod pen;
pub mod session;
pub mod shortcuts;
pub mod tools;

pub use config::EditorConfig;
pub use editor::Editor;
pub use input::{DropPayload, InputEvent, Modifiers};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::ToolKind;
