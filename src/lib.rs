pub mod clipboard;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod parser;
pub mod render;
pub mod session;
pub mod theme;
pub mod tree;
pub mod writer;

pub use clipboard::Clipboard;
pub use config::EditorConfig;
pub use error::{DocumentError, EditError, EditResult, ParseError, ParseResult};
pub use history::History;
pub use parser::{import_file, parse};
pub use session::EditorSession;
pub use tree::{Node, NodeId, NodeKind, Tree};
pub use writer::{Writer, export_file};
