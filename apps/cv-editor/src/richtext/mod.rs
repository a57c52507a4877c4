pub mod editor;
mod flat;
pub mod history;
pub mod html;
pub mod lexer;
pub mod node;
mod normalize;
pub mod selection;
pub mod surface;

pub use editor::{BlockKind, Editor};
pub use html::{deserialize, serialize, try_deserialize, HtmlError};
pub use node::{Document, Element, ElementKind, Mark, Marks, Node, Text};
pub use selection::{Point, Range};
pub use surface::{Command, EditingSurface};
