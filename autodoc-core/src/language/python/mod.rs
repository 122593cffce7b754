//! Python language support
//!
//! Parsing uses the tree-sitter-python grammar; `unparse` renders a
//! [`SyntaxTree`](crate::ast::SyntaxTree) back to source text.

pub mod parser;
pub mod unparse;

pub use parser::{ParseError, PythonParser};
pub use unparse::{render_docstring, unparse};
