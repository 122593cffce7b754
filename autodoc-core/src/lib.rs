//! autodoc core library - generated docstrings for Python functions

// Global invariants enforced in this crate:
// - Functions are documented one at a time, in pre-order document order
// - No global mutable state, no threads, no async
// - Oracle calls are the only network traffic; retries live in `extract`
// - The target file only ever holds a complete serialization of the tree

pub mod ast;
pub mod config;
pub mod credentials;
pub mod driver;
pub mod extract;
pub mod language;
pub mod oracle;
pub mod patch;
pub mod persist;
pub mod prompt;

pub use ast::{FunctionId, FunctionNode, SyntaxTree};
pub use config::ResolvedConfig;
pub use driver::{document_file, validate_target, DriverOptions, RunSummary, SkippedFunction};
pub use extract::{extract, ExtractionError, ExtractionPolicy, GenerationRequest, ObtainError};
pub use language::python::ParseError;
pub use language::{unparse, PythonParser};
pub use oracle::{GeminiOracle, Oracle, OracleError, ScriptedOracle};
pub use prompt::PromptTemplate;

use std::path::Path;

/// Parse Python source into a syntax tree
pub fn parse(source: &str) -> Result<SyntaxTree, ParseError> {
    PythonParser::new()?.parse(source)
}

/// Parse the Python file at `path`
pub fn parse_file(path: &Path) -> anyhow::Result<SyntaxTree> {
    use anyhow::Context;

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let tree = parse(&source).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(tree)
}
