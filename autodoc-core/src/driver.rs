//! Per-function documentation loop
//!
//! Global invariants enforced:
//! - Functions are visited in pre-order document order, each exactly once
//! - A failure for one function never stops the run; the function is skipped
//! - After every successful patch the whole tree is serialized and written out
//! - A failed write aborts the run, leaving the previous complete file on disk

use crate::ast::{FunctionId, SyntaxTree};
use crate::extract::{ExtractionPolicy, GenerationRequest, DEFAULT_MAX_ATTEMPTS};
use crate::language::{unparse, Language, PythonParser};
use crate::oracle::Oracle;
use crate::patch;
use crate::persist::atomic_write;
use crate::prompt::PromptTemplate;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub max_attempts: usize,
    pub prompt: PromptTemplate,
    /// Run the loop without touching the file
    pub dry_run: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        DriverOptions {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            prompt: PromptTemplate::default(),
            dry_run: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFunction {
    pub name: String,
    pub reason: String,
}

/// Outcome of one run over a file
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Names of documented functions, in the order they were patched
    pub documented: Vec<String>,
    pub skipped: Vec<SkippedFunction>,
    /// Final serialization of the tree
    pub source: String,
}

impl RunSummary {
    pub fn functions(&self) -> usize {
        self.documented.len() + self.skipped.len()
    }
}

/// Check that `path` is an existing Python file
pub fn validate_target(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!("{} does not exist or is not a file", path.display());
    }
    match Language::from_path(path) {
        Some(Language::Python) => Ok(()),
        None => anyhow::bail!("{} is not a Python (.py) file", path.display()),
    }
}

/// Document every function of the Python file at `path`
///
/// The file is rewritten after each documented function unless
/// `options.dry_run` is set.
pub fn document_file(
    path: &Path,
    oracle: &dyn Oracle,
    options: &DriverOptions,
) -> Result<RunSummary> {
    validate_target(path)?;

    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parser = PythonParser::new()?;
    let mut tree = parser
        .parse(&source)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let policy = ExtractionPolicy::new(options.max_attempts, options.prompt.clone());
    document_tree(&mut tree, oracle, &policy, |tree| {
        if options.dry_run {
            return Ok(());
        }
        let rendered = unparse(tree);
        atomic_write(path, &rendered)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %path.display(), bytes = rendered.len(), "file rewritten");
        Ok(())
    })
}

/// Document every function of `tree`, calling `after_patch` once per patch
///
/// An error from `after_patch` aborts the loop.
pub fn document_tree<F>(
    tree: &mut SyntaxTree,
    oracle: &dyn Oracle,
    policy: &ExtractionPolicy,
    mut after_patch: F,
) -> Result<RunSummary>
where
    F: FnMut(&SyntaxTree) -> Result<()>,
{
    let ids: Vec<FunctionId> = tree.functions().map(|function| function.id).collect();
    let total = ids.len();
    let mut summary = RunSummary::default();

    for (index, id) in ids.into_iter().enumerate() {
        let Some(function) = tree.function(id) else {
            continue;
        };
        let line = function.span.start_line;
        let request = GenerationRequest::for_function(tree, function);
        info!(
            function = %request.function,
            line,
            "documenting function {}/{}",
            index + 1,
            total
        );

        match policy.obtain(&request, oracle) {
            Ok(docstring) => {
                if let Some(function) = tree.function_mut(id) {
                    patch::apply(function, docstring);
                }
                after_patch(tree)?;
                summary.documented.push(request.function);
            }
            Err(err) => {
                warn!(function = %request.function, "skipping function: {}", err);
                summary.skipped.push(SkippedFunction {
                    name: request.function,
                    reason: err.to_string(),
                });
            }
        }
    }

    summary.source = unparse(tree);
    Ok(summary)
}
