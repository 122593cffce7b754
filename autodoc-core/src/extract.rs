//! Docstring extraction with bounded regeneration
//!
//! Model output is noisy: the docstring is whatever sits between the first
//! `"""` and the next one. A reply with no opening marker is worth asking
//! for again; anything the oracle itself reports as a failure is not retried
//! here.

use crate::ast::{FunctionNode, SyntaxTree};
use crate::oracle::{Oracle, OracleError};
use crate::prompt::PromptTemplate;
use thiserror::Error;
use tracing::{debug, warn};

/// Marker that opens and closes a docstring in model output
pub const DOC_DELIMITER: &str = "\"\"\"";

pub const DEFAULT_MAX_ATTEMPTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("response contains no opening \"\"\" delimiter")]
    NoOpeningDelimiter,
}

#[derive(Debug, Error)]
pub enum ObtainError {
    #[error("failed to generate docstring after {attempts} attempts for function {function}")]
    Exhausted { function: String, attempts: usize },

    #[error("oracle failed for function {function}: {source}")]
    Oracle {
        function: String,
        #[source]
        source: OracleError,
    },
}

impl ObtainError {
    pub fn function(&self) -> &str {
        match self {
            ObtainError::Exhausted { function, .. } | ObtainError::Oracle { function, .. } => {
                function
            }
        }
    }
}

/// One function to document, identified by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub function: String,
    /// Verbatim source of the function
    pub snippet: String,
}

impl GenerationRequest {
    pub fn new(function: impl Into<String>, snippet: impl Into<String>) -> Self {
        GenerationRequest {
            function: function.into(),
            snippet: snippet.into(),
        }
    }

    /// Request for `function` using its text in the parsed source
    pub fn for_function(tree: &SyntaxTree, function: &FunctionNode) -> Self {
        let snippet = tree
            .source_segment(&function.span)
            .unwrap_or_default()
            .trim_end();
        GenerationRequest::new(function.name.clone(), snippet)
    }
}

/// Carve a docstring out of a raw response
///
/// A missing closing marker means the docstring runs to the end of the text.
pub fn extract(response: &str) -> Result<String, ExtractionError> {
    let start = response
        .find(DOC_DELIMITER)
        .ok_or(ExtractionError::NoOpeningDelimiter)?
        + DOC_DELIMITER.len();
    let rest = &response[start..];
    let end = rest.find(DOC_DELIMITER).unwrap_or(rest.len());
    Ok(rest[..end].to_string())
}

#[derive(Debug, Clone)]
pub struct ExtractionPolicy {
    pub max_attempts: usize,
    pub prompt: PromptTemplate,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        ExtractionPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            prompt: PromptTemplate::default(),
        }
    }
}

impl ExtractionPolicy {
    pub fn new(max_attempts: usize, prompt: PromptTemplate) -> Self {
        ExtractionPolicy {
            max_attempts,
            prompt,
        }
    }

    /// Ask `oracle` for a docstring until one can be extracted
    ///
    /// Each reply without an opening delimiter uses up one attempt. Oracle
    /// failures end the loop at once.
    pub fn obtain(
        &self,
        request: &GenerationRequest,
        oracle: &dyn Oracle,
    ) -> Result<String, ObtainError> {
        let prompt = self.prompt.render(&request.snippet);

        for attempt in 1..=self.max_attempts {
            let response = oracle
                .generate(&prompt)
                .map_err(|source| ObtainError::Oracle {
                    function: request.function.clone(),
                    source,
                })?;

            match extract(&response) {
                Ok(docstring) => {
                    debug!(
                        function = %request.function,
                        attempt,
                        "extracted docstring"
                    );
                    return Ok(docstring);
                }
                Err(err) => {
                    warn!(
                        function = %request.function,
                        attempt,
                        max_attempts = self.max_attempts,
                        "{}, regenerating",
                        err
                    );
                }
            }
        }

        Err(ObtainError::Exhausted {
            function: request.function.clone(),
            attempts: self.max_attempts,
        })
    }
}
