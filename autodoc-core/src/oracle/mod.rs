//! Text-generation capability consumed by the extraction policy
//!
//! An [`Oracle`] turns a prompt into raw text with one outbound call. It never
//! retries and never caches; retry decisions belong to the caller.

pub mod gemini;
pub mod scripted;

pub use gemini::GeminiOracle;
pub use scripted::ScriptedOracle;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// Worth retrying later: rate limiting, timeouts, server-side errors
    #[error("transient oracle failure: {0}")]
    Transient(String),

    /// Will fail the same way again: unknown model, rejected request, bad credentials
    #[error("permanent oracle failure: {0}")]
    Permanent(String),
}

impl OracleError {
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::Transient(_))
    }
}

pub trait Oracle {
    /// Generate a response for `prompt`
    fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}

impl<F> Oracle for F
where
    F: Fn(&str) -> Result<String, OracleError>,
{
    fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        self(prompt)
    }
}
