//! Deterministic oracle that replays a fixed script

use super::{Oracle, OracleError};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Replays queued responses in order and records every prompt it receives
///
/// Once the queue is drained the fallback (if any) is returned forever;
/// without a fallback further calls fail permanently.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    script: RefCell<VecDeque<Result<String, OracleError>>>,
    fallback: Option<Result<String, OracleError>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(script: impl IntoIterator<Item = Result<String, OracleError>>) -> Self {
        ScriptedOracle {
            script: RefCell::new(script.into_iter().collect()),
            fallback: None,
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// Successful replies, in order
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|reply| Ok(reply.into())))
    }

    /// The same successful reply for every call
    pub fn always(reply: impl Into<String>) -> Self {
        Self::new(Vec::new()).with_fallback(Ok(reply.into()))
    }

    pub fn with_fallback(mut self, fallback: Result<String, OracleError>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }
}

impl Oracle for ScriptedOracle {
    fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.borrow_mut().push(prompt.to_string());

        if let Some(next) = self.script.borrow_mut().pop_front() {
            return next;
        }
        match &self.fallback {
            Some(fallback) => fallback.clone(),
            None => Err(OracleError::Permanent("script exhausted".to_string())),
        }
    }
}
