//! Prompt templates sent to the oracle

use anyhow::{bail, Result};

/// Placeholder replaced by the function's source text
pub const FUNCTION_PLACEHOLDER: &str = "{function}";

const DEFAULT_TEMPLATE: &str = "Analyze the following python function and generate a google style docstring that includes:
    * A description of the function's purpose without revealing internal details.
    * An explanation of each parameter, including their types and expected values.
    * A description of the function's return value, including its type and possible values.
    * Any potential exceptions that the function might raise.
    * A few examples of how to use the function.
Wrap the docstring in triple double quotes.

{function}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Build a template, rejecting text without a `{function}` placeholder
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !template.contains(FUNCTION_PLACEHOLDER) {
            bail!(
                "prompt template must contain the {} placeholder",
                FUNCTION_PLACEHOLDER
            );
        }
        Ok(PromptTemplate { template })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn render(&self, function_source: &str) -> String {
        self.template.replace(FUNCTION_PLACEHOLDER, function_source)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        PromptTemplate {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}
