//! Prompt templates with `{Name}` placeholder substitution.
//!
//! Templates are declared next to the operations that use them and rendered
//! against a per-request [`InputBundle`](crate::provider::InputBundle). The
//! router validates declared fields before rendering, so a missing variable
//! indicates a registry bug rather than bad client input.

use std::collections::BTreeMap;

use thiserror::Error;

/// A variable referenced by a template was absent from the bundle.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("template references undeclared variable {0:?}")]
pub struct MissingVariable(pub String);

/// A text template containing `{Name}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The raw template text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute every `{Name}` placeholder with its value from `values`.
    ///
    /// Unmatched braces are passed through verbatim; only a `{...}` span that
    /// closes counts as a placeholder.
    pub fn render(&self, values: &BTreeMap<String, String>) -> Result<String, MissingVariable> {
        let mut out = String::with_capacity(self.text.len());
        let mut rest = self.text.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    match values.get(name) {
                        Some(value) => out.push_str(value),
                        None => return Err(MissingVariable(name.to_string())),
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    // Unterminated brace: not a placeholder.
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}
