//! The operation registry: the single declarative source for routes,
//! validation, documentation, and the landing page.
//!
//! Each [`Operation`] names an HTTP route, the input fields it requires, and
//! how it executes against the generation provider. The registry is built
//! once at startup and passed explicitly to every component that reads it;
//! nothing mutates it afterwards.

use axum::http::Method;

use crate::prompt::PromptTemplate;

/// How an operation runs against the provider.
#[derive(Debug, Clone)]
pub enum Execution {
    /// One-shot completion; the full text comes back in a single response.
    Completion { template: PromptTemplate },

    /// Chat-model call with a system and a user message.
    Chat {
        system: PromptTemplate,
        user: PromptTemplate,
    },

    /// Completion with incremental token output, relayed as a stream.
    StreamingCompletion { template: PromptTemplate },
}

impl Execution {
    /// Whether this operation produces a token stream.
    pub fn is_streaming(&self) -> bool {
        matches!(self, Execution::StreamingCompletion { .. })
    }
}

/// A named, routable text-generation capability.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Stable identifier, used in logs and the landing page.
    pub id: &'static str,

    /// Route path, e.g. "/translate".
    pub route: &'static str,

    /// HTTP verb the route is mounted under.
    pub method: Method,

    /// Human-readable description for documentation.
    pub description: &'static str,

    /// Required input field names, in declaration order.
    pub input_variables: &'static [&'static str],

    /// Execution descriptor.
    pub execution: Execution,
}

/// Ordered, read-only collection of operations.
#[derive(Debug, Clone)]
pub struct Registry {
    operations: Vec<Operation>,
}

impl Registry {
    /// Build the registry of built-in operations.
    pub fn builtin() -> Self {
        let operations = vec![
            Operation {
                id: "chat-translation",
                route: "/chat-translate",
                method: Method::POST,
                description:
                    "Translates a text from one language to another using a chat model.",
                input_variables: &["Input Language", "Output Language", "Text"],
                execution: Execution::Chat {
                    system: PromptTemplate::new(
                        "You are a helpful assistant that translates {Input Language} to {Output Language}.",
                    ),
                    user: PromptTemplate::new("{Text}"),
                },
            },
            Operation {
                id: "translation",
                route: "/translate",
                method: Method::POST,
                description: "Translates a text from one language to another",
                input_variables: &["Input Language", "Output Language", "Text"],
                execution: Execution::Completion {
                    template: PromptTemplate::new(
                        "Translate the following text from {Input Language} to {Output Language}\n```{Text}```\n\n",
                    ),
                },
            },
            Operation {
                id: "poem",
                route: "/poem",
                method: Method::POST,
                description: "Generates a short poem about your topic (Use as stream)",
                input_variables: &["Topic"],
                execution: Execution::StreamingCompletion {
                    template: PromptTemplate::new("Write me very short a poem about {Topic}."),
                },
            },
        ];
        Self { operations }
    }

    /// All operations, in declaration order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Look up an operation by identifier.
    pub fn get(&self, id: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_operations() {
        let registry = Registry::builtin();
        assert_eq!(registry.operations().len(), 3);
        assert!(registry.get("poem").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_routes_are_unique() {
        let registry = Registry::builtin();
        let mut routes: Vec<_> = registry.operations().iter().map(|op| op.route).collect();
        routes.sort();
        routes.dedup();
        assert_eq!(routes.len(), registry.operations().len());
    }

    #[test]
    fn test_only_poem_streams() {
        let registry = Registry::builtin();
        for op in registry.operations() {
            assert_eq!(op.execution.is_streaming(), op.id == "poem");
        }
    }
}
