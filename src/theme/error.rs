//! Theme construction errors.

use thiserror::Error;

use crate::template::TemplateError;

/// Error returned when a theme cannot be built or loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThemeError {
    /// A token path is empty or has an empty segment.
    #[error("invalid token path '{path}'")]
    InvalidTokenPath { path: String },

    /// A path is used both as a value and as a group of tokens.
    #[error("token '{path}' is both a value and a group")]
    TokenConflict { path: String },

    /// A token value is neither a number nor text.
    #[error("token '{path}' has an unsupported value: {reason}")]
    InvalidTokenValue { path: String, reason: String },

    /// A component fragment could not be parsed.
    #[error("invalid fragment '{name}': {source}")]
    InvalidFragment {
        name: String,
        #[source]
        source: TemplateError,
    },

    /// Two component fragments are published under the same path.
    #[error("fragment '{path}' is declared more than once")]
    DuplicateFragment { path: String },

    /// A theme fragment splices a template-local fragment.
    #[error("theme fragment '{fragment}' splices template fragment '{name}'")]
    LocalSplice { fragment: String, name: String },

    /// Theme fragments splice each other in a loop.
    #[error("fragment cycle detected: {}", path.join(" -> "))]
    FragmentCycle { path: Vec<String> },

    /// The theme document is not valid YAML or has the wrong shape.
    #[error("invalid theme document: {message}")]
    InvalidDocument { message: String },

    /// The theme file could not be read.
    #[error("failed to read theme '{path}': {message}")]
    Io { path: String, message: String },
}
