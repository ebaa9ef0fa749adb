//! Resolution errors.

use thiserror::Error;

use crate::template::TemplateError;

/// Error returned when a rule table cannot be resolved.
///
/// None of these are retried: resolution is a pure function of its inputs,
/// so a retry reproduces the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A rule reads a token (or splices a theme fragment) the theme lacks.
    ///
    /// Only returned in strict mode; lenient mode substitutes a fallback.
    #[error("rule '{rule}' property '{property}' references missing theme path '{path}'")]
    MissingTokenPath {
        rule: String,
        property: String,
        path: String,
    },

    /// The template violates a structural invariant. Always fatal.
    #[error("malformed template: {0}")]
    MalformedTemplate(#[from] TemplateError),

    /// One cache key produced two structurally different tables.
    ///
    /// This means some rule body does not evaluate deterministically.
    #[error("cache inconsistency for theme {theme_id} and template {template_id}")]
    CacheInconsistency { theme_id: u64, template_id: u64 },
}

/// Error returned when resolver configuration cannot be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid resolver configuration: {message}")]
    InvalidDocument { message: String },

    #[error("failed to read resolver configuration '{path}': {message}")]
    Io { path: String, message: String },
}
