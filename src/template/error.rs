//! Template authoring errors.

use thiserror::Error;

/// A structural problem in a rule template set or rule body.
///
/// These are authoring bugs: they are reported, never worked around.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Two rules share a name.
    #[error("rule '{name}' is declared more than once")]
    DuplicateRule { name: String },

    /// Two template fragments share a name.
    #[error("fragment '{name}' is declared more than once")]
    DuplicateFragment { name: String },

    /// A splice names a template fragment that does not exist.
    #[error("'{referenced_from}' splices unknown fragment '{name}'")]
    UnknownFragment { name: String, referenced_from: String },

    /// A fragment transitively splices itself.
    #[error("splice cycle detected: {}", path.join(" -> "))]
    SpliceCycle { path: Vec<String> },

    /// A `${...}` interpolation is not well formed.
    #[error("invalid interpolation '{value}': {reason}")]
    InvalidInterpolation { value: String, reason: String },

    /// An entry of a YAML rule body cannot be understood.
    #[error("invalid entry '{key}' in '{owner}': {reason}")]
    InvalidEntry {
        owner: String,
        key: String,
        reason: String,
    },

    /// The template document is not valid YAML or has the wrong shape.
    #[error("invalid template document: {message}")]
    InvalidDocument { message: String },

    /// The template file could not be read.
    #[error("failed to read template '{path}': {message}")]
    Io { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splice_cycle_display() {
        let err = TemplateError::SpliceCycle {
            path: vec!["...a".into(), "...b".into(), "...a".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("cycle"));
        assert!(msg.contains("...a -> ...b -> ...a"));
    }

    #[test]
    fn test_unknown_fragment_display() {
        let err = TemplateError::UnknownFragment {
            name: "card".into(),
            referenced_from: "panel".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("card"));
        assert!(msg.contains("panel"));
    }
}
