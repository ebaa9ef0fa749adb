//! Property declarations: literals, theme references and interpolations.

use std::fmt;

use super::error::TemplateError;
use crate::value::StyleValue;

/// A dot-separated path into a theme's token tree, e.g. `tokens.padding.space2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPath(String);

impl TokenPath {
    /// Creates a path from its dotted form.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The dotted form of the path.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Returns `true` if no segment is empty.
    pub fn is_well_formed(&self) -> bool {
        !self.0.is_empty() && self.segments().all(|s| !s.is_empty())
    }
}

impl fmt::Display for TokenPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenPath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for TokenPath {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

/// One piece of an [`Interpolation`].
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Token(TokenPath),
}

/// Text with embedded theme references, such as `1px solid ${tokens.divider.light}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    segments: Vec<Segment>,
}

impl Interpolation {
    /// Parses `${path}` placeholders out of `source`.
    ///
    /// # Errors
    ///
    /// Fails on an unterminated `${` or an empty or malformed path.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let invalid = |reason: &str| TemplateError::InvalidInterpolation {
            value: source.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        let mut rest = source;
        while let Some(start) = rest.find("${") {
            if start > 0 {
                segments.push(Segment::Text(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| invalid("unterminated '${'"))?;
            let path = TokenPath::new(after[..end].trim());
            if !path.is_well_formed() {
                return Err(invalid("empty or malformed token path"));
            }
            segments.push(Segment::Token(path));
            rest = &after[end + 1..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// The parsed pieces in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterates the theme references this interpolation reads.
    pub fn tokens(&self) -> impl Iterator<Item = &TokenPath> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Token(path) => Some(path),
            Segment::Text(_) => None,
        })
    }
}

/// The right-hand side of a property in a rule body.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// A value copied into the output unchanged.
    Literal(StyleValue),
    /// A value read from the theme at resolution time.
    Token(TokenPath),
    /// Text assembled from literal pieces and theme values.
    Interpolated(Interpolation),
}

impl Declaration {
    /// Reads the compact text notation used by YAML templates.
    ///
    /// - `$tokens.padding.space0` is a theme reference
    /// - text containing `${path}` is an interpolation
    /// - a leading `$$` escapes a literal `$`
    /// - anything else is literal text
    ///
    /// # Example
    ///
    /// ```rust
    /// use themed_rules::{Declaration, StyleValue};
    ///
    /// assert!(matches!(
    ///     Declaration::parse("$components.layerMenu.bgColor").unwrap(),
    ///     Declaration::Token(_)
    /// ));
    /// assert_eq!(
    ///     Declaration::parse("12px 0").unwrap(),
    ///     Declaration::Literal(StyleValue::from("12px 0"))
    /// );
    /// ```
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        if let Some(escaped) = text.strip_prefix("$$") {
            return Ok(Declaration::Literal(StyleValue::Text(format!("${}", escaped))));
        }
        if text.contains("${") {
            return Interpolation::parse(text).map(Declaration::Interpolated);
        }
        if let Some(path) = text.strip_prefix('$') {
            let path = TokenPath::new(path);
            if !path.is_well_formed() {
                return Err(TemplateError::InvalidInterpolation {
                    value: text.to_string(),
                    reason: "empty or malformed token path".to_string(),
                });
            }
            return Ok(Declaration::Token(path));
        }
        Ok(Declaration::Literal(StyleValue::Text(text.to_string())))
    }

    /// Creates a theme reference.
    pub fn token(path: impl Into<TokenPath>) -> Self {
        Declaration::Token(path.into())
    }
}

impl From<StyleValue> for Declaration {
    fn from(value: StyleValue) -> Self {
        Declaration::Literal(value)
    }
}

macro_rules! literal_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Declaration {
                fn from(value: $ty) -> Self {
                    Declaration::Literal(StyleValue::from(value))
                }
            }
        )*
    };
}

literal_from!(i32, i64, f64, &str, String);
