//! Rule bodies: ordered property declarations, nested blocks and splices.

use std::fmt;

use super::declaration::{Declaration, TokenPath};
use super::error::TemplateError;

/// Where a splice takes its properties from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FragmentRef {
    /// A fragment declared in the same template set.
    Local(String),
    /// A component fragment published by the theme, by dotted path.
    Theme(TokenPath),
}

impl fmt::Display for FragmentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FragmentRef::Local(name) => write!(f, "...{}", name),
            FragmentRef::Theme(path) => write!(f, "...${}", path),
        }
    }
}

/// One entry of a [`RuleBody`], in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// `name: value`
    Property { name: String, value: Declaration },
    /// A conditional sub-rule such as `&:hover` or `&[data-width="max"]`.
    ///
    /// The selector is opaque text; only the body is evaluated.
    Nested { selector: String, body: RuleBody },
    /// Merge a fragment's entries at this position.
    Splice(FragmentRef),
}

/// An ordered property mapping that may read the theme.
///
/// Order is significant: when two entries produce the same key (a local
/// property and a spliced one, say), the one declared later wins.
///
/// # Example
///
/// ```rust
/// use themed_rules::RuleBody;
///
/// let body = RuleBody::new()
///     .set("cursor", "pointer")
///     .token("background", "components.layerMenu.menuItemBg")
///     .splice_theme("util.flexCenterCenter")
///     .nest("&:hover", RuleBody::new().set("opacity", 0.8));
///
/// assert_eq!(body.len(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleBody {
    entries: Vec<Entry>,
}

impl RuleBody {
    /// Creates an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a property with any declaration.
    pub fn set(mut self, name: &str, value: impl Into<Declaration>) -> Self {
        self.entries.push(Entry::Property {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    /// Appends a property that reads a theme token.
    pub fn token(self, name: &str, path: impl Into<TokenPath>) -> Self {
        self.set(name, Declaration::token(path))
    }

    /// Appends a conditional sub-rule.
    pub fn nest(mut self, selector: &str, body: RuleBody) -> Self {
        self.entries.push(Entry::Nested {
            selector: selector.to_string(),
            body,
        });
        self
    }

    /// Splices a fragment declared in the template set.
    pub fn splice(mut self, fragment: &str) -> Self {
        self.entries
            .push(Entry::Splice(FragmentRef::Local(fragment.to_string())));
        self
    }

    /// Splices a component fragment published by the theme.
    pub fn splice_theme(mut self, path: impl Into<TokenPath>) -> Self {
        self.entries
            .push(Entry::Splice(FragmentRef::Theme(path.into())));
        self
    }

    /// Appends an already-built entry.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// The entries in declaration order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Visits every splice in this body, including those inside nested blocks.
    pub(crate) fn for_each_splice<'a>(&'a self, f: &mut impl FnMut(&'a FragmentRef)) {
        for entry in &self.entries {
            match entry {
                Entry::Splice(fragment) => f(fragment),
                Entry::Nested { body, .. } => body.for_each_splice(f),
                Entry::Property { .. } => {}
            }
        }
    }

    /// Rejects literal numbers that are NaN or infinite, in this body or any
    /// nested block. `owner` names the rule or fragment in the error.
    pub(crate) fn check_finite(&self, owner: &str) -> Result<(), TemplateError> {
        for entry in &self.entries {
            match entry {
                Entry::Property {
                    name,
                    value: Declaration::Literal(value),
                } if !value.is_finite() => {
                    return Err(TemplateError::InvalidEntry {
                        owner: owner.to_string(),
                        key: name.clone(),
                        reason: "numbers must be finite".to_string(),
                    });
                }
                Entry::Nested { body, .. } => body.check_finite(owner)?,
                _ => {}
            }
        }
        Ok(())
    }
}
