//! Theme: design tokens plus component style fragments.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use serde_yaml::Value;

use super::error::ThemeError;
use super::tokens::TokenTree;
use crate::identity::next_id;
use crate::template::yaml::parse_body;
use crate::template::{FragmentRef, RuleBody};
use crate::value::StyleValue;

/// An immutable, versioned source of design tokens and style fragments.
///
/// Tokens are addressed by dotted paths (`components.layerMenu.bgColor`);
/// fragments are partial rule bodies that templates splice in
/// (`util.flexCenterCenter`). A theme is built once per variant and
/// replaced wholesale on a theme switch. Clones share the same identity.
///
/// # Example
///
/// ```rust
/// use themed_rules::{RuleBody, Theme};
///
/// let dark = Theme::builder("dark")
///     .version(2)
///     .token("tokens.padding.space0", 0)
///     .token("components.layerMenu.bgColor", "#282B36")
///     .fragment(
///         "util.flexCenterCenter",
///         RuleBody::new()
///             .set("display", "flex")
///             .set("justifyContent", "center")
///             .set("alignItems", "center"),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(dark.name(), "dark");
/// assert_eq!(dark.token("components.layerMenu.bgColor").unwrap().to_string(), "#282B36");
/// assert!(dark.fragment("util.flexCenterCenter").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct Theme {
    inner: Arc<ThemeData>,
}

#[derive(Debug)]
struct ThemeData {
    id: u64,
    name: String,
    version: u64,
    tokens: TokenTree,
    fragments: BTreeMap<String, RuleBody>,
}

impl Theme {
    /// Starts building a theme named `name`.
    pub fn builder(name: &str) -> ThemeBuilder {
        ThemeBuilder {
            name: name.to_string(),
            version: 0,
            tokens: Vec::new(),
            fragments: Vec::new(),
        }
    }

    /// Parses a theme from YAML.
    ///
    /// `name`, `version` and `fragments` are reserved top-level keys; every
    /// other top-level key starts a branch of the token tree.
    ///
    /// ```yaml
    /// name: dark
    /// version: 3
    /// tokens:
    ///   padding:
    ///     space0: 0
    /// components:
    ///   layerMenu:
    ///     bgColor: "#282B36"
    /// fragments:
    ///   util.flexCenterCenter:
    ///     display: flex
    /// ```
    pub fn from_yaml(source: &str) -> Result<Self, ThemeError> {
        let document: Value =
            serde_yaml::from_str(source).map_err(|e| ThemeError::InvalidDocument {
                message: e.to_string(),
            })?;
        let Value::Mapping(root) = document else {
            return Err(ThemeError::InvalidDocument {
                message: "expected a mapping".to_string(),
            });
        };

        let mut builder = Theme::builder("unnamed");
        for (key, value) in &root {
            let key = key.as_str().ok_or_else(|| ThemeError::InvalidDocument {
                message: format!("top-level keys must be strings, found {:?}", key),
            })?;
            match key {
                "name" => {
                    let name = value.as_str().ok_or_else(|| ThemeError::InvalidDocument {
                        message: "'name' must be a string".to_string(),
                    })?;
                    builder.name = name.to_string();
                }
                "version" => {
                    builder.version = value.as_u64().ok_or_else(|| ThemeError::InvalidDocument {
                        message: "'version' must be a non-negative integer".to_string(),
                    })?;
                }
                "fragments" => {
                    let Some(fragments) = value.as_mapping() else {
                        return Err(ThemeError::InvalidDocument {
                            message: "'fragments' must be a mapping".to_string(),
                        });
                    };
                    for (name, body) in fragments {
                        let name = name.as_str().ok_or_else(|| ThemeError::InvalidDocument {
                            message: "fragment names must be strings".to_string(),
                        })?;
                        let body = parse_body(body, name).map_err(|source| {
                            ThemeError::InvalidFragment {
                                name: name.to_string(),
                                source,
                            }
                        })?;
                        builder = builder.fragment(name, body);
                    }
                }
                branch => collect_tokens(branch, value, &mut builder.tokens)?,
            }
        }

        builder.build()
    }

    /// Reads and parses a YAML theme file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ThemeError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ThemeError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&source)
    }

    /// The identity of this theme, shared by its clones.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The version supplied by the theme source. Informational only.
    pub fn version(&self) -> u64 {
        self.inner.version
    }

    /// Looks up a token value by dotted path.
    pub fn token(&self, path: &str) -> Option<&StyleValue> {
        self.inner.tokens.get(path)
    }

    /// Looks up a component fragment by dotted path.
    pub fn fragment(&self, path: &str) -> Option<&RuleBody> {
        self.inner.fragments.get(path)
    }

    pub fn tokens(&self) -> &TokenTree {
        &self.inner.tokens
    }

    /// Fragment paths in sorted order.
    pub fn fragment_names(&self) -> impl Iterator<Item = &str> {
        self.inner.fragments.keys().map(String::as_str)
    }
}

fn collect_tokens(
    path: &str,
    value: &Value,
    out: &mut Vec<(String, StyleValue)>,
) -> Result<(), ThemeError> {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                let key = key.as_str().ok_or_else(|| ThemeError::InvalidTokenValue {
                    path: path.to_string(),
                    reason: format!("non-string key {:?}", key),
                })?;
                collect_tokens(&format!("{}.{}", path, key), child, out)?;
            }
            Ok(())
        }
        scalar => {
            let value = StyleValue::from_yaml_scalar(scalar).ok_or_else(|| {
                ThemeError::InvalidTokenValue {
                    path: path.to_string(),
                    reason: "expected a finite number or text".to_string(),
                }
            })?;
            out.push((path.to_string(), value));
            Ok(())
        }
    }
}

/// Builder for [`Theme`].
#[derive(Debug)]
pub struct ThemeBuilder {
    name: String,
    version: u64,
    tokens: Vec<(String, StyleValue)>,
    fragments: Vec<(String, RuleBody)>,
}

impl ThemeBuilder {
    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Sets a token value at a dotted path.
    pub fn token(mut self, path: &str, value: impl Into<StyleValue>) -> Self {
        self.tokens.push((path.to_string(), value.into()));
        self
    }

    /// Publishes a component fragment under a dotted path.
    pub fn fragment(mut self, path: &str, body: RuleBody) -> Self {
        self.fragments.push((path.to_string(), body));
        self
    }

    /// Validates and publishes the theme with a fresh identity.
    ///
    /// # Errors
    ///
    /// Fails on malformed or conflicting token paths, NaN or infinite token
    /// values, duplicate fragment paths, fragments that splice
    /// template-local fragments, and fragment cycles.
    pub fn build(self) -> Result<Theme, ThemeError> {
        let mut tokens = TokenTree::new();
        for (path, value) in self.tokens {
            if !value.is_finite() {
                return Err(ThemeError::InvalidTokenValue {
                    path,
                    reason: "numbers must be finite".to_string(),
                });
            }
            tokens.insert(&path, value)?;
        }

        let mut fragments = BTreeMap::new();
        for (path, body) in self.fragments {
            body.check_finite(&path)
                .map_err(|source| ThemeError::InvalidFragment {
                    name: path.clone(),
                    source,
                })?;
            if fragments.contains_key(&path) {
                return Err(ThemeError::DuplicateFragment { path });
            }
            fragments.insert(path, body);
        }
        check_fragments(&fragments)?;

        Ok(Theme {
            inner: Arc::new(ThemeData {
                id: next_id(),
                name: self.name,
                version: self.version,
                tokens,
                fragments,
            }),
        })
    }
}

fn check_fragments(fragments: &BTreeMap<String, RuleBody>) -> Result<(), ThemeError> {
    for (owner, body) in fragments {
        let mut local = None;
        body.for_each_splice(&mut |fragment| {
            if let FragmentRef::Local(name) = fragment {
                local.get_or_insert_with(|| name.clone());
            }
        });
        if let Some(name) = local {
            return Err(ThemeError::LocalSplice {
                fragment: owner.clone(),
                name,
            });
        }
    }

    fn visit<'a>(
        name: &'a str,
        fragments: &'a BTreeMap<String, RuleBody>,
        path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<(), ThemeError> {
        if let Some(start) = path.iter().position(|n| *n == name) {
            let mut cycle: Vec<String> =
                path[start..].iter().map(|n| format!("...${}", n)).collect();
            cycle.push(format!("...${}", name));
            return Err(ThemeError::FragmentCycle { path: cycle });
        }
        if done.contains(name) {
            return Ok(());
        }
        // Splices of missing theme fragments surface at resolution time.
        let Some(body) = fragments.get(name) else {
            return Ok(());
        };

        path.push(name);
        let mut children = Vec::new();
        body.for_each_splice(&mut |fragment| {
            if let FragmentRef::Theme(child) = fragment {
                children.push(child.as_str());
            }
        });
        for child in children {
            visit(child, fragments, path, done)?;
        }
        path.pop();
        done.insert(name);
        Ok(())
    }

    let mut done = HashSet::new();
    for name in fragments.keys() {
        visit(name, fragments, &mut Vec::new(), &mut done)?;
    }
    Ok(())
}
