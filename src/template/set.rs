//! Rule template sets.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use super::body::{FragmentRef, RuleBody};
use super::error::TemplateError;
use super::yaml;
use crate::identity::next_id;

/// A static set of named rule bodies plus the fragments they splice.
///
/// Built once (usually next to the UI component that uses it) and never
/// mutated. Cloning is cheap and preserves identity, which the resolver
/// uses as half of its cache key.
///
/// # Example
///
/// ```rust
/// use themed_rules::{RuleBody, RuleTemplateSet};
///
/// let template = RuleTemplateSet::builder()
///     .fragment("button", RuleBody::new().set("cursor", "pointer").set("borderRadius", "6px"))
///     .rule("viz-btn-item", RuleBody::new().splice("button").set("width", "32px"))
///     .rule("viz-context", RuleBody::new().set("width", "100%"))
///     .build();
///
/// assert!(template.validate().is_ok());
/// assert_eq!(template.rule_names().collect::<Vec<_>>(), vec!["viz-btn-item", "viz-context"]);
/// ```
#[derive(Debug, Clone)]
pub struct RuleTemplateSet {
    inner: Arc<TemplateData>,
}

#[derive(Debug)]
struct TemplateData {
    id: u64,
    rules: Vec<(String, RuleBody)>,
    fragments: Vec<(String, RuleBody)>,
}

impl RuleTemplateSet {
    /// Starts building a template set.
    pub fn builder() -> RuleTemplateSetBuilder {
        RuleTemplateSetBuilder::default()
    }

    /// Parses a template set from YAML.
    ///
    /// ```yaml
    /// fragments:
    ///   button:
    ///     cursor: pointer
    /// rules:
    ///   viz-btn-item:
    ///     ...button: ~
    ///     background: $components.layerMenu.menuItemBg
    ///     "&:hover":
    ///       opacity: 0.8
    /// ```
    pub fn from_yaml(source: &str) -> Result<Self, TemplateError> {
        yaml::parse_template_set(source)
    }

    /// Reads and parses a YAML template file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| TemplateError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&source)
    }

    /// The identity of this set, shared by its clones.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Rule names in declaration order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.inner.rules.iter().map(|(name, _)| name.as_str())
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &RuleBody)> {
        self.inner.rules.iter().map(|(name, body)| (name.as_str(), body))
    }

    /// Looks up a rule body by name.
    pub fn rule(&self, name: &str) -> Option<&RuleBody> {
        self.inner
            .rules
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, body)| body)
    }

    /// Looks up a template fragment by name.
    pub fn fragment(&self, name: &str) -> Option<&RuleBody> {
        self.inner
            .fragments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, body)| body)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.inner.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.rules.is_empty()
    }

    /// Checks the structural invariants that do not depend on a theme.
    ///
    /// Reports the first of: a duplicate rule or fragment name, a NaN or
    /// infinite literal, a splice of an undeclared template fragment, or a
    /// cycle among template fragments.
    /// The resolver runs this before evaluating a template.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let mut seen = HashSet::new();
        for (name, _) in &self.inner.rules {
            if !seen.insert(name.as_str()) {
                return Err(TemplateError::DuplicateRule { name: name.clone() });
            }
        }

        let mut fragments: HashMap<&str, &RuleBody> = HashMap::new();
        for (name, body) in &self.inner.fragments {
            if fragments.insert(name.as_str(), body).is_some() {
                return Err(TemplateError::DuplicateFragment { name: name.clone() });
            }
        }

        let owners = self
            .inner
            .rules
            .iter()
            .chain(self.inner.fragments.iter());
        for (owner, body) in owners {
            body.check_finite(owner)?;

            let mut missing = None;
            body.for_each_splice(&mut |fragment| {
                if let FragmentRef::Local(name) = fragment {
                    if missing.is_none() && !fragments.contains_key(name.as_str()) {
                        missing = Some(name.clone());
                    }
                }
            });
            if let Some(name) = missing {
                return Err(TemplateError::UnknownFragment {
                    name,
                    referenced_from: owner.clone(),
                });
            }
        }

        // Depth-first walk over local splices; `path` is the active chain.
        fn visit<'a>(
            name: &'a str,
            fragments: &HashMap<&'a str, &'a RuleBody>,
            path: &mut Vec<&'a str>,
            done: &mut HashSet<&'a str>,
        ) -> Result<(), TemplateError> {
            if let Some(start) = path.iter().position(|n| *n == name) {
                let mut cycle: Vec<String> =
                    path[start..].iter().map(|n| format!("...{}", n)).collect();
                cycle.push(format!("...{}", name));
                return Err(TemplateError::SpliceCycle { path: cycle });
            }
            if done.contains(name) {
                return Ok(());
            }
            let Some(&body) = fragments.get(name) else {
                return Ok(());
            };

            path.push(name);
            let mut children = Vec::new();
            body.for_each_splice(&mut |fragment| {
                if let FragmentRef::Local(child) = fragment {
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
        for (name, _) in &self.inner.fragments {
            visit(name, &fragments, &mut Vec::new(), &mut done)?;
        }

        Ok(())
    }
}

/// Builder for [`RuleTemplateSet`].
///
/// Building never fails; structural problems are reported by
/// [`RuleTemplateSet::validate`] and at resolution time.
#[derive(Debug, Default)]
pub struct RuleTemplateSetBuilder {
    rules: Vec<(String, RuleBody)>,
    fragments: Vec<(String, RuleBody)>,
}

impl RuleTemplateSetBuilder {
    /// Declares a named rule.
    pub fn rule(mut self, name: &str, body: RuleBody) -> Self {
        self.rules.push((name.to_string(), body));
        self
    }

    /// Declares a fragment that rules (or other fragments) can splice.
    pub fn fragment(mut self, name: &str, body: RuleBody) -> Self {
        self.fragments.push((name.to_string(), body));
        self
    }

    /// Publishes the template set with a fresh identity.
    pub fn build(self) -> RuleTemplateSet {
        RuleTemplateSet {
            inner: Arc::new(TemplateData {
                id: next_id(),
                rules: self.rules,
                fragments: self.fragments,
            }),
        }
    }
}
