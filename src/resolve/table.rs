//! Resolved rule tables handed to the renderer.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::StyleValue;

/// A resolved entry: a concrete value, or a conditional block keyed by its selector.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedEntry {
    Value(StyleValue),
    Block(ResolvedBody),
}

impl Serialize for ResolvedEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ResolvedEntry::Value(value) => value.serialize(serializer),
            ResolvedEntry::Block(body) => body.serialize(serializer),
        }
    }
}

/// A fully evaluated property mapping.
///
/// Properties and nested selector blocks share one ordered key space.
/// Inserting an existing key replaces its entry in place, so a key keeps
/// the position of its first declaration and the value of its last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedBody {
    entries: Vec<(String, ResolvedEntry)>,
}

impl ResolvedBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry; later declarations win.
    pub(crate) fn insert(&mut self, key: &str, entry: ResolvedEntry) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((key.to_string(), entry)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ResolvedEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    /// Returns the concrete value of a property.
    pub fn value(&self, property: &str) -> Option<&StyleValue> {
        match self.get(property)? {
            ResolvedEntry::Value(value) => Some(value),
            ResolvedEntry::Block(_) => None,
        }
    }

    /// Returns the nested block under a selector.
    pub fn block(&self, selector: &str) -> Option<&ResolvedBody> {
        match self.get(selector)? {
            ResolvedEntry::Block(body) => Some(body),
            ResolvedEntry::Value(_) => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Plain properties only, in order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &StyleValue)> {
        self.entries.iter().filter_map(|(k, e)| match e {
            ResolvedEntry::Value(value) => Some((k.as_str(), value)),
            ResolvedEntry::Block(_) => None,
        })
    }

    /// Nested blocks only, in order.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &ResolvedBody)> {
        self.entries.iter().filter_map(|(k, e)| match e {
            ResolvedEntry::Block(body) => Some((k.as_str(), body)),
            ResolvedEntry::Value(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ResolvedBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, entry) in &self.entries {
            map.serialize_entry(key, entry)?;
        }
        map.end()
    }
}

/// A property that received the fallback value in lenient mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedProperty {
    /// The rule being resolved.
    pub rule: String,
    /// Location inside the rule, nested selectors joined with ` > `.
    pub property: String,
    /// The theme path that could not be found.
    pub path: String,
}

/// The resolved rules for one `(theme, template set)` pair.
///
/// Rule names appear exactly once, in template declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRuleTable {
    theme_id: u64,
    template_id: u64,
    rules: Vec<(String, ResolvedBody)>,
    index: HashMap<String, usize>,
    degraded: Vec<DegradedProperty>,
}

impl ResolvedRuleTable {
    pub(crate) fn new(
        theme_id: u64,
        template_id: u64,
        rules: Vec<(String, ResolvedBody)>,
        degraded: Vec<DegradedProperty>,
    ) -> Self {
        let index = rules
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        Self {
            theme_id,
            template_id,
            rules,
            index,
            degraded,
        }
    }

    /// Returns a rule by name.
    pub fn get(&self, rule: &str) -> Option<&ResolvedBody> {
        self.index.get(rule).map(|&i| &self.rules[i].1)
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.index.contains_key(rule)
    }

    /// Rule names in template declaration order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResolvedBody)> {
        self.rules.iter().map(|(name, body)| (name.as_str(), body))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Properties that fell back in lenient mode.
    pub fn degraded(&self) -> &[DegradedProperty] {
        &self.degraded
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }

    /// Identity of the theme this table was resolved against.
    pub fn theme_id(&self) -> u64 {
        self.theme_id
    }

    /// Identity of the template set this table was resolved from.
    pub fn template_id(&self) -> u64 {
        self.template_id
    }
}

impl Serialize for ResolvedRuleTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for (name, body) in &self.rules {
            map.serialize_entry(name, body)?;
        }
        map.end()
    }
}
