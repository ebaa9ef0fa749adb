//! Nested design-token storage.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::ThemeError;
use crate::value::StyleValue;

/// A node in the token tree: a value or a named group of nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TokenNode {
    Value(StyleValue),
    Group(TokenTree),
}

/// Design tokens addressed by dotted paths (`tokens.padding.space2`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TokenTree {
    nodes: BTreeMap<String, TokenNode>,
}

impl TokenTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` at `path`, creating groups along the way.
    ///
    /// Setting an existing value path replaces the value.
    ///
    /// # Errors
    ///
    /// Fails if the path is malformed or would turn a value into a group
    /// (or a group into a value).
    pub fn insert(&mut self, path: &str, value: StyleValue) -> Result<(), ThemeError> {
        let segments: Vec<&str> = path.split('.').collect();
        if path.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(ThemeError::InvalidTokenPath {
                path: path.to_string(),
            });
        }
        let conflict = || ThemeError::TokenConflict {
            path: path.to_string(),
        };

        let (last, parents) = segments
            .split_last()
            .ok_or_else(|| ThemeError::InvalidTokenPath {
                path: path.to_string(),
            })?;

        let mut nodes = &mut self.nodes;
        for segment in parents {
            nodes = match nodes
                .entry(segment.to_string())
                .or_insert_with(|| TokenNode::Group(TokenTree::new()))
            {
                TokenNode::Group(group) => &mut group.nodes,
                TokenNode::Value(_) => return Err(conflict()),
            };
        }

        if matches!(nodes.get(*last), Some(TokenNode::Group(_))) {
            return Err(conflict());
        }
        nodes.insert(last.to_string(), TokenNode::Value(value));
        Ok(())
    }

    /// Looks up the value at `path`. Groups are not values.
    pub fn get(&self, path: &str) -> Option<&StyleValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.nodes.get(first)?;
        for segment in segments {
            match node {
                TokenNode::Group(group) => node = group.nodes.get(segment)?,
                TokenNode::Value(_) => return None,
            }
        }
        match node {
            TokenNode::Value(value) => Some(value),
            TokenNode::Group(_) => None,
        }
    }

    /// Number of leaf values in the tree.
    pub fn len(&self) -> usize {
        self.nodes
            .values()
            .map(|node| match node {
                TokenNode::Value(_) => 1,
                TokenNode::Group(group) => group.len(),
            })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visits every leaf with its dotted path, in path order.
    pub fn for_each(&self, mut f: impl FnMut(&str, &StyleValue)) {
        fn walk(tree: &TokenTree, prefix: &str, f: &mut dyn FnMut(&str, &StyleValue)) {
            for (key, node) in &tree.nodes {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                match node {
                    TokenNode::Value(value) => f(&path, value),
                    TokenNode::Group(group) => walk(group, &path, f),
                }
            }
        }
        walk(self, "", &mut f);
    }
}
