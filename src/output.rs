//! Rendering resolved tables into text.
//!
//! JSON and YAML are straight serializations of the table. CSS output is
//! the shape a stylesheet injector would emit: each rule becomes a class
//! selector, camelCase property names become kebab-case, and `&` in a
//! nested selector stands for the owning rule's class.

use std::str::FromStr;

use thiserror::Error;

use crate::resolve::{ResolvedBody, ResolvedRuleTable};

/// Text representation for a resolved table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Css,
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "css" => Ok(OutputFormat::Css),
            _ => Err(OutputError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("unknown output format '{0}'")]
    UnknownFormat(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ResolvedRuleTable {
    /// Renders the table in the requested format.
    pub fn render(&self, format: OutputFormat) -> Result<String, OutputError> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(self)?),
            OutputFormat::Css => Ok(self.to_css()),
        }
    }

    /// Renders the table as a stylesheet.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (name, body) in self.iter() {
            let class = format!(".{}", name);
            write_block(&mut out, &class, body);
        }
        out
    }
}

/// Writes `selector { ... }` followed by the blocks nested inside `body`.
///
/// Nested blocks are flattened into their own top-level blocks.
fn write_block(out: &mut String, selector: &str, body: &ResolvedBody) {
    if body.values().next().is_some() {
        out.push_str(&format!("{} {{\n", selector));
        for (property, value) in body.values() {
            out.push_str(&format!("  {}: {};\n", kebab_case(property), value));
        }
        out.push_str("}\n");
    }
    for (nested, block) in body.blocks() {
        write_block(out, &nested_selector(selector, nested), block);
    }
}

fn nested_selector(parent: &str, selector: &str) -> String {
    if selector.contains('&') {
        selector.replace('&', parent)
    } else {
        format!("{} {}", parent, selector)
    }
}

/// `borderBottom` -> `border-bottom`. Custom properties are left alone.
fn kebab_case(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let mut out = String::with_capacity(property.len() + 4);
    for c in property.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
