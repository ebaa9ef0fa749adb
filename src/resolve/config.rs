//! Resolver configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use crate::value::StyleValue;

/// Value substituted for an unresolvable property in lenient mode.
pub const DEFAULT_FALLBACK_VALUE: &str = "inherit";

/// Default number of resolved tables kept per resolver.
///
/// Theme variants are few (light and dark, maybe a high-contrast one), so
/// a small bound is enough to keep every live variant cached.
pub const DEFAULT_CACHE_CAPACITY: usize = 4;

/// What to do when a rule reads a theme path that does not exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Abort the whole resolution with [`ResolveError::MissingTokenPath`](crate::ResolveError::MissingTokenPath).
    #[default]
    Strict,
    /// Substitute the fallback for that property, record it, and continue.
    Lenient,
}

/// Resolver settings.
///
/// # Example
///
/// ```rust
/// use themed_rules::{ResolverConfig, Strictness};
///
/// let config = ResolverConfig::from_yaml("strictness: lenient\ncapacity: 2\n").unwrap();
/// assert_eq!(config.strictness, Strictness::Lenient);
/// assert_eq!(config.capacity, 2);
/// assert_eq!(config.fallback.to_string(), "inherit");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    pub strictness: Strictness,
    /// Maximum number of cached tables; at least one is always kept.
    pub capacity: usize,
    /// Lenient-mode substitute for unresolvable properties.
    pub fallback: StyleValue,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strictness: Strictness::default(),
            capacity: DEFAULT_CACHE_CAPACITY,
            fallback: StyleValue::from(DEFAULT_FALLBACK_VALUE),
        }
    }
}

impl ResolverConfig {
    /// Strict configuration with default capacity.
    pub fn strict() -> Self {
        Self::default()
    }

    /// Lenient configuration with the default fallback.
    pub fn lenient() -> Self {
        Self {
            strictness: Strictness::Lenient,
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<StyleValue>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Parses configuration from YAML; missing fields take their defaults.
    ///
    /// A NaN or infinite `fallback` is rejected.
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(source).map_err(|e| ConfigError::InvalidDocument {
                message: e.to_string(),
            })?;
        if !config.fallback.is_finite() {
            return Err(ConfigError::InvalidDocument {
                message: format!(
                    "fallback must be a finite number or text, got {}",
                    config.fallback
                ),
            });
        }
        Ok(config)
    }

    /// Reads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&source)
    }
}
