//! Resolution: turning a template set and a theme into a rule table.
//!
//! This module provides:
//!
//! - [`Resolver`]: the memoizing resolution engine
//! - [`ResolverConfig`]: strictness, cache capacity and fallback value
//! - [`ResolvedRuleTable`]: the renderer-ready output
//! - [`ResolveError`]: why a table could not be produced

mod cache;
mod config;
mod error;
mod resolver;
mod table;

pub use config::{ResolverConfig, Strictness, DEFAULT_CACHE_CAPACITY, DEFAULT_FALLBACK_VALUE};
pub use error::{ConfigError, ResolveError};
pub use resolver::Resolver;
pub use table::{DegradedProperty, ResolvedBody, ResolvedEntry, ResolvedRuleTable};
