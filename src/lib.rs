//! Theme-driven style rule resolution.
//!
//! UI components describe their styles as *rule templates*: named property
//! mappings whose values may read design tokens and component fragments
//! from a theme. This crate turns a template set plus a theme into a
//! concrete, renderer-ready rule table, and memoizes the result so that a
//! component re-rendering under the same theme gets the same table back
//! without evaluating anything.
//!
//! # Concepts
//!
//! - [`Theme`]: immutable tokens (`tokens.padding.space0`) and fragments
//!   (`util.flexCenterCenter`), addressed by dotted paths
//! - [`RuleTemplateSet`]: rules and local fragments, each a [`RuleBody`]
//! - [`Declaration`]: a literal, a `$path` theme reference, or text with
//!   `${path}` interpolations
//! - [`Resolver`]: evaluates templates against themes, with a bounded cache
//!   keyed by theme and template identity
//! - [`ResolvedRuleTable`]: the output, one [`ResolvedBody`] per rule
//!
//! # Precedence
//!
//! A rule body is evaluated in declaration order. Splices (`...fragment`)
//! contribute their properties at the point where they appear, and when
//! two entries produce the same key the later one wins. Nested selector
//! blocks such as `&:hover` are opaque: their bodies are resolved with the
//! same rules, their selectors are passed through untouched.
//!
//! # Missing tokens
//!
//! In [`Strictness::Strict`] mode (the default) a reference to a path the
//! theme does not have aborts the resolution and nothing is cached. In
//! [`Strictness::Lenient`] mode the property receives the configured
//! fallback and is listed in [`ResolvedRuleTable::degraded`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use themed_rules::{OutputFormat, Resolver, RuleTemplateSet, StyleValue, Theme};
//!
//! let theme = Theme::from_yaml(r##"
//! name: dark
//! tokens:
//!   padding:
//!     space2: 16px
//!   divider:
//!     color:
//!       light: "#383B45"
//! fragments:
//!   util.flexCenterCenter:
//!     display: flex
//!     justifyContent: center
//!     alignItems: center
//! "##).unwrap();
//!
//! let template = RuleTemplateSet::from_yaml(r##"
//! rules:
//!   viz-context-info:
//!     ...$util.flexCenterCenter: ~
//!     paddingLeft: $tokens.padding.space2
//!     borderBottom: 1px solid ${tokens.divider.color.light}
//!     "&:hover":
//!       opacity: 0.8
//! "##).unwrap();
//!
//! let resolver = Resolver::new();
//! let table = resolver.resolve(&theme, &template).unwrap();
//! let info = table.get("viz-context-info").unwrap();
//!
//! assert_eq!(info.value("display"), Some(&StyleValue::from("flex")));
//! assert_eq!(info.value("borderBottom"), Some(&StyleValue::from("1px solid #383B45")));
//! assert_eq!(info.block("&:hover").unwrap().value("opacity"), Some(&StyleValue::Float(0.8)));
//!
//! // Same theme, same template: the cached table, nothing re-evaluated.
//! let again = resolver.resolve(&theme, &template).unwrap();
//! assert!(Arc::ptr_eq(&table, &again));
//! assert_eq!(resolver.evaluation_count(), 1);
//!
//! let css = table.render(OutputFormat::Css).unwrap();
//! assert!(css.contains(".viz-context-info:hover {"));
//! ```

mod identity;
mod output;
pub mod resolve;
mod styles;
pub mod template;
pub mod theme;
mod value;

pub use output::{OutputError, OutputFormat};
pub use resolve::{
    ConfigError, DegradedProperty, ResolveError, ResolvedBody, ResolvedEntry, ResolvedRuleTable,
    Resolver, ResolverConfig, Strictness, DEFAULT_CACHE_CAPACITY, DEFAULT_FALLBACK_VALUE,
};
pub use styles::ThemedStyles;
pub use template::{
    Declaration, Entry, FragmentRef, Interpolation, RuleBody, RuleTemplateSet,
    RuleTemplateSetBuilder, Segment, TemplateError, TokenPath,
};
pub use theme::{
    detect_color_mode, set_theme_detector, AdaptiveTheme, ColorMode, Theme, ThemeBuilder,
    ThemeChoice, ThemeError, TokenNode, TokenTree,
};
pub use value::StyleValue;
