//! The style resolver: evaluates template sets against themes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::cache::{CacheKey, TableCache};
use super::config::{ResolverConfig, Strictness};
use super::error::ResolveError;
use super::table::{DegradedProperty, ResolvedBody, ResolvedEntry, ResolvedRuleTable};
use crate::template::{
    Declaration, Entry, FragmentRef, RuleBody, RuleTemplateSet, Segment, TemplateError,
};
use crate::theme::{Theme, ThemeChoice};
use crate::value::StyleValue;

/// Resolves rule template sets against themes, memoizing the results.
///
/// A resolver is cheap to share between threads (`&Resolver` is all that
/// [`resolve`](Resolver::resolve) needs). Its cache is keyed by theme and
/// template identity; repeated calls with the same pair return the same
/// `Arc` without evaluating any rule body.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use themed_rules::{Resolver, RuleBody, RuleTemplateSet, StyleValue, Theme};
///
/// let theme = Theme::builder("dark")
///     .token("tokens.padding.space0", 0)
///     .build()
///     .unwrap();
/// let template = RuleTemplateSet::builder()
///     .rule(
///         "viz-container",
///         RuleBody::new()
///             .token("padding", "tokens.padding.space0")
///             .set("minWidth", "244px"),
///     )
///     .build();
///
/// let resolver = Resolver::new();
/// let table = resolver.resolve(&theme, &template).unwrap();
/// let container = table.get("viz-container").unwrap();
/// assert_eq!(container.value("padding"), Some(&StyleValue::Integer(0)));
/// assert_eq!(container.value("minWidth"), Some(&StyleValue::from("244px")));
///
/// let again = resolver.resolve(&theme, &template).unwrap();
/// assert!(Arc::ptr_eq(&table, &again));
/// ```
pub struct Resolver {
    config: ResolverConfig,
    cache: TableCache,
    evaluations: AtomicUsize,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("config", &self.config)
            .field("cached", &self.cache.len())
            .field("evaluations", &self.evaluation_count())
            .finish()
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Creates a strict resolver with the default cache capacity.
    pub fn new() -> Self {
        Self::with_config(ResolverConfig::default())
    }

    pub fn with_config(config: ResolverConfig) -> Self {
        Self {
            cache: TableCache::new(config.capacity),
            config,
            evaluations: AtomicUsize::new(0),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves `template` against `theme`.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::MalformedTemplate`] for duplicate names, unknown
    ///   template fragments and splice cycles
    /// - [`ResolveError::MissingTokenPath`] in strict mode when a theme path
    ///   does not exist; no partial table is produced or cached
    /// - [`ResolveError::CacheInconsistency`] if a concurrent resolution of
    ///   the same pair committed a different table
    pub fn resolve(
        &self,
        theme: &Theme,
        template: &RuleTemplateSet,
    ) -> Result<Arc<ResolvedRuleTable>, ResolveError> {
        let key = CacheKey {
            theme: theme.id(),
            template: template.id(),
        };

        if let Some(table) = self.cache.get(key) {
            tracing::debug!(theme = theme.name(), template_id = key.template, "style cache hit");
            return Ok(table);
        }
        tracing::debug!(theme = theme.name(), template_id = key.template, "style cache miss");

        template.validate()?;

        let mut evaluation = Evaluation {
            theme,
            template,
            config: &self.config,
            rule: "",
            location: Vec::new(),
            splices: Vec::new(),
            degraded: Vec::new(),
        };

        let mut rules = Vec::with_capacity(template.len());
        for (name, body) in template.rules() {
            self.evaluations.fetch_add(1, Ordering::Relaxed);
            evaluation.rule = name;
            let mut resolved = ResolvedBody::new();
            evaluation.eval_body(body, &mut resolved)?;
            rules.push((name.to_string(), resolved));
        }

        let table = Arc::new(ResolvedRuleTable::new(
            key.theme,
            key.template,
            rules,
            evaluation.degraded,
        ));
        let table = self.cache.commit(key, table)?;
        tracing::debug!(
            theme = theme.name(),
            rules = table.len(),
            degraded = table.degraded().len(),
            "resolved rule table"
        );
        Ok(table)
    }

    /// Resolves against a fixed or adaptive theme choice.
    pub fn resolve_choice<'a>(
        &self,
        choice: impl Into<ThemeChoice<'a>>,
        template: &RuleTemplateSet,
    ) -> Result<Arc<ResolvedRuleTable>, ResolveError> {
        self.resolve(choice.into().resolve(), template)
    }

    /// Number of rule bodies evaluated so far. Cache hits do not count.
    pub fn evaluation_count(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    /// Returns `true` if a table for this pair is cached.
    pub fn is_cached(&self, theme: &Theme, template: &RuleTemplateSet) -> bool {
        self.cache.contains(CacheKey {
            theme: theme.id(),
            template: template.id(),
        })
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// State for resolving one table.
struct Evaluation<'a> {
    theme: &'a Theme,
    template: &'a RuleTemplateSet,
    config: &'a ResolverConfig,
    rule: &'a str,
    /// Selector chain of the entry being evaluated.
    location: Vec<String>,
    /// Fragments currently being spliced, outermost first.
    splices: Vec<FragmentRef>,
    degraded: Vec<DegradedProperty>,
}

/// A theme path that could not be found.
struct Missing(String);

impl<'a> Evaluation<'a> {
    /// Evaluates `body` into `out` in declaration order.
    ///
    /// Splices evaluate straight into `out`, which is what gives later
    /// declarations precedence over earlier ones across splice boundaries.
    fn eval_body(&mut self, body: &'a RuleBody, out: &mut ResolvedBody) -> Result<(), ResolveError> {
        for entry in body.entries() {
            match entry {
                Entry::Property { name, value } => {
                    let resolved = match self.eval_declaration(value) {
                        Ok(resolved) => resolved,
                        Err(Missing(path)) => self.substitute(name, path)?,
                    };
                    out.insert(name, ResolvedEntry::Value(resolved));
                }
                Entry::Nested { selector, body } => {
                    self.location.push(selector.clone());
                    let mut nested = ResolvedBody::new();
                    let result = self.eval_body(body, &mut nested);
                    self.location.pop();
                    result?;
                    out.insert(selector, ResolvedEntry::Block(nested));
                }
                Entry::Splice(fragment) => self.splice(fragment, out)?,
            }
        }
        Ok(())
    }

    fn eval_declaration(&self, declaration: &Declaration) -> Result<StyleValue, Missing> {
        match declaration {
            Declaration::Literal(value) => Ok(value.clone()),
            Declaration::Token(path) => self
                .theme
                .token(path.as_str())
                .cloned()
                .ok_or_else(|| Missing(path.to_string())),
            Declaration::Interpolated(interpolation) => {
                let mut text = String::new();
                for segment in interpolation.segments() {
                    match segment {
                        Segment::Text(literal) => text.push_str(literal),
                        Segment::Token(path) => {
                            let value = self
                                .theme
                                .token(path.as_str())
                                .ok_or_else(|| Missing(path.to_string()))?;
                            text.push_str(&value.to_string());
                        }
                    }
                }
                Ok(StyleValue::Text(text))
            }
        }
    }

    fn splice(&mut self, fragment: &'a FragmentRef, out: &mut ResolvedBody) -> Result<(), ResolveError> {
        if let Some(start) = self.splices.iter().position(|f| f == fragment) {
            let mut path: Vec<String> =
                self.splices[start..].iter().map(|f| f.to_string()).collect();
            path.push(fragment.to_string());
            return Err(TemplateError::SpliceCycle { path }.into());
        }

        let body = match fragment {
            FragmentRef::Local(name) => {
                self.template
                    .fragment(name)
                    .ok_or_else(|| TemplateError::UnknownFragment {
                        name: name.clone(),
                        referenced_from: self.rule.to_string(),
                    })?
            }
            FragmentRef::Theme(path) => match self.theme.fragment(path.as_str()) {
                Some(body) => body,
                None => {
                    self.report_missing(&fragment.to_string(), path.to_string())?;
                    return Ok(());
                }
            },
        };

        self.splices.push(fragment.clone());
        let result = self.eval_body(body, out);
        self.splices.pop();
        result
    }

    /// Handles a missing path for `property`: an error in strict mode, the
    /// configured fallback in lenient mode.
    fn substitute(&mut self, property: &str, path: String) -> Result<StyleValue, ResolveError> {
        self.report_missing(property, path)?;
        Ok(self.config.fallback.clone())
    }

    fn report_missing(&mut self, property: &str, path: String) -> Result<(), ResolveError> {
        let mut location = self.location.clone();
        location.push(property.to_string());
        let property = location.join(" > ");

        match self.config.strictness {
            Strictness::Strict => Err(ResolveError::MissingTokenPath {
                rule: self.rule.to_string(),
                property,
                path,
            }),
            Strictness::Lenient => {
                tracing::warn!(
                    rule = self.rule,
                    property = property.as_str(),
                    path = path.as_str(),
                    theme = self.theme.name(),
                    "missing theme path, using fallback"
                );
                self.degraded.push(DegradedProperty {
                    rule: self.rule.to_string(),
                    property,
                    path,
                });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{AdaptiveTheme, ColorMode};

    fn theme() -> Theme {
        Theme::builder("dark")
            .token("tokens.padding.space", "8px")
            .token("tokens.padding.space2", "16px")
            .token("tokens.divider.color.light", "#383B45")
            .token("tokens.width.max", "216px")
            .token("tokens.width.min", "150px")
            .token("components.layerMenu.bgColor", "#282B36")
            .fragment(
                "util.flexCenterCenter",
                RuleBody::new()
                    .set("display", "flex")
                    .set("justifyContent", "center")
                    .set("alignItems", "center"),
            )
            .build()
            .unwrap()
    }

    fn single(rule: RuleBody) -> RuleTemplateSet {
        RuleTemplateSet::builder().rule("r", rule).build()
    }

    #[test]
    fn test_literals_and_tokens() {
        let template = single(
            RuleBody::new()
                .set("flex", 1)
                .set("height", "268px")
                .token("paddingLeft", "tokens.padding.space2"),
        );
        let table = Resolver::new().resolve(&theme(), &template).unwrap();
        let body = table.get("r").unwrap();

        assert_eq!(body.value("flex"), Some(&StyleValue::Integer(1)));
        assert_eq!(body.value("height"), Some(&StyleValue::from("268px")));
        assert_eq!(body.value("paddingLeft"), Some(&StyleValue::from("16px")));
    }

    #[test]
    fn test_interpolation() {
        let template = single(RuleBody::new().set(
            "borderBottom",
            Declaration::parse("1px solid ${tokens.divider.color.light}").unwrap(),
        ));
        let table = Resolver::new().resolve(&theme(), &template).unwrap();
        assert_eq!(
            table.get("r").unwrap().value("borderBottom"),
            Some(&StyleValue::from("1px solid #383B45"))
        );
    }

    #[test]
    fn test_splice_local_overrides_spliced() {
        let template = RuleTemplateSet::builder()
            .fragment("f", RuleBody::new().set("a", 2).set("b", 3))
            .rule("r", RuleBody::new().splice("f").set("a", 1))
            .build();
        let table = Resolver::new().resolve(&theme(), &template).unwrap();
        let body = table.get("r").unwrap();

        assert_eq!(body.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(body.value("a"), Some(&StyleValue::Integer(1)));
        assert_eq!(body.value("b"), Some(&StyleValue::Integer(3)));
    }

    #[test]
    fn test_splice_without_override() {
        let template = RuleTemplateSet::builder()
            .fragment("f", RuleBody::new().set("a", 2).set("b", 3))
            .rule("r", RuleBody::new().splice("f"))
            .build();
        let table = Resolver::new().resolve(&theme(), &template).unwrap();
        let body = table.get("r").unwrap();

        assert_eq!(body.value("a"), Some(&StyleValue::Integer(2)));
        assert_eq!(body.value("b"), Some(&StyleValue::Integer(3)));
    }

    #[test]
    fn test_splice_overrides_earlier_local() {
        let template = RuleTemplateSet::builder()
            .fragment("f", RuleBody::new().set("a", 2))
            .rule("r", RuleBody::new().set("a", 1).splice("f"))
            .build();
        let table = Resolver::new().resolve(&theme(), &template).unwrap();
        assert_eq!(
            table.get("r").unwrap().value("a"),
            Some(&StyleValue::Integer(2))
        );
    }

    #[test]
    fn test_theme_fragment_splice() {
        let template = single(
            RuleBody::new()
                .set("cursor", "pointer")
                .splice_theme("util.flexCenterCenter")
                .set("display", "inline-flex"),
        );
        let table = Resolver::new().resolve(&theme(), &template).unwrap();
        let body = table.get("r").unwrap();

        assert_eq!(
            body.keys().collect::<Vec<_>>(),
            vec!["cursor", "display", "justifyContent", "alignItems"]
        );
        assert_eq!(body.value("display"), Some(&StyleValue::from("inline-flex")));
    }

    #[test]
    fn test_nested_blocks_resolve_independently() {
        let template = single(
            RuleBody::new()
                .nest("&[data-width=\"max\"]", RuleBody::new().token("width", "tokens.width.max"))
                .nest("&[data-width=\"min\"]", RuleBody::new().token("width", "tokens.width.min"))
                .set("height", "34px"),
        );
        let table = Resolver::new().resolve(&theme(), &template).unwrap();
        let body = table.get("r").unwrap();

        assert_eq!(
            body.block("&[data-width=\"max\"]").unwrap().value("width"),
            Some(&StyleValue::from("216px"))
        );
        assert_eq!(
            body.block("&[data-width=\"min\"]").unwrap().value("width"),
            Some(&StyleValue::from("150px"))
        );
        assert_eq!(body.value("height"), Some(&StyleValue::from("34px")));
    }

    #[test]
    fn test_nested_splice_inside_block() {
        let template = RuleTemplateSet::builder()
            .fragment("hover", RuleBody::new().set("opacity", 0.8))
            .rule("r", RuleBody::new().nest("&:hover", RuleBody::new().splice("hover")))
            .build();
        let table = Resolver::new().resolve(&theme(), &template).unwrap();
        assert_eq!(
            table.get("r").unwrap().block("&:hover").unwrap().value("opacity"),
            Some(&StyleValue::Float(0.8))
        );
    }

    #[test]
    fn test_cache_returns_same_table_without_evaluating() {
        let theme = theme();
        let template = RuleTemplateSet::builder()
            .rule("a", RuleBody::new().set("x", 1))
            .rule("b", RuleBody::new().set("y", 2))
            .build();
        let resolver = Resolver::new();

        let first = resolver.resolve(&theme, &template).unwrap();
        assert_eq!(resolver.evaluation_count(), 2);

        let second = resolver.resolve(&theme, &template).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.evaluation_count(), 2);
        assert!(resolver.is_cached(&theme, &template));
    }

    #[test]
    fn test_clone_of_inputs_hits_cache() {
        let theme = theme();
        let template = single(RuleBody::new().set("x", 1));
        let resolver = Resolver::new();

        let first = resolver.resolve(&theme, &template).unwrap();
        let second = resolver.resolve(&theme.clone(), &template.clone()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_token_strict() {
        let template = single(
            RuleBody::new()
                .set("width", "32px")
                .nest("&:hover", RuleBody::new().token("color", "tokens.colors.missing")),
        );
        let resolver = Resolver::new();
        let err = resolver.resolve(&theme(), &template).unwrap_err();

        assert_eq!(
            err,
            ResolveError::MissingTokenPath {
                rule: "r".into(),
                property: "&:hover > color".into(),
                path: "tokens.colors.missing".into(),
            }
        );
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn test_missing_token_lenient() {
        let template = single(
            RuleBody::new()
                .set("width", "32px")
                .token("color", "tokens.colors.missing")
                .token("padding", "tokens.padding.space"),
        );
        let resolver = Resolver::with_config(ResolverConfig::lenient());
        let table = resolver.resolve(&theme(), &template).unwrap();
        let body = table.get("r").unwrap();

        assert_eq!(body.value("color"), Some(&StyleValue::from("inherit")));
        assert_eq!(body.value("width"), Some(&StyleValue::from("32px")));
        assert_eq!(body.value("padding"), Some(&StyleValue::from("8px")));
        assert_eq!(
            table.degraded(),
            &[DegradedProperty {
                rule: "r".into(),
                property: "color".into(),
                path: "tokens.colors.missing".into(),
            }]
        );
    }

    #[test]
    fn test_lenient_records_nested_and_spliced_locations() {
        let template = RuleTemplateSet::builder()
            .fragment("hover", RuleBody::new().token("background", "tokens.colors.hoverBg"))
            .rule(
                "r",
                RuleBody::new()
                    .set("cursor", "pointer")
                    .nest(
                        "&:hover",
                        RuleBody::new()
                            .token("color", "tokens.colors.missing")
                            .splice("hover"),
                    ),
            )
            .build();
        let resolver = Resolver::with_config(ResolverConfig::lenient());
        let table = resolver.resolve(&theme(), &template).unwrap();

        let hover = table.get("r").unwrap().block("&:hover").unwrap();
        assert_eq!(hover.value("color"), Some(&StyleValue::from("inherit")));
        assert_eq!(hover.value("background"), Some(&StyleValue::from("inherit")));
        assert_eq!(
            table.degraded(),
            &[
                DegradedProperty {
                    rule: "r".into(),
                    property: "&:hover > color".into(),
                    path: "tokens.colors.missing".into(),
                },
                DegradedProperty {
                    rule: "r".into(),
                    property: "&:hover > background".into(),
                    path: "tokens.colors.hoverBg".into(),
                },
            ]
        );
    }

    #[test]
    fn test_non_finite_literal_is_malformed() {
        let template = single(RuleBody::new().set("opacity", f64::NAN));
        let err = Resolver::with_config(ResolverConfig::lenient())
            .resolve(&theme(), &template)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MalformedTemplate(TemplateError::InvalidEntry { ref key, .. }) if key == "opacity"
        ));
    }

    #[test]
    fn test_missing_interpolated_token_lenient_uses_fallback() {
        let template = single(RuleBody::new().set(
            "border",
            Declaration::parse("1px solid ${tokens.nope}").unwrap(),
        ));
        let resolver = Resolver::with_config(ResolverConfig::lenient().with_fallback("none"));
        let table = resolver.resolve(&theme(), &template).unwrap();
        assert_eq!(
            table.get("r").unwrap().value("border"),
            Some(&StyleValue::from("none"))
        );
    }

    #[test]
    fn test_missing_theme_fragment() {
        let template = single(RuleBody::new().splice_theme("util.nope").set("a", 1));

        let strict = Resolver::new().resolve(&theme(), &template).unwrap_err();
        assert_eq!(
            strict,
            ResolveError::MissingTokenPath {
                rule: "r".into(),
                property: "...$util.nope".into(),
                path: "util.nope".into(),
            }
        );

        let lenient = Resolver::with_config(ResolverConfig::lenient())
            .resolve(&theme(), &template)
            .unwrap();
        let body = lenient.get("r").unwrap();
        assert_eq!(body.keys().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(lenient.degraded().len(), 1);
    }

    #[test]
    fn test_malformed_template_is_fatal_even_when_lenient() {
        let template = RuleTemplateSet::builder()
            .fragment("a", RuleBody::new().splice("a"))
            .rule("r", RuleBody::new().splice("a"))
            .build();
        let err = Resolver::with_config(ResolverConfig::lenient())
            .resolve(&theme(), &template)
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::MalformedTemplate(TemplateError::SpliceCycle { .. })
        ));
    }

    #[test]
    fn test_duplicate_rule_is_fatal() {
        let template = RuleTemplateSet::builder()
            .rule("r", RuleBody::new())
            .rule("r", RuleBody::new())
            .build();
        let err = Resolver::new().resolve(&theme(), &template).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MalformedTemplate(TemplateError::DuplicateRule { name: "r".into() })
        );
    }

    #[test]
    fn test_lru_eviction_across_themes() {
        let template = single(RuleBody::new().set("x", 1));
        let resolver = Resolver::with_config(ResolverConfig::default().with_capacity(2));
        let a = Theme::builder("a").build().unwrap();
        let b = Theme::builder("b").build().unwrap();
        let c = Theme::builder("c").build().unwrap();

        resolver.resolve(&a, &template).unwrap();
        resolver.resolve(&b, &template).unwrap();
        resolver.resolve(&a, &template).unwrap();
        resolver.resolve(&c, &template).unwrap();

        assert_eq!(resolver.cached_len(), 2);
        assert!(resolver.is_cached(&a, &template));
        assert!(!resolver.is_cached(&b, &template));
        assert!(resolver.is_cached(&c, &template));
    }

    #[test]
    fn test_clear_cache_forces_evaluation() {
        let theme = theme();
        let template = single(RuleBody::new().set("x", 1));
        let resolver = Resolver::new();

        let first = resolver.resolve(&theme, &template).unwrap();
        resolver.clear_cache();
        let second = resolver.resolve(&theme, &template).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(resolver.evaluation_count(), 2);
    }

    #[test]
    fn test_resolve_choice_uses_variant() {
        let adaptive = AdaptiveTheme::new(
            Theme::builder("light").token("c", "#000").build().unwrap(),
            Theme::builder("dark").token("c", "#fff").build().unwrap(),
        );
        let template = single(RuleBody::new().token("color", "c"));
        let resolver = Resolver::new();

        let dark = adaptive.variant(ColorMode::Dark);
        let table = resolver.resolve_choice(dark, &template).unwrap();
        assert_eq!(
            table.get("r").unwrap().value("color"),
            Some(&StyleValue::from("#fff"))
        );
        assert_eq!(table.theme_id(), dark.id());
    }

    #[test]
    fn test_resolver_is_shareable_across_threads() {
        let theme = theme();
        let template = single(RuleBody::new().token("padding", "tokens.padding.space"));
        let resolver = Resolver::new();

        let tables: Vec<Arc<ResolvedRuleTable>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| resolver.resolve(&theme, &template).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(resolver.cached_len(), 1);
        let cached = resolver.resolve(&theme, &template).unwrap();
        for table in &tables {
            assert_eq!(**table, *cached);
        }
    }
}
