//! Component-level styles handle.

use std::sync::Arc;

use crate::resolve::{ResolveError, ResolvedRuleTable, Resolver, ResolverConfig};
use crate::template::RuleTemplateSet;
use crate::theme::{Theme, ThemeChoice};

/// A template set bundled with its own resolver.
///
/// Built once per component; call [`resolve`](ThemedStyles::resolve) on
/// every render. Only the first render under a given theme evaluates the
/// rule bodies.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use themed_rules::{RuleBody, RuleTemplateSet, Theme, ThemedStyles};
///
/// let styles = ThemedStyles::new(
///     RuleTemplateSet::builder()
///         .rule("web-gl", RuleBody::new().set("width", "100%").set("height", "100%"))
///         .build(),
/// );
/// let theme = Theme::builder("dark").build().unwrap();
///
/// let first = styles.resolve(&theme).unwrap();
/// let second = styles.resolve(&theme).unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(styles.resolver().evaluation_count(), 1);
/// ```
#[derive(Debug)]
pub struct ThemedStyles {
    template: RuleTemplateSet,
    resolver: Resolver,
}

impl ThemedStyles {
    pub fn new(template: RuleTemplateSet) -> Self {
        Self::with_config(template, ResolverConfig::default())
    }

    pub fn with_config(template: RuleTemplateSet, config: ResolverConfig) -> Self {
        Self {
            template,
            resolver: Resolver::with_config(config),
        }
    }

    pub fn resolve(&self, theme: &Theme) -> Result<Arc<ResolvedRuleTable>, ResolveError> {
        self.resolver.resolve(theme, &self.template)
    }

    /// Resolves against a fixed theme or the current variant of an adaptive one.
    pub fn resolve_choice<'a>(
        &self,
        choice: impl Into<ThemeChoice<'a>>,
    ) -> Result<Arc<ResolvedRuleTable>, ResolveError> {
        self.resolver.resolve_choice(choice, &self.template)
    }

    pub fn template(&self) -> &RuleTemplateSet {
        &self.template
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::RuleBody;
    use crate::theme::{set_theme_detector, AdaptiveTheme, ColorMode};
    use crate::value::StyleValue;
    use serial_test::serial;

    fn styles() -> ThemedStyles {
        ThemedStyles::new(
            RuleTemplateSet::builder()
                .rule(
                    "viz-btn-item",
                    RuleBody::new()
                        .set("cursor", "pointer")
                        .token("color", "tokens.colors.fontColor4"),
                )
                .build(),
        )
    }

    fn adaptive() -> AdaptiveTheme {
        AdaptiveTheme::new(
            Theme::builder("light")
                .token("tokens.colors.fontColor4", "#4E5866")
                .build()
                .unwrap(),
            Theme::builder("dark")
                .token("tokens.colors.fontColor4", "#A6B5CC")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_theme_switch_resolves_each_variant_once() {
        let styles = styles();
        let adaptive = adaptive();

        let light = styles.resolve(adaptive.variant(ColorMode::Light)).unwrap();
        let dark = styles.resolve(adaptive.variant(ColorMode::Dark)).unwrap();
        let light_again = styles.resolve(adaptive.variant(ColorMode::Light)).unwrap();

        assert!(Arc::ptr_eq(&light, &light_again));
        assert_eq!(
            dark.get("viz-btn-item").unwrap().value("color"),
            Some(&StyleValue::from("#A6B5CC"))
        );
        assert_eq!(styles.resolver().evaluation_count(), 2);
        assert_eq!(styles.resolver().cached_len(), 2);
    }

    #[test]
    #[serial]
    fn test_resolve_choice_follows_detector() {
        let styles = styles();
        let adaptive = adaptive();

        set_theme_detector(|| ColorMode::Dark);
        let table = styles.resolve_choice(&adaptive).unwrap();
        assert_eq!(
            table.get("viz-btn-item").unwrap().value("color"),
            Some(&StyleValue::from("#A6B5CC"))
        );

        set_theme_detector(|| ColorMode::Light);
        let table = styles.resolve_choice(&adaptive).unwrap();
        assert_eq!(
            table.get("viz-btn-item").unwrap().value("color"),
            Some(&StyleValue::from("#4E5866"))
        );
    }

    #[test]
    fn test_strict_failure_leaves_cache_empty() {
        let styles = styles();
        let theme = Theme::builder("bare").build().unwrap();

        assert!(matches!(
            styles.resolve(&theme),
            Err(ResolveError::MissingTokenPath { .. })
        ));
        assert_eq!(styles.resolver().cached_len(), 0);
    }
}
