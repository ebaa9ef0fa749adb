//! Theme selection at the UI boundary.

use super::adaptive::AdaptiveTheme;
use super::theme::Theme;

/// Reference to either a fixed theme or an adaptive one.
///
/// This is the one place where "the current theme" is read implicitly:
/// an adaptive choice consults the color-mode detector each time it is
/// resolved. Everything downstream receives an explicit [`Theme`].
#[derive(Debug, Clone, Copy)]
pub enum ThemeChoice<'a> {
    /// A fixed theme that doesn't change based on color mode.
    Theme(&'a Theme),
    /// An adaptive theme that selects light/dark based on OS settings.
    Adaptive(&'a AdaptiveTheme),
}

impl<'a> ThemeChoice<'a> {
    /// Resolves to a concrete theme.
    pub fn resolve(&self) -> &'a Theme {
        match *self {
            ThemeChoice::Theme(theme) => theme,
            ThemeChoice::Adaptive(adaptive) => adaptive.resolve(),
        }
    }
}

impl<'a> From<&'a Theme> for ThemeChoice<'a> {
    fn from(theme: &'a Theme) -> Self {
        ThemeChoice::Theme(theme)
    }
}

impl<'a> From<&'a AdaptiveTheme> for ThemeChoice<'a> {
    fn from(adaptive: &'a AdaptiveTheme) -> Self {
        ThemeChoice::Adaptive(adaptive)
    }
}
