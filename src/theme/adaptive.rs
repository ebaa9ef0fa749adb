//! Adaptive themes that respond to system color mode.

use dark_light::{detect as detect_os_theme, Mode as OsThemeMode};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::theme::Theme;

/// The user's preferred color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Light,
    Dark,
}

/// A light and a dark theme variant.
///
/// Each variant is its own theme identity, so the resolver keeps one
/// resolved table per variant and switching modes is a cache hit after
/// the first resolution of each.
///
/// # Example
///
/// ```rust
/// use themed_rules::{AdaptiveTheme, ColorMode, Theme};
///
/// let light = Theme::builder("light").token("tokens.colors.font", "#232A33").build().unwrap();
/// let dark = Theme::builder("dark").token("tokens.colors.font", "#A6B5CC").build().unwrap();
/// let adaptive = AdaptiveTheme::new(light, dark);
///
/// assert_eq!(adaptive.variant(ColorMode::Dark).name(), "dark");
/// ```
#[derive(Debug, Clone)]
pub struct AdaptiveTheme {
    light: Theme,
    dark: Theme,
}

impl AdaptiveTheme {
    /// Creates an adaptive theme with separate light and dark variants.
    pub fn new(light: Theme, dark: Theme) -> Self {
        Self { light, dark }
    }

    /// Returns the variant for an explicit color mode.
    pub fn variant(&self, mode: ColorMode) -> &Theme {
        match mode {
            ColorMode::Light => &self.light,
            ColorMode::Dark => &self.dark,
        }
    }

    /// Returns the variant matching the current color mode.
    pub fn resolve(&self) -> &Theme {
        self.variant(detect_color_mode())
    }
}

type ThemeDetector = fn() -> ColorMode;

static THEME_DETECTOR: Lazy<Mutex<ThemeDetector>> = Lazy::new(|| Mutex::new(os_theme_detector));

/// Overrides the detector used to determine whether the user prefers a light or dark theme.
///
/// This is useful for testing or when you want to force a specific color mode.
pub fn set_theme_detector(detector: ThemeDetector) {
    *THEME_DETECTOR.lock() = detector;
}

/// Returns the color mode reported by the current detector.
pub fn detect_color_mode() -> ColorMode {
    let detector = *THEME_DETECTOR.lock();
    detector()
}

fn os_theme_detector() -> ColorMode {
    match detect_os_theme() {
        OsThemeMode::Dark => ColorMode::Dark,
        OsThemeMode::Light => ColorMode::Light,
    }
}
