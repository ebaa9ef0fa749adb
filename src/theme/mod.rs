//! Theme system: token sources for rule resolution.
//!
//! This module provides:
//!
//! - [`Theme`]: immutable design tokens and component fragments
//! - [`TokenTree`]: the nested token storage behind a theme
//! - [`AdaptiveTheme`]: light/dark theme pairs with OS detection
//! - [`ThemeChoice`]: reference type for selecting themes at resolve time
//! - [`ColorMode`]: light or dark color mode enum

mod adaptive;
mod choice;
mod error;
#[allow(clippy::module_inception)]
mod theme;
mod tokens;

pub use adaptive::{detect_color_mode, set_theme_detector, AdaptiveTheme, ColorMode};
pub use choice::ThemeChoice;
pub use error::ThemeError;
pub use theme::{Theme, ThemeBuilder};
pub use tokens::{TokenNode, TokenTree};
