//! Concrete style values.
//!
//! A [`StyleValue`] is what ends up in a resolved rule table: either a
//! unitless number or a piece of text. Text covers keywords (`flex`),
//! dimensions (`244px`), colors (`#A6B5CC`) and shorthands (`0 12px`).
//! Values are never normalized: a number stays unitless and text is
//! carried verbatim, so the renderer sees exactly what the theme or
//! template author wrote.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A concrete value for a single style property.
///
/// # Example
///
/// ```rust
/// use themed_rules::StyleValue;
///
/// assert_eq!(StyleValue::from(192).to_string(), "192");
/// assert_eq!(StyleValue::from(1.5).to_string(), "1.5");
/// assert_eq!(StyleValue::from("244px").to_string(), "244px");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    /// Whole number without a unit (`flex: 1`, `fontWeight: 400`).
    Integer(i64),
    /// Fractional number without a unit (`opacity: 0.6`).
    Float(f64),
    /// Text, passed through as written.
    Text(String),
}

impl StyleValue {
    /// Returns the text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StyleValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` for unitless numbers.
    pub fn is_number(&self) -> bool {
        matches!(self, StyleValue::Integer(_) | StyleValue::Float(_))
    }

    /// Returns `false` for NaN and infinite floats.
    ///
    /// Such values have no CSS representation and never compare equal to
    /// themselves, so themes, templates and configuration reject them.
    pub fn is_finite(&self) -> bool {
        match self {
            StyleValue::Float(x) => x.is_finite(),
            StyleValue::Integer(_) | StyleValue::Text(_) => true,
        }
    }

    /// Converts a YAML scalar into a value.
    ///
    /// Returns `None` for anything that is not a string or a finite number
    /// (`.nan` and `.inf` included).
    pub(crate) fn from_yaml_scalar(value: &serde_yaml::Value) -> Option<Self> {
        match value {
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(StyleValue::Integer(i))
                } else {
                    n.as_f64().filter(|x| x.is_finite()).map(StyleValue::Float)
                }
            }
            serde_yaml::Value::String(s) => Some(StyleValue::Text(s.clone())),
            _ => None,
        }
    }
}

/// Structural equality: floats compare by bit pattern, so every value
/// (NaN included) equals itself and identical tables always compare equal.
impl PartialEq for StyleValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (StyleValue::Integer(a), StyleValue::Integer(b)) => a == b,
            (StyleValue::Float(a), StyleValue::Float(b)) => a.to_bits() == b.to_bits(),
            (StyleValue::Text(a), StyleValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Integer(i) => write!(f, "{}", i),
            StyleValue::Float(x) => write!(f, "{}", x),
            StyleValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for StyleValue {
    fn from(value: i64) -> Self {
        StyleValue::Integer(value)
    }
}

impl From<i32> for StyleValue {
    fn from(value: i32) -> Self {
        StyleValue::Integer(value.into())
    }
}

impl From<f64> for StyleValue {
    fn from(value: f64) -> Self {
        StyleValue::Float(value)
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        StyleValue::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        StyleValue::Text(value)
    }
}
