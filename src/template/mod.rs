//! Rule templates: what a component wants its rules to look like.
//!
//! This module provides:
//!
//! - [`RuleTemplateSet`]: named rule bodies plus shareable fragments
//! - [`RuleBody`]: an ordered list of [`Entry`] values
//! - [`Declaration`]: literal, theme reference or interpolation
//! - [`TemplateError`]: structural authoring errors
//!
//! Templates are authored independently of any theme and evaluated against
//! one by the [`Resolver`](crate::Resolver).

mod body;
mod declaration;
mod error;
mod set;
pub(crate) mod yaml;

pub use body::{Entry, FragmentRef, RuleBody};
pub use declaration::{Declaration, Interpolation, Segment, TokenPath};
pub use error::TemplateError;
pub use set::{RuleTemplateSet, RuleTemplateSetBuilder};
