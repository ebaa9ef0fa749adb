//! YAML notation for rule bodies and template sets.
//!
//! Rule bodies are YAML mappings read in document order:
//!
//! | YAML                          | Entry                              |
//! |-------------------------------|------------------------------------|
//! | `width: 32px` / `flex: 1`     | literal property                   |
//! | `color: $tokens.colors.font`  | theme reference                    |
//! | `border: 1px solid ${path}`   | interpolation                      |
//! | `"&:hover": { ... }`          | nested conditional block           |
//! | `...card: ~`                  | splice of template fragment `card` |
//! | `...$util.flexCenter: ~`      | splice of a theme fragment         |
//!
//! A key repeated inside one rule body is rejected by the YAML parser and
//! surfaces as [`TemplateError::InvalidDocument`]. Repeated rule or fragment
//! names are kept and reported by [`RuleTemplateSet::validate`].

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use super::body::{Entry, FragmentRef, RuleBody};
use super::declaration::{Declaration, TokenPath};
use super::error::TemplateError;
use super::set::RuleTemplateSet;
use crate::value::StyleValue;

const SPLICE_PREFIX: &str = "...";

/// A YAML mapping read entry by entry, repeated keys included.
///
/// Repeated rule and fragment names are left for
/// [`RuleTemplateSet::validate`] to report.
struct Entries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for Entries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = Entries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of names to rule bodies")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Entries, A::Error> {
                let mut entries = Vec::new();
                while let Some((name, body)) = map.next_entry::<String, Value>()? {
                    entries.push((name, body));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    #[serde(default)]
    fragments: Option<Entries>,
    #[serde(default)]
    rules: Option<Entries>,
}

pub(crate) fn parse_template_set(source: &str) -> Result<RuleTemplateSet, TemplateError> {
    let document: Document =
        serde_yaml::from_str(source).map_err(|e| TemplateError::InvalidDocument {
            message: e.to_string(),
        })?;

    let mut builder = RuleTemplateSet::builder();
    for (name, body) in document.fragments.map(|e| e.0).unwrap_or_default() {
        builder = builder.fragment(&name, parse_body(&body, &name)?);
    }
    for (name, body) in document.rules.map(|e| e.0).unwrap_or_default() {
        builder = builder.rule(&name, parse_body(&body, &name)?);
    }

    Ok(builder.build())
}

/// Converts one YAML mapping into a rule body. `owner` names it in errors.
pub(crate) fn parse_body(value: &Value, owner: &str) -> Result<RuleBody, TemplateError> {
    let map = match value {
        Value::Mapping(map) => map,
        Value::Null => return Ok(RuleBody::new()),
        _ => {
            return Err(TemplateError::InvalidEntry {
                owner: owner.to_string(),
                key: String::new(),
                reason: "a rule body must be a mapping".to_string(),
            })
        }
    };
    parse_mapping(map, owner)
}

fn parse_mapping(map: &Mapping, owner: &str) -> Result<RuleBody, TemplateError> {
    let mut body = RuleBody::new();

    for (key, value) in map {
        let key = key_str(key, owner)?;
        let invalid = |reason: &str| TemplateError::InvalidEntry {
            owner: owner.to_string(),
            key: key.to_string(),
            reason: reason.to_string(),
        };

        if let Some(target) = key.strip_prefix(SPLICE_PREFIX) {
            if !value.is_null() {
                return Err(invalid("a splice takes no value; write '~'"));
            }
            let fragment = match target.strip_prefix('$') {
                Some(path) => {
                    let path = TokenPath::new(path);
                    if !path.is_well_formed() {
                        return Err(invalid("malformed theme fragment path"));
                    }
                    FragmentRef::Theme(path)
                }
                None if target.is_empty() => return Err(invalid("missing fragment name")),
                None => FragmentRef::Local(target.to_string()),
            };
            body.push(Entry::Splice(fragment));
            continue;
        }

        let entry = match value {
            Value::Mapping(nested) => Entry::Nested {
                selector: key.to_string(),
                body: parse_mapping(nested, owner)?,
            },
            Value::String(text) => Entry::Property {
                name: key.to_string(),
                value: Declaration::parse(text)?,
            },
            scalar => {
                let value = StyleValue::from_yaml_scalar(scalar)
                    .ok_or_else(|| invalid("expected a finite number, text or a nested mapping"))?;
                Entry::Property {
                    name: key.to_string(),
                    value: Declaration::Literal(value),
                }
            }
        };
        body.push(entry);
    }

    Ok(body)
}

fn key_str<'a>(key: &'a Value, owner: &str) -> Result<&'a str, TemplateError> {
    key.as_str().ok_or_else(|| TemplateError::InvalidEntry {
        owner: owner.to_string(),
        key: format!("{:?}", key),
        reason: "keys must be strings".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(source: &str) -> Result<RuleBody, TemplateError> {
        let value: Value = serde_yaml::from_str(source).unwrap();
        parse_body(&value, "test")
    }

    #[test]
    fn test_parse_body_entries_in_order() {
        let parsed = body(
            r#"
...$util.flexCenterCenter: ~
width: 192
background: $components.layerMenu.menuItemBg
borderBottom: 1px solid ${tokens.divider.color.light}
"&[data-width=\"max\"]":
  width: 216px
...local: ~
"#,
        )
        .unwrap();

        let entries = parsed.entries();
        assert_eq!(entries.len(), 6);
        assert_eq!(
            entries[0],
            Entry::Splice(FragmentRef::Theme(TokenPath::new("util.flexCenterCenter")))
        );
        assert_eq!(
            entries[1],
            Entry::Property {
                name: "width".into(),
                value: Declaration::Literal(StyleValue::Integer(192)),
            }
        );
        assert_eq!(
            entries[2],
            Entry::Property {
                name: "background".into(),
                value: Declaration::token("components.layerMenu.menuItemBg"),
            }
        );
        assert!(matches!(
            &entries[3],
            Entry::Property { value: Declaration::Interpolated(_), .. }
        ));
        let Entry::Nested { selector, body } = &entries[4] else {
            panic!("expected nested block");
        };
        assert_eq!(selector, "&[data-width=\"max\"]");
        assert_eq!(body.len(), 1);
        assert_eq!(entries[5], Entry::Splice(FragmentRef::Local("local".into())));
    }

    #[test]
    fn test_splice_with_value_is_rejected() {
        let err = body("...card: true").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidEntry { .. }));
    }

    #[test]
    fn test_boolean_value_is_rejected() {
        let err = body("visible: true").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidEntry { key, .. } if key == "visible"));
    }

    #[test]
    fn test_null_body_is_empty() {
        assert!(body("~").unwrap().is_empty());
    }

    #[test]
    fn test_parse_template_set() {
        let template = parse_template_set(
            r#"
fragments:
  button:
    cursor: pointer
rules:
  viz-btn-item:
    ...button: ~
    width: 32px
  viz-context:
    width: 100%
"#,
        )
        .unwrap();

        assert_eq!(
            template.rule_names().collect::<Vec<_>>(),
            vec!["viz-btn-item", "viz-context"]
        );
        assert!(template.fragment("button").is_some());
        assert!(template.validate().is_ok());
    }

    #[test]
    fn test_parse_template_set_keeps_duplicate_rule_names() {
        let template = parse_template_set(
            r#"
rules:
  viz-context:
    width: 100%
  viz-context:
    height: 100%
"#,
        )
        .unwrap();

        assert_eq!(template.len(), 2);
        assert_eq!(
            template.validate(),
            Err(TemplateError::DuplicateRule {
                name: "viz-context".into()
            })
        );
    }

    #[test]
    fn test_parse_template_set_keeps_duplicate_fragment_names() {
        let template = parse_template_set(
            r#"
fragments:
  fill:
    width: 100%
  fill:
    height: 100%
rules:
  web-gl:
    ...fill: ~
"#,
        )
        .unwrap();

        assert_eq!(
            template.validate(),
            Err(TemplateError::DuplicateFragment { name: "fill".into() })
        );
    }

    #[test]
    fn test_repeated_property_is_a_document_error() {
        let err = parse_template_set("rules:\n  r:\n    width: 1px\n    width: 2px\n").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidDocument { .. }));
    }

    #[test]
    fn test_parse_template_set_rejects_non_finite_literal() {
        let err = parse_template_set("rules:\n  r:\n    opacity: .nan\n").unwrap_err();
        assert_eq!(
            err,
            TemplateError::InvalidEntry {
                owner: "r".into(),
                key: "opacity".into(),
                reason: "expected a finite number, text or a nested mapping".into(),
            }
        );
    }

    #[test]
    fn test_parse_template_set_empty_sections() {
        let template = parse_template_set("fragments: ~\nrules: ~\n").unwrap();
        assert!(template.is_empty());
    }

    #[test]
    fn test_parse_template_set_unknown_section() {
        let err = parse_template_set("styles: {}").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidDocument { .. }));
    }

    #[test]
    fn test_parse_template_set_not_a_mapping() {
        assert!(parse_template_set("- a\n- b").is_err());
    }
}
