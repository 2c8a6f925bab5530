//! Serializable schema definitions
//!
//! Schemas authored as data (JSON, YAML or TOML) are described by these
//! types and converted into [`Schema`] values before registration. Rules may
//! be written in the short string form (`"minLength:3"`) or as objects:
//!
//! ```yaml
//! registrationForm:
//!   username:
//!     errorElement: "#username-error"
//!     rules:
//!       - { type: required, message: "Username is required." }
//!       - { type: minLength, value: 3 }
//!       - "maxLength:20"
//!       - { type: pattern, value: "/^[a-zA-Z0-9_]+$/" }
//! ```
//!
//! Every key of a field other than `rules` is kept as presentation metadata.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FormError, Result};
use crate::parse::compile_pattern;
use crate::rule::Rule;
use crate::schema::{FieldMetadata, FieldSpec, Schema};

/// Text formats definitions and values can be read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Json,
    Yaml,
    Toml,
}

impl DefinitionFormat {
    /// Pick a format from a file extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "json" => Some(DefinitionFormat::Json),
            "yaml" | "yml" => Some(DefinitionFormat::Yaml),
            "toml" => Some(DefinitionFormat::Toml),
            _ => None,
        }
    }

    /// Deserialize `content` in this format
    pub fn parse<T: DeserializeOwned>(&self, content: &str) -> Result<T> {
        Ok(match self {
            DefinitionFormat::Json => serde_json::from_str(content)?,
            DefinitionFormat::Yaml => serde_yaml::from_str(content)?,
            DefinitionFormat::Toml => toml::from_str(content)?,
        })
    }
}

impl fmt::Display for DefinitionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionFormat::Json => write!(f, "json"),
            DefinitionFormat::Yaml => write!(f, "yaml"),
            DefinitionFormat::Toml => write!(f, "toml"),
        }
    }
}

/// One rule as written in a definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleDefinition {
    /// Short form, e.g. `"required"` or `"minLength:3"`
    Encoded(String),
    /// Object form, e.g. `{ type: minLength, value: 3, message: "..." }`
    Structured {
        #[serde(rename = "type")]
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl RuleDefinition {
    /// Convert into a [`Rule`]. Unknown kinds are kept as
    /// [`Rule::unknown`]; malformed parameters are an error.
    pub fn to_rule(&self) -> Result<Rule> {
        match self {
            RuleDefinition::Encoded(encoded) => encoded.parse(),
            RuleDefinition::Structured {
                kind,
                value,
                message,
            } => {
                let rule = match kind.as_str() {
                    "required" => Rule::required(),
                    "email" => Rule::email(),
                    "minLength" => Rule::min_length(bound(kind, value.as_ref())?),
                    "maxLength" => Rule::max_length(bound(kind, value.as_ref())?),
                    "pattern" => {
                        let literal = value.as_ref().and_then(|v| v.as_str()).ok_or_else(|| {
                            FormError::invalid_rule("pattern requires a string 'value'")
                        })?;
                        Rule::from_regex(compile_pattern(literal)?)
                    }
                    "custom" => {
                        return Err(FormError::invalid_rule(
                            "custom rules carry a predicate and must be built in code",
                        ))
                    }
                    other => Rule::unknown(other),
                };
                Ok(match message {
                    Some(message) => rule.with_message(message.clone()),
                    None => rule,
                })
            }
        }
    }
}

fn bound(kind: &str, value: Option<&serde_json::Value>) -> Result<usize> {
    let value = value
        .ok_or_else(|| FormError::invalid_rule(format!("{} requires a numeric 'value'", kind)))?;

    let parsed = match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().and_then(integral))
            .and_then(|n| usize::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        FormError::invalid_rule(format!(
            "{} expects a non-negative integer, got {}",
            kind, value
        ))
    })
}

/// Whole, non-negative floats such as `3.0` count as integers
fn integral(n: f64) -> Option<u64> {
    (n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64).then(|| n as u64)
}

/// One field: its rules plus any presentation keys
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    #[serde(flatten)]
    pub metadata: FieldMetadata,
}

impl FieldDefinition {
    pub fn to_field_spec(&self) -> Result<FieldSpec> {
        let rules = self
            .rules
            .iter()
            .map(RuleDefinition::to_rule)
            .collect::<Result<Vec<_>>>()?;
        Ok(FieldSpec::with_rules(rules).with_metadata(self.metadata.clone()))
    }
}

/// The fields of one form, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDefinition {
    pub fields: IndexMap<String, FieldDefinition>,
}

impl SchemaDefinition {
    /// Convert every field, naming the offending field on error
    pub fn to_schema(&self) -> Result<Schema> {
        let mut schema = Schema::new();
        for (name, field) in &self.fields {
            let spec = field.to_field_spec().map_err(|e| in_field(name, e))?;
            schema.insert(name.clone(), spec);
        }
        Ok(schema)
    }
}

/// A set of named form schemas, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDocument {
    pub forms: IndexMap<String, SchemaDefinition>,
}

impl SchemaDocument {
    /// Parse a document in the given format
    pub fn parse(content: &str, format: DefinitionFormat) -> Result<Self> {
        format.parse(content)
    }

    /// Convert every form; fails on the first bad rule
    pub fn into_schemas(self) -> Result<Vec<(String, Schema)>> {
        self.forms
            .into_iter()
            .map(|(name, definition)| {
                let schema = definition
                    .to_schema()
                    .map_err(|e| in_form(&name, e))?;
                Ok((name, schema))
            })
            .collect()
    }
}

fn in_field(field: &str, error: FormError) -> FormError {
    match error {
        FormError::InvalidRule(msg) => FormError::InvalidRule(format!("field '{}': {}", field, msg)),
        other => other,
    }
}

fn in_form(form: &str, error: FormError) -> FormError {
    match error {
        FormError::InvalidRule(msg) => FormError::InvalidRule(format!("form '{}', {}", form, msg)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleKind;
    use serde_json::json;

    const REGISTRATION_YAML: &str = r##"
registrationForm:
  username:
    errorElement: "#username-error"
    rules:
      - { type: required, message: "Username is required." }
      - { type: minLength, value: 3, message: "Username must be at least 3 characters long." }
      - "maxLength:20"
      - { type: pattern, value: "/^[a-zA-Z0-9_]+$/" }
  email:
    errorElement: "#email-error"
    rules:
      - required
      - email
"##;

    #[test]
    fn test_parse_yaml_document() {
        let document = SchemaDocument::parse(REGISTRATION_YAML, DefinitionFormat::Yaml).unwrap();
        let schemas = document.into_schemas().unwrap();
        assert_eq!(schemas.len(), 1);

        let (name, schema) = &schemas[0];
        assert_eq!(name, "registrationForm");
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["username", "email"]);

        let username = schema.get_field("username").unwrap();
        assert_eq!(username.rules().len(), 4);
        assert_eq!(username.rules()[0].message(), Some("Username is required."));
        assert!(matches!(username.rules()[2].kind(), RuleKind::MaxLength(20)));
        assert_eq!(username.metadata()["errorElement"], json!("#username-error"));
    }

    #[test]
    fn test_parse_json_document_with_legacy_rules() {
        let content = r##"{
            "login": {
                "username": {
                    "inputSelector": "#username",
                    "errorSelector": "#usernameError",
                    "rules": ["required", "minLength:3", "maxLength:15"]
                }
            }
        }"##;
        let document = SchemaDocument::parse(content, DefinitionFormat::Json).unwrap();
        let schemas = document.into_schemas().unwrap();
        let spec = schemas[0].1.get_field("username").unwrap();
        assert_eq!(spec.rules().len(), 3);
        assert_eq!(
            spec.metadata().keys().collect::<Vec<_>>(),
            vec!["inputSelector", "errorSelector"]
        );
    }

    #[test]
    fn test_parse_toml_document() {
        let content = r#"
[contact.message]
rules = ["required", { type = "maxLength", value = 500 }]
"#;
        let document = SchemaDocument::parse(content, DefinitionFormat::Toml).unwrap();
        let schemas = document.into_schemas().unwrap();
        let spec = schemas[0].1.get_field("message").unwrap();
        assert!(matches!(spec.rules()[1].kind(), RuleKind::MaxLength(500)));
    }

    #[test]
    fn test_bad_bound_names_field_and_form() {
        let content = r#"{"signup": {"age": {"rules": [{"type": "minLength", "value": -2}]}}}"#;
        let err = SchemaDocument::parse(content, DefinitionFormat::Json)
            .unwrap()
            .into_schemas()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("form 'signup'"));
        assert!(msg.contains("field 'age'"));
    }

    #[test]
    fn test_string_bound_accepted() {
        let rule = RuleDefinition::Structured {
            kind: "minLength".to_string(),
            value: Some(json!("4")),
            message: None,
        };
        assert!(matches!(rule.to_rule().unwrap().kind(), RuleKind::MinLength(4)));
    }

    #[test]
    fn test_whole_float_bound_accepted() {
        let content = r#"{"signup": {"username": {"rules": [{"type": "minLength", "value": 3.0}]}}}"#;
        let schemas = SchemaDocument::parse(content, DefinitionFormat::Json)
            .unwrap()
            .into_schemas()
            .unwrap();
        let spec = schemas[0].1.get_field("username").unwrap();
        assert!(matches!(spec.rules()[0].kind(), RuleKind::MinLength(3)));

        let fractional = RuleDefinition::Structured {
            kind: "maxLength".to_string(),
            value: Some(json!(2.5)),
            message: None,
        };
        assert!(fractional.to_rule().is_err());
    }

    #[test]
    fn test_unknown_and_custom_kinds() {
        let unknown = RuleDefinition::Structured {
            kind: "uppercase".to_string(),
            value: None,
            message: None,
        };
        assert!(matches!(unknown.to_rule().unwrap().kind(), RuleKind::Unknown(_)));

        let custom = RuleDefinition::Encoded("custom".to_string());
        assert!(custom.to_rule().is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DefinitionFormat::from_extension("YML"), Some(DefinitionFormat::Yaml));
        assert_eq!(DefinitionFormat::from_extension("toml"), Some(DefinitionFormat::Toml));
        assert_eq!(DefinitionFormat::from_extension("txt"), None);
    }
}
