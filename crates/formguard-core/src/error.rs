//! Error types for formguard
//!
//! Registry lookups, rule type mismatches and definition parsing all
//! report through [`FormError`].

use thiserror::Error;

/// Main error type for schema and rule operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// No schema is registered under the requested name
    #[error("Schema not found: {name}")]
    SchemaNotFound { name: String },

    /// The schema exists but does not declare the requested field
    #[error("Field '{field}' is not declared in schema '{schema}'")]
    FieldNotFound { schema: String, field: String },

    /// A length rule was applied to a value that has no length
    #[error("Rule '{rule}' expects {expected} but found {found}")]
    TypeMismatch {
        rule: String,
        expected: &'static str,
        found: String,
    },

    /// Rule kind not known to this evaluator (only raised in strict mode)
    #[error("Unknown rule kind: {kind}")]
    UnknownRuleKind { kind: String },

    /// A custom predicate failed instead of returning a verdict
    #[error("Custom rule '{rule}' failed: {message}")]
    CustomRuleFault { rule: String, message: String },

    /// A rule definition could not be turned into a rule
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// Schema document parsing error
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl FormError {
    /// Create a schema-not-found error
    pub fn schema_not_found(name: impl Into<String>) -> Self {
        FormError::SchemaNotFound { name: name.into() }
    }

    /// Create a field-not-found error
    pub fn field_not_found(schema: impl Into<String>, field: impl Into<String>) -> Self {
        FormError::FieldNotFound {
            schema: schema.into(),
            field: field.into(),
        }
    }

    /// Create an invalid rule error
    pub fn invalid_rule(msg: impl Into<String>) -> Self {
        FormError::InvalidRule(msg.into())
    }

    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        FormError::ParseError(msg.into())
    }

    /// Whether the error stems from how a schema was authored rather than from
    /// the caller's lookup
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            FormError::TypeMismatch { .. }
                | FormError::UnknownRuleKind { .. }
                | FormError::InvalidRule(_)
                | FormError::ParseError(_)
        )
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        !matches!(self, FormError::CustomRuleFault { .. })
    }
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        FormError::ParseError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for FormError {
    fn from(err: serde_yaml::Error) -> Self {
        FormError::ParseError(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for FormError {
    fn from(err: toml::de::Error) -> Self {
        FormError::ParseError(format!("TOML error: {}", err))
    }
}

impl From<regex::Error> for FormError {
    fn from(err: regex::Error) -> Self {
        FormError::InvalidRule(format!("invalid pattern: {}", err))
    }
}

/// Result type alias for formguard operations
pub type Result<T> = std::result::Result<T, FormError>;
