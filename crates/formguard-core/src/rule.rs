//! Rule model for field validation
//!
//! A [`Rule`] is one constraint applied to a field value. Rule kinds form a
//! closed set matched exhaustively by the evaluator; custom checks are
//! carried as a shared predicate rather than a new kind.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Raw field value as supplied by the host UI layer
pub type FieldValue = serde_json::Value;

/// Pattern used by the built-in email rule
pub const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Default message for a failed `required` rule
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Default message for a failed `pattern` rule
pub const PATTERN_MESSAGE: &str = "Invalid format.";

/// Default message for a failed `email` rule
pub const EMAIL_MESSAGE: &str = "Invalid email format.";

/// Default message when a custom predicate rejects without saying why
pub const CUSTOM_MESSAGE: &str = "Invalid value.";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Verdict returned by a custom predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// Whether the value satisfied the predicate
    pub valid: bool,
    /// Message to report when `valid` is false
    pub message: String,
}

impl RuleOutcome {
    /// A passing outcome
    pub fn pass() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    /// A failing outcome with its message
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// Signature of a custom rule predicate
///
/// Returning `Err` signals that the predicate itself broke, which the
/// evaluator turns into a violation message for the field.
pub type Predicate =
    dyn Fn(&FieldValue) -> std::result::Result<RuleOutcome, String> + Send + Sync;

/// A named, shareable custom predicate
#[derive(Clone)]
pub struct CustomRule {
    name: String,
    predicate: Arc<Predicate>,
}

impl CustomRule {
    /// Wrap a fallible predicate
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&FieldValue) -> std::result::Result<RuleOutcome, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Name used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the predicate against a value
    pub fn check(&self, value: &FieldValue) -> std::result::Result<RuleOutcome, String> {
        (self.predicate)(value)
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The kinds of rule the evaluator knows how to check
#[derive(Debug, Clone)]
pub enum RuleKind {
    /// Value must be present and, for strings, non-blank
    Required,
    /// Length must be at least the bound
    MinLength(usize),
    /// Length must be at most the bound
    MaxLength(usize),
    /// Value must match the expression
    Pattern(Regex),
    /// Delegates to a predicate
    Custom(CustomRule),
    /// A kind named by a definition that this version does not implement
    Unknown(String),
}

impl RuleKind {
    /// Kind name as written in schema definitions
    pub fn name(&self) -> &str {
        match self {
            RuleKind::Required => "required",
            RuleKind::MinLength(_) => "minLength",
            RuleKind::MaxLength(_) => "maxLength",
            RuleKind::Pattern(_) => "pattern",
            RuleKind::Custom(_) => "custom",
            RuleKind::Unknown(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::MinLength(n) | RuleKind::MaxLength(n) => write!(f, "{}:{}", self.name(), n),
            RuleKind::Pattern(re) => write!(f, "pattern:{}", re.as_str()),
            RuleKind::Custom(custom) => write!(f, "custom:{}", custom.name()),
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// One validation constraint with an optional override message
#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    message: Option<String>,
}

impl Rule {
    /// Create a rule of the given kind with the default message
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Value must be present and non-blank
    pub fn required() -> Self {
        Self::new(RuleKind::Required)
    }

    /// Length must be `>= min`
    pub fn min_length(min: usize) -> Self {
        Self::new(RuleKind::MinLength(min))
    }

    /// Length must be `<= max`
    pub fn max_length(max: usize) -> Self {
        Self::new(RuleKind::MaxLength(max))
    }

    /// Compile `pattern` into a pattern rule
    pub fn pattern(pattern: &str) -> crate::Result<Self> {
        Ok(Self::from_regex(Regex::new(pattern)?))
    }

    /// Pattern rule from an already compiled expression
    pub fn from_regex(regex: Regex) -> Self {
        Self::new(RuleKind::Pattern(regex))
    }

    /// Built-in email check
    pub fn email() -> Self {
        Self::from_regex(email_regex().clone()).with_message(EMAIL_MESSAGE)
    }

    /// Custom rule from an infallible predicate
    pub fn custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&FieldValue) -> RuleOutcome + Send + Sync + 'static,
    {
        Self::new(RuleKind::Custom(CustomRule::new(name, move |value| {
            Ok(predicate(value))
        })))
    }

    /// Custom rule from a predicate that may fail
    pub fn try_custom<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&FieldValue) -> std::result::Result<RuleOutcome, String> + Send + Sync + 'static,
    {
        Self::new(RuleKind::Custom(CustomRule::new(name, predicate)))
    }

    /// Placeholder for a kind this evaluator does not implement
    pub fn unknown(kind: impl Into<String>) -> Self {
        Self::new(RuleKind::Unknown(kind.into()))
    }

    /// Replace the default violation message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The rule kind
    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    /// Kind name as written in schema definitions
    pub fn name(&self) -> &str {
        self.kind.name()
    }

    /// Override message, if one was set
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Message reported when this rule fails
    pub fn violation_message(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        match &self.kind {
            RuleKind::Required => REQUIRED_MESSAGE.to_string(),
            RuleKind::MinLength(n) => format!("Minimum length is {}.", n),
            RuleKind::MaxLength(n) => format!("Maximum length is {}.", n),
            RuleKind::Pattern(_) => PATTERN_MESSAGE.to_string(),
            RuleKind::Custom(_) | RuleKind::Unknown(_) => CUSTOM_MESSAGE.to_string(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_messages() {
        assert_eq!(Rule::required().violation_message(), "This field is required.");
        assert_eq!(Rule::min_length(3).violation_message(), "Minimum length is 3.");
        assert_eq!(Rule::max_length(20).violation_message(), "Maximum length is 20.");
        assert_eq!(
            Rule::pattern("^a$").unwrap().violation_message(),
            "Invalid format."
        );
        assert_eq!(Rule::email().violation_message(), "Invalid email format.");
    }

    #[test]
    fn test_override_message() {
        let rule = Rule::min_length(3).with_message("Username must be at least 3 characters long.");
        assert_eq!(rule.message(), Some("Username must be at least 3 characters long."));
        assert_eq!(
            rule.violation_message(),
            "Username must be at least 3 characters long."
        );
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Rule::pattern("[unclosed").is_err());
    }

    #[test]
    fn test_rule_display() {
        assert_eq!(Rule::required().to_string(), "required");
        assert_eq!(Rule::min_length(3).to_string(), "minLength:3");
        assert_eq!(Rule::pattern("^x+$").unwrap().to_string(), "pattern:^x+$");
        assert_eq!(Rule::unknown("uppercase").to_string(), "uppercase");
    }

    #[test]
    fn test_custom_rule_runs_predicate() {
        let rule = Rule::custom("even-length", |value| match value.as_str() {
            Some(s) if s.len() % 2 == 0 => RuleOutcome::pass(),
            _ => RuleOutcome::fail("Length must be even."),
        });

        let RuleKind::Custom(custom) = rule.kind() else {
            panic!("expected a custom rule");
        };
        assert_eq!(custom.name(), "even-length");
        assert_eq!(custom.check(&json!("ab")), Ok(RuleOutcome::pass()));
        assert_eq!(
            custom.check(&json!("abc")),
            Ok(RuleOutcome::fail("Length must be even."))
        );
    }
}
