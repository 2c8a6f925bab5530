//! Rule evaluator
//!
//! Checks one field value against its ordered rule list and produces the
//! violation messages. The evaluator holds no state between calls.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use crate::error::{FormError, Result};
use crate::rule::{CustomRule, FieldValue, Rule, RuleKind};

/// How many failing rules are reported per field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationPolicy {
    /// Stop at the first failing rule and report only its message
    ShortCircuit,
    /// Check every rule and report every failing message
    #[default]
    Accumulate,
}

impl fmt::Display for EvaluationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationPolicy::ShortCircuit => write!(f, "short-circuit"),
            EvaluationPolicy::Accumulate => write!(f, "accumulate"),
        }
    }
}

impl FromStr for EvaluationPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "short-circuit" | "shortcircuit" | "first" => Ok(EvaluationPolicy::ShortCircuit),
            "accumulate" | "all" => Ok(EvaluationPolicy::Accumulate),
            _ => Err(format!("Unknown evaluation policy: {}", s)),
        }
    }
}

/// Treatment of rule kinds the evaluator does not implement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Unknown kinds pass with a warning
    #[default]
    Lenient,
    /// Unknown kinds fail with [`FormError::UnknownRuleKind`]
    Strict,
}

/// Outcome of running one field's rules
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Violation messages in rule order
    pub messages: Vec<String>,
    /// Error from the rule that stopped evaluation
    pub fault: Option<FormError>,
}

impl Evaluation {
    pub fn is_valid(&self) -> bool {
        self.messages.is_empty() && self.fault.is_none()
    }

    /// The messages, or the fault if one occurred
    pub fn into_result(self) -> Result<Vec<String>> {
        match self.fault {
            Some(error) => Err(error),
            None => Ok(self.messages),
        }
    }
}

/// Evaluates rule lists against single values
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEvaluator {
    strictness: Strictness,
}

impl RuleEvaluator {
    /// Create an evaluator
    pub fn new(strictness: Strictness) -> Self {
        Self { strictness }
    }

    /// Evaluator that rejects unknown rule kinds
    pub fn strict() -> Self {
        Self::new(Strictness::Strict)
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Evaluate `rules` in declared order against `value`.
    ///
    /// Collects the violation messages, empty when the value passes. A rule
    /// that cannot be evaluated (a length rule on a value without a length,
    /// or an unknown kind in strict mode) stops evaluation and is returned
    /// as the fault, next to the messages gathered before it.
    pub fn evaluate(
        &self,
        value: &FieldValue,
        rules: &[Rule],
        policy: EvaluationPolicy,
    ) -> Evaluation {
        let mut evaluation = Evaluation::default();

        for rule in rules {
            match self.check(value, rule) {
                Ok(None) => {}
                Ok(Some(message)) => {
                    evaluation.messages.push(message);
                    if policy == EvaluationPolicy::ShortCircuit {
                        break;
                    }
                }
                Err(error) => {
                    evaluation.fault = Some(error);
                    break;
                }
            }
        }

        evaluation
    }

    /// Check a single rule, returning its violation message if it fails
    pub fn check(&self, value: &FieldValue, rule: &Rule) -> Result<Option<String>> {
        let passed = match rule.kind() {
            RuleKind::Required => is_present(value),
            RuleKind::MinLength(min) => measure(rule, value)?.map_or(true, |len| len >= *min),
            RuleKind::MaxLength(max) => measure(rule, value)?.map_or(true, |len| len <= *max),
            RuleKind::Pattern(regex) => text_of(rule, value)?.map_or(true, |text| regex.is_match(&text)),
            RuleKind::Custom(custom) => return Ok(run_custom(rule, custom, value)),
            RuleKind::Unknown(kind) => match self.strictness {
                Strictness::Lenient => {
                    tracing::warn!(rule = %kind, "Unknown rule kind, treating as valid");
                    true
                }
                Strictness::Strict => {
                    return Err(FormError::UnknownRuleKind { kind: kind.clone() });
                }
            },
        };

        tracing::trace!(rule = %rule, passed, "Evaluated rule");
        Ok((!passed).then(|| rule.violation_message()))
    }
}

/// Present means not null and, for strings, not blank
fn is_present(value: &FieldValue) -> bool {
    match value {
        FieldValue::Null => false,
        FieldValue::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Character count for strings, element count for lists.
///
/// Null has no length to check and is left to `required`.
fn measure(rule: &Rule, value: &FieldValue) -> Result<Option<usize>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::String(s) => Ok(Some(s.chars().count())),
        FieldValue::Array(items) => Ok(Some(items.len())),
        other => Err(type_mismatch(rule, "a string or list", other)),
    }
}

/// Text a pattern is matched against. Numbers and booleans match on their
/// literal form.
fn text_of<'a>(rule: &Rule, value: &'a FieldValue) -> Result<Option<Cow<'a, str>>> {
    match value {
        FieldValue::Null => Ok(None),
        FieldValue::String(s) => Ok(Some(Cow::Borrowed(s))),
        FieldValue::Number(n) => Ok(Some(Cow::Owned(n.to_string()))),
        FieldValue::Bool(b) => Ok(Some(Cow::Owned(b.to_string()))),
        other => Err(type_mismatch(rule, "a string", other)),
    }
}

fn type_mismatch(rule: &Rule, expected: &'static str, found: &FieldValue) -> FormError {
    FormError::TypeMismatch {
        rule: rule.name().to_string(),
        expected,
        found: value_kind(found).to_string(),
    }
}

/// Name of a value's JSON type, for diagnostics
pub fn value_kind(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Null => "null",
        FieldValue::Bool(_) => "boolean",
        FieldValue::Number(_) => "number",
        FieldValue::String(_) => "string",
        FieldValue::Array(_) => "list",
        FieldValue::Object(_) => "object",
    }
}

/// Run a custom predicate, turning errors and panics into a violation
fn run_custom(rule: &Rule, custom: &CustomRule, value: &FieldValue) -> Option<String> {
    let fault = match panic::catch_unwind(AssertUnwindSafe(|| custom.check(value))) {
        Ok(Ok(outcome)) if outcome.valid => return None,
        Ok(Ok(outcome)) if outcome.message.is_empty() => return Some(rule.violation_message()),
        Ok(Ok(outcome)) => return Some(outcome.message),
        Ok(Err(message)) => message,
        Err(payload) => panic_message(payload.as_ref()),
    };

    let error = FormError::CustomRuleFault {
        rule: custom.name().to_string(),
        message: fault,
    };
    tracing::warn!(error = %error, "Custom rule failed");

    Some(match rule.message() {
        Some(message) => message.to_string(),
        None => error.to_string(),
    })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "predicate panicked".to_string()
    }
}
