//! Validation results for single fields and whole forms

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::evaluator::EvaluationPolicy;

/// Outcome of evaluating one field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldResult {
    /// Violation messages in rule order; empty when the field passed
    pub messages: Vec<String>,
    /// Set when the rules could not be evaluated (type mismatch, or an
    /// unknown kind in strict mode). A faulted field is never valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl FieldResult {
    /// A passing result
    pub fn valid() -> Self {
        Self::default()
    }

    /// Result carrying the given violation messages
    pub fn from_messages(messages: Vec<String>) -> Self {
        Self {
            messages,
            fault: None,
        }
    }

    /// Result for a field whose rules could not be evaluated
    pub fn faulted(error: &FormError) -> Self {
        Self::faulted_with(Vec::new(), error)
    }

    /// Faulted result that keeps the messages reported before the fault
    pub fn faulted_with(messages: Vec<String>, error: &FormError) -> Self {
        Self {
            messages,
            fault: Some(error.to_string()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.messages.is_empty() && self.fault.is_none()
    }

    /// The message a live UI shows first
    pub fn first_message(&self) -> Option<&str> {
        self.messages
            .first()
            .map(String::as_str)
            .or(self.fault.as_deref())
    }
}

/// Aggregated outcome of validating every field of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormReport {
    /// Schema the values were validated against
    pub schema: String,
    /// Policy used for every field
    pub policy: EvaluationPolicy,
    /// True iff every field is valid
    pub valid: bool,
    /// Per-field results in schema order
    pub fields: IndexMap<String, FieldResult>,
}

impl FormReport {
    /// Build a report, deriving `valid` from the field results
    pub fn new(
        schema: impl Into<String>,
        policy: EvaluationPolicy,
        fields: IndexMap<String, FieldResult>,
    ) -> Self {
        let valid = fields.values().all(FieldResult::is_valid);
        Self {
            schema: schema.into(),
            policy,
            valid,
            fields,
        }
    }

    /// Result for one field
    pub fn field(&self, name: &str) -> Option<&FieldResult> {
        self.fields.get(name)
    }

    /// Messages for one field; empty for valid or unknown fields
    pub fn messages(&self, name: &str) -> &[String] {
        self.fields
            .get(name)
            .map(|result| result.messages.as_slice())
            .unwrap_or(&[])
    }

    /// Fields that failed, in schema order
    pub fn errors(&self) -> impl Iterator<Item = (&str, &FieldResult)> {
        self.fields
            .iter()
            .filter(|(_, result)| !result.is_valid())
            .map(|(name, result)| (name.as_str(), result))
    }

    /// Names of fields that failed
    pub fn invalid_fields(&self) -> Vec<&str> {
        self.errors().map(|(name, _)| name).collect()
    }

    /// Total number of violation messages
    pub fn message_count(&self) -> usize {
        self.fields.values().map(|result| result.messages.len()).sum()
    }

    /// Number of fields whose rules could not be evaluated
    pub fn fault_count(&self) -> usize {
        self.fields.values().filter(|result| result.fault.is_some()).count()
    }

    /// Only the failing fields and their messages, with faults folded in as
    /// a trailing message
    pub fn error_map(&self) -> IndexMap<String, Vec<String>> {
        self.errors()
            .map(|(name, result)| {
                let mut messages = result.messages.clone();
                messages.extend(result.fault.iter().cloned());
                (name.to_string(), messages)
            })
            .collect()
    }
}
