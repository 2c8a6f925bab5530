//! Live validation state
//!
//! Tracks where each field of one form stands while the user edits it. The
//! host UI forwards input, blur and submit events; rendering stays with the
//! host.
//!
//! ```text
//! Pristine --input/blur--> Validating --done--> Valid | Invalid
//!                              ^                      |
//!                              +-----input/blur-------+
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FormError, Result};
use crate::report::{FieldResult, FormReport};
use crate::rule::FieldValue;
use crate::validator::{FieldSource, FormValidator};

/// Where a field stands in live validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    /// Not touched yet
    #[default]
    Pristine,
    /// A check is running
    Validating,
    /// Last check passed
    Valid,
    /// Last check failed
    Invalid,
}

impl FieldState {
    /// State after an input or blur event. Every state moves to
    /// `Validating`; there is no terminal state.
    pub fn on_event(self, _event: FieldEvent) -> FieldState {
        FieldState::Validating
    }

    /// State after a check completes. Only `Validating` can complete.
    pub fn complete(self, valid: bool) -> FieldState {
        match self {
            FieldState::Validating if valid => FieldState::Valid,
            FieldState::Validating => FieldState::Invalid,
            other => other,
        }
    }
}

impl fmt::Display for FieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldState::Pristine => write!(f, "pristine"),
            FieldState::Validating => write!(f, "validating"),
            FieldState::Valid => write!(f, "valid"),
            FieldState::Invalid => write!(f, "invalid"),
        }
    }
}

/// UI events that trigger a field re-check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldEvent {
    Input,
    Blur,
}

/// Per-field state and last result for one form
#[derive(Debug, Clone)]
pub struct LiveForm {
    schema: String,
    states: IndexMap<String, FieldState>,
    results: IndexMap<String, FieldResult>,
}

impl LiveForm {
    /// Start tracking `schema_name`; every declared field begins pristine
    pub fn new(validator: &FormValidator<'_>, schema_name: &str) -> Result<Self> {
        let schema = validator.registry().get_schema(schema_name)?;
        let states = schema
            .field_names()
            .map(|name| (name.to_string(), FieldState::Pristine))
            .collect();

        Ok(Self {
            schema: schema_name.to_string(),
            states,
            results: IndexMap::new(),
        })
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Handle an input or blur event for one field
    pub fn handle(
        &mut self,
        validator: &FormValidator<'_>,
        field: &str,
        event: FieldEvent,
        value: &FieldValue,
    ) -> Result<&FieldResult> {
        let previous = *self
            .states
            .get(field)
            .ok_or_else(|| FormError::field_not_found(&self.schema, field))?;

        self.set_state(field, previous.on_event(event));

        let result = match validator.evaluate_field(&self.schema, field, value) {
            Ok(result) => result,
            Err(error) => {
                self.set_state(field, previous);
                return Err(error);
            }
        };

        let next = FieldState::Validating.complete(result.is_valid());
        tracing::debug!(
            schema = %self.schema,
            field = %field,
            from = %previous,
            to = %next,
            "Field re-checked"
        );
        self.set_state(field, next);

        self.results.insert(field.to_string(), result);
        Ok(&self.results[field])
    }

    /// Validate the whole form on submit, moving every field to `Valid` or
    /// `Invalid`. The host should block submission when the report is not
    /// valid.
    pub fn submit<V>(&mut self, validator: &FormValidator<'_>, values: &V) -> Result<FormReport>
    where
        V: FieldSource + ?Sized,
    {
        let report = validator.validate(&self.schema, values)?;

        // The schema may have been replaced since tracking started
        self.states.retain(|name, _| report.fields.contains_key(name));
        self.results.clear();

        for (name, result) in &report.fields {
            let state = FieldState::Validating.complete(result.is_valid());
            self.states.insert(name.clone(), state);
            self.results.insert(name.clone(), result.clone());
        }

        Ok(report)
    }

    fn set_state(&mut self, field: &str, state: FieldState) {
        if let Some(slot) = self.states.get_mut(field) {
            *slot = state;
        }
    }

    /// Current state of a field
    pub fn state(&self, field: &str) -> Option<FieldState> {
        self.states.get(field).copied()
    }

    /// Last result for a field, if it has been checked
    pub fn result(&self, field: &str) -> Option<&FieldResult> {
        self.results.get(field)
    }

    /// Fields and their states in schema order
    pub fn states(&self) -> impl Iterator<Item = (&str, FieldState)> {
        self.states.iter().map(|(name, state)| (name.as_str(), *state))
    }

    /// True when every field has been checked and passed
    pub fn all_valid(&self) -> bool {
        self.states.values().all(|state| *state == FieldState::Valid)
    }

    /// Return every field to pristine and forget results
    pub fn reset(&mut self) {
        for state in self.states.values_mut() {
            *state = FieldState::Pristine;
        }
        self.results.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SchemaRegistry;
    use crate::rule::Rule;
    use crate::schema::{FieldSpec, Schema};
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.define_schema(
            "registrationForm",
            Schema::new()
                .field(
                    "username",
                    FieldSpec::with_rules([Rule::required(), Rule::min_length(3)]),
                )
                .field("email", FieldSpec::with_rules([Rule::required(), Rule::email()])),
        );
        registry
    }

    #[test]
    fn test_state_transitions() {
        assert_eq!(FieldState::Pristine.on_event(FieldEvent::Input), FieldState::Validating);
        assert_eq!(FieldState::Valid.on_event(FieldEvent::Blur), FieldState::Validating);
        assert_eq!(FieldState::Invalid.on_event(FieldEvent::Input), FieldState::Validating);
        assert_eq!(FieldState::Validating.complete(true), FieldState::Valid);
        assert_eq!(FieldState::Validating.complete(false), FieldState::Invalid);
        // Completion outside a check is ignored
        assert_eq!(FieldState::Pristine.complete(true), FieldState::Pristine);
    }

    #[test]
    fn test_live_field_lifecycle() {
        let registry = registry();
        let validator = FormValidator::new(&registry);
        let mut form = LiveForm::new(&validator, "registrationForm").unwrap();

        assert_eq!(form.state("username"), Some(FieldState::Pristine));
        assert!(form.result("username").is_none());

        let result = form
            .handle(&validator, "username", FieldEvent::Input, &json!("a"))
            .unwrap();
        assert_eq!(result.messages, vec!["Minimum length is 3."]);
        assert_eq!(form.state("username"), Some(FieldState::Invalid));

        form.handle(&validator, "username", FieldEvent::Input, &json!("alice"))
            .unwrap();
        assert_eq!(form.state("username"), Some(FieldState::Valid));
        assert_eq!(form.state("email"), Some(FieldState::Pristine));
        assert!(!form.all_valid());
    }

    #[test]
    fn test_live_check_shows_one_message() {
        let registry = registry();
        let validator = FormValidator::new(&registry);
        let mut form = LiveForm::new(&validator, "registrationForm").unwrap();

        let result = form
            .handle(&validator, "username", FieldEvent::Blur, &json!(""))
            .unwrap();
        assert_eq!(result.messages, vec!["This field is required."]);
    }

    #[test]
    fn test_unknown_field_leaves_states_alone() {
        let registry = registry();
        let validator = FormValidator::new(&registry);
        let mut form = LiveForm::new(&validator, "registrationForm").unwrap();

        let err = form
            .handle(&validator, "phone", FieldEvent::Input, &json!("1"))
            .unwrap_err();
        assert_eq!(err, FormError::field_not_found("registrationForm", "phone"));
        assert!(form.states().all(|(_, state)| state == FieldState::Pristine));
    }

    #[test]
    fn test_submit_updates_every_field() {
        let registry = registry();
        let validator = FormValidator::new(&registry);
        let mut form = LiveForm::new(&validator, "registrationForm").unwrap();

        let report = form
            .submit(&validator, &json!({"username": "alice", "email": "nope"}))
            .unwrap();
        assert!(!report.valid);
        assert_eq!(form.state("username"), Some(FieldState::Valid));
        assert_eq!(form.state("email"), Some(FieldState::Invalid));

        form.submit(&validator, &json!({"username": "alice", "email": "a@b.com"}))
            .unwrap();
        assert!(form.all_valid());

        form.reset();
        assert_eq!(form.state("email"), Some(FieldState::Pristine));
        assert!(form.result("email").is_none());
    }

    #[test]
    fn test_new_requires_registered_schema() {
        let registry = SchemaRegistry::new();
        let validator = FormValidator::new(&registry);
        assert!(LiveForm::new(&validator, "missing").is_err());
    }
}
