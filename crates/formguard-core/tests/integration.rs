//! Integration tests for formguard-core
//!
//! Covers:
//! - End-to-end form validation against registered schemas
//! - Schema documents parsed from text and registered in bulk
//! - Report validity and idempotence properties

use formguard_core::{
    DefinitionFormat, EvaluationPolicy, FieldEvent, FieldSpec, FieldState, FormError,
    FormValidator, LiveForm, Rule, RuleOutcome, Schema, SchemaDocument, SchemaRegistry,
    ValidatorConfig,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;

const EMAIL_REGEX: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Helper to build the registration schema used across tests
fn signup_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.define_schema(
        "signup",
        Schema::new()
            .field(
                "username",
                FieldSpec::with_rules([Rule::required(), Rule::min_length(3), Rule::max_length(20)])
                    .meta("errorElement", "#username-error"),
            )
            .field(
                "email",
                FieldSpec::with_rules([Rule::required(), Rule::pattern(EMAIL_REGEX).unwrap()]),
            ),
    );
    registry
}

#[test]
fn test_end_to_end_invalid_submission() {
    let registry = signup_registry();
    let validator = FormValidator::new(&registry);

    let report = validator
        .validate("signup", &json!({"username": "ab", "email": "bad"}))
        .unwrap();

    assert!(!report.valid);
    assert_eq!(report.messages("username"), ["Minimum length is 3."]);
    assert_eq!(report.messages("email"), ["Invalid format."]);

    let errors = report.error_map();
    assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["username", "email"]);
}

#[test]
fn test_end_to_end_valid_submission() {
    let registry = signup_registry();
    let validator = FormValidator::new(&registry);

    let report = validator
        .validate("signup", &json!({"username": "alice", "email": "a@b.com"}))
        .unwrap();

    assert!(report.valid);
    assert!(report.messages("username").is_empty());
    assert!(report.messages("email").is_empty());
    assert!(report.error_map().is_empty());
}

#[test]
fn test_values_are_not_mutated() {
    let registry = signup_registry();
    let validator = FormValidator::new(&registry);
    let values = json!({"username": "  ab  ", "extra": [1, 2, 3]});
    let snapshot = values.clone();

    validator.validate("signup", &values).unwrap();
    assert_eq!(values, snapshot);
}

#[test]
fn test_unregistered_schema_is_hard_failure() {
    let registry = signup_registry();
    let validator = FormValidator::new(&registry);

    let result = validator.validate("checkout", &json!({}));
    assert!(matches!(result, Err(FormError::SchemaNotFound { name }) if name == "checkout"));
}

#[test]
fn test_custom_rule_fault_is_scoped_to_field() {
    let mut registry = signup_registry();
    registry.define_schema(
        "profile",
        Schema::new()
            .field(
                "handle",
                FieldSpec::with_rules([Rule::try_custom("availability", |_| {
                    Err("lookup table missing".to_string())
                })]),
            )
            .field(
                "bio",
                FieldSpec::with_rules([Rule::custom("no-links", |value| {
                    if value.as_str().map_or(false, |s| s.contains("http")) {
                        RuleOutcome::fail("Links are not allowed.")
                    } else {
                        RuleOutcome::pass()
                    }
                })]),
            ),
    );

    let validator = FormValidator::new(&registry);
    let report = validator
        .validate("profile", &json!({"handle": "x", "bio": "see http://x"}))
        .unwrap();

    assert_eq!(
        report.messages("handle"),
        ["Custom rule 'availability' failed: lookup table missing"]
    );
    assert_eq!(report.messages("bio"), ["Links are not allowed."]);
}

#[test]
fn test_document_registration_and_strictness() {
    let content = r##"
registrationForm:
  username:
    errorElement: "#username-error"
    rules:
      - { type: required, message: "Username is required." }
      - { type: minLength, value: 3, message: "Username must be at least 3 characters long." }
      - { type: maxLength, value: 20, message: "Username must not exceed 20 characters." }
      - { type: pattern, value: "/^[a-zA-Z0-9_]+$/", message: "Username can only contain letters, numbers, and underscores." }
  email:
    errorElement: "#email-error"
    rules:
      - { type: required, message: "Email is required." }
      - { type: pattern, value: '/^[^\s@]+@[^\s@]+\.[^\s@]+$/', message: "Please enter a valid email address." }
      - { type: disposable }
"##;

    let mut registry = SchemaRegistry::new();
    let document = SchemaDocument::parse(content, DefinitionFormat::Yaml).unwrap();
    let names = registry.define_document(document).unwrap();
    assert_eq!(names, vec!["registrationForm"]);

    let values = json!({"username": "bad name!", "email": "a@b.com"});

    let lenient = FormValidator::new(&registry);
    let report = lenient.validate("registrationForm", &values).unwrap();
    assert_eq!(
        report.messages("username"),
        ["Username can only contain letters, numbers, and underscores."]
    );
    assert!(report.field("email").unwrap().is_valid());

    let strict = FormValidator::with_config(&registry, ValidatorConfig::builder().strict(true).build());
    let report = strict.validate("registrationForm", &values).unwrap();
    assert_eq!(
        report.field("email").unwrap().fault.as_deref(),
        Some("Unknown rule kind: disposable")
    );

    let report = strict
        .validate("registrationForm", &json!({"username": "ada", "email": "bad"}))
        .unwrap();
    let email = report.field("email").unwrap();
    assert_eq!(email.messages, vec!["Please enter a valid email address."]);
    assert_eq!(email.fault.as_deref(), Some("Unknown rule kind: disposable"));
    assert_eq!(
        report.error_map()["email"],
        vec!["Please enter a valid email address.", "Unknown rule kind: disposable"]
    );
}

#[test]
fn test_bad_document_registers_nothing() {
    let content = r#"{
        "a": {"name": {"rules": ["required"]}},
        "b": {"name": {"rules": ["pattern:("]}}
    }"#;
    let mut registry = SchemaRegistry::new();
    let document = SchemaDocument::parse(content, DefinitionFormat::Json).unwrap();

    assert!(registry.define_document(document).is_err());
    assert!(registry.is_empty());
}

#[test]
fn test_live_form_against_registered_schema() {
    let registry = signup_registry();
    let validator = FormValidator::new(&registry);
    let mut form = LiveForm::new(&validator, "signup").unwrap();

    form.handle(&validator, "email", FieldEvent::Input, &json!("a@"))
        .unwrap();
    assert_eq!(form.state("email"), Some(FieldState::Invalid));
    assert_eq!(
        form.result("email").unwrap().first_message(),
        Some("Invalid format.")
    );

    form.handle(&validator, "email", FieldEvent::Blur, &json!("a@b.io"))
        .unwrap();
    assert_eq!(form.state("email"), Some(FieldState::Valid));
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        "[a-z_!@. ]{0,12}".prop_map(Value::String),
    ]
}

proptest! {
    #[test]
    fn prop_valid_iff_every_field_empty(
        username in arb_value(),
        email in arb_value(),
        short_circuit in any::<bool>(),
    ) {
        let registry = signup_registry();
        let validator = FormValidator::new(&registry);
        let policy = if short_circuit {
            EvaluationPolicy::ShortCircuit
        } else {
            EvaluationPolicy::Accumulate
        };

        let mut values = HashMap::new();
        values.insert("username".to_string(), username);
        values.insert("email".to_string(), email);

        let report = validator.validate_with_policy("signup", &values, policy).unwrap();
        let all_empty = report.fields.values().all(|r| r.messages.is_empty() && r.fault.is_none());
        prop_assert_eq!(report.valid, all_empty);
    }

    #[test]
    fn prop_validate_is_idempotent(username in arb_value(), email in arb_value()) {
        let registry = signup_registry();
        let validator = FormValidator::new(&registry);
        let values = json!({"username": username, "email": email});

        let first = validator.validate("signup", &values).unwrap();
        let second = validator.validate("signup", &values).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_length_bounds_are_inclusive(s in "[a-z]{0,30}") {
        let len = s.chars().count();
        let mut registry = SchemaRegistry::new();
        registry.define_schema(
            "exact",
            Schema::new().field(
                "value",
                FieldSpec::with_rules([Rule::min_length(len), Rule::max_length(len)]),
            ),
        );
        let validator = FormValidator::new(&registry);
        let report = validator.validate("exact", &json!({"value": s})).unwrap();
        prop_assert!(report.valid);
    }

    #[test]
    fn prop_short_circuit_reports_at_most_one(s in "[ a-z]{0,25}") {
        let registry = signup_registry();
        let validator = FormValidator::new(&registry);
        let result = validator
            .evaluate_field_with_policy("signup", "username", &json!(s), EvaluationPolicy::ShortCircuit)
            .unwrap();
        prop_assert!(result.messages.len() <= 1);
    }
}
