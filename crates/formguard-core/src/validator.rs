//! Form validator
//!
//! Resolves a schema from the registry and runs the rule evaluator over
//! every declared field. Failures confined to one field are recorded in that
//! field's result; only a failed schema or field lookup aborts the call.

use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::config::ValidatorConfig;
use crate::error::{FormError, Result};
use crate::evaluator::{EvaluationPolicy, RuleEvaluator};
use crate::registry::SchemaRegistry;
use crate::report::{FieldResult, FormReport};
use crate::rule::FieldValue;
use crate::schema::FieldSpec;

/// Read-only source of submitted field values.
///
/// A missing key is reported as `None` and evaluated as null.
pub trait FieldSource {
    fn field_value(&self, name: &str) -> Option<&FieldValue>;
}

impl<S: BuildHasher> FieldSource for HashMap<String, FieldValue, S> {
    fn field_value(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }
}

impl FieldSource for BTreeMap<String, FieldValue> {
    fn field_value(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }
}

impl FieldSource for IndexMap<String, FieldValue> {
    fn field_value(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }
}

impl FieldSource for serde_json::Map<String, FieldValue> {
    fn field_value(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }
}

/// A JSON object is a value source; any other JSON value has no fields
impl FieldSource for FieldValue {
    fn field_value(&self, name: &str) -> Option<&FieldValue> {
        self.as_object().and_then(|map| map.get(name))
    }
}

static NULL: FieldValue = FieldValue::Null;

/// Validates submitted values against registered schemas
#[derive(Debug, Clone)]
pub struct FormValidator<'r> {
    registry: &'r SchemaRegistry,
    config: ValidatorConfig,
}

impl<'r> FormValidator<'r> {
    /// Validator with the default configuration
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_config(registry, ValidatorConfig::default())
    }

    /// Validator with an explicit configuration
    pub fn with_config(registry: &'r SchemaRegistry, config: ValidatorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    fn evaluator(&self) -> RuleEvaluator {
        RuleEvaluator::new(self.config.strictness)
    }

    /// Validate every field of `schema_name` using the configured
    /// whole-form policy (accumulate by default)
    pub fn validate<V>(&self, schema_name: &str, values: &V) -> Result<FormReport>
    where
        V: FieldSource + ?Sized,
    {
        self.validate_with_policy(schema_name, values, self.config.policy)
    }

    /// Validate every field of `schema_name` with an explicit policy
    pub fn validate_with_policy<V>(
        &self,
        schema_name: &str,
        values: &V,
        policy: EvaluationPolicy,
    ) -> Result<FormReport>
    where
        V: FieldSource + ?Sized,
    {
        let schema = self.registry.get_schema(schema_name)?;
        let evaluator = self.evaluator();

        let fields: IndexMap<String, FieldResult> = schema
            .fields()
            .map(|(name, spec)| {
                let value = values.field_value(name).unwrap_or(&NULL);
                let result = run_field(&evaluator, schema_name, name, spec, value, policy);
                (name.to_string(), result)
            })
            .collect();

        let report = FormReport::new(schema_name, policy, fields);
        tracing::debug!(
            schema = %schema_name,
            %policy,
            valid = report.valid,
            invalid_fields = report.invalid_fields().len(),
            "Validated form"
        );
        Ok(report)
    }

    /// Re-check a single field with the live policy (short-circuit by
    /// default), as done on input or blur
    pub fn evaluate_field(
        &self,
        schema_name: &str,
        field_id: &str,
        value: &FieldValue,
    ) -> Result<FieldResult> {
        self.evaluate_field_with_policy(schema_name, field_id, value, self.config.live_policy)
    }

    /// Re-check a single field with an explicit policy
    pub fn evaluate_field_with_policy(
        &self,
        schema_name: &str,
        field_id: &str,
        value: &FieldValue,
        policy: EvaluationPolicy,
    ) -> Result<FieldResult> {
        let schema = self.registry.get_schema(schema_name)?;
        let spec = schema
            .get_field(field_id)
            .ok_or_else(|| FormError::field_not_found(schema_name, field_id))?;

        Ok(run_field(&self.evaluator(), schema_name, field_id, spec, value, policy))
    }
}

fn run_field(
    evaluator: &RuleEvaluator,
    schema_name: &str,
    field: &str,
    spec: &FieldSpec,
    value: &FieldValue,
    policy: EvaluationPolicy,
) -> FieldResult {
    let evaluation = evaluator.evaluate(value, spec.rules(), policy);
    match evaluation.fault {
        None => FieldResult::from_messages(evaluation.messages),
        Some(error) => {
            tracing::warn!(
                schema = %schema_name,
                field = %field,
                error = %error,
                "Field rules could not be evaluated"
            );
            FieldResult::faulted_with(evaluation.messages, &error)
        }
    }
}
