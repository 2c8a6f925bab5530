//! CLI command definitions for formguard
//!
//! Provides Clap-based commands for validating a values file against a
//! schema document, re-checking one field, and inspecting a document.

use clap::{Parser, Subcommand};
use formguard_core::{
    DefinitionFormat, EvaluationPolicy, FieldResult, FormReport, FormValidator, SchemaDocument,
    SchemaRegistry, ValidatorConfig,
};
use std::io;
use std::path::{Path, PathBuf};

use super::output::{render_summaries, FormSummary, OutputFormat, ReportOutput};
use super::ExitCode;
use crate::error::{CliError, Result};

/// formguard CLI
///
/// Validate form values against declarative schema documents.
#[derive(Parser, Debug)]
#[command(name = "formguard")]
#[command(about = "Validate form values against rule-based schemas", long_about = None)]
#[command(version)]
pub struct FormguardCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: FormguardCommands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum FormguardCommands {
    /// Validate every field of a form
    ///
    /// Reads the schema document and a values file (an object of field name
    /// to value) and reports each field's violations.
    Validate {
        /// Path to the schema document (json, yaml, yml, toml)
        #[arg(short, long)]
        schema: PathBuf,

        /// Path to the values file (json, yaml, yml, toml)
        #[arg(long)]
        values: PathBuf,

        /// Form to validate; optional when the document defines one form
        #[arg(short, long)]
        form: Option<String>,

        /// Evaluation policy per field (accumulate, short-circuit)
        ///
        /// Defaults to FORMGUARD_POLICY, then accumulate.
        #[arg(short, long)]
        policy: Option<EvaluationPolicy>,

        /// Treat unknown rule kinds as faults instead of passing them
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Re-check a single field the way a live UI does on input or blur
    Check {
        /// Path to the schema document
        #[arg(short, long)]
        schema: PathBuf,

        /// Form the field belongs to
        #[arg(short, long)]
        form: String,

        /// Field to check
        #[arg(long)]
        field: String,

        /// Field value; treated as text unless --json is given
        #[arg(long)]
        value: Option<String>,

        /// Parse --value as JSON
        #[arg(long)]
        json: bool,

        /// Report every failing rule instead of the first
        #[arg(long)]
        all: bool,

        /// Treat unknown rule kinds as faults instead of passing them
        #[arg(long)]
        strict: bool,
    },

    /// List the forms, fields and rules of a schema document
    Inspect {
        /// Path to the schema document
        #[arg(short, long)]
        schema: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

/// Execute the validate command
pub fn execute_validate(
    schema: &Path,
    values: &Path,
    form: Option<&str>,
    policy: Option<EvaluationPolicy>,
    strict: bool,
    format: OutputFormat,
) -> Result<ExitCode> {
    let report = run_validate(schema, values, form, policy, strict)?;
    ReportOutput::from_report(&report).render(format)?;
    Ok(ExitCode::from_validation_result(report.valid))
}

/// Load the schema and values and produce the form report
pub fn run_validate(
    schema: &Path,
    values: &Path,
    form: Option<&str>,
    policy: Option<EvaluationPolicy>,
    strict: bool,
) -> Result<FormReport> {
    let (registry, forms) = load_registry(schema)?;
    let form = select_form(&forms, form)?;

    let values: serde_json::Value = parse_file(values)?;
    if !values.is_object() {
        return Err(CliError::invalid_input(
            "values file must contain an object of field names to values",
        ));
    }

    let config = config_with_overrides(policy, strict);
    let validator = FormValidator::with_config(&registry, config);
    Ok(validator.validate(&form, &values)?)
}

/// Execute the check command
pub fn execute_check(
    schema: &Path,
    form: &str,
    field: &str,
    value: Option<&str>,
    json: bool,
    all: bool,
    strict: bool,
) -> Result<ExitCode> {
    let result = run_check(schema, form, field, value, json, all, strict)?;

    match result.first_message() {
        None => println!("{}: valid", field),
        Some(_) => {
            for message in &result.messages {
                println!("{}: {}", field, message);
            }
            if let Some(fault) = &result.fault {
                println!("{}: fault: {}", field, fault);
            }
        }
    }

    Ok(ExitCode::from_validation_result(result.is_valid()))
}

/// Evaluate one field of a form
pub fn run_check(
    schema: &Path,
    form: &str,
    field: &str,
    value: Option<&str>,
    json: bool,
    all: bool,
    strict: bool,
) -> Result<FieldResult> {
    let (registry, _) = load_registry(schema)?;

    let value = match (value, json) {
        (None, _) => serde_json::Value::Null,
        (Some(raw), true) => serde_json::from_str(raw)
            .map_err(|e| CliError::invalid_input(format!("--value is not valid JSON: {}", e)))?,
        (Some(raw), false) => serde_json::Value::String(raw.to_string()),
    };

    let mut config = config_with_overrides(None, strict);
    if all {
        config.live_policy = EvaluationPolicy::Accumulate;
    }

    let validator = FormValidator::with_config(&registry, config);
    Ok(validator.evaluate_field(form, field, &value)?)
}

/// Execute the inspect command
pub fn execute_inspect(schema: &Path, format: OutputFormat) -> Result<ExitCode> {
    let (registry, forms) = load_registry(schema)?;

    let mut summaries = Vec::with_capacity(forms.len());
    for name in &forms {
        let schema = registry.get_schema(name)?;
        summaries.push(FormSummary::from_schema(name, &schema));
    }

    render_summaries(&summaries, format, &mut io::stdout())?;
    Ok(ExitCode::Success)
}

/// Environment configuration with command-line overrides applied
fn config_with_overrides(policy: Option<EvaluationPolicy>, strict: bool) -> ValidatorConfig {
    let mut config = ValidatorConfig::from_env();
    if let Some(policy) = policy {
        config.policy = policy;
    }
    if strict {
        config.strictness = formguard_core::Strictness::Strict;
    }
    config
}

/// Parse a schema document and register every form it defines.
///
/// Returns the registry and the form names in document order.
pub fn load_registry(path: &Path) -> Result<(SchemaRegistry, Vec<String>)> {
    let document: SchemaDocument = parse_file(path)?;
    if document.forms.is_empty() {
        return Err(CliError::invalid_input(format!(
            "schema document '{}' defines no forms",
            path.display()
        )));
    }

    let mut registry = SchemaRegistry::new();
    let forms = registry.define_document(document)?;
    tracing::info!(path = %path.display(), forms = forms.len(), "Loaded schema document");
    Ok((registry, forms))
}

fn select_form(forms: &[String], requested: Option<&str>) -> Result<String> {
    match requested {
        Some(name) => Ok(name.to_string()),
        None if forms.len() == 1 => Ok(forms[0].clone()),
        None => Err(CliError::invalid_input(format!(
            "document defines several forms ({}); choose one with --form",
            forms.join(", ")
        ))),
    }
}

/// Read and parse a file based on its extension
fn parse_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    let format = DefinitionFormat::from_extension(extension).ok_or_else(|| {
        CliError::invalid_input(format!(
            "Unsupported file format: {}. Supported formats: json, yaml, yml, toml",
            extension
        ))
    })?;

    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::file_error(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    Ok(format.parse(&content)?)
}
