//! Output formatting for the formguard CLI
//!
//! Renders form reports and schema summaries as JSON, YAML, or a colored
//! human-readable table.

use clap::ValueEnum;
use colored::Colorize;
use formguard_core::{FieldResult, FormReport, Schema};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use crate::error::Result;

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

/// Status of a single field in rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Valid,
    Invalid,
    Fault,
}

impl FieldStatus {
    fn of(result: &FieldResult) -> Self {
        if result.fault.is_some() {
            FieldStatus::Fault
        } else if result.messages.is_empty() {
            FieldStatus::Valid
        } else {
            FieldStatus::Invalid
        }
    }
}

/// Per-field output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOutput {
    pub field: String,
    pub status: FieldStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

/// Report output structure for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    /// Form the values were checked against
    pub form: String,
    /// Overall validation status
    pub valid: bool,
    /// Policy used per field
    pub policy: String,
    /// Number of violation messages
    pub error_count: usize,
    /// Number of fields whose rules could not be evaluated
    pub fault_count: usize,
    /// Per-field results in schema order
    pub fields: Vec<FieldOutput>,
    /// Summary message
    pub summary: String,
}

impl ReportOutput {
    /// Create output from a form report
    pub fn from_report(report: &FormReport) -> Self {
        let error_count = report.message_count();
        let fault_count = report.fault_count();
        let invalid = report.invalid_fields().len();

        let summary = if report.valid {
            format!("Form '{}' is valid", report.schema)
        } else {
            format!(
                "Form '{}' has {} invalid field(s) with {} error(s)",
                report.schema, invalid, error_count
            )
        };

        let fields = report
            .fields
            .iter()
            .map(|(name, result)| FieldOutput {
                field: name.clone(),
                status: FieldStatus::of(result),
                messages: result.messages.clone(),
                fault: result.fault.clone(),
            })
            .collect();

        Self {
            form: report.schema.clone(),
            valid: report.valid,
            policy: report.policy.to_string(),
            error_count,
            fault_count,
            fields,
            summary,
        }
    }

    /// Render output in the specified format to stdout
    pub fn render(&self, format: OutputFormat) -> Result<()> {
        self.render_to(format, &mut io::stdout())
    }

    /// Render output in the specified format
    pub fn render_to(&self, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
        match format {
            OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(self)?)?,
            OutputFormat::Yaml => writeln!(out, "{}", serde_yaml::to_string(self)?)?,
            OutputFormat::Table => self.render_table(out)?,
        }
        Ok(())
    }

    fn render_table(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", "Validation Results".cyan().bold())?;
        writeln!(out, "{}", "=".repeat(60))?;
        writeln!(out)?;

        let status = if self.valid { "+".green() } else { "x".red() };
        writeln!(out, "{} {}", status, self.summary)?;
        writeln!(out, "  {} {}", "Policy:".dimmed(), self.policy)?;
        writeln!(out)?;

        writeln!(out, "{}", "Fields:".cyan().bold())?;
        writeln!(out, "{}", "-".repeat(60))?;
        for field in &self.fields {
            let marker = match field.status {
                FieldStatus::Valid => "+".green(),
                FieldStatus::Invalid => "x".red(),
                FieldStatus::Fault => "!".yellow(),
            };
            writeln!(out, "{} {}", marker, field.field.bold())?;
            for message in &field.messages {
                writeln!(out, "    {} {}", "-".red(), message)?;
            }
            if let Some(fault) = &field.fault {
                writeln!(out, "    {} {}", "fault:".yellow(), fault)?;
            }
        }
        writeln!(out)?;
        Ok(())
    }
}

/// Field entry in a schema summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSummary {
    pub name: String,
    pub rules: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<String>,
}

/// Form entry in a schema summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSummary {
    pub name: String,
    pub fields: Vec<FieldSummary>,
}

impl FormSummary {
    /// Summarize a registered schema
    pub fn from_schema(name: &str, schema: &Schema) -> Self {
        let fields = schema
            .fields()
            .map(|(field, spec)| FieldSummary {
                name: field.to_string(),
                rules: spec.rules().iter().map(|rule| rule.to_string()).collect(),
                metadata: spec.metadata().keys().cloned().collect(),
            })
            .collect();

        Self {
            name: name.to_string(),
            fields,
        }
    }
}

/// Render schema summaries in the requested format
pub fn render_summaries(
    summaries: &[FormSummary],
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(summaries)?)?,
        OutputFormat::Yaml => writeln!(out, "{}", serde_yaml::to_string(summaries)?)?,
        OutputFormat::Table => {
            for form in summaries {
                writeln!(out, "{}", format!("Form: {}", form.name).green().bold())?;
                for field in &form.fields {
                    writeln!(out, "  {} {}", "-".blue(), field.name.bold())?;
                    for rule in &field.rules {
                        writeln!(out, "      {}", rule)?;
                    }
                    if !field.metadata.is_empty() {
                        writeln!(
                            out,
                            "      {} {}",
                            "metadata:".dimmed(),
                            field.metadata.join(", ")
                        )?;
                    }
                }
                writeln!(out)?;
            }
        }
    }
    Ok(())
}
