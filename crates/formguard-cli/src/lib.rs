//! formguard CLI
//!
//! Command-line front end for `formguard-core`: validate a values file
//! against a schema document, re-check a single field, or inspect a
//! document.
//!
//! ```bash
//! formguard validate --schema demos/registration.yaml --values demos/registration-values.json
//! formguard check --schema demos/registration.yaml --form registrationForm --field username --value ab
//! formguard inspect --schema demos/registration.yaml --format json
//! ```

pub mod commands;
pub mod error;
pub mod output;

pub use commands::{FormguardCli, FormguardCommands};
pub use error::CliError;
pub use output::{OutputFormat, ReportOutput};

use formguard_core::FormError;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// All checked values are valid
    Success = 0,
    /// At least one field is invalid
    ValidationFailed = 1,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Schema document could not be parsed or converted
    SchemaError = 5,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Determine exit code from a validation outcome
    pub fn from_validation_result(valid: bool) -> Self {
        if valid {
            ExitCode::Success
        } else {
            ExitCode::ValidationFailed
        }
    }

    /// Exit code for a failed command
    pub fn from_error(error: &CliError) -> Self {
        match error {
            CliError::InvalidInput(_) => ExitCode::InvalidInput,
            CliError::FileError(_) => ExitCode::FileError,
            CliError::Form(FormError::SchemaNotFound { .. } | FormError::FieldNotFound { .. }) => {
                ExitCode::InvalidInput
            }
            CliError::Form(err) if err.is_schema_error() => ExitCode::SchemaError,
            CliError::Form(_) | CliError::SerializationError(_) => ExitCode::InternalError,
        }
    }
}

/// Run the CLI with the given arguments and return the exit code
pub fn run(cli: FormguardCli) -> Result<ExitCode, CliError> {
    match cli.command {
        FormguardCommands::Validate {
            schema,
            values,
            form,
            policy,
            strict,
            format,
        } => commands::execute_validate(&schema, &values, form.as_deref(), policy, strict, format),
        FormguardCommands::Check {
            schema,
            form,
            field,
            value,
            json,
            all,
            strict,
        } => commands::execute_check(&schema, &form, &field, value.as_deref(), json, all, strict),
        FormguardCommands::Inspect { schema, format } => commands::execute_inspect(&schema, format),
    }
}

/// Run the CLI, reporting errors on stderr
pub fn run_cli(cli: FormguardCli) -> ExitCode {
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from_error(&e)
        }
    }
}
