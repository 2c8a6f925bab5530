//! formguard core
//!
//! A declarative, rule-based validation engine for form field values.
//!
//! ## Architecture
//!
//! 1. **Registry** (`registry`): named [`Schema`]s, one per logical form.
//!
//! 2. **Rules** (`rule`, `parse`): the closed set of rule kinds, their
//!    default messages, and the legacy string encoding (`"minLength:3"`).
//!
//! 3. **Evaluator** (`evaluator`): checks one value against an ordered rule
//!    list under a short-circuit or accumulate policy.
//!
//! 4. **Validator** (`validator`): runs the evaluator over every field of a
//!    schema and aggregates a [`FormReport`].
//!
//! 5. **Live state** (`live`): per-field `Pristine → Validating → Valid |
//!    Invalid` tracking for input/blur driven re-checks.
//!
//! 6. **Definitions** (`definition`): schemas authored as JSON, YAML or TOML.
//!
//! Evaluation is synchronous and performs no I/O. The registry is not
//! internally synchronized; see [`SchemaRegistry`].
//!
//! ## Example
//!
//! ```rust
//! use formguard_core::{FieldSpec, FormValidator, Rule, Schema, SchemaRegistry};
//! use serde_json::json;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.define_schema(
//!     "signup",
//!     Schema::new()
//!         .field(
//!             "username",
//!             FieldSpec::with_rules([Rule::required(), Rule::min_length(3), Rule::max_length(20)]),
//!         )
//!         .field("email", FieldSpec::with_rules([Rule::required(), Rule::email()])),
//! );
//!
//! let validator = FormValidator::new(&registry);
//! let report = validator
//!     .validate("signup", &json!({"username": "ab", "email": "a@b.com"}))
//!     .unwrap();
//!
//! assert!(!report.valid);
//! assert_eq!(report.messages("username"), ["Minimum length is 3."]);
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod evaluator;
pub mod live;
pub mod parse;
pub mod registry;
pub mod report;
pub mod rule;
pub mod schema;
pub mod validator;

pub use config::ValidatorConfig;
pub use definition::{
    DefinitionFormat, FieldDefinition, RuleDefinition, SchemaDefinition, SchemaDocument,
};
pub use error::{FormError, Result};
pub use evaluator::{Evaluation, EvaluationPolicy, RuleEvaluator, Strictness};
pub use live::{FieldEvent, FieldState, LiveForm};
pub use registry::SchemaRegistry;
pub use report::{FieldResult, FormReport};
pub use rule::{CustomRule, FieldValue, Rule, RuleKind, RuleOutcome};
pub use schema::{FieldMetadata, FieldSpec, Schema};
pub use validator::{FieldSource, FormValidator};

/// Library version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
