//! Schemas: the fields of one form and the rules applied to each
//!
//! Fields keep their insertion order, which is also the order in which they
//! are evaluated and reported.

use indexmap::IndexMap;

use crate::rule::Rule;

/// Presentation metadata attached to a field.
///
/// The core never reads it; it is handed back to the UI layer unchanged,
/// in authoring order (e.g. `errorSelector`, `inputSelector`).
pub type FieldMetadata = IndexMap<String, serde_json::Value>;

/// Rules and presentation metadata for one field
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    rules: Vec<Rule>,
    metadata: FieldMetadata,
}

impl FieldSpec {
    /// Create a field spec with no rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a field spec from a list of rules
    pub fn with_rules(rules: impl IntoIterator<Item = Rule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
            metadata: FieldMetadata::new(),
        }
    }

    /// Append a rule
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Attach a metadata entry
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Replace the metadata map
    pub fn with_metadata(mut self, metadata: FieldMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Rules in declared order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Presentation metadata
    pub fn metadata(&self) -> &FieldMetadata {
        &self.metadata
    }
}

/// Ordered mapping from field name to [`FieldSpec`]
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldSpec>,
}

impl Schema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any earlier spec with the same name in place
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.insert(name, spec);
        self
    }

    /// Add a field in place
    pub fn insert(&mut self, name: impl Into<String>, spec: FieldSpec) {
        self.fields.insert(name.into(), spec);
    }

    /// Look up a field spec
    pub fn get_field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Fields in declared order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Field names in declared order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of rules across all fields
    pub fn rule_count(&self) -> usize {
        self.fields.values().map(|spec| spec.rules.len()).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, FieldSpec)> for Schema {
    fn from_iter<I: IntoIterator<Item = (S, FieldSpec)>>(iter: I) -> Self {
        let mut schema = Schema::new();
        for (name, spec) in iter {
            schema.insert(name, spec);
        }
        schema
    }
}
