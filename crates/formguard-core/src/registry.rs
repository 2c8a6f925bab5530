//! Schema registry
//!
//! Holds one [`Schema`] per form name. The registry is a plain value owned by
//! the host: it has no internal locking. Registration needs `&mut self`, so a
//! host that validates from several threads must wrap the registry in its own
//! lock (for example `std::sync::RwLock`). Schemas are handed out as
//! `Arc<Schema>`, so replacing a schema never affects an evaluation already
//! holding the previous one.

use std::collections::HashMap;
use std::sync::Arc;

use crate::definition::SchemaDocument;
use crate::error::{FormError, Result};
use crate::schema::Schema;

/// Named schemas, one per logical form
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `schema` under `name`, replacing any previous schema with that
    /// name. Rules are not checked here; problems surface at evaluation.
    pub fn define_schema(&mut self, name: impl Into<String>, schema: Schema) {
        let name = name.into();
        tracing::debug!(
            schema = %name,
            fields = schema.len(),
            rules = schema.rule_count(),
            "Registering schema"
        );
        if self.schemas.insert(name.clone(), Arc::new(schema)).is_some() {
            tracing::debug!(schema = %name, "Replaced existing schema");
        }
    }

    /// Register every form of a parsed schema document.
    ///
    /// All definitions are converted before any is stored, so a document
    /// with one bad rule registers nothing.
    pub fn define_document(&mut self, document: SchemaDocument) -> Result<Vec<String>> {
        let converted = document.into_schemas()?;
        let names = converted.iter().map(|(name, _)| name.clone()).collect();
        for (name, schema) in converted {
            self.define_schema(name, schema);
        }
        Ok(names)
    }

    /// Look up a schema by name
    pub fn get_schema(&self, name: &str) -> Result<Arc<Schema>> {
        self.schemas
            .get(name)
            .cloned()
            .ok_or_else(|| FormError::schema_not_found(name))
    }

    /// Whether a schema is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Remove a schema, returning it if it was registered
    pub fn remove(&mut self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.remove(name)
    }

    /// Registered schema names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
