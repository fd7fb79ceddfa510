//! High-level reading facade.
//!
//! A [`Reader`] bundles the three read-only inputs of resolution — type
//! registry, factory registry, options — and runs parse + resolve in one
//! step. Callers that already hold a parsed [`Document`] can resolve it
//! directly.

use jsonloom_core::Document;

use crate::engine::{Diagnostics, FactoryRegistry, ReadOptions, ResolveError, Resolver, Value};
use crate::types::{FieldType, TypeRegistry};

/// Outcome of a resolve pass: the value plus collected diagnostics.
#[derive(Debug)]
pub struct Resolved {
    pub value: Value,
    pub diagnostics: Diagnostics,
}

/// Reusable reading facade. Construction is fluent; reading is `&self`.
#[derive(Debug, Default)]
pub struct Reader {
    types: TypeRegistry,
    factories: FactoryRegistry,
    options: ReadOptions,
}

impl Reader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    pub fn with_factories(mut self, factories: FactoryRegistry) -> Self {
        self.factories = factories;
        self
    }

    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// Incremental registration after construction.
    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub fn factories_mut(&mut self) -> &mut FactoryRegistry {
        &mut self.factories
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Parse and resolve wire JSON.
    pub fn read_str(&self, json: &str) -> crate::Result<Resolved> {
        let mut doc = Document::from_json(json)?;
        self.resolve(&mut doc).map_err(Into::into)
    }

    /// Parse and resolve wire JSON, requiring assignability to `declared`.
    pub fn read_str_as(&self, json: &str, declared: FieldType) -> crate::Result<Resolved> {
        let mut doc = Document::from_json(json)?;
        self.resolve_as(&mut doc, declared).map_err(Into::into)
    }

    /// Resolve an already-parsed `serde_json::Value`.
    pub fn read_value(&self, value: serde_json::Value) -> crate::Result<Resolved> {
        let mut doc = Document::from_value(value)?;
        self.resolve(&mut doc).map_err(Into::into)
    }

    /// Resolve a parsed document.
    pub fn resolve(&self, doc: &mut Document) -> Result<Resolved, ResolveError> {
        let mut resolver = Resolver::new(doc, &self.types, &self.factories, &self.options);
        let value = resolver.resolve()?;
        Ok(Resolved {
            value,
            diagnostics: resolver.into_diagnostics(),
        })
    }

    /// Resolve a parsed document against a declared root type.
    pub fn resolve_as(
        &self,
        doc: &mut Document,
        declared: FieldType,
    ) -> Result<Resolved, ResolveError> {
        let mut resolver = Resolver::new(doc, &self.types, &self.factories, &self.options);
        let value = resolver.resolve_as(declared)?;
        Ok(Resolved {
            value,
            diagnostics: resolver.into_diagnostics(),
        })
    }
}
