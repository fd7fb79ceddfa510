//! jsonloom: reference-aware JSON object-graph reading.
//!
//! Reconstructs typed, possibly cyclic, in-memory object graphs from JSON
//! documents that carry identity markers (`@id`), reference markers (`@ref`),
//! and type hints (`@type`).
//!
//! # Example
//!
//! ```
//! use jsonloom::{FieldType, Reader, TypeDescriptor, TypeRegistry};
//!
//! let mut types = TypeRegistry::new();
//! types.register(
//!     TypeDescriptor::record("Point")
//!         .field("x", FieldType::Int)
//!         .field("y", FieldType::Int),
//! );
//!
//! let reader = Reader::new().with_types(types);
//! let resolved = reader
//!     .read_str(r#"{"@type": "Point", "x": 3, "y": 4}"#)
//!     .expect("valid document");
//!
//! assert_eq!(resolved.value.field("x").unwrap().as_i64(), Some(3));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod engine;
pub mod reader;
pub mod types;


pub use engine::{
    Diagnostic, Diagnostics, EnumValue, FactoryRegistry, Instance, MapValue, MissingFieldHandler,
    ReadOptions, ResolveError, ResolveMode, Resolver, ScalarConverter, Severity, SetValue, Value,
};
pub use reader::{Reader, Resolved};
pub use types::{FieldType, TypeDescriptor, TypeRegistry};

pub use jsonloom_core::{Document, DocumentError, Node, NodeId, NodeValue, Scalar};

/// Errors that can occur while reading a document end to end.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Result type for reader operations.
pub type Result<T> = std::result::Result<T, Error>;
