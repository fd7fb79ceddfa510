//! Errors that can occur during graph resolution.

/// Resolution faults. Any of these aborts the entire resolve call; the
/// resolver does not attempt partial recovery.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolveError {
    /// A `@ref` names an id with no reachable definition, or a definition
    /// whose target never materialized.
    #[error("reference to unknown @id {0}")]
    UnknownReference(u64),

    /// No factory, no conversion, and default construction failed.
    #[error("cannot instantiate `{type_name}`: {reason}")]
    Instantiation { type_name: String, reason: String },

    /// A field write was refused (undeclared field or declared-type mismatch).
    #[error("cannot assign field `{field}` on `{type_name}`")]
    FieldAccess { type_name: String, field: String },

    /// A factory gathered a field whose forward reference has no target yet;
    /// gathered values are consumed immediately and cannot be patched later.
    #[error("cannot gather field `{field}`: @ref {ref_id} has no resolved target")]
    GatherUnresolved { field: String, ref_id: u64 },

    /// An element is incompatible with the declared component type.
    #[error("array element {index} does not fit element type `{expected}`")]
    ArrayElementMismatch { index: usize, expected: String },

    /// The resolved graph is not assignable or convertible to the requested
    /// root type.
    #[error("root value is not assignable to `{expected}`")]
    RootTypeMismatch { expected: String },

    /// A structural invariant was violated mid-resolve.
    #[error("malformed node: {0}")]
    CorruptNode(String),
}
