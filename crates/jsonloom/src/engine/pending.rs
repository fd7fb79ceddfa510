//! Bookkeeping created during traversal and consumed by the cleanup passes.

use crate::engine::value::Value;

/// Where a patched reference lands on its parent target.
#[derive(Debug, Clone)]
pub(crate) enum RefSlot {
    /// Named field on an object instance.
    Field(String),
    /// Slot in a `Vec`-backed array holding a placeholder.
    Index(usize),
    /// Deferred append into a non-indexable collection.
    Append,
    /// Value slot of a recorded missing-field entry: the leftover had no
    /// declared field to land on, but its resolved value still reaches the
    /// callback.
    Missing(usize),
}

/// A forward reference seen during traversal. Consumed once at patch time,
/// in insertion order.
#[derive(Debug, Clone)]
pub(crate) struct UnresolvedReference {
    pub parent: Value,
    pub slot: RefSlot,
    pub ref_id: u64,
}

/// A source field with no declared counterpart on the target type.
#[derive(Debug, Clone)]
pub(crate) struct MissingFieldEntry {
    pub target: Value,
    pub field: String,
    pub value: Value,
}

/// A hash-based container to re-insert after identities stabilize.
#[derive(Debug, Clone)]
pub(crate) enum RehashEntry {
    /// Map populated from its resolved key/item arrays.
    Map {
        target: Value,
        keys: Value,
        items: Value,
    },
    /// Set whose element fingerprints may have gone stale.
    Set { target: Value },
}
