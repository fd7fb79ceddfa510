//! Record-shape strategies.
//!
//! The two resolve modes differ in exactly two decisions: what shell a record
//! node gets, and whether source fields absent from the descriptor count as
//! missing. Everything else — factories, conversion probes, reference and
//! rehash bookkeeping — is shared traversal code.

use crate::engine::value::{Instance, Value};
use crate::types::TypeDescriptor;

pub(crate) trait RecordStrategy {
    /// Shell target for a record node that neither a factory nor the scalar
    /// converter claimed. `declared` is the (coerced) wire type name,
    /// `descriptor` its registry entry when one exists.
    fn make_target(&self, declared: Option<&str>, descriptor: Option<&TypeDescriptor>) -> Value;

    /// Whether undeclared source fields become missing-field entries instead
    /// of being stored on the target.
    fn tracks_missing_fields(&self) -> bool;
}

/// Builds typed instances. Only registered descriptors produce a typed
/// shell; an unregistered declared type degrades to a generic map.
pub(crate) struct ObjectStrategy;

impl RecordStrategy for ObjectStrategy {
    fn make_target(&self, _declared: Option<&str>, descriptor: Option<&TypeDescriptor>) -> Value {
        match descriptor {
            Some(desc) => Value::object(Instance::typed(desc.name())),
            None => Value::object(Instance::generic()),
        }
    }

    fn tracks_missing_fields(&self) -> bool {
        true
    }
}

/// Keeps record nodes as generic insertion-ordered maps. The declared type
/// name is preserved for provenance — registered or not — and every source
/// field is kept.
pub(crate) struct MapStrategy;

impl RecordStrategy for MapStrategy {
    fn make_target(&self, declared: Option<&str>, descriptor: Option<&TypeDescriptor>) -> Value {
        let name = descriptor.map(TypeDescriptor::name).or(declared);
        match name {
            Some(name) => Value::object(Instance::typed(name)),
            None => Value::object(Instance::generic()),
        }
    }

    fn tracks_missing_fields(&self) -> bool {
        false
    }
}
