//! Arena nodes for parsed documents.

use indexmap::IndexMap;

use crate::Scalar;

/// Handle to a node inside a [`Document`](crate::Document) arena.
///
/// Comparing two handles is O(1). A `NodeId` is only meaningful for the
/// document that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Raw index for debugging.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Create a NodeId from a raw index. Use only inside the owning document.
    #[inline]
    pub(crate) fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A child slot: either an in-place scalar or a handle to a nested node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Scalar(Scalar),
    Node(NodeId),
}

impl NodeValue {
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            NodeValue::Scalar(s) => Some(s),
            NodeValue::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            NodeValue::Node(id) => Some(*id),
            NodeValue::Scalar(_) => None,
        }
    }
}

/// One parsed node: markers, an ordered field map, and container payloads.
///
/// Shape is derived, not stored:
/// - `ref_id` set → pure reference (alias); no other content is allowed
/// - `keys` set → map shape (`keys.len() == items.len()` holds post-parse)
/// - `items` set without `keys` → array/collection shape
/// - otherwise → record shape (possibly with a scalar `value` payload)
#[derive(Debug, Clone, Default)]
pub struct Node {
    /// `@id` marker: document-scoped identity.
    pub id: Option<u64>,
    /// `@ref` marker: this node is an alias for another identity.
    pub ref_id: Option<u64>,
    /// `@type` marker: declared type name, resolved later against a registry.
    pub type_name: Option<String>,
    /// Record fields in source order.
    pub fields: IndexMap<String, NodeValue>,
    /// `@keys` payload for map-shaped nodes.
    pub keys: Option<Vec<NodeValue>>,
    /// `@items` payload for array/collection/map/enum-set shapes.
    pub items: Option<Vec<NodeValue>>,
    /// Scalar payload for scalar documents and conversion sources.
    pub value: Option<Scalar>,
}

impl Node {
    /// Pure reference: an alias carrying nothing but `@ref`.
    pub fn is_ref(&self) -> bool {
        self.ref_id.is_some()
    }

    pub fn is_map(&self) -> bool {
        self.keys.is_some()
    }

    pub fn is_array(&self) -> bool {
        self.items.is_some() && self.keys.is_none()
    }

    pub fn is_record(&self) -> bool {
        !self.is_ref() && !self.is_map() && self.items.is_none()
    }

    /// Carries a scalar payload usable as a conversion source.
    pub fn has_scalar_value(&self) -> bool {
        self.value.is_some()
    }
}
