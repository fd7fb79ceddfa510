//! Node arena and identity reference table.

use indexmap::IndexMap;

use crate::node::{Node, NodeId};

/// Errors raised while building a document from wire input.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// `@id` values are document-scoped and write-once.
    #[error("duplicate @id {0}")]
    DuplicateId(u64),

    /// A `@ref` node may carry an `@id` (alias definition) but nothing else.
    #[error("@ref node carries extra content")]
    RefWithContent,

    #[error("@keys requires a matching @items array")]
    KeysWithoutItems,

    #[error("@keys and @items lengths differ ({keys} vs {items})")]
    KeysItemsLengthMismatch { keys: usize, items: usize },

    #[error("marker {marker} must be {expected}")]
    BadMarker {
        marker: &'static str,
        expected: &'static str,
    },
}

/// Identity map from `@id` → defining node. Write-once per id.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    by_id: IndexMap<u64, NodeId>,
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, id: u64, node: NodeId) -> Result<(), DocumentError> {
        if self.by_id.insert(id, node).is_some() {
            return Err(DocumentError::DuplicateId(id));
        }
        Ok(())
    }

    /// Direct lookup; does not chase alias chains.
    pub fn get(&self, id: u64) -> Option<NodeId> {
        self.by_id.get(&id).copied()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, NodeId)> + '_ {
        self.by_id.iter().map(|(&id, &node)| (id, node))
    }
}

/// A parsed document: node arena, reference table, and the root handle.
///
/// The front-end populates the reference table for every node carrying an
/// `@id`; the resolver only reads it.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    refs: ReferenceTable,
    root: Option<NodeId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node, registering its `@id` if present.
    pub fn push(&mut self, node: Node) -> Result<NodeId, DocumentError> {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        if let Some(marker) = node.id {
            self.refs.insert(marker, id)?;
        }
        self.nodes.push(node);
        Ok(id)
    }

    /// Append a node without touching the reference table.
    ///
    /// Used by the resolver for synthetic key/item arrays split off a
    /// map-shaped node.
    pub fn push_synthetic(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn refs(&self) -> &ReferenceTable {
        &self.refs
    }

    /// Resolve an `@id` to its defining node, chasing pure-`@ref` alias
    /// chains. Returns `None` when the chain terminates in absence or loops.
    pub fn deref(&self, id: u64) -> Option<NodeId> {
        let mut current = id;
        // A chain longer than the arena must contain a loop.
        for _ in 0..=self.nodes.len() {
            let node_id = self.refs.get(current)?;
            let node = self.node(node_id);
            match node.ref_id {
                Some(next) => current = next,
                None => return Some(node_id),
            }
        }
        None
    }
}
