//! JSON front-end: wire text → [`Document`].
//!
//! The wire contract recognizes five marker keys on objects — `@id`, `@ref`,
//! `@type`, `@keys`, `@items` — and treats every other key as a record field.
//! Scalars are typed here, once; nested objects and arrays become arena nodes.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::document::{Document, DocumentError};
use crate::node::{Node, NodeValue};
use crate::scalar::Scalar;

const MARKER_ID: &str = "@id";
const MARKER_REF: &str = "@ref";
const MARKER_TYPE: &str = "@type";
const MARKER_KEYS: &str = "@keys";
const MARKER_ITEMS: &str = "@items";

/// Raw wire value, deserialized before marker recognition.
///
/// `IndexMap` keeps source field order, which the resolver preserves all the
/// way into resolved records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<RawValue>),
    Object(IndexMap<String, RawValue>),
}

impl Document {
    /// Parse wire JSON into a document.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let raw: RawValue = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Build a document from an already-parsed `serde_json::Value`.
    pub fn from_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        let raw: RawValue = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawValue) -> Result<Self, DocumentError> {
        let mut doc = Document::new();
        let root = lower(&mut doc, raw)?;
        let root_id = match root {
            NodeValue::Node(id) => id,
            // Scalar documents still need a node for the resolver to enter.
            NodeValue::Scalar(scalar) => doc.push(Node {
                value: Some(scalar),
                ..Node::default()
            })?,
        };
        doc.set_root(root_id);
        Ok(doc)
    }
}

/// Lower one raw value into the arena, returning the slot it occupies.
fn lower(doc: &mut Document, raw: RawValue) -> Result<NodeValue, DocumentError> {
    match raw {
        RawValue::Null => Ok(NodeValue::Scalar(Scalar::Null)),
        RawValue::Bool(b) => Ok(NodeValue::Scalar(Scalar::Bool(b))),
        RawValue::Int(i) => Ok(NodeValue::Scalar(Scalar::Int(i))),
        RawValue::Float(x) => Ok(NodeValue::Scalar(Scalar::Float(x))),
        RawValue::Str(s) => Ok(NodeValue::Scalar(Scalar::Str(s))),
        RawValue::Array(elems) => {
            let items = lower_all(doc, elems)?;
            let id = doc.push(Node {
                items: Some(items),
                ..Node::default()
            })?;
            Ok(NodeValue::Node(id))
        }
        RawValue::Object(map) => lower_object(doc, map).map(NodeValue::Node),
    }
}

fn lower_all(doc: &mut Document, elems: Vec<RawValue>) -> Result<Vec<NodeValue>, DocumentError> {
    elems.into_iter().map(|e| lower(doc, e)).collect()
}

fn lower_object(
    doc: &mut Document,
    map: IndexMap<String, RawValue>,
) -> Result<crate::NodeId, DocumentError> {
    let mut node = Node::default();

    for (key, value) in map {
        match key.as_str() {
            MARKER_ID => node.id = Some(marker_u64(MARKER_ID, &value)?),
            MARKER_REF => node.ref_id = Some(marker_u64(MARKER_REF, &value)?),
            MARKER_TYPE => match value {
                RawValue::Str(name) => node.type_name = Some(name),
                _ => {
                    return Err(DocumentError::BadMarker {
                        marker: MARKER_TYPE,
                        expected: "a type name string",
                    });
                }
            },
            MARKER_KEYS => match value {
                RawValue::Array(elems) => node.keys = Some(lower_all(doc, elems)?),
                _ => {
                    return Err(DocumentError::BadMarker {
                        marker: MARKER_KEYS,
                        expected: "an array",
                    });
                }
            },
            MARKER_ITEMS => match value {
                RawValue::Array(elems) => node.items = Some(lower_all(doc, elems)?),
                _ => {
                    return Err(DocumentError::BadMarker {
                        marker: MARKER_ITEMS,
                        expected: "an array",
                    });
                }
            },
            _ => {
                let child = lower(doc, value)?;
                node.fields.insert(key, child);
            }
        }
    }

    validate(&node)?;
    doc.push(node)
}

/// Structural invariants the resolver relies on.
fn validate(node: &Node) -> Result<(), DocumentError> {
    if node.ref_id.is_some() {
        // An alias may restate its own identity (`@id` + `@ref` chains) but
        // carries no content of its own.
        let has_content = node.type_name.is_some()
            || !node.fields.is_empty()
            || node.keys.is_some()
            || node.items.is_some();
        if has_content {
            return Err(DocumentError::RefWithContent);
        }
    }
    if let Some(keys) = &node.keys {
        let Some(items) = &node.items else {
            return Err(DocumentError::KeysWithoutItems);
        };
        if keys.len() != items.len() {
            return Err(DocumentError::KeysItemsLengthMismatch {
                keys: keys.len(),
                items: items.len(),
            });
        }
    }
    Ok(())
}

fn marker_u64(marker: &'static str, value: &RawValue) -> Result<u64, DocumentError> {
    match value {
        RawValue::Int(i) if *i >= 0 => Ok(*i as u64),
        _ => Err(DocumentError::BadMarker {
            marker,
            expected: "a non-negative integer",
        }),
    }
}
