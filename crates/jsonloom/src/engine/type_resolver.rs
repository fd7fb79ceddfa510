//! Effective-type resolution for nodes.
//!
//! Declared `@type` wins over the caller-context hint. Declared names pass
//! through the user coercion table exactly once before lookup. Enum types
//! become enum-sets when the node carries `@items`.

use jsonloom_core::Node;

use crate::engine::options::ReadOptions;
use crate::types::{FieldType, TypeRegistry};

pub(crate) struct TypeResolver<'a> {
    types: &'a TypeRegistry,
    options: &'a ReadOptions,
}

impl<'a> TypeResolver<'a> {
    pub fn new(types: &'a TypeRegistry, options: &'a ReadOptions) -> Self {
        Self { types, options }
    }

    /// Effective target type for a node, or `None` when nothing is declared,
    /// hinted, or recognizable.
    pub fn resolve(&self, node: &Node, hint: Option<&FieldType>) -> Option<FieldType> {
        if let Some(declared) = node.type_name.as_deref()
            && let Some(ty) = self.resolve_name(declared)
        {
            return Some(self.adjust_enum_shape(ty, node));
        }
        hint.map(|ty| self.adjust_enum_shape(self.apply_coercion(ty.clone()), node))
    }

    /// Apply the user coercion table to a declared name.
    pub fn coerce_name(&self, name: &str) -> String {
        self.options
            .coercions
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_owned())
    }

    fn resolve_name(&self, declared: &str) -> Option<FieldType> {
        let name = self.coerce_name(declared);
        if let Some(builtin) = builtin_type(&name) {
            return Some(builtin);
        }
        let descriptor = self.types.get(&name)?;
        Some(if descriptor.is_enum() {
            FieldType::Enum(name)
        } else {
            FieldType::Object(name)
        })
    }

    /// Rewrite named types inside a hint through the coercion table.
    fn apply_coercion(&self, ty: FieldType) -> FieldType {
        match ty {
            FieldType::Object(name) => FieldType::Object(self.coerce_name(&name)),
            FieldType::Enum(name) => FieldType::Enum(self.coerce_name(&name)),
            FieldType::Array(elem) => FieldType::Array(Box::new(self.apply_coercion(*elem))),
            FieldType::Set(elem) => FieldType::Set(Box::new(self.apply_coercion(*elem))),
            other => other,
        }
    }

    /// An enum type on a node carrying `@items` denotes an enum-set.
    fn adjust_enum_shape(&self, ty: FieldType, node: &Node) -> FieldType {
        match ty {
            FieldType::Enum(name) if node.items.is_some() => {
                FieldType::set(FieldType::Enum(name))
            }
            other => other,
        }
    }
}

/// Builtin wire type names.
///
/// Only insertion-ordered containers exist in this engine; the sorted wire
/// names fall back to their insertion-ordered equivalents.
fn builtin_type(name: &str) -> Option<FieldType> {
    Some(match name {
        "bool" => FieldType::Bool,
        "int" => FieldType::Int,
        "float" => FieldType::Float,
        "string" => FieldType::Str,
        "list" => FieldType::array(FieldType::Any),
        "set" | "sorted-set" => FieldType::set(FieldType::Any),
        "map" | "sorted-map" => FieldType::Map,
        _ => return None,
    })
}
