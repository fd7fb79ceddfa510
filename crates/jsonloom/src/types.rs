//! Type registry: per-type descriptor tables registered at startup.
//!
//! This is the substitute for runtime reflection: every field-level decision
//! the resolver makes — scalar coercion targets, assignability checks,
//! missing-field detection, reference patching — dispatches through a
//! [`TypeDescriptor`] looked up by name.

use std::fmt;

use indexmap::IndexMap;

/// Declared type of a field slot, an array element, or a resolve root.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// No constraint; values pass through untouched.
    Any,
    Bool,
    Int,
    Float,
    Str,
    /// Indexed sequence with a declared element type.
    Array(Box<FieldType>),
    /// Hash set with a declared element type.
    Set(Box<FieldType>),
    /// Insertion-ordered map; keys and values are unconstrained.
    Map,
    /// Record type registered under the given name.
    Object(String),
    /// Enum type registered under the given name.
    Enum(String),
}

impl FieldType {
    pub fn array(elem: FieldType) -> Self {
        FieldType::Array(Box::new(elem))
    }

    pub fn set(elem: FieldType) -> Self {
        FieldType::Set(Box::new(elem))
    }

    pub fn object(name: impl Into<String>) -> Self {
        FieldType::Object(name.into())
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        FieldType::Enum(name.into())
    }

    /// A concrete scalar target the converter can coerce into.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            FieldType::Bool | FieldType::Int | FieldType::Float | FieldType::Str
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Any => write!(f, "any"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Str => write!(f, "string"),
            FieldType::Array(elem) => write!(f, "[{elem}]"),
            FieldType::Set(elem) => write!(f, "set<{elem}>"),
            FieldType::Map => write!(f, "map"),
            FieldType::Object(name) => write!(f, "{name}"),
            FieldType::Enum(name) => write!(f, "enum {name}"),
        }
    }
}

/// What a registered type is.
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Record with an ordered field table.
    Record { fields: IndexMap<String, FieldType> },
    /// Enum with an ordered variant list.
    Enum { variants: Vec<String> },
}

/// One registered type: a record field table or an enum variant list.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
}

impl TypeDescriptor {
    /// Start a record descriptor; add fields with [`TypeDescriptor::field`].
    pub fn record(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Record {
                fields: IndexMap::new(),
            },
        }
    }

    /// Declare an enum with its variants.
    pub fn enumeration<I, S>(name: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: TypeKind::Enum {
                variants: variants.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Add a declared field (record descriptors only).
    ///
    /// # Panics
    /// Panics when called on an enum descriptor; descriptors are built in
    /// startup code where this is a programming error.
    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        match &mut self.kind {
            TypeKind::Record { fields } => {
                fields.insert(name.into(), ty);
            }
            TypeKind::Enum { .. } => panic!("field() on enum descriptor"),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, TypeKind::Enum { .. })
    }

    /// Declared type of a field, when this is a record that declares it.
    pub fn field_type(&self, field: &str) -> Option<&FieldType> {
        match &self.kind {
            TypeKind::Record { fields } => fields.get(field),
            TypeKind::Enum { .. } => None,
        }
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.field_type(field).is_some()
    }

    pub fn has_variant(&self, variant: &str) -> bool {
        match &self.kind {
            TypeKind::Enum { variants } => variants.iter().any(|v| v == variant),
            TypeKind::Record { .. } => false,
        }
    }

    /// Declared fields in registration order (empty for enums).
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldType)> {
        let fields = match &self.kind {
            TypeKind::Record { fields } => Some(fields),
            TypeKind::Enum { .. } => None,
        };
        fields.into_iter().flatten().map(|(k, v)| (k.as_str(), v))
    }
}

/// Name → descriptor table. Read-only during resolution.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor, replacing any previous one with the same name.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> &mut Self {
        self.types.insert(descriptor.name.clone(), descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }
}
