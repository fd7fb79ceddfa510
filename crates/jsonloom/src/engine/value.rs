//! Runtime values produced by resolution.
//!
//! Shared variants (`Object`, `Array`, `Map`, `Set`) are `Rc<RefCell<…>>`
//! cells: the traversal hands out shell targets before their contents exist,
//! and the patch pass later writes through the same cell. Identity is cell
//! identity, so a two-node cycle resolves to two values whose fields point at
//! each other.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};
use jsonloom_core::Scalar;

/// A record instance, typed or generic.
///
/// `type_name` is `None` for generic maps (map mode, or a record whose type
/// could not be inferred). Field order is source order.
#[derive(Debug, Default)]
pub struct Instance {
    pub type_name: Option<String>,
    pub fields: IndexMap<String, Value>,
}

impl Instance {
    pub fn typed(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            fields: IndexMap::new(),
        }
    }

    pub fn generic() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

/// An enum constant. Constants compare by content, like language-level
/// enum values do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub type_name: String,
    pub variant: String,
}

/// Ordered hash map keyed by resolved values.
#[derive(Debug, Default)]
pub struct MapValue {
    entries: IndexMap<Key, Value>,
}

impl MapValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(Key(key), value)
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries.get(&Key(key.clone())).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (&k.0, v))
    }

    /// Re-insert every entry so key hashes are recomputed.
    pub(crate) fn rehash(&mut self) {
        let old: Vec<(Key, Value)> = self.entries.drain(..).collect();
        for (key, value) in old {
            self.entries.insert(key, value);
        }
    }
}

/// Ordered hash set of resolved values.
#[derive(Debug, Default)]
pub struct SetValue {
    entries: IndexSet<Key>,
}

impl SetValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: Value) -> bool {
        self.entries.insert(Key(value))
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.entries.contains(&Key(value.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|k| &k.0)
    }

    /// Re-insert every element so hashes are recomputed.
    pub(crate) fn rehash(&mut self) {
        let old: Vec<Key> = self.entries.drain(..).collect();
        for key in old {
            self.entries.insert(key);
        }
    }
}

/// A resolved value.
///
/// Structural equality (`==`) compares contents recursively and diverges on
/// cyclic graphs; use [`Value::same`] for identity.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Set(Rc<RefCell<SetValue>>),
    Map(Rc<RefCell<MapValue>>),
    Enum(Rc<EnumValue>),
    Object(Rc<RefCell<Instance>>),
}

impl Value {
    pub fn object(instance: Instance) -> Self {
        Value::Object(Rc::new(RefCell::new(instance)))
    }

    pub fn array(elements: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn map() -> Self {
        Value::Map(Rc::new(RefCell::new(MapValue::new())))
    }

    pub fn set() -> Self {
        Value::Set(Rc::new(RefCell::new(SetValue::new())))
    }

    pub fn enum_constant(type_name: impl Into<String>, variant: impl Into<String>) -> Self {
        Value::Enum(Rc::new(EnumValue {
            type_name: type_name.into(),
            variant: variant.into(),
        }))
    }

    /// Identity: cell identity for shared variants, value equality for
    /// scalars and enum constants.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Set(a), Value::Set(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Scalar view, when this value is one.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Int(i) => Some(Scalar::Int(*i)),
            Value::Float(x) => Some(Scalar::Float(*x)),
            Value::Str(s) => Some(Scalar::Str(s.clone())),
            _ => None,
        }
    }

    /// Field of an object instance.
    pub fn field(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(obj) => obj.borrow().get(name).cloned(),
            _ => None,
        }
    }

    /// Element of an array.
    pub fn index(&self, i: usize) -> Option<Value> {
        match self {
            Value::Array(arr) => arr.borrow().get(i).cloned(),
            _ => None,
        }
    }

    /// Variant name for error messages.
    pub fn type_label(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Enum(_) => "enum",
            Value::Object(_) => "object",
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Int(i) => Value::Int(i),
            Scalar::Float(x) => Value::Float(x),
            Scalar::Str(s) => Value::Str(s),
        }
    }
}

impl From<&Scalar> for Value {
    fn from(scalar: &Scalar) -> Self {
        Value::from(scalar.clone())
    }
}

impl PartialEq for Value {
    /// Deep structural equality. Shared cells short-circuit on identity
    /// first, so comparing a value with itself is always cheap; distinct
    /// cyclic graphs diverge.
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Object(a), Value::Object(b)) => {
                Rc::ptr_eq(a, b) || {
                    let (a, b) = (a.borrow(), b.borrow());
                    a.type_name == b.type_name && a.fields == b.fields
                }
            }
            (Value::Map(a), Value::Map(b)) => {
                Rc::ptr_eq(a, b) || {
                    let (a, b) = (a.borrow(), b.borrow());
                    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
                }
            }
            (Value::Set(a), Value::Set(b)) => {
                Rc::ptr_eq(a, b) || {
                    let (a, b) = (a.borrow(), b.borrow());
                    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
                }
            }
            _ => false,
        }
    }
}

/// Map/set key wrapper.
///
/// Scalar keys hash and compare by value. Shared keys compare by identity and
/// hash a shallow content fingerprint (type name plus scalar fields), so a
/// key inserted before its forward references were patched carries a stale
/// fingerprint until the container is rehashed — which is exactly what the
/// rehash pass exists to repair.
#[derive(Clone, Debug)]
pub(crate) struct Key(pub(crate) Value);

impl PartialEq for Key {
    fn eq(&self, other: &Key) -> bool {
        self.0.same(&other.0)
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            Value::Null => state.write_u8(0),
            Value::Bool(b) => {
                state.write_u8(1);
                b.hash(state);
            }
            Value::Int(i) => {
                state.write_u8(2);
                i.hash(state);
            }
            Value::Float(x) => {
                state.write_u8(3);
                x.to_bits().hash(state);
            }
            Value::Str(s) => {
                state.write_u8(4);
                s.hash(state);
            }
            Value::Enum(e) => {
                state.write_u8(5);
                e.type_name.hash(state);
                e.variant.hash(state);
            }
            Value::Object(obj) => {
                state.write_u8(6);
                let obj = obj.borrow();
                obj.type_name.hash(state);
                for (name, value) in &obj.fields {
                    name.hash(state);
                    // Shallow: scalar fields only, nested cells contribute
                    // nothing so the fingerprint stays cycle-safe.
                    match value {
                        Value::Bool(b) => b.hash(state),
                        Value::Int(i) => i.hash(state),
                        Value::Float(x) => x.to_bits().hash(state),
                        Value::Str(s) => s.hash(state),
                        _ => {}
                    }
                }
            }
            Value::Array(arr) => {
                state.write_u8(7);
                (Rc::as_ptr(arr) as usize).hash(state);
            }
            Value::Set(set) => {
                state.write_u8(8);
                (Rc::as_ptr(set) as usize).hash(state);
            }
            Value::Map(map) => {
                state.write_u8(9);
                (Rc::as_ptr(map) as usize).hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Enum(e) => write!(f, "{}.{}", e.type_name, e.variant),
            Value::Array(_) => write!(f, "<array>"),
            Value::Set(_) => write!(f, "<set>"),
            Value::Map(_) => write!(f, "<map>"),
            Value::Object(obj) => match &obj.borrow().type_name {
                Some(name) => write!(f, "<{name}>"),
                None => write!(f, "<object>"),
            },
        }
    }
}
