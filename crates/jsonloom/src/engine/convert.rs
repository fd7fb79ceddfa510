//! Scalar coercions between wire scalars and declared types.
//!
//! Stateless. The resolver consults this in three places: array elements
//! against a declared component type, record scalars against a declared field
//! type, and the record-to-scalar instantiation probe for wrapper nodes like
//! `{"@type": "int", "value": "42"}`.

use jsonloom_core::{Node, Scalar};

use crate::types::FieldType;

/// Stateless scalar converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarConverter;

impl ScalarConverter {
    pub fn new() -> Self {
        Self
    }

    /// Whether this converter can ever produce the given target type.
    pub fn supports(&self, target: &FieldType) -> bool {
        target.is_scalar()
    }

    /// Coerce a scalar into the target type. `None` means no lossless-enough
    /// coercion exists; the caller decides whether that is fatal.
    ///
    /// Null coerces to any target (stays null).
    pub fn convert(&self, scalar: &Scalar, target: &FieldType) -> Option<Scalar> {
        if scalar.is_null() {
            return Some(Scalar::Null);
        }
        match target {
            FieldType::Any => Some(scalar.clone()),
            FieldType::Bool => self.to_bool(scalar).map(Scalar::Bool),
            FieldType::Int => self.to_int(scalar).map(Scalar::Int),
            FieldType::Float => self.to_float(scalar).map(Scalar::Float),
            FieldType::Str => Some(Scalar::Str(self.to_string_lossless(scalar))),
            _ => None,
        }
    }

    /// Record-to-scalar probe: a node with a scalar payload, or a wrapper
    /// record whose single field is named `value`, converts as that scalar.
    pub fn convert_node(&self, node: &Node, target: &FieldType) -> Option<Scalar> {
        self.conversion_source(node)
            .and_then(|scalar| self.convert(&scalar, target))
    }

    fn conversion_source(&self, node: &Node) -> Option<Scalar> {
        if let Some(value) = &node.value {
            return Some(value.clone());
        }
        if node.fields.len() == 1 {
            let (name, child) = node.fields.first()?;
            if name == "value" {
                return child.as_scalar().cloned();
            }
        }
        None
    }

    fn to_bool(&self, scalar: &Scalar) -> Option<bool> {
        match scalar {
            Scalar::Bool(b) => Some(*b),
            Scalar::Int(0) => Some(false),
            Scalar::Int(1) => Some(true),
            Scalar::Str(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn to_int(&self, scalar: &Scalar) -> Option<i64> {
        match scalar {
            Scalar::Int(i) => Some(*i),
            // Only integral floats round-trip.
            Scalar::Float(x) if x.fract() == 0.0 && x.is_finite() => Some(*x as i64),
            Scalar::Bool(b) => Some(i64::from(*b)),
            Scalar::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn to_float(&self, scalar: &Scalar) -> Option<f64> {
        match scalar {
            Scalar::Float(x) => Some(*x),
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn to_string_lossless(&self, scalar: &Scalar) -> String {
        match scalar {
            Scalar::Str(s) => s.clone(),
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(x) => x.to_string(),
            Scalar::Null => String::new(),
        }
    }
}
