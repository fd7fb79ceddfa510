//! Read-time configuration.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::engine::value::Value;

/// What record-shaped nodes resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Typed instances built against registered descriptors.
    #[default]
    Typed,
    /// Generic insertion-ordered maps; scalar leaves are still coerced when
    /// the declared `@type` names a known field.
    GenericMaps,
}

/// Callback invoked once per missing field after references are patched.
/// Arguments: target instance, field name, leftover value.
pub type MissingFieldHandler = Rc<dyn Fn(&Value, &str, &Value)>;

/// Resolution options. Built fluently, read-only during resolution.
#[derive(Clone, Default)]
pub struct ReadOptions {
    pub(crate) mode: ResolveMode,
    pub(crate) unknown_type: Option<String>,
    pub(crate) fail_on_unknown_type: bool,
    pub(crate) coercions: IndexMap<String, String>,
    pub(crate) missing_field_handler: Option<MissingFieldHandler>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve record nodes to generic insertion-ordered maps.
    pub fn generic_maps(mut self) -> Self {
        self.mode = ResolveMode::GenericMaps;
        self
    }

    /// Resolve record nodes to typed instances (the default).
    pub fn typed(mut self) -> Self {
        self.mode = ResolveMode::Typed;
        self
    }

    /// Substitute type for records whose type cannot be inferred.
    pub fn unknown_type(mut self, type_name: impl Into<String>) -> Self {
        self.unknown_type = Some(type_name.into());
        self
    }

    /// Error out instead of falling back to a generic map when a declared
    /// `@type` is not registered.
    pub fn fail_on_unknown_type(mut self) -> Self {
        self.fail_on_unknown_type = true;
        self
    }

    /// Map a declared type name to a substitute applied at resolve time.
    pub fn coerce(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.coercions.insert(from.into(), to.into());
        self
    }

    /// Invoke `handler` once per missing field after resolution completes.
    pub fn on_missing_field(mut self, handler: impl Fn(&Value, &str, &Value) + 'static) -> Self {
        self.missing_field_handler = Some(Rc::new(handler));
        self
    }

    pub fn mode(&self) -> ResolveMode {
        self.mode
    }
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("mode", &self.mode)
            .field("unknown_type", &self.unknown_type)
            .field("fail_on_unknown_type", &self.fail_on_unknown_type)
            .field("coercions", &self.coercions)
            .field(
                "missing_field_handler",
                &self.missing_field_handler.as_ref().map(|_| "<handler>"),
            )
            .finish()
    }
}
