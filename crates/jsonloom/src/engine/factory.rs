//! User-registered instantiators.
//!
//! A factory owns instantiation for one type name. An *object-final* factory
//! fully populates the instance itself; the resolver finishes the node and
//! never walks its fields. A non-final factory returns a partially populated
//! shell and the normal field walk fills in whatever the factory left unset.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use jsonloom_core::NodeId;

use crate::engine::error::ResolveError;
use crate::engine::resolver::Resolver;
use crate::engine::value::Value;

/// Instantiation callback. Receives the resolver so it can reach node data
/// and [`Resolver::gather_remaining`] for non-default construction.
pub type FactoryFn = Rc<dyn Fn(&mut Resolver<'_>, NodeId) -> Result<Value, ResolveError>>;

#[derive(Clone)]
pub(crate) struct Factory {
    pub func: FactoryFn,
    pub object_final: bool,
}

/// Type name → factory table. Read-only during resolution.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    factories: IndexMap<String, Factory>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a type name, replacing any previous one.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        object_final: bool,
        func: impl Fn(&mut Resolver<'_>, NodeId) -> Result<Value, ResolveError> + 'static,
    ) -> &mut Self {
        self.factories.insert(
            type_name.into(),
            Factory {
                func: Rc::new(func),
                object_final,
            },
        );
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub(crate) fn get(&self, type_name: &str) -> Option<&Factory> {
        self.factories.get(type_name)
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
