//! The resolution engine.
//!
//! One `resolve` call owns a LIFO work stack, an identity-keyed visited set,
//! and three auxiliary lists: unresolved forward references, containers to
//! rehash, and missing fields. Traversal never recurses into the drain loop;
//! parents create shell targets for their children, store the shells, and
//! push the children. Cleanup then runs patch → rehash → missing-field
//! notification, in that order.

use indexmap::IndexSet;
use jsonloom_core::{Document, Node, NodeId, NodeValue, Scalar};

use crate::engine::convert::ScalarConverter;
use crate::engine::diagnostics::Diagnostics;
use crate::engine::error::ResolveError;
use crate::engine::factory::FactoryRegistry;
use crate::engine::options::{ReadOptions, ResolveMode};
use crate::engine::pending::{MissingFieldEntry, RefSlot, RehashEntry, UnresolvedReference};
use crate::engine::strategy::{MapStrategy, ObjectStrategy, RecordStrategy};
use crate::engine::type_resolver::TypeResolver;
use crate::engine::value::Value;
use crate::types::{FieldType, TypeDescriptor, TypeRegistry};

/// Per-node resolution state, indexed by `NodeId`.
#[derive(Debug, Clone, Default)]
struct NodeState {
    /// Type supplied by the parent context (field type or element type).
    hint: Option<FieldType>,
    /// Effective type after declared/hint unification and coercion.
    resolved: Option<FieldType>,
    /// The under-construction target.
    target: Option<Value>,
    /// Target is definitive; further traversal is a no-op.
    finished: bool,
}

/// Graph resolver for one document.
pub struct Resolver<'a> {
    doc: &'a mut Document,
    types: &'a TypeRegistry,
    factories: &'a FactoryRegistry,
    options: &'a ReadOptions,
    converter: ScalarConverter,
    strategy: Box<dyn RecordStrategy>,

    stack: Vec<NodeId>,
    visited: IndexSet<NodeId>,
    states: Vec<NodeState>,
    unresolved: Vec<UnresolvedReference>,
    rehash: Vec<RehashEntry>,
    missing: Vec<MissingFieldEntry>,
    diagnostics: Diagnostics,
}

impl<'a> Resolver<'a> {
    pub fn new(
        doc: &'a mut Document,
        types: &'a TypeRegistry,
        factories: &'a FactoryRegistry,
        options: &'a ReadOptions,
    ) -> Self {
        let strategy: Box<dyn RecordStrategy> = match options.mode {
            ResolveMode::Typed => Box::new(ObjectStrategy),
            ResolveMode::GenericMaps => Box::new(MapStrategy),
        };
        let states = vec![NodeState::default(); doc.len()];
        Self {
            doc,
            types,
            factories,
            options,
            converter: ScalarConverter::new(),
            strategy,
            stack: Vec::new(),
            visited: IndexSet::new(),
            states,
            unresolved: Vec::new(),
            rehash: Vec::new(),
            missing: Vec::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Resolve the document root.
    pub fn resolve(&mut self) -> Result<Value, ResolveError> {
        self.resolve_root(self.doc.root(), None)
    }

    /// Resolve the document root, requiring assignability to `declared`.
    pub fn resolve_as(&mut self, declared: FieldType) -> Result<Value, ResolveError> {
        self.resolve_root(self.doc.root(), Some(declared))
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Node data, for factory callbacks.
    pub fn node(&self, id: NodeId) -> &Node {
        self.doc.node(id)
    }

    /// Instantiate a child subtree and queue it for traversal, returning its
    /// shell target. This is the reentrant path available to factories:
    /// children are pushed onto the work stack, never drained inline.
    pub fn resolve_child(&mut self, id: NodeId) -> Result<Value, ResolveError> {
        let value = self.ensure_target(id)?;
        if !self.is_finished(id) {
            self.stack.push(id);
        }
        Ok(value)
    }

    /// Resolve the non-excluded, non-null field children of `id` to shell
    /// targets, in source order. Exists to feed non-default constructors
    /// from factory callbacks.
    ///
    /// The gathered vector is consumed positionally and immediately, so a
    /// field referencing a definition with no target yet cannot be deferred
    /// to the patch pass; it is a [`ResolveError::GatherUnresolved`] fault.
    pub fn gather_remaining(
        &mut self,
        id: NodeId,
        excluded: &[&str],
    ) -> Result<Vec<Value>, ResolveError> {
        let node = self.doc.node(id).clone();
        let mut out = Vec::new();
        for (name, child) in &node.fields {
            if excluded.contains(&name.as_str()) {
                continue;
            }
            match child {
                NodeValue::Scalar(s) if s.is_null() => {}
                NodeValue::Scalar(s) => out.push(Value::from(s)),
                NodeValue::Node(cid) => {
                    let child_node = self.doc.node(*cid).clone();
                    if let Some(ref_id) = child_node.ref_id {
                        match self.lookup_ref_target(ref_id) {
                            Some(value) => out.push(value),
                            None => {
                                return Err(ResolveError::GatherUnresolved {
                                    field: name.clone(),
                                    ref_id,
                                });
                            }
                        }
                    } else {
                        out.push(self.resolve_child(*cid)?);
                    }
                }
            }
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Entry and drain
    // ------------------------------------------------------------------

    fn resolve_root(
        &mut self,
        root: Option<NodeId>,
        declared: Option<FieldType>,
    ) -> Result<Value, ResolveError> {
        let Some(mut root) = root else {
            return Ok(Value::Null);
        };

        // A pure-@ref root resolves the referenced definition instead.
        if let Some(ref_id) = self.doc.node(root).ref_id {
            root = self
                .doc
                .deref(ref_id)
                .ok_or(ResolveError::UnknownReference(ref_id))?;
        }

        if self.is_finished(root) {
            let value = self.target_of(root).unwrap_or(Value::Null);
            return match &declared {
                Some(ty) => self.check_root(value, ty),
                None => Ok(value),
            };
        }

        if let Some(ty) = &declared {
            self.state_mut(root).hint = Some(ty.clone());
        }

        self.ensure_target(root)?;
        self.stack.push(root);
        self.drain()?;
        self.cleanup()?;

        let value = self.target_of(root).unwrap_or(Value::Null);
        match &declared {
            Some(ty) => self.check_root(value, ty),
            None => Ok(value),
        }
    }

    fn drain(&mut self) -> Result<(), ResolveError> {
        while let Some(id) = self.stack.pop() {
            if self.visited.contains(&id) || self.is_finished(id) {
                continue;
            }
            let node = self.doc.node(id).clone();
            if node.is_ref() {
                continue;
            }
            self.visited.insert(id);

            let target = self.ensure_target(id)?;
            // Instantiation may have finished the node (factory object-final,
            // scalar conversion, enum constant); children are not traversed.
            if self.is_finished(id) {
                continue;
            }

            if node.is_map() {
                self.traverse_map(id, &node, &target)?;
            } else if node.items.is_some() {
                self.traverse_items(id, &node, &target)?;
            } else {
                self.traverse_record(id, &node, &target)?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Instantiation
    // ------------------------------------------------------------------

    /// Create (or return) the shell target for a node. Never populates
    /// children.
    fn ensure_target(&mut self, id: NodeId) -> Result<Value, ResolveError> {
        if let Some(value) = self.target_of(id) {
            return Ok(value);
        }
        let node = self.doc.node(id).clone();

        let hint = self.state(id).and_then(|s| s.hint.clone());
        let resolved = {
            let tr = TypeResolver::new(self.types, self.options);
            tr.resolve(&node, hint.as_ref())
        };
        self.state_mut(id).resolved = resolved.clone();

        // Scalar documents: the node is a typed leaf.
        if node.has_scalar_value()
            && node.fields.is_empty()
            && node.items.is_none()
            && node.keys.is_none()
        {
            let scalar = node.value.clone().unwrap_or(Scalar::Null);
            let value = match &resolved {
                Some(ty) if ty.is_scalar() => match self.converter.convert(&scalar, ty) {
                    Some(s) => Value::from(s),
                    None => {
                        self.diagnostics.warning(format!(
                            "cannot convert {} value to `{ty}`; keeping raw value",
                            scalar.type_label()
                        ));
                        Value::from(scalar)
                    }
                },
                _ => Value::from(scalar),
            };
            self.set_target(id, value.clone(), true);
            return Ok(value);
        }

        // Enum constant (enum-sets resolve as Set(Enum) and fall through to
        // the container branch below).
        if let Some(FieldType::Enum(name)) = &resolved {
            let value = self.instantiate_enum(&node, name)?;
            self.set_target(id, value.clone(), true);
            return Ok(value);
        }

        // User factory.
        if let Some(key) = self.factory_key(&node, &resolved) {
            let factories = self.factories;
            if let Some(factory) = factories.get(&key) {
                let func = factory.func.clone();
                let object_final = factory.object_final;
                let value = func(self, id)?;
                self.set_target(id, value.clone(), object_final);
                return Ok(value);
            }
        }

        // Scalar conversion attempt: a record with a scalar payload and a
        // scalar target type converts and finishes. Probe failures fall
        // through to default instantiation but are never silently dropped.
        if let Some(ty) = &resolved
            && self.converter.supports(ty)
            && node.keys.is_none()
            && node.items.is_none()
        {
            match self.converter.convert_node(&node, ty) {
                Some(s) => {
                    let value = Value::from(s);
                    self.set_target(id, value.clone(), true);
                    return Ok(value);
                }
                None => self.diagnostics.warning(format!(
                    "conversion to `{ty}` failed; falling through to default instantiation"
                )),
            }
        }

        // Container shells.
        if node.is_map() {
            let value = Value::map();
            self.set_target(id, value.clone(), false);
            return Ok(value);
        }
        if node.items.is_some() {
            let value = match &resolved {
                Some(FieldType::Set(_)) => Value::set(),
                _ => Value::array(Vec::new()),
            };
            self.set_target(id, value.clone(), false);
            return Ok(value);
        }

        // Default record instance.
        let (declared_name, descriptor) = self.record_type(&node, &resolved);
        if descriptor.is_none()
            && let Some(name) = &declared_name
            && node.type_name.is_some()
            && resolved.is_none()
        {
            if self.options.fail_on_unknown_type {
                return Err(ResolveError::Instantiation {
                    type_name: name.clone(),
                    reason: "type is not registered".into(),
                });
            }
            self.diagnostics
                .note(format!("unknown type `{name}`; resolving as generic map"));
        }
        let value = self
            .strategy
            .make_target(declared_name.as_deref(), descriptor);
        self.set_target(id, value.clone(), false);
        Ok(value)
    }

    fn instantiate_enum(&self, node: &Node, name: &str) -> Result<Value, ResolveError> {
        let types = self.types;
        let descriptor = types
            .get(name)
            .ok_or_else(|| ResolveError::Instantiation {
                type_name: name.to_owned(),
                reason: "enum type is not registered".into(),
            })?;
        let variant = node
            .value
            .as_ref()
            .and_then(Scalar::as_str)
            .or_else(|| {
                node.fields
                    .get("name")
                    .and_then(NodeValue::as_scalar)
                    .and_then(Scalar::as_str)
            })
            .ok_or_else(|| ResolveError::Instantiation {
                type_name: name.to_owned(),
                reason: "enum constant requires a variant name".into(),
            })?;
        if !descriptor.has_variant(variant) {
            return Err(ResolveError::Instantiation {
                type_name: name.to_owned(),
                reason: format!("unknown variant `{variant}`"),
            });
        }
        Ok(Value::enum_constant(name, variant))
    }

    /// Factory lookup key: the resolved record type name, or the coerced
    /// declared name for factory-only types with no registered descriptor.
    fn factory_key(&self, node: &Node, resolved: &Option<FieldType>) -> Option<String> {
        if let Some(FieldType::Object(name)) = resolved {
            return Some(name.clone());
        }
        let declared = node.type_name.as_deref()?;
        let coerced = self.coerce_name(declared);
        self.factories.contains(&coerced).then_some(coerced)
    }

    /// Coerced record type name and its descriptor, applying the
    /// unknown-type substitute when nothing else is known.
    fn record_type(
        &self,
        node: &Node,
        resolved: &Option<FieldType>,
    ) -> (Option<String>, Option<&'a TypeDescriptor>) {
        let types = self.types;
        if let Some(FieldType::Object(name)) = resolved {
            return (Some(name.clone()), types.get(name));
        }
        // Reaching here means the type could not be inferred (no declared
        // name, or one that is neither builtin nor registered); the
        // unknown-type substitute applies to both cases.
        let declared = node.type_name.as_deref().map(|n| self.coerce_name(n));
        if let Some(substitute) = &self.options.unknown_type
            && let Some(descriptor) = types.get(substitute)
        {
            return (Some(substitute.clone()), Some(descriptor));
        }
        (declared, None)
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    fn traverse_items(
        &mut self,
        id: NodeId,
        node: &Node,
        target: &Value,
    ) -> Result<(), ResolveError> {
        let Some(items) = &node.items else {
            return Ok(());
        };
        let resolved = self.state(id).and_then(|s| s.resolved.clone());
        let (elem_ty, is_set) = element_type(&resolved, target);

        for (index, item) in items.iter().enumerate() {
            match item {
                NodeValue::Scalar(s) => {
                    let value = self.coerce_element(s, &elem_ty, index)?;
                    self.store_element(target, is_set, value)?;
                }
                NodeValue::Node(cid) => {
                    let child = self.doc.node(*cid).clone();
                    if let Some(ref_id) = child.ref_id {
                        match self.lookup_ref_target(ref_id) {
                            Some(value) => self.store_element(target, is_set, value)?,
                            None if is_set => self.unresolved.push(UnresolvedReference {
                                parent: target.clone(),
                                slot: RefSlot::Append,
                                ref_id,
                            }),
                            None => {
                                // Placeholder keeps the slot; patched later.
                                self.store_element(target, false, Value::Null)?;
                                self.unresolved.push(UnresolvedReference {
                                    parent: target.clone(),
                                    slot: RefSlot::Index(index),
                                    ref_id,
                                });
                            }
                        }
                    } else {
                        if elem_ty != FieldType::Any {
                            self.state_mut(*cid).hint = Some(elem_ty.clone());
                        }
                        let value = self.ensure_target(*cid)?;
                        self.store_element(target, is_set, value)?;
                        if !self.is_finished(*cid) {
                            self.stack.push(*cid);
                        }
                    }
                }
            }
        }

        if is_set {
            self.rehash.push(RehashEntry::Set {
                target: target.clone(),
            });
        }
        Ok(())
    }

    fn traverse_map(
        &mut self,
        _id: NodeId,
        node: &Node,
        target: &Value,
    ) -> Result<(), ResolveError> {
        let keys = node.keys.clone().unwrap_or_default();
        let items = node.items.clone().unwrap_or_default();
        if keys.len() != items.len() {
            return Err(ResolveError::CorruptNode(format!(
                "@keys and @items lengths differ ({} vs {})",
                keys.len(),
                items.len()
            )));
        }

        // Keys and items become two synthetic array nodes; their forward
        // references patch by index like any other array. The map itself is
        // populated only in the rehash pass, once identities are stable.
        let keys_id = self.doc.push_synthetic(Node {
            items: Some(keys),
            ..Node::default()
        });
        let items_id = self.doc.push_synthetic(Node {
            items: Some(items),
            ..Node::default()
        });

        let keys_target = self.ensure_target(keys_id)?;
        let items_target = self.ensure_target(items_id)?;
        self.stack.push(keys_id);
        self.stack.push(items_id);

        self.rehash.push(RehashEntry::Map {
            target: target.clone(),
            keys: keys_target,
            items: items_target,
        });
        Ok(())
    }

    fn traverse_record(
        &mut self,
        id: NodeId,
        node: &Node,
        target: &Value,
    ) -> Result<(), ResolveError> {
        // A non-final factory may have produced something other than an
        // instance; it then owns population entirely.
        if !matches!(target, Value::Object(_)) {
            return Ok(());
        }

        let resolved = self.state(id).and_then(|s| s.resolved.clone());
        let (_, descriptor) = self.record_type(node, &resolved);
        let track_missing = self.strategy.tracks_missing_fields() && descriptor.is_some();

        for (fname, child) in &node.fields {
            // A non-final factory may have populated fields already; they
            // are not overwritten.
            if let Value::Object(obj) = target
                && obj.borrow().has_field(fname)
            {
                continue;
            }

            let declared_ft = descriptor.and_then(|d| d.field_type(fname)).cloned();
            let is_missing = track_missing && declared_ft.is_none();

            match child {
                NodeValue::Scalar(s) => {
                    let value = match &declared_ft {
                        Some(ft) => self.coerce_field_scalar(target, fname, ft, s)?,
                        None => Value::from(s),
                    };
                    if is_missing {
                        self.missing.push(MissingFieldEntry {
                            target: target.clone(),
                            field: fname.clone(),
                            value,
                        });
                    } else {
                        self.set_instance_field(target, fname, value)?;
                    }
                }
                NodeValue::Node(cid) => {
                    let child_node = self.doc.node(*cid).clone();
                    if let Some(ref_id) = child_node.ref_id {
                        match self.lookup_ref_target(ref_id) {
                            Some(value) => {
                                if is_missing {
                                    self.missing.push(MissingFieldEntry {
                                        target: target.clone(),
                                        field: fname.clone(),
                                        value,
                                    });
                                } else {
                                    self.check_field_assign(
                                        target,
                                        fname,
                                        declared_ft.as_ref(),
                                        &value,
                                    )?;
                                    self.set_instance_field(target, fname, value)?;
                                }
                            }
                            None if is_missing => {
                                // The leftover's value is a forward reference;
                                // the patch pass writes it into the recorded
                                // entry before the callback fires.
                                let slot = self.missing.len();
                                self.missing.push(MissingFieldEntry {
                                    target: target.clone(),
                                    field: fname.clone(),
                                    value: Value::Null,
                                });
                                self.unresolved.push(UnresolvedReference {
                                    parent: target.clone(),
                                    slot: RefSlot::Missing(slot),
                                    ref_id,
                                });
                            }
                            None => {
                                self.set_instance_field(target, fname, Value::Null)?;
                                self.unresolved.push(UnresolvedReference {
                                    parent: target.clone(),
                                    slot: RefSlot::Field(fname.clone()),
                                    ref_id,
                                });
                            }
                        }
                    } else {
                        if let Some(ft) = &declared_ft
                            && *ft != FieldType::Any
                        {
                            self.state_mut(*cid).hint = Some(ft.clone());
                        }
                        let value = self.ensure_target(*cid)?;
                        if is_missing {
                            self.missing.push(MissingFieldEntry {
                                target: target.clone(),
                                field: fname.clone(),
                                value,
                            });
                        } else {
                            self.check_field_assign(target, fname, declared_ft.as_ref(), &value)?;
                            self.set_instance_field(target, fname, value)?;
                        }
                        if !self.is_finished(*cid) {
                            self.stack.push(*cid);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Cleanup: patch → rehash → missing-field → clear
    // ------------------------------------------------------------------

    fn cleanup(&mut self) -> Result<(), ResolveError> {
        self.patch_references()?;
        self.rehash_containers()?;
        self.notify_missing_fields();

        for state in &mut self.states {
            if state.target.is_some() {
                state.finished = true;
            }
        }
        self.stack.clear();
        self.visited.clear();
        Ok(())
    }

    fn patch_references(&mut self) -> Result<(), ResolveError> {
        let entries = std::mem::take(&mut self.unresolved);
        for entry in entries {
            let node_id = self
                .doc
                .deref(entry.ref_id)
                .ok_or(ResolveError::UnknownReference(entry.ref_id))?;
            // A definition whose target never materialized is as unknown as
            // a missing id.
            let value = self
                .target_of(node_id)
                .ok_or(ResolveError::UnknownReference(entry.ref_id))?;

            match &entry.slot {
                RefSlot::Field(name) => {
                    let declared = self.declared_field_type(&entry.parent, name);
                    self.check_field_assign(&entry.parent, name, declared.as_ref(), &value)?;
                    self.set_instance_field(&entry.parent, name, value)?;
                }
                RefSlot::Index(index) => match &entry.parent {
                    Value::Array(arr) => {
                        let mut arr = arr.borrow_mut();
                        match arr.get_mut(*index) {
                            Some(slot) => *slot = value,
                            None => {
                                return Err(ResolveError::CorruptNode(format!(
                                    "patch index {index} out of bounds"
                                )));
                            }
                        }
                    }
                    _ => {
                        return Err(ResolveError::CorruptNode(
                            "indexed patch into non-array target".into(),
                        ));
                    }
                },
                RefSlot::Append => match &entry.parent {
                    Value::Set(set) => {
                        set.borrow_mut().insert(value);
                    }
                    _ => {
                        return Err(ResolveError::CorruptNode(
                            "append patch into non-set target".into(),
                        ));
                    }
                },
                RefSlot::Missing(index) => match self.missing.get_mut(*index) {
                    Some(missing) => missing.value = value,
                    None => {
                        return Err(ResolveError::CorruptNode(format!(
                            "missing-field slot {index} out of bounds"
                        )));
                    }
                },
            }
        }
        Ok(())
    }

    fn rehash_containers(&mut self) -> Result<(), ResolveError> {
        let entries = std::mem::take(&mut self.rehash);
        for entry in entries {
            match entry {
                RehashEntry::Map {
                    target,
                    keys,
                    items,
                } => {
                    let (Value::Array(keys), Value::Array(items)) = (&keys, &items) else {
                        return Err(ResolveError::CorruptNode(
                            "map key/item sources must be arrays".into(),
                        ));
                    };
                    let Value::Map(map) = &target else {
                        return Err(ResolveError::CorruptNode(
                            "rehash target is not a map".into(),
                        ));
                    };
                    let keys = keys.borrow();
                    let items = items.borrow();
                    if keys.len() != items.len() {
                        return Err(ResolveError::CorruptNode(format!(
                            "map keys and items diverged ({} vs {})",
                            keys.len(),
                            items.len()
                        )));
                    }
                    let mut map = map.borrow_mut();
                    map.clear();
                    for (key, value) in keys.iter().zip(items.iter()) {
                        map.insert(key.clone(), value.clone());
                    }
                }
                RehashEntry::Set { target } => {
                    let Value::Set(set) = &target else {
                        return Err(ResolveError::CorruptNode(
                            "rehash target is not a set".into(),
                        ));
                    };
                    set.borrow_mut().rehash();
                }
            }
        }
        Ok(())
    }

    fn notify_missing_fields(&mut self) {
        let entries = std::mem::take(&mut self.missing);
        if let Some(handler) = &self.options.missing_field_handler {
            for entry in &entries {
                handler(&entry.target, &entry.field, &entry.value);
            }
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn state(&self, id: NodeId) -> Option<&NodeState> {
        self.states.get(id.index())
    }

    fn state_mut(&mut self, id: NodeId) -> &mut NodeState {
        let index = id.index();
        if self.states.len() <= index {
            self.states.resize_with(index + 1, NodeState::default);
        }
        &mut self.states[index]
    }

    fn target_of(&self, id: NodeId) -> Option<Value> {
        self.state(id).and_then(|s| s.target.clone())
    }

    fn is_finished(&self, id: NodeId) -> bool {
        self.state(id).is_some_and(|s| s.finished)
    }

    fn set_target(&mut self, id: NodeId, value: Value, finished: bool) {
        let state = self.state_mut(id);
        state.target = Some(value);
        state.finished = finished;
    }

    fn coerce_name(&self, name: &str) -> String {
        self.options
            .coercions
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_owned())
    }

    /// Target of an already-defined reference, if its shell exists yet.
    fn lookup_ref_target(&self, ref_id: u64) -> Option<Value> {
        let node_id = self.doc.deref(ref_id)?;
        self.target_of(node_id)
    }

    fn coerce_element(
        &mut self,
        scalar: &Scalar,
        elem_ty: &FieldType,
        index: usize,
    ) -> Result<Value, ResolveError> {
        if scalar.is_null() {
            return Ok(Value::Null);
        }
        match elem_ty {
            FieldType::Any => Ok(Value::from(scalar)),
            FieldType::Enum(name) => {
                self.enum_from_scalar(name, scalar)
                    .ok_or_else(|| ResolveError::ArrayElementMismatch {
                        index,
                        expected: elem_ty.to_string(),
                    })
            }
            ty if ty.is_scalar() => self
                .converter
                .convert(scalar, ty)
                .map(Value::from)
                .ok_or_else(|| ResolveError::ArrayElementMismatch {
                    index,
                    expected: elem_ty.to_string(),
                }),
            _ => Err(ResolveError::ArrayElementMismatch {
                index,
                expected: elem_ty.to_string(),
            }),
        }
    }

    fn coerce_field_scalar(
        &mut self,
        target: &Value,
        field: &str,
        declared: &FieldType,
        scalar: &Scalar,
    ) -> Result<Value, ResolveError> {
        if scalar.is_null() {
            return Ok(Value::Null);
        }
        let converted = match declared {
            FieldType::Any => Some(Value::from(scalar)),
            FieldType::Enum(name) => self.enum_from_scalar(name, scalar),
            ty if ty.is_scalar() => self.converter.convert(scalar, ty).map(Value::from),
            _ => None,
        };
        converted.ok_or_else(|| ResolveError::FieldAccess {
            type_name: instance_name(target),
            field: field.to_owned(),
        })
    }

    fn enum_from_scalar(&self, name: &str, scalar: &Scalar) -> Option<Value> {
        let types = self.types;
        let descriptor = types.get(name)?;
        let variant = scalar.as_str()?;
        descriptor
            .has_variant(variant)
            .then(|| Value::enum_constant(name, variant))
    }

    fn store_element(
        &mut self,
        target: &Value,
        is_set: bool,
        value: Value,
    ) -> Result<(), ResolveError> {
        match (target, is_set) {
            (Value::Array(arr), false) => arr.borrow_mut().push(value),
            (Value::Set(set), true) => {
                set.borrow_mut().insert(value);
            }
            _ => {
                return Err(ResolveError::CorruptNode(
                    "container target shape mismatch".into(),
                ));
            }
        }
        Ok(())
    }

    fn set_instance_field(
        &mut self,
        target: &Value,
        field: &str,
        value: Value,
    ) -> Result<(), ResolveError> {
        match target {
            Value::Object(obj) => {
                obj.borrow_mut().set(field, value);
                Ok(())
            }
            _ => Err(ResolveError::CorruptNode(
                "field write into non-object target".into(),
            )),
        }
    }

    /// Declared-type check for a field write. Null always passes; forward
    /// references hold a null placeholder until patched, and the patch write
    /// re-checks with the real value.
    fn check_field_assign(
        &self,
        target: &Value,
        field: &str,
        declared: Option<&FieldType>,
        value: &Value,
    ) -> Result<(), ResolveError> {
        let Some(ft) = declared else {
            return Ok(());
        };
        if value.is_null() {
            return Ok(());
        }
        let ok = match ft {
            FieldType::Any => true,
            ty if ty.is_scalar() => value.as_scalar().is_some(),
            FieldType::Array(_) => matches!(value, Value::Array(_)),
            FieldType::Set(_) => matches!(value, Value::Set(_)),
            FieldType::Map => matches!(value, Value::Map(_) | Value::Object(_)),
            FieldType::Object(_) => matches!(value, Value::Object(_)),
            FieldType::Enum(_) => matches!(value, Value::Enum(_)),
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(ResolveError::FieldAccess {
                type_name: instance_name(target),
                field: field.to_owned(),
            })
        }
    }

    fn declared_field_type(&self, parent: &Value, field: &str) -> Option<FieldType> {
        let types = self.types;
        let Value::Object(obj) = parent else {
            return None;
        };
        let type_name = obj.borrow().type_name.clone()?;
        types
            .get(&type_name)
            .and_then(|d| d.field_type(field))
            .cloned()
    }

    fn check_root(&self, value: Value, declared: &FieldType) -> Result<Value, ResolveError> {
        let mismatch = || ResolveError::RootTypeMismatch {
            expected: declared.to_string(),
        };
        if value.is_null() {
            return Ok(value);
        }
        match declared {
            FieldType::Any => Ok(value),
            ty if ty.is_scalar() => value
                .as_scalar()
                .and_then(|s| self.converter.convert(&s, ty))
                .map(Value::from)
                .ok_or_else(mismatch),
            FieldType::Array(_) => matches!(value, Value::Array(_))
                .then_some(value)
                .ok_or_else(mismatch),
            FieldType::Set(_) => matches!(value, Value::Set(_))
                .then_some(value)
                .ok_or_else(mismatch),
            FieldType::Map => matches!(value, Value::Map(_))
                .then_some(value)
                .ok_or_else(mismatch),
            FieldType::Object(name) => {
                let expected = self.coerce_name(name);
                let ok = matches!(&value, Value::Object(obj)
                    if obj.borrow().type_name.as_deref() == Some(expected.as_str()));
                ok.then_some(value).ok_or_else(mismatch)
            }
            FieldType::Enum(name) => {
                let ok = matches!(&value, Value::Enum(e) if e.type_name == *name);
                ok.then_some(value).ok_or_else(mismatch)
            }
            _ => Ok(value),
        }
    }
}

/// Element type and set-ness of a container target.
fn element_type(resolved: &Option<FieldType>, target: &Value) -> (FieldType, bool) {
    match resolved {
        Some(FieldType::Array(elem)) => ((**elem).clone(), false),
        Some(FieldType::Set(elem)) => ((**elem).clone(), true),
        _ => (FieldType::Any, matches!(target, Value::Set(_))),
    }
}

fn instance_name(target: &Value) -> String {
    match target {
        Value::Object(obj) => obj
            .borrow()
            .type_name
            .clone()
            .unwrap_or_else(|| "<object>".to_owned()),
        other => other.type_label().to_owned(),
    }
}
