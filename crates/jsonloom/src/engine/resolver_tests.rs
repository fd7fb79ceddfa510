//! End-to-end resolution scenarios.

use std::cell::RefCell;
use std::rc::Rc;

use indoc::indoc;
use jsonloom_core::Document;

use crate::engine::{FactoryRegistry, ReadOptions, ResolveError, Resolver};
use crate::reader::Reader;
use crate::types::{FieldType, TypeDescriptor, TypeRegistry};
use crate::{Instance, Value};

fn point_types() -> TypeRegistry {
    let mut types = TypeRegistry::new();
    types.register(
        TypeDescriptor::record("Point")
            .field("x", FieldType::Int)
            .field("y", FieldType::Int),
    );
    types
}

// ----------------------------------------------------------------------
// Core scenarios
// ----------------------------------------------------------------------

#[test]
fn array_of_primitives_with_declared_root() {
    let reader = Reader::new();
    let resolved = reader
        .read_str_as("[1, 2, 3]", FieldType::array(FieldType::Int))
        .unwrap();

    let arr = resolved.value;
    assert_eq!(arr.index(0).unwrap().as_i64(), Some(1));
    assert_eq!(arr.index(1).unwrap().as_i64(), Some(2));
    assert_eq!(arr.index(2).unwrap().as_i64(), Some(3));
    assert!(arr.index(3).is_none());
}

#[test]
fn typed_record() {
    let reader = Reader::new().with_types(point_types());
    let resolved = reader
        .read_str(r#"{"@type": "Point", "x": 3, "y": 4}"#)
        .unwrap();

    let value = resolved.value;
    assert_eq!(value.field("x").unwrap().as_i64(), Some(3));
    assert_eq!(value.field("y").unwrap().as_i64(), Some(4));
    if let Value::Object(obj) = &value {
        assert_eq!(obj.borrow().type_name.as_deref(), Some("Point"));
    } else {
        panic!("expected object");
    }
}

#[test]
fn forward_cycle_preserves_identity() {
    let reader = Reader::new();
    let resolved = reader
        .read_str(indoc! {r#"
            [
                {"@id": 1, "peer": {"@ref": 2}},
                {"@id": 2, "peer": {"@ref": 1}}
            ]
        "#})
        .unwrap();

    let a = resolved.value.index(0).unwrap();
    let b = resolved.value.index(1).unwrap();
    assert!(a.field("peer").unwrap().same(&b));
    assert!(b.field("peer").unwrap().same(&a));
}

#[test]
fn forward_reference_lands_in_field() {
    // `x` is walked before the definition of id 2 exists, so the write goes
    // through the patch pass.
    let reader = Reader::new();
    let resolved = reader
        .read_str(r#"{"x": {"@ref": 2}, "y": {"@id": 2, "name": "n"}}"#)
        .unwrap();

    let x = resolved.value.field("x").unwrap();
    let y = resolved.value.field("y").unwrap();
    assert!(x.same(&y));
    assert_eq!(x.field("name").unwrap().as_str().as_deref(), Some("n"));
}

#[test]
fn map_with_forward_referenced_key() {
    let reader = Reader::new().with_types(point_types());
    // Array elements pop in reverse order, so the map is traversed before
    // the node defining id 9 has a target; its key array holds a placeholder
    // until the patch pass, and the map itself fills in the rehash pass.
    let resolved = reader
        .read_str(indoc! {r#"
            [
                {"holder": {"@id": 9, "@type": "Point", "x": 1, "y": 2}},
                {"@keys": [{"@ref": 9}], "@items": ["v"]}
            ]
        "#})
        .unwrap();

    let map = resolved.value.index(1).unwrap();
    let key = resolved.value.index(0).unwrap().field("holder").unwrap();

    let Value::Map(map) = &map else {
        panic!("expected map");
    };
    let found = map.borrow().get(&key).unwrap();
    assert_eq!(found.as_str().as_deref(), Some("v"));
}

#[test]
fn missing_field_invokes_handler_once() {
    let seen: Rc<RefCell<Vec<(String, Value)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    let options = ReadOptions::new().on_missing_field(move |_target, field, value| {
        sink.borrow_mut().push((field.to_owned(), value.clone()));
    });
    let reader = Reader::new().with_types(point_types()).with_options(options);

    reader
        .read_str(r#"{"@type": "Point", "x": 1, "y": 2, "z": 3}"#)
        .unwrap();

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "z");
    assert_eq!(seen[0].1.as_i64(), Some(3));
}

#[test]
fn missing_field_fires_after_patching() {
    let mut types = TypeRegistry::new();
    types.register(TypeDescriptor::record("Linked").field("peer", FieldType::Any));

    let peer_at_callback: Rc<RefCell<Option<Value>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&peer_at_callback);

    let options = ReadOptions::new().on_missing_field(move |target, _field, _value| {
        *sink.borrow_mut() = target.field("peer");
    });
    let reader = Reader::new().with_types(types).with_options(options);

    // The Linked record is traversed first (LIFO), deferring its `peer`
    // reference; by the time the handler fires, the patch pass must have
    // filled it in.
    reader
        .read_str(indoc! {r#"
            [
                {"wrap": {"@id": 2, "name": "n"}},
                {"@type": "Linked", "peer": {"@ref": 2}, "z": 3}
            ]
        "#})
        .unwrap();

    let peer = peer_at_callback.borrow().clone().unwrap();
    assert_eq!(peer.field("name").unwrap().as_str().as_deref(), Some("n"));
}

#[test]
fn missing_forward_reference_reaches_handler() {
    let seen: Rc<RefCell<Vec<(String, Value)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);

    let options = ReadOptions::new().on_missing_field(move |_target, field, value| {
        sink.borrow_mut().push((field.to_owned(), value.clone()));
    });
    let reader = Reader::new().with_types(point_types()).with_options(options);

    // `extra` is walked before the node defining id 3 has a shell (it is
    // created only when `hold` is reached later in the same field loop), so
    // the leftover's value arrives through the patch pass.
    let resolved = reader
        .read_str(r#"{"@type": "Point", "x": 1, "y": 2, "extra": {"@ref": 3}, "hold": {"@id": 3, "v": 9}}"#)
        .unwrap();

    assert_eq!(resolved.value.field("x").unwrap().as_i64(), Some(1));

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, "extra");
    assert_eq!(seen[0].1.field("v").unwrap().as_i64(), Some(9));
    assert_eq!(seen[1].0, "hold");
    assert!(seen[0].1.same(&seen[1].1));
}

#[test]
fn unknown_reference_faults() {
    let reader = Reader::new();
    let err = reader.read_str(r#"{"@ref": 42}"#).unwrap_err();

    assert!(matches!(
        err,
        crate::Error::Resolve(ResolveError::UnknownReference(42))
    ));
}

#[test]
fn unknown_reference_in_field_faults() {
    let reader = Reader::new();
    let err = reader.read_str(r#"{"x": {"@ref": 42}}"#).unwrap_err();

    assert!(matches!(
        err,
        crate::Error::Resolve(ResolveError::UnknownReference(42))
    ));
}

// ----------------------------------------------------------------------
// References and identity
// ----------------------------------------------------------------------

#[test]
fn diamond_references_share_identity() {
    let reader = Reader::new();
    let resolved = reader
        .read_str(r#"{"left": {"@ref": 1}, "right": {"@ref": 1}, "node": {"@id": 1, "v": 5}}"#)
        .unwrap();

    let left = resolved.value.field("left").unwrap();
    let right = resolved.value.field("right").unwrap();
    let node = resolved.value.field("node").unwrap();
    assert!(left.same(&right));
    assert!(left.same(&node));
    assert_eq!(left.field("v").unwrap().as_i64(), Some(5));
}

#[test]
fn second_resolve_returns_finished_targets() {
    let mut doc = Document::from_json(r#"[{"@id": 1, "v": 7}]"#).unwrap();
    let reader = Reader::new();
    let first = reader.resolve(&mut doc).unwrap().value;

    let second = reader.resolve(&mut doc).unwrap().value;
    assert!(first.same(&second));
}

#[test]
fn pure_reference_root_resolves_definition() {
    use jsonloom_core::{Node, NodeValue, Scalar};

    let mut doc = Document::new();
    doc.push(Node {
        id: Some(1),
        fields: [("v".to_owned(), NodeValue::Scalar(Scalar::Int(7)))]
            .into_iter()
            .collect(),
        ..Node::default()
    })
    .unwrap();
    let root = doc
        .push(Node {
            ref_id: Some(1),
            ..Node::default()
        })
        .unwrap();
    doc.set_root(root);

    let reader = Reader::new();
    let value = reader.resolve(&mut doc).unwrap().value;
    assert_eq!(value.field("v").unwrap().as_i64(), Some(7));
}

#[test]
fn alias_chain_is_chased() {
    let reader = Reader::new();
    let resolved = reader
        .read_str(indoc! {r#"
            [
                {"@id": 1, "v": 9},
                {"@id": 2, "@ref": 1},
                {"x": {"@ref": 2}}
            ]
        "#})
        .unwrap();

    let via_alias = resolved.value.index(2).unwrap().field("x").unwrap();
    let defining = resolved.value.index(0).unwrap();
    assert!(via_alias.same(&defining));
}

#[test]
fn array_forward_reference_patches_slot() {
    let reader = Reader::new();
    let resolved = reader
        .read_str(indoc! {r#"
            [
                {"a": {"@id": 3, "v": 1}},
                [{"@ref": 3}]
            ]
        "#})
        .unwrap();

    let inner = resolved.value.index(1).unwrap();
    let defined = resolved.value.index(0).unwrap().field("a").unwrap();
    assert!(inner.index(0).unwrap().same(&defined));
}

#[test]
fn set_forward_reference_appends_after_patching() {
    let mut types = TypeRegistry::new();
    types.register(
        TypeDescriptor::record("Bag")
            .field("extra", FieldType::Any)
            .field("vals", FieldType::set(FieldType::Any)),
    );
    let reader = Reader::new().with_types(types);

    // `vals` is traversed before the nested definition of id 4 has a target
    // (children pop in reverse field order), so the element arrives through
    // an append patch and the set is rehashed afterwards.
    let resolved = reader
        .read_str(indoc! {r#"
            {
                "@type": "Bag",
                "extra": {"inner": {"@id": 4, "x": 1}},
                "vals": [{"@ref": 4}]
            }
        "#})
        .unwrap();

    let inner = resolved
        .value
        .field("extra")
        .unwrap()
        .field("inner")
        .unwrap();
    let vals = resolved.value.field("vals").unwrap();
    let Value::Set(set) = &vals else {
        panic!("expected set");
    };
    assert_eq!(set.borrow().len(), 1);
    assert!(set.borrow().contains(&inner));
}

// ----------------------------------------------------------------------
// Types, coercion, enums
// ----------------------------------------------------------------------

#[test]
fn coercion_table_substitutes_declared_type() {
    let options = ReadOptions::new().coerce("OldPoint", "Point");
    let reader = Reader::new().with_types(point_types()).with_options(options);

    let resolved = reader
        .read_str(r#"{"@type": "OldPoint", "x": 1, "y": 2}"#)
        .unwrap();

    if let Value::Object(obj) = &resolved.value {
        assert_eq!(obj.borrow().type_name.as_deref(), Some("Point"));
    } else {
        panic!("expected object");
    }
}

#[test]
fn scalar_fields_coerce_to_declared_types() {
    let mut types = TypeRegistry::new();
    types.register(
        TypeDescriptor::record("Reading")
            .field("count", FieldType::Int)
            .field("ratio", FieldType::Float)
            .field("label", FieldType::Str),
    );
    let reader = Reader::new().with_types(types);

    let resolved = reader
        .read_str(r#"{"@type": "Reading", "count": "12", "ratio": 4, "label": 7}"#)
        .unwrap();

    assert_eq!(resolved.value.field("count").unwrap().as_i64(), Some(12));
    assert_eq!(resolved.value.field("ratio").unwrap().as_f64(), Some(4.0));
    assert_eq!(
        resolved.value.field("label").unwrap().as_str().as_deref(),
        Some("7")
    );
}

#[test]
fn field_scalar_mismatch_is_field_access_error() {
    let reader = Reader::new().with_types(point_types());
    let err = reader
        .read_str(r#"{"@type": "Point", "x": "abc", "y": 2}"#)
        .unwrap_err();

    assert!(matches!(
        err,
        crate::Error::Resolve(ResolveError::FieldAccess { .. })
    ));
}

#[test]
fn enum_constant_resolves() {
    let mut types = TypeRegistry::new();
    types.register(TypeDescriptor::enumeration("Color", ["RED", "GREEN", "BLUE"]));
    let reader = Reader::new().with_types(types);

    let resolved = reader
        .read_str(r#"{"@type": "Color", "name": "GREEN"}"#)
        .unwrap();

    assert!(resolved.value.same(&Value::enum_constant("Color", "GREEN")));
}

#[test]
fn enum_set_resolves() {
    let mut types = TypeRegistry::new();
    types.register(TypeDescriptor::enumeration("Color", ["RED", "GREEN", "BLUE"]));
    let reader = Reader::new().with_types(types);

    let resolved = reader
        .read_str(r#"{"@type": "Color", "@items": ["RED", "BLUE"]}"#)
        .unwrap();

    let Value::Set(set) = &resolved.value else {
        panic!("expected enum set");
    };
    let set = set.borrow();
    assert_eq!(set.len(), 2);
    assert!(set.contains(&Value::enum_constant("Color", "RED")));
    assert!(set.contains(&Value::enum_constant("Color", "BLUE")));
}

#[test]
fn unknown_enum_variant_fails_instantiation() {
    let mut types = TypeRegistry::new();
    types.register(TypeDescriptor::enumeration("Color", ["RED"]));
    let reader = Reader::new().with_types(types);

    let err = reader
        .read_str(r#"{"@type": "Color", "name": "MAUVE"}"#)
        .unwrap_err();
    assert!(matches!(
        err,
        crate::Error::Resolve(ResolveError::Instantiation { .. })
    ));
}

#[test]
fn array_element_mismatch_aborts() {
    let reader = Reader::new();
    let err = reader
        .read_str_as(r#"[1, "abc"]"#, FieldType::array(FieldType::Int))
        .unwrap_err();

    assert!(matches!(
        err,
        crate::Error::Resolve(ResolveError::ArrayElementMismatch { index: 1, .. })
    ));
}

#[test]
fn root_type_mismatch() {
    let reader = Reader::new().with_types(point_types());
    let err = reader
        .read_str_as("[1, 2]", FieldType::object("Point"))
        .unwrap_err();

    assert!(matches!(
        err,
        crate::Error::Resolve(ResolveError::RootTypeMismatch { .. })
    ));
}

#[test]
fn scalar_root_converts_to_declared_type() {
    let reader = Reader::new();
    let resolved = reader.read_str_as(r#""42""#, FieldType::Int).unwrap();
    assert_eq!(resolved.value.as_i64(), Some(42));
}

#[test]
fn wrapper_record_converts_to_scalar() {
    let reader = Reader::new();
    let resolved = reader
        .read_str(r#"{"@type": "int", "value": "42"}"#)
        .unwrap();

    assert_eq!(resolved.value.as_i64(), Some(42));
    assert!(resolved.diagnostics.is_empty());
}

#[test]
fn failed_conversion_probe_is_diagnosed_not_swallowed() {
    let reader = Reader::new();
    let resolved = reader
        .read_str(r#"{"@type": "int", "value": "abc"}"#)
        .unwrap();

    // Fell through to a generic record keeping the raw payload.
    assert_eq!(
        resolved.value.field("value").unwrap().as_str().as_deref(),
        Some("abc")
    );
    assert_eq!(resolved.diagnostics.warning_count(), 1);
}

#[test]
fn unknown_declared_type_degrades_with_note() {
    let reader = Reader::new();
    let resolved = reader.read_str(r#"{"@type": "Ghost", "v": 1}"#).unwrap();

    assert_eq!(resolved.value.field("v").unwrap().as_i64(), Some(1));
    assert!(!resolved.diagnostics.is_empty());
}

#[test]
fn fail_on_unknown_type_errors_instead() {
    let options = ReadOptions::new().fail_on_unknown_type();
    let reader = Reader::new().with_options(options);

    let err = reader.read_str(r#"{"@type": "Ghost", "v": 1}"#).unwrap_err();
    assert!(matches!(
        err,
        crate::Error::Resolve(ResolveError::Instantiation { .. })
    ));
}

#[test]
fn unknown_type_substitute_applies() {
    let mut types = point_types();
    types.register(TypeDescriptor::record("Fallback").field("x", FieldType::Int));

    let options = ReadOptions::new().unknown_type("Fallback");
    let reader = Reader::new().with_types(types).with_options(options);

    let resolved = reader.read_str(r#"{"x": "5"}"#).unwrap();
    if let Value::Object(obj) = &resolved.value {
        assert_eq!(obj.borrow().type_name.as_deref(), Some("Fallback"));
    } else {
        panic!("expected object");
    }
    // The substitute's descriptor drives coercion too.
    assert_eq!(resolved.value.field("x").unwrap().as_i64(), Some(5));
}

// ----------------------------------------------------------------------
// Generic-map mode
// ----------------------------------------------------------------------

#[test]
fn generic_maps_keep_all_fields() {
    let options = ReadOptions::new().generic_maps();
    let reader = Reader::new().with_types(point_types()).with_options(options);

    let resolved = reader
        .read_str(r#"{"@type": "Point", "x": 1, "y": 2, "z": 3}"#)
        .unwrap();

    // No missing-field bookkeeping in map mode; everything is kept.
    assert_eq!(resolved.value.field("z").unwrap().as_i64(), Some(3));
}

#[test]
fn generic_maps_still_coerce_declared_leaves() {
    let mut types = TypeRegistry::new();
    types.register(TypeDescriptor::record("Sample").field("ratio", FieldType::Float));

    let options = ReadOptions::new().generic_maps();
    let reader = Reader::new().with_types(types).with_options(options);

    // An integral wire value comes back as the declared float; this is how
    // typed numerics survive a round trip through the untyped representation.
    let resolved = reader
        .read_str(r#"{"@type": "Sample", "ratio": 4}"#)
        .unwrap();
    assert_eq!(resolved.value.field("ratio").unwrap().as_f64(), Some(4.0));
}

#[test]
fn generic_maps_preserve_unregistered_type_names() {
    let options = ReadOptions::new().generic_maps();
    let reader = Reader::new().with_options(options);

    let resolved = reader.read_str(r#"{"@type": "Ghost", "v": 1}"#).unwrap();
    if let Value::Object(obj) = &resolved.value {
        assert_eq!(obj.borrow().type_name.as_deref(), Some("Ghost"));
    } else {
        panic!("expected object");
    }
}

// ----------------------------------------------------------------------
// Factories
// ----------------------------------------------------------------------

#[test]
fn object_final_factory_short_circuits() {
    let mut factories = FactoryRegistry::new();
    factories.register("Stamp", true, |_resolver, _id| {
        let mut inst = Instance::typed("Stamp");
        inst.set("made", Value::Bool(true));
        Ok(Value::object(inst))
    });
    let reader = Reader::new().with_factories(factories);

    let resolved = reader
        .read_str(r#"{"@type": "Stamp", "child": {"ignored": 1}}"#)
        .unwrap();

    assert_eq!(resolved.value.field("made").unwrap().as_bool(), Some(true));
    // Object-final: the field walk never ran, so the child was not attached.
    assert!(resolved.value.field("child").is_none());
}

#[test]
fn non_final_factory_keeps_preset_fields() {
    let mut types = TypeRegistry::new();
    types.register(
        TypeDescriptor::record("Pt")
            .field("x", FieldType::Int)
            .field("y", FieldType::Int),
    );
    let mut factories = FactoryRegistry::new();
    factories.register("Pt", false, |_resolver, _id| {
        let mut inst = Instance::typed("Pt");
        inst.set("x", Value::Int(99));
        Ok(Value::object(inst))
    });
    let reader = Reader::new().with_types(types).with_factories(factories);

    let resolved = reader
        .read_str(r#"{"@type": "Pt", "x": 1, "y": 2}"#)
        .unwrap();

    // The factory's value wins; the walk fills only what it left unset.
    assert_eq!(resolved.value.field("x").unwrap().as_i64(), Some(99));
    assert_eq!(resolved.value.field("y").unwrap().as_i64(), Some(2));
}

#[test]
fn factory_gathers_remaining_values() {
    let reader = Reader::new().with_factories(pair_factories());

    let resolved = reader
        .read_str(r#"{"@type": "Pair", "a": 1, "b": {"c": 2}}"#)
        .unwrap();

    assert_eq!(resolved.value.field("left").unwrap().as_i64(), Some(1));
    // The gathered child was a shell at factory time and is populated by the
    // time resolution completes.
    let right = resolved.value.field("right").unwrap();
    assert_eq!(right.field("c").unwrap().as_i64(), Some(2));
}

fn pair_factories() -> FactoryRegistry {
    let mut factories = FactoryRegistry::new();
    factories.register("Pair", true, |resolver, id| {
        let values = resolver.gather_remaining(id, &[])?;
        let mut inst = Instance::typed("Pair");
        let mut values = values.into_iter();
        inst.set("left", values.next().unwrap_or(Value::Null));
        inst.set("right", values.next().unwrap_or(Value::Null));
        Ok(Value::object(inst))
    });
    factories
}

#[test]
fn gather_resolves_backward_references() {
    let reader = Reader::new().with_factories(pair_factories());
    let resolved = reader
        .read_str(indoc! {r#"
            [
                {"@id": 9, "v": 1},
                {"@type": "Pair", "a": {"@ref": 9}, "b": 2}
            ]
        "#})
        .unwrap();

    let defined = resolved.value.index(0).unwrap();
    let pair = resolved.value.index(1).unwrap();
    assert!(pair.field("left").unwrap().same(&defined));
    assert_eq!(pair.field("right").unwrap().as_i64(), Some(2));
}

#[test]
fn gather_with_unresolved_forward_reference_faults() {
    let reader = Reader::new().with_factories(pair_factories());

    // The Pair is instantiated before the node defining id 9 has a target;
    // a gathered vector is consumed positionally right away, so dropping or
    // deferring the slot is not an option.
    let err = reader
        .read_str(indoc! {r#"
            [
                {"@type": "Pair", "a": {"@ref": 9}, "b": 2},
                {"@id": 9, "v": 1}
            ]
        "#})
        .unwrap_err();

    assert!(matches!(
        err,
        crate::Error::Resolve(ResolveError::GatherUnresolved { ref_id: 9, .. })
    ));
}

// ----------------------------------------------------------------------
// Structural properties
// ----------------------------------------------------------------------

#[test]
fn acyclic_graphs_resolve_reproducibly() {
    let json = indoc! {r#"
        {
            "@type": "Point",
            "x": 1,
            "y": 2
        }
    "#};
    let reader = Reader::new().with_types(point_types());

    let a = reader.read_str(json).unwrap().value;
    let b = reader.read_str(json).unwrap().value;
    assert_eq!(a, b);
    assert!(!a.same(&b));
}

#[test]
fn null_root_resolves_to_null() {
    let reader = Reader::new();
    assert!(reader.read_str("null").unwrap().value.is_null());
}

#[test]
fn empty_document_resolves_to_null() {
    let mut doc = Document::new();
    let types = TypeRegistry::new();
    let factories = FactoryRegistry::new();
    let options = ReadOptions::new();
    let mut resolver = Resolver::new(&mut doc, &types, &factories, &options);

    assert!(resolver.resolve().unwrap().is_null());
}

#[test]
fn nested_containers_resolve() {
    let reader = Reader::new();
    let resolved = reader
        .read_str(r#"{"rows": [[1, 2], [3]], "meta": {"n": 2}}"#)
        .unwrap();

    let rows = resolved.value.field("rows").unwrap();
    assert_eq!(rows.index(0).unwrap().index(1).unwrap().as_i64(), Some(2));
    assert_eq!(rows.index(1).unwrap().index(0).unwrap().as_i64(), Some(3));
    let meta = resolved.value.field("meta").unwrap();
    assert_eq!(meta.field("n").unwrap().as_i64(), Some(2));
}

#[test]
fn map_with_scalar_keys_resolves() {
    let reader = Reader::new();
    let resolved = reader
        .read_str(r#"{"@keys": ["a", "b"], "@items": [1, 2]}"#)
        .unwrap();

    let Value::Map(map) = &resolved.value else {
        panic!("expected map");
    };
    let map = map.borrow();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&Value::Str("a".into())).unwrap().as_i64(), Some(1));
    assert_eq!(map.get(&Value::Str("b".into())).unwrap().as_i64(), Some(2));
}

#[test]
fn self_referential_record() {
    let reader = Reader::new();
    let resolved = reader
        .read_str(r#"{"@id": 1, "me": {"@ref": 1}}"#)
        .unwrap();

    assert!(resolved.value.field("me").unwrap().same(&resolved.value));
}
