use std::{cell::Cell, rc::Rc};

use flintir::{
    class::{ClassType, Object},
    function::Function,
    module::{CompilationUnit, Module},
    value::Value,
};
use flintpack::{
    SETSTATE_NOT_FOUND, SerializeOptions,
    records::{ModuleContainer, ObjectRecord, ValueRecord},
    serialize_module,
};

fn root_object_record(container: &ModuleContainer) -> &ObjectRecord {
    let ValueRecord::Object(record) = &container.values[container.state_index as usize] else {
        panic!("state slot should hold an object record");
    };
    record
}

#[test]
fn plain_classes_store_fields_in_declaration_order() {
    let class = Rc::new(ClassType::new("demo.Pair").with_attributes(["first", "second"]));
    let state = Rc::new(Object::new(
        class,
        vec![Value::Int(1), Value::String(Rc::from("two"))],
    ));
    let module = Module::new(CompilationUnit::new(), Vec::new(), state, 8);

    let container =
        serialize_module(&module, &SerializeOptions::default()).expect("serialization succeeds");

    let record = root_object_record(&container);
    let ObjectRecord::WithFields {
        type_index,
        attributes,
    } = record
    else {
        panic!("a plain class encodes per-field, got {record:?}");
    };

    let type_record = &container.object_types[*type_index as usize];
    assert!(type_record.kind.is_class_with_fields());
    assert_eq!(type_record.attribute_names, vec!["first", "second"]);

    assert_eq!(attributes.len(), 2);
    match &container.values[attributes[0] as usize] {
        ValueRecord::Int(v) => assert_eq!(*v, 1),
        other => panic!("expected the first slot's int, got {other:?}"),
    }
    match &container.values[attributes[1] as usize] {
        ValueRecord::String(s) => assert_eq!(s, "two"),
        other => panic!("expected the second slot's string, got {other:?}"),
    }
}

#[test]
fn setstate_classes_link_their_serialized_restorer() {
    let class = Rc::new(
        ClassType::new("demo.Counter")
            .with_attributes(["count"])
            .with_state_pair(Rc::new(|object: &Object| object.get_slot(0).clone())),
    );
    let restorer = Rc::new(Function::new(class.setstate_name()));
    let state = Rc::new(Object::new(class, vec![Value::Int(41)]));

    let mut unit = CompilationUnit::new();
    unit.register_function(Rc::clone(&restorer));
    let module = Module::new(unit, vec![restorer], state, 8);

    let container =
        serialize_module(&module, &SerializeOptions::default()).expect("serialization succeeds");

    let record = root_object_record(&container);
    let ObjectRecord::WithState {
        type_index,
        state_index,
        setstate_index,
    } = record
    else {
        panic!("a state-pair class encodes through its state, got {record:?}");
    };

    assert!(container.object_types[*type_index as usize].kind.is_class_with_setstate());
    assert_eq!(
        *setstate_index, container.methods[0],
        "the restorer index is the serialized function's slot"
    );
    match &container.values[*state_index as usize] {
        ValueRecord::Int(v) => assert_eq!(*v, 41),
        other => panic!("expected the extracted state, got {other:?}"),
    }
}

#[test]
fn missing_restorers_get_the_not_found_sentinel() {
    let class = Rc::new(
        ClassType::new("demo.Gadget")
            .with_attributes(["payload"])
            .with_state_pair(Rc::new(|object: &Object| object.get_slot(0).clone())),
    );
    let state = Rc::new(Object::new(class, vec![Value::Int(7)]));
    let module = Module::new(CompilationUnit::new(), Vec::new(), state, 8);

    let container =
        serialize_module(&module, &SerializeOptions::default()).expect("serialization succeeds");

    let record = root_object_record(&container);
    let ObjectRecord::WithState { setstate_index, .. } = record else {
        panic!("a state-pair class encodes through its state, got {record:?}");
    };
    assert_eq!(*setstate_index, SETSTATE_NOT_FOUND);
    assert_ne!(
        *setstate_index, 0,
        "the sentinel is distinct from the none index"
    );
}

#[test]
fn capability_classes_are_marked_opaque() {
    // A `__setstate__` method on the class itself, with no free restorer in
    // the compilation unit, marks an externally-implemented class.
    let class = Rc::new(
        ClassType::new("__flint__.ext.classes.Gadget")
            .with_attributes(["payload"])
            .with_state_pair(Rc::new(|object: &Object| object.get_slot(0).clone())),
    );
    let state = Rc::new(Object::new(class, vec![Value::Int(3)]));
    let module = Module::new(CompilationUnit::new(), Vec::new(), state, 8);

    let container =
        serialize_module(&module, &SerializeOptions::default()).expect("serialization succeeds");

    let record = root_object_record(&container);
    let type_record = &container.object_types[record.type_index() as usize];
    assert!(type_record.kind.is_custom_class());
    assert!(
        type_record.attribute_names.is_empty(),
        "opaque classes expose no layout"
    );
}

#[test]
fn state_extraction_runs_exactly_once_per_object() {
    let calls = Rc::new(Cell::new(0u32));
    let counter = Rc::clone(&calls);
    let class = Rc::new(
        ClassType::new("demo.Counter")
            .with_attributes(["count"])
            .with_state_pair(Rc::new(move |object: &Object| {
                counter.set(counter.get() + 1);
                object.get_slot(0).clone()
            })),
    );
    let state = Rc::new(Object::new(class, vec![Value::Int(1)]));
    let module = Module::new(CompilationUnit::new(), Vec::new(), state, 8);

    serialize_module(&module, &SerializeOptions::default()).expect("serialization succeeds");
    assert_eq!(calls.get(), 1);
}

#[test]
fn nested_objects_share_one_type_record() {
    let leaf_class = Rc::new(ClassType::new("demo.Leaf").with_attributes(["value"]));
    let leaf = |v: i64| {
        Value::Object(Rc::new(Object::new(
            Rc::clone(&leaf_class),
            vec![Value::Int(v)],
        )))
    };
    let root_class = Rc::new(ClassType::new("demo.Root").with_attributes(["left", "right"]));
    let state = Rc::new(Object::new(root_class, vec![leaf(1), leaf(2)]));
    let module = Module::new(CompilationUnit::new(), Vec::new(), state, 8);

    let container =
        serialize_module(&module, &SerializeOptions::default()).expect("serialization succeeds");

    assert_eq!(container.object_types.len(), 2);
    assert_eq!(
        container
            .object_types
            .iter()
            .filter(|t| t.qualified_name == "demo.Leaf")
            .count(),
        1,
        "both leaves resolve to the same type record"
    );
    assert_eq!(
        container.values.iter().filter(|v| v.is_object()).count(),
        3
    );
}
