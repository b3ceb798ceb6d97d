use std::rc::Rc;

use flintir::{
    class::{ClassType, Object},
    function::Function,
    module::{CompilationUnit, Module},
    value::{Dict, EnumValue, List, Value},
};
use flintpack::{
    NONE_INDEX, SerializeOptions,
    records::{ModuleContainer, ValueRecord},
    serialize_module,
};

fn module_with_constants(constants: Vec<Value>) -> Module {
    let class = Rc::new(ClassType::new("demo.M").with_attributes(["name"]));
    let state = Rc::new(Object::new(class, vec![Value::String(Rc::from("m"))]));

    let mut main = Function::new("demo.M.main");
    main.constants = constants;
    let main = Rc::new(main);

    let mut unit = CompilationUnit::new();
    unit.register_function(Rc::clone(&main));
    Module::new(unit, vec![main], state, 8)
}

fn serialize(module: &Module) -> ModuleContainer {
    serialize_module(module, &SerializeOptions::default()).expect("serialization should succeed")
}

fn main_constants(container: &ModuleContainer) -> &[u32] {
    let ValueRecord::Function(function) = &container.values[container.methods[0] as usize] else {
        panic!("method slot should hold a function record");
    };
    &function.constants
}

#[test]
fn none_sentinel_is_reserved_at_index_zero() {
    let module = module_with_constants(vec![Value::None, Value::Int(1), Value::None]);
    let container = serialize(&module);

    assert!(container.values[0].is_none());
    let constants = main_constants(&container);
    assert_eq!(constants[0], NONE_INDEX);
    assert_eq!(constants[2], NONE_INDEX);
    assert_ne!(constants[1], NONE_INDEX, "non-none values never map to 0");
    assert_eq!(
        container.values.iter().filter(|v| v.is_none()).count(),
        1,
        "the sentinel is the only none record"
    );
}

#[test]
fn hashable_values_are_encoded_once() {
    let module = module_with_constants(vec![
        Value::Int(7),
        Value::String(Rc::from("twice")),
        Value::Int(7),
        Value::String(Rc::from("twice")),
        Value::Tuple(Rc::new(vec![Value::Int(7), Value::Bool(true)])),
        Value::Tuple(Rc::new(vec![Value::Int(7), Value::Bool(true)])),
    ]);
    let container = serialize(&module);

    let constants = main_constants(&container);
    assert_eq!(constants[0], constants[2]);
    assert_eq!(constants[1], constants[3]);
    assert_eq!(constants[4], constants[5]);
    assert_eq!(
        container.values.iter().filter(|v| v.is_int()).count(),
        1,
        "equal ints collapse to one record"
    );
}

#[test]
fn non_internable_values_are_encoded_afresh() {
    let list = || {
        Value::List(Rc::new(List {
            elem_annotation: "str".to_string(),
            elements: vec![Value::String(Rc::from("a"))],
        }))
    };
    let module = module_with_constants(vec![list(), list()]);
    let container = serialize(&module);

    let constants = main_constants(&container);
    assert_ne!(
        constants[0], constants[1],
        "lists are not internable and must not collapse"
    );
    assert_eq!(container.values.iter().filter(|v| v.is_list()).count(), 2);
    // The shared "a" element still dedups; the other string record is the
    // root state's attribute.
    assert_eq!(container.values.iter().filter(|v| v.is_string()).count(), 2);
}

#[test]
fn containers_reference_only_earlier_records() {
    let inner = Value::Tuple(Rc::new(vec![Value::Int(1), Value::String(Rc::from("k"))]));
    let dict = Value::Dict(Rc::new(Dict {
        key_annotation: "str".to_string(),
        value_annotation: "Tuple[int, str]".to_string(),
        entries: vec![(Value::String(Rc::from("k")), inner.clone())],
    }));
    let module = module_with_constants(vec![
        dict,
        inner,
        Value::Enum(Rc::new(EnumValue {
            type_name: "demo.Color".to_string(),
            value: Value::Int(2),
        })),
    ]);
    let container = serialize(&module);

    for (index, record) in container.values.iter().enumerate() {
        for reference in record.referenced_indices() {
            assert!(
                (reference as usize) < index,
                "record {index} references {reference}, a forward or self reference"
            );
        }
    }
}

#[test]
fn primitive_lists_take_the_inline_form() {
    let module = module_with_constants(vec![
        Value::List(Rc::new(List {
            elem_annotation: "int".to_string(),
            elements: vec![Value::Int(1), Value::Int(2), Value::Int(3)],
        })),
        Value::List(Rc::new(List {
            elem_annotation: "bool".to_string(),
            elements: vec![Value::Bool(true), Value::Bool(false)],
        })),
        Value::List(Rc::new(List {
            elem_annotation: "float".to_string(),
            elements: vec![Value::Double(0.5)],
        })),
    ]);
    let container = serialize(&module);

    let constants = main_constants(&container).to_vec();
    match &container.values[constants[0] as usize] {
        ValueRecord::IntList(items) => assert_eq!(items, &vec![1, 2, 3]),
        other => panic!("expected an inline int list, got {other:?}"),
    }
    match &container.values[constants[1] as usize] {
        ValueRecord::BoolList(items) => assert_eq!(items, &vec![true, false]),
        other => panic!("expected an inline bool list, got {other:?}"),
    }
    match &container.values[constants[2] as usize] {
        ValueRecord::DoubleList(items) => assert_eq!(items, &vec![0.5]),
        other => panic!("expected an inline double list, got {other:?}"),
    }
    assert_eq!(
        container.values.iter().filter(|v| v.is_int()).count(),
        0,
        "inline lists must not spill element records"
    );
}

#[test]
fn generic_lists_store_element_indices_and_annotation() {
    let module = module_with_constants(vec![Value::List(Rc::new(List {
        elem_annotation: "str".to_string(),
        elements: vec![Value::String(Rc::from("a")), Value::String(Rc::from("b"))],
    }))]);
    let container = serialize(&module);

    let constants = main_constants(&container).to_vec();
    match &container.values[constants[0] as usize] {
        ValueRecord::List { items, annotation } => {
            assert_eq!(annotation, "List[str]");
            assert_eq!(items.len(), 2);
            for (item, expected) in items.iter().zip(["a", "b"]) {
                match &container.values[*item as usize] {
                    ValueRecord::String(s) => assert_eq!(s, expected),
                    other => panic!("expected a string element, got {other:?}"),
                }
            }
        }
        other => panic!("expected a generic list record, got {other:?}"),
    }
}

#[test]
fn dict_entries_keep_iteration_order() {
    let module = module_with_constants(vec![Value::Dict(Rc::new(Dict {
        key_annotation: "str".to_string(),
        value_annotation: "int".to_string(),
        entries: vec![
            (Value::String(Rc::from("zeta")), Value::Int(1)),
            (Value::String(Rc::from("alpha")), Value::Int(2)),
        ],
    }))]);
    let container = serialize(&module);

    let constants = main_constants(&container).to_vec();
    match &container.values[constants[0] as usize] {
        ValueRecord::Dict {
            keys,
            values,
            annotation,
        } => {
            assert_eq!(annotation, "Dict[str, int]");
            let key_names: Vec<_> = keys
                .iter()
                .map(|k| match &container.values[*k as usize] {
                    ValueRecord::String(s) => s.as_str(),
                    other => panic!("expected a string key, got {other:?}"),
                })
                .collect();
            assert_eq!(key_names, vec!["zeta", "alpha"], "insertion order preserved");
            assert_eq!(values.len(), 2);
        }
        other => panic!("expected a dict record, got {other:?}"),
    }
}

#[test]
fn enums_store_their_underlying_value() {
    let module = module_with_constants(vec![Value::Enum(Rc::new(EnumValue {
        type_name: "demo.Color".to_string(),
        value: Value::String(Rc::from("red")),
    }))]);
    let container = serialize(&module);

    let constants = main_constants(&container).to_vec();
    match &container.values[constants[0] as usize] {
        ValueRecord::Enum {
            type_name,
            value_index,
        } => {
            assert_eq!(type_name, "demo.Color");
            match &container.values[*value_index as usize] {
                ValueRecord::String(s) => assert_eq!(s, "red"),
                other => panic!("expected the underlying string, got {other:?}"),
            }
        }
        other => panic!("expected an enum record, got {other:?}"),
    }
}
