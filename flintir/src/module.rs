//! Module roots and the compilation unit function table.
use std::{collections::BTreeMap, rc::Rc};

use crate::{class::Object, function::Function, value::Value};

/// Lookup table of every compiled function, keyed by qualified name.
///
/// Besides the module's exported methods this also holds free functions such
/// as per-class `__setstate__` restorers; the serializer resolves those by
/// name here.
#[derive(Debug, Default)]
pub struct CompilationUnit {
    functions: BTreeMap<String, Rc<Function>>,
}

impl CompilationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under its qualified name, replacing any previous
    /// entry with the same name.
    pub fn register_function(&mut self, function: Rc<Function>) {
        self.functions
            .insert(function.qualified_name.clone(), function);
    }

    pub fn find_function(&self, qualified_name: &str) -> Option<&Rc<Function>> {
        self.functions.get(qualified_name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Rc<Function>> {
        self.functions.values()
    }
}

/// A loaded module: its compilation unit, the exported methods in export
/// order, and the module's own state object.
#[derive(Debug)]
pub struct Module {
    pub compilation_unit: CompilationUnit,
    /// Exported methods, in export order.
    pub methods: Vec<Rc<Function>>,
    /// The module's root state object.
    pub state: Rc<Object>,
    pub bytecode_version: u32,
}

impl Module {
    pub fn new(
        compilation_unit: CompilationUnit,
        methods: Vec<Rc<Function>>,
        state: Rc<Object>,
        bytecode_version: u32,
    ) -> Self {
        Self {
            compilation_unit,
            methods,
            state,
            bytecode_version,
        }
    }

    /// The module state as a value, as the serializer consumes it.
    pub fn state_value(&self) -> Value {
        Value::Object(Rc::clone(&self.state))
    }
}
