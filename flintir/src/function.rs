//! Bytecode functions and call schemas.
use std::rc::Rc;

use crate::{
    class::ClassType,
    instr::{DebugHandle, Instruction, Operator},
    value::Value,
};

/// One compiled callable as produced by the bytecode compiler.
///
/// `types` holds the canonical printed annotation of every type the bytecode
/// references (the serializer validates these against the internal-namespace
/// allowlist). `register_size` is carried verbatim: register locations are
/// embedded in the instruction stream, so the interpreter only needs the
/// file size.
#[derive(Debug, Clone)]
pub struct Function {
    pub qualified_name: String,
    pub instructions: Vec<Instruction>,
    pub operators: Vec<Operator>,
    pub constants: Vec<Value>,
    pub types: Vec<String>,
    pub register_size: u32,
    pub schema: Option<Schema>,
    /// Parallel to `instructions`; empty when no debug info was recorded.
    pub debug_handles: Vec<DebugHandle>,
}

impl Function {
    /// Minimal schema-less function, useful as a starting point.
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            instructions: Vec::new(),
            operators: Vec::new(),
            constants: Vec::new(),
            types: Vec::new(),
            register_size: 0,
            schema: None,
            debug_handles: Vec::new(),
        }
    }
}

/// Declared fixed argument/return shape of a callable.
///
/// On-device interpretation requires a single overload per name and a fixed
/// arity; the `overload_name`, `is_vararg` and `is_varret` fields exist so
/// the serializer can reject schemas that violate this.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub overload_name: String,
    pub arguments: Vec<Argument>,
    pub returns: Vec<Argument>,
    pub is_vararg: bool,
    pub is_varret: bool,
}

impl Schema {
    /// The receiver class of a bound method, recovered from the first
    /// argument when it is class-typed.
    pub fn receiver_class(&self) -> Option<Rc<ClassType>> {
        self.arguments.first().and_then(|arg| arg.class.clone())
    }
}

/// One argument or return slot of a [`Schema`].
#[derive(Debug, Clone)]
pub struct Argument {
    pub name: String,
    /// Canonical printed form of the declared type.
    pub annotation: String,
    /// Set when the declared type is a class; the first argument's class is
    /// the owning class of a bound method.
    pub class: Option<Rc<ClassType>>,
    /// Default value, [`Value::None`] when the slot has no default.
    pub default_value: Value,
}

impl Argument {
    pub fn new(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: annotation.into(),
            class: None,
            default_value: Value::None,
        }
    }

    pub fn with_default(mut self, default_value: Value) -> Self {
        self.default_value = default_value;
        self
    }

    pub fn with_class(mut self, class: Rc<ClassType>) -> Self {
        self.class = Some(class);
        self
    }
}
