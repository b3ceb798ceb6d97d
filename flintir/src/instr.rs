//! Bytecode instructions and operator references.
//!
//! An instruction is a fixed triple: an opcode and two integer operands
//! whose meaning depends on the opcode (constant-table index, register
//! number, jump offset, operator-table index, argument count). The
//! serializer transliterates the stream verbatim without reinterpreting it.
use strum::{EnumIs, FromRepr};

/// Opcode of one bytecode instruction.
///
/// The numeric representation is part of the on-device contract; variants
/// must not be reordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs, FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum OpCode {
    /// Push the value of register `x` onto the stack.
    Load = 0,
    /// Push constant-table entry `x` onto the stack.
    LoadConst = 1,
    /// Move register `x` onto the stack, clearing the register.
    Move = 2,
    /// Pop the stack into register `x`.
    Store = 3,
    /// Pop and discard `x` values.
    Drop = 4,
    /// Invoke operator-table entry `x`.
    Op = 5,
    /// Invoke operator-table entry `x` with `n` trailing arguments.
    OpN = 6,
    /// Call the function at constant-table entry `x`.
    Call = 7,
    /// Unconditional relative jump by `x`.
    Jump = 8,
    /// Pop a bool; relative jump by `x` when it is false.
    JumpIfFalse = 9,
    /// Read attribute slot `x` of the object on top of the stack.
    GetAttr = 10,
    /// Write attribute slot `x` of the object below the top of the stack.
    SetAttr = 11,
    /// Collect the top `x` values into a tuple, annotated by type entry `n`.
    MakeTuple = 12,
    /// Collect the top `x` values into a list, annotated by type entry `n`.
    MakeList = 13,
    /// Return, leaving `x` values on the stack.
    Ret = 14,
}

/// One bytecode instruction: opcode plus two integer operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instruction {
    pub op: OpCode,
    pub x: i32,
    pub n: i32,
}

impl Instruction {
    pub const fn new(op: OpCode, x: i32, n: i32) -> Self {
        Self { op, x, n }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} {} {}", self.op, self.x, self.n)
    }
}

/// Entry of a function's operator table: the operator name, its overload
/// string (empty for the sole overload) and the fixed number of inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operator {
    pub name: String,
    pub overload: String,
    pub arity: i32,
}

impl Operator {
    pub fn new(name: impl Into<String>, overload: impl Into<String>, arity: i32) -> Self {
        Self {
            name: name.into(),
            overload: overload.into(),
            arity,
        }
    }
}

/// Opaque handle correlating an instruction with out-of-band debug records.
pub type DebugHandle = i64;
