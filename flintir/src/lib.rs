//! In-memory representation of a compiled Flint module.
//!
//! This crate defines the runtime data consumed by the `flintpack`
//! serializer: the tagged [`value::Value`] sum type, bytecode
//! [`function::Function`]s with their instruction streams and call schemas,
//! the lightweight [`class::ClassType`]/[`class::Object`] attribute model,
//! [`tensor::Tensor`] metadata with shared backing storage, and the
//! [`module::Module`] root that ties exported methods to the module state.
//!
//! Nothing in this crate performs I/O or encoding; it is the closed input
//! surface the serializer dispatches over.

pub mod class;
pub mod function;
pub mod instr;
pub mod module;
pub mod tensor;
pub mod value;
