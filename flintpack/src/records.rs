//! Serialized record types and the finalized container.
//!
//! These are the in-memory form of what the loader reads back: one record
//! per value-table slot, plus the object-type table, the storage segment and
//! the module root. Records only ever reference other records by index, and
//! every index points at a record appended earlier in its table, so the
//! whole container is a DAG by construction.
//!
//! [`ModuleContainer::to_bytes`] is the single place the byte layout is
//! produced; see the `wire` module for the primitive conventions.
use flintir::{
    instr::{DebugHandle, Instruction, Operator},
    tensor::ScalarType,
};
use strum::EnumIs;

use crate::{
    CONTAINER_MAGIC, CONTAINER_VERSION,
    wire::{
        DynBuf, WireEncodable, push_bool, push_bytes, push_f64, push_i32, push_i32_vec, push_i64,
        push_index_vec, push_len, push_str, push_u32,
    },
};

/// One slot of the value table.
///
/// The variant order fixes the on-wire kind tag; variants must not be
/// reordered.
#[derive(Debug, Clone, EnumIs)]
pub enum ValueRecord {
    None,
    Int(i64),
    Bool(bool),
    Double(f64),
    ComplexDouble { re: f64, im: f64 },
    String(String),
    /// Specialized inline form of `List[int]`.
    IntList(Vec<i64>),
    /// Specialized inline form of `List[float]`.
    DoubleList(Vec<f64>),
    /// Specialized inline form of `List[bool]`.
    BoolList(Vec<bool>),
    Tuple { items: Vec<u32> },
    List { items: Vec<u32>, annotation: String },
    Dict { keys: Vec<u32>, values: Vec<u32>, annotation: String },
    Tensor(TensorRecord),
    Object(ObjectRecord),
    Device { name: String },
    Enum { type_name: String, value_index: u32 },
    Function(Box<FunctionRecord>),
}

impl ValueRecord {
    /// On-wire kind tag.
    pub fn tag(&self) -> u8 {
        match self {
            ValueRecord::None => 0,
            ValueRecord::Int(_) => 1,
            ValueRecord::Bool(_) => 2,
            ValueRecord::Double(_) => 3,
            ValueRecord::ComplexDouble { .. } => 4,
            ValueRecord::String(_) => 5,
            ValueRecord::IntList(_) => 6,
            ValueRecord::DoubleList(_) => 7,
            ValueRecord::BoolList(_) => 8,
            ValueRecord::Tuple { .. } => 9,
            ValueRecord::List { .. } => 10,
            ValueRecord::Dict { .. } => 11,
            ValueRecord::Tensor(_) => 12,
            ValueRecord::Object(_) => 13,
            ValueRecord::Device { .. } => 14,
            ValueRecord::Enum { .. } => 15,
            ValueRecord::Function(_) => 16,
        }
    }

    /// Every value index this record references, in record order. Used by
    /// invariant checks; sub-tensor records of a quantization scheme carry
    /// storage slots, not value indices, and are not reported here.
    pub fn referenced_indices(&self) -> Vec<u32> {
        match self {
            ValueRecord::Tuple { items } | ValueRecord::List { items, .. } => items.clone(),
            ValueRecord::Dict { keys, values, .. } => {
                keys.iter().chain(values.iter()).copied().collect()
            }
            ValueRecord::Object(record) => record.referenced_indices(),
            ValueRecord::Enum { value_index, .. } => vec![*value_index],
            ValueRecord::Function(record) => record.referenced_indices(),
            _ => Vec::new(),
        }
    }
}

impl WireEncodable for ValueRecord {
    fn encode_wire(&self, buf: &mut DynBuf) {
        buf.push(self.tag());
        match self {
            ValueRecord::None => {}
            ValueRecord::Int(v) => push_i64(*v, buf),
            ValueRecord::Bool(v) => push_bool(*v, buf),
            ValueRecord::Double(v) => push_f64(*v, buf),
            ValueRecord::ComplexDouble { re, im } => {
                push_f64(*re, buf);
                push_f64(*im, buf);
            }
            ValueRecord::String(s) => push_str(s, buf),
            ValueRecord::IntList(items) => {
                push_len(items.len(), buf);
                for item in items {
                    push_i64(*item, buf);
                }
            }
            ValueRecord::DoubleList(items) => {
                push_len(items.len(), buf);
                for item in items {
                    push_f64(*item, buf);
                }
            }
            ValueRecord::BoolList(items) => {
                push_len(items.len(), buf);
                for item in items {
                    push_bool(*item, buf);
                }
            }
            ValueRecord::Tuple { items } => push_index_vec(items, buf),
            ValueRecord::List { items, annotation } => {
                push_index_vec(items, buf);
                push_str(annotation, buf);
            }
            ValueRecord::Dict {
                keys,
                values,
                annotation,
            } => {
                push_index_vec(keys, buf);
                push_index_vec(values, buf);
                push_str(annotation, buf);
            }
            ValueRecord::Tensor(record) => record.encode_wire(buf),
            ValueRecord::Object(record) => record.encode_wire(buf),
            ValueRecord::Device { name } => push_str(name, buf),
            ValueRecord::Enum {
                type_name,
                value_index,
            } => {
                push_str(type_name, buf);
                push_u32(*value_index, buf);
            }
            ValueRecord::Function(record) => record.encode_wire(buf),
        }
    }
}

/// Serialized form of one bytecode function.
#[derive(Debug, Clone)]
pub struct FunctionRecord {
    pub qualified_name: String,
    pub instructions: Vec<Instruction>,
    pub operators: Vec<Operator>,
    /// Value-table indices of the constant table entries.
    pub constants: Vec<u32>,
    /// Canonical printed forms of every referenced type.
    pub types: Vec<String>,
    pub register_size: u32,
    pub schema: Option<SchemaRecord>,
    /// Parallel to `instructions`; empty when no debug info was recorded.
    pub debug_handles: Vec<DebugHandle>,
    /// Object-type-table index of the owning class of a bound method;
    /// absent for free functions.
    pub class_index: Option<u32>,
}

impl FunctionRecord {
    fn referenced_indices(&self) -> Vec<u32> {
        let mut indices = self.constants.clone();
        if let Some(schema) = &self.schema {
            for arg in schema.arguments.iter().chain(schema.returns.iter()) {
                indices.push(arg.default_index);
            }
        }
        indices
    }
}

impl WireEncodable for FunctionRecord {
    fn encode_wire(&self, buf: &mut DynBuf) {
        push_str(&self.qualified_name, buf);

        push_len(self.instructions.len(), buf);
        for instruction in &self.instructions {
            buf.push(instruction.op as u8);
            push_i32(instruction.x, buf);
            push_i32(instruction.n, buf);
        }

        push_len(self.operators.len(), buf);
        for operator in &self.operators {
            push_str(&operator.name, buf);
            push_str(&operator.overload, buf);
            push_i32(operator.arity, buf);
        }

        push_index_vec(&self.constants, buf);

        push_len(self.types.len(), buf);
        for annotation in &self.types {
            push_str(annotation, buf);
        }

        push_u32(self.register_size, buf);

        match &self.schema {
            Some(schema) => {
                push_bool(true, buf);
                schema.encode_wire(buf);
            }
            None => push_bool(false, buf),
        }

        push_len(self.debug_handles.len(), buf);
        for handle in &self.debug_handles {
            push_i64(*handle, buf);
        }

        match self.class_index {
            Some(index) => {
                push_bool(true, buf);
                push_u32(index, buf);
            }
            None => push_bool(false, buf),
        }
    }
}

/// Serialized call schema: fixed argument and return lists.
#[derive(Debug, Clone, Default)]
pub struct SchemaRecord {
    pub arguments: Vec<ArgRecord>,
    pub returns: Vec<ArgRecord>,
}

impl WireEncodable for SchemaRecord {
    fn encode_wire(&self, buf: &mut DynBuf) {
        for list in [&self.arguments, &self.returns] {
            push_len(list.len(), buf);
            for arg in list {
                arg.encode_wire(buf);
            }
        }
    }
}

/// One argument or return slot of a [`SchemaRecord`].
#[derive(Debug, Clone)]
pub struct ArgRecord {
    pub name: String,
    pub annotation: String,
    /// Value-table index of the default value ([`crate::NONE_INDEX`] when
    /// the slot has no default).
    pub default_index: u32,
}

impl WireEncodable for ArgRecord {
    fn encode_wire(&self, buf: &mut DynBuf) {
        push_str(&self.name, buf);
        push_str(&self.annotation, buf);
        push_u32(self.default_index, buf);
    }
}

/// Serialized tensor metadata. Storage bytes live in the storage segment,
/// referenced by slot.
#[derive(Debug, Clone)]
pub struct TensorRecord {
    pub storage_index: u32,
    pub scalar_type: ScalarType,
    /// Offset into the storage, in elements.
    pub storage_offset: i64,
    pub sizes: Vec<i32>,
    pub strides: Vec<i32>,
    pub requires_grad: bool,
    pub quant: Option<Box<QuantRecord>>,
}

impl WireEncodable for TensorRecord {
    fn encode_wire(&self, buf: &mut DynBuf) {
        push_u32(self.storage_index, buf);
        buf.push(self.scalar_type as u8);
        push_i64(self.storage_offset, buf);
        push_i32_vec(&self.sizes, buf);
        push_i32_vec(&self.strides, buf);
        push_bool(self.requires_grad, buf);
        match &self.quant {
            Some(quant) => {
                push_bool(true, buf);
                quant.encode_wire(buf);
            }
            None => push_bool(false, buf),
        }
    }
}

/// Quantization side-record of a quantized tensor.
///
/// The per-tensor-affine scheme populates `scale`/`zero_point` and leaves
/// the sub-tensor slots empty; per-channel schemes populate the nested
/// tensor records plus `axis` and leave the scalars zeroed.
#[derive(Debug, Clone)]
pub struct QuantRecord {
    pub scheme: u8,
    pub scale: f64,
    pub zero_point: i32,
    pub scales: Option<Box<TensorRecord>>,
    pub zero_points: Option<Box<TensorRecord>>,
    pub axis: i32,
}

impl WireEncodable for QuantRecord {
    fn encode_wire(&self, buf: &mut DynBuf) {
        buf.push(self.scheme);
        push_f64(self.scale, buf);
        push_i32(self.zero_point, buf);
        for sub in [&self.scales, &self.zero_points] {
            match sub {
                Some(tensor) => {
                    push_bool(true, buf);
                    tensor.encode_wire(buf);
                }
                None => push_bool(false, buf),
            }
        }
        push_i32(self.axis, buf);
    }
}

/// Storage strategy of a serialized class, telling the loader how to
/// rebuild instances without running arbitrary code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIs)]
#[repr(u8)]
pub enum ObjectTypeKind {
    /// Rebuilt by calling the class's free `__setstate__` restorer.
    ClassWithSetstate = 0,
    /// Externally-implemented capability class; the loader already knows how
    /// to construct it and its layout is not introspected.
    CustomClass = 1,
    /// Plain field container, rebuilt by direct slot assignment.
    ClassWithFields = 2,
}

/// Entry of the object-type table.
#[derive(Debug, Clone)]
pub struct ObjectTypeRecord {
    pub qualified_name: String,
    pub kind: ObjectTypeKind,
    /// Attribute names in declaration order; populated for
    /// [`ObjectTypeKind::ClassWithFields`] only. Attribute types are
    /// recovered structurally by the loader from the owning values.
    pub attribute_names: Vec<String>,
}

impl WireEncodable for ObjectTypeRecord {
    fn encode_wire(&self, buf: &mut DynBuf) {
        push_str(&self.qualified_name, buf);
        buf.push(self.kind as u8);
        push_len(self.attribute_names.len(), buf);
        for name in &self.attribute_names {
            push_str(name, buf);
        }
    }
}

/// Serialized object instance. Exactly one representation per record, never
/// a mix: the variant is decided by the class's storage strategy.
#[derive(Debug, Clone, EnumIs)]
pub enum ObjectRecord {
    /// State extracted through the get/set-state pair. `setstate_index` is
    /// the value-table index of the restorer function, or
    /// [`crate::SETSTATE_NOT_FOUND`] when it was not part of the serialized
    /// function set.
    WithState {
        type_index: u32,
        state_index: u32,
        setstate_index: u32,
    },
    /// Per-attribute value indices, in the class's declaration order.
    WithFields { type_index: u32, attributes: Vec<u32> },
}

impl ObjectRecord {
    pub fn type_index(&self) -> u32 {
        match self {
            ObjectRecord::WithState { type_index, .. }
            | ObjectRecord::WithFields { type_index, .. } => *type_index,
        }
    }

    fn referenced_indices(&self) -> Vec<u32> {
        match self {
            ObjectRecord::WithState { state_index, .. } => vec![*state_index],
            ObjectRecord::WithFields { attributes, .. } => attributes.clone(),
        }
    }
}

impl WireEncodable for ObjectRecord {
    fn encode_wire(&self, buf: &mut DynBuf) {
        match self {
            ObjectRecord::WithState {
                type_index,
                state_index,
                setstate_index,
            } => {
                buf.push(0);
                push_u32(*type_index, buf);
                push_u32(*state_index, buf);
                push_u32(*setstate_index, buf);
            }
            ObjectRecord::WithFields {
                type_index,
                attributes,
            } => {
                buf.push(1);
                push_u32(*type_index, buf);
                push_index_vec(attributes, buf);
            }
        }
    }
}

/// The finalized module container. Immutable once assembled; `to_bytes` may
/// be called any number of times and always yields the same buffer.
#[derive(Debug)]
pub struct ModuleContainer {
    /// Bytecode version of the serialized module.
    pub bytecode_version: u32,
    /// Arbitrary named side payloads, passed through verbatim.
    pub extra_files: Vec<(String, Vec<u8>)>,
    /// Value-table indices of the exported methods, in export order.
    pub methods: Vec<u32>,
    /// Value-table index of the module's root state object.
    pub state_index: u32,
    /// The full value table. Index 0 is always the none sentinel.
    pub values: Vec<ValueRecord>,
    /// Number of storage slots referenced by tensor records. May exceed
    /// `storages.len()` when storage embedding was disabled.
    pub storage_count: u32,
    /// Raw storage blocks, slot order. Empty when the caller supplies
    /// storage externally.
    pub storages: Vec<Vec<u8>>,
    /// The object-type table.
    pub object_types: Vec<ObjectTypeRecord>,
    /// Companion source-text payloads, passed through verbatim.
    pub source_files: Vec<(String, Vec<u8>)>,
    /// Value-table indices of companion source constants.
    pub source_constants: Vec<u32>,
}

impl ModuleContainer {
    /// Flatten the container into its final byte layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = DynBuf::new();
        buf.extend_from_slice(&CONTAINER_MAGIC);
        push_u32(CONTAINER_VERSION, &mut buf);
        push_u32(self.bytecode_version, &mut buf);

        push_file_map(&self.extra_files, &mut buf);
        push_index_vec(&self.methods, &mut buf);
        push_u32(self.state_index, &mut buf);

        push_len(self.values.len(), &mut buf);
        for value in &self.values {
            value.encode_wire(&mut buf);
        }

        push_u32(self.storage_count, &mut buf);
        push_len(self.storages.len(), &mut buf);
        for storage in &self.storages {
            push_bytes(storage, &mut buf);
        }

        push_len(self.object_types.len(), &mut buf);
        for object_type in &self.object_types {
            object_type.encode_wire(&mut buf);
        }

        push_file_map(&self.source_files, &mut buf);
        push_index_vec(&self.source_constants, &mut buf);

        buf.to_vec()
    }
}

fn push_file_map(files: &[(String, Vec<u8>)], buf: &mut DynBuf) {
    push_len(files.len(), buf);
    for (name, payload) in files {
        push_str(name, buf);
        push_bytes(payload, buf);
    }
}
