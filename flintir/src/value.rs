//! Tagged runtime values.
//!
//! [`Value`] is the closed sum type every serialized slot starts from. Each
//! variant carries its kind-specific payload; aggregates hold their elements
//! behind `Rc` so shared substructure in the input graph stays shared (the
//! serializer relies on content equality, not pointer identity, for
//! deduplication of hashable values).
use std::rc::Rc;

use strum::{EnumDiscriminants, EnumIs, EnumTryAs};

use crate::{class::Object, function::Function, tensor::Tensor};

/// A runtime value with an explicit kind discriminant.
///
/// The variant set is deliberately closed: the serializer matches on it
/// exhaustively, so adding or removing a supported kind is a compile-time
/// checked change.
#[derive(Debug, Clone, EnumDiscriminants, EnumIs, EnumTryAs)]
#[strum_discriminants(derive(EnumIs, Hash))]
#[strum_discriminants(name(ValueKind))]
pub enum Value {
    None,
    Int(i64),
    Bool(bool),
    Double(f64),
    ComplexDouble { re: f64, im: f64 },
    String(Rc<str>),
    Tensor(Tensor),
    Tuple(Rc<Vec<Value>>),
    List(Rc<List>),
    Dict(Rc<Dict>),
    Object(Rc<Object>),
    Device(Device),
    Enum(Rc<EnumValue>),
    Function(Rc<Function>),
}

impl Value {
    /// Kind discriminant of this value.
    pub fn kind(&self) -> ValueKind {
        self.into()
    }

    /// Content key used for deduplication, or [`None`] when the value is not
    /// internable.
    ///
    /// A value is internable when it has a well-defined content hash and
    /// equality: primitives, strings, devices, and tuples whose elements are
    /// all internable themselves. Aggregates with interior mutability
    /// (lists, dicts), tensors, objects, enums and functions are not
    /// internable; each occurrence of such a value is serialized afresh, a
    /// correctness-preserving fallback rather than an error.
    pub fn dedup_key(&self) -> Option<DedupKey> {
        match self {
            Value::Int(v) => Some(DedupKey::Int(*v)),
            Value::Bool(v) => Some(DedupKey::Bool(*v)),
            // Doubles and complex doubles key on their bit pattern so that
            // NaN payloads and signed zeros stay distinct.
            Value::Double(v) => Some(DedupKey::Double(v.to_bits())),
            Value::ComplexDouble { re, im } => {
                Some(DedupKey::ComplexDouble(re.to_bits(), im.to_bits()))
            }
            Value::String(s) => Some(DedupKey::String(Rc::clone(s))),
            Value::Device(d) => Some(DedupKey::Device(*d)),
            Value::Tuple(elements) => elements
                .iter()
                .map(Value::dedup_key)
                .collect::<Option<Vec<_>>>()
                .map(DedupKey::Tuple),
            _ => None,
        }
    }
}

/// Content-hashable identity of an internable [`Value`].
///
/// This is the key space of the serializer's by-content memoization table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Int(i64),
    Bool(bool),
    Double(u64),
    ComplexDouble(u64, u64),
    String(Rc<str>),
    Device(Device),
    Tuple(Vec<DedupKey>),
}

/// A homogeneous list with a declared element annotation.
///
/// `elem_annotation` is the canonical printed form of the element type
/// (e.g. `"int"`, `"Tensor"`); the full list annotation is derived from it.
#[derive(Debug, Clone)]
pub struct List {
    pub elem_annotation: String,
    pub elements: Vec<Value>,
}

impl List {
    /// Canonical annotation of the list type itself.
    pub fn annotation(&self) -> String {
        format!("List[{}]", self.elem_annotation)
    }
}

/// An ordered dictionary. Entries keep insertion order, which is also the
/// order they are serialized in.
#[derive(Debug, Clone)]
pub struct Dict {
    pub key_annotation: String,
    pub value_annotation: String,
    pub entries: Vec<(Value, Value)>,
}

impl Dict {
    /// Canonical annotation of the dict type itself.
    pub fn annotation(&self) -> String {
        format!("Dict[{}, {}]", self.key_annotation, self.value_annotation)
    }
}

/// An enum literal: the qualified name of the enum type plus its underlying
/// value (an int or string in practice, but any value is representable).
#[derive(Debug, Clone)]
pub struct EnumValue {
    pub type_name: String,
    pub value: Value,
}

/// A compute device a storage buffer can live on.
///
/// `Host` is the only device addressable by the serialized buffer; tensors
/// on an accelerator are copied to host memory at serialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIs)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Device {
    Host,
    Accelerator(u8),
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Device::Host => write!(f, "host"),
            Device::Accelerator(idx) => write!(f, "accel:{}", idx),
        }
    }
}
