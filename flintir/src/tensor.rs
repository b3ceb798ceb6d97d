//! Tensors, backing storage and quantization metadata.
use std::rc::Rc;

use strum::{EnumIs, FromRepr};

use crate::value::Device;

/// Element type of a tensor. The numeric representation is part of the
/// on-device contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ScalarType {
    U8 = 0,
    I8 = 1,
    I16 = 2,
    I32 = 3,
    I64 = 4,
    F16 = 5,
    F32 = 6,
    F64 = 7,
    Bool = 8,
    QI8 = 9,
    QU8 = 10,
    QI32 = 11,
}

/// A raw contiguous byte buffer backing one or more tensor views.
///
/// Storage identity is the `Rc` allocation itself: two tensors alias when
/// they hold clones of the same `Rc<Storage>`. The serializer keys its
/// storage memoization table on that pointer.
#[derive(Debug, Clone)]
pub struct Storage {
    pub device: Device,
    pub bytes: Vec<u8>,
}

impl Storage {
    pub fn on_host(bytes: Vec<u8>) -> Rc<Self> {
        Rc::new(Self {
            device: Device::Host,
            bytes,
        })
    }

    /// A host-resident copy of this storage. The original is never mutated.
    pub fn to_host(&self) -> Rc<Self> {
        Rc::new(Self {
            device: Device::Host,
            bytes: self.bytes.clone(),
        })
    }
}

/// Quantization side-information of a quantized tensor.
///
/// The per-channel schemes carry their scales and zero points as ordinary
/// tensors (float and int respectively), encoded recursively.
#[derive(Debug, Clone, EnumIs)]
pub enum Quantization {
    PerTensorAffine {
        scale: f64,
        zero_point: i32,
    },
    PerChannelAffine {
        scales: Tensor,
        zero_points: Tensor,
        axis: i32,
    },
    PerChannelAffineFloat {
        scales: Tensor,
        zero_points: Tensor,
        axis: i32,
    },
}

impl Quantization {
    /// Scheme tag carried on the wire.
    pub fn scheme_tag(&self) -> u8 {
        match self {
            Quantization::PerTensorAffine { .. } => 0,
            Quantization::PerChannelAffine { .. } => 1,
            Quantization::PerChannelAffineFloat { .. } => 2,
        }
    }
}

/// A tensor view over a [`Storage`].
#[derive(Debug, Clone)]
pub struct Tensor {
    pub storage: Rc<Storage>,
    pub scalar_type: ScalarType,
    /// Offset into the storage, in elements.
    pub storage_offset: i64,
    pub sizes: Vec<i32>,
    pub strides: Vec<i32>,
    pub requires_grad: bool,
    pub quant: Option<Box<Quantization>>,
}

impl Tensor {
    /// A dense, contiguous host tensor over fresh storage.
    pub fn dense(scalar_type: ScalarType, sizes: Vec<i32>, data: Vec<u8>) -> Self {
        let strides = contiguous_strides(&sizes);
        Self {
            storage: Storage::on_host(data),
            scalar_type,
            storage_offset: 0,
            sizes,
            strides,
            requires_grad: false,
            quant: None,
        }
    }

    /// A view over an existing storage buffer.
    pub fn view(
        storage: Rc<Storage>,
        scalar_type: ScalarType,
        storage_offset: i64,
        sizes: Vec<i32>,
        strides: Vec<i32>,
    ) -> Self {
        Self {
            storage,
            scalar_type,
            storage_offset,
            sizes,
            strides,
            requires_grad: false,
            quant: None,
        }
    }

    pub fn is_quantized(&self) -> bool {
        self.quant.is_some()
    }
}

/// Row-major strides for the given sizes.
pub fn contiguous_strides(sizes: &[i32]) -> Vec<i32> {
    let mut strides = vec![1; sizes.len()];
    for i in (0..sizes.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * sizes[i + 1];
    }
    strides
}
