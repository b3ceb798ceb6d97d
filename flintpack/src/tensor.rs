//! The tensor/storage encoder.
use flintir::tensor::{Quantization, Storage, Tensor};
use log::debug;

use crate::{
    error::PackResult,
    records::{QuantRecord, TensorRecord},
    session::Session,
};

impl Session<'_> {
    /// Lower one tensor to its metadata record, interning its backing
    /// storage. Aliasing views resolve to the same storage slot; the
    /// metadata itself always comes from the tensor's own view, never from
    /// a copied one.
    pub(crate) fn tensor_to_record(&mut self, tensor: &Tensor) -> PackResult<TensorRecord> {
        let quant = match tensor.quant.as_deref() {
            Some(quantization) => Some(Box::new(self.quant_to_record(quantization)?)),
            None => None,
        };

        let storage_index = match self.dedup.storage_slot(&tensor.storage) {
            Some(slot) => slot,
            None => {
                let slot = self.builder.push_storage(tensor.storage.clone());
                self.dedup.record_storage(&tensor.storage, slot);
                slot
            }
        };

        Ok(TensorRecord {
            storage_index,
            scalar_type: tensor.scalar_type,
            storage_offset: tensor.storage_offset,
            sizes: tensor.sizes.clone(),
            strides: tensor.strides.clone(),
            requires_grad: tensor.requires_grad,
            quant,
        })
    }

    /// Per-tensor-affine stores its two scalars directly; per-channel
    /// schemes recursively encode their scale and zero-point tensors
    /// (ordinary float/int tensors) plus the channel axis.
    fn quant_to_record(&mut self, quantization: &Quantization) -> PackResult<QuantRecord> {
        let scheme = quantization.scheme_tag();
        Ok(match quantization {
            Quantization::PerTensorAffine { scale, zero_point } => QuantRecord {
                scheme,
                scale: *scale,
                zero_point: *zero_point,
                scales: None,
                zero_points: None,
                axis: 0,
            },
            Quantization::PerChannelAffine {
                scales,
                zero_points,
                axis,
            }
            | Quantization::PerChannelAffineFloat {
                scales,
                zero_points,
                axis,
            } => QuantRecord {
                scheme,
                scale: 0.0,
                zero_point: 0,
                scales: Some(Box::new(self.tensor_to_record(scales)?)),
                zero_points: Some(Box::new(self.tensor_to_record(zero_points)?)),
                axis: *axis,
            },
        })
    }
}

/// Snapshot the raw bytes of one storage slot for the storage segment,
/// copying device-resident buffers to host memory first. The original
/// storage is never mutated.
pub(crate) fn collect_storage_bytes(storage: &Storage) -> Vec<u8> {
    if storage.device.is_host() {
        storage.bytes.clone()
    } else {
        debug!(
            "copying {} byte(s) from {} to host for the storage segment",
            storage.bytes.len(),
            storage.device
        );
        storage.to_host().bytes.clone()
    }
}
