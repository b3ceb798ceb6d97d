//! Append-only container builder.
//!
//! The builder owns the three growable tables of one serialization session
//! and hands back stable u32 indices. Both the value table and the
//! object-type table support splitting "reserve an index" from "populate
//! the record at that index", so a qualified-name entity can make its index
//! known before its body has been encoded and a cyclic reference resolves
//! to the reserved slot instead of recursing forever.
use std::rc::Rc;

use flintir::tensor::Storage;
use log::debug;

use crate::records::{ObjectTypeRecord, ValueRecord};

#[derive(Debug)]
pub struct ContainerBuilder {
    values: Vec<Option<ValueRecord>>,
    object_types: Vec<Option<ObjectTypeRecord>>,
    storages: Vec<Rc<Storage>>,
}

impl ContainerBuilder {
    /// A fresh builder with the none sentinel already written at index 0.
    pub fn new() -> Self {
        Self {
            values: vec![Some(ValueRecord::None)],
            object_types: Vec::new(),
            storages: Vec::new(),
        }
    }

    /// Append a fully-built value record and return its index.
    pub fn push_value(&mut self, record: ValueRecord) -> u32 {
        let index = self.values.len() as u32;
        self.values.push(Some(record));
        index
    }

    /// Reserve a value index whose record will be supplied later through
    /// [`Self::populate_value`].
    pub fn reserve_value(&mut self) -> u32 {
        let index = self.values.len() as u32;
        self.values.push(None);
        debug!("reserved value slot {index}");
        index
    }

    /// Populate a previously reserved value slot. The slot must be empty.
    pub fn populate_value(&mut self, index: u32, record: ValueRecord) {
        let slot = &mut self.values[index as usize];
        debug_assert!(slot.is_none(), "value slot {index} populated twice");
        *slot = Some(record);
    }

    /// Number of value slots handed out so far, reserved ones included.
    pub fn value_count(&self) -> u32 {
        self.values.len() as u32
    }

    /// Append a fully-built object-type record and return its table index.
    pub fn push_object_type(&mut self, record: ObjectTypeRecord) -> u32 {
        let index = self.object_types.len() as u32;
        self.object_types.push(Some(record));
        index
    }

    /// Reserve an object-type index whose record will be supplied later
    /// through [`Self::populate_object_type`].
    pub fn reserve_object_type(&mut self) -> u32 {
        let index = self.object_types.len() as u32;
        self.object_types.push(None);
        debug!("reserved object-type slot {index}");
        index
    }

    /// Populate a previously reserved object-type slot. The slot must be
    /// empty.
    pub fn populate_object_type(&mut self, index: u32, record: ObjectTypeRecord) {
        let slot = &mut self.object_types[index as usize];
        debug_assert!(slot.is_none(), "object-type slot {index} populated twice");
        *slot = Some(record);
    }

    /// Append a storage buffer and return its slot. Callers are expected to
    /// consult the storage-identity table first; the builder itself never
    /// deduplicates.
    pub fn push_storage(&mut self, storage: Rc<Storage>) -> u32 {
        let slot = self.storages.len() as u32;
        self.storages.push(storage);
        slot
    }

    pub fn storage_count(&self) -> u32 {
        self.storages.len() as u32
    }

    /// Consume the builder, yielding the completed tables.
    ///
    /// # Panics
    /// Panics if any reserved slot was never populated; that is a bug in
    /// the encoder driving the builder, not an input error.
    pub fn finish(self) -> (Vec<ValueRecord>, Vec<ObjectTypeRecord>, Vec<Rc<Storage>>) {
        let values = self
            .values
            .into_iter()
            .enumerate()
            .map(|(index, slot)| match slot {
                Some(record) => record,
                None => panic!("value slot {index} was reserved but never populated"),
            })
            .collect();
        let object_types = self
            .object_types
            .into_iter()
            .enumerate()
            .map(|(index, slot)| match slot {
                Some(record) => record,
                None => panic!("object-type slot {index} was reserved but never populated"),
            })
            .collect();
        (values, object_types, self.storages)
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
