//! Memoization tables guaranteeing at-most-one serialized copy per logical
//! entity.
//!
//! Three independent key spaces, each living for exactly one serialization
//! session:
//!
//! - qualified name → index, shared by functions (value-table indices) and
//!   classes (object-type-table indices). A class and a function may not
//!   share a qualified name, so the two kinds never collide.
//! - content key → value-table index, collapsing equal hashable values
//!   encountered at different graph positions.
//! - storage identity (the `Rc<Storage>` allocation address) → storage
//!   slot, so aliasing tensor views share one serialized buffer.
use std::{collections::HashMap, rc::Rc};

use flintir::{tensor::Storage, value::DedupKey};
use log::debug;

#[derive(Debug, Default)]
pub struct DedupIndex {
    names: HashMap<String, u32>,
    values: HashMap<DedupKey, u32>,
    storages: HashMap<usize, u32>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value-table index of an already-serialized function.
    pub fn function_index(&self, qualified_name: &str) -> Option<u32> {
        self.names.get(qualified_name).copied()
    }

    pub fn record_function(&mut self, qualified_name: String, index: u32) {
        debug!("interned function `{qualified_name}` at value index {index}");
        let previous = self.names.insert(qualified_name, index);
        debug_assert!(previous.is_none(), "qualified name interned twice");
    }

    /// Object-type-table index of an already-serialized class.
    pub fn class_index(&self, qualified_name: &str) -> Option<u32> {
        self.names.get(qualified_name).copied()
    }

    pub fn record_class(&mut self, qualified_name: String, index: u32) {
        debug!("interned class `{qualified_name}` at type index {index}");
        let previous = self.names.insert(qualified_name, index);
        debug_assert!(previous.is_none(), "qualified name interned twice");
    }

    /// Value-table index of an already-serialized internable value.
    pub fn value_index(&self, key: &DedupKey) -> Option<u32> {
        self.values.get(key).copied()
    }

    pub fn record_value(&mut self, key: DedupKey, index: u32) {
        self.values.insert(key, index);
    }

    /// Storage slot of an already-serialized backing buffer.
    pub fn storage_slot(&self, storage: &Rc<Storage>) -> Option<u32> {
        self.storages.get(&storage_identity(storage)).copied()
    }

    pub fn record_storage(&mut self, storage: &Rc<Storage>, slot: u32) {
        debug!(
            "interned storage {:p} ({} bytes) at slot {slot}",
            Rc::as_ptr(storage),
            storage.bytes.len()
        );
        self.storages.insert(storage_identity(storage), slot);
    }
}

/// Identity key of a storage buffer: the address of its shared allocation.
/// Stable for the session because the session holds an `Rc` to every
/// storage it has interned (via the builder's slot list).
fn storage_identity(storage: &Rc<Storage>) -> usize {
    Rc::as_ptr(storage) as usize
}
