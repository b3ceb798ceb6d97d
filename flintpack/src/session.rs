//! Serialization session and module assembler.
//!
//! A [`Session`] owns all mutable state of one serialization: the container
//! builder and the dedup index. Sessions are single-threaded and single
//! use; a fresh one is created per serialized module and consumed by the
//! assembly pass. Encoding itself never performs I/O; only
//! [`save_module`] touches the filesystem, after the buffer is finished.
use std::{collections::BTreeMap, path::Path};

use flintir::{
    module::{CompilationUnit, Module},
    value::Value,
};
use log::debug;

use crate::{
    builder::ContainerBuilder,
    dedup::DedupIndex,
    error::PackResult,
    records::ModuleContainer,
};

/// Caller-facing knobs of one serialization.
#[derive(Default)]
pub struct SerializeOptions {
    /// Embed tensor storage bytes in the container. When false the storage
    /// segment is left empty (storage is supplied externally) but slot
    /// indices are still assigned.
    pub include_storage: bool,
    /// Arbitrary named side payloads, placed in the container verbatim.
    pub extra_files: BTreeMap<String, Vec<u8>>,
    /// Companion source-text payloads, placed in the container verbatim.
    pub source_files: BTreeMap<String, Vec<u8>>,
    /// Companion source constants, serialized through the value encoder.
    pub source_constants: Vec<Value>,
}

impl SerializeOptions {
    /// Options embedding tensor storage, the common case.
    pub fn with_storage() -> Self {
        Self {
            include_storage: true,
            ..Self::default()
        }
    }
}

pub(crate) struct Session<'m> {
    pub(crate) builder: ContainerBuilder,
    pub(crate) dedup: DedupIndex,
    pub(crate) unit: &'m CompilationUnit,
}

impl<'m> Session<'m> {
    fn new(unit: &'m CompilationUnit) -> Self {
        Self {
            builder: ContainerBuilder::new(),
            dedup: DedupIndex::new(),
            unit,
        }
    }

    /// Assemble the full container, in fixed order: exported methods, the
    /// root state object, companion source constants, then the storage
    /// segment flush. The builder is consumed; the session cannot be
    /// reused.
    fn serialize(
        mut self,
        module: &Module,
        options: &SerializeOptions,
    ) -> PackResult<ModuleContainer> {
        let mut methods = Vec::with_capacity(module.methods.len());
        for method in &module.methods {
            methods.push(self.store_function(&method.qualified_name, method)?);
        }

        let state_index = self.store_value(&module.state_value())?;

        // Source constants can reference tensors, so they must be encoded
        // before the storage segment is flushed or their storage slots
        // would miss the segment.
        let mut source_constants = Vec::with_capacity(options.source_constants.len());
        for constant in &options.source_constants {
            source_constants.push(self.store_value(constant)?);
        }

        let storage_count = self.builder.storage_count();
        let (values, object_types, storage_slots) = self.builder.finish();

        let storages = if options.include_storage {
            storage_slots
                .iter()
                .map(|storage| crate::tensor::collect_storage_bytes(storage))
                .collect()
        } else {
            debug!("storage embedding disabled, leaving {storage_count} slot(s) external");
            Vec::new()
        };

        Ok(ModuleContainer {
            bytecode_version: module.bytecode_version,
            extra_files: clone_file_map(&options.extra_files),
            methods,
            state_index,
            values,
            storage_count,
            storages,
            object_types,
            source_files: clone_file_map(&options.source_files),
            source_constants,
        })
    }
}

fn clone_file_map(files: &BTreeMap<String, Vec<u8>>) -> Vec<(String, Vec<u8>)> {
    files
        .iter()
        .map(|(name, payload)| (name.clone(), payload.clone()))
        .collect()
}

/// Serialize `module` into its structured container form.
pub fn serialize_module(
    module: &Module,
    options: &SerializeOptions,
) -> PackResult<ModuleContainer> {
    Session::new(&module.compilation_unit).serialize(module, options)
}

/// Serialize `module` straight to its finalized byte buffer.
pub fn save_module_to_bytes(module: &Module, options: &SerializeOptions) -> PackResult<Vec<u8>> {
    Ok(serialize_module(module, options)?.to_bytes())
}

/// Serialize `module` and write the buffer to `path`. The only I/O in the
/// crate.
pub fn save_module(
    module: &Module,
    path: impl AsRef<Path>,
    options: &SerializeOptions,
) -> PackResult<()> {
    let bytes = save_module_to_bytes(module, options)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
