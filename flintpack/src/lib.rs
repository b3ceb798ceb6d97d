//! Flat, relocatable serialization of Flint modules for the on-device
//! interpreter.
//!
//! The serializer walks a [`flintir::module::Module`] graph in strict
//! post-order (children before parents), deduplicates repeated entities
//! through three memoization tables (qualified name, content key, storage
//! identity), and assembles a single immutable [`records::ModuleContainer`]
//! whose [`records::ModuleContainer::to_bytes`] layout is byte-for-byte
//! deterministic. A session is single use: one serialized module per
//! [`session::serialize_module`] call, no cross-session caching.
//!
//! Entry points: [`session::serialize_module`] for the structured container,
//! [`session::save_module_to_bytes`] / [`session::save_module`] for the
//! finished buffer.

pub mod builder;
pub mod class;
pub mod dedup;
pub mod error;
pub mod function;
pub mod records;
pub mod session;
pub mod tensor;
pub mod value;
pub mod wire;

pub use error::{PackError, PackResult};
pub use records::ModuleContainer;
pub use session::{SerializeOptions, save_module, save_module_to_bytes, serialize_module};

/// First bytes of every finalized container.
pub const CONTAINER_MAGIC: [u8; 4] = *b"FLNT";

/// Version of the container layout itself (the module's own bytecode
/// version is stored separately inside the container).
pub const CONTAINER_VERSION: u32 = 1;

/// Reserved value index of the `none` sentinel. Written first in every
/// session and never reused for another kind.
pub const NONE_INDEX: u32 = 0;

/// Sentinel stored in an object record when its class has a get/set-state
/// pair but the matching restorer function was not part of the serialized
/// function set. Distinct from [`NONE_INDEX`] so a loader can tell
/// "restorer absent" apart from a reference to the none value.
pub const SETSTATE_NOT_FOUND: u32 = u32::MAX;

/// Namespace prefix of compiler-internal types. Referencing such a type
/// from bytecode is a compatibility error unless it falls under
/// [`CAPABILITY_CLASS_PREFIX`].
pub const INTERNAL_TYPE_PREFIX: &str = "__flint__";

/// Recognized allowlist of externally-implemented capability classes inside
/// the internal namespace.
pub const CAPABILITY_CLASS_PREFIX: &str = "__flint__.ext.classes";
