//! Serialization error taxonomy.
//!
//! Every fatal condition unwinds immediately out of the encoding call that
//! detected it; no partial buffer is usable afterwards. Non-fatal
//! conditions (a value that cannot be content-keyed) are handled locally by
//! the value encoder and never surface here.
use strum::EnumIs;
use thiserror::Error;

#[derive(Debug, EnumIs, Error)]
pub enum PackError {
    /// A call schema declares a named overload.
    #[error(
        "Function `{function}` declares overload `{overload}`. Overloads are not supported by the on-device interpreter; every serialized function must be the sole definition of its name."
    )]
    OverloadedSchema { function: String, overload: String },

    /// A call schema accepts a variable number of positional arguments.
    #[error(
        "Function `{function}` accepts variadic positional arguments. The on-device interpreter requires a fixed arity; declare every argument explicitly."
    )]
    VariadicArguments { function: String },

    /// A call schema returns a variable number of values.
    #[error(
        "Function `{function}` returns a variable number of values. The on-device interpreter requires a fixed return shape; declare every return explicitly."
    )]
    VariadicReturns { function: String },

    /// A referenced type lives in the internal namespace without being a
    /// recognized capability class.
    #[error(
        "Function `{function}` references internal type `{annotation}`, which is not supported by the on-device interpreter. Only capability classes under `{allowlist}` may be referenced; wrap the value in such a class instead of using the raw internal type."
    )]
    DisallowedTypeReference {
        function: String,
        annotation: String,
        allowlist: &'static str,
    },

    /// Writing the finished buffer out failed.
    #[error("I/O error while writing serialized module: {0}")]
    Io(#[from] std::io::Error),
}

pub type PackResult<T> = Result<T, PackError>;
