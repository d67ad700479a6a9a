//! ue-reader: runtime reflection reader for Unreal Engine targets
//!
//! Reconstructs the reflection graph (classes, structs, enums, functions,
//! properties) of a running engine by interpreting its memory through a
//! build-specific offset profile.
//!
//! # Architecture
//!
//! - **Offsets**: the build profile, loaded once and threaded through [`Target`]
//! - **Backend**: memory/name collaborators and the dual property capability trait
//! - **Objects**: transient handles over foreign addresses
//! - **UProperty / FField**: the two property metadata generations
//! - **Object array**: enumeration of the global object registry
//! - **Type info / struct walker**: classification and per-type field lists

#![warn(clippy::all)]

pub mod backend;
pub mod common;
pub mod constants;
pub mod containers;
pub mod ffield;
pub mod names;
pub mod object_array;
pub mod objects;
pub mod offsets;
pub mod struct_walker;
pub mod synthetic;
pub mod type_info;
pub mod uproperty;

pub use backend::{BoxedProperty, MemoryReader, NameResolver, Property, ReadError, Target};
pub use common::PropertyKind;
pub use object_array::ObjectTable;
pub use objects::{EnumHandle, FunctionHandle, ObjectHandle, StructHandle};
pub use offsets::{PropertyModel, UeOffsets};
pub use struct_walker::{StructWalker, WalkMode};
pub use type_info::TypeInfo;

/// Result type used throughout the library
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type
///
/// Only `NotInitialized` and `MemoryUnavailable` abort a whole operation.
/// Everything else is reported per item and the enclosing scan carries on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Foreign memory read error
    #[error(transparent)]
    Read(#[from] ReadError),

    /// Null address where a non-null handle was required
    #[error("Invalid handle: null address")]
    InvalidHandle,

    /// Index outside a foreign array view
    #[error("Index {index} out of range (num: {len})")]
    OutOfRange {
        /// Requested index
        index: i64,
        /// Element count of the view
        len: i64,
    },

    /// A linked chain in foreign memory exceeded its step bound
    #[error("{chain} chain exceeded {limit} steps")]
    ChainOverrun {
        /// Which chain was being followed
        chain: &'static str,
        /// The bound that was hit
        limit: usize,
    },

    /// Build profile is incomplete or inconsistent
    #[error("Invalid build profile: {0}")]
    Profile(String),

    /// Configuration used before `offsets::initialize`
    #[error("Offsets used before initialization")]
    NotInitialized,

    /// `offsets::initialize` called twice
    #[error("Offsets already initialized")]
    AlreadyInitialized,

    /// The object registry header cannot be read; the target is gone
    #[error("Target memory unavailable at 0x{address:X}: {source}")]
    MemoryUnavailable {
        /// Address of the registry field that failed
        address: usize,
        /// Underlying read failure
        #[source]
        source: ReadError,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Profile (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging for the library
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ue_reader=info")),
        )
        .with_target(false)
        .init();
}
