//! Backend abstraction: foreign memory, name resolution and the dual property model

pub mod dispatch;
pub mod snapshot;
pub mod target;
pub mod traits;

#[cfg(all(feature = "process", any(target_os = "windows", target_os = "linux")))]
pub mod process;

pub use dispatch::{child_properties, property_at};
pub use snapshot::SnapshotMemory;
pub use target::Target;
pub use traits::*;

#[cfg(all(feature = "process", any(target_os = "windows", target_os = "linux")))]
pub use process::ProcessMemory;
