//! Transient handles over engine objects
//!
//! A handle is an address plus the [`Target`](crate::Target) it lives in.
//! Handles own nothing and cache nothing: every accessor reads the target
//! again. Handles derived from engine pointers (class, outer, super) are
//! trusted; arbitrary addresses go through `ObjectTable::to_object` first.

mod chain;
mod enums;
mod object;
mod structs;

pub use chain::LinkedChain;
pub use enums::EnumHandle;
pub use object::ObjectHandle;
pub use structs::{FunctionHandle, StructHandle};
