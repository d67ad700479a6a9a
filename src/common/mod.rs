//! Types shared between the UProperty and FField backends

pub mod flags;
pub mod property_kind;

pub use flags::{FunctionFlags, InternalObjectFlags, ObjectFlags, PropertyFlags};
pub use property_kind::PropertyKind;
