//! FField model: properties are lightweight fields with their own class identity

mod field;

pub use field::{FFieldClassHandle, FFieldHandle, FPropertyHandle};
