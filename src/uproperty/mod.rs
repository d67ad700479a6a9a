//! UProperty model: properties are engine objects chained through `UField::Next`

mod property;

pub use property::UPropertyHandle;
