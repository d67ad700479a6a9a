//! Core traits for backend abstraction
//!
//! `MemoryReader` and `NameResolver` are the external collaborators the reader
//! depends on. `Property` is the single capability surface over both property
//! metadata generations; `UPropertyHandle` and `FPropertyHandle` are its only
//! implementations.

use std::fmt;

use crate::common::{PropertyFlags, PropertyKind};
use crate::constants::SIZE_OF_PTR;
use crate::names::NameHandle;
use crate::objects::{EnumHandle, StructHandle};
use crate::offsets::{PropertyModel, PropertyOffsets};
use crate::type_info::{BoolInfo, TypeInfo};

use super::Target;

/// Error type for foreign memory access
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    /// Address inside the null page
    #[error("Null address 0x{0:X}")]
    Null(usize),

    /// The memory primitive could not read the range
    #[error("Memory read failed at 0x{address:X} (size: {size}): {reason}")]
    Failed {
        address: usize,
        size: usize,
        reason: String,
    },

    /// `base + offset` does not fit in an address
    #[error("Address overflow: 0x{base:X} + 0x{offset:X}")]
    Overflow { base: usize, offset: usize },

    /// The name resolver does not know this name
    #[error("Unresolved name at 0x{address:X} (index: {index})")]
    UnresolvedName { address: usize, index: u32 },
}

/// Read-only access to the target's memory
pub trait MemoryReader: Send + Sync {
    /// Fill `buf` with the bytes at `address`
    fn read_into(&self, address: usize, buf: &mut [u8]) -> Result<(), ReadError>;

    /// Read `size` bytes at `address`
    fn read_bytes(&self, address: usize, size: usize) -> Result<Vec<u8>, ReadError> {
        let mut buf = vec![0u8; size];
        self.read_into(address, &mut buf)?;
        Ok(buf)
    }
}

/// Resolves an engine name to (text, disambiguation number)
pub trait NameResolver: Send + Sync {
    fn resolve(&self, memory: &dyn MemoryReader, name: NameHandle) -> Result<(String, i32), ReadError>;
}

pub type BoxedProperty<'a> = Box<dyn Property<'a> + 'a>;

/// Capability surface shared by UProperty objects and FProperty fields.
///
/// Payload accessors are only meaningful for the kind reported by `type_info()`;
/// for other kinds they read whatever happens to be stored there.
pub trait Property<'a>: fmt::Debug {
    /// Address of the property in the target
    fn address(&self) -> usize;

    fn target(&self) -> Target<'a>;

    /// Metadata generation of this handle (and of every sub-property it yields)
    fn model(&self) -> PropertyModel;

    /// Base property layout of this model
    fn layout(&self) -> &'a PropertyOffsets;

    fn name(&self) -> String;

    /// Runtime class name (UProperty) or field-class name (FField)
    fn class_name(&self) -> String;

    /// Next property in the owning struct's list
    fn next(&self) -> Option<BoxedProperty<'a>>;

    /// Wrap a payload pointer with this handle's backend
    fn sub_property(&self, address: usize) -> Option<BoxedProperty<'a>>;

    /// Kind and rendered type; both backends delegate to `type_info::classify`
    fn type_info(&self) -> TypeInfo;

    fn kind(&self) -> PropertyKind {
        PropertyKind::from_class_name(&self.class_name())
    }

    fn array_dim(&self) -> i32 {
        self.target().read_at(self.address(), self.layout().array_dim)
    }

    fn element_size(&self) -> i32 {
        self.target().read_at(self.address(), self.layout().element_size)
    }

    fn offset(&self) -> i32 {
        self.target().read_at(self.address(), self.layout().offset)
    }

    fn property_flags(&self) -> PropertyFlags {
        PropertyFlags::from_bits_retain(self.target().read_at(self.address(), self.layout().property_flags))
    }

    /// Pointer stored in the `slot`-th payload word after the base property
    fn payload(&self, slot: usize) -> usize {
        self.target()
            .read_ptr_at(self.address(), self.layout().size + slot * SIZE_OF_PTR)
    }

    /// Struct
    fn property_struct(&self) -> Option<StructHandle<'a>> {
        StructHandle::from_address(self.target(), self.payload(0))
    }

    /// Object family and Interface
    fn property_class(&self) -> Option<StructHandle<'a>> {
        StructHandle::from_address(self.target(), self.payload(0))
    }

    /// Class and SoftClass
    fn meta_class(&self) -> Option<StructHandle<'a>> {
        StructHandle::from_address(self.target(), self.payload(1))
    }

    /// Array inner / Set element
    fn inner(&self) -> Option<BoxedProperty<'a>> {
        self.sub_property(self.payload(0))
    }

    fn key_property(&self) -> Option<BoxedProperty<'a>> {
        self.sub_property(self.payload(0))
    }

    fn value_property(&self) -> Option<BoxedProperty<'a>> {
        self.sub_property(self.payload(1))
    }

    /// Enum's numeric storage property
    fn underlying(&self) -> Option<BoxedProperty<'a>> {
        self.sub_property(self.payload(0))
    }

    /// Enum (second payload word) or Byte (first word, legacy enum-as-byte)
    fn enum_ref(&self) -> Option<EnumHandle<'a>> {
        let slot = match self.kind() {
            PropertyKind::Enum => 1,
            _ => 0,
        };
        EnumHandle::from_address(self.target(), self.payload(slot))
    }

    /// Bool bitfield description
    fn bool_info(&self) -> BoolInfo {
        let bytes: [u8; 4] = self.target().read_at(self.address(), self.layout().size);
        BoolInfo {
            field_size: bytes[0],
            byte_offset: bytes[1],
            byte_mask: bytes[2],
            field_mask: bytes[3],
        }
    }

    /// Bit-test mask for packed bools; 0 for native bools and every other kind
    fn field_mask(&self) -> u8 {
        match self.kind() {
            PropertyKind::Bool => {
                let info = self.bool_info();
                if info.is_bitfield() {
                    info.field_mask
                } else {
                    0
                }
            }
            _ => 0,
        }
    }

    /// Field class named by a FieldPath property
    fn field_path_class(&self) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_display() {
        let err = ReadError::Failed {
            address: 0x1000,
            size: 8,
            reason: "unmapped".into(),
        };
        assert_eq!(err.to_string(), "Memory read failed at 0x1000 (size: 8): unmapped");
        assert_eq!(ReadError::Null(0x18).to_string(), "Null address 0x18");
    }
}
