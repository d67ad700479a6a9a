//! The (memory, offsets, names) triple every handle carries

use std::fmt;

use bytemuck::Pod;

use crate::constants::SIZE_OF_PTR;
use crate::names::{display_name, NameHandle};
use crate::offsets::UeOffsets;

use super::{MemoryReader, NameResolver, ReadError};

// Reads below this address are treated as null dereferences.
const NULL_PAGE: usize = 0x1000;

/// Borrowed view of one target: how to read it and how to interpret what is read.
///
/// Cheap to copy; handles embed it by value.
#[derive(Clone, Copy)]
pub struct Target<'a> {
    memory: &'a dyn MemoryReader,
    offsets: &'a UeOffsets,
    names: &'a dyn NameResolver,
}

impl<'a> Target<'a> {
    pub fn new(memory: &'a dyn MemoryReader, offsets: &'a UeOffsets, names: &'a dyn NameResolver) -> Self {
        Target { memory, offsets, names }
    }

    pub fn memory(&self) -> &'a dyn MemoryReader {
        self.memory
    }

    pub fn offsets(&self) -> &'a UeOffsets {
        self.offsets
    }

    pub fn names(&self) -> &'a dyn NameResolver {
        self.names
    }

    /// Read a POD value, reporting failures
    pub fn try_read<T: Pod>(&self, address: usize) -> Result<T, ReadError> {
        if address < NULL_PAGE {
            return Err(ReadError::Null(address));
        }
        let size = std::mem::size_of::<T>();
        let bytes = self.memory.read_bytes(address, size)?;
        if bytes.len() != size {
            return Err(ReadError::Failed {
                address,
                size,
                reason: format!("Expected {} bytes, got {}", size, bytes.len()),
            });
        }
        Ok(bytemuck::pod_read_unaligned(&bytes))
    }

    /// Read a POD value; unreadable memory yields `T::default()`
    pub fn read<T: Pod + Default>(&self, address: usize) -> T {
        match self.try_read(address) {
            Ok(value) => value,
            Err(err) => {
                tracing::trace!("{}", err);
                T::default()
            }
        }
    }

    /// Read a pointer; unreadable memory yields null
    pub fn read_ptr(&self, address: usize) -> usize {
        self.read::<u64>(address) as usize
    }

    /// `base + offset`, failing instead of wrapping for garbage bases
    pub fn field_address(base: usize, offset: usize) -> Result<usize, ReadError> {
        base.checked_add(offset).ok_or(ReadError::Overflow { base, offset })
    }

    /// Read the field at `offset` inside the structure at `base`
    pub fn try_read_at<T: Pod>(&self, base: usize, offset: usize) -> Result<T, ReadError> {
        self.try_read(Self::field_address(base, offset)?)
    }

    pub fn read_at<T: Pod + Default>(&self, base: usize, offset: usize) -> T {
        match self.try_read_at(base, offset) {
            Ok(value) => value,
            Err(err) => {
                tracing::trace!("{}", err);
                T::default()
            }
        }
    }

    pub fn read_ptr_at(&self, base: usize, offset: usize) -> usize {
        self.read_at::<u64>(base, offset) as usize
    }

    pub fn try_read_ptr_at(&self, base: usize, offset: usize) -> Result<usize, ReadError> {
        debug_assert_eq!(SIZE_OF_PTR, std::mem::size_of::<u64>());
        self.try_read_at::<u64>(base, offset).map(|ptr| ptr as usize)
    }

    /// Decode the name stored at `address` using the profile's name layout
    pub fn name_at(&self, address: usize) -> Result<NameHandle, ReadError> {
        let layout = &self.offsets.fname;
        let comparison_index = self.try_read_at::<u32>(address, layout.comparison_index)?;
        let number = match layout.number {
            Some(offset) => self.try_read_at::<i32>(address, offset)?,
            None => 0,
        };
        Ok(NameHandle {
            address,
            comparison_index,
            number,
        })
    }

    /// `read_name` for the name field at `offset` inside `base`
    pub fn read_name_at(&self, base: usize, offset: usize) -> Option<String> {
        match Self::field_address(base, offset) {
            Ok(address) => self.read_name(address),
            Err(err) => {
                tracing::trace!("{}", err);
                None
            }
        }
    }

    /// Resolve the name stored at `address` to display text (`Name_N` for numbered names)
    pub fn read_name(&self, address: usize) -> Option<String> {
        let handle = match self.name_at(address) {
            Ok(handle) => handle,
            Err(err) => {
                tracing::trace!("{}", err);
                return None;
            }
        };
        match self.names.resolve(self.memory, handle) {
            Ok((text, number)) => Some(display_name(&text, number)),
            Err(err) => {
                tracing::trace!("{}", err);
                None
            }
        }
    }
}

impl fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Target")
            .field("version", &self.offsets.version_name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SnapshotMemory;
    use crate::names::NameTable;

    #[test]
    fn test_typed_reads() {
        let mut memory = SnapshotMemory::new();
        memory.write(0x2000, &0x1122_3344_5566_7788u64);
        let offsets = UeOffsets::ue4_22();
        let names = NameTable::new();
        let target = Target::new(&memory, &offsets, &names);

        assert_eq!(target.read::<u32>(0x2000), 0x5566_7788);
        assert_eq!(target.read_ptr(0x2000), 0x1122_3344_5566_7788);
        assert_eq!(target.read::<u32>(0x9000), 0);
        assert!(matches!(target.try_read::<u32>(0x18), Err(ReadError::Null(0x18))));
    }

    #[test]
    fn test_field_reads_reject_overflow() {
        let mut memory = SnapshotMemory::new();
        memory.write(0x2000, &7u32);
        let offsets = UeOffsets::ue4_22();
        let names = NameTable::new();
        let target = Target::new(&memory, &offsets, &names);

        assert_eq!(target.read_at::<u32>(0x1FF8, 8), 7);
        assert!(matches!(
            target.try_read_at::<u32>(usize::MAX - 4, 0x10),
            Err(ReadError::Overflow { offset: 0x10, .. })
        ));
        assert_eq!(target.read_ptr_at(usize::MAX, 8), 0);
        assert_eq!(target.read_name_at(usize::MAX - 1, 0x18), None);
    }

    #[test]
    fn test_numbered_name() {
        let mut memory = SnapshotMemory::new();
        let mut names = NameTable::new();
        let index = names.intern("Default__Actor");
        memory.write(0x3000, &index);
        memory.write(0x3004, &3i32);
        let offsets = UeOffsets::ue4_22();
        let target = Target::new(&memory, &offsets, &names);

        assert_eq!(target.read_name(0x3000).as_deref(), Some("Default__Actor_2"));
        assert_eq!(target.read_name(0x8000), None);
    }
}
