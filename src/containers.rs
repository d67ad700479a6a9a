//! Views over engine containers stored in the target
//!
//! A `TArray` is a (data, num, max) triple. Views never copy the elements up
//! front and never read outside `[0, num)`. `ScratchArray` is the local,
//! owned counterpart for building element lists on this side.

use std::marker::PhantomData;

use bytemuck::Pod;

use crate::backend::Target;
use crate::constants::{MAX_STRING_LEN, SIZE_OF_PTR};
use crate::{Error, Result};

/// Raw (data, num, max) triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrayHeader {
    pub data: usize,
    pub num: i32,
    pub max: i32,
}

impl ArrayHeader {
    /// Read the triple stored at `address`
    pub fn read(target: Target<'_>, address: usize) -> Self {
        ArrayHeader {
            data: target.read_ptr(address),
            num: target.read_at(address, SIZE_OF_PTR),
            max: target.read_at(address, SIZE_OF_PTR + 4),
        }
    }

    /// Null data or zero capacity means empty
    pub fn is_valid(&self) -> bool {
        self.data != 0 && self.max > 0 && self.num >= 0 && self.num <= self.max
    }

    pub fn num(&self) -> i32 {
        if self.is_valid() {
            self.num
        } else {
            0
        }
    }

    pub fn is_valid_index(&self, index: i32) -> bool {
        index >= 0 && index < self.num()
    }

    /// Address of element `index` for a given element stride
    pub fn element_address(&self, index: i32, stride: usize) -> Option<usize> {
        if !self.is_valid_index(index) {
            return None;
        }
        let offset = (index as usize).checked_mul(stride)?;
        self.data.checked_add(offset)
    }
}

/// Typed view over a foreign `TArray<T>`
#[derive(Clone, Copy)]
pub struct TArrayView<'a, T> {
    target: Target<'a>,
    header: ArrayHeader,
    _marker: PhantomData<T>,
}

impl<'a, T: Pod + Default> TArrayView<'a, T> {
    /// View the array whose triple is stored at `address`
    pub fn read(target: Target<'a>, address: usize) -> Self {
        TArrayView {
            target,
            header: ArrayHeader::read(target, address),
            _marker: PhantomData,
        }
    }

    pub fn header(&self) -> ArrayHeader {
        self.header
    }

    pub fn is_valid(&self) -> bool {
        self.header.is_valid()
    }

    pub fn num(&self) -> i32 {
        self.header.num()
    }

    pub fn max(&self) -> i32 {
        if self.is_valid() {
            self.header.max
        } else {
            0
        }
    }

    /// Unused capacity
    pub fn slack(&self) -> i32 {
        self.max() - self.num()
    }

    pub fn is_empty(&self) -> bool {
        self.num() == 0
    }

    pub fn is_valid_index(&self, index: i32) -> bool {
        self.header.is_valid_index(index)
    }

    /// Element at `index`, or `T::default()` outside `[0, num)`
    pub fn get(&self, index: i32) -> T {
        self.try_get(index).unwrap_or_default()
    }

    pub fn try_get(&self, index: i32) -> Result<T> {
        let address = self
            .header
            .element_address(index, std::mem::size_of::<T>())
            .ok_or(Error::OutOfRange {
                index: index as i64,
                len: self.num() as i64,
            })?;
        Ok(self.target.try_read(address)?)
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.num()).map(move |index| self.get(index))
    }

    /// Copy all elements in one read
    pub fn to_vec(&self) -> Vec<T> {
        let count = self.num() as usize;
        if count == 0 {
            return Vec::new();
        }
        let size = std::mem::size_of::<T>();
        match self.target.memory().read_bytes(self.header.data, count * size) {
            Ok(bytes) => bytes
                .chunks_exact(size)
                .map(bytemuck::pod_read_unaligned)
                .collect(),
            Err(err) => {
                tracing::trace!("{}", err);
                Vec::new()
            }
        }
    }
}

/// Foreign `FString` (a `TArray` of UTF-16 code units)
#[derive(Clone, Copy)]
pub struct ForeignString<'a> {
    chars: TArrayView<'a, u16>,
}

impl<'a> ForeignString<'a> {
    pub fn read(target: Target<'a>, address: usize) -> Self {
        ForeignString {
            chars: TArrayView::read(target, address),
        }
    }

    /// Stored length, terminator included when the engine stored one
    pub fn len(&self) -> i32 {
        self.chars.num()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Decode to a display string. Invalid backing storage decodes to `""`.
    pub fn to_string_lossy(&self) -> String {
        if self.len() > MAX_STRING_LEN {
            tracing::debug!("FString length {} exceeds bound, treating as empty", self.len());
            return String::new();
        }
        let units = self.chars.to_vec();
        let end = units.iter().position(|&c| c == 0).unwrap_or(units.len());
        String::from_utf16_lossy(&units[..end])
    }
}

/// Locally owned fixed-capacity array. Never touches foreign memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchArray<T> {
    data: Vec<T>,
    capacity: usize,
}

impl<T: Clone + Default> ScratchArray<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        ScratchArray {
            data: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn num(&self) -> usize {
        self.data.len()
    }

    pub fn max(&self) -> usize {
        self.capacity
    }

    pub fn slack(&self) -> usize {
        self.capacity - self.data.len()
    }

    /// Append; fails when the buffer is full
    pub fn add(&mut self, element: T) -> bool {
        if self.slack() == 0 {
            return false;
        }
        self.data.push(element);
        true
    }

    /// Remove element `index`, shifting the tail down
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index >= self.data.len() {
            return false;
        }
        self.data.remove(index);
        true
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Element at `index`, or `T::default()` when out of range
    pub fn get(&self, index: usize) -> T {
        self.data.get(index).cloned().unwrap_or_default()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SnapshotMemory;
    use crate::names::NameTable;
    use crate::offsets::UeOffsets;

    fn write_array(memory: &mut SnapshotMemory, at: usize, data: usize, num: i32, max: i32) {
        memory.write_ptr(at, data);
        memory.write(at + 8, &num);
        memory.write(at + 12, &max);
    }

    #[test]
    fn test_view_bounds() {
        let mut memory = SnapshotMemory::new();
        write_array(&mut memory, 0x1000, 0x2000, 3, 4);
        for (i, value) in [10i32, 20, 30, 40].iter().enumerate() {
            memory.write(0x2000 + i * 4, value);
        }
        let offsets = UeOffsets::ue4_22();
        let names = NameTable::new();
        let target = Target::new(&memory, &offsets, &names);

        let view = TArrayView::<i32>::read(target, 0x1000);
        assert_eq!(view.num(), 3);
        assert_eq!(view.slack(), 1);
        assert_eq!(view.get(0), 10);
        assert_eq!(view.get(2), 30);
        // Slot 3 holds data but is past num
        assert_eq!(view.get(3), 0);
        assert_eq!(view.get(-1), 0);
        assert!(matches!(view.try_get(3), Err(Error::OutOfRange { index: 3, len: 3 })));
        assert_eq!(view.iter().collect::<Vec<_>>(), vec![10, 20, 30]);
        assert_eq!(view.to_vec(), vec![10, 20, 30]);
    }

    #[test]
    fn test_element_address_does_not_wrap() {
        let header = ArrayHeader {
            data: usize::MAX - 0x18,
            num: 4,
            max: 4,
        };
        assert_eq!(header.element_address(1, 0x10), Some(usize::MAX - 8));
        assert_eq!(header.element_address(2, 0x10), None);
        assert_eq!(header.element_address(3, usize::MAX), None);
    }

    #[test]
    fn test_null_or_zero_capacity_is_empty() {
        let mut memory = SnapshotMemory::new();
        write_array(&mut memory, 0x1000, 0, 5, 5);
        write_array(&mut memory, 0x1100, 0x2000, 5, 0);
        let offsets = UeOffsets::ue4_22();
        let names = NameTable::new();
        let target = Target::new(&memory, &offsets, &names);

        for at in [0x1000, 0x1100] {
            let view = TArrayView::<u64>::read(target, at);
            assert!(view.is_empty());
            assert_eq!(view.get(0), 0);
            assert!(view.to_vec().is_empty());
        }
    }

    #[test]
    fn test_string_strips_terminator() {
        let mut memory = SnapshotMemory::new();
        let text: Vec<u16> = "Hello\0".encode_utf16().collect();
        write_array(&mut memory, 0x1000, 0x2000, text.len() as i32, text.len() as i32);
        memory.write_bytes(0x2000, bytemuck::cast_slice(&text));
        let offsets = UeOffsets::ue4_22();
        let names = NameTable::new();
        let target = Target::new(&memory, &offsets, &names);

        let string = ForeignString::read(target, 0x1000);
        assert_eq!(string.len(), 6);
        assert_eq!(string.to_string_lossy(), "Hello");
    }

    #[test]
    fn test_string_empty_cases() {
        let mut memory = SnapshotMemory::new();
        write_array(&mut memory, 0x1000, 0, 0, 0);
        // Points at unmapped memory
        write_array(&mut memory, 0x1100, 0x7000, 4, 4);
        let offsets = UeOffsets::ue4_22();
        let names = NameTable::new();
        let target = Target::new(&memory, &offsets, &names);

        assert_eq!(ForeignString::read(target, 0x1000).to_string_lossy(), "");
        assert_eq!(ForeignString::read(target, 0x1100).to_string_lossy(), "");
        assert_eq!(ForeignString::read(target, 0x9000).to_string_lossy(), "");
    }

    #[test]
    fn test_scratch_array() {
        let mut scratch = ScratchArray::with_capacity(3);
        assert!(scratch.add(1));
        assert!(scratch.add(2));
        assert!(scratch.add(3));
        assert!(!scratch.add(4));

        assert!(scratch.remove_at(0));
        assert_eq!(scratch.as_slice(), &[2, 3]);
        assert!(!scratch.remove_at(5));
        assert_eq!(scratch.get(7), 0);

        scratch.clear();
        assert_eq!(scratch.num(), 0);
        assert_eq!(scratch.slack(), 3);
    }
}
