//! In-memory target
//!
//! Byte regions keyed by base address. Used for offline dumps and for tests
//! that lay out synthetic engine structures. Regions never overlap or touch:
//! writes that meet an existing region are merged into it.

use std::collections::BTreeMap;

use super::{MemoryReader, ReadError};

/// Captured or synthetic memory image
#[derive(Debug, Default, Clone)]
pub struct SnapshotMemory {
    regions: BTreeMap<usize, Vec<u8>>,
}

impl SnapshotMemory {
    pub fn new() -> Self {
        SnapshotMemory::default()
    }

    /// Zero-fill a range, mapping it if needed
    pub fn reserve(&mut self, address: usize, size: usize) {
        self.write_bytes(address, &vec![0u8; size]);
    }

    /// Write bytes. Writes inside an existing region patch it in place;
    /// writes overlapping or adjacent to other regions merge with them.
    pub fn write_bytes(&mut self, address: usize, data: &[u8]) {
        let Some(end) = address.checked_add(data.len()) else {
            tracing::debug!("Snapshot write at 0x{:X} wraps the address space", address);
            return;
        };
        if let Some((base, region)) = self.region_mut(address, data.len()) {
            let start = address - base;
            region[start..start + data.len()].copy_from_slice(data);
            return;
        }

        let touching: Vec<usize> = self
            .regions
            .range(..=end)
            .filter(|(&base, region)| base + region.len() >= address)
            .map(|(&base, _)| base)
            .collect();
        let start = touching.first().map_or(address, |&base| base.min(address));
        let stop = touching
            .iter()
            .map(|base| base + self.regions[base].len())
            .fold(end, usize::max);

        // Appends grow the preceding region in place
        let mut merged = self.regions.remove(&start).unwrap_or_default();
        merged.resize(stop - start, 0);
        for base in touching {
            if let Some(region) = self.regions.remove(&base) {
                merged[base - start..base - start + region.len()].copy_from_slice(&region);
            }
        }
        merged[address - start..end - start].copy_from_slice(data);
        self.regions.insert(start, merged);
    }

    /// Write a POD value
    pub fn write<T: bytemuck::Pod>(&mut self, address: usize, value: &T) {
        self.write_bytes(address, bytemuck::bytes_of(value));
    }

    pub fn write_ptr(&mut self, address: usize, pointer: usize) {
        self.write(address, &(pointer as u64));
    }

    /// Drop the region starting at `address`, simulating freed memory
    pub fn unmap(&mut self, address: usize) -> bool {
        self.regions.remove(&address).is_some()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    fn region(&self, address: usize, size: usize) -> Option<(usize, &Vec<u8>)> {
        let (&base, region) = self.regions.range(..=address).next_back()?;
        let end = address.checked_add(size)?;
        (end <= base + region.len()).then_some((base, region))
    }

    fn region_mut(&mut self, address: usize, size: usize) -> Option<(usize, &mut Vec<u8>)> {
        let (&base, region) = self.regions.range_mut(..=address).next_back()?;
        let end = address.checked_add(size)?;
        (end <= base + region.len()).then_some((base, region))
    }
}

impl MemoryReader for SnapshotMemory {
    fn read_into(&self, address: usize, buf: &mut [u8]) -> Result<(), ReadError> {
        let (base, region) = self.region(address, buf.len()).ok_or(ReadError::Failed {
            address,
            size: buf.len(),
            reason: "Address not mapped in snapshot".to_string(),
        })?;
        let start = address - base;
        buf.copy_from_slice(&region[start..start + buf.len()]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_back() {
        let mut memory = SnapshotMemory::new();
        memory.write_bytes(0x1000, &[1, 2, 3, 4, 5]);

        assert_eq!(memory.read_bytes(0x1000, 5).unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(memory.read_bytes(0x1002, 2).unwrap(), vec![3, 4]);
    }

    #[test]
    fn test_patch_inside_region() {
        let mut memory = SnapshotMemory::new();
        memory.reserve(0x2000, 0x40);
        memory.write(0x2010, &0xDEADBEEFu32);

        assert_eq!(memory.region_count(), 1);
        assert_eq!(memory.read_bytes(0x2010, 4).unwrap(), 0xDEADBEEFu32.to_le_bytes().to_vec());
    }

    #[test]
    fn test_reads_past_region_fail() {
        let mut memory = SnapshotMemory::new();
        memory.reserve(0x3000, 0x10);

        assert!(memory.read_bytes(0x300C, 8).is_err());
        assert!(memory.read_bytes(0x2FFF, 1).is_err());
        assert!(memory.read_bytes(0x4000, 1).is_err());
    }

    #[test]
    fn test_adjacent_writes_merge() {
        let mut memory = SnapshotMemory::new();
        for (i, value) in [10i32, 20, 30, 40].iter().enumerate() {
            memory.write(0x2000 + i * 4, value);
        }

        assert_eq!(memory.region_count(), 1);
        assert_eq!(memory.read_bytes(0x2004, 8).unwrap(), [20, 0, 0, 0, 30, 0, 0, 0]);
    }

    #[test]
    fn test_read_across_page_captures() {
        let mut memory = SnapshotMemory::new();
        memory.write_bytes(0x2000, &[0xAA; 0x1000]);
        memory.write_bytes(0x1000, &[0xBB; 0x1000]);
        memory.write_bytes(0x5000, &[0xCC; 0x10]);

        assert_eq!(memory.region_count(), 2);
        let spanning = memory.read_bytes(0x1FFE, 4).unwrap();
        assert_eq!(spanning, vec![0xBB, 0xBB, 0xAA, 0xAA]);
        assert!(memory.read_bytes(0x2FFE, 4).is_err());
    }

    #[test]
    fn test_overlapping_write_bridges_regions() {
        let mut memory = SnapshotMemory::new();
        memory.write_bytes(0x1000, &[1; 4]);
        memory.write_bytes(0x1008, &[2; 4]);
        memory.write_bytes(0x1002, &[3; 8]);

        assert_eq!(memory.region_count(), 1);
        assert_eq!(
            memory.read_bytes(0x1000, 12).unwrap(),
            vec![1, 1, 3, 3, 3, 3, 3, 3, 3, 3, 2, 2]
        );
    }

    #[test]
    fn test_unmap() {
        let mut memory = SnapshotMemory::new();
        memory.reserve(0x5000, 0x10);
        assert!(memory.unmap(0x5000));
        assert!(memory.read_bytes(0x5000, 1).is_err());
    }
}
