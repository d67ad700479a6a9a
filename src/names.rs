//! Engine names
//!
//! A name in the target is a (comparison index, number) pair. Turning the
//! index into text is the job of a `NameResolver`; the name pool layout of a
//! live target is outside this crate. `NameTable` is a table-backed resolver
//! for snapshots, tests and pre-dumped name lists.

use std::collections::HashMap;

use crate::backend::{MemoryReader, NameResolver, ReadError};

/// A name as stored in the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameHandle {
    /// Where the name was read from
    pub address: usize,
    pub comparison_index: u32,
    /// Disambiguation number; 0 means none, N means suffix `_{N-1}`
    pub number: i32,
}

/// Compose the engine's display form of a name
pub fn display_name(text: &str, number: i32) -> String {
    if number > 0 {
        format!("{}_{}", text, number - 1)
    } else {
        text.to_string()
    }
}

/// Comparison index -> text table
#[derive(Debug, Default, Clone)]
pub struct NameTable {
    names: HashMap<u32, String>,
    next_index: u32,
}

impl NameTable {
    pub fn new() -> Self {
        NameTable::default()
    }

    pub fn insert(&mut self, index: u32, text: impl Into<String>) {
        self.names.insert(index, text.into());
        self.next_index = self.next_index.max(index + 1);
    }

    /// Index of `text`, adding it if needed
    pub fn intern(&mut self, text: &str) -> u32 {
        if let Some((&index, _)) = self.names.iter().find(|(_, name)| name.as_str() == text) {
            return index;
        }
        let index = self.next_index;
        self.insert(index, text);
        index
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(u32, String)> for NameTable {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        let mut table = NameTable::new();
        for (index, text) in iter {
            table.insert(index, text);
        }
        table
    }
}

impl NameResolver for NameTable {
    fn resolve(&self, _memory: &dyn MemoryReader, name: NameHandle) -> Result<(String, i32), ReadError> {
        self.names
            .get(&name.comparison_index)
            .map(|text| (text.clone(), name.number))
            .ok_or(ReadError::UnresolvedName {
                address: name.address,
                index: name.comparison_index,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SnapshotMemory;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("Actor", 0), "Actor");
        assert_eq!(display_name("Actor", 1), "Actor_0");
        assert_eq!(display_name("Actor", 12), "Actor_11");
    }

    #[test]
    fn test_intern_is_stable() {
        let mut table = NameTable::new();
        let a = table.intern("None");
        let b = table.intern("Object");
        assert_ne!(a, b);
        assert_eq!(table.intern("None"), a);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_resolve() {
        let table: NameTable = vec![(7, "Engine".to_string())].into_iter().collect();
        let memory = SnapshotMemory::new();
        let handle = NameHandle {
            address: 0x1000,
            comparison_index: 7,
            number: 2,
        };
        assert_eq!(table.resolve(&memory, handle).unwrap(), ("Engine".to_string(), 2));

        let missing = NameHandle {
            comparison_index: 8,
            ..handle
        };
        assert!(matches!(
            table.resolve(&memory, missing),
            Err(ReadError::UnresolvedName { index: 8, .. })
        ));
    }
}
