//! Global object registry (FUObjectArray)
//!
//! Slots hold an object pointer plus internal flags. Empty slots and slots
//! flagged unreachable or pending-kill are never handed out. The registry
//! may be a flat item array or a table of fixed-size chunks.

use std::ops::ControlFlow;

use crate::backend::Target;
use crate::common::InternalObjectFlags;
use crate::constants::{CLASS_CLASS, ENUM_CLASS, SCRIPT_STRUCT_CLASS, SIZE_OF_PTR};
use crate::objects::{EnumHandle, ObjectHandle, StructHandle};
use crate::offsets::ObjectArrayOffsets;
use crate::{Error, Result};

/// Enumerator over the target's object registry
#[derive(Debug, Clone, Copy)]
pub struct ObjectTable<'a> {
    target: Target<'a>,
}

impl<'a> ObjectTable<'a> {
    pub fn new(target: Target<'a>) -> Self {
        ObjectTable { target }
    }

    pub fn target(&self) -> Target<'a> {
        self.target
    }

    fn layout(&self) -> &'a ObjectArrayOffsets {
        &self.target.offsets().object_array
    }

    /// Number of slots, read fresh on every call
    pub fn count(&self) -> Result<i32> {
        let layout = self.layout();
        self.target
            .try_read_at::<i32>(layout.address, layout.num_elements)
            .map_err(|source| Error::MemoryUnavailable {
                address: layout.address,
                source,
            })
    }

    fn items(&self) -> Result<usize> {
        let layout = self.layout();
        self.target
            .try_read_ptr_at(layout.address, layout.objects)
            .map_err(|source| Error::MemoryUnavailable {
                address: layout.address,
                source,
            })
    }

    fn item_address(&self, items: usize, index: i32) -> Option<usize> {
        let layout = self.layout();
        let index = usize::try_from(index).ok()?;
        match layout.elements_per_chunk {
            Some(per_chunk) => {
                let chunk_offset = index.checked_div(per_chunk)?.checked_mul(SIZE_OF_PTR)?;
                let chunk = self.target.read_ptr_at(items, chunk_offset);
                if chunk == 0 {
                    return None;
                }
                chunk.checked_add(index.checked_rem(per_chunk)?.checked_mul(layout.item_size)?)
            }
            None => items.checked_add(index.checked_mul(layout.item_size)?),
        }
    }

    /// Raw (object pointer, internal flags) of a slot
    fn raw_slot(&self, items: usize, index: i32) -> Option<(usize, InternalObjectFlags)> {
        let item = self.item_address(items, index)?;
        let layout = self.layout();
        let object = self.target.read_ptr_at(item, layout.item_object);
        let flags = InternalObjectFlags::from_bits_retain(self.target.read_at(item, layout.item_flags));
        (object != 0).then_some((object, flags))
    }

    fn live_slot(&self, items: usize, index: i32) -> Option<ObjectHandle<'a>> {
        let (object, flags) = self.raw_slot(items, index)?;
        if flags.is_dead() {
            tracing::trace!("Skipping slot {} ({:?})", index, flags);
            return None;
        }
        // A slot whose header cannot be read is as good as empty
        let class = self.target.offsets().uobject.class;
        if let Err(err) = self.target.try_read_at::<u64>(object, class) {
            tracing::debug!("Skipping slot {}: {}", index, err);
            return None;
        }
        ObjectHandle::from_address(self.target, object)
    }

    /// Object at `index`; `None` for out-of-range, empty, dying or unreadable slots
    pub fn object_at(&self, index: i32) -> Option<ObjectHandle<'a>> {
        let (count, items) = match self.count().and_then(|count| Ok((count, self.items()?))) {
            Ok(header) => header,
            Err(err) => {
                tracing::debug!("{}", err);
                return None;
            }
        };
        if index < 0 || index >= count {
            return None;
        }
        self.live_slot(items, index)
    }

    /// Live objects in index order. The slot count is captured once.
    pub fn iter(&self) -> Result<ObjectIter<'a>> {
        Ok(ObjectIter {
            table: *self,
            items: self.items()?,
            index: 0,
            count: self.count()?,
        })
    }

    /// Visit live objects until the visitor breaks
    pub fn for_each<F>(&self, mut visitor: F) -> Result<()>
    where
        F: FnMut(ObjectHandle<'a>) -> ControlFlow<()>,
    {
        for object in self.iter()? {
            if visitor(object).is_break() {
                break;
            }
        }
        Ok(())
    }

    /// `for_each` restricted to instances of `class` or its subclasses
    pub fn for_each_of_class<F>(&self, class: &StructHandle<'_>, mut visitor: F) -> Result<()>
    where
        F: FnMut(ObjectHandle<'a>) -> ControlFlow<()>,
    {
        self.for_each(|object| {
            if object.is_a(class) {
                visitor(object)
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    /// True iff some slot stores exactly `address`
    pub fn contains(&self, address: usize) -> bool {
        if address == 0 {
            return false;
        }
        let (count, items) = match self.count().and_then(|count| Ok((count, self.items()?))) {
            Ok(header) => header,
            Err(err) => {
                tracing::debug!("{}", err);
                return false;
            }
        };
        (0..count).any(|index| matches!(self.raw_slot(items, index), Some((object, _)) if object == address))
    }

    /// Promote an arbitrary address to a handle if the registry knows it
    pub fn to_object(&self, address: usize) -> Option<ObjectHandle<'a>> {
        if self.contains(address) {
            ObjectHandle::from_address(self.target, address)
        } else {
            None
        }
    }

    /// First object whose `full_name()` equals `full_name`
    pub fn find_by_full_name(&self, full_name: &str) -> Result<Option<ObjectHandle<'a>>> {
        Ok(self.iter()?.find(|object| object.full_name() == full_name))
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<ObjectHandle<'a>>> {
        Ok(self.iter()?.find(|object| object.name() == name))
    }

    /// First object named `name` directly inside `outer`
    pub fn find_by_name_in_outer(
        &self,
        name: &str,
        outer: &ObjectHandle<'_>,
    ) -> Result<Option<ObjectHandle<'a>>> {
        Ok(self.iter()?.find(|object| {
            object.outer().map(|o| o.address()) == Some(outer.address()) && object.name() == name
        }))
    }

    /// e.g. `find_class("Class /Script/Engine.Actor")`
    pub fn find_class(&self, full_name: &str) -> Result<Option<StructHandle<'a>>> {
        self.find_typed(full_name, CLASS_CLASS)
            .map(|found| found.map(|object| object.as_struct()))
    }

    pub fn find_struct(&self, full_name: &str) -> Result<Option<StructHandle<'a>>> {
        self.find_typed(full_name, SCRIPT_STRUCT_CLASS)
            .map(|found| found.map(|object| object.as_struct()))
    }

    pub fn find_enum(&self, full_name: &str) -> Result<Option<EnumHandle<'a>>> {
        self.find_typed(full_name, ENUM_CLASS)
            .map(|found| found.map(|object| object.as_enum()))
    }

    fn find_typed(&self, full_name: &str, meta: &str) -> Result<Option<ObjectHandle<'a>>> {
        Ok(self
            .find_by_full_name(full_name)?
            .filter(|object| object.is_a_named(meta)))
    }
}

/// Lazy, finite walk over live registry slots
pub struct ObjectIter<'a> {
    table: ObjectTable<'a>,
    items: usize,
    index: i32,
    count: i32,
}

impl<'a> Iterator for ObjectIter<'a> {
    type Item = ObjectHandle<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.index < self.count {
            let index = self.index;
            self.index += 1;
            if let Some(object) = self.table.live_slot(self.items, index) {
                return Some(object);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.count.saturating_sub(self.index).max(0) as usize))
    }
}
