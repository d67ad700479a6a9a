//! Synthetic engine images
//!
//! Lays out objects, classes, properties and the object registry in a
//! [`SnapshotMemory`] following a [`UeOffsets`] profile. Used by the test
//! suites and benches, and handy for checking a hand-written profile
//! against known structures.

use std::collections::HashMap;

use crate::backend::{SnapshotMemory, Target};
use crate::common::{FunctionFlags, InternalObjectFlags, ObjectFlags, PropertyFlags};
use crate::constants::{
    CLASS_CLASS, ENUM_CLASS, FUNCTION_CLASS, PACKAGE_CLASS, PROPERTY_CLASS, SCRIPT_STRUCT_CLASS,
    SIZE_OF_PTR,
};
use crate::names::NameTable;
use crate::offsets::{PropertyLayout, UeOffsets};

const BASE_ADDRESS: usize = 0x10_0000;
const OBJECT_SIZE: usize = 0x100;
const FIELD_CLASS_SIZE: usize = 0x40;
const REGISTRY_HEADER_SIZE: usize = 0x40;

/// Builder for a memory image of engine structures
pub struct SyntheticImage {
    offsets: UeOffsets,
    memory: SnapshotMemory,
    names: NameTable,
    slots: Vec<(usize, InternalObjectFlags)>,
    classes: HashMap<String, usize>,
    field_classes: HashMap<String, usize>,
    core_package: usize,
    cursor: usize,
}

/// A finished image together with everything needed to read it
pub struct SyntheticTarget {
    pub memory: SnapshotMemory,
    pub names: NameTable,
    pub offsets: UeOffsets,
}

impl SyntheticTarget {
    pub fn target(&self) -> Target<'_> {
        Target::new(&self.memory, &self.offsets, &self.names)
    }
}

impl SyntheticImage {
    /// Start an image containing the core `Class` and `Package` classes
    /// inside `/Script/CoreUObject`
    pub fn new(offsets: UeOffsets) -> Self {
        let mut image = SyntheticImage {
            offsets,
            memory: SnapshotMemory::new(),
            names: NameTable::new(),
            slots: Vec::new(),
            classes: HashMap::new(),
            field_classes: HashMap::new(),
            core_package: 0,
            cursor: BASE_ADDRESS,
        };

        let class_class = image.alloc_object();
        image.write_header(class_class, CLASS_CLASS, class_class, 0);
        image.classes.insert(CLASS_CLASS.to_string(), class_class);
        let package_class = image.object(PACKAGE_CLASS, class_class, 0);
        image.classes.insert(PACKAGE_CLASS.to_string(), package_class);

        let core = image.object("/Script/CoreUObject", package_class, 0);
        image.core_package = core;
        image.set_outer(class_class, core);
        image.set_outer(package_class, core);
        image
    }

    pub fn offsets(&self) -> &UeOffsets {
        &self.offsets
    }

    /// Direct access for layouts the builder has no helper for
    pub fn memory_mut(&mut self) -> &mut SnapshotMemory {
        &mut self.memory
    }

    /// Reserve a zeroed, 16-byte aligned block
    pub fn alloc(&mut self, size: usize) -> usize {
        let address = self.cursor;
        self.memory.reserve(address, size.max(1));
        self.cursor += (size.max(1) + 0xF) & !0xF;
        address
    }

    fn alloc_object(&mut self) -> usize {
        let address = self.alloc(OBJECT_SIZE);
        let index = self.slots.len() as i32;
        self.memory.write(address + self.offsets.uobject.index, &index);
        self.slots.push((address, InternalObjectFlags::empty()));
        address
    }

    fn write_name(&mut self, at: usize, text: &str) {
        let index = self.names.intern(text);
        self.memory.write(at + self.offsets.fname.comparison_index, &index);
        if let Some(number) = self.offsets.fname.number {
            self.memory.write(at + number, &0i32);
        }
    }

    fn write_header(&mut self, address: usize, name: &str, class: usize, outer: usize) {
        let uobject = self.offsets.uobject.clone();
        self.write_name(address + uobject.name, name);
        self.memory.write_ptr(address + uobject.class, class);
        self.memory.write_ptr(address + uobject.outer, outer);
    }

    /// Register a new object
    pub fn object(&mut self, name: &str, class: usize, outer: usize) -> usize {
        let address = self.alloc_object();
        self.write_header(address, name, class, outer);
        address
    }

    pub fn set_outer(&mut self, object: usize, outer: usize) {
        self.memory.write_ptr(object + self.offsets.uobject.outer, outer);
    }

    pub fn set_flags(&mut self, object: usize, flags: ObjectFlags) {
        self.memory.write(object + self.offsets.uobject.flags, &flags.bits());
    }

    /// Register a slot holding an arbitrary address, mapped or not
    pub fn register_address(&mut self, address: usize) {
        self.slots.push((address, InternalObjectFlags::empty()));
    }

    /// Set the registry flags of an object's slot
    pub fn mark_slot(&mut self, object: usize, flags: InternalObjectFlags) {
        if let Some(slot) = self.slots.iter_mut().find(|(address, _)| *address == object) {
            slot.1 = flags;
        }
    }

    /// A core class (`Function`, `ScriptStruct`, ...), created on first use
    pub fn core_class(&mut self, name: &str) -> usize {
        if let Some(&class) = self.classes.get(name) {
            return class;
        }
        let class_class = self.classes.get(CLASS_CLASS).copied().unwrap_or_default();
        let core = self.core_package;
        let class = self.object(name, class_class, core);
        self.classes.insert(name.to_string(), class);
        class
    }

    pub fn package(&mut self, name: &str) -> usize {
        let package_class = self.core_class(PACKAGE_CLASS);
        self.object(name, package_class, 0)
    }

    pub fn class(&mut self, name: &str, super_struct: usize, outer: usize) -> usize {
        let meta = self.core_class(CLASS_CLASS);
        let class = self.object(name, meta, outer);
        self.set_super(class, super_struct);
        class
    }

    pub fn script_struct(&mut self, name: &str, super_struct: usize, outer: usize) -> usize {
        let meta = self.core_class(SCRIPT_STRUCT_CLASS);
        let object = self.object(name, meta, outer);
        self.set_super(object, super_struct);
        object
    }

    pub fn enumeration(&mut self, name: &str, outer: usize) -> usize {
        let meta = self.core_class(ENUM_CLASS);
        self.object(name, meta, outer)
    }

    /// A UFunction owned by `owner`; link it with `link_children`
    pub fn function(&mut self, owner: usize, name: &str, flags: FunctionFlags) -> usize {
        let meta = self.core_class(FUNCTION_CLASS);
        let function = self.object(name, meta, owner);
        self.memory
            .write(function + self.offsets.ufunction.flags, &flags.bits());
        function
    }

    pub fn set_function_signature(&mut self, function: usize, num_params: u8, param_size: u16, native: usize) {
        let layout = self.offsets.ufunction.clone();
        self.memory.write(function + layout.num_params, &num_params);
        self.memory.write(function + layout.param_size, &param_size);
        self.memory.write_ptr(function + layout.func, native);
    }

    pub fn set_super(&mut self, object: usize, super_struct: usize) {
        self.memory
            .write_ptr(object + self.offsets.ustruct.super_struct, super_struct);
    }

    pub fn set_struct_size(&mut self, object: usize, size: i32) {
        self.memory.write(object + self.offsets.ustruct.size, &size);
    }

    /// Chain `children` through `UField::Next` from `UStruct::Children`
    pub fn link_children(&mut self, owner: usize, children: &[usize]) {
        let head = owner + self.offsets.ustruct.children;
        let next = self.offsets.ufield.next;
        self.link(head, next, children);
    }

    /// Link properties through whichever list the active model uses
    pub fn link_properties(&mut self, owner: usize, properties: &[usize]) {
        match self.offsets.properties.clone() {
            PropertyLayout::UProperty(_) => self.link_children(owner, properties),
            PropertyLayout::FField(layout) => {
                self.link(owner + layout.child_properties, layout.ffield.next, properties)
            }
        }
    }

    fn link(&mut self, head: usize, next: usize, nodes: &[usize]) {
        self.memory.write_ptr(head, nodes.first().copied().unwrap_or(0));
        for pair in nodes.windows(2) {
            self.memory.write_ptr(pair[0] + next, pair[1]);
        }
        if let Some(&last) = nodes.last() {
            self.memory.write_ptr(last + next, 0);
        }
    }

    /// Class identity of a property kind in the active model: a UClass
    /// deriving from `Property`, or an FFieldClass
    pub fn field_class(&mut self, name: &str) -> usize {
        match self.offsets.properties.clone() {
            PropertyLayout::UProperty(_) => {
                if let Some(&class) = self.classes.get(name) {
                    return class;
                }
                let super_struct = if name == PROPERTY_CLASS {
                    0
                } else {
                    self.field_class(PROPERTY_CLASS)
                };
                let class = self.core_class(name);
                self.set_super(class, super_struct);
                class
            }
            PropertyLayout::FField(layout) => {
                if let Some(&class) = self.field_classes.get(name) {
                    return class;
                }
                let super_class = if name == PROPERTY_CLASS {
                    0
                } else {
                    self.field_class(PROPERTY_CLASS)
                };
                let class = self.alloc(FIELD_CLASS_SIZE);
                self.write_name(class + layout.ffield_class.name, name);
                self.memory
                    .write_ptr(class + layout.ffield_class.super_class, super_class);
                self.field_classes.insert(name.to_string(), class);
                class
            }
        }
    }

    /// A property of class `class_name` (e.g. `IntProperty`) with array dim 1.
    /// In the UProperty model it is a registered object inside `owner`.
    pub fn property(&mut self, owner: usize, name: &str, class_name: &str, offset: i32, element_size: i32) -> usize {
        let class = self.field_class(class_name);
        let property = match self.offsets.properties.clone() {
            PropertyLayout::UProperty(_) => self.object(name, class, owner),
            PropertyLayout::FField(layout) => {
                let field = self.alloc(OBJECT_SIZE);
                self.memory.write_ptr(field + layout.ffield.class, class);
                self.write_name(field + layout.ffield.name, name);
                field
            }
        };
        let base = self.offsets.property().clone();
        self.memory.write(property + base.array_dim, &1i32);
        self.memory.write(property + base.element_size, &element_size);
        self.memory.write(property + base.offset, &offset);
        property
    }

    pub fn set_array_dim(&mut self, property: usize, array_dim: i32) {
        let at = property + self.offsets.property().array_dim;
        self.memory.write(at, &array_dim);
    }

    pub fn set_property_flags(&mut self, property: usize, flags: PropertyFlags) {
        let at = property + self.offsets.property().property_flags;
        self.memory.write(at, &flags.bits());
    }

    /// Store a pointer in payload word `slot` after the base property
    pub fn set_payload(&mut self, property: usize, slot: usize, value: usize) {
        let at = property + self.offsets.property().size + slot * SIZE_OF_PTR;
        self.memory.write_ptr(at, value);
    }

    pub fn set_bool(&mut self, property: usize, field_size: u8, byte_offset: u8, byte_mask: u8, field_mask: u8) {
        let at = property + self.offsets.property().size;
        self.memory
            .write(at, &[field_size, byte_offset, byte_mask, field_mask]);
    }

    /// Fill an enum's names array
    pub fn set_enum_names(&mut self, enumeration: usize, entries: &[(&str, i64)]) {
        let entry_size = self.offsets.uenum.entry_size;
        let value_offset = self.offsets.fname.size;
        let data = self.alloc(entries.len() * entry_size);
        for (i, (name, value)) in entries.iter().enumerate() {
            let entry = data + i * entry_size;
            self.write_name(entry, name);
            self.memory.write(entry + value_offset, value);
        }
        let at = enumeration + self.offsets.uenum.names;
        self.write_array(at, data, entries.len() as i32);
    }

    /// Write a (data, num, max) triple
    pub fn write_array(&mut self, at: usize, data: usize, num: i32) {
        self.memory.write_ptr(at, data);
        self.memory.write(at + SIZE_OF_PTR, &num);
        self.memory.write(at + SIZE_OF_PTR + 4, &num);
    }

    /// Store `text` as an FString (terminator included); returns the triple's address
    pub fn write_fstring(&mut self, text: &str) -> usize {
        let units: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
        let data = self.alloc(units.len() * 2);
        self.memory.write_bytes(data, bytemuck::cast_slice(&units));
        let triple = self.alloc(0x10);
        self.write_array(triple, data, units.len() as i32);
        triple
    }

    /// Lay out the object registry and hand back the image
    pub fn finish(mut self) -> SyntheticTarget {
        let layout = self.offsets.object_array.clone();
        let header = if layout.address == 0 {
            self.alloc(REGISTRY_HEADER_SIZE)
        } else {
            self.memory.reserve(layout.address, REGISTRY_HEADER_SIZE);
            layout.address
        };
        self.offsets.object_array.address = header;

        let slots = std::mem::take(&mut self.slots);
        let count = slots.len();
        let items = match layout.elements_per_chunk {
            None => {
                let items = self.alloc(count * layout.item_size);
                for (i, slot) in slots.iter().enumerate() {
                    self.write_item(items + i * layout.item_size, *slot);
                }
                items
            }
            Some(per_chunk) => {
                let chunks = count.div_ceil(per_chunk).max(1);
                let table = self.alloc(chunks * SIZE_OF_PTR);
                for chunk_index in 0..chunks {
                    let in_chunk = count.saturating_sub(chunk_index * per_chunk).min(per_chunk);
                    let chunk = self.alloc(in_chunk * layout.item_size);
                    self.memory.write_ptr(table + chunk_index * SIZE_OF_PTR, chunk);
                    for i in 0..in_chunk {
                        let slot = slots[chunk_index * per_chunk + i];
                        self.write_item(chunk + i * layout.item_size, slot);
                    }
                }
                table
            }
        };
        self.memory.write_ptr(header + layout.objects, items);
        self.memory.write(header + layout.num_elements, &(count as i32));

        tracing::debug!("Synthetic image: {} objects, {} regions", count, self.memory.region_count());
        SyntheticTarget {
            memory: self.memory,
            names: self.names,
            offsets: self.offsets,
        }
    }

    fn write_item(&mut self, item: usize, (object, flags): (usize, InternalObjectFlags)) {
        let layout = self.offsets.object_array.clone();
        self.memory.write_ptr(item + layout.item_object, object);
        self.memory.write(item + layout.item_flags, &flags.bits());
    }
}
