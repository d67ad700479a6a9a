//! UObject handle

use std::fmt;

use crate::backend::Target;
use crate::common::ObjectFlags;
use crate::constants::{
    ACTOR_CLASS, CLASS_CLASS, ENUM_CLASS, FUNCTION_CLASS, MAX_OUTER_DEPTH, PACKAGE_CLASS,
};

use super::chain::LinkedChain;
use super::{EnumHandle, FunctionHandle, StructHandle};

/// One engine object in the target
#[derive(Clone, Copy)]
pub struct ObjectHandle<'a> {
    target: Target<'a>,
    address: usize,
}

impl<'a> ObjectHandle<'a> {
    /// Wrap an address taken from an engine pointer. Null yields `None`.
    pub fn from_address(target: Target<'a>, address: usize) -> Option<Self> {
        (address != 0).then_some(ObjectHandle { target, address })
    }

    pub fn address(&self) -> usize {
        self.address
    }

    pub fn target(&self) -> Target<'a> {
        self.target
    }

    pub fn flags(&self) -> ObjectFlags {
        let offset = self.target.offsets().uobject.flags;
        ObjectFlags::from_bits_retain(self.target.read_at(self.address, offset))
    }

    /// True if any bit of `mask` is set
    pub fn has_flags(&self, mask: ObjectFlags) -> bool {
        self.flags().intersects(mask)
    }

    /// Registry slot index as stored in the object header
    pub fn index(&self) -> i32 {
        self.target.read_at(self.address, self.target.offsets().uobject.index)
    }

    pub fn class(&self) -> Option<StructHandle<'a>> {
        let offset = self.target.offsets().uobject.class;
        StructHandle::from_address(self.target, self.target.read_ptr_at(self.address, offset))
    }

    pub fn outer(&self) -> Option<ObjectHandle<'a>> {
        let offset = self.target.offsets().uobject.outer;
        ObjectHandle::from_address(self.target, self.target.read_ptr_at(self.address, offset))
    }

    /// Outer chain, innermost first, excluding `self`
    pub fn outers(&self) -> impl Iterator<Item = ObjectHandle<'a>> + 'a {
        let target = self.target;
        let offset = target.offsets().uobject.outer;
        let first = target.read_ptr_at(self.address, offset);
        LinkedChain::new(first, MAX_OUTER_DEPTH, "outer", move |node| {
            target.read_ptr_at(node, offset)
        })
        .filter_map(move |address| ObjectHandle::from_address(target, address))
    }

    /// Outermost outer; `None` for objects that are their own root
    pub fn package(&self) -> Option<ObjectHandle<'a>> {
        self.outers().last()
    }

    /// Display name, `Name_N` for numbered names. Unreadable names are empty.
    pub fn name(&self) -> String {
        let offset = self.target.offsets().uobject.name;
        self.target.read_name_at(self.address, offset).unwrap_or_default()
    }

    pub fn class_name(&self) -> String {
        self.class().map(|class| class.name()).unwrap_or_default()
    }

    pub fn is_package(&self) -> bool {
        self.class_name() == PACKAGE_CLASS
    }

    /// Outer chain joined from outermost to `self`.
    ///
    /// With `subobject_delimiter` set, an object whose outer is not a
    /// package but whose outer's outer is one is joined with `:`.
    pub fn path_name(&self) -> String {
        let mut chain: Vec<ObjectHandle<'a>> = std::iter::once(*self).chain(self.outers()).collect();
        chain.reverse();

        let delimiter = self.target.offsets().subobject_delimiter;
        let is_package: Vec<bool> = if delimiter {
            chain.iter().map(ObjectHandle::is_package).collect()
        } else {
            Vec::new()
        };

        let mut path = String::new();
        for (i, object) in chain.iter().enumerate() {
            if i > 0 {
                let subobject = delimiter && i >= 2 && !is_package[i - 1] && is_package[i - 2];
                path.push(if subobject { ':' } else { '.' });
            }
            path.push_str(&object.name());
        }
        path
    }

    /// `"<ClassName> <PathName>"`
    pub fn full_name(&self) -> String {
        format!("{} {}", self.class_name(), self.path_name())
    }

    /// Source-level name: `A`/`U` for classes, `F` for structs, enums unchanged
    pub fn cpp_name(&self) -> String {
        let name = self.name();
        let Some(class) = self.class() else {
            return name;
        };
        if class.is_child_of_named(ENUM_CLASS) {
            name
        } else if class.is_child_of_named(CLASS_CLASS) {
            if self.as_struct().is_child_of_named(ACTOR_CLASS) {
                format!("A{}", name)
            } else {
                format!("U{}", name)
            }
        } else {
            format!("F{}", name)
        }
    }

    /// True if `class` is this object's class or one of its ancestors
    pub fn is_a(&self, class: &StructHandle<'_>) -> bool {
        self.class().map_or(false, |own| own.is_child_of(class))
    }

    /// `is_a` by class name
    pub fn is_a_named(&self, class_name: &str) -> bool {
        self.class().map_or(false, |own| own.is_child_of_named(class_name))
    }

    pub fn is_function(&self) -> bool {
        self.is_a_named(FUNCTION_CLASS)
    }

    /// Reinterpret as a struct; meaningful for classes, structs and functions
    pub fn as_struct(&self) -> StructHandle<'a> {
        StructHandle::from_object(*self)
    }

    pub fn as_function(&self) -> FunctionHandle<'a> {
        FunctionHandle::from_struct(self.as_struct())
    }

    pub fn as_enum(&self) -> EnumHandle<'a> {
        EnumHandle::from_object(*self)
    }
}

impl PartialEq for ObjectHandle<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for ObjectHandle<'_> {}

impl std::hash::Hash for ObjectHandle<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.address.hash(state);
    }
}

impl fmt::Debug for ObjectHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHandle(0x{:X})", self.address)
    }
}
