//! UStruct / UClass / UFunction handles

use std::collections::HashSet;
use std::fmt;
use std::ops::Deref;

use crate::backend::{child_properties, BoxedProperty, Target};
use crate::common::FunctionFlags;
use crate::constants::{FUNCTION_CLASS, MAX_FIELD_CHAIN, MAX_SUPER_DEPTH};
use crate::Error;

use super::chain::LinkedChain;
use super::ObjectHandle;

/// A struct, class or function
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructHandle<'a> {
    object: ObjectHandle<'a>,
}

impl<'a> StructHandle<'a> {
    pub fn from_address(target: Target<'a>, address: usize) -> Option<Self> {
        ObjectHandle::from_address(target, address).map(StructHandle::from_object)
    }

    pub(crate) fn from_object(object: ObjectHandle<'a>) -> Self {
        StructHandle { object }
    }

    pub fn object(&self) -> ObjectHandle<'a> {
        self.object
    }

    pub fn super_struct(&self) -> Option<StructHandle<'a>> {
        let target = self.target();
        let offset = target.offsets().ustruct.super_struct;
        StructHandle::from_address(target, target.read_ptr_at(self.address(), offset))
    }

    /// Ancestors, nearest first, excluding `self`.
    ///
    /// Stops at the first repeated address, so a self-referential super
    /// has no ancestors.
    pub fn super_chain(&self) -> Vec<StructHandle<'a>> {
        let mut visited = HashSet::from([self.address()]);
        let mut chain = Vec::new();
        let mut current = self.super_struct();
        while let Some(parent) = current {
            if !visited.insert(parent.address()) {
                break;
            }
            if chain.len() >= MAX_SUPER_DEPTH {
                tracing::warn!(
                    "{}",
                    Error::ChainOverrun {
                        chain: "super",
                        limit: MAX_SUPER_DEPTH
                    }
                );
                break;
            }
            chain.push(parent);
            current = parent.super_struct();
        }
        chain
    }

    /// Reflexive, transitive subtype test
    pub fn is_child_of(&self, other: &StructHandle<'_>) -> bool {
        self.address() == other.address()
            || self
                .super_chain()
                .iter()
                .any(|parent| parent.address() == other.address())
    }

    /// `is_child_of` by type name
    pub fn is_child_of_named(&self, name: &str) -> bool {
        self.name() == name || self.super_chain().iter().any(|parent| parent.name() == name)
    }

    /// PropertiesSize
    pub fn size(&self) -> i32 {
        let target = self.target();
        target.read_at(self.address(), target.offsets().ustruct.size)
    }

    /// UField children (functions, and properties in the UProperty model)
    pub fn children(&self) -> impl Iterator<Item = ObjectHandle<'a>> + 'a {
        let target = self.target();
        let next = target.offsets().ufield.next;
        let first = target.read_ptr_at(self.address(), target.offsets().ustruct.children);
        LinkedChain::new(first, MAX_FIELD_CHAIN, "children", move |node| {
            target.read_ptr_at(node, next)
        })
        .filter_map(move |address| ObjectHandle::from_address(target, address))
    }

    /// First UField child named `name`
    pub fn find_child(&self, name: &str) -> Option<ObjectHandle<'a>> {
        self.children().find(|child| child.name() == name)
    }

    /// Own properties through the active property model, declaration order
    pub fn properties(&self) -> Box<dyn Iterator<Item = BoxedProperty<'a>> + 'a> {
        child_properties(self)
    }

    /// First own property named `name`
    pub fn find_child_prop(&self, name: &str) -> Option<BoxedProperty<'a>> {
        self.properties().find(|property| property.name() == name)
    }

    /// Own functions
    pub fn functions(&self) -> impl Iterator<Item = FunctionHandle<'a>> + 'a {
        self.children()
            .filter(|child| child.is_a_named(FUNCTION_CLASS))
            .map(|child| FunctionHandle::from_struct(child.as_struct()))
    }
}

impl<'a> Deref for StructHandle<'a> {
    type Target = ObjectHandle<'a>;

    fn deref(&self) -> &Self::Target {
        &self.object
    }
}

impl fmt::Debug for StructHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StructHandle(0x{:X})", self.address())
    }
}

/// A UFunction
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FunctionHandle<'a> {
    inner: StructHandle<'a>,
}

impl<'a> FunctionHandle<'a> {
    pub fn from_address(target: Target<'a>, address: usize) -> Option<Self> {
        StructHandle::from_address(target, address).map(FunctionHandle::from_struct)
    }

    pub(crate) fn from_struct(inner: StructHandle<'a>) -> Self {
        FunctionHandle { inner }
    }

    pub fn function_flags(&self) -> FunctionFlags {
        let target = self.target();
        FunctionFlags::from_bits_retain(target.read_at(self.address(), target.offsets().ufunction.flags))
    }

    pub fn num_params(&self) -> u8 {
        let target = self.target();
        target.read_at(self.address(), target.offsets().ufunction.num_params)
    }

    pub fn param_size(&self) -> u16 {
        let target = self.target();
        target.read_at(self.address(), target.offsets().ufunction.param_size)
    }

    /// Native entry point
    pub fn func(&self) -> usize {
        let target = self.target();
        target.read_ptr_at(self.address(), target.offsets().ufunction.func)
    }

    /// e.g. `"FINAL|NATIVE|PUBLIC"`
    pub fn flags_string(&self) -> String {
        self.function_flags().describe()
    }
}

impl<'a> Deref for FunctionHandle<'a> {
    type Target = StructHandle<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl fmt::Debug for FunctionHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionHandle(0x{:X})", self.address())
    }
}
