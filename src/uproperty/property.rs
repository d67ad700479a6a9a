//! UProperty backend

use crate::backend::{BoxedProperty, Property, Target};
use crate::constants::{MAX_FIELD_CHAIN, PROPERTY_CLASS};
use crate::objects::{LinkedChain, ObjectHandle};
use crate::offsets::{PropertyModel, PropertyOffsets};
use crate::type_info::{classify, TypeInfo};

/// A property that is a full engine object
#[derive(Debug, Clone, Copy)]
pub struct UPropertyHandle<'a> {
    target: Target<'a>,
    address: usize,
    layout: &'a PropertyOffsets,
}

impl<'a> UPropertyHandle<'a> {
    pub fn new(target: Target<'a>, address: usize, layout: &'a PropertyOffsets) -> Self {
        UPropertyHandle {
            target,
            address,
            layout,
        }
    }

    /// The property as a plain object (outer, flags, full name)
    pub fn object(&self) -> Option<ObjectHandle<'a>> {
        ObjectHandle::from_address(self.target, self.address)
    }
}

impl<'a> Property<'a> for UPropertyHandle<'a> {
    fn address(&self) -> usize {
        self.address
    }

    fn target(&self) -> Target<'a> {
        self.target
    }

    fn model(&self) -> PropertyModel {
        PropertyModel::UProperty
    }

    fn layout(&self) -> &'a PropertyOffsets {
        self.layout
    }

    fn name(&self) -> String {
        self.object().map(|object| object.name()).unwrap_or_default()
    }

    fn class_name(&self) -> String {
        self.object().map(|object| object.class_name()).unwrap_or_default()
    }

    // Functions share the UField list; skip to the next property
    fn next(&self) -> Option<BoxedProperty<'a>> {
        let target = self.target;
        let next = target.offsets().ufield.next;
        let first = target.read_ptr_at(self.address, next);
        LinkedChain::new(first, MAX_FIELD_CHAIN, "next property", |node| target.read_ptr_at(node, next))
            .filter_map(|address| ObjectHandle::from_address(target, address))
            .find(|object| object.is_a_named(PROPERTY_CLASS))
            .and_then(|object| self.sub_property(object.address()))
    }

    fn sub_property(&self, address: usize) -> Option<BoxedProperty<'a>> {
        (address != 0).then(|| Box::new(UPropertyHandle::new(self.target, address, self.layout)) as BoxedProperty<'a>)
    }

    fn type_info(&self) -> TypeInfo {
        classify(self)
    }
}
