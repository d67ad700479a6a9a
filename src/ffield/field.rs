//! FField / FFieldClass / FProperty handles

use std::fmt;

use crate::backend::{BoxedProperty, Property, Target};
use crate::common::ObjectFlags;
use crate::constants::MAX_SUPER_DEPTH;
use crate::objects::LinkedChain;
use crate::offsets::{FFieldLayout, PropertyModel, PropertyOffsets};
use crate::type_info::{classify, TypeInfo};

/// Identity of an FField (what a UClass is to a UObject)
#[derive(Clone, Copy)]
pub struct FFieldClassHandle<'a> {
    target: Target<'a>,
    address: usize,
    layout: &'a FFieldLayout,
}

impl<'a> FFieldClassHandle<'a> {
    pub fn new(target: Target<'a>, address: usize, layout: &'a FFieldLayout) -> Option<Self> {
        (address != 0).then_some(FFieldClassHandle {
            target,
            address,
            layout,
        })
    }

    pub fn address(&self) -> usize {
        self.address
    }

    pub fn name(&self) -> String {
        self.target
            .read_name_at(self.address, self.layout.ffield_class.name)
            .unwrap_or_default()
    }

    pub fn super_class(&self) -> Option<FFieldClassHandle<'a>> {
        let address = self
            .target
            .read_ptr_at(self.address, self.layout.ffield_class.super_class);
        FFieldClassHandle::new(self.target, address, self.layout)
    }

    /// This class and its ancestors by name
    pub fn is_child_of_named(&self, name: &str) -> bool {
        let target = self.target;
        let super_class = self.layout.ffield_class.super_class;
        LinkedChain::new(self.address, MAX_SUPER_DEPTH, "field class super", |node| {
            target.read_ptr_at(node, super_class)
        })
        .filter_map(|address| FFieldClassHandle::new(target, address, self.layout))
        .any(|class| class.name() == name)
    }
}

impl fmt::Debug for FFieldClassHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FFieldClassHandle(0x{:X})", self.address)
    }
}

/// A node of a `ChildProperties` list
#[derive(Clone, Copy)]
pub struct FFieldHandle<'a> {
    target: Target<'a>,
    address: usize,
    layout: &'a FFieldLayout,
}

impl<'a> FFieldHandle<'a> {
    pub fn new(target: Target<'a>, address: usize, layout: &'a FFieldLayout) -> Option<Self> {
        (address != 0).then_some(FFieldHandle {
            target,
            address,
            layout,
        })
    }

    pub fn address(&self) -> usize {
        self.address
    }

    pub fn name(&self) -> String {
        self.target
            .read_name_at(self.address, self.layout.ffield.name)
            .unwrap_or_default()
    }

    pub fn class(&self) -> Option<FFieldClassHandle<'a>> {
        let address = self.target.read_ptr_at(self.address, self.layout.ffield.class);
        FFieldClassHandle::new(self.target, address, self.layout)
    }

    pub fn class_name(&self) -> String {
        self.class().map(|class| class.name()).unwrap_or_default()
    }

    pub fn flags(&self) -> ObjectFlags {
        ObjectFlags::from_bits_retain(self.target.read_at(self.address, self.layout.ffield.flags))
    }

    pub fn next(&self) -> Option<FFieldHandle<'a>> {
        let address = self.target.read_ptr_at(self.address, self.layout.ffield.next);
        FFieldHandle::new(self.target, address, self.layout)
    }
}

impl fmt::Debug for FFieldHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FFieldHandle(0x{:X})", self.address)
    }
}

/// An FField that is a property
#[derive(Debug, Clone, Copy)]
pub struct FPropertyHandle<'a> {
    target: Target<'a>,
    address: usize,
    layout: &'a FFieldLayout,
}

impl<'a> FPropertyHandle<'a> {
    pub fn new(target: Target<'a>, address: usize, layout: &'a FFieldLayout) -> Self {
        FPropertyHandle {
            target,
            address,
            layout,
        }
    }

    pub fn field(&self) -> Option<FFieldHandle<'a>> {
        FFieldHandle::new(self.target, self.address, self.layout)
    }
}

impl<'a> Property<'a> for FPropertyHandle<'a> {
    fn address(&self) -> usize {
        self.address
    }

    fn target(&self) -> Target<'a> {
        self.target
    }

    fn model(&self) -> PropertyModel {
        PropertyModel::FField
    }

    fn layout(&self) -> &'a PropertyOffsets {
        &self.layout.fproperty
    }

    fn name(&self) -> String {
        self.field().map(|field| field.name()).unwrap_or_default()
    }

    fn class_name(&self) -> String {
        self.field().map(|field| field.class_name()).unwrap_or_default()
    }

    fn next(&self) -> Option<BoxedProperty<'a>> {
        let next = self.field()?.next()?;
        self.sub_property(next.address())
    }

    fn sub_property(&self, address: usize) -> Option<BoxedProperty<'a>> {
        (address != 0).then(|| Box::new(FPropertyHandle::new(self.target, address, self.layout)) as BoxedProperty<'a>)
    }

    fn type_info(&self) -> TypeInfo {
        classify(self)
    }

    fn field_path_class(&self) -> Option<String> {
        FFieldClassHandle::new(self.target, self.payload(0), self.layout).map(|class| class.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::property_at;
    use crate::common::PropertyKind;
    use crate::offsets::{PropertyLayout, UeOffsets};
    use crate::synthetic::SyntheticImage;

    #[test]
    fn test_field_identity() {
        let mut image = SyntheticImage::new(UeOffsets::ue4_25());
        let package = image.package("/Script/Test");
        let class = image.class("Holder", 0, package);
        let flag = image.property(class, "bEnabled", "BoolProperty", 4, 1);
        image.set_bool(flag, 1, 0, 0x01, 0x01);
        let count = image.property(class, "Count", "IntProperty", 8, 4);
        image.link_properties(class, &[flag, count]);
        let image = image.finish();
        let target = image.target();
        let layout = match &target.offsets().properties {
            PropertyLayout::FField(layout) => layout,
            PropertyLayout::UProperty(_) => unreachable!(),
        };

        let field = FFieldHandle::new(target, flag, layout).unwrap();
        assert_eq!(field.name(), "bEnabled");
        let field_class = field.class().unwrap();
        assert_eq!(field_class.name(), "BoolProperty");
        assert!(field_class.is_child_of_named("Property"));
        assert!(!field_class.is_child_of_named("ObjectProperty"));
        assert_eq!(field.next().map(|next| next.address()), Some(count));

        let flag = property_at(target, flag).unwrap();
        assert_eq!(flag.kind(), PropertyKind::Bool);
        assert_eq!(flag.field_mask(), 0x01);
        assert_eq!(flag.bool_info().byte_offset, 0);
        assert_eq!(flag.next().map(|next| next.name()).as_deref(), Some("Count"));
    }

    #[test]
    fn test_field_path_class() {
        let mut image = SyntheticImage::new(UeOffsets::ue4_25());
        let package = image.package("/Script/Test");
        let class = image.class("Holder", 0, package);
        let path = image.property(class, "Source", "FieldPathProperty", 0, 0x20);
        let struct_property_class = image.field_class("StructProperty");
        image.set_payload(path, 0, struct_property_class);
        let image = image.finish();

        let path = property_at(image.target(), path).unwrap();
        assert_eq!(path.field_path_class().as_deref(), Some("StructProperty"));
        assert_eq!(path.type_info().type_name, "struct TFieldPath<FStructProperty>");
    }
}
