//! Property backend selection
//!
//! The model is decided once per target from the profile; every handle
//! produced here, and every sub-property those handles produce, comes from
//! the same backend.

use crate::constants::{MAX_FIELD_CHAIN, PROPERTY_CLASS};
use crate::ffield::FPropertyHandle;
use crate::objects::{LinkedChain, StructHandle};
use crate::offsets::PropertyLayout;
use crate::uproperty::UPropertyHandle;

use super::{BoxedProperty, Target};

/// Wrap a property address with the active backend. Null yields `None`.
pub fn property_at<'a>(target: Target<'a>, address: usize) -> Option<BoxedProperty<'a>> {
    if address == 0 {
        return None;
    }
    let property: BoxedProperty<'a> = match &target.offsets().properties {
        PropertyLayout::UProperty(layout) => Box::new(UPropertyHandle::new(target, address, &layout.uproperty)),
        PropertyLayout::FField(layout) => Box::new(FPropertyHandle::new(target, address, layout)),
    };
    Some(property)
}

/// Own properties of `owner`, in declaration order
pub fn child_properties<'a>(owner: &StructHandle<'a>) -> Box<dyn Iterator<Item = BoxedProperty<'a>> + 'a> {
    let target = owner.target();
    match &target.offsets().properties {
        PropertyLayout::UProperty(layout) => {
            // Children mixes functions and properties
            let properties = owner
                .children()
                .filter(|child| child.is_a_named(PROPERTY_CLASS))
                .map(move |child| {
                    Box::new(UPropertyHandle::new(target, child.address(), &layout.uproperty))
                        as BoxedProperty<'a>
                });
            Box::new(properties)
        }
        PropertyLayout::FField(layout) => {
            let first = target.read_ptr_at(owner.address(), layout.child_properties);
            let next = layout.ffield.next;
            let properties = LinkedChain::new(first, MAX_FIELD_CHAIN, "child properties", move |node| {
                target.read_ptr_at(node, next)
            })
            .map(move |address| Box::new(FPropertyHandle::new(target, address, layout)) as BoxedProperty<'a>);
            Box::new(properties)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offsets::{PropertyModel, UeOffsets};
    use crate::synthetic::SyntheticImage;

    fn names_of(offsets: UeOffsets) -> (PropertyModel, Vec<String>) {
        let model = offsets.property_model();
        let mut image = SyntheticImage::new(offsets);
        let package = image.package("/Script/Test");
        let class = image.class("Holder", 0, package);
        let a = image.property(class, "A", "IntProperty", 0, 4);
        let b = image.property(class, "B", "FloatProperty", 4, 4);
        image.link_properties(class, &[a, b]);
        let image = image.finish();
        let class = StructHandle::from_address(image.target(), class).unwrap();
        let names = child_properties(&class).map(|p| {
            assert_eq!(p.model(), model);
            p.name()
        });
        (model, names.collect())
    }

    #[test]
    fn test_both_models_list_in_order() {
        for offsets in [UeOffsets::ue4_22(), UeOffsets::ue4_25()] {
            let (_, names) = names_of(offsets);
            assert_eq!(names, vec!["A", "B"]);
        }
    }

    #[test]
    fn test_null_property() {
        let offsets = UeOffsets::ue4_25();
        let image = SyntheticImage::new(offsets).finish();
        assert!(property_at(image.target(), 0).is_none());
    }
}
