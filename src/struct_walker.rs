//! Per-type field lists for SDK emission
//!
//! Produces serializable descriptors of classes, structs, functions and enums.
//! Descriptors are plain data: nothing in them points back into the target.

use serde::Serialize;

use crate::backend::BoxedProperty;
use crate::common::PropertyKind;
use crate::constants::{CLASS_CLASS, ENUM_CLASS, SCRIPT_STRUCT_CLASS};
use crate::object_array::ObjectTable;
use crate::objects::{EnumHandle, FunctionHandle, StructHandle};
use crate::Result;

/// Which part of the inheritance chain a property walk covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WalkMode {
    /// Only the struct's own properties
    #[default]
    Own,
    /// Own properties, then each ancestor's, nearest first
    OwnThenInherited,
    /// Root ancestor first, own properties last (memory order)
    InheritedFirst,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    /// Struct that declares the field
    pub owner: String,
    pub kind: PropertyKind,
    pub type_name: String,
    pub offset: i32,
    pub element_size: i32,
    pub array_dim: i32,
    pub flags: u64,
    /// Bit-test mask of packed bools
    pub bit_mask: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub full_name: String,
    pub flags: String,
    pub num_params: u8,
    pub param_size: u16,
    pub func: usize,
    pub params: Vec<FieldDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructDescriptor {
    pub name: String,
    pub cpp_name: String,
    pub full_name: String,
    pub super_name: Option<String>,
    pub size: i32,
    pub fields: Vec<FieldDescriptor>,
    pub functions: Vec<FunctionDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumEntry {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumDescriptor {
    pub name: String,
    pub full_name: String,
    pub underlying_type: String,
    pub entries: Vec<EnumEntry>,
}

/// Everything reflected in one registry scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reflection {
    pub classes: Vec<StructDescriptor>,
    pub structs: Vec<StructDescriptor>,
    pub enums: Vec<EnumDescriptor>,
}

impl Reflection {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Walks types found through an [`ObjectTable`]
pub struct StructWalker<'a> {
    table: ObjectTable<'a>,
}

impl<'a> StructWalker<'a> {
    pub fn new(table: ObjectTable<'a>) -> Self {
        StructWalker { table }
    }

    /// Properties of `owner` in declaration order, extended per `mode`
    pub fn properties(&self, owner: &StructHandle<'a>, mode: WalkMode) -> Vec<BoxedProperty<'a>> {
        let mut structs = vec![*owner];
        match mode {
            WalkMode::Own => {}
            WalkMode::OwnThenInherited => structs.extend(owner.super_chain()),
            WalkMode::InheritedFirst => {
                let mut chain = owner.super_chain();
                chain.reverse();
                chain.push(*owner);
                structs = chain;
            }
        }
        structs.iter().flat_map(|s| s.properties()).collect()
    }

    /// The class' own functions
    pub fn functions(&self, class: &StructHandle<'a>) -> Vec<FunctionHandle<'a>> {
        class.functions().collect()
    }

    pub fn describe_struct(&self, owner: &StructHandle<'a>, mode: WalkMode) -> StructDescriptor {
        let fields = match mode {
            WalkMode::Own => describe_fields(&owner.cpp_name(), owner.properties()),
            _ => {
                let mut structs = vec![*owner];
                structs.extend(owner.super_chain());
                if mode == WalkMode::InheritedFirst {
                    structs.reverse();
                }
                structs
                    .iter()
                    .flat_map(|s| describe_fields(&s.cpp_name(), s.properties()))
                    .collect()
            }
        };

        StructDescriptor {
            name: owner.name(),
            cpp_name: owner.cpp_name(),
            full_name: owner.full_name(),
            super_name: owner.super_struct().map(|s| s.cpp_name()),
            size: owner.size(),
            fields,
            functions: self
                .functions(owner)
                .iter()
                .map(describe_function)
                .collect(),
        }
    }

    pub fn describe_enum(&self, enumeration: &EnumHandle<'a>) -> EnumDescriptor {
        EnumDescriptor {
            name: enumeration.cpp_name(),
            full_name: enumeration.full_name(),
            underlying_type: enumeration.underlying_type().to_string(),
            entries: enumeration
                .names()
                .into_iter()
                .map(|(name, value)| EnumEntry { name, value })
                .collect(),
        }
    }

    /// Describe every class, script struct and enum in the registry
    pub fn collect(&self) -> Result<Reflection> {
        let mut reflection = Reflection::default();
        let mut skipped = 0usize;

        for object in self.table.iter()? {
            let Some(class) = object.class() else {
                continue;
            };
            let is_class = class.is_child_of_named(CLASS_CLASS);
            let is_struct = !is_class && class.is_child_of_named(SCRIPT_STRUCT_CLASS);
            let is_enum = !is_class && !is_struct && class.is_child_of_named(ENUM_CLASS);
            if !(is_class || is_struct || is_enum) {
                continue;
            }

            if object.name().is_empty() {
                tracing::debug!("Skipping unnamed type at 0x{:X}", object.address());
                skipped += 1;
                continue;
            }

            if is_class {
                reflection
                    .classes
                    .push(self.describe_struct(&object.as_struct(), WalkMode::Own));
            } else if is_struct {
                reflection
                    .structs
                    .push(self.describe_struct(&object.as_struct(), WalkMode::Own));
            } else {
                reflection.enums.push(self.describe_enum(&object.as_enum()));
            }
        }

        tracing::info!(
            "Collected {} classes, {} structs, {} enums ({} skipped)",
            reflection.classes.len(),
            reflection.structs.len(),
            reflection.enums.len(),
            skipped
        );
        Ok(reflection)
    }
}

fn describe_fields<'a>(owner: &str, properties: impl Iterator<Item = BoxedProperty<'a>>) -> Vec<FieldDescriptor> {
    properties
        .map(|property| describe_field(owner, property))
        .collect()
}

fn describe_field(owner: &str, property: BoxedProperty<'_>) -> FieldDescriptor {
    let info = property.type_info();
    let mut offset = property.offset();
    let mut bit_mask = None;
    if info.kind == PropertyKind::Bool {
        offset = offset.saturating_add(property.bool_info().byte_offset as i32);
        bit_mask = Some(property.field_mask()).filter(|&mask| mask != 0);
    }

    FieldDescriptor {
        name: property.name(),
        owner: owner.to_string(),
        kind: info.kind,
        type_name: info.type_name,
        offset,
        element_size: property.element_size(),
        array_dim: property.array_dim(),
        flags: property.property_flags().bits(),
        bit_mask,
    }
}

fn describe_function(function: &FunctionHandle<'_>) -> FunctionDescriptor {
    FunctionDescriptor {
        name: function.name(),
        full_name: function.full_name(),
        flags: function.flags_string(),
        num_params: function.num_params(),
        param_size: function.param_size(),
        func: function.func(),
        params: describe_fields(&function.name(), function.properties()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::FunctionFlags;
    use crate::offsets::UeOffsets;
    use crate::synthetic::{SyntheticImage, SyntheticTarget};

    struct Fixture {
        image: SyntheticTarget,
        base: usize,
        derived: usize,
    }

    fn fixture(offsets: UeOffsets) -> Fixture {
        let mut image = SyntheticImage::new(offsets);
        let package = image.package("/Script/Game");
        let base = image.class("Base", 0, package);
        let id = image.property(base, "Id", "IntProperty", 0x28, 4);
        image.link_properties(base, &[id]);
        image.set_struct_size(base, 0x30);

        let derived = image.class("Derived", base, package);
        let speed = image.property(derived, "Speed", "FloatProperty", 0x30, 4);
        let hidden = image.property(derived, "bHidden", "BoolProperty", 0x34, 1);
        image.set_bool(hidden, 1, 0, 0x02, 0x02);
        image.link_properties(derived, &[speed, hidden]);
        image.set_struct_size(derived, 0x38);

        Fixture {
            image: image.finish(),
            base,
            derived,
        }
    }

    fn names(properties: &[BoxedProperty<'_>]) -> Vec<String> {
        properties.iter().map(|p| p.name()).collect()
    }

    #[test]
    fn test_walk_modes() {
        for offsets in [UeOffsets::ue4_22(), UeOffsets::ue4_25()] {
            let fixture = fixture(offsets);
            let target = fixture.image.target();
            let walker = StructWalker::new(ObjectTable::new(target));
            let derived = StructHandle::from_address(target, fixture.derived).unwrap();

            assert_eq!(names(&walker.properties(&derived, WalkMode::Own)), vec!["Speed", "bHidden"]);
            assert_eq!(
                names(&walker.properties(&derived, WalkMode::OwnThenInherited)),
                vec!["Speed", "bHidden", "Id"]
            );
            assert_eq!(
                names(&walker.properties(&derived, WalkMode::InheritedFirst)),
                vec!["Id", "Speed", "bHidden"]
            );
        }
    }

    #[test]
    fn test_describe_struct() {
        let fixture = fixture(UeOffsets::ue4_25());
        let target = fixture.image.target();
        let walker = StructWalker::new(ObjectTable::new(target));
        let derived = StructHandle::from_address(target, fixture.derived).unwrap();

        let descriptor = walker.describe_struct(&derived, WalkMode::InheritedFirst);
        assert_eq!(descriptor.cpp_name, "UDerived");
        assert_eq!(descriptor.super_name.as_deref(), Some("UBase"));
        assert_eq!(descriptor.size, 0x38);
        assert_eq!(descriptor.fields.len(), 3);
        assert_eq!(descriptor.fields[0].owner, "UBase");

        let hidden = &descriptor.fields[2];
        assert_eq!(hidden.kind, PropertyKind::Bool);
        assert_eq!(hidden.type_name, "bool");
        assert_eq!(hidden.offset, 0x34);
        assert_eq!(hidden.bit_mask, Some(0x02));
        assert_eq!(descriptor.fields[1].bit_mask, None);
    }

    #[test]
    fn test_bool_offset_saturates() {
        let mut image = SyntheticImage::new(UeOffsets::ue4_25());
        let package = image.package("/Script/Game");
        let class = image.class("Flags", 0, package);
        let flag = image.property(class, "bLast", "BoolProperty", i32::MAX, 1);
        image.set_bool(flag, 1, 3, 0x08, 0x08);
        image.link_properties(class, &[flag]);
        let image = image.finish();
        let target = image.target();
        let walker = StructWalker::new(ObjectTable::new(target));
        let class = StructHandle::from_address(target, class).unwrap();

        let descriptor = walker.describe_struct(&class, WalkMode::Own);
        assert_eq!(descriptor.fields[0].offset, i32::MAX);
        assert_eq!(descriptor.fields[0].bit_mask, Some(0x08));
    }

    #[test]
    fn test_functions_with_params() {
        let mut image = SyntheticImage::new(UeOffsets::ue4_22());
        let package = image.package("/Script/Game");
        let class = image.class("Weapon", 0, package);
        let fire = image.function(class, "Fire", FunctionFlags::NATIVE | FunctionFlags::PUBLIC);
        image.set_function_signature(fire, 1, 4, 0x1400_0000);
        let power = image.property(fire, "Power", "FloatProperty", 0, 4);
        image.link_children(fire, &[power]);
        image.link_children(class, &[fire]);
        let image = image.finish();
        let target = image.target();
        let walker = StructWalker::new(ObjectTable::new(target));
        let class = StructHandle::from_address(target, class).unwrap();

        let descriptor = walker.describe_struct(&class, WalkMode::Own);
        assert!(descriptor.fields.is_empty());
        assert_eq!(descriptor.functions.len(), 1);
        let fire = &descriptor.functions[0];
        assert_eq!(fire.flags, "NATIVE|PUBLIC");
        assert_eq!(fire.params.len(), 1);
        assert_eq!(fire.params[0].type_name, "float");
        assert_eq!(fire.params[0].owner, "Fire");
        assert_eq!(fire.full_name, "Function /Script/Game.Weapon:Fire");
    }

    #[test]
    fn test_collect() {
        let fixture = fixture(UeOffsets::ue4_22());
        let target = fixture.image.target();
        let walker = StructWalker::new(ObjectTable::new(target));

        let reflection = walker.collect().unwrap();
        let classes: Vec<&str> = reflection.classes.iter().map(|c| c.name.as_str()).collect();
        assert!(classes.contains(&"Base"));
        assert!(classes.contains(&"Derived"));
        assert!(reflection.structs.is_empty());

        let base = StructHandle::from_address(target, fixture.base).unwrap();
        let base = reflection
            .classes
            .iter()
            .find(|c| c.full_name == base.full_name())
            .unwrap();
        assert_eq!(base.fields.len(), 1);
        assert_eq!(base.fields[0].type_name, "int32_t");

        let json = reflection.to_json().unwrap();
        assert!(json.contains("\"type_name\": \"float\""));
    }
}
