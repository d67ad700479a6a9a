//! Property classification and type rendering
//!
//! Both property backends funnel into `classify`, so a UProperty and an
//! FProperty describing the same field render identically.

use serde::Serialize;

use crate::backend::Property;
use crate::common::PropertyKind;
use crate::constants::MAX_TYPE_NESTING;

/// Kind plus the C++ spelling of the property's type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TypeInfo {
    pub kind: PropertyKind,
    pub type_name: String,
}

impl TypeInfo {
    fn unknown(raw: String) -> Self {
        TypeInfo {
            kind: PropertyKind::Unknown,
            type_name: raw,
        }
    }
}

/// Packed bool description stored after the base property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BoolInfo {
    pub field_size: u8,
    pub byte_offset: u8,
    pub byte_mask: u8,
    pub field_mask: u8,
}

impl BoolInfo {
    /// Native bools use the whole byte
    pub fn is_bitfield(&self) -> bool {
        self.field_mask != 0xFF
    }

    /// Mask as a C++ literal for bit-test generation, e.g. `0x01`
    pub fn mask_literal(&self) -> String {
        format!("0x{:02X}", self.field_mask)
    }
}

/// Classify a property and render its type
pub fn classify<'a>(property: &(dyn Property<'a> + '_)) -> TypeInfo {
    classify_nested(property, 0)
}

fn classify_nested<'a>(property: &(dyn Property<'a> + '_), depth: usize) -> TypeInfo {
    if depth > MAX_TYPE_NESTING {
        tracing::debug!("Type nesting bound hit at {:#x}", property.address());
        return TypeInfo::unknown(property.class_name());
    }

    let kind = property.kind();
    if let Some(fixed) = kind.fixed_type_name() {
        return TypeInfo {
            kind,
            type_name: fixed.to_string(),
        };
    }

    let nested = |sub: Option<crate::BoxedProperty<'a>>| -> String {
        match sub {
            Some(sub) => classify_nested(sub.as_ref(), depth + 1).type_name,
            None => "Unknown".to_string(),
        }
    };
    let class_ref = |class: Option<crate::StructHandle<'a>>, fallback: &str| -> String {
        class.map_or_else(|| fallback.to_string(), |class| class.cpp_name())
    };

    let type_name = match kind {
        PropertyKind::Struct => format!(
            "struct {}",
            class_ref(property.property_struct(), "FUnknownStruct")
        ),
        PropertyKind::Object => format!("class {}*", class_ref(property.property_class(), "UObject")),
        PropertyKind::Class => format!("class {}*", class_ref(property.meta_class(), "UClass")),
        PropertyKind::SoftObject => format!(
            "struct TSoftObjectPtr<class {}>",
            class_ref(property.property_class(), "UObject")
        ),
        PropertyKind::WeakObject => format!(
            "struct TWeakObjectPtr<class {}>",
            class_ref(property.property_class(), "UObject")
        ),
        PropertyKind::LazyObject => format!(
            "struct TLazyObjectPtr<class {}>",
            class_ref(property.property_class(), "UObject")
        ),
        PropertyKind::SoftClass => format!(
            "struct TSoftClassPtr<class {}>",
            class_ref(property.meta_class(), "UObject")
        ),
        PropertyKind::Interface => format!(
            "struct TScriptInterface<class {}>",
            class_ref(property.property_class(), "UInterface")
        ),
        PropertyKind::Array => format!("TArray<{}>", nested(property.inner())),
        PropertyKind::Set => format!("TSet<{}>", nested(property.inner())),
        PropertyKind::Map => format!(
            "TMap<{}, {}>",
            nested(property.key_property()),
            nested(property.value_property())
        ),
        PropertyKind::Enum => match property.enum_ref() {
            Some(enumeration) => enumeration.cpp_name(),
            None => match property.underlying() {
                Some(underlying) => classify_nested(underlying.as_ref(), depth + 1).type_name,
                None => "uint8_t".to_string(),
            },
        },
        PropertyKind::Byte => match property.enum_ref() {
            Some(enumeration) => format!("TEnumAsByte<{}>", enumeration.cpp_name()),
            None => "uint8_t".to_string(),
        },
        PropertyKind::FieldPath => match property.field_path_class() {
            Some(field_class) => format!("struct TFieldPath<F{}>", field_class),
            None => "struct TFieldPath<FField>".to_string(),
        },
        _ => return TypeInfo::unknown(property.class_name()),
    };

    TypeInfo { kind, type_name }
}
