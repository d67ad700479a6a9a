//! Property kind enumeration shared between the UProperty and FField backends
//!
//! Both metadata generations name their property classes the same way
//! (`IntProperty`, `ArrayProperty`, ...), so one table serves both.

use serde::Serialize;
use std::fmt;

/// Structural classification of a property, derived from its runtime class name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PropertyKind {
    Unknown,
    Struct,
    Object,
    SoftObject,
    WeakObject,
    LazyObject,
    Class,
    SoftClass,
    Interface,
    Float,
    Double,
    Byte,
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt16,
    UInt32,
    UInt64,
    Name,
    Str,
    Text,
    Delegate,
    MulticastDelegate,
    MulticastInlineDelegate,
    MulticastSparseDelegate,
    Set,
    Array,
    Map,
    Enum,
    FieldPath,
}

impl PropertyKind {
    /// Map a runtime class / field-class name to a kind.
    ///
    /// Unrecognized names yield `Unknown`; callers keep the raw name for rendering.
    pub fn from_class_name(name: &str) -> PropertyKind {
        match name {
            "StructProperty" => PropertyKind::Struct,
            "ObjectProperty" | "ObjectPtrProperty" => PropertyKind::Object,
            "SoftObjectProperty" => PropertyKind::SoftObject,
            "WeakObjectProperty" => PropertyKind::WeakObject,
            "LazyObjectProperty" => PropertyKind::LazyObject,
            "ClassProperty" | "ClassPtrProperty" => PropertyKind::Class,
            "SoftClassProperty" => PropertyKind::SoftClass,
            "InterfaceProperty" => PropertyKind::Interface,
            "FloatProperty" => PropertyKind::Float,
            "DoubleProperty" => PropertyKind::Double,
            "ByteProperty" => PropertyKind::Byte,
            "BoolProperty" => PropertyKind::Bool,
            "IntProperty" => PropertyKind::Int,
            "Int8Property" => PropertyKind::Int8,
            "Int16Property" => PropertyKind::Int16,
            "Int32Property" => PropertyKind::Int32,
            "Int64Property" => PropertyKind::Int64,
            "UInt16Property" => PropertyKind::UInt16,
            "UInt32Property" => PropertyKind::UInt32,
            "UInt64Property" => PropertyKind::UInt64,
            "NameProperty" => PropertyKind::Name,
            "StrProperty" => PropertyKind::Str,
            "TextProperty" => PropertyKind::Text,
            "DelegateProperty" => PropertyKind::Delegate,
            "MulticastDelegateProperty" => PropertyKind::MulticastDelegate,
            "MulticastInlineDelegateProperty" => PropertyKind::MulticastInlineDelegate,
            "MulticastSparseDelegateProperty" => PropertyKind::MulticastSparseDelegate,
            "SetProperty" => PropertyKind::Set,
            "ArrayProperty" => PropertyKind::Array,
            "MapProperty" => PropertyKind::Map,
            "EnumProperty" => PropertyKind::Enum,
            "FieldPathProperty" => PropertyKind::FieldPath,
            _ => PropertyKind::Unknown,
        }
    }

    /// Rendered type for kinds that carry no payload
    pub fn fixed_type_name(&self) -> Option<&'static str> {
        let name = match self {
            PropertyKind::Float => "float",
            PropertyKind::Double => "double",
            PropertyKind::Bool => "bool",
            PropertyKind::Int | PropertyKind::Int32 => "int32_t",
            PropertyKind::Int8 => "int8_t",
            PropertyKind::Int16 => "int16_t",
            PropertyKind::Int64 => "int64_t",
            PropertyKind::UInt16 => "uint16_t",
            PropertyKind::UInt32 => "uint32_t",
            PropertyKind::UInt64 => "uint64_t",
            PropertyKind::Name => "struct FName",
            PropertyKind::Str => "struct FString",
            PropertyKind::Text => "struct FText",
            PropertyKind::Delegate => "struct FScriptDelegate",
            PropertyKind::MulticastDelegate | PropertyKind::MulticastInlineDelegate => {
                "struct FScriptMulticastDelegate"
            }
            PropertyKind::MulticastSparseDelegate => "struct FSparseDelegate",
            _ => return None,
        };
        Some(name)
    }

    /// Kinds whose payload is a referenced class
    pub fn is_object_family(&self) -> bool {
        matches!(
            self,
            PropertyKind::Object
                | PropertyKind::SoftObject
                | PropertyKind::WeakObject
                | PropertyKind::LazyObject
                | PropertyKind::Class
                | PropertyKind::SoftClass
                | PropertyKind::Interface
        )
    }

    /// Kinds that wrap one or more sub-properties
    pub fn is_container(&self) -> bool {
        matches!(self, PropertyKind::Array | PropertyKind::Set | PropertyKind::Map)
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names() {
        assert_eq!(PropertyKind::from_class_name("IntProperty"), PropertyKind::Int);
        assert_eq!(PropertyKind::from_class_name("MapProperty"), PropertyKind::Map);
        assert_eq!(PropertyKind::from_class_name("ObjectPtrProperty"), PropertyKind::Object);
        assert_eq!(PropertyKind::from_class_name("ClassPtrProperty"), PropertyKind::Class);
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(PropertyKind::from_class_name("OptionalProperty"), PropertyKind::Unknown);
        assert_eq!(PropertyKind::from_class_name(""), PropertyKind::Unknown);
        assert_eq!(PropertyKind::Unknown.fixed_type_name(), None);
    }

    #[test]
    fn test_fixed_names() {
        assert_eq!(PropertyKind::Int.fixed_type_name(), Some("int32_t"));
        assert_eq!(PropertyKind::Str.fixed_type_name(), Some("struct FString"));
        assert_eq!(PropertyKind::Array.fixed_type_name(), None);
        assert!(PropertyKind::SoftClass.is_object_family());
        assert!(PropertyKind::Map.is_container());
        assert!(!PropertyKind::Struct.is_container());
    }
}
