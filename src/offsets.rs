//! Engine structure offsets
//!
//! Every field access goes through these offsets. They vary between engine
//! builds, so they are loaded from a build profile (JSON) instead of being
//! compiled in. Offsets may be written as integers or as `"0x.."` strings.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::{Error, Result};

/// Which property metadata generation the target uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyModel {
    /// Properties are objects chained through `UField::Next` from `UStruct::Children`
    UProperty,
    /// Properties are `FField` nodes chained from `UStruct::ChildProperties`
    FField,
}

/// Global object registry (FUObjectArray) layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectArrayOffsets {
    /// Absolute address of the registry in the target
    pub address: usize,
    /// Offset of the items (or chunk table) pointer
    pub objects: usize,
    /// Offset of the element count
    pub num_elements: usize,
    /// Items per chunk for chunked registries; absent for a flat array
    #[serde(default)]
    pub elements_per_chunk: Option<usize>,
    /// sizeof(FUObjectItem)
    pub item_size: usize,
    /// Object pointer inside an item
    pub item_object: usize,
    /// Internal flags inside an item
    pub item_flags: usize,
}

/// FName layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FNameOffsets {
    pub comparison_index: usize,
    /// Absent on builds that keep the number outside the name
    #[serde(default)]
    pub number: Option<usize>,
    pub size: usize,
}

/// UObject header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UObjectOffsets {
    pub flags: usize,
    pub index: usize,
    pub class: usize,
    pub name: usize,
    pub outer: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UFieldOffsets {
    pub next: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UStructOffsets {
    pub super_struct: usize,
    pub children: usize,
    /// PropertiesSize
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UEnumOffsets {
    /// TArray<TPair<FName, int64>>
    pub names: usize,
    /// Stride of one names entry
    pub entry_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UFunctionOffsets {
    pub flags: usize,
    pub num_params: usize,
    pub param_size: usize,
    pub func: usize,
}

/// Property layout shared by UProperty and FProperty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyOffsets {
    pub array_dim: usize,
    pub element_size: usize,
    pub property_flags: usize,
    /// Offset_Internal
    pub offset: usize,
    /// sizeof the base property; kind payloads start here
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FFieldOffsets {
    pub class: usize,
    pub next: usize,
    pub name: usize,
    pub flags: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FFieldClassOffsets {
    pub name: usize,
    pub super_class: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UPropertyLayout {
    pub uproperty: PropertyOffsets,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FFieldLayout {
    /// UStruct::ChildProperties
    pub child_properties: usize,
    pub ffield: FFieldOffsets,
    pub ffield_class: FFieldClassOffsets,
    pub fproperty: PropertyOffsets,
}

/// Property model toggle together with the offsets only that model needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "property_model")]
pub enum PropertyLayout {
    UProperty(UPropertyLayout),
    FField(FFieldLayout),
}

/// Offsets for one engine build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UeOffsets {
    /// Version identifier
    pub version_name: String,
    /// Join sub-objects of non-package outers with `:` like the engine does
    #[serde(default = "default_subobject_delimiter")]
    pub subobject_delimiter: bool,
    pub object_array: ObjectArrayOffsets,
    pub fname: FNameOffsets,
    pub uobject: UObjectOffsets,
    pub ufield: UFieldOffsets,
    pub ustruct: UStructOffsets,
    pub uenum: UEnumOffsets,
    pub ufunction: UFunctionOffsets,
    #[serde(flatten)]
    pub properties: PropertyLayout,
}

fn default_subobject_delimiter() -> bool {
    true
}

impl UeOffsets {
    /// Typical 64-bit UE 4.22-4.24 layout (UProperty model).
    /// `object_array.address` is left at 0 for the caller to fill in.
    pub fn ue4_22() -> Self {
        UeOffsets {
            version_name: "UE 4.22".to_string(),
            subobject_delimiter: true,
            object_array: ObjectArrayOffsets {
                address: 0,
                objects: 0x10,
                num_elements: 0x24,
                elements_per_chunk: Some(0x10000),
                item_size: 0x18,
                item_object: 0x0,
                item_flags: 0x8,
            },
            fname: FNameOffsets {
                comparison_index: 0x0,
                number: Some(0x4),
                size: 0x8,
            },
            uobject: UObjectOffsets {
                flags: 0x8,
                index: 0xC,
                class: 0x10,
                name: 0x18,
                outer: 0x20,
            },
            ufield: UFieldOffsets { next: 0x28 },
            ustruct: UStructOffsets {
                super_struct: 0x40,
                children: 0x48,
                size: 0x50,
            },
            uenum: UEnumOffsets {
                names: 0x40,
                entry_size: 0x10,
            },
            ufunction: UFunctionOffsets {
                flags: 0x88,
                num_params: 0x8C,
                param_size: 0x8E,
                func: 0xB0,
            },
            properties: PropertyLayout::UProperty(UPropertyLayout {
                uproperty: PropertyOffsets {
                    array_dim: 0x30,
                    element_size: 0x34,
                    property_flags: 0x38,
                    offset: 0x44,
                    size: 0x70,
                },
            }),
        }
    }

    /// Typical 64-bit UE 4.25+ layout (FField model).
    pub fn ue4_25() -> Self {
        UeOffsets {
            version_name: "UE 4.25".to_string(),
            ustruct: UStructOffsets {
                super_struct: 0x40,
                children: 0x48,
                size: 0x58,
            },
            ufunction: UFunctionOffsets {
                flags: 0xB0,
                num_params: 0xB4,
                param_size: 0xB6,
                func: 0xD8,
            },
            properties: PropertyLayout::FField(FFieldLayout {
                child_properties: 0x50,
                ffield: FFieldOffsets {
                    class: 0x8,
                    next: 0x20,
                    name: 0x28,
                    flags: 0x30,
                },
                ffield_class: FFieldClassOffsets {
                    name: 0x0,
                    super_class: 0x20,
                },
                fproperty: PropertyOffsets {
                    array_dim: 0x38,
                    element_size: 0x3C,
                    property_flags: 0x40,
                    offset: 0x4C,
                    size: 0x78,
                },
            }),
            ..Self::ue4_22()
        }
    }

    /// Parse a build profile. Missing required keys are reported by name.
    pub fn from_json_str(profile: &str) -> Result<Self> {
        let mut value: Value = serde_json::from_str(profile)?;
        normalize_hex(&mut value)?;
        let offsets: UeOffsets =
            serde_json::from_value(value).map_err(|e| Error::Profile(e.to_string()))?;
        offsets.validate()?;
        Ok(offsets)
    }

    /// Read and parse a build profile file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Which property model this build uses
    pub fn property_model(&self) -> PropertyModel {
        match self.properties {
            PropertyLayout::UProperty(_) => PropertyModel::UProperty,
            PropertyLayout::FField(_) => PropertyModel::FField,
        }
    }

    /// Offsets of the active property model's base property
    pub fn property(&self) -> &PropertyOffsets {
        match &self.properties {
            PropertyLayout::UProperty(layout) => &layout.uproperty,
            PropertyLayout::FField(layout) => &layout.fproperty,
        }
    }

    /// Reject layouts that would make every read meaningless
    pub fn validate(&self) -> Result<()> {
        if self.object_array.item_size == 0 {
            return Err(Error::Profile("object_array.item_size must be non-zero".into()));
        }
        if self.object_array.elements_per_chunk == Some(0) {
            return Err(Error::Profile(
                "object_array.elements_per_chunk must be non-zero".into(),
            ));
        }
        if self.fname.size == 0 {
            return Err(Error::Profile("fname.size must be non-zero".into()));
        }
        if self.uenum.entry_size < self.fname.size + 8 {
            return Err(Error::Profile(format!(
                "uenum.entry_size 0x{:X} cannot hold a name and a value",
                self.uenum.entry_size
            )));
        }
        if self.property().size == 0 {
            return Err(Error::Profile("property size must be non-zero".into()));
        }
        Ok(())
    }
}

/// Convert `"0x1F"` style strings into integers throughout a profile.
/// `version_name` and `property_model` are the only string-valued keys.
fn normalize_hex(value: &mut Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if key == "version_name" || key == "property_model" {
                    continue;
                }
                normalize_hex(entry)?;
            }
        }
        Value::String(text) => {
            if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                let parsed = u64::from_str_radix(hex, 16)
                    .map_err(|e| Error::Profile(format!("bad hex offset {text:?}: {e}")))?;
                *value = Value::from(parsed);
            }
        }
        _ => {}
    }
    Ok(())
}

static OFFSETS: OnceCell<UeOffsets> = OnceCell::new();

/// Install the process-wide offsets. Fails if already installed.
pub fn initialize(offsets: UeOffsets) -> Result<&'static UeOffsets> {
    offsets.validate()?;
    let name = offsets.version_name.clone();
    OFFSETS.set(offsets).map_err(|_| Error::AlreadyInitialized)?;
    tracing::info!("Offsets installed for {}", name);
    try_get()
}

/// Load a profile file and install it
pub fn initialize_from_file(path: &Path) -> Result<&'static UeOffsets> {
    initialize(UeOffsets::from_file(path)?)
}

/// Installed offsets, or `Error::NotInitialized`
pub fn try_get() -> Result<&'static UeOffsets> {
    OFFSETS.get().ok_or(Error::NotInitialized)
}

/// Installed offsets.
///
/// # Panics
/// Using the reader before a profile is installed is a programming error.
pub fn get() -> &'static UeOffsets {
    match OFFSETS.get() {
        Some(offsets) => offsets,
        None => panic!("ue_reader::offsets::get() called before offsets::initialize()"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE: &str = r#"{
        "version_name": "Test build",
        "property_model": "FField",
        "object_array": {
            "address": "0x7FF600001000",
            "objects": "0x10",
            "num_elements": "0x24",
            "elements_per_chunk": 65536,
            "item_size": 24,
            "item_object": 0,
            "item_flags": 8
        },
        "fname": { "comparison_index": 0, "number": 4, "size": 8 },
        "uobject": { "flags": 8, "index": 12, "class": 16, "name": 24, "outer": 32 },
        "ufield": { "next": "0x28" },
        "ustruct": { "super_struct": "0x40", "children": "0x48", "size": "0x58" },
        "uenum": { "names": "0x40", "entry_size": "0x10" },
        "ufunction": { "flags": "0xB0", "num_params": "0xB4", "param_size": "0xB6", "func": "0xD8" },
        "child_properties": "0x50",
        "ffield": { "class": 8, "next": "0x20", "name": "0x28", "flags": "0x30" },
        "ffield_class": { "name": 0, "super_class": "0x20" },
        "fproperty": {
            "array_dim": "0x38", "element_size": "0x3C", "property_flags": "0x40",
            "offset": "0x4C", "size": "0x78"
        }
    }"#;

    #[test]
    fn test_parse_profile() {
        let offsets = UeOffsets::from_json_str(PROFILE).unwrap();
        assert_eq!(offsets.object_array.address, 0x7FF600001000);
        assert_eq!(offsets.property_model(), PropertyModel::FField);
        assert_eq!(offsets.property().size, 0x78);
        assert!(offsets.subobject_delimiter);
        match &offsets.properties {
            PropertyLayout::FField(layout) => assert_eq!(layout.child_properties, 0x50),
            PropertyLayout::UProperty(_) => panic!("wrong model"),
        }
    }

    #[test]
    fn test_missing_key_fails() {
        let broken = PROFILE.replace(r#""fproperty""#, r#""fproperty_renamed""#);
        let err = UeOffsets::from_json_str(&broken).unwrap_err();
        assert!(matches!(err, Error::Profile(ref msg) if msg.contains("fproperty")), "{err}");
    }

    #[test]
    fn test_bad_hex_fails() {
        let broken = PROFILE.replace(r#""0x7FF600001000""#, r#""0xZZ""#);
        assert!(matches!(UeOffsets::from_json_str(&broken), Err(Error::Profile(_))));
    }

    #[test]
    fn test_presets_validate() {
        UeOffsets::ue4_22().validate().unwrap();
        UeOffsets::ue4_25().validate().unwrap();
        assert_eq!(UeOffsets::ue4_22().property_model(), PropertyModel::UProperty);
        assert_eq!(UeOffsets::ue4_25().property_model(), PropertyModel::FField);
    }

    #[test]
    fn test_profile_roundtrip_through_json() {
        let text = serde_json::to_string(&UeOffsets::ue4_25()).unwrap();
        assert_eq!(UeOffsets::from_json_str(&text).unwrap(), UeOffsets::ue4_25());
    }

    #[test]
    fn test_zero_item_size_rejected() {
        let mut offsets = UeOffsets::ue4_22();
        offsets.object_array.item_size = 0;
        assert!(matches!(offsets.validate(), Err(Error::Profile(_))));
    }

    #[test]
    fn test_global_lifecycle() {
        // The only test touching the global cell.
        assert!(matches!(try_get(), Err(Error::NotInitialized)));
        let installed = initialize(UeOffsets::ue4_22()).unwrap();
        assert_eq!(installed.version_name, "UE 4.22");
        assert_eq!(get().version_name, "UE 4.22");
        assert!(matches!(initialize(UeOffsets::ue4_25()), Err(Error::AlreadyInitialized)));
    }
}
