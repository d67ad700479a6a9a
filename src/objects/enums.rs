//! UEnum handle

use std::fmt;
use std::ops::Deref;

use crate::backend::Target;
use crate::constants::MAX_ENUM_ENTRIES;
use crate::containers::ArrayHeader;

use super::ObjectHandle;

/// An enum: ordered (name, value) pairs
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct EnumHandle<'a> {
    object: ObjectHandle<'a>,
}

impl<'a> EnumHandle<'a> {
    pub fn from_address(target: Target<'a>, address: usize) -> Option<Self> {
        ObjectHandle::from_address(target, address).map(EnumHandle::from_object)
    }

    pub(crate) fn from_object(object: ObjectHandle<'a>) -> Self {
        EnumHandle { object }
    }

    pub fn object(&self) -> ObjectHandle<'a> {
        self.object
    }

    /// Entries as stored, names still qualified (`EFoo::Bar`) where the engine qualifies them
    pub fn raw_names(&self) -> Vec<(String, i64)> {
        let target = self.target();
        let offsets = target.offsets();
        let header = match Target::field_address(self.address(), offsets.uenum.names) {
            Ok(names) => ArrayHeader::read(target, names),
            Err(err) => {
                tracing::trace!("{}", err);
                return Vec::new();
            }
        };
        let count = header.num();
        if count > MAX_ENUM_ENTRIES {
            tracing::debug!("Enum {} reports {} entries, skipping", self.name(), count);
            return Vec::new();
        }
        (0..count)
            .filter_map(|i| header.element_address(i, offsets.uenum.entry_size))
            .map(|entry| {
                let name = target.read_name(entry).unwrap_or_default();
                let value: i64 = target.read_at(entry, offsets.fname.size);
                (name, value)
            })
            .collect()
    }

    /// Entries with the `EFoo::` qualifier stripped
    pub fn names(&self) -> Vec<(String, i64)> {
        self.raw_names()
            .into_iter()
            .map(|(name, value)| match name.rsplit_once("::") {
                Some((_, short)) => (short.to_string(), value),
                None => (name, value),
            })
            .collect()
    }

    /// Smallest integer type holding every value; the generated `_MAX` entry is ignored
    pub fn underlying_type(&self) -> &'static str {
        let values: Vec<i64> = self
            .names()
            .into_iter()
            .filter(|(name, _)| !name.ends_with("_MAX"))
            .map(|(_, value)| value)
            .collect();
        let min = values.iter().copied().min().unwrap_or(0);
        let max = values.iter().copied().max().unwrap_or(0);

        if min >= 0 && max <= u8::MAX as i64 {
            "uint8_t"
        } else if min >= i32::MIN as i64 && max <= i32::MAX as i64 {
            "int32_t"
        } else {
            "int64_t"
        }
    }
}

impl<'a> Deref for EnumHandle<'a> {
    type Target = ObjectHandle<'a>;

    fn deref(&self) -> &Self::Target {
        &self.object
    }
}

impl fmt::Debug for EnumHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumHandle(0x{:X})", self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offsets::UeOffsets;
    use crate::synthetic::SyntheticImage;

    #[test]
    fn test_names_and_values() {
        let mut image = SyntheticImage::new(UeOffsets::ue4_22());
        let package = image.package("/Script/Engine");
        let mode = image.enumeration("ECollisionMode", package);
        image.set_enum_names(
            mode,
            &[
                ("ECollisionMode::None", 0),
                ("ECollisionMode::Query", 1),
                ("ECollisionMode::Physics", 2),
                ("ECollisionMode::ECollisionMode_MAX", 3),
            ],
        );
        let image = image.finish();
        let mode = EnumHandle::from_address(image.target(), mode).unwrap();

        assert_eq!(mode.raw_names()[1].0, "ECollisionMode::Query");
        let names = mode.names();
        assert_eq!(names.len(), 4);
        assert_eq!(names[2], ("Physics".to_string(), 2));
        assert_eq!(mode.underlying_type(), "uint8_t");
        assert_eq!(mode.cpp_name(), "ECollisionMode");
    }

    #[test]
    fn test_underlying_type_widens() {
        let mut image = SyntheticImage::new(UeOffsets::ue4_25());
        let package = image.package("/Script/Test");
        let wide = image.enumeration("EWide", package);
        image.set_enum_names(wide, &[("Low", -1), ("High", 300)]);
        let huge = image.enumeration("EHuge", package);
        image.set_enum_names(huge, &[("Big", 1 << 40)]);
        let empty = image.enumeration("EEmpty", package);
        let image = image.finish();
        let target = image.target();

        assert_eq!(EnumHandle::from_address(target, wide).unwrap().underlying_type(), "int32_t");
        assert_eq!(EnumHandle::from_address(target, huge).unwrap().underlying_type(), "int64_t");
        let empty = EnumHandle::from_address(target, empty).unwrap();
        assert!(empty.names().is_empty());
        assert_eq!(empty.underlying_type(), "uint8_t");
    }
}
