pub const SIZE_OF_PTR: usize = 8; // 32 bit targets are not described by the profile model

// Upper bounds for every chain followed through foreign memory.
// super_struct / class().super_struct()
pub const MAX_SUPER_DEPTH: usize = 128;
// outer chain used for package lookup and path names
pub const MAX_OUTER_DEPTH: usize = 64;
// UField::Next / FField::Next
pub const MAX_FIELD_CHAIN: usize = 0x4000;
// nested container properties (TMap<K, TArray<...>>)
pub const MAX_TYPE_NESTING: usize = 16;

// FString longer than this is treated as garbage
pub const MAX_STRING_LEN: i32 = 0x10000;
// enum entries, same reasoning
pub const MAX_ENUM_ENTRIES: i32 = 0x4000;

// Well-known engine class names the classifier and cpp naming rely on.
pub const PACKAGE_CLASS: &str = "Package";
pub const ACTOR_CLASS: &str = "Actor";
pub const PROPERTY_CLASS: &str = "Property";
pub const FUNCTION_CLASS: &str = "Function";
pub const SCRIPT_STRUCT_CLASS: &str = "ScriptStruct";
pub const CLASS_CLASS: &str = "Class";
pub const ENUM_CLASS: &str = "Enum";
pub const USER_DEFINED_ENUM_CLASS: &str = "UserDefinedEnum";
