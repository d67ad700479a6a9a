//! Engine bitmask sets
//!
//! Membership and union tests only. Unknown bits are retained so that
//! flags read from foreign memory round-trip unchanged.

use bitflags::bitflags;

bitflags! {
    /// Per-object flags stored in the object header
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ObjectFlags: u32 {
        const PUBLIC = 0x0000_0001;
        const STANDALONE = 0x0000_0002;
        const MARK_AS_NATIVE = 0x0000_0004;
        const TRANSACTIONAL = 0x0000_0008;
        const CLASS_DEFAULT_OBJECT = 0x0000_0010;
        const ARCHETYPE_OBJECT = 0x0000_0020;
        const TRANSIENT = 0x0000_0040;
        const MARK_AS_ROOT_SET = 0x0000_0080;
        const TAG_GARBAGE_TEMP = 0x0000_0100;
        const NEED_INITIALIZATION = 0x0000_0200;
        const NEED_LOAD = 0x0000_0400;
        const KEEP_FOR_COOKER = 0x0000_0800;
        const NEED_POST_LOAD = 0x0000_1000;
        const NEED_POST_LOAD_SUBOBJECTS = 0x0000_2000;
        const NEWER_VERSION_EXISTS = 0x0000_4000;
        const BEGIN_DESTROYED = 0x0000_8000;
        const FINISH_DESTROYED = 0x0001_0000;
        const BEING_REGENERATED = 0x0002_0000;
        const DEFAULT_SUB_OBJECT = 0x0004_0000;
        const WAS_LOADED = 0x0008_0000;
        const TEXT_EXPORT_TRANSIENT = 0x0010_0000;
        const LOAD_COMPLETED = 0x0020_0000;
        const INHERITABLE_COMPONENT_TEMPLATE = 0x0040_0000;
        const DUPLICATE_TRANSIENT = 0x0080_0000;
        const STRONG_REF_ON_FRAME = 0x0100_0000;
        const NON_PIE_DUPLICATE_TRANSIENT = 0x0200_0000;
        const DYNAMIC = 0x0400_0000;
        const WILL_BE_LOADED = 0x0800_0000;
        const _ = !0;
    }
}

bitflags! {
    /// Flags stored next to each slot of the object registry
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InternalObjectFlags: u32 {
        const REACHABLE_IN_CLUSTER = 1 << 23;
        const CLUSTER_ROOT = 1 << 24;
        const NATIVE = 1 << 25;
        const ASYNC = 1 << 26;
        const ASYNC_LOADING = 1 << 27;
        const UNREACHABLE = 1 << 28;
        const PENDING_KILL = 1 << 29;
        const ROOT_SET = 1 << 30;
        const GARBAGE_COLLECTION_KEEP_FLAGS =
            Self::NATIVE.bits() | Self::ASYNC.bits() | Self::ASYNC_LOADING.bits();
        const _ = !0;
    }
}

impl InternalObjectFlags {
    /// Slot is about to be collected and must not be handed out
    pub fn is_dead(&self) -> bool {
        self.intersects(InternalObjectFlags::UNREACHABLE | InternalObjectFlags::PENDING_KILL)
    }
}

bitflags! {
    /// Property flags (CPF_*)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PropertyFlags: u64 {
        const EDIT = 0x0000_0000_0000_0001;
        const CONST_PARM = 0x0000_0000_0000_0002;
        const BLUEPRINT_VISIBLE = 0x0000_0000_0000_0004;
        const EXPORT_OBJECT = 0x0000_0000_0000_0008;
        const BLUEPRINT_READ_ONLY = 0x0000_0000_0000_0010;
        const NET = 0x0000_0000_0000_0020;
        const EDIT_FIXED_SIZE = 0x0000_0000_0000_0040;
        const PARM = 0x0000_0000_0000_0080;
        const OUT_PARM = 0x0000_0000_0000_0100;
        const ZERO_CONSTRUCTOR = 0x0000_0000_0000_0200;
        const RETURN_PARM = 0x0000_0000_0000_0400;
        const DISABLE_EDIT_ON_TEMPLATE = 0x0000_0000_0000_0800;
        const NON_NULLABLE = 0x0000_0000_0000_1000;
        const TRANSIENT = 0x0000_0000_0000_2000;
        const CONFIG = 0x0000_0000_0000_4000;
        const REQUIRED_PARM = 0x0000_0000_0000_8000;
        const DISABLE_EDIT_ON_INSTANCE = 0x0000_0000_0001_0000;
        const EDIT_CONST = 0x0000_0000_0002_0000;
        const GLOBAL_CONFIG = 0x0000_0000_0004_0000;
        const INSTANCED_REFERENCE = 0x0000_0000_0008_0000;
        const DUPLICATE_TRANSIENT = 0x0000_0000_0020_0000;
        const SAVE_GAME = 0x0000_0000_0100_0000;
        const NO_CLEAR = 0x0000_0000_0200_0000;
        const REFERENCE_PARM = 0x0000_0000_0800_0000;
        const BLUEPRINT_ASSIGNABLE = 0x0000_0000_1000_0000;
        const DEPRECATED = 0x0000_0000_2000_0000;
        const IS_PLAIN_OLD_DATA = 0x0000_0000_4000_0000;
        const REP_SKIP = 0x0000_0000_8000_0000;
        const REP_NOTIFY = 0x0000_0001_0000_0000;
        const INTERP = 0x0000_0002_0000_0000;
        const NON_TRANSACTIONAL = 0x0000_0004_0000_0000;
        const EDITOR_ONLY = 0x0000_0008_0000_0000;
        const NO_DESTRUCTOR = 0x0000_0010_0000_0000;
        const AUTO_WEAK = 0x0000_0040_0000_0000;
        const CONTAINS_INSTANCED_REFERENCE = 0x0000_0080_0000_0000;
        const ASSET_REGISTRY_SEARCHABLE = 0x0000_0100_0000_0000;
        const SIMPLE_DISPLAY = 0x0000_0200_0000_0000;
        const ADVANCED_DISPLAY = 0x0000_0400_0000_0000;
        const PROTECTED = 0x0000_0800_0000_0000;
        const BLUEPRINT_CALLABLE = 0x0000_1000_0000_0000;
        const BLUEPRINT_AUTHORITY_ONLY = 0x0000_2000_0000_0000;
        const TEXT_EXPORT_TRANSIENT = 0x0000_4000_0000_0000;
        const NON_PIE_DUPLICATE_TRANSIENT = 0x0000_8000_0000_0000;
        const EXPOSE_ON_SPAWN = 0x0001_0000_0000_0000;
        const PERSISTENT_INSTANCE = 0x0002_0000_0000_0000;
        const UOBJECT_WRAPPER = 0x0004_0000_0000_0000;
        const HAS_GET_VALUE_TYPE_HASH = 0x0008_0000_0000_0000;
        const NATIVE_ACCESS_SPECIFIER_PUBLIC = 0x0010_0000_0000_0000;
        const NATIVE_ACCESS_SPECIFIER_PROTECTED = 0x0020_0000_0000_0000;
        const NATIVE_ACCESS_SPECIFIER_PRIVATE = 0x0040_0000_0000_0000;
        const SKIP_SERIALIZATION = 0x0080_0000_0000_0000;
        const _ = !0;
    }
}

bitflags! {
    /// Function flags (FUNC_*)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FunctionFlags: u32 {
        const FINAL = 0x0000_0001;
        const REQUIRED_API = 0x0000_0002;
        const BLUEPRINT_AUTHORITY_ONLY = 0x0000_0004;
        const BLUEPRINT_COSMETIC = 0x0000_0008;
        const NET = 0x0000_0040;
        const NET_RELIABLE = 0x0000_0080;
        const NET_REQUEST = 0x0000_0100;
        const EXEC = 0x0000_0200;
        const NATIVE = 0x0000_0400;
        const EVENT = 0x0000_0800;
        const NET_RESPONSE = 0x0000_1000;
        const STATIC = 0x0000_2000;
        const NET_MULTICAST = 0x0000_4000;
        const UBERGRAPH_FUNCTION = 0x0000_8000;
        const MULTICAST_DELEGATE = 0x0001_0000;
        const PUBLIC = 0x0002_0000;
        const PRIVATE = 0x0004_0000;
        const PROTECTED = 0x0008_0000;
        const DELEGATE = 0x0010_0000;
        const NET_SERVER = 0x0020_0000;
        const HAS_OUT_PARMS = 0x0040_0000;
        const HAS_DEFAULTS = 0x0080_0000;
        const NET_CLIENT = 0x0100_0000;
        const DLL_IMPORT = 0x0200_0000;
        const BLUEPRINT_CALLABLE = 0x0400_0000;
        const BLUEPRINT_EVENT = 0x0800_0000;
        const BLUEPRINT_PURE = 0x1000_0000;
        const EDITOR_ONLY = 0x2000_0000;
        const CONST = 0x4000_0000;
        const NET_VALIDATE = 0x8000_0000;
    }
}

impl FunctionFlags {
    /// Pipe-separated list of set flag names, e.g. `FINAL|NATIVE|PUBLIC`.
    pub fn describe(&self) -> String {
        self.iter_names()
            .map(|(name, _)| name)
            .collect::<Vec<_>>()
            .join("|")
    }
}
