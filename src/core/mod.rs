//! Core building blocks: errors, arenas, hashing, tables and value types.

mod arena;
mod error;
mod hash;
mod table;
mod types;

pub(crate) use self::arena::FrozenArena;
pub(crate) use self::error::invariant;

pub use self::arena::MemoryArena;
pub use self::error::TableError;
pub use self::error::VmError;
pub use self::hash::hash_bytes;
pub use self::table::ChainedTable;
pub use self::table::FlatTable;
pub use self::types::Atom;
pub use self::types::AtomId;
pub use self::types::BindingKind;
pub use self::types::JsStr;
pub use self::types::Keyword;
pub use self::types::Level;
pub use self::types::ScopeIndex;
pub use self::types::ScopeType;
pub use self::types::Value;
pub use self::types::ValueKind;
pub use self::types::WELL_KNOWN;
pub use self::types::WELL_KNOWN_COUNT;
pub use self::types::WellKnown;
pub use self::types::canonical_numeric_index;
pub use self::types::number_index;
pub use self::types::number_to_string;
pub use self::types::utf8_length;
