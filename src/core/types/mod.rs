//! Fundamental VM types: atoms, values and scope indices.
//!
//! # Type Categories
//!
//! ## Atoms
//!
//! - [`AtomId`]: Packed 32-bit atom id
//! - [`Atom`]: Unpacked numeric or interned atom
//! - [`Keyword`]: Reserved word token carried by well-known strings
//! - [`WellKnown`]: Compiled-in atom definition
//!
//! ## Values
//!
//! - [`Value`]: Copyable value header with an optional atom
//! - [`ValueKind`]: Value payload
//! - [`JsStr`]: Borrowed string payload with its character length
//!
//! ## Scopes
//!
//! - [`ScopeIndex`]: Packed variable location
//! - [`ScopeType`], [`Level`], [`BindingKind`]: Its fields

mod atom;
mod index;
mod keyword;
mod number;
mod value;
mod well_known;

pub use self::atom::Atom;
pub use self::atom::AtomId;
pub use self::index::BindingKind;
pub use self::index::Level;
pub use self::index::ScopeIndex;
pub use self::index::ScopeType;
pub use self::keyword::Keyword;
pub use self::number::canonical_numeric_index;
pub use self::number::number_index;
pub use self::number::number_to_string;
pub use self::number::utf8_length;
pub use self::value::JsStr;
pub use self::value::Value;
pub use self::value::ValueKind;
pub use self::well_known::WELL_KNOWN;
pub use self::well_known::WELL_KNOWN_COUNT;
pub use self::well_known::WellKnown;
