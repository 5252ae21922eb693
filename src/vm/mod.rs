//! VM templates and instances: atom tables and scope-indexed value storage.
//!
//! - [`Vm`]: atomizes keys and identifiers and stores scoped constants
//! - [`VmTemplate`]: frozen shared tables instances are created from
//! - [`CanonicalValue`]: hash-consed constant with its memoized index
//! - [`Lexicon`]: per-compilation identifier cache
//! - [`ParserScope`] / [`Frame`]: local slot allocation and storage

mod atomize;
mod atoms;
mod canonical;
mod config;
mod instance;
mod lexicon;
mod scope;
mod store;
mod template;

pub(crate) use self::atoms::AtomEntry;
pub(crate) use self::atoms::AtomLayer;
pub(crate) use self::atoms::AtomQuery;
pub(crate) use self::canonical::ValueKey;
pub(crate) use self::scope::AbsoluteScopeArray;

pub use self::canonical::CanonicalValue;
pub use self::canonical::Tier;
pub use self::config::VmConfig;
pub use self::instance::Vm;
pub use self::lexicon::Identifier;
pub use self::lexicon::Lexicon;
pub use self::scope::Frame;
pub use self::scope::ParserScope;
pub use self::template::VmTemplate;
