//! Hash tables with caller-supplied hashing and equality.
//!
//! - [`ChainedTable`]: bucket chains, used by the lexer for identifier text.
//! - [`FlatTable`]: open addressing, used for runtime atoms and values.

mod chained;
mod flat;

pub use self::chained::ChainedTable;
pub use self::flat::FlatTable;
