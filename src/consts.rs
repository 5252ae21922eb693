// -----------------------------------------------------------------------------
// Atoms
// -----------------------------------------------------------------------------

/// High bit marking a packed numeric atom id.
pub const ATOM_NUMBER_FLAG: u32 = 0x8000_0000;

/// Largest integer that can be packed into a numeric atom id.
pub const MAX_NUMBER_ATOM: u32 = ATOM_NUMBER_FLAG - 1;

/// Default exclusive upper bound for interned atom ids.
///
/// Interned ids must stay below [`ATOM_NUMBER_FLAG`]; a [`VmConfig`] may
/// lower the bound further but never raise it.
///
/// [`VmConfig`]: crate::vm::VmConfig
pub const DEFAULT_ATOM_ID_LIMIT: u32 = ATOM_NUMBER_FLAG;

// -----------------------------------------------------------------------------
// Strings
// -----------------------------------------------------------------------------

/// Number of characters covered by one entry of a string offset map.
pub const STRING_MAP_STRIDE: usize = 32;

// -----------------------------------------------------------------------------
// Scopes
// -----------------------------------------------------------------------------

/// Number of pre-allocated slots in a new absolute scope array.
pub const DEFAULT_ABSOLUTE_CAPACITY: usize = 8;

// -----------------------------------------------------------------------------
// Hash Tables
// -----------------------------------------------------------------------------

/// Number of buckets allocated by the first insert into a chained table.
pub const CHAINED_MIN_BUCKETS: usize = 16;

/// Average chain length that triggers a chained table resize.
pub const CHAINED_MAX_LOAD: usize = 2;

/// Seed of the byte content hash.
pub const HASH_SEED: u32 = 5381;
