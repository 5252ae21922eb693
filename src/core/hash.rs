//! Byte content hashing shared by every table.

use crate::consts::HASH_SEED;

/// Computes the multiplicative content hash of `bytes`.
///
/// Each step multiplies the running hash by 33 and mixes in the next byte.
#[inline]
pub const fn hash_bytes(bytes: &[u8]) -> u32 {
  let mut hash: u32 = HASH_SEED;
  let mut index: usize = 0;

  while index < bytes.len() {
    hash = hash.wrapping_mul(33) ^ bytes[index] as u32;
    index += 1;
  }

  hash
}

/// Spreads a 32-bit content hash over the 64 bits the flat table expects.
///
/// The flat table takes its control byte from the top bits of the hash, so a
/// zero-extended `u32` would put every entry in the same group.
#[inline]
pub(crate) const fn spread(hash: u32) -> u64 {
  (hash as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
