//! Arena allocation for atoms and canonical values.
//!
//! Nothing allocated here is freed individually. Every byte lives until the
//! arena itself is dropped together with the VM instance (or template) that
//! owns it.

use bumpalo::Bump;
use std::alloc::Layout;
use std::cell::Cell;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ptr::NonNull;

use crate::core::VmError;
use crate::core::invariant;

// -----------------------------------------------------------------------------
// Memory Arena
// -----------------------------------------------------------------------------

/// Bump arena with bulk teardown and an optional byte limit.
pub struct MemoryArena {
  bump: Bump,
  count: Cell<usize>,
}

impl MemoryArena {
  /// Creates a new, unlimited arena.
  #[inline]
  pub fn new() -> Self {
    Self::with_limit(None)
  }

  /// Creates a new arena that refuses to grow beyond `limit` bytes.
  pub fn with_limit(limit: Option<usize>) -> Self {
    let bump: Bump = Bump::new();

    bump.set_allocation_limit(limit);

    Self {
      bump,
      count: Cell::new(0),
    }
  }

  /// Allocates `size` bytes with byte alignment.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::OutOfMemory`] if the arena cannot grow.
  #[inline]
  pub fn alloc(&self, size: usize) -> Result<NonNull<u8>, VmError> {
    self.alloc_aligned(1, size)
  }

  /// Allocates `size` bytes aligned to `align`.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::OutOfMemory`] if the arena cannot grow, or
  /// [`VmError::InvariantViolation`] if `align` is not a power of two.
  pub fn alloc_aligned(&self, align: usize, size: usize) -> Result<NonNull<u8>, VmError> {
    let Ok(layout) = Layout::from_size_align(size, align) else {
      return Err(invariant!("invalid allocation layout"));
    };

    let block: NonNull<u8> = self
      .bump
      .try_alloc_layout(layout)
      .map_err(|_| VmError::OutOfMemory)?;

    self.count.set(self.count.get() + 1);

    Ok(block)
  }

  /// Copies `bytes` into the arena.
  pub fn alloc_bytes(&self, bytes: &[u8]) -> Result<&[u8], VmError> {
    let block: NonNull<u8> = self.alloc(bytes.len())?;

    // SAFETY: `block` was just allocated with room for `bytes.len()` bytes and
    //         cannot overlap the borrowed source.
    unsafe {
      block.as_ptr().copy_from_nonoverlapping(bytes.as_ptr(), bytes.len());
      Ok(std::slice::from_raw_parts(block.as_ptr(), bytes.len()))
    }
  }

  /// Returns the number of allocations served by this arena.
  #[inline]
  pub fn allocations(&self) -> usize {
    self.count.get()
  }

  /// Returns the number of bytes reserved from the system allocator.
  #[inline]
  pub fn allocated_bytes(&self) -> usize {
    self.bump.allocated_bytes()
  }

  /// Consumes the arena, forbidding any further allocation.
  #[inline]
  pub(crate) fn freeze(self) -> FrozenArena {
    FrozenArena {
      bump: self.bump,
      count: self.count.get(),
    }
  }
}

impl Debug for MemoryArena {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("MemoryArena")
      .field("allocations", &self.allocations())
      .field("allocated_bytes", &self.allocated_bytes())
      .finish()
  }
}

impl Default for MemoryArena {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

// -----------------------------------------------------------------------------
// Frozen Arena
// -----------------------------------------------------------------------------

/// Arena that only keeps its allocations alive.
///
/// A frozen arena has no allocation API, which is what allows a frozen
/// template to be read from several threads at once.
pub(crate) struct FrozenArena {
  bump: Bump,
  count: usize,
}

impl FrozenArena {
  #[inline]
  pub(crate) fn allocations(&self) -> usize {
    self.count
  }

  #[inline]
  pub(crate) fn allocated_bytes(&self) -> usize {
    self.bump.allocated_bytes()
  }
}

impl Debug for FrozenArena {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("FrozenArena")
      .field("allocations", &self.count)
      .finish_non_exhaustive()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_alloc_bytes_copies() {
    let arena: MemoryArena = MemoryArena::new();
    let source: Vec<u8> = b"hello".to_vec();
    let copied: &[u8] = arena.alloc_bytes(&source).unwrap();

    assert_eq!(copied, b"hello");
    assert_ne!(copied.as_ptr(), source.as_ptr());
    assert_eq!(arena.allocations(), 1);
  }

  #[test]
  fn test_alloc_aligned() {
    let arena: MemoryArena = MemoryArena::new();
    let _pad: NonNull<u8> = arena.alloc(3).unwrap();
    let block: NonNull<u8> = arena.alloc_aligned(16, 32).unwrap();

    assert_eq!(block.as_ptr().addr() % 16, 0);
  }

  #[test]
  fn test_invalid_alignment() {
    let arena: MemoryArena = MemoryArena::new();

    assert!(matches!(
      arena.alloc_aligned(3, 8),
      Err(VmError::InvariantViolation(_)),
    ));
  }

  #[test]
  fn test_limit_reports_out_of_memory() {
    let arena: MemoryArena = MemoryArena::with_limit(Some(0));

    assert_eq!(arena.alloc(4096), Err(VmError::OutOfMemory));
    assert_eq!(arena.allocations(), 0);
  }

  #[test]
  fn test_freeze_keeps_count() {
    let arena: MemoryArena = MemoryArena::new();
    let _ignore: &[u8] = arena.alloc_bytes(b"abc").unwrap();
    let frozen: FrozenArena = arena.freeze();

    assert_eq!(frozen.allocations(), 1);
    assert!(frozen.allocated_bytes() > 0);
  }
}
