//! Open-addressing table used for runtime atom and value interning.

use hashbrown::HashTable;
use hashbrown::hash_table::Entry;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::mem;

use crate::core::TableError;
use crate::core::hash::spread;

/// Stored entry together with the content hash it was inserted under.
struct Slot<T> {
  hash: u32,
  item: T,
}

#[inline]
fn rehash<T>(slot: &Slot<T>) -> u64 {
  spread(slot.hash)
}

/// Flat hash table keyed by a precomputed 32-bit hash.
///
/// The table never looks at keys itself. Every lookup supplies the content
/// hash and an equality test, so the same table can hold entries keyed by
/// bytes and entries keyed by id as long as the test tells them apart.
pub struct FlatTable<T> {
  inner: HashTable<Slot<T>>,
}

impl<T> FlatTable<T> {
  /// Creates a new, empty table.
  #[inline]
  pub fn new() -> Self {
    Self {
      inner: HashTable::new(),
    }
  }

  /// Returns the number of entries in the table.
  #[inline]
  pub fn len(&self) -> usize {
    self.inner.len()
  }

  /// Returns `true` if the table contains no entries.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.inner.is_empty()
  }

  /// Returns the entry stored under `hash` that passes `test`.
  #[inline]
  pub fn find<F>(&self, hash: u32, mut test: F) -> Option<&T>
  where
    F: FnMut(&T) -> bool,
  {
    self
      .inner
      .find(spread(hash), |slot| slot.hash == hash && test(&slot.item))
      .map(|slot| &slot.item)
  }

  /// Inserts `item` under `hash`.
  ///
  /// With `replace` set, an existing entry passing `test` is overwritten and
  /// returned. Without it, an existing entry is reported as a duplicate and
  /// the table is left untouched.
  ///
  /// # Errors
  ///
  /// Returns [`TableError::OutOfMemory`] if the table cannot grow, or
  /// [`TableError::Duplicate`] as described above.
  pub fn insert<F>(&mut self, hash: u32, item: T, replace: bool, mut test: F) -> Result<Option<T>, TableError>
  where
    F: FnMut(&T) -> bool,
  {
    self
      .inner
      .try_reserve(1, rehash)
      .map_err(|_| TableError::OutOfMemory)?;

    let entry: Entry<'_, Slot<T>> = self.inner.entry(
      spread(hash),
      |slot| slot.hash == hash && test(&slot.item),
      rehash,
    );

    match entry {
      Entry::Occupied(mut occupied) if replace => {
        Ok(Some(mem::replace(&mut occupied.get_mut().item, item)))
      }
      Entry::Occupied(_) => Err(TableError::Duplicate),
      Entry::Vacant(vacant) => {
        vacant.insert(Slot { hash, item });
        Ok(None)
      }
    }
  }

  /// Returns an iterator over all entries in arbitrary order.
  #[inline]
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.inner.iter().map(|slot| &slot.item)
  }
}

impl<T> Debug for FlatTable<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("FlatTable")
      .field("len", &self.len())
      .finish_non_exhaustive()
  }
}

impl<T> Default for FlatTable<T> {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
