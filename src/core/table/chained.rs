//! Separately chained table used at lexing time.
//!
//! Keys come straight from free-form source text, so the table favours cheap
//! inserts over probe locality: each bucket is a short chain and the bucket
//! array doubles once chains grow past [`CHAINED_MAX_LOAD`] on average.

use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::mem;

use crate::consts::CHAINED_MAX_LOAD;
use crate::consts::CHAINED_MIN_BUCKETS;
use crate::core::TableError;

struct Link<T> {
  hash: u32,
  item: T,
}

/// Chained hash table keyed by a precomputed 32-bit hash.
pub struct ChainedTable<T> {
  buckets: Vec<Vec<Link<T>>>,
  len: usize,
}

impl<T> ChainedTable<T> {
  /// Creates a new, empty table without allocating.
  #[inline]
  pub const fn new() -> Self {
    Self {
      buckets: Vec::new(),
      len: 0,
    }
  }

  /// Returns the number of entries in the table.
  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  /// Returns `true` if the table contains no entries.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Returns the number of allocated buckets.
  #[inline]
  pub fn buckets(&self) -> usize {
    self.buckets.len()
  }

  /// Returns the entry stored under `hash` that passes `test`.
  pub fn find<F>(&self, hash: u32, mut test: F) -> Option<&T>
  where
    F: FnMut(&T) -> bool,
  {
    if self.buckets.is_empty() {
      return None;
    }

    self.buckets[self.bucket(hash)]
      .iter()
      .find(|link| link.hash == hash && test(&link.item))
      .map(|link| &link.item)
  }

  /// Inserts `item` under `hash`.
  ///
  /// Behaves like [`FlatTable::insert`]: an existing entry is replaced only
  /// when `replace` is set and is otherwise reported as a duplicate.
  ///
  /// [`FlatTable::insert`]: crate::core::FlatTable::insert
  pub fn insert<F>(&mut self, hash: u32, item: T, replace: bool, mut test: F) -> Result<Option<T>, TableError>
  where
    F: FnMut(&T) -> bool,
  {
    if !self.buckets.is_empty() {
      let index: usize = self.bucket(hash);

      let found: Option<&mut Link<T>> = self.buckets[index]
        .iter_mut()
        .find(|link| link.hash == hash && test(&link.item));

      if let Some(link) = found {
        if replace {
          return Ok(Some(mem::replace(&mut link.item, item)));
        }

        return Err(TableError::Duplicate);
      }
    }

    if self.len >= self.buckets.len() * CHAINED_MAX_LOAD {
      self.grow()?;
    }

    let index: usize = self.bucket(hash);
    let chain: &mut Vec<Link<T>> = &mut self.buckets[index];

    chain.try_reserve(1).map_err(|_| TableError::OutOfMemory)?;
    chain.push(Link { hash, item });

    self.len += 1;

    Ok(None)
  }

  /// Returns an iterator over all entries in arbitrary order.
  pub fn iter(&self) -> impl Iterator<Item = &T> {
    self.buckets.iter().flatten().map(|link| &link.item)
  }

  #[inline]
  fn bucket(&self, hash: u32) -> usize {
    debug_assert!(self.buckets.len().is_power_of_two());
    hash as usize & (self.buckets.len() - 1)
  }

  /// Doubles the bucket array and redistributes every chain.
  fn grow(&mut self) -> Result<(), TableError> {
    let size: usize = match self.buckets.len() {
      0 => CHAINED_MIN_BUCKETS,
      size => size.checked_mul(2).ok_or(TableError::OutOfMemory)?,
    };

    let mut buckets: Vec<Vec<Link<T>>> = Vec::new();

    buckets
      .try_reserve_exact(size)
      .map_err(|_| TableError::OutOfMemory)?;

    buckets.resize_with(size, Vec::new);

    for link in mem::take(&mut self.buckets).into_iter().flatten() {
      let chain: &mut Vec<Link<T>> = &mut buckets[link.hash as usize & (size - 1)];

      chain.try_reserve(1).map_err(|_| TableError::OutOfMemory)?;
      chain.push(link);
    }

    self.buckets = buckets;

    Ok(())
  }
}

impl<T> Debug for ChainedTable<T> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("ChainedTable")
      .field("len", &self.len)
      .field("buckets", &self.buckets.len())
      .finish()
  }
}

impl<T> Default for ChainedTable<T> {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
