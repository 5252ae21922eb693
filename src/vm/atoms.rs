//! Atom table layers.
//!
//! A layer pairs a flat table keyed by content (string bytes, or the id of a
//! symbol) with an id-indexed map used for reverse lookups. A template owns
//! the shared layer; an instance allocates its own layer on the first atom
//! the shared layer does not know.

use hashbrown::HashMap;
use std::ptr::NonNull;
use std::slice;

use crate::core::AtomId;
use crate::core::FlatTable;
use crate::core::JsStr;
use crate::core::Keyword;
use crate::core::TableError;
use crate::core::Value;
use crate::core::ValueKind;
use crate::core::VmError;
use crate::core::WellKnown;
use crate::core::hash_bytes;

// -----------------------------------------------------------------------------
// Raw Bytes
// -----------------------------------------------------------------------------

/// Byte range owned by an arena or by static data.
#[derive(Clone, Copy)]
pub(crate) struct RawBytes {
  ptr: NonNull<u8>,
  len: usize,
}

impl RawBytes {
  #[inline]
  pub(crate) fn new(bytes: &[u8]) -> Self {
    Self {
      ptr: NonNull::from(bytes).cast(),
      len: bytes.len(),
    }
  }

  /// Reborrows the range.
  ///
  /// # Safety
  ///
  /// The memory the range was created from must outlive `'a`.
  #[inline]
  pub(crate) unsafe fn as_slice<'a>(&self) -> &'a [u8] {
    // SAFETY: Guaranteed by the caller.
    unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
  }
}

// -----------------------------------------------------------------------------
// Atom Entry
// -----------------------------------------------------------------------------

#[derive(Clone, Copy)]
pub(crate) enum AtomKey {
  String {
    bytes: RawBytes,
    length: u32,
    keyword: Option<Keyword>,
  },
  Symbol {
    description: Option<RawBytes>,
  },
}

/// Interned string or symbol.
#[derive(Clone, Copy)]
pub(crate) struct AtomEntry {
  pub(crate) id: AtomId,
  pub(crate) key: AtomKey,
}

impl AtomEntry {
  pub(crate) fn string(id: AtomId, bytes: &[u8], length: u32, keyword: Option<Keyword>) -> Self {
    Self {
      id,
      key: AtomKey::String {
        bytes: RawBytes::new(bytes),
        length,
        keyword,
      },
    }
  }

  pub(crate) fn symbol(id: AtomId, description: Option<&[u8]>) -> Self {
    Self {
      id,
      key: AtomKey::Symbol {
        description: description.map(RawBytes::new),
      },
    }
  }

  /// Creates the entry of a well-known atom.
  pub(crate) fn well_known(definition: &WellKnown) -> Self {
    let text: &'static str = definition.text();

    if definition.is_symbol() {
      Self::symbol(definition.id(), Some(text.as_bytes()))
    } else {
      Self::string(
        definition.id(),
        text.as_bytes(),
        text.chars().count() as u32,
        definition.keyword(),
      )
    }
  }

  #[inline]
  pub(crate) fn keyword(&self) -> Option<Keyword> {
    match self.key {
      AtomKey::String { keyword, .. } => keyword,
      AtomKey::Symbol { .. } => None,
    }
  }

  /// Returns the value this entry names.
  ///
  /// # Safety
  ///
  /// The storage of the entry's bytes must outlive `'a`.
  pub(crate) unsafe fn value<'a>(&self) -> Value<'a> {
    let kind: ValueKind<'a> = match self.key {
      // SAFETY: Guaranteed by the caller.
      AtomKey::String { bytes, length, .. } => unsafe {
        ValueKind::String(JsStr::from_parts(bytes.as_slice(), length))
      },
      // SAFETY: Guaranteed by the caller.
      AtomKey::Symbol { description } => unsafe {
        ValueKind::Symbol(description.map(|bytes| JsStr::new(bytes.as_slice())))
      },
    };

    Value::new(kind).with_atom(self.id)
  }
}

// -----------------------------------------------------------------------------
// Atom Query
// -----------------------------------------------------------------------------

/// Key an atom is looked up by.
#[derive(Clone, Copy, Debug)]
pub(crate) enum AtomQuery<'a> {
  String(&'a [u8]),
  Symbol(AtomId),
}

impl AtomQuery<'_> {
  #[inline]
  pub(crate) fn hash(&self) -> u32 {
    match self {
      Self::String(bytes) => hash_bytes(bytes),
      Self::Symbol(id) => id.into_raw(),
    }
  }

  /// Returns `true` if `entry` is the atom this query names.
  ///
  /// Declines entries of the other kind even when hashes collide.
  #[inline]
  pub(crate) fn test(&self, entry: &AtomEntry) -> bool {
    match (self, entry.key) {
      // SAFETY: Entries are only reachable while their layer's storage is.
      (Self::String(query), AtomKey::String { bytes, .. }) => unsafe { bytes.as_slice() == *query },
      (Self::Symbol(query), AtomKey::Symbol { .. }) => entry.id == *query,
      _ => false,
    }
  }
}

impl AtomQuery<'static> {
  #[inline]
  pub(crate) fn of(entry: &AtomEntry) -> Self {
    match entry.key {
      // SAFETY: Only used for the duration of a single insert.
      AtomKey::String { bytes, .. } => Self::String(unsafe { bytes.as_slice() }),
      AtomKey::Symbol { .. } => Self::Symbol(entry.id),
    }
  }
}

// -----------------------------------------------------------------------------
// Atom Layer
// -----------------------------------------------------------------------------

/// One tier of the atom table hierarchy.
#[derive(Default)]
pub(crate) struct AtomLayer {
  table: FlatTable<AtomEntry>,
  by_id: HashMap<AtomId, AtomEntry>,
}

impl AtomLayer {
  #[inline]
  pub(crate) fn new() -> Self {
    Self::default()
  }

  /// Creates the shared layer holding every atom of `definitions`.
  pub(crate) fn bootstrap(definitions: &'static [WellKnown]) -> Result<Self, VmError> {
    let mut this: Self = Self::new();

    for definition in definitions {
      this.insert(AtomEntry::well_known(definition), true)?;
    }

    Ok(this)
  }

  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.table.len()
  }

  #[inline]
  pub(crate) fn find(&self, query: &AtomQuery<'_>) -> Option<&AtomEntry> {
    self.table.find(query.hash(), |entry| query.test(entry))
  }

  #[inline]
  pub(crate) fn get(&self, id: AtomId) -> Option<&AtomEntry> {
    self.by_id.get(&id)
  }

  /// Inserts `entry`, overwriting an entry with the same key if `replace`.
  pub(crate) fn insert(&mut self, entry: AtomEntry, replace: bool) -> Result<(), VmError> {
    let query: AtomQuery<'_> = AtomQuery::of(&entry);

    let replaced: Option<AtomEntry> = self
      .table
      .insert(query.hash(), entry, replace, |stored| query.test(stored))?;

    if let Some(replaced) = replaced {
      self.by_id.remove(&replaced.id);
    }

    self
      .by_id
      .try_reserve(1)
      .map_err(|_| TableError::OutOfMemory)?;

    self.by_id.insert(entry.id, entry);

    Ok(())
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::WELL_KNOWN;

  #[test]
  fn test_bootstrap_holds_every_definition() {
    let layer: AtomLayer = AtomLayer::bootstrap(WELL_KNOWN).unwrap();

    assert_eq!(layer.len(), WELL_KNOWN.len());

    for definition in WELL_KNOWN {
      assert_eq!(layer.get(definition.id()).map(|entry| entry.id), Some(definition.id()));
    }
  }

  #[test]
  fn test_query_declines_other_kind() {
    let layer: AtomLayer = AtomLayer::bootstrap(WELL_KNOWN).unwrap();
    let length: AtomId = AtomId::LENGTH;

    assert!(layer.find(&AtomQuery::String(b"length")).is_some());
    assert!(layer.find(&AtomQuery::Symbol(length)).is_none());
    assert!(layer.find(&AtomQuery::Symbol(AtomId::SYMBOL_ITERATOR)).is_some());
    assert!(layer.find(&AtomQuery::String(b"Symbol.iterator")).is_none());
  }

  #[test]
  fn test_duplicate_insert_rejected() {
    let mut layer: AtomLayer = AtomLayer::new();
    let entry: AtomEntry = AtomEntry::string(AtomId::from_raw(500), b"abc", 3, None);

    layer.insert(entry, false).unwrap();

    assert!(matches!(layer.insert(entry, false), Err(VmError::InvariantViolation(_))));
  }

  #[test]
  fn test_replace_updates_reverse_map() {
    let mut layer: AtomLayer = AtomLayer::new();

    layer.insert(AtomEntry::string(AtomId::from_raw(1), b"abc", 3, None), true).unwrap();
    layer.insert(AtomEntry::string(AtomId::from_raw(2), b"abc", 3, None), true).unwrap();

    assert!(layer.get(AtomId::from_raw(1)).is_none());
    assert_eq!(layer.find(&AtomQuery::String(b"abc")).map(|entry| entry.id), Some(AtomId::from_raw(2)));
  }
}
