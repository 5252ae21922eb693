use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::consts::ATOM_NUMBER_FLAG;
use crate::consts::MAX_NUMBER_ATOM;

// -----------------------------------------------------------------------------
// Atom Id
// -----------------------------------------------------------------------------

/// Packed 32-bit atom id as stored in values and table keys.
///
/// Ids below [`ATOM_NUMBER_FLAG`] name interned strings and symbols. Ids with
/// the flag set carry a small non-negative integer in the remaining bits.
/// Prefer [`Atom`] when branching on the two cases.
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct AtomId {
  bits: u32,
}

impl AtomId {
  /// Constructs an atom id from its packed form.
  #[inline]
  pub const fn from_raw(bits: u32) -> Self {
    Self { bits }
  }

  /// Returns the packed form of this atom id.
  #[inline]
  pub const fn into_raw(self) -> u32 {
    self.bits
  }

  /// Returns the numeric atom for `value`, or `None` if it does not fit.
  #[inline]
  pub const fn number(value: u32) -> Option<Self> {
    if value > MAX_NUMBER_ATOM {
      None
    } else {
      Some(Self::from_raw(value | ATOM_NUMBER_FLAG))
    }
  }

  /// Returns `true` if this id packs an integer rather than naming an entry.
  #[inline]
  pub const fn is_number(self) -> bool {
    self.bits & ATOM_NUMBER_FLAG != 0
  }

  /// Unpacks this id.
  #[inline]
  pub const fn atom(self) -> Atom {
    if self.is_number() {
      Atom::Number(self.bits & !ATOM_NUMBER_FLAG)
    } else {
      Atom::Interned(self.bits)
    }
  }
}

impl Debug for AtomId {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Debug::fmt(&self.atom(), f)
  }
}

impl Display for AtomId {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    Display::fmt(&self.atom(), f)
  }
}

impl From<Atom> for AtomId {
  #[inline]
  fn from(other: Atom) -> Self {
    match other {
      Atom::Number(value) => Self::from_raw((value & MAX_NUMBER_ATOM) | ATOM_NUMBER_FLAG),
      Atom::Interned(id) => Self::from_raw(id & MAX_NUMBER_ATOM),
    }
  }
}

// -----------------------------------------------------------------------------
// Atom
// -----------------------------------------------------------------------------

/// Unpacked atom id.
///
/// Both payloads are 31-bit values; constructing an [`AtomId`] from an
/// out-of-range payload drops the high bit.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Atom {
  /// Array-index style key encoded in the id itself.
  Number(u32),
  /// Key naming an interned string or symbol entry.
  Interned(u32),
}

impl Display for Atom {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::Number(value) => write!(f, "#{value}"),
      Self::Interned(id) => write!(f, "@{id}"),
    }
  }
}

impl From<AtomId> for Atom {
  #[inline]
  fn from(other: AtomId) -> Self {
    other.atom()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_number_sets_high_bit() {
    let id: AtomId = AtomId::number(42).unwrap();

    assert_eq!(id.into_raw(), 42 | ATOM_NUMBER_FLAG);
    assert!(id.is_number());
    assert_eq!(id.atom(), Atom::Number(42));
  }

  #[test]
  fn test_number_ceiling() {
    assert!(AtomId::number(MAX_NUMBER_ATOM).is_some());
    assert!(AtomId::number(MAX_NUMBER_ATOM + 1).is_none());
    assert!(AtomId::number(u32::MAX).is_none());
  }

  #[test]
  fn test_interned_never_number() {
    let id: AtomId = AtomId::from_raw(42);

    assert!(!id.is_number());
    assert_eq!(id.atom(), Atom::Interned(42));
    assert_ne!(id, AtomId::number(42).unwrap());
  }

  #[test]
  fn test_atom_conversion() {
    for atom in [Atom::Number(0), Atom::Number(MAX_NUMBER_ATOM), Atom::Interned(0), Atom::Interned(7)] {
      assert_eq!(Atom::from(AtomId::from(atom)), atom);
    }
  }

  #[test]
  fn test_display() {
    assert_eq!(AtomId::number(5).unwrap().to_string(), "#5");
    assert_eq!(AtomId::from_raw(5).to_string(), "@5");
  }
}
