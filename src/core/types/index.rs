//! Packed variable locations.
//!
//! A [`ScopeIndex`] is produced by the compiler whenever it allocates a slot
//! and decoded by the interpreter on every variable access. The layout is:
//!
//! ```text
//! 31                             8 7    6 5    4 3          0
//! +-------------------------------+------+------+------------+
//! |             slot              | type |level |    kind    |
//! +-------------------------------+------+------+------------+
//! ```

use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::core::VmError;
use crate::core::invariant;

const KIND_BITS: u32 = 4;
const LEVEL_BITS: u32 = 2;
const TYPE_BITS: u32 = 2;

const LEVEL_SHIFT: u32 = KIND_BITS;
const TYPE_SHIFT: u32 = LEVEL_SHIFT + LEVEL_BITS;
const SLOT_SHIFT: u32 = TYPE_SHIFT + TYPE_BITS;

const KIND_MASK: u32 = (1 << KIND_BITS) - 1;
const LEVEL_MASK: u32 = (1 << LEVEL_BITS) - 1;
const TYPE_MASK: u32 = (1 << TYPE_BITS) - 1;

// -----------------------------------------------------------------------------
// Fields
// -----------------------------------------------------------------------------

/// Lexical scope that declared a variable.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[repr(u8)]
pub enum ScopeType {
  Global = 0,
  Function = 1,
  Block = 2,
}

impl ScopeType {
  #[inline]
  const fn from_bits(bits: u32) -> Option<Self> {
    match bits {
      0 => Some(Self::Global),
      1 => Some(Self::Function),
      2 => Some(Self::Block),
      _ => None,
    }
  }
}

/// Storage a slot number is relative to.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[repr(u8)]
pub enum Level {
  /// Slot in the frame of the running function.
  Local = 0,
  /// Slot in the absolute scope array of the VM.
  Static = 1,
}

impl Level {
  #[inline]
  const fn from_bits(bits: u32) -> Option<Self> {
    match bits {
      0 => Some(Self::Local),
      1 => Some(Self::Static),
      _ => None,
    }
  }
}

/// Declaration form of a variable.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
#[repr(u8)]
pub enum BindingKind {
  Var = 0,
  Let = 1,
  Catch = 2,
  Const = 3,
  Function = 4,
}

impl BindingKind {
  #[inline]
  const fn from_bits(bits: u32) -> Option<Self> {
    match bits {
      0 => Some(Self::Var),
      1 => Some(Self::Let),
      2 => Some(Self::Catch),
      3 => Some(Self::Const),
      4 => Some(Self::Function),
      _ => None,
    }
  }
}

// -----------------------------------------------------------------------------
// Scope Index
// -----------------------------------------------------------------------------

/// Packed `(scope type, slot, level, binding kind)` tuple.
///
/// Every value of this type is a valid encoding; `u32::MAX`, used by callers
/// as an "unresolved" marker, can never be constructed.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
#[repr(transparent)]
pub struct ScopeIndex {
  bits: u32,
}

impl ScopeIndex {
  /// Largest slot number that fits the encoding.
  pub const MAX_SLOT: u32 = u32::MAX >> SLOT_SHIFT;

  /// Packs the given fields, returning `None` if `slot` exceeds
  /// [`MAX_SLOT`][Self::MAX_SLOT].
  #[inline]
  pub const fn new(scope: ScopeType, slot: u32, level: Level, kind: BindingKind) -> Option<Self> {
    if slot > Self::MAX_SLOT {
      return None;
    }

    Some(Self {
      bits: (slot << SLOT_SHIFT)
        | ((scope as u32) << TYPE_SHIFT)
        | ((level as u32) << LEVEL_SHIFT)
        | kind as u32,
    })
  }

  /// Validates a packed index read back from bytecode.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::InvariantViolation`] if any field holds a bit
  /// pattern no encoder produces.
  pub fn from_raw(bits: u32) -> Result<Self, VmError> {
    let valid: bool = ScopeType::from_bits((bits >> TYPE_SHIFT) & TYPE_MASK).is_some()
      && Level::from_bits((bits >> LEVEL_SHIFT) & LEVEL_MASK).is_some()
      && BindingKind::from_bits(bits & KIND_MASK).is_some();

    if valid {
      Ok(Self { bits })
    } else {
      Err(invariant!("malformed scope index"))
    }
  }

  /// Returns the packed form of this index.
  #[inline]
  pub const fn into_raw(self) -> u32 {
    self.bits
  }

  #[inline]
  pub const fn slot(self) -> u32 {
    self.bits >> SLOT_SHIFT
  }

  #[inline]
  pub const fn scope_type(self) -> ScopeType {
    match ScopeType::from_bits((self.bits >> TYPE_SHIFT) & TYPE_MASK) {
      Some(scope) => scope,
      None => unreachable!(),
    }
  }

  #[inline]
  pub const fn level(self) -> Level {
    match Level::from_bits((self.bits >> LEVEL_SHIFT) & LEVEL_MASK) {
      Some(level) => level,
      None => unreachable!(),
    }
  }

  #[inline]
  pub const fn binding_kind(self) -> BindingKind {
    match BindingKind::from_bits(self.bits & KIND_MASK) {
      Some(kind) => kind,
      None => unreachable!(),
    }
  }

  /// Unpacks every field at once.
  #[inline]
  pub const fn decode(self) -> (ScopeType, u32, Level, BindingKind) {
    (self.scope_type(), self.slot(), self.level(), self.binding_kind())
  }
}

impl Debug for ScopeIndex {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("ScopeIndex")
      .field("scope", &self.scope_type())
      .field("slot", &self.slot())
      .field("level", &self.level())
      .field("kind", &self.binding_kind())
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  const SCOPES: [ScopeType; 3] = [ScopeType::Global, ScopeType::Function, ScopeType::Block];
  const LEVELS: [Level; 2] = [Level::Local, Level::Static];
  const KINDS: [BindingKind; 5] = [
    BindingKind::Var,
    BindingKind::Let,
    BindingKind::Catch,
    BindingKind::Const,
    BindingKind::Function,
  ];

  #[test]
  fn test_round_trip() {
    for scope in SCOPES {
      for level in LEVELS {
        for kind in KINDS {
          for slot in [0, 1, 255, 256, ScopeIndex::MAX_SLOT] {
            let index: ScopeIndex = ScopeIndex::new(scope, slot, level, kind).unwrap();

            assert_eq!(index.decode(), (scope, slot, level, kind));
            assert_eq!(ScopeIndex::from_raw(index.into_raw()), Ok(index));
            assert_ne!(index.into_raw(), u32::MAX);
          }
        }
      }
    }
  }

  #[test]
  fn test_slot_overflow() {
    assert_eq!(ScopeIndex::MAX_SLOT, 0xFF_FFFF);
    assert!(ScopeIndex::new(ScopeType::Global, ScopeIndex::MAX_SLOT + 1, Level::Static, BindingKind::Var).is_none());
    assert!(ScopeIndex::new(ScopeType::Global, u32::MAX, Level::Static, BindingKind::Var).is_none());
  }

  #[test]
  fn test_sentinel_rejected() {
    assert!(matches!(
      ScopeIndex::from_raw(u32::MAX),
      Err(VmError::InvariantViolation(_)),
    ));
  }

  #[test]
  fn test_malformed_fields_rejected() {
    let valid: u32 = ScopeIndex::new(ScopeType::Block, 9, Level::Local, BindingKind::Let)
      .unwrap()
      .into_raw();

    assert!(ScopeIndex::from_raw(valid | KIND_MASK).is_err());
    assert!(ScopeIndex::from_raw(valid | (LEVEL_MASK << LEVEL_SHIFT)).is_err());
    assert!(ScopeIndex::from_raw(valid | (TYPE_MASK << TYPE_SHIFT)).is_err());
  }
}
