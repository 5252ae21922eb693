//! Error types shared by the tables, the value store and the VM.

mod macros;

pub(crate) use self::macros::invariant;

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

// -----------------------------------------------------------------------------
// VM Error
// -----------------------------------------------------------------------------

/// Errors returned from atomization and scope storage operations.
///
/// None of these are recoverable inside the VM. The component that owns the
/// affected compilation or VM instance is expected to abandon it and drop its
/// arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum VmError {
  /// An arena or table allocation failed.
  OutOfMemory,
  /// The atom id generator reached the numeric atom range.
  ///
  /// This is an internal engine error, not a script error.
  TooManyAtoms,
  /// A table or index contract was broken by the caller.
  ///
  /// Duplicate inserts, malformed scope indices and writes to a frozen
  /// template all end up here.
  InvariantViolation(&'static str),
}

impl VmError {
  /// Returns `true` if this error reports an internal engine failure rather
  /// than resource exhaustion.
  #[inline]
  pub const fn is_internal(&self) -> bool {
    matches!(self, Self::TooManyAtoms | Self::InvariantViolation(_))
  }
}

impl Display for VmError {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::OutOfMemory => f.write_str("out of memory"),
      Self::TooManyAtoms => f.write_str("internal error: too many atoms"),
      Self::InvariantViolation(error) => write!(f, "internal error: {error}"),
    }
  }
}

impl Error for VmError {}

// -----------------------------------------------------------------------------
// Table Error
// -----------------------------------------------------------------------------

/// Errors returned from hash table insertion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum TableError {
  /// The table could not grow.
  OutOfMemory,
  /// The key is already present and replacement was not requested.
  Duplicate,
}

impl Display for TableError {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self {
      Self::OutOfMemory => f.write_str("table allocation failed"),
      Self::Duplicate => f.write_str("duplicate table insert"),
    }
  }
}

impl Error for TableError {}

impl From<TableError> for VmError {
  fn from(other: TableError) -> Self {
    match other {
      TableError::OutOfMemory => Self::OutOfMemory,
      TableError::Duplicate => {
        tracing::error!(target: "quark", error = %other, "table invariant broken");
        Self::InvariantViolation("duplicate table insert")
      }
    }
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
