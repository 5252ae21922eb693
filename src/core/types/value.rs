use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::core::AtomId;
use crate::core::utf8_length;

// -----------------------------------------------------------------------------
// String Payload
// -----------------------------------------------------------------------------

/// Borrowed string payload with a cached character count.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct JsStr<'a> {
  bytes: &'a [u8],
  length: u32,
}

impl<'a> JsStr<'a> {
  /// Wraps UTF-8 `bytes`, counting their characters.
  #[inline]
  pub fn new(bytes: &'a [u8]) -> Self {
    Self::from_parts(bytes, utf8_length(bytes) as u32)
  }

  #[inline]
  pub(crate) const fn from_parts(bytes: &'a [u8], length: u32) -> Self {
    Self { bytes, length }
  }

  /// Returns the encoded bytes.
  #[inline]
  pub const fn as_bytes(&self) -> &'a [u8] {
    self.bytes
  }

  /// Returns the size of the payload in bytes.
  #[inline]
  pub const fn size(&self) -> usize {
    self.bytes.len()
  }

  /// Returns the number of characters in the payload.
  #[inline]
  pub const fn length(&self) -> u32 {
    self.length
  }

  /// Returns the payload as `&str` if it is valid UTF-8.
  #[inline]
  pub fn as_str(&self) -> Option<&'a str> {
    std::str::from_utf8(self.bytes).ok()
  }
}

impl Debug for JsStr<'_> {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    match self.as_str() {
      Some(text) => Debug::fmt(text, f),
      None => Debug::fmt(self.bytes, f),
    }
  }
}

// -----------------------------------------------------------------------------
// Value
// -----------------------------------------------------------------------------

/// Payload of a [`Value`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ValueKind<'a> {
  /// Marker for slots that were never written.
  Invalid,
  Undefined,
  Null,
  Boolean(bool),
  Number(f64),
  String(JsStr<'a>),
  /// A symbol with an optional description; identity comes from the atom.
  Symbol(Option<JsStr<'a>>),
}

/// Copyable value header.
///
/// A value optionally carries the atom it was atomized to. String payloads
/// borrow their bytes, usually from the arena of the VM that interned them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Value<'a> {
  kind: ValueKind<'a>,
  atom: Option<AtomId>,
}

impl<'a> Value<'a> {
  #[inline]
  pub const fn new(kind: ValueKind<'a>) -> Self {
    Self { kind, atom: None }
  }

  #[inline]
  pub const fn invalid() -> Self {
    Self::new(ValueKind::Invalid)
  }

  #[inline]
  pub const fn undefined() -> Self {
    Self::new(ValueKind::Undefined)
  }

  #[inline]
  pub const fn null() -> Self {
    Self::new(ValueKind::Null)
  }

  #[inline]
  pub const fn boolean(value: bool) -> Self {
    Self::new(ValueKind::Boolean(value))
  }

  #[inline]
  pub const fn number(value: f64) -> Self {
    Self::new(ValueKind::Number(value))
  }

  /// Creates a string value borrowing `text`.
  #[inline]
  pub fn string(text: &'a str) -> Self {
    Self::bytes(text.as_bytes())
  }

  /// Creates a string value borrowing raw UTF-8 `bytes`.
  #[inline]
  pub fn bytes(bytes: &'a [u8]) -> Self {
    Self::new(ValueKind::String(JsStr::new(bytes)))
  }

  /// Creates a symbol value that has not been assigned an id yet.
  #[inline]
  pub fn symbol(description: Option<&'a str>) -> Self {
    Self::new(ValueKind::Symbol(description.map(|text| JsStr::new(text.as_bytes()))))
  }

  /// Returns the payload.
  #[inline]
  pub const fn kind(&self) -> ValueKind<'a> {
    self.kind
  }

  /// Returns the atom this value was atomized to.
  #[inline]
  pub const fn atom(&self) -> Option<AtomId> {
    self.atom
  }

  /// Returns `true` if the value carries an atom.
  #[inline]
  pub const fn is_atomized(&self) -> bool {
    self.atom.is_some()
  }

  #[inline]
  pub const fn is_string(&self) -> bool {
    matches!(self.kind, ValueKind::String(_))
  }

  #[inline]
  pub const fn is_symbol(&self) -> bool {
    matches!(self.kind, ValueKind::Symbol(_))
  }

  /// Returns the string payload, if any.
  #[inline]
  pub const fn as_js_str(&self) -> Option<JsStr<'a>> {
    match self.kind {
      ValueKind::String(string) => Some(string),
      _ => None,
    }
  }

  /// Returns the string payload as `&str`, if any.
  #[inline]
  pub fn as_str(&self) -> Option<&'a str> {
    self.as_js_str().and_then(|string| string.as_str())
  }

  #[inline]
  pub const fn as_number(&self) -> Option<f64> {
    match self.kind {
      ValueKind::Number(value) => Some(value),
      _ => None,
    }
  }

  #[inline]
  pub(crate) const fn with_atom(self, atom: AtomId) -> Self {
    Self {
      kind: self.kind,
      atom: Some(atom),
    }
  }

  #[inline]
  pub(crate) const fn set_atom(&mut self, atom: AtomId) {
    self.atom = Some(atom);
  }
}

impl Default for Value<'_> {
  #[inline]
  fn default() -> Self {
    Self::undefined()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
