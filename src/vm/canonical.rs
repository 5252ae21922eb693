//! Hash-consed constant values.
//!
//! Each canonical value lives in a single arena block:
//!
//! ```text
//! +----------------+------------------+---------+------------------+
//! | CanonicalValue |  payload bytes   | padding | char offset map  |
//! +----------------+------------------+---------+------------------+
//! ```
//!
//! The header carries the value, its index cell and the descriptor of the
//! string payload. The offset map is only present for strings that contain
//! multi-byte characters and are longer than [`STRING_MAP_STRIDE`]; entry `i`
//! holds the byte offset of character `(i + 1) * STRING_MAP_STRIDE`.

use std::cell::Cell;
use std::mem;
use std::ptr::NonNull;
use std::slice;

use crate::consts::STRING_MAP_STRIDE;
use crate::core::AtomId;
use crate::core::JsStr;
use crate::core::MemoryArena;
use crate::core::ScopeIndex;
use crate::core::Value;
use crate::core::ValueKind;
use crate::core::VmError;
use crate::core::hash_bytes;
use crate::core::invariant;

// -----------------------------------------------------------------------------
// Lookup Key
// -----------------------------------------------------------------------------

/// Content a canonical value is looked up by.
///
/// Strings are keyed by their bytes and everything else by a fixed-size
/// image of its payload; the two never compare equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ValueKey<'a> {
  Text(&'a [u8]),
  Image([u8; 9]),
}

impl<'a> ValueKey<'a> {
  /// Returns the lookup key of `value`.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::InvariantViolation`] for a symbol that has not been
  /// assigned an id; such symbols have no identity to key by.
  pub(crate) fn new(value: &Value<'a>) -> Result<Self, VmError> {
    let (tag, payload): (Tag, u64) = match value.kind() {
      ValueKind::String(string) => return Ok(Self::Text(string.as_bytes())),
      ValueKind::Invalid => (Tag::Invalid, 0),
      ValueKind::Undefined => (Tag::Undefined, 0),
      ValueKind::Null => (Tag::Null, 0),
      ValueKind::Boolean(boolean) => (Tag::Boolean, boolean as u64),
      ValueKind::Number(number) => (Tag::Number, number.to_bits()),
      ValueKind::Symbol(_) => match value.atom() {
        Some(atom) => (Tag::Symbol, u64::from(atom.into_raw())),
        None => return Err(invariant!("symbol constant without id")),
      },
    };

    Ok(Self::image(tag, payload))
  }

  #[inline]
  fn image(tag: Tag, payload: u64) -> Self {
    let mut image: [u8; 9] = [0; 9];

    image[0] = tag as u8;
    image[1..].copy_from_slice(&payload.to_le_bytes());

    Self::Image(image)
  }

  /// Returns the content hash of this key.
  #[inline]
  pub(crate) fn hash(&self) -> u32 {
    match self {
      Self::Text(bytes) => hash_bytes(bytes),
      Self::Image(image) => hash_bytes(image),
    }
  }
}

// -----------------------------------------------------------------------------
// Canonical Value
// -----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
enum Tag {
  Invalid,
  Undefined,
  Null,
  Boolean,
  Number,
  String,
  Symbol,
}

/// Table that owns a canonical value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Tier {
  /// Interned into the template's shared table.
  Shared,
  /// Interned into the table of a single VM instance.
  Instance,
}

/// Descriptor of the payload stored behind the header.
///
/// `start` is derived from the whole block, not from the header, so reading
/// through it stays within the allocation it was created from.
#[derive(Clone, Copy)]
struct TextDesc {
  start: *const u8,
  size: u32,
  length: u32,
  entries: u32,
}

/// Memoized scope index of a canonical value, resolved at most once.
struct IndexCell {
  inner: Cell<u32>,
}

impl IndexCell {
  const UNRESOLVED: u32 = u32::MAX;

  #[inline]
  const fn new() -> Self {
    Self {
      inner: Cell::new(Self::UNRESOLVED),
    }
  }

  #[inline]
  fn get(&self) -> Option<ScopeIndex> {
    match self.inner.get() {
      Self::UNRESOLVED => None,
      bits => ScopeIndex::from_raw(bits).ok(),
    }
  }

  #[inline]
  fn set(&self, index: ScopeIndex) -> Result<(), VmError> {
    if self.inner.get() != Self::UNRESOLVED {
      return Err(invariant!("scope index resolved twice"));
    }

    self.inner.set(index.into_raw());

    Ok(())
  }
}

/// Deduplicated constant together with its memoized scope index.
#[repr(C)]
pub struct CanonicalValue {
  tag: Tag,
  tier: Tier,
  flag: bool,
  atom: Option<AtomId>,
  number: f64,
  index: IndexCell,
  text: TextDesc,
}

impl CanonicalValue {
  /// Allocates the canonical block for `value` in `arena`.
  pub(crate) fn alloc(arena: &MemoryArena, value: &Value<'_>, tier: Tier) -> Result<NonNull<Self>, VmError> {
    let (tag, flag, number, text): (Tag, bool, f64, Option<JsStr<'_>>) = match value.kind() {
      ValueKind::Invalid => (Tag::Invalid, false, 0.0, None),
      ValueKind::Undefined => (Tag::Undefined, false, 0.0, None),
      ValueKind::Null => (Tag::Null, false, 0.0, None),
      ValueKind::Boolean(boolean) => (Tag::Boolean, boolean, 0.0, None),
      ValueKind::Number(number) => (Tag::Number, false, number, None),
      ValueKind::String(string) => (Tag::String, false, 0.0, Some(string)),
      ValueKind::Symbol(description) => (Tag::Symbol, description.is_some(), 0.0, description),
    };

    let (bytes, length): (&[u8], u32) = match text {
      Some(string) => (string.as_bytes(), string.length()),
      None => (&[], 0),
    };

    let Ok(size) = u32::try_from(bytes.len()) else {
      return Err(VmError::OutOfMemory);
    };

    let entries: u32 = map_entries(size, length);
    let tail: usize = if entries == 0 {
      bytes.len()
    } else {
      map_offset(bytes.len()) + entries as usize * mem::size_of::<u32>()
    };

    let block: NonNull<u8> = arena.alloc_aligned(
      mem::align_of::<Self>(),
      mem::size_of::<Self>().checked_add(tail).ok_or(VmError::OutOfMemory)?,
    )?;

    // SAFETY: `block` is a fresh allocation of `size_of::<Self>() + tail`
    //         bytes aligned for `Self`. The payload starts right after the
    //         header and the map, when present, starts at a 4-byte aligned
    //         offset past the payload since the header size is a multiple of
    //         its alignment.
    unsafe {
      let start: *mut u8 = block.as_ptr().add(mem::size_of::<Self>());

      start.copy_from_nonoverlapping(bytes.as_ptr(), bytes.len());

      if entries != 0 {
        let map: *mut u32 = start.add(map_offset(bytes.len())).cast();
        write_map(bytes, map, entries as usize);
      }

      let header: *mut Self = block.as_ptr().cast();

      header.write(Self {
        tag,
        tier,
        flag,
        atom: value.atom(),
        number,
        index: IndexCell::new(),
        text: TextDesc {
          start,
          size,
          length,
          entries,
        },
      });

      Ok(NonNull::new_unchecked(header))
    }
  }

  /// Returns the canonical copy of the value.
  pub fn value(&self) -> Value<'_> {
    let kind: ValueKind<'_> = match self.tag {
      Tag::Invalid => ValueKind::Invalid,
      Tag::Undefined => ValueKind::Undefined,
      Tag::Null => ValueKind::Null,
      Tag::Boolean => ValueKind::Boolean(self.flag),
      Tag::Number => ValueKind::Number(self.number),
      Tag::String => ValueKind::String(self.text()),
      Tag::Symbol => ValueKind::Symbol(self.flag.then(|| self.text())),
    };

    match self.atom {
      Some(atom) => Value::new(kind).with_atom(atom),
      None => Value::new(kind),
    }
  }

  /// Returns the table that owns this value.
  #[inline]
  pub fn tier(&self) -> Tier {
    self.tier
  }

  /// Returns the memoized scope index, if resolved.
  #[inline]
  pub fn index(&self) -> Option<ScopeIndex> {
    self.index.get()
  }

  #[inline]
  pub(crate) fn set_index(&self, index: ScopeIndex) -> Result<(), VmError> {
    self.index.set(index)
  }

  /// Returns `true` if the block carries a character offset map.
  #[inline]
  pub fn has_offset_map(&self) -> bool {
    self.text.entries != 0
  }

  /// Returns the byte offset of character `char_index` of the payload.
  ///
  /// `char_index == length` yields the payload size; anything past that
  /// yields `None`.
  pub fn char_offset(&self, char_index: u32) -> Option<usize> {
    let TextDesc { size, length, .. } = self.text;

    if char_index > length {
      return None;
    }

    if char_index == length {
      return Some(size as usize);
    }

    if size == length {
      return Some(char_index as usize);
    }

    let bytes: &[u8] = self.text().as_bytes();
    let stride: u32 = STRING_MAP_STRIDE as u32;
    let block: u32 = char_index / stride;

    let (mut offset, mut remaining): (usize, u32) = if block == 0 || !self.has_offset_map() {
      (0, char_index)
    } else {
      (self.map()[block as usize - 1] as usize, char_index - block * stride)
    };

    while remaining > 0 {
      offset += 1;

      while offset < bytes.len() && is_continuation(bytes[offset]) {
        offset += 1;
      }

      remaining -= 1;
    }

    Some(offset)
  }

  #[inline]
  fn text(&self) -> JsStr<'_> {
    // SAFETY: `start` points at `size` initialized bytes inside the block
    //         that also holds `self`, which outlives the borrow.
    let bytes: &[u8] = unsafe { slice::from_raw_parts(self.text.start, self.text.size as usize) };

    JsStr::from_parts(bytes, self.text.length)
  }

  #[inline]
  fn map(&self) -> &[u32] {
    // SAFETY: `entries` u32 values were written at an aligned offset past
    //         the payload when the block was created.
    unsafe {
      let map: *const u32 = self.text.start.add(map_offset(self.text.size as usize)).cast();
      slice::from_raw_parts(map, self.text.entries as usize)
    }
  }

  /// Returns `true` if this value is the one `key` names.
  #[inline]
  pub(crate) fn matches(&self, key: &ValueKey<'_>) -> bool {
    match (self.tag, key) {
      (Tag::String, ValueKey::Text(bytes)) => self.text().as_bytes() == *bytes,
      (Tag::String, ValueKey::Image(_)) | (_, ValueKey::Text(_)) => false,
      (_, ValueKey::Image(image)) => {
        matches!(ValueKey::new(&self.value()), Ok(ValueKey::Image(own)) if own == *image)
      }
    }
  }
}

// -----------------------------------------------------------------------------
// Offset Map
// -----------------------------------------------------------------------------

#[inline]
const fn map_entries(size: u32, length: u32) -> u32 {
  if size != length && length as usize > STRING_MAP_STRIDE {
    (length - 1) / STRING_MAP_STRIDE as u32
  } else {
    0
  }
}

#[inline]
const fn map_offset(size: usize) -> usize {
  size.next_multiple_of(mem::align_of::<u32>())
}

#[inline]
const fn is_continuation(byte: u8) -> bool {
  byte & 0xC0 == 0x80
}

/// Fills `map` with the byte offsets of every stride boundary.
///
/// # Safety
///
/// `map` must be valid for `entries` aligned `u32` writes.
unsafe fn write_map(bytes: &[u8], map: *mut u32, entries: usize) {
  let mut chars: usize = 0;
  let mut written: usize = 0;

  for (offset, byte) in bytes.iter().enumerate() {
    if is_continuation(*byte) {
      continue;
    }

    if chars != 0 && chars % STRING_MAP_STRIDE == 0 {
      // SAFETY: `written < entries` is checked before every write.
      unsafe { map.add(written).write(offset as u32) };

      written += 1;

      if written == entries {
        return;
      }
    }

    chars += 1;
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
