//! Identifier cache used while lexing one compilation unit.

use crate::core::AtomId;
use crate::core::ChainedTable;
use crate::core::Keyword;
use crate::core::Value;
use crate::core::VmError;
use crate::core::hash_bytes;
use crate::vm::AtomEntry;
use crate::vm::Vm;

#[derive(Clone, Copy)]
struct LexEntry<'vm> {
  value: Value<'vm>,
  keyword: Option<Keyword>,
}

impl LexEntry<'_> {
  #[inline]
  fn bytes(&self) -> &[u8] {
    match self.value.as_js_str() {
      Some(string) => string.as_bytes(),
      None => &[],
    }
  }
}

/// Identifier classified by the lexer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Identifier<'vm> {
  value: Value<'vm>,
  keyword: Option<Keyword>,
}

impl<'vm> Identifier<'vm> {
  /// Returns the interned string value of the identifier.
  #[inline]
  pub fn value(&self) -> Value<'vm> {
    self.value
  }

  #[inline]
  pub fn atom(&self) -> Option<AtomId> {
    self.value.atom()
  }

  /// Returns the token of a reserved word.
  #[inline]
  pub fn keyword(&self) -> Option<Keyword> {
    self.keyword
  }
}

/// Per-compilation map from identifier text to its atom and keyword.
///
/// Repeated identifiers are answered from a chained table local to the
/// compilation; only the first sighting of each one reaches the VM's atom
/// tables.
pub struct Lexicon<'vm> {
  vm: &'vm Vm,
  table: ChainedTable<LexEntry<'vm>>,
}

impl<'vm> Lexicon<'vm> {
  #[inline]
  pub fn new(vm: &'vm Vm) -> Self {
    Self {
      vm,
      table: ChainedTable::new(),
    }
  }

  /// Returns the number of distinct identifiers seen so far.
  #[inline]
  pub fn len(&self) -> usize {
    self.table.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.table.is_empty()
  }

  /// Classifies the identifier spelled by `bytes`.
  pub fn identifier(&mut self, bytes: &[u8]) -> Result<Identifier<'vm>, VmError> {
    let hash: u32 = hash_bytes(bytes);

    if let Some(entry) = self.table.find(hash, |entry| entry.bytes() == bytes) {
      return Ok(Identifier {
        value: entry.value,
        keyword: entry.keyword,
      });
    }

    let atom: AtomEntry = self.vm.find_or_add_entry(bytes)?;

    let entry: LexEntry<'vm> = LexEntry {
      // SAFETY: The entry's bytes outlive the VM borrow.
      value: unsafe { atom.value() },
      keyword: atom.keyword(),
    };

    self.table.insert(hash, entry, false, |stored| stored.bytes() == bytes)?;

    Ok(Identifier {
      value: entry.value,
      keyword: entry.keyword,
    })
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
