//! Atomization of property keys and identifiers.

use std::cell::RefMut;

use crate::core::Atom;
use crate::core::AtomId;
use crate::core::Value;
use crate::core::ValueKind;
use crate::core::VmError;
use crate::core::canonical_numeric_index;
use crate::core::invariant;
use crate::core::number_index;
use crate::core::number_to_string;
use crate::core::utf8_length;
use crate::vm::AtomEntry;
use crate::vm::AtomLayer;
use crate::vm::AtomQuery;
use crate::vm::Vm;
use crate::vm::instance::AtomTables;
use crate::vm::instance::Shared;

impl Vm {
  // ---------------------------------------------------------------------------
  // Atomization
  // ---------------------------------------------------------------------------

  /// Returns the string atom for `bytes`, interning them if needed.
  ///
  /// Probes the current table, then the shared one. On a miss the bytes are
  /// copied into the VM's arena and inserted into the current table under a
  /// fresh id: the shared table while building a template, the instance
  /// table otherwise.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::TooManyAtoms`] once the id space is exhausted, or
  /// [`VmError::OutOfMemory`] if the bytes or the table cannot grow.
  pub fn find_or_add<'a>(&'a self, bytes: &[u8]) -> Result<Value<'a>, VmError> {
    let entry: AtomEntry = self.find_or_add_entry(bytes)?;

    // SAFETY: Entries point into static data, this VM's arena or the arena
    //         of its template, all of which outlive `&'a self`.
    Ok(unsafe { entry.value() })
  }

  pub(crate) fn find_or_add_entry(&self, bytes: &[u8]) -> Result<AtomEntry, VmError> {
    let query: AtomQuery<'_> = AtomQuery::String(bytes);

    if let Some(entry) = self.find_atom(&query) {
      return Ok(entry);
    }

    let id: AtomId = self.issue_id()?;
    let stored: &[u8] = self.arena.alloc_bytes(bytes)?;
    let entry: AtomEntry = AtomEntry::string(id, stored, utf8_length(bytes) as u32, None);

    self.insert_atom(entry)?;

    tracing::trace!(target: "quark", atom = %id, size = bytes.len(), "atom created");

    Ok(entry)
  }

  /// Assigns an atom to a property key.
  ///
  /// - Strings that are the canonical rendering of an integer below
  ///   `2^31` become numeric atoms without touching a table; other strings
  ///   are interned and `value` is replaced by the interned copy.
  /// - Numbers that are such integers take the same numeric fast path;
  ///   anything else is rendered to its canonical string and atomized as
  ///   that string, so `1.5` and `"1.5"` share an atom.
  /// - Symbols already carry their atom and, like every other kind, are
  ///   left alone.
  ///
  /// A value that is already atomized is left untouched.
  pub fn atomize_key<'a>(&'a self, value: &mut Value<'a>) -> Result<(), VmError> {
    if value.is_atomized() {
      return Ok(());
    }

    match value.kind() {
      ValueKind::String(string) => {
        if let Some(atom) = numeric_key(string.as_bytes()) {
          value.set_atom(atom);
        } else {
          *value = self.find_or_add(string.as_bytes())?;
        }
      }
      ValueKind::Number(number) => {
        if let Some(atom) = number_index(number).and_then(AtomId::number) {
          value.set_atom(atom);
        } else {
          let text: String = number_to_string(number);

          let atom: AtomId = match numeric_key(text.as_bytes()) {
            Some(atom) => atom,
            None => self.find_or_add_entry(text.as_bytes())?.id,
          };

          value.set_atom(atom);
        }
      }
      _ => {}
    }

    Ok(())
  }

  /// Assigns a fresh id to `value`.
  ///
  /// Only symbols are recorded in the atom table, keyed by their new id;
  /// other values just receive the id.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::InvariantViolation`] if `value` already carries an
  /// atom.
  pub fn symbol_add(&self, value: &mut Value<'_>) -> Result<(), VmError> {
    if value.is_atomized() {
      return Err(invariant!("symbol already has an id"));
    }

    let id: AtomId = self.issue_id()?;

    if let ValueKind::Symbol(description) = value.kind() {
      let description: Option<&[u8]> = match description {
        Some(string) => Some(self.arena.alloc_bytes(string.as_bytes())?),
        None => None,
      };

      self.insert_atom(AtomEntry::symbol(id, description))?;

      tracing::trace!(target: "quark", atom = %id, "symbol created");
    }

    value.set_atom(id);

    Ok(())
  }

  // ---------------------------------------------------------------------------
  // Reverse Lookup
  // ---------------------------------------------------------------------------

  /// Returns the key named by `atom`.
  ///
  /// Numeric atoms decode to numbers; interned atoms resolve to the string
  /// or symbol they were created for.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::InvariantViolation`] if no table knows `atom`.
  pub fn atom_to_value(&self, atom: AtomId) -> Result<Value<'_>, VmError> {
    match atom.atom() {
      Atom::Number(number) => Ok(Value::number(f64::from(number)).with_atom(atom)),
      Atom::Interned(_) => match self.find_atom_by_id(atom) {
        // SAFETY: See `find_or_add`.
        Some(entry) => Ok(unsafe { entry.value() }),
        None => Err(invariant!("unknown atom id")),
      },
    }
  }

  /// Returns the symbol identified by `atom`, if it exists.
  pub fn symbol(&self, atom: AtomId) -> Option<Value<'_>> {
    self
      .find_atom(&AtomQuery::Symbol(atom))
      // SAFETY: See `find_or_add`.
      .map(|entry| unsafe { entry.value() })
  }

  // ---------------------------------------------------------------------------
  // Table Access
  // ---------------------------------------------------------------------------

  /// Probes the instance table, then the shared table.
  fn find_atom(&self, query: &AtomQuery<'_>) -> Option<AtomEntry> {
    if let AtomTables::SharedPlusInstance(layer) = &*self.atoms.borrow() {
      if let Some(entry) = layer.find(query) {
        return Some(*entry);
      }
    }

    self.with_shared_atoms(|layer| layer.find(query).copied())
  }

  fn find_atom_by_id(&self, atom: AtomId) -> Option<AtomEntry> {
    if let AtomTables::SharedPlusInstance(layer) = &*self.atoms.borrow() {
      if let Some(entry) = layer.get(atom) {
        return Some(*entry);
      }
    }

    self.with_shared_atoms(|layer| layer.get(atom).copied())
  }

  fn with_shared_atoms<F, R>(&self, f: F) -> R
  where
    F: FnOnce(&AtomLayer) -> R,
  {
    match &self.shared {
      Shared::Open { atoms, .. } => f(&atoms.borrow()),
      Shared::Frozen(template) => f(template.atom_layer()),
    }
  }

  /// Inserts a novel atom into the current table.
  fn insert_atom(&self, entry: AtomEntry) -> Result<(), VmError> {
    if let Shared::Open { atoms, .. } = &self.shared {
      return atoms.borrow_mut().insert(entry, false);
    }

    let mut tables: RefMut<'_, AtomTables> = self.atoms.borrow_mut();

    if matches!(*tables, AtomTables::SharedOnly) {
      tracing::debug!(target: "quark", "instance atom table created");
      *tables = AtomTables::SharedPlusInstance(AtomLayer::new());
    }

    match &mut *tables {
      AtomTables::SharedPlusInstance(layer) => layer.insert(entry, false),
      AtomTables::SharedOnly => Err(invariant!("instance atom table missing")),
    }
  }
}

/// Returns the numeric atom for a string key, if it takes the fast path.
#[inline]
fn numeric_key(bytes: &[u8]) -> Option<AtomId> {
  canonical_numeric_index(bytes)
    .and_then(number_index)
    .and_then(AtomId::number)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
