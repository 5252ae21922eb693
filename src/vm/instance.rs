use hashbrown::HashMap;
use std::cell::Cell;
use std::cell::RefCell;
use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ptr::NonNull;
use triomphe::Arc;

use crate::core::AtomId;
use crate::core::FlatTable;
use crate::core::MemoryArena;
use crate::core::ScopeIndex;
use crate::core::VmError;
use crate::core::WELL_KNOWN;
use crate::core::WellKnown;
use crate::core::invariant;
use crate::vm::AbsoluteScopeArray;
use crate::vm::AtomLayer;
use crate::vm::CanonicalValue;
use crate::vm::VmConfig;
use crate::vm::VmTemplate;

// -----------------------------------------------------------------------------
// Table Tiers
// -----------------------------------------------------------------------------

/// Shared tier as seen from a VM.
pub(super) enum Shared {
  /// The VM is building a template and owns the shared tables.
  Open {
    atoms: RefCell<AtomLayer>,
    values: RefCell<FlatTable<NonNull<CanonicalValue>>>,
  },
  /// The VM is an instance of a frozen template.
  Frozen(Arc<VmTemplate>),
}

/// Atom tables consulted by an instance.
pub(super) enum AtomTables {
  SharedOnly,
  SharedPlusInstance(AtomLayer),
}

// -----------------------------------------------------------------------------
// VM
// -----------------------------------------------------------------------------

/// Atom and scope storage of a single VM.
///
/// A VM is either a template under construction, created with
/// [`Vm::template`], or an instance of a frozen [`VmTemplate`]. Both expose
/// the same operations; they differ in where novel atoms and constants go.
/// A template interns straight into its shared tables while an instance keeps
/// its own tables on top of the immutable shared ones.
///
/// Values returned by a VM borrow from it and stay valid until it is dropped.
pub struct Vm {
  pub(super) config: VmConfig,
  pub(super) arena: MemoryArena,
  pub(super) shared: Shared,
  pub(super) atoms: RefCell<AtomTables>,
  pub(super) values: RefCell<FlatTable<NonNull<CanonicalValue>>>,
  pub(super) overlay: RefCell<HashMap<NonNull<CanonicalValue>, ScopeIndex>>,
  pub(super) absolute: RefCell<AbsoluteScopeArray>,
  pub(super) next_id: Cell<u32>,
}

// SAFETY: Every pointer held by a VM targets either its own arena, which
//         moves with it, or the arena of a template kept alive by the `Arc`
//         in `shared`. Templates are immutable and `Sync`. Values borrowed
//         from the VM cannot outlive a move of it.
unsafe impl Send for Vm {}

impl Vm {
  // ---------------------------------------------------------------------------
  // Construction
  // ---------------------------------------------------------------------------

  /// Creates a template VM seeded with the built-in well-known atoms.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::OutOfMemory`] if the shared tables cannot be
  /// allocated.
  #[inline]
  pub fn template(config: VmConfig) -> Result<Self, VmError> {
    Self::template_with(config, WELL_KNOWN)
  }

  /// Creates a template VM seeded with a custom well-known atom set.
  ///
  /// Dynamic ids start right after the largest id of `definitions`.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::InvariantViolation`] if a definition uses an id
  /// outside the interned range configured for the VM.
  pub fn template_with(config: VmConfig, definitions: &'static [WellKnown]) -> Result<Self, VmError> {
    let mut next_id: u32 = 0;

    for definition in definitions {
      let id: u32 = definition.id().into_raw();

      if id >= config.id_limit() {
        return Err(invariant!("well-known atom id out of range"));
      }

      next_id = next_id.max(id + 1);
    }

    let atoms: AtomLayer = AtomLayer::bootstrap(definitions)?;

    tracing::debug!(
      target: "quark",
      atoms = atoms.len(),
      next_id,
      "template created",
    );

    Ok(Self {
      arena: MemoryArena::with_limit(config.arena_limit),
      shared: Shared::Open {
        atoms: RefCell::new(atoms),
        values: RefCell::new(FlatTable::new()),
      },
      atoms: RefCell::new(AtomTables::SharedOnly),
      values: RefCell::new(FlatTable::new()),
      overlay: RefCell::new(HashMap::new()),
      absolute: RefCell::new(AbsoluteScopeArray::new(config.absolute_capacity)),
      next_id: Cell::new(next_id),
      config,
    })
  }

  /// Creates an instance sharing the tables of `template`.
  pub(crate) fn from_template(template: Arc<VmTemplate>) -> Result<Self, VmError> {
    let config: VmConfig = template.config().clone();
    let absolute: AbsoluteScopeArray = AbsoluteScopeArray::from_slots(template.absolute(), config.absolute_capacity)?;

    tracing::trace!(
      target: "quark",
      next_id = template.next_id(),
      absolute = absolute.len(),
      "instance created",
    );

    Ok(Self {
      arena: MemoryArena::with_limit(config.arena_limit),
      atoms: RefCell::new(AtomTables::SharedOnly),
      values: RefCell::new(FlatTable::new()),
      overlay: RefCell::new(HashMap::new()),
      absolute: RefCell::new(absolute),
      next_id: Cell::new(template.next_id()),
      shared: Shared::Frozen(template),
      config,
    })
  }

  /// Freezes a template VM, making its shared tables immutable.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::InvariantViolation`] if called on an instance.
  pub fn freeze(self) -> Result<Arc<VmTemplate>, VmError> {
    let Shared::Open { atoms, values } = self.shared else {
      return Err(invariant!("an instance cannot be frozen"));
    };

    let template: VmTemplate = VmTemplate::new(
      self.config,
      self.arena.freeze(),
      atoms.into_inner(),
      values.into_inner(),
      self.absolute.into_inner().as_slice().to_vec(),
      self.next_id.get(),
    );

    tracing::debug!(
      target: "quark",
      atoms = template.atoms(),
      values = template.values(),
      absolute = template.absolute().len(),
      "template frozen",
    );

    Ok(Arc::new(template))
  }

  // ---------------------------------------------------------------------------
  // Introspection
  // ---------------------------------------------------------------------------

  #[inline]
  pub fn config(&self) -> &VmConfig {
    &self.config
  }

  /// Returns `true` if this VM is an instance of a frozen template.
  #[inline]
  pub fn is_instance(&self) -> bool {
    matches!(self.shared, Shared::Frozen(_))
  }

  /// Returns the id the next novel atom will receive.
  #[inline]
  pub fn next_atom_id(&self) -> u32 {
    self.next_id.get()
  }

  /// Returns the number of atoms in the shared tier.
  pub fn shared_atoms(&self) -> usize {
    match &self.shared {
      Shared::Open { atoms, .. } => atoms.borrow().len(),
      Shared::Frozen(template) => template.atoms(),
    }
  }

  /// Returns the number of atoms private to this instance, or `None` if the
  /// instance table has not been created.
  pub fn instance_atoms(&self) -> Option<usize> {
    match &*self.atoms.borrow() {
      AtomTables::SharedOnly => None,
      AtomTables::SharedPlusInstance(layer) => Some(layer.len()),
    }
  }

  /// Returns the number of slots in the absolute scope array.
  #[inline]
  pub fn absolute_len(&self) -> usize {
    self.absolute.borrow().len()
  }

  /// Returns the number of allocations served by this VM's own arena.
  #[inline]
  pub fn allocations(&self) -> usize {
    self.arena.allocations()
  }

  // ---------------------------------------------------------------------------
  // Id Generator
  // ---------------------------------------------------------------------------

  /// Issues the next dynamic atom id.
  ///
  /// The counter stops at the configured limit and never wraps into the
  /// numeric atom range.
  pub(super) fn issue_id(&self) -> Result<AtomId, VmError> {
    let id: u32 = self.next_id.get();

    if id >= self.config.id_limit() {
      tracing::error!(target: "quark", id, "atom id space exhausted");
      return Err(VmError::TooManyAtoms);
    }

    self.next_id.set(id + 1);

    Ok(AtomId::from_raw(id))
  }
}

impl Debug for Vm {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Vm")
      .field("instance", &self.is_instance())
      .field("next_id", &self.next_id.get())
      .field("shared_atoms", &self.shared_atoms())
      .field("instance_atoms", &self.instance_atoms())
      .field("absolute", &self.absolute_len())
      .field("arena", &self.arena)
      .finish()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::Keyword;
  use crate::core::WELL_KNOWN_COUNT;

  static CUSTOM: &[WellKnown] = &[
    WellKnown::symbol(AtomId::from_raw(7), "Symbol.custom"),
    WellKnown::string(AtomId::from_raw(2), "length", None),
    WellKnown::string(AtomId::from_raw(3), "if", Some(Keyword::If)),
  ];

  #[test]
  fn test_template_starts_after_well_known() {
    let vm: Vm = Vm::template(VmConfig::new()).unwrap();

    assert!(!vm.is_instance());
    assert_eq!(vm.next_atom_id(), WELL_KNOWN_COUNT);
    assert_eq!(vm.shared_atoms(), WELL_KNOWN.len());
    assert_eq!(vm.instance_atoms(), None);
  }

  #[test]
  fn test_custom_definitions_set_next_id() {
    let vm: Vm = Vm::template_with(VmConfig::new(), CUSTOM).unwrap();

    assert_eq!(vm.next_atom_id(), 8);
    assert_eq!(vm.shared_atoms(), 3);
  }

  #[test]
  fn test_definitions_respect_id_limit() {
    let mut config: VmConfig = VmConfig::new();

    config.atom_id_limit = 5;

    assert!(matches!(
      Vm::template_with(config, CUSTOM),
      Err(VmError::InvariantViolation(_)),
    ));
  }

  #[test]
  fn test_issue_id_stops_at_limit() {
    let mut config: VmConfig = VmConfig::new();

    config.atom_id_limit = 9;

    let vm: Vm = Vm::template_with(config, CUSTOM).unwrap();

    assert_eq!(vm.issue_id(), Ok(AtomId::from_raw(8)));
    assert_eq!(vm.issue_id(), Err(VmError::TooManyAtoms));
    assert_eq!(vm.issue_id(), Err(VmError::TooManyAtoms));
    assert_eq!(vm.next_atom_id(), 9);
  }

  #[test]
  fn test_freeze_and_instantiate() {
    let vm: Vm = Vm::template(VmConfig::new()).unwrap();
    let template: Arc<VmTemplate> = vm.freeze().unwrap();
    let instance: Vm = VmTemplate::instance(&template).unwrap();

    assert!(instance.is_instance());
    assert_eq!(instance.next_atom_id(), WELL_KNOWN_COUNT);
    assert_eq!(instance.shared_atoms(), WELL_KNOWN.len());
    assert!(matches!(instance.freeze(), Err(VmError::InvariantViolation(_))));
  }
}
