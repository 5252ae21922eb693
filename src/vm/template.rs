use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::ptr::NonNull;
use triomphe::Arc;

use crate::core::FlatTable;
use crate::core::FrozenArena;
use crate::core::VmError;
use crate::vm::AtomLayer;
use crate::vm::CanonicalValue;
use crate::vm::Vm;
use crate::vm::VmConfig;

/// Frozen shared tables, cloned into every VM instance by reference.
///
/// Holds the well-known atoms, every atom and constant interned while the
/// template was built, and the absolute scope slots resolved so far.
pub struct VmTemplate {
  config: VmConfig,
  arena: FrozenArena,
  atoms: AtomLayer,
  values: FlatTable<NonNull<CanonicalValue>>,
  absolute: Vec<NonNull<CanonicalValue>>,
  next_id: u32,
}

// SAFETY: A template is never mutated after it is frozen. Instances only
//         read its tables and the canonical blocks in its arena; index cells
//         of those blocks are never written once frozen, instances memoize
//         them in a private overlay instead.
unsafe impl Send for VmTemplate {}

// SAFETY: See above.
unsafe impl Sync for VmTemplate {}

impl VmTemplate {
  pub(crate) fn new(
    config: VmConfig,
    arena: FrozenArena,
    atoms: AtomLayer,
    values: FlatTable<NonNull<CanonicalValue>>,
    absolute: Vec<NonNull<CanonicalValue>>,
    next_id: u32,
  ) -> Self {
    Self {
      config,
      arena,
      atoms,
      values,
      absolute,
      next_id,
    }
  }

  /// Creates a new VM instance backed by `this` template.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::OutOfMemory`] if the absolute scope array of the
  /// instance cannot be allocated.
  #[inline]
  pub fn instance(this: &Arc<Self>) -> Result<Vm, VmError> {
    Vm::from_template(Arc::clone(this))
  }

  #[inline]
  pub fn config(&self) -> &VmConfig {
    &self.config
  }

  /// Returns the number of shared atoms.
  #[inline]
  pub fn atoms(&self) -> usize {
    self.atoms.len()
  }

  /// Returns the number of shared canonical values.
  #[inline]
  pub fn values(&self) -> usize {
    self.values.len()
  }

  /// Returns the first atom id issued by instances.
  #[inline]
  pub fn next_id(&self) -> u32 {
    self.next_id
  }

  /// Returns the number of allocations held by the template's arena.
  #[inline]
  pub fn allocations(&self) -> usize {
    self.arena.allocations()
  }

  #[inline]
  pub(crate) fn atom_layer(&self) -> &AtomLayer {
    &self.atoms
  }

  #[inline]
  pub(crate) fn value_table(&self) -> &FlatTable<NonNull<CanonicalValue>> {
    &self.values
  }

  #[inline]
  pub(crate) fn absolute(&self) -> &[NonNull<CanonicalValue>] {
    &self.absolute
  }
}

impl Debug for VmTemplate {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("VmTemplate")
      .field("atoms", &self.atoms())
      .field("values", &self.values())
      .field("absolute", &self.absolute.len())
      .field("next_id", &self.next_id)
      .field("bytes", &self.arena.allocated_bytes())
      .finish()
  }
}
