//! Scope-indexed storage of constant values.

use hashbrown::HashMap;
use std::cell::RefMut;
use std::ptr::NonNull;

use crate::core::BindingKind;
use crate::core::FlatTable;
use crate::core::Level;
use crate::core::ScopeIndex;
use crate::core::ScopeType;
use crate::core::TableError;
use crate::core::Value;
use crate::core::VmError;
use crate::core::invariant;
use crate::vm::CanonicalValue;
use crate::vm::Frame;
use crate::vm::Tier;
use crate::vm::ValueKey;
use crate::vm::Vm;
use crate::vm::instance::Shared;

type ValueTable = FlatTable<NonNull<CanonicalValue>>;

impl Vm {
  // ---------------------------------------------------------------------------
  // Canonical Values
  // ---------------------------------------------------------------------------

  /// Returns the canonical copy of `value`, creating it on first sight.
  ///
  /// The shared table is probed first and, when `runtime` is set, the
  /// instance table after it. A miss allocates one aligned block holding the
  /// value, its index cell and any string payload, and inserts it into the
  /// instance table when `runtime` is set or the shared table otherwise.
  ///
  /// `value` is overwritten with the canonical copy so it borrows the
  /// block's storage rather than the caller's.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::InvariantViolation`] when a frozen template would
  /// have to be written (`runtime` unset on an instance), or
  /// [`VmError::OutOfMemory`] if allocation fails.
  pub fn value_index<'a>(&'a self, value: &mut Value<'a>, runtime: bool) -> Result<&'a CanonicalValue, VmError> {
    let key: ValueKey<'_> = ValueKey::new(value)?;
    let hash: u32 = key.hash();

    let found: Option<NonNull<CanonicalValue>> = match self.find_shared_value(hash, &key) {
      Some(block) => Some(block),
      None if runtime => find_value(&self.values.borrow(), hash, &key),
      None => None,
    };

    let block: NonNull<CanonicalValue> = match found {
      Some(block) => block,
      None => self.insert_value(value, hash, &key, runtime)?,
    };

    // SAFETY: Blocks live in this VM's arena or in the arena of its
    //         template, both of which outlive `&'a self`.
    let canonical: &'a CanonicalValue = unsafe { block.as_ref() };

    *value = canonical.value();

    Ok(canonical)
  }

  /// Returns the static scope index of `value`, allocating a slot in the
  /// absolute scope array on first use.
  ///
  /// Equal constants share one slot: the index is memoized on the canonical
  /// value, or in a private overlay when the value belongs to a frozen
  /// template.
  pub fn global_index<'a>(&'a self, value: &mut Value<'a>, runtime: bool) -> Result<ScopeIndex, VmError> {
    let canonical: &'a CanonicalValue = self.value_index(value, runtime)?;
    let block: NonNull<CanonicalValue> = NonNull::from(canonical);

    if let Some(index) = canonical.index() {
      return Ok(index);
    }

    let frozen: bool = self.is_instance() && canonical.tier() == Tier::Shared;

    if frozen {
      if let Some(index) = self.overlay.borrow().get(&block) {
        return Ok(*index);
      }
    }

    let slot: u32 = self.absolute.borrow_mut().push(block)?;

    let Some(index) = ScopeIndex::new(ScopeType::Global, slot, Level::Static, BindingKind::Var) else {
      return Err(invariant!("absolute slot out of range"));
    };

    if frozen {
      let mut overlay: RefMut<'_, HashMap<NonNull<CanonicalValue>, ScopeIndex>> = self.overlay.borrow_mut();

      overlay.try_reserve(1).map_err(|_| TableError::OutOfMemory)?;
      overlay.insert(block, index);
    } else {
      canonical.set_index(index)?;
    }

    tracing::trace!(target: "quark", slot, "global slot allocated");

    Ok(index)
  }

  // ---------------------------------------------------------------------------
  // Scope Resolution
  // ---------------------------------------------------------------------------

  /// Returns the canonical value stored behind a static index.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::InvariantViolation`] for local indices and for slots
  /// the absolute array does not hold.
  pub fn scope_value(&self, index: ScopeIndex) -> Result<&CanonicalValue, VmError> {
    if index.level() != Level::Static {
      return Err(invariant!("local index has no absolute slot"));
    }

    match self.absolute.borrow().get(index.slot()) {
      // SAFETY: See `value_index`.
      Some(block) => Ok(unsafe { block.as_ref() }),
      None => Err(invariant!("absolute slot out of range")),
    }
  }

  /// Allocates a frame of `count` local slots, all initially invalid.
  #[inline]
  pub fn make_frame<'a>(&'a self, count: u32) -> Result<Frame<'a>, VmError> {
    Frame::new(count)
  }

  /// Reads the value an index designates, at either level.
  pub fn value<'a>(&'a self, index: ScopeIndex, frame: &Frame<'a>) -> Result<Value<'a>, VmError> {
    match index.level() {
      Level::Local => match frame.get(index.slot()) {
        Some(value) => Ok(value),
        None => Err(invariant!("local slot out of range")),
      },
      Level::Static => self.scope_value(index).map(CanonicalValue::value),
    }
  }

  // ---------------------------------------------------------------------------
  // Table Access
  // ---------------------------------------------------------------------------

  fn find_shared_value(&self, hash: u32, key: &ValueKey<'_>) -> Option<NonNull<CanonicalValue>> {
    match &self.shared {
      Shared::Open { values, .. } => find_value(&values.borrow(), hash, key),
      Shared::Frozen(template) => find_value(template.value_table(), hash, key),
    }
  }

  fn insert_value(
    &self,
    value: &Value<'_>,
    hash: u32,
    key: &ValueKey<'_>,
    runtime: bool,
  ) -> Result<NonNull<CanonicalValue>, VmError> {
    let (tier, mut table): (Tier, RefMut<'_, ValueTable>) = match (&self.shared, runtime) {
      (_, true) => (Tier::Instance, self.values.borrow_mut()),
      (Shared::Open { values, .. }, false) => (Tier::Shared, values.borrow_mut()),
      (Shared::Frozen(_), false) => return Err(invariant!("shared value table is frozen")),
    };

    let block: NonNull<CanonicalValue> = CanonicalValue::alloc(&self.arena, value, tier)?;

    table.insert(hash, block, false, |stored| block_matches(stored, key))?;

    Ok(block)
  }
}

#[inline]
fn find_value(table: &ValueTable, hash: u32, key: &ValueKey<'_>) -> Option<NonNull<CanonicalValue>> {
  table.find(hash, |stored| block_matches(stored, key)).copied()
}

#[inline]
fn block_matches(stored: &NonNull<CanonicalValue>, key: &ValueKey<'_>) -> bool {
  // SAFETY: Tables only hold blocks that outlive them.
  unsafe { stored.as_ref() }.matches(key)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use triomphe::Arc;

  use super::*;
  use crate::vm::VmConfig;
  use crate::vm::VmTemplate;

  fn template() -> Vm {
    Vm::template(VmConfig::new()).unwrap()
  }

  #[test]
  fn test_value_index_dedups() {
    let vm: Vm = template();
    let source: String = String::from("constant");
    let mut first: Value<'_> = Value::string(&source);
    let mut second: Value<'_> = Value::string("constant");

    let a: *const CanonicalValue = vm.value_index(&mut first, false).unwrap();
    let allocations: usize = vm.allocations();
    let b: *const CanonicalValue = vm.value_index(&mut second, false).unwrap();

    assert_eq!(a, b);
    assert_eq!(vm.allocations(), allocations);
    assert_ne!(first.as_str().unwrap().as_ptr(), source.as_ptr());
  }

  #[test]
  fn test_value_index_separates_kinds() {
    let vm: Vm = template();
    let a: *const CanonicalValue = vm.value_index(&mut Value::string("1"), false).unwrap();
    let b: *const CanonicalValue = vm.value_index(&mut Value::number(1.0), false).unwrap();

    assert_ne!(a, b);
  }

  #[test]
  fn test_global_index_shares_slot() {
    let vm: Vm = template();
    let mut first: Value<'_> = Value::number(3.25);
    let mut second: Value<'_> = Value::number(3.25);

    let a: ScopeIndex = vm.global_index(&mut first, false).unwrap();
    let b: ScopeIndex = vm.global_index(&mut second, false).unwrap();

    assert_eq!(a, b);
    assert_eq!(vm.absolute_len(), 1);
    assert_eq!(a.decode(), (ScopeType::Global, 0, Level::Static, BindingKind::Var));
    assert_eq!(vm.scope_value(a).unwrap().value(), Value::number(3.25));
  }

  #[test]
  fn test_frozen_shared_table_rejects_writes() {
    let template: Arc<VmTemplate> = template().freeze().unwrap();
    let vm: Vm = VmTemplate::instance(&template).unwrap();

    assert!(matches!(
      vm.value_index(&mut Value::string("fresh"), false),
      Err(VmError::InvariantViolation(_)),
    ));
    assert!(vm.value_index(&mut Value::string("fresh"), true).is_ok());
  }

  #[test]
  fn test_instance_memoizes_shared_values_privately() {
    let vm: Vm = template();
    let _ignore: &CanonicalValue = vm.value_index(&mut Value::string("shared"), false).unwrap();
    let template: Arc<VmTemplate> = vm.freeze().unwrap();

    let one: Vm = VmTemplate::instance(&template).unwrap();
    let two: Vm = VmTemplate::instance(&template).unwrap();

    let mut value: Value<'_> = Value::string("shared");
    let index: ScopeIndex = one.global_index(&mut value, true).unwrap();
    let again: ScopeIndex = one.global_index(&mut Value::string("shared"), true).unwrap();

    assert_eq!(index, again);
    assert_eq!(one.absolute_len(), 1);
    assert_eq!(one.scope_value(index).unwrap().index(), None);
    assert_eq!(two.absolute_len(), 0);
  }

  #[test]
  fn test_instance_inherits_template_slots() {
    let vm: Vm = template();
    let index: ScopeIndex = vm.global_index(&mut Value::boolean(true), false).unwrap();
    let template: Arc<VmTemplate> = vm.freeze().unwrap();
    let instance: Vm = VmTemplate::instance(&template).unwrap();

    assert_eq!(instance.absolute_len(), 1);
    assert_eq!(instance.global_index(&mut Value::boolean(true), true), Ok(index));
    assert_eq!(instance.scope_value(index).unwrap().value(), Value::boolean(true));
  }

  #[test]
  fn test_value_resolves_both_levels() {
    let vm: Vm = template();
    let global: ScopeIndex = vm.global_index(&mut Value::string("g"), false).unwrap();
    let local: ScopeIndex = ScopeIndex::new(ScopeType::Function, 1, Level::Local, BindingKind::Let).unwrap();
    let mut frame: Frame<'_> = vm.make_frame(2).unwrap();

    assert_eq!(vm.value(local, &frame).unwrap(), Value::invalid());

    frame.set(1, Value::number(9.0)).unwrap();

    assert_eq!(vm.value(local, &frame).unwrap(), Value::number(9.0));
    assert_eq!(vm.value(global, &frame).unwrap().as_str(), Some("g"));
    assert!(vm.scope_value(local).is_err());
  }
}
