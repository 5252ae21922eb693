use std::ptr::NonNull;

use crate::core::BindingKind;
use crate::core::Level;
use crate::core::ScopeIndex;
use crate::core::ScopeType;
use crate::core::Value;
use crate::core::VmError;
use crate::core::invariant;
use crate::vm::CanonicalValue;

// -----------------------------------------------------------------------------
// Absolute Scope Array
// -----------------------------------------------------------------------------

/// Append-only array backing every `Static` scope index of a VM.
///
/// Each slot points at a canonical value block owned by the VM or by the
/// template it was created from.
pub(crate) struct AbsoluteScopeArray {
  slots: Vec<NonNull<CanonicalValue>>,
  initial: usize,
}

impl AbsoluteScopeArray {
  /// Creates an empty array that allocates `initial` slots on first use.
  #[inline]
  pub(crate) const fn new(initial: usize) -> Self {
    Self {
      slots: Vec::new(),
      initial,
    }
  }

  /// Creates an array that starts out holding `slots`.
  pub(crate) fn from_slots(slots: &[NonNull<CanonicalValue>], initial: usize) -> Result<Self, VmError> {
    let mut this: Self = Self::new(initial);

    this
      .slots
      .try_reserve_exact(slots.len().max(initial))
      .map_err(|_| VmError::OutOfMemory)?;

    this.slots.extend_from_slice(slots);

    Ok(this)
  }

  #[inline]
  pub(crate) fn len(&self) -> usize {
    self.slots.len()
  }

  #[inline]
  pub(crate) fn capacity(&self) -> usize {
    self.slots.capacity()
  }

  #[inline]
  pub(crate) fn get(&self, slot: u32) -> Option<NonNull<CanonicalValue>> {
    self.slots.get(slot as usize).copied()
  }

  #[inline]
  pub(crate) fn as_slice(&self) -> &[NonNull<CanonicalValue>] {
    &self.slots
  }

  /// Appends `value`, returning its slot.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::OutOfMemory`] if the array cannot grow, or
  /// [`VmError::InvariantViolation`] if the slot would not fit a
  /// [`ScopeIndex`].
  pub(crate) fn push(&mut self, value: NonNull<CanonicalValue>) -> Result<u32, VmError> {
    let slot: u32 = match u32::try_from(self.slots.len()) {
      Ok(slot) if slot <= ScopeIndex::MAX_SLOT => slot,
      _ => return Err(invariant!("absolute scope array exhausted")),
    };

    if self.slots.len() == self.slots.capacity() {
      self.grow()?;
    }

    self.slots.push(value);

    Ok(slot)
  }

  fn grow(&mut self) -> Result<(), VmError> {
    let capacity: usize = match self.slots.capacity() {
      0 => self.initial.max(1),
      size => size.checked_mul(2).ok_or(VmError::OutOfMemory)?,
    };

    self
      .slots
      .try_reserve_exact(capacity - self.slots.len())
      .map_err(|_| VmError::OutOfMemory)?;

    tracing::debug!(
      target: "quark",
      capacity = self.capacity(),
      "absolute scope array grown",
    );

    Ok(())
  }
}

// -----------------------------------------------------------------------------
// Frame
// -----------------------------------------------------------------------------

/// Local slots of one function invocation.
///
/// Every slot starts out [`Invalid`][crate::core::ValueKind::Invalid].
#[derive(Debug)]
pub struct Frame<'a> {
  slots: Vec<Value<'a>>,
}

impl<'a> Frame<'a> {
  /// Allocates a frame of `count` slots.
  pub fn new(count: u32) -> Result<Self, VmError> {
    let mut slots: Vec<Value<'a>> = Vec::new();

    slots
      .try_reserve_exact(count as usize)
      .map_err(|_| VmError::OutOfMemory)?;

    slots.resize(count as usize, Value::invalid());

    Ok(Self { slots })
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.slots.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  #[inline]
  pub fn get(&self, slot: u32) -> Option<Value<'a>> {
    self.slots.get(slot as usize).copied()
  }

  /// Stores `value` in `slot`.
  pub fn set(&mut self, slot: u32, value: Value<'a>) -> Result<(), VmError> {
    match self.slots.get_mut(slot as usize) {
      Some(entry) => {
        *entry = value;
        Ok(())
      }
      None => Err(invariant!("local slot out of range")),
    }
  }
}

// -----------------------------------------------------------------------------
// Parser Scope
// -----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
struct Scope {
  scope_type: ScopeType,
  items: u32,
}

/// Chain of lexical scopes open while compiling a function body.
///
/// Temporaries are always allocated in the innermost function (or global)
/// scope, so block scopes share the slots of their function.
#[derive(Clone, Debug)]
pub struct ParserScope {
  chain: Vec<Scope>,
}

impl ParserScope {
  /// Creates a chain holding only the global scope.
  #[inline]
  pub fn new() -> Self {
    Self {
      chain: vec![Scope {
        scope_type: ScopeType::Global,
        items: 0,
      }],
    }
  }

  /// Opens a nested scope.
  #[inline]
  pub fn enter(&mut self, scope_type: ScopeType) {
    self.chain.push(Scope { scope_type, items: 0 });
  }

  /// Closes the innermost scope.
  pub fn leave(&mut self) -> Result<ScopeType, VmError> {
    if self.chain.len() <= 1 {
      return Err(invariant!("cannot leave the global scope"));
    }

    match self.chain.pop() {
      Some(scope) => Ok(scope.scope_type),
      None => Err(invariant!("empty scope chain")),
    }
  }

  /// Returns the type of the innermost scope.
  #[inline]
  pub fn scope_type(&self) -> Option<ScopeType> {
    self.chain.last().map(|scope| scope.scope_type)
  }

  /// Returns the number of slots allocated in the innermost function scope.
  #[inline]
  pub fn items(&self) -> u32 {
    self.function_scope().map_or(0, |scope| scope.items)
  }

  /// Allocates the next local `Var` slot of the innermost function scope.
  ///
  /// # Errors
  ///
  /// Returns [`VmError::InvariantViolation`] if the chain has no function
  /// scope or its slots are exhausted.
  pub fn temp_index(&mut self) -> Result<ScopeIndex, VmError> {
    let Some(scope) = self.function_scope_mut() else {
      return Err(invariant!("no function scope"));
    };

    let Some(index) = ScopeIndex::new(scope.scope_type, scope.items, Level::Local, BindingKind::Var) else {
      return Err(invariant!("local slots exhausted"));
    };

    scope.items += 1;

    Ok(index)
  }

  #[inline]
  fn function_scope(&self) -> Option<&Scope> {
    self.chain.iter().rev().find(|scope| is_function(scope.scope_type))
  }

  #[inline]
  fn function_scope_mut(&mut self) -> Option<&mut Scope> {
    self.chain.iter_mut().rev().find(|scope| is_function(scope.scope_type))
  }
}

impl Default for ParserScope {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

#[inline]
const fn is_function(scope_type: ScopeType) -> bool {
  matches!(scope_type, ScopeType::Function | ScopeType::Global)
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
