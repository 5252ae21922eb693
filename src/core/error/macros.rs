//! Internal error handling macros.

/// Logs a broken invariant and evaluates to the matching [`VmError`].
///
/// Invariant violations are never recovered from inside the VM, but they are
/// returned rather than aborting so the owner can drop the affected instance.
///
/// # Examples
///
/// ```ignore
/// if slot >= frame.len() {
///   return Err(invariant!("local slot out of range"));
/// }
/// ```
///
/// [`VmError`]: crate::core::VmError
macro_rules! invariant {
  ($error:literal) => {{
    ::tracing::error!(
      target: "quark",
      site = ::std::concat!(::std::file!(), ":", ::std::line!()),
      "(SysInv) a system invariant has been broken: {}",
      $error,
    );

    $crate::core::VmError::InvariantViolation($error)
  }};
}

pub(crate) use invariant;
