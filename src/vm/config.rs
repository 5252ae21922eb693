use crate::consts;

// -----------------------------------------------------------------------------
// VM Config
// -----------------------------------------------------------------------------

/// Configuration shared by a template and every instance created from it.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct VmConfig {
  // ---------------------------------------------------------------------------
  // Memory Configuration
  // ---------------------------------------------------------------------------
  pub arena_limit: Option<usize>,
  pub atom_id_limit: u32,
  pub absolute_capacity: usize,
  // ---------------------------------------------------------------------------
  // Tracing Subscriber Configuration
  // ---------------------------------------------------------------------------
  pub tracing_source_file: bool,
  pub tracing_source_line: bool,
  pub tracing_source_name: bool,
  pub tracing_thread_info: bool,
  pub tracing_verbose: bool,
  pub tracing_very_verbose: bool,
}

impl VmConfig {
  #[inline]
  pub fn new() -> Self {
    Self {
      arena_limit: None,
      atom_id_limit: consts::DEFAULT_ATOM_ID_LIMIT,
      absolute_capacity: consts::DEFAULT_ABSOLUTE_CAPACITY,
      tracing_source_file: false,
      tracing_source_line: false,
      tracing_source_name: true,
      tracing_thread_info: false,
      tracing_verbose: false,
      tracing_very_verbose: false,
    }
  }

  /// Returns the exclusive upper bound of interned atom ids.
  ///
  /// Never exceeds the start of the numeric atom range, whatever
  /// `atom_id_limit` is set to.
  #[inline]
  pub const fn id_limit(&self) -> u32 {
    if self.atom_id_limit < consts::ATOM_NUMBER_FLAG {
      self.atom_id_limit
    } else {
      consts::ATOM_NUMBER_FLAG
    }
  }

  #[inline]
  pub const fn tracing_filter(&self) -> tracing::Level {
    if self.tracing_very_verbose {
      tracing::Level::TRACE
    } else if self.tracing_verbose {
      tracing::Level::DEBUG
    } else {
      tracing::Level::INFO
    }
  }
}

impl Default for VmConfig {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
