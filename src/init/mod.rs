//! Process-level initialization helpers.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::vm::VmConfig;

/// Error returned when the global tracing subscriber cannot be installed.
#[derive(Debug)]
pub struct InitError {
  message: String,
}

impl InitError {
  #[cold]
  #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
  fn new<E>(error: E) -> Self
  where
    E: Display,
  {
    Self {
      message: error.to_string(),
    }
  }
}

impl Display for InitError {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    write!(f, "failed to set tracing subscriber: {}", self.message)
  }
}

impl Error for InitError {}

/// Installs the global tracing subscriber described by `config`.
///
/// Embedders that bring their own subscriber should not call this. Without
/// the `tracing` feature this does nothing.
#[cfg(feature = "tracing")]
pub fn tracing_subscriber(config: &VmConfig) -> Result<(), InitError> {
  use tracing_subscriber::FmtSubscriber;
  use tracing_subscriber::fmt::format;
  use tracing_subscriber::util::SubscriberInitExt;

  FmtSubscriber::builder()
    .event_format(format().compact())
    .log_internal_errors(true)
    .with_ansi(true)
    .with_file(config.tracing_source_file)
    .with_level(true)
    .with_line_number(config.tracing_source_line)
    .with_max_level(config.tracing_filter())
    .with_target(config.tracing_source_name)
    .with_thread_ids(config.tracing_thread_info)
    .with_thread_names(config.tracing_thread_info)
    .finish()
    .try_init()
    .map_err(InitError::new)
}

#[cfg(not(feature = "tracing"))]
pub fn tracing_subscriber(_config: &VmConfig) -> Result<(), InitError> {
  Ok(())
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
