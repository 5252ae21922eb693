//! Quark - identifier atomization and scope-indexed value storage for an
//! embedded script VM.
//!
//! Every property name, variable name and well-known symbol a compiled
//! program touches is mapped to a small comparable atom id, and every
//! variable slot is addressed through a packed scope index.
//!
//! # Quick Start
//!
//! ```
//! use quark::core::Value;
//! use quark::vm::Vm;
//! use quark::vm::VmConfig;
//! use quark::vm::VmTemplate;
//!
//! let template = Vm::template(VmConfig::new())?.freeze()?;
//! let vm = VmTemplate::instance(&template)?;
//!
//! let mut key = Value::string("length");
//! vm.atomize_key(&mut key)?;
//!
//! let mut constant = Value::number(1.5);
//! let index = vm.global_index(&mut constant, true)?;
//! assert_eq!(vm.scope_value(index)?.value(), Value::number(1.5));
//! # Ok::<(), quark::core::VmError>(())
//! ```
//!
//! # Core Modules
//!
//! - [`vm`]: Templates, instances and their operations
//! - [`core`]: Atoms, values, scope indices, tables and errors
//! - [`init`]: Tracing subscriber setup
//! - [`consts`]: Limits and defaults

pub mod consts;
pub mod core;
pub mod init;
pub mod vm;
