// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-sandbox
//!
//! A synchronous `require()` evaluator for untrusted code.
//!
//! Given a module's source and path, the [`Evaluator`] runs it through a
//! host-supplied [`ExecutionEngine`] and resolves every `require()` the code
//! makes against:
//!
//! - reserved names (`assert`, `babel-register`, `require-from-string`)
//! - host [native modules](NativeModules)
//! - the plugin and preset [registries](Registry) of the call
//! - a [virtual filesystem](VirtualFileSystem), through a [`PathResolver`]
//!
//! Nested loads are memoised by a hash of their source and path in a
//! [`Session`], which the host resets between unrelated sandbox runs.
//!
//! ```rust,ignore
//! use spacey_sandbox::{Evaluator, MemoryFileSystem, Registry};
//! use std::sync::Arc;
//!
//! let fs = MemoryFileSystem::with_files([("/config.json", r#"{"presets":["env"]}"#)]);
//! let evaluator = Evaluator::new(Arc::new(fs), Arc::new(MyEngine::new()));
//! let config = evaluator.evaluate_from_path(
//!     "./config.json",
//!     "/index.js",
//!     &Registry::plugins(),
//!     &Registry::presets(),
//! )?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod error;
pub mod module_system;
pub mod native;
pub mod registry;
pub mod value;
pub mod vfs;

// Re-exports
pub use config::SandboxConfig;
pub use engine::{ExecutionEngine, SourceTransform};
pub use error::{ErrorKind, Result, SandboxError};
pub use module_system::{
    ContentHash, Evaluator, Module, ModuleRecord, NodeResolver, PathResolver, Require, Session,
};
pub use native::{NativeModuleTable, NativeModules};
pub use registry::{Registry, RegistryKind};
pub use value::{NativeFunction, ObjectRef, Value};
pub use vfs::{FsError, MemoryFileSystem, VirtualFileSystem};

/// Version of the sandbox evaluator
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
