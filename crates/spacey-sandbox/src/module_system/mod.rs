// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Sandboxed CommonJS module system
//!
//! - `require()` with reserved names, native modules, plugin/preset registries
//!   and filesystem resolution, in that order
//! - Memoisation of nested loads by content hash
//! - Per-directory memo of specifier resolutions
//! - Sticky transpile mode switched on by `require("babel-register")`

mod cache;
mod evaluator;
mod require;
mod resolver;
mod session;
mod specifier;

pub use cache::{ContentHash, Module, ModuleCache, ModuleRecord, PathCache};
pub use evaluator::{json_module_source, Evaluator};
pub use require::Require;
pub use resolver::{base_dir, normalize, NodeResolver, PathResolver};
pub use session::Session;
pub use specifier::{Specifier, ASSERT, EVAL_FROM_STRING, TRANSPILE_REGISTER};
