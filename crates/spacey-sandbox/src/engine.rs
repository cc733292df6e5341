// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Execution engine and source transform seams

use crate::error::Result;
use crate::module_system::{Module, Require};
use crate::value::Value;
use std::path::Path;

/// Runs module source in an isolated scope.
///
/// The only ambient bindings the engine may offer the code are a `require`
/// primitive delegating to [`Require`] and a `module` object backed by
/// [`Module`]. The engine may write exports into `module` as the code runs;
/// its return value is the module's result.
///
/// Errors returned by [`Require::load`] must be propagated unchanged. Faults
/// raised by the engine itself should be reported with
/// [`SandboxError::execution`](crate::SandboxError::execution).
pub trait ExecutionEngine: Send + Sync {
    /// Run `source` and return its exports
    fn run(&self, source: &str, require: &Require, module: &Module, config: &Value)
        -> Result<Value>;
}

/// Rewrites module source before evaluation once transpile mode is enabled.
pub trait SourceTransform: Send + Sync {
    /// Transform `code` loaded from `path`
    fn transform(&self, code: &str, path: &Path) -> anyhow::Result<String>;
}

impl<F> SourceTransform for F
where
    F: Fn(&str, &Path) -> anyhow::Result<String> + Send + Sync,
{
    fn transform(&self, code: &str, path: &Path) -> anyhow::Result<String> {
        self(code, path)
    }
}
