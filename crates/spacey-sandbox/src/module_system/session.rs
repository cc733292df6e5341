// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Session-scoped module system state

use crate::module_system::cache::{ModuleCache, PathCache};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// State shared by every load of one sandbox session.
///
/// Holds the content cache, the path-resolution cache and the sticky
/// transpile-mode flag. A session assumes a single logical thread of
/// control; `reset` must not be called while an evaluation is running.
#[derive(Debug, Default)]
pub struct Session {
    modules: ModuleCache,
    paths: PathCache,
    transpile: AtomicBool,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// The content cache
    pub fn modules(&self) -> &ModuleCache {
        &self.modules
    }

    /// The path-resolution cache
    pub fn paths(&self) -> &PathCache {
        &self.paths
    }

    /// Turn on transpile mode for the rest of the session
    pub fn enable_transpile(&self) {
        if !self.transpile.swap(true, Ordering::SeqCst) {
            debug!("transpile mode enabled");
        }
    }

    /// Whether resolved modules are transformed before evaluation
    pub fn transpile_enabled(&self) -> bool {
        self.transpile.load(Ordering::SeqCst)
    }

    /// Clear both caches and the transpile flag
    pub fn reset(&self) {
        debug!(
            modules = self.modules.len(),
            paths = self.paths.len(),
            "resetting sandbox session"
        );
        self.modules.clear();
        self.paths.clear();
        self.transpile.store(false, Ordering::SeqCst);
    }
}
