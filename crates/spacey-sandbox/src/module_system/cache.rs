// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Content and path-resolution caches for require()

use crate::value::Value;
use dashmap::DashMap;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Digest of a module's source text combined with its resolved path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Hash `source` followed by `path`
    pub fn new(source: &str, path: &Path) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update(path.to_string_lossy().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Hex form of the digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A module's identity and its exported value
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    /// The module's path
    pub id: PathBuf,
    /// The module's exports
    pub exports: Value,
}

/// Shared handle to a [`ModuleRecord`].
///
/// The engine fills in `exports` while the module runs; re-entrant loads of
/// the same content see whatever has been written so far.
#[derive(Debug, Clone)]
pub struct Module(Arc<Mutex<ModuleRecord>>);

impl Module {
    /// A record for `id` with empty object exports
    pub fn new(id: impl Into<PathBuf>) -> Self {
        Self(Arc::new(Mutex::new(ModuleRecord {
            id: id.into(),
            exports: Value::object(),
        })))
    }

    /// The module's path
    pub fn id(&self) -> PathBuf {
        self.0.lock().id.clone()
    }

    /// The module's current exports
    pub fn exports(&self) -> Value {
        self.0.lock().exports.clone()
    }

    /// Replace the module's exports (`module.exports = ...`)
    pub fn set_exports(&self, exports: Value) {
        self.0.lock().exports = exports;
    }

    /// Set one export on an object-valued `exports` (`exports.name = ...`).
    ///
    /// Non-object exports are first replaced with an empty object.
    pub fn set_export(&self, name: impl Into<String>, value: Value) {
        let exports = {
            let mut record = self.0.lock();
            if record.exports.as_object().is_none() {
                record.exports = Value::object();
            }
            record.exports.clone()
        };
        if let Value::Object(obj) = exports {
            obj.set(name, value);
        }
    }

    /// Copy of the underlying record
    pub fn record(&self) -> ModuleRecord {
        self.0.lock().clone()
    }

    /// Whether both handles refer to the same record
    pub fn ptr_eq(&self, other: &Module) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Memo of evaluated modules keyed by content hash
#[derive(Debug, Default)]
pub struct ModuleCache {
    cache: DashMap<ContentHash, Module>,
}

impl ModuleCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached module by hash
    pub fn get(&self, hash: &ContentHash) -> Option<Module> {
        self.cache.get(hash).map(|entry| entry.value().clone())
    }

    /// Add or overwrite a module
    pub fn set(&self, hash: ContentHash, module: Module) {
        self.cache.insert(hash, module);
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Get the number of cached modules
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Memo of specifier resolutions, per requesting directory
#[derive(Debug, Default)]
pub struct PathCache {
    dirs: DashMap<PathBuf, HashMap<String, PathBuf>>,
}

impl PathCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached resolution of `specifier` requested from `base_dir`
    pub fn get(&self, base_dir: &Path, specifier: &str) -> Option<PathBuf> {
        self.dirs
            .get(base_dir)
            .and_then(|entries| entries.get(specifier).cloned())
    }

    /// Remember that `specifier` from `base_dir` resolved to `resolved`
    pub fn set(&self, base_dir: &Path, specifier: &str, resolved: PathBuf) {
        self.dirs
            .entry(base_dir.to_path_buf())
            .or_default()
            .insert(specifier.to_string(), resolved);
    }

    /// Clear the entire cache
    pub fn clear(&self) {
        self.dirs.clear();
    }

    /// Total number of cached resolutions
    pub fn len(&self) -> usize {
        self.dirs.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
