// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Host-provided native modules

use crate::value::Value;
use std::collections::HashMap;

/// Maps built-in module names to ready-made values.
///
/// Lookups must be pure: an unknown specifier returns `None` rather than failing.
pub trait NativeModules: Send + Sync {
    /// Look up a native module by specifier
    fn lookup(&self, specifier: &str) -> Option<Value>;
}

/// A fixed table of native modules.
#[derive(Debug, Clone, Default)]
pub struct NativeModuleTable {
    modules: HashMap<String, Value>,
}

impl NativeModuleTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under `name`
    pub fn register(&mut self, name: impl Into<String>, exports: Value) -> &mut Self {
        self.modules.insert(name.into(), exports);
        self
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, name: impl Into<String>, exports: Value) -> Self {
        self.register(name, exports);
        self
    }
}

impl NativeModules for NativeModuleTable {
    fn lookup(&self, specifier: &str) -> Option<Value> {
        // Handle node: prefix
        let name = specifier.strip_prefix("node:").unwrap_or(specifier);
        self.modules.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let path = Value::object();
        let table = NativeModuleTable::new().with("path", path.clone());
        assert_eq!(table.lookup("path"), Some(path.clone()));
        assert_eq!(table.lookup("node:path"), Some(path));
        assert!(table.lookup("lodash").is_none());
    }
}
