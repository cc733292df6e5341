// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Plugin and preset registries supplied by the host

use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Which kind of transform extension a registry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryKind {
    /// Transform plugins
    Plugin,
    /// Transform presets
    Preset,
}

impl RegistryKind {
    /// Conventional package prefixes, in the order they are stripped
    pub fn prefixes(self) -> &'static [&'static str] {
        match self {
            RegistryKind::Plugin => &["babel-plugin-", "@babel/plugin-"],
            RegistryKind::Preset => &["babel-preset-", "@babel/preset-"],
        }
    }
}

/// An immutable name → object table.
///
/// Cloning is cheap; the entries are shared.
#[derive(Debug, Clone)]
pub struct Registry {
    kind: RegistryKind,
    entries: Arc<HashMap<String, Value>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new(kind: RegistryKind) -> Self {
        Self {
            kind,
            entries: Arc::new(HashMap::new()),
        }
    }

    /// Empty plugin registry
    pub fn plugins() -> Self {
        Self::new(RegistryKind::Plugin)
    }

    /// Empty preset registry
    pub fn presets() -> Self {
        Self::new(RegistryKind::Preset)
    }

    /// Create a registry from `(name, value)` pairs
    pub fn from_entries<I, S>(kind: RegistryKind, entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        Self {
            kind,
            entries: Arc::new(entries.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// The kind of this registry
    pub fn kind(&self) -> RegistryKind {
        self.kind
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up `name` exactly, then with each conventional prefix stripped.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.entries.get(name) {
            return Some(value.clone());
        }
        self.kind
            .prefixes()
            .iter()
            .filter_map(|prefix| name.strip_prefix(prefix))
            .find_map(|short| self.entries.get(short).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_order() {
        let short = Value::from("short");
        let full = Value::from("full");
        let plugins = Registry::from_entries(
            RegistryKind::Plugin,
            [("transform-runtime", short.clone()), ("babel-plugin-exact", full.clone())],
        );

        assert_eq!(plugins.lookup("transform-runtime"), Some(short.clone()));
        assert_eq!(plugins.lookup("babel-plugin-transform-runtime"), Some(short.clone()));
        assert_eq!(plugins.lookup("@babel/plugin-transform-runtime"), Some(short));
        assert_eq!(plugins.lookup("babel-plugin-exact"), Some(full));
        assert_eq!(plugins.lookup("babel-preset-transform-runtime"), None);
    }

    #[test]
    fn test_preset_prefixes() {
        let env = Value::from("env");
        let presets = Registry::from_entries(RegistryKind::Preset, [("env", env.clone())]);
        assert_eq!(presets.lookup("@babel/preset-env"), Some(env.clone()));
        assert_eq!(presets.lookup("babel-preset-env"), Some(env));
        assert_eq!(presets.lookup("babel-plugin-env"), None);
    }
}
