// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Evaluator configuration

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for a sandbox [`Evaluator`](crate::Evaluator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Extensions tried, in order, after the exact path
    pub extensions: Vec<String>,

    /// Package directories searched for bare specifiers
    pub module_directories: Vec<String>,

    /// Extensions whose source is data rather than code
    pub json_extensions: Vec<String>,

    /// Prefix for the `//# sourceURL=` annotation appended to every module
    pub source_url_origin: String,

    /// Fixed configuration value handed to the execution engine
    pub engine_env: BTreeMap<String, serde_json::Value>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        let mut engine_env = BTreeMap::new();
        engine_env.insert(
            "VUE_CLI_BABEL_TRANSPILE_MODULES".to_string(),
            serde_json::Value::Bool(true),
        );

        Self {
            extensions: vec![".js".to_string(), ".json".to_string()],
            module_directories: vec!["node_modules".to_string()],
            json_extensions: vec![".json".to_string()],
            source_url_origin: String::new(),
            engine_env,
        }
    }
}

impl SandboxConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether `path` names a data file
    pub fn is_json_path(&self, path: &str) -> bool {
        self.json_extensions.iter().any(|ext| path.ends_with(ext.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SandboxConfig::default();
        assert_eq!(config.extensions, vec![".js", ".json"]);
        assert_eq!(config.module_directories, vec!["node_modules"]);
        assert_eq!(
            config.engine_env.get("VUE_CLI_BABEL_TRANSPILE_MODULES"),
            Some(&serde_json::Value::Bool(true))
        );
        assert!(config.is_json_path("/x.json"));
        assert!(!config.is_json_path("/x.js"));
    }

    #[test]
    fn test_partial_json() {
        let config =
            SandboxConfig::from_json_str(r#"{"source_url_origin": "https://sandbox.test"}"#)
                .unwrap();
        assert_eq!(config.source_url_origin, "https://sandbox.test");
        assert_eq!(config.extensions, SandboxConfig::default().extensions);
    }

    #[test]
    fn test_invalid_json() {
        let err = SandboxConfig::from_json_str("{").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Config);
    }
}
