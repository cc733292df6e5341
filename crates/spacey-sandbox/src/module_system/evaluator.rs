// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module evaluator - reads, wraps and runs modules

use crate::config::SandboxConfig;
use crate::engine::{ExecutionEngine, SourceTransform};
use crate::error::{Result, SandboxError};
use crate::module_system::cache::{ContentHash, Module};
use crate::module_system::require::Require;
use crate::module_system::resolver::{NodeResolver, PathResolver};
use crate::module_system::session::Session;
use crate::native::{NativeModuleTable, NativeModules};
use crate::registry::Registry;
use crate::value::{ObjectRef, Value};
use crate::vfs::VirtualFileSystem;
use std::path::Path;
use std::sync::Arc;
use tracing::{instrument, trace, warn};

/// Evaluates modules and their dependency graphs inside the sandbox.
///
/// Cloning is cheap; clones share collaborators and the [`Session`].
#[derive(Clone)]
pub struct Evaluator {
    fs: Arc<dyn VirtualFileSystem>,
    engine: Arc<dyn ExecutionEngine>,
    natives: Arc<dyn NativeModules>,
    resolver: Arc<dyn PathResolver>,
    transform: Option<Arc<dyn SourceTransform>>,
    session: Arc<Session>,
    config: Arc<SandboxConfig>,
    engine_env: Value,
}

impl Evaluator {
    /// Create an evaluator with no native modules, no transform, the default
    /// resolver and a fresh session
    pub fn new(fs: Arc<dyn VirtualFileSystem>, engine: Arc<dyn ExecutionEngine>) -> Self {
        let config = SandboxConfig::default();
        Self {
            fs,
            engine,
            natives: Arc::new(NativeModuleTable::new()),
            resolver: Arc::new(NodeResolver::from_config(&config)),
            transform: None,
            session: Arc::new(Session::new()),
            engine_env: env_value(&config),
            config: Arc::new(config),
        }
    }

    /// Use `natives` as the native module provider
    pub fn with_natives(mut self, natives: Arc<dyn NativeModules>) -> Self {
        self.natives = natives;
        self
    }

    /// Use `resolver` for filesystem resolution
    pub fn with_resolver(mut self, resolver: Arc<dyn PathResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Transform step applied to resolved modules once transpile mode is on
    pub fn with_transform(mut self, transform: Arc<dyn SourceTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Share `session` with other evaluators
    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = session;
        self
    }

    /// Apply `config`.
    ///
    /// This also rebuilds the resolver as a [`NodeResolver`] for the new
    /// config, so a custom resolver must be set afterwards.
    pub fn with_config(mut self, config: SandboxConfig) -> Self {
        self.resolver = Arc::new(NodeResolver::from_config(&config));
        self.engine_env = env_value(&config);
        self.config = Arc::new(config);
        self
    }

    /// The session shared by every load of this evaluator
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The active configuration
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub(crate) fn fs(&self) -> &dyn VirtualFileSystem {
        &*self.fs
    }

    pub(crate) fn natives(&self) -> &dyn NativeModules {
        &*self.natives
    }

    pub(crate) fn resolver(&self) -> &dyn PathResolver {
        &*self.resolver
    }

    /// Evaluate `code` as the module at `path`.
    ///
    /// Top-level calls are never answered from the cache: the record for
    /// `hash(code + path)` is always recreated. The engine's return value is
    /// the result, even if the code also wrote to `module.exports`.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn evaluate(
        &self,
        code: &str,
        path: impl AsRef<Path>,
        plugins: &Registry,
        presets: &Registry,
    ) -> Result<Value> {
        let path = path.as_ref();
        let module = Module::new(path);
        self.session
            .modules()
            .set(ContentHash::new(code, path), module.clone());

        let source = self.prepare_source(code, path);
        let require = Require::new(
            self.clone(),
            path.to_path_buf(),
            plugins.clone(),
            presets.clone(),
        );

        trace!(path = %path.display(), "running module");
        self.engine.run(&source, &require, &module, &self.engine_env)
    }

    /// Resolve `specifier` from `from_path`, read it and evaluate it
    #[instrument(level = "debug", skip_all, fields(specifier = specifier, from = %from_path.as_ref().display()))]
    pub fn evaluate_from_path(
        &self,
        specifier: &str,
        from_path: impl AsRef<Path>,
        plugins: &Registry,
        presets: &Registry,
    ) -> Result<Value> {
        let resolved = self
            .resolver
            .resolve(specifier, from_path.as_ref(), &*self.fs)?;
        let code = self.read_source(&resolved)?;
        self.evaluate(&code, &resolved, plugins, presets)
    }

    /// Clear both caches and the transpile flag.
    ///
    /// Must not be called while an evaluation is in flight.
    pub fn reset_state(&self) {
        self.session.reset();
    }

    /// Read `path` from the virtual filesystem as text
    pub(crate) fn read_source(&self, path: &Path) -> Result<String> {
        let bytes = self.fs.read(path).map_err(|source| SandboxError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Run the transform step over `code`
    pub(crate) fn transform(&self, code: &str, path: &Path) -> Result<String> {
        match &self.transform {
            Some(transform) => {
                transform
                    .transform(code, path)
                    .map_err(|source| SandboxError::Transform {
                        path: path.to_path_buf(),
                        source,
                    })
            }
            None => {
                warn!(path = %path.display(), "transpile mode is on but no transform is configured");
                Ok(code.to_string())
            }
        }
    }

    /// Wrap data files and append the debug source annotation
    fn prepare_source(&self, code: &str, path: &Path) -> String {
        let display = path.to_string_lossy();
        let mut source = if self.config.is_json_path(&display) {
            json_module_source(code)
        } else {
            code.to_string()
        };
        source.push_str(&format!(
            "\n//# sourceURL={}{}",
            self.config.source_url_origin, display
        ));
        source
    }
}

impl std::fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("session", &self.session)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Script that exports `text` parsed as JSON data
pub fn json_module_source(text: &str) -> String {
    let literal = serde_json::Value::String(text.to_string());
    format!("module.exports = JSON.parse({})", literal)
}

fn env_value(config: &SandboxConfig) -> Value {
    let env = ObjectRef::new();
    for (key, value) in &config.engine_env {
        env.set(key.clone(), Value::from_json(value));
    }
    Value::Object(env)
}
