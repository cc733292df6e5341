// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The require() function handed to sandboxed modules

use crate::error::{Result, SandboxError};
use crate::module_system::cache::{ContentHash, Module};
use crate::module_system::evaluator::Evaluator;
use crate::module_system::resolver::base_dir;
use crate::module_system::specifier::Specifier;
use crate::registry::Registry;
use crate::value::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Dependency loader for one evaluated module.
///
/// Built fresh for every evaluation and bound to the requesting module's
/// path and the plugin/preset registries of the top-level call.
#[derive(Clone)]
pub struct Require {
    evaluator: Evaluator,
    path: PathBuf,
    plugins: Registry,
    presets: Registry,
}

impl Require {
    pub(crate) fn new(
        evaluator: Evaluator,
        path: PathBuf,
        plugins: Registry,
        presets: Registry,
    ) -> Self {
        Self {
            evaluator,
            path,
            plugins,
            presets,
        }
    }

    /// Path of the module this loader belongs to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `require.resolve()`: returns the specifier unchanged.
    ///
    /// Config files pass the result straight back as a plugin name, so it
    /// must stay a registry key rather than become a filesystem path.
    pub fn resolve(&self, specifier: &str) -> String {
        specifier.to_string()
    }

    /// `require()`: load the module named by `specifier`
    pub fn load(&self, specifier: &str) -> Result<Value> {
        let classified = Specifier::classify(
            specifier,
            self.evaluator.natives(),
            &self.plugins,
            &self.presets,
        );

        match classified {
            Specifier::Assert => Ok(Value::noop("assert")),
            Specifier::EnableTranspile => {
                self.evaluator.session().enable_transpile();
                Ok(Value::noop("register"))
            }
            Specifier::EvalFromText => Ok(self.eval_from_text()),
            Specifier::Native(exports) | Specifier::Plugin(exports) | Specifier::Preset(exports) => {
                trace!(specifier, "loaded from host");
                Ok(exports)
            }
            Specifier::FilePath(specifier) => self.load_file(specifier),
        }
    }

    /// This loader as a script-callable `require` function
    pub fn as_function(&self) -> Value {
        let require = self.clone();
        Value::function("require", move |args| {
            let specifier = args.first().and_then(Value::as_str).ok_or_else(|| {
                SandboxError::type_error("The \"id\" argument must be of type string")
            })?;
            require.load(specifier)
        })
    }

    /// A function evaluating source text under the same registries, at path `/`
    fn eval_from_text(&self) -> Value {
        let evaluator = self.evaluator.clone();
        let plugins = self.plugins.clone();
        let presets = self.presets.clone();
        Value::function("requireFromString", move |args| {
            let code = args.first().and_then(Value::as_str).ok_or_else(|| {
                SandboxError::type_error("The \"code\" argument must be of type string")
            })?;
            evaluator.evaluate(code, "/", &plugins, &presets)
        })
    }

    fn load_file(&self, specifier: &str) -> Result<Value> {
        let session = self.evaluator.session();
        let base_dir = base_dir(&self.path);

        let resolved = match session.paths().get(&base_dir, specifier) {
            Some(resolved) => resolved,
            None => {
                let resolved =
                    self.evaluator
                        .resolver()
                        .resolve(specifier, &self.path, self.evaluator.fs())?;
                session.paths().set(&base_dir, specifier, resolved.clone());
                resolved
            }
        };

        let code = self.evaluator.read_source(&resolved)?;
        let hash = ContentHash::new(&code, &resolved);

        if let Some(cached) = session.modules().get(&hash) {
            debug!(path = %resolved.display(), "module cache hit");
            return Ok(cached.exports());
        }

        // Visible to re-entrant loads until `evaluate` stores the record it
        // runs. A transpiled load is stored under the transformed text's hash,
        // so this placeholder stays empty.
        session.modules().set(hash, Module::new(&resolved));

        let code = if session.transpile_enabled() {
            self.evaluator.transform(&code, &resolved)?
        } else {
            code
        };

        self.evaluator
            .evaluate(&code, &resolved, &self.plugins, &self.presets)
    }
}

impl std::fmt::Debug for Require {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Require").field("path", &self.path).finish()
    }
}
