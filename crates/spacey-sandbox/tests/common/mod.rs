// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Shared fakes for module system integration tests
//!
//! `ScriptEngine` understands one statement per line:
//!
//! ```text
//! module.exports = EXPR
//! exports.NAME = EXPR
//! return EXPR
//! throw MESSAGE
//! EXPR
//! ```
//!
//! where `EXPR` is `require("x")`, `require("x")("arg")`,
//! `require.resolve("x")`, `JSON.parse("...")` or a JSON literal.
//! Lines starting with `//` are comments.

#![allow(dead_code)]

use parking_lot::Mutex;
use spacey_sandbox::{
    Evaluator, ExecutionEngine, FsError, MemoryFileSystem, Module, NativeModuleTable,
    NativeModules, NodeResolver, PathResolver, Require, Result, SandboxError, Value,
    VirtualFileSystem,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Install a test subscriber once; `RUST_LOG=spacey_sandbox=trace` shows loader activity
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Line-oriented fake engine that records every run
#[derive(Default)]
pub struct ScriptEngine {
    runs: AtomicUsize,
    executed: Mutex<Vec<PathBuf>>,
    sources: Mutex<Vec<String>>,
    last_config: Mutex<Option<Value>>,
}

impl ScriptEngine {
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<PathBuf> {
        self.executed.lock().clone()
    }

    pub fn sources(&self) -> Vec<String> {
        self.sources.lock().clone()
    }

    pub fn last_config(&self) -> Option<Value> {
        self.last_config.lock().clone()
    }

    fn eval_expr(&self, expr: &str, require: &Require, module: &Module) -> Result<Value> {
        let expr = expr.trim();

        if let Some(rest) = expr.strip_prefix("require.resolve(") {
            let (specifier, rest) = string_literal(rest, module)?;
            expect_end(rest, ")", module)?;
            return Ok(Value::String(require.resolve(&specifier)));
        }

        if let Some(rest) = expr.strip_prefix("require(") {
            let (specifier, rest) = string_literal(rest, module)?;
            let rest = rest
                .strip_prefix(')')
                .ok_or_else(|| syntax_error(module, "expected `)`"))?;
            let exports = require
                .as_function()
                .call(&[Value::String(specifier)])?;
            if let Some(args) = rest.strip_prefix('(') {
                let (arg, rest) = string_literal(args, module)?;
                expect_end(rest, ")", module)?;
                return exports.call(&[Value::String(arg)]);
            }
            expect_end(rest, "", module)?;
            return Ok(exports);
        }

        if let Some(rest) = expr.strip_prefix("JSON.parse(") {
            let (text, rest) = string_literal(rest, module)?;
            expect_end(rest, ")", module)?;
            return parse_json(&text, module);
        }

        parse_json(expr, module)
    }
}

impl ExecutionEngine for ScriptEngine {
    fn run(
        &self,
        source: &str,
        require: &Require,
        module: &Module,
        config: &Value,
    ) -> Result<Value> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.executed.lock().push(module.id());
        self.sources.lock().push(source.to_string());
        *self.last_config.lock() = Some(config.clone());

        for line in source.lines().map(str::trim) {
            if line.is_empty() || line.starts_with("//") {
                continue;
            }

            if let Some(message) = line.strip_prefix("throw ") {
                return Err(SandboxError::execution(
                    module.id(),
                    anyhow::anyhow!("{}", message),
                ));
            }
            if let Some(expr) = line.strip_prefix("return ") {
                return self.eval_expr(expr, require, module);
            }
            if let Some(expr) = line.strip_prefix("module.exports = ") {
                let value = self.eval_expr(expr, require, module)?;
                module.set_exports(value);
                continue;
            }
            if let Some(assignment) = line.strip_prefix("exports.") {
                let (name, expr) = assignment
                    .split_once(" = ")
                    .ok_or_else(|| syntax_error(module, "expected `=`"))?;
                let value = self.eval_expr(expr, require, module)?;
                module.set_export(name, value);
                continue;
            }

            self.eval_expr(line, require, module)?;
        }

        Ok(module.exports())
    }
}

fn syntax_error(module: &Module, message: &str) -> SandboxError {
    SandboxError::execution(module.id(), anyhow::anyhow!("SyntaxError: {}", message))
}

fn expect_end(rest: &str, expected: &str, module: &Module) -> Result<()> {
    if rest.trim() == expected {
        Ok(())
    } else {
        Err(syntax_error(module, &format!("unexpected `{}`", rest)))
    }
}

/// Split a leading JSON string literal off `s`
fn string_literal<'a>(s: &'a str, module: &Module) -> Result<(String, &'a str)> {
    let s = s.trim_start();
    if !s.starts_with('"') {
        return Err(syntax_error(module, "expected string literal"));
    }

    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                let literal: String = serde_json::from_str(&s[..=i])
                    .map_err(|e| SandboxError::execution(module.id(), e))?;
                return Ok((literal, &s[i + 1..]));
            }
            _ => {}
        }
    }

    Err(syntax_error(module, "unterminated string literal"))
}

fn parse_json(text: &str, module: &Module) -> Result<Value> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|e| SandboxError::execution(module.id(), e))?;
    Ok(Value::from_json(&json))
}

/// Memory filesystem that counts reads
#[derive(Default)]
pub struct CountingFs {
    pub inner: MemoryFileSystem,
    reads: AtomicUsize,
}

impl CountingFs {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self {
            inner: MemoryFileSystem::with_files(files.iter().copied()),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl VirtualFileSystem for CountingFs {
    fn read(&self, path: &Path) -> std::result::Result<Vec<u8>, FsError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }
}

/// Node resolver that counts resolutions
#[derive(Default)]
pub struct CountingResolver {
    inner: NodeResolver,
    calls: AtomicUsize,
}

impl CountingResolver {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PathResolver for CountingResolver {
    fn resolve(
        &self,
        specifier: &str,
        from_file: &Path,
        fs: &dyn VirtualFileSystem,
    ) -> Result<PathBuf> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(specifier, from_file, fs)
    }
}

/// Resolver that maps every specifier to one path
pub struct FixedResolver(pub PathBuf);

impl PathResolver for FixedResolver {
    fn resolve(&self, _: &str, _: &Path, _: &dyn VirtualFileSystem) -> Result<PathBuf> {
        Ok(self.0.clone())
    }
}

/// Native module table that counts lookups
#[derive(Default)]
pub struct CountingNatives {
    table: NativeModuleTable,
    lookups: AtomicUsize,
}

impl CountingNatives {
    pub fn new(table: NativeModuleTable) -> Self {
        Self {
            table,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl NativeModules for CountingNatives {
    fn lookup(&self, specifier: &str) -> Option<Value> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.table.lookup(specifier)
    }
}

/// An evaluator wired to counting fakes
pub struct Harness {
    pub fs: Arc<CountingFs>,
    pub engine: Arc<ScriptEngine>,
    pub resolver: Arc<CountingResolver>,
    pub natives: Arc<CountingNatives>,
    pub evaluator: Evaluator,
}

impl Harness {
    pub fn new(files: &[(&str, &str)]) -> Self {
        Self::with_natives(files, NativeModuleTable::new())
    }

    pub fn with_natives(files: &[(&str, &str)], table: NativeModuleTable) -> Self {
        init_tracing();

        let fs = Arc::new(CountingFs::new(files));
        let engine = Arc::new(ScriptEngine::default());
        let resolver = Arc::new(CountingResolver::default());
        let natives = Arc::new(CountingNatives::new(table));

        let evaluator = Evaluator::new(fs.clone(), engine.clone())
            .with_resolver(resolver.clone())
            .with_natives(natives.clone());

        Self {
            fs,
            engine,
            resolver,
            natives,
            evaluator,
        }
    }
}
