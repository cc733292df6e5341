// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module path resolution (Node.js algorithm) over a virtual filesystem

use crate::config::SandboxConfig;
use crate::error::{Result, SandboxError};
use crate::vfs::VirtualFileSystem;
use serde::Deserialize;
use std::path::{Component, Path, PathBuf};
use tracing::trace;

/// Maps a specifier requested from a file to a concrete file path
pub trait PathResolver: Send + Sync {
    /// Resolve `specifier` as requested from `from_file`
    ///
    /// Fails with [`SandboxError::ModuleNotFound`] when nothing matches.
    fn resolve(
        &self,
        specifier: &str,
        from_file: &Path,
        fs: &dyn VirtualFileSystem,
    ) -> Result<PathBuf>;
}

/// Module resolver implementing the Node.js resolution algorithm
#[derive(Debug, Clone)]
pub struct NodeResolver {
    /// File extensions to try
    extensions: Vec<String>,
    /// Package directory names
    module_directories: Vec<String>,
}

impl NodeResolver {
    /// Create a resolver with the default `.js` / `.json` / `node_modules` conventions
    pub fn new() -> Self {
        Self::from_config(&SandboxConfig::default())
    }

    /// Create a resolver from the evaluator configuration
    pub fn from_config(config: &SandboxConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            module_directories: config.module_directories.clone(),
        }
    }

    /// Resolve a file path, trying the exact path first and then each extension
    fn resolve_file(&self, path: &Path, fs: &dyn VirtualFileSystem) -> Option<PathBuf> {
        if fs.is_file(path) {
            return Some(path.to_path_buf());
        }

        self.extensions.iter().find_map(|ext| {
            let mut candidate = path.as_os_str().to_os_string();
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            fs.is_file(&candidate).then_some(candidate)
        })
    }

    /// Resolve a directory (look for package.json main or index.js)
    fn resolve_directory(&self, dir: &Path, fs: &dyn VirtualFileSystem) -> Option<PathBuf> {
        let package_json = dir.join("package.json");
        if let Some(main) = read_package_main(&package_json, fs) {
            let main_path = normalize(&dir.join(main));
            if let Some(found) = self
                .resolve_file(&main_path, fs)
                .or_else(|| self.resolve_index(&main_path, fs))
            {
                return Some(found);
            }
        }

        self.resolve_index(dir, fs)
    }

    /// Try `index.<ext>` inside `dir`
    fn resolve_index(&self, dir: &Path, fs: &dyn VirtualFileSystem) -> Option<PathBuf> {
        self.extensions.iter().find_map(|ext| {
            let index = dir.join(format!("index{}", ext));
            fs.is_file(&index).then_some(index)
        })
    }

    /// Resolve `path` as a file, then as a directory
    fn resolve_path(&self, path: &Path, fs: &dyn VirtualFileSystem) -> Option<PathBuf> {
        self.resolve_file(path, fs)
            .or_else(|| self.resolve_directory(path, fs))
    }

    /// Resolve a package from the module directories of `base_dir` and its ancestors
    fn resolve_package(
        &self,
        specifier: &str,
        base_dir: &Path,
        fs: &dyn VirtualFileSystem,
    ) -> Option<PathBuf> {
        let (package_name, subpath) = parse_package_specifier(specifier);

        for dir in base_dir.ancestors() {
            for module_dir in &self.module_directories {
                // Never look for node_modules/node_modules
                if dir.file_name().is_some_and(|name| name == module_dir.as_str()) {
                    continue;
                }

                let package_root = dir.join(module_dir).join(package_name);
                let found = match subpath {
                    Some(sub) => self.resolve_path(&normalize(&package_root.join(sub)), fs),
                    None => self.resolve_path(&package_root, fs),
                };
                if found.is_some() {
                    return found;
                }
            }
        }

        None
    }
}

impl Default for NodeResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PathResolver for NodeResolver {
    fn resolve(
        &self,
        specifier: &str,
        from_file: &Path,
        fs: &dyn VirtualFileSystem,
    ) -> Result<PathBuf> {
        let base_dir = base_dir(from_file);

        let resolved = if is_path_specifier(specifier) {
            self.resolve_path(&normalize(&base_dir.join(specifier)), fs)
        } else {
            self.resolve_package(specifier, &base_dir, fs)
        };

        match resolved {
            Some(path) => {
                trace!(specifier, resolved = %path.display(), "resolved module");
                Ok(path)
            }
            None => Err(SandboxError::module_not_found(specifier, from_file)),
        }
    }
}

/// The directory a module's relative requests are resolved against
pub fn base_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("/"),
    }
}

/// Lexically normalize `.` and `..` components
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Check if a specifier names a path rather than a package
fn is_path_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

/// Parse a package specifier into name and optional subpath
fn parse_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    if specifier.starts_with('@') {
        // Scoped package: @scope/name or @scope/name/subpath
        if let Some(slash_pos) = specifier[1..].find('/') {
            let after_scope = &specifier[slash_pos + 2..];
            if let Some(subpath_pos) = after_scope.find('/') {
                let name_end = slash_pos + 2 + subpath_pos;
                return (&specifier[..name_end], Some(&specifier[name_end + 1..]));
            }
        }
        (specifier, None)
    } else {
        // Regular package: name or name/subpath
        match specifier.split_once('/') {
            Some((name, sub)) => (name, Some(sub)),
            None => (specifier, None),
        }
    }
}

/// Minimal package.json structure for resolution
#[derive(Debug, Deserialize)]
struct PackageJson {
    main: Option<String>,
}

fn read_package_main(path: &Path, fs: &dyn VirtualFileSystem) -> Option<String> {
    let contents = fs.read(path).ok()?;
    let pkg: PackageJson = serde_json::from_slice(&contents).ok()?;
    pkg.main.filter(|main| !main.is_empty())
}
