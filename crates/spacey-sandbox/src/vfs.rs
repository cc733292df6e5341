// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Read-only virtual filesystem seen by sandboxed modules
//!
//! Sandboxed code never touches the host filesystem. Every read made by the
//! evaluator and the default resolver goes through [`VirtualFileSystem`].

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a virtual filesystem
#[derive(Debug, Error)]
pub enum FsError {
    /// No file exists at the path
    #[error("ENOENT: no such file or directory, open '{}'", .0.display())]
    NotFound(PathBuf),

    /// The path is a directory
    #[error("EISDIR: illegal operation on a directory, read '{}'", .0.display())]
    IsDirectory(PathBuf),
}

/// Virtual filesystem contract
pub trait VirtualFileSystem: Send + Sync {
    /// Read the full contents of the file at `path`
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError>;

    /// Check if `path` is a readable file
    fn is_file(&self, path: &Path) -> bool {
        self.read(path).is_ok()
    }
}

impl<T: VirtualFileSystem + ?Sized> VirtualFileSystem for Arc<T> {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        (**self).read(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        (**self).is_file(path)
    }
}

/// An in-memory filesystem.
///
/// Files are stored under normalized forward-slash paths. Directories are not
/// stored; a directory exists whenever some file lives beneath it.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryFileSystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory filesystem pre-populated with `(path, contents)` pairs.
    pub fn with_files<I, P, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (P, C)>,
        P: AsRef<Path>,
        C: Into<Vec<u8>>,
    {
        let fs = Self::new();
        for (path, contents) in files {
            fs.insert(path, contents);
        }
        fs
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let key = normalize_key(path.as_ref());
        self.files.write().insert(key, contents.into());
    }

    /// Remove a file, returning its contents.
    pub fn remove(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.write().remove(&normalize_key(path.as_ref()))
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    /// Check if no files are stored.
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    /// Check if some file lives beneath `path`
    pub fn is_dir(&self, path: &Path) -> bool {
        let mut prefix = normalize_key(path);
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        self.files
            .read()
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(&prefix))
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        let key = normalize_key(path);
        if let Some(contents) = self.files.read().get(&key) {
            return Ok(contents.clone());
        }
        if self.is_dir(path) {
            return Err(FsError::IsDirectory(path.to_path_buf()));
        }
        Err(FsError::NotFound(path.to_path_buf()))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.files.read().contains_key(&normalize_key(path))
    }
}

fn normalize_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
