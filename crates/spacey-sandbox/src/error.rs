// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the sandbox evaluator

use crate::vfs::FsError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sandbox operations
pub type Result<T> = std::result::Result<T, SandboxError>;

/// Errors that can occur while loading or evaluating sandboxed modules
///
/// None of these are recovered inside the evaluator; they unwind the whole
/// `require` chain back to the host.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// A specifier could not be mapped to a native module, plugin, preset or file
    #[error("Cannot find module '{specifier}' from '{}'", .from.display())]
    ModuleNotFound {
        /// The requested specifier
        specifier: String,
        /// The file the request was made from
        from: PathBuf,
    },

    /// A resolved path could not be read from the virtual filesystem
    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        /// The resolved path
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: FsError,
    },

    /// The source transform step failed
    #[error("Failed to transform '{}': {source}", .path.display())]
    Transform {
        /// The module being transformed
        path: PathBuf,
        /// Error reported by the transform
        #[source]
        source: anyhow::Error,
    },

    /// The execution engine raised while running a module
    #[error("Error evaluating '{}': {source}", .path.display())]
    Execution {
        /// The module being executed
        path: PathBuf,
        /// Error reported by the engine
        #[source]
        source: anyhow::Error,
    },

    /// A host callable received an argument of the wrong type
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Invalid sandbox configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Coarse classification of a [`SandboxError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Specifier resolution failed
    Resolution,
    /// Reading a resolved file failed
    Read,
    /// The transform step failed
    Transform,
    /// Module code failed while running
    Execution,
    /// Configuration could not be parsed
    Config,
}

impl SandboxError {
    /// Create a module not found error
    pub fn module_not_found(specifier: impl Into<String>, from: impl Into<PathBuf>) -> Self {
        Self::ModuleNotFound {
            specifier: specifier.into(),
            from: from.into(),
        }
    }

    /// Wrap an engine fault raised while running `path`
    pub fn execution(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self::Execution {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a new TypeError
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }

    /// The kind of failure this error represents
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ModuleNotFound { .. } => ErrorKind::Resolution,
            Self::Read { .. } => ErrorKind::Read,
            Self::Transform { .. } => ErrorKind::Transform,
            Self::Execution { .. } | Self::TypeError(_) => ErrorKind::Execution,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}
