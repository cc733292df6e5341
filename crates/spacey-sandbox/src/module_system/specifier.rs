// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Classification of require() specifiers

use crate::native::NativeModules;
use crate::registry::Registry;
use crate::value::Value;

/// Stubbed assertion library
pub const ASSERT: &str = "assert";

/// Requesting this turns on transpile mode for the session
pub const TRANSPILE_REGISTER: &str = "babel-register";

/// Requesting this yields a function that evaluates source text
pub const EVAL_FROM_STRING: &str = "require-from-string";

/// What a specifier refers to, in the order the loader checks
#[derive(Debug, Clone)]
pub enum Specifier<'a> {
    /// The `assert` stub
    Assert,
    /// The transpile-mode switch
    EnableTranspile,
    /// The evaluate-from-text entry point
    EvalFromText,
    /// A host native module
    Native(Value),
    /// A registered plugin
    Plugin(Value),
    /// A registered preset
    Preset(Value),
    /// Anything else is resolved against the filesystem
    FilePath(&'a str),
}

impl<'a> Specifier<'a> {
    /// Classify `specifier`.
    ///
    /// Reserved names are matched before any collaborator is consulted.
    pub fn classify(
        specifier: &'a str,
        natives: &dyn NativeModules,
        plugins: &Registry,
        presets: &Registry,
    ) -> Self {
        match specifier {
            ASSERT => return Specifier::Assert,
            TRANSPILE_REGISTER => return Specifier::EnableTranspile,
            EVAL_FROM_STRING => return Specifier::EvalFromText,
            _ => {}
        }

        if let Some(native) = natives.lookup(specifier) {
            return Specifier::Native(native);
        }
        if let Some(plugin) = plugins.lookup(specifier) {
            return Specifier::Plugin(plugin);
        }
        if let Some(preset) = presets.lookup(specifier) {
            return Specifier::Preset(preset);
        }

        Specifier::FilePath(specifier)
    }
}
