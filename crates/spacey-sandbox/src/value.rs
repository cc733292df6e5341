// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Values exchanged between the evaluator, the engine and host collaborators.

use crate::error::Result;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A script value as seen by the module system.
///
/// Objects are shared handles: cloning a `Value::Object` clones the handle,
/// not the properties, so a module's `exports` can be filled in after other
/// modules already hold it.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// undefined
    #[default]
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Shared, mutable object
    Object(ObjectRef),
    /// Host-provided callable
    Function(Arc<NativeFunction>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_eq(self, other, &mut Vec::new())
    }
}

/// Structural equality that assumes object pairs already on `seen` are equal,
/// so self-referencing export graphs terminate.
fn values_eq(a: &Value, b: &Value, seen: &mut Vec<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Undefined, Value::Undefined) => true,
        (Value::Null, Value::Null) => true,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => {
            // Handle NaN comparisons
            if a.is_nan() && b.is_nan() {
                false
            } else {
                a == b
            }
        }
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| values_eq(a, b, seen))
        }
        (Value::Object(a), Value::Object(b)) => objects_eq(a, b, seen),
        (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}

fn objects_eq(a: &ObjectRef, b: &ObjectRef, seen: &mut Vec<(usize, usize)>) -> bool {
    if a.ptr_eq(b) {
        return true;
    }
    let pair = (a.addr(), b.addr());
    if seen.contains(&pair) {
        return true;
    }
    seen.push(pair);

    // Snapshot so no lock is held across the recursion.
    let (a, b) = (a.0.read().clone(), b.0.read().clone());
    a.len() == b.len()
        && a.iter().all(|(key, value)| {
            b.get(key)
                .is_some_and(|other| values_eq(value, other, seen))
        })
}

impl Value {
    /// A fresh empty object.
    pub fn object() -> Self {
        Value::Object(ObjectRef::new())
    }

    /// Wrap a host closure as a callable value.
    pub fn function<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Value::Function(Arc::new(NativeFunction::new(name, func)))
    }

    /// A callable that ignores its arguments and returns undefined.
    pub fn noop(name: impl Into<String>) -> Self {
        Self::function(name, |_| Ok(Value::Undefined))
    }

    /// Returns true if this value is a function.
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// The string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// The object handle, if this is an object.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Invoke this value as a function.
    ///
    /// Calling a non-function is a TypeError, as in script code.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        match self {
            Value::Function(func) => func.call(args),
            other => Err(crate::SandboxError::type_error(format!(
                "{} is not a function",
                other.type_of()
            ))),
        }
    }

    /// Read a property of an object value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    /// Returns the type of this value as a string.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object", // Historical quirk
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) | Value::Object(_) => "object",
            Value::Function(_) => "function",
        }
    }

    /// Convert parsed JSON data into a value.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(arr) => Value::Array(arr.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => {
                let obj = ObjectRef::new();
                for (key, value) in map {
                    obj.set(key.clone(), Value::from_json(value));
                }
                Value::Object(obj)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(","))
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(func) => write!(f, "[Function: {} (native)]", func.name()),
        }
    }
}

/// Shared handle to an object's properties.
#[derive(Clone, Default)]
pub struct ObjectRef(Arc<RwLock<BTreeMap<String, Value>>>);

impl ObjectRef {
    /// Create an empty object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a property.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    /// Set a property, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.write().insert(key.into(), value)
    }

    /// Check if a property exists.
    pub fn has(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    /// Property names in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Check if the object has no properties.
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Whether both handles point at the same object.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        objects_eq(self, other, &mut Vec::new())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: module graphs with cycles produce self-referencing exports.
        f.debug_struct("Object").field("keys", &self.keys()).finish()
    }
}

/// A native (Rust) function callable from sandboxed code.
pub struct NativeFunction {
    name: String,
    func: Box<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>,
}

impl NativeFunction {
    /// Create a new named native function.
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    /// The function name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the function.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objects_share_identity() {
        let obj = ObjectRef::new();
        let value = Value::Object(obj.clone());
        obj.set("answer", Value::Number(42.0));
        assert_eq!(value.get("answer"), Some(Value::Number(42.0)));
    }

    #[test]
    fn test_structural_equality() {
        let json: serde_json::Value = serde_json::from_str(r#"{"a":1,"b":[true,null]}"#).unwrap();
        let expected = ObjectRef::new();
        expected.set("a", Value::Number(1.0));
        expected.set("b", Value::Array(vec![Value::Boolean(true), Value::Null]));
        assert_eq!(Value::from_json(&json), Value::Object(expected));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    }

    #[test]
    fn test_functions_compare_by_identity() {
        let f = Value::noop("f");
        let g = Value::noop("f");
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
        assert_eq!(f.call(&[]).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_cyclic_objects_compare_structurally() {
        let cyclic = |tag: &str| {
            let obj = ObjectRef::new();
            obj.set("tag", Value::from(tag));
            obj.set("self", Value::Object(obj.clone()));
            Value::Object(obj)
        };
        assert_eq!(cyclic("a"), cyclic("a"));
        assert_ne!(cyclic("a"), cyclic("b"));
    }

    #[test]
    fn test_call_non_function() {
        let err = Value::Number(1.0).call(&[]).unwrap_err();
        assert_eq!(err.to_string(), "TypeError: number is not a function");
    }
}
