// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Typed Value Model
//!
//! [`TypedValue`] is the in-memory object graph produced by parsing and
//! consumed by stringification. It mirrors the JSON data model plus the
//! richer scalar kinds the schema layer can declare (big integers,
//! timestamps, regex patterns) and, crucially, class instances.
//!
//! Instances ([`TypedObject`]) are held behind `Rc<RefCell<_>>` so that a
//! decoded graph can contain shared nodes and cycles: the identity resolver
//! hands out clones of the same allocation, and the reference linker wires
//! back-pointers after construction. Graphs are per-call values and are
//! deliberately not `Send`.
//!
//! # Example
//!
//! ```rust
//! use jbind::TypedObject;
//!
//! let user = TypedObject::new("User")
//!     .with("id", 7i64)
//!     .with("name", "kim")
//!     .into_value();
//! assert_eq!(user.as_object().unwrap().borrow().get_i64("id"), Some(7));
//! ```
//!
//! Equality is structural (class name plus fields, in any insertion order
//! for maps the same order). Comparing a cyclic graph with `==` recurses
//! forever; cyclic graphs should be compared via [`TypedValue::ptr_eq`] on
//! their shared nodes.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use regex::Regex;

/// Shared handle to a decoded class instance.
pub type ObjectRef = Rc<RefCell<TypedObject>>;

/// A decoded instance of a registered class.
#[derive(Debug, Clone)]
pub struct TypedObject {
    class: String,
    fields: IndexMap<String, TypedValue>,
}

impl TypedObject {
    /// Empty instance of `class`.
    pub fn new(class: impl Into<String>) -> Self {
        TypedObject {
            class: class.into(),
            fields: IndexMap::new(),
        }
    }

    /// Registered class name of this instance.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Field value by canonical property name.
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.fields.get(name)
    }

    /// Field as `i64`, when present and integral.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(TypedValue::as_i64)
    }

    /// Field as `&str`, when present and a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(TypedValue::as_str)
    }

    /// True when the field exists (even if its value is explicit null).
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Insert or replace a field, keeping insertion order.
    pub fn set(&mut self, name: impl Into<String>, value: TypedValue) {
        self.fields.insert(name.into(), value);
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<TypedValue> {
        self.fields.shift_remove(name)
    }

    /// Iterate fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &TypedValue)> {
        self.fields.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the instance has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builder-style insert for literal construction.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Wrap into a shared [`TypedValue::Object`] handle.
    pub fn into_value(self) -> TypedValue {
        TypedValue::Object(Rc::new(RefCell::new(self)))
    }
}

impl PartialEq for TypedObject {
    fn eq(&self, other: &Self) -> bool {
        self.class == other.class && self.fields == other.fields
    }
}

/// In-memory value produced by parsing and consumed by stringification.
#[derive(Debug, Clone)]
pub enum TypedValue {
    /// JSON null / absent.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integral number.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Big integer (beyond `i64`); wire form is a number or decimal string.
    BigInt(i128),
    /// UTF-8 string.
    String(String),
    /// Point in time; wire form is epoch milliseconds or RFC 3339.
    Timestamp(DateTime<Utc>),
    /// Compiled pattern; wire form is the regex source string.
    Pattern(Regex),
    /// Ordered sequence.
    Array(Vec<TypedValue>),
    /// Ordered string-keyed map (not a class instance).
    Map(IndexMap<String, TypedValue>),
    /// Instance of a registered class.
    Object(ObjectRef),
}

impl TypedValue {
    /// Runtime kind name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Null => "null",
            TypedValue::Bool(_) => "boolean",
            TypedValue::Int(_) | TypedValue::Float(_) => "number",
            TypedValue::BigInt(_) => "bigint",
            TypedValue::String(_) => "string",
            TypedValue::Timestamp(_) => "timestamp",
            TypedValue::Pattern(_) => "pattern",
            TypedValue::Array(_) => "array",
            TypedValue::Map(_) => "map",
            TypedValue::Object(_) => "object",
        }
    }

    /// True for `TypedValue::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    /// As boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// As `i64` (integral values only).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Int(n) => Some(*n),
            TypedValue::BigInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// As `f64` (any numeric kind).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Int(n) => Some(*n as f64),
            TypedValue::Float(x) => Some(*x),
            TypedValue::BigInt(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// As `i128`.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            TypedValue::Int(n) => Some(i128::from(*n)),
            TypedValue::BigInt(n) => Some(*n),
            _ => None,
        }
    }

    /// As string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// As array slice.
    pub fn as_array(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// As ordered map.
    pub fn as_map(&self) -> Option<&IndexMap<String, TypedValue>> {
        match self {
            TypedValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// As shared object handle.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            TypedValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// True when both values are object handles to the same allocation.
    pub fn ptr_eq(&self, other: &TypedValue) -> bool {
        match (self, other) {
            (TypedValue::Object(a), TypedValue::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Stable per-allocation key for object handles.
    pub(crate) fn object_addr(&self) -> Option<usize> {
        match self {
            TypedValue::Object(o) => Some(Rc::as_ptr(o) as usize),
            _ => None,
        }
    }

    /// Null, empty string, empty array, empty map, or empty object.
    pub(crate) fn is_empty_value(&self) -> bool {
        match self {
            TypedValue::Null => true,
            TypedValue::String(s) => s.is_empty(),
            TypedValue::Array(items) => items.is_empty(),
            TypedValue::Map(m) => m.is_empty(),
            TypedValue::Object(o) => o.borrow().is_empty(),
            _ => false,
        }
    }

    /// Null or the zero value of the scalar's kind.
    pub(crate) fn is_default_value(&self) -> bool {
        match self {
            TypedValue::Null => true,
            TypedValue::Bool(b) => !b,
            TypedValue::Int(n) => *n == 0,
            TypedValue::Float(x) => *x == 0.0,
            TypedValue::BigInt(n) => *n == 0,
            TypedValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl PartialEq for TypedValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypedValue::Null, TypedValue::Null) => true,
            (TypedValue::Bool(a), TypedValue::Bool(b)) => a == b,
            (TypedValue::Int(a), TypedValue::Int(b)) => a == b,
            (TypedValue::Float(a), TypedValue::Float(b)) => a == b,
            (TypedValue::BigInt(a), TypedValue::BigInt(b)) => a == b,
            (TypedValue::Int(a), TypedValue::BigInt(b)) | (TypedValue::BigInt(b), TypedValue::Int(a)) => {
                i128::from(*a) == *b
            }
            (TypedValue::String(a), TypedValue::String(b)) => a == b,
            (TypedValue::Timestamp(a), TypedValue::Timestamp(b)) => a == b,
            (TypedValue::Pattern(a), TypedValue::Pattern(b)) => a.as_str() == b.as_str(),
            (TypedValue::Array(a), TypedValue::Array(b)) => a == b,
            (TypedValue::Map(a), TypedValue::Map(b)) => a == b,
            (TypedValue::Object(a), TypedValue::Object(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            _ => false,
        }
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        TypedValue::Bool(v)
    }
}

impl From<i32> for TypedValue {
    fn from(v: i32) -> Self {
        TypedValue::Int(i64::from(v))
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        TypedValue::Int(v)
    }
}

impl From<i128> for TypedValue {
    fn from(v: i128) -> Self {
        TypedValue::BigInt(v)
    }
}

impl From<f64> for TypedValue {
    fn from(v: f64) -> Self {
        TypedValue::Float(v)
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        TypedValue::String(v.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        TypedValue::String(v)
    }
}

impl From<DateTime<Utc>> for TypedValue {
    fn from(v: DateTime<Utc>) -> Self {
        TypedValue::Timestamp(v)
    }
}

impl From<Vec<TypedValue>> for TypedValue {
    fn from(v: Vec<TypedValue>) -> Self {
        TypedValue::Array(v)
    }
}

impl From<TypedObject> for TypedValue {
    fn from(v: TypedObject) -> Self {
        v.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_builder_and_accessors() {
        let v = TypedObject::new("User")
            .with("id", 42i64)
            .with("name", "kim")
            .with("active", true)
            .into_value();
        let obj = v.as_object().unwrap().borrow();
        assert_eq!(obj.class(), "User");
        assert_eq!(obj.get_i64("id"), Some(42));
        assert_eq!(obj.get_str("name"), Some("kim"));
        assert_eq!(obj.get("active").and_then(TypedValue::as_bool), Some(true));
        assert!(!obj.has("missing"));
    }

    #[test]
    fn structural_equality_ignores_allocation() {
        let a = TypedObject::new("P").with("x", 1i64).into_value();
        let b = TypedObject::new("P").with("x", 1i64).into_value();
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
        assert!(a.ptr_eq(&a.clone()));
    }

    #[test]
    fn int_and_bigint_compare_equal() {
        assert_eq!(TypedValue::Int(7), TypedValue::BigInt(7));
        assert_ne!(TypedValue::Int(7), TypedValue::BigInt(8));
    }

    #[test]
    fn pattern_equality_is_by_source() {
        let a = TypedValue::Pattern(Regex::new("a+").unwrap());
        let b = TypedValue::Pattern(Regex::new("a+").unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn field_order_is_insertion_order() {
        let v = TypedObject::new("T").with("b", 1i64).with("a", 2i64);
        let names: Vec<&str> = v.fields.keys().map(String::as_str).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn empty_and_default_classification() {
        assert!(TypedValue::Null.is_empty_value());
        assert!(TypedValue::String(String::new()).is_empty_value());
        assert!(!TypedValue::Int(0).is_empty_value());
        assert!(TypedValue::Int(0).is_default_value());
        assert!(!TypedValue::Int(3).is_default_value());
    }
}
