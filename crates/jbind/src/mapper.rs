// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Object Mapper
//!
//! Public façade tying the schema registry to the transform engine. One
//! mapper owns one registry and an atomically-swappable default context;
//! every call merges the default context with the per-call context and
//! runs one direction of the codec.
//!
//! The mapper is cheap to share: the registry sits behind an `Arc` and
//! the default context behind an `ArcSwap`, so concurrent calls never
//! contend on a lock.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::Value;

use crate::context::{Context, EffectiveContext};
use crate::engine::parser::Parser;
use crate::engine::stringifier::Stringifier;
use crate::error::Result;
use crate::schema::registry::SchemaRegistry;
use crate::value::TypedValue;

/// Bidirectional codec between JSON text and typed object graphs.
///
/// # Examples
///
/// ```
/// use jbind::{ClassBuilder, Context, ObjectMapper, TypeRef};
///
/// let mapper = ObjectMapper::new();
/// mapper.registry().register(
///     ClassBuilder::new("User")
///         .int_property("id")
///         .string_property("name")
///         .build()?,
/// )?;
///
/// let user = mapper.parse_with(
///     r#"{"id": 7, "name": "ada"}"#,
///     Context::new().with_root_type(TypeRef::class("User")),
/// )?;
/// assert_eq!(user.as_object().unwrap().borrow().get_i64("id"), Some(7));
///
/// let text = mapper.stringify(&user)?;
/// assert_eq!(text, r#"{"id":7,"name":"ada"}"#);
/// # Ok::<(), jbind::Error>(())
/// ```
pub struct ObjectMapper {
    registry: Arc<SchemaRegistry>,
    default_context: ArcSwap<Context>,
}

impl ObjectMapper {
    /// Mapper over a fresh, empty registry.
    pub fn new() -> Self {
        ObjectMapper::with_registry(Arc::new(SchemaRegistry::new()))
    }

    /// Mapper over a shared registry.
    pub fn with_registry(registry: Arc<SchemaRegistry>) -> Self {
        ObjectMapper {
            registry,
            default_context: ArcSwap::new(Arc::new(Context::new())),
        }
    }

    /// The class registry backing this mapper.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Replace the default context merged under every call.
    ///
    /// Atomic; in-flight calls keep the snapshot they started with.
    pub fn set_default_context(&self, context: Context) {
        self.default_context.store(Arc::new(context));
    }

    // ========================================================================
    // Parse direction
    // ========================================================================

    /// Decode JSON text under the default context.
    pub fn parse(&self, text: &str) -> Result<TypedValue> {
        self.parse_with(text, Context::new())
    }

    /// Decode JSON text, merging `context` over the default context.
    pub fn parse_with(&self, text: &str, context: Context) -> Result<TypedValue> {
        let root: Value = serde_json::from_str(text)?;
        self.from_value_with(root, context)
    }

    /// Decode an already-parsed JSON value under the default context.
    pub fn from_value(&self, value: Value) -> Result<TypedValue> {
        self.from_value_with(value, Context::new())
    }

    /// Decode an already-parsed JSON value with a per-call context.
    pub fn from_value_with(&self, value: Value, context: Context) -> Result<TypedValue> {
        let default = self.default_context.load_full();
        let effective = EffectiveContext::from_layers(&[default.as_ref(), &context]);
        log::debug!(
            "[ObjectMapper::parse] root_type={:?} views={:?}",
            effective.root_type,
            effective.views
        );
        Parser::new(&self.registry).parse_document(value, Arc::new(effective))
    }

    // ========================================================================
    // Stringify direction
    // ========================================================================

    /// Encode a graph value to JSON text under the default context.
    pub fn stringify(&self, value: &TypedValue) -> Result<String> {
        self.stringify_with(value, Context::new())
    }

    /// Encode a graph value, merging `context` over the default context.
    pub fn stringify_with(&self, value: &TypedValue, context: Context) -> Result<String> {
        let wire = self.to_value_with(value, context)?;
        Ok(serde_json::to_string(&wire)?)
    }

    /// Encode to pretty-printed JSON text.
    pub fn stringify_pretty(&self, value: &TypedValue, context: Context) -> Result<String> {
        let wire = self.to_value_with(value, context)?;
        Ok(serde_json::to_string_pretty(&wire)?)
    }

    /// Encode a graph value to a JSON value tree under the default context.
    pub fn to_value(&self, value: &TypedValue) -> Result<Value> {
        self.to_value_with(value, Context::new())
    }

    /// Encode a graph value to a JSON value tree with a per-call context.
    pub fn to_value_with(&self, value: &TypedValue, context: Context) -> Result<Value> {
        let default = self.default_context.load_full();
        let effective = EffectiveContext::from_layers(&[default.as_ref(), &context]);
        log::debug!(
            "[ObjectMapper::stringify] root_type={:?} views={:?}",
            effective.root_type,
            effective.views
        );
        Stringifier::new(&self.registry).stringify_document(value, Arc::new(effective))
    }
}

impl Default for ObjectMapper {
    fn default() -> Self {
        ObjectMapper::new()
    }
}
