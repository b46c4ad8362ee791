// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Transform Contexts
//!
//! A [`Context`] is a partial, declarative configuration for one transform
//! call: target type, feature overrides, active views and context groups,
//! injectable values, custom (de)serializers, per-class overrides. Contexts
//! are merged in a fixed order (mapper default first, call context second,
//! per-class override last), so any of them may specify any subset.
//!
//! Merge rules:
//! - scalar options: last write wins;
//! - custom (de)serializer lists: concatenate, then stable-sort by `order`
//!   (ties keep their post-concatenation position);
//! - views and context groups: concatenate, deduplicated;
//! - maps (feature overrides, injectables, per-class overrides): shallow
//!   merge, later keys win.
//!
//! Contexts are `Send + Sync`; injectable values are carried in wire form
//! (`serde_json::Value`) and transformed through the declared parameter
//! chain at injection time.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::features::{DeserializationFeature, SerializationFeature};
use crate::schema::descriptor::TypeRef;
use crate::value::TypedValue;

/// Either-direction feature selector, so `enable`/`disable` read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Parse-direction flag.
    Deser(DeserializationFeature),
    /// Stringify-direction flag.
    Ser(SerializationFeature),
}

impl From<DeserializationFeature> for Feature {
    fn from(f: DeserializationFeature) -> Self {
        Feature::Deser(f)
    }
}

impl From<SerializationFeature> for Feature {
    fn from(f: SerializationFeature) -> Self {
        Feature::Ser(f)
    }
}

/// How a custom deserializer decides it applies to a node.
#[derive(Clone)]
pub enum DeserMatch {
    /// The resolved target chain equals this type.
    Target(TypeRef),
    /// Predicate on the raw JSON fragment.
    Predicate(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
}

/// A pluggable parse-side transform; the first applicable one wins and
/// short-circuits the rest of the pipeline for that node.
#[derive(Clone)]
pub struct CustomDeserializer {
    /// Priority; lower runs earlier. Ties keep registration order.
    pub order: i32,
    /// Applicability test.
    pub applies: DeserMatch,
    /// The transform: raw fragment plus resolved target, out comes the
    /// finished graph value.
    pub transform: Arc<dyn Fn(&Value, &TypeRef) -> Result<TypedValue> + Send + Sync>,
}

impl std::fmt::Debug for CustomDeserializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomDeserializer")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// How a custom serializer decides it applies to a node.
#[derive(Clone)]
pub enum SerMatch {
    /// The value is an instance of this registered class.
    Class(String),
    /// Predicate on the graph value.
    Predicate(Arc<dyn Fn(&TypedValue) -> bool + Send + Sync>),
}

/// A pluggable stringify-side transform; mirror of [`CustomDeserializer`].
#[derive(Clone)]
pub struct CustomSerializer {
    /// Priority; lower runs earlier. Ties keep registration order.
    pub order: i32,
    /// Applicability test.
    pub applies: SerMatch,
    /// The transform: graph value in, wire fragment out.
    pub transform: Arc<dyn Fn(&TypedValue) -> Result<Value> + Send + Sync>,
}

impl std::fmt::Debug for CustomSerializer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomSerializer")
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

/// Partial per-call configuration; see the module docs for merge rules.
#[derive(Clone, Default)]
pub struct Context {
    /// Target type chain for the root value.
    pub root_type: Option<TypeRef>,
    /// Named creator selector (`None` = the default creator).
    pub creator_name: Option<String>,
    /// Active views, in request order.
    pub views: Vec<String>,
    /// Active context groups, in request order (highest priority first).
    pub context_groups: Vec<String>,
    /// Parse-direction feature overrides.
    pub deser_features: HashMap<DeserializationFeature, bool>,
    /// Stringify-direction feature overrides.
    pub ser_features: HashMap<SerializationFeature, bool>,
    /// Injectable values by key, in wire form.
    pub injectable: HashMap<String, Value>,
    /// Custom parse-side transforms.
    pub deserializers: Vec<CustomDeserializer>,
    /// Custom stringify-side transforms.
    pub serializers: Vec<CustomSerializer>,
    /// Partial contexts applied whenever the named class becomes the target.
    pub for_type: HashMap<String, Arc<Context>>,
}

impl Context {
    /// Empty context: all defaults, no overrides.
    pub fn new() -> Self {
        Context::default()
    }

    /// Set the root target type chain.
    #[must_use]
    pub fn with_root_type(mut self, t: TypeRef) -> Self {
        self.root_type = Some(t);
        self
    }

    /// Select a named creator.
    #[must_use]
    pub fn with_creator_name(mut self, name: impl Into<String>) -> Self {
        self.creator_name = Some(name.into());
        self
    }

    /// Activate a view.
    #[must_use]
    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.views.push(view.into());
        self
    }

    /// Activate a context group.
    #[must_use]
    pub fn with_context_group(mut self, group: impl Into<String>) -> Self {
        self.context_groups.push(group.into());
        self
    }

    /// Turn a feature on.
    #[must_use]
    pub fn enable(mut self, feature: impl Into<Feature>) -> Self {
        match feature.into() {
            Feature::Deser(f) => {
                self.deser_features.insert(f, true);
            }
            Feature::Ser(f) => {
                self.ser_features.insert(f, true);
            }
        }
        self
    }

    /// Turn a feature off.
    #[must_use]
    pub fn disable(mut self, feature: impl Into<Feature>) -> Self {
        match feature.into() {
            Feature::Deser(f) => {
                self.deser_features.insert(f, false);
            }
            Feature::Ser(f) => {
                self.ser_features.insert(f, false);
            }
        }
        self
    }

    /// Provide an injectable value under `key` (wire form).
    #[must_use]
    pub fn with_injectable(mut self, key: impl Into<String>, value: Value) -> Self {
        self.injectable.insert(key.into(), value);
        self
    }

    /// Register a custom parse-side transform.
    #[must_use]
    pub fn with_deserializer(mut self, deserializer: CustomDeserializer) -> Self {
        self.deserializers.push(deserializer);
        self
    }

    /// Register a custom stringify-side transform.
    #[must_use]
    pub fn with_serializer(mut self, serializer: CustomSerializer) -> Self {
        self.serializers.push(serializer);
        self
    }

    /// Apply `context` whenever `class` becomes the transform target.
    #[must_use]
    pub fn for_type(mut self, class: impl Into<String>, context: Context) -> Self {
        self.for_type.insert(class.into(), Arc::new(context));
        self
    }

    /// Overlay `other` onto `self` per the module merge rules.
    pub(crate) fn merge_from(&mut self, other: &Context) {
        if other.root_type.is_some() {
            self.root_type = other.root_type.clone();
        }
        if other.creator_name.is_some() {
            self.creator_name = other.creator_name.clone();
        }
        for v in &other.views {
            if !self.views.contains(v) {
                self.views.push(v.clone());
            }
        }
        for g in &other.context_groups {
            if !self.context_groups.contains(g) {
                self.context_groups.push(g.clone());
            }
        }
        for (k, v) in &other.deser_features {
            self.deser_features.insert(*k, *v);
        }
        for (k, v) in &other.ser_features {
            self.ser_features.insert(*k, *v);
        }
        for (k, v) in &other.injectable {
            self.injectable.insert(k.clone(), v.clone());
        }
        self.deserializers.extend(other.deserializers.iter().cloned());
        self.serializers.extend(other.serializers.iter().cloned());
        for (k, v) in &other.for_type {
            self.for_type.insert(k.clone(), Arc::clone(v));
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("root_type", &self.root_type)
            .field("creator_name", &self.creator_name)
            .field("views", &self.views)
            .field("context_groups", &self.context_groups)
            .field("deserializers", &self.deserializers.len())
            .field("serializers", &self.serializers.len())
            .finish_non_exhaustive()
    }
}

/// Fully-merged configuration snapshot for one transform call.
///
/// Built once per call from the layered contexts; a per-class override
/// produces a derived snapshot for that subtree only.
#[derive(Clone)]
pub(crate) struct EffectiveContext {
    pub root_type: Option<TypeRef>,
    pub creator_name: String,
    pub views: Vec<String>,
    pub groups: Vec<String>,
    pub deser: HashMap<DeserializationFeature, bool>,
    pub ser: HashMap<SerializationFeature, bool>,
    pub injectable: HashMap<String, Value>,
    pub deserializers: Vec<CustomDeserializer>,
    pub serializers: Vec<CustomSerializer>,
    pub for_type: HashMap<String, Arc<Context>>,
}

impl EffectiveContext {
    /// Merge `layers` in order and sort the mapper lists.
    pub fn from_layers(layers: &[&Context]) -> Self {
        let mut merged = Context::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        EffectiveContext::from_merged(merged)
    }

    fn from_merged(merged: Context) -> Self {
        let mut deserializers = merged.deserializers;
        deserializers.sort_by_key(|d| d.order);
        let mut serializers = merged.serializers;
        serializers.sort_by_key(|s| s.order);
        EffectiveContext {
            root_type: merged.root_type,
            creator_name: merged.creator_name.unwrap_or_default(),
            views: merged.views,
            groups: merged.context_groups,
            deser: merged.deser_features,
            ser: merged.ser_features,
            injectable: merged.injectable,
            deserializers,
            serializers,
            for_type: merged.for_type,
        }
    }

    /// Effective state of a parse-direction flag.
    pub fn on(&self, f: DeserializationFeature) -> bool {
        self.deser.get(&f).copied().unwrap_or_else(|| f.default_value())
    }

    /// Effective state of a stringify-direction flag.
    pub fn on_ser(&self, f: SerializationFeature) -> bool {
        self.ser.get(&f).copied().unwrap_or_else(|| f.default_value())
    }

    /// Derived snapshot with a per-class partial context overlaid.
    pub fn with_override(&self, partial: &Context) -> EffectiveContext {
        let mut merged = Context {
            root_type: self.root_type.clone(),
            creator_name: if self.creator_name.is_empty() {
                None
            } else {
                Some(self.creator_name.clone())
            },
            views: self.views.clone(),
            context_groups: self.groups.clone(),
            deser_features: self.deser.clone(),
            ser_features: self.ser.clone(),
            injectable: self.injectable.clone(),
            deserializers: self.deserializers.clone(),
            serializers: self.serializers.clone(),
            for_type: self.for_type.clone(),
        };
        merged.merge_from(partial);
        EffectiveContext::from_merged(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop_deserializer(order: i32) -> CustomDeserializer {
        CustomDeserializer {
            order,
            applies: DeserMatch::Target(TypeRef::Int),
            transform: Arc::new(|_, _| Ok(TypedValue::Null)),
        }
    }

    #[test]
    fn scalars_last_write_wins() {
        let a = Context::new().with_root_type(TypeRef::Int).with_creator_name("a");
        let b = Context::new().with_root_type(TypeRef::String);
        let eff = EffectiveContext::from_layers(&[&a, &b]);
        assert_eq!(eff.root_type, Some(TypeRef::String));
        // b is silent about the creator, so a's choice survives
        assert_eq!(eff.creator_name, "a");
    }

    #[test]
    fn feature_maps_shallow_merge() {
        let a = Context::new()
            .disable(DeserializationFeature::FailOnUnknownProperties)
            .enable(DeserializationFeature::UnwrapRootValue);
        let b = Context::new().enable(DeserializationFeature::FailOnUnknownProperties);
        let eff = EffectiveContext::from_layers(&[&a, &b]);
        assert!(eff.on(DeserializationFeature::FailOnUnknownProperties));
        assert!(eff.on(DeserializationFeature::UnwrapRootValue));
        // untouched flags fall back to defaults
        assert!(eff.on(DeserializationFeature::AllowCoercionOfScalars));
    }

    #[test]
    fn mapper_lists_sort_stably_by_order() {
        let a = Context::new()
            .with_deserializer(noop_deserializer(5))
            .with_deserializer(noop_deserializer(1));
        let b = Context::new().with_deserializer(noop_deserializer(1));
        let eff = EffectiveContext::from_layers(&[&a, &b]);
        let orders: Vec<i32> = eff.deserializers.iter().map(|d| d.order).collect();
        assert_eq!(orders, [1, 1, 5]);
    }

    #[test]
    fn views_concatenate_deduplicated() {
        let a = Context::new().with_view("public").with_view("internal");
        let b = Context::new().with_view("public");
        let eff = EffectiveContext::from_layers(&[&a, &b]);
        assert_eq!(eff.views, ["public", "internal"]);
    }

    #[test]
    fn injectables_later_keys_win() {
        let a = Context::new().with_injectable("tenant", json!("alpha"));
        let b = Context::new().with_injectable("tenant", json!("beta"));
        let eff = EffectiveContext::from_layers(&[&a, &b]);
        assert_eq!(eff.injectable["tenant"], json!("beta"));
    }

    #[test]
    fn for_type_override_layers_on_top() {
        let base = Context::new().disable(DeserializationFeature::FailOnUnknownProperties);
        let eff = EffectiveContext::from_layers(&[&base]);
        assert!(!eff.on(DeserializationFeature::FailOnUnknownProperties));
        let partial = Context::new().enable(DeserializationFeature::FailOnUnknownProperties);
        let derived = eff.with_override(&partial);
        assert!(derived.on(DeserializationFeature::FailOnUnknownProperties));
        // the base snapshot is untouched
        assert!(!eff.on(DeserializationFeature::FailOnUnknownProperties));
    }
}
