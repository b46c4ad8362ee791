// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Parse Direction
//!
//! Depth-first transform from a JSON value tree into the typed object
//! graph. Each node runs the same pipeline: per-type context override,
//! custom deserializer interception, then a dispatch on the declared
//! target — scalars go through coercion and null policy, containers
//! recurse per element, class targets run the full object machinery
//! (class hook, empty-as-null, identity short-circuit, polymorphic
//! retargeting, unwrapping, creator invocation, property assignment,
//! unknown-key aggregation, injection, back-reference wiring).
//!
//! The parser itself is stateless; all per-call state lives in the
//! [`CallState`] threaded through the recursion.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};

use crate::context::{DeserMatch, EffectiveContext};
use crate::engine::identity::{self, CallState};
use crate::engine::{creator, refs, type_resolver, NodeCtx, NodeMeta};
use crate::error::{Error, Result};
use crate::features::DeserializationFeature;
use crate::schema::descriptor::{
    Access, CreatorDescriptor, CreatorMode, IdGenerator, IdentityInfo, Nulls, PropertyDescriptor,
    TypeInclude, TypeRef,
};
use crate::schema::registry::{ResolvedClass, SchemaRegistry};
use crate::util;
use crate::value::{TypedObject, TypedValue};

/// Recursive decode walker over a shared schema registry.
pub(crate) struct Parser<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Parser { registry }
    }

    /// Decode one document root under a merged configuration.
    pub fn parse_document(
        &self,
        root: Value,
        config: Arc<EffectiveContext>,
    ) -> Result<TypedValue> {
        let target = config.root_type.clone().unwrap_or(TypeRef::Any);
        let ctx = NodeCtx::root(target, config);
        let root = self.unwrap_root(root, &ctx)?;
        let mut state = CallState::new();
        let out = self.transform(root, &ctx, &mut state)?;
        state.finish(
            ctx.config
                .on(DeserializationFeature::FailOnUnresolvedObjectIds),
        )?;
        Ok(out)
    }

    /// Pipeline entry for one node.
    pub fn transform(
        &self,
        value: Value,
        ctx: &NodeCtx,
        state: &mut CallState,
    ) -> Result<TypedValue> {
        // per-type override derives a configuration for this subtree
        if let TypeRef::Class(name) = &ctx.target {
            if let Some(partial) = ctx.config.for_type.get(name).cloned() {
                let mut derived = ctx.config.with_override(&partial);
                derived.for_type.remove(name);
                let ctx = ctx.with_config(Arc::new(derived));
                return self.dispatch(value, &ctx, state);
            }
        }
        self.dispatch(value, ctx, state)
    }

    fn dispatch(&self, value: Value, ctx: &NodeCtx, state: &mut CallState) -> Result<TypedValue> {
        // first applicable custom deserializer short-circuits the node
        for custom in &ctx.config.deserializers {
            let applies = match &custom.applies {
                DeserMatch::Target(t) => *t == ctx.target,
                DeserMatch::Predicate(p) => (p)(&value),
            };
            if applies {
                return (custom.transform)(&value, &ctx.target);
            }
        }
        match ctx.target.clone() {
            TypeRef::Class(name) => self.decode_class(&name, value, ctx, state),
            TypeRef::Any => self.decode_any(value, ctx, state),
            TypeRef::Array(elem) => self.decode_array(&elem, value, ctx, state),
            TypeRef::Map(key, val) => self.decode_map(&key, &val, value, ctx, state),
            TypeRef::Timestamp => self.decode_timestamp(value, ctx),
            TypeRef::Pattern => self.decode_pattern(value, ctx),
            primitive => self.decode_scalar(&primitive, value, ctx),
        }
    }

    // ========================================================================
    // Scalars
    // ========================================================================

    fn decode_scalar(&self, kind: &TypeRef, value: Value, ctx: &NodeCtx) -> Result<TypedValue> {
        if value.is_null() {
            return self.null_for_primitive(kind, ctx);
        }
        let coerce = ctx.config.on(DeserializationFeature::AllowCoercionOfScalars);
        match kind {
            TypeRef::Bool => self.decode_bool(value, coerce, ctx),
            TypeRef::Int => self.decode_int(value, coerce, ctx),
            TypeRef::Float => self.decode_float(value, coerce, ctx),
            TypeRef::BigInt => self.decode_bigint(value, coerce, ctx),
            TypeRef::String => self.decode_string(value, coerce, ctx),
            other => Err(self.mismatch(other.kind_name(), &value, ctx)),
        }
    }

    fn null_for_primitive(&self, kind: &TypeRef, ctx: &NodeCtx) -> Result<TypedValue> {
        let per_kind = match kind {
            TypeRef::Bool => DeserializationFeature::SetDefaultValueForBooleanOnNull,
            TypeRef::Int | TypeRef::Float => DeserializationFeature::SetDefaultValueForNumberOnNull,
            TypeRef::BigInt => DeserializationFeature::SetDefaultValueForBigintOnNull,
            TypeRef::String => DeserializationFeature::SetDefaultValueForStringOnNull,
            _ => return Ok(TypedValue::Null),
        };
        if ctx
            .config
            .on(DeserializationFeature::SetDefaultValueForPrimitivesOnNull)
            || ctx.config.on(per_kind)
        {
            // zero_value is total over the primitive kinds matched above
            return Ok(kind.zero_value().unwrap_or(TypedValue::Null));
        }
        if ctx.config.on(DeserializationFeature::FailOnNullForPrimitives) {
            return Err(Error::NullForPrimitive {
                class: ctx.class_hint.clone(),
                property: ctx.property_hint.clone(),
                path: ctx.path.clone(),
            });
        }
        Ok(TypedValue::Null)
    }

    fn decode_bool(&self, value: Value, coerce: bool, ctx: &NodeCtx) -> Result<TypedValue> {
        match &value {
            Value::Bool(b) => Ok(TypedValue::Bool(*b)),
            Value::Number(n) if coerce => Ok(TypedValue::Bool(n.as_f64() != Some(0.0))),
            Value::String(s) if coerce => {
                let lower = s.to_lowercase();
                let b = match lower.as_str() {
                    "true" | "1" => true,
                    "false" | "0" => false,
                    other => !other.is_empty(),
                };
                Ok(TypedValue::Bool(b))
            }
            _ => Err(self.mismatch("boolean", &value, ctx)),
        }
    }

    fn decode_int(&self, value: Value, coerce: bool, ctx: &NodeCtx) -> Result<TypedValue> {
        match &value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(TypedValue::Int(i));
                }
                if let Some(f) = n.as_f64() {
                    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                        return Ok(TypedValue::Int(f.trunc() as i64));
                    }
                }
                Err(self.mismatch("integer", &value, ctx))
            }
            Value::String(s) if coerce => {
                if let Ok(i) = s.trim().parse::<i64>() {
                    return Ok(TypedValue::Int(i));
                }
                match s.trim().parse::<f64>() {
                    Ok(f) if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
                        Ok(TypedValue::Int(f.trunc() as i64))
                    }
                    _ => Err(self.mismatch("integer", &value, ctx)),
                }
            }
            _ => Err(self.mismatch("integer", &value, ctx)),
        }
    }

    fn decode_float(&self, value: Value, coerce: bool, ctx: &NodeCtx) -> Result<TypedValue> {
        match &value {
            Value::Number(n) => n
                .as_f64()
                .map(TypedValue::Float)
                .ok_or_else(|| self.mismatch("number", &value, ctx)),
            Value::String(s) if coerce => s
                .trim()
                .parse::<f64>()
                .map(TypedValue::Float)
                .map_err(|_| self.mismatch("number", &value, ctx)),
            _ => Err(self.mismatch("number", &value, ctx)),
        }
    }

    fn decode_bigint(&self, value: Value, coerce: bool, ctx: &NodeCtx) -> Result<TypedValue> {
        match &value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(TypedValue::BigInt(i as i128));
                }
                if let Some(u) = n.as_u64() {
                    return Ok(TypedValue::BigInt(u as i128));
                }
                match n.as_f64() {
                    // fractional input truncates, but only under coercion
                    Some(f) if coerce && f.is_finite() => Ok(TypedValue::BigInt(f.trunc() as i128)),
                    _ => Err(self.mismatch("bigint", &value, ctx)),
                }
            }
            // decimal strings are the wire form beyond i64 range, always accepted
            Value::String(s) => s
                .trim()
                .parse::<i128>()
                .map(TypedValue::BigInt)
                .map_err(|_| self.mismatch("bigint", &value, ctx)),
            _ => Err(self.mismatch("bigint", &value, ctx)),
        }
    }

    fn decode_string(&self, value: Value, coerce: bool, ctx: &NodeCtx) -> Result<TypedValue> {
        match value {
            Value::String(s) => Ok(TypedValue::String(s)),
            Value::Number(n) if coerce => Ok(TypedValue::String(n.to_string())),
            Value::Bool(b) if coerce => Ok(TypedValue::String(b.to_string())),
            other => Err(self.mismatch("string", &other, ctx)),
        }
    }

    fn decode_timestamp(&self, value: Value, ctx: &NodeCtx) -> Result<TypedValue> {
        match &value {
            Value::Null => Ok(TypedValue::Null),
            Value::Number(n) => {
                let millis = n
                    .as_i64()
                    .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                    .ok_or_else(|| self.mismatch("timestamp", &value, ctx))?;
                Utc.timestamp_millis_opt(millis)
                    .single()
                    .map(TypedValue::Timestamp)
                    .ok_or_else(|| self.mismatch("timestamp", &value, ctx))
            }
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| TypedValue::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|_| self.mismatch("timestamp", &value, ctx)),
            _ => Err(self.mismatch("timestamp", &value, ctx)),
        }
    }

    fn decode_pattern(&self, value: Value, ctx: &NodeCtx) -> Result<TypedValue> {
        match &value {
            Value::Null => Ok(TypedValue::Null),
            Value::String(s) => Regex::new(s)
                .map(TypedValue::Pattern)
                .map_err(|_| self.mismatch("regular expression", &value, ctx)),
            _ => Err(self.mismatch("regular expression", &value, ctx)),
        }
    }

    // ========================================================================
    // Containers and untyped values
    // ========================================================================

    fn decode_any(&self, value: Value, ctx: &NodeCtx, state: &mut CallState) -> Result<TypedValue> {
        match value {
            Value::Null => Ok(TypedValue::Null),
            Value::Bool(b) => Ok(TypedValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(TypedValue::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(TypedValue::BigInt(u as i128))
                } else {
                    Ok(TypedValue::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Value::String(s) => Ok(TypedValue::String(s)),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.into_iter().enumerate() {
                    if item.is_null() {
                        match ctx.content_nulls.unwrap_or_default() {
                            Nulls::Fail => return Err(self.content_null(ctx, idx)),
                            Nulls::Skip => continue,
                            Nulls::Set => {}
                        }
                    }
                    out.push(self.transform(item, &ctx.element(TypeRef::Any, idx), state)?);
                }
                Ok(TypedValue::Array(out))
            }
            Value::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, val) in map {
                    if val.is_null() {
                        match ctx.content_nulls.unwrap_or_default() {
                            Nulls::Fail => {
                                return Err(Error::NullNotAllowed {
                                    class: ctx.class_hint.clone(),
                                    path: util::path_field(&ctx.path, &key),
                                })
                            }
                            Nulls::Skip => continue,
                            Nulls::Set => {}
                        }
                    }
                    let child = ctx.descend(TypeRef::Any, util::path_field(&ctx.path, &key));
                    out.insert(key, self.transform(val, &child, state)?);
                }
                Ok(TypedValue::Map(out))
            }
        }
    }

    fn decode_array(
        &self,
        elem: &TypeRef,
        value: Value,
        ctx: &NodeCtx,
        state: &mut CallState,
    ) -> Result<TypedValue> {
        match value {
            Value::Null => Ok(TypedValue::Null),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (idx, item) in items.into_iter().enumerate() {
                    if item.is_null() {
                        match ctx.content_nulls.unwrap_or_default() {
                            Nulls::Fail => return Err(self.content_null(ctx, idx)),
                            Nulls::Skip => continue,
                            Nulls::Set => {}
                        }
                    }
                    out.push(self.transform(item, &ctx.element(elem.clone(), idx), state)?);
                }
                Ok(TypedValue::Array(out))
            }
            other => Err(self.mismatch("array", &other, ctx)),
        }
    }

    fn decode_map(
        &self,
        key_kind: &TypeRef,
        val_kind: &TypeRef,
        value: Value,
        ctx: &NodeCtx,
        state: &mut CallState,
    ) -> Result<TypedValue> {
        match value {
            Value::Null => Ok(TypedValue::Null),
            Value::Object(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, val) in map {
                    if *key_kind == TypeRef::Int && key.parse::<i64>().is_err() {
                        return Err(Error::MismatchedInput {
                            expected: "integer map key",
                            found: "string".to_string(),
                            path: util::path_field(&ctx.path, &key),
                            snippet: key.clone(),
                        });
                    }
                    if val.is_null() {
                        match ctx.content_nulls.unwrap_or_default() {
                            Nulls::Fail => {
                                return Err(Error::NullNotAllowed {
                                    class: ctx.class_hint.clone(),
                                    path: util::path_field(&ctx.path, &key),
                                })
                            }
                            Nulls::Skip => continue,
                            Nulls::Set => {}
                        }
                    }
                    let child = ctx.descend(val_kind.clone(), util::path_field(&ctx.path, &key));
                    out.insert(key, self.transform(val, &child, state)?);
                }
                Ok(TypedValue::Map(out))
            }
            other => Err(self.mismatch("object", &other, ctx)),
        }
    }

    // ========================================================================
    // Class targets
    // ========================================================================

    fn decode_class(
        &self,
        base: &str,
        value: Value,
        ctx: &NodeCtx,
        state: &mut CallState,
    ) -> Result<TypedValue> {
        let resolved = self.resolve_at(base, ctx)?;
        let value = match &resolved.options.deserialize_hook {
            Some(hook) => (hook)(value)?,
            None => value,
        };
        let value = empty_as_null(value, &ctx.config);
        if value.is_null() {
            return Ok(TypedValue::Null);
        }
        let meta = NodeMeta::for_node(&resolved, ctx);

        // bare ids short-circuit before any structural work
        if !value.is_object() {
            if let Some(info) = &meta.identity {
                if let Some(short) =
                    self.identity_scalar(base, info, &value, ctx, state)?
                {
                    return Ok(short);
                }
            }
        }

        if let Some(info) = &meta.type_info {
            let resolution = type_resolver::resolve_decode(
                base,
                info,
                &meta.subtypes,
                value,
                ctx.external_id.clone(),
                &ctx.path,
                ctx.config.on(DeserializationFeature::FailOnInvalidSubtype),
                ctx.config.on(DeserializationFeature::FailOnMissingTypeId),
            )?;
            if resolution.class != *base {
                let concrete = self.resolve_at(&resolution.class, ctx)?;
                let concrete_meta = NodeMeta::for_node(&concrete, ctx);
                return self.decode_instance(
                    &concrete,
                    concrete_meta.identity.as_ref(),
                    base,
                    resolution.value,
                    ctx,
                    state,
                );
            }
            return self.decode_instance(
                &resolved,
                meta.identity.as_ref(),
                base,
                resolution.value,
                ctx,
                state,
            );
        }
        self.decode_instance(&resolved, meta.identity.as_ref(), base, value, ctx, state)
    }

    /// Resolve a bare scalar in object position against the seen map.
    ///
    /// `Ok(Some(_))` short-circuits the node (a seen instance, or a null
    /// placeholder for a dangling forward reference); `Ok(None)` means the
    /// value cannot be an id and structural handling should continue.
    fn identity_scalar(
        &self,
        base: &str,
        info: &IdentityInfo,
        value: &Value,
        ctx: &NodeCtx,
        state: &mut CallState,
    ) -> Result<Option<TypedValue>> {
        let literal = match identity::id_literal(value) {
            Some(literal) => literal,
            None => return Ok(None),
        };
        let scope = info.scope.as_deref().unwrap_or(base);
        let key = identity::scoped(scope, &literal);
        if let Some(existing) = state.lookup(&key) {
            self.check_identity_class(base, &key, existing, ctx)?;
            return Ok(Some(existing.clone()));
        }
        state.note_unresolved(key);
        Ok(Some(TypedValue::Null))
    }

    fn check_identity_class(
        &self,
        expected: &str,
        key: &str,
        existing: &TypedValue,
        ctx: &NodeCtx,
    ) -> Result<()> {
        if let Some(obj) = existing.as_object() {
            let found = obj.borrow().class().to_string();
            if !self.registry.is_subclass(&found, expected) {
                return Err(Error::IdentityTypeConflict {
                    id: key.to_string(),
                    expected: expected.to_string(),
                    found,
                    path: ctx.path.clone(),
                });
            }
        }
        Ok(())
    }

    fn decode_instance(
        &self,
        resolved: &ResolvedClass,
        identity_info: Option<&IdentityInfo>,
        scope_base: &str,
        value: Value,
        ctx: &NodeCtx,
        state: &mut CallState,
    ) -> Result<TypedValue> {
        let chosen = select_creator(resolved, &ctx.config);

        // delegating and degenerate creators take the whole value, any shape
        if let Some(c) = chosen {
            let whole_value = matches!(c.mode, CreatorMode::Delegating)
                || (matches!(c.mode, CreatorMode::Standard) && c.params.is_empty());
            if whole_value {
                let instance =
                    creator::invoke_with_value(self, &resolved.name, c, value, ctx, state)?;
                return self.finish_instance(resolved, identity_info, scope_base, None, instance, ctx, state);
            }
        }

        let map = match value {
            Value::Object(map) => map,
            other => {
                if let Some(info) = identity_info {
                    // a wrapper strategy may have exposed a bare id
                    if let Some(short) =
                        self.identity_scalar(scope_base, info, &other, ctx, state)?
                    {
                        return Ok(short);
                    }
                }
                return Err(self.mismatch("object", &other, ctx));
            }
        };
        let mut bag: IndexMap<String, Value> = map.into_iter().collect();
        let source_hint = util::keys_hint(&bag);

        // identity prefetch: embedded duplicates short-circuit, otherwise
        // remember the scoped key for registration
        let mut scoped_key: Option<String> = None;
        if let Some(info) = identity_info {
            let raw_id = match info.generator {
                // the id doubles as a real property and stays in the bag
                IdGenerator::Property => bag.get(&info.property).cloned(),
                // a generated id is wire metadata, not a property
                IdGenerator::IntSequence => bag.shift_remove(&info.property),
            };
            if let Some(literal) = raw_id.as_ref().and_then(identity::id_literal) {
                let scope = info.scope.as_deref().unwrap_or(scope_base);
                let key = identity::scoped(scope, &literal);
                if let Some(existing) = state.lookup(&key) {
                    self.check_identity_class(scope_base, &key, existing, ctx)?;
                    return Ok(existing.clone());
                }
                scoped_key = Some(key);
            }
        }

        if let Some(c) = chosen {
            if matches!(c.mode, CreatorMode::PropertiesObject) {
                let whole = Value::Object(bag.into_iter().collect::<Map<String, Value>>());
                let instance =
                    creator::invoke_with_value(self, &resolved.name, c, whole, ctx, state)?;
                return self.finish_instance(
                    resolved, identity_info, scope_base, scoped_key, instance, ctx, state,
                );
            }
        }

        // external discriminators live as siblings in this object; pull
        // them out before any property consumes or trips over them
        let external_ids = self.collect_external_ids(resolved, &mut bag, ctx)?;

        self.gather_unwrapped(resolved, &mut bag, ctx)?;

        // construct the instance: shells for the implicit default creator
        // register before children so cycles resolve to the final object
        let mut satisfied: HashSet<String> = HashSet::new();
        let instance = match chosen {
            Some(c) => {
                let out = creator::invoke_standard(self, resolved, c, &mut bag, ctx, state)?;
                satisfied = out.satisfied;
                if let Some(key) = &scoped_key {
                    state.register(key.clone(), out.instance.clone());
                }
                out.instance
            }
            None => {
                let shell = TypedObject::new(resolved.name.clone()).into_value();
                if let Some(key) = &scoped_key {
                    state.register(key.clone(), shell.clone());
                }
                shell
            }
        };

        // property assignment
        let case_insensitive = ctx
            .config
            .on(DeserializationFeature::AcceptCaseInsensitiveProperties);
        let mut present: HashSet<String> = HashSet::new();
        let mut unknown_pairs: Vec<(String, Value)> = Vec::new();
        let entries: Vec<(String, Value)> = bag.into_iter().collect();
        for (key, raw) in entries {
            let idx = match resolved.find_wire(&key, case_insensitive) {
                Some(idx) => idx,
                None => {
                    unknown_pairs.push((key, raw));
                    continue;
                }
            };
            let prop = &resolved.properties[idx];
            present.insert(prop.name.clone());
            if !self.writable(resolved, prop, &ctx.config) {
                continue;
            }
            self.assign_wire(resolved, prop, &instance, &key, raw, &external_ids, ctx, state)?;
        }

        // unknown keys: any-setter absorbs, else aggregate and report
        if !unknown_pairs.is_empty() {
            if let Some(idx) = resolved.any_setter {
                self.absorb_unknown(resolved, idx, &instance, unknown_pairs, ctx, state)?;
            } else {
                let ignore = match resolved.options.ignore_unknown {
                    Some(explicit) => explicit,
                    None => !ctx
                        .config
                        .on(DeserializationFeature::FailOnUnknownProperties),
                };
                if !ignore {
                    let names: Vec<String> =
                        unknown_pairs.iter().map(|(k, _)| k.clone()).collect();
                    let shape: Map<String, Value> = unknown_pairs.into_iter().collect();
                    return Err(Error::UnknownProperties {
                        class: resolved.name.clone(),
                        properties: names,
                        path: ctx.path.clone(),
                        snippet: util::snippet(&Value::Object(shape)),
                    });
                }
            }
        }

        // absent keys become explicit nulls when requested
        if ctx.config.on(DeserializationFeature::MapUndefinedToNull) {
            for prop in &resolved.properties {
                if present.contains(&prop.name)
                    || satisfied.contains(&prop.name)
                    || prop.inject.is_some()
                    || !self.writable(resolved, prop, &ctx.config)
                {
                    continue;
                }
                self.assign_wire(
                    resolved,
                    prop,
                    &instance,
                    &prop.name,
                    Value::Null,
                    &external_ids,
                    ctx,
                    state,
                )?;
                present.insert(prop.name.clone());
            }
        }

        // context-injected values
        for prop in &resolved.properties {
            let inject = match &prop.inject {
                Some(inject) => inject,
                None => continue,
            };
            if !self.writable(resolved, prop, &ctx.config) {
                continue;
            }
            if inject.use_input && present.contains(&prop.name) {
                continue;
            }
            let mut child = ctx.descend(
                prop.value_type.clone(),
                util::path_field(&ctx.path, &prop.name),
            );
            child.class_hint = resolved.name.clone();
            child.property_hint = prop.name.clone();
            let injected =
                refs::injected_value(self, &inject.key, &prop.value_type, &child, state)?;
            self.assign(prop, &instance, injected)?;
            present.insert(prop.name.clone());
        }

        // required enforcement over write-capable properties
        for prop in &resolved.properties {
            if !prop.required || !self.writable(resolved, prop, &ctx.config) {
                continue;
            }
            if present.contains(&prop.name) || satisfied.contains(&prop.name) {
                continue;
            }
            return Err(Error::RequiredPropertyMissing {
                class: resolved.name.clone(),
                property: prop.name.clone(),
                path: ctx.path.clone(),
                snippet: source_hint.clone(),
            });
        }

        self.finish_instance(resolved, identity_info, scope_base, scoped_key, instance, ctx, state)
    }

    /// Decode and assign one wire value into its property slot.
    #[allow(clippy::too_many_arguments)]
    fn assign_wire(
        &self,
        resolved: &ResolvedClass,
        prop: &PropertyDescriptor,
        instance: &TypedValue,
        key: &str,
        raw: Value,
        external_ids: &HashMap<String, String>,
        ctx: &NodeCtx,
        state: &mut CallState,
    ) -> Result<()> {
        // raw fragments keep their serialized text instead of recursing
        if prop.raw {
            let text = match raw {
                Value::Null => TypedValue::Null,
                other => TypedValue::String(serde_json::to_string(&other)?),
            };
            return self.assign(prop, instance, text);
        }
        if raw.is_null() {
            match prop.nulls.unwrap_or_default() {
                Nulls::Fail => {
                    return Err(Error::NullNotAllowed {
                        class: resolved.name.clone(),
                        path: util::path_field(&ctx.path, key),
                    })
                }
                Nulls::Skip => return Ok(()),
                Nulls::Set => {}
            }
        }
        let raw = match &prop.deserialize_with {
            Some(hook) => (hook)(raw)?,
            None => raw,
        };
        let mut child = ctx.descend(prop.value_type.clone(), util::path_field(&ctx.path, key));
        child.class_hint = resolved.name.clone();
        child.property_hint = prop.name.clone();
        child.content_nulls = prop.content_nulls;
        child.external_id = external_ids.get(&prop.name).cloned();
        if let Some(overlay) = &prop.type_meta {
            child.push_overlay(overlay);
        }
        let decoded = self.transform(raw, &child, state)?;
        self.assign(prop, instance, decoded)
    }

    /// Register the instance and wire its back references.
    #[allow(clippy::too_many_arguments)]
    fn finish_instance(
        &self,
        resolved: &ResolvedClass,
        identity_info: Option<&IdentityInfo>,
        scope_base: &str,
        scoped_key: Option<String>,
        instance: TypedValue,
        ctx: &NodeCtx,
        state: &mut CallState,
    ) -> Result<TypedValue> {
        match (identity_info, scoped_key) {
            (Some(_), Some(key)) => state.register(key, instance.clone()),
            (Some(info), None) => {
                // creators that consumed the whole value never surfaced the
                // id key; property-backed ids can be read off the instance
                if info.generator == IdGenerator::Property {
                    if let Some(obj) = instance.as_object() {
                        let literal = obj.borrow().get(&info.property).and_then(typed_id_literal);
                        if let Some(literal) = literal {
                            let scope = info.scope.as_deref().unwrap_or(scope_base);
                            state.register(identity::scoped(scope, &literal), instance.clone());
                        }
                    }
                }
            }
            _ => {}
        }
        refs::wire_back_references(self.registry, &instance, &ctx.config.groups)?;
        Ok(instance)
    }

    /// Pull external discriminator siblings out of the working map.
    fn collect_external_ids(
        &self,
        resolved: &ResolvedClass,
        bag: &mut IndexMap<String, Value>,
        ctx: &NodeCtx,
    ) -> Result<HashMap<String, String>> {
        let mut out = HashMap::new();
        for prop in &resolved.properties {
            let info = match prop.type_meta.as_ref().and_then(|m| m.type_info.clone()) {
                Some(info) => Some(info),
                None => match &prop.value_type {
                    TypeRef::Class(name) => {
                        self.resolve_at(name, ctx)?.options.type_info.clone()
                    }
                    _ => None,
                },
            };
            let info = match info {
                Some(info) if info.include == TypeInclude::ExternalProperty => info,
                _ => continue,
            };
            if let Some(Value::String(id)) = bag.get(&info.property) {
                let id = id.clone();
                bag.shift_remove(&info.property);
                out.insert(prop.name.clone(), id);
            }
        }
        Ok(out)
    }

    /// Collapse affixed keys back into nested objects for unwrapped
    /// properties. Keys that strip to a name the child class knows (or
    /// that a child with its own unwrapping or any-setter might claim)
    /// are moved into a synthetic object under the property's wire name.
    fn gather_unwrapped(
        &self,
        resolved: &ResolvedClass,
        bag: &mut IndexMap<String, Value>,
        ctx: &NodeCtx,
    ) -> Result<()> {
        for (idx, prop) in resolved.properties.iter().enumerate() {
            let unwrap = match &prop.unwrap {
                Some(unwrap) => unwrap,
                None => continue,
            };
            if !self.writable(resolved, prop, &ctx.config) {
                continue;
            }
            let wire = &resolved.wire_names[idx];
            if bag.contains_key(wire) {
                // a literal nested object wins over affix gathering
                continue;
            }
            let child = match &prop.value_type {
                TypeRef::Class(name) => Some(self.resolve_at(name, ctx)?),
                _ => None,
            };
            let take_all = match &child {
                Some(c) => {
                    c.any_setter.is_some() || c.properties.iter().any(|p| p.unwrap.is_some())
                }
                None => true,
            };
            let case_insensitive = ctx
                .config
                .on(DeserializationFeature::AcceptCaseInsensitiveProperties);
            let mut synthetic = Map::new();
            let keys: Vec<String> = bag.keys().cloned().collect();
            for key in keys {
                let stripped = match strip_affixes(&key, unwrap) {
                    Some(stripped) => stripped,
                    None => continue,
                };
                let claimed = take_all
                    || child
                        .as_ref()
                        .map(|c| c.find_wire(&stripped, case_insensitive).is_some())
                        .unwrap_or(true);
                if claimed {
                    if let Some(value) = bag.shift_remove(&key) {
                        synthetic.insert(stripped, value);
                    }
                }
            }
            if !synthetic.is_empty() {
                bag.insert(wire.clone(), Value::Object(synthetic));
            }
        }
        Ok(())
    }

    fn absorb_unknown(
        &self,
        resolved: &ResolvedClass,
        idx: usize,
        instance: &TypedValue,
        pairs: Vec<(String, Value)>,
        ctx: &NodeCtx,
        state: &mut CallState,
    ) -> Result<()> {
        let prop = &resolved.properties[idx];
        let value_target = match &prop.value_type {
            TypeRef::Map(_, v) => (**v).clone(),
            _ => TypeRef::Any,
        };
        let mut entries = IndexMap::new();
        for (key, raw) in pairs {
            let mut child = ctx.descend(value_target.clone(), util::path_field(&ctx.path, &key));
            child.class_hint = resolved.name.clone();
            child.property_hint = prop.name.clone();
            entries.insert(key, self.transform(raw, &child, state)?);
        }
        let obj = instance
            .as_object()
            .ok_or_else(|| non_object_instance(&resolved.name))?;
        let merged = match obj.borrow().get(&prop.name) {
            Some(TypedValue::Map(existing)) => {
                let mut merged = existing.clone();
                merged.extend(entries);
                merged
            }
            _ => entries,
        };
        self.assign(prop, instance, TypedValue::Map(merged))
    }

    fn assign(
        &self,
        prop: &PropertyDescriptor,
        instance: &TypedValue,
        value: TypedValue,
    ) -> Result<()> {
        let obj = instance
            .as_object()
            .ok_or_else(|| non_object_instance(&prop.name))?;
        let mut borrowed = obj.borrow_mut();
        match &prop.setter {
            Some(setter) => (setter)(&mut borrowed, value),
            None => borrowed.set(&prop.name, value),
        }
        Ok(())
    }

    /// True when the property is a decode-side write target.
    fn writable(
        &self,
        resolved: &ResolvedClass,
        prop: &PropertyDescriptor,
        config: &EffectiveContext,
    ) -> bool {
        if prop.ignored
            || prop.access == Access::ReadOnly
            || prop.back_ref.is_some()
            || prop.any_getter
            || prop.any_setter
        {
            return false;
        }
        if resolved.class_ignored(&prop.name) && !resolved.options.allow_setters {
            return false;
        }
        // getter-only virtual properties are read triggers, not targets
        if prop.getter.is_some() && prop.setter.is_none() {
            return false;
        }
        self.view_allows(prop, config)
    }

    /// Parse-direction view filter.
    pub(crate) fn view_allows(
        &self,
        prop: &PropertyDescriptor,
        config: &EffectiveContext,
    ) -> bool {
        crate::engine::view_allows(
            self.registry,
            prop,
            &config.views,
            config.on(DeserializationFeature::DefaultViewInclusion),
        )
    }

    fn unwrap_root(&self, value: Value, ctx: &NodeCtx) -> Result<Value> {
        if !ctx.config.on(DeserializationFeature::UnwrapRootValue) {
            return Ok(value);
        }
        let class = match &ctx.target {
            TypeRef::Class(name) => name.clone(),
            _ => return Ok(value),
        };
        let resolved = self.resolve_at(&class, ctx)?;
        let expected = resolved.root_name().to_string();
        match value {
            Value::Object(map) if map.len() == 1 => {
                let (key, inner) = map.into_iter().next().unwrap_or_default();
                if key == expected {
                    Ok(inner)
                } else {
                    Err(Error::RootNameMismatch {
                        class,
                        expected,
                        found: key,
                    })
                }
            }
            other => Err(Error::RootNameMismatch {
                class,
                expected,
                found: util::json_kind(&other).to_string(),
            }),
        }
    }

    fn resolve_at(&self, class: &str, ctx: &NodeCtx) -> Result<Arc<ResolvedClass>> {
        self.registry
            .resolve(class, &ctx.config.groups)
            .map_err(|e| match e {
                Error::UnknownClass { class, .. } => Error::UnknownClass {
                    class,
                    path: ctx.path.clone(),
                },
                other => other,
            })
    }

    fn mismatch(&self, expected: &'static str, value: &Value, ctx: &NodeCtx) -> Error {
        Error::MismatchedInput {
            expected,
            found: util::json_kind(value).to_string(),
            path: ctx.path.clone(),
            snippet: util::snippet(value),
        }
    }

    fn content_null(&self, ctx: &NodeCtx, idx: usize) -> Error {
        Error::NullNotAllowed {
            class: ctx.class_hint.clone(),
            path: util::path_index(&ctx.path, idx),
        }
    }
}

/// Creator lookup: the selected name, falling back to the default slot.
fn select_creator<'a>(
    resolved: &'a ResolvedClass,
    config: &EffectiveContext,
) -> Option<&'a CreatorDescriptor> {
    if !config.creator_name.is_empty() {
        if let Some(named) = resolved.creators.get(&config.creator_name) {
            return Some(named);
        }
    }
    resolved.creators.get("")
}

fn empty_as_null(value: Value, config: &EffectiveContext) -> Value {
    match &value {
        Value::Array(items)
            if items.is_empty()
                && config.on(DeserializationFeature::AcceptEmptyArrayAsNullObject) =>
        {
            Value::Null
        }
        Value::String(s)
            if s.is_empty()
                && config.on(DeserializationFeature::AcceptEmptyStringAsNullObject) =>
        {
            Value::Null
        }
        _ => value,
    }
}

/// Strip unwrap affixes from a wire key; `None` when they do not match.
fn strip_affixes(key: &str, unwrap: &crate::schema::descriptor::Unwrap) -> Option<String> {
    let rest = key.strip_prefix(unwrap.prefix.as_str())?;
    let core = rest.strip_suffix(unwrap.suffix.as_str())?;
    if core.is_empty() {
        return None;
    }
    Some(core.to_string())
}

/// Id literal from a graph value, mirroring the wire-side extraction.
fn typed_id_literal(value: &TypedValue) -> Option<String> {
    match value {
        TypedValue::Int(i) => Some(i.to_string()),
        TypedValue::BigInt(i) => Some(i.to_string()),
        TypedValue::String(s) => Some(s.clone()),
        TypedValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_object_instance(name: &str) -> Error {
    Error::Transform(format!(
        "creator for '{}' returned a non-object value; remaining properties cannot be assigned",
        name
    ))
}
