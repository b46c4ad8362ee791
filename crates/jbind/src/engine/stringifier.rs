// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Stringify Direction
//!
//! Structural mirror of the parser: walks a typed object graph back into
//! a JSON value tree. Class nodes run the encode pipeline — class hook,
//! value provider, identity emission, self-reference detection, ordered
//! property extraction with inclusion/view/naming/unwrapping rules, then
//! discriminator placement.
//!
//! Identity classes mark themselves as emitted *before* descending into
//! children, so any cycle back to an ancestor collapses to its bare id.

use std::sync::Arc;

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use crate::context::{EffectiveContext, SerMatch};
use crate::engine::identity::SerState;
use crate::engine::{type_resolver, NodeCtx, NodeMeta};
use crate::error::{Error, Result};
use crate::features::SerializationFeature;
use crate::schema::descriptor::{
    Access, IdGenerator, Include, PropertyDescriptor, TypeInclude, TypeRef,
};
use crate::schema::registry::{ResolvedClass, SchemaRegistry};
use crate::util;
use crate::value::TypedValue;

/// Discriminator pair handed up to the parent for external placement.
type ExternalId = Option<(String, String)>;

/// Recursive encode walker over a shared schema registry.
pub(crate) struct Stringifier<'r> {
    registry: &'r SchemaRegistry,
}

impl<'r> Stringifier<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Stringifier { registry }
    }

    /// Encode one graph root under a merged configuration.
    pub fn stringify_document(
        &self,
        value: &TypedValue,
        config: Arc<EffectiveContext>,
    ) -> Result<Value> {
        let target = config.root_type.clone().unwrap_or(TypeRef::Any);
        let ctx = NodeCtx::root(target, config);
        let mut state = SerState::new();
        let (out, external) = self.transform(value, &ctx, &mut state)?;
        let out = merge_external(out, external);
        self.wrap_root(out, value, &ctx)
    }

    /// Pipeline entry for one node.
    pub fn transform(
        &self,
        value: &TypedValue,
        ctx: &NodeCtx,
        state: &mut SerState,
    ) -> Result<(Value, ExternalId)> {
        // first applicable custom serializer short-circuits the node
        for custom in &ctx.config.serializers {
            let applies = match &custom.applies {
                SerMatch::Class(class) => match value.as_object() {
                    Some(obj) => {
                        let own = obj.borrow().class().to_string();
                        own == *class || self.registry.is_subclass(&own, class)
                    }
                    None => false,
                },
                SerMatch::Predicate(p) => (p)(value),
            };
            if applies {
                return Ok(((custom.transform)(value)?, None));
            }
        }
        match value {
            TypedValue::Null => Ok((Value::Null, None)),
            TypedValue::Bool(b) => Ok((Value::Bool(*b), None)),
            TypedValue::Int(i) => Ok((Value::from(*i), None)),
            TypedValue::Float(f) => {
                if !f.is_finite() {
                    return Err(Error::Transform(format!(
                        "non-finite number at {}",
                        ctx.path
                    )));
                }
                Ok((Value::from(*f), None))
            }
            TypedValue::BigInt(i) => Ok((bigint_wire(*i), None)),
            TypedValue::String(s) => Ok((Value::String(s.clone()), None)),
            TypedValue::Timestamp(ts) => {
                let wire = if ctx
                    .config
                    .on_ser(SerializationFeature::WriteDatesAsTimestamps)
                {
                    Value::from(ts.timestamp_millis())
                } else {
                    Value::String(ts.to_rfc3339_opts(SecondsFormat::Millis, true))
                };
                Ok((wire, None))
            }
            TypedValue::Pattern(re) => Ok((Value::String(re.as_str().to_string()), None)),
            TypedValue::Array(items) => self.encode_array(items, ctx, state),
            TypedValue::Map(entries) => self.encode_map(entries, ctx, state),
            TypedValue::Object(_) => self.encode_object(value, ctx, state),
        }
    }

    fn encode_array(
        &self,
        items: &[TypedValue],
        ctx: &NodeCtx,
        state: &mut SerState,
    ) -> Result<(Value, ExternalId)> {
        let elem_target = match &ctx.target {
            TypeRef::Array(elem) => (**elem).clone(),
            _ => TypeRef::Any,
        };
        let mut out = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let child = ctx.element(elem_target.clone(), idx);
            let (encoded, external) = self.transform(item, &child, state)?;
            // elements have no parent object slot, so externals inline
            out.push(merge_external(encoded, external));
        }
        Ok((Value::Array(out), None))
    }

    fn encode_map(
        &self,
        entries: &indexmap::IndexMap<String, TypedValue>,
        ctx: &NodeCtx,
        state: &mut SerState,
    ) -> Result<(Value, ExternalId)> {
        let val_target = match &ctx.target {
            TypeRef::Map(_, val) => (**val).clone(),
            _ => TypeRef::Any,
        };
        let mut pairs: Vec<(&String, &TypedValue)> = entries.iter().collect();
        if ctx
            .config
            .on_ser(SerializationFeature::OrderMapEntriesByKeys)
        {
            pairs.sort_by(|a, b| a.0.cmp(b.0));
        }
        let mut out = Map::with_capacity(pairs.len());
        for (key, val) in pairs {
            let child = ctx.descend(val_target.clone(), util::path_field(&ctx.path, key));
            let (encoded, external) = self.transform(val, &child, state)?;
            out.insert(key.clone(), merge_external(encoded, external));
        }
        Ok((Value::Object(out), None))
    }

    fn encode_object(
        &self,
        value: &TypedValue,
        ctx: &NodeCtx,
        state: &mut SerState,
    ) -> Result<(Value, ExternalId)> {
        let class = match value.as_object() {
            Some(obj) => obj.borrow().class().to_string(),
            None => return Err(Error::Transform(format!("not an object at {}", ctx.path))),
        };
        let resolved = self.resolve_at(&class, ctx)?;
        // class hook rewrites the graph value before extraction
        if let Some(hook) = &resolved.options.serialize_hook {
            let rewritten = (hook)(value.clone())?;
            if rewritten.object_addr() != value.object_addr() {
                // same-class replacements continue below, anything else
                // re-enters the pipeline from the top
                let same_class = rewritten
                    .as_object()
                    .map(|o| o.borrow().class() == class)
                    .unwrap_or(false);
                if same_class {
                    return self.encode_instance(&rewritten, &resolved, ctx, state);
                }
                return self.transform(&rewritten, ctx, state);
            }
        }
        self.encode_instance(value, &resolved, ctx, state)
    }

    fn encode_instance(
        &self,
        value: &TypedValue,
        resolved: &ResolvedClass,
        ctx: &NodeCtx,
        state: &mut SerState,
    ) -> Result<(Value, ExternalId)> {
        let meta = NodeMeta::for_node(resolved, ctx);
        let addr = value.object_addr().unwrap_or_default();

        // value provider: one property stands in for the whole instance
        if let Some(idx) = resolved.value_provider {
            if state.on_stack(addr) {
                return self.self_reference(resolved, ctx);
            }
            let prop = &resolved.properties[idx];
            let field = self.read_field(value, prop);
            state.push(addr);
            let result = match field {
                Some(field) => {
                    let mut child = ctx.descend(prop.value_type.clone(), ctx.path.clone());
                    child.class_hint = resolved.name.clone();
                    child.property_hint = prop.name.clone();
                    self.transform(&field, &child, state)
                }
                None => Ok((Value::Null, None)),
            };
            state.pop(addr);
            return result;
        }

        // identity: already-emitted instances collapse to their bare id
        let mut inject_id: Option<(String, Value)> = None;
        if let Some(info) = &meta.identity {
            if let Some(prior) = state.emitted_id(addr) {
                return Ok((prior.clone(), None));
            }
            let scope = info.scope.as_deref().unwrap_or(&resolved.name);
            match info.generator {
                IdGenerator::Property => {
                    let id_field = value
                        .as_object()
                        .and_then(|o| o.borrow().get(&info.property).cloned())
                        .unwrap_or(TypedValue::Null);
                    if let Some(wire) = scalar_id_wire(&id_field) {
                        state.mark_emitted(addr, wire.clone());
                        if info.always_as_id {
                            return Ok((wire, None));
                        }
                    }
                }
                IdGenerator::IntSequence => {
                    let next = state.next_sequence(scope);
                    let wire = Value::from(next);
                    state.mark_emitted(addr, wire.clone());
                    if info.always_as_id {
                        return Ok((wire, None));
                    }
                    inject_id = Some((info.property.clone(), wire));
                }
            }
        }
        // a marked instance can never be back on the stack (a cycle hits
        // the emitted id first), so this only fires where no id exists
        if state.on_stack(addr) {
            return self.self_reference(resolved, ctx);
        }

        state.push(addr);
        let fields = self.extract_fields(value, resolved, inject_id, ctx, state);
        state.pop(addr);
        let out = fields?;

        // discriminator placement
        if let Some(info) = &meta.type_info {
            let id = type_resolver::type_id_for(&resolved.name, info, &meta.subtypes);
            let wrapped = match info.include {
                TypeInclude::Property => {
                    let mut wrapped = Map::with_capacity(out.len() + 1);
                    wrapped.insert(info.property.clone(), Value::String(id));
                    wrapped.extend(out);
                    Value::Object(wrapped)
                }
                TypeInclude::WrapperObject => {
                    let mut wrapper = Map::with_capacity(1);
                    wrapper.insert(id, Value::Object(out));
                    Value::Object(wrapper)
                }
                TypeInclude::WrapperArray => {
                    Value::Array(vec![Value::String(id), Value::Object(out)])
                }
                TypeInclude::ExternalProperty => {
                    return Ok((Value::Object(out), Some((info.property.clone(), id))));
                }
            };
            return Ok((wrapped, None));
        }
        Ok((Value::Object(out), None))
    }

    fn extract_fields(
        &self,
        value: &TypedValue,
        resolved: &ResolvedClass,
        inject_id: Option<(String, Value)>,
        ctx: &NodeCtx,
        state: &mut SerState,
    ) -> Result<Map<String, Value>> {
        let mut out = Map::new();
        if let Some((key, id)) = inject_id {
            out.insert(key, id);
        }
        for &idx in &resolved.ser_order {
            let prop = &resolved.properties[idx];
            if !self.readable(resolved, prop) {
                continue;
            }
            if !crate::engine::view_allows(
                self.registry,
                prop,
                &ctx.config.views,
                ctx.config
                    .on_ser(SerializationFeature::DefaultViewInclusion),
            ) {
                continue;
            }
            let field = match self.read_field(value, prop) {
                Some(field) => field,
                // absent fields stay absent
                None => continue,
            };
            let include = prop.include.or(resolved.options.include).unwrap_or_default();
            let skip = match include {
                Include::Always => false,
                Include::NonNull => field.is_null(),
                Include::NonEmpty => field.is_empty_value(),
                Include::NonDefault => field.is_default_value(),
            };
            if skip {
                continue;
            }
            let field = match &prop.serialize_with {
                Some(hook) => (hook)(field)?,
                None => field,
            };
            let wire = &resolved.wire_names[idx];
            // raw fragments splice back as parsed values
            if prop.raw {
                match &field {
                    TypedValue::Null => {
                        out.insert(wire.clone(), Value::Null);
                    }
                    TypedValue::String(s) => {
                        out.insert(wire.clone(), serde_json::from_str(s)?);
                    }
                    other => {
                        return Err(Error::Transform(format!(
                            "raw property '{}' holds {}, expected a string fragment",
                            prop.name,
                            other.kind()
                        )))
                    }
                }
                continue;
            }
            let mut child = ctx.descend(prop.value_type.clone(), util::path_field(&ctx.path, wire));
            child.class_hint = resolved.name.clone();
            child.property_hint = prop.name.clone();
            if let Some(overlay) = &prop.type_meta {
                child.push_overlay(overlay);
            }
            let (encoded, external) = self.transform(&field, &child, state)?;
            if let Some((key, id)) = external {
                out.insert(key, Value::String(id));
            }
            if let Some(unwrap) = &prop.unwrap {
                if let Value::Object(inner) = encoded {
                    for (key, val) in inner {
                        out.insert(format!("{}{}{}", unwrap.prefix, key, unwrap.suffix), val);
                    }
                }
                continue;
            }
            out.insert(wire.clone(), encoded);
        }
        // any-getter entries append after declared properties; declared
        // keys win on collision
        if let Some(idx) = resolved.any_getter {
            let prop = &resolved.properties[idx];
            if let Some(TypedValue::Map(extra)) = self.read_field(value, prop) {
                for (key, val) in &extra {
                    if out.contains_key(key) {
                        continue;
                    }
                    let child = ctx.descend(TypeRef::Any, util::path_field(&ctx.path, key));
                    let (encoded, external) = self.transform(val, &child, state)?;
                    out.insert(key.clone(), merge_external(encoded, external));
                }
            }
        }
        Ok(out)
    }

    fn read_field(&self, value: &TypedValue, prop: &PropertyDescriptor) -> Option<TypedValue> {
        let obj = value.as_object()?;
        let borrowed = obj.borrow();
        match &prop.getter {
            Some(getter) => Some((getter)(&borrowed)),
            None => borrowed.get(&prop.name).cloned(),
        }
    }

    /// True when the property participates in encoding.
    fn readable(&self, resolved: &ResolvedClass, prop: &PropertyDescriptor) -> bool {
        !(prop.ignored
            || prop.access == Access::WriteOnly
            || prop.back_ref.is_some()
            || prop.any_getter
            || prop.any_setter
            || prop.value_provider
            || resolved.class_ignored(&prop.name))
    }

    fn self_reference(&self, resolved: &ResolvedClass, ctx: &NodeCtx) -> Result<(Value, ExternalId)> {
        if ctx
            .config
            .on_ser(SerializationFeature::FailOnSelfReferences)
        {
            return Err(Error::SelfReference {
                class: resolved.name.clone(),
                path: ctx.path.clone(),
            });
        }
        Ok((Value::Null, None))
    }

    fn wrap_root(&self, out: Value, value: &TypedValue, ctx: &NodeCtx) -> Result<Value> {
        if !ctx.config.on_ser(SerializationFeature::WrapRootValue) {
            return Ok(out);
        }
        let name = match value.as_object() {
            Some(obj) => {
                let class = obj.borrow().class().to_string();
                self.resolve_at(&class, ctx)?.root_name().to_string()
            }
            // only class instances carry a root name
            None => return Ok(out),
        };
        let mut wrapper = Map::with_capacity(1);
        wrapper.insert(name, out);
        Ok(Value::Object(wrapper))
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
}

/// Big integers ride as numbers while they fit, decimal strings after.
fn bigint_wire(i: i128) -> Value {
    if let Ok(small) = i64::try_from(i) {
        Value::from(small)
    } else {
        Value::String(i.to_string())
    }
}

/// Wire form of a property-backed object id.
fn scalar_id_wire(value: &TypedValue) -> Option<Value> {
    match value {
        TypedValue::Int(i) => Some(Value::from(*i)),
        TypedValue::BigInt(i) => Some(bigint_wire(*i)),
        TypedValue::String(s) => Some(Value::String(s.clone())),
        _ => None,
    }
}

/// Inline an external discriminator when no parent object slot exists.
fn merge_external(value: Value, external: ExternalId) -> Value {
    match (value, external) {
        (Value::Object(mut map), Some((key, id))) => {
            let mut out = Map::with_capacity(map.len() + 1);
            out.insert(key, Value::String(id));
            out.append(&mut map);
            Value::Object(out)
        }
        (value, _) => value,
    }
}
