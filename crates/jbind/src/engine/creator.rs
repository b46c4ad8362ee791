// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Creator Invocation
//!
//! Builds instances through registered creators. Standard mode resolves
//! one positional argument per declared parameter (wire name, then
//! aliases, then the bare parameter name); delegating and properties-object
//! modes pass a single argument. A standard creator with no declared
//! parameters degenerates to the delegating shape: the whole working
//! value becomes its one argument.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;

use crate::context::EffectiveContext;
use crate::engine::parser::Parser;
use crate::engine::{identity::CallState, refs, NodeCtx};
use crate::error::{Error, Result};
use crate::features::DeserializationFeature;
use crate::schema::descriptor::{CreatorDescriptor, ParamDescriptor, TypeRef};
use crate::schema::registry::ResolvedClass;
use crate::util;
use crate::value::TypedValue;

/// Outcome of a standard-mode invocation.
#[derive(Debug)]
pub(crate) struct CreatorResult {
    pub instance: TypedValue,
    /// Canonical property names satisfied by a wire or injected argument.
    pub satisfied: HashSet<String>,
}

/// Invoke a standard-mode creator against the working wire map.
///
/// Consumed keys are removed from `bag`; the caller assigns whatever
/// remains as plain properties afterwards.
pub(crate) fn invoke_standard(
    parser: &Parser<'_>,
    resolved: &ResolvedClass,
    creator: &CreatorDescriptor,
    bag: &mut IndexMap<String, Value>,
    ctx: &NodeCtx,
    state: &mut CallState,
) -> Result<CreatorResult> {
    let fail_on_null = ctx
        .config
        .on(DeserializationFeature::FailOnNullCreatorProperties);
    let mut args = Vec::with_capacity(creator.params.len());
    let mut satisfied = HashSet::new();
    for param in &creator.params {
        let (value, from_input) = resolve_arg(parser, resolved, param, bag, ctx, state)?;
        if fail_on_null && !param.ignored && value.is_null() {
            return Err(Error::NullCreatorProperty {
                class: resolved.name.clone(),
                parameter: param.name.clone(),
                path: ctx.path.clone(),
            });
        }
        if from_input {
            satisfied.insert(param.name.clone());
        }
        args.push(value);
    }
    log::debug!(
        "[CreatorInvoker::invoke] class={} creator={:?} args={}",
        resolved.name,
        creator.name,
        args.len()
    );
    let instance = (creator.invoke)(&args)?;
    Ok(CreatorResult {
        instance,
        satisfied,
    })
}

/// Invoke a single-argument creator (delegating, properties-object, or a
/// degenerate standard creator) with `value` as the whole argument.
pub(crate) fn invoke_with_value(
    parser: &Parser<'_>,
    class: &str,
    creator: &CreatorDescriptor,
    value: Value,
    ctx: &NodeCtx,
    state: &mut CallState,
) -> Result<TypedValue> {
    let (target, parameter) = match creator.params.first() {
        Some(p) => (p.value_type.clone(), p.name.clone()),
        None => (TypeRef::Any, "value".to_string()),
    };
    let child = ctx.descend(target, ctx.path.clone());
    let arg = parser.transform(value, &child, state)?;
    if ctx
        .config
        .on(DeserializationFeature::FailOnNullCreatorProperties)
        && arg.is_null()
    {
        return Err(Error::NullCreatorProperty {
            class: class.to_string(),
            parameter,
            path: ctx.path.clone(),
        });
    }
    log::debug!(
        "[CreatorInvoker::invoke] class={} creator={:?} delegated",
        class,
        creator.name
    );
    (creator.invoke)(&[arg])
}

/// Resolve one positional argument. The boolean is true when the value
/// came from the wire or an injectable, false for sentinel nulls.
fn resolve_arg(
    parser: &Parser<'_>,
    resolved: &ResolvedClass,
    param: &ParamDescriptor,
    bag: &mut IndexMap<String, Value>,
    ctx: &NodeCtx,
    state: &mut CallState,
) -> Result<(TypedValue, bool)> {
    if param.ignored {
        return Ok((TypedValue::Null, false));
    }
    if let Some(&idx) = resolved.by_name.get(&param.name) {
        if !view_allows(parser, resolved, idx, &ctx.config) {
            // the position still exists, carrying the missing sentinel
            take_wire(bag, param);
            return Ok((TypedValue::Null, false));
        }
    }
    if let Some(inject) = &param.inject {
        if !inject.use_input {
            // forced injection: the wire key is addressed but discarded
            take_wire(bag, param);
            let value =
                refs::injected_value(parser, &inject.key, &param.value_type, ctx, state)?;
            return Ok((value, true));
        }
    }
    if let Some(raw) = take_wire(bag, param) {
        let child = ctx.descend(
            param.value_type.clone(),
            util::path_field(&ctx.path, &param.name),
        );
        let value = parser.transform(raw, &child, state)?;
        return Ok((value, true));
    }
    if let Some(inject) = &param.inject {
        let value = refs::injected_value(parser, &inject.key, &param.value_type, ctx, state)?;
        return Ok((value, true));
    }
    if param.required {
        // required outranks the feature flag and uses the property-level error
        return Err(Error::RequiredPropertyMissing {
            class: resolved.name.clone(),
            property: param.name.clone(),
            path: ctx.path.clone(),
            snippet: util::keys_hint(bag),
        });
    }
    if ctx
        .config
        .on(DeserializationFeature::FailOnMissingCreatorProperties)
    {
        return Err(Error::MissingCreatorProperty {
            class: resolved.name.clone(),
            parameter: param.name.clone(),
            path: ctx.path.clone(),
        });
    }
    Ok((TypedValue::Null, false))
}

/// Wire lookup chain for a parameter: explicit wire name, aliases in
/// order, bare parameter name.
fn take_wire(bag: &mut IndexMap<String, Value>, param: &ParamDescriptor) -> Option<Value> {
    if let Some(wire) = &param.wire_name {
        if let Some(v) = bag.shift_remove(wire) {
            return Some(v);
        }
    }
    for alias in &param.aliases {
        if let Some(v) = bag.shift_remove(alias) {
            return Some(v);
        }
    }
    bag.shift_remove(&param.name)
}

fn view_allows(
    parser: &Parser<'_>,
    resolved: &ResolvedClass,
    idx: usize,
    config: &EffectiveContext,
) -> bool {
    parser.view_allows(&resolved.properties[idx], config)
}
