// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Reference Linking & Injection
//!
//! Back-reference wiring runs once per constructed instance, after the
//! creator and the property assignments: every managed-reference property
//! hands the parent instance to the matching back-reference property on
//! its child objects (container-valued references link every element).
//! Injectable values come from the call context in wire form and are
//! transformed through the declared type chain at the point of use.

use crate::engine::parser::Parser;
use crate::engine::{identity::CallState, NodeCtx};
use crate::error::{Error, Result};
use crate::schema::descriptor::TypeRef;
use crate::schema::registry::SchemaRegistry;
use crate::value::{ObjectRef, TypedValue};

/// Assign `parent` to the back-reference side of every managed link.
pub(crate) fn wire_back_references(
    registry: &SchemaRegistry,
    parent: &TypedValue,
    groups: &[String],
) -> Result<()> {
    let parent_obj = match parent.as_object() {
        Some(obj) => obj,
        None => return Ok(()),
    };
    let class = parent_obj.borrow().class().to_string();
    let resolved = registry.resolve(&class, groups)?;
    for prop in &resolved.properties {
        let link = match &prop.managed_ref {
            Some(link) => link,
            None => continue,
        };
        let value = {
            let borrowed = parent_obj.borrow();
            match borrowed.get(&prop.name) {
                Some(v) => v.clone(),
                None => continue,
            }
        };
        for child in child_objects(&value) {
            link_back(registry, &child, link, parent, groups)?;
        }
    }
    Ok(())
}

/// Object instances one level inside a reference value.
fn child_objects(value: &TypedValue) -> Vec<ObjectRef> {
    match value {
        TypedValue::Object(obj) => vec![obj.clone()],
        TypedValue::Array(items) => items
            .iter()
            .filter_map(|v| v.as_object().cloned())
            .collect(),
        TypedValue::Map(entries) => entries
            .values()
            .filter_map(|v| v.as_object().cloned())
            .collect(),
        _ => Vec::new(),
    }
}

/// Set the back-reference property named by `link` on one child.
fn link_back(
    registry: &SchemaRegistry,
    child: &ObjectRef,
    link: &str,
    parent: &TypedValue,
    groups: &[String],
) -> Result<()> {
    let class = child.borrow().class().to_string();
    let resolved = match registry.resolve(&class, groups) {
        Ok(resolved) => resolved,
        // unregistered child classes simply have no back side to fill
        Err(Error::UnknownClass { .. }) => return Ok(()),
        Err(other) => return Err(other),
    };
    for prop in &resolved.properties {
        if prop.back_ref.as_deref() != Some(link) {
            continue;
        }
        let mut borrowed = child.borrow_mut();
        match &prop.setter {
            Some(setter) => (setter)(&mut borrowed, parent.clone()),
            None => {
                borrowed.set(&prop.name, parent.clone());
            }
        }
        break;
    }
    Ok(())
}

/// Resolve an injectable by key and transform it through `target`.
pub(crate) fn injected_value(
    parser: &Parser<'_>,
    key: &str,
    target: &TypeRef,
    ctx: &NodeCtx,
    state: &mut CallState,
) -> Result<TypedValue> {
    let wire = ctx
        .config
        .injectable
        .get(key)
        .cloned()
        .ok_or_else(|| Error::MissingInjectable {
            key: key.to_string(),
            path: ctx.path.clone(),
        })?;
    let child = ctx.descend(target.clone(), ctx.path.clone());
    parser.transform(wire, &child, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EffectiveContext;
    use crate::schema::builder::{ClassBuilder, PropertyBuilder};
    use crate::value::TypedObject;
    use serde_json::json;
    use std::sync::Arc;

    fn tree_registry() -> SchemaRegistry {
        let reg = SchemaRegistry::new();
        reg.register(
            ClassBuilder::new("Node")
                .string_property("name")
                .property(
                    PropertyBuilder::new("children", TypeRef::array(TypeRef::class("Node")))
                        .managed_ref("tree"),
                )
                .property(PropertyBuilder::new("parent", TypeRef::class("Node")).back_ref("tree"))
                .build()
                .unwrap(),
        )
        .unwrap();
        reg
    }

    #[test]
    fn container_reference_links_every_element() {
        let reg = tree_registry();
        let child_a = TypedObject::new("Node").with("name", "a").into_value();
        let child_b = TypedObject::new("Node").with("name", "b").into_value();
        let parent = TypedObject::new("Node")
            .with("name", "root")
            .with(
                "children",
                TypedValue::Array(vec![child_a.clone(), child_b.clone()]),
            )
            .into_value();
        wire_back_references(&reg, &parent, &[]).unwrap();
        for child in [&child_a, &child_b] {
            let obj = child.as_object().unwrap().borrow();
            let back = obj.get("parent").unwrap();
            assert!(back.ptr_eq(&parent));
        }
    }

    #[test]
    fn scalar_reference_links_single_object() {
        let reg = SchemaRegistry::new();
        reg.register(
            ClassBuilder::new("Order")
                .property(
                    PropertyBuilder::new("payment", TypeRef::class("Payment")).managed_ref("ord"),
                )
                .build()
                .unwrap(),
        )
        .unwrap();
        reg.register(
            ClassBuilder::new("Payment")
                .property(PropertyBuilder::new("order", TypeRef::class("Order")).back_ref("ord"))
                .build()
                .unwrap(),
        )
        .unwrap();
        let payment = TypedObject::new("Payment").into_value();
        let order = TypedObject::new("Order")
            .with("payment", payment.clone())
            .into_value();
        wire_back_references(&reg, &order, &[]).unwrap();
        let obj = payment.as_object().unwrap().borrow();
        assert!(obj.get("order").unwrap().ptr_eq(&order));
    }

    #[test]
    fn missing_injectable_is_an_error() {
        let reg = SchemaRegistry::new();
        let parser = Parser::new(&reg);
        let config = Arc::new(EffectiveContext::from_layers(&[]));
        let ctx = NodeCtx::root(TypeRef::Any, config);
        let mut state = CallState::new();
        let err = injected_value(&parser, "tenant", &TypeRef::String, &ctx, &mut state)
            .unwrap_err();
        assert!(matches!(err, Error::MissingInjectable { .. }));
    }

    #[test]
    fn injectable_transforms_through_declared_type() {
        let reg = SchemaRegistry::new();
        let parser = Parser::new(&reg);
        let config = Arc::new(EffectiveContext::from_layers(&[&crate::Context::new()
            .with_injectable("tenant", json!("acme"))]));
        let ctx = NodeCtx::root(TypeRef::Any, config);
        let mut state = CallState::new();
        let value = injected_value(&parser, "tenant", &TypeRef::String, &ctx, &mut state).unwrap();
        assert_eq!(value, TypedValue::String("acme".into()));
    }
}
