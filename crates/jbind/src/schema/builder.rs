// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Schema Builders
//!
//! Fluent, consuming builders that produce the immutable descriptors in
//! [`crate::schema::descriptor`]. All structural validation happens in
//! `build()`: a descriptor that builds successfully is safe to register
//! and will never be rejected by the engine for malformed metadata.
//!
//! # Example
//!
//! ```rust
//! use jbind::{ClassBuilder, PropertyBuilder, TypeRef};
//!
//! let user = ClassBuilder::new("User")
//!     .int_property("id")
//!     .property(PropertyBuilder::new("email", TypeRef::String).required())
//!     .property(
//!         PropertyBuilder::new("roles", TypeRef::array(TypeRef::String))
//!             .alias("groups"),
//!     )
//!     .build()
//!     .unwrap();
//! assert_eq!(user.name, "User");
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::schema::descriptor::{
    Access, ClassDescriptor, ClassOptions, CreatorDescriptor, CreatorFn, CreatorMode, GetterFn,
    GraphHookFn, IdentityInfo, Include, Inject, Nulls, ParamDescriptor, PropertyDescriptor,
    SetterFn, SubtypeEntry, TypeInfo, TypeMetaOverlay, TypeRef, Unwrap, ValueHookFn,
};
use crate::schema::naming::NamingStrategy;

/// Context group names: word characters only, never empty.
fn group_name_valid(name: &str) -> bool {
    static GROUP_RE: OnceLock<Regex> = OnceLock::new();
    GROUP_RE
        .get_or_init(|| Regex::new(r"^[\w]+$").unwrap())
        .is_match(name)
}

// ============================================================================
// PropertyBuilder
// ============================================================================

/// Builder for one [`PropertyDescriptor`].
pub struct PropertyBuilder {
    desc: PropertyDescriptor,
}

impl PropertyBuilder {
    /// Property `name` with the declared type chain `value_type`.
    pub fn new(name: impl Into<String>, value_type: TypeRef) -> Self {
        PropertyBuilder {
            desc: PropertyDescriptor {
                name: name.into(),
                wire_name: None,
                aliases: Vec::new(),
                value_type,
                required: false,
                access: Access::ReadWrite,
                ignored: false,
                raw: false,
                views: Vec::new(),
                unwrap: None,
                group: None,
                include: None,
                nulls: None,
                content_nulls: None,
                inject: None,
                managed_ref: None,
                back_ref: None,
                getter: None,
                setter: None,
                deserialize_with: None,
                serialize_with: None,
                type_meta: None,
                value_provider: false,
                any_getter: false,
                any_setter: false,
            },
        }
    }

    /// Explicit wire name (exempt from the class naming strategy).
    #[must_use]
    pub fn wire_name(mut self, name: impl Into<String>) -> Self {
        self.desc.wire_name = Some(name.into());
        self
    }

    /// Additional decode-side key.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.desc.aliases.push(alias.into());
        self
    }

    /// Reject documents where this property is absent.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.desc.required = true;
        self
    }

    /// Encoded only; the wire key is consumed silently on decode.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.desc.access = Access::ReadOnly;
        self
    }

    /// Decoded only; never encoded.
    #[must_use]
    pub fn write_only(mut self) -> Self {
        self.desc.access = Access::WriteOnly;
        self
    }

    /// Excluded from both directions.
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.desc.ignored = true;
        self
    }

    /// Pre-serialized JSON fragment (string-typed field).
    #[must_use]
    pub fn raw(mut self) -> Self {
        self.desc.raw = true;
        self
    }

    /// Declare membership in a view.
    #[must_use]
    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.desc.views.push(view.into());
        self
    }

    /// Inline the nested object's keys into the parent.
    #[must_use]
    pub fn unwrapped(mut self) -> Self {
        self.desc.unwrap = Some(Unwrap::default());
        self
    }

    /// Inline with `prefix`/`suffix` affixed to every child key.
    #[must_use]
    pub fn unwrapped_affixed(
        mut self,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        self.desc.unwrap = Some(Unwrap {
            prefix: prefix.into(),
            suffix: suffix.into(),
        });
        self
    }

    /// Encode inclusion override.
    #[must_use]
    pub fn include(mut self, include: Include) -> Self {
        self.desc.include = Some(include);
        self
    }

    /// Decode policy for an explicit null.
    #[must_use]
    pub fn nulls(mut self, nulls: Nulls) -> Self {
        self.desc.nulls = Some(nulls);
        self
    }

    /// Decode policy for nulls inside container values.
    #[must_use]
    pub fn content_nulls(mut self, nulls: Nulls) -> Self {
        self.desc.content_nulls = Some(nulls);
        self
    }

    /// Fill from the context's injectable values; input wins when present.
    #[must_use]
    pub fn inject(mut self, key: impl Into<String>) -> Self {
        self.desc.inject = Some(Inject {
            key: key.into(),
            use_input: true,
        });
        self
    }

    /// Fill from the context's injectable values, ignoring any input value.
    #[must_use]
    pub fn inject_always(mut self, key: impl Into<String>) -> Self {
        self.desc.inject = Some(Inject {
            key: key.into(),
            use_input: false,
        });
        self
    }

    /// Forward side of a parent/child link.
    #[must_use]
    pub fn managed_ref(mut self, link: impl Into<String>) -> Self {
        self.desc.managed_ref = Some(link.into());
        self
    }

    /// Back side of a parent/child link; never encoded.
    #[must_use]
    pub fn back_ref(mut self, link: impl Into<String>) -> Self {
        self.desc.back_ref = Some(link.into());
        self
    }

    /// Compute the encoded value instead of reading the field.
    #[must_use]
    pub fn getter(mut self, f: GetterFn) -> Self {
        self.desc.getter = Some(f);
        self
    }

    /// Write the decoded value through a closure.
    #[must_use]
    pub fn setter(mut self, f: SetterFn) -> Self {
        self.desc.setter = Some(f);
        self
    }

    /// Rewrite the raw fragment before decode recursion.
    #[must_use]
    pub fn deserialize_with(mut self, f: ValueHookFn) -> Self {
        self.desc.deserialize_with = Some(f);
        self
    }

    /// Rewrite the graph value before encode recursion.
    #[must_use]
    pub fn serialize_with(mut self, f: GraphHookFn) -> Self {
        self.desc.serialize_with = Some(f);
        self
    }

    /// One-level polymorphism/identity overlay for the value or elements.
    #[must_use]
    pub fn meta(mut self, meta: TypeMetaOverlay) -> Self {
        self.desc.type_meta = Some(std::sync::Arc::new(meta));
        self
    }

    /// Encode the whole instance as this property's value.
    #[must_use]
    pub fn value_provider(mut self) -> Self {
        self.desc.value_provider = true;
        self
    }

    /// Inline this map property's entries on encode.
    #[must_use]
    pub fn any_getter(mut self) -> Self {
        self.desc.any_getter = true;
        self
    }

    /// Absorb unknown keys into this map property on decode.
    #[must_use]
    pub fn any_setter(mut self) -> Self {
        self.desc.any_setter = true;
        self
    }

    fn build(self, group: Option<String>) -> PropertyDescriptor {
        let mut desc = self.desc;
        desc.group = group;
        desc
    }
}

// ============================================================================
// CreatorBuilder
// ============================================================================

/// Builder for one creator parameter.
pub struct ParamBuilder {
    desc: ParamDescriptor,
}

impl ParamBuilder {
    /// Parameter `name` of type `value_type`.
    pub fn new(name: impl Into<String>, value_type: TypeRef) -> Self {
        ParamBuilder {
            desc: ParamDescriptor {
                name: name.into(),
                wire_name: None,
                aliases: Vec::new(),
                value_type,
                required: false,
                ignored: false,
                inject: None,
            },
        }
    }

    /// Explicit wire name, tried before aliases and the bare name.
    #[must_use]
    pub fn wire_name(mut self, name: impl Into<String>) -> Self {
        self.desc.wire_name = Some(name.into());
        self
    }

    /// Additional accepted key.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.desc.aliases.push(alias.into());
        self
    }

    /// Reject documents where the argument cannot be resolved.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.desc.required = true;
        self
    }

    /// Position receives null without consuming input.
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.desc.ignored = true;
        self
    }

    /// Resolve from the context's injectable values when absent from input.
    #[must_use]
    pub fn inject(mut self, key: impl Into<String>) -> Self {
        self.desc.inject = Some(Inject {
            key: key.into(),
            use_input: true,
        });
        self
    }
}

/// Builder for one [`CreatorDescriptor`].
pub struct CreatorBuilder {
    name: String,
    mode: CreatorMode,
    params: Vec<ParamDescriptor>,
    invoke: Option<CreatorFn>,
}

impl CreatorBuilder {
    /// The class's default creator (selector `""`).
    pub fn default_creator() -> Self {
        CreatorBuilder {
            name: String::new(),
            mode: CreatorMode::Standard,
            params: Vec::new(),
            invoke: None,
        }
    }

    /// A named creator, selected per call via the context.
    pub fn named(name: impl Into<String>) -> Self {
        CreatorBuilder {
            name: name.into(),
            mode: CreatorMode::Standard,
            params: Vec::new(),
            invoke: None,
        }
    }

    /// Single-argument mode: the whole working value.
    #[must_use]
    pub fn delegating(mut self) -> Self {
        self.mode = CreatorMode::Delegating;
        self
    }

    /// Single-argument mode: the filtered property bag as one map.
    #[must_use]
    pub fn properties_object(mut self) -> Self {
        self.mode = CreatorMode::PropertiesObject;
        self
    }

    /// Declare the next positional parameter.
    #[must_use]
    pub fn param(mut self, param: ParamBuilder) -> Self {
        self.params.push(param.desc);
        self
    }

    /// The construction callable.
    #[must_use]
    pub fn invoke(mut self, f: CreatorFn) -> Self {
        self.invoke = Some(f);
        self
    }

    fn build(self, class: &str) -> Result<CreatorDescriptor> {
        let invoke = self.invoke.ok_or_else(|| {
            Error::InvalidSchema(format!(
                "creator '{}' of class '{}' has no callable",
                self.name, class
            ))
        })?;
        if matches!(
            self.mode,
            CreatorMode::Delegating | CreatorMode::PropertiesObject
        ) && self.params.len() != 1
        {
            return Err(Error::InvalidSchema(format!(
                "creator '{}' of class '{}': delegating and properties-object modes take exactly one parameter",
                self.name, class
            )));
        }
        let mut seen = HashSet::new();
        for p in &self.params {
            if !seen.insert(p.name.clone()) {
                return Err(Error::InvalidSchema(format!(
                    "creator '{}' of class '{}': duplicate parameter '{}'",
                    self.name, class, p.name
                )));
            }
        }
        Ok(CreatorDescriptor {
            name: self.name,
            mode: self.mode,
            params: self.params,
            invoke,
        })
    }
}

// ============================================================================
// ClassBuilder
// ============================================================================

/// Builder for one [`ClassDescriptor`].
///
/// Class-level options and properties added after
/// [`context_group`](Self::context_group) are tagged with that group and
/// only take effect when the group is active for a call;
/// [`default_group`](Self::default_group) switches back.
pub struct ClassBuilder {
    name: String,
    extends: Option<String>,
    current_group: Option<String>,
    options: Vec<(Option<String>, ClassOptions)>,
    properties: Vec<PropertyDescriptor>,
    creators: Vec<CreatorBuilder>,
}

impl ClassBuilder {
    /// Start a class named `name` (the registry key).
    pub fn new(name: impl Into<String>) -> Self {
        ClassBuilder {
            name: name.into(),
            extends: None,
            current_group: None,
            options: Vec::new(),
            properties: Vec::new(),
            creators: Vec::new(),
        }
    }

    /// Inherit properties and options from a registered parent class.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Tag subsequent options and properties with a context group.
    #[must_use]
    pub fn context_group(mut self, group: impl Into<String>) -> Self {
        self.current_group = Some(group.into());
        self
    }

    /// Return to the default (untagged) group.
    #[must_use]
    pub fn default_group(mut self) -> Self {
        self.current_group = None;
        self
    }

    fn options_mut(&mut self) -> &mut ClassOptions {
        let group = self.current_group.clone();
        if let Some(idx) = self.options.iter().position(|(g, _)| *g == group) {
            &mut self.options[idx].1
        } else {
            self.options.push((group, ClassOptions::default()));
            &mut self.options.last_mut().unwrap().1
        }
    }

    /// Wrapper key for root wrapping/unwrapping.
    #[must_use]
    pub fn root_name(mut self, name: impl Into<String>) -> Self {
        self.options_mut().root_name = Some(name.into());
        self
    }

    /// Wire-name translation for all non-overridden properties.
    #[must_use]
    pub fn naming(mut self, strategy: NamingStrategy) -> Self {
        self.options_mut().naming = Some(strategy);
        self
    }

    /// Polymorphic typing of this class as a base.
    #[must_use]
    pub fn type_info(mut self, info: TypeInfo) -> Self {
        self.options_mut().type_info = Some(info);
        self
    }

    /// Register a subtype under its own class name.
    #[must_use]
    pub fn subtype(mut self, class: impl Into<String>) -> Self {
        self.options_mut().subtypes.push(SubtypeEntry {
            class: class.into(),
            name: None,
        });
        self
    }

    /// Register a subtype under an explicit discriminator.
    #[must_use]
    pub fn subtype_named(mut self, class: impl Into<String>, name: impl Into<String>) -> Self {
        self.options_mut().subtypes.push(SubtypeEntry {
            class: class.into(),
            name: Some(name.into()),
        });
        self
    }

    /// Object identity declaration.
    #[must_use]
    pub fn identity(mut self, identity: IdentityInfo) -> Self {
        self.options_mut().identity = Some(identity);
        self
    }

    /// Default encode inclusion for all properties.
    #[must_use]
    pub fn include(mut self, include: Include) -> Self {
        self.options_mut().include = Some(include);
        self
    }

    /// Class override of the unknown-properties feature flag.
    #[must_use]
    pub fn ignore_unknown(mut self, ignore: bool) -> Self {
        self.options_mut().ignore_unknown = Some(ignore);
        self
    }

    /// Exclude the named properties from both directions.
    #[must_use]
    pub fn ignore_properties<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let opts = self.options_mut();
        opts.ignored.extend(names.into_iter().map(Into::into));
        self
    }

    /// Ignored names stay decodable (encode-only ignore).
    #[must_use]
    pub fn allow_setters(mut self) -> Self {
        self.options_mut().allow_setters = true;
        self
    }

    /// Explicit encode ordering; listed names first.
    #[must_use]
    pub fn property_order<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let opts = self.options_mut();
        opts.property_order = names.into_iter().map(Into::into).collect();
        self
    }

    /// Alphabetic encode ordering for names not listed explicitly.
    #[must_use]
    pub fn alphabetic(mut self) -> Self {
        self.options_mut().alphabetic = true;
        self
    }

    /// Class-level raw-fragment rewrite before decode.
    #[must_use]
    pub fn deserialize_hook(mut self, f: ValueHookFn) -> Self {
        self.options_mut().deserialize_hook = Some(f);
        self
    }

    /// Class-level graph rewrite before encode.
    #[must_use]
    pub fn serialize_hook(mut self, f: GraphHookFn) -> Self {
        self.options_mut().serialize_hook = Some(f);
        self
    }

    /// Add a property (tagged with the current context group).
    #[must_use]
    pub fn property(mut self, property: PropertyBuilder) -> Self {
        let group = self.current_group.clone();
        self.properties.push(property.build(group));
        self
    }

    /// Shorthand: plain `Int` property.
    #[must_use]
    pub fn int_property(self, name: impl Into<String>) -> Self {
        self.property(PropertyBuilder::new(name, TypeRef::Int))
    }

    /// Shorthand: plain `Float` property.
    #[must_use]
    pub fn float_property(self, name: impl Into<String>) -> Self {
        self.property(PropertyBuilder::new(name, TypeRef::Float))
    }

    /// Shorthand: plain `String` property.
    #[must_use]
    pub fn string_property(self, name: impl Into<String>) -> Self {
        self.property(PropertyBuilder::new(name, TypeRef::String))
    }

    /// Shorthand: plain `Bool` property.
    #[must_use]
    pub fn bool_property(self, name: impl Into<String>) -> Self {
        self.property(PropertyBuilder::new(name, TypeRef::Bool))
    }

    /// Add a creator.
    #[must_use]
    pub fn creator(mut self, creator: CreatorBuilder) -> Self {
        self.creators.push(creator);
        self
    }

    /// Validate and freeze the descriptor.
    pub fn build(self) -> Result<ClassDescriptor> {
        if self.name.is_empty() {
            return Err(Error::InvalidSchema("class name must not be empty".into()));
        }
        for (group, _) in &self.options {
            if let Some(g) = group {
                if !group_name_valid(g) {
                    return Err(Error::InvalidSchema(format!(
                        "class '{}': invalid context group name '{}'",
                        self.name, g
                    )));
                }
            }
        }
        for p in &self.properties {
            if let Some(g) = &p.group {
                if !group_name_valid(g) {
                    return Err(Error::InvalidSchema(format!(
                        "class '{}': invalid context group name '{}'",
                        self.name, g
                    )));
                }
            }
        }
        self.check_properties()?;

        let mut creators = HashMap::new();
        for builder in self.creators {
            let creator = builder.build(&self.name)?;
            if creators.contains_key(&creator.name) {
                return Err(Error::InvalidSchema(format!(
                    "class '{}': duplicate creator '{}'",
                    self.name, creator.name
                )));
            }
            for p in &creator.params {
                check_map_keys(&self.name, &p.value_type)?;
            }
            creators.insert(creator.name.clone(), creator);
        }

        Ok(ClassDescriptor {
            name: self.name,
            extends: self.extends,
            options: self.options,
            properties: self.properties,
            creators,
        })
    }

    fn check_properties(&self) -> Result<()> {
        let mut canonical = HashSet::new();
        let mut wire = HashSet::new();
        let mut providers = 0usize;
        let mut any_setters = 0usize;
        let mut any_getters = 0usize;
        for p in &self.properties {
            if p.name.is_empty() {
                return Err(Error::InvalidSchema(format!(
                    "class '{}': property name must not be empty",
                    self.name
                )));
            }
            if !canonical.insert((p.group.clone(), p.name.clone())) {
                return Err(Error::InvalidSchema(format!(
                    "class '{}': duplicate property '{}'",
                    self.name, p.name
                )));
            }
            if let Some(w) = &p.wire_name {
                if !wire.insert((p.group.clone(), w.clone())) {
                    return Err(Error::InvalidSchema(format!(
                        "class '{}': duplicate wire name '{}'",
                        self.name, w
                    )));
                }
            }
            if p.managed_ref.is_some() && p.back_ref.is_some() {
                return Err(Error::InvalidSchema(format!(
                    "class '{}': property '{}' is both a managed and a back reference",
                    self.name, p.name
                )));
            }
            if p.raw && !matches!(p.value_type, TypeRef::String | TypeRef::Any) {
                return Err(Error::InvalidSchema(format!(
                    "class '{}': raw property '{}' must be string-typed",
                    self.name, p.name
                )));
            }
            if p.unwrap.is_some() && !matches!(p.value_type, TypeRef::Class(_) | TypeRef::Any) {
                return Err(Error::InvalidSchema(format!(
                    "class '{}': unwrapped property '{}' must be object-typed",
                    self.name, p.name
                )));
            }
            if (p.any_getter || p.any_setter) && !matches!(p.value_type, TypeRef::Map(_, _)) {
                return Err(Error::InvalidSchema(format!(
                    "class '{}': any-property '{}' must be map-typed",
                    self.name, p.name
                )));
            }
            if p.value_provider {
                providers += 1;
            }
            if p.any_setter {
                any_setters += 1;
            }
            if p.any_getter {
                any_getters += 1;
            }
            check_map_keys(&self.name, &p.value_type)?;
        }
        if providers > 1 {
            return Err(Error::MultipleValueProviders {
                class: self.name.clone(),
            });
        }
        if any_setters > 1 || any_getters > 1 {
            return Err(Error::InvalidSchema(format!(
                "class '{}': at most one any-getter and one any-setter",
                self.name
            )));
        }
        for (_, opts) in &self.options {
            if let Some(id) = &opts.identity {
                if id.property.is_empty() {
                    return Err(Error::InvalidSchema(format!(
                        "class '{}': identity property must not be empty",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Map keys must round-trip through JSON object keys.
fn check_map_keys(class: &str, t: &TypeRef) -> Result<()> {
    match t {
        TypeRef::Array(e) => check_map_keys(class, e),
        TypeRef::Map(k, v) => {
            if !matches!(**k, TypeRef::String | TypeRef::Int) {
                return Err(Error::InvalidSchema(format!(
                    "class '{}': map keys must be strings or integers, got {}",
                    class,
                    k.kind_name()
                )));
            }
            check_map_keys(class, v)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypedObject;
    use std::sync::Arc;

    #[test]
    fn builds_simple_class() {
        let desc = ClassBuilder::new("User")
            .int_property("id")
            .string_property("name")
            .build()
            .unwrap();
        assert_eq!(desc.properties.len(), 2);
        assert_eq!(desc.properties[0].name, "id");
        assert!(desc.creators.is_empty());
    }

    #[test]
    fn rejects_duplicate_property() {
        let err = ClassBuilder::new("User")
            .int_property("id")
            .int_property("id")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn same_property_in_two_groups_is_fine() {
        let desc = ClassBuilder::new("User")
            .int_property("id")
            .context_group("admin")
            .int_property("id")
            .build()
            .unwrap();
        assert_eq!(desc.properties.len(), 2);
        assert_eq!(desc.properties[1].group.as_deref(), Some("admin"));
    }

    #[test]
    fn rejects_two_value_providers() {
        let err = ClassBuilder::new("Wrapper")
            .property(PropertyBuilder::new("a", TypeRef::Int).value_provider())
            .property(PropertyBuilder::new("b", TypeRef::Int).value_provider())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MultipleValueProviders { .. }));
    }

    #[test]
    fn rejects_bad_group_name() {
        let err = ClassBuilder::new("User")
            .context_group("no spaces")
            .int_property("id")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn rejects_raw_on_non_string() {
        let err = ClassBuilder::new("Doc")
            .property(PropertyBuilder::new("payload", TypeRef::Int).raw())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn rejects_creator_without_callable() {
        let err = ClassBuilder::new("User")
            .creator(CreatorBuilder::default_creator())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn rejects_delegating_creator_with_two_params() {
        let invoke: CreatorFn =
            Arc::new(|_args| Ok(TypedObject::new("User").into_value()));
        let err = ClassBuilder::new("User")
            .creator(
                CreatorBuilder::default_creator()
                    .delegating()
                    .param(ParamBuilder::new("a", TypeRef::Any))
                    .param(ParamBuilder::new("b", TypeRef::Any))
                    .invoke(invoke),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn rejects_float_map_keys() {
        let err = ClassBuilder::new("Grid")
            .property(PropertyBuilder::new(
                "cells",
                TypeRef::map(TypeRef::Float, TypeRef::Int),
            ))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }
}
