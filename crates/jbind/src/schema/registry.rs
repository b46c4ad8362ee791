// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Schema Registry
//!
//! Process-wide store of raw [`ClassDescriptor`]s plus the memoized
//! *resolved* form the engine actually consumes. Resolution flattens the
//! inheritance chain (parent properties first, same-name overrides in
//! place), selects per-context-group descriptors, merges option bundles,
//! and precomputes the wire-name indexes — once per `(class, groups)`
//! pair, cached for the registry's lifetime.
//!
//! Both maps are lock-free (`DashMap`) and populate-once: registration is
//! expected at startup, resolution races at worst recompute the same
//! value and the last writer wins.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::{Error, Result};
use crate::schema::descriptor::{
    ClassDescriptor, ClassOptions, CreatorDescriptor, IdentityInfo, PropertyDescriptor,
};

/// Cache key: class name plus active context groups in request order.
type ResolvedKey = (String, Vec<String>);

/// Flattened, group-selected schema of one class; the engine's working form.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedClass {
    /// Registered class name.
    pub name: String,
    /// Merged class options for the active groups.
    pub options: ClassOptions,
    /// Final properties: inherited first, overrides applied in place.
    pub properties: Vec<PropertyDescriptor>,
    /// Canonical name to property index.
    pub by_name: HashMap<String, usize>,
    /// Effective wire name per property index.
    pub wire_names: Vec<String>,
    /// Wire names and aliases to property index.
    pub wire_index: HashMap<String, usize>,
    /// Lowercased wire index for case-insensitive matching.
    pub wire_lower: HashMap<String, usize>,
    /// Creators keyed by selector name, inherited and overridden.
    pub creators: HashMap<String, CreatorDescriptor>,
    /// Property indexes in stringification order.
    pub ser_order: Vec<usize>,
    /// Index of the value-provider property, if any.
    pub value_provider: Option<usize>,
    /// Index of the any-getter property, if any.
    pub any_getter: Option<usize>,
    /// Index of the any-setter property, if any.
    pub any_setter: Option<usize>,
}

impl ResolvedClass {
    /// Identity declaration from the merged options.
    pub fn identity(&self) -> Option<&IdentityInfo> {
        self.options.identity.as_ref()
    }

    /// Root wrapper key: explicit root name, else the class name.
    pub fn root_name(&self) -> &str {
        self.options.root_name.as_deref().unwrap_or(&self.name)
    }

    /// Property index for a wire key.
    pub fn find_wire(&self, key: &str, case_insensitive: bool) -> Option<usize> {
        if let Some(&idx) = self.wire_index.get(key) {
            return Some(idx);
        }
        if case_insensitive {
            return self.wire_lower.get(&key.to_lowercase()).copied();
        }
        None
    }

    /// True when `name` is excluded by the class ignore list, e.g. for
    /// stringification or (unless setters are allowed) parsing.
    pub fn class_ignored(&self, name: &str) -> bool {
        self.options.ignored.iter().any(|n| n == name)
    }
}

/// Registered class schemas, view hierarchy, and the resolved cache.
///
/// Shared behind `Arc` by every [`ObjectMapper`](crate::ObjectMapper) that
/// transforms its classes.
pub struct SchemaRegistry {
    classes: DashMap<String, Arc<ClassDescriptor>>,
    views: DashMap<String, Option<String>>,
    resolved: DashMap<ResolvedKey, Arc<ResolvedClass>>,
}

impl SchemaRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        SchemaRegistry {
            classes: DashMap::new(),
            views: DashMap::new(),
            resolved: DashMap::new(),
        }
    }

    /// Register a class descriptor under its name.
    ///
    /// Names are single-assignment; registering the same name twice is an
    /// error rather than a silent replacement.
    pub fn register(&self, descriptor: ClassDescriptor) -> Result<()> {
        let name = descriptor.name.clone();
        if self.classes.contains_key(&name) {
            return Err(Error::InvalidSchema(format!(
                "class '{}' is already registered",
                name
            )));
        }
        log::debug!(
            "[SchemaRegistry::register] class={} properties={} creators={}",
            name,
            descriptor.properties.len(),
            descriptor.creators.len()
        );
        self.classes.insert(name, Arc::new(descriptor));
        Ok(())
    }

    /// Register a root view.
    pub fn register_view(&self, name: impl Into<String>) {
        self.views.insert(name.into(), None);
    }

    /// Register a view inheriting membership from `parent`.
    pub fn register_view_extending(&self, name: impl Into<String>, parent: impl Into<String>) {
        self.views.insert(name.into(), Some(parent.into()));
    }

    /// True when `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Raw descriptor by name.
    pub fn descriptor(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.classes.get(name).map(|e| Arc::clone(e.value()))
    }

    /// True when `class` is `ancestor` or inherits from it.
    pub fn is_subclass(&self, class: &str, ancestor: &str) -> bool {
        let mut current = class.to_string();
        loop {
            if current == ancestor {
                return true;
            }
            match self.classes.get(&current).and_then(|d| d.extends.clone()) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// True when `declared` is `requested` or one of its view ancestors.
    pub fn view_active(&self, declared: &str, requested: &str) -> bool {
        let mut current = requested.to_string();
        loop {
            if current == declared {
                return true;
            }
            match self.views.get(&current).and_then(|e| e.value().clone()) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Drop every memoized resolution (test isolation).
    pub fn clear_resolved(&self) {
        self.resolved.clear();
    }

    /// Resolved, flattened schema for `class` under the active `groups`.
    pub(crate) fn resolve(&self, class: &str, groups: &[String]) -> Result<Arc<ResolvedClass>> {
        let key: ResolvedKey = (class.to_string(), groups.to_vec());
        if let Some(hit) = self.resolved.get(&key) {
            return Ok(Arc::clone(hit.value()));
        }
        let built = Arc::new(self.build_resolved(class, groups)?);
        log::debug!(
            "[SchemaRegistry::resolve] class={} groups={:?} properties={}",
            class,
            groups,
            built.properties.len()
        );
        self.resolved.insert(key, Arc::clone(&built));
        Ok(built)
    }

    /// Root-first inheritance chain for `class`.
    fn chain(&self, class: &str) -> Result<Vec<Arc<ClassDescriptor>>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = class.to_string();
        loop {
            if !seen.insert(current.clone()) {
                return Err(Error::InvalidSchema(format!(
                    "inheritance cycle through class '{}'",
                    current
                )));
            }
            let desc = self
                .classes
                .get(&current)
                .map(|e| Arc::clone(e.value()))
                .ok_or_else(|| Error::UnknownClass {
                    class: current.clone(),
                    path: "$".into(),
                })?;
            let parent = desc.extends.clone();
            chain.push(desc);
            match parent {
                Some(p) => current = p,
                None => break,
            }
        }
        chain.reverse();
        Ok(chain)
    }

    fn build_resolved(&self, class: &str, groups: &[String]) -> Result<ResolvedClass> {
        let chain = self.chain(class)?;

        // Options: default bundles root-first, then group bundles with
        // earlier-requested groups overlaid last (they take precedence).
        let mut options = ClassOptions::default();
        for desc in &chain {
            if let Some(defaults) = desc.default_options() {
                options.merge_from(defaults);
            }
        }
        for group in groups.iter().rev() {
            for desc in &chain {
                if let Some((_, bundle)) =
                    desc.options.iter().find(|(g, _)| g.as_deref() == Some(group.as_str()))
                {
                    options.merge_from(bundle);
                }
            }
        }

        // Properties: group-select per class, then flatten the chain with
        // same-name overrides replacing in place.
        let mut properties: Vec<PropertyDescriptor> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for desc in &chain {
            for prop in select_group_properties(desc, groups) {
                match by_name.get(&prop.name) {
                    Some(&idx) => properties[idx] = prop,
                    None => {
                        by_name.insert(prop.name.clone(), properties.len());
                        properties.push(prop);
                    }
                }
            }
        }

        // Creators: child definitions shadow parent ones by selector name.
        let mut creators: HashMap<String, CreatorDescriptor> = HashMap::new();
        for desc in &chain {
            for (name, creator) in &desc.creators {
                creators.insert(name.clone(), creator.clone());
            }
        }

        // Wire indexes under the merged naming strategy.
        let mut wire_names = Vec::with_capacity(properties.len());
        let mut wire_index = HashMap::new();
        let mut wire_lower = HashMap::new();
        for (idx, prop) in properties.iter().enumerate() {
            let wire = prop.wire_name_for(options.naming);
            if wire_index.insert(wire.clone(), idx).is_some() {
                return Err(Error::InvalidSchema(format!(
                    "class '{}': wire name '{}' maps to more than one property",
                    class, wire
                )));
            }
            wire_lower.insert(wire.to_lowercase(), idx);
            for alias in &prop.aliases {
                wire_index.entry(alias.clone()).or_insert(idx);
                wire_lower.entry(alias.to_lowercase()).or_insert(idx);
            }
            wire_names.push(wire);
        }

        let ser_order = stringify_order(&properties, &by_name, &options);

        // the builder checks this per class; inheritance can still combine
        // a parent provider with a differently-named child one
        if properties.iter().filter(|p| p.value_provider).count() > 1 {
            return Err(Error::MultipleValueProviders {
                class: class.to_string(),
            });
        }
        let value_provider = properties.iter().position(|p| p.value_provider);
        let any_getter = properties.iter().position(|p| p.any_getter);
        let any_setter = properties.iter().position(|p| p.any_setter);

        Ok(ResolvedClass {
            name: class.to_string(),
            options,
            properties,
            by_name,
            wire_names,
            wire_index,
            wire_lower,
            creators,
            ser_order,
            value_provider,
            any_getter,
            any_setter,
        })
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        SchemaRegistry::new()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("classes", &self.classes.len())
            .field("views", &self.views.len())
            .field("resolved", &self.resolved.len())
            .finish()
    }
}

/// Pick one descriptor per canonical name: the earliest-requested active
/// group wins, the default (untagged) descriptor is the fallback.
fn select_group_properties(desc: &ClassDescriptor, groups: &[String]) -> Vec<PropertyDescriptor> {
    let mut picked: Vec<PropertyDescriptor> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for prop in &desc.properties {
        let visible = match &prop.group {
            None => true,
            Some(g) => groups.iter().any(|a| a == g),
        };
        if !visible {
            continue;
        }
        match index.get(prop.name.as_str()) {
            None => {
                index.insert(prop.name.as_str(), picked.len());
                picked.push(prop.clone());
            }
            Some(&at) => {
                if priority(&prop.group, groups) < priority(&picked[at].group, groups) {
                    picked[at] = prop.clone();
                }
            }
        }
    }
    picked
}

/// Request-order priority of a group tag; the default group is lowest.
fn priority(group: &Option<String>, groups: &[String]) -> usize {
    match group {
        None => usize::MAX,
        Some(g) => groups.iter().position(|a| a == g).unwrap_or(usize::MAX),
    }
}

/// Encode ordering: explicit list first, then alphabetic or declaration order.
fn stringify_order(
    properties: &[PropertyDescriptor],
    by_name: &HashMap<String, usize>,
    options: &ClassOptions,
) -> Vec<usize> {
    let mut order = Vec::with_capacity(properties.len());
    let mut placed = vec![false; properties.len()];
    for name in &options.property_order {
        if let Some(&idx) = by_name.get(name) {
            if !placed[idx] {
                placed[idx] = true;
                order.push(idx);
            }
        }
    }
    let mut rest: Vec<usize> = (0..properties.len()).filter(|&i| !placed[i]).collect();
    if options.alphabetic {
        rest.sort_by(|&a, &b| properties[a].name.cmp(&properties[b].name));
    }
    order.extend(rest);
    order
}
