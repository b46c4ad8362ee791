// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Transform Engine
//!
//! The recursive core: [`parser`] walks a JSON value tree into the typed
//! object graph, [`stringifier`] walks the graph back out. Both directions
//! share the per-node context defined here, the discriminator machinery in
//! [`type_resolver`], the per-call identity state in [`identity`], creator
//! invocation in [`creator`], and reference/injection wiring in [`refs`].
//!
//! Every recursion step clones a [`NodeCtx`]: sibling branches never
//! observe each other's mutations, and property-scoped type metadata
//! decays level by level exactly once.

pub(crate) mod creator;
pub(crate) mod identity;
pub(crate) mod parser;
pub(crate) mod refs;
pub(crate) mod stringifier;
pub(crate) mod type_resolver;

use std::sync::Arc;

use crate::context::EffectiveContext;
use crate::schema::descriptor::{
    IdentityInfo, Nulls, PropertyDescriptor, SubtypeEntry, TypeInfo, TypeMetaOverlay, TypeRef,
};
use crate::schema::registry::{ResolvedClass, SchemaRegistry};
use crate::util;

/// Shared view filter for both directions.
///
/// No active views means no filtering. A property without view markers
/// follows the direction's default-inclusion flag; a marked property
/// passes when any requested view is the declared view or inherits it.
pub(crate) fn view_allows(
    registry: &SchemaRegistry,
    prop: &PropertyDescriptor,
    active: &[String],
    default_inclusion: bool,
) -> bool {
    if active.is_empty() {
        return true;
    }
    if prop.views.is_empty() {
        return default_inclusion;
    }
    prop.views
        .iter()
        .any(|declared| active.iter().any(|req| registry.view_active(declared, req)))
}

/// Property-scoped type metadata in flight.
///
/// `ttl == 0` means the overlay applies at the current node; a positive
/// ttl counts the levels left before it does. [`NodeCtx::descend`] drops
/// consumed overlays and decrements the rest.
#[derive(Debug, Clone)]
pub(crate) struct Overlay {
    pub meta: Arc<TypeMetaOverlay>,
    pub ttl: u8,
}

/// Per-recursion transform context; deep-copied at every boundary.
#[derive(Clone)]
pub(crate) struct NodeCtx {
    /// Declared target chain for this node.
    pub target: TypeRef,
    /// Effective configuration (swapped for per-class overrides).
    pub config: Arc<EffectiveContext>,
    /// Type metadata overlays in flight.
    pub overlays: Vec<Overlay>,
    /// Dotted diagnostic path from the document root.
    pub path: String,
    /// Owning class for diagnostics (`$` at the root).
    pub class_hint: String,
    /// Owning property for diagnostics.
    pub property_hint: String,
    /// Discriminator read from a sibling key on the parent object.
    pub external_id: Option<String>,
    /// One-level null policy inherited from the owning container property.
    pub content_nulls: Option<Nulls>,
}

impl NodeCtx {
    /// Root context for one transform call.
    pub fn root(target: TypeRef, config: Arc<EffectiveContext>) -> Self {
        NodeCtx {
            target,
            config,
            overlays: Vec::new(),
            path: "$".into(),
            class_hint: "$".into(),
            property_hint: "$".into(),
            external_id: None,
            content_nulls: None,
        }
    }

    /// Child context one level down: consumed overlays dropped, pending
    /// ones decremented, per-node fields reset.
    pub fn descend(&self, target: TypeRef, path: String) -> NodeCtx {
        let overlays = self
            .overlays
            .iter()
            .filter(|o| o.ttl > 0)
            .map(|o| Overlay {
                meta: Arc::clone(&o.meta),
                ttl: o.ttl - 1,
            })
            .collect();
        NodeCtx {
            target,
            config: Arc::clone(&self.config),
            overlays,
            path,
            class_hint: self.class_hint.clone(),
            property_hint: self.property_hint.clone(),
            external_id: None,
            content_nulls: None,
        }
    }

    /// Child context for an array element.
    pub fn element(&self, target: TypeRef, index: usize) -> NodeCtx {
        self.descend(target, util::path_index(&self.path, index))
    }

    /// Attach a property overlay entering this node's subtree.
    ///
    /// For container targets the overlay is meant for the *elements*, one
    /// level deeper, so it enters pending; for everything else it applies
    /// at the node itself.
    pub fn push_overlay(&mut self, meta: &Arc<TypeMetaOverlay>) {
        let ttl = match self.target {
            TypeRef::Array(_) | TypeRef::Map(_, _) => 1,
            _ => 0,
        };
        self.overlays.push(Overlay {
            meta: Arc::clone(meta),
            ttl,
        });
    }

    /// Overlays applying at this node, oldest first.
    pub fn active_overlays(&self) -> impl Iterator<Item = &Arc<TypeMetaOverlay>> {
        self.overlays.iter().filter(|o| o.ttl == 0).map(|o| &o.meta)
    }

    /// Swap in a derived configuration for a per-class override subtree.
    pub fn with_config(&self, config: Arc<EffectiveContext>) -> NodeCtx {
        let mut child = self.clone();
        child.config = config;
        child
    }
}

/// Class metadata effective at one node: resolved class options overlaid
/// with the property-scoped metadata that applies here.
pub(crate) struct NodeMeta {
    pub type_info: Option<TypeInfo>,
    pub subtypes: Vec<SubtypeEntry>,
    pub identity: Option<IdentityInfo>,
}

impl NodeMeta {
    /// Merge the class options with the node's active overlays.
    pub fn for_node(resolved: &ResolvedClass, ctx: &NodeCtx) -> NodeMeta {
        let mut meta = NodeMeta {
            type_info: resolved.options.type_info.clone(),
            subtypes: resolved.options.subtypes.clone(),
            identity: resolved.options.identity.clone(),
        };
        for overlay in ctx.active_overlays() {
            if let Some(info) = &overlay.type_info {
                meta.type_info = Some(info.clone());
            }
            for sub in &overlay.subtypes {
                if !meta.subtypes.iter().any(|s| s.class == sub.class) {
                    meta.subtypes.push(sub.clone());
                }
            }
            if let Some(identity) = &overlay.identity {
                meta.identity = Some(identity.clone());
            }
        }
        meta
    }
}
