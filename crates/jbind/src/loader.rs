// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Declarative Context Files
//!
//! Loads a [`Context`] from a JSON document, so call defaults can live in
//! configuration instead of code:
//!
//! ```json
//! {
//!   "root_type": "User",
//!   "views": ["internal"],
//!   "features": { "FAIL_ON_UNKNOWN_PROPERTIES": false },
//!   "injectable": { "request.tenant": "acme" }
//! }
//! ```
//!
//! `root_type` names a registered class. Feature flags use their
//! SCREAMING_SNAKE names; an unrecognized flag rejects the whole file.
//! Only data settings can be expressed here — custom (de)serializers and
//! per-type overrides carry code and stay API-only.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::features::{DeserializationFeature, SerializationFeature};
use crate::schema::descriptor::TypeRef;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ContextFile {
    #[serde(default)]
    root_type: Option<String>,
    #[serde(default)]
    creator_name: Option<String>,
    #[serde(default)]
    views: Vec<String>,
    #[serde(default)]
    context_groups: Vec<String>,
    #[serde(default)]
    features: BTreeMap<String, bool>,
    #[serde(default)]
    injectable: BTreeMap<String, Value>,
}

impl Context {
    /// Build a context from declarative JSON text.
    pub fn from_json_str(text: &str) -> Result<Context> {
        let file: ContextFile = serde_json::from_str(text)?;
        let mut context = Context::new();
        if let Some(class) = file.root_type {
            context = context.with_root_type(TypeRef::class(class));
        }
        if let Some(name) = file.creator_name {
            context = context.with_creator_name(name);
        }
        for view in file.views {
            context = context.with_view(view);
        }
        for group in file.context_groups {
            context = context.with_context_group(group);
        }
        for (name, on) in file.features {
            context = apply_flag(context, &name, on)?;
        }
        for (key, value) in file.injectable {
            context = context.with_injectable(key, value);
        }
        Ok(context)
    }

    /// Build a context from a declarative JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Context> {
        let path = path.as_ref();
        log::debug!("[Context::from_json_file] path={}", path.display());
        let text = std::fs::read_to_string(path)?;
        Context::from_json_str(&text)
    }
}

fn apply_flag(context: Context, name: &str, on: bool) -> Result<Context> {
    if let Some(flag) = DeserializationFeature::from_name(name) {
        return Ok(if on {
            context.enable(flag)
        } else {
            context.disable(flag)
        });
    }
    if let Some(flag) = SerializationFeature::from_name(name) {
        return Ok(if on {
            context.enable(flag)
        } else {
            context.disable(flag)
        });
    }
    Err(Error::InvalidSchema(format!(
        "unknown feature flag '{}'",
        name
    )))
}
