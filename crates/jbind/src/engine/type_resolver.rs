// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Polymorphic Type Resolution
//!
//! Maps wire discriminators to registered classes and back. Four placement
//! strategies (inline property, wrapper object, wrapper array, external
//! property); the resolution order is fixed: custom resolver, then the
//! declared subtype registry (explicit names first, then subtype class
//! names), then the base class's own name, then fall back to the base
//! class unless the matching fail flag is set.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::schema::descriptor::{SubtypeEntry, TypeInclude, TypeInfo};
use crate::util;

/// Outcome of decode-side resolution at one node.
#[derive(Debug)]
pub(crate) struct Resolved {
    /// Concrete class the node decodes as.
    pub class: String,
    /// Working value; wrapper strategies replace it with the inner value,
    /// the inline strategy removes the discriminator key from it.
    pub value: Value,
}

/// Resolve the concrete class for one node and strip the discriminator
/// from the working value.
pub(crate) fn resolve_decode(
    base: &str,
    info: &TypeInfo,
    subtypes: &[SubtypeEntry],
    value: Value,
    external_id: Option<String>,
    path: &str,
    fail_on_invalid: bool,
    fail_on_missing: bool,
) -> Result<Resolved> {
    let (id, value) = extract_id(base, info, value, external_id, path)?;
    let id = match id {
        Some(id) => id,
        None => {
            if fail_on_missing {
                return Err(Error::MissingTypeId {
                    class: base.to_string(),
                    path: path.to_string(),
                    snippet: util::snippet(&value),
                });
            }
            return Ok(Resolved {
                class: base.to_string(),
                value,
            });
        }
    };

    if let Some(resolver) = &info.resolver {
        if let Some(class) = (resolver.to_class)(&id) {
            return Ok(Resolved { class, value });
        }
    }
    for sub in subtypes {
        if sub.name.as_deref() == Some(id.as_str()) {
            return Ok(Resolved {
                class: sub.class.clone(),
                value,
            });
        }
    }
    for sub in subtypes {
        if sub.class == id {
            return Ok(Resolved {
                class: sub.class.clone(),
                value,
            });
        }
    }
    if id == base {
        return Ok(Resolved {
            class: base.to_string(),
            value,
        });
    }
    if fail_on_invalid {
        return Err(Error::InvalidSubtype {
            class: base.to_string(),
            discriminator: id,
            known: known_discriminators(base, subtypes),
            path: path.to_string(),
            snippet: util::snippet(&value),
        });
    }
    Ok(Resolved {
        class: base.to_string(),
        value,
    })
}

/// Pull the discriminator out of the working value per placement strategy.
fn extract_id(
    base: &str,
    info: &TypeInfo,
    value: Value,
    external_id: Option<String>,
    path: &str,
) -> Result<(Option<String>, Value)> {
    match info.include {
        TypeInclude::Property => match value {
            Value::Object(mut map) => {
                let id = match map.remove(&info.property) {
                    Some(Value::String(s)) => Some(s),
                    Some(_) | None => None,
                };
                Ok((id, Value::Object(map)))
            }
            other => Ok((None, other)),
        },
        TypeInclude::WrapperObject => match value {
            Value::Object(map) if map.len() == 1 => {
                let (id, inner) = map.into_iter().next().unwrap_or_default();
                Ok((Some(id), inner))
            }
            other => Err(Error::ShapeMismatch {
                class: base.to_string(),
                expected: "single-key wrapper object",
                path: path.to_string(),
                snippet: util::snippet(&other),
            }),
        },
        TypeInclude::WrapperArray => match value {
            Value::Array(items) if (1..=2).contains(&items.len()) => {
                let mut items = items.into_iter();
                match items.next() {
                    Some(Value::String(id)) => {
                        let inner = items.next().unwrap_or(Value::Null);
                        Ok((Some(id), inner))
                    }
                    Some(first) => Err(Error::ShapeMismatch {
                        class: base.to_string(),
                        expected: "[type, value] wrapper array",
                        path: path.to_string(),
                        snippet: util::snippet(&first),
                    }),
                    None => unreachable!("length checked above"),
                }
            }
            other => Err(Error::ShapeMismatch {
                class: base.to_string(),
                expected: "[type, value] wrapper array",
                path: path.to_string(),
                snippet: util::snippet(&other),
            }),
        },
        TypeInclude::ExternalProperty => {
            if external_id.is_some() {
                return Ok((external_id, value));
            }
            // no parent slot (root, array element, map value): the id is
            // inlined into the object, mirroring the encode-side degrade
            match value {
                Value::Object(mut map) => {
                    let id = match map.remove(&info.property) {
                        Some(Value::String(s)) => Some(s),
                        Some(_) | None => None,
                    };
                    Ok((id, Value::Object(map)))
                }
                other => Ok((None, other)),
            }
        }
    }
}

/// Discriminator string to emit for a concrete class.
pub(crate) fn type_id_for(class: &str, info: &TypeInfo, subtypes: &[SubtypeEntry]) -> String {
    if let Some(resolver) = &info.resolver {
        if let Some(id) = (resolver.to_id)(class) {
            return id;
        }
    }
    for sub in subtypes {
        if sub.class == class {
            if let Some(name) = &sub.name {
                return name.clone();
            }
        }
    }
    class.to_string()
}

/// Every discriminator the subtype registry would accept, for diagnostics.
fn known_discriminators(base: &str, subtypes: &[SubtypeEntry]) -> Vec<String> {
    let mut known: Vec<String> = subtypes
        .iter()
        .map(|s| s.name.clone().unwrap_or_else(|| s.class.clone()))
        .collect();
    known.push(base.to_string());
    known
}
