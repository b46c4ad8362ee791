// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Small helpers shared across the engine: error snippets, JSON kind names,
//! dotted diagnostic paths.

use indexmap::IndexMap;
use serde_json::Value;

/// Longest input fragment quoted in an error message.
const SNIPPET_MAX: usize = 140;

/// Compact re-serialization of `value`, truncated for error messages.
pub(crate) fn snippet(value: &Value) -> String {
    let mut s = value.to_string();
    if s.len() > SNIPPET_MAX {
        // Truncate on a char boundary; errors are for humans, not parsers.
        let mut cut = SNIPPET_MAX;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push_str("...");
    }
    s
}

/// Compact description of an object's keys for diagnostics.
pub(crate) fn keys_hint(bag: &IndexMap<String, Value>) -> String {
    let joined = bag.keys().cloned().collect::<Vec<_>>().join(", ");
    let hint = format!("object with keys [{}]", joined);
    if hint.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX - 3;
        while !hint.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &hint[..cut])
    } else {
        hint
    }
}

/// Runtime kind of a JSON value, for mismatch diagnostics.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Append a property segment to a dotted path (`$.a.b`).
pub(crate) fn path_field(path: &str, name: &str) -> String {
    format!("{}.{}", path, name)
}

/// Append an array index segment (`$.a[3]`).
pub(crate) fn path_index(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}
