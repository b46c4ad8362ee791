// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Identity State
//!
//! Per-call bookkeeping for object identity. One [`CallState`] (parse) or
//! [`SerState`] (stringify) is created fresh per top-level call and
//! discarded at the end; neither is ever shared across calls.
//!
//! Scoped ids are plain strings, `scope + ":" + id`; the scope defaults
//! to the class name so id `1` of `User` never collides with id `1` of
//! `Order`.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::value::TypedValue;

/// Scoped-id key for the seen/emitted maps.
pub(crate) fn scoped(scope: &str, id: &str) -> String {
    format!("{}:{}", scope, id)
}

/// Id literal from a raw wire scalar; `None` for shapes that cannot be ids.
pub(crate) fn id_literal(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse-direction identity state for one top-level call.
#[derive(Debug, Default)]
pub(crate) struct CallState {
    /// Scoped id to constructed (or shell) instance.
    seen: HashMap<String, TypedValue>,
    /// Referenced-but-never-defined ids, aggregated for the end of call.
    unresolved: BTreeSet<String>,
}

impl CallState {
    pub fn new() -> Self {
        CallState::default()
    }

    /// Previously registered instance for a scoped id.
    pub fn lookup(&self, key: &str) -> Option<&TypedValue> {
        self.seen.get(key)
    }

    /// Register an instance under its scoped id.
    ///
    /// First registration wins; a duplicate id later in the document does
    /// not overwrite the instance already handed out to references.
    pub fn register(&mut self, key: String, instance: TypedValue) {
        self.unresolved.remove(&key);
        self.seen.entry(key).or_insert(instance);
    }

    /// Record a bare-id reference that nothing has defined yet.
    pub fn note_unresolved(&mut self, key: String) {
        if !self.seen.contains_key(&key) {
            self.unresolved.insert(key);
        }
    }

    /// End-of-call check: ids referenced but never defined.
    pub fn finish(&self, fail_on_unresolved: bool) -> Result<()> {
        if fail_on_unresolved && !self.unresolved.is_empty() {
            return Err(Error::UnresolvedObjectIds {
                ids: self.unresolved.iter().cloned().collect(),
            });
        }
        Ok(())
    }
}

/// Stringify-direction identity state for one top-level call.
#[derive(Debug, Default)]
pub(crate) struct SerState {
    /// Instance address to the id fragment already emitted for it.
    emitted: HashMap<usize, Value>,
    /// Next value per int-sequence scope.
    sequences: HashMap<String, i64>,
    /// Instances on the current encode stack, for self-reference checks.
    stack: Vec<usize>,
}

impl SerState {
    pub fn new() -> Self {
        SerState::default()
    }

    /// Id fragment already emitted for this instance, if any.
    pub fn emitted_id(&self, addr: usize) -> Option<&Value> {
        self.emitted.get(&addr)
    }

    /// Remember the id fragment emitted for an instance.
    pub fn mark_emitted(&mut self, addr: usize, id: Value) {
        self.emitted.insert(addr, id);
    }

    /// Next generated id for an int-sequence scope (starts at 1).
    pub fn next_sequence(&mut self, scope: &str) -> i64 {
        let next = self.sequences.entry(scope.to_string()).or_insert(1);
        let id = *next;
        *next += 1;
        id
    }

    /// True when the instance is already being encoded higher up the stack.
    pub fn on_stack(&self, addr: usize) -> bool {
        self.stack.contains(&addr)
    }

    pub fn push(&mut self, addr: usize) {
        self.stack.push(addr);
    }

    pub fn pop(&mut self, addr: usize) {
        if let Some(top) = self.stack.pop() {
            debug_assert_eq!(top, addr, "unbalanced encode stack");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scoped_keys_separate_scopes() {
        assert_eq!(scoped("User", "1"), "User:1");
        assert_ne!(scoped("User", "1"), scoped("Order", "1"));
    }

    #[test]
    fn id_literals_from_scalars_only() {
        assert_eq!(id_literal(&json!(7)).as_deref(), Some("7"));
        assert_eq!(id_literal(&json!("u-1")).as_deref(), Some("u-1"));
        assert_eq!(id_literal(&json!(true)).as_deref(), Some("true"));
        assert_eq!(id_literal(&json!([1])), None);
        assert_eq!(id_literal(&json!({"id": 1})), None);
        assert_eq!(id_literal(&Value::Null), None);
    }

    #[test]
    fn first_registration_wins() {
        let mut state = CallState::new();
        state.register("User:1".into(), TypedValue::Int(1));
        state.register("User:1".into(), TypedValue::Int(2));
        assert_eq!(state.lookup("User:1"), Some(&TypedValue::Int(1)));
    }

    #[test]
    fn registration_clears_unresolved() {
        let mut state = CallState::new();
        state.note_unresolved("User:9".into());
        assert!(state.finish(true).is_err());
        state.register("User:9".into(), TypedValue::Int(9));
        assert!(state.finish(true).is_ok());
    }

    #[test]
    fn unresolved_aggregates_sorted() {
        let mut state = CallState::new();
        state.note_unresolved("User:b".into());
        state.note_unresolved("User:a".into());
        state.note_unresolved("User:b".into());
        let err = state.finish(true).unwrap_err();
        match err {
            Error::UnresolvedObjectIds { ids } => assert_eq!(ids, ["User:a", "User:b"]),
            other => panic!("unexpected error: {other:?}"),
        }
        // disabled flag swallows the danglers
        assert!(state.finish(false).is_ok());
    }

    #[test]
    fn sequences_count_per_scope() {
        let mut state = SerState::new();
        assert_eq!(state.next_sequence("User"), 1);
        assert_eq!(state.next_sequence("User"), 2);
        assert_eq!(state.next_sequence("Order"), 1);
    }

    #[test]
    fn encode_stack_detects_reentry() {
        let mut state = SerState::new();
        assert!(!state.on_stack(42));
        state.push(42);
        assert!(state.on_stack(42));
        state.pop(42);
        assert!(!state.on_stack(42));
    }
}
