// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::unreadable_literal)] // Large test constants
#![allow(clippy::doc_markdown)] // Test documentation
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::items_after_statements)] // Test helpers
#![allow(clippy::too_many_lines)] // Example/test code
#![allow(clippy::similar_names)] // Test variable naming
#![allow(clippy::needless_pass_by_value)] // Test functions
#![allow(clippy::must_use_candidate)] // Test functions

//! End-to-end parse/stringify round trips through the public API
//!
//! Covers renaming, aliases, naming strategies, unwrapping, raw splices,
//! any-setter/any-getter, root-name wrapping, and the non-JSON scalar
//! kinds (timestamps, patterns, big integers).

use std::sync::Arc;

use jbind::{
    ClassBuilder, Context, DeserializationFeature, Error, Include, NamingStrategy, ObjectMapper,
    PropertyBuilder, SerializationFeature, TypeRef, TypedObject, TypedValue,
};
use serde_json::json;

fn root(class: &str) -> Context {
    Context::new().with_root_type(TypeRef::class(class))
}

#[test]
fn renamed_and_aliased_keys_resolve() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Person")
                .property(
                    PropertyBuilder::new("firstName", TypeRef::String)
                        .wire_name("first_name")
                        .alias("fn"),
                )
                .int_property("age")
                .build()
                .unwrap(),
        )
        .unwrap();

    let parsed = mapper
        .parse_with(r#"{"first_name":"Ada","age":36}"#, root("Person"))
        .unwrap();
    {
        let obj = parsed.as_object().unwrap().borrow();
        assert_eq!(obj.get_str("firstName"), Some("Ada"));
        assert_eq!(obj.get_i64("age"), Some(36));
    }

    // output always uses the wire name, never an alias
    let wire = mapper.to_value(&parsed).unwrap();
    assert_eq!(wire, json!({"first_name": "Ada", "age": 36}));

    let via_alias = mapper
        .parse_with(r#"{"fn":"Ada","age":36}"#, root("Person"))
        .unwrap();
    let obj = via_alias.as_object().unwrap().borrow();
    assert_eq!(obj.get_str("firstName"), Some("Ada"));
}

#[test]
fn naming_strategy_translates_undeclared_wire_names() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Person")
                .naming(NamingStrategy::SnakeCase)
                .string_property("firstName")
                // an explicit wire name beats the class strategy
                .property(PropertyBuilder::new("lastName", TypeRef::String).wire_name("surname"))
                .build()
                .unwrap(),
        )
        .unwrap();

    let parsed = mapper
        .parse_with(r#"{"first_name":"Ada","surname":"Lovelace"}"#, root("Person"))
        .unwrap();
    {
        let obj = parsed.as_object().unwrap().borrow();
        assert_eq!(obj.get_str("firstName"), Some("Ada"));
        assert_eq!(obj.get_str("lastName"), Some("Lovelace"));
    }

    let wire = mapper.to_value(&parsed).unwrap();
    assert_eq!(wire, json!({"first_name": "Ada", "surname": "Lovelace"}));
}

#[test]
fn unwrapped_child_flattens_into_the_parent() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Address")
                .string_property("street")
                .string_property("city")
                .build()
                .unwrap(),
        )
        .unwrap();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Person")
                .string_property("name")
                .property(PropertyBuilder::new("home", TypeRef::class("Address")).unwrapped())
                .build()
                .unwrap(),
        )
        .unwrap();

    let parsed = mapper
        .parse_with(
            r#"{"name":"Ada","street":"Mill Lane","city":"Leeds"}"#,
            root("Person"),
        )
        .unwrap();
    {
        let person = parsed.as_object().unwrap().borrow();
        let home = person.get("home").unwrap().as_object().unwrap().borrow();
        assert_eq!(home.class(), "Address");
        assert_eq!(home.get_str("street"), Some("Mill Lane"));
        assert_eq!(home.get_str("city"), Some("Leeds"));
    }

    let wire = mapper.to_value(&parsed).unwrap();
    assert_eq!(
        wire,
        json!({"name": "Ada", "street": "Mill Lane", "city": "Leeds"})
    );

    // a literal wire key still wins over affix gathering
    let nested = mapper
        .parse_with(
            r#"{"name":"Ada","home":{"street":"Mill Lane","city":"Leeds"}}"#,
            root("Person"),
        )
        .unwrap();
    let person = nested.as_object().unwrap().borrow();
    let home = person.get("home").unwrap().as_object().unwrap().borrow();
    assert_eq!(home.get_str("city"), Some("Leeds"));
}

#[test]
fn unwrap_affixes_keep_sibling_children_apart() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Address")
                .string_property("street")
                .string_property("city")
                .build()
                .unwrap(),
        )
        .unwrap();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Person")
                .string_property("name")
                .property(
                    PropertyBuilder::new("home", TypeRef::class("Address"))
                        .unwrapped_affixed("home_", ""),
                )
                .property(
                    PropertyBuilder::new("work", TypeRef::class("Address"))
                        .unwrapped_affixed("work_", ""),
                )
                .build()
                .unwrap(),
        )
        .unwrap();

    let doc = json!({
        "name": "Ada",
        "home_street": "Mill Lane",
        "home_city": "Leeds",
        "work_street": "Broad Street",
        "work_city": "London",
    });
    let parsed = mapper.from_value_with(doc.clone(), root("Person")).unwrap();
    {
        let person = parsed.as_object().unwrap().borrow();
        let home = person.get("home").unwrap().as_object().unwrap().borrow();
        let work = person.get("work").unwrap().as_object().unwrap().borrow();
        assert_eq!(home.get_str("city"), Some("Leeds"));
        assert_eq!(work.get_str("city"), Some("London"));
    }

    assert_eq!(mapper.to_value(&parsed).unwrap(), doc);
}

#[test]
fn raw_properties_splice_verbatim() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Event")
                .string_property("kind")
                .property(PropertyBuilder::new("payload", TypeRef::String).raw())
                .build()
                .unwrap(),
        )
        .unwrap();

    let parsed = mapper
        .parse_with(
            r#"{"kind":"created","payload":{"user":{"id":7},"tags":["a","b"]}}"#,
            root("Event"),
        )
        .unwrap();
    {
        let event = parsed.as_object().unwrap().borrow();
        // stored as the JSON text, not a decoded graph
        let text = event.get_str("payload").unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(text).unwrap(),
            json!({"user": {"id": 7}, "tags": ["a", "b"]})
        );
    }

    let wire = mapper.to_value(&parsed).unwrap();
    assert_eq!(
        wire,
        json!({"kind": "created", "payload": {"user": {"id": 7}, "tags": ["a", "b"]}})
    );
}

#[test]
fn any_setter_collects_and_any_getter_restores() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Bag")
                .int_property("known")
                .property(
                    PropertyBuilder::new("extras", TypeRef::map(TypeRef::String, TypeRef::Any))
                        .any_setter()
                        .any_getter(),
                )
                .build()
                .unwrap(),
        )
        .unwrap();

    let doc = json!({"known": 1, "color": "red", "weight": 12});
    let parsed = mapper.from_value_with(doc.clone(), root("Bag")).unwrap();
    {
        let bag = parsed.as_object().unwrap().borrow();
        let extras = bag.get("extras").unwrap().as_map().unwrap();
        assert_eq!(extras.len(), 2);
        assert_eq!(extras.get("color").and_then(TypedValue::as_str), Some("red"));
        assert_eq!(extras.get("weight").and_then(TypedValue::as_i64), Some(12));
    }

    assert_eq!(mapper.to_value(&parsed).unwrap(), doc);
}

#[test]
fn root_name_wrapping_round_trip() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Greeting")
                .root_name("greeting")
                .string_property("text")
                .build()
                .unwrap(),
        )
        .unwrap();

    let ctx = || {
        root("Greeting")
            .enable(DeserializationFeature::UnwrapRootValue)
            .enable(SerializationFeature::WrapRootValue)
    };

    let parsed = mapper
        .parse_with(r#"{"greeting":{"text":"hello"}}"#, ctx())
        .unwrap();
    {
        let obj = parsed.as_object().unwrap().borrow();
        assert_eq!(obj.get_str("text"), Some("hello"));
    }
    assert_eq!(
        mapper.to_value_with(&parsed, ctx()).unwrap(),
        json!({"greeting": {"text": "hello"}})
    );

    let err = mapper
        .parse_with(r#"{"salutation":{"text":"hello"}}"#, ctx())
        .unwrap_err();
    match err {
        Error::RootNameMismatch { expected, found, .. } => {
            assert_eq!(expected, "greeting");
            assert_eq!(found, "salutation");
        }
        other => panic!("expected RootNameMismatch, got {other:?}"),
    }
}

#[test]
fn timestamp_properties_round_trip() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Log")
                .property(PropertyBuilder::new("at", TypeRef::Timestamp))
                .build()
                .unwrap(),
        )
        .unwrap();

    // epoch milliseconds in, epoch milliseconds out by default
    let parsed = mapper
        .parse_with(r#"{"at":1500000000000}"#, root("Log"))
        .unwrap();
    assert_eq!(
        mapper.to_value(&parsed).unwrap(),
        json!({"at": 1500000000000i64})
    );

    // RFC 3339 out when the timestamp flag is turned off
    let iso = mapper
        .to_value_with(
            &parsed,
            Context::new().disable(SerializationFeature::WriteDatesAsTimestamps),
        )
        .unwrap();
    assert_eq!(iso, json!({"at": "2017-07-14T02:40:00.000Z"}));

    // RFC 3339 accepted on input
    let reparsed = mapper
        .parse_with(r#"{"at":"2017-07-14T02:40:00.000Z"}"#, root("Log"))
        .unwrap();
    assert_eq!(
        mapper.to_value(&reparsed).unwrap(),
        json!({"at": 1500000000000i64})
    );
}

#[test]
fn pattern_properties_conserve_the_source() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Rule")
                .property(PropertyBuilder::new("matcher", TypeRef::Pattern))
                .build()
                .unwrap(),
        )
        .unwrap();

    let parsed = mapper
        .parse_with(r#"{"matcher":"^a+$"}"#, root("Rule"))
        .unwrap();
    {
        let rule = parsed.as_object().unwrap().borrow();
        match rule.get("matcher").unwrap() {
            TypedValue::Pattern(re) => {
                assert_eq!(re.as_str(), "^a+$");
                assert!(re.is_match("aaa"));
            }
            other => panic!("expected a pattern, got {}", other.kind()),
        }
    }
    assert_eq!(mapper.to_value(&parsed).unwrap(), json!({"matcher": "^a+$"}));

    let err = mapper
        .parse_with(r#"{"matcher":"["}"#, root("Rule"))
        .unwrap_err();
    assert!(matches!(err, Error::MismatchedInput { .. }));
}

#[test]
fn bigint_properties_widen_beyond_i64() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Ledger")
                .property(PropertyBuilder::new("balance", TypeRef::BigInt))
                .build()
                .unwrap(),
        )
        .unwrap();

    // decimal strings are always accepted for big integers
    let big = mapper
        .parse_with(r#"{"balance":"170141183460469231731687303715884105727"}"#, root("Ledger"))
        .unwrap();
    {
        let ledger = big.as_object().unwrap().borrow();
        assert_eq!(
            ledger.get("balance").and_then(TypedValue::as_i128),
            Some(i128::MAX)
        );
    }
    // out of i64 range, so the wire form is a decimal string
    assert_eq!(
        mapper.to_value(&big).unwrap(),
        json!({"balance": "170141183460469231731687303715884105727"})
    );

    // within i64 range the wire form stays a plain number
    let small = mapper
        .parse_with(r#"{"balance":42}"#, root("Ledger"))
        .unwrap();
    assert_eq!(mapper.to_value(&small).unwrap(), json!({"balance": 42}));
}

#[test]
fn virtual_getters_write_computed_fields() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Person")
                .string_property("first")
                .string_property("last")
                .property(
                    PropertyBuilder::new("displayName", TypeRef::String).getter(Arc::new(
                        |o: &TypedObject| {
                            let first = o.get_str("first").unwrap_or("");
                            let last = o.get_str("last").unwrap_or("");
                            TypedValue::String(format!("{first} {last}"))
                        },
                    )),
                )
                .build()
                .unwrap(),
        )
        .unwrap();

    let parsed = mapper
        .parse_with(r#"{"first":"Ada","last":"Lovelace"}"#, root("Person"))
        .unwrap();
    assert_eq!(
        mapper.to_value(&parsed).unwrap(),
        json!({"first": "Ada", "last": "Lovelace", "displayName": "Ada Lovelace"})
    );

    // a wire value for the computed key is consumed without complaint
    let redundant = mapper
        .parse_with(
            r#"{"first":"Ada","last":"Lovelace","displayName":"ignored"}"#,
            root("Person"),
        )
        .unwrap();
    let person = redundant.as_object().unwrap().borrow();
    assert!(!person.has("displayName"));
}

#[test]
fn setter_hooks_intercept_assignment() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Tag")
                .property(
                    PropertyBuilder::new("label", TypeRef::String).setter(Arc::new(
                        |o: &mut TypedObject, v: TypedValue| {
                            let upper = v.as_str().map(str::to_uppercase).unwrap_or_default();
                            o.set("label", TypedValue::String(upper));
                        },
                    )),
                )
                .build()
                .unwrap(),
        )
        .unwrap();

    let parsed = mapper
        .parse_with(r#"{"label":"urgent"}"#, root("Tag"))
        .unwrap();
    let tag = parsed.as_object().unwrap().borrow();
    assert_eq!(tag.get_str("label"), Some("URGENT"));
}

#[test]
fn ignored_properties_never_cross_the_wire() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Account")
                .string_property("user")
                .property(PropertyBuilder::new("secret", TypeRef::String).ignored())
                .ignore_properties(["internal"])
                .string_property("internal")
                .build()
                .unwrap(),
        )
        .unwrap();

    // declared-but-ignored keys are consumed silently, not unknown
    let parsed = mapper
        .parse_with(
            r#"{"user":"ada","secret":"hunter2","internal":"x"}"#,
            root("Account"),
        )
        .unwrap();
    {
        let account = parsed.as_object().unwrap().borrow();
        assert_eq!(account.get_str("user"), Some("ada"));
        assert!(!account.has("secret"));
        assert!(!account.has("internal"));
    }

    let mut graph = TypedObject::new("Account");
    graph.set("user", TypedValue::String("ada".into()));
    graph.set("secret", TypedValue::String("hunter2".into()));
    graph.set("internal", TypedValue::String("x".into()));
    let wire = mapper.to_value(&graph.into_value()).unwrap();
    assert_eq!(wire, json!({"user": "ada"}));
}

#[test]
fn include_policies_and_explicit_order() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Profile")
                .property_order(["name", "bio", "score"])
                .property(PropertyBuilder::new("score", TypeRef::Int).include(Include::NonDefault))
                .property(PropertyBuilder::new("bio", TypeRef::String).include(Include::NonEmpty))
                .string_property("name")
                .build()
                .unwrap(),
        )
        .unwrap();

    let full = TypedObject::new("Profile")
        .with("name", "ada")
        .with("bio", "pioneer")
        .with("score", 10)
        .into_value();
    // explicit order wins over declaration order
    assert_eq!(
        mapper.stringify(&full).unwrap(),
        r#"{"name":"ada","bio":"pioneer","score":10}"#
    );

    let sparse = TypedObject::new("Profile")
        .with("name", "ada")
        .with("bio", "")
        .with("score", 0)
        .into_value();
    assert_eq!(mapper.stringify(&sparse).unwrap(), r#"{"name":"ada"}"#);
}

#[test]
fn alphabetic_order_sorts_wire_keys() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Triple")
                .alphabetic()
                .int_property("c")
                .int_property("a")
                .int_property("b")
                .build()
                .unwrap(),
        )
        .unwrap();

    let value = TypedObject::new("Triple")
        .with("c", 3)
        .with("a", 1)
        .with("b", 2)
        .into_value();
    assert_eq!(mapper.stringify(&value).unwrap(), r#"{"a":1,"b":2,"c":3}"#);
}

#[test]
fn arrays_and_maps_of_classes_round_trip() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Point")
                .int_property("x")
                .int_property("y")
                .build()
                .unwrap(),
        )
        .unwrap();

    let doc = json!([{"x": 1, "y": 2}, {"x": 3, "y": 4}]);
    let ctx = Context::new().with_root_type(TypeRef::array(TypeRef::class("Point")));
    let parsed = mapper.from_value_with(doc.clone(), ctx).unwrap();
    let points = parsed.as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(
        points[1].as_object().unwrap().borrow().get_i64("x"),
        Some(3)
    );
    assert_eq!(mapper.to_value(&parsed).unwrap(), doc);

    let keyed = json!({"origin": {"x": 0, "y": 0}});
    let ctx = Context::new().with_root_type(TypeRef::map(
        TypeRef::String,
        TypeRef::class("Point"),
    ));
    let parsed = mapper.from_value_with(keyed.clone(), ctx).unwrap();
    assert_eq!(mapper.to_value(&parsed).unwrap(), keyed);
}

#[test]
fn pretty_printing_is_only_a_formatting_change() {
    let mapper = ObjectMapper::new();
    mapper
        .registry()
        .register(
            ClassBuilder::new("Pair")
                .int_property("left")
                .int_property("right")
                .build()
                .unwrap(),
        )
        .unwrap();

    let value = TypedObject::new("Pair")
        .with("left", 1)
        .with("right", 2)
        .into_value();
    let pretty = mapper.stringify_pretty(&value, Context::new()).unwrap();
    assert!(pretty.contains('\n'));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&pretty).unwrap(),
        json!({"left": 1, "right": 2})
    );
}
