// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test/bench code readability over pedantic
#![allow(clippy::doc_markdown)] // Test documentation
#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::items_after_statements)] // Test helpers
#![allow(clippy::too_many_lines)] // Example/test code
#![allow(clippy::similar_names)] // Test variable naming
#![allow(clippy::needless_pass_by_value)] // Test functions
#![allow(clippy::must_use_candidate)] // Test functions

//! Polymorphic decode/encode across the four discriminator placements
//!
//! A base class declares where its discriminator lives; subtypes extend
//! it and inherit the declaration. Wire documents route to concrete
//! classes on the way in and carry the discriminator back on the way out.

use std::sync::Arc;

use jbind::{
    ClassBuilder, Context, DeserializationFeature, Error, ObjectMapper, PropertyBuilder,
    SubtypeEntry, TypeIdResolver, TypeInclude, TypeInfo, TypeMetaOverlay, TypeRef, TypedObject,
};
use serde_json::json;

/// `Animal` base with `Dog`/`Cat` subtypes under the given placement.
fn animal_mapper(info: TypeInfo) -> ObjectMapper {
    let mapper = ObjectMapper::new();
    let registry = mapper.registry();
    registry
        .register(
            ClassBuilder::new("Animal")
                .type_info(info)
                .subtype_named("Dog", "dog")
                .subtype_named("Cat", "cat")
                .string_property("name")
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .register(
            ClassBuilder::new("Dog")
                .extends("Animal")
                .int_property("barkDb")
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .register(
            ClassBuilder::new("Cat")
                .extends("Animal")
                .bool_property("indoor")
                .build()
                .unwrap(),
        )
        .unwrap();
    mapper
}

fn animals() -> Context {
    Context::new().with_root_type(TypeRef::array(TypeRef::class("Animal")))
}

#[test]
fn inline_discriminators_route_and_round_trip() {
    let mapper = animal_mapper(TypeInfo::new(TypeInclude::Property));
    let doc = json!([
        {"@type": "dog", "name": "Rex", "barkDb": 90},
        {"@type": "cat", "name": "Maru", "indoor": true},
    ]);

    let parsed = mapper.from_value_with(doc.clone(), animals()).unwrap();
    let pets = parsed.as_array().unwrap();
    {
        let dog = pets[0].as_object().unwrap().borrow();
        assert_eq!(dog.class(), "Dog");
        // inherited base property and own property side by side
        assert_eq!(dog.get_str("name"), Some("Rex"));
        assert_eq!(dog.get_i64("barkDb"), Some(90));
        let cat = pets[1].as_object().unwrap().borrow();
        assert_eq!(cat.class(), "Cat");
        assert_eq!(cat.get("indoor").and_then(jbind::TypedValue::as_bool), Some(true));
    }

    assert_eq!(mapper.to_value(&parsed).unwrap(), doc);
}

#[test]
fn discriminator_leads_the_encoded_object() {
    let mapper = animal_mapper(TypeInfo::new(TypeInclude::Property));
    let dog = TypedObject::new("Dog")
        .with("name", "Rex")
        .with("barkDb", 90)
        .into_value();
    assert_eq!(
        mapper.stringify(&dog).unwrap(),
        r#"{"@type":"dog","name":"Rex","barkDb":90}"#
    );
}

#[test]
fn wrapper_object_round_trip() {
    let mapper = animal_mapper(TypeInfo::new(TypeInclude::WrapperObject));
    let doc = json!([{"dog": {"name": "Rex", "barkDb": 90}}]);

    let parsed = mapper.from_value_with(doc.clone(), animals()).unwrap();
    assert_eq!(
        parsed.as_array().unwrap()[0]
            .as_object()
            .unwrap()
            .borrow()
            .class(),
        "Dog"
    );
    assert_eq!(mapper.to_value(&parsed).unwrap(), doc);
}

#[test]
fn wrapper_array_round_trip() {
    let mapper = animal_mapper(TypeInfo::new(TypeInclude::WrapperArray));
    let doc = json!([["cat", {"name": "Maru", "indoor": false}]]);

    let parsed = mapper.from_value_with(doc.clone(), animals()).unwrap();
    assert_eq!(
        parsed.as_array().unwrap()[0]
            .as_object()
            .unwrap()
            .borrow()
            .class(),
        "Cat"
    );
    assert_eq!(mapper.to_value(&parsed).unwrap(), doc);
}

#[test]
fn external_discriminator_rides_the_parent() {
    let mapper = animal_mapper(
        TypeInfo::new(TypeInclude::ExternalProperty).with_property("petType"),
    );
    mapper
        .registry()
        .register(
            ClassBuilder::new("Owner")
                .string_property("owner")
                .property(PropertyBuilder::new("pet", TypeRef::class("Animal")))
                .build()
                .unwrap(),
        )
        .unwrap();

    let doc = json!({"owner": "Ada", "petType": "dog", "pet": {"name": "Rex", "barkDb": 90}});
    let parsed = mapper
        .from_value_with(doc.clone(), Context::new().with_root_type(TypeRef::class("Owner")))
        .unwrap();
    {
        let owner = parsed.as_object().unwrap().borrow();
        let pet = owner.get("pet").unwrap().as_object().unwrap().borrow();
        assert_eq!(pet.class(), "Dog");
        assert_eq!(pet.get_i64("barkDb"), Some(90));
        // the discriminator is call plumbing, not a property
        assert!(!owner.has("petType"));
    }

    assert_eq!(mapper.to_value(&parsed).unwrap(), doc);
}

#[test]
fn external_discriminator_inlines_without_a_parent_slot() {
    let mapper = animal_mapper(
        TypeInfo::new(TypeInclude::ExternalProperty).with_property("petType"),
    );

    // no parent object to host the sibling key, so it rides inside
    let dog = TypedObject::new("Dog")
        .with("name", "Rex")
        .with("barkDb", 90)
        .into_value();
    let wire = mapper.to_value(&dog).unwrap();
    assert_eq!(
        wire,
        json!({"petType": "dog", "name": "Rex", "barkDb": 90})
    );

    // and the inlined form decodes back to the concrete class
    let reparsed = mapper
        .from_value_with(wire, Context::new().with_root_type(TypeRef::class("Animal")))
        .unwrap();
    assert_eq!(reparsed.as_object().unwrap().borrow().class(), "Dog");
}

#[test]
fn unknown_discriminators_fail_with_the_known_list() {
    let mapper = animal_mapper(TypeInfo::new(TypeInclude::Property));
    let err = mapper
        .from_value_with(json!([{"@type": "fish", "name": "Bob"}]), animals())
        .unwrap_err();
    match err {
        Error::InvalidSubtype {
            class,
            discriminator,
            known,
            path,
            ..
        } => {
            assert_eq!(class, "Animal");
            assert_eq!(discriminator, "fish");
            assert_eq!(known, ["dog", "cat", "Animal"]);
            assert_eq!(path, "$[0]");
        }
        other => panic!("expected InvalidSubtype, got {other:?}"),
    }

    // relaxed mode falls back to the base class
    let parsed = mapper
        .from_value_with(
            json!([{"@type": "fish", "name": "Bob"}]),
            animals().disable(DeserializationFeature::FailOnInvalidSubtype),
        )
        .unwrap();
    assert_eq!(
        parsed.as_array().unwrap()[0]
            .as_object()
            .unwrap()
            .borrow()
            .class(),
        "Animal"
    );
}

#[test]
fn missing_discriminators_fail_or_fall_back() {
    let mapper = animal_mapper(TypeInfo::new(TypeInclude::Property));
    let err = mapper
        .from_value_with(json!([{"name": "Bob"}]), animals())
        .unwrap_err();
    assert!(matches!(err, Error::MissingTypeId { .. }));

    let parsed = mapper
        .from_value_with(
            json!([{"name": "Bob"}]),
            animals().disable(DeserializationFeature::FailOnMissingTypeId),
        )
        .unwrap();
    assert_eq!(
        parsed.as_array().unwrap()[0]
            .as_object()
            .unwrap()
            .borrow()
            .class(),
        "Animal"
    );
}

#[test]
fn custom_resolver_overrides_the_subtype_registry() {
    let resolver = TypeIdResolver {
        to_class: Arc::new(|id| (id == "D").then(|| "Dog".to_string())),
        to_id: Arc::new(|class| (class == "Dog").then(|| "D".to_string())),
    };
    let mapper = animal_mapper(TypeInfo::new(TypeInclude::Property).with_resolver(resolver));

    let doc = json!([{"@type": "D", "name": "Rex", "barkDb": 90}]);
    let parsed = mapper.from_value_with(doc.clone(), animals()).unwrap();
    assert_eq!(
        parsed.as_array().unwrap()[0]
            .as_object()
            .unwrap()
            .borrow()
            .class(),
        "Dog"
    );
    assert_eq!(mapper.to_value(&parsed).unwrap(), doc);
}

#[test]
fn property_overlays_scope_polymorphism_to_one_edge() {
    let mapper = ObjectMapper::new();
    let registry = mapper.registry();
    // the base class itself declares nothing polymorphic
    registry
        .register(
            ClassBuilder::new("Animal")
                .string_property("name")
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .register(
            ClassBuilder::new("Dog")
                .extends("Animal")
                .int_property("barkDb")
                .build()
                .unwrap(),
        )
        .unwrap();
    let overlay = TypeMetaOverlay {
        type_info: Some(TypeInfo::new(TypeInclude::Property)),
        subtypes: vec![SubtypeEntry {
            class: "Dog".into(),
            name: Some("dog".into()),
        }],
        identity: None,
    };
    registry
        .register(
            ClassBuilder::new("Zoo")
                .property(
                    PropertyBuilder::new("star", TypeRef::class("Animal")).meta(overlay.clone()),
                )
                .property(
                    PropertyBuilder::new(
                        "residents",
                        TypeRef::array(TypeRef::class("Animal")),
                    )
                    .meta(overlay),
                )
                .build()
                .unwrap(),
        )
        .unwrap();

    let doc = json!({
        "star": {"@type": "dog", "name": "Rex", "barkDb": 90},
        "residents": [{"@type": "dog", "name": "Lab", "barkDb": 70}],
    });
    let parsed = mapper
        .from_value_with(doc.clone(), Context::new().with_root_type(TypeRef::class("Zoo")))
        .unwrap();
    {
        let zoo = parsed.as_object().unwrap().borrow();
        let star = zoo.get("star").unwrap().as_object().unwrap().borrow();
        assert_eq!(star.class(), "Dog");
        let residents = zoo.get("residents").unwrap().as_array().unwrap().to_vec();
        assert_eq!(
            residents[0].as_object().unwrap().borrow().class(),
            "Dog"
        );
    }
    assert_eq!(mapper.to_value(&parsed).unwrap(), doc);

    // outside the overlaid edge the same class stays monomorphic
    let plain = mapper
        .from_value_with(
            json!({"name": "Any"}),
            Context::new().with_root_type(TypeRef::class("Animal")),
        )
        .unwrap();
    assert_eq!(plain.as_object().unwrap().borrow().class(), "Animal");
}
