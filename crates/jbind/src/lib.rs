// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # jbind - Schema-Driven JSON Object Binding
//!
//! A bidirectional codec between JSON text and richly-typed in-memory
//! object graphs. Classes are described by declarative metadata instead
//! of derive macros: wire-name translation and aliasing, serialization
//! views, custom creators, polymorphic subtype resolution, object
//! identity with full cycle reconstruction, managed/back references,
//! context-injected values, and per-call null/coercion policy.
//!
//! ## Quick Start
//!
//! ```rust
//! use jbind::{ClassBuilder, Context, ObjectMapper, TypeRef};
//!
//! let mapper = ObjectMapper::new();
//! mapper.registry().register(
//!     ClassBuilder::new("User")
//!         .int_property("id")
//!         .string_property("name")
//!         .build()?,
//! )?;
//!
//! let user = mapper.parse_with(
//!     r#"{"id": 7, "name": "ada"}"#,
//!     Context::new().with_root_type(TypeRef::class("User")),
//! )?;
//! assert_eq!(user.as_object().unwrap().borrow().get_str("name"), Some("ada"));
//!
//! assert_eq!(mapper.stringify(&user)?, r#"{"id":7,"name":"ada"}"#);
//! # Ok::<(), jbind::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +----------------------------------------------------------------+
//! |                         ObjectMapper                           |
//! |     parse / stringify entry points, default Context layer      |
//! +----------------------------------------------------------------+
//! |                       Transform Engine                         |
//! |   Parser (decode pipeline)  |  Stringifier (encode pipeline)   |
//! |   creators | identity | polymorphism | references | injection  |
//! +----------------------------------------------------------------+
//! |                        Schema Registry                         |
//! |   ClassDescriptor -> ResolvedClass (inheritance flattening,    |
//! |   wire-name index, creator table, stable encode order)         |
//! +----------------------------------------------------------------+
//! |                          Value Model                           |
//! |   TypedValue / TypedObject (shared, mutable object graph)      |
//! +----------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ObjectMapper`] | Entry point: owns the registry and default context |
//! | [`ClassBuilder`] | Fluent, validated declaration of one class |
//! | [`Context`] | Per-call configuration (views, flags, injectables) |
//! | [`TypedValue`] | In-memory graph value, including shared objects |
//! | [`TypeRef`] | Declared type chain driving each transform node |
//! | [`Error`] | Fail-fast diagnostics with path and input snippet |
//!
//! ## Features
//!
//! - **Polymorphism**: four discriminator placements (inline property,
//!   wrapper object, wrapper array, external sibling property)
//! - **Identity**: scoped object ids reconstruct shared references and
//!   cycles, forward references included
//! - **Creators**: named constructor functions in standard, delegating,
//!   and properties-object modes
//! - **Views and groups**: per-property visibility with view inheritance
//!   and context-group metadata selection
//! - **`config-loaders`** (default): declarative [`Context`] files in JSON
//!
//! ## Modules Overview
//!
//! - [`schema`] - class metadata, builders, and the registry (start here)
//! - [`value`] - the typed value model produced and consumed by transforms
//! - [`context`] - layered per-call configuration
//! - [`features`] - parse/stringify feature flags and their defaults
//! - [`error`] - error variants and the crate-wide [`Result`]

/// Layered per-call configuration (views, flags, injectables, overrides).
pub mod context;
/// Error variants and the crate-wide `Result` alias.
pub mod error;
/// Parse/stringify feature flags and their defaults.
pub mod features;
/// Public mapper façade over the registry and the transform engine.
pub mod mapper;
/// Declarative class metadata, fluent builders, and the schema registry.
pub mod schema;
/// Typed value model: graph values and shared mutable objects.
pub mod value;

// The recursive transform core; reachable only through the mapper.
mod engine;
mod util;

/// Declarative `Context` files (JSON), behind the `config-loaders` feature.
#[cfg(feature = "config-loaders")]
mod loader;

pub use context::{Context, CustomDeserializer, CustomSerializer, DeserMatch, Feature, SerMatch};
pub use error::{Error, Result};
pub use features::{DeserializationFeature, SerializationFeature};
pub use mapper::ObjectMapper;
pub use schema::{
    Access, ClassBuilder, ClassDescriptor, CreatorBuilder, CreatorFn, CreatorMode, GetterFn,
    GraphHookFn, IdGenerator, IdentityInfo, Include, Inject, NamingStrategy, Nulls, ParamBuilder,
    PropertyBuilder, SchemaRegistry, SetterFn, SubtypeEntry, TypeIdResolver, TypeInclude, TypeInfo,
    TypeMetaOverlay, TypeRef, Unwrap, ValueHookFn,
};
pub use value::{ObjectRef, TypedObject, TypedValue};

/// jbind version string.
pub const VERSION: &str = "0.3.2";
