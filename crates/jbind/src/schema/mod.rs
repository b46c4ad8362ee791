// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Schema Layer
//!
//! Declarative class metadata and its registry:
//!
//! - [`descriptor`] - immutable descriptor types ([`ClassDescriptor`],
//!   [`PropertyDescriptor`], [`TypeRef`], creators, policies)
//! - [`builder`] - fluent builders with build-time validation
//! - [`registry`] - registration, inheritance flattening, resolved cache
//! - [`naming`] - wire-name translation strategies

pub mod builder;
pub mod descriptor;
pub mod naming;
pub mod registry;

pub use builder::{ClassBuilder, CreatorBuilder, ParamBuilder, PropertyBuilder};
pub use descriptor::{
    Access, ClassDescriptor, ClassOptions, CreatorDescriptor, CreatorFn, CreatorMode, GetterFn,
    GraphHookFn, IdGenerator, IdentityInfo, Include, Inject, Nulls, ParamDescriptor,
    PropertyDescriptor, SetterFn, SubtypeEntry, TypeIdResolver, TypeInclude, TypeInfo,
    TypeMetaOverlay, TypeRef, Unwrap, ValueHookFn,
};
pub use naming::NamingStrategy;
pub use registry::SchemaRegistry;
