// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Schema Descriptors
//!
//! Immutable metadata describing how registered classes map to JSON. A
//! [`ClassDescriptor`] bundles property descriptors, creators, and
//! class-level options; descriptors are produced by the builders in
//! [`crate::schema::builder`], registered once, and shared behind `Arc`
//! for the lifetime of the registry.
//!
//! The type chain ([`TypeRef`]) is recursive: container kinds reference
//! their element chains, classes are referenced by registered name and
//! resolved lazily at transform time. This keeps descriptors cheap to
//! build and lets mutually-recursive classes register in any order.
//!
//! ## Type chain
//!
//! ```text
//! TypeRef
//! +-- Any | Bool | Int | Float | BigInt | String | Timestamp | Pattern
//! +-- Array(element)
//! +-- Map(key, value)
//! +-- Class(name) ------> ClassDescriptor (via registry)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::schema::naming::NamingStrategy;
use crate::value::{TypedObject, TypedValue};

// ============================================================================
// Closure aliases
// ============================================================================

/// Creator callable: positional arguments in, finished instance out.
pub type CreatorFn = Arc<dyn Fn(&[TypedValue]) -> Result<TypedValue> + Send + Sync>;

/// Virtual getter: computes the encoded value from the instance.
pub type GetterFn = Arc<dyn Fn(&TypedObject) -> TypedValue + Send + Sync>;

/// Setter: writes a decoded value into the instance.
pub type SetterFn = Arc<dyn Fn(&mut TypedObject, TypedValue) + Send + Sync>;

/// Parse-side hook: rewrites the raw JSON fragment before processing.
pub type ValueHookFn = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Stringify-side hook: rewrites the graph value before extraction.
pub type GraphHookFn = Arc<dyn Fn(TypedValue) -> Result<TypedValue> + Send + Sync>;

/// Custom discriminator mapping, both directions.
#[derive(Clone)]
pub struct TypeIdResolver {
    /// Discriminator string to registered class name.
    pub to_class: Arc<dyn Fn(&str) -> Option<String> + Send + Sync>,
    /// Registered class name to discriminator string.
    pub to_id: Arc<dyn Fn(&str) -> Option<String> + Send + Sync>,
}

impl std::fmt::Debug for TypeIdResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TypeIdResolver")
    }
}

// ============================================================================
// Type chain
// ============================================================================

/// Declared type of a property, parameter, or container element.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    /// No declaration: the raw value's own kind drives the transform.
    Any,
    /// Boolean primitive.
    Bool,
    /// Integral number primitive.
    Int,
    /// Floating-point number primitive.
    Float,
    /// Big-integer primitive (decimal string beyond `i64` range).
    BigInt,
    /// String primitive.
    String,
    /// Timestamp (epoch milliseconds or RFC 3339 on the wire).
    Timestamp,
    /// Regex pattern (source string on the wire).
    Pattern,
    /// Ordered sequence of elements.
    Array(Arc<TypeRef>),
    /// String-keyed map of values (`Int` keys are parsed from strings).
    Map(Arc<TypeRef>, Arc<TypeRef>),
    /// Instance of a registered class.
    Class(String),
}

impl TypeRef {
    /// Array of `element`.
    pub fn array(element: TypeRef) -> TypeRef {
        TypeRef::Array(Arc::new(element))
    }

    /// Map from `key` to `value`.
    pub fn map(key: TypeRef, value: TypeRef) -> TypeRef {
        TypeRef::Map(Arc::new(key), Arc::new(value))
    }

    /// Instance of the registered class `name`.
    pub fn class(name: impl Into<String>) -> TypeRef {
        TypeRef::Class(name.into())
    }

    /// True for the scalar kinds subject to coercion and null defaulting.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeRef::Bool | TypeRef::Int | TypeRef::Float | TypeRef::BigInt | TypeRef::String
        )
    }

    /// Zero value of a primitive kind (`false`, `0`, `0.0`, `0`, `""`).
    pub(crate) fn zero_value(&self) -> Option<TypedValue> {
        match self {
            TypeRef::Bool => Some(TypedValue::Bool(false)),
            TypeRef::Int => Some(TypedValue::Int(0)),
            TypeRef::Float => Some(TypedValue::Float(0.0)),
            TypeRef::BigInt => Some(TypedValue::BigInt(0)),
            TypeRef::String => Some(TypedValue::String(String::new())),
            _ => None,
        }
    }

    /// Kind name for diagnostics.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            TypeRef::Any => "any",
            TypeRef::Bool => "boolean",
            TypeRef::Int => "integer",
            TypeRef::Float => "number",
            TypeRef::BigInt => "bigint",
            TypeRef::String => "string",
            TypeRef::Timestamp => "timestamp",
            TypeRef::Pattern => "pattern",
            TypeRef::Array(_) => "array",
            TypeRef::Map(_, _) => "map",
            TypeRef::Class(_) => "object",
        }
    }
}

// ============================================================================
// Polymorphism
// ============================================================================

/// Where the polymorphic discriminator lives on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeInclude {
    /// Extra key inside the object (removed before property processing).
    Property,
    /// Single-key wrapper object: `{"Dog": {...}}`.
    WrapperObject,
    /// Two-element wrapper array: `["Dog", {...}]`.
    WrapperArray,
    /// Key on the parent object, sibling of the value.
    ExternalProperty,
}

/// Polymorphic typing declaration for a base class or property overlay.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// Discriminator placement strategy.
    pub include: TypeInclude,
    /// Discriminator key (inline and external placements).
    pub property: String,
    /// Custom discriminator mapping, tried before the subtype registry.
    pub resolver: Option<TypeIdResolver>,
}

impl TypeInfo {
    /// Discriminator under the conventional `@type` key.
    pub fn new(include: TypeInclude) -> Self {
        TypeInfo {
            include,
            property: "@type".into(),
            resolver: None,
        }
    }

    /// Use a custom discriminator key.
    #[must_use]
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = property.into();
        self
    }

    /// Attach a custom discriminator mapping.
    #[must_use]
    pub fn with_resolver(mut self, resolver: TypeIdResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }
}

/// One registered subtype of a polymorphic base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtypeEntry {
    /// Registered class name of the subtype.
    pub class: String,
    /// Explicit discriminator; the class name matches when absent.
    pub name: Option<String>,
}

// ============================================================================
// Object identity
// ============================================================================

/// How object ids are produced during stringification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenerator {
    /// The id is one of the object's own properties.
    Property,
    /// Sequential integers generated per scope, injected on the wire.
    IntSequence,
}

/// Object identity declaration for cycle/sharing reconstruction.
#[derive(Debug, Clone)]
pub struct IdentityInfo {
    /// Id production strategy.
    pub generator: IdGenerator,
    /// Id property name on the wire (and on the instance for `Property`).
    pub property: String,
    /// Scope namespace; the class name when absent.
    pub scope: Option<String>,
    /// Emit the bare id even on first encounter.
    pub always_as_id: bool,
}

impl IdentityInfo {
    /// Property-backed identity under `property`.
    pub fn property(property: impl Into<String>) -> Self {
        IdentityInfo {
            generator: IdGenerator::Property,
            property: property.into(),
            scope: None,
            always_as_id: false,
        }
    }

    /// Generated integer identity injected under `property`.
    pub fn int_sequence(property: impl Into<String>) -> Self {
        IdentityInfo {
            generator: IdGenerator::IntSequence,
            property: property.into(),
            scope: None,
            always_as_id: false,
        }
    }

    /// Override the scope namespace.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Always emit references as bare ids.
    #[must_use]
    pub fn always_as_id(mut self) -> Self {
        self.always_as_id = true;
        self
    }
}

/// Property-scoped type metadata, applied to the property value (or the
/// elements of a container property) for exactly one nesting level.
#[derive(Debug, Clone, Default)]
pub struct TypeMetaOverlay {
    pub type_info: Option<TypeInfo>,
    pub subtypes: Vec<SubtypeEntry>,
    pub identity: Option<IdentityInfo>,
}

// ============================================================================
// Property policies
// ============================================================================

/// Which transform directions a property participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    /// Encoded and decoded (default).
    #[default]
    ReadWrite,
    /// Encoded only; its wire key is consumed silently on decode.
    ReadOnly,
    /// Decoded only; never encoded.
    WriteOnly,
}

/// When a property is written during stringification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Include {
    /// Always written, nulls included (default).
    #[default]
    Always,
    /// Skipped when null.
    NonNull,
    /// Skipped when null, empty string, empty container, empty object.
    NonEmpty,
    /// Skipped when null or the zero value of its scalar kind.
    NonDefault,
}

/// What decode does with an explicit null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nulls {
    /// Assign the null (default).
    #[default]
    Set,
    /// Elide the entry (array element, map entry, or field).
    Skip,
    /// Reject the document.
    Fail,
}

/// Unwrapping affixes: child keys are inlined into the parent as
/// `prefix + key + suffix`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unwrap {
    pub prefix: String,
    pub suffix: String,
}

/// Injection binding: the value comes from the call context, not the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inject {
    /// Key into the context's injectable-values map.
    pub key: String,
    /// When true, a wire value (if present) wins over the injected one.
    pub use_input: bool,
}

// ============================================================================
// Property descriptor
// ============================================================================

/// Declarative metadata for one property of a class.
#[derive(Clone)]
pub struct PropertyDescriptor {
    /// Canonical name (instance field name).
    pub name: String,
    /// Explicit wire name; exempt from the class naming strategy.
    pub wire_name: Option<String>,
    /// Accepted decode-side alternate keys.
    pub aliases: Vec<String>,
    /// Declared type chain.
    pub value_type: TypeRef,
    /// Reject documents where the property is absent.
    pub required: bool,
    /// Direction filter.
    pub access: Access,
    /// Excluded from both directions.
    pub ignored: bool,
    /// Pre-serialized fragment: spliced verbatim on encode, re-stringified
    /// into the field on decode.
    pub raw: bool,
    /// Views the property belongs to (empty = undeclared).
    pub views: Vec<String>,
    /// Inline the nested object's keys into the parent.
    pub unwrap: Option<Unwrap>,
    /// Context group the descriptor belongs to (None = default group).
    pub group: Option<String>,
    /// Encode inclusion override.
    pub include: Option<Include>,
    /// Decode policy for an explicit null value.
    pub nulls: Option<Nulls>,
    /// Decode policy for nulls one level inside container values.
    pub content_nulls: Option<Nulls>,
    /// Context-injected value binding.
    pub inject: Option<Inject>,
    /// Forward side of a parent/child link; value is the link name.
    pub managed_ref: Option<String>,
    /// Back side of a parent/child link; value is the link name.
    pub back_ref: Option<String>,
    /// Computes the encoded value instead of reading the field.
    pub getter: Option<GetterFn>,
    /// Writes the decoded value instead of a plain field insert.
    pub setter: Option<SetterFn>,
    /// Property-level raw-fragment rewrite before decode recursion.
    pub deserialize_with: Option<ValueHookFn>,
    /// Property-level graph rewrite before encode recursion.
    pub serialize_with: Option<GraphHookFn>,
    /// One-level polymorphism/identity overlay for the value or elements.
    pub type_meta: Option<Arc<TypeMetaOverlay>>,
    /// Encode the whole instance as this property's value.
    pub value_provider: bool,
    /// Map-typed property whose entries are inlined on encode.
    pub any_getter: bool,
    /// Map-typed property that absorbs unknown keys on decode.
    pub any_setter: bool,
}

impl PropertyDescriptor {
    /// Wire name on the wire for `strategy` (explicit override wins).
    pub(crate) fn wire_name_for(&self, strategy: Option<NamingStrategy>) -> String {
        match (&self.wire_name, strategy) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(s)) => s.translate(&self.name),
            (None, None) => self.name.clone(),
        }
    }
}

impl std::fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("wire_name", &self.wire_name)
            .field("type", &self.value_type)
            .field("required", &self.required)
            .field("access", &self.access)
            .field("views", &self.views)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Creators
// ============================================================================

/// How creator arguments are assembled from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatorMode {
    /// One positional argument per declared parameter.
    Standard,
    /// The whole working value as a single argument.
    Delegating,
    /// The filtered property bag as a single map argument.
    PropertiesObject,
}

/// Declarative metadata for one creator parameter.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    /// Parameter name (last-resort wire match).
    pub name: String,
    /// Explicit wire name, tried first.
    pub wire_name: Option<String>,
    /// Alternate keys, tried in order.
    pub aliases: Vec<String>,
    /// Declared type chain for the argument value.
    pub value_type: TypeRef,
    /// Reject documents where the argument cannot be resolved.
    pub required: bool,
    /// Argument position receives null without consuming input.
    pub ignored: bool,
    /// Argument comes from the context's injectable values.
    pub inject: Option<Inject>,
}

/// A registered construction routine for a class.
#[derive(Clone)]
pub struct CreatorDescriptor {
    /// Selector name; the empty string is the default creator.
    pub name: String,
    /// Argument assembly mode.
    pub mode: CreatorMode,
    /// Declared parameters, in positional order (Standard mode).
    pub params: Vec<ParamDescriptor>,
    /// The callable.
    pub invoke: CreatorFn,
}

impl std::fmt::Debug for CreatorDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreatorDescriptor")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("params", &self.params.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Class-level options
// ============================================================================

/// Class-wide settings; one bundle per context group.
#[derive(Clone, Default)]
pub struct ClassOptions {
    /// Wrapper key for root wrapping/unwrapping (class name when absent).
    pub root_name: Option<String>,
    /// Wire-name translation for all non-overridden properties.
    pub naming: Option<NamingStrategy>,
    /// Polymorphic typing of this class as a base.
    pub type_info: Option<TypeInfo>,
    /// Registered subtypes of this base.
    pub subtypes: Vec<SubtypeEntry>,
    /// Object identity declaration.
    pub identity: Option<IdentityInfo>,
    /// Default encode inclusion for all properties.
    pub include: Option<Include>,
    /// Class override of the unknown-properties feature flag.
    pub ignore_unknown: Option<bool>,
    /// Property names excluded from both directions.
    pub ignored: Vec<String>,
    /// Ignored names stay decodable (encode-only ignore).
    pub allow_setters: bool,
    /// Explicit encode ordering; listed names first, rest in declaration order.
    pub property_order: Vec<String>,
    /// Alphabetic encode ordering for names not listed explicitly.
    pub alphabetic: bool,
    /// Class-level raw-fragment rewrite before decode.
    pub deserialize_hook: Option<ValueHookFn>,
    /// Class-level graph rewrite before encode.
    pub serialize_hook: Option<GraphHookFn>,
}

impl ClassOptions {
    /// Overlay `other` onto `self`: scalars last-write-wins, lists append.
    pub(crate) fn merge_from(&mut self, other: &ClassOptions) {
        if other.root_name.is_some() {
            self.root_name = other.root_name.clone();
        }
        if other.naming.is_some() {
            self.naming = other.naming;
        }
        if other.type_info.is_some() {
            self.type_info = other.type_info.clone();
        }
        if !other.subtypes.is_empty() {
            for sub in &other.subtypes {
                if !self.subtypes.iter().any(|s| s.class == sub.class) {
                    self.subtypes.push(sub.clone());
                }
            }
        }
        if other.identity.is_some() {
            self.identity = other.identity.clone();
        }
        if other.include.is_some() {
            self.include = other.include;
        }
        if other.ignore_unknown.is_some() {
            self.ignore_unknown = other.ignore_unknown;
        }
        if !other.ignored.is_empty() {
            for name in &other.ignored {
                if !self.ignored.contains(name) {
                    self.ignored.push(name.clone());
                }
            }
            self.allow_setters = other.allow_setters;
        }
        if !other.property_order.is_empty() || other.alphabetic {
            self.property_order = other.property_order.clone();
            self.alphabetic = other.alphabetic;
        }
        if other.deserialize_hook.is_some() {
            self.deserialize_hook = other.deserialize_hook.clone();
        }
        if other.serialize_hook.is_some() {
            self.serialize_hook = other.serialize_hook.clone();
        }
    }
}

impl std::fmt::Debug for ClassOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassOptions")
            .field("root_name", &self.root_name)
            .field("naming", &self.naming)
            .field("type_info", &self.type_info)
            .field("subtypes", &self.subtypes)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Class descriptor
// ============================================================================

/// Immutable schema of one registered class.
#[derive(Clone)]
pub struct ClassDescriptor {
    /// Registered name; the registry key.
    pub name: String,
    /// Parent class name; properties and options are inherited.
    pub extends: Option<String>,
    /// Option bundles: the default-group bundle plus per-group overlays.
    pub options: Vec<(Option<String>, ClassOptions)>,
    /// Declared properties, in declaration order (may repeat a canonical
    /// name across different context groups).
    pub properties: Vec<PropertyDescriptor>,
    /// Creators keyed by selector name (`""` = default).
    pub creators: HashMap<String, CreatorDescriptor>,
}

impl ClassDescriptor {
    /// The default-group option bundle, if declared.
    pub(crate) fn default_options(&self) -> Option<&ClassOptions> {
        self.options
            .iter()
            .find(|(g, _)| g.is_none())
            .map(|(_, o)| o)
    }
}

impl std::fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("extends", &self.extends)
            .field("properties", &self.properties.len())
            .field("creators", &self.creators.len())
            .finish_non_exhaustive()
    }
}
