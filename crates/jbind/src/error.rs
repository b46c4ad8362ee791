// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Error Types
//!
//! All fallible jbind operations return [`Result`] with this module's
//! [`Error`]. Transforms are fail-fast: the first violation aborts the whole
//! call and no partial graph or partial text is returned.
//!
//! Most variants carry the offending class name, the dotted property path
//! from the root of the document (`items[2].owner.name`), and a truncated
//! snippet of the input fragment, so a failure deep inside a large document
//! can be located without re-running anything.
//!
//! Whether a given situation is an error at all is usually governed by a
//! feature flag: the same null can fail with [`Error::NullForPrimitive`],
//! decode to a zero value, or pass through untouched depending on the
//! [`DeserializationFeature`](crate::DeserializationFeature) set in effect.

/// Errors returned by jbind schema registration and transform operations.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Schema Errors
    // ========================================================================
    /// A type chain or input object names a class that is not registered.
    UnknownClass { class: String, path: String },
    /// Schema declaration rejected at build/registration time.
    InvalidSchema(String),
    /// A class declares more than one value-provider property.
    MultipleValueProviders { class: String },

    // ========================================================================
    // Input Errors
    // ========================================================================
    /// Input text is not valid JSON (or output serialization failed).
    Json(serde_json::Error),
    /// Context file could not be read.
    Io(std::io::Error),
    /// Input kind does not match the declared type and no coercion applies.
    MismatchedInput {
        expected: &'static str,
        found: String,
        path: String,
        snippet: String,
    },
    /// Wrapper-shaped input does not match the declared wrapper strategy.
    ShapeMismatch {
        class: String,
        expected: &'static str,
        path: String,
        snippet: String,
    },
    /// Root wrapper key does not match the expected root name.
    RootNameMismatch {
        class: String,
        expected: String,
        found: String,
    },

    // ========================================================================
    // Property Errors
    // ========================================================================
    /// A property marked required is absent from the input.
    RequiredPropertyMissing {
        class: String,
        property: String,
        path: String,
        snippet: String,
    },
    /// Input keys match no declared property (aggregated per object).
    UnknownProperties {
        class: String,
        properties: Vec<String>,
        path: String,
        snippet: String,
    },
    /// Null (or absent) value for a primitive-typed property.
    NullForPrimitive {
        class: String,
        property: String,
        path: String,
    },
    /// Null rejected by a FAIL nulls policy; `path` names the index/key.
    NullNotAllowed { class: String, path: String },

    // ========================================================================
    // Creator Errors
    // ========================================================================
    /// Creator parameter could not be resolved from the input.
    MissingCreatorProperty {
        class: String,
        parameter: String,
        path: String,
    },
    /// Creator parameter resolved to null.
    NullCreatorProperty {
        class: String,
        parameter: String,
        path: String,
    },
    /// Property flagged for injection has no value under its key.
    MissingInjectable { key: String, path: String },

    // ========================================================================
    // Polymorphism Errors
    // ========================================================================
    /// Discriminator value matches no registered subtype.
    InvalidSubtype {
        class: String,
        discriminator: String,
        known: Vec<String>,
        path: String,
        snippet: String,
    },
    /// Polymorphic target but no discriminator present in the input.
    MissingTypeId {
        class: String,
        path: String,
        snippet: String,
    },

    // ========================================================================
    // Identity Errors
    // ========================================================================
    /// Identity references left dangling at the end of the call.
    UnresolvedObjectIds { ids: Vec<String> },
    /// An already-seen id resolves to an instance of an incompatible class.
    IdentityTypeConflict {
        id: String,
        expected: String,
        found: String,
        path: String,
    },

    // ========================================================================
    // Other Errors
    // ========================================================================
    /// Object graph references itself without identity metadata.
    SelfReference { class: String, path: String },
    /// A custom creator, hook, or (de)serializer reported a failure.
    Transform(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // Schema
            Error::UnknownClass { class, path } => {
                write!(f, "Unknown class '{}' at {}", class, path)
            }
            Error::InvalidSchema(msg) => write!(f, "Invalid schema: {}", msg),
            Error::MultipleValueProviders { class } => {
                write!(f, "Class '{}' declares more than one value provider", class)
            }
            // Input
            Error::Json(e) => write!(f, "JSON error: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::MismatchedInput {
                expected,
                found,
                path,
                snippet,
            } => write!(
                f,
                "Expected {} but found {} at {} (input: {})",
                expected, found, path, snippet
            ),
            Error::ShapeMismatch {
                class,
                expected,
                path,
                snippet,
            } => write!(
                f,
                "Class '{}' expects {} at {} (input: {})",
                class, expected, path, snippet
            ),
            Error::RootNameMismatch {
                class,
                expected,
                found,
            } => write!(
                f,
                "Root name mismatch for class '{}': expected '{}', found {}",
                class, expected, found
            ),
            // Property
            Error::RequiredPropertyMissing {
                class,
                property,
                path,
                snippet,
            } => write!(
                f,
                "Required property '{}' of class '{}' missing at {} (input: {})",
                property, class, path, snippet
            ),
            Error::UnknownProperties {
                class,
                properties,
                path,
                snippet,
            } => write!(
                f,
                "Unknown properties {:?} for class '{}' at {} (input: {})",
                properties, class, path, snippet
            ),
            Error::NullForPrimitive {
                class,
                property,
                path,
            } => write!(
                f,
                "Null for primitive property '{}' of class '{}' at {}",
                property, class, path
            ),
            Error::NullNotAllowed { class, path } => {
                write!(f, "Null not allowed for class '{}' at {}", class, path)
            }
            // Creator
            Error::MissingCreatorProperty {
                class,
                parameter,
                path,
            } => write!(
                f,
                "Creator parameter '{}' of class '{}' missing at {}",
                parameter, class, path
            ),
            Error::NullCreatorProperty {
                class,
                parameter,
                path,
            } => write!(
                f,
                "Creator parameter '{}' of class '{}' is null at {}",
                parameter, class, path
            ),
            Error::MissingInjectable { key, path } => {
                write!(f, "No injectable value under key '{}' at {}", key, path)
            }
            // Polymorphism
            Error::InvalidSubtype {
                class,
                discriminator,
                known,
                path,
                snippet,
            } => write!(
                f,
                "Discriminator '{}' matches no subtype of '{}' (known: {:?}) at {} (input: {})",
                discriminator, class, known, path, snippet
            ),
            Error::MissingTypeId {
                class,
                path,
                snippet,
            } => write!(
                f,
                "No discriminator for polymorphic class '{}' at {} (input: {})",
                class, path, snippet
            ),
            // Identity
            Error::UnresolvedObjectIds { ids } => {
                write!(f, "Unresolved object ids at end of call: {:?}", ids)
            }
            Error::IdentityTypeConflict {
                id,
                expected,
                found,
                path,
            } => write!(
                f,
                "Object id '{}' already bound to class '{}', expected '{}' at {}",
                id, found, expected, path
            ),
            // Other
            Error::SelfReference { class, path } => {
                write!(f, "Self reference in class '{}' at {}", class, path)
            }
            Error::Transform(msg) => write!(f, "Transform failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Json(e) => Some(e),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Convenient alias for API results using the public `Error` type.
pub type Result<T> = core::result::Result<T, Error>;
