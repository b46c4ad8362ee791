// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Feature Flags
//!
//! On/off switches governing transform behavior, with the conventional
//! databind defaults. A [`Context`](crate::Context) carries sparse
//! overrides; anything not overridden falls back to
//! [`DeserializationFeature::default_value`] /
//! [`SerializationFeature::default_value`].
//!
//! Flags gate *policy*, not structure: the same null can be an error, a
//! zero value, or a pass-through depending on what is enabled.

/// Parse-direction switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeserializationFeature {
    /// Unknown input keys abort the call (on by default).
    FailOnUnknownProperties,
    /// Null for a primitive-typed property aborts the call.
    FailOnNullForPrimitives,
    /// Unresolvable creator parameter aborts the call.
    FailOnMissingCreatorProperties,
    /// Null creator argument aborts the call.
    FailOnNullCreatorProperties,
    /// Unknown discriminator aborts the call (on by default).
    FailOnInvalidSubtype,
    /// Absent discriminator aborts the call (on by default).
    FailOnMissingTypeId,
    /// Dangling identity references abort the call (on by default).
    FailOnUnresolvedObjectIds,
    /// Wire keys match declared names case-insensitively.
    AcceptCaseInsensitiveProperties,
    /// `[]` decodes as null for object targets.
    AcceptEmptyArrayAsNullObject,
    /// `""` decodes as null for object targets.
    AcceptEmptyStringAsNullObject,
    /// Cross-kind scalar coercion table (on by default).
    AllowCoercionOfScalars,
    /// Expect `{rootName: value}` around the document.
    UnwrapRootValue,
    /// Absent declared properties are assigned explicit nulls.
    MapUndefinedToNull,
    /// Null decodes as the zero value for every primitive kind.
    SetDefaultValueForPrimitivesOnNull,
    /// Null decodes as `0` / `0.0` for number targets.
    SetDefaultValueForNumberOnNull,
    /// Null decodes as `""` for string targets.
    SetDefaultValueForStringOnNull,
    /// Null decodes as `false` for boolean targets.
    SetDefaultValueForBooleanOnNull,
    /// Null decodes as `0` for big-integer targets.
    SetDefaultValueForBigintOnNull,
    /// Properties without view membership pass view filtering (on by default).
    DefaultViewInclusion,
}

impl DeserializationFeature {
    /// Built-in default when no context overrides the flag.
    pub fn default_value(self) -> bool {
        matches!(
            self,
            DeserializationFeature::FailOnUnknownProperties
                | DeserializationFeature::FailOnInvalidSubtype
                | DeserializationFeature::FailOnMissingTypeId
                | DeserializationFeature::FailOnUnresolvedObjectIds
                | DeserializationFeature::AllowCoercionOfScalars
                | DeserializationFeature::DefaultViewInclusion
        )
    }

    /// SCREAMING_SNAKE name used by the declarative loaders.
    pub fn name(self) -> &'static str {
        match self {
            DeserializationFeature::FailOnUnknownProperties => "FAIL_ON_UNKNOWN_PROPERTIES",
            DeserializationFeature::FailOnNullForPrimitives => "FAIL_ON_NULL_FOR_PRIMITIVES",
            DeserializationFeature::FailOnMissingCreatorProperties => {
                "FAIL_ON_MISSING_CREATOR_PROPERTIES"
            }
            DeserializationFeature::FailOnNullCreatorProperties => {
                "FAIL_ON_NULL_CREATOR_PROPERTIES"
            }
            DeserializationFeature::FailOnInvalidSubtype => "FAIL_ON_INVALID_SUBTYPE",
            DeserializationFeature::FailOnMissingTypeId => "FAIL_ON_MISSING_TYPE_ID",
            DeserializationFeature::FailOnUnresolvedObjectIds => "FAIL_ON_UNRESOLVED_OBJECT_IDS",
            DeserializationFeature::AcceptCaseInsensitiveProperties => {
                "ACCEPT_CASE_INSENSITIVE_PROPERTIES"
            }
            DeserializationFeature::AcceptEmptyArrayAsNullObject => {
                "ACCEPT_EMPTY_ARRAY_AS_NULL_OBJECT"
            }
            DeserializationFeature::AcceptEmptyStringAsNullObject => {
                "ACCEPT_EMPTY_STRING_AS_NULL_OBJECT"
            }
            DeserializationFeature::AllowCoercionOfScalars => "ALLOW_COERCION_OF_SCALARS",
            DeserializationFeature::UnwrapRootValue => "UNWRAP_ROOT_VALUE",
            DeserializationFeature::MapUndefinedToNull => "MAP_UNDEFINED_TO_NULL",
            DeserializationFeature::SetDefaultValueForPrimitivesOnNull => {
                "SET_DEFAULT_VALUE_FOR_PRIMITIVES_ON_NULL"
            }
            DeserializationFeature::SetDefaultValueForNumberOnNull => {
                "SET_DEFAULT_VALUE_FOR_NUMBER_ON_NULL"
            }
            DeserializationFeature::SetDefaultValueForStringOnNull => {
                "SET_DEFAULT_VALUE_FOR_STRING_ON_NULL"
            }
            DeserializationFeature::SetDefaultValueForBooleanOnNull => {
                "SET_DEFAULT_VALUE_FOR_BOOLEAN_ON_NULL"
            }
            DeserializationFeature::SetDefaultValueForBigintOnNull => {
                "SET_DEFAULT_VALUE_FOR_BIGINT_ON_NULL"
            }
            DeserializationFeature::DefaultViewInclusion => "DEFAULT_VIEW_INCLUSION",
        }
    }

    /// Inverse of [`name`](Self::name), for the declarative loaders.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_DESERIALIZATION.iter().copied().find(|f| f.name() == name)
    }
}

/// Every parse-direction flag, in declaration order.
pub(crate) const ALL_DESERIALIZATION: &[DeserializationFeature] = &[
    DeserializationFeature::FailOnUnknownProperties,
    DeserializationFeature::FailOnNullForPrimitives,
    DeserializationFeature::FailOnMissingCreatorProperties,
    DeserializationFeature::FailOnNullCreatorProperties,
    DeserializationFeature::FailOnInvalidSubtype,
    DeserializationFeature::FailOnMissingTypeId,
    DeserializationFeature::FailOnUnresolvedObjectIds,
    DeserializationFeature::AcceptCaseInsensitiveProperties,
    DeserializationFeature::AcceptEmptyArrayAsNullObject,
    DeserializationFeature::AcceptEmptyStringAsNullObject,
    DeserializationFeature::AllowCoercionOfScalars,
    DeserializationFeature::UnwrapRootValue,
    DeserializationFeature::MapUndefinedToNull,
    DeserializationFeature::SetDefaultValueForPrimitivesOnNull,
    DeserializationFeature::SetDefaultValueForNumberOnNull,
    DeserializationFeature::SetDefaultValueForStringOnNull,
    DeserializationFeature::SetDefaultValueForBooleanOnNull,
    DeserializationFeature::SetDefaultValueForBigintOnNull,
    DeserializationFeature::DefaultViewInclusion,
];

/// Stringify-direction switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SerializationFeature {
    /// Properties without view membership pass view filtering (on by default).
    DefaultViewInclusion,
    /// Self-referential graphs without identity abort the call (on by default).
    FailOnSelfReferences,
    /// Wrap the document in `{rootName: value}`.
    WrapRootValue,
    /// Sort map entries by key.
    OrderMapEntriesByKeys,
    /// Timestamps as epoch milliseconds, not RFC 3339 (on by default).
    WriteDatesAsTimestamps,
}

impl SerializationFeature {
    /// Built-in default when no context overrides the flag.
    pub fn default_value(self) -> bool {
        matches!(
            self,
            SerializationFeature::DefaultViewInclusion
                | SerializationFeature::FailOnSelfReferences
                | SerializationFeature::WriteDatesAsTimestamps
        )
    }

    /// SCREAMING_SNAKE name used by the declarative loaders.
    pub fn name(self) -> &'static str {
        match self {
            SerializationFeature::DefaultViewInclusion => "DEFAULT_VIEW_INCLUSION",
            SerializationFeature::FailOnSelfReferences => "FAIL_ON_SELF_REFERENCES",
            SerializationFeature::WrapRootValue => "WRAP_ROOT_VALUE",
            SerializationFeature::OrderMapEntriesByKeys => "ORDER_MAP_ENTRIES_BY_KEYS",
            SerializationFeature::WriteDatesAsTimestamps => "WRITE_DATES_AS_TIMESTAMPS",
        }
    }

    /// Inverse of [`name`](Self::name), for the declarative loaders.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_SERIALIZATION.iter().copied().find(|f| f.name() == name)
    }
}

/// Every stringify-direction flag, in declaration order.
pub(crate) const ALL_SERIALIZATION: &[SerializationFeature] = &[
    SerializationFeature::DefaultViewInclusion,
    SerializationFeature::FailOnSelfReferences,
    SerializationFeature::WrapRootValue,
    SerializationFeature::OrderMapEntriesByKeys,
    SerializationFeature::WriteDatesAsTimestamps,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_by_default_where_it_matters() {
        assert!(DeserializationFeature::FailOnUnknownProperties.default_value());
        assert!(DeserializationFeature::FailOnInvalidSubtype.default_value());
        assert!(DeserializationFeature::FailOnMissingTypeId.default_value());
        assert!(DeserializationFeature::FailOnUnresolvedObjectIds.default_value());
        assert!(!DeserializationFeature::FailOnNullForPrimitives.default_value());
        assert!(!DeserializationFeature::UnwrapRootValue.default_value());
    }

    #[test]
    fn coercion_and_view_inclusion_default_on() {
        assert!(DeserializationFeature::AllowCoercionOfScalars.default_value());
        assert!(DeserializationFeature::DefaultViewInclusion.default_value());
        assert!(SerializationFeature::DefaultViewInclusion.default_value());
        assert!(SerializationFeature::WriteDatesAsTimestamps.default_value());
    }

    #[test]
    fn names_round_trip() {
        for f in ALL_DESERIALIZATION {
            assert_eq!(DeserializationFeature::from_name(f.name()), Some(*f));
        }
        for f in ALL_SERIALIZATION {
            assert_eq!(SerializationFeature::from_name(f.name()), Some(*f));
        }
        assert_eq!(DeserializationFeature::from_name("NO_SUCH_FLAG"), None);
    }
}
