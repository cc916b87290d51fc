use serde::{ser::SerializeMap, Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use tracing::trace;

use super::{
    credential::RawCredential,
    credential_format::{ClaimFormatDesignation, MetaShape},
};
use crate::utils::NonEmptyVec;

const KEY_TYPE_VALUES: &str = "type_values";
const KEY_VCT_VALUES: &str = "vct_values";
const KEY_DOCTYPE_VALUE: &str = "doctype_value";
const KEY_PROPERTIES: &str = "properties";

/// Format-specific constraints of a Credential Query (`meta`).
///
/// The variant is chosen by the query's `format`: each registered format has
/// one authoritative shape (see [ClaimFormatDesignation::expected_meta]).
/// Only unregistered formats fall back to recognising the shape by its key.
///
/// See: <https://openid.net/specs/openid-4-verifiable-presentations-1_0.html#appendix-B>
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CredentialQueryMeta {
    /// `{}`: no constraints.
    #[default]
    NoMeta,
    W3c(W3cCredentialMeta),
    SdJwtVc(SdJwtVcMeta),
    MsoMdoc(MsoMdocMeta),
    Generic(GenericMeta),
}

/// W3C VC meta (`jwt_vc_json`, `ldp_vc`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct W3cCredentialMeta {
    /// Alternatives of fully expanded type sets; a credential matches if its
    /// `type` contains every entry of at least one alternative.
    type_values: NonEmptyVec<NonEmptyVec<String>>,
}

impl W3cCredentialMeta {
    pub fn new(type_values: NonEmptyVec<NonEmptyVec<String>>) -> Self {
        Self { type_values }
    }

    pub fn type_values(&self) -> &NonEmptyVec<NonEmptyVec<String>> {
        &self.type_values
    }
}

/// SD-JWT VC meta (`dc+sd-jwt`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SdJwtVcMeta {
    vct_values: NonEmptyVec<String>,
}

impl SdJwtVcMeta {
    pub fn new(vct_values: NonEmptyVec<String>) -> Self {
        Self { vct_values }
    }

    pub fn vct_values(&self) -> &NonEmptyVec<String> {
        &self.vct_values
    }
}

/// ISO mdoc meta (`mso_mdoc`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MsoMdocMeta {
    doctype_value: String,
}

impl MsoMdocMeta {
    pub fn new(doctype_value: String) -> Self {
        Self { doctype_value }
    }

    pub fn doctype_value(&self) -> &str {
        &self.doctype_value
    }
}

/// Free-form meta for formats without a registered shape.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GenericMeta {
    properties: Map<String, Json>,
}

impl GenericMeta {
    pub fn new(properties: Map<String, Json>) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &Map<String, Json> {
        &self.properties
    }
}

/// A `meta` object that does not fit the shape required by its format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetaError {
    #[error("unrecognized meta shape with keys {0:?}")]
    UnrecognizedShape(Vec<String>),

    #[error("ambiguous meta shape with keys {0:?}")]
    AmbiguousShape(Vec<String>),

    #[error("`{key}` meta is not valid for format {format}")]
    FormatMismatch {
        key: &'static str,
        format: ClaimFormatDesignation,
    },

    #[error("invalid `{key}` meta: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaKind {
    Typed(MetaShape),
    Generic,
}

impl MetaKind {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            KEY_TYPE_VALUES => Some(Self::Typed(MetaShape::W3c)),
            KEY_VCT_VALUES => Some(Self::Typed(MetaShape::SdJwtVc)),
            KEY_DOCTYPE_VALUE => Some(Self::Typed(MetaShape::MsoMdoc)),
            KEY_PROPERTIES => Some(Self::Generic),
            _ => None,
        }
    }

    fn key(self) -> &'static str {
        match self {
            Self::Typed(MetaShape::W3c) => KEY_TYPE_VALUES,
            Self::Typed(MetaShape::SdJwtVc) => KEY_VCT_VALUES,
            Self::Typed(MetaShape::MsoMdoc) => KEY_DOCTYPE_VALUE,
            Self::Generic => KEY_PROPERTIES,
        }
    }
}

impl CredentialQueryMeta {
    /// Parses a `meta` object in the context of the owning query's format.
    ///
    /// An empty object is always [CredentialQueryMeta::NoMeta]. A non-empty
    /// object must be exactly one known shape, and for registered formats that
    /// shape must be the format's own (or the generic `properties` shape).
    pub fn from_object(
        format: &ClaimFormatDesignation,
        object: Map<String, Json>,
    ) -> Result<Self, MetaError> {
        if object.is_empty() {
            return Ok(Self::NoMeta);
        }

        let keys = || object.keys().cloned().collect::<Vec<_>>();

        let mut kinds = object.keys().filter_map(|key| MetaKind::from_key(key));
        let kind = match (kinds.next(), kinds.next()) {
            (None, _) => return Err(MetaError::UnrecognizedShape(keys())),
            (Some(_), Some(_)) => return Err(MetaError::AmbiguousShape(keys())),
            (Some(kind), None) => kind,
        };

        if let (Some(expected), MetaKind::Typed(found)) = (format.expected_meta(), kind) {
            if expected != found {
                return Err(MetaError::FormatMismatch {
                    key: kind.key(),
                    format: format.clone(),
                });
            }
        }

        trace!("Parsed `{}` meta for format {format}", kind.key());

        let value = Json::Object(object);
        let invalid = |e: serde_json::Error| MetaError::Invalid {
            key: kind.key(),
            reason: e.to_string(),
        };

        Ok(match kind {
            MetaKind::Typed(MetaShape::W3c) => {
                Self::W3c(serde_json::from_value(value).map_err(invalid)?)
            }
            MetaKind::Typed(MetaShape::SdJwtVc) => {
                Self::SdJwtVc(serde_json::from_value(value).map_err(invalid)?)
            }
            MetaKind::Typed(MetaShape::MsoMdoc) => {
                Self::MsoMdoc(serde_json::from_value(value).map_err(invalid)?)
            }
            MetaKind::Generic => Self::Generic(serde_json::from_value(value).map_err(invalid)?),
        })
    }

    /// Parses a `meta` object without format context, recognising the shape
    /// by its key alone.
    pub fn sniff(object: Map<String, Json>) -> Result<Self, MetaError> {
        Self::from_object(&ClaimFormatDesignation::Other(String::new()), object)
    }

    pub fn is_no_meta(&self) -> bool {
        matches!(self, Self::NoMeta)
    }

    /// Returns `true` if this meta can constrain credentials of `format`.
    ///
    /// `NoMeta` and `GenericMeta` apply to every format; typed metas apply to
    /// the formats they are registered for, and to any unregistered format.
    pub fn applies_to_format(&self, format: &ClaimFormatDesignation) -> bool {
        let shape = match self {
            Self::NoMeta | Self::Generic(_) => return true,
            Self::W3c(_) => MetaShape::W3c,
            Self::SdJwtVc(_) => MetaShape::SdJwtVc,
            Self::MsoMdoc(_) => MetaShape::MsoMdoc,
        };

        match format.expected_meta() {
            Some(expected) => expected == shape,
            None => format.is_other(),
        }
    }

    /// Checks the credential against the meta constraints.
    pub fn satisfied_by(&self, credential: &RawCredential) -> bool {
        match self {
            Self::NoMeta => true,
            Self::W3c(meta) => {
                let Some(types) = credential.types() else {
                    trace!(
                        "W3C credential {} `type` is missing or not an array",
                        credential.id()
                    );
                    return false;
                };
                meta.type_values()
                    .iter()
                    .any(|required| required.iter().all(|t| types.contains(&t.as_str())))
            }
            Self::SdJwtVc(meta) => match credential.vct() {
                Some(vct) => meta.vct_values().iter().any(|v| v == vct),
                None => {
                    trace!("SD-JWT VC {} `vct` claim is missing", credential.id());
                    false
                }
            },
            Self::MsoMdoc(meta) => match credential.doctype() {
                Some(doctype) => meta.doctype_value() == doctype,
                None => {
                    trace!("mdoc {} `doctype` is missing", credential.id());
                    false
                }
            },
            // Compared against the payload as given, so `null` is a value like
            // any other and a `vc` envelope is not looked into.
            Self::Generic(meta) => meta
                .properties()
                .iter()
                .all(|(key, expected)| credential.data.get(key) == Some(expected)),
        }
    }
}

impl Serialize for CredentialQueryMeta {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::NoMeta => serializer.serialize_map(Some(0))?.end(),
            Self::W3c(meta) => meta.serialize(serializer),
            Self::SdJwtVc(meta) => meta.serialize(serializer),
            Self::MsoMdoc(meta) => meta.serialize(serializer),
            Self::Generic(meta) => meta.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for CredentialQueryMeta {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let object = Map::<String, Json>::deserialize(deserializer)?;
        Self::sniff(object).map_err(serde::de::Error::custom)
    }
}
