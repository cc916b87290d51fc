use core::fmt;
use std::{borrow::Cow, str::FromStr};

use serde::{Deserialize, Serialize};

const FORMAT_JWT_VC_JSON: &str = "jwt_vc_json";
const FORMAT_LDP_VC: &str = "ldp_vc";
const FORMAT_DC_SD_JWT: &str = "dc+sd-jwt";
const FORMAT_VC_SD_JWT: &str = "vc+sd-jwt";
const FORMAT_MSO_MDOC: &str = "mso_mdoc";
const FORMAT_AC_VP: &str = "ac_vp";

/// The credential format identifier carried by a Credential Query (`format`)
/// and by every credential offered to the matcher.
///
/// Registered identifiers are those of OID4VP v1.0 Appendix B. Anything else is
/// kept verbatim in [ClaimFormatDesignation::Other] and compared by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClaimFormatDesignation {
    /// W3C Verifiable Credential secured as a JWT (`jwt_vc_json`).
    JwtVcJson,

    /// W3C Verifiable Credential secured with Data Integrity / Linked Data Proofs (`ldp_vc`).
    LdpVc,

    /// IETF SD-JWT VC (`dc+sd-jwt`).
    ///
    /// The pre-1.0 identifier `vc+sd-jwt` parses to this variant as well.
    DcSdJwt,

    /// ISO/IEC 18013-5 mobile document (`mso_mdoc`).
    MsoMDoc,

    /// AnonCreds presentation (`ac_vp`).
    AcVp,

    /// Other claim format designations not covered by the above.
    Other(String),
}

/// The meta shape that is authoritative for a registered format.
///
/// Used to parse a Credential Query `meta` object in the context of its
/// `format`, rather than by guessing from the object's keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetaShape {
    /// `{ "type_values": [[...]] }`
    W3c,
    /// `{ "vct_values": [...] }`
    SdJwtVc,
    /// `{ "doctype_value": "..." }`
    MsoMdoc,
}

impl ClaimFormatDesignation {
    pub fn from_name(name: Cow<str>) -> Self {
        match name.as_ref() {
            FORMAT_JWT_VC_JSON => Self::JwtVcJson,
            FORMAT_LDP_VC => Self::LdpVc,
            FORMAT_DC_SD_JWT | FORMAT_VC_SD_JWT => Self::DcSdJwt,
            FORMAT_MSO_MDOC => Self::MsoMDoc,
            FORMAT_AC_VP => Self::AcVp,
            _ => Self::Other(name.into_owned()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::JwtVcJson => FORMAT_JWT_VC_JSON,
            Self::LdpVc => FORMAT_LDP_VC,
            Self::DcSdJwt => FORMAT_DC_SD_JWT,
            Self::MsoMDoc => FORMAT_MSO_MDOC,
            Self::AcVp => FORMAT_AC_VP,
            Self::Other(other) => other,
        }
    }

    /// Returns the meta shape this format expects, if the format is registered
    /// with one.
    pub fn expected_meta(&self) -> Option<MetaShape> {
        match self {
            Self::JwtVcJson | Self::LdpVc => Some(MetaShape::W3c),
            Self::DcSdJwt => Some(MetaShape::SdJwtVc),
            Self::MsoMDoc => Some(MetaShape::MsoMdoc),
            Self::AcVp | Self::Other(_) => None,
        }
    }

    /// Returns `true` for W3C VC data model formats.
    pub fn is_w3c(&self) -> bool {
        matches!(self, Self::JwtVcJson | Self::LdpVc)
    }

    /// Returns `true` if this designation is not one of the registered formats.
    pub fn is_other(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl From<&str> for ClaimFormatDesignation {
    fn from(s: &str) -> Self {
        Self::from_name(Cow::Borrowed(s))
    }
}

impl From<String> for ClaimFormatDesignation {
    fn from(value: String) -> Self {
        Self::from_name(Cow::Owned(value))
    }
}

impl FromStr for ClaimFormatDesignation {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl From<ClaimFormatDesignation> for String {
    fn from(format: ClaimFormatDesignation) -> Self {
        match format {
            ClaimFormatDesignation::Other(other) => other,
            registered => registered.name().to_owned(),
        }
    }
}

impl fmt::Display for ClaimFormatDesignation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

impl Serialize for ClaimFormatDesignation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.name().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClaimFormatDesignation {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Into::into)
    }
}
