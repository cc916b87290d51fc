use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use super::credential_format::ClaimFormatDesignation;

/// A credential held by the wallet, already decoded into a JSON value.
///
/// Decoding (JWT, SD-JWT disclosures, CBOR) and signature verification happen
/// before a credential reaches the matcher. The matcher only ever reads it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RawCredential {
    /// Wallet-local identifier of the credential.
    pub id: String,
    /// Format identifier, e.g. `jwt_vc_json`, `dc+sd-jwt` or `mso_mdoc`.
    pub format: String,
    /// Decoded claim data.
    pub data: Json,
}

impl RawCredential {
    pub fn new(id: impl Into<String>, format: impl Into<String>, data: Json) -> Self {
        Self {
            id: id.into(),
            format: format.into(),
            data,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Returns the parsed format designation of this credential.
    pub fn designation(&self) -> ClaimFormatDesignation {
        self.format.as_str().into()
    }

    /// Returns the canonical claim tree used for path resolution.
    ///
    /// A JWT-VC payload keeps the credential inside a `vc` member; that inner
    /// object is returned when present. Every other shape is returned as-is.
    pub fn claims(&self) -> &Json {
        match self.data.get("vc") {
            Some(vc @ Json::Object(_)) => vc,
            _ => &self.data,
        }
    }

    /// Looks up a top-level claim, first in the canonical claim tree and then
    /// in the enclosing payload.
    pub fn claim(&self, name: &str) -> Option<&Json> {
        self.claims()
            .get(name)
            .or_else(|| self.data.get(name))
            .filter(|value| !value.is_null())
    }

    /// W3C `type` values. A single string type counts as a one-element list.
    pub fn types(&self) -> Option<Vec<&str>> {
        match self.claim("type")? {
            Json::Array(types) => Some(types.iter().filter_map(Json::as_str).collect()),
            Json::String(single) => Some(vec![single.as_str()]),
            _ => None,
        }
    }

    /// SD-JWT VC `vct` claim.
    pub fn vct(&self) -> Option<&str> {
        self.claim("vct")?.as_str()
    }

    /// mdoc document type, read from `doctype` or, failing that, `docType`.
    pub fn doctype(&self) -> Option<&str> {
        self.claim("doctype")
            .or_else(|| self.claim("docType"))?
            .as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn jwt_vc_envelope_is_unwrapped() {
        let credential = RawCredential::new(
            "jwt",
            "jwt_vc_json",
            json!({
                "iss": "did:example:issuer",
                "vc": {
                    "type": ["VerifiableCredential", "UniversityDegree"],
                    "credentialSubject": { "degree": "BSc" }
                }
            }),
        );

        assert_eq!(credential.claims()["credentialSubject"]["degree"], "BSc");
        assert_eq!(
            credential.types(),
            Some(vec!["VerifiableCredential", "UniversityDegree"])
        );
        assert_eq!(credential.claim("iss"), Some(&json!("did:example:issuer")));
        assert_eq!(credential.designation(), ClaimFormatDesignation::JwtVcJson);
    }

    #[test]
    fn single_type_string() {
        let credential = RawCredential::new(
            "ldp",
            "ldp_vc",
            json!({ "type": "VerifiableCredential" }),
        );
        assert_eq!(credential.types(), Some(vec!["VerifiableCredential"]));
    }

    #[test]
    fn mdoc_doctype_spellings() {
        let lower = RawCredential::new(
            "a",
            "mso_mdoc",
            json!({ "doctype": "org.iso.18013.5.1.mDL" }),
        );
        let camel = RawCredential::new(
            "b",
            "mso_mdoc",
            json!({ "docType": "org.iso.18013.5.1.mDL" }),
        );
        assert_eq!(lower.doctype(), Some("org.iso.18013.5.1.mDL"));
        assert_eq!(camel.doctype(), Some("org.iso.18013.5.1.mDL"));
        assert_eq!(lower.vct(), None);
    }
}
