use std::collections::HashSet;

use crate::{
    core::{
        claims_path::ClaimPathSegment,
        credential_format::ClaimFormatDesignation,
        credential_query_meta::{CredentialQueryMeta, MetaError},
        object::TypedParameter,
    },
    utils::NonEmptyVec,
};
use anyhow::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// Error raised when a DCQL query is malformed or violates its structural
/// invariants. A query that fails to parse cannot be matched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The JSON is not a DCQL query (syntax error, wrong types, empty arrays, etc.).
    #[error("malformed DCQL query at `{path}`: {message}")]
    Malformed { path: String, message: String },

    /// The `meta` object does not fit the query's format.
    #[error("invalid meta for credential query `{query}`: {source}")]
    InvalidMeta {
        query: String,
        #[source]
        source: MetaError,
    },

    #[error("duplicate credential query id `{0}`")]
    DuplicateQueryId(String),

    #[error("invalid identifier `{0}`: only alphanumeric characters, underscore and hyphen are allowed")]
    InvalidIdentifier(String),

    #[error("duplicate claim id `{claim}` in credential query `{query}`")]
    DuplicateClaimId { query: String, claim: String },

    #[error("credential query `{0}` declares `claim_sets` without `claims`")]
    ClaimSetsWithoutClaims(String),

    #[error("claim set of credential query `{query}` references undeclared claim id `{claim}`")]
    UndeclaredClaimId { query: String, claim: String },

    #[error("credential set references undeclared credential query id `{0}`")]
    UndeclaredQueryId(String),

    #[error("missing `{0}` parameter")]
    MissingParameter(&'static str),
}

impl ParseError {
    pub(crate) fn malformed<E: std::fmt::Display>(path: impl ToString, error: E) -> Self {
        Self::Malformed {
            path: path.to_string(),
            message: error.to_string(),
        }
    }
}

/// A DCQL query.
/// See: <https://openid.net/specs/openid-4-verifiable-presentations-1_0.html#section-6>
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DcqlQuery {
    credentials: NonEmptyVec<DcqlCredentialQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    credential_sets: Option<NonEmptyVec<DcqlCredentialSetQuery>>,
}

impl DcqlQuery {
    pub fn new(credentials: NonEmptyVec<DcqlCredentialQuery>) -> Self {
        Self {
            credentials,
            credential_sets: None,
        }
    }

    pub fn set_credential_sets(
        &mut self,
        credential_sets: Option<NonEmptyVec<DcqlCredentialSetQuery>>,
    ) {
        self.credential_sets = credential_sets;
    }

    pub fn with_credential_sets(
        mut self,
        credential_sets: NonEmptyVec<DcqlCredentialSetQuery>,
    ) -> Self {
        self.credential_sets = Some(credential_sets);
        self
    }

    pub fn credential_sets(&self) -> Option<&NonEmptyVec<DcqlCredentialSetQuery>> {
        self.credential_sets.as_ref()
    }

    pub fn credentials(&self) -> &[DcqlCredentialQuery] {
        &self.credentials
    }

    /// Returns the Credential Query with the given id.
    pub fn credential(&self, id: &str) -> Option<&DcqlCredentialQuery> {
        self.credentials.iter().find(|query| query.id() == id)
    }

    /// Checks the structural invariants that serde alone cannot express:
    /// identifier syntax and uniqueness, and that every id referenced by a
    /// claim set or credential set is declared.
    pub fn validate(&self) -> Result<(), ParseError> {
        self.validate_credentials()?;
        self.validate_credential_set_references()
    }

    /// Same as [DcqlQuery::validate], except that credential sets may name
    /// Credential Query ids that are not declared.
    ///
    /// Such an id never matches, so an option containing it is never
    /// satisfied.
    pub fn validate_credentials(&self) -> Result<(), ParseError> {
        let mut query_ids = HashSet::new();
        for query in self.credentials.iter() {
            validate_identifier(query.id())?;
            if !query_ids.insert(query.id()) {
                return Err(ParseError::DuplicateQueryId(query.id().to_owned()));
            }
            query.validate()?;
        }

        Ok(())
    }

    fn validate_credential_set_references(&self) -> Result<(), ParseError> {
        let options = self
            .credential_sets
            .iter()
            .flat_map(|sets| sets.iter())
            .flat_map(|set| set.options().iter());
        for option in options {
            if let Some(undeclared) = option.iter().find(|id| self.credential(id).is_none()) {
                return Err(ParseError::UndeclaredQueryId(undeclared.clone()));
            }
        }

        Ok(())
    }
}

impl TypedParameter for DcqlQuery {
    const KEY: &'static str = "dcql_query";
}

impl TryFrom<Json> for DcqlQuery {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Ok(crate::parser::DcqlParser::parse_value(value)?)
    }
}

impl TryFrom<DcqlQuery> for Json {
    type Error = serde_json::Error;

    fn try_from(value: DcqlQuery) -> Result<Self, Self::Error> {
        serde_json::to_value(value)
    }
}

fn validate_identifier(id: &str) -> Result<(), ParseError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ParseError::InvalidIdentifier(id.to_owned()))
    }
}

/// A Credential Query object
/// See: <https://openid.net/specs/openid-4-verifiable-presentations-1_0.html#section-6.1>
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "CredentialQueryObject")]
pub struct DcqlCredentialQuery {
    /// REQUIRED. A string identifying the Credential in the response.
    /// The value MUST be unique within a DCQL query.
    /// Valid characters are alphanumeric, underscore, and hyphen.
    id: String,

    /// REQUIRED. A string that specifies the requested format for the Credential.
    format: ClaimFormatDesignation,

    /// REQUIRED. Format-specific constraints, parsed in the context of `format`.
    /// If empty, no specific constraints are placed.
    meta: CredentialQueryMeta,

    /// OPTIONAL. Claims the Verifier requests from the Credential.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    claims: Vec<DcqlCredentialClaimsQuery>,

    /// OPTIONAL. Alternative combinations of claim ids, in order of preference.
    /// MUST NOT be present if `claims` is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    claim_sets: Option<NonEmptyVec<NonEmptyVec<String>>>,

    /// OPTIONAL. Expected trust frameworks. Carried, not evaluated by the matcher.
    #[serde(skip_serializing_if = "Option::is_none")]
    trusted_authorities: Option<NonEmptyVec<TrustedAuthoritiesQuery>>,

    /// OPTIONAL. Whether the Verifier requires cryptographic holder binding
    /// proof. Defaults to `true` if not present.
    #[serde(skip_serializing_if = "Option::is_none")]
    require_cryptographic_holder_binding: Option<bool>,

    /// OPTIONAL. Whether the Wallet may return multiple Credentials matching
    /// this query. Defaults to `false` if not present.
    #[serde(skip_serializing_if = "Option::is_none")]
    multiple: Option<bool>,
}

/// Wire form of a Credential Query, before `meta` is interpreted against `format`.
#[derive(Deserialize)]
struct CredentialQueryObject {
    id: String,
    format: ClaimFormatDesignation,
    #[serde(default)]
    meta: Map<String, Json>,
    #[serde(default)]
    claims: Vec<DcqlCredentialClaimsQuery>,
    claim_sets: Option<NonEmptyVec<NonEmptyVec<String>>>,
    trusted_authorities: Option<NonEmptyVec<TrustedAuthoritiesQuery>>,
    require_cryptographic_holder_binding: Option<bool>,
    multiple: Option<bool>,
}

impl TryFrom<CredentialQueryObject> for DcqlCredentialQuery {
    type Error = ParseError;

    fn try_from(object: CredentialQueryObject) -> Result<Self, Self::Error> {
        let meta = CredentialQueryMeta::from_object(&object.format, object.meta).map_err(
            |source| ParseError::InvalidMeta {
                query: object.id.clone(),
                source,
            },
        )?;

        Ok(Self {
            id: object.id,
            format: object.format,
            meta,
            claims: object.claims,
            claim_sets: object.claim_sets,
            trusted_authorities: object.trusted_authorities,
            require_cryptographic_holder_binding: object.require_cryptographic_holder_binding,
            multiple: object.multiple,
        })
    }
}

impl DcqlCredentialQuery {
    pub fn new(id: String, format: ClaimFormatDesignation) -> Self {
        Self {
            id,
            format,
            meta: CredentialQueryMeta::NoMeta,
            claims: Vec::new(),
            claim_sets: None,
            trusted_authorities: None,
            require_cryptographic_holder_binding: None,
            multiple: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn format(&self) -> &ClaimFormatDesignation {
        &self.format
    }

    pub fn meta(&self) -> &CredentialQueryMeta {
        &self.meta
    }

    pub fn with_meta(mut self, meta: CredentialQueryMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn claims(&self) -> &[DcqlCredentialClaimsQuery] {
        &self.claims
    }

    pub fn with_claims(mut self, claims: Vec<DcqlCredentialClaimsQuery>) -> Self {
        self.claims = claims;
        self
    }

    /// Returns the claim with the given id.
    pub fn claim(&self, id: &str) -> Option<&DcqlCredentialClaimsQuery> {
        self.claims
            .iter()
            .find(|claim| claim.id().is_some_and(|claim_id| claim_id == id))
    }

    pub fn claim_sets(&self) -> Option<&NonEmptyVec<NonEmptyVec<String>>> {
        self.claim_sets.as_ref()
    }

    pub fn with_claim_sets(mut self, claim_sets: NonEmptyVec<NonEmptyVec<String>>) -> Self {
        self.claim_sets = Some(claim_sets);
        self
    }

    pub fn trusted_authorities(&self) -> Option<&NonEmptyVec<TrustedAuthoritiesQuery>> {
        self.trusted_authorities.as_ref()
    }

    pub fn set_trusted_authorities(
        &mut self,
        trusted_authorities: Option<NonEmptyVec<TrustedAuthoritiesQuery>>,
    ) {
        self.trusted_authorities = trusted_authorities;
    }

    /// Returns `true` if cryptographic holder binding is required.
    /// Defaults to `true` per Section 6.1 if not explicitly set.
    pub fn require_cryptographic_holder_binding(&self) -> bool {
        self.require_cryptographic_holder_binding.unwrap_or(true)
    }

    pub fn set_require_cryptographic_holder_binding(
        &mut self,
        require_cryptographic_holder_binding: Option<bool>,
    ) {
        self.require_cryptographic_holder_binding = require_cryptographic_holder_binding;
    }

    /// Returns `true` if multiple Credentials may be returned for this query.
    /// Defaults to `false` per Section 6.1 if not explicitly set.
    pub fn multiple(&self) -> bool {
        self.multiple.unwrap_or(false)
    }

    pub fn multiple_raw(&self) -> Option<bool> {
        self.multiple
    }

    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = Some(multiple);
        self
    }

    fn validate(&self) -> Result<(), ParseError> {
        let mut claim_ids = HashSet::new();
        for id in self.claims.iter().filter_map(DcqlCredentialClaimsQuery::id) {
            validate_identifier(id)?;
            if !claim_ids.insert(id.as_str()) {
                return Err(ParseError::DuplicateClaimId {
                    query: self.id.clone(),
                    claim: id.clone(),
                });
            }
        }

        let Some(claim_sets) = &self.claim_sets else {
            return Ok(());
        };

        if self.claims.is_empty() {
            return Err(ParseError::ClaimSetsWithoutClaims(self.id.clone()));
        }

        for claim in claim_sets.iter().flat_map(|option| option.iter()) {
            if !claim_ids.contains(claim.as_str()) {
                return Err(ParseError::UndeclaredClaimId {
                    query: self.id.clone(),
                    claim: claim.clone(),
                });
            }
        }

        Ok(())
    }
}

/// A Trusted Authorities Query object
/// See: <https://openid.net/specs/openid-4-verifiable-presentations-1_0.html#section-6.1.1>
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TrustedAuthoritiesQuery {
    #[serde(rename = "type")]
    authority_type: TrustedAuthorityType,
    values: NonEmptyVec<String>,
}

impl TrustedAuthoritiesQuery {
    pub fn new(authority_type: TrustedAuthorityType, values: NonEmptyVec<String>) -> Self {
        Self {
            authority_type,
            values,
        }
    }

    pub fn authority_type(&self) -> &TrustedAuthorityType {
        &self.authority_type
    }

    pub fn values(&self) -> &NonEmptyVec<String> {
        &self.values
    }
}

/// Trusted Authority types
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrustedAuthorityType {
    /// Authority Key Identifier of an X.509 issuer certificate, base64url encoded.
    Aki,
    /// ETSI Trusted List identifier.
    EtsiTl,
    /// OpenID Federation Entity Identifier of a Trust Anchor.
    OpenidFederation,
    #[serde(untagged)]
    Other(String),
}

/// A Credential Set Query object
/// See: <https://openid.net/specs/openid-4-verifiable-presentations-1_0.html#section-6.2>
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DcqlCredentialSetQuery {
    /// REQUIRED. Each option is a list of Credential Query ids that together
    /// satisfy the use case.
    options: NonEmptyVec<NonEmptyVec<String>>,
    /// OPTIONAL. Defaults to `true` if not present.
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<bool>,
}

impl DcqlCredentialSetQuery {
    pub fn new(options: NonEmptyVec<NonEmptyVec<String>>) -> Self {
        Self {
            options,
            required: None,
        }
    }

    pub fn options(&self) -> &NonEmptyVec<NonEmptyVec<String>> {
        &self.options
    }

    /// Returns `true` if this credential set is required.
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }

    pub fn required_raw(&self) -> Option<bool> {
        self.required
    }

    pub fn set_required(&mut self, required: Option<bool>) {
        self.required = required;
    }
}

/// A Claims Query object
/// See: <https://openid.net/specs/openid-4-verifiable-presentations-1_0.html#section-6.3>
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DcqlCredentialClaimsQuery {
    /// REQUIRED if `claim_sets` is present in the Credential Query; OPTIONAL otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    /// REQUIRED. Claims path pointer to the claim within the Credential.
    path: NonEmptyVec<ClaimPathSegment>,
    /// OPTIONAL. Expected values; the claim matches if it equals any of them.
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<NonEmptyVec<Json>>,
    /// OPTIONAL (mso_mdoc). Equivalent to ISO 18013-5 `IntentToRetain`.
    #[serde(skip_serializing_if = "Option::is_none")]
    intent_to_retain: Option<bool>,
}

impl DcqlCredentialClaimsQuery {
    pub fn new(path: NonEmptyVec<ClaimPathSegment>) -> Self {
        Self {
            id: None,
            path,
            values: None,
            intent_to_retain: None,
        }
    }

    pub fn id(&self) -> Option<&String> {
        self.id.as_ref()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn path(&self) -> &[ClaimPathSegment] {
        &self.path
    }

    pub fn values(&self) -> Option<&NonEmptyVec<Json>> {
        self.values.as_ref()
    }

    pub fn with_values(mut self, values: NonEmptyVec<Json>) -> Self {
        self.values = Some(values);
        self
    }

    /// Returns `true` if `value` satisfies the `values` constraint, or if
    /// there is none.
    pub fn accepts(&self, value: &Json) -> bool {
        self.values
            .as_ref()
            .map_or(true, |values| values.contains(value))
    }

    pub fn intent_to_retain(&self) -> Option<bool> {
        self.intent_to_retain
    }

    /// For mdoc paths `[namespace, element_identifier]`, the namespace.
    pub fn namespace(&self) -> Option<&str> {
        match self.path.first() {
            Some(ClaimPathSegment::Key(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The last key in the path, e.g. `street` for `["address", "street"]`.
    pub fn claim_name(&self) -> Option<&str> {
        self.path.iter().rev().find_map(|element| match element {
            ClaimPathSegment::Key(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn query(value: Json) -> DcqlQuery {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn de_serialize_dcql_query() {
        let dcql_query_json = json!({
          "credentials": [
            {
              "id": "0",
              "format": "mso_mdoc",
              "meta": {
                "doctype_value": "org.iso.18013.5.1.mDL"
              },
              "claims": [
                {
                  "path": [
                    "org.iso.18013.5.1",
                    "given_name"
                  ],
                  "intent_to_retain": false
                },
              ]
            }
          ],
          "credential_sets": [
            {
              "options": [["0"]]
            }
          ]
        });

        let dcql_query_object = DcqlQuery {
            credentials: NonEmptyVec::new(DcqlCredentialQuery {
                id: "0".into(),
                format: ClaimFormatDesignation::MsoMDoc,
                meta: CredentialQueryMeta::MsoMdoc(
                    crate::core::credential_query_meta::MsoMdocMeta::new(
                        "org.iso.18013.5.1.mDL".into(),
                    ),
                ),
                claims: vec![DcqlCredentialClaimsQuery {
                    id: None,
                    path: vec![
                        ClaimPathSegment::Key("org.iso.18013.5.1".into()),
                        ClaimPathSegment::Key("given_name".into()),
                    ]
                    .try_into()
                    .unwrap(),
                    values: None,
                    intent_to_retain: Some(false),
                }],
                claim_sets: None,
                trusted_authorities: None,
                require_cryptographic_holder_binding: None,
                multiple: None,
            }),
            credential_sets: Some(NonEmptyVec::new(DcqlCredentialSetQuery {
                options: NonEmptyVec::new(NonEmptyVec::new("0".into())),
                required: None,
            })),
        };

        assert_eq!(
            dcql_query_json,
            serde_json::to_value(&dcql_query_object).unwrap()
        );
        assert_eq!(dcql_query_object, query(dcql_query_json));
    }

    #[test]
    fn defaults() {
        let cred = DcqlCredentialQuery::new("test".into(), ClaimFormatDesignation::MsoMDoc);
        assert!(cred.require_cryptographic_holder_binding());
        assert!(!cred.multiple());
        assert_eq!(cred.multiple_raw(), None);
        assert!(cred.meta().is_no_meta());

        let cred_set: DcqlCredentialSetQuery =
            serde_json::from_value(json!({ "options": [["cred1"]] })).unwrap();
        assert!(cred_set.is_required());
        assert_eq!(cred_set.required_raw(), None);

        let cred_set: DcqlCredentialSetQuery =
            serde_json::from_value(json!({ "options": [["cred1"]], "required": false })).unwrap();
        assert!(!cred_set.is_required());
    }

    #[test]
    fn missing_meta_is_no_meta() {
        let dcql = query(json!({
            "credentials": [{ "id": "test", "format": "mso_mdoc" }]
        }));
        assert!(dcql.credentials()[0].meta().is_no_meta());
        assert_eq!(
            serde_json::to_value(&dcql).unwrap()["credentials"][0]["meta"],
            json!({})
        );
    }

    #[test]
    fn meta_parsed_against_format() {
        let err = serde_json::from_value::<DcqlQuery>(json!({
            "credentials": [{
                "id": "pid",
                "format": "mso_mdoc",
                "meta": { "vct_values": ["https://example.com/pid"] }
            }]
        }))
        .unwrap_err();
        assert!(err.to_string().contains("invalid meta for credential query `pid`"));
    }

    #[test]
    fn trusted_authorities_round_trip() {
        let json = json!({
            "credentials": [{
                "id": "pid",
                "format": "dc+sd-jwt",
                "meta": {
                    "vct_values": ["https://example.com/pid"]
                },
                "trusted_authorities": [
                    { "type": "aki", "values": ["s9tIpPmhxdiuNkHMEWNpYim8S8Y"] },
                    { "type": "openid_federation", "values": ["https://trustanchor.example.com"] },
                    { "type": "custom_framework", "values": ["x"] }
                ],
                "require_cryptographic_holder_binding": false,
                "multiple": true
            }]
        });

        let dcql = query(json.clone());
        let cred = &dcql.credentials()[0];
        let authorities = cred.trusted_authorities().unwrap();
        assert_eq!(authorities[0].authority_type(), &TrustedAuthorityType::Aki);
        assert_eq!(
            authorities[1].authority_type(),
            &TrustedAuthorityType::OpenidFederation
        );
        assert_eq!(
            authorities[2].authority_type(),
            &TrustedAuthorityType::Other("custom_framework".into())
        );
        assert!(!cred.require_cryptographic_holder_binding());
        assert!(cred.multiple());
        assert_eq!(json, serde_json::to_value(&dcql).unwrap());
    }

    #[test]
    fn validate_accepts_well_formed_query() {
        let dcql = query(json!({
            "credentials": [
                {
                    "id": "pid",
                    "format": "dc+sd-jwt",
                    "claims": [
                        { "id": "a", "path": ["given_name"] },
                        { "id": "b", "path": ["family_name"] }
                    ],
                    "claim_sets": [["a", "b"], ["a"]]
                },
                { "id": "mdl", "format": "mso_mdoc" }
            ],
            "credential_sets": [{ "options": [["pid"], ["mdl"]] }]
        }));
        assert_eq!(dcql.validate(), Ok(()));
        assert!(dcql.credential("mdl").is_some());
        assert!(dcql.credentials()[0].claim("b").is_some());
    }

    #[test]
    fn validate_rejects_structural_errors() {
        let duplicate = query(json!({
            "credentials": [
                { "id": "a", "format": "mso_mdoc" },
                { "id": "a", "format": "ldp_vc" }
            ]
        }));
        assert_eq!(
            duplicate.validate(),
            Err(ParseError::DuplicateQueryId("a".into()))
        );

        let bad_id = query(json!({ "credentials": [{ "id": "a b", "format": "mso_mdoc" }] }));
        assert_eq!(
            bad_id.validate(),
            Err(ParseError::InvalidIdentifier("a b".into()))
        );

        let undeclared_claim = query(json!({
            "credentials": [{
                "id": "q",
                "format": "ldp_vc",
                "claims": [{ "id": "a", "path": ["x"] }],
                "claim_sets": [["a", "missing"]]
            }]
        }));
        assert_eq!(
            undeclared_claim.validate(),
            Err(ParseError::UndeclaredClaimId {
                query: "q".into(),
                claim: "missing".into()
            })
        );

        let sets_without_claims = query(json!({
            "credentials": [{ "id": "q", "format": "ldp_vc", "claim_sets": [["a"]] }]
        }));
        assert_eq!(
            sets_without_claims.validate(),
            Err(ParseError::ClaimSetsWithoutClaims("q".into()))
        );

        let duplicate_claim = query(json!({
            "credentials": [{
                "id": "q",
                "format": "ldp_vc",
                "claims": [{ "id": "a", "path": ["x"] }, { "id": "a", "path": ["y"] }]
            }]
        }));
        assert_eq!(
            duplicate_claim.validate(),
            Err(ParseError::DuplicateClaimId {
                query: "q".into(),
                claim: "a".into()
            })
        );

        let undeclared_query = query(json!({
            "credentials": [{ "id": "q", "format": "ldp_vc" }],
            "credential_sets": [{ "options": [["q", "other"]] }]
        }));
        assert_eq!(
            undeclared_query.validate(),
            Err(ParseError::UndeclaredQueryId("other".into()))
        );
        assert_eq!(undeclared_query.validate_credentials(), Ok(()));
        assert_eq!(
            duplicate.validate_credentials(),
            Err(ParseError::DuplicateQueryId("a".into()))
        );
    }

    #[test]
    fn empty_arrays_are_rejected() {
        assert!(serde_json::from_value::<DcqlQuery>(json!({ "credentials": [] })).is_err());
        assert!(serde_json::from_value::<DcqlQuery>(json!({
            "credentials": [{ "id": "q", "format": "ldp_vc" }],
            "credential_sets": [{ "options": [[]] }]
        }))
        .is_err());
        assert!(serde_json::from_value::<DcqlQuery>(json!({
            "credentials": [{ "id": "q", "format": "ldp_vc", "claims": [{ "path": [] }] }]
        }))
        .is_err());
    }

    #[test]
    fn claim_accessors() {
        let claim: DcqlCredentialClaimsQuery = serde_json::from_value(json!({
            "path": ["org.iso.18013.5.1", "age_over_18"],
            "values": [true]
        }))
        .unwrap();

        assert_eq!(claim.namespace(), Some("org.iso.18013.5.1"));
        assert_eq!(claim.claim_name(), Some("age_over_18"));
        assert!(claim.accepts(&json!(true)));
        assert!(!claim.accepts(&json!(false)));

        let nested: DcqlCredentialClaimsQuery =
            serde_json::from_value(json!({ "path": ["items", 0, null] })).unwrap();
        assert_eq!(nested.claim_name(), Some("items"));
        assert!(nested.accepts(&json!("anything")));
    }
}
