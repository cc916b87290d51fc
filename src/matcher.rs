//! Evaluation of a [DcqlQuery] against the credentials held by a wallet.
//!
//! Matching happens in two steps:
//!
//! 1. Each Credential Query is evaluated against every credential, in input
//!    order. A credential matches when its format equals the query's format,
//!    it satisfies the query's `meta`, and it satisfies the query's claims
//!    (all of them, or the first satisfiable `claim_sets` option). With
//!    `multiple` unset only the first matching credential is kept.
//! 2. If the query has `credential_sets`, every required set must have an
//!    option whose Credential Queries all matched something.
//!
//! The matcher is a pure function of its inputs: it holds no state between
//! calls and never modifies the query or the credentials.
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value as Json;
use tracing::{debug, trace, warn};

use crate::{
    config::MatcherConfig,
    core::{
        claims_path::path_to_string,
        credential::RawCredential,
        dcql_query::{
            DcqlCredentialClaimsQuery, DcqlCredentialQuery, DcqlCredentialSetQuery, DcqlQuery,
        },
    },
    utils::NonEmptyVec,
};

/// Credentials selected for each Credential Query id, in query declaration order.
///
/// Queries without any match have no entry.
pub type DcqlMatches = IndexMap<String, Vec<RawCredential>>;

/// Matches with the claim values that satisfied each query.
pub type DcqlClaimMatches = IndexMap<String, Vec<DcqlMatchResult>>;

/// Error returned when the matched credentials cannot satisfy the query as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// A required credential set has no option whose queries all matched.
    #[error("Required credential set constraints not met. Credential set {index} has no satisfied option among {options:?}")]
    RequiredSetUnmet {
        /// Position of the set in `credential_sets`.
        index: usize,
        options: Vec<Vec<String>>,
    },

    /// Strict mode without credential sets: these queries matched nothing.
    #[error("No matches found for required credential queries: {0:?}")]
    UnmatchedQueries(Vec<String>),
}

/// A credential selected for a Credential Query, with the claims that satisfied it.
///
/// Serializes as `{ "credential": ..., "selected_claims": { path: value } }`,
/// with claims in the order the query declares them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcqlMatchResult {
    credential: RawCredential,
    selected_claims: IndexMap<String, Json>,
}

impl DcqlMatchResult {
    pub fn credential(&self) -> &RawCredential {
        &self.credential
    }

    pub fn into_credential(self) -> RawCredential {
        self.credential
    }

    /// Claim values keyed by their dotted path, e.g. `credentialSubject.given_name`.
    ///
    /// Only the claims of the `claim_sets` option that matched are included.
    /// A wildcard path that selected several values maps to an array of them.
    pub fn selected_claims(&self) -> &IndexMap<String, Json> {
        &self.selected_claims
    }
}

/// DCQL matcher.
#[derive(Debug, Clone, Default)]
pub struct DcqlMatcher {
    config: MatcherConfig,
}

impl DcqlMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Matches `credentials` against `query`.
    ///
    /// Returns the selected credentials per Credential Query id, or an error
    /// if a required credential set is not satisfied. No partial result is
    /// returned on error.
    pub fn match_credentials(
        &self,
        query: &DcqlQuery,
        credentials: &[RawCredential],
    ) -> Result<DcqlMatches, MatchError> {
        Ok(self
            .match_with_claims(query, credentials)?
            .into_iter()
            .map(|(id, results)| {
                let credentials = results
                    .into_iter()
                    .map(DcqlMatchResult::into_credential)
                    .collect();
                (id, credentials)
            })
            .collect())
    }

    /// Same as [DcqlMatcher::match_credentials], keeping the claim values that
    /// satisfied each query.
    pub fn match_with_claims(
        &self,
        query: &DcqlQuery,
        credentials: &[RawCredential],
    ) -> Result<DcqlClaimMatches, MatchError> {
        debug!(
            "Starting DCQL match: {} credential queries, {} available credentials",
            query.credentials().len(),
            credentials.len()
        );

        let mut matches = DcqlClaimMatches::new();
        for credential_query in query.credentials() {
            let selected = self.select(credential_query, credentials);
            if selected.is_empty() {
                debug!("No credentials found matching query `{}`", credential_query.id());
                continue;
            }
            matches.insert(credential_query.id().to_owned(), selected);
        }

        debug!("Individual matches found: {:?}", summarize(&matches));

        match query.credential_sets() {
            Some(credential_sets) => check_credential_sets(credential_sets, &matches)?,
            None if self.config.strict_when_no_sets => {
                let unmatched: Vec<String> = query
                    .credentials()
                    .iter()
                    .map(|credential_query| credential_query.id())
                    .filter(|id| !matches.contains_key(*id))
                    .map(ToOwned::to_owned)
                    .collect();
                if !unmatched.is_empty() {
                    warn!("No matches found for required credential queries: {unmatched:?}");
                    return Err(MatchError::UnmatchedQueries(unmatched));
                }
            }
            None => {}
        }

        debug!("DCQL match successful: {:?}", summarize(&matches));
        Ok(matches)
    }

    /// Returns `true` if `credential` satisfies `credential_query` on its own.
    pub fn matches(
        &self,
        credential_query: &DcqlCredentialQuery,
        credential: &RawCredential,
    ) -> bool {
        self.evaluate(credential_query, credential).is_some()
    }

    /// Applies the selection policy of a Credential Query over all candidates.
    fn select(
        &self,
        credential_query: &DcqlCredentialQuery,
        credentials: &[RawCredential],
    ) -> Vec<DcqlMatchResult> {
        let mut selected: Vec<DcqlMatchResult> = credentials
            .iter()
            .filter_map(|credential| {
                let selected_claims = self.evaluate(credential_query, credential)?;
                Some(DcqlMatchResult {
                    credential: credential.clone(),
                    selected_claims,
                })
            })
            .collect();

        if !credential_query.multiple() && selected.len() > 1 {
            warn!(
                "Multiple credentials matched query `{}` but `multiple` is false. Selecting the first: {}",
                credential_query.id(),
                selected[0].credential.id()
            );
            selected.truncate(1);
        }

        selected
    }

    /// Evaluates one credential against one Credential Query.
    ///
    /// Returns the selected claims on a match, `None` otherwise.
    fn evaluate(
        &self,
        credential_query: &DcqlCredentialQuery,
        credential: &RawCredential,
    ) -> Option<IndexMap<String, Json>> {
        let query_id = credential_query.id();

        if credential.designation() != *credential_query.format() {
            trace!(
                "Credential {} ({}) does not have format {} of query `{query_id}`",
                credential.id(),
                credential.format(),
                credential_query.format()
            );
            return None;
        }

        let meta = credential_query.meta();
        if !meta.applies_to_format(credential_query.format()) {
            warn!(
                "Meta of query `{query_id}` does not apply to its format {}",
                credential_query.format()
            );
            return None;
        }
        if !meta.satisfied_by(credential) {
            trace!("Credential {} failed meta check for query `{query_id}`", credential.id());
            return None;
        }

        let claims = credential_query.claims();
        if claims.is_empty() {
            trace!("No claims requested by query `{query_id}`");
            return Some(IndexMap::new());
        }

        let selected = match credential_query.claim_sets() {
            None => self.evaluate_claims(claims.iter(), credential),
            Some(claim_sets) => self.evaluate_claim_sets(credential_query, claim_sets, credential),
        };

        if selected.is_none() {
            trace!(
                "Credential {} failed claims check for query `{query_id}`",
                credential.id()
            );
        }
        selected
    }

    /// Tries each `claim_sets` option in order; the first satisfied option wins.
    fn evaluate_claim_sets(
        &self,
        credential_query: &DcqlCredentialQuery,
        claim_sets: &NonEmptyVec<NonEmptyVec<String>>,
        credential: &RawCredential,
    ) -> Option<IndexMap<String, Json>> {
        claim_sets.iter().find_map(|option| {
            trace!("Checking claim set option {:?}", option.as_ref());
            let mut claims = Vec::with_capacity(option.len());
            for claim_id in option.iter() {
                let Some(claim) = credential_query.claim(claim_id) else {
                    warn!(
                        "Claim id `{claim_id}` of a claim set is not declared in query `{}`",
                        credential_query.id()
                    );
                    return None;
                };
                claims.push(claim);
            }
            self.evaluate_claims(claims.into_iter(), credential)
        })
    }

    /// All claims must be satisfied.
    fn evaluate_claims<'a>(
        &self,
        claims: impl Iterator<Item = &'a DcqlCredentialClaimsQuery>,
        credential: &RawCredential,
    ) -> Option<IndexMap<String, Json>> {
        let mut selected = IndexMap::new();
        for claim in claims {
            let value = self.evaluate_claim(claim, credential)?;
            selected.insert(path_to_string(claim.path()), value);
        }
        Some(selected)
    }

    fn evaluate_claim(
        &self,
        claim: &DcqlCredentialClaimsQuery,
        credential: &RawCredential,
    ) -> Option<Json> {
        let Some(mut nodes) =
            self.config
                .array_wildcard
                .evaluate(credential.claims(), claim.path(), |value| claim.accepts(value))
        else {
            trace!(
                "Claim {} not found or not matching in credential {}",
                path_to_string(claim.path()),
                credential.id()
            );
            return None;
        };

        Some(if nodes.len() == 1 {
            nodes.remove(0).clone()
        } else {
            Json::Array(nodes.into_iter().cloned().collect())
        })
    }
}

/// Checks every credential set against the queries that produced matches.
fn check_credential_sets(
    credential_sets: &[DcqlCredentialSetQuery],
    matches: &DcqlClaimMatches,
) -> Result<(), MatchError> {
    for (index, credential_set) in credential_sets.iter().enumerate() {
        let satisfied = credential_set.options().iter().any(|option| {
            option
                .iter()
                .all(|id| matches.get(id).is_some_and(|selected| !selected.is_empty()))
        });

        match (satisfied, credential_set.is_required()) {
            (true, _) => trace!("Credential set {index} satisfied"),
            (false, false) => trace!("Optional credential set {index} not satisfied"),
            (false, true) => {
                let options: Vec<Vec<String>> = credential_set
                    .options()
                    .iter()
                    .map(|option| option.to_vec())
                    .collect();
                warn!(
                    "Required credential set {index} not satisfied. Options: {options:?}, matched queries: {:?}",
                    matches.keys().collect::<Vec<_>>()
                );
                return Err(MatchError::RequiredSetUnmet { index, options });
            }
        }
    }

    debug!("All required credential sets satisfied");
    Ok(())
}

fn summarize(matches: &DcqlClaimMatches) -> IndexMap<&str, Vec<&str>> {
    matches
        .iter()
        .map(|(id, results)| {
            let ids = results.iter().map(|result| result.credential.id()).collect();
            (id.as_str(), ids)
        })
        .collect()
}
