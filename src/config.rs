use serde::{Deserialize, Serialize};

use crate::core::claims_path::ArrayWildcardPolicy;

/// Matcher configuration.
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct MatcherConfig {
    /// When the query has no `credential_sets`, require every Credential Query
    /// to produce at least one match.
    ///
    /// Disabled by default: without credential sets, a query that matched
    /// nothing is left out of the result and the match still succeeds.
    pub strict_when_no_sets: bool,

    /// How claims paths containing the array wildcard (`null`) are evaluated.
    pub array_wildcard: ArrayWildcardPolicy,
}

impl MatcherConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_strict_when_no_sets(mut self, strict: bool) -> Self {
        self.strict_when_no_sets = strict;
        self
    }

    pub fn with_array_wildcard(mut self, policy: ArrayWildcardPolicy) -> Self {
        self.array_wildcard = policy;
        self
    }
}
