//! Claims path pointers and their resolution against credential claim data.
//!
//! A claims path is a non-empty array whose elements are object keys
//! (strings), array indices (non-negative integers) or the array wildcard
//! (`null`). See: <https://openid.net/specs/openid-4-verifiable-presentations-1_0.html#section-7>
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::trace;

/// A single element of a claims path pointer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum ClaimPathSegment {
    /// Selects the value of an object member.
    Key(String),
    /// Selects every element of an array.
    Wildcard,
    /// Selects the array element at the given position.
    Index(usize),
}

impl ClaimPathSegment {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl From<&str> for ClaimPathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_owned())
    }
}

impl From<String> for ClaimPathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for ClaimPathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for ClaimPathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => key.fmt(f),
            Self::Wildcard => f.write_str("*"),
            Self::Index(index) => index.fmt(f),
        }
    }
}

/// Renders a claims path as a dotted string, e.g. `credentialSubject.address.0`.
pub fn path_to_string(path: &[ClaimPathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Returns `true` if any segment of the path is the array wildcard.
pub fn has_wildcard(path: &[ClaimPathSegment]) -> bool {
    path.iter().any(ClaimPathSegment::is_wildcard)
}

/// Resolves a claims path to a single value.
///
/// Keys index into objects and indices into arrays; any other combination,
/// a missing key, or an out-of-range index yields `None`. A wildcard segment
/// never resolves here, use [select] for wildcard-aware traversal. A JSON
/// `null` at the end of the path counts as absent.
pub fn resolve<'a>(data: &'a Json, path: &[ClaimPathSegment]) -> Option<&'a Json> {
    let mut current = data;
    for segment in path {
        current = match (segment, current) {
            (ClaimPathSegment::Key(key), Json::Object(members)) => members.get(key)?,
            (ClaimPathSegment::Index(index), Json::Array(items)) => items.get(*index)?,
            _ => return None,
        };
    }

    (!current.is_null()).then_some(current)
}

/// Selects every node addressed by a claims path.
///
/// A wildcard applied to an array fans out to all of its elements; applied to
/// anything else it selects nothing. `null` nodes are dropped from the result.
pub fn select<'a>(data: &'a Json, path: &[ClaimPathSegment]) -> Vec<&'a Json> {
    let mut nodes = vec![data];
    for segment in path {
        nodes = nodes
            .into_iter()
            .flat_map(|node| step(node, segment))
            .collect();
        if nodes.is_empty() {
            break;
        }
    }

    nodes.retain(|node| !node.is_null());
    nodes
}

fn step<'a>(node: &'a Json, segment: &ClaimPathSegment) -> Vec<&'a Json> {
    match (segment, node) {
        (ClaimPathSegment::Key(key), Json::Object(members)) => {
            members.get(key).into_iter().collect()
        }
        (ClaimPathSegment::Index(index), Json::Array(items)) => {
            items.get(*index).into_iter().collect()
        }
        (ClaimPathSegment::Wildcard, Json::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    }
}

/// Selects every node addressed by a claims path, requiring every element a
/// wildcard visits to reach a non-`null` node.
///
/// Returns `None` if any such element misses the rest of the path, or if a
/// wildcard is applied to an empty array or a non-array.
pub fn select_every<'a>(data: &'a Json, path: &[ClaimPathSegment]) -> Option<Vec<&'a Json>> {
    let Some((segment, rest)) = path.split_first() else {
        return (!data.is_null()).then(|| vec![data]);
    };

    match (segment, data) {
        (ClaimPathSegment::Key(key), Json::Object(members)) => {
            select_every(members.get(key)?, rest)
        }
        (ClaimPathSegment::Index(index), Json::Array(items)) => {
            select_every(items.get(*index)?, rest)
        }
        (ClaimPathSegment::Wildcard, Json::Array(items)) if !items.is_empty() => {
            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                nodes.extend(select_every(item, rest)?);
            }
            Some(nodes)
        }
        _ => None,
    }
}

/// How a claims path containing the array wildcard (`null`) is evaluated.
///
/// Paths without a wildcard always resolve to at most one value and are
/// unaffected by this policy.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ArrayWildcardPolicy {
    /// A path with a wildcard never matches.
    Reject,
    /// At least one selected element must satisfy the claim.
    #[default]
    Any,
    /// Every element a wildcard fans out to must reach the rest of the path
    /// and satisfy the claim, and the array must not be empty.
    All,
}

impl ArrayWildcardPolicy {
    /// Evaluates a claim at `path`, returning the nodes that satisfied `accept`.
    ///
    /// Returns `None` when the claim is not satisfied.
    pub fn evaluate<'a, F>(
        &self,
        data: &'a Json,
        path: &[ClaimPathSegment],
        accept: F,
    ) -> Option<Vec<&'a Json>>
    where
        F: Fn(&Json) -> bool,
    {
        if !has_wildcard(path) {
            return resolve(data, path)
                .filter(|value| accept(*value))
                .map(|value| vec![value]);
        }

        match self {
            Self::Reject => {
                trace!(
                    "Wildcard path {} rejected by array wildcard policy",
                    path_to_string(path)
                );
                None
            }
            Self::Any => {
                let accepted: Vec<_> = select(data, path)
                    .into_iter()
                    .filter(|value| accept(*value))
                    .collect();
                (!accepted.is_empty()).then_some(accepted)
            }
            Self::All => select_every(data, path)
                .filter(|nodes| nodes.iter().all(|value| accept(*value))),
        }
    }
}
