use serde_json::Value as Json;
use tracing::debug;

use crate::core::{
    dcql_query::DcqlQuery,
    object::{TypedParameter, UntypedObject},
};

pub use crate::core::dcql_query::ParseError;

/// How much of [DcqlQuery::validate] a parse runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validation {
    Full,
    /// Credential sets may reference undeclared Credential Query ids.
    Lenient,
}

/// Parses and validates DCQL queries.
///
/// Every entry point deserializes the query (interpreting each `meta` against
/// its `format`) and then validates it, so a returned query is always
/// structurally sound. The `*_lenient` variants accept credential sets that
/// name undeclared Credential Query ids; matching then treats those ids as
/// never satisfied.
pub struct DcqlParser;

impl DcqlParser {
    /// Parses a DCQL query from its JSON text.
    pub fn parse(json: &str) -> Result<DcqlQuery, ParseError> {
        Self::validated(Self::deserialize_str(json)?, Validation::Full)
    }

    /// Like [DcqlParser::parse], without checking credential set references.
    pub fn parse_lenient(json: &str) -> Result<DcqlQuery, ParseError> {
        Self::validated(Self::deserialize_str(json)?, Validation::Lenient)
    }

    /// Parses a DCQL query from an already decoded JSON value.
    pub fn parse_value(value: Json) -> Result<DcqlQuery, ParseError> {
        Self::validated(Self::deserialize_value(value)?, Validation::Full)
    }

    /// Like [DcqlParser::parse_value], without checking credential set references.
    pub fn parse_value_lenient(value: Json) -> Result<DcqlQuery, ParseError> {
        Self::validated(Self::deserialize_value(value)?, Validation::Lenient)
    }

    /// Extracts the `dcql_query` parameter of an authorization request.
    ///
    /// The parameter may be an embedded object or, as in URL-encoded
    /// requests, a JSON-encoded string.
    pub fn from_request(request: &UntypedObject) -> Result<DcqlQuery, ParseError> {
        match request.get_raw(DcqlQuery::KEY) {
            None => Err(ParseError::MissingParameter(DcqlQuery::KEY)),
            Some(Json::String(encoded)) => Self::parse(encoded),
            Some(value) => Self::parse_value(value.clone()),
        }
    }

    fn deserialize_str(json: &str) -> Result<DcqlQuery, ParseError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let query = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|e| ParseError::malformed(e.path(), e.inner()))?;
        deserializer
            .end()
            .map_err(|e| ParseError::malformed(".", e))?;
        Ok(query)
    }

    fn deserialize_value(value: Json) -> Result<DcqlQuery, ParseError> {
        serde_path_to_error::deserialize(value)
            .map_err(|e| ParseError::malformed(e.path(), e.inner()))
    }

    fn validated(query: DcqlQuery, validation: Validation) -> Result<DcqlQuery, ParseError> {
        match validation {
            Validation::Full => query.validate()?,
            Validation::Lenient => query.validate_credentials()?,
        }
        debug!(
            "Parsed DCQL query with {} credential queries and {} credential sets",
            query.credentials().len(),
            query.credential_sets().map_or(0, |sets| sets.len())
        );
        Ok(query)
    }
}
