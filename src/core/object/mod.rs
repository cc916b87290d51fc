use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// An untyped (JSON) Object from which [TypedParameters](TypedParameter) can be parsed.
///
/// Represents an authorization request object as received by the wallet,
/// from which the `dcql_query` parameter is taken.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UntypedObject(pub(crate) Map<String, Json>);

/// A strongly typed parameter that can be stored in an [UntypedObject].
pub trait TypedParameter:
    TryFrom<Json, Error = anyhow::Error> + TryInto<Json> + Clone + std::fmt::Debug
{
    const KEY: &'static str;
}

impl UntypedObject {
    /// Get the raw JSON value stored under `key`.
    pub fn get_raw(&self, key: &str) -> Option<&Json> {
        self.0.get(key)
    }

    /// Get a [TypedParameter] from the Object.
    ///
    /// Note that this method clones the underlying data.
    pub fn get<T: TypedParameter>(&self) -> Option<Result<T>> {
        Some(self.0.get(T::KEY)?.clone().try_into())
    }

    /// Remove a [TypedParameter] from the Object.
    pub fn remove<T: TypedParameter>(&mut self) -> Option<Result<T>> {
        Some(self.0.remove(T::KEY)?.try_into())
    }

    /// Insert a [TypedParameter].
    ///
    /// Returns the existing [TypedParameter] if one already exists.
    ///
    /// # Errors
    /// Returns an error if `t` could not be serialized, or if there was already
    /// an entry in the Object that could not be parsed.
    pub fn insert<T: TypedParameter>(&mut self, t: T) -> Option<Result<T>> {
        match t.try_into() {
            Err(_) => Some(Err(Error::msg("failed to serialize typed parameter"))),
            Ok(value) => Some(self.0.insert(T::KEY.to_owned(), value)?.try_into()),
        }
    }
}

impl From<Map<String, Json>> for UntypedObject {
    fn from(value: Map<String, Json>) -> Self {
        Self(value)
    }
}

impl TryFrom<Json> for UntypedObject {
    type Error = Error;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        match value {
            Json::Object(map) => Ok(Self(map)),
            other => Err(Error::msg(format!("expected a JSON object, found {other}"))),
        }
    }
}

impl From<UntypedObject> for Json {
    fn from(value: UntypedObject) -> Self {
        value.0.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::core::dcql_query::DcqlQuery;

    #[test]
    fn typed_parameter_round_trip() {
        let query_json = json!({
            "credentials": [{ "id": "mdl", "format": "mso_mdoc", "meta": {} }]
        });
        let query: DcqlQuery = serde_json::from_value(query_json.clone()).unwrap();

        let mut object = UntypedObject::default();
        assert!(object.insert(query.clone()).is_none());
        assert_eq!(object.get_raw("dcql_query"), Some(&query_json));

        let parsed: DcqlQuery = object.get().unwrap().unwrap();
        assert_eq!(parsed, query);

        let removed: DcqlQuery = object.remove().unwrap().unwrap();
        assert_eq!(removed, query);
        assert!(object.get::<DcqlQuery>().is_none());
    }

    #[test]
    fn invalid_typed_parameter() {
        let object = UntypedObject::try_from(json!({
            "dcql_query": { "credentials": [{ "id": "a b", "format": "mso_mdoc" }] }
        }))
        .unwrap();

        let err = object.get::<DcqlQuery>().unwrap().unwrap_err();
        assert!(err.to_string().contains("invalid identifier"));

        assert!(UntypedObject::try_from(json!([1])).is_err());
    }
}
