use crate::{
    error::Error,
    traits::FieldValue,
    value::{Record, Value},
};
use serde::Serialize;
use serde_json::{Map, Number, Value as JsonValue};

impl Value {
    /// Snapshot a `merge_json` field.
    ///
    /// Emptiness follows the `FieldValue` snapshot, so an absent option is
    /// still `Null`. Anything else becomes a [`Document`] written by the
    /// value's own `Serialize` impl. Struct documents drop their top-level
    /// `null` members, which a JSON merge patch would read as deletions.
    #[must_use]
    pub fn document<T>(value: &T) -> Self
    where
        T: FieldValue + Serialize + ?Sized,
    {
        let snapshot = value.to_value();
        if snapshot.is_empty() {
            return snapshot;
        }

        let document = Document::new(value);
        if snapshot.deref_present().as_record().is_some() {
            Self::Document(document.without_nulls())
        } else {
            Self::Document(document)
        }
    }

    /// JSON form of this value.
    ///
    /// Records render their snapshot fields by name; documents render as
    /// serialized, or `null` if serialization failed. Non-finite floats
    /// become `null`.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Present(inner) => inner.to_json(),
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(n) => JsonValue::from(*n),
            Self::Uint(n) => JsonValue::from(*n),
            Self::Float(x) => Number::from_f64(*x).map_or(JsonValue::Null, JsonValue::Number),
            Self::Text(s) => JsonValue::String(s.clone()),
            Self::List(xs) => JsonValue::Array(xs.iter().map(Self::to_json).collect()),
            Self::Map(entries) => JsonValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Self::Record(record) => JsonValue::Object(record.to_json_object()),
            Self::Document(document) => document.json().cloned().unwrap_or(JsonValue::Null),
        }
    }

    /// Snapshot a JSON document.
    #[must_use]
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::Uint(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or_default())
                }
            }
            JsonValue::String(s) => Self::Text(s.clone()),
            JsonValue::Array(xs) => Self::List(xs.iter().map(Self::from_json).collect()),
            JsonValue::Object(entries) => Self::Map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl Record {
    /// Snapshot fields keyed by field name.
    #[must_use]
    pub fn to_json_object(&self) -> Map<String, JsonValue> {
        self.fields()
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.to_json()))
            .collect()
    }
}

///
/// Document
///
/// Output of `serde_json::to_value`, or the message of the error it raised.
/// Errors surface when the document is bound, not when it is snapshotted.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Document(Result<JsonValue, String>);

impl Document {
    #[must_use]
    pub fn new<T: Serialize + ?Sized>(value: &T) -> Self {
        Self(serde_json::to_value(value).map_err(|err| err.to_string()))
    }

    /// Drop `null` members when the document is an object.
    #[must_use]
    pub fn without_nulls(mut self) -> Self {
        if let Ok(JsonValue::Object(members)) = &mut self.0 {
            members.retain(|_, member| !member.is_null());
        }

        self
    }

    pub fn json(&self) -> Result<&JsonValue, Error> {
        self.0
            .as_ref()
            .map_err(|message| Error::SerializationFailure {
                message: message.clone(),
            })
    }
}
