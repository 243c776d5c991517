//! serde_json interop.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};
use crate::value::Datum;

use super::FromDatum;

/// Decode a row through serde, for types that implement `Deserialize`.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl From<Value> for Datum {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Datum::Null,
            Value::Bool(b) => Datum::Bool(b),
            Value::Number(n) => Datum::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Datum::String(s),
            Value::Array(items) => Datum::Array(items.into_iter().map(Datum::from).collect()),
            Value::Object(fields) => Datum::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Datum::from(v)))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }
}

fn to_value(datum: &Datum) -> Result<Value> {
    Ok(match datum {
        Datum::Null => Value::Null,
        Datum::Bool(b) => Value::Bool(*b),
        Datum::Number(n) => {
            // Whole numbers become JSON integers so serde can decode them as ints.
            if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
                Value::Number(Number::from(*n as i64))
            } else {
                Value::Number(
                    Number::from_f64(*n)
                        .ok_or_else(|| Error::Decode(format!("non-finite number: {}", n)))?,
                )
            }
        }
        Datum::String(s) => Value::String(s.clone()),
        Datum::Array(items) => Value::Array(items.iter().map(to_value).collect::<Result<_>>()?),
        Datum::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(k, v)| Ok((k.clone(), to_value(v)?)))
                .collect::<Result<Map<_, _>>>()?,
        ),
    })
}

impl FromDatum for Value {
    fn from_null() -> Result<Self> {
        Ok(Value::Null)
    }

    fn from_datum(datum: &Datum) -> Result<Self> {
        to_value(datum)
    }
}

impl<T: DeserializeOwned> FromDatum for Json<T> {
    fn from_null() -> Result<Self> {
        serde_json::from_value(Value::Null)
            .map(Json)
            .map_err(|e| Error::Decode(e.to_string()))
    }

    fn from_datum(datum: &Datum) -> Result<Self> {
        serde_json::from_value(to_value(datum)?)
            .map(Json)
            .map_err(|e| Error::Decode(e.to_string()))
    }
}
