//! Generic structured values carried by result rows.

use std::collections::BTreeMap;

/// Key marking an object as a pseudo-type (`TIME`, `BINARY`, ...).
pub const REQL_TYPE_KEY: &str = "$reql_type$";

/// A decoded row payload.
///
/// Rows arrive from the transport already parsed into this generic shape. The
/// [`FromDatum`](crate::FromDatum) trait turns them into caller types.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Datum {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Datum>),
    Object(BTreeMap<String, Datum>),
}

impl Datum {
    /// Name of the value's kind, used in decode error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Datum::Null => "null",
            Datum::Bool(_) => "bool",
            Datum::Number(_) => "number",
            Datum::String(_) => "string",
            Datum::Array(_) => "array",
            Datum::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Datum]> {
        match self {
            Datum::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Datum>> {
        match self {
            Datum::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Look up a field of an object. Returns `None` for non-objects.
    pub fn get(&self, key: &str) -> Option<&Datum> {
        self.as_object().and_then(|fields| fields.get(key))
    }

    /// The pseudo-type name if this object is a pseudo-type (`TIME`, `BINARY`, ...).
    pub fn reql_type(&self) -> Option<&str> {
        self.get(REQL_TYPE_KEY).and_then(Datum::as_str)
    }
}

impl From<bool> for Datum {
    fn from(value: bool) -> Self {
        Datum::Bool(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Number(value)
    }
}

impl From<i32> for Datum {
    fn from(value: i32) -> Self {
        Datum::Number(f64::from(value))
    }
}

impl From<u32> for Datum {
    fn from(value: u32) -> Self {
        Datum::Number(f64::from(value))
    }
}

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::String(value.to_string())
    }
}

impl From<String> for Datum {
    fn from(value: String) -> Self {
        Datum::String(value)
    }
}

impl<T: Into<Datum>> From<Vec<T>> for Datum {
    fn from(value: Vec<T>) -> Self {
        Datum::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(value: Option<T>) -> Self {
        value.map_or(Datum::Null, Into::into)
    }
}

impl From<BTreeMap<String, Datum>> for Datum {
    fn from(value: BTreeMap<String, Datum>) -> Self {
        Datum::Object(value)
    }
}

impl<K: Into<String>, V: Into<Datum>> FromIterator<(K, V)> for Datum {
    /// Build an object from key/value pairs.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Datum::Object(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
