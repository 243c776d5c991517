//! Structural decoding of objects into caller-defined records.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::value::Datum;

use super::{FromDatum, decode, with_context};

static NULL: Datum = Datum::Null;

/// Field accessor over an object row.
///
/// Used by [`impl_from_datum!`](crate::impl_from_datum), and directly by
/// hand-written [`FromDatum`] implementations.
///
/// ```
/// use zero_cursor::conversion::Record;
/// use zero_cursor::{Datum, FromDatum, Result};
///
/// struct Hero {
///     name: String,
///     power: Option<u32>,
/// }
///
/// impl FromDatum for Hero {
///     fn from_datum(datum: &Datum) -> Result<Self> {
///         let record = Record::new(datum)?;
///         Ok(Hero {
///             name: record.field("name")?,
///             power: record.field("power")?,
///         })
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    fields: &'a BTreeMap<String, Datum>,
}

impl<'a> Record<'a> {
    /// Wrap an object. Fails for any other kind of value.
    pub fn new(datum: &'a Datum) -> Result<Self> {
        datum
            .as_object()
            .map(|fields| Self { fields })
            .ok_or_else(|| Error::decode_mismatch("object", datum))
    }

    /// Decode the field stored under `key`.
    ///
    /// A missing key decodes like a null value, so `Option` fields may be absent.
    pub fn field<T: FromDatum>(&self, key: &str) -> Result<T> {
        match self.fields.get(key) {
            Some(value) => with_context(decode(value), || format!("field `{}`", key)),
            None => T::from_null()
                .map_err(|_| Error::Decode(format!("missing field `{}`", key))),
        }
    }

    /// Raw value of a field, `Datum::Null` when absent.
    pub fn get(&self, key: &str) -> &'a Datum {
        self.fields.get(key).unwrap_or(&NULL)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Implement [`FromDatum`] for a struct by matching object keys to fields.
///
/// Each field is looked up under its own name, or under the key given after
/// `=>`. Field types decode through [`FromDatum`], so nested records, `Option`
/// and collections work as fields. Unlisted keys are ignored.
///
/// ```
/// use zero_cursor::impl_from_datum;
///
/// struct Address {
///     city: String,
/// }
/// impl_from_datum!(Address { city });
///
/// struct User {
///     id: String,
///     name: Option<String>,
///     address: Address,
/// }
/// impl_from_datum!(User {
///     id,
///     name => "full_name",
///     address => "addr",
/// });
/// ```
#[macro_export]
macro_rules! impl_from_datum {
    ($ty:ident { $($field:ident $(=> $key:literal)?),+ $(,)? }) => {
        impl $crate::FromDatum for $ty {
            fn from_datum(datum: &$crate::Datum) -> $crate::Result<Self> {
                let record = $crate::conversion::Record::new(datum)?;
                Ok(Self {
                    $(
                        $field: record.field($crate::__datum_field_key!($field $(=> $key)?))?,
                    )+
                })
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __datum_field_key {
    ($field:ident => $key:literal) => {
        $key
    };
    ($field:ident) => {
        stringify!($field)
    };
}
