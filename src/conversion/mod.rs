//! Decoding rows into Rust types.
//!
//! This module provides the [`FromDatum`] trait and implementations for
//! converting generic [`Datum`] values into Rust types:
//! - primitives, `String`, `Option<T>`
//! - `Vec<T>`, `BTreeMap<String, T>`, `HashMap<String, T>`
//! - tuples, decoded from arrays
//! - `Datum` itself, which captures the row unchanged
//! - caller records, through [`impl_from_datum!`](crate::impl_from_datum)

mod binary;
mod primitives;
mod record;

#[cfg(feature = "with-chrono")]
mod chrono;
#[cfg(feature = "with-serde-json")]
mod json;
#[cfg(feature = "with-uuid")]
mod uuid;

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::value::Datum;

pub use binary::Binary;
#[cfg(feature = "with-serde-json")]
pub use json::Json;
pub use record::Record;

/// Trait for decoding a [`Datum`] into a Rust type.
///
/// Call [`decode()`] rather than the methods directly: it routes null values
/// to [`from_null()`](Self::from_null).
pub trait FromDatum: Sized {
    /// Decode from a null value.
    ///
    /// Default implementation returns an error. Override for types that can
    /// represent null (like `Option<T>`).
    fn from_null() -> Result<Self> {
        Err(Error::Decode("unexpected null value".into()))
    }

    /// Decode from a non-null value.
    fn from_datum(datum: &Datum) -> Result<Self>;
}

/// Decode a value, dispatching null to [`FromDatum::from_null`].
pub fn decode<T: FromDatum>(datum: &Datum) -> Result<T> {
    match datum {
        Datum::Null => T::from_null(),
        other => T::from_datum(other),
    }
}

/// Prefix decode errors with where they happened.
pub(crate) fn with_context<T>(result: Result<T>, context: impl FnOnce() -> String) -> Result<T> {
    result.map_err(|e| match e {
        Error::Decode(msg) => Error::Decode(format!("{}: {}", context(), msg)),
        other => other,
    })
}

// === Opaque capture ===

impl FromDatum for Datum {
    fn from_null() -> Result<Self> {
        Ok(Datum::Null)
    }

    fn from_datum(datum: &Datum) -> Result<Self> {
        Ok(datum.clone())
    }
}

// === Option<T> - null handling ===

impl<T: FromDatum> FromDatum for Option<T> {
    fn from_null() -> Result<Self> {
        Ok(None)
    }

    fn from_datum(datum: &Datum) -> Result<Self> {
        T::from_datum(datum).map(Some)
    }
}

// === Collections ===

impl<T: FromDatum> FromDatum for Vec<T> {
    fn from_datum(datum: &Datum) -> Result<Self> {
        let items = datum
            .as_array()
            .ok_or_else(|| Error::decode_mismatch("array", datum))?;
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| with_context(decode(item), || format!("[{}]", idx)))
            .collect()
    }
}

impl<T: FromDatum> FromDatum for BTreeMap<String, T> {
    fn from_datum(datum: &Datum) -> Result<Self> {
        let fields = datum
            .as_object()
            .ok_or_else(|| Error::decode_mismatch("object", datum))?;
        fields
            .iter()
            .map(|(key, value)| {
                let value = with_context(decode(value), || format!("key `{}`", key))?;
                Ok((key.clone(), value))
            })
            .collect()
    }
}

impl<T: FromDatum> FromDatum for HashMap<String, T> {
    fn from_datum(datum: &Datum) -> Result<Self> {
        let fields = datum
            .as_object()
            .ok_or_else(|| Error::decode_mismatch("object", datum))?;
        fields
            .iter()
            .map(|(key, value)| {
                let value = with_context(decode(value), || format!("key `{}`", key))?;
                Ok((key.clone(), value))
            })
            .collect()
    }
}

// === Tuple implementations ===

macro_rules! impl_from_datum_tuple {
    ($count:literal: $($idx:tt => $T:ident),+) => {
        impl<$($T: FromDatum),+> FromDatum for ($($T,)+) {
            fn from_datum(datum: &Datum) -> Result<Self> {
                let items = datum
                    .as_array()
                    .ok_or_else(|| Error::decode_mismatch("array", datum))?;
                if items.len() < $count {
                    return Err(Error::Decode("not enough elements for tuple".into()));
                }
                Ok(($(
                    with_context(decode::<$T>(&items[$idx]), || format!("[{}]", $idx))?,
                )+))
            }
        }
    };
}

impl_from_datum_tuple!(1: 0 => T1);
impl_from_datum_tuple!(2: 0 => T1, 1 => T2);
impl_from_datum_tuple!(3: 0 => T1, 1 => T2, 2 => T3);
impl_from_datum_tuple!(4: 0 => T1, 1 => T2, 2 => T3, 3 => T4);
impl_from_datum_tuple!(5: 0 => T1, 1 => T2, 2 => T3, 3 => T4, 4 => T5);
impl_from_datum_tuple!(6: 0 => T1, 1 => T2, 2 => T3, 3 => T4, 4 => T5, 5 => T6);
