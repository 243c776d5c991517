//! Primitive type implementations (bool, integers, floats, strings).

use crate::error::{Error, Result};
use crate::value::Datum;

use super::FromDatum;

// === Boolean ===

impl FromDatum for bool {
    fn from_datum(datum: &Datum) -> Result<Self> {
        datum
            .as_bool()
            .ok_or_else(|| Error::decode_mismatch("bool", datum))
    }
}

// === Strings ===

impl FromDatum for String {
    fn from_datum(datum: &Datum) -> Result<Self> {
        datum
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::decode_mismatch("string", datum))
    }
}

// === Floats ===

impl FromDatum for f64 {
    fn from_datum(datum: &Datum) -> Result<Self> {
        datum
            .as_f64()
            .ok_or_else(|| Error::decode_mismatch("number", datum))
    }
}

impl FromDatum for f32 {
    fn from_datum(datum: &Datum) -> Result<Self> {
        let n = f64::from_datum(datum)?;
        if n.is_finite() && (n < f64::from(f32::MIN) || n > f64::from(f32::MAX)) {
            return Err(Error::Decode(format!("f32 overflow: {}", n)));
        }
        Ok(n as f32)
    }
}

// === Integer types ===

// Numbers travel as doubles; reject fractions and out-of-range values
// instead of truncating.
macro_rules! impl_from_datum_int {
    ($($T:ty),+) => {
        $(
            impl FromDatum for $T {
                fn from_datum(datum: &Datum) -> Result<Self> {
                    let n = f64::from_datum(datum)?;
                    if n.fract() != 0.0 || !n.is_finite() {
                        return Err(Error::Decode(format!(
                            "invalid {}: {}",
                            stringify!($T),
                            n
                        )));
                    }
                    if n < <$T>::MIN as f64 || n >= <$T>::MAX as f64 + 1.0 {
                        return Err(Error::Decode(format!(
                            "{} overflow: {}",
                            stringify!($T),
                            n
                        )));
                    }
                    Ok(n as $T)
                }
            }
        )+
    };
}

impl_from_datum_int!(i8, i16, i32, i64, u8, u16, u32, u64, usize);
