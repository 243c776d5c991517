//! UUID type implementation.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::value::Datum;

use super::FromDatum;

impl FromDatum for Uuid {
    fn from_datum(datum: &Datum) -> Result<Self> {
        let s = datum
            .as_str()
            .ok_or_else(|| Error::decode_mismatch("uuid string", datum))?;
        Uuid::parse_str(s).map_err(|e| Error::Decode(format!("invalid UUID: {}", e)))
    }
}
