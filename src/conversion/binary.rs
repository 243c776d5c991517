//! Binary pseudo-type.

use base64::Engine;

use crate::error::{Error, Result};
use crate::value::Datum;

use super::FromDatum;

/// Bytes stored as a `BINARY` pseudo-type: `{"$reql_type$": "BINARY", "data": "<base64>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Binary(pub Vec<u8>);

impl Binary {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Binary {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromDatum for Binary {
    fn from_datum(datum: &Datum) -> Result<Self> {
        if datum.reql_type() != Some("BINARY") {
            return Err(Error::decode_mismatch("BINARY pseudo-type", datum));
        }
        let data = datum
            .get("data")
            .and_then(Datum::as_str)
            .ok_or_else(|| Error::Decode("BINARY pseudo-type without data".into()))?;
        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map(Binary)
            .map_err(|e| Error::Decode(format!("invalid base64: {}", e)))
    }
}
