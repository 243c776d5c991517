//! Chrono crate type implementations (DateTime<Utc>, DateTime<FixedOffset>).

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{Error, Result};
use crate::value::Datum;

use super::FromDatum;

/// Milliseconds per second; times carry millisecond precision.
const MILLIS_PER_SEC: f64 = 1000.0;

/// Parse a `+HH:MM` / `-HH:MM` offset.
fn parse_offset(tz: &str) -> Result<FixedOffset> {
    let invalid = || Error::Decode(format!("invalid timezone: {:?}", tz));
    if tz == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }
    let (sign, rest) = match tz.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => return Err(invalid()),
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Decode a `TIME` pseudo-type:
/// `{"$reql_type$": "TIME", "epoch_time": 1.5e9, "timezone": "+00:00"}`.
fn decode_time(datum: &Datum) -> Result<DateTime<FixedOffset>> {
    if datum.reql_type() != Some("TIME") {
        return Err(Error::decode_mismatch("TIME pseudo-type", datum));
    }
    let epoch = datum
        .get("epoch_time")
        .and_then(Datum::as_f64)
        .filter(|e| e.is_finite())
        .ok_or_else(|| Error::Decode("TIME pseudo-type without epoch_time".into()))?;
    let offset = match datum.get("timezone").and_then(Datum::as_str) {
        Some(tz) => parse_offset(tz)?,
        None => parse_offset("+00:00")?,
    };

    let millis = (epoch * MILLIS_PER_SEC).round();
    if millis < i64::MIN as f64 || millis > i64::MAX as f64 {
        return Err(Error::Decode("time overflow".into()));
    }
    let utc = DateTime::<Utc>::from_timestamp_millis(millis as i64)
        .ok_or_else(|| Error::Decode("time overflow".into()))?;
    Ok(utc.with_timezone(&offset))
}

impl FromDatum for DateTime<FixedOffset> {
    fn from_datum(datum: &Datum) -> Result<Self> {
        decode_time(datum)
    }
}

impl FromDatum for DateTime<Utc> {
    fn from_datum(datum: &Datum) -> Result<Self> {
        decode_time(datum).map(|t| t.with_timezone(&Utc))
    }
}
