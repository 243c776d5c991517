//! Cursor options.

use url::Url;

use crate::error::Error;
use crate::value::Datum;

/// Options for a result cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    /// Number of row slots to reserve in the local buffer up front.
    ///
    /// Default: `0`
    pub initial_capacity: usize,

    /// Close the cursor (stopping the server-side query) when it is dropped while still open.
    ///
    /// Default: `true`
    pub close_on_drop: bool,

    /// Upper bound on rows per batch requested from the server.
    ///
    /// Default: `None`
    pub max_batch_rows: Option<u64>,

    /// Upper bound on bytes per batch requested from the server.
    ///
    /// Default: `None`
    pub max_batch_bytes: Option<u64>,

    /// Upper bound on seconds the server may spend filling one batch.
    ///
    /// Default: `None`
    pub max_batch_seconds: Option<f64>,

    /// Divisor applied by the server to the size of the first batch.
    ///
    /// Default: `None`
    pub first_batch_scaledown_factor: Option<u64>,

    /// Additional parameters passed through to the fetcher.
    ///
    /// Default: `[]`
    pub params: Vec<(String, String)>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            close_on_drop: true,
            max_batch_rows: None,
            max_batch_bytes: None,
            max_batch_seconds: None,
            first_batch_scaledown_factor: None,
            params: Vec::new(),
        }
    }
}

impl Opts {
    /// Batch size hints as `(name, value)` pairs, for fetchers to attach to
    /// their continue requests. Unset hints are omitted.
    pub fn batch_optargs(&self) -> Vec<(&'static str, Datum)> {
        let mut args = Vec::new();
        if let Some(rows) = self.max_batch_rows {
            args.push(("max_batch_rows", Datum::Number(rows as f64)));
        }
        if let Some(bytes) = self.max_batch_bytes {
            args.push(("max_batch_bytes", Datum::Number(bytes as f64)));
        }
        if let Some(seconds) = self.max_batch_seconds {
            args.push(("max_batch_seconds", Datum::Number(seconds)));
        }
        if let Some(factor) = self.first_batch_scaledown_factor {
            args.push(("first_batch_scaledown_factor", Datum::Number(factor as f64)));
        }
        args
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u64, Error> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::InvalidUsage(format!(
            "Invalid {}: expected a positive integer, got {}",
            key, value
        ))),
    }
}

impl TryFrom<&Url> for Opts {
    type Error = Error;

    /// Parse cursor options from a connection URL.
    ///
    /// Format: `rethinkdb://[user[:password]@]host[:port][/database][?param1=value1&..]`
    ///
    /// Only the query string is read; host and credentials belong to the transport.
    ///
    /// Supported query parameters:
    /// - `initial_capacity`: non-negative integer
    /// - `close_on_drop`: true/True/1/yes/on or false/False/0/no/off
    /// - `max_batch_rows`, `max_batch_bytes`, `first_batch_scaledown_factor`: positive integer
    /// - `max_batch_seconds`: positive number
    fn try_from(url: &Url) -> Result<Self, Self::Error> {
        if !["rethinkdb", "reql"].contains(&url.scheme()) {
            return Err(Error::InvalidUsage(format!(
                "Invalid scheme: expected 'rethinkdb://' or 'reql://', got '{}://'",
                url.scheme()
            )));
        }

        let mut opts = Opts::default();

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "initial_capacity" => {
                    opts.initial_capacity = value.parse().map_err(|_| {
                        Error::InvalidUsage(format!("Invalid initial_capacity: {}", value))
                    })?;
                }
                "close_on_drop" => {
                    opts.close_on_drop = match value.as_ref() {
                        "true" | "True" | "1" | "yes" | "on" => true,
                        "false" | "False" | "0" | "no" | "off" => false,
                        _ => {
                            return Err(Error::InvalidUsage(format!(
                                "Invalid close_on_drop: {}",
                                value
                            )));
                        }
                    };
                }
                "max_batch_rows" => {
                    opts.max_batch_rows = Some(parse_positive(&key, &value)?);
                }
                "max_batch_bytes" => {
                    opts.max_batch_bytes = Some(parse_positive(&key, &value)?);
                }
                "first_batch_scaledown_factor" => {
                    opts.first_batch_scaledown_factor = Some(parse_positive(&key, &value)?);
                }
                "max_batch_seconds" => {
                    let seconds = value
                        .parse::<f64>()
                        .ok()
                        .filter(|s| s.is_finite() && *s > 0.0)
                        .ok_or_else(|| {
                            Error::InvalidUsage(format!("Invalid max_batch_seconds: {}", value))
                        })?;
                    opts.max_batch_seconds = Some(seconds);
                }
                _ => {
                    opts.params.push((key.to_string(), value.to_string()));
                }
            }
        }

        Ok(opts)
    }
}

impl TryFrom<&str> for Opts {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let url = Url::parse(s).map_err(|e| Error::InvalidUsage(format!("Invalid URL: {}", e)))?;
        Self::try_from(&url)
    }
}
