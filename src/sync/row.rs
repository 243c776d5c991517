//! Single-row access.

use crate::conversion::FromDatum;
use crate::error::{Error, Result};
use crate::fetcher::BatchFetcher;

use super::Cursor;

/// The result of a query expected to produce at most one row.
///
/// Holds either a cursor or the error that prevented creating one.
pub struct Row<F: BatchFetcher> {
    inner: Result<Cursor<F>>,
}

impl<F: BatchFetcher> Row<F> {
    pub fn new(cursor: Cursor<F>) -> Self {
        Self { inner: Ok(cursor) }
    }

    /// A row that fails every scan with `err`.
    pub fn from_error(err: Error) -> Self {
        Self { inner: Err(err) }
    }

    /// Decode the first row, then close the cursor.
    ///
    /// Any rows after the first are discarded. The cursor is closed on every
    /// path; a failure to close it after a successful decode is only logged.
    ///
    /// # Errors
    ///
    /// - the error this row was created with
    /// - [`Error::NoRows`] if the query produced no rows
    /// - the fetch error if reading the first row failed
    /// - the decode error if the row does not match `T`
    pub fn scan<T: FromDatum>(self) -> Result<T> {
        let mut cursor = self.inner?;

        let result = if cursor.next() {
            cursor.scan()
        } else {
            Err(cursor.take_err().unwrap_or(Error::NoRows))
        };

        if let Err(err) = cursor.close() {
            tracing::warn!("query {}: failed to stop: {}", cursor.token(), err);
        }
        result
    }

    /// Like [`scan()`](Self::scan), but an empty result is `Ok(None)`.
    pub fn scan_optional<T: FromDatum>(self) -> Result<Option<T>> {
        match self.scan() {
            Ok(value) => Ok(Some(value)),
            Err(Error::NoRows) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl<F: BatchFetcher> From<Result<Cursor<F>>> for Row<F> {
    fn from(result: Result<Cursor<F>>) -> Self {
        Self { inner: result }
    }
}
