//! Blocking result cursor.

use std::marker::PhantomData;

use crate::conversion::{FromDatum, decode};
use crate::error::{Error, Result};
use crate::fetcher::BatchFetcher;
use crate::opts::Opts;
use crate::protocol::{Batch, QueryToken, Response};
use crate::state::{Action, CursorStateMachine, StreamState};
use crate::value::Datum;

/// Forward-only cursor over the rows of a query.
///
/// The cursor starts before the first row. Each call to [`next()`](Self::next)
/// moves to the next row, fetching another batch through the fetcher when the
/// local buffer runs dry. [`scan()`](Self::scan) decodes the current row.
///
/// # Example
///
/// ```
/// use zero_cursor::sync::Cursor;
/// use zero_cursor::{Batch, Datum, Opts, QueryToken, ReplayFetcher};
///
/// # fn main() -> zero_cursor::Result<()> {
/// let fetcher = ReplayFetcher::new([Batch::last(vec![Datum::from(3)])]);
/// let mut cursor = Cursor::with_first_batch(
///     fetcher,
///     QueryToken(1),
///     Batch::partial(vec![Datum::from(1), Datum::from(2)]),
///     Opts::default(),
/// );
///
/// let mut sum = 0;
/// while cursor.next() {
///     sum += cursor.scan::<i64>()?;
/// }
/// if let Some(err) = cursor.err() {
///     return Err(zero_cursor::Error::Failed(err.to_string()));
/// }
/// assert_eq!(sum, 6);
/// # Ok(())
/// # }
/// ```
pub struct Cursor<F: BatchFetcher> {
    fetcher: F,
    token: QueryToken,
    opts: Opts,
    state: CursorStateMachine,
}

impl<F: BatchFetcher> Cursor<F> {
    /// Create a cursor for a query whose first batch has not been fetched yet.
    pub fn new(fetcher: F, token: QueryToken, opts: Opts) -> Self {
        let state = CursorStateMachine::new(opts.initial_capacity);
        Self {
            fetcher,
            token,
            opts,
            state,
        }
    }

    /// Create a cursor from the first batch of a query.
    pub fn with_first_batch(fetcher: F, token: QueryToken, first: Batch, opts: Opts) -> Self {
        let state = CursorStateMachine::with_batch(first, opts.initial_capacity);
        Self {
            fetcher,
            token,
            opts,
            state,
        }
    }

    /// Create a cursor from the first response of a query.
    ///
    /// Error responses are returned as errors and no cursor is created.
    pub fn from_response(fetcher: F, response: Response, opts: Opts) -> Result<Self> {
        let token = response.token;
        let first = response.into_batch()?;
        Ok(Self::with_first_batch(fetcher, token, first, opts))
    }

    /// Move to the next row.
    ///
    /// Returns true if a row is now current. Returns false when the rows are
    /// exhausted, the cursor was closed, or fetching failed; use
    /// [`err()`](Self::err) to tell these apart. May block for one round trip
    /// per batch.
    #[expect(
        clippy::should_implement_trait,
        reason = "advance-then-scan protocol, see `rows()` for an iterator"
    )]
    pub fn next(&mut self) -> bool {
        loop {
            match self.state.advance() {
                Action::Row => return true,
                Action::Finished => return false,
                Action::Fetch => match self.fetcher.fetch_next(self.token, &self.opts) {
                    Ok(batch) => {
                        tracing::trace!(
                            "query {}: fetched {} rows (final: {})",
                            self.token,
                            batch.len(),
                            batch.is_final()
                        );
                        self.state.receive(batch);
                    }
                    Err(err) => {
                        tracing::debug!("query {}: fetch failed: {}", self.token, err);
                        self.state.fail(err);
                        return false;
                    }
                },
            }
        }
    }

    /// Decode the current row.
    ///
    /// # Errors
    ///
    /// - [`Error::Closed`] if the cursor is closed
    /// - [`Error::NotPositioned`] if there is no current row
    /// - [`Error::Decode`] if the row does not match `T`; the cursor stays usable
    pub fn scan<T: FromDatum>(&self) -> Result<T> {
        if self.state.is_closed() {
            return Err(Error::Closed);
        }
        let row = self.state.current().ok_or(Error::NotPositioned)?;
        decode(row)
    }

    /// Decode the current row into an existing value.
    pub fn scan_into<T: FromDatum>(&self, dest: &mut T) -> Result<()> {
        *dest = self.scan()?;
        Ok(())
    }

    /// The current row, undecoded.
    pub fn current(&self) -> Option<&Datum> {
        self.state.current()
    }

    /// Close the cursor.
    ///
    /// The first call stops the query on the server if it may still be
    /// producing rows. The cursor is closed even if that request fails; its
    /// error is returned. Later calls do nothing.
    pub fn close(&mut self) -> Result<()> {
        if !self.state.close() {
            return Ok(());
        }
        tracing::debug!("query {}: stopping", self.token);
        self.fetcher.abandon(self.token)
    }

    /// The error that stopped iteration, if any.
    pub fn err(&self) -> Option<&Error> {
        self.state.error()
    }

    /// Decode every remaining row into `rows`.
    ///
    /// Stops at the first decode error, leaving the rows decoded so far in
    /// `rows`. A fetch failure is reported as [`Error::Failed`]; the original
    /// error stays available from [`err()`](Self::err). Does not close the cursor.
    pub fn collect_into<T: FromDatum>(&mut self, rows: &mut Vec<T>) -> Result<()> {
        while self.next() {
            rows.push(self.scan()?);
        }
        self.failure()
    }

    /// Decode every remaining row.
    ///
    /// See [`collect_into()`](Self::collect_into) to keep the rows decoded
    /// before an error.
    pub fn all<T: FromDatum>(&mut self) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        self.collect_into(&mut rows)?;
        Ok(rows)
    }

    /// Collect every remaining row undecoded.
    pub fn all_datums(&mut self) -> Result<Vec<Datum>> {
        self.all()
    }

    /// Iterate over the remaining rows, decoding each into `T`.
    pub fn rows<T: FromDatum>(&mut self) -> Rows<'_, F, T> {
        Rows {
            cursor: self,
            done: false,
            _marker: PhantomData,
        }
    }

    /// Decode the first row and close the cursor.
    pub fn one<T: FromDatum>(self) -> Result<T> {
        super::Row::new(self).scan()
    }

    /// Returns true once the cursor is closed, explicitly or after its last row.
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Returns true if the server has sent its final batch.
    pub fn is_exhausted(&self) -> bool {
        matches!(
            self.state.state(),
            StreamState::Exhausted | StreamState::Closed
        )
    }

    /// Number of rows received but not read yet.
    pub fn buffered(&self) -> usize {
        self.state.buffered()
    }

    pub fn token(&self) -> QueryToken {
        self.token
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Get a reference to the fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub(crate) fn take_err(&mut self) -> Option<Error> {
        self.state.take_error()
    }

    fn failure(&self) -> Result<()> {
        match self.err() {
            Some(err) => Err(Error::Failed(err.to_string())),
            None => Ok(()),
        }
    }
}

impl<F: BatchFetcher> Drop for Cursor<F> {
    fn drop(&mut self) {
        if !self.opts.close_on_drop || !self.state.state().is_live() {
            return;
        }
        if let Err(err) = self.close() {
            tracing::warn!("query {}: failed to stop on drop: {}", self.token, err);
        }
    }
}

impl<F: BatchFetcher> std::fmt::Debug for Cursor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("token", &self.token)
            .field("state", self.state.state())
            .field("buffered", &self.state.buffered())
            .finish_non_exhaustive()
    }
}

/// Iterator over the remaining rows of a [`Cursor`].
///
/// Yields one `Err` per row that fails to decode and keeps going. A fetch
/// failure is yielded once as [`Error::Failed`], then iteration ends.
pub struct Rows<'c, F: BatchFetcher, T> {
    cursor: &'c mut Cursor<F>,
    done: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<F: BatchFetcher, T: FromDatum> Iterator for Rows<'_, F, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.cursor.next() {
            return Some(self.cursor.scan());
        }
        self.done = true;
        self.cursor.failure().err().map(Err)
    }
}
