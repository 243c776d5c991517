//! Result cursor state machine.

use crate::error::Error;
use crate::protocol::{Batch, Completion};
use crate::value::Datum;

use super::action::Action;

/// Where a cursor stands in its result stream.
#[derive(Debug)]
pub enum StreamState {
    /// No batch received yet
    Open,
    /// The last batch was partial; more can be fetched
    Partial,
    /// The final batch was received; buffered rows remain
    Exhausted,
    /// Closed by the caller or after the last row was read
    Closed,
    /// Fetching a batch failed
    Failed(Error),
}

impl StreamState {
    /// Returns true if the server side may still produce rows.
    pub fn is_live(&self) -> bool {
        matches!(self, StreamState::Open | StreamState::Partial)
    }

    /// Returns true for `Closed` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamState::Closed | StreamState::Failed(_))
    }
}

/// Buffer, window and stream state of a result cursor.
///
/// Unread rows live in `buffer[start..end]`. Rows before `start` have already
/// been handed out and are reclaimed by compaction.
#[derive(Debug)]
pub struct CursorStateMachine {
    buffer: Vec<Datum>,
    start: usize,
    end: usize,
    current: Option<Datum>,
    state: StreamState,
}

impl CursorStateMachine {
    /// Create a state machine that has not received any batch yet.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            start: 0,
            end: 0,
            current: None,
            state: StreamState::Open,
        }
    }

    /// Create a state machine from the first batch of a query.
    pub fn with_batch(batch: Batch, capacity: usize) -> Self {
        let mut machine = Self::new(capacity);
        machine.receive(batch);
        machine
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// The row made current by the last `Action::Row`.
    pub fn current(&self) -> Option<&Datum> {
        self.current.as_ref()
    }

    /// Number of unread rows held locally.
    pub fn buffered(&self) -> usize {
        self.end - self.start
    }

    /// The unread window as `(start, end)` indices into the buffer.
    pub fn window(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Physical length of the buffer, including rows already read.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// The error that stopped the stream, if any.
    pub fn error(&self) -> Option<&Error> {
        match &self.state {
            StreamState::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, StreamState::Closed)
    }

    /// Move to the next row.
    ///
    /// Returns `Action::Row` when a row became current, `Action::Fetch` when
    /// the driver must fetch another batch, `Action::Finished` otherwise.
    /// Once closed or failed this always returns `Action::Finished` and
    /// changes nothing.
    pub fn advance(&mut self) -> Action {
        if self.state.is_terminal() {
            return Action::Finished;
        }
        self.current = None;

        if self.end > self.start {
            let Some(slot) = self.buffer.get_mut(self.start) else {
                return Action::Finished;
            };
            self.current = Some(std::mem::take(slot));
            self.start += 1;
            return Action::Row;
        }

        if matches!(self.state, StreamState::Exhausted) {
            tracing::debug!("cursor drained its final batch");
            self.state = StreamState::Closed;
            self.reset_buffer();
            return Action::Finished;
        }

        self.compact();
        Action::Fetch
    }

    /// Append a fetched batch and record whether more will follow.
    ///
    /// Batches arriving after the final one, or after the cursor stopped, are dropped.
    pub fn receive(&mut self, batch: Batch) {
        if !self.state.is_live() {
            tracing::debug!(
                "dropping {} rows received in state {:?}",
                batch.len(),
                self.state
            );
            return;
        }
        self.end += batch.rows.len();
        self.buffer.extend(batch.rows);
        self.state = match batch.completion {
            Completion::Partial => StreamState::Partial,
            Completion::Final => StreamState::Exhausted,
        };
    }

    /// Record a fetch failure. The stream stops for good.
    pub fn fail(&mut self, err: Error) {
        if self.state.is_terminal() {
            return;
        }
        self.current = None;
        self.reset_buffer();
        self.state = StreamState::Failed(err);
    }

    /// Close the stream.
    ///
    /// Returns true if the server may still be producing rows for this query,
    /// in which case the driver should tell it to stop. Returns false on every
    /// later call, after natural exhaustion, and after a failure (which stays
    /// recorded).
    pub fn close(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        let live = self.state.is_live();
        self.state = StreamState::Closed;
        self.current = None;
        self.reset_buffer();
        live
    }

    /// Take the failure out of a failed stream, leaving it closed.
    pub(crate) fn take_error(&mut self) -> Option<Error> {
        match std::mem::replace(&mut self.state, StreamState::Closed) {
            StreamState::Failed(err) => Some(err),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Shift unread rows to the front of the buffer.
    ///
    /// Runs when some rows have been read and either the whole buffer has been
    /// consumed up to its end or more than half of it lies behind the window.
    /// Unread rows keep their order.
    pub fn compact(&mut self) {
        if self.start > 0 && (self.end == self.buffer.len() || self.start * 2 > self.buffer.len())
        {
            self.buffer.truncate(self.end);
            self.buffer.drain(..self.start);
            self.end -= self.start;
            self.start = 0;
        }
    }

    fn reset_buffer(&mut self) {
        self.buffer.clear();
        self.start = 0;
        self.end = 0;
    }
}
