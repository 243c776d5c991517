//! Action types for state machine I/O requests.

/// Action requested by the cursor state machine.
///
/// The driver should perform the requested I/O and then call the
/// appropriate method to continue the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A row is now current.
    Row,

    /// The local window is empty and the server may hold more rows.
    ///
    /// The driver should fetch the next batch, hand it to
    /// `CursorStateMachine::receive()` (or the error to `fail()`),
    /// then call `advance()` again.
    Fetch,

    /// No more rows: the stream was exhausted, closed, or failed.
    Finished,
}
