//! Sans-I/O state machine for result cursors.
//!
//! The state machine owns the row buffer and the stream state without
//! performing any I/O. It produces `Action` values that tell the driver
//! whether a row is ready or a batch must be fetched.

pub mod action;
pub mod cursor;

pub use action::Action;
pub use cursor::{CursorStateMachine, StreamState};
