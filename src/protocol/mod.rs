//! Response-level protocol types.
//!
//! The byte layout of requests and responses belongs to the transport. This
//! module only models what a cursor needs to know about a response: which
//! query it belongs to, its rows, and whether more rows will follow.

pub mod response;
pub mod types;

pub use response::{Batch, Response};
pub use types::{Completion, QueryToken, ResponseType};
