//! Error types for zero-cursor.

use thiserror::Error;

use crate::value::Datum;

/// Result type for zero-cursor operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Class of an error response sent by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerErrorKind {
    /// The server rejected the request as malformed (driver bug)
    Client,
    /// The query failed to compile
    Compile,
    /// The query failed while running
    Runtime,
}

impl std::fmt::Display for ServerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerErrorKind::Client => write!(f, "client error"),
            ServerErrorKind::Compile => write!(f, "compile error"),
            ServerErrorKind::Runtime => write!(f, "runtime error"),
        }
    }
}

/// Error response from the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError {
    /// Error class
    pub kind: ServerErrorKind,
    /// Human readable message
    pub message: String,
    /// Position of the failing term inside the query, if reported
    pub backtrace: Option<Datum>,
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Error type for zero-cursor.
#[derive(Debug, Error)]
pub enum Error {
    /// A single-row query produced no rows
    #[error("no rows in the result set")]
    NoRows,

    /// Scan called without a current row
    #[error("scan called without a successful call to next")]
    NotPositioned,

    /// The cursor was closed, explicitly or after its last row
    #[error("cursor is closed")]
    Closed,

    /// A bulk read stopped because fetching the next batch failed.
    ///
    /// The original error stays available through `Cursor::err()`.
    #[error("cursor failed: {0}")]
    Failed(String),

    /// Server error response
    #[error("server error: {0}")]
    Server(ServerError),

    /// Protocol error (malformed response, unexpected response type, etc.)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row could not be decoded into the requested type
    #[error("Decode error: {0}")]
    Decode(String),

    /// Invalid usage (e.g., malformed options)
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),
}

impl Error {
    /// Returns true if the error came from fetching a batch.
    ///
    /// Fetch failures permanently stop the cursor that observed them.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Error::Server(_) | Error::Protocol(_) | Error::Io(_) | Error::Failed(_)
        )
    }

    /// Returns true if the error indicates the underlying connection is broken.
    pub fn is_connection_broken(&self) -> bool {
        match self {
            Error::Io(_) | Error::Protocol(_) => true,
            Error::Server(err) => err.kind == ServerErrorKind::Client,
            _ => false,
        }
    }

    /// Get the server error if this is one.
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Error::Server(err) => Some(err),
            _ => None,
        }
    }

    pub(crate) fn decode_mismatch(expected: &str, found: &Datum) -> Self {
        Error::Decode(format!("expected {}, found {}", expected, found.type_name()))
    }
}
