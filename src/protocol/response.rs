//! Server responses and the batches they carry.

use crate::error::{Error, Result, ServerError, ServerErrorKind};
use crate::value::Datum;

use super::types::{Completion, QueryToken, ResponseType};

/// One network-delivered chunk of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub rows: Vec<Datum>,
    pub completion: Completion,
}

impl Batch {
    /// A batch with more to come.
    pub fn partial(rows: Vec<Datum>) -> Self {
        Self {
            rows,
            completion: Completion::Partial,
        }
    }

    /// The last batch of a query.
    pub fn last(rows: Vec<Datum>) -> Self {
        Self {
            rows,
            completion: Completion::Final,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_final(&self) -> bool {
        self.completion.is_final()
    }
}

/// A parsed server response.
///
/// Transports parse the response envelope and hand it here to turn it into a
/// [`Batch`] or an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Token of the query this response answers
    pub token: QueryToken,
    /// Response type code
    pub response_type: ResponseType,
    /// Result rows, or a single message string for error responses
    pub results: Vec<Datum>,
    /// Failing term position for error responses
    pub backtrace: Option<Datum>,
}

impl Response {
    /// Fail unless the response belongs to `token`.
    pub fn check_token(&self, token: QueryToken) -> Result<()> {
        if self.token != token {
            return Err(Error::Protocol(format!(
                "response token mismatch: expected {}, got {}",
                token, self.token
            )));
        }
        Ok(())
    }

    /// Convert the response into a batch of rows.
    ///
    /// - `SUCCESS_PARTIAL` yields a partial batch.
    /// - `SUCCESS_SEQUENCE` yields the final batch.
    /// - `SUCCESS_ATOM` yields a final batch; an array atom is spread into rows.
    /// - `WAIT_COMPLETE` yields an empty final batch.
    /// - Error responses become [`Error::Server`].
    pub fn into_batch(self) -> Result<Batch> {
        match self.response_type {
            ResponseType::SuccessPartial => Ok(Batch::partial(self.results)),
            ResponseType::SuccessSequence => Ok(Batch::last(self.results)),
            ResponseType::SuccessAtom => {
                let mut results = self.results;
                if results.len() != 1 {
                    return Err(Error::Protocol(format!(
                        "atom response with {} results",
                        results.len()
                    )));
                }
                match results.pop() {
                    Some(Datum::Array(items)) => Ok(Batch::last(items)),
                    Some(atom) => Ok(Batch::last(vec![atom])),
                    None => Ok(Batch::last(Vec::new())),
                }
            }
            ResponseType::WaitComplete => Ok(Batch::last(Vec::new())),
            ResponseType::ClientError => Err(self.into_server_error(ServerErrorKind::Client)),
            ResponseType::CompileError => Err(self.into_server_error(ServerErrorKind::Compile)),
            ResponseType::RuntimeError => Err(self.into_server_error(ServerErrorKind::Runtime)),
        }
    }

    fn into_server_error(self, kind: ServerErrorKind) -> Error {
        let message = match self.results.first() {
            Some(Datum::String(msg)) => msg.clone(),
            Some(other) => format!("{:?}", other),
            None => "unknown error".to_string(),
        };
        Error::Server(ServerError {
            kind,
            message,
            backtrace: self.backtrace,
        })
    }
}
