//! Common protocol types.

/// Token identifying an in-flight query on a connection.
///
/// The same token is used to ask for the next batch and to stop the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryToken(pub u64);

impl QueryToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for QueryToken {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for QueryToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether more batches follow the one just received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The server holds more rows; ask again with the same token
    Partial,
    /// This is the last batch of the query
    Final,
}

impl Completion {
    pub fn is_final(self) -> bool {
        matches!(self, Completion::Final)
    }
}

/// Response type code sent by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseType {
    /// A single value
    SuccessAtom = 1,
    /// The last (or only) batch of a sequence
    SuccessSequence = 2,
    /// A batch of a sequence with more to come
    SuccessPartial = 3,
    /// Reply to a "wait for outstanding writes" request
    WaitComplete = 4,
    /// The request was malformed
    ClientError = 16,
    /// The query did not compile
    CompileError = 17,
    /// The query failed while running
    RuntimeError = 18,
}

impl ResponseType {
    /// Create a ResponseType from its wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(ResponseType::SuccessAtom),
            2 => Some(ResponseType::SuccessSequence),
            3 => Some(ResponseType::SuccessPartial),
            4 => Some(ResponseType::WaitComplete),
            16 => Some(ResponseType::ClientError),
            17 => Some(ResponseType::CompileError),
            18 => Some(ResponseType::RuntimeError),
            _ => None,
        }
    }

    /// Returns true for the three error response types.
    pub fn is_error(self) -> bool {
        matches!(
            self,
            ResponseType::ClientError | ResponseType::CompileError | ResponseType::RuntimeError
        )
    }
}

impl TryFrom<u8> for ResponseType {
    type Error = crate::error::Error;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or_else(|| {
            crate::error::Error::Protocol(format!("unknown response type: {}", code))
        })
    }
}
