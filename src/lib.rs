//! A streaming result cursor for batched query protocols.
//!
//! Servers such as RethinkDB answer a query with a first batch of rows and
//! keep the rest until the client asks for more. This crate turns that
//! exchange into a forward-only cursor:
//!
//! - **Sans-I/O state machine**: buffer, window and stream state live in
//!   [`state`], separate from the fetching
//! - **Pluggable transport**: batches come from any [`BatchFetcher`]
//! - **Typed decoding**: rows decode through [`FromDatum`], including
//!   caller records via [`impl_from_datum!`]
//!
//! # Example
//!
//! ```
//! use zero_cursor::sync::Cursor;
//! use zero_cursor::{Batch, Datum, Opts, QueryToken, ReplayFetcher, impl_from_datum};
//!
//! struct Hero {
//!     name: String,
//!     level: u32,
//! }
//! impl_from_datum!(Hero { name, level });
//!
//! fn hero(name: &str, level: u32) -> Datum {
//!     [("name", Datum::from(name)), ("level", Datum::from(level))]
//!         .into_iter()
//!         .collect()
//! }
//!
//! fn main() -> zero_cursor::Result<()> {
//!     let fetcher = ReplayFetcher::new([Batch::last(vec![hero("Wren", 7)])]);
//!     let mut cursor = Cursor::new(fetcher, QueryToken(1), Opts::default());
//!
//!     let heroes: Vec<Hero> = cursor.all()?;
//!     assert_eq!(heroes.len(), 1);
//!     assert_eq!(heroes[0].name, "Wren");
//!     assert_eq!(heroes[0].level, 7);
//!
//!     cursor.close()?;
//!     Ok(())
//! }
//! ```

pub mod conversion;
pub mod error;
pub mod fetcher;
pub mod opts;
pub mod protocol;
pub mod state;
pub mod value;

#[cfg(feature = "sync")]
pub mod sync;

pub use conversion::{Binary, FromDatum, decode};
pub use error::{Error, Result, ServerError, ServerErrorKind};
pub use fetcher::{BatchFetcher, ReplayFetcher};
pub use opts::Opts;
pub use protocol::{Batch, Completion, QueryToken, Response, ResponseType};
pub use value::Datum;
