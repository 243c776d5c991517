//! Synchronous result cursor.

mod cursor;
mod row;

pub use cursor::{Cursor, Rows};
pub use row::Row;
