//! Persistent state of the sentinel: the seen-contract set and the cursor.

pub mod error;
pub mod sqlite;
pub use sqlite::SqliteStateRepository;
pub mod traits;
