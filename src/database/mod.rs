// Database module
// SQLite holds the cleaned paper table the metadata store is loaded from.

pub mod sqlite;

pub use sqlite::*;
