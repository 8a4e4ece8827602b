//! Database models, storage interface and the SQLite store

pub mod init;
pub mod models;
pub mod sqlite;
pub mod store;

pub use init::*;
pub use models::*;
pub use sqlite::SqliteStore;
pub use store::EvaluationStore;
