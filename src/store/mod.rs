//! Persistence layer: where completed profiles go.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use memory::MemorySink;
pub use traits::{ProfileSink, RecordId};
