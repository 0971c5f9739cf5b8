//! The engine: a synchronous ODBC data-access layer built on top of the safe wrapper types at the
//! crate root, adding process-wide handle management, connection pooling, transactions, a
//! prepared-statement cache, query/streaming/bulk-insert executors, a single-threaded
//! request/response worker, and a wire codec for all of it.

pub mod bulk_insert;
pub mod codec;
pub mod error;
pub mod handle_manager;
pub mod pool;
pub mod query_executor;
pub mod stmt_cache;
pub mod stream_executor;
pub mod transaction;
pub mod worker;

pub use error::{EngineError, EngineErrorKind};
pub use handle_manager::{HandleId, HandleManager, INVALID_HANDLE};
pub use worker::Worker;
