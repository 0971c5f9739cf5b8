//! Prepared statement cache (C5): an LRU bounded per connection, keyed by normalized SQL text.
//!
//! A cached entry must outlive the call that created it without borrowing from the owning
//! connection, so a naive `Prepared<StatementImpl<'_>>` (which borrows `&Connection`) cannot sit
//! next to the `Connection` it was prepared against inside the same long-lived record. The
//! teacher's own [`crate::handles::StatementConnection`] exists for exactly this: a statement
//! handle that owns its parent instead of borrowing it. Cached entries here own an `Arc` clone of
//! a shared, mutex-guarded connection, the same construction the teacher uses in
//! `sync_connection.rs`/`shared_connection.rs` to hand a cursor a strong reference to its parent.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex};

use super::error::EngineError;
use crate::handles::{StatementConnection, StatementParent};
use crate::{Connection, Prepared};

/// A connection shared between the handle manager's ad hoc execution path and every statement
/// cached against it. `Arc<Mutex<_>>` mirrors the teacher's own `SharedConnection` type alias.
pub type SharedConnection = Arc<Mutex<Connection<'static>>>;

/// # Safety
///
/// The `Arc` keeps the connection alive and the `Mutex` only ever hands out a connected
/// `Connection` for the lifetime of a `StatementConnection` built from it.
unsafe impl StatementParent for SharedConnection {}

/// A statement prepared against a [`SharedConnection`], outliving the borrow that produced it.
pub type CachedStatement = Prepared<StatementConnection<SharedConnection>>;

struct Entry {
    statement: CachedStatement,
    /// Parameter names in declaration order, extracted from named markers (`:name`) at prepare
    /// time, so name-keyed executions can be rebound to the driver's positional `?` form
    /// (spec.md §4.5).
    parameter_order: Vec<String>,
    execution_count: u64,
}

/// Snapshot of cache counters, suitable for `get_metrics` (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheMetrics {
    pub size: usize,
    pub max: usize,
    pub hits: u64,
    pub misses: u64,
    pub total_prepares: u64,
    pub total_executions: u64,
}

impl CacheMetrics {
    pub fn average_executions_per_stmt(&self) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            self.total_executions as f64 / self.size as f64
        }
    }

    /// A rough per-entry estimate; the driver does not expose real statement memory usage.
    pub fn estimated_memory_bytes(&self) -> usize {
        self.size * 4096
    }
}

impl fmt::Display for CacheMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size={} max={} hits={} misses={} totalPrepares={} totalExecutions={} \
             averageExecutionsPerStmt={:.2} estimatedMemoryBytes={}",
            self.size,
            self.max,
            self.hits,
            self.misses,
            self.total_prepares,
            self.total_executions,
            self.average_executions_per_stmt(),
            self.estimated_memory_bytes(),
        )
    }
}

/// Bounded LRU cache of prepared statements for a single connection.
pub struct StmtCache {
    connection: SharedConnection,
    max: usize,
    entries: HashMap<String, Entry>,
    /// Most-recently-used key at the back.
    recency: VecDeque<String>,
    hits: u64,
    misses: u64,
    total_prepares: u64,
    total_executions: u64,
}

impl StmtCache {
    pub fn new(connection: Connection<'static>, max: usize) -> Self {
        StmtCache {
            connection: Arc::new(Mutex::new(connection)),
            max,
            entries: HashMap::new(),
            recency: VecDeque::new(),
            hits: 0,
            misses: 0,
            total_prepares: 0,
            total_executions: 0,
        }
    }

    /// The shared connection every cached statement and ad hoc statement on this connection is
    /// ultimately issued against.
    pub fn connection(&self) -> &SharedConnection {
        &self.connection
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(pos);
        }
        self.recency.push_back(key.to_string());
    }

    /// Prepares `sql` if it is not already cached, returning its named-parameter order and
    /// bumping the execution counter. Evicts the least-recently-used entry when the cache is full.
    pub fn prepare(&mut self, sql: &str) -> Result<&[String], EngineError> {
        let key = normalize(sql);
        if self.entries.contains_key(&key) {
            self.hits += 1;
            self.touch(&key);
        } else {
            self.misses += 1;
            self.total_prepares += 1;
            if self.entries.len() >= self.max {
                self.evict_least_recently_used();
            }
            let (rewritten, parameter_order) = extract_named_parameters(&key);
            let statement = self.prepare_owned(&rewritten)?;
            self.entries.insert(
                key.clone(),
                Entry {
                    statement,
                    parameter_order,
                    execution_count: 0,
                },
            );
            self.touch(&key);
        }
        self.total_executions += 1;
        let entry = self.entries.get_mut(&key).expect("just inserted or already present");
        entry.execution_count += 1;
        Ok(&entry.parameter_order)
    }

    /// Borrows the cached statement for `sql`, which must already have been prepared via
    /// [`Self::prepare`].
    pub fn statement_mut(&mut self, sql: &str) -> Option<&mut CachedStatement> {
        let key = normalize(sql);
        self.entries.get_mut(&key).map(|entry| &mut entry.statement)
    }

    fn prepare_owned(&self, sql: &str) -> Result<CachedStatement, EngineError> {
        let guard = self
            .connection
            .lock()
            .expect("connection mutex is not poisoned");
        let prepared = guard.prepare(sql).map_err(EngineError::from)?;
        let stmt_ptr = prepared.into_statement().into_sys();
        drop(guard);
        // Safe: `stmt_ptr` was just allocated against `self.connection` and `self.connection` is
        // kept alive and connected for as long as the returned `StatementConnection` lives.
        let owning = unsafe { StatementConnection::new(stmt_ptr, Arc::clone(&self.connection)) };
        Ok(Prepared::new(owning))
    }

    fn evict_least_recently_used(&mut self) {
        if let Some(key) = self.recency.pop_front() {
            self.entries.remove(&key);
        }
    }

    pub fn metrics(&self) -> CacheMetrics {
        CacheMetrics {
            size: self.entries.len(),
            max: self.max,
            hits: self.hits,
            misses: self.misses,
            total_prepares: self.total_prepares,
            total_executions: self.total_executions,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    /// Consumes the cache, clearing every cached statement first so the `Arc` around the
    /// connection drops to refcount 1, then unwraps it. Used by FFI `release_connection` to hand
    /// a pool-sourced connection back to [`super::pool::Pool`]. Fails if some other owner (a still
    /// live cached statement or a batched stream re-homed onto the same `SharedConnection`) holds
    /// another `Arc` clone.
    pub fn into_connection(mut self) -> Result<Connection<'static>, EngineError> {
        self.clear();
        Arc::try_unwrap(self.connection)
            .map(|mutex| mutex.into_inner().expect("connection mutex is not poisoned"))
            .map_err(|_| {
                EngineError::validation(
                    "Connection still has outstanding references (open streams) and cannot be \
                     released to the pool.",
                )
            })
    }
}

fn normalize(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rewrites `:name` markers into ODBC `?` placeholders, returning the rewritten SQL and the
/// parameter names in declaration order (spec.md §4.5).
fn extract_named_parameters(sql: &str) -> (String, Vec<String>) {
    let mut rewritten = String::with_capacity(sql.len());
    let mut order = Vec::new();
    let mut chars = sql.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c == ':' && chars.peek().is_some_and(|(_, next)| next.is_alphabetic() || *next == '_') {
            let mut name = String::new();
            while let Some(&(_, next)) = chars.peek() {
                if next.is_alphanumeric() || next == '_' {
                    name.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            order.push(name);
            rewritten.push('?');
        } else {
            rewritten.push(c);
        }
    }
    if order.is_empty() {
        (sql.to_string(), order)
    } else {
        (rewritten, order)
    }
}
