//! Handle manager (C2): the process-wide registry mapping opaque integer ids to owned engine
//! objects, enforcing cascade-on-destroy. A single [`std::sync::Mutex`] is the "global
//! coordinator" spec.md §4.2 calls for: every register/lookup/drop operation takes the lock, so
//! concurrent workers can never observe a half-destroyed handle tree.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::error::EngineError;
use super::pool::Pool;
use super::stmt_cache::{SharedConnection, StmtCache};
use super::stream_executor::Stream;
use super::transaction::Transaction;
use crate::Connection;

/// A handle id. `0` is reserved as "invalid" per spec.md §3.
pub type HandleId = u64;

pub const INVALID_HANDLE: HandleId = 0;

struct IdGenerator(AtomicU64);

impl IdGenerator {
    fn new() -> Self {
        IdGenerator(AtomicU64::new(1))
    }

    fn next(&self) -> HandleId {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// A connection record: the live ODBC connection (shared with every statement cached against it,
/// see [`StmtCache`]) plus the set of dependent ids owned by it, so cascade-drop never needs a
/// back-pointer (see spec.md §9 "Cyclic object graphs").
pub struct ConnectionRecord {
    pub statement_cache: StmtCache,
    pub transactions: Vec<HandleId>,
    pub streams: Vec<HandleId>,
    pub statements: Vec<HandleId>,
}

impl ConnectionRecord {
    /// The connection ad hoc statements and every cached prepared statement run against.
    pub fn connection(&self) -> &SharedConnection {
        self.statement_cache.connection()
    }
}

/// Registry of typed id -> owned handle maps. `'env` ties every connection-derived handle to the
/// lifetime of the single process-wide environment.
#[derive(Default)]
struct Tables {
    connections: HashMap<HandleId, ConnectionRecord>,
    /// Each transaction remembers the connection it was opened on, since `commit`/`rollback`/
    /// `savepoint_*` need to issue SQL against that same connection (spec.md §4.4).
    transactions: HashMap<HandleId, (HandleId, Transaction)>,
    streams: HashMap<HandleId, Stream>,
    pools: HashMap<HandleId, Pool>,
    /// A handle for a `(connection, SQL)` pair primed into that connection's statement cache via
    /// `prepare`, so FFI callers can refer to it by id across `execute`/`close_statement` calls
    /// instead of re-sending the SQL text each time (spec.md §4.5/§6).
    statements: HashMap<HandleId, (HandleId, String)>,
}

pub struct HandleManager {
    ids: IdGenerator,
    tables: Mutex<Tables>,
}

impl HandleManager {
    pub fn new() -> Self {
        HandleManager {
            ids: IdGenerator::new(),
            tables: Mutex::new(Tables::default()),
        }
    }

    pub fn register_connection(&self, connection: Connection<'static>) -> HandleId {
        let id = self.ids.next();
        let record = ConnectionRecord {
            statement_cache: StmtCache::new(connection, 50),
            transactions: Vec::new(),
            streams: Vec::new(),
            statements: Vec::new(),
        };
        self.tables.lock().unwrap().connections.insert(id, record);
        log::debug!("registered connection {id}");
        id
    }

    pub fn register_transaction(&self, connection_id: HandleId, txn: Transaction) -> HandleId {
        let id = self.ids.next();
        let mut tables = self.tables.lock().unwrap();
        tables.transactions.insert(id, (connection_id, txn));
        if let Some(conn) = tables.connections.get_mut(&connection_id) {
            conn.transactions.push(id);
        }
        log::debug!("registered transaction {id} on connection {connection_id}");
        id
    }

    /// Clones out the shared connection handle a connection id points to, releasing the `tables`
    /// lock immediately; used ahead of operations (transaction begin/commit, ad hoc catalog
    /// queries) that need to separately lock the connection's own mutex without holding `tables`
    /// for the duration, and by callers that must not nest a second `tables` lock.
    pub fn connection_handle(&self, id: HandleId) -> Result<SharedConnection, EngineError> {
        let tables = self.tables.lock().unwrap();
        tables
            .connections
            .get(&id)
            .map(|record| Arc::clone(record.connection()))
            .ok_or_else(|| EngineError::validation(format!("No connection with id {id}.")))
    }

    /// Refuses to admit a second concurrent stream on `connection_id`: spec.md §4.7 requires the
    /// handle manager to reject a new stream while a prior one for the same connection remains
    /// open. Callers must check this before doing the (possibly expensive) work of opening the
    /// driver-side cursor a stream wraps, not after.
    pub fn ensure_stream_slot_free(&self, connection_id: HandleId) -> Result<(), EngineError> {
        self.with_connection(connection_id, |record| {
            if record.streams.is_empty() {
                Ok(())
            } else {
                Err(EngineError::validation(format!(
                    "Connection {connection_id} already has an open stream; close it before starting another."
                )))
            }
        })
    }

    pub fn register_stream(&self, connection_id: HandleId, stream: Stream) -> HandleId {
        let id = self.ids.next();
        let mut tables = self.tables.lock().unwrap();
        tables.streams.insert(id, stream);
        if let Some(conn) = tables.connections.get_mut(&connection_id) {
            conn.streams.push(id);
        }
        log::debug!("registered stream {id} on connection {connection_id}");
        id
    }

    /// Primes `sql` into `connection_id`'s statement cache (via `StmtCache::prepare`, called by
    /// the caller before this) and records an id FFI callers can later `execute`/`close_statement`
    /// by, instead of resending the SQL text.
    pub fn register_statement(&self, connection_id: HandleId, sql: String) -> HandleId {
        let id = self.ids.next();
        let mut tables = self.tables.lock().unwrap();
        tables.statements.insert(id, (connection_id, sql));
        if let Some(conn) = tables.connections.get_mut(&connection_id) {
            conn.statements.push(id);
        }
        log::debug!("registered statement {id} on connection {connection_id}");
        id
    }

    /// Resolves a statement id to its owning connection and SQL text, cloning both out so the
    /// caller can go on to take `with_connection`'s lock separately (the `Mutex` guarding `tables`
    /// is not reentrant).
    pub fn statement_lookup(&self, id: HandleId) -> Result<(HandleId, String), EngineError> {
        let tables = self.tables.lock().unwrap();
        tables
            .statements
            .get(&id)
            .map(|(connection_id, sql)| (*connection_id, sql.clone()))
            .ok_or_else(|| EngineError::validation(format!("No statement with id {id}.")))
    }

    pub fn drop_statement(&self, id: HandleId) -> Result<(), EngineError> {
        let mut tables = self.tables.lock().unwrap();
        let (connection_id, _) = tables
            .statements
            .remove(&id)
            .ok_or_else(|| EngineError::validation(format!("No statement with id {id}.")))?;
        if let Some(conn) = tables.connections.get_mut(&connection_id) {
            conn.statements.retain(|s| *s != id);
        }
        log::debug!("dropped statement {id}");
        Ok(())
    }

    pub fn register_pool(&self, pool: Pool) -> HandleId {
        let id = self.ids.next();
        self.tables.lock().unwrap().pools.insert(id, pool);
        log::debug!("registered pool {id}");
        id
    }

    pub fn with_connection<R>(
        &self,
        id: HandleId,
        f: impl FnOnce(&mut ConnectionRecord) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let mut tables = self.tables.lock().unwrap();
        let record = tables
            .connections
            .get_mut(&id)
            .ok_or_else(|| EngineError::validation(format!("No connection with id {id}.")))?;
        f(record)
    }

    pub fn with_transaction<R>(
        &self,
        id: HandleId,
        f: impl FnOnce(&mut Transaction) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let mut tables = self.tables.lock().unwrap();
        let (_, txn) = tables
            .transactions
            .get_mut(&id)
            .ok_or_else(|| EngineError::validation(format!("No transaction with id {id}.")))?;
        f(txn)
    }

    /// The connection id a transaction was opened against, for callers that need to lock that
    /// connection separately before calling into [`Self::with_transaction`].
    pub fn transaction_connection(&self, id: HandleId) -> Result<HandleId, EngineError> {
        let tables = self.tables.lock().unwrap();
        tables
            .transactions
            .get(&id)
            .map(|(connection_id, _)| *connection_id)
            .ok_or_else(|| EngineError::validation(format!("No transaction with id {id}.")))
    }

    pub fn with_stream<R>(
        &self,
        id: HandleId,
        f: impl FnOnce(&mut Stream) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let mut tables = self.tables.lock().unwrap();
        let stream = tables
            .streams
            .get_mut(&id)
            .ok_or_else(|| EngineError::validation(format!("No stream with id {id}.")))?;
        f(stream)
    }

    pub fn with_pool<R>(
        &self,
        id: HandleId,
        f: impl FnOnce(&mut Pool) -> Result<R, EngineError>,
    ) -> Result<R, EngineError> {
        let mut tables = self.tables.lock().unwrap();
        let pool = tables
            .pools
            .get_mut(&id)
            .ok_or_else(|| EngineError::validation(format!("No pool with id {id}.")))?;
        f(pool)
    }

    /// Drops a connection, cascading: streams, then statements (via the cache's own drop), then
    /// transactions (rolled back), then the native connection itself. See spec.md §4.2.
    pub fn drop_connection(&self, id: HandleId) -> Result<(), EngineError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(mut record) = tables.connections.remove(&id) else {
            return Err(EngineError::validation(format!("No connection with id {id}.")));
        };
        for stream_id in record.streams.drain(..) {
            tables.streams.remove(&stream_id);
        }
        for statement_id in record.statements.drain(..) {
            tables.statements.remove(&statement_id);
        }
        record.statement_cache.clear();
        if !record.transactions.is_empty() {
            let shared = Arc::clone(record.connection());
            let guard = shared.lock().expect("connection mutex is not poisoned");
            for txn_id in record.transactions.drain(..) {
                if let Some((_, mut txn)) = tables.transactions.remove(&txn_id) {
                    txn.abandon(&guard);
                }
            }
        }
        log::debug!("dropped connection {id}, native connection is closed on scope exit");
        Ok(())
    }

    pub fn drop_stream(&self, id: HandleId) -> Result<(), EngineError> {
        self.tables
            .lock()
            .unwrap()
            .streams
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| EngineError::validation(format!("No stream with id {id}.")))
    }

    pub fn drop_transaction(&self, id: HandleId) -> Result<Transaction, EngineError> {
        self.tables
            .lock()
            .unwrap()
            .transactions
            .remove(&id)
            .map(|(_, txn)| txn)
            .ok_or_else(|| EngineError::validation(format!("No transaction with id {id}.")))
    }

    /// Checks out a connection from `pool_id` and registers it as an ordinary connection handle,
    /// usable with every other `conn_id`-taking operation, for FFI `pool_get_connection`.
    pub fn checkout_pool_connection(&self, pool_id: HandleId) -> Result<HandleId, EngineError> {
        let connection = {
            let tables = self.tables.lock().unwrap();
            let pool = tables
                .pools
                .get(&pool_id)
                .ok_or_else(|| EngineError::validation(format!("No pool with id {pool_id}.")))?;
            pool.checkout()?.into_connection()
        };
        Ok(self.register_connection(connection))
    }

    /// The inverse of [`Self::checkout_pool_connection`]: tears down `connection_id`'s cascade the
    /// same way [`Self::drop_connection`] does, then hands the now-unwrapped native connection
    /// back to `pool_id`'s idle list instead of disconnecting it (spec.md §4.3 `release_connection`).
    pub fn release_pool_connection(
        &self,
        connection_id: HandleId,
        pool_id: HandleId,
    ) -> Result<(), EngineError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(mut record) = tables.connections.remove(&connection_id) else {
            return Err(EngineError::validation(format!(
                "No connection with id {connection_id}."
            )));
        };
        for stream_id in record.streams.drain(..) {
            tables.streams.remove(&stream_id);
        }
        for statement_id in record.statements.drain(..) {
            tables.statements.remove(&statement_id);
        }
        if !record.transactions.is_empty() {
            let shared = Arc::clone(record.connection());
            let guard = shared.lock().expect("connection mutex is not poisoned");
            for txn_id in record.transactions.drain(..) {
                if let Some((_, mut txn)) = tables.transactions.remove(&txn_id) {
                    txn.abandon(&guard);
                }
            }
        }
        let connection = record.statement_cache.into_connection()?;
        let pool = tables
            .pools
            .get(&pool_id)
            .ok_or_else(|| EngineError::validation(format!("No pool with id {pool_id}.")))?;
        pool.release(connection);
        log::debug!("released connection {connection_id} back to pool {pool_id}");
        Ok(())
    }

    /// Drops a pool, refusing if any internal connection is still checked out.
    pub fn drop_pool(&self, id: HandleId) -> Result<(), EngineError> {
        let mut tables = self.tables.lock().unwrap();
        let pool = tables
            .pools
            .get(&id)
            .ok_or_else(|| EngineError::validation(format!("No pool with id {id}.")))?;
        pool.ensure_closeable()?;
        tables.pools.remove(&id);
        log::debug!("dropped pool {id}");
        Ok(())
    }

    /// Legal only when no connections remain (spec.md §4.2).
    pub fn connection_count(&self) -> usize {
        self.tables.lock().unwrap().connections.len()
    }
}

impl Default for HandleManager {
    fn default() -> Self {
        Self::new()
    }
}
