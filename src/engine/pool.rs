//! Connection pool (C3): a bounded pool of connections keyed by connection identity, with
//! validated checkout/release. Built directly on the teacher's own `Environment`/`Connection`
//! types rather than a fresh abstraction.

use std::sync::Mutex;

use super::error::EngineError;
use crate::Environment;

/// Pool identity: `server:port:uid` extracted from the connection string, ignoring the database
/// attribute (spec.md §4.2). Two connection strings differing only in database reuse the pool.
pub fn pool_identity(connection_string: &str) -> String {
    let mut server = None;
    let mut port = None;
    let mut uid = None;
    for pair in connection_string.split(';') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_uppercase().as_str() {
            "SERVER" => server = Some(value.trim()),
            "PORT" => port = Some(value.trim()),
            "UID" => uid = Some(value.trim()),
            _ => {}
        }
    }
    format!(
        "{}:{}:{}",
        server.unwrap_or(""),
        port.unwrap_or(""),
        uid.unwrap_or("")
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolState {
    pub size: usize,
    pub idle: usize,
    pub max: usize,
}

struct Inner {
    idle: Vec<Connection<'static>>,
    checked_out: usize,
}

use crate::Connection;

/// Bounded pool with fail-fast checkout (spec.md §4.3).
pub struct Pool {
    environment: &'static Environment,
    connection_string: String,
    max: usize,
    inner: Mutex<Inner>,
}

impl Pool {
    pub fn create(environment: &'static Environment, connection_string: String, max: usize) -> Self {
        Pool {
            environment,
            connection_string,
            max,
            inner: Mutex::new(Inner {
                idle: Vec::new(),
                checked_out: 0,
            }),
        }
    }

    /// Checks out a connection, performing a lightweight liveness probe and discarding dead
    /// connections opening replacements as needed. Fails fast (never blocks) when exhausted.
    pub fn checkout(&self) -> Result<PooledConnection<'_>, EngineError> {
        let mut inner = self.inner.lock().unwrap();
        while let Some(candidate) = inner.idle.pop() {
            if probe_is_alive(&candidate) {
                inner.checked_out += 1;
                return Ok(PooledConnection {
                    pool: self,
                    connection: Some(candidate),
                });
            }
            // Dead connection discarded; loop tries the next idle one or falls through to open.
        }
        if inner.checked_out >= self.max {
            return Err(EngineError::new(
                super::error::EngineErrorKind::Connection,
                "Connection pool exhausted (fail-fast policy).",
            ));
        }
        let connection = self
            .environment
            .connect_with_connection_string(&self.connection_string)
            .map_err(EngineError::from)?;
        inner.checked_out += 1;
        Ok(PooledConnection {
            pool: self,
            connection: Some(connection),
        })
    }

    /// Returns a connection to the idle list. Called from [`PooledConnection::drop`], and
    /// directly by the handle manager when an FFI `release_connection` hands a connection that
    /// was un-wrapped via [`PooledConnection::into_connection`] back to its pool.
    pub(crate) fn release(&self, connection: Connection<'static>) {
        let mut inner = self.inner.lock().unwrap();
        inner.checked_out -= 1;
        inner.idle.push(connection);
    }

    pub fn state(&self) -> PoolState {
        let inner = self.inner.lock().unwrap();
        PoolState {
            size: inner.idle.len() + inner.checked_out,
            idle: inner.idle.len(),
            max: self.max,
        }
    }

    /// A trivial probe query, returning success/failure without logging a false-negative as an
    /// error (spec.md §4.3).
    pub fn health_check(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.idle.iter().all(probe_is_alive)
    }

    pub fn ensure_closeable(&self) -> Result<(), EngineError> {
        let inner = self.inner.lock().unwrap();
        if inner.checked_out > 0 {
            return Err(EngineError::validation(
                "Cannot close pool: connections are still checked out.",
            ));
        }
        Ok(())
    }
}

fn probe_is_alive(connection: &Connection<'static>) -> bool {
    !connection.is_dead().unwrap_or(true)
}

/// A connection checked out from a [`Pool`]. Returned to the pool on drop.
pub struct PooledConnection<'p> {
    pool: &'p Pool,
    connection: Option<Connection<'static>>,
}

impl<'p> PooledConnection<'p> {
    pub fn as_connection(&self) -> &Connection<'static> {
        self.connection.as_ref().expect("connection present until drop")
    }

    /// Takes the connection out without returning it to the pool, leaving `checked_out` at the
    /// pool incremented as though still checked out. Used to register a pool-sourced connection
    /// as an ordinary handle-manager connection (FFI `pool_get_connection`); the caller is
    /// responsible for eventually handing it back via [`Pool::release`].
    pub(crate) fn into_connection(mut self) -> Connection<'static> {
        self.connection.take().expect("connection present until drop")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.pool.release(connection);
        }
    }
}
