//! Transaction engine (C4): autocommit toggling, isolation levels, and savepoints layered over
//! the teacher's own `Connection::set_autocommit`/`commit`/`rollback` primitives, which carry no
//! transaction state of their own.

use std::collections::HashSet;

use super::error::EngineError;
use crate::Connection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    fn as_sql(self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "SET TRANSACTION ISOLATION LEVEL READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
            IsolationLevel::RepeatableRead => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
            IsolationLevel::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    RolledBack,
}

/// A transaction on a single connection. At most one may be `Active` per connection (enforced by
/// the worker, which only opens one at a time per connection id).
pub struct Transaction {
    state: TransactionState,
    savepoints: HashSet<String>,
}

impl Transaction {
    /// Disables autocommit and issues the isolation-level statement (spec.md §4.4).
    pub fn begin(connection: &Connection<'_>, isolation: IsolationLevel) -> Result<Self, EngineError> {
        connection.set_autocommit(false).map_err(EngineError::from)?;
        connection
            .execute(isolation.as_sql(), ())
            .map_err(EngineError::from)?;
        Ok(Transaction {
            state: TransactionState::Active,
            savepoints: HashSet::new(),
        })
    }

    fn ensure_active(&self) -> Result<(), EngineError> {
        if self.state != TransactionState::Active {
            return Err(EngineError::validation(
                "Transaction is not active; commit/rollback/savepoint calls are rejected, never \
                 silently ignored.",
            ));
        }
        Ok(())
    }

    pub fn commit(&mut self, connection: &Connection<'_>) -> Result<(), EngineError> {
        self.ensure_active()?;
        connection.commit().map_err(EngineError::from)?;
        connection.set_autocommit(true).map_err(EngineError::from)?;
        self.state = TransactionState::Committed;
        Ok(())
    }

    pub fn rollback(&mut self, connection: &Connection<'_>) -> Result<(), EngineError> {
        self.ensure_active()?;
        connection.rollback().map_err(EngineError::from)?;
        connection.set_autocommit(true).map_err(EngineError::from)?;
        self.state = TransactionState::RolledBack;
        Ok(())
    }

    pub fn savepoint_create(&mut self, connection: &Connection<'_>, name: &str) -> Result<(), EngineError> {
        self.ensure_active()?;
        connection
            .execute(&format!("SAVEPOINT {name}"), ())
            .map_err(EngineError::from)?;
        self.savepoints.insert(name.to_string());
        Ok(())
    }

    pub fn savepoint_rollback(&mut self, connection: &Connection<'_>, name: &str) -> Result<(), EngineError> {
        self.ensure_active()?;
        if !self.savepoints.contains(name) {
            return Err(EngineError::validation(format!("Unknown savepoint '{name}'.")));
        }
        connection
            .execute(&format!("ROLLBACK TO SAVEPOINT {name}"), ())
            .map_err(EngineError::from)?;
        Ok(())
    }

    pub fn savepoint_release(&mut self, connection: &Connection<'_>, name: &str) -> Result<(), EngineError> {
        self.ensure_active()?;
        if !self.savepoints.remove(name) {
            return Err(EngineError::validation(format!("Unknown savepoint '{name}'.")));
        }
        connection
            .execute(&format!("RELEASE SAVEPOINT {name}"), ())
            .map_err(EngineError::from)?;
        Ok(())
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Best-effort rollback for an abandoned `Active` transaction (spec.md §4.4). Failure is
    /// logged, not propagated, mirroring `Drop for Connection`'s "don't mask an existing error"
    /// discipline in `src/connection.rs`.
    pub fn abandon(&mut self, connection: &Connection<'_>) {
        if self.state != TransactionState::Active {
            return;
        }
        if let Err(e) = connection.rollback() {
            log::warn!("best-effort rollback of an abandoned transaction failed: {e}");
        }
        if let Err(e) = connection.set_autocommit(true) {
            log::warn!("failed to restore autocommit after abandoning a transaction: {e}");
        }
        self.state = TransactionState::RolledBack;
    }
}
