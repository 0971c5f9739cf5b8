use crate::{
    execute::execute_with_parameters,
    handles::{self, slice_to_utf8, SqlText, Statement, StatementImpl},
    CursorImpl, Error, ParameterRefCollection, Preallocated, Prepared,
};
use std::thread::panicking;

/// The connection handle references storage of all information about the connection to the data
/// source, including status, transaction state, and error information.
///
/// # Example
///
/// ```no_run
/// use odbc_api::Environment;
///
/// let env = unsafe { Environment::new()? };
/// let conn = env.connect("DataSourceName", "User", "Password")?;
/// conn.execute("CREATE TABLE STAGE (ID INTEGER, A VARCHAR(255))", ())?;
/// # Ok::<(), odbc_api::Error>(())
/// ```
pub struct Connection<'c> {
    connection: handles::Connection<'c>,
}

impl Drop for Connection<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.connection.disconnect().into_result(&self.connection) {
            // Avoid panicking, if we already have a panic. We don't want to mask the original
            // error.
            if !panicking() {
                panic!("Unexpected error disconnecting: {:?}", e)
            }
        }
    }
}

impl<'c> Connection<'c> {
    pub(crate) fn new(connection: handles::Connection<'c>) -> Self {
        Self { connection }
    }

    /// Executes a statement once, without preparing it. This is the fastest way to submit an SQL
    /// statement for one-time execution.
    ///
    /// # Parameters
    ///
    /// * `query`: The text representation of the SQL statement. E.g. "SELECT * FROM my_table;".
    /// * `params`: `?` may be used as a placeholder in the statement text. You can use `()` to
    ///   represent no parameters. Check the [`crate::parameter`] module level documentation for
    ///   more information on how to pass parameters.
    ///
    /// # Return
    ///
    /// Returns `Some` if a cursor is created. If `None` is returned no cursor has been created (
    /// e.g. the statement came back empty, as is common for `INSERT`/`UPDATE`/`DELETE`).
    pub fn execute(
        &self,
        query: &str,
        params: impl ParameterRefCollection,
    ) -> Result<Option<CursorImpl<StatementImpl<'_>>>, Error> {
        let query = SqlText::new(query);
        execute_with_parameters(
            move || {
                self.connection
                    .allocate_statement()
                    .into_result(&self.connection)
            },
            Some(&query),
            params,
        )
    }

    /// Prepares an SQL statement. Prepared statements are useful if the same statement is executed
    /// more than once, since the driver only needs to parse and plan the statement once, reusing
    /// this work for consecutive executions.
    pub fn prepare(&self, query: &str) -> Result<Prepared<StatementImpl<'_>>, Error> {
        let query = SqlText::new(query);
        let mut stmt = self
            .connection
            .allocate_statement()
            .into_result(&self.connection)?;
        stmt.prepare(&query).into_result(&stmt)?;
        Ok(Prepared::new(stmt))
    }

    /// Allocates a new statement handle, without binding it to a query or parameters yet. This can
    /// be used to sequentially execute different queries (or the same query with different
    /// parameters) while only allocating the statement handle once.
    pub fn preallocate(&self) -> Result<Preallocated<StatementImpl<'_>>, Error> {
        let stmt = self
            .connection
            .allocate_statement()
            .into_result(&self.connection)?;
        Ok(unsafe { Preallocated::new(stmt) })
    }

    /// Specify the transaction mode. By default, ODBC transactions are in auto-commit mode (unless
    /// your driver deviates from the standard). Switching from manual-commit mode to auto-commit
    /// mode automatically commits any open transaction on the connection. Switching to manual
    /// commit mode lets you group statements into a transaction using [`Self::commit`] and
    /// [`Self::rollback`].
    pub fn set_autocommit(&self, enabled: bool) -> Result<(), Error> {
        self.connection
            .set_autocommit(enabled)
            .into_result(&self.connection)
    }

    /// Commits a transaction previously started in manual-commit mode (see
    /// [`Self::set_autocommit`]).
    pub fn commit(&self) -> Result<(), Error> {
        self.connection.commit().into_result(&self.connection)
    }

    /// Rolls back a transaction previously started in manual-commit mode (see
    /// [`Self::set_autocommit`]), discarding any changes made since the last commit.
    pub fn rollback(&self) -> Result<(), Error> {
        self.connection.rollback().into_result(&self.connection)
    }

    /// Indicates the state of the connection. If `true` the connection has been lost. If `false`,
    /// the connection is still active. Useful for deciding whether a connection taken from a pool
    /// needs to be discarded rather than reused.
    pub fn is_dead(&self) -> Result<bool, Error> {
        self.connection.is_dead().into_result(&self.connection)
    }

    /// Name of the database management system used by the connection.
    pub fn database_management_system_name(&self) -> Result<String, Error> {
        let mut buf = Vec::with_capacity(128);
        self.connection
            .fetch_database_management_system_name(&mut buf)
            .into_result(&self.connection)?;
        Ok(slice_to_utf8(&buf).unwrap())
    }

    /// Name of the catalog currently in use by the connection, if any.
    pub fn current_catalog(&self) -> Result<String, Error> {
        let mut buf = Vec::with_capacity(128);
        self.connection
            .fetch_current_catalog(&mut buf)
            .into_result(&self.connection)?;
        Ok(slice_to_utf8(&buf).unwrap())
    }
}

/// Escapes a value so it may be safely embedded as the value part of a `Key=Value` pair in an
/// ODBC connection string, by enclosing it in curly braces and doubling any brace found within.
///
/// See: <https://learn.microsoft.com/en-us/sql/odbc/reference/syntax/sqldriverconnect-function>
///
/// ```
/// use odbc_api::escape_attribute_value;
///
/// assert_eq!("NoSpecialCharacters", escape_attribute_value("NoSpecialCharacters"));
/// assert_eq!("{Driver={ODBC Driver 17}}}", escape_attribute_value("Driver={ODBC Driver 17}"));
/// assert_eq!("{Pwd=abc;123}", escape_attribute_value("Pwd=abc;123"));
/// ```
pub fn escape_attribute_value(unescaped: &str) -> String {
    // Search for special characters mentioned in the connection string grammar. If none are
    // present the value is used verbatim.
    const SPECIAL: [char; 8] = ['[', ']', '{', '}', '(', ')', ',', ';'];
    if !unescaped.contains(|c: char| SPECIAL.contains(&c)) {
        return unescaped.to_string();
    }

    let mut escaped = String::with_capacity(unescaped.len() + 2);
    escaped.push('{');
    for c in unescaped.chars() {
        if c == '}' {
            escaped.push('}');
        }
        escaped.push(c);
    }
    escaped.push('}');
    escaped
}
