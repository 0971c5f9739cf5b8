use std::{
    convert::TryInto,
    marker::PhantomData,
    ptr::null_mut,
};

use log::debug;
use odbc_sys::{
    CDataType, Desc, FreeStmtOption, HDbc, HStmt, Handle, HandleType, Len, ParamType, Pointer,
    SQLBindCol, SQLBindParameter, SQLCloseCursor, SQLColAttributeW, SQLDescribeColW,
    SQLDescribeParam, SQLExecDirectW, SQLExecute, SQLFetch, SQLFreeStmt, SQLMoreResults,
    SQLNumParams, SQLNumResultCols, SQLParamData, SQLPutData, SQLRowCount, SQLSetStmtAttrW,
    SqlDataType, SqlReturn, StatementAttribute, ULen,
};

use super::{
    as_handle::AsHandle,
    buffer::{clamp_small_int, mut_buf_ptr},
    column_description::{ColumnDescription, Nullability},
    data_type::DataType,
    drop_handle,
    sql_char::SqlText,
    sql_result::ExtSqlReturn,
    CData, CDataMut, DelayedInput, HasDataType, SqlResult,
};

fn to_nullability(nullable: odbc_sys::Nullable) -> Nullability {
    match nullable {
        odbc_sys::Nullable::NO_NULLS => Nullability::NoNulls,
        odbc_sys::Nullable::NULLABLE => Nullability::Nullable,
        _ => Nullability::Unknown,
    }
}

/// Wrapper around a valid (i.e. successfully allocated) ODBC statement handle.
///
/// The only method implementers must provide is [`Statement::as_sys`]; everything else has a
/// default implementation built on top of it. This lets generic code like [`crate::Cursor`] or
/// [`crate::ResultSetMetadata`] work the same, whether they own the statement
/// ([`StatementImpl`]) or merely borrow it ([`StatementRef`]).
pub trait Statement: AsHandle {
    /// Exposes the raw underlying ODBC statement handle.
    fn as_sys(&self) -> HStmt;

    /// Executes a statement. This is the fastest way to submit an SQL statement for one-time
    /// execution.
    ///
    /// `true` is returned if a delayed parameter (see [`crate::parameter::Blob`]) bound to the
    /// statement requires its data to be streamed via [`Self::param_data`] and
    /// [`Self::put_binary_batch`] before the statement is considered executed.
    ///
    /// # Safety
    ///
    /// While the statement is executing the application must not invalidate any buffer bound as
    /// a parameter.
    unsafe fn exec_direct(&mut self, statement_text: &SqlText) -> SqlResult<bool> {
        match unsafe {
            SQLExecDirectW(
                self.as_sys(),
                statement_text.ptr(),
                statement_text.len_char(),
            )
        } {
            SqlReturn::NEED_DATA => SqlResult::Success(true),
            // A searched update or delete statement that does not affect any rows at the data
            // source.
            SqlReturn::NO_DATA => SqlResult::Success(false),
            other => other.into_sql_result("SQLExecDirectW").on_success(|| false),
        }
    }

    /// Executes a prepared statement, using the current values of the parameter marker
    /// variables, if any.
    ///
    /// `true` is returned if a delayed parameter (see [`crate::parameter::Blob`]) bound to the
    /// statement requires its data to be streamed via [`Self::param_data`] and
    /// [`Self::put_binary_batch`] before the statement is considered executed.
    ///
    /// # Safety
    ///
    /// While the statement is executing the application must not invalidate any buffer bound as
    /// a parameter.
    unsafe fn execute(&mut self) -> SqlResult<bool> {
        match unsafe { SQLExecute(self.as_sys()) } {
            SqlReturn::NEED_DATA => SqlResult::Success(true),
            // A searched update or delete statement that does not affect any rows at the data
            // source.
            SqlReturn::NO_DATA => SqlResult::Success(false),
            other => other.into_sql_result("SQLExecute").on_success(|| false),
        }
    }

    /// Prepares a statement for execution with [`Self::execute`].
    fn prepare(&mut self, statement_text: &SqlText) -> SqlResult<()> {
        unsafe {
            odbc_sys::SQLPrepareW(self.as_sys(), statement_text.ptr(), statement_text.len_char())
                .into_sql_result("SQLPrepareW")
        }
    }

    /// Close an open cursor, discarding pending results.
    fn close_cursor(&mut self) -> SqlResult<()> {
        unsafe { SQLCloseCursor(self.as_sys()).into_sql_result("SQLCloseCursor") }
    }

    /// Number of columns in the result set of this statement. Can also be used to check whether
    /// a result set has been created at all.
    fn num_result_cols(&self) -> SqlResult<i16> {
        let mut out: i16 = 0;
        unsafe { SQLNumResultCols(self.as_sys(), &mut out) }
            .into_sql_result("SQLNumResultCols")
            .on_success(|| out)
    }

    /// Number of placeholders in a prepared statement.
    fn num_params(&self) -> SqlResult<u16> {
        let mut out: i16 = 0;
        unsafe { SQLNumParams(self.as_sys(), &mut out) }
            .into_sql_result("SQLNumParams")
            .on_success(|| out.try_into().unwrap())
    }

    /// Retrieves the next rowset of data, causing the bound column buffers to hold the fetched
    /// values.
    ///
    /// # Safety
    ///
    /// Buffers bound with [`Self::bind_col`] must stay valid and must not be rebound while the
    /// statement may fetch into them.
    unsafe fn fetch(&mut self) -> Option<SqlResult<()>> {
        unsafe { SQLFetch(self.as_sys()).into_opt_sql_result("SQLFetch") }
    }

    /// Determines whether more results are available on the statement, and if so initializes
    /// processing for these. Allows a statement producing multiple result sets to be processed.
    ///
    /// # Safety
    ///
    /// Discards the previous result set, invalidating any buffer still bound to it.
    unsafe fn more_results(&mut self) -> Option<SqlResult<()>> {
        unsafe { SQLMoreResults(self.as_sys()).into_opt_sql_result("SQLMoreResults") }
    }

    /// Release all column buffers bound by [`Self::bind_col`]. Except the bookmark column.
    fn unbind_cols(&mut self) -> SqlResult<()> {
        unsafe { SQLFreeStmt(self.as_sys(), FreeStmtOption::Unbind) }
            .into_sql_result("SQLFreeStmt")
    }

    /// Sets `SQL_DESC_COUNT` of the APD to `0`, releasing all parameter buffers bound by
    /// [`Self::bind_input_parameter`].
    fn reset_parameters(&mut self) -> SqlResult<()> {
        unsafe { SQLFreeStmt(self.as_sys(), FreeStmtOption::ResetParams) }
            .into_sql_result("SQLFreeStmt")
    }

    /// Binds an application data buffer to a column in the result set.
    ///
    /// * `column_number`: `0` is the bookmark column. Other columns start at `1`.
    ///
    /// # Safety
    ///
    /// It is the callers responsibility to make sure the bound column lives until it is no
    /// longer bound.
    unsafe fn bind_col(
        &mut self,
        column_number: u16,
        target: &mut impl CDataMut,
    ) -> SqlResult<()> {
        unsafe {
            SQLBindCol(
                self.as_sys(),
                column_number,
                target.cdata_type(),
                target.mut_value_ptr(),
                target.buffer_length(),
                target.mut_indicator_ptr(),
            )
            .into_sql_result("SQLBindCol")
        }
    }

    /// Binds a buffer holding one or more parameter values to a parameter marker.
    ///
    /// # Safety
    ///
    /// * It is up to the caller to ensure the lifetime of the bound parameter.
    /// * Calling this function may influence other statements which share the APD.
    unsafe fn bind_input_parameter(
        &mut self,
        parameter_number: u16,
        parameter: &(impl CData + HasDataType),
    ) -> SqlResult<()> {
        let parameter_type = parameter.data_type();
        unsafe {
            SQLBindParameter(
                self.as_sys(),
                parameter_number,
                ParamType::Input,
                parameter.cdata_type(),
                parameter_type.data_type(),
                parameter_type.column_size(),
                parameter_type.decimal_digits(),
                // We cast const to mut here, but specify the input/output type as input.
                parameter.value_ptr() as Pointer,
                parameter.buffer_length(),
                parameter.indicator_ptr() as *mut Len,
            )
            .into_sql_result("SQLBindParameter")
        }
    }

    /// Binds a buffer holding a single parameter to a parameter marker in an SQL statement, as
    /// either an input, output or input/output parameter. To bind input parameters using constant
    /// references see [`Statement::bind_input_parameter`].
    ///
    /// # Safety
    ///
    /// * It is up to the caller to ensure the lifetime of the bound parameter.
    /// * Calling this function may influence other statements which share the APD.
    unsafe fn bind_parameter(
        &mut self,
        parameter_number: u16,
        input_output_type: ParamType,
        parameter: &mut (impl CDataMut + HasDataType),
    ) -> SqlResult<()> {
        let parameter_type = parameter.data_type();
        unsafe {
            SQLBindParameter(
                self.as_sys(),
                parameter_number,
                input_output_type,
                parameter.cdata_type(),
                parameter_type.data_type(),
                parameter_type.column_size(),
                parameter_type.decimal_digits(),
                parameter.value_ptr() as Pointer,
                parameter.buffer_length(),
                parameter.mut_indicator_ptr() as *mut Len,
            )
            .into_sql_result("SQLBindParameter")
        }
    }

    /// Binds a delayed parameter (see [`crate::parameter::Blob`]), whose contents are streamed to
    /// the database via `SQLParamData`/`SQLPutData` at statement execution time, instead of being
    /// read from a fixed buffer.
    ///
    /// # Safety
    ///
    /// * It is up to the caller to ensure the lifetime of the bound parameter.
    /// * Calling this function may influence other statements which share the APD.
    unsafe fn bind_delayed_input_parameter(
        &mut self,
        parameter_number: u16,
        parameter: &mut (impl DelayedInput + HasDataType),
    ) -> SqlResult<()> {
        let parameter_type = parameter.data_type();
        unsafe {
            SQLBindParameter(
                self.as_sys(),
                parameter_number,
                ParamType::Input,
                parameter.cdata_type(),
                parameter_type.data_type(),
                parameter_type.column_size(),
                parameter_type.decimal_digits(),
                parameter.stream_ptr(),
                0,
                // We cast const to mut here, but we specify the input/output type as input.
                parameter.indicator_ptr() as *mut Len,
            )
            .into_sql_result("SQLBindParameter")
        }
    }

    /// Queries which delayed parameter the driver wants data for next, identified by the pointer
    /// passed to [`Self::bind_delayed_input_parameter`]. `None` once every delayed parameter has
    /// been supplied and the statement is executed.
    ///
    /// # Safety
    ///
    /// Must only be called after [`Self::exec_direct`] or [`Self::execute`] signalled that a
    /// delayed parameter requires data.
    unsafe fn param_data(&mut self) -> SqlResult<Option<Pointer>> {
        let mut param_id: Pointer = null_mut();
        match unsafe { SQLParamData(self.as_sys(), &mut param_id as *mut Pointer) } {
            SqlReturn::NEED_DATA => SqlResult::Success(Some(param_id)),
            other => other.into_sql_result("SQLParamData").on_success(|| None),
        }
    }

    /// Puts a batch of binary data for the delayed parameter currently requested by the driver
    /// (see [`Self::param_data`]).
    ///
    /// Panics if `batch` is empty.
    ///
    /// # Safety
    ///
    /// Must only be called after [`Self::param_data`] returned `Some`.
    unsafe fn put_binary_batch(&mut self, batch: &[u8]) -> SqlResult<()> {
        assert!(!batch.is_empty(), "attempt to put empty batch into data source");
        unsafe {
            SQLPutData(
                self.as_sys(),
                batch.as_ptr() as Pointer,
                batch.len().try_into().unwrap(),
            )
            .into_sql_result("SQLPutData")
        }
    }

    /// Number of rows affected by the last `INSERT`, `UPDATE` or `DELETE`. `-1` if not available.
    fn row_count(&self) -> SqlResult<isize> {
        let mut out = 0isize;
        unsafe { SQLRowCount(self.as_sys(), &mut out) }
            .into_sql_result("SQLRowCount")
            .on_success(|| out)
    }

    /// Sets the batch size for bulk cursors, if retrieving many rows at once.
    ///
    /// # Safety
    ///
    /// Buffers bound using [`Self::bind_col`] must hold at least `size` rows.
    unsafe fn set_row_array_size(&mut self, size: usize) -> SqlResult<()> {
        assert!(size > 0);
        unsafe {
            SQLSetStmtAttrW(
                self.as_sys(),
                StatementAttribute::RowArraySize,
                size as Pointer,
                0,
            )
            .into_sql_result("SQLSetStmtAttrW")
        }
    }

    /// Sets the number of values bound per parameter, i.e. the array size for bulk parameter
    /// arrays.
    ///
    /// # Safety
    ///
    /// The bound parameter buffers must hold at least `size` elements.
    unsafe fn set_paramset_size(&mut self, size: usize) -> SqlResult<()> {
        assert!(size > 0);
        unsafe {
            SQLSetStmtAttrW(
                self.as_sys(),
                StatementAttribute::ParamsetSize,
                size as Pointer,
                0,
            )
            .into_sql_result("SQLSetStmtAttrW")
        }
    }

    /// Sets the binding type for bulk row set buffers. `0` indicates columnar binding, any
    /// positive number indicates row wise binding with that row length.
    ///
    /// # Safety
    ///
    /// Invalidates layout assumptions of any buffer currently bound.
    unsafe fn set_row_bind_type(&mut self, row_size: usize) -> SqlResult<()> {
        unsafe {
            SQLSetStmtAttrW(
                self.as_sys(),
                StatementAttribute::RowBindType,
                row_size as Pointer,
                0,
            )
            .into_sql_result("SQLSetStmtAttrW")
        }
    }

    /// Binds an integer to hold the number of rows retrieved by fetch in the current rowset.
    ///
    /// # Safety
    ///
    /// `num_rows` must not be moved and must remain valid as long as it stays bound.
    unsafe fn set_num_rows_fetched(&mut self, num_rows: &mut usize) -> SqlResult<()> {
        unsafe {
            SQLSetStmtAttrW(
                self.as_sys(),
                StatementAttribute::RowsFetchedPtr,
                num_rows as *mut usize as Pointer,
                0,
            )
            .into_sql_result("SQLSetStmtAttrW")
        }
    }

    /// Unbinds the pointer previously set with [`Self::set_num_rows_fetched`].
    fn unset_num_rows_fetched(&mut self) -> SqlResult<()> {
        unsafe {
            SQLSetStmtAttrW(
                self.as_sys(),
                StatementAttribute::RowsFetchedPtr,
                null_mut(),
                0,
            )
            .into_sql_result("SQLSetStmtAttrW")
        }
    }

    /// `true` if a given column in a result set is unsigned or not a numeric type, `false`
    /// otherwise. `column_number` starts at 1.
    fn is_unsigned_column(&self, column_number: u16) -> SqlResult<bool> {
        self.numeric_col_attribute(Desc::Unsigned, column_number)
            .map(|out| out != 0)
    }

    /// The concise SQL data type of the column. `column_number` starts at 1.
    fn col_concise_type(&self, column_number: u16) -> SqlResult<SqlDataType> {
        self.numeric_col_attribute(Desc::ConciseType, column_number)
            .map(|out| SqlDataType(out.try_into().unwrap()))
    }

    /// Size in bytes of the column. For variable sized types the maximum size is returned,
    /// excluding a terminating zero. `column_number` starts at 1.
    fn col_octet_length(&self, column_number: u16) -> SqlResult<isize> {
        self.numeric_col_attribute(Desc::OctetLength, column_number)
    }

    /// Maximum number of characters required to display data from the column. `column_number`
    /// starts at 1.
    fn col_display_size(&self, column_number: u16) -> SqlResult<isize> {
        self.numeric_col_attribute(Desc::DisplaySize, column_number)
    }

    /// Precision of the column.
    fn col_precision(&self, column_number: u16) -> SqlResult<isize> {
        self.numeric_col_attribute(Desc::Precision, column_number)
    }

    /// The applicable scale for a numeric data type.
    fn col_scale(&self, column_number: u16) -> SqlResult<isize> {
        self.numeric_col_attribute(Desc::Scale, column_number)
    }

    /// The column alias, or, if it does not apply, the column name. `column_number` starts at 1.
    fn col_name(&self, column_number: u16, buf: &mut Vec<u16>) -> SqlResult<()> {
        let mut string_length_in_bytes: i16 = 0;
        buf.resize(buf.capacity().max(1), 0);
        let result = unsafe {
            SQLColAttributeW(
                self.as_sys(),
                column_number,
                Desc::Name,
                mut_buf_ptr(buf) as Pointer,
                (buf.len() * 2).try_into().unwrap(),
                &mut string_length_in_bytes,
                null_mut(),
            )
        }
        .into_sql_result("SQLColAttributeW");
        if result.is_err() {
            return result;
        }
        if clamp_small_int(buf.len() * 2) < string_length_in_bytes + 2 {
            buf.resize((string_length_in_bytes / 2 + 1).try_into().unwrap(), 0);
            let result = unsafe {
                SQLColAttributeW(
                    self.as_sys(),
                    column_number,
                    Desc::Name,
                    mut_buf_ptr(buf) as Pointer,
                    (buf.len() * 2).try_into().unwrap(),
                    &mut string_length_in_bytes,
                    null_mut(),
                )
            }
            .into_sql_result("SQLColAttributeW");
            if result.is_err() {
                return result;
            }
        }
        buf.resize(((string_length_in_bytes + 1) / 2).try_into().unwrap(), 0);
        SqlResult::Success(())
    }

    /// Fetch a column description using the column index. `0` is the bookmark column.
    fn describe_col(
        &self,
        column_number: u16,
        column_description: &mut ColumnDescription,
    ) -> SqlResult<()> {
        let name = &mut column_description.name;
        name.resize(name.capacity().max(64), 0);
        let mut name_length: i16 = 0;
        let mut data_type = SqlDataType::UNKNOWN_TYPE;
        let mut column_size = 0;
        let mut decimal_digits = 0;
        let mut nullable = odbc_sys::Nullable::UNKNOWN;

        let result = unsafe {
            SQLDescribeColW(
                self.as_sys(),
                column_number,
                mut_buf_ptr(name),
                clamp_small_int(name.len()),
                &mut name_length,
                &mut data_type,
                &mut column_size,
                &mut decimal_digits,
                &mut nullable,
            )
        }
        .into_sql_result("SQLDescribeColW");

        if result.is_err() {
            return result;
        }

        column_description.nullable = to_nullability(nullable);

        if name_length + 1 > clamp_small_int(name.len()) {
            // Buffer was too small to hold the name, retry with a larger one.
            name.resize(name_length as usize + 1, 0);
            self.describe_col(column_number, column_description)
        } else {
            name.resize(name_length as usize, 0);
            column_description.data_type = DataType::new(data_type, column_size, decimal_digits);
            SqlResult::Success(())
        }
    }

    /// Describes a parameter marker of a prepared statement. `parameter_number` starts at 1.
    fn describe_param(&self, parameter_number: u16) -> SqlResult<ParameterDescription> {
        let mut data_type = SqlDataType::UNKNOWN_TYPE;
        let mut parameter_size = 0;
        let mut decimal_digits = 0;
        let mut nullable = odbc_sys::Nullable::UNKNOWN;

        unsafe {
            SQLDescribeParam(
                self.as_sys(),
                parameter_number,
                &mut data_type,
                &mut parameter_size,
                &mut decimal_digits,
                &mut nullable,
            )
        }
        .into_sql_result("SQLDescribeParam")
        .on_success(|| ParameterDescription {
            data_type: DataType::new(data_type, parameter_size, decimal_digits),
            nullable: to_nullability(nullable),
        })
    }

    /// Seconds to wait for a SQL statement to execute before returning. `0` means no timeout.
    fn query_timeout_sec(&self) -> SqlResult<usize> {
        let mut timeout: ULen = 0;
        unsafe {
            odbc_sys::SQLGetStmtAttrW(
                self.as_sys(),
                StatementAttribute::QueryTimeout,
                &mut timeout as *mut ULen as Pointer,
                0,
                null_mut(),
            )
        }
        .into_sql_result("SQLGetStmtAttrW")
        .on_success(|| timeout as usize)
    }

    /// Sets the number of seconds to wait for a SQL statement to execute.
    fn set_query_timeout_sec(&mut self, timeout_sec: usize) -> SqlResult<()> {
        unsafe {
            SQLSetStmtAttrW(
                self.as_sys(),
                StatementAttribute::QueryTimeout,
                timeout_sec as Pointer,
                0,
            )
        }
        .into_sql_result("SQLSetStmtAttrW")
    }

    /// # Safety
    ///
    /// Caller must ensure `attribute` refers to a numeric column attribute.
    fn numeric_col_attribute(&self, attribute: Desc, column_number: u16) -> SqlResult<isize> {
        let mut out: isize = 0;
        unsafe {
            SQLColAttributeW(
                self.as_sys(),
                column_number,
                attribute,
                null_mut(),
                0,
                null_mut(),
                &mut out,
            )
        }
        .into_sql_result("SQLColAttributeW")
        .on_success(|| out)
    }
}

/// Description of a parameter associated with a parameter marker in a prepared statement.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ParameterDescription {
    /// Indicates whether the parameter may be bound to `NULL`.
    pub nullable: Nullability,
    /// SQL data type of the parameter.
    pub data_type: DataType,
}

/// An owned, valid ODBC statement handle, allocated against a parent connection whose lifetime
/// `'s` it borrows.
pub struct StatementImpl<'s> {
    parent: PhantomData<&'s HDbc>,
    handle: HStmt,
}

impl<'s> StatementImpl<'s> {
    /// # Safety
    ///
    /// `handle` must be a valid (i.e. successfully allocated) statement handle, outliving `'s`.
    pub unsafe fn new(handle: HStmt) -> Self {
        Self {
            handle,
            parent: PhantomData,
        }
    }

    /// Transfers ownership of the underlying statement handle to the caller without calling
    /// `SQLFreeHandle`.
    pub fn into_sys(self) -> HStmt {
        let handle = self.handle;
        std::mem::forget(self);
        handle
    }

    /// Provides a non owning [`StatementRef`] borrowing this statement.
    pub fn as_stmt_ref(&mut self) -> StatementRef<'_> {
        unsafe { StatementRef::new(self.handle) }
    }
}

unsafe impl AsHandle for StatementImpl<'_> {
    fn as_handle(&self) -> Handle {
        self.handle as Handle
    }

    fn handle_type(&self) -> HandleType {
        HandleType::Stmt
    }
}

impl Statement for StatementImpl<'_> {
    fn as_sys(&self) -> HStmt {
        self.handle
    }
}

impl Drop for StatementImpl<'_> {
    fn drop(&mut self) {
        debug!("Dropping statement {:?}", self.handle);
        unsafe { drop_handle(self.handle as Handle, HandleType::Stmt) }
    }
}

unsafe impl Send for StatementImpl<'_> {}

/// A non owning reference to a valid ODBC statement handle. Cheap to construct escape hatch
/// allowing consumers to be generic over whoever owns the statement.
#[derive(Debug, Clone, Copy)]
pub struct StatementRef<'s> {
    parent: PhantomData<&'s ()>,
    handle: HStmt,
}

impl<'s> StatementRef<'s> {
    /// # Safety
    ///
    /// `handle` must be a valid statement handle, valid for at least `'s`.
    pub unsafe fn new(handle: HStmt) -> Self {
        Self {
            parent: PhantomData,
            handle,
        }
    }
}

unsafe impl AsHandle for StatementRef<'_> {
    fn as_handle(&self) -> Handle {
        self.handle as Handle
    }

    fn handle_type(&self) -> HandleType {
        HandleType::Stmt
    }
}

impl Statement for StatementRef<'_> {
    fn as_sys(&self) -> HStmt {
        self.handle
    }
}

unsafe impl Send for StatementRef<'_> {}

/// Anything able to provide a [`StatementRef`] borrowing the statement it wraps, independent of
/// how it owns (or borrows) the underlying handle. Allows generic code like
/// [`crate::ResultSetMetadata`] or [`crate::Cursor`] to work both with owning handles
/// ([`StatementImpl`]) and borrowed ones ([`StatementRef`]).
pub trait AsStatementRef {
    /// Statement type of the borrow. Always an instantiation of [`Statement`].
    type Statement: Statement;

    /// Get an exclusive reference to the underlying statement handle.
    fn as_stmt_ref(&mut self) -> StatementRef<'_>;
}

impl<'o> AsStatementRef for StatementImpl<'o> {
    type Statement = StatementImpl<'o>;

    fn as_stmt_ref(&mut self) -> StatementRef<'_> {
        StatementImpl::as_stmt_ref(self)
    }
}

impl<'o> AsStatementRef for StatementRef<'o> {
    type Statement = StatementRef<'o>;

    fn as_stmt_ref(&mut self) -> StatementRef<'_> {
        unsafe { StatementRef::new(self.handle) }
    }
}

impl<S> AsStatementRef for &mut S
where
    S: AsStatementRef,
{
    type Statement = S::Statement;

    fn as_stmt_ref(&mut self) -> StatementRef<'_> {
        (**self).as_stmt_ref()
    }
}
