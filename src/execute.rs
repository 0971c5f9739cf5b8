use crate::{
    error::ExtendResult,
    handles::{AsStatementRef, SqlText, Statement},
    parameter::Blob,
    CursorImpl, Error, ParameterRefCollection,
};

/// Shared implementation for executing a query with parameters between [`crate::Connection`],
/// [`crate::Preallocated`] and [`crate::Prepared`].
///
/// # Parameters
///
/// * `lazy_statement`: Factory for statement handle used to execute the query. We pass the
///   statement lazily in order to avoid unnecessarily allocating a statement handle in case the
///   parameter set is empty.
/// * `query`: SQL query to be executed. If `None` it is assumed a prepared query is to be
///   executed.
/// * `params`: The parameters bound to the statement before query execution.
pub fn execute_with_parameters<S>(
    lazy_statement: impl FnOnce() -> Result<S, Error>,
    query: Option<&SqlText>,
    mut params: impl ParameterRefCollection,
) -> Result<Option<CursorImpl<S>>, Error>
where
    S: AsStatementRef,
{
    let paramset_size = params.parameter_set_size();
    if paramset_size == 0 {
        return Ok(None);
    }
    // Only allocate the statement, if we know we are going to execute something.
    let mut statement = lazy_statement()?;
    let has_result_set = {
        let mut stmt = statement.as_stmt_ref();
        // Reset parameters so we do not dereference stale ones by mistake if we call
        // `exec_direct`.
        stmt.reset_parameters().into_result(&stmt)?;
        unsafe {
            stmt.set_paramset_size(paramset_size).into_result(&stmt)?;
            // Bind new parameters passed by caller.
            params.bind_parameters_to(&mut stmt)?;
            let need_data = if let Some(sql) = query {
                stmt.exec_direct(sql).into_result(&stmt)?
            } else {
                stmt.execute().into_result(&stmt)?
            };
            if need_data {
                put_delayed_parameters(&mut stmt)?;
            }
        };
        stmt.num_result_cols().into_result(&stmt)? != 0
    };
    if has_result_set {
        Ok(Some(unsafe { CursorImpl::new(statement) }))
    } else {
        Ok(None)
    }
}

/// Executes a statement whose parameters have already been bound and are not meant to be rebound
/// for this call, e.g. a [`crate::ColumnarBulkInserter`] or a [`crate::Prebound`] statement.
///
/// # Safety
///
/// `statement` must have its parameters already bound, valid, and left in place for the duration
/// of the call.
pub unsafe fn execute<S>(
    mut statement: S,
    query: Option<&SqlText>,
) -> Result<Option<CursorImpl<S>>, Error>
where
    S: AsStatementRef,
{
    let has_result_set = {
        let mut stmt = statement.as_stmt_ref();
        let need_data = unsafe {
            if let Some(sql) = query {
                stmt.exec_direct(sql).into_result(&stmt)?
            } else {
                stmt.execute().into_result(&stmt)?
            }
        };
        if need_data {
            unsafe { put_delayed_parameters(&mut stmt)? };
        }
        stmt.num_result_cols().into_result(&stmt)? != 0
    };
    if has_result_set {
        Ok(Some(unsafe { CursorImpl::new(statement) }))
    } else {
        Ok(None)
    }
}

/// Drives `SQLParamData`/`SQLPutData` to completion for every delayed parameter (see
/// [`crate::parameter::Blob`]) bound to `stmt`, after `exec_direct` or `execute` reported that
/// data is needed.
///
/// # Safety
///
/// Every delayed parameter currently bound to `stmt` must have been bound via
/// [`Statement::bind_delayed_input_parameter`] with a pointer to a live `&mut dyn Blob`.
unsafe fn put_delayed_parameters(stmt: &mut impl Statement) -> Result<(), Error> {
    while let Some(param_id) = unsafe { stmt.param_data() }.into_result(stmt)? {
        let blob = unsafe { &mut *(param_id as *mut &mut dyn Blob) };
        while let Some(batch) = blob.next_batch().map_err(Error::FailedReadingInput)? {
            unsafe { stmt.put_binary_batch(batch) }.into_result(stmt)?;
        }
    }
    Ok(())
}
