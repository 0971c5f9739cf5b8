use std::io;

use thiserror::Error as ThisError;

use crate::handles::{log_diagnostics, AsHandle, Record as DiagnosticRecord, SqlResult};

#[derive(Debug, ThisError)]
/// Error type used to indicate a low level ODBC call returned with SQL_ERROR.
pub enum Error {
    /// No Diagnostics available. This is usually the case if allocation of the ODBC Environment
    /// itself fails. In that case no object exist to obtain the diagnostic record from.
    #[error("No Diagnostics available.")]
    NoDiagnostics,
    /// SQL Error had been returned by a low level ODBC function call. A Diagnostic record is
    /// obtained and associated with this error.
    #[error("ODBC emitted an error calling '{function}':\n{record}")]
    Diagnostics {
        /// Diagnostic record returned by the ODBC driver manager
        record: DiagnosticRecord,
        /// ODBC API call which produced the diagnostic record
        function: &'static str,
    },
    /// A user dialog to complete the connection string has been aborted.
    #[error("The dialog shown to provide or complete the connection string has been aborted.")]
    AbortedConnectionStringCompletion,
    /// An error returned if we fail to set the ODBC version
    #[error(
        "ODBC diver manager does not seem to support the required ODBC version 3.80. (Most \
        likely you need to update unixODBC if you run on a Linux. Diagnostic record returned by \
        SQLSetEnvAttr:\n{0}"
    )]
    UnsupportedOdbcApiVersion(DiagnosticRecord),
    /// An error emitted by an `std::io::ReadBuf` implementation used as an input argument.
    #[error("Sending data to the database at statement execution time failed. IO error:\n{0}")]
    FailedReadingInput(io::Error),
    /// Driver returned "invalid attribute" then setting the row array size. Most likely the array
    /// size is to large. Instead of returing "option value changed (SQLSTATE 01S02)" like suggested
    /// in <https://docs.microsoft.com/en-us/sql/odbc/reference/syntax/sqlsetstmtattr-function> the
    /// driver returned an error instead.
    #[error(
        "An invalid row array size (aka. batch size) has been set. The ODBC drivers should just \
        emit a warning and emmit smaller batches, but not all do (yours does not at least). Try \
        fetching data from the database in smaller batches.\nRow array size (aka. batch size): \
        {size}\n Diagnostic record returned by SQLSetEnvAttr:\n{record}"
    )]
    InvalidRowArraySize {
        record: DiagnosticRecord,
        size: usize,
    },
    /// A value read from the database could not be represented, because the indicator reported
    /// by the driver requires a sentinel value the buffer does not support.
    #[error(
        "A value read from the database could not be represented, because the driver did not \
        report the required length and no sentinel value is supported by this buffer.\n{0}"
    )]
    UnableToRepresentNull(DiagnosticRecord),
    /// A value returned by the data source was larger than the output buffer used to fetch it,
    /// and the cursor was configured to treat truncation as an error.
    #[error(
        "A value returned by the data source was too large for the output buffer at buffer \
        index {buffer_index}. Reported length of the complete value: {indicator:?}"
    )]
    TooLargeValueForBuffer {
        /// Length reported by the driver for the truncated value, if any.
        indicator: Option<usize>,
        /// Zero based index of the buffer the value has been truncated in.
        buffer_index: usize,
    },
    /// The amount of memory required to allocate a column buffer either overflowed `isize` or
    /// exceeded the amount available on the system.
    #[error(
        "Column buffer at index {buffer_index} is too large to be allocated. It would require \
        {num_elements} elements of {element_size} bytes each."
    )]
    TooLargeColumnBufferSize {
        /// Zero based index of the buffer which could not be allocated.
        buffer_index: usize,
        /// Number of elements the buffer was supposed to hold.
        num_elements: usize,
        /// Size in bytes of a single element of the buffer.
        element_size: usize,
    },
}

/// Emitted if allocating a buffer for a column would either overflow `isize` or exceed the
/// available memory of the system. Usually the result of an implausibly large maximum element
/// length being reported for a column by the driver.
#[derive(Debug, ThisError)]
#[error(
    "Requested column buffer size of {num_elements} elements of {element_size} bytes each is too \
    large to be allocated."
)]
pub struct TooLargeBufferSize {
    /// Number of elements the buffer was supposed to hold.
    pub num_elements: usize,
    /// Size in bytes of a single element of the buffer.
    pub element_size: usize,
}

impl TooLargeBufferSize {
    /// Adds the buffer index to the error, turning it into a full [`Error`].
    pub fn add_context(self, buffer_index: usize) -> Error {
        Error::TooLargeColumnBufferSize {
            buffer_index,
            num_elements: self.num_elements,
            element_size: self.element_size,
        }
    }
}

/// Extension trait used to remap the generic [`Error::Diagnostics`] variant produced by
/// [`SqlResult::into_result`] into a more specific error variant, based on the SQLSTATE carried by
/// the diagnostic record.
pub trait ProvideContextForDiagnostic {
    /// Inspects the diagnostic record (if any) contained in `self` and gives the caller a chance
    /// to remap it into a more specific error.
    fn provide_context_for_diagnostic(
        self,
        f: impl FnOnce(DiagnosticRecord, &'static str) -> Error,
    ) -> Self;
}

impl<T> ProvideContextForDiagnostic for Result<T, Error> {
    fn provide_context_for_diagnostic(
        self,
        f: impl FnOnce(DiagnosticRecord, &'static str) -> Error,
    ) -> Self {
        self.map_err(|error| match error {
            Error::Diagnostics { record, function } => f(record, function),
            other => other,
        })
    }
}

/// Extension trait turning the `Option<SqlResult<()>>` produced by ODBC calls which may answer
/// with `SQL_NO_DATA` (e.g. `SQLFetch`, `SQLExecute`, `SQLMoreResults`) into a plain boolean
/// result: `true` if there was data, `false` on `SQL_NO_DATA`.
pub trait ExtendResult {
    /// `Ok(false)` if `self` is `None` (i.e. `SQL_NO_DATA`), `Ok(true)` on success, `Err` on
    /// failure.
    fn into_result_bool(self, handle: &dyn AsHandle) -> Result<bool, Error>;
}

impl ExtendResult for Option<SqlResult<()>> {
    fn into_result_bool(self, handle: &dyn AsHandle) -> Result<bool, Error> {
        match self {
            Some(result) => result.into_result(handle).map(|()| true),
            None => Ok(false),
        }
    }
}

// Define that here rather than in `sql_result` mod to keep the `handles` modlue entirely agnostic
// about the top level `Error` type.
impl<T> SqlResult<T> {
    pub fn into_result(self, handle: &dyn AsHandle) -> Result<T, Error> {
        match self {
            // The function has been executed successfully. Holds result.
            SqlResult::Success(value) => Ok(value),
            // The function has been executed successfully. There have been warnings. Holds result.
            SqlResult::SuccessWithInfo(value) => {
                log_diagnostics(handle);
                Ok(value)
            }
            SqlResult::Error { function } => {
                let mut record = DiagnosticRecord::default();
                if record.fill_from(handle, 1) {
                    log_diagnostics(handle);
                    Err(Error::Diagnostics { record, function })
                } else {
                    Err(Error::NoDiagnostics)
                }
            }
        }
    }
}
