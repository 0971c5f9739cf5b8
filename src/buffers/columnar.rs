use std::{collections::HashSet, str::Utf8Error};

use crate::{
    buffers::{text_column::CharColumn, Indicator},
    cursor::TruncationInfo,
    handles::{CDataMut, HasDataType, Statement, StatementRef},
    Cursor, Error, ParameterRefCollection, ResultSetMetadata, RowSetBuffer,
};

/// Projections for ColumnBuffers, allowing for reading writing data while bound as a rowset or
/// parameter buffer without invalidating invariants of the type.
///
/// Intended as part for the ColumnBuffer trait. Currently seperated to allow to compile without
/// GAT.
///
/// # Safety
///
/// View may not allow access to invalid rows.
pub unsafe trait ColumnProjections<'a> {
    /// Immutable view on the column data. Used in safe abstractions. User must not be able to
    /// access uninitialized or invalid memory of the buffer through this interface.
    type View;

    /// Used to gain access to the buffer, if bound as a parameter for inserting.
    type ViewMut;
}

impl<C: ColumnBuffer> ColumnarBuffer<C> {
    /// Create a new instance from columns with unique indicies. Capacity of the buffer will be the
    /// minimum capacity of the columns.
    pub fn new(columns: Vec<(u16, C)>) -> Self {
        // Assert capacity
        let capacity = columns
            .iter()
            .map(|(_, col)| col.capacity())
            .min()
            .unwrap_or(0);

        // Assert uniqueness of indices
        let mut indices = HashSet::new();
        if columns
            .iter()
            .any(move |&(col_index, _)| !indices.insert(col_index))
        {
            panic!("Column indices must be unique.")
        }

        unsafe { Self::new_unchecked(capacity, columns) }
    }

    /// # Safety
    ///
    /// * Indices must be unique
    /// * Columns all must have enough `capacity`.
    pub unsafe fn new_unchecked(capacity: usize, columns: Vec<(u16, C)>) -> Self {
        ColumnarBuffer {
            num_rows: Box::new(0),
            max_rows: capacity,
            columns,
        }
    }

    /// Number of valid rows in the buffer.
    pub fn num_rows(&self) -> usize {
        *self.num_rows
    }

    /// Use this method to gain read access to the actual column data.
    ///
    /// # Parameters
    ///
    /// * `buffer_index`: Please note that the buffer index is not identical to the ODBC column
    ///   index. For once it is zero based. It also indexes the buffer bound, and not the columns of
    ///   the output result set. This is important, because not every column needs to be bound. Some
    ///   columns may simply be ignored. That being said, if every column of the output is bound in
    ///   the buffer, in the same order in which they are enumerated in the result set, the
    ///   relationship between column index and buffer index is `buffer_index = column_index - 1`.
    pub fn column(&self, buffer_index: usize) -> <C as ColumnProjections<'_>>::View {
        unsafe { self.columns[buffer_index].1.view(*self.num_rows) }
    }

    /// Use this method to gain write access to the actual column data.
    ///
    /// # Parameters
    ///
    /// * `buffer_index`: Please note that the buffer index is not identical to the ODBC column
    ///   index. For once it is zero based. It also indexes the buffer bound, and not the columns of
    ///   the output result set. This is important, because not every column needs to be bound. Some
    ///   columns may simply be ignored. That being said, if every column of the output is bound in
    ///   the buffer, in the same order in which they are enumerated in the result set, the
    ///   relationship between column index and buffer index is `buffer_index = column_index - 1`.
    ///
    /// # Example
    ///
    /// This method is intend to be called if using [`ColumnarBuffer`] for column wise bulk inserts.
    ///
    /// ```no_run
    /// use odbc_api::{
    ///     Connection, Error,
    ///     buffers::{AnySliceMut, BufferDesc, ColumnarAnyBuffer},
    /// };
    ///
    /// fn insert_birth_years(conn: &Connection, names: &[&str], years: &[i16])
    ///     -> Result<(), Error>
    /// {
    ///     // All columns must have equal length.
    ///     assert_eq!(names.len(), years.len());
    ///
    ///     // Create a columnar buffer which fits the input parameters.
    ///     let buffer_desc = [
    ///         BufferDesc::Text { max_str_len: 255 },
    ///         BufferDesc::I16 { nullable: false },
    ///     ];
    ///     let mut buffer = ColumnarAnyBuffer::from_descs(names.len(), buffer_desc);
    ///     buffer.set_num_rows(names.len());
    ///
    ///     // Fill the buffer with values column by column
    ///     match buffer.column_mut(0) {
    ///         AnySliceMut::Text(mut col) => {
    ///             col.write(names.iter().map(|s| Some(s.as_bytes())))
    ///         }
    ///         _ => panic!("We know the name column to hold text.")
    ///     }
    ///
    ///     match buffer.column_mut(1) {
    ///         AnySliceMut::I16(col) => col.copy_from_slice(years),
    ///         _ => panic!("We know the year column to hold i16.")
    ///     }
    ///
    ///     conn.execute(
    ///         "INSERT INTO Birthdays (name, year) VALUES (?, ?)",
    ///         &buffer
    ///     )?;
    ///     Ok(())
    /// }
    /// ```
    pub fn column_mut(&mut self, buffer_index: usize) -> <C as ColumnProjections<'_>>::ViewMut {
        unsafe { self.columns[buffer_index].1.view_mut(*self.num_rows) }
    }

    /// Set number of valid rows in the buffer. May not be larger than the batch size. If the
    /// specified number should be larger than the number of valid rows currently held by the buffer
    /// additional rows with the default value are going to be created.
    pub fn set_num_rows(&mut self, num_rows: usize) {
        if num_rows > self.max_rows as usize {
            panic!(
                "Columnar buffer may not be resized to a value higher than the maximum number of \
                rows initially specified in the constructor."
            );
        }
        if *self.num_rows < num_rows {
            for (_col_index, ref mut column) in &mut self.columns {
                column.fill_default(*self.num_rows, num_rows)
            }
        }
        *self.num_rows = num_rows;
    }
}

unsafe impl<C> RowSetBuffer for ColumnarBuffer<C>
where
    C: ColumnBuffer,
{
    fn bind_type(&self) -> usize {
        0 // Specify columnar binding
    }

    fn row_array_size(&self) -> usize {
        self.max_rows
    }

    fn mut_num_fetch_rows(&mut self) -> &mut usize {
        self.num_rows.as_mut()
    }

    unsafe fn bind_colmuns_to_cursor(&mut self, mut cursor: StatementRef<'_>) -> Result<(), Error> {
        for (col_number, column) in &mut self.columns {
            cursor.bind_col(*col_number, column).into_result(&cursor)?;
        }
        Ok(())
    }

    fn find_truncation(&self) -> Option<TruncationInfo> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(buffer_index, (_, column))| {
                column
                    .has_truncated_values(*self.num_rows)
                    .map(|indicator| TruncationInfo {
                        indicator: indicator.length(),
                        buffer_index,
                    })
            })
    }
}

unsafe impl<C> ParameterRefCollection for &ColumnarBuffer<C>
where
    C: ColumnBuffer,
{
    fn parameter_set_size(&self) -> usize {
        *self.num_rows
    }

    unsafe fn bind_parameters_to(&mut self, stmt: &mut impl Statement) -> Result<(), Error> {
        for &(parameter_number, ref buffer) in &self.columns {
            stmt.bind_input_parameter(parameter_number, buffer)
                .into_result(stmt)?;
        }
        Ok(())
    }
}


/// A columnar buffer intended to be bound with [crate::Cursor::bind_buffer] in order to obtain
/// results from a cursor.
///
/// This buffer is designed to be versatile. It supports a wide variety of usage scenarios. It is
/// efficient in retrieving data, but expensive to allocate, as columns are allocated separately.
/// This is required in order to efficiently allow for rebinding columns, if this buffer is used to
/// provide array input parameters those maximum size is not known in advance.
///
/// Most applications should find the overhead negligible, especially if instances are reused.
pub struct ColumnarBuffer<C> {
    /// Use a box, so it is safe for a cursor to take ownership of this buffer.
    num_rows: Box<usize>,
    /// aka: batch size, row array size
    max_rows: usize,
    /// Column index and bound buffer
    columns: Vec<(u16, C)>,
}

/// A buffer able to be used together with [`ColumnBuffer`].
///
/// # Safety
///
/// Views must not allow access to unintialized / invalid rows.
pub unsafe trait ColumnBuffer:
    for<'a> ColumnProjections<'a> + CDataMut + HasDataType
{
    /// # Safety
    ///
    /// Underlying buffer may not know how many elements have been written to it by the last ODBC
    /// function call. So we tell it how many, and get a save to use view in Return. Specifying an
    /// erroneous value for `valid_rows`, may therfore result in the construced view giving us
    /// access to invalid rows in a safe abstraction, which of course would be a Bug.
    unsafe fn view(&self, valid_rows: usize) -> <Self as ColumnProjections<'_>>::View;

    /// # Safety
    ///
    /// `valid_rows` must be valid, otherwise the safe abstraction would provide access to invalid
    /// memory.
    unsafe fn view_mut(&mut self, valid_rows: usize) -> <Self as ColumnProjections<'_>>::ViewMut;

    /// Fills the column with the default representation of values, between `from` and `to` index.
    fn fill_default(&mut self, from: usize, to: usize);

    /// Current capacity of the column
    fn capacity(&self) -> usize;

    /// `Some` if any value is truncated in the range `[0, num_rows)`. Fixed size types can never be
    /// truncated and therefore default to `None`.
    fn has_truncated_values(&self, _num_rows: usize) -> Option<Indicator> {
        None
    }
}

/// This row set binds a string buffer to each column, which is large enough to hold the maximum
/// length string representation for each element in the row set at once.
///
/// Since the columns are homogeneous (all text), this is a convenient choice if you do not know
/// the schema of the queried data at compile time, e.g. if you want to print the contents of an
/// arbitrary table to standard out.
pub struct TextRowSet {
    inner: ColumnarBuffer<CharColumn>,
}

impl TextRowSet {
    /// Use `cursor` to query the display size for each column of the row set and allocate the
    /// buffers accordingly.
    ///
    /// # Parameters
    ///
    /// * `batch_size`: Maximum number of rows fetched with one row set.
    /// * `cursor`: Used to query the display size for each column.
    /// * `max_str_limit`: Some drivers report excessive display sizes for types like `VARCHAR(MAX)`
    ///   or CLOBs. Specifying a limit caps the size of the allocated column buffers, rather than
    ///   trying to allocate a buffer large enough to hold the reported maximum length.
    pub fn for_cursor(
        batch_size: usize,
        cursor: &mut impl Cursor,
        max_str_limit: Option<usize>,
    ) -> Result<TextRowSet, Error> {
        let num_cols = cursor.num_result_cols()?;
        let columns = (1..=num_cols)
            .map(|col_index| {
                let reported_len = cursor.col_display_size(col_index as u16)? as usize;
                let max_str_len = max_str_limit
                    .map(|limit| reported_len.min(limit))
                    .unwrap_or(reported_len);
                Ok((col_index as u16, CharColumn::new(batch_size, max_str_len)))
            })
            .collect::<Result<_, Error>>()?;
        Ok(TextRowSet {
            inner: ColumnarBuffer::new(columns),
        })
    }

    /// Creates a text buffer large enough to hold `batch_size` rows with one column for each item
    /// in `max_str_lengths`, each of respective size.
    pub fn new(batch_size: usize, max_str_lengths: impl Iterator<Item = usize>) -> Self {
        let columns = max_str_lengths
            .enumerate()
            .map(|(index, max_str_len)| ((index + 1) as u16, CharColumn::new(batch_size, max_str_len)))
            .collect();
        TextRowSet {
            inner: ColumnarBuffer::new(columns),
        }
    }

    /// Creates a text buffer large enough to hold `batch_size` rows with one column for each item
    /// in `max_str_lengths`, falling back to an `Err` rather than panicking should the required
    /// allocation be too large.
    pub fn from_max_str_lens(
        batch_size: usize,
        max_str_lengths: impl IntoIterator<Item = usize>,
    ) -> Result<Self, Error> {
        let columns = max_str_lengths
            .into_iter()
            .enumerate()
            .map(|(index, max_str_len)| {
                let column = CharColumn::try_new(batch_size, max_str_len)
                    .map_err(|source| source.add_context(index))?;
                Ok((index as u16 + 1, column))
            })
            .collect::<Result<_, Error>>()?;
        Ok(TextRowSet {
            inner: ColumnarBuffer::new(columns),
        })
    }

    /// Access the element at the specified position in the row set.
    pub fn at(&self, col_index: usize, row_index: usize) -> Option<&[u8]> {
        assert!(row_index < self.inner.num_rows());
        unsafe { self.inner.columns[col_index].1.value_at(row_index) }
    }

    /// Access the element at the specified position in the row set, interpreted as utf8.
    pub fn at_as_str(&self, col_index: usize, row_index: usize) -> Result<Option<&str>, Utf8Error> {
        self.at(col_index, row_index).map(std::str::from_utf8).transpose()
    }

    /// Return the number of columns in the row set.
    pub fn num_cols(&self) -> usize {
        self.inner.columns.len()
    }

    /// Return the number of rows in the row set.
    pub fn num_rows(&self) -> usize {
        self.inner.num_rows()
    }

    /// Takes one element from the iterator for each internal column buffer and appends it to the
    /// end of the buffer. Should a buffer not be large enough to hold the element, it will be
    /// reallocated with `1.2` times its size.
    ///
    /// This method panics if it is tried to insert elements beyond batch size. It will also panic
    /// if row does not contain at least one item for each internal column buffer.
    pub fn append<'a>(&mut self, mut row: impl Iterator<Item = Option<&'a [u8]>>) {
        if self.inner.num_rows() == self.inner.max_rows {
            panic!("Trying to insert elements into TextRowSet beyond batch size.")
        }

        let index = self.inner.num_rows();
        for (_, column) in &mut self.inner.columns {
            let text = row.next().expect(
                "row passed to TextRowSet::append must contain one element for each column.",
            );
            column.append(index, text);
        }

        *self.inner.num_rows += 1;
    }

    /// Sets the number of rows in the buffer to zero.
    pub fn clear(&mut self) {
        *self.inner.num_rows = 0;
    }
}

unsafe impl RowSetBuffer for TextRowSet {
    fn bind_type(&self) -> usize {
        self.inner.bind_type()
    }

    fn row_array_size(&self) -> usize {
        self.inner.row_array_size()
    }

    fn mut_num_fetch_rows(&mut self) -> &mut usize {
        self.inner.mut_num_fetch_rows()
    }

    unsafe fn bind_colmuns_to_cursor(&mut self, cursor: StatementRef<'_>) -> Result<(), Error> {
        self.inner.bind_colmuns_to_cursor(cursor)
    }

    fn find_truncation(&self) -> Option<TruncationInfo> {
        self.inner.find_truncation()
    }
}

unsafe impl ParameterRefCollection for &TextRowSet {
    fn parameter_set_size(&self) -> usize {
        self.inner.num_rows()
    }

    unsafe fn bind_parameters_to(&mut self, stmt: &mut impl Statement) -> Result<(), Error> {
        for &(parameter_number, ref buffer) in &self.inner.columns {
            stmt.bind_input_parameter(parameter_number, buffer)
                .into_result(stmt)?;
        }
        Ok(())
    }
}
