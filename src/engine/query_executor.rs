//! Query executor (C6): single-shot SELECT, parameterized execute, and multi-result execute,
//! all producing the wire types from [`super::codec`] rather than raw ODBC cursors.
//!
//! Parameters arrive as a dynamically-typed [`ParameterValue`] slice (decoded off the wire by the
//! caller), so binding goes through `&[Box<dyn InputParameter>]`, the same dynamic-parameter-list
//! mechanism `crate::parameter` documents for heterogeneous argument lists. Fixed-size NULLs use
//! [`crate::Nullable`]; variable-length values use the owned `VarCharBox`/`VarBinaryBox` cells.

use crate::buffers::{AnySlice, BufferDesc, ColumnarAnyBuffer};
use crate::error::ExtendResult;
use crate::handles::{AsStatementRef, Statement};
use crate::parameter::{VarBinaryBox, VarCharBox};
use crate::{ColumnDescription, Cursor, CursorImpl, DataType, InputParameter, Nullable, ResultSetMetadata};

use super::codec::{CellValue, ColumnMeta, MultiResultItem, OdbcTypeTag, ParameterValue, ResultBuffer};
use super::error::EngineError;
use super::stmt_cache::{SharedConnection, StmtCache};

/// Row-set size used when fetching a full result into memory. Large enough to amortize the
/// per-fetch round trip for typical result sets without pinning an unbounded amount of memory.
const DEFAULT_BATCH_SIZE: usize = 1000;

/// Builds the dynamic, heterogeneous parameter list `Prepared::execute`/`Preallocated::execute`
/// expect, one [`InputParameter`] per wire value.
pub(crate) fn build_input_parameters(values: &[ParameterValue]) -> Vec<Box<dyn InputParameter>> {
    values.iter().map(parameter_to_input).collect()
}

fn parameter_to_input(value: &ParameterValue) -> Box<dyn InputParameter> {
    match value {
        // The wire format carries no declared type for a NULL parameter. Binding it as a nullable
        // 32 bit integer matches what most drivers accept for an untyped NULL placeholder.
        ParameterValue::Null => Box::new(Nullable::<i32>::null()),
        ParameterValue::String(s) => Box::new(VarCharBox::from_string(s.clone())),
        ParameterValue::Int32(v) => Box::new(*v),
        ParameterValue::Int64(v) => Box::new(*v),
        ParameterValue::Decimal(s) => Box::new(VarCharBox::from_string(s.clone())),
        ParameterValue::Binary(data) => Box::new(VarBinaryBox::from_vec(data.clone())),
    }
}

/// Sets the query timeout on any statement reachable through [`AsStatementRef`]. `0` disables the
/// timeout, matching `SQL_ATTR_QUERY_TIMEOUT`'s own default.
pub(crate) fn set_query_timeout(
    stmt: &mut impl AsStatementRef,
    timeout_sec: usize,
) -> Result<(), EngineError> {
    if timeout_sec == 0 {
        return Ok(());
    }
    let mut stmt_ref = stmt.as_stmt_ref();
    stmt_ref
        .set_query_timeout_sec(timeout_sec)
        .into_result(&stmt_ref)
        .map_err(EngineError::from)
}

pub(crate) fn buffer_desc_for(data_type: DataType, nullable: bool) -> BufferDesc {
    BufferDesc::from_data_type(data_type, nullable).unwrap_or(BufferDesc::Text {
        max_str_len: data_type.column_size().max(1),
    })
}

/// Describes every column of the current result set, pairing the wire [`ColumnMeta`] with the
/// [`BufferDesc`] used to bind a fetch buffer.
pub(crate) fn describe_columns(
    cursor: &mut impl ResultSetMetadata,
) -> Result<(Vec<ColumnMeta>, Vec<BufferDesc>), EngineError> {
    let num_cols = cursor.num_result_cols().map_err(EngineError::from)?;
    let mut columns = Vec::with_capacity(num_cols.max(0) as usize);
    let mut descs = Vec::with_capacity(num_cols.max(0) as usize);
    for col in 1..=num_cols as u16 {
        let mut description = ColumnDescription::default();
        cursor
            .describe_col(col, &mut description)
            .map_err(EngineError::from)?;
        let name = cursor.col_name(col).map_err(EngineError::from)?;
        let nullable = description.could_be_nullable();
        columns.push(ColumnMeta {
            odbc_type: OdbcTypeTag::from_data_type(description.data_type),
            name,
        });
        descs.push(buffer_desc_for(description.data_type, nullable));
    }
    Ok((columns, descs))
}

/// Copies the raw bytes of a `Copy` value as-is. Used for the fixed-size ODBC structs (`Date`,
/// `Time`, `Timestamp`) whose wire representation is their in-memory layout.
fn pod_bytes<T: Copy>(value: &T) -> Vec<u8> {
    let size = std::mem::size_of::<T>();
    // Safe: `T: Copy` guarantees a plain, fully-initialized value with no interior references.
    unsafe { std::slice::from_raw_parts(value as *const T as *const u8, size) }.to_vec()
}

pub(crate) fn cell_from_any_slice(slice: AnySlice<'_>, row: usize) -> CellValue {
    macro_rules! nullable_cell {
        ($it:expr) => {
            match $it.nth(row) {
                Some(v) => CellValue::Bytes(pod_bytes(v)),
                None => CellValue::Null,
            }
        };
    }

    match slice {
        // Safe: `row` is always less than the number of rows the view was fetched with.
        AnySlice::Text(view) => match unsafe { view.get(row) } {
            Some(bytes) => CellValue::Bytes(bytes.to_vec()),
            None => CellValue::Null,
        },
        AnySlice::WText(view) => match unsafe { view.get(row) } {
            Some(wide) => CellValue::Bytes(String::from_utf16_lossy(wide).into_bytes()),
            None => CellValue::Null,
        },
        AnySlice::Binary(view) => match view.get(row) {
            Some(bytes) => CellValue::Bytes(bytes.to_vec()),
            None => CellValue::Null,
        },
        AnySlice::Date(values) => CellValue::Bytes(pod_bytes(&values[row])),
        AnySlice::Time(values) => CellValue::Bytes(pod_bytes(&values[row])),
        AnySlice::Timestamp(values) => CellValue::Bytes(pod_bytes(&values[row])),
        AnySlice::F64(values) => CellValue::Bytes(values[row].to_le_bytes().to_vec()),
        AnySlice::F32(values) => CellValue::Bytes(values[row].to_le_bytes().to_vec()),
        AnySlice::I8(values) => CellValue::Bytes(values[row].to_le_bytes().to_vec()),
        AnySlice::I16(values) => CellValue::Bytes(values[row].to_le_bytes().to_vec()),
        AnySlice::I32(values) => CellValue::Bytes(values[row].to_le_bytes().to_vec()),
        AnySlice::I64(values) => CellValue::Bytes(values[row].to_le_bytes().to_vec()),
        AnySlice::U8(values) => CellValue::Bytes(vec![values[row]]),
        AnySlice::Bit(values) => CellValue::Bytes(vec![values[row].0]),
        AnySlice::NullableDate(mut it) => nullable_cell!(it),
        AnySlice::NullableTime(mut it) => nullable_cell!(it),
        AnySlice::NullableTimestamp(mut it) => nullable_cell!(it),
        AnySlice::NullableF64(mut it) => nullable_cell!(it),
        AnySlice::NullableF32(mut it) => nullable_cell!(it),
        AnySlice::NullableI8(mut it) => nullable_cell!(it),
        AnySlice::NullableI16(mut it) => nullable_cell!(it),
        AnySlice::NullableI32(mut it) => nullable_cell!(it),
        AnySlice::NullableI64(mut it) => nullable_cell!(it),
        AnySlice::NullableU8(mut it) => nullable_cell!(it),
        AnySlice::NullableBit(mut it) => nullable_cell!(it),
    }
}

/// Binds a columnar fetch buffer, drains every row set into memory, then hands the now-unbound
/// cursor back to the caller (needed by multi-result execution to move on to the next result set).
fn fetch_into_buffer<C: Cursor>(
    cursor: C,
    columns: Vec<ColumnMeta>,
    descs: Vec<BufferDesc>,
    batch_size: usize,
) -> Result<(ResultBuffer, C), EngineError> {
    let fetch_buffer = ColumnarAnyBuffer::from_descs(batch_size, descs.iter().copied());
    let mut block_cursor = cursor.bind_buffer(fetch_buffer).map_err(EngineError::from)?;
    let mut rows = Vec::new();
    while let Some(batch) = block_cursor.fetch().map_err(EngineError::from)? {
        let num_rows = batch.num_rows();
        for row in 0..num_rows {
            let mut cells = Vec::with_capacity(descs.len());
            for col in 0..descs.len() {
                cells.push(cell_from_any_slice(batch.column(col), row));
            }
            rows.push(cells);
        }
    }
    let (cursor, _buffer) = block_cursor.unbind().map_err(EngineError::from)?;
    Ok((ResultBuffer { columns, rows }, cursor))
}

fn fetch_single<C: Cursor>(
    mut cursor: C,
    batch_size: usize,
) -> Result<ResultBuffer, EngineError> {
    let (columns, descs) = describe_columns(&mut cursor)?;
    let (buffer, cursor) = fetch_into_buffer(cursor, columns, descs, batch_size)?;
    drop(cursor);
    Ok(buffer)
}

/// Single-shot or parameterized execute against an ad hoc (unprepared) statement. Empty result
/// sets and DML statements both produce `ResultBuffer::empty()` rather than an error.
pub fn execute_adhoc(
    connection: &SharedConnection,
    sql: &str,
    params: &[ParameterValue],
    timeout_sec: usize,
    batch_size: usize,
) -> Result<ResultBuffer, EngineError> {
    let guard = connection.lock().expect("connection mutex is not poisoned");
    let mut statement = guard.preallocate().map_err(EngineError::from)?;
    set_query_timeout(&mut statement, timeout_sec)?;
    let inputs = build_input_parameters(params);
    match statement
        .execute(sql, &inputs[..])
        .map_err(EngineError::from)?
    {
        Some(cursor) => fetch_single(cursor, batch_size.max(1)),
        None => Ok(ResultBuffer::empty()),
    }
}

/// Parameterized execute against a statement cached by [`StmtCache`]. The caller is responsible
/// for resolving named markers to positional order using the order `StmtCache::prepare` returns.
pub fn execute_prepared(
    cache: &mut StmtCache,
    sql: &str,
    params: &[ParameterValue],
    timeout_sec: usize,
    batch_size: usize,
) -> Result<ResultBuffer, EngineError> {
    cache.prepare(sql)?;
    let statement = cache
        .statement_mut(sql)
        .expect("StmtCache::prepare just inserted this entry");
    set_query_timeout(statement, timeout_sec)?;
    let inputs = build_input_parameters(params);
    match statement.execute(&inputs[..]).map_err(EngineError::from)? {
        Some(cursor) => fetch_single(cursor, batch_size.max(1)),
        None => Ok(ResultBuffer::empty()),
    }
}

/// Iterates every statement position `sql` produces, appending a `ResultSet` item for a position
/// with a cursor and a `RowCount` item for one without (DML), in batch order, until `SQLMoreResults`
/// itself reports no further position (spec.md §4.6).
///
/// `Preallocated::execute` only tells us directly whether the *first* position has a cursor; every
/// later position is discovered through `SQLMoreResults`, which advances regardless of whether
/// that next position turns out to have columns or not. So a DML position can surface either way
/// the first one does (no cursor at all) or the way a later one does (a cursor wrapping a
/// column-less position) — both are handled, and neither is mistaken for the batch simply ending.
pub fn execute_adhoc_multi(
    connection: &SharedConnection,
    sql: &str,
    params: &[ParameterValue],
    timeout_sec: usize,
    batch_size: usize,
) -> Result<Vec<MultiResultItem>, EngineError> {
    let guard = connection.lock().expect("connection mutex is not poisoned");
    let mut statement = guard.preallocate().map_err(EngineError::from)?;
    set_query_timeout(&mut statement, timeout_sec)?;
    let inputs = build_input_parameters(params);
    let mut items = Vec::new();

    let mut cursor = match statement.execute(sql, &inputs[..]).map_err(EngineError::from)? {
        Some(current) => Some(current),
        None => {
            let affected = statement.row_count().map_err(EngineError::from)?;
            items.push(MultiResultItem::RowCount(
                affected.map(|n| n as i64).unwrap_or(-1),
            ));
            let mut stmt_ref = statement.as_stmt_ref();
            let has_more = unsafe { stmt_ref.more_results() }
                .into_result_bool(&stmt_ref)
                .map_err(EngineError::from)?;
            // Safe: `SQLMoreResults` just positioned the statement on a fresh result and
            // `stmt_ref` is the only outstanding reference to it.
            has_more.then(|| unsafe { CursorImpl::new(stmt_ref) })
        }
    };

    while let Some(mut current) = cursor.take() {
        let (columns, descs) = describe_columns(&mut current)?;
        if descs.is_empty() {
            let stmt_ref = current.as_stmt_ref();
            let affected = stmt_ref
                .row_count()
                .into_result(&stmt_ref)
                .map_err(EngineError::from)?;
            items.push(MultiResultItem::RowCount(if affected < 0 {
                -1
            } else {
                affected as i64
            }));
            cursor = current.more_results().map_err(EngineError::from)?;
        } else {
            let (buffer, current) = fetch_into_buffer(current, columns, descs, batch_size.max(1))?;
            items.push(MultiResultItem::ResultSet(buffer));
            cursor = current.more_results().map_err(EngineError::from)?;
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_parameter_converts_to_nullable_i32() {
        let input = parameter_to_input(&ParameterValue::Null);
        assert_eq!(input.data_type(), Nullable::<i32>::new(0).data_type());
    }

    #[test]
    fn buffer_desc_for_unknown_falls_back_to_text() {
        let desc = buffer_desc_for(DataType::Unknown, true);
        matches!(desc, BufferDesc::Text { .. });
    }
}
