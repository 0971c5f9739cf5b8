//! Bulk insert engine (C8): array-bound inserts over a columnar wire buffer (spec.md §4.8), plus
//! a parallel variant that splits a request's rows across pool-backed connections.
//!
//! Array-bound inserts reuse the teacher's own [`crate::ColumnarBulkInserter`]
//! (`src/columnar_bulk_inserter.rs`): one prepared statement, one `AnyBuffer` column buffer per
//! bound parameter, values copied in column-major order and submitted in row-count batches.

use byteorder::{ReadBytesExt, LE};
use std::io::{self, Cursor, Read};
use std::mem::size_of;

use odbc_sys::Timestamp;

use crate::buffers::{AnyBuffer, AnySliceMut, BufferDesc};
use crate::Connection;

use super::codec::OdbcTypeTag;
use super::error::EngineError;
use super::pool::Pool;

/// One column's wire schema: name, source type, nullability, and the declared maximum width used
/// both to size the buffer and to frame fixed-width/padded row entries.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub name: String,
    pub odbc_type: OdbcTypeTag,
    pub nullable: bool,
    pub max_len: u32,
}

/// A decoded array-bound insert request: schema plus column-major cell data, one
/// `Option<Vec<u8>>` per (column, row) with `None` standing for a wire-level NULL.
pub struct BulkInsertRequest {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
    pub row_count: usize,
    column_values: Vec<Vec<Option<Vec<u8>>>>,
}

impl BulkInsertRequest {
    /// Validates that every `None` cell sits in a column declared nullable (spec.md §4.8: "a null
    /// in a non-nullable column is a validation error at build time").
    pub fn validate(&self) -> Result<(), EngineError> {
        for (column, values) in self.columns.iter().zip(&self.column_values) {
            if !column.nullable && values.iter().any(Option::is_none) {
                return Err(EngineError::validation(format!(
                    "Column '{}' is not nullable but the insert request contains a null cell.",
                    column.name
                )));
            }
        }
        Ok(())
    }
}

fn truncated_err(_: io::Error) -> EngineError {
    EngineError::framing("Bulk insert buffer truncated while reading a field.")
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, EngineError> {
    cursor.read_u32::<LE>().map_err(truncated_err)
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, EngineError> {
    cursor.read_u8().map_err(truncated_err)
}

fn read_bytes(cursor: &mut Cursor<&[u8]>, len: usize) -> Result<Vec<u8>, EngineError> {
    let mut buf = vec![0u8; len];
    cursor.read_exact(&mut buf).map_err(truncated_err)?;
    Ok(buf)
}

/// Width in bytes of a single fixed or padded cell entry for a column, per spec.md §4.8's
/// `rowCount fixed-width or padded entries` clause: numeric/temporal types get their natural C
/// layout width, `Varchar`/`Decimal`/`Binary` cells occupy the column's declared `maxLen`.
fn column_entry_width(column: &ColumnSchema) -> usize {
    match column.odbc_type {
        OdbcTypeTag::TinyInt | OdbcTypeTag::Bit => 1,
        OdbcTypeTag::SmallInt => size_of::<i16>(),
        OdbcTypeTag::Integer | OdbcTypeTag::Real => size_of::<i32>(),
        OdbcTypeTag::BigInt | OdbcTypeTag::Double => size_of::<i64>(),
        OdbcTypeTag::Timestamp => size_of::<Timestamp>(),
        OdbcTypeTag::Varchar | OdbcTypeTag::Decimal | OdbcTypeTag::Binary => {
            column.max_len as usize
        }
    }
}

/// Decodes an array-bound insert request per spec.md §4.8's wire layout.
pub fn decode_bulk_insert_request(bytes: &[u8]) -> Result<BulkInsertRequest, EngineError> {
    let mut cursor = Cursor::new(bytes);
    let table_name_len = read_u32(&mut cursor)? as usize;
    let table_name = String::from_utf8(read_bytes(&mut cursor, table_name_len)?)
        .map_err(|_| EngineError::framing("Table name is not valid UTF-8."))?;

    let column_count = read_u32(&mut cursor)? as usize;
    let mut columns = Vec::with_capacity(column_count);
    for _ in 0..column_count {
        let name_len = read_u32(&mut cursor)? as usize;
        let name = String::from_utf8(read_bytes(&mut cursor, name_len)?)
            .map_err(|_| EngineError::framing("Column name is not valid UTF-8."))?;
        let odbc_type = OdbcTypeTag::from_u16(read_u8(&mut cursor)? as u16)?;
        let nullable = read_u8(&mut cursor)? != 0;
        let max_len = read_u32(&mut cursor)?;
        columns.push(ColumnSchema {
            name,
            odbc_type,
            nullable,
            max_len,
        });
    }

    let row_count = read_u32(&mut cursor)? as usize;
    let mut column_values = Vec::with_capacity(column_count);
    for column in &columns {
        let bitmap = if column.nullable {
            Some(read_bytes(&mut cursor, row_count.div_ceil(8))?)
        } else {
            None
        };
        let width = column_entry_width(column);
        let mut values = Vec::with_capacity(row_count);
        for row in 0..row_count {
            let raw = read_bytes(&mut cursor, width)?;
            let is_null = bitmap
                .as_ref()
                .map(|bits| bits[row / 8] & (1 << (row % 8)) != 0)
                .unwrap_or(false);
            values.push(if is_null { None } else { Some(raw) });
        }
        column_values.push(values);
    }

    let request = BulkInsertRequest {
        table_name,
        columns,
        row_count,
        column_values,
    };
    request.validate()?;
    Ok(request)
}

fn buffer_desc_for_column(column: &ColumnSchema) -> BufferDesc {
    match column.odbc_type {
        OdbcTypeTag::Integer => BufferDesc::I32 {
            nullable: column.nullable,
        },
        OdbcTypeTag::BigInt => BufferDesc::I64 {
            nullable: column.nullable,
        },
        OdbcTypeTag::SmallInt => BufferDesc::I16 {
            nullable: column.nullable,
        },
        OdbcTypeTag::TinyInt => BufferDesc::I8 {
            nullable: column.nullable,
        },
        OdbcTypeTag::Double => BufferDesc::F64 {
            nullable: column.nullable,
        },
        OdbcTypeTag::Real => BufferDesc::F32 {
            nullable: column.nullable,
        },
        OdbcTypeTag::Bit => BufferDesc::Bit {
            nullable: column.nullable,
        },
        OdbcTypeTag::Timestamp => BufferDesc::Timestamp {
            nullable: column.nullable,
        },
        OdbcTypeTag::Binary => BufferDesc::Binary {
            length: column.max_len as usize,
        },
        // The teacher's own `BufferDesc::from_data_type` has no specialized Decimal buffer either;
        // both fall back to text.
        OdbcTypeTag::Varchar | OdbcTypeTag::Decimal => BufferDesc::Text {
            max_str_len: column.max_len as usize,
        },
    }
}

fn insert_sql(table_name: &str, columns: &[ColumnSchema]) -> String {
    let column_list = columns
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!("INSERT INTO {table_name} ({column_list}) VALUES ({placeholders})")
}

/// Strips trailing NUL padding from a fixed-width text cell. Binary cells are never trimmed this
/// way since zero bytes are valid content there.
fn trim_text_padding(raw: &[u8]) -> &[u8] {
    let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    &raw[..len]
}

fn pod_from_bytes<T: Copy>(raw: &[u8]) -> T {
    assert_eq!(raw.len(), size_of::<T>());
    // Safe: `raw` is exactly `size_of::<T>()` bytes, produced by `pod_bytes` on the encoding side
    // (see `query_executor::pod_bytes`) or by an equivalently laid-out writer.
    unsafe { *(raw.as_ptr() as *const T) }
}

/// Writes every row of one column's batch into its bound buffer view. `cells` yields one
/// `Option<&[u8]>` per row, in the same order the rows were set with `set_num_rows`.
fn write_column<'r>(
    view: AnySliceMut<'_>,
    cells: impl Iterator<Item = Option<&'r [u8]>>,
) -> Result<(), EngineError> {
    macro_rules! write_plain {
        ($slice:expr, $value:expr) => {
            for (row, raw) in cells.enumerate() {
                match raw {
                    Some(bytes) => $slice[row] = $value(bytes),
                    None => {
                        return Err(EngineError::validation(
                            "Null cell bound to a non-nullable buffer.",
                        ))
                    }
                }
            }
        };
    }
    macro_rules! write_nullable {
        ($slice:expr, $value:expr) => {
            for (row, raw) in cells.enumerate() {
                $slice.set_cell(row, raw.map($value))
            }
        };
    }

    match view {
        AnySliceMut::Text(mut slice) => {
            for (row, raw) in cells.enumerate() {
                slice.set_cell(row, raw.map(trim_text_padding));
            }
        }
        AnySliceMut::Binary(mut slice) => {
            for (row, raw) in cells.enumerate() {
                slice.set_cell(row, raw);
            }
        }
        AnySliceMut::I8(slice) => write_plain!(slice, |b: &[u8]| b[0] as i8),
        AnySliceMut::I16(slice) => write_plain!(slice, |b: &[u8]| i16::from_le_bytes(b.try_into().unwrap())),
        AnySliceMut::I32(slice) => write_plain!(slice, |b: &[u8]| i32::from_le_bytes(b.try_into().unwrap())),
        AnySliceMut::I64(slice) => write_plain!(slice, |b: &[u8]| i64::from_le_bytes(b.try_into().unwrap())),
        AnySliceMut::F32(slice) => write_plain!(slice, |b: &[u8]| f32::from_le_bytes(b.try_into().unwrap())),
        AnySliceMut::F64(slice) => write_plain!(slice, |b: &[u8]| f64::from_le_bytes(b.try_into().unwrap())),
        AnySliceMut::Bit(slice) => write_plain!(slice, |b: &[u8]| crate::Bit(b[0])),
        AnySliceMut::Timestamp(slice) => write_plain!(slice, |b: &[u8]| pod_from_bytes::<Timestamp>(b)),
        AnySliceMut::NullableI8(mut slice) => write_nullable!(slice, |b: &[u8]| b[0] as i8),
        AnySliceMut::NullableI16(mut slice) => {
            write_nullable!(slice, |b: &[u8]| i16::from_le_bytes(b.try_into().unwrap()))
        }
        AnySliceMut::NullableI32(mut slice) => {
            write_nullable!(slice, |b: &[u8]| i32::from_le_bytes(b.try_into().unwrap()))
        }
        AnySliceMut::NullableI64(mut slice) => {
            write_nullable!(slice, |b: &[u8]| i64::from_le_bytes(b.try_into().unwrap()))
        }
        AnySliceMut::NullableF32(mut slice) => {
            write_nullable!(slice, |b: &[u8]| f32::from_le_bytes(b.try_into().unwrap()))
        }
        AnySliceMut::NullableF64(mut slice) => {
            write_nullable!(slice, |b: &[u8]| f64::from_le_bytes(b.try_into().unwrap()))
        }
        AnySliceMut::NullableBit(mut slice) => write_nullable!(slice, |b: &[u8]| crate::Bit(b[0])),
        AnySliceMut::NullableTimestamp(mut slice) => {
            write_nullable!(slice, |b: &[u8]| pod_from_bytes::<Timestamp>(b))
        }
        // Dates and times never occur on the wire schema (only Timestamp is used for all three
        // temporal kinds, per `OdbcTypeTag::from_data_type`), WText is never requested either.
        _ => {
            return Err(EngineError::unsupported_feature(
                "Bulk insert column buffer kind has no wire representation.",
            ))
        }
    }
    Ok(())
}

/// Performs an array-bound insert of every row in `request` against `connection`, grouping rows
/// into `batch_size`-sized parameter-array batches (default 1000 per spec.md §4.8).
pub fn insert_array(
    connection: &Connection<'static>,
    request: &BulkInsertRequest,
    batch_size: usize,
) -> Result<u64, EngineError> {
    request.validate()?;
    if request.row_count == 0 {
        return Ok(0);
    }
    let sql = insert_sql(&request.table_name, &request.columns);
    let prepared = connection.prepare(&sql).map_err(EngineError::from)?;
    let descs: Vec<BufferDesc> = request.columns.iter().map(buffer_desc_for_column).collect();
    let capacity = batch_size.max(1).min(request.row_count);
    let mut inserter = prepared
        .into_column_inserter(capacity, descs)
        .map_err(EngineError::from)?;

    let mut inserted = 0u64;
    let mut row = 0;
    while row < request.row_count {
        let n = capacity.min(request.row_count - row);
        inserter.set_num_rows(n);
        for col_index in 0..request.columns.len() {
            let view = inserter.column_mut(col_index);
            let cells = request.column_values[col_index][row..row + n]
                .iter()
                .map(|cell| cell.as_deref());
            write_column(view, cells)?;
        }
        inserter.execute().map_err(EngineError::from)?;
        inserted += n as u64;
        row += n;
    }
    Ok(inserted)
}

/// Splits `request`'s rows into `workers` contiguous slices, inserting each slice on its own
/// pooled connection and thread, and sums the resulting row counts (spec.md §4.8 "parallel bulk
/// insert").
pub fn insert_parallel(
    pool: &Pool,
    request: &BulkInsertRequest,
    workers: usize,
    batch_size: usize,
) -> Result<u64, EngineError> {
    request.validate()?;
    let workers = workers.max(1);
    if request.row_count == 0 {
        return Ok(0);
    }
    let slice_size = request.row_count.div_ceil(workers);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..request.row_count)
            .step_by(slice_size)
            .map(|start| {
                let end = (start + slice_size).min(request.row_count);
                let slice = slice_request(request, start, end);
                scope.spawn(move || {
                    let connection = pool.checkout()?;
                    insert_array(connection.as_connection(), &slice, batch_size)
                })
            })
            .collect();
        let mut total = 0u64;
        for handle in handles {
            total += handle.join().expect("bulk insert worker thread panicked")?;
        }
        Ok(total)
    })
}

fn slice_request(request: &BulkInsertRequest, start: usize, end: usize) -> BulkInsertRequest {
    BulkInsertRequest {
        table_name: request.table_name.clone(),
        columns: request.columns.clone(),
        row_count: end - start,
        column_values: request
            .column_values
            .iter()
            .map(|values| values[start..end].to_vec())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_request(
        table: &str,
        columns: &[(&str, OdbcTypeTag, bool, u32)],
        rows: &[Vec<Option<Vec<u8>>>],
    ) -> Vec<u8> {
        use byteorder::WriteBytesExt;
        let mut buf = Vec::new();
        buf.write_u32::<LE>(table.len() as u32).unwrap();
        buf.extend_from_slice(table.as_bytes());
        buf.write_u32::<LE>(columns.len() as u32).unwrap();
        for (name, ty, nullable, max_len) in columns {
            buf.write_u32::<LE>(name.len() as u32).unwrap();
            buf.extend_from_slice(name.as_bytes());
            buf.write_u8(*ty as u8).unwrap();
            buf.write_u8(*nullable as u8).unwrap();
            buf.write_u32::<LE>(*max_len).unwrap();
        }
        let row_count = rows.len();
        buf.write_u32::<LE>(row_count as u32).unwrap();
        for (col_index, (_, _, nullable, _)) in columns.iter().enumerate() {
            if *nullable {
                let mut bitmap = vec![0u8; row_count.div_ceil(8)];
                for (row_index, row) in rows.iter().enumerate() {
                    if row[col_index].is_none() {
                        bitmap[row_index / 8] |= 1 << (row_index % 8);
                    }
                }
                buf.extend_from_slice(&bitmap);
            }
            for row in rows {
                match &row[col_index] {
                    Some(bytes) => buf.extend_from_slice(bytes),
                    None => buf.extend_from_slice(&vec![0u8; row[col_index].as_ref().map(Vec::len).unwrap_or(0)]),
                }
            }
        }
        buf
    }

    #[test]
    fn decodes_single_not_null_int_column() {
        let rows = vec![
            vec![Some(1i32.to_le_bytes().to_vec())],
            vec![Some(2i32.to_le_bytes().to_vec())],
        ];
        let bytes = encode_request("t", &[("id", OdbcTypeTag::Integer, false, 0)], &rows);
        let request = decode_bulk_insert_request(&bytes).unwrap();
        assert_eq!(request.table_name, "t");
        assert_eq!(request.row_count, 2);
        assert_eq!(request.column_values[0][0].as_deref(), Some(1i32.to_le_bytes().as_slice()));
    }

    #[test]
    fn null_in_non_nullable_column_is_rejected_by_validate() {
        let request = BulkInsertRequest {
            table_name: "t".to_string(),
            columns: vec![ColumnSchema {
                name: "id".to_string(),
                odbc_type: OdbcTypeTag::Integer,
                nullable: false,
                max_len: 0,
            }],
            row_count: 1,
            column_values: vec![vec![None]],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn entry_width_matches_declared_max_len_for_varchar() {
        let column = ColumnSchema {
            name: "name".to_string(),
            odbc_type: OdbcTypeTag::Varchar,
            nullable: false,
            max_len: 64,
        };
        assert_eq!(column_entry_width(&column), 64);
    }
}
