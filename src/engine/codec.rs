//! Binary protocol codec (C1). Encodes query results, multi-result groupings, structured errors
//! and parameter values into the wire layout described in spec.md §4.1, and parses the same on
//! the consumer side.
//!
//! All multi-byte integers are little-endian throughout, written with [`byteorder`] rather than
//! ad-hoc `to_le_bytes` calls scattered across the module.

use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{self, Cursor, Read};

use super::error::{EngineError, EngineErrorKind};
use crate::DataType;

const MAGIC: u32 = 0x4F44_4243;
const VERSION: u16 = 1;
const HEADER_LEN: usize = 16;

/// Source SQL type tag carried by a result column. Mirrors the subset of ODBC C types the codec
/// knows how to serialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum OdbcTypeTag {
    Integer = 0,
    BigInt = 1,
    SmallInt = 2,
    TinyInt = 3,
    Double = 4,
    Real = 5,
    Varchar = 6,
    Binary = 7,
    Decimal = 8,
    Timestamp = 9,
    Bit = 10,
}

impl OdbcTypeTag {
    pub(crate) fn from_u16(tag: u16) -> Result<Self, EngineError> {
        Ok(match tag {
            0 => OdbcTypeTag::Integer,
            1 => OdbcTypeTag::BigInt,
            2 => OdbcTypeTag::SmallInt,
            3 => OdbcTypeTag::TinyInt,
            4 => OdbcTypeTag::Double,
            5 => OdbcTypeTag::Real,
            6 => OdbcTypeTag::Varchar,
            7 => OdbcTypeTag::Binary,
            8 => OdbcTypeTag::Decimal,
            9 => OdbcTypeTag::Timestamp,
            10 => OdbcTypeTag::Bit,
            other => {
                return Err(EngineError::framing(format!(
                    "Unknown ODBC type tag {other} in result buffer."
                )))
            }
        })
    }

    /// Maps a driver-reported [`DataType`] to the tag carried over the wire. Unrepresented or
    /// driver-specific types fall back to `Varchar`, matching the text-rendering fallback the
    /// query executor uses for the same types.
    pub fn from_data_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Integer => OdbcTypeTag::Integer,
            DataType::BigInt => OdbcTypeTag::BigInt,
            DataType::SmallInt => OdbcTypeTag::SmallInt,
            DataType::TinyInt => OdbcTypeTag::TinyInt,
            DataType::Double => OdbcTypeTag::Double,
            DataType::Float | DataType::Real => OdbcTypeTag::Real,
            DataType::Varbinary { .. } | DataType::LongVarbinary { .. } => OdbcTypeTag::Binary,
            DataType::Numeric { .. } | DataType::Decimal { .. } => OdbcTypeTag::Decimal,
            DataType::Date | DataType::Time { .. } | DataType::Timestamp { .. } => {
                OdbcTypeTag::Timestamp
            }
            DataType::Bit => OdbcTypeTag::Bit,
            _ => OdbcTypeTag::Varchar,
        }
    }
}

/// A single described column in a result buffer.
#[derive(Debug, Clone)]
pub struct ColumnMeta {
    pub odbc_type: OdbcTypeTag,
    pub name: String,
}

/// A single cell value, either `Null` or a type-tagged payload ready to be written verbatim.
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Bytes(Vec<u8>),
}

/// A fully decoded or not-yet-encoded result buffer: columns plus row-major cell data.
#[derive(Debug, Clone, Default)]
pub struct ResultBuffer {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultBuffer {
    pub fn empty() -> Self {
        ResultBuffer {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Encodes `self` into the wire layout described in spec.md §4.1.
    pub fn encode(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        for column in &self.columns {
            let name_bytes = column.name.as_bytes();
            payload
                .write_u16::<LE>(column.odbc_type as u16)
                .expect("writing into a Vec never fails");
            payload
                .write_u16::<LE>(name_bytes.len() as u16)
                .expect("writing into a Vec never fails");
            payload.extend_from_slice(name_bytes);
        }
        for row in &self.rows {
            for cell in row {
                match cell {
                    CellValue::Null => payload.write_u8(1).unwrap(),
                    CellValue::Bytes(data) => {
                        payload.write_u8(0).unwrap();
                        payload.write_u32::<LE>(data.len() as u32).unwrap();
                        payload.extend_from_slice(data);
                    }
                }
            }
        }

        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
        buf.write_u32::<LE>(MAGIC).unwrap();
        buf.write_u16::<LE>(VERSION).unwrap();
        buf.write_u16::<LE>(self.columns.len() as u16).unwrap();
        buf.write_u32::<LE>(self.rows.len() as u32).unwrap();
        buf.write_u32::<LE>(payload.len() as u32).unwrap();
        buf.extend_from_slice(&payload);
        log::trace!("encoded result buffer, {} bytes", buf.len());
        buf
    }

    /// Parses a result buffer produced by [`Self::encode`]. Refuses a buffer shorter than
    /// `header + payloadSize` with a framing error, never performing an out-of-range read.
    pub fn decode(bytes: &[u8]) -> Result<Self, EngineError> {
        if bytes.len() < HEADER_LEN {
            return Err(EngineError::framing("Result buffer shorter than header."));
        }
        let mut cursor = Cursor::new(bytes);
        let magic = cursor.read_u32::<LE>().unwrap();
        if magic != MAGIC {
            return Err(EngineError::new(
                EngineErrorKind::FramingError,
                "Result buffer has a bad magic number (version mismatch).",
            ));
        }
        let _version = cursor.read_u16::<LE>().unwrap();
        let column_count = cursor.read_u16::<LE>().unwrap() as usize;
        let row_count = cursor.read_u32::<LE>().unwrap() as usize;
        let payload_size = cursor.read_u32::<LE>().unwrap() as usize;
        if bytes.len() < HEADER_LEN + payload_size {
            return Err(EngineError::framing(
                "Result buffer truncated: fewer bytes than header + payloadSize.",
            ));
        }

        let mut columns = Vec::with_capacity(column_count);
        for _ in 0..column_count {
            let tag = read_u16(&mut cursor)?;
            let odbc_type = OdbcTypeTag::from_u16(tag)?;
            let name_len = read_u16(&mut cursor)? as usize;
            let mut name_bytes = vec![0u8; name_len];
            cursor
                .read_exact(&mut name_bytes)
                .map_err(truncated_err)?;
            let name = String::from_utf8(name_bytes)
                .map_err(|_| EngineError::framing("Column name is not valid UTF-8."))?;
            columns.push(ColumnMeta { odbc_type, name });
        }

        let mut rows = Vec::with_capacity(row_count);
        for _ in 0..row_count {
            let mut row = Vec::with_capacity(column_count);
            for _ in 0..column_count {
                let null_flag = read_u8(&mut cursor)?;
                if null_flag != 0 {
                    row.push(CellValue::Null);
                } else {
                    let len = read_u32(&mut cursor)? as usize;
                    let mut data = vec![0u8; len];
                    cursor.read_exact(&mut data).map_err(truncated_err)?;
                    row.push(CellValue::Bytes(data));
                }
            }
            rows.push(row);
        }

        Ok(ResultBuffer { columns, rows })
    }
}

fn truncated_err(_: io::Error) -> EngineError {
    EngineError::framing("Result buffer truncated while reading a field.")
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> Result<u8, EngineError> {
    cursor.read_u8().map_err(truncated_err)
}

fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, EngineError> {
    cursor.read_u16::<LE>().map_err(truncated_err)
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, EngineError> {
    cursor.read_u32::<LE>().map_err(truncated_err)
}

/// One item in a multi-result payload: either a nested [`ResultBuffer`] or an affected-row count.
#[derive(Debug, Clone)]
pub enum MultiResultItem {
    ResultSet(ResultBuffer),
    RowCount(i64),
}

/// Encodes a sequence of [`MultiResultItem`]s per spec.md §4.1.
pub fn encode_multi_result(items: &[MultiResultItem]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.write_u32::<LE>(items.len() as u32).unwrap();
    for item in items {
        match item {
            MultiResultItem::ResultSet(result) => {
                let payload = result.encode();
                buf.write_u8(0).unwrap();
                buf.write_u32::<LE>(payload.len() as u32).unwrap();
                buf.extend_from_slice(&payload);
            }
            MultiResultItem::RowCount(count) => {
                buf.write_u8(1).unwrap();
                buf.write_u32::<LE>(8).unwrap();
                buf.write_i64::<LE>(*count).unwrap();
            }
        }
    }
    buf
}

/// Decodes a multi-result payload produced by [`encode_multi_result`].
pub fn decode_multi_result(bytes: &[u8]) -> Result<Vec<MultiResultItem>, EngineError> {
    let mut cursor = Cursor::new(bytes);
    let item_count = read_u32(&mut cursor)?;
    let mut items = Vec::with_capacity(item_count as usize);
    for _ in 0..item_count {
        let tag = read_u8(&mut cursor)?;
        let len = read_u32(&mut cursor)? as usize;
        let mut payload = vec![0u8; len];
        cursor.read_exact(&mut payload).map_err(truncated_err)?;
        let item = match tag {
            0 => MultiResultItem::ResultSet(ResultBuffer::decode(&payload)?),
            1 => {
                if len != 8 {
                    return Err(EngineError::framing(
                        "Row-count multi-result item must be exactly 8 bytes.",
                    ));
                }
                let count = (&payload[..]).read_i64::<LE>().map_err(truncated_err)?;
                MultiResultItem::RowCount(count)
            }
            other => {
                return Err(EngineError::framing(format!(
                    "Unknown multi-result item tag {other}."
                )))
            }
        };
        items.push(item);
    }
    Ok(items)
}

/// Structured error layout: `sqlState(5) nativeCode(i32 LE) messageLen(u32 LE) message(utf-8)`.
pub fn encode_structured_error(sql_state: Option<[u8; 5]>, native_code: i32, message: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&sql_state.unwrap_or([0; 5]));
    buf.write_i32::<LE>(native_code).unwrap();
    let message_bytes = message.as_bytes();
    buf.write_u32::<LE>(message_bytes.len() as u32).unwrap();
    buf.extend_from_slice(message_bytes);
    buf
}

pub fn decode_structured_error(bytes: &[u8]) -> Result<([u8; 5], i32, String), EngineError> {
    let mut cursor = Cursor::new(bytes);
    let mut sql_state = [0u8; 5];
    cursor.read_exact(&mut sql_state).map_err(truncated_err)?;
    let native_code = cursor.read_i32::<LE>().map_err(truncated_err)?;
    let message_len = read_u32(&mut cursor)? as usize;
    let mut message_bytes = vec![0u8; message_len];
    cursor.read_exact(&mut message_bytes).map_err(truncated_err)?;
    let message = String::from_utf8(message_bytes)
        .map_err(|_| EngineError::framing("Structured error message is not valid UTF-8."))?;
    Ok((sql_state, native_code, message))
}

/// One bound parameter value, tagged per spec.md §4.1.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Null,
    String(String),
    Int32(i32),
    Int64(i64),
    Decimal(String),
    Binary(Vec<u8>),
}

/// Encodes a sequence of parameter values, concatenated with no outer count (the count is known
/// from statement metadata on both sides).
pub fn encode_parameters(values: &[ParameterValue]) -> Vec<u8> {
    let mut buf = Vec::new();
    for value in values {
        match value {
            ParameterValue::Null => {
                buf.write_u8(0).unwrap();
                buf.write_u32::<LE>(0).unwrap();
            }
            ParameterValue::String(s) => write_tagged(&mut buf, 1, s.as_bytes()),
            ParameterValue::Int32(v) => write_tagged(&mut buf, 2, &v.to_le_bytes()),
            ParameterValue::Int64(v) => write_tagged(&mut buf, 3, &v.to_le_bytes()),
            ParameterValue::Decimal(s) => write_tagged(&mut buf, 4, s.as_bytes()),
            ParameterValue::Binary(data) => write_tagged(&mut buf, 5, data),
        }
    }
    buf
}

fn write_tagged(buf: &mut Vec<u8>, tag: u8, payload: &[u8]) {
    buf.write_u8(tag).unwrap();
    buf.write_u32::<LE>(payload.len() as u32).unwrap();
    buf.extend_from_slice(payload);
}

/// Decodes `count` parameter values from a concatenated parameter buffer. Rejects unknown tags.
pub fn decode_parameters(bytes: &[u8], count: usize) -> Result<Vec<ParameterValue>, EngineError> {
    let mut cursor = Cursor::new(bytes);
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        let tag = read_u8(&mut cursor)?;
        let len = read_u32(&mut cursor)? as usize;
        let mut payload = vec![0u8; len];
        cursor.read_exact(&mut payload).map_err(truncated_err)?;
        let value = match tag {
            0 => ParameterValue::Null,
            1 => ParameterValue::String(
                String::from_utf8(payload)
                    .map_err(|_| EngineError::framing("Parameter string is not valid UTF-8."))?,
            ),
            2 => {
                if len != 4 {
                    return Err(EngineError::framing("Int32 parameter must be 4 bytes."));
                }
                ParameterValue::Int32(i32::from_le_bytes(payload.try_into().unwrap()))
            }
            3 => {
                if len != 8 {
                    return Err(EngineError::framing("Int64 parameter must be 8 bytes."));
                }
                ParameterValue::Int64(i64::from_le_bytes(payload.try_into().unwrap()))
            }
            4 => ParameterValue::Decimal(
                String::from_utf8(payload)
                    .map_err(|_| EngineError::framing("Decimal parameter is not valid UTF-8."))?,
            ),
            5 => ParameterValue::Binary(payload),
            other => {
                return Err(EngineError::framing(format!(
                    "Unknown parameter value tag {other}."
                )))
            }
        };
        values.push(value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_buffer_round_trips() {
        let buffer = ResultBuffer::empty();
        let encoded = buffer.encode();
        assert_eq!(encoded.len(), HEADER_LEN);
        let decoded = ResultBuffer::decode(&encoded).unwrap();
        assert_eq!(decoded.columns.len(), 0);
        assert_eq!(decoded.row_count(), 0);
    }

    #[test]
    fn one_row_one_column_round_trips() {
        let buffer = ResultBuffer {
            columns: vec![ColumnMeta {
                odbc_type: OdbcTypeTag::Integer,
                name: "v".to_string(),
            }],
            rows: vec![vec![CellValue::Bytes(1i32.to_le_bytes().to_vec())]],
        };
        let encoded = buffer.encode();
        let decoded = ResultBuffer::decode(&encoded).unwrap();
        assert_eq!(decoded.columns[0].name, "v");
        assert_eq!(decoded.row_count(), 1);
        match &decoded.rows[0][0] {
            CellValue::Bytes(data) => assert_eq!(i32::from_le_bytes(data[..].try_into().unwrap()), 1),
            CellValue::Null => panic!("expected a value"),
        }
    }

    #[test]
    fn truncated_buffer_is_a_framing_error() {
        let mut encoded = ResultBuffer {
            columns: vec![ColumnMeta {
                odbc_type: OdbcTypeTag::Varchar,
                name: "s".to_string(),
            }],
            rows: vec![vec![CellValue::Bytes(b"hello".to_vec())]],
        }
        .encode();
        encoded.truncate(encoded.len() - 2);
        let err = ResultBuffer::decode(&encoded).unwrap_err();
        assert_eq!(err.kind, EngineErrorKind::FramingError);
    }

    #[test]
    fn bad_magic_is_a_framing_error() {
        let mut encoded = ResultBuffer::empty().encode();
        encoded[0] = 0xff;
        let err = ResultBuffer::decode(&encoded).unwrap_err();
        assert_eq!(err.kind, EngineErrorKind::FramingError);
    }

    #[test]
    fn parameter_values_round_trip() {
        let values = vec![
            ParameterValue::Int32(1),
            ParameterValue::Null,
            ParameterValue::String("hi".to_string()),
            ParameterValue::Binary(vec![1, 2, 3]),
        ];
        let encoded = encode_parameters(&values);
        let decoded = decode_parameters(&encoded, values.len()).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn multi_result_round_trips_in_order() {
        let items = vec![
            MultiResultItem::RowCount(42),
            MultiResultItem::ResultSet(ResultBuffer::empty()),
        ];
        let encoded = encode_multi_result(&items);
        let decoded = decode_multi_result(&encoded).unwrap();
        assert_eq!(decoded.len(), 2);
        matches!(decoded[0], MultiResultItem::RowCount(42));
        matches!(decoded[1], MultiResultItem::ResultSet(_));
    }

    #[test]
    fn unknown_parameter_tag_is_rejected() {
        let mut buf = Vec::new();
        buf.push(200u8);
        buf.extend_from_slice(&0u32.to_le_bytes());
        let err = decode_parameters(&buf, 1).unwrap_err();
        assert_eq!(err.kind, EngineErrorKind::FramingError);
    }
}
