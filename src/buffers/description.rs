use std::mem::size_of;

use odbc_sys::{Date, Time, Timestamp};

use crate::{Bit, DataType};

/// Describes a column of a [`crate::buffers::ColumnarBuffer`].
///
/// While related to the [`crate::DataType`] of the column this is bound to, the buffer type is
/// different as it does not describe the type of the data source but the format the data is going
/// to be represented in memory. While the data source is often considered to choose the buffer
/// type the kind of processing which is supposed to be applied to the data may be even more
/// important when choosing the buffer for the cursor type. I.e. if you intend to print a date to
/// standard out it may be more reasonable to bind it as `Text` rather than `Date`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferDesc {
    /// Variable sized binary buffer, large enough to hold elements of `length` bytes.
    Binary { length: usize },
    /// Variable sized character buffer, using the system encoding, large enough to hold elements
    /// of `max_str_len` one byte characters.
    Text { max_str_len: usize },
    /// Variable sized character buffer, using UTF-16 encoding, large enough to hold elements of
    /// `max_str_len` two byte characters.
    WText { max_str_len: usize },
    Date { nullable: bool },
    Time { nullable: bool },
    Timestamp { nullable: bool },
    F64 { nullable: bool },
    F32 { nullable: bool },
    I8 { nullable: bool },
    I16 { nullable: bool },
    I32 { nullable: bool },
    I64 { nullable: bool },
    U8 { nullable: bool },
    Bit { nullable: bool },
}

impl BufferDesc {
    /// Describe a buffer which fits best the SQL Data Type. `nullable` indicates whether the
    /// buffer must be able to represent `NULL`.
    pub fn from_data_type(data_type: DataType, nullable: bool) -> Option<Self> {
        let desc = match data_type {
            DataType::Unknown
            | DataType::Other {
                data_type: _,
                column_size: _,
                decimal_digits: _,
            } => return None,
            DataType::Numeric { precision, scale } | DataType::Decimal { precision, scale }
                if scale == 0 && precision < 3 =>
            {
                BufferDesc::I8 { nullable }
            }
            DataType::Numeric { precision, scale } | DataType::Decimal { precision, scale }
                if scale == 0 && precision < 10 =>
            {
                BufferDesc::I32 { nullable }
            }
            DataType::Numeric { precision, scale } | DataType::Decimal { precision, scale }
                if scale == 0 && precision < 19 =>
            {
                BufferDesc::I64 { nullable }
            }
            DataType::Varchar { length }
            | DataType::WVarchar { length }
            // Currently no special buffers for fixed lengths text implemented.
            | DataType::Char { length } => BufferDesc::Text { max_str_len: length },
            // Specialized buffers for Numeric and Decimal are not yet supported.
            DataType::Numeric { .. } | DataType::Decimal { .. } => BufferDesc::Text {
                max_str_len: data_type.column_size(),
            },
            DataType::Integer => BufferDesc::I32 { nullable },
            DataType::SmallInt => BufferDesc::I16 { nullable },
            DataType::Float => BufferDesc::F32 { nullable },
            DataType::Real => BufferDesc::F32 { nullable },
            DataType::Double => BufferDesc::F64 { nullable },
            DataType::Date => BufferDesc::Date { nullable },
            DataType::Time { .. } => BufferDesc::Time { nullable },
            DataType::Timestamp { .. } => BufferDesc::Timestamp { nullable },
            DataType::BigInt => BufferDesc::I64 { nullable },
            DataType::TinyInt => BufferDesc::I8 { nullable },
            DataType::Bit => BufferDesc::Bit { nullable },
            DataType::Varbinary { length } => BufferDesc::Binary { length },
        };
        Some(desc)
    }

    /// Number of bytes a single row of this buffer consumes in memory. Includes both the element
    /// value and, where applicable, its indicator. Useful for estimating the memory footprint of
    /// a [`crate::buffers::ColumnarBuffer`] before allocating it.
    pub fn bytes_per_row(&self) -> usize {
        let indicator = size_of::<isize>();
        match *self {
            BufferDesc::Binary { length } => length + indicator,
            BufferDesc::Text { max_str_len } => (max_str_len + 1) + indicator,
            BufferDesc::WText { max_str_len } => (max_str_len + 1) * size_of::<u16>() + indicator,
            BufferDesc::Date { nullable } => size_of::<Date>() + nullable_indicator(nullable),
            BufferDesc::Time { nullable } => size_of::<Time>() + nullable_indicator(nullable),
            BufferDesc::Timestamp { nullable } => {
                size_of::<Timestamp>() + nullable_indicator(nullable)
            }
            BufferDesc::F64 { nullable } => size_of::<f64>() + nullable_indicator(nullable),
            BufferDesc::F32 { nullable } => size_of::<f32>() + nullable_indicator(nullable),
            BufferDesc::I8 { nullable } => size_of::<i8>() + nullable_indicator(nullable),
            BufferDesc::I16 { nullable } => size_of::<i16>() + nullable_indicator(nullable),
            BufferDesc::I32 { nullable } => size_of::<i32>() + nullable_indicator(nullable),
            BufferDesc::I64 { nullable } => size_of::<i64>() + nullable_indicator(nullable),
            BufferDesc::U8 { nullable } => size_of::<u8>() + nullable_indicator(nullable),
            BufferDesc::Bit { nullable } => size_of::<Bit>() + nullable_indicator(nullable),
        }
    }
}

fn nullable_indicator(nullable: bool) -> usize {
    if nullable {
        size_of::<isize>()
    } else {
        0
    }
}
