use odbc_engine::buffers::{AnySliceMut, BufferDesc, ColumnarAnyBuffer};
use std::iter;

/// Verify writer panics if too large elements are inserted into a binary column of
/// ColumnarAnyBuffer.
#[test]
#[should_panic]
fn insert_too_large_element_in_bin_column() {
    // Fill buffer with values
    let desc = BufferDesc::Binary { length: 1 };
    let mut buffer = ColumnarAnyBuffer::from_descs(10, iter::once(desc));
    buffer.set_num_rows(1);
    if let AnySliceMut::Binary(mut col) = buffer.column_mut(0) {
        col.set_cell(0, Some(&b"too large input."[..]))
    }
}

/// Verify writer panics if too large elements are inserted into a text column of
/// ColumnarAnyBuffer.
#[test]
#[should_panic]
fn insert_too_large_element_in_text_column() {
    // Fill buffer with values
    let desc = BufferDesc::Text { max_str_len: 1 };
    let mut buffer = ColumnarAnyBuffer::from_descs(10, iter::once(desc));
    buffer.set_num_rows(1);
    if let AnySliceMut::Text(mut col) = buffer.column_mut(0) {
        col.set_cell(0, Some(&b"too large input."[..]))
    }
}
