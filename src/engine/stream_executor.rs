//! Streaming executor (C7): `stream_start`/`stream_start_batched` → repeated `stream_fetch` →
//! `stream_close`, the same external contract for both modes (spec.md §4.7).
//!
//! **Buffer mode** runs the query to completion up front (via [`super::query_executor`]) and
//! chunks the one resulting framed buffer across `stream_fetch` calls. **Batched mode** keeps a
//! live, bound cursor and produces one independently-framed [`ResultBuffer`] per `fetchSize` rows,
//! chunking each batch's bytes in turn, so at most one encoded batch is held in memory at a time.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::buffers::ColumnarAnyBuffer;
use crate::handles::StatementConnection;
use crate::{BlockCursor, Cursor, CursorImpl};

use super::codec::{ColumnMeta, ParameterValue, ResultBuffer};
use super::error::EngineError;
use super::query_executor::{
    build_input_parameters, cell_from_any_slice, describe_columns, execute_adhoc, set_query_timeout,
};
use super::stmt_cache::SharedConnection;

/// Row-set size used for a single `stream_fetch` batch in batched mode when the caller does not
/// override it.
const DEFAULT_FETCH_SIZE: usize = 500;

type OwnedCursor = CursorImpl<StatementConnection<SharedConnection>>;

enum Body {
    /// The whole result has already been encoded; `stream_fetch` only ever drains `pending`.
    Buffer,
    /// A live cursor, polled for one more framed batch whenever `pending` runs low.
    Batched {
        block_cursor: Option<BlockCursor<OwnedCursor, ColumnarAnyBuffer>>,
        columns: Vec<ColumnMeta>,
        /// Set once either the cursor is exhausted or it never existed (a non-SELECT statement),
        /// after the single resulting empty frame has been queued.
        done: bool,
    },
}

/// A single open stream, owned by the handle manager for the lifetime between `stream_start` and
/// `stream_close`.
pub struct Stream {
    body: Body,
    pending: VecDeque<u8>,
    chunk_size: usize,
}

impl Stream {
    /// Buffer mode: the entire query result, already encoded.
    pub fn start_buffer(
        connection: &SharedConnection,
        sql: &str,
        params: &[ParameterValue],
        timeout_sec: usize,
        chunk_size: usize,
    ) -> Result<Self, EngineError> {
        let batch_size = DEFAULT_FETCH_SIZE;
        let buffer = execute_adhoc(connection, sql, params, timeout_sec, batch_size)?;
        Ok(Stream {
            body: Body::Buffer,
            pending: buffer.encode().into(),
            chunk_size: chunk_size.max(1),
        })
    }

    /// Batched mode: binds a cursor-driven fetch buffer with `fetchSize` rows per batch and
    /// re-homes the resulting statement onto an owned [`StatementConnection`] so it survives past
    /// the connection lock taken to execute it.
    pub fn start_batched(
        connection: &SharedConnection,
        sql: &str,
        params: &[ParameterValue],
        timeout_sec: usize,
        fetch_size: usize,
        chunk_size: usize,
    ) -> Result<Self, EngineError> {
        let guard = connection.lock().expect("connection mutex is not poisoned");
        let mut statement = guard.preallocate().map_err(EngineError::from)?;
        set_query_timeout(&mut statement, timeout_sec)?;
        let inputs = build_input_parameters(params);
        let cursor = statement
            .into_cursor(sql, &inputs[..])
            .map_err(EngineError::from)?;

        let Some(mut cursor) = cursor else {
            drop(guard);
            return Ok(Stream {
                body: Body::Batched {
                    block_cursor: None,
                    columns: Vec::new(),
                    done: false,
                },
                pending: VecDeque::new(),
                chunk_size: chunk_size.max(1),
            });
        };

        let (columns, descs) = describe_columns(&mut cursor)?;
        let stmt_ptr = cursor.into_stmt().into_sys();
        drop(guard);
        // Safe: `stmt_ptr` was just produced by a live cursor allocated against `connection`, and
        // the cloned `Arc` keeps the connection open and unmoved for as long as the resulting
        // `StatementConnection` lives, mirroring `StmtCache::prepare_owned`.
        let owning = unsafe { StatementConnection::new(stmt_ptr, Arc::clone(connection)) };
        // Safe: the handle is still in cursor state, we only just described its columns.
        let owned_cursor = unsafe { CursorImpl::new(owning) };
        let fetch_buffer = ColumnarAnyBuffer::from_descs(fetch_size.max(1), descs.iter().copied());
        let block_cursor = owned_cursor
            .bind_buffer(fetch_buffer)
            .map_err(EngineError::from)?;

        Ok(Stream {
            body: Body::Batched {
                block_cursor: Some(block_cursor),
                columns,
                done: false,
            },
            pending: VecDeque::new(),
            chunk_size: chunk_size.max(1),
        })
    }

    /// Produces the next chunk, pulling additional batches as needed to fill it. `has_more` is
    /// `true` until both `pending` is drained and no further batches remain.
    pub fn fetch(&mut self) -> Result<(Vec<u8>, bool), EngineError> {
        while self.pending.len() < self.chunk_size && self.pull_more()? {}
        let take = self.chunk_size.min(self.pending.len());
        let data: Vec<u8> = self.pending.drain(..take).collect();
        let has_more = !self.pending.is_empty() || self.can_pull_more();
        Ok((data, has_more))
    }

    fn can_pull_more(&self) -> bool {
        match &self.body {
            Body::Buffer => false,
            Body::Batched { done, .. } => !done,
        }
    }

    /// Appends one more framed batch to `pending`. Returns `false` once there is nothing left to
    /// pull (buffer mode always returns `false`, having nothing to add beyond the initial encode).
    fn pull_more(&mut self) -> Result<bool, EngineError> {
        let Body::Batched {
            block_cursor,
            columns,
            done,
        } = &mut self.body
        else {
            return Ok(false);
        };
        if *done {
            return Ok(false);
        }
        let Some(cursor) = block_cursor else {
            // Non-SELECT statement: queue the single, empty result buffer the query executor
            // contract requires, then stop.
            self.pending.extend(ResultBuffer::empty().encode());
            *done = true;
            return Ok(true);
        };
        match cursor.fetch().map_err(EngineError::from)? {
            Some(batch) => {
                let num_rows = batch.num_rows();
                let mut rows = Vec::with_capacity(num_rows);
                for row in 0..num_rows {
                    let mut cells = Vec::with_capacity(columns.len());
                    for col in 0..columns.len() {
                        cells.push(cell_from_any_slice(batch.column(col), row));
                    }
                    rows.push(cells);
                }
                let encoded = ResultBuffer {
                    columns: columns.clone(),
                    rows,
                }
                .encode();
                self.pending.extend(encoded);
                Ok(true)
            }
            None => {
                *done = true;
                *block_cursor = None;
                Ok(true)
            }
        }
    }

    /// Closes the stream, releasing any bound cursor. Safe to call after an error: dropping the
    /// block cursor unbinds it and runs `SQLCloseCursor` the same as any other cursor drop.
    pub fn close(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_mode_chunks_respect_chunk_size() {
        let mut stream = Stream {
            body: Body::Buffer,
            pending: vec![1u8, 2, 3, 4, 5].into(),
            chunk_size: 2,
        };
        let (chunk, has_more) = stream.fetch().unwrap();
        assert_eq!(chunk, vec![1, 2]);
        assert!(has_more);
        let (chunk, has_more) = stream.fetch().unwrap();
        assert_eq!(chunk, vec![3, 4]);
        assert!(has_more);
        let (chunk, has_more) = stream.fetch().unwrap();
        assert_eq!(chunk, vec![5]);
        assert!(!has_more);
    }

    #[test]
    fn batched_mode_with_no_cursor_yields_one_empty_frame() {
        let mut stream = Stream {
            body: Body::Batched {
                block_cursor: None,
                columns: Vec::new(),
                done: false,
            },
            pending: VecDeque::new(),
            chunk_size: 1024,
        };
        let (chunk, has_more) = stream.fetch().unwrap();
        assert_eq!(chunk, ResultBuffer::empty().encode());
        assert!(!has_more);
    }
}
