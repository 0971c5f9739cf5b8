//! C ABI surface (spec.md §6): the engine's only entry point for callers outside this process's
//! Rust code. Every operation is submitted as a job to the single process-wide [`Worker`] (C9);
//! this module's job is purely translating raw pointers and status codes at the boundary.
//!
//! All multi-byte integers are little-endian, matching [`super::engine::codec`]. Buffer-based
//! functions accept a caller-owned output buffer and always report the required length through
//! `written_out`; a buffer shorter than required yields [`STATUS_BUFFER_TOO_SMALL`] rather than a
//! partial write.

use std::cell::RefCell;
use std::ffi::{c_char, CStr};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use crate::engine::bulk_insert::{decode_bulk_insert_request, insert_array, insert_parallel};
use crate::engine::codec::{decode_parameters, encode_multi_result, encode_structured_error, ParameterValue};
use crate::engine::pool::Pool;
use crate::engine::query_executor::{execute_adhoc, execute_adhoc_multi, execute_prepared};
use crate::engine::stmt_cache::CacheMetrics;
use crate::engine::stream_executor::Stream;
use crate::engine::transaction::{IsolationLevel, Transaction};
use crate::engine::worker::DEFAULT_REQUEST_TIMEOUT;
use crate::engine::{EngineError, EngineErrorKind, HandleId, Worker, INVALID_HANDLE};

/// Success (spec.md §6).
pub const STATUS_OK: i32 = 0;
/// Failure; retrieve the reason with [`get_error`]/[`get_structured_error`].
pub const STATUS_ERROR: i32 = -1;
/// The caller's output buffer was shorter than the required length, reported via `written_out`.
pub const STATUS_BUFFER_TOO_SMALL: i32 = -2;

/// Row-set batch size used by every ad hoc/prepared/multi-result execute, mirroring
/// [`crate::engine::query_executor`]'s own default of the same value.
const DEFAULT_FETCH_BATCH: usize = 1000;

static WORKER: OnceLock<Worker> = OnceLock::new();
/// Guards `init`'s check-then-spawn-then-set sequence; `OnceLock::get_or_try_init` is not yet
/// stable, so idempotent fallible initialization is built by hand the same way the teacher favors
/// explicit control flow over unstable API surface.
static INIT_GUARD: Mutex<()> = Mutex::new(());

thread_local! {
    static LAST_ERROR: RefCell<Option<EngineError>> = const { RefCell::new(None) };
}

fn worker() -> Result<&'static Worker, EngineError> {
    WORKER.get().ok_or_else(EngineError::environment_not_initialized)
}

fn record_error(err: EngineError) -> i32 {
    let status = if err.kind == EngineErrorKind::BufferTooSmall {
        STATUS_BUFFER_TOO_SMALL
    } else {
        STATUS_ERROR
    };
    log::error!("{err}");
    LAST_ERROR.with(|cell| *cell.borrow_mut() = Some(err));
    status
}

fn status_from_result(f: impl FnOnce() -> Result<(), EngineError>) -> i32 {
    match f() {
        Ok(()) => STATUS_OK,
        Err(err) => record_error(err),
    }
}

fn id_result(result: Result<HandleId, EngineError>) -> u64 {
    match result {
        Ok(id) => id,
        Err(err) => {
            record_error(err);
            INVALID_HANDLE
        }
    }
}

fn rows_result(result: Result<u64, EngineError>) -> i64 {
    match result {
        Ok(n) => n as i64,
        Err(err) => {
            record_error(err);
            -1
        }
    }
}

/// Copies `data` into the caller's buffer, always reporting the true length through
/// `written_out`. Refuses a short buffer rather than truncating.
fn write_output(data: &[u8], out_ptr: *mut u8, out_len: usize, written_out: *mut usize) -> Result<(), EngineError> {
    if !written_out.is_null() {
        unsafe { *written_out = data.len() };
    }
    if data.len() > out_len {
        return Err(EngineError::buffer_too_small(data.len()));
    }
    if !out_ptr.is_null() && !data.is_empty() {
        unsafe { std::ptr::copy_nonoverlapping(data.as_ptr(), out_ptr, data.len()) };
    }
    Ok(())
}

/// # Safety
///
/// `ptr` must be null or point to a valid, NUL-terminated C string live for the call.
unsafe fn read_cstr(ptr: *const c_char) -> Result<String, EngineError> {
    if ptr.is_null() {
        return Err(EngineError::validation("Unexpected null string argument."));
    }
    let c_str = unsafe { CStr::from_ptr(ptr) };
    c_str
        .to_str()
        .map(str::to_string)
        .map_err(|_| EngineError::validation("String argument is not valid UTF-8."))
}

/// # Safety
///
/// Same contract as [`read_cstr`], except a null pointer is accepted as "match everything".
unsafe fn read_cstr_or_wildcard(ptr: *const c_char) -> Result<String, EngineError> {
    if ptr.is_null() {
        Ok("%".to_string())
    } else {
        unsafe { read_cstr(ptr) }
    }
}

/// # Safety
///
/// `ptr` must be null (iff `len == 0`) or point to `len` readable bytes live for the call.
unsafe fn read_slice<'a>(ptr: *const u8, len: usize) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(ptr, len) }
    }
}

fn timeout_sec_from_ms(timeout_ms: u64) -> usize {
    (timeout_ms / 1000) as usize
}

fn isolation_from_code(code: i32) -> Result<IsolationLevel, EngineError> {
    match code {
        0 => Ok(IsolationLevel::ReadUncommitted),
        1 => Ok(IsolationLevel::ReadCommitted),
        2 => Ok(IsolationLevel::RepeatableRead),
        3 => Ok(IsolationLevel::Serializable),
        other => Err(EngineError::validation(format!(
            "Unknown isolation level code {other}."
        ))),
    }
}

fn metrics_to_json(metrics: &CacheMetrics) -> String {
    use std::fmt::Write;
    let mut json = String::new();
    write!(
        json,
        "{{\"size\":{},\"max\":{},\"hits\":{},\"misses\":{},\"totalPrepares\":{},\
         \"totalExecutions\":{},\"averageExecutionsPerStmt\":{:.2},\"estimatedMemoryBytes\":{}}}",
        metrics.size,
        metrics.max,
        metrics.hits,
        metrics.misses,
        metrics.total_prepares,
        metrics.total_executions,
        metrics.average_executions_per_stmt(),
        metrics.estimated_memory_bytes(),
    )
    .expect("writing into a String never fails");
    json
}

/// Creates the process-wide environment and worker thread. Idempotent: a second call after a
/// successful first is a no-op success (spec.md §6).
///
/// # Safety
///
/// Must not be called concurrently with another process-wide ODBC environment allocation outside
/// this crate (see [`Worker::spawn`]).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn init() -> i32 {
    let _guard = INIT_GUARD.lock().unwrap();
    if WORKER.get().is_some() {
        return STATUS_OK;
    }
    match unsafe { Worker::spawn() } {
        Ok(w) => {
            let _ = WORKER.set(w);
            STATUS_OK
        }
        Err(err) => record_error(err),
    }
}

/// # Safety
///
/// `connection_string` must be null-terminated and valid for the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn connect(connection_string: *const c_char) -> u64 {
    unsafe { connect_with_timeout(connection_string, 0) }
}

/// `timeout_ms` bounds the worker round trip, not a driver-level login timeout (the teacher
/// exposes no `SQL_ATTR_LOGIN_TIMEOUT` primitive); `0` uses [`DEFAULT_REQUEST_TIMEOUT`].
///
/// # Safety
///
/// `connection_string` must be null-terminated and valid for the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn connect_with_timeout(connection_string: *const c_char, timeout_ms: u64) -> u64 {
    id_result((|| {
        let worker = worker()?;
        let connection_string = unsafe { read_cstr(connection_string) }?;
        let timeout = if timeout_ms == 0 {
            Some(DEFAULT_REQUEST_TIMEOUT)
        } else {
            Some(Duration::from_millis(timeout_ms))
        };
        worker.submit(timeout, move |env, handles| {
            let connection = env
                .connect_with_connection_string(&connection_string)
                .map_err(EngineError::from)?;
            Ok(handles.register_connection(connection))
        })
    })())
}

#[unsafe(no_mangle)]
pub extern "C" fn disconnect(conn_id: u64) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.drop_connection(conn_id)
        })
    })
}

/// # Safety
///
/// `sql` must be null-terminated and valid for the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn exec_query(
    conn_id: u64,
    sql: *const c_char,
    timeout_ms: u64,
    out_ptr: *mut u8,
    out_len: usize,
    written_out: *mut usize,
) -> i32 {
    unsafe {
        exec_query_params(
            conn_id,
            sql,
            std::ptr::null(),
            0,
            0,
            timeout_ms,
            out_ptr,
            out_len,
            written_out,
        )
    }
}

/// # Safety
///
/// `sql` must be null-terminated; `params_ptr` must be null (iff `params_len == 0`) or point to
/// `params_len` readable bytes encoding `param_count` [`ParameterValue`]s.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn exec_query_params(
    conn_id: u64,
    sql: *const c_char,
    params_ptr: *const u8,
    params_len: usize,
    param_count: usize,
    timeout_ms: u64,
    out_ptr: *mut u8,
    out_len: usize,
    written_out: *mut usize,
) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let sql = unsafe { read_cstr(sql) }?;
        let params = decode_parameters(unsafe { read_slice(params_ptr, params_len) }, param_count)?;
        let timeout_sec = timeout_sec_from_ms(timeout_ms);
        let buffer = worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.with_connection(conn_id, |record| {
                execute_adhoc(record.connection(), &sql, &params, timeout_sec, DEFAULT_FETCH_BATCH)
            })
        })?;
        write_output(&buffer.encode(), out_ptr, out_len, written_out)
    })
}

/// # Safety
///
/// Same pointer contract as [`exec_query_params`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn exec_query_multi(
    conn_id: u64,
    sql: *const c_char,
    params_ptr: *const u8,
    params_len: usize,
    param_count: usize,
    timeout_ms: u64,
    out_ptr: *mut u8,
    out_len: usize,
    written_out: *mut usize,
) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let sql = unsafe { read_cstr(sql) }?;
        let params = decode_parameters(unsafe { read_slice(params_ptr, params_len) }, param_count)?;
        let timeout_sec = timeout_sec_from_ms(timeout_ms);
        let items = worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.with_connection(conn_id, |record| {
                execute_adhoc_multi(record.connection(), &sql, &params, timeout_sec, DEFAULT_FETCH_BATCH)
            })
        })?;
        write_output(&encode_multi_result(&items), out_ptr, out_len, written_out)
    })
}

/// Primes `sql` into the connection's statement cache and returns a handle for
/// [`execute`]/[`close_statement`] (spec.md §4.5/§6).
///
/// # Safety
///
/// `sql` must be null-terminated and valid for the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn prepare(conn_id: u64, sql: *const c_char) -> u64 {
    id_result((|| {
        let worker = worker()?;
        let sql = unsafe { read_cstr(sql) }?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.with_connection(conn_id, |record| record.statement_cache.prepare(&sql).map(|_| ()))?;
            Ok(handles.register_statement(conn_id, sql))
        })
    })())
}

/// `timeout_ms = 0` disables the driver-side query timeout.
///
/// # Safety
///
/// Same pointer contract as [`exec_query_params`]'s parameter buffer.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn execute(
    stmt_id: u64,
    params_ptr: *const u8,
    params_len: usize,
    param_count: usize,
    timeout_ms: u64,
    out_ptr: *mut u8,
    out_len: usize,
    written_out: *mut usize,
) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let params = decode_parameters(unsafe { read_slice(params_ptr, params_len) }, param_count)?;
        let timeout_sec = timeout_sec_from_ms(timeout_ms);
        let buffer = worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let (conn_id, sql) = handles.statement_lookup(stmt_id)?;
            handles.with_connection(conn_id, |record| {
                execute_prepared(&mut record.statement_cache, &sql, &params, timeout_sec, DEFAULT_FETCH_BATCH)
            })
        })?;
        write_output(&buffer.encode(), out_ptr, out_len, written_out)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn close_statement(stmt_id: u64) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.drop_statement(stmt_id)
        })
    })
}

/// Always [`EngineErrorKind::UnsupportedFeature`] in this revision (spec.md §4.9/§6).
#[unsafe(no_mangle)]
pub extern "C" fn cancel(statement_id: u64) -> i32 {
    status_from_result(|| worker()?.cancel(statement_id))
}

/// # Safety
///
/// `sql` must be null-terminated; parameter buffer contract matches [`exec_query_params`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stream_start(
    conn_id: u64,
    sql: *const c_char,
    params_ptr: *const u8,
    params_len: usize,
    param_count: usize,
    timeout_ms: u64,
    chunk_size: usize,
) -> u64 {
    id_result((|| {
        let worker = worker()?;
        let sql = unsafe { read_cstr(sql) }?;
        let params = decode_parameters(unsafe { read_slice(params_ptr, params_len) }, param_count)?;
        let timeout_sec = timeout_sec_from_ms(timeout_ms);
        let chunk_size = chunk_size.max(1);
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.ensure_stream_slot_free(conn_id)?;
            let shared = handles.connection_handle(conn_id)?;
            let stream = Stream::start_buffer(&shared, &sql, &params, timeout_sec, chunk_size)?;
            Ok(handles.register_stream(conn_id, stream))
        })
    })())
}

/// # Safety
///
/// Same pointer contract as [`stream_start`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn stream_start_batched(
    conn_id: u64,
    sql: *const c_char,
    params_ptr: *const u8,
    params_len: usize,
    param_count: usize,
    timeout_ms: u64,
    fetch_size: usize,
    chunk_size: usize,
) -> u64 {
    id_result((|| {
        let worker = worker()?;
        let sql = unsafe { read_cstr(sql) }?;
        let params = decode_parameters(unsafe { read_slice(params_ptr, params_len) }, param_count)?;
        let timeout_sec = timeout_sec_from_ms(timeout_ms);
        let fetch_size = fetch_size.max(1);
        let chunk_size = chunk_size.max(1);
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.ensure_stream_slot_free(conn_id)?;
            let shared = handles.connection_handle(conn_id)?;
            let stream = Stream::start_batched(&shared, &sql, &params, timeout_sec, fetch_size, chunk_size)?;
            Ok(handles.register_stream(conn_id, stream))
        })
    })())
}

#[unsafe(no_mangle)]
pub extern "C" fn stream_fetch(
    stream_id: u64,
    out_ptr: *mut u8,
    out_len: usize,
    written_out: *mut usize,
    has_more_out: *mut u8,
) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let (data, has_more) = worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.with_stream(stream_id, |stream| stream.fetch())
        })?;
        if !has_more_out.is_null() {
            unsafe { *has_more_out = has_more as u8 };
        }
        write_output(&data, out_ptr, out_len, written_out)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn stream_close(stream_id: u64) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.drop_stream(stream_id)
        })
    })
}

/// Returns standard result buffers over `INFORMATION_SCHEMA.TABLES` (spec.md §6). The teacher
/// exposes no raw `SQLTables` wrapper, so this is a plain parameterized query rather than a
/// native catalog call; a null pattern matches everything.
///
/// # Safety
///
/// `schema_pattern`/`table_pattern` must each be null or a null-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn catalog_tables(
    conn_id: u64,
    schema_pattern: *const c_char,
    table_pattern: *const c_char,
    timeout_ms: u64,
    out_ptr: *mut u8,
    out_len: usize,
    written_out: *mut usize,
) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let schema_pattern = unsafe { read_cstr_or_wildcard(schema_pattern) }?;
        let table_pattern = unsafe { read_cstr_or_wildcard(table_pattern) }?;
        let timeout_sec = timeout_sec_from_ms(timeout_ms);
        let buffer = worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let shared = handles.connection_handle(conn_id)?;
            let params = [
                ParameterValue::String(schema_pattern),
                ParameterValue::String(table_pattern),
            ];
            execute_adhoc(
                &shared,
                "SELECT TABLE_CATALOG, TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE \
                 FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_SCHEMA LIKE ? AND TABLE_NAME LIKE ?",
                &params,
                timeout_sec,
                DEFAULT_FETCH_BATCH,
            )
        })?;
        write_output(&buffer.encode(), out_ptr, out_len, written_out)
    })
}

/// # Safety
///
/// Each pattern pointer must be null or a null-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn catalog_columns(
    conn_id: u64,
    schema_pattern: *const c_char,
    table_pattern: *const c_char,
    column_pattern: *const c_char,
    timeout_ms: u64,
    out_ptr: *mut u8,
    out_len: usize,
    written_out: *mut usize,
) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let schema_pattern = unsafe { read_cstr_or_wildcard(schema_pattern) }?;
        let table_pattern = unsafe { read_cstr_or_wildcard(table_pattern) }?;
        let column_pattern = unsafe { read_cstr_or_wildcard(column_pattern) }?;
        let timeout_sec = timeout_sec_from_ms(timeout_ms);
        let buffer = worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let shared = handles.connection_handle(conn_id)?;
            let params = [
                ParameterValue::String(schema_pattern),
                ParameterValue::String(table_pattern),
                ParameterValue::String(column_pattern),
            ];
            execute_adhoc(
                &shared,
                "SELECT TABLE_CATALOG, TABLE_SCHEMA, TABLE_NAME, COLUMN_NAME, DATA_TYPE, IS_NULLABLE \
                 FROM INFORMATION_SCHEMA.COLUMNS \
                 WHERE TABLE_SCHEMA LIKE ? AND TABLE_NAME LIKE ? AND COLUMN_NAME LIKE ?",
                &params,
                timeout_sec,
                DEFAULT_FETCH_BATCH,
            )
        })?;
        write_output(&buffer.encode(), out_ptr, out_len, written_out)
    })
}

/// Standard SQL has no universal type-info catalog view; this reports the distinct column data
/// types actually in use on the connection's catalog instead, the closest stand-in reachable via
/// `INFORMATION_SCHEMA` alone.
#[unsafe(no_mangle)]
pub extern "C" fn catalog_type_info(
    conn_id: u64,
    timeout_ms: u64,
    out_ptr: *mut u8,
    out_len: usize,
    written_out: *mut usize,
) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let timeout_sec = timeout_sec_from_ms(timeout_ms);
        let buffer = worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let shared = handles.connection_handle(conn_id)?;
            execute_adhoc(
                &shared,
                "SELECT DISTINCT DATA_TYPE FROM INFORMATION_SCHEMA.COLUMNS ORDER BY DATA_TYPE",
                &[],
                timeout_sec,
                DEFAULT_FETCH_BATCH,
            )
        })?;
        write_output(&buffer.encode(), out_ptr, out_len, written_out)
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn transaction_begin(conn_id: u64, isolation: i32) -> u64 {
    id_result((|| {
        let worker = worker()?;
        let level = isolation_from_code(isolation)?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let shared = handles.connection_handle(conn_id)?;
            let guard = shared.lock().expect("connection mutex is not poisoned");
            let txn = Transaction::begin(&guard, level)?;
            drop(guard);
            Ok(handles.register_transaction(conn_id, txn))
        })
    })())
}

#[unsafe(no_mangle)]
pub extern "C" fn transaction_commit(txn_id: u64) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let conn_id = handles.transaction_connection(txn_id)?;
            let shared = handles.connection_handle(conn_id)?;
            let guard = shared.lock().expect("connection mutex is not poisoned");
            handles.with_transaction(txn_id, |txn| txn.commit(&guard))?;
            drop(guard);
            handles.drop_transaction(txn_id).map(|_| ())
        })
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn transaction_rollback(txn_id: u64) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let conn_id = handles.transaction_connection(txn_id)?;
            let shared = handles.connection_handle(conn_id)?;
            let guard = shared.lock().expect("connection mutex is not poisoned");
            handles.with_transaction(txn_id, |txn| txn.rollback(&guard))?;
            drop(guard);
            handles.drop_transaction(txn_id).map(|_| ())
        })
    })
}

/// # Safety
///
/// `name` must be null-terminated and valid for the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn savepoint_create(txn_id: u64, name: *const c_char) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let name = unsafe { read_cstr(name) }?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let conn_id = handles.transaction_connection(txn_id)?;
            let shared = handles.connection_handle(conn_id)?;
            let guard = shared.lock().expect("connection mutex is not poisoned");
            handles.with_transaction(txn_id, |txn| txn.savepoint_create(&guard, &name))
        })
    })
}

/// # Safety
///
/// `name` must be null-terminated and valid for the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn savepoint_rollback(txn_id: u64, name: *const c_char) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let name = unsafe { read_cstr(name) }?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let conn_id = handles.transaction_connection(txn_id)?;
            let shared = handles.connection_handle(conn_id)?;
            let guard = shared.lock().expect("connection mutex is not poisoned");
            handles.with_transaction(txn_id, |txn| txn.savepoint_rollback(&guard, &name))
        })
    })
}

/// # Safety
///
/// `name` must be null-terminated and valid for the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn savepoint_release(txn_id: u64, name: *const c_char) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let name = unsafe { read_cstr(name) }?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let conn_id = handles.transaction_connection(txn_id)?;
            let shared = handles.connection_handle(conn_id)?;
            let guard = shared.lock().expect("connection mutex is not poisoned");
            handles.with_transaction(txn_id, |txn| txn.savepoint_release(&guard, &name))
        })
    })
}

/// # Safety
///
/// `connection_string` must be null-terminated and valid for the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn pool_create(connection_string: *const c_char, max_size: u32) -> u64 {
    id_result((|| {
        let worker = worker()?;
        let connection_string = unsafe { read_cstr(connection_string) }?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |env, handles| {
            let pool = Pool::create(env, connection_string, max_size as usize);
            Ok(handles.register_pool(pool))
        })
    })())
}

#[unsafe(no_mangle)]
pub extern "C" fn pool_get_connection(pool_id: u64) -> u64 {
    id_result((|| {
        let worker = worker()?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.checkout_pool_connection(pool_id)
        })
    })())
}

#[unsafe(no_mangle)]
pub extern "C" fn pool_release_connection(conn_id: u64, pool_id: u64) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.release_pool_connection(conn_id, pool_id)
        })
    })
}

/// `0` = every idle connection answered the liveness probe, `-1` = at least one did not.
#[unsafe(no_mangle)]
pub extern "C" fn pool_health_check(pool_id: u64) -> i32 {
    let outcome = (|| {
        let worker = worker()?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.with_pool(pool_id, |pool| Ok(pool.health_check()))
        })
    })();
    match outcome {
        Ok(true) => STATUS_OK,
        Ok(false) => STATUS_ERROR,
        Err(err) => record_error(err),
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn pool_get_state(
    pool_id: u64,
    size_out: *mut usize,
    idle_out: *mut usize,
    max_out: *mut usize,
) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let state = worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.with_pool(pool_id, |pool| Ok(pool.state()))
        })?;
        if !size_out.is_null() {
            unsafe { *size_out = state.size };
        }
        if !idle_out.is_null() {
            unsafe { *idle_out = state.idle };
        }
        if !max_out.is_null() {
            unsafe { *max_out = state.max };
        }
        Ok(())
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn pool_close(pool_id: u64) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.drop_pool(pool_id)
        })
    })
}

/// Array-bound insert against a single connection; rows inserted, or a negative status on
/// failure. `batch_size = 0` uses the row-set default (spec.md §4.8).
///
/// # Safety
///
/// `bytes_ptr` must be null (iff `bytes_len == 0`) or point to `bytes_len` readable bytes
/// encoding an array-bound insert request.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bulk_insert_array(
    conn_id: u64,
    bytes_ptr: *const u8,
    bytes_len: usize,
    batch_size: usize,
) -> i64 {
    rows_result((|| {
        let worker = worker()?;
        let bytes = unsafe { read_slice(bytes_ptr, bytes_len) }.to_vec();
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let request = decode_bulk_insert_request(&bytes)?;
            handles.with_connection(conn_id, |record| {
                let shared = Arc::clone(record.connection());
                let guard = shared.lock().expect("connection mutex is not poisoned");
                insert_array(&guard, &request, batch_size.max(1))
            })
        })
    })())
}

/// Splits the request's rows across `workers` pool-backed connections (spec.md §4.8).
///
/// # Safety
///
/// Same buffer contract as [`bulk_insert_array`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn bulk_insert_parallel(
    pool_id: u64,
    bytes_ptr: *const u8,
    bytes_len: usize,
    workers: usize,
    batch_size: usize,
) -> i64 {
    rows_result((|| {
        let worker = worker()?;
        let bytes = unsafe { read_slice(bytes_ptr, bytes_len) }.to_vec();
        worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            let request = decode_bulk_insert_request(&bytes)?;
            handles.with_pool(pool_id, |pool| {
                insert_parallel(pool, &request, workers.max(1), batch_size.max(1))
            })
        })
    })())
}

/// Writes the last error's human-readable message for the calling thread. Empty if none.
#[unsafe(no_mangle)]
pub extern "C" fn get_error(out_ptr: *mut u8, out_len: usize, written_out: *mut usize) -> i32 {
    let message = LAST_ERROR.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|err| err.message.clone())
            .unwrap_or_default()
    });
    match write_output(message.as_bytes(), out_ptr, out_len, written_out) {
        Ok(()) => STATUS_OK,
        Err(err) => record_error(err),
    }
}

/// Writes the structured `sqlState(5) nativeCode(i32 LE) messageLen(u32 LE) message` payload for
/// the calling thread's last error (spec.md §4.1/§7).
#[unsafe(no_mangle)]
pub extern "C" fn get_structured_error(out_ptr: *mut u8, out_len: usize, written_out: *mut usize) -> i32 {
    let encoded = LAST_ERROR.with(|cell| {
        cell.borrow().as_ref().map(|err| {
            encode_structured_error(err.sql_state, err.native_code.unwrap_or(0), &err.message)
        })
    });
    let encoded = encoded.unwrap_or_else(|| encode_structured_error(None, 0, ""));
    match write_output(&encoded, out_ptr, out_len, written_out) {
        Ok(()) => STATUS_OK,
        Err(err) => record_error(err),
    }
}

/// Writes the connection's prepared-statement cache metrics as a small hand-rolled JSON object
/// (spec.md §4.5/§6).
#[unsafe(no_mangle)]
pub extern "C" fn get_metrics(conn_id: u64, out_ptr: *mut u8, out_len: usize, written_out: *mut usize) -> i32 {
    status_from_result(|| {
        let worker = worker()?;
        let metrics = worker.submit(Some(DEFAULT_REQUEST_TIMEOUT), move |_env, handles| {
            handles.with_connection(conn_id, |record| Ok(record.statement_cache.metrics()))
        })?;
        write_output(metrics_to_json(&metrics).as_bytes(), out_ptr, out_len, written_out)
    })
}
