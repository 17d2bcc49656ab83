//! Connection bootstrap for the local state database.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the state database file and applies all pending migrations.
///
/// Missing parent directories are not created; callers pass a path inside an
/// existing directory.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_with(DbMode::File, || Connection::open(path))
}

/// Opens an in-memory state database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with(DbMode::Memory, Connection::open_in_memory)
}

#[derive(Debug, Clone, Copy)]
enum DbMode {
    File,
    Memory,
}

impl DbMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
        }
    }
}

fn open_with(
    mode: DbMode,
    connect: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={}", mode.as_str());

    let mut conn = connect().map_err(|err| {
        error!(
            "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
            mode.as_str(),
            started_at.elapsed().as_millis(),
            err
        );
        err
    })?;

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode.as_str(),
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode.as_str(),
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> DbResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
