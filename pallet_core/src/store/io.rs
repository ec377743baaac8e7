//! Single-row I/O bitmask store, written by the controller and polled here.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use super::{lenient_i64, open_connection, open_in_memory};
use crate::errors::{StoreError, StoreResult};
use crate::io_state::{IoReading, IoState};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS io_data (
        Input INTEGER DEFAULT 0,
        Output INTEGER DEFAULT 0
    );
";

pub struct IoStore {
    conn: Connection,
}

impl IoStore {
    /// Open the I/O database, seeding the `(0, 0)` row if the table is empty.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::with_connection(open_connection(path)?)
    }

    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::database("create io_data table", e))?;
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM io_data", [], |row| row.get(0))
            .map_err(|e| StoreError::database("count io_data", e))?;
        if rows == 0 {
            conn.execute("INSERT INTO io_data (Input, Output) VALUES (0, 0)", [])
                .map_err(|e| StoreError::database("seed io_data", e))?;
        }
        Ok(IoStore { conn })
    }

    /// Current masks; a missing row reads as zeros.
    pub fn get(&self) -> StoreResult<IoState> {
        let state = self
            .conn
            .query_row("SELECT Input, Output FROM io_data LIMIT 1", [], |row| {
                Ok(IoState::new(lenient_i64(row, "Input")?, lenient_i64(row, "Output")?))
            })
            .optional()
            .map_err(|e| StoreError::database("read io_data", e))?;
        Ok(state.unwrap_or_default())
    }

    /// Read for display. Never fails: errors are logged and show as zeros.
    pub fn poll(&self) -> IoReading {
        match self.get() {
            Ok(state) => IoReading::ok(state),
            Err(e) => {
                warn!(error = %e, "I/O poll failed, showing zeros");
                IoReading::failed(e.to_string())
            }
        }
    }

    /// Update either mask; `None` leaves that column untouched.
    pub fn update(&self, input: Option<i64>, output: Option<i64>) -> StoreResult<()> {
        let (sql, value) = match (input, output) {
            (None, None) => return Ok(()),
            (Some(i), Some(o)) => {
                self.conn
                    .execute("UPDATE io_data SET Input = ?1, Output = ?2", params![i, o])
                    .map_err(|e| StoreError::database("update io_data", e))?;
                debug!(input = i, output = o, "updated io masks");
                return Ok(());
            }
            (Some(i), None) => ("UPDATE io_data SET Input = ?1", i),
            (None, Some(o)) => ("UPDATE io_data SET Output = ?1", o),
        };
        self.conn
            .execute(sql, params![value])
            .map_err(|e| StoreError::database("update io_data", e))?;
        debug!(?input, ?output, "updated io masks");
        Ok(())
    }

    pub fn reset(&self) -> StoreResult<()> {
        self.conn
            .execute("UPDATE io_data SET Input = 0, Output = 0", [])
            .map_err(|e| StoreError::database("reset io_data", e))?;
        Ok(())
    }
}
