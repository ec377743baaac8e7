//! # SQLite Stores
//!
//! Three independent database files, each created with its schema on first
//! use:
//!
//! - [`pallets::PalletStore`] - `pallets.db`, table `pallets`
//! - [`orders::OrderStore`] - `ordenes.db`, tables `ordenes` and `secuencia`
//! - [`io::IoStore`] - `IO.db`, table `io_data` (a single row)
//!
//! Column names match the databases written by the warehouse controller, so
//! an external process can keep inserting pallets and updating I/O masks.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pallet_core::config::AppConfig;
//! use pallet_core::store::Stores;
//!
//! let mut stores = Stores::open(&AppConfig::default())?;
//! let order = stores.orders.insert(3, Some(1))?;
//! assert_eq!(order.destination, 1);
//! # Ok::<(), pallet_core::errors::StoreError>(())
//! ```

pub mod io;
pub mod orders;
pub mod pallets;

use std::fs;
use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, Row};
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::{StoreError, StoreResult};

pub use io::IoStore;
pub use orders::OrderStore;
pub use pallets::PalletStore;

/// All three stores, opened from one configuration.
pub struct Stores {
    pub pallets: PalletStore,
    pub orders: OrderStore,
    pub io: IoStore,
}

impl Stores {
    pub fn open(config: &AppConfig) -> StoreResult<Self> {
        Ok(Stores {
            pallets: PalletStore::open(&config.pallets_path())?,
            orders: OrderStore::open(&config.orders_path(), config.destination_slots)?,
            io: IoStore::open(&config.io_path())?,
        })
    }
}

/// Open a database file, creating its parent directory if needed.
pub(crate) fn open_connection(path: &Path) -> StoreResult<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::file_error("create data directory", parent.display().to_string(), e.to_string())
            })?;
        }
    }
    debug!(path = %path.display(), "opening database");
    Connection::open(path).map_err(|e| {
        StoreError::file_error("open database", path.display().to_string(), e.to_string())
    })
}

pub(crate) fn open_in_memory() -> StoreResult<Connection> {
    Connection::open_in_memory().map_err(|e| StoreError::database("open in-memory database", e))
}

/// Read an integer column that an external writer may have stored as REAL.
pub(crate) fn lenient_i64(row: &Row<'_>, column: &str) -> rusqlite::Result<i64> {
    match row.get_ref(column)? {
        ValueRef::Integer(v) => Ok(v),
        ValueRef::Real(v) => Ok(v as i64),
        ValueRef::Null => Ok(0),
        ValueRef::Text(t) => Ok(std::str::from_utf8(t)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .map(|v| v as i64)
            .unwrap_or(0)),
        ValueRef::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
            0,
            column.to_string(),
            rusqlite::types::Type::Blob,
        )),
    }
}
