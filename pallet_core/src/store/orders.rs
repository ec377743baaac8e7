//! # Order Store
//!
//! CRUD over the `ordenes` table plus the persisted destination counter.
//!
//! The counter lives in a one-row `secuencia` table and holds the destination
//! handed to the most recent insert (or the last value written by
//! [`OrderStore::reset_destinations`]). Swaps and moves never touch it.
//! When no orders remain, the next destination is 1 regardless of the counter.
//! A database that has orders but no usable counter (for example one written
//! before the counter table existed) continues from the newest order.
//!
//! Pallets live in a separate file, so `Pallet_ID` is a plain column. Older
//! files declare it as a foreign key to `pallets`; enforcement is switched off
//! on every connection so those files stay writable.
//!
//! ```rust
//! use pallet_core::store::OrderStore;
//!
//! let mut orders = OrderStore::in_memory(11)?;
//! let a = orders.insert(4, Some(1))?;
//! let b = orders.insert(5, Some(2))?;
//! assert_eq!((a.destination, b.destination), (1, 2));
//!
//! orders.swap_destinations(a.id, b.id)?;
//! assert_eq!(orders.get(a.id)?.unwrap().destination, 2);
//! assert_eq!(orders.next_destination()?, 3);
//! # Ok::<(), pallet_core::errors::StoreError>(())
//! ```

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{open_connection, open_in_memory};
use crate::errors::{StoreError, StoreResult};
use crate::order::{neighbour, sort_for_display, MoveDirection, Order};
use crate::sequencer::DestinationSequencer;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS ordenes (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        Origen INTEGER NOT NULL,
        Destino INTEGER NOT NULL,
        Pallet_ID INTEGER
    );
    CREATE TABLE IF NOT EXISTS secuencia (
        ID INTEGER PRIMARY KEY CHECK (ID = 1),
        Ultimo INTEGER
    );
    INSERT OR IGNORE INTO secuencia (ID, Ultimo) VALUES (1, NULL);
";

/// Order table access with the cyclic destination counter.
pub struct OrderStore {
    conn: Connection,
    slots: i64,
}

impl OrderStore {
    /// Open (and if necessary create) the order database at `path`.
    pub fn open(path: &Path, slots: i64) -> StoreResult<Self> {
        Self::with_connection(open_connection(path)?, slots)
    }

    pub fn in_memory(slots: i64) -> StoreResult<Self> {
        Self::with_connection(open_in_memory()?, slots)
    }

    fn with_connection(conn: Connection, slots: i64) -> StoreResult<Self> {
        conn.pragma_update(None, "foreign_keys", false)
            .map_err(|e| StoreError::database("disable foreign keys", e))?;
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::database("create orders tables", e))?;

        let slots = slots.max(1);
        // Persist a seeded counter so later reads agree with it
        let seq = load_sequencer(&conn, slots)?;
        store_counter(&conn, seq.last())?;
        debug!(slots, last = ?seq.last(), "opened order store");

        Ok(OrderStore { conn, slots })
    }

    /// Orders in display order: by destination, ties by id.
    pub fn list(&self) -> StoreResult<Vec<Order>> {
        let mut orders = self.list_by_insertion()?;
        sort_for_display(&mut orders);
        Ok(orders)
    }

    /// Orders in insertion (id) order.
    pub fn list_by_insertion(&self) -> StoreResult<Vec<Order>> {
        select_all(&self.conn)
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<Order>> {
        select_one(&self.conn, id)
    }

    /// Current state of the destination counter.
    pub fn sequencer(&self) -> StoreResult<DestinationSequencer> {
        load_sequencer(&self.conn, self.slots)
    }

    /// Destination the next inserted order will receive.
    pub fn next_destination(&self) -> StoreResult<i64> {
        Ok(self.sequencer()?.peek())
    }

    /// Create an order for a pallet position and assign the next destination.
    pub fn insert(&mut self, origin: i64, pallet_id: Option<i64>) -> StoreResult<Order> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::database("begin insert order", e))?;

        let mut seq = load_sequencer(&tx, self.slots)?;
        let destination = seq.advance();

        tx.execute(
            "INSERT INTO ordenes (Origen, Destino, Pallet_ID) VALUES (?1, ?2, ?3)",
            params![origin, destination, pallet_id],
        )
        .map_err(|e| StoreError::database("insert order", e))?;
        let id = tx.last_insert_rowid();
        store_counter(&tx, seq.last())?;

        tx.commit()
            .map_err(|e| StoreError::database("commit insert order", e))?;

        info!(id, origin, destination, ?pallet_id, "inserted order");
        Ok(Order {
            id,
            origin,
            destination,
            pallet_id,
        })
    }

    pub fn delete(&mut self, id: i64) -> StoreResult<()> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::database("begin delete order", e))?;
        let changed = tx
            .execute("DELETE FROM ordenes WHERE ID = ?1", params![id])
            .map_err(|e| StoreError::database("delete order", e))?;
        if changed == 0 {
            return Err(StoreError::not_found("Order", id));
        }
        if count(&tx)? == 0 {
            store_counter(&tx, None)?;
        }
        tx.commit()
            .map_err(|e| StoreError::database("commit delete order", e))?;
        info!(id, "deleted order");
        Ok(())
    }

    /// Overwrite one order's destination. The value must be in `1..=slots`.
    pub fn update_destination(&self, id: i64, destination: i64) -> StoreResult<()> {
        if !(1..=self.slots).contains(&destination) {
            return Err(StoreError::invalid_input(
                "Destino",
                destination.to_string(),
                format!("Destination must be between 1 and {}", self.slots),
            ));
        }
        let changed = self
            .conn
            .execute(
                "UPDATE ordenes SET Destino = ?1 WHERE ID = ?2",
                params![destination, id],
            )
            .map_err(|e| StoreError::database("update destination", e))?;
        if changed == 0 {
            return Err(StoreError::not_found("Order", id));
        }
        Ok(())
    }

    /// Exchange the destinations of two orders in one transaction.
    pub fn swap_destinations(&mut self, a: i64, b: i64) -> StoreResult<()> {
        if a == b {
            return Ok(());
        }
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::database("begin swap", e))?;

        let first = select_one(&tx, a)?.ok_or_else(|| StoreError::not_found("Order", a))?;
        let second = select_one(&tx, b)?.ok_or_else(|| StoreError::not_found("Order", b))?;

        tx.execute(
            "UPDATE ordenes SET Destino = ?1 WHERE ID = ?2",
            params![second.destination, a],
        )
        .map_err(|e| StoreError::database("swap destinations", e))?;
        tx.execute(
            "UPDATE ordenes SET Destino = ?1 WHERE ID = ?2",
            params![first.destination, b],
        )
        .map_err(|e| StoreError::database("swap destinations", e))?;

        tx.commit()
            .map_err(|e| StoreError::database("commit swap", e))?;
        debug!(a, b, "swapped destinations");
        Ok(())
    }

    /// Move an order one place up or down the displayed queue by swapping
    /// destinations with its neighbour. Returns `false` at either end.
    pub fn move_order(&mut self, id: i64, direction: MoveDirection) -> StoreResult<bool> {
        let orders = self.list()?;
        if !orders.iter().any(|o| o.id == id) {
            return Err(StoreError::not_found("Order", id));
        }
        match neighbour(&orders, id, direction) {
            Some(other) => {
                self.swap_destinations(id, other)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Renumber every order `(index mod slots) + 1` in insertion order.
    pub fn reset_destinations(&mut self) -> StoreResult<Vec<Order>> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::database("begin reset destinations", e))?;

        let mut orders = select_all(&tx)?;
        let mut seq = DestinationSequencer::new(self.slots);
        let destinations = seq.renumber(orders.len());

        for (order, destination) in orders.iter_mut().zip(destinations) {
            order.destination = destination;
            tx.execute(
                "UPDATE ordenes SET Destino = ?1 WHERE ID = ?2",
                params![destination, order.id],
            )
            .map_err(|e| StoreError::database("reset destinations", e))?;
        }
        store_counter(&tx, seq.last())?;

        tx.commit()
            .map_err(|e| StoreError::database("commit reset destinations", e))?;
        info!(count = orders.len(), "reset destinations");
        Ok(orders)
    }
}

fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get("ID")?,
        origin: super::lenient_i64(row, "Origen")?,
        destination: super::lenient_i64(row, "Destino")?,
        pallet_id: row.get("Pallet_ID")?,
    })
}

fn select_all(conn: &Connection) -> StoreResult<Vec<Order>> {
    let mut stmt = conn
        .prepare("SELECT ID, Origen, Destino, Pallet_ID FROM ordenes ORDER BY ID")
        .map_err(|e| StoreError::database("select orders", e))?;
    let rows = stmt
        .query_map([], order_from_row)
        .map_err(|e| StoreError::database("select orders", e))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| StoreError::database("read order row", e))
}

fn select_one(conn: &Connection, id: i64) -> StoreResult<Option<Order>> {
    conn.query_row(
        "SELECT ID, Origen, Destino, Pallet_ID FROM ordenes WHERE ID = ?1",
        params![id],
        order_from_row,
    )
    .optional()
    .map_err(|e| StoreError::database("select order", e))
}

fn count(conn: &Connection) -> StoreResult<i64> {
    conn.query_row("SELECT COUNT(*) FROM ordenes", [], |row| row.get(0))
        .map_err(|e| StoreError::database("count orders", e))
}

fn load_sequencer(conn: &Connection, slots: i64) -> StoreResult<DestinationSequencer> {
    if count(conn)? == 0 {
        return Ok(DestinationSequencer::new(slots));
    }
    let last: Option<i64> = conn
        .query_row("SELECT Ultimo FROM secuencia WHERE ID = 1", [], |row| row.get(0))
        .optional()
        .map_err(|e| StoreError::database("read destination counter", e))?
        .flatten();
    let seq = DestinationSequencer::resume(slots, last);
    if seq.last().is_some() {
        return Ok(seq);
    }

    // Missing or out-of-domain counter: continue from the newest order
    let newest: Option<i64> = conn
        .query_row(
            "SELECT Destino FROM ordenes ORDER BY ID DESC LIMIT 1",
            [],
            |row| super::lenient_i64(row, "Destino"),
        )
        .optional()
        .map_err(|e| StoreError::database("read newest destination", e))?;
    Ok(DestinationSequencer::resume(slots, newest))
}

fn store_counter(conn: &Connection, last: Option<i64>) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO secuencia (ID, Ultimo) VALUES (1, ?1)
         ON CONFLICT(ID) DO UPDATE SET Ultimo = excluded.Ultimo",
        params![last],
    )
    .map_err(|e| StoreError::database("write destination counter", e))?;
    Ok(())
}
