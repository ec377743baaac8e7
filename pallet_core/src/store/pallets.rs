//! CRUD over the `pallets` table.

use std::path::Path;

use rusqlite::types::{ToSql, ToSqlOutput};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{lenient_i64, open_connection, open_in_memory};
use crate::errors::{StoreError, StoreResult};
use crate::pallet::{FieldValue, NewPallet, Pallet, PalletField};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS pallets (
        ID INTEGER PRIMARY KEY AUTOINCREMENT,
        Largo REAL NOT NULL,
        Ancho REAL NOT NULL,
        Posicion INTEGER NOT NULL,
        Alto REAL NOT NULL,
        Calidad TEXT NOT NULL,
        Peso REAL NOT NULL,
        Prioridad INTEGER NOT NULL,
        X REAL NOT NULL,
        Y REAL NOT NULL,
        Visibilidad BOOLEAN NOT NULL
    );
";

const SELECT_COLUMNS: &str =
    "SELECT ID, Largo, Ancho, Posicion, Alto, Calidad, Peso, Prioridad, X, Y, Visibilidad FROM pallets";

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            FieldValue::Int(v) => ToSqlOutput::from(*v),
            FieldValue::Float(v) => ToSqlOutput::from(*v),
            FieldValue::Text(v) => ToSqlOutput::from(v.as_str()),
            FieldValue::Bool(v) => ToSqlOutput::from(*v),
        })
    }
}

/// Pallet table access.
pub struct PalletStore {
    conn: Connection,
}

impl PalletStore {
    /// Open (and if necessary create) the pallet database at `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::with_connection(open_connection(path)?)
    }

    /// Private in-memory database, used by tests and dry runs.
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_connection(open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| StoreError::database("create pallets table", e))?;
        Ok(PalletStore { conn })
    }

    pub fn get_all(&self) -> StoreResult<Vec<Pallet>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY ID", SELECT_COLUMNS))
            .map_err(|e| StoreError::database("select pallets", e))?;
        let rows = stmt
            .query_map([], pallet_from_row)
            .map_err(|e| StoreError::database("select pallets", e))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::database("read pallet row", e))
    }

    pub fn get(&self, id: i64) -> StoreResult<Option<Pallet>> {
        self.conn
            .query_row(&format!("{} WHERE ID = ?1", SELECT_COLUMNS), params![id], pallet_from_row)
            .optional()
            .map_err(|e| StoreError::database("select pallet", e))
    }

    /// Insert a pallet and return it with its assigned id.
    pub fn insert(&self, new: &NewPallet) -> StoreResult<Pallet> {
        self.conn
            .execute(
                "INSERT INTO pallets (Largo, Ancho, Posicion, Alto, Calidad, Peso, Prioridad, X, Y, Visibilidad)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    new.length,
                    new.width,
                    new.position,
                    new.height,
                    new.quality,
                    new.weight,
                    new.priority,
                    new.x,
                    new.y,
                    new.visible,
                ],
            )
            .map_err(|e| StoreError::database("insert pallet", e))?;
        let id = self.conn.last_insert_rowid();
        info!(id, x = new.x, y = new.y, "inserted pallet");
        Ok(Pallet {
            id,
            length: new.length,
            width: new.width,
            height: new.height,
            position: new.position,
            quality: new.quality.clone(),
            weight: new.weight,
            priority: new.priority,
            x: new.x,
            y: new.y,
            visible: new.visible,
        })
    }

    /// Write one already-coerced field. ID, X and Y are rejected.
    pub fn update_field(&self, id: i64, field: PalletField, value: &FieldValue) -> StoreResult<()> {
        if !field.is_editable() {
            return Err(StoreError::immutable_field(field.column()));
        }
        let sql = format!("UPDATE pallets SET {} = ?1 WHERE ID = ?2", field.column());
        let changed = self
            .conn
            .execute(&sql, params![value, id])
            .map_err(|e| StoreError::database("update pallet", e))?;
        if changed == 0 {
            return Err(StoreError::not_found("Pallet", id));
        }
        debug!(id, field = field.column(), %value, "updated pallet");
        Ok(())
    }

    /// Coerce `raw` for `field`, write it, and return the refreshed row.
    pub fn edit(&self, id: i64, field: PalletField, raw: &str) -> StoreResult<Pallet> {
        let value = field.parse(raw)?;
        self.update_field(id, field, &value)?;
        self.get(id)?.ok_or_else(|| StoreError::not_found("Pallet", id))
    }

    pub fn delete(&self, id: i64) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM pallets WHERE ID = ?1", params![id])
            .map_err(|e| StoreError::database("delete pallet", e))?;
        if changed == 0 {
            return Err(StoreError::not_found("Pallet", id));
        }
        info!(id, "deleted pallet");
        Ok(())
    }
}

fn pallet_from_row(row: &Row<'_>) -> rusqlite::Result<Pallet> {
    Ok(Pallet {
        id: row.get("ID")?,
        length: row.get("Largo")?,
        width: row.get("Ancho")?,
        position: lenient_i64(row, "Posicion")?,
        height: row.get("Alto")?,
        quality: row.get::<_, Option<String>>("Calidad")?.unwrap_or_default(),
        weight: row.get("Peso")?,
        priority: lenient_i64(row, "Prioridad")?,
        x: row.get("X")?,
        y: row.get("Y")?,
        visible: lenient_i64(row, "Visibilidad")? != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_pallet() -> (PalletStore, Pallet) {
        let store = PalletStore::in_memory().unwrap();
        let pallet = store
            .insert(&NewPallet {
                position: 7,
                quality: "B".to_string(),
                x: 120.0,
                y: 45.0,
                ..NewPallet::default()
            })
            .unwrap();
        (store, pallet)
    }

    #[test]
    fn test_insert_and_get() {
        let (store, pallet) = store_with_pallet();
        assert_eq!(pallet.id, 1);
        let loaded = store.get(pallet.id).unwrap().unwrap();
        assert_eq!(loaded, pallet);
        assert!(store.get(99).unwrap().is_none());
        assert_eq!(store.get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_edit_coerces_and_persists() {
        let (store, pallet) = store_with_pallet();
        let updated = store.edit(pallet.id, PalletField::Visible, "no").unwrap();
        assert!(!updated.visible);

        let updated = store.edit(pallet.id, PalletField::Weight, "512.25").unwrap();
        assert_eq!(updated.weight, 512.25);

        let updated = store.edit(pallet.id, PalletField::Position, "9.0").unwrap();
        assert_eq!(updated.position, 9);

        let updated = store.edit(pallet.id, PalletField::Quality, "Premium").unwrap();
        assert_eq!(updated.quality, "Premium");
    }

    #[test]
    fn test_coordinates_cannot_be_updated() {
        let (store, pallet) = store_with_pallet();
        let err = store.edit(pallet.id, PalletField::X, "1.0").unwrap_err();
        assert_eq!(err.error_code(), "IMMUTABLE_FIELD");
        let err = store
            .update_field(pallet.id, PalletField::Y, &FieldValue::Float(1.0))
            .unwrap_err();
        assert_eq!(err.error_code(), "IMMUTABLE_FIELD");
        assert_eq!(store.get(pallet.id).unwrap().unwrap().x, 120.0);
    }

    #[test]
    fn test_invalid_value_leaves_row_unchanged() {
        let (store, pallet) = store_with_pallet();
        assert!(store.edit(pallet.id, PalletField::Priority, "high").is_err());
        assert_eq!(store.get(pallet.id).unwrap().unwrap().priority, pallet.priority);
    }

    #[test]
    fn test_missing_pallet() {
        let store = PalletStore::in_memory().unwrap();
        let err = store.edit(42, PalletField::Weight, "1").unwrap_err();
        assert_eq!(err, StoreError::not_found("Pallet", 42));
        assert!(store.delete(42).is_err());
    }

    #[test]
    fn test_delete() {
        let (store, pallet) = store_with_pallet();
        store.delete(pallet.id).unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }
}
