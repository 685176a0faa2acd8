//! SQLite storage implementation

use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use rusqlite::{Connection, OptionalExtension, params_from_iter};
use crate::contract::{
    COLUMN_NAME, COLUMN_PRICE, COLUMN_QUANTITY, COLUMN_SUPPLIER, COLUMN_SUPPLIER_PH,
    DATABASE_VERSION, TABLE_NAME,
};
use crate::item::{Item, ItemPatch, NewItem};
use crate::values::Value;
use crate::{Error, Result};
use super::{ItemRepository, ListQuery, Selection, schema};

const SELECT_ITEM: &str = "SELECT _id, name, buy_price, quantity, supplier, supplier_ph FROM books";

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

/// SQLite-backed storage for inventory items.
///
/// The connection is opened on first use and the schema is created or
/// upgraded at that moment. Readers and writers share that one connection;
/// SQLite serializes writes on its own.
pub struct SqliteStore {
    location: Location,
    conn: OnceCell<Connection>,
}

impl SqliteStore {
    /// Point at a database file without touching it yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
            conn: OnceCell::new(),
        }
    }

    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::new(path);
        store.connection()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            location: Location::Memory,
            conn: OnceCell::new(),
        };
        store.connection()?;
        Ok(store)
    }

    /// Path of the backing file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path.as_path()),
            Location::Memory => None,
        }
    }

    /// Handle for queries
    pub fn readable(&self) -> Result<&Connection> {
        self.connection()
    }

    /// Handle for inserts, updates and deletes
    pub fn writable(&self) -> Result<&Connection> {
        self.connection()
    }

    fn connection(&self) -> Result<&Connection> {
        if let Some(conn) = self.conn.get() {
            return Ok(conn);
        }

        let conn = match &self.location {
            Location::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                tracing::debug!("Opening database {}", path.display());
                Connection::open(path)?
            }
            Location::Memory => Connection::open_in_memory()?,
        };
        prepare_schema(&conn)?;

        Ok(self.conn.get_or_init(|| conn))
    }

    /// Schema version recorded in the database
    pub fn version(&self) -> Result<u32> {
        schema_version(self.readable()?)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.readable()?;
        let (items, total_quantity, inventory_value) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(quantity), 0), COALESCE(SUM(quantity * buy_price), 0.0) FROM books",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, f64>(2)?)),
        )?;
        Ok(StoreStats {
            items: items as usize,
            total_quantity,
            inventory_value,
            schema_version: schema_version(conn)?,
        })
    }

    /// Helper to convert a row to an Item
    fn row_to_item(row: &rusqlite::Row) -> rusqlite::Result<Item> {
        Ok(Item {
            id: row.get(0)?,
            name: row.get(1)?,
            buy_price: row.get(2)?,
            quantity: row.get(3)?,
            supplier: row.get(4)?,
            supplier_ph: row.get(5)?,
        })
    }
}

impl ItemRepository for SqliteStore {
    fn get(&self, id: i64) -> Result<Option<Item>> {
        self.readable()?
            .query_row(&format!("{} WHERE _id = ?1", SELECT_ITEM), [id], Self::row_to_item)
            .optional()
            .map_err(Into::into)
    }

    fn list(&self, query: &ListQuery) -> Result<Vec<Item>> {
        let mut sql = SELECT_ITEM.to_string();
        let mut args = Vec::new();

        if let Some(selection) = &query.selection {
            let (clause, selection_args) = selection.to_sql()?;
            if let Some(clause) = clause {
                sql.push_str(" WHERE ");
                sql.push_str(&clause);
            }
            args = selection_args;
        }
        if let Some(order) = &query.order {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.to_sql());
        }

        let conn = self.readable()?;
        let mut stmt = conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(args.iter()), Self::row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(items)
    }

    fn insert(&self, item: &NewItem) -> Result<i64> {
        let conn = self.writable()?;
        conn.execute(
            r#"
            INSERT INTO books (name, buy_price, quantity, supplier, supplier_ph)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            rusqlite::params![
                item.name,
                item.buy_price,
                item.quantity,
                item.supplier,
                item.supplier_ph,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, selection: &Selection, patch: &ItemPatch) -> Result<usize> {
        let mut assignments: Vec<(&str, Value)> = Vec::new();
        if let Some(name) = &patch.name {
            assignments.push((COLUMN_NAME, Value::from(name.as_str())));
        }
        if let Some(price) = patch.buy_price {
            assignments.push((COLUMN_PRICE, Value::Real(price)));
        }
        if let Some(quantity) = patch.quantity {
            assignments.push((COLUMN_QUANTITY, Value::Integer(quantity)));
        }
        if let Some(supplier) = &patch.supplier {
            assignments.push((COLUMN_SUPPLIER, Value::from(supplier.as_str())));
        }
        if let Some(phone) = &patch.supplier_ph {
            assignments.push((COLUMN_SUPPLIER_PH, Value::from(phone.as_str())));
        }
        if assignments.is_empty() {
            return Ok(0);
        }

        let set_clause = assignments
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("UPDATE {} SET {}", TABLE_NAME, set_clause);

        let (clause, selection_args) = selection.to_sql()?;
        if let Some(clause) = clause {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }

        let args = assignments.into_iter().map(|(_, v)| v).chain(selection_args);
        let rows = self.writable()?.execute(&sql, params_from_iter(args))?;
        Ok(rows)
    }

    fn delete(&self, selection: &Selection) -> Result<usize> {
        let mut sql = format!("DELETE FROM {}", TABLE_NAME);
        let (clause, args) = selection.to_sql()?;
        if let Some(clause) = clause {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }

        let rows = self.writable()?.execute(&sql, params_from_iter(args.iter()))?;
        Ok(rows)
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self.readable()?.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn schema_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

/// Bring a freshly opened connection to `DATABASE_VERSION`
fn prepare_schema(conn: &Connection) -> Result<()> {
    let found = schema_version(conn)?;
    match found {
        0 => create_schema(conn),
        v if v == DATABASE_VERSION => Ok(()),
        v if v > DATABASE_VERSION => Err(Error::UnsupportedSchemaVersion {
            found: v,
            supported: DATABASE_VERSION,
        }),
        v => upgrade_schema(conn, v, DATABASE_VERSION),
    }
}

/// Create the current schema on an empty database
pub fn create_schema(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for stmt in schema::all_schema_statements() {
        tx.execute(stmt, [])?;
    }
    tx.pragma_update(None, "user_version", DATABASE_VERSION)?;
    tx.commit()?;

    tracing::info!("Created schema version {}", DATABASE_VERSION);
    Ok(())
}

/// Apply every registered step in `old+1..=new`, all or nothing
pub fn upgrade_schema(conn: &Connection, old: u32, new: u32) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    for version in old + 1..=new {
        let migration = schema::migration_to(version).ok_or(Error::MissingMigration(version))?;
        tracing::debug!("Applying migration {} ({})", migration.version, migration.name);
        for stmt in migration.statements {
            tx.execute(stmt, [])?;
        }
    }
    tx.pragma_update(None, "user_version", new)?;
    tx.commit()?;

    tracing::info!("Upgraded schema from version {} to {}", old, new);
    Ok(())
}

/// Database statistics
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoreStats {
    pub items: usize,
    pub total_quantity: i64,
    pub inventory_value: f64,
    pub schema_version: u32,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Items: {}", self.items)?;
        writeln!(f, "  Copies in stock: {}", self.total_quantity)?;
        writeln!(f, "  Inventory value: {:.2}", self.inventory_value)?;
        writeln!(f, "  Schema version: {}", self.schema_version)
    }
}
