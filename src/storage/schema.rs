//! Database schema definitions and the migration registry
//!
//! Schema version is tracked in `PRAGMA user_version`. A fresh database
//! (version 0) gets the full current schema in one step; an older one is
//! walked forward through `MIGRATIONS`.

/// SQL to create the books table
pub const CREATE_BOOKS_TABLE: &str = r#"
CREATE TABLE books (
    _id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    quantity INTEGER NOT NULL DEFAULT 0,
    buy_price REAL NOT NULL DEFAULT 0,
    supplier TEXT NOT NULL,
    supplier_ph TEXT NOT NULL
)
"#;

/// SQL to create indexes (added in version 2)
pub const CREATE_INDEXES: &[&str] = &["CREATE INDEX IF NOT EXISTS idx_books_name ON books(name)"];

/// One upgrade step: applying `statements` moves the schema to `version`.
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub statements: &'static [&'static str],
}

/// Upgrade steps, ordered by version. Version 1 is the bare table.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    name: "index_books_name",
    statements: CREATE_INDEXES,
}];

/// All statements that build the current schema from nothing
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_BOOKS_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

/// The registered step that upgrades to `version`
pub fn migration_to(version: u32) -> Option<&'static Migration> {
    MIGRATIONS.iter().find(|m| m.version == version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::DATABASE_VERSION;

    #[test]
    fn test_registry_reaches_current_version() {
        for version in 2..=DATABASE_VERSION {
            assert!(migration_to(version).is_some(), "missing step for {version}");
        }
        assert!(migration_to(DATABASE_VERSION + 1).is_none());
    }

    #[test]
    fn test_registry_is_ordered() {
        assert!(MIGRATIONS.windows(2).all(|w| w[0].version < w[1].version));
    }
}
