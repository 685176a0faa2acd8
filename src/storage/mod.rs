//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - books(_id, name, quantity, buy_price, supplier, supplier_ph)
//!
//! Callers go through [`ItemRepository`], so the provider never builds SQL
//! and tests can swap in another backend.

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, StoreStats};

use crate::contract::{COLUMN_ID, is_known_column};
use crate::item::{Item, ItemPatch, NewItem};
use crate::values::Value;
use crate::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Which rows an update or delete targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Every row
    All,
    /// One row by id
    Id(i64),
    /// Raw SQL condition with anonymous `?` placeholders bound to `args`.
    ///
    /// Numbered (`?1`) and named (`:name`) placeholders are rejected: an
    /// update binds its SET values ahead of these arguments.
    Filter { clause: String, args: Vec<Value> },
}

static QUOTED: OnceLock<Regex> = OnceLock::new();
static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();

/// String literals and quoted identifiers, which may contain `?` as text
fn quoted() -> &'static Regex {
    QUOTED.get_or_init(|| Regex::new(r#"'(?:[^']|'')*'|"(?:[^"]|"")*""#).expect("static pattern is valid"))
}

fn placeholder() -> &'static Regex {
    PLACEHOLDER.get_or_init(|| Regex::new(r"\?\d*|[:@$][A-Za-z_]\w*").expect("static pattern is valid"))
}

fn check_filter(clause: &str, args: &[Value]) -> Result<()> {
    let unquoted = quoted().replace_all(clause, "''");
    let mut anonymous = 0;
    for found in placeholder().find_iter(&unquoted) {
        if found.as_str() != "?" {
            return Err(Error::InvalidArgument(format!(
                "Filter placeholders must be `?`, got {}",
                found.as_str()
            )));
        }
        anonymous += 1;
    }
    if anonymous != args.len() {
        return Err(Error::InvalidArgument(format!(
            "Filter has {} placeholder(s) but {} argument(s)",
            anonymous,
            args.len()
        )));
    }
    Ok(())
}

impl Selection {
    pub fn filter(clause: impl Into<String>, args: Vec<Value>) -> Self {
        Selection::Filter {
            clause: clause.into(),
            args,
        }
    }

    /// WHERE clause body and its bound arguments
    pub fn to_sql(&self) -> Result<(Option<String>, Vec<Value>)> {
        match self {
            Selection::All => Ok((None, Vec::new())),
            Selection::Id(id) => Ok((Some(format!("{} = ?", COLUMN_ID)), vec![Value::Integer(*id)])),
            Selection::Filter { clause, args } => {
                check_filter(clause, args)?;
                Ok((Some(format!("({})", clause)), args.clone()))
            }
        }
    }
}

/// Validated `ORDER BY` term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub column: &'static str,
    pub descending: bool,
}

impl SortOrder {
    pub fn asc(column: &str) -> Result<Self> {
        Self::new(column, false)
    }

    pub fn desc(column: &str) -> Result<Self> {
        Self::new(column, true)
    }

    fn new(column: &str, descending: bool) -> Result<Self> {
        let column = crate::contract::ALL_COLUMNS
            .iter()
            .find(|c| **c == column)
            .ok_or_else(|| Error::InvalidArgument(format!("Unknown sort column: {}", column)))?;
        Ok(Self { column, descending })
    }

    /// Parse `<column> [ASC|DESC]`
    pub fn parse(order: &str) -> Result<Self> {
        let mut parts = order.split_whitespace();
        let column = parts
            .next()
            .ok_or_else(|| Error::InvalidArgument("Empty sort order".to_string()))?;
        let descending = match parts.next().map(|d| d.to_ascii_uppercase()) {
            None => false,
            Some(d) if d == "ASC" => false,
            Some(d) if d == "DESC" => true,
            Some(d) => return Err(Error::InvalidArgument(format!("Unknown sort direction: {}", d))),
        };
        if parts.next().is_some() || !is_known_column(column) {
            return Err(Error::InvalidArgument(format!("Invalid sort order: {}", order)));
        }
        Self::new(column, descending)
    }

    pub fn to_sql(&self) -> String {
        format!("{} {}", self.column, if self.descending { "DESC" } else { "ASC" })
    }
}

/// Parameters for listing items.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub selection: Option<Selection>,
    pub order: Option<SortOrder>,
}

impl ListQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }
}

/// Typed access to the items table.
pub trait ItemRepository {
    /// Fetch one item, `None` when the id does not exist
    fn get(&self, id: i64) -> Result<Option<Item>>;

    fn list(&self, query: &ListQuery) -> Result<Vec<Item>>;

    /// Insert and return the assigned id
    fn insert(&self, item: &NewItem) -> Result<i64>;

    /// Apply `patch` to the selected rows, returning the number affected
    fn update(&self, selection: &Selection, patch: &ItemPatch) -> Result<usize>;

    /// Delete the selected rows, returning the number removed
    fn delete(&self, selection: &Selection) -> Result<usize>;

    fn count(&self) -> Result<usize>;
}
