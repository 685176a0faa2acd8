//! Cursor - projected row set returned by provider queries

use crate::contract::{
    ALL_COLUMNS, COLUMN_ID, COLUMN_NAME, COLUMN_PRICE, COLUMN_QUANTITY, COLUMN_SUPPLIER,
    COLUMN_SUPPLIER_PH,
};
use crate::item::Item;
use crate::notify::{ChangeEvent, Subscription};
use crate::values::Value;
use crate::{Error, Result};
use std::time::Duration;

/// Materialized query result.
///
/// Holds the rows in projection order plus a subscription to the queried
/// URI, so the caller can tell when the data it is showing went stale.
/// Dropping the cursor releases the subscription.
pub struct Cursor {
    columns: Vec<&'static str>,
    rows: Vec<Vec<Value>>,
    position: Option<usize>,
    subscription: Option<Subscription>,
}

impl Cursor {
    /// Project `items` onto `columns` (all columns when `None`)
    pub fn from_items(items: &[Item], columns: Option<&[&str]>) -> Result<Self> {
        let columns = resolve_projection(columns)?;
        let rows = items
            .iter()
            .map(|item| columns.iter().map(|column| column_value(item, column)).collect())
            .collect();

        Ok(Self {
            columns,
            rows,
            position: None,
            subscription: None,
        })
    }

    pub(crate) fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscription = Some(subscription);
        self
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Advance to the next row. Starts before the first row.
    pub fn move_to_next(&mut self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        if next < self.rows.len() {
            self.position = Some(next);
            true
        } else {
            self.position = Some(self.rows.len());
            false
        }
    }

    pub fn move_to_first(&mut self) -> bool {
        self.position = None;
        self.move_to_next()
    }

    pub fn position(&self) -> Option<usize> {
        self.position.filter(|p| *p < self.rows.len())
    }

    /// Value of `column` in the current row
    pub fn get(&self, column: &str) -> Result<&Value> {
        let row = self
            .position()
            .ok_or_else(|| Error::InvalidArgument("Cursor is not positioned on a row".to_string()))?;
        let index = self
            .column_index(column)
            .ok_or_else(|| Error::InvalidArgument(format!("Column not in projection: {}", column)))?;
        Ok(&self.rows[row][index])
    }

    pub fn get_i64(&self, column: &str) -> Result<i64> {
        let value = self.get(column)?;
        value
            .as_i64()
            .ok_or_else(|| Error::InvalidArgument(format!("{} is not an integer: {}", column, value)))
    }

    pub fn get_f64(&self, column: &str) -> Result<f64> {
        let value = self.get(column)?;
        value
            .as_f64()
            .ok_or_else(|| Error::InvalidArgument(format!("{} is not a number: {}", column, value)))
    }

    pub fn get_str(&self, column: &str) -> Result<&str> {
        let value = self.get(column)?;
        value
            .as_str()
            .ok_or_else(|| Error::InvalidArgument(format!("{} is not text: {}", column, value)))
    }

    /// Rebuild items; requires a projection covering every column
    pub fn to_items(&self) -> Result<Vec<Item>> {
        let index = |column: &str| {
            self.column_index(column)
                .ok_or_else(|| Error::InvalidArgument(format!("Column not in projection: {}", column)))
        };
        let (id, name, price, quantity, supplier, phone) = (
            index(COLUMN_ID)?,
            index(COLUMN_NAME)?,
            index(COLUMN_PRICE)?,
            index(COLUMN_QUANTITY)?,
            index(COLUMN_SUPPLIER)?,
            index(COLUMN_SUPPLIER_PH)?,
        );

        Ok(self
            .rows
            .iter()
            .map(|row| Item {
                id: row[id].as_i64().unwrap_or_default(),
                name: row[name].to_string(),
                buy_price: row[price].as_f64().unwrap_or_default(),
                quantity: row[quantity].as_i64().unwrap_or_default(),
                supplier: row[supplier].to_string(),
                supplier_ph: row[phone].to_string(),
            })
            .collect())
    }

    /// Whether a change to the queried URI arrived since the last check
    pub fn has_changed(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|sub| !sub.drain().is_empty())
    }

    /// Block until the queried URI changes or `timeout` elapses
    pub fn wait_for_change(&self, timeout: Duration) -> Option<ChangeEvent> {
        self.subscription.as_ref()?.wait(timeout)
    }
}

fn resolve_projection(columns: Option<&[&str]>) -> Result<Vec<&'static str>> {
    match columns {
        None => Ok(ALL_COLUMNS.to_vec()),
        Some([]) => Err(Error::InvalidArgument("Empty projection".to_string())),
        Some(requested) => requested
            .iter()
            .map(|column| {
                ALL_COLUMNS
                    .iter()
                    .copied()
                    .find(|c| c == column)
                    .ok_or_else(|| Error::InvalidArgument(format!("Unknown column: {}", column)))
            })
            .collect(),
    }
}

fn column_value(item: &Item, column: &str) -> Value {
    match column {
        COLUMN_ID => Value::Integer(item.id),
        COLUMN_NAME => Value::from(item.name.as_str()),
        COLUMN_PRICE => Value::Real(item.buy_price),
        COLUMN_QUANTITY => Value::Integer(item.quantity),
        COLUMN_SUPPLIER => Value::from(item.supplier.as_str()),
        COLUMN_SUPPLIER_PH => Value::from(item.supplier_ph.as_str()),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<Item> {
        vec![
            Item {
                id: 1,
                name: "A".into(),
                buy_price: 10.0,
                quantity: 2,
                supplier: "S1".into(),
                supplier_ph: "111".into(),
            },
            Item {
                id: 2,
                name: "B".into(),
                buy_price: 5.0,
                quantity: 0,
                supplier: "S2".into(),
                supplier_ph: "222".into(),
            },
        ]
    }

    #[test]
    fn test_projection_order() {
        let cursor = Cursor::from_items(&items(), Some(&["name", "_id"])).unwrap();
        assert_eq!(cursor.columns(), ["name", "_id"]);
        assert_eq!(cursor.rows()[1], vec![Value::from("B"), Value::Integer(2)]);
    }

    #[test]
    fn test_unknown_projection_column() {
        assert!(matches!(
            Cursor::from_items(&items(), Some(&["weight"])),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_iteration_and_getters() {
        let mut cursor = Cursor::from_items(&items(), None).unwrap();
        assert!(cursor.get("name").is_err());

        let mut names = Vec::new();
        while cursor.move_to_next() {
            names.push(cursor.get_str("name").unwrap().to_string());
        }
        assert_eq!(names, ["A", "B"]);
        assert!(cursor.position().is_none());

        assert!(cursor.move_to_first());
        assert_eq!(cursor.get_i64("quantity").unwrap(), 2);
        assert_eq!(cursor.get_f64("buy_price").unwrap(), 10.0);
    }

    #[test]
    fn test_to_items_roundtrip() {
        let cursor = Cursor::from_items(&items(), None).unwrap();
        assert_eq!(cursor.to_items().unwrap(), items());

        let partial = Cursor::from_items(&items(), Some(&["name"])).unwrap();
        assert!(partial.to_items().is_err());
    }

    #[test]
    fn test_unsubscribed_cursor_never_changes() {
        let cursor = Cursor::from_items(&[], None).unwrap();
        assert!(cursor.is_empty());
        assert!(!cursor.has_changed());
        assert!(cursor.wait_for_change(Duration::from_millis(1)).is_none());
    }
}
