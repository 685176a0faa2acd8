//! Column values exchanged at the URI boundary
//!
//! `ContentValues` is the loosely typed payload accepted by the provider's
//! URI operations. It is converted into [`NewItem`] or [`ItemPatch`] before
//! anything reaches storage.

use crate::contract::{
    COLUMN_ID, COLUMN_NAME, COLUMN_PRICE, COLUMN_QUANTITY, COLUMN_SUPPLIER, COLUMN_SUPPLIER_PH,
    is_known_column,
};
use crate::item::{ItemPatch, NewItem};
use crate::{Error, Result};
use rusqlite::ToSql;
use rusqlite::types::{ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single SQLite-compatible value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer view with SQLite INTEGER affinity: integral reals and
    /// numeric text convert, anything with a fractional part does not.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(r) => integral(*r),
            Value::Text(s) => {
                let s = s.trim();
                s.parse().ok().or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            Value::Null => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

fn integral(r: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if r.is_finite() && r.fract() == 0.0 && r >= i64::MIN as f64 && r < i64::MAX as f64 {
        Some(r as i64)
    } else {
        None
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{:.2}", r),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Borrowed(ValueRef::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Column name → value payload for insert and update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentValues {
    values: BTreeMap<String, Value>,
}

impl ContentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`, replacing any previous value
    pub fn put(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.values.insert(column.to_string(), value.into());
        self
    }

    /// Set `column` to NULL
    pub fn put_null(&mut self, column: &str) -> &mut Self {
        self.values.insert(column.to_string(), Value::Null);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Reject keys that are not writable columns
    fn check_columns(&self) -> Result<()> {
        for column in self.values.keys() {
            if column == COLUMN_ID {
                return Err(Error::InvalidArgument(format!("{} cannot be written", COLUMN_ID)));
            }
            if !is_known_column(column) {
                return Err(Error::InvalidArgument(format!("Unknown column: {}", column)));
            }
        }
        Ok(())
    }

    fn text(&self, column: &str) -> Result<Option<String>> {
        match self.values.get(column) {
            None => Ok(None),
            Some(Value::Null) => Err(Error::InvalidArgument(format!("{} cannot be null", column))),
            Some(Value::Text(s)) => Ok(Some(s.clone())),
            Some(Value::Integer(i)) => Ok(Some(i.to_string())),
            Some(Value::Real(r)) => Ok(Some(r.to_string())),
        }
    }

    fn integer(&self, column: &str) -> Result<Option<i64>> {
        match self.values.get(column) {
            None => Ok(None),
            Some(Value::Null) => Err(Error::InvalidArgument(format!("{} cannot be null", column))),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| Error::InvalidArgument(format!("{} requires an integer, got {}", column, v))),
        }
    }

    fn real(&self, column: &str) -> Result<Option<f64>> {
        match self.values.get(column) {
            None => Ok(None),
            Some(Value::Null) => Err(Error::InvalidArgument(format!("{} cannot be null", column))),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| Error::InvalidArgument(format!("{} requires a number, got {}", column, v))),
        }
    }

    fn required_text(&self, column: &str) -> Result<String> {
        self.text(column)?
            .ok_or_else(|| Error::InvalidArgument(format!("Item requires a {}", column)))
    }
}

impl<'a> FromIterator<(&'a str, Value)> for ContentValues {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        let mut values = ContentValues::new();
        for (column, value) in iter {
            values.put(column, value);
        }
        values
    }
}

impl TryFrom<&ContentValues> for NewItem {
    type Error = Error;

    fn try_from(values: &ContentValues) -> Result<Self> {
        values.check_columns()?;
        let item = NewItem {
            name: values.required_text(COLUMN_NAME)?,
            buy_price: values.real(COLUMN_PRICE)?.unwrap_or(0.0),
            quantity: values.integer(COLUMN_QUANTITY)?.unwrap_or(0),
            supplier: values.required_text(COLUMN_SUPPLIER)?,
            supplier_ph: values.required_text(COLUMN_SUPPLIER_PH)?,
        };
        item.validate()?;
        Ok(item)
    }
}

impl TryFrom<&ContentValues> for ItemPatch {
    type Error = Error;

    fn try_from(values: &ContentValues) -> Result<Self> {
        values.check_columns()?;
        let patch = ItemPatch {
            name: values.text(COLUMN_NAME)?,
            buy_price: values.real(COLUMN_PRICE)?,
            quantity: values.integer(COLUMN_QUANTITY)?,
            supplier: values.text(COLUMN_SUPPLIER)?,
            supplier_ph: values.text(COLUMN_SUPPLIER_PH)?,
        };
        patch.validate()?;
        Ok(patch)
    }
}

impl From<&NewItem> for ContentValues {
    fn from(item: &NewItem) -> Self {
        let mut values = ContentValues::new();
        values
            .put(COLUMN_NAME, item.name.as_str())
            .put(COLUMN_PRICE, item.buy_price)
            .put(COLUMN_QUANTITY, item.quantity)
            .put(COLUMN_SUPPLIER, item.supplier.as_str())
            .put(COLUMN_SUPPLIER_PH, item.supplier_ph.as_str());
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> ContentValues {
        let mut values = ContentValues::new();
        values
            .put(COLUMN_NAME, "A")
            .put(COLUMN_PRICE, 10.0)
            .put(COLUMN_QUANTITY, 2)
            .put(COLUMN_SUPPLIER, "S1")
            .put(COLUMN_SUPPLIER_PH, "111");
        values
    }

    #[test]
    fn test_new_item_from_values() {
        let item = NewItem::try_from(&book()).unwrap();
        assert_eq!(item.name, "A");
        assert_eq!(item.buy_price, 10.0);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.supplier_ph, "111");
    }

    #[test]
    fn test_new_item_defaults_numbers_to_zero() {
        let mut values = book();
        values.remove(COLUMN_PRICE);
        values.remove(COLUMN_QUANTITY);
        let item = NewItem::try_from(&values).unwrap();
        assert_eq!(item.buy_price, 0.0);
        assert_eq!(item.quantity, 0);
    }

    #[test]
    fn test_new_item_requires_name() {
        let mut values = book();
        values.remove(COLUMN_NAME);
        assert!(matches!(NewItem::try_from(&values), Err(Error::InvalidArgument(_))));

        values.put_null(COLUMN_NAME);
        assert!(matches!(NewItem::try_from(&values), Err(Error::InvalidArgument(_))));

        values.put(COLUMN_NAME, "   ");
        assert!(matches!(NewItem::try_from(&values), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_patch_null_name_rejected() {
        let mut values = ContentValues::new();
        values.put_null(COLUMN_NAME);
        assert!(matches!(ItemPatch::try_from(&values), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_patch_without_name() {
        let mut values = ContentValues::new();
        values.put(COLUMN_QUANTITY, "7");
        let patch = ItemPatch::try_from(&values).unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.quantity, Some(7));
    }

    #[test]
    fn test_rejects_id_and_unknown_columns() {
        let mut values = ContentValues::new();
        values.put(COLUMN_ID, 3);
        assert!(matches!(ItemPatch::try_from(&values), Err(Error::InvalidArgument(_))));

        let mut values = ContentValues::new();
        values.put("breed", "Pomeranian");
        assert!(matches!(ItemPatch::try_from(&values), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_bad_number() {
        let mut values = ContentValues::new();
        values.put(COLUMN_PRICE, "cheap");
        assert!(matches!(ItemPatch::try_from(&values), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_integral_real_quantity() {
        let mut values = ContentValues::new();
        values.put(COLUMN_QUANTITY, 2.0);
        assert_eq!(ItemPatch::try_from(&values).unwrap().quantity, Some(2));

        values.put(COLUMN_QUANTITY, "4.0");
        assert_eq!(ItemPatch::try_from(&values).unwrap().quantity, Some(4));

        values.put(COLUMN_QUANTITY, 2.5);
        assert!(matches!(ItemPatch::try_from(&values), Err(Error::InvalidArgument(_))));

        values.put(COLUMN_QUANTITY, f64::NAN);
        assert!(matches!(ItemPatch::try_from(&values), Err(Error::InvalidArgument(_))));

        values.put(COLUMN_QUANTITY, 1e30);
        assert!(matches!(ItemPatch::try_from(&values), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_numeric_text_keeps_full_precision() {
        let mut values = book();
        values.put(COLUMN_SUPPLIER_PH, 3.14159).put(COLUMN_SUPPLIER, 42);
        let item = NewItem::try_from(&values).unwrap();
        assert_eq!(item.supplier_ph, "3.14159");
        assert_eq!(item.supplier, "42");
    }

    #[test]
    fn test_json_payload() {
        let values: ContentValues =
            serde_json::from_str(r#"{"name": null, "quantity": 3, "buy_price": 2.5}"#).unwrap();
        assert_eq!(values.get(COLUMN_NAME), Some(&Value::Null));
        assert_eq!(values.get(COLUMN_QUANTITY), Some(&Value::Integer(3)));
        assert_eq!(values.get(COLUMN_PRICE), Some(&Value::Real(2.5)));
    }
}
