//! Item types - the single inventory entity
//!
//! - `Item`: a stored row, id assigned by the store
//! - `NewItem`: insert payload
//! - `ItemPatch`: update payload, every field optional

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// An inventory record as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Row id, unique and immutable for the item's lifetime
    pub id: i64,
    pub name: String,
    pub buy_price: f64,
    pub quantity: i64,
    pub supplier: String,
    pub supplier_ph: String,
}

/// Payload for inserting a new item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub buy_price: f64,
    #[serde(default)]
    pub quantity: i64,
    pub supplier: String,
    pub supplier_ph: String,
}

impl NewItem {
    /// Create a new item payload
    pub fn new(
        name: impl Into<String>,
        buy_price: f64,
        quantity: i64,
        supplier: impl Into<String>,
        supplier_ph: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            buy_price,
            quantity,
            supplier: supplier.into(),
            supplier_ph: supplier_ph.into(),
        }
    }

    /// Name must be non-empty
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub buy_price: Option<f64>,
    pub quantity: Option<i64>,
    pub supplier: Option<String>,
    pub supplier_ph: Option<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.buy_price.is_none()
            && self.quantity.is_none()
            && self.supplier.is_none()
            && self.supplier_ph.is_none()
    }

    /// Only the name is checked, and only when present
    pub fn validate(&self) -> Result<()> {
        match &self.name {
            Some(name) => validate_name(name),
            None => Ok(()),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn buy_price(mut self, price: f64) -> Self {
        self.buy_price = Some(price);
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn supplier_ph(mut self, phone: impl Into<String>) -> Self {
        self.supplier_ph = Some(phone.into());
        self
    }

    /// Apply onto an existing item, used by in-memory repositories
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(price) = self.buy_price {
            item.buy_price = price;
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(supplier) = &self.supplier {
            item.supplier = supplier.clone();
        }
        if let Some(phone) = &self.supplier_ph {
            item.supplier_ph = phone.clone();
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidArgument("Item requires a name".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patch() {
        assert!(ItemPatch::default().is_empty());
        assert!(!ItemPatch::default().quantity(0).is_empty());
    }

    #[test]
    fn test_patch_validation_only_checks_name() {
        assert!(ItemPatch::default().quantity(-5).validate().is_ok());
        assert!(ItemPatch::default().name("").validate().is_err());
        assert!(ItemPatch::default().name("Dune").validate().is_ok());
    }

    #[test]
    fn test_apply_patch() {
        let mut item = Item {
            id: 1,
            name: "A".into(),
            buy_price: 1.0,
            quantity: 1,
            supplier: "S".into(),
            supplier_ph: "1".into(),
        };
        ItemPatch::default().quantity(9).supplier("T").apply_to(&mut item);
        assert_eq!(item.quantity, 9);
        assert_eq!(item.supplier, "T");
        assert_eq!(item.name, "A");
        assert_eq!(item.id, 1);
    }
}
