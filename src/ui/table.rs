use crate::item::Item;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
pub struct ItemRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Price")]
    pub price: String,
    #[tabled(rename = "Qty")]
    pub quantity: i64,
    #[tabled(rename = "Supplier")]
    pub supplier: String,
    #[tabled(rename = "Phone")]
    pub phone: String,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price: format!("{:.2}", item.buy_price),
            quantity: item.quantity,
            supplier: item.supplier.clone(),
            phone: item.supplier_ph.clone(),
        }
    }
}

pub struct ItemTable {
    rows: Vec<ItemRow>,
}

impl ItemTable {
    pub fn new(items: &[Item]) -> Self {
        Self {
            rows: items.iter().map(ItemRow::from).collect(),
        }
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let rows: Vec<TableRow> = stats
        .iter()
        .map(|(label, value)| TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}
