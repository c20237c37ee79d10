//! Conversions from payload values to rusqlite parameters, and from rows to products

use inventory_core::{Column, Product, Value};
use rusqlite::types::Value as SqlValue;
use rusqlite::Row;

/// Convert a payload value to a rusqlite parameter
pub fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Null => SqlValue::Null,
    }
}

/// Column list for `SELECT`, in [`Column::ALL`] order. [`product_from_row`] relies on it.
pub fn select_columns() -> Vec<&'static str> { Column::ALL.iter().map(|c| c.as_str()).collect() }

/// Reads a row selected with [`select_columns`]
pub fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        brand: row.get(2)?,
        price: row.get(3)?,
        quantity: row.get(4)?,
        image: row.get(5)?,
        supplier_name: row.get(6)?,
        supplier_phone: row.get(7)?,
        supplier_email: row.get(8)?,
    })
}
