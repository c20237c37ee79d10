//! Product records and the column/value payloads used to write them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::Column;

/// A single payload value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Integer(i64),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "'{}'", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Null => f.write_str("NULL"),
        }
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self { Value::Text(value) }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self { Value::Text(value.to_owned()) }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self { Value::Integer(value) }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self { Value::Integer(value as i64) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// A partial product record: the columns present and the value written to each.
///
/// A column that is absent is left alone by an update. A column that is present
/// with [`Value::Null`] is a write of null and fails validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductValues(BTreeMap<Column, Value>);

impl ProductValues {
    pub fn new() -> Self { Self::default() }

    /// Builder-style setter
    pub fn with(mut self, column: Column, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: Column, value: impl Into<Value>) { self.0.insert(column, value.into()); }

    pub fn get(&self, column: Column) -> Option<&Value> { self.0.get(&column) }

    pub fn contains(&self, column: Column) -> bool { self.0.contains_key(&column) }

    pub fn remove(&mut self, column: Column) -> Option<Value> { self.0.remove(&column) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&Column, &Value)> { self.0.iter() }
}

impl FromIterator<(Column, Value)> for ProductValues {
    fn from_iter<I: IntoIterator<Item = (Column, Value)>>(iter: I) -> Self { Self(iter.into_iter().collect()) }
}

impl<'a> IntoIterator for &'a ProductValues {
    type Item = (&'a Column, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, Column, Value>;

    fn into_iter(self) -> Self::IntoIter { self.0.iter() }
}

/// A complete product record without an id, as supplied to `create` and `replace`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    pub price: i64,
    #[serde(default)]
    pub quantity: i64,
    pub image: String,
    pub supplier_name: String,
    pub supplier_phone: String,
    pub supplier_email: String,
}

impl From<NewProduct> for ProductValues {
    fn from(p: NewProduct) -> Self {
        ProductValues::new()
            .with(Column::Name, p.name)
            .with(Column::Brand, p.brand)
            .with(Column::Price, p.price)
            .with(Column::Quantity, p.quantity)
            .with(Column::Image, p.image)
            .with(Column::SupplierName, p.supplier_name)
            .with(Column::SupplierPhone, p.supplier_phone)
            .with(Column::SupplierEmail, p.supplier_email)
    }
}

/// A stored product row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub price: i64,
    pub quantity: i64,
    pub image: String,
    pub supplier_name: String,
    pub supplier_phone: String,
    pub supplier_email: String,
}

impl Product {
    /// The record without its id
    pub fn fields(&self) -> NewProduct {
        NewProduct {
            name: self.name.clone(),
            brand: self.brand.clone(),
            price: self.price,
            quantity: self.quantity,
            image: self.image.clone(),
            supplier_name: self.supplier_name.clone(),
            supplier_phone: self.supplier_phone.clone(),
            supplier_email: self.supplier_email.clone(),
        }
    }
}
