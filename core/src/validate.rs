//! Field presence and range checks run before any write reaches storage.

use crate::error::InventoryError;
use crate::product::{ProductValues, Value};
use crate::schema::Column;

enum Rule {
    /// Non-null text
    Text(&'static str),
    /// Non-null integer, never negative
    NonNegative(&'static str),
}

fn rule(column: Column) -> Option<Rule> {
    Some(match column {
        Column::Id => return None,
        Column::Name => Rule::Text("name required"),
        Column::Brand => Rule::Text("brand required"),
        Column::Price => Rule::NonNegative("invalid price"),
        Column::Quantity => Rule::NonNegative("invalid quantity"),
        Column::Image => Rule::Text("image required"),
        Column::SupplierName => Rule::Text("supplier name required"),
        Column::SupplierPhone => Rule::Text("supplier phone required"),
        Column::SupplierEmail => Rule::Text("supplier email required"),
    })
}

fn check(column: Column, value: Option<&Value>) -> Result<(), InventoryError> {
    let Some(rule) = rule(column) else { return Ok(()) };
    match (rule, value) {
        (Rule::Text(_), Some(Value::Text(_))) => Ok(()),
        (Rule::NonNegative(_), Some(Value::Integer(i))) if *i >= 0 => Ok(()),
        (Rule::Text(message), _) | (Rule::NonNegative(message), _) => Err(InventoryError::invalid(message)),
    }
}

fn reject_id(values: &ProductValues) -> Result<(), InventoryError> {
    if values.contains(Column::Id) {
        return Err(InventoryError::invalid("id is immutable"));
    }
    Ok(())
}

/// Validates a full record for insert. Every writable column must be present.
pub fn validate_insert(values: &ProductValues) -> Result<(), InventoryError> {
    reject_id(values)?;
    for column in Column::WRITABLE {
        check(column, values.get(column))?;
    }
    Ok(())
}

/// Validates a partial record for update. Only the columns present are checked.
pub fn validate_update(values: &ProductValues) -> Result<(), InventoryError> {
    reject_id(values)?;
    for (column, value) in values {
        check(*column, Some(value))?;
    }
    Ok(())
}
