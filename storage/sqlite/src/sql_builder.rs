//! SQL builder for the product table
//!
//! Renders [`Predicate`]s and [`ProductValues`] into parameterized SQLite
//! statements. Values are always bound as `?` parameters.

use inventory_core::schema::TABLE_NAME;
use inventory_core::{Column, ComparisonOperator, OrderByItem, OrderDirection, Predicate, ProductValues, Selection};
use rusqlite::types::Value as SqlValue;
use thiserror::Error;

use crate::value::{select_columns, to_sql};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqlGenerationError {
    #[error("UPDATE requires at least one column to set")]
    EmptyAssignment,
}

fn quote_ident(name: &str) -> String { format!(r#""{}""#, name.replace('"', "\"\"")) }

/// SQL builder for SQLite statements
pub struct SqlBuilder {
    sql: String,
    params: Vec<SqlValue>,
}

impl Default for SqlBuilder {
    fn default() -> Self { Self::new() }
}

impl SqlBuilder {
    pub fn new() -> Self { Self { sql: String::new(), params: Vec::new() } }

    fn push_sql(&mut self, s: &str) { self.sql.push_str(s); }

    fn push_param(&mut self, value: SqlValue) {
        self.sql.push('?');
        self.params.push(value);
    }

    fn column(&mut self, column: &Column) { self.push_sql(&quote_ident(column.as_str())); }

    fn table(&self) -> String { quote_ident(TABLE_NAME) }

    pub fn build_where_clause(self) -> (String, Vec<SqlValue>) { (self.sql, self.params) }

    pub fn predicate(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::Comparison { column, operator, value } => {
                self.column(column);
                self.push_sql(" ");
                self.push_sql(comparison_op_to_sql(operator));
                self.push_sql(" ");
                self.push_param(to_sql(value));
            }
            Predicate::In { column, values } => {
                self.column(column);
                self.push_sql(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.push_sql(", ");
                    }
                    self.push_param(to_sql(value));
                }
                self.push_sql(")");
            }
            Predicate::IsNull(column) => {
                self.column(column);
                self.push_sql(" IS NULL");
            }
            Predicate::And(left, right) => {
                self.push_sql("(");
                self.predicate(left);
                self.push_sql(" AND ");
                self.predicate(right);
                self.push_sql(")");
            }
            Predicate::Or(left, right) => {
                self.push_sql("(");
                self.predicate(left);
                self.push_sql(" OR ");
                self.predicate(right);
                self.push_sql(")");
            }
            Predicate::Not(inner) => {
                self.push_sql("NOT (");
                self.predicate(inner);
                self.push_sql(")");
            }
            Predicate::True => self.push_sql("1=1"),
            Predicate::False => self.push_sql("1=0"),
        }
    }

    pub fn order_by(&mut self, items: &[OrderByItem]) {
        if items.is_empty() {
            return;
        }
        self.push_sql(" ORDER BY ");
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push_sql(", ");
            }
            self.column(&item.column);
            match item.direction {
                OrderDirection::Asc => self.push_sql(" ASC"),
                OrderDirection::Desc => self.push_sql(" DESC"),
            }
        }
    }

    pub fn selection(&mut self, selection: &Selection) {
        self.predicate(&selection.predicate);
        self.order_by(&selection.order_by);
    }

    /// `SELECT <all columns> FROM <table> WHERE ... ORDER BY ...`
    pub fn select(mut self, selection: &Selection) -> (String, Vec<SqlValue>) {
        let fields = select_columns().iter().map(|f| quote_ident(f)).collect::<Vec<_>>().join(", ");
        let prefix = format!("SELECT {} FROM {} WHERE ", fields, self.table());
        self.push_sql(&prefix);
        self.selection(selection);
        (self.sql, self.params)
    }

    /// `INSERT INTO <table> (...) VALUES (...)`, or `DEFAULT VALUES` for an empty record
    pub fn insert(mut self, values: &ProductValues) -> (String, Vec<SqlValue>) {
        let table = self.table();
        if values.is_empty() {
            self.push_sql(&format!("INSERT INTO {} DEFAULT VALUES", table));
            return (self.sql, self.params);
        }
        let columns = values.iter().map(|(c, _)| quote_ident(c.as_str())).collect::<Vec<_>>().join(", ");
        self.push_sql(&format!("INSERT INTO {} ({}) VALUES (", table, columns));
        for (i, (_, value)) in values.iter().enumerate() {
            if i > 0 {
                self.push_sql(", ");
            }
            self.push_param(to_sql(value));
        }
        self.push_sql(")");
        (self.sql, self.params)
    }

    /// `UPDATE <table> SET ... WHERE ...`. SET parameters precede WHERE parameters.
    pub fn update(mut self, predicate: &Predicate, values: &ProductValues) -> Result<(String, Vec<SqlValue>), SqlGenerationError> {
        if values.is_empty() {
            return Err(SqlGenerationError::EmptyAssignment);
        }
        let table = self.table();
        self.push_sql(&format!("UPDATE {} SET ", table));
        for (i, (column, value)) in values.iter().enumerate() {
            if i > 0 {
                self.push_sql(", ");
            }
            self.column(column);
            self.push_sql(" = ");
            self.push_param(to_sql(value));
        }
        self.push_sql(" WHERE ");
        self.predicate(predicate);
        Ok((self.sql, self.params))
    }

    /// `DELETE FROM <table> WHERE ...`
    pub fn delete(mut self, predicate: &Predicate) -> (String, Vec<SqlValue>) {
        let table = self.table();
        self.push_sql(&format!("DELETE FROM {} WHERE ", table));
        self.predicate(predicate);
        (self.sql, self.params)
    }

    /// Guarded increment of one product's quantity, returning the new value.
    ///
    /// The row only matches when the current quantity lies in
    /// [`adjustable_range`], so the stored result stays within `0..=i64::MAX`.
    pub fn adjust_quantity(mut self, id: i64, delta: i64) -> (String, Vec<SqlValue>) {
        let table = self.table();
        let quantity = quote_ident(Column::Quantity.as_str());
        let id_column = quote_ident(Column::Id.as_str());
        self.push_sql(&format!("UPDATE {table} SET {quantity} = {quantity} + "));
        self.push_param(SqlValue::Integer(delta));
        self.push_sql(&format!(" WHERE {id_column} = "));
        self.push_param(SqlValue::Integer(id));
        match adjustable_range(delta) {
            Some((min, max)) => {
                self.push_sql(&format!(" AND {quantity} BETWEEN "));
                self.push_param(SqlValue::Integer(min));
                self.push_sql(" AND ");
                self.push_param(SqlValue::Integer(max));
            }
            None => self.push_sql(" AND 1=0"),
        }
        self.push_sql(&format!(" RETURNING {quantity}"));
        (self.sql, self.params)
    }
}

/// Quantities that `delta` can be added to without going negative or overflowing.
/// `None` when no quantity qualifies.
pub fn adjustable_range(delta: i64) -> Option<(i64, i64)> {
    let min = delta.checked_neg()?.max(0);
    let max = i64::MAX - delta.max(0);
    Some((min, max))
}

fn comparison_op_to_sql(op: &ComparisonOperator) -> &'static str {
    match op {
        ComparisonOperator::Equal => "=",
        ComparisonOperator::NotEqual => "<>",
        ComparisonOperator::GreaterThan => ">",
        ComparisonOperator::GreaterThanOrEqual => ">=",
        ComparisonOperator::LessThan => "<",
        ComparisonOperator::LessThanOrEqual => "<=",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory_core::Value;

    #[test]
    fn test_simple_equality() {
        let mut sql = SqlBuilder::new();
        sql.predicate(&Predicate::eq(Column::Name, "Widget"));
        let (sql_string, params) = sql.build_where_clause();

        assert_eq!(sql_string, r#""name" = ?"#);
        assert_eq!(params, vec![SqlValue::Text("Widget".into())]);
    }

    #[test]
    fn test_and_or_not() {
        let predicate = Predicate::eq(Column::Brand, "Acme").and(Predicate::gt(Column::Quantity, 0).or(Predicate::IsNull(Column::Image).not()));
        let mut sql = SqlBuilder::new();
        sql.predicate(&predicate);
        let (sql_string, params) = sql.build_where_clause();

        assert_eq!(sql_string, r#"("brand" = ? AND ("quantity" > ? OR NOT ("image" IS NULL)))"#);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_in_operator() {
        let mut sql = SqlBuilder::new();
        sql.predicate(&Predicate::is_in(Column::Id, [1i64, 2]));
        let (sql_string, params) = sql.build_where_clause();

        assert_eq!(sql_string, r#""id" IN (?, ?)"#);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_select_with_order() {
        let selection = Selection::filter(Predicate::gte(Column::Price, 100)).order_by(Column::Name, OrderDirection::Desc);
        let (sql, params) = SqlBuilder::new().select(&selection);

        assert_eq!(
            sql,
            r#"SELECT "id", "name", "brand", "price", "quantity", "image", "supplier_name", "supplier_phone", "supplier_email" FROM "inventory" WHERE "price" >= ? ORDER BY "name" DESC"#
        );
        assert_eq!(params, vec![SqlValue::Integer(100)]);
    }

    #[test]
    fn test_update_param_order() {
        let values = ProductValues::new().with(Column::Quantity, 9).with(Column::Name, "Gadget");
        let (sql, params) = SqlBuilder::new().update(&Predicate::id(1), &values).unwrap();

        // ProductValues iterates in column order: name before quantity
        assert_eq!(sql, r#"UPDATE "inventory" SET "name" = ?, "quantity" = ? WHERE "id" = ?"#);
        assert_eq!(params, vec![SqlValue::Text("Gadget".into()), SqlValue::Integer(9), SqlValue::Integer(1)]);
    }

    #[test]
    fn test_update_requires_values() {
        assert_eq!(SqlBuilder::new().update(&Predicate::True, &ProductValues::new()).unwrap_err(), SqlGenerationError::EmptyAssignment);
    }

    #[test]
    fn test_insert_and_delete() {
        let values = ProductValues::new().with(Column::Name, "Widget").with(Column::Price, Value::Integer(5));
        let (sql, params) = SqlBuilder::new().insert(&values);
        assert_eq!(sql, r#"INSERT INTO "inventory" ("name", "price") VALUES (?, ?)"#);
        assert_eq!(params.len(), 2);

        let (sql, params) = SqlBuilder::new().delete(&Predicate::True);
        assert_eq!(sql, r#"DELETE FROM "inventory" WHERE 1=1"#);
        assert!(params.is_empty());
    }

    #[test]
    fn test_adjust_quantity() {
        let (sql, params) = SqlBuilder::new().adjust_quantity(3, -1);
        assert_eq!(
            sql,
            r#"UPDATE "inventory" SET "quantity" = "quantity" + ? WHERE "id" = ? AND "quantity" BETWEEN ? AND ? RETURNING "quantity""#
        );
        assert_eq!(params, vec![SqlValue::Integer(-1), SqlValue::Integer(3), SqlValue::Integer(1), SqlValue::Integer(i64::MAX)]);

        let (sql, _) = SqlBuilder::new().adjust_quantity(3, i64::MIN);
        assert!(sql.contains(r#"WHERE "id" = ? AND 1=0 RETURNING"#), "{sql}");
    }

    #[test]
    fn test_adjustable_range() {
        assert_eq!(adjustable_range(0), Some((0, i64::MAX)));
        assert_eq!(adjustable_range(5), Some((0, i64::MAX - 5)));
        assert_eq!(adjustable_range(i64::MAX), Some((0, 0)));
        assert_eq!(adjustable_range(-5), Some((5, i64::MAX)));
        assert_eq!(adjustable_range(i64::MIN + 1), Some((i64::MAX, i64::MAX)));
        assert_eq!(adjustable_range(i64::MIN), None);
    }
}
