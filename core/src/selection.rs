//! Row filters and sort orders.
//!
//! A [`Predicate`] is the filter expression; the [`Value`]s it carries are its
//! bound arguments and are never spliced into SQL text by the storage engine.

use crate::product::Value;
use crate::schema::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Equal,              // =
    NotEqual,           // <>
    GreaterThan,        // >
    GreaterThanOrEqual, // >=
    LessThan,           // <
    LessThanOrEqual,    // <=
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Comparison { column: Column, operator: ComparisonOperator, value: Value },
    In { column: Column, values: Vec<Value> },
    IsNull(Column),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
    True,
    False,
}

impl Predicate {
    pub fn compare(column: Column, operator: ComparisonOperator, value: impl Into<Value>) -> Self {
        Predicate::Comparison { column, operator, value: value.into() }
    }

    pub fn eq(column: Column, value: impl Into<Value>) -> Self { Self::compare(column, ComparisonOperator::Equal, value) }

    pub fn ne(column: Column, value: impl Into<Value>) -> Self { Self::compare(column, ComparisonOperator::NotEqual, value) }

    pub fn gt(column: Column, value: impl Into<Value>) -> Self { Self::compare(column, ComparisonOperator::GreaterThan, value) }

    pub fn gte(column: Column, value: impl Into<Value>) -> Self { Self::compare(column, ComparisonOperator::GreaterThanOrEqual, value) }

    pub fn lt(column: Column, value: impl Into<Value>) -> Self { Self::compare(column, ComparisonOperator::LessThan, value) }

    pub fn lte(column: Column, value: impl Into<Value>) -> Self { Self::compare(column, ComparisonOperator::LessThanOrEqual, value) }

    pub fn is_in<V: Into<Value>>(column: Column, values: impl IntoIterator<Item = V>) -> Self {
        Predicate::In { column, values: values.into_iter().map(Into::into).collect() }
    }

    /// Matches exactly the row with the given primary key
    pub fn id(id: i64) -> Self { Self::eq(Column::Id, id) }

    pub fn and(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::True, p) | (p, Predicate::True) => p,
            (a, b) => Predicate::And(Box::new(a), Box::new(b)),
        }
    }

    pub fn or(self, other: Predicate) -> Self { Predicate::Or(Box::new(self), Box::new(other)) }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self { Predicate::Not(Box::new(self)) }

    /// Number of bound arguments this predicate carries
    pub fn arg_count(&self) -> usize {
        match self {
            Predicate::Comparison { .. } => 1,
            Predicate::In { values, .. } => values.len(),
            Predicate::And(a, b) | Predicate::Or(a, b) => a.arg_count() + b.arg_count(),
            Predicate::Not(p) => p.arg_count(),
            Predicate::IsNull(_) | Predicate::True | Predicate::False => 0,
        }
    }
}

impl Default for Predicate {
    fn default() -> Self { Predicate::True }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderByItem {
    pub column: Column,
    pub direction: OrderDirection,
}

/// A filter plus sort order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub predicate: Predicate,
    pub order_by: Vec<OrderByItem>,
}

impl Selection {
    /// Every row, storage order
    pub fn all() -> Self { Self::default() }

    pub fn filter(predicate: Predicate) -> Self { Self { predicate, order_by: Vec::new() } }

    pub fn order_by(mut self, column: Column, direction: OrderDirection) -> Self {
        self.order_by.push(OrderByItem { column, direction });
        self
    }
}

impl From<Predicate> for Selection {
    fn from(predicate: Predicate) -> Self { Selection::filter(predicate) }
}
