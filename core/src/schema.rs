//! Table, column and address definitions for the product catalog.

use std::fmt;
use std::str::FromStr;

use crate::error::InventoryError;

/// Name of the single product table
pub const TABLE_NAME: &str = "inventory";

/// Current on-disk schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: u32 = 1;

/// Default authority used when rendering content types and matching prefixed addresses
pub const DEFAULT_AUTHORITY: &str = "com.example.inventory";

/// Default path segment naming the product collection
pub const DEFAULT_PATH: &str = "inventory";

/// A column of the product table
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Column {
    Id,
    Name,
    Brand,
    Price,
    Quantity,
    Image,
    SupplierName,
    SupplierPhone,
    SupplierEmail,
}

/// The SQL storage class of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
}

impl Column {
    /// All columns, in table order
    pub const ALL: [Column; 9] = [
        Column::Id,
        Column::Name,
        Column::Brand,
        Column::Price,
        Column::Quantity,
        Column::Image,
        Column::SupplierName,
        Column::SupplierPhone,
        Column::SupplierEmail,
    ];

    /// Columns a caller may write. Everything except the primary key.
    pub const WRITABLE: [Column; 8] = [
        Column::Name,
        Column::Brand,
        Column::Price,
        Column::Quantity,
        Column::Image,
        Column::SupplierName,
        Column::SupplierPhone,
        Column::SupplierEmail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Brand => "brand",
            Column::Price => "price",
            Column::Quantity => "quantity",
            Column::Image => "image",
            Column::SupplierName => "supplier_name",
            Column::SupplierPhone => "supplier_phone",
            Column::SupplierEmail => "supplier_email",
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Id | Column::Price | Column::Quantity => ColumnType::Integer,
            _ => ColumnType::Text,
        }
    }

    /// Column definition used in `CREATE TABLE`
    pub fn definition(&self) -> &'static str {
        match self {
            Column::Id => "INTEGER PRIMARY KEY AUTOINCREMENT",
            Column::Quantity => "INTEGER NOT NULL DEFAULT 0",
            Column::Price => "INTEGER NOT NULL",
            _ => "TEXT NOT NULL",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Column {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `_id` is accepted for callers used to the platform column naming
        match s {
            "id" | "_id" => Ok(Column::Id),
            other => Column::WRITABLE
                .iter()
                .find(|c| c.as_str() == other)
                .copied()
                .ok_or_else(|| InventoryError::InvalidArgument(format!("unknown column: {}", other))),
        }
    }
}

/// Renders the `CREATE TABLE` statement for the product table.
pub fn create_table_sql() -> String {
    let columns = Column::ALL.iter().map(|c| format!(r#""{}" {}"#, c.as_str(), c.definition())).collect::<Vec<_>>().join(", ");
    format!(r#"CREATE TABLE IF NOT EXISTS "{}" ({})"#, TABLE_NAME, columns)
}

/// Logical address of a product resource
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Address {
    /// All products
    Collection,
    /// Exactly one product, by id
    Item(i64),
}

impl Address {
    pub fn item(id: i64) -> Self { Address::Item(id) }

    pub fn content_type(&self) -> ContentType {
        match self {
            Address::Collection => ContentType::Collection,
            Address::Item(_) => ContentType::Item,
        }
    }

    /// Whether a subscriber at `self` should hear about a write to `written`.
    ///
    /// Collection subscribers hear every write. Item subscribers hear writes to
    /// their own item and collection-level writes, which may have touched any row.
    pub fn observes(&self, written: &Address) -> bool {
        match (self, written) {
            (Address::Collection, _) | (_, Address::Collection) => true,
            (Address::Item(a), Address::Item(b)) => a == b,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Collection => write!(f, "{}", DEFAULT_PATH),
            Address::Item(id) => write!(f, "{}/{}", DEFAULT_PATH, id),
        }
    }
}

/// What an address refers to, answered without reading storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Collection,
    Item,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Collection => "collection",
            ContentType::Item => "item",
        }
    }

    /// MIME-style type string, e.g. `vnd.inventory.dir/com.example.inventory/inventory`
    pub fn mime(&self, authority: &str, path: &str) -> String {
        match self {
            ContentType::Collection => format!("vnd.inventory.dir/{}/{}", authority, path),
            ContentType::Item => format!("vnd.inventory.item/{}/{}", authority, path),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
