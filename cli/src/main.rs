//! `inventory`: manage the product table from the command line.
//!
//! Every command prints JSON on stdout. Logs go to stderr and are
//! controlled with `RUST_LOG`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use inventory_core::schema::ColumnType;
use inventory_core::{Address, Column, Inventory, NewProduct, OrderDirection, Predicate, ProductValues, Selection, Value};
use inventory_storage_sqlite::{SqliteConfig, SqliteStorageEngine, DEFAULT_POOL_SIZE};
use serde_json::json;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "inventory", version, about = "Store and query inventory products")]
struct Cli {
    /// SQLite database file
    #[arg(long, env = "INVENTORY_DB", default_value = "inventory.db", global = true)]
    db: PathBuf,

    /// Use a throwaway in-memory database instead of --db
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List products, optionally filtered and sorted
    List {
        /// Equality filter, repeatable
        #[arg(long = "where", value_name = "COLUMN=VALUE")]
        filters: Vec<String>,
        /// Column to sort by
        #[arg(long, value_name = "COLUMN")]
        order: Option<String>,
        /// Sort descending
        #[arg(long, requires = "order")]
        desc: bool,
    },
    /// Show one product
    Get { id: i64 },
    /// Add a product
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        brand: String,
        #[arg(long, allow_negative_numbers = true)]
        price: i64,
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        quantity: i64,
        #[arg(long)]
        image: String,
        #[arg(long)]
        supplier_name: String,
        #[arg(long)]
        supplier_phone: String,
        #[arg(long)]
        supplier_email: String,
    },
    /// Change some columns of the addressed products
    Patch {
        /// `inventory`, `inventory/<id>` or a content:// address
        address: String,
        #[arg(required = true, value_name = "COLUMN=VALUE")]
        assignments: Vec<String>,
    },
    /// Record received stock
    Receive {
        id: i64,
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(i64).range(1..))]
        count: i64,
    },
    /// Record a sale
    Sell {
        id: i64,
        #[arg(default_value_t = 1, value_parser = clap::value_parser!(i64).range(1..))]
        count: i64,
    },
    /// Delete the addressed products
    Remove { address: String },
    /// Print the content type of an address
    Describe { address: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = if cli.memory { SqliteConfig::Memory } else { SqliteConfig::File(cli.db.clone()) };
    debug!("Opening inventory store: {:?}", config);

    let storage = SqliteStorageEngine::open_with(config, DEFAULT_POOL_SIZE)
        .await
        .with_context(|| format!("failed to open inventory database {}", cli.db.display()))?;
    if storage.config().is_memory() {
        warn!("Using an in-memory database: changes are discarded on exit");
    }
    let inventory = Inventory::new(Arc::new(storage));

    let output = run(&inventory, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run(inventory: &Inventory<SqliteStorageEngine>, command: Command) -> Result<serde_json::Value> {
    let output = match command {
        Command::List { filters, order, desc } => {
            let mut selection = Selection::filter(parse_filters(&filters)?);
            if let Some(order) = order {
                let direction = if desc { OrderDirection::Desc } else { OrderDirection::Asc };
                selection = selection.order_by(order.parse::<Column>()?, direction);
            }
            json!(inventory.list(Address::Collection, selection).await?)
        }
        Command::Get { id } => json!(inventory.get(id).await?),
        Command::Create { name, brand, price, quantity, image, supplier_name, supplier_phone, supplier_email } => {
            let product = NewProduct { name, brand, price, quantity, image, supplier_name, supplier_phone, supplier_email };
            json!({ "id": inventory.create(product).await? })
        }
        Command::Patch { address, assignments } => {
            let values = assignments.iter().map(|a| parse_assignment(a)).collect::<Result<ProductValues>>()?;
            json!({ "rows": inventory.patch_at(&address, values).await? })
        }
        Command::Receive { id, count } => adjust(inventory, id, count).await?,
        Command::Sell { id, count } => adjust(inventory, id, -count).await?,
        Command::Remove { address } => json!({ "rows": inventory.remove_at(&address).await? }),
        Command::Describe { address } => {
            let resolved = inventory.router().resolve(&address)?;
            json!({
                "address": inventory.router().matcher().render(&resolved),
                "kind": inventory.describe(&resolved).as_str(),
                "type": inventory.router().mime_type(&resolved),
            })
        }
    };
    Ok(output)
}

async fn adjust(inventory: &Inventory<SqliteStorageEngine>, id: i64, delta: i64) -> Result<serde_json::Value> {
    match inventory.adjust_quantity(id, delta).await? {
        Some(quantity) => Ok(json!({ "id": id, "quantity": quantity })),
        None => Err(anyhow!("no product with id {}", id)),
    }
}

fn parse_filters(filters: &[String]) -> Result<Predicate> {
    filters.iter().try_fold(Predicate::True, |predicate, raw| {
        let (column, value) = parse_assignment(raw)?;
        Ok(predicate.and(Predicate::eq(column, value)))
    })
}

/// Parses `column=value`, typing the value by the column's storage class
fn parse_assignment(raw: &str) -> Result<(Column, Value)> {
    let Some((column, value)) = raw.split_once('=') else {
        bail!("expected COLUMN=VALUE, got {:?}", raw);
    };
    let column: Column = column.trim().parse()?;
    let value = match column.column_type() {
        ColumnType::Integer => {
            Value::Integer(value.trim().parse().with_context(|| format!("{} expects an integer, got {:?}", column, value))?)
        }
        ColumnType::Text => Value::Text(value.to_string()),
    };
    Ok((column, value))
}
