//! BookStore CLI - manage the book inventory from the command line

use anyhow::Context;
use bookstore::config::{self, BookstoreConfig};
use bookstore::contract::CONTENT_AUTHORITY;
use bookstore::ui::{self, Icons, ItemTable};
use bookstore::{ContentUri, Item, ItemPatch, ItemProvider, NewItem, SortOrder, SqliteStore};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "bookstore")]
#[command(version)]
#[command(about = "BookStore - inventory of books backed by SQLite")]
#[command(long_about = r#"
BookStore keeps a small inventory of books (name, price, quantity,
supplier, supplier phone) in a local SQLite database.

Items are addressed either by numeric id or by content URI:
  content://me.theofrancisco.android.bookstore/books/7

Example usage:
  bookstore seed
  bookstore list --order name
  bookstore edit 1 --quantity 12
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the database file
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file pointing at the database
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// List every book
    List {
        /// Column to sort by (name, buy_price, quantity, supplier, ...)
        #[arg(short, long)]
        order: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Show one book
    Show {
        /// Item id or content URI
        target: String,
    },

    /// Add a book
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "0")]
        price: f64,

        #[arg(long, default_value = "0")]
        quantity: i64,

        #[arg(long)]
        supplier: String,

        /// Supplier phone number
        #[arg(long)]
        phone: String,
    },

    /// Change fields of a book
    Edit {
        /// Item id or content URI
        target: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        price: Option<f64>,

        #[arg(long)]
        quantity: Option<i64>,

        #[arg(long)]
        supplier: Option<String>,

        /// Supplier phone number
        #[arg(long)]
        phone: Option<String>,
    },

    /// Delete a book
    Delete {
        /// Item id or content URI
        target: String,
    },

    /// Delete every book
    DeleteAll,

    /// Insert two sample books
    Seed,

    /// Print the MIME type of a content URI
    Type {
        uri: String,
    },

    /// Show statistics about the inventory
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let loaded = config::load_config(cli.config.as_deref())?;
    let cwd = std::env::current_dir()?;
    let database = config::resolve_database_path(cli.database.as_deref(), loaded.as_ref(), &cwd);

    let authority = loaded
        .and_then(|c| c.authority)
        .unwrap_or_else(|| CONTENT_AUTHORITY.to_string());
    let provider = ItemProvider::with_authority(SqliteStore::new(&database), authority);
    tracing::debug!("Using database {}", database.display());

    match cli.command {
        Commands::Init { force } => {
            run_init(cli.config.as_deref(), &database, force)?;
        }

        Commands::List { order, desc } => {
            let order = match order {
                Some(column) if desc => Some(SortOrder::desc(&column)?),
                Some(column) => Some(SortOrder::asc(&column)?),
                None => None,
            };
            let items = provider.list(order)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if items.is_empty() {
                println!("{} No books in the inventory.", Icons::EMPTY);
            } else {
                ui::header(&format!("{} book(s)", items.len()));
                println!("{}", ItemTable::new(&items).build());
            }
        }

        Commands::Show { target } => {
            let id = resolve_target(&provider, &target)?;
            match provider.get(id)? {
                Some(item) if cli.json => println!("{}", serde_json::to_string_pretty(&item)?),
                Some(item) => print_item(&item),
                None => anyhow::bail!("No book with id {}", id),
            }
        }

        Commands::Add { name, price, quantity, supplier, phone } => {
            let item = NewItem::new(name, price, quantity, supplier, phone);
            let uri = provider.insert_item(&item)?;

            if cli.json {
                println!("{}", serde_json::json!({ "uri": uri }));
            } else {
                ui::success(&format!("Book saved: {}", uri));
            }
        }

        Commands::Edit { target, name, price, quantity, supplier, phone } => {
            let id = resolve_target(&provider, &target)?;
            let patch = ItemPatch {
                name,
                buy_price: price,
                quantity,
                supplier,
                supplier_ph: phone,
            };
            if patch.is_empty() {
                ui::warn("Nothing to change");
                return Ok(());
            }

            let rows = provider
                .update_item(id, &patch)
                .with_context(|| format!("updating book {}", id))?;
            report_rows(cli.json, "updated", rows)?;
            if rows == 0 {
                anyhow::bail!("Error with updating book {}", id);
            }
        }

        Commands::Delete { target } => {
            let id = resolve_target(&provider, &target)?;
            let rows = provider.delete_item(id)?;
            report_rows(cli.json, "deleted", rows)?;
        }

        Commands::DeleteAll => {
            let rows = provider.delete_all()?;
            report_rows(cli.json, "deleted", rows)?;
        }

        Commands::Seed => {
            let mut uris = Vec::new();
            for item in sample_books() {
                uris.push(provider.insert_item(&item)?);
            }

            if cli.json {
                println!("{}", serde_json::json!({ "inserted": uris }));
            } else {
                for uri in uris {
                    println!("{} {}", Icons::NEW, uri);
                }
            }
        }

        Commands::Type { uri } => {
            let uri = ContentUri::parse(&uri)?;
            let mime = provider.get_type(&uri)?;

            if cli.json {
                println!("{}", serde_json::json!({ "uri": uri, "type": mime }));
            } else {
                println!("{}", mime);
            }
        }

        Commands::Stats => {
            let stats = provider.repository().stats()?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                let items = stats.items.to_string();
                let copies = stats.total_quantity.to_string();
                let value = format!("{:.2}", stats.inventory_value);
                let version = stats.schema_version.to_string();

                println!("{} BookStore Statistics ({:?})", Icons::STATS, database);
                println!(
                    "{}",
                    ui::stats_table(&[
                        ("Books", items.as_str()),
                        ("Copies in stock", copies.as_str()),
                        ("Inventory value", value.as_str()),
                        ("Schema version", version.as_str()),
                    ])
                );
            }
        }
    }

    Ok(())
}

fn run_init(config_path: Option<&Path>, database: &Path, force: bool) -> anyhow::Result<()> {
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(config::default_config_path);
    let config = BookstoreConfig {
        database: Some(database.to_string_lossy().to_string()),
        authority: None,
    };

    config::write_config(&path, &config, force)?;
    SqliteStore::open(database)?;

    ui::success(&format!("Wrote {}", path.display()));
    ui::info(&format!("{} Database", Icons::DATABASE), &database.display().to_string());
    Ok(())
}

/// Accept either a bare id or an item content URI
fn resolve_target(provider: &ItemProvider, target: &str) -> anyhow::Result<i64> {
    if let Ok(id) = target.parse::<i64>() {
        return Ok(id);
    }

    let uri = ContentUri::parse(target)?;
    match uri.resolve(&provider.content_uri().authority)? {
        bookstore::Resource::Item(id) => Ok(id),
        bookstore::Resource::Collection => anyhow::bail!("{} names the whole collection, not one book", uri),
    }
}

fn report_rows(json: bool, action: &str, rows: usize) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::json!({ (action): rows }));
    } else if rows == 0 {
        println!("{} No books {}.", Icons::EMPTY, action);
    } else {
        ui::success(&format!("{} book(s) {}", rows, action));
    }
    Ok(())
}

fn print_item(item: &Item) {
    ui::section(&format!("{} {}", Icons::BOOK, item.name));
    ui::summary_row("ID:", &item.id.to_string());
    ui::summary_row("Price:", &format!("{:.2}", item.buy_price));
    let quantity = item.quantity.to_string();
    if item.quantity == 0 {
        ui::summary_row("Quantity:", &ui::theme().paint(&quantity, ui::Role::OutOfStock));
    } else {
        ui::summary_row("Quantity:", &quantity);
    }
    ui::summary_row("Supplier:", &item.supplier);
    ui::summary_row(&format!("{} Phone:", Icons::PHONE), &item.supplier_ph);
}

fn sample_books() -> [NewItem; 2] {
    [
        NewItem::new("The Engineer's Guide to Fashion", 10.40, 11, "Fazlur Rahman Khan", "6054756959"),
        NewItem::new("Everything Men Know About Women", 15.60, 22, "Ricky Martin", "9512623062"),
    ]
}
