//! # Seed Data Generator
//!
//! Populates the database with test products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p storage-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p storage-db --bin seed -- --count 1000
//!
//! # Specify database path (STORAGE_DB_PATH works too)
//! cargo run -p storage-db --bin seed -- --db ./data/storage.db
//! ```
//!
//! Each product gets a `{name} {variant}` name, its category as `type`,
//! a stock count of 0 - 100 and a price of 1.99 - 99.99.

use std::env;
use std::time::Duration;
use storage_core::validation::{validate_product, validate_stored_product};
use storage_core::Product;
use storage_db::{Database, DbConfig};
use tokio::time::Instant;
use tracing::{info, warn, Subscriber};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Smart",
        &["TV", "PC", "Aire", "Speaker", "Watch", "Doorbell", "Thermostat", "Plug"],
    ),
    (
        "Kitchen",
        &["Kettle", "Toaster", "Blender", "Microwave", "Fridge", "Oven"],
    ),
    (
        "Office",
        &["Lamp", "Desk", "Chair", "Monitor", "Keyboard", "Mouse", "Printer"],
    ),
    (
        "Outdoor",
        &["Grill", "Tent", "Lantern", "Cooler", "Hammock"],
    ),
];

/// Variants appended to each base name, with their price offset.
const VARIANTS: &[(&str, f64)] = &[
    ("Mini", 0.0),
    ("Standard", 10.0),
    ("Plus", 25.0),
    ("Pro", 40.0),
    ("Max", 60.0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = parse_count(&args[i + 1], count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storage Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: $STORAGE_DB_PATH or ./storage_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    let mut config = DbConfig::from_env("./storage_dev.db");
    if let Some(path) = db_path {
        config.database_path = path.into();
    }

    println!("Storage Seed Data Generator");
    println!("===========================");
    println!("Database: {}", config.database_path.display());
    println!("Products: {}", count);
    println!();

    let db = Database::new(config).await?;
    let products = db.products();

    println!("✓ Connected to database");

    let existing = products.count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let mut first: Option<Product> = None;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category, names)) in CATEGORIES.iter().enumerate() {
        for (name_idx, name) in names.iter().enumerate() {
            for (variant_idx, (variant, price_offset)) in VARIANTS.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let seed = category_idx * 100 + name_idx * 10 + variant_idx + generated;
                let product = generate_product(category, name, variant, *price_offset, seed);

                if let Err(e) = validate_product(&product) {
                    warn!(name = %product.name, error = %e, "Skipping invalid product");
                    continue;
                }

                match products.create(&product).await {
                    Ok(stored) => {
                        first.get_or_insert(stored);
                    }
                    Err(e) => {
                        eprintln!("Failed to insert {}: {}", product.name, e);
                        if e.is_unavailable() {
                            break 'outer;
                        }
                        continue;
                    }
                }

                generated += 1;

                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!(
        "  Rate: {:.0} products/second",
        generated as f64 / elapsed.as_secs_f64()
    );

    println!();
    println!("Verifying...");
    if let Some(first) = first {
        let found = products.find_by_name(&first.name).await?;
        println!(
            "  Lookup '{}': {}",
            first.name,
            if found.is_some() { "found" } else { "missing" }
        );

        // Restock the first product, bounded like a request handler would be.
        let restocked = Product {
            count: first.count + 10,
            ..first
        };
        validate_stored_product(&restocked)?;
        let deadline = Instant::now() + Duration::from_secs(5);
        products.update_with_deadline(deadline, &restocked).await?;
        println!("  Restocked '{}' to {}", restocked.name, restocked.count);
    }
    println!("  Total rows: {}", products.count().await?);

    db.close().await;

    println!();
    println!("✓ Seed complete!");
    info!(generated, "Seed finished");

    Ok(())
}

/// Used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,storage=debug,sqlx=warn";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    build_subscriber(filter).init();
}

fn build_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt().with_env_filter(filter).finish()
}

/// Parses a `--count` value, keeping `current` when it is not a number.
fn parse_count(raw: &str, current: usize) -> usize {
    match raw.parse() {
        Ok(n) => n,
        Err(_) => {
            warn!(value = %raw, "Ignoring invalid --count, using {}", current);
            current
        }
    }
}

/// Generates a single product with realistic data.
fn generate_product(
    category: &str,
    name: &str,
    variant: &str,
    price_offset: f64,
    seed: usize,
) -> Product {
    // Base price 1.99 - 39.99 plus the variant offset
    let base_cents = 199 + ((seed * 17) % 3800) as i64;
    let price = base_cents as f64 / 100.0 + price_offset;

    let count = (seed % 101) as i64;

    Product::new(format!("{} {}", name, variant), category, count, price)
}
