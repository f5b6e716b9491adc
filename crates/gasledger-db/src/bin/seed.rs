//! # Seed Data Generator
//!
//! Populates the database with demo items, customers and ledger records
//! for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p gasledger-db --bin seed
//!
//! # Specify database path and owner
//! cargo run -p gasledger-db --bin seed -- --db ./data/gasledger.db --owner shop-1
//!
//! # Number of days of ledger history to generate
//! cargo run -p gasledger-db --bin seed -- --days 60
//! ```

use std::env;

use chrono::{Datelike, Duration, Utc};
use tracing::info;

use gasledger_core::{Identity, NewCustomer, NewItem, NewTransactionRecord};
use gasledger_db::{Database, DbConfig};

/// Cylinder variants stocked by a typical shop:
/// (name, net weight kg, buy cents, sell cents, initial stock)
const ITEMS: &[(&str, f64, i64, i64, i64)] = &[
    ("5kg Portable Cylinder", 5.0, 42_500, 55_000, 40),
    ("12kg Domestic Cylinder", 12.0, 84_000, 108_000, 60),
    ("14.2kg Domestic Cylinder", 14.2, 99_400, 127_800, 80),
    ("19kg Commercial Cylinder", 19.0, 133_000, 180_500, 30),
    ("47.5kg Industrial Cylinder", 47.5, 308_750, 427_500, 12),
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Asha Traders", "98401-22334"),
    ("Blue Flame Hotel", "98411-55667"),
    ("Corner Tea Stall", "98422-88990"),
    ("Deepak Residency", "98433-11223"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./gasledger_dev.db");
    let mut owner = String::from("demo-owner");
    let mut days: i64 = 30;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    owner = args[i + 1].clone();
                    i += 1;
                }
            }
            "--days" => {
                if i + 1 < args.len() {
                    days = args[i + 1].parse().unwrap_or(30);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Gasledger Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./gasledger_dev.db)");
                println!("  -o, --owner <ID>    Owner id to tag rows with (default: demo-owner)");
                println!("      --days <N>      Days of ledger history (default: 30)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Gasledger Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!("Owner:    {}", owner);
    println!("History:  {} days", days);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let who = Identity::new(owner);

    println!("✓ Connected to database, migrations applied");

    let existing = db.items().count(&who).await?;
    if existing > 0 {
        println!("⚠ Database already has {} items for this owner", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Items
    for (name, weight_kg, buy, sell, stock) in ITEMS {
        let item = db
            .items()
            .insert(
                &who,
                NewItem {
                    name: name.to_string(),
                    weight_kg: *weight_kg,
                    buy_price_cents: *buy,
                    sell_price_cents: *sell,
                    stock: *stock,
                },
            )
            .await?;
        info!(id = %item.id, name = %item.name, stock = item.stock, "Seeded item");
    }
    println!("✓ Seeded {} items", ITEMS.len());

    // Customers
    for (name, phone) in CUSTOMERS {
        db.customers()
            .insert(
                &who,
                NewCustomer {
                    name: name.to_string(),
                    phone: Some(phone.to_string()),
                    address: None,
                },
            )
            .await?;
    }
    println!("✓ Seeded {} customers", CUSTOMERS.len());

    // Ledger history: a few weighed movements per day, deterministic
    // but varied enough to make the dashboards interesting.
    let today = Utc::now().date_naive();
    let mut records = 0usize;
    for day_offset in 0..days {
        let date = today - Duration::days(day_offset);
        for (slot, (name, weight_kg, buy, sell, _)) in ITEMS.iter().enumerate() {
            // Skip some slots so days differ
            if (day_offset as usize + slot) % 3 == 0 {
                continue;
            }
            let units = 1 + ((day_offset as usize + slot) % 4) as i64;
            db.transactions()
                .insert(
                    &who,
                    NewTransactionRecord {
                        date,
                        product_name: name.to_string(),
                        weight_kg: weight_kg * units as f64,
                        buy_price_per_kg_cents: buy / (*weight_kg as i64).max(1),
                        sell_price_per_kg_cents: sell / (*weight_kg as i64).max(1),
                    },
                )
                .await?;
            records += 1;
        }
    }
    println!("✓ Seeded {} ledger records", records);

    // Show what a dashboard would see
    let summary = db
        .reports(who.clone())
        .summarize_month(today.year(), today.month())
        .await?;
    println!();
    println!("This month so far:");
    println!("  records: {}", summary.count);
    println!("  weight:  {:.1} kg", summary.total_weight_kg);
    println!("  buy:     {}", summary.total_buy);
    println!("  sell:    {}", summary.total_sell);
    println!("  profit:  {}", summary.total_profit);
    println!();
    println!("As JSON (what a dashboard endpoint would return):");
    println!("{}", serde_json::to_string_pretty(&summary)?);

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
