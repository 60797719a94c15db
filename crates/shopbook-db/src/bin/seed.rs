//! # Seed Data Generator
//!
//! Populates a development database with products, vendors and customers.
//!
//! ## Usage
//! ```bash
//! # Default database path (./shopbook_dev.db)
//! cargo run -p shopbook-db --bin seed
//!
//! # Custom amount of products
//! cargo run -p shopbook-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p shopbook-db --bin seed -- --db ./data/shopbook.db
//! ```

use chrono::Utc;
use std::env;
use tracing_subscriber::EnvFilter;

use shopbook_core::{Customer, Product, Vendor};
use shopbook_db::repository::generate_id;
use shopbook_db::{Database, DbConfig};

/// Product catalog for realistic test data: (category, unit, names).
const CATALOG: &[(&str, &str, &[&str])] = &[
    (
        "Beverages",
        "pcs",
        &[
            "Green Tea 500g",
            "Black Tea 250g",
            "Instant Coffee 200g",
            "Cola 1.5L",
            "Orange Squash 800ml",
            "Mineral Water 19L",
        ],
    ),
    (
        "Grocery",
        "kg",
        &[
            "Sugar",
            "Basmati Rice",
            "Wheat Flour",
            "Red Lentils",
            "Chickpeas",
            "Cooking Oil",
        ],
    ),
    (
        "Household",
        "pcs",
        &[
            "Dish Soap",
            "Laundry Detergent 1kg",
            "Matchboxes (pack)",
            "Candles (pack)",
            "Light Bulb 12W",
            "Broom",
        ],
    ),
];

const VENDORS: &[&str] = &[
    "Metro Wholesale",
    "City Traders",
    "Alamgir Distributors",
    "Pak Foods Supply",
];

const CUSTOMERS: &[(&str, &str)] = &[
    ("Ayesha Khan", "0300-1234567"),
    ("Bilal Ahmed", "0301-2345678"),
    ("Chaudhry Farooq", "0302-3456789"),
    ("Dua Fatima", "0303-4567890"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 100;
    let mut db_path = String::from("./shopbook_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(100);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shopbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 100)");
                println!("  -d, --db <PATH>    Database file path (default: ./shopbook_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Shopbook Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("* Connected to database");
    println!("* Migrations applied");

    // Refuse to double-seed
    let existing = db.products().count().await?;
    if existing > 0 {
        println!("! Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating data...");

    let mut generated = 0;
    'outer: for (category, unit, names) in CATALOG {
        for (idx, name) in names.iter().enumerate() {
            if generated >= count {
                break 'outer;
            }
            let product = generate_product(category, unit, name, idx);
            db.products().insert(&product).await?;
            generated += 1;
        }
    }

    for name in VENDORS {
        let now = Utc::now();
        let vendor = Vendor {
            id: generate_id(),
            name: name.to_string(),
            phone_number: None,
            total_purchases_cents: 0,
            amount_paid_cents: 0,
            balance_cents: 0,
            created_at: now,
            updated_at: now,
        };
        db.vendors().insert(&vendor).await?;
    }

    for (name, phone) in CUSTOMERS {
        let now = Utc::now();
        let customer = Customer {
            id: generate_id(),
            name: name.to_string(),
            phone_number: phone.to_string(),
            balance_cents: 0,
            total_sales_cents: 0,
            amount_paid_cents: 0,
            created_at: now,
            updated_at: now,
        };
        db.customers().insert(&customer).await?;
    }

    println!("* Generated {} products", generated);
    println!("* Generated {} vendors", VENDORS.len());
    println!("* Generated {} customers", CUSTOMERS.len());

    let matches = db.products().search("tea", 10).await?;
    println!();
    println!("Search 'tea': {} results", matches.len());

    println!();
    println!("Seed complete!");

    Ok(())
}

/// Generates a single product with deterministic pseudo-random numbers.
fn generate_product(category: &str, unit: &str, name: &str, seed: usize) -> Product {
    let now = Utc::now();

    // Cost 10.00 - 89.00, price at a 25-45% markup
    let cost_cents = 1_000 + ((seed * 37) % 80) as i64 * 100;
    let markup_pct = 25 + (seed % 20) as i64;
    let price_cents = cost_cents + cost_cents * markup_pct / 100;

    Product {
        id: generate_id(),
        name: name.to_string(),
        category: category.to_string(),
        unit: unit.to_string(),
        quantity: ((seed * 13) % 60) as i64,
        low_stock_threshold: 5,
        cost_cents,
        price_cents,
        created_at: now,
        updated_at: now,
    }
}
