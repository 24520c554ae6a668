//! # Seed Data Generator
//!
//! Populates a development database with the reference data and a small
//! catalog so the system is usable straight away.
//!
//! ## Usage
//! ```bash
//! # Seed the default database file
//! cargo run -p mostrador-db --bin seed
//!
//! # Specify database path
//! cargo run -p mostrador-db --bin seed -- --db ./data/mostrador.db
//! ```
//!
//! ## What Gets Created
//! - Users: `admin` / `admin` (administrator), `caja1` / `caja1` (cashier)
//! - Catalog: categories, units, a warehouse, payment methods
//! - Movement types: COMPRA A PROVEEDOR (C), VENTA DE MERCANCIA (V),
//!   DEVOLUCION DE CLIENTE (D), MERMA (M), DEVOLUCION A PROVEEDOR (R)
//! - A grocery-store product list with initial stock received through the
//!   movement engine, so average costs are real
//!
//! Seeding into a non-empty database is refused.

use std::env;

use mostrador_core::{InboundLine, InboundRequest, MovementDirection, Role};
use mostrador_db::repository::product::NewProduct;
use mostrador_db::{Database, DbConfig};

/// (description, sale price cents, unit cost cents, initial stock)
const PRODUCTS: &[(&str, i64, i64, i64)] = &[
    ("REFRESCO COLA 600ML", 1800, 1100, 48),
    ("REFRESCO NARANJA 600ML", 1700, 1000, 36),
    ("AGUA PURIFICADA 1L", 1200, 600, 60),
    ("JUGO DE MANZANA 1L", 2500, 1600, 24),
    ("LECHE ENTERA 1L", 2600, 1900, 30),
    ("PAN BLANCO GRANDE", 4200, 2800, 15),
    ("ARROZ 1KG", 3400, 2300, 40),
    ("FRIJOL NEGRO 1KG", 3800, 2600, 35),
    ("AZUCAR ESTANDAR 1KG", 3200, 2200, 40),
    ("SAL DE MESA 1KG", 1500, 800, 25),
    ("ACEITE VEGETAL 1L", 5200, 3900, 20),
    ("PASTA ESPAGUETI 500G", 1900, 1100, 45),
    ("ATUN EN LATA 140G", 2400, 1600, 50),
    ("GALLETAS SURTIDAS 500G", 4500, 3000, 18),
    ("PAPEL HIGIENICO 4 ROLLOS", 3900, 2500, 30),
    ("JABON DE TOCADOR", 1600, 900, 40),
    ("DETERGENTE EN POLVO 1KG", 4800, 3400, 22),
    ("CAFE SOLUBLE 100G", 6800, 4900, 16),
    ("HUEVO BLANCO 12 PIEZAS", 4400, 3500, 25),
    ("TORTILLAS DE MAIZ 1KG", 2400, 1700, 20),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./mostrador_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Mostrador POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./mostrador_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Mostrador POS Seed Data Generator");
    println!("====================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count_active().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Users
    let admin_id = db.users().create("admin", "admin", Role::Administrator).await?;
    db.users().create("caja1", "caja1", Role::Cashier).await?;
    println!("✓ Users: admin / caja1");

    // Catalog reference data
    let catalog = db.catalog();

    let warehouse_id = catalog.insert_warehouse("BODEGA CENTRAL").await?;
    catalog.insert_payment_method("EFECTIVO").await?;
    catalog.insert_payment_method("TARJETA").await?;
    catalog.insert_payment_method("TRANSFERENCIA").await?;

    let category_id = catalog.insert_category("ABARROTES").await?;
    catalog.insert_category("BEBIDAS").await?;
    catalog.insert_category("LIMPIEZA").await?;

    let unit_id = catalog.insert_unit("PIEZA", "PZA").await?;
    catalog.insert_unit("KILOGRAMO", "KG").await?;
    catalog.insert_unit("LITRO", "LT").await?;

    let purchase_type_id = catalog
        .insert_movement_type("COMPRA A PROVEEDOR", MovementDirection::Entrada, "C")
        .await?;
    catalog
        .insert_movement_type("VENTA DE MERCANCIA", MovementDirection::Salida, "V")
        .await?;
    catalog
        .insert_movement_type("DEVOLUCION DE CLIENTE", MovementDirection::Entrada, "D")
        .await?;
    catalog
        .insert_movement_type("MERMA", MovementDirection::Salida, "M")
        .await?;
    catalog
        .insert_movement_type("DEVOLUCION A PROVEEDOR", MovementDirection::Salida, "R")
        .await?;

    println!("✓ Catalog reference data");

    // Products with initial stock received through the movement engine,
    // one inbound movement for the whole opening inventory.
    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut lines = Vec::with_capacity(PRODUCTS.len());

    for (description, sale_price_cents, unit_cost_cents, initial_stock) in PRODUCTS {
        let mut new = NewProduct::new(
            *description,
            unit_id,
            category_id,
            *sale_price_cents,
            admin_id,
        );
        new.min_stock = 10;

        let product_id = db.products().insert(&new).await?;

        lines.push(InboundLine {
            product_id,
            quantity: *initial_stock,
            unit_cost_cents: *unit_cost_cents,
            total_cost_cents: initial_stock * unit_cost_cents,
        });
    }

    let movement_id = db
        .movement_engine()
        .register_inbound(InboundRequest {
            movement_type_id: purchase_type_id,
            supplier_id: None,
            warehouse_id,
            invoice_number: Some("INICIAL-0001".to_string()),
            note: "Inventario inicial".to_string(),
            lines,
        })
        .await?;

    let elapsed = start.elapsed();
    println!("✓ {} products stocked (movement #{movement_id}) in {:?}", PRODUCTS.len(), elapsed);

    // Sanity checks against the freshly seeded data
    let valuation = db.reports().inventory_valuation().await?;
    println!("  Inventory valuation: {} lines, {} total", valuation.lines.len(), valuation.total());

    let sellable = db.products().list_sellable(50).await?;
    println!("  Sellable products: {}", sellable.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
