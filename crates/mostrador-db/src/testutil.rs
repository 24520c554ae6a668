//! Shared test fixtures: an in-memory database seeded with the reference
//! data every engine test needs.

use crate::pool::{Database, DbConfig};
use crate::repository::product::NewProduct;
use mostrador_core::{
    InboundLine, InboundRequest, MovementDirection, Role,
};

/// A freshly migrated in-memory database.
pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

/// An in-memory database plus the ids of the seeded reference rows.
pub struct Fixture {
    pub db: Database,
    pub admin_id: i64,
    pub cashier_id: i64,
    pub warehouse_id: i64,
    pub cash_method_id: i64,
    pub category_id: i64,
    pub unit_id: i64,
    pub purchase_type_id: i64,
    pub sale_type_id: i64,
    pub shrinkage_type_id: i64,
}

/// Seeds the reference data a store needs before it can trade.
pub async fn seeded_db() -> Fixture {
    let db = test_db().await;

    let admin_id = db
        .users()
        .create("admin", "admin-pw", Role::Administrator)
        .await
        .expect("seed admin");
    let cashier_id = db
        .users()
        .create("caja1", "caja1-pw", Role::Cashier)
        .await
        .expect("seed cashier");

    let catalog = db.catalog();
    let warehouse_id = catalog.insert_warehouse("BODEGA CENTRAL").await.expect("warehouse");
    let cash_method_id = catalog.insert_payment_method("EFECTIVO").await.expect("payment method");
    let category_id = catalog.insert_category("ABARROTES").await.expect("category");
    let unit_id = catalog.insert_unit("PIEZA", "PZA").await.expect("unit");

    let purchase_type_id = catalog
        .insert_movement_type("COMPRA A PROVEEDOR", MovementDirection::Entrada, "C")
        .await
        .expect("purchase type");
    let sale_type_id = catalog
        .insert_movement_type("VENTA DE MERCANCIA", MovementDirection::Salida, "V")
        .await
        .expect("sale type");
    let shrinkage_type_id = catalog
        .insert_movement_type("MERMA", MovementDirection::Salida, "M")
        .await
        .expect("shrinkage type");

    Fixture {
        db,
        admin_id,
        cashier_id,
        warehouse_id,
        cash_method_id,
        category_id,
        unit_id,
        purchase_type_id,
        sale_type_id,
        shrinkage_type_id,
    }
}

impl Fixture {
    /// Adds a product to the catalog with zero stock.
    pub async fn add_product(&self, description: &str, sale_price_cents: i64) -> i64 {
        self.db
            .products()
            .insert(&NewProduct::new(
                description,
                self.unit_id,
                self.category_id,
                sale_price_cents,
                self.admin_id,
            ))
            .await
            .expect("seed product")
    }

    /// Puts stock on the shelf through the movement engine, the same path
    /// production inbound takes.
    pub async fn receive_stock(&self, product_id: i64, quantity: i64, unit_cost_cents: i64) {
        let request = InboundRequest {
            movement_type_id: self.purchase_type_id,
            supplier_id: None,
            warehouse_id: self.warehouse_id,
            invoice_number: None,
            note: String::new(),
            lines: vec![InboundLine {
                product_id,
                quantity,
                unit_cost_cents,
                total_cost_cents: quantity * unit_cost_cents,
            }],
        };

        self.db
            .movement_engine()
            .register_inbound(request)
            .await
            .expect("seed stock");
    }
}
