//! # Sale Engine
//!
//! Turns a validated cart into an invoice plus the matching outbound
//! movement, atomically.
//!
//! ## What One Sale Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  process_sale(request)                                                  │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   ├── payment method exists?                                            │
//! │   ├── per line: warehouse stock ≥ requested?                            │
//! │   │     (every short line is collected; the error carries them ALL)     │
//! │   ├── sale movement type configured? (SALIDA + VENTA)                   │
//! │   ├── INSERT invoices            (total, tendered, change)              │
//! │   ├── INSERT movements           (the sale's outbound twin)             │
//! │   └── per line:                                                         │
//! │        ├── INSERT invoice_lines  (price the customer paid)              │
//! │        ├── INSERT movement_lines (costed at current average cost)       │
//! │        ├── UPDATE products       (quantity_on_hand -= qty)              │
//! │        └── UPSERT warehouse_stock(quantity -= qty)                      │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The average cost never moves on a sale; only inbound movements reprice
//! the catalog.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::engine::EngineResult;
use crate::error::DbError;
use crate::repository::{catalog, invoice, movement, product, stock};
use mostrador_core::{
    change_due, validation, CoreError, Money, SaleReceipt, SaleRequest, StockShortage,
};

/// Processes sales as single transactions.
#[derive(Debug, Clone)]
pub struct SaleEngine {
    pool: SqlitePool,
}

impl SaleEngine {
    /// Creates a new SaleEngine.
    pub fn new(pool: SqlitePool) -> Self {
        SaleEngine { pool }
    }

    /// Processes one sale.
    ///
    /// ## Arguments
    /// * `request` - Cart lines, payment, and the acting cashier
    ///
    /// ## Returns
    /// A receipt with the invoice id, the total, and the change due.
    ///
    /// ## Errors
    /// * Validation - empty cart, out-of-range quantity, missing payment
    ///   method id
    /// * InsufficientStock - any line short; carries every short product
    /// * Configuration - no sale movement type in the catalog
    /// * NotFound - unknown product or payment method
    ///
    /// On any error the transaction is dropped and nothing is written.
    pub async fn process_sale(&self, request: SaleRequest) -> EngineResult<SaleReceipt> {
        validation::validate_cart(&request.lines).map_err(CoreError::from)?;
        validation::validate_note(&request.note).map_err(CoreError::from)?;
        let payment_method_id =
            validation::validate_payment_method(request.payment_method_id)
                .map_err(CoreError::from)?;

        // The total is the sum of the client-computed subtotals.
        let total = validation::cart_total(&request.lines);
        let tendered = Money::from_cents(request.tendered_cents);
        let change = change_due(total, tendered);

        debug!(
            cashier_id = request.cashier_id,
            lines = request.lines.len(),
            total = %total,
            "Processing sale"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let method = catalog::payment_method_by_id(&mut *tx, payment_method_id).await?;
        if method.is_none() {
            return Err(CoreError::not_found("PaymentMethod", payment_method_id).into());
        }

        // Stock check for the whole cart before any write. Short lines are
        // collected rather than failing fast so the caller can report the
        // complete list in one round trip. Quantities already claimed by
        // earlier lines of this cart count against later lines, so a cart
        // repeating one product cannot combine past the on-hand quantity.
        let mut shortages: Vec<StockShortage> = Vec::new();
        let mut states = Vec::with_capacity(request.lines.len());
        let mut claimed: HashMap<i64, i64> = HashMap::new();

        for line in &request.lines {
            let state = product::stock_state(&mut *tx, line.product_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Product", line.product_id))?;

            let on_hand =
                stock::stock_on_hand(&mut *tx, line.product_id, request.warehouse_id).await?;
            let available = on_hand - claimed.get(&line.product_id).copied().unwrap_or(0);

            if available < line.quantity {
                shortages.push(StockShortage {
                    product_id: line.product_id,
                    description: state.description.clone(),
                    available,
                    requested: line.quantity,
                });
            }

            *claimed.entry(line.product_id).or_insert(0) += line.quantity;
            states.push(state);
        }

        if !shortages.is_empty() {
            return Err(CoreError::InsufficientStock { shortages }.into());
        }

        let sale_type = catalog::find_sale_movement_type(&mut *tx)
            .await?
            .ok_or_else(|| {
                CoreError::Configuration(
                    "no sale movement type (direction SALIDA, description VENTA) in catalog"
                        .to_string(),
                )
            })?;

        let now = Utc::now();

        let invoice_id = invoice::insert_invoice(
            &mut *tx,
            total.cents(),
            request.tendered_cents,
            change.cents(),
            payment_method_id,
            &request.note,
            request.cashier_id,
            now,
        )
        .await?;

        let movement_id = movement::insert_movement(
            &mut *tx,
            sale_type.id,
            None,
            None,
            request.warehouse_id,
            &request.note,
            now,
        )
        .await?;

        for (line, state) in request.lines.iter().zip(&states) {
            invoice::insert_invoice_line(
                &mut *tx,
                invoice_id,
                line.product_id,
                line.quantity,
                line.unit_price_cents,
                line.subtotal_cents,
            )
            .await?;

            // The movement line records what the goods cost the store,
            // not what the customer paid.
            let unit_cost = state.average_cost_cents;
            movement::insert_movement_line(
                &mut *tx,
                movement_id,
                line.product_id,
                line.quantity,
                unit_cost,
                unit_cost * line.quantity,
            )
            .await?;

            product::apply_quantity_delta(&mut *tx, line.product_id, -line.quantity).await?;
            stock::adjust_stock(&mut *tx, line.product_id, request.warehouse_id, -line.quantity)
                .await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            invoice_id,
            total = %total,
            change = %change,
            "Sale processed"
        );

        Ok(SaleReceipt {
            invoice_id,
            total_cents: total.cents(),
            change_cents: change.cents(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::testutil::{seeded_db, Fixture};
    use mostrador_core::{CartLine, InboundLine, InboundRequest, ValidationError};

    fn cart_line(product_id: i64, quantity: i64, unit_price_cents: i64) -> CartLine {
        CartLine {
            product_id,
            quantity,
            unit_price_cents,
            subtotal_cents: quantity * unit_price_cents,
        }
    }

    fn sale_request(fixture: &Fixture, tendered_cents: i64, lines: Vec<CartLine>) -> SaleRequest {
        SaleRequest {
            cashier_id: fixture.cashier_id,
            warehouse_id: fixture.warehouse_id,
            payment_method_id: Some(fixture.cash_method_id),
            tendered_cents,
            note: String::new(),
            lines,
        }
    }

    #[tokio::test]
    async fn sale_produces_invoice_movement_and_stock_decrement() {
        let fixture = seeded_db().await;
        let cola = fixture.add_product("REFRESCO COLA 600ML", 1000).await;
        fixture.receive_stock(cola, 10, 500).await;

        let receipt = fixture
            .db
            .sale_engine()
            .process_sale(sale_request(&fixture, 2500, vec![cart_line(cola, 2, 1000)]))
            .await
            .unwrap();

        assert_eq!(receipt.total_cents, 2000);
        assert_eq!(receipt.change_cents, 500);

        let invoice = fixture
            .db
            .invoices()
            .get_by_id(receipt.invoice_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(invoice.total_cents, 2000);
        assert_eq!(invoice.tendered_cents, 2500);
        assert_eq!(invoice.change_cents, 500);
        assert_eq!(invoice.cashier_id, fixture.cashier_id);

        let lines = fixture.db.invoices().lines(receipt.invoice_id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(lines[0].subtotal_cents, 2000);

        // Both stock views move in lockstep.
        let product = fixture.db.products().get_by_id(cola).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 8);
        let ledger = fixture
            .db
            .stock()
            .lookup(cola, fixture.warehouse_id)
            .await
            .unwrap();
        assert_eq!(ledger, 8);

        // The sale left an outbound movement costed at average cost.
        let movements = fixture.db.movements().recent(10).await.unwrap();
        assert_eq!(movements.len(), 2); // seed inbound + the sale
        let sale_movement = &movements[0];
        assert_eq!(sale_movement.movement_type_id, fixture.sale_type_id);
        let movement_lines = fixture.db.movements().lines(sale_movement.id).await.unwrap();
        assert_eq!(movement_lines[0].unit_cost_cents, 500);
        assert_eq!(movement_lines[0].total_cost_cents, 1000);
    }

    #[tokio::test]
    async fn tendered_below_total_yields_zero_change() {
        let fixture = seeded_db().await;
        let bread = fixture.add_product("PAN BLANCO", 3000).await;
        fixture.receive_stock(bread, 5, 1500).await;

        let receipt = fixture
            .db
            .sale_engine()
            .process_sale(sale_request(&fixture, 1000, vec![cart_line(bread, 1, 3000)]))
            .await
            .unwrap();

        assert_eq!(receipt.total_cents, 3000);
        assert_eq!(receipt.change_cents, 0);
    }

    #[tokio::test]
    async fn oversell_is_rejected_with_full_shortage_report() {
        let fixture = seeded_db().await;
        let cola = fixture.add_product("REFRESCO COLA 600ML", 1000).await;
        let bread = fixture.add_product("PAN BLANCO", 3000).await;
        fixture.receive_stock(cola, 3, 500).await;
        fixture.receive_stock(bread, 1, 1500).await;

        let result = fixture
            .db
            .sale_engine()
            .process_sale(sale_request(
                &fixture,
                10_000,
                vec![cart_line(cola, 5, 1000), cart_line(bread, 2, 3000)],
            ))
            .await;

        match result {
            Err(EngineError::Core(CoreError::InsufficientStock { shortages })) => {
                assert_eq!(shortages.len(), 2);
                assert_eq!(shortages[0].available, 3);
                assert_eq!(shortages[0].requested, 5);
                assert_eq!(shortages[1].available, 1);
                assert_eq!(shortages[1].requested, 2);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // Nothing was written.
        let product = fixture.db.products().get_by_id(cola).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 3);
        assert!(fixture.db.invoices().recent(10, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_cart_lines_cannot_combine_past_available_stock() {
        let fixture = seeded_db().await;
        let cola = fixture.add_product("REFRESCO COLA 600ML", 1000).await;
        fixture.receive_stock(cola, 3, 500).await;

        // Each line fits on its own; together they ask for 4 of 3.
        let result = fixture
            .db
            .sale_engine()
            .process_sale(sale_request(
                &fixture,
                10_000,
                vec![cart_line(cola, 2, 1000), cart_line(cola, 2, 1000)],
            ))
            .await;

        match result {
            Err(EngineError::Core(CoreError::InsufficientStock { shortages })) => {
                assert_eq!(shortages.len(), 1);
                assert_eq!(shortages[0].product_id, cola);
                // The first line already claimed 2 of the 3 on hand.
                assert_eq!(shortages[0].available, 1);
                assert_eq!(shortages[0].requested, 2);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let product = fixture.db.products().get_by_id(cola).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 3);
        assert!(fixture.db.invoices().recent(10, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn warehouses_are_checked_and_decremented_in_isolation() {
        let fixture = seeded_db().await;
        let cola = fixture.add_product("REFRESCO COLA 600ML", 1000).await;
        let branch_id = fixture
            .db
            .catalog()
            .insert_warehouse("BODEGA SUCURSAL")
            .await
            .unwrap();

        fixture.receive_stock(cola, 10, 500).await;
        fixture
            .db
            .movement_engine()
            .register_inbound(InboundRequest {
                movement_type_id: fixture.purchase_type_id,
                supplier_id: None,
                warehouse_id: branch_id,
                invoice_number: None,
                note: String::new(),
                lines: vec![InboundLine {
                    product_id: cola,
                    quantity: 4,
                    unit_cost_cents: 500,
                    total_cost_cents: 2000,
                }],
            })
            .await
            .unwrap();

        // 14 exist overall, but the branch only holds 4.
        let mut oversell = sale_request(&fixture, 10_000, vec![cart_line(cola, 6, 1000)]);
        oversell.warehouse_id = branch_id;
        match fixture.db.sale_engine().process_sale(oversell).await {
            Err(EngineError::Core(CoreError::InsufficientStock { shortages })) => {
                assert_eq!(shortages[0].available, 4);
                assert_eq!(shortages[0].requested, 6);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // A sale that fits drains only the branch's row.
        let mut sale = sale_request(&fixture, 10_000, vec![cart_line(cola, 3, 1000)]);
        sale.warehouse_id = branch_id;
        fixture.db.sale_engine().process_sale(sale).await.unwrap();

        let stock = fixture.db.stock();
        assert_eq!(stock.lookup(cola, fixture.warehouse_id).await.unwrap(), 10);
        assert_eq!(stock.lookup(cola, branch_id).await.unwrap(), 1);

        let rows = stock.rows_for_product(cola).await.unwrap();
        assert_eq!(rows.len(), 2);
        let branch_rows = stock.rows_for_warehouse(branch_id).await.unwrap();
        assert_eq!(branch_rows.len(), 1);
        assert_eq!(branch_rows[0].quantity, 1);

        // The denormalized total equals the ledger sum across warehouses.
        assert_eq!(stock.total_for_product(cola).await.unwrap(), 11);
        let product = fixture.db.products().get_by_id(cola).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 11);
    }

    #[tokio::test]
    async fn product_without_ledger_row_counts_as_zero_stock() {
        let fixture = seeded_db().await;
        let ghost = fixture.add_product("PRODUCTO SIN EXISTENCIAS", 1000).await;

        let result = fixture
            .db
            .sale_engine()
            .process_sale(sale_request(&fixture, 1000, vec![cart_line(ghost, 1, 1000)]))
            .await;

        match result {
            Err(EngineError::Core(CoreError::InsufficientStock { shortages })) => {
                assert_eq!(shortages[0].available, 0);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_before_touching_the_database() {
        let fixture = seeded_db().await;

        let result = fixture
            .db
            .sale_engine()
            .process_sale(sale_request(&fixture, 1000, vec![]))
            .await;

        assert!(matches!(
            result,
            Err(EngineError::Core(CoreError::Validation(
                ValidationError::EmptyBatch { .. }
            )))
        ));
    }

    #[tokio::test]
    async fn missing_payment_method_id_is_a_validation_error() {
        let fixture = seeded_db().await;
        let cola = fixture.add_product("REFRESCO COLA 600ML", 1000).await;
        fixture.receive_stock(cola, 10, 500).await;

        let mut request = sale_request(&fixture, 1000, vec![cart_line(cola, 1, 1000)]);
        request.payment_method_id = None;

        let result = fixture.db.sale_engine().process_sale(request).await;

        assert!(matches!(
            result,
            Err(EngineError::Core(CoreError::Validation(
                ValidationError::Required { .. }
            )))
        ));
    }

    #[tokio::test]
    async fn sale_without_configured_sale_type_is_a_configuration_error() {
        let fixture = seeded_db().await;
        let cola = fixture.add_product("REFRESCO COLA 600ML", 1000).await;
        fixture.receive_stock(cola, 10, 500).await;

        // Repoint the only SALIDA/VENTA type's description so lookup fails.
        sqlx::query("UPDATE movement_types SET description = 'SALIDA GENERICA' WHERE id = ?1")
            .bind(fixture.sale_type_id)
            .execute(fixture.db.pool())
            .await
            .unwrap();

        let result = fixture
            .db
            .sale_engine()
            .process_sale(sale_request(&fixture, 1000, vec![cart_line(cola, 1, 1000)]))
            .await;

        assert!(matches!(
            result,
            Err(EngineError::Core(CoreError::Configuration(_)))
        ));

        // The rejected sale left no partial writes behind.
        let product = fixture.db.products().get_by_id(cola).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 10);
    }
}
