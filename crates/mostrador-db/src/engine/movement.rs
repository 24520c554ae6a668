//! # Movement Engine
//!
//! Registers inbound and outbound stock movements, atomically.
//!
//! ## Direction Is a Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register_inbound          requires a movement type with ENTRADA        │
//! │  register_outbound         requires a movement type with SALIDA         │
//! │                                                                         │
//! │  A mismatch fails the whole batch with InvalidMovementType before       │
//! │  any row is written.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cost Basis Moves Only on Entries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register_inbound, per line and in input order:                         │
//! │                                                                         │
//! │    new_cost = (prior_qty × prior_cost + qty × unit_cost)                │
//! │               ─────────────────────────────────────────                 │
//! │                          prior_qty + qty                                │
//! │                                                                         │
//! │    (prior_qty ≤ 0 → new_cost = unit_cost: the incoming batch IS         │
//! │     the inventory)                                                      │
//! │                                                                         │
//! │  Later lines for the same product see the updated quantity and cost     │
//! │  from earlier lines.                                                    │
//! │                                                                         │
//! │  register_outbound never touches average_cost_cents.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::engine::EngineResult;
use crate::error::DbError;
use crate::repository::{catalog, movement, product, stock};
use mostrador_core::{
    validation, weighted_average_cost, CoreError, InboundRequest, Money, MovementDirection,
    OutboundRequest, StockShortage,
};

/// Registers stock movements as single transactions.
#[derive(Debug, Clone)]
pub struct MovementEngine {
    pool: SqlitePool,
}

impl MovementEngine {
    /// Creates a new MovementEngine.
    pub fn new(pool: SqlitePool) -> Self {
        MovementEngine { pool }
    }

    /// Registers an inbound (stock-in) movement.
    ///
    /// ## Returns
    /// The id of the new movement.
    ///
    /// ## Errors
    /// * Validation - empty batch, non-positive quantity or cost
    /// * NotFound - unknown movement type or product
    /// * InvalidMovementType - the type's direction is SALIDA
    pub async fn register_inbound(&self, request: InboundRequest) -> EngineResult<i64> {
        validation::validate_inbound_lines(&request.lines).map_err(CoreError::from)?;
        validation::validate_note(&request.note).map_err(CoreError::from)?;

        debug!(
            movement_type_id = request.movement_type_id,
            lines = request.lines.len(),
            "Registering inbound movement"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let movement_type = catalog::movement_type_by_id(&mut *tx, request.movement_type_id)
            .await?
            .ok_or_else(|| CoreError::not_found("MovementType", request.movement_type_id))?;

        if movement_type.direction != MovementDirection::Entrada {
            return Err(CoreError::InvalidMovementType {
                movement_type_id: movement_type.id,
                expected: MovementDirection::Entrada,
                actual: movement_type.direction,
            }
            .into());
        }

        let now = Utc::now();

        let movement_id = movement::insert_movement(
            &mut *tx,
            movement_type.id,
            request.supplier_id,
            request.invoice_number.as_deref(),
            request.warehouse_id,
            &request.note,
            now,
        )
        .await?;

        for line in &request.lines {
            // Pre-update state; earlier lines in this batch are already
            // reflected here.
            let state = product::stock_state(&mut *tx, line.product_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Product", line.product_id))?;

            movement::insert_movement_line(
                &mut *tx,
                movement_id,
                line.product_id,
                line.quantity,
                line.unit_cost_cents,
                line.total_cost_cents,
            )
            .await?;

            let new_cost = weighted_average_cost(
                state.quantity_on_hand,
                Money::from_cents(state.average_cost_cents),
                line.quantity,
                Money::from_cents(line.unit_cost_cents),
            );

            product::apply_inbound_line(&mut *tx, line.product_id, line.quantity, new_cost.cents())
                .await?;
            stock::adjust_stock(&mut *tx, line.product_id, request.warehouse_id, line.quantity)
                .await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(movement_id, lines = request.lines.len(), "Inbound movement registered");

        Ok(movement_id)
    }

    /// Registers an outbound (stock-out) movement.
    ///
    /// The whole batch is checked against warehouse stock before anything
    /// is written; a rejection carries every short product.
    ///
    /// ## Returns
    /// The id of the new movement.
    ///
    /// ## Errors
    /// * Validation - empty batch, non-positive quantity
    /// * NotFound - unknown movement type or product
    /// * InvalidMovementType - the type's direction is ENTRADA
    /// * InsufficientStock - any line short
    pub async fn register_outbound(&self, request: OutboundRequest) -> EngineResult<i64> {
        validation::validate_outbound_lines(&request.lines).map_err(CoreError::from)?;
        validation::validate_note(&request.note).map_err(CoreError::from)?;

        debug!(
            movement_type_id = request.movement_type_id,
            lines = request.lines.len(),
            "Registering outbound movement"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let movement_type = catalog::movement_type_by_id(&mut *tx, request.movement_type_id)
            .await?
            .ok_or_else(|| CoreError::not_found("MovementType", request.movement_type_id))?;

        if movement_type.direction != MovementDirection::Salida {
            return Err(CoreError::InvalidMovementType {
                movement_type_id: movement_type.id,
                expected: MovementDirection::Salida,
                actual: movement_type.direction,
            }
            .into());
        }

        // Same cumulative pre-check as the sale engine: earlier lines of
        // this batch claim stock against later lines for the same product.
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

        let now = Utc::now();

        let movement_id = movement::insert_movement(
            &mut *tx,
            movement_type.id,
            None,
            None,
            request.warehouse_id,
            &request.note,
            now,
        )
        .await?;

        for (line, state) in request.lines.iter().zip(&states) {
            // Outbound lines are valued at the current average cost;
            // the cost basis itself does not move.
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

        info!(movement_id, lines = request.lines.len(), "Outbound movement registered");

        Ok(movement_id)
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
    use mostrador_core::{InboundLine, OutboundLine, ValidationError};

    fn inbound(
        fixture: &Fixture,
        lines: Vec<InboundLine>,
    ) -> InboundRequest {
        InboundRequest {
            movement_type_id: fixture.purchase_type_id,
            supplier_id: None,
            warehouse_id: fixture.warehouse_id,
            invoice_number: None,
            note: String::new(),
            lines,
        }
    }

    fn inbound_line(product_id: i64, quantity: i64, unit_cost_cents: i64) -> InboundLine {
        InboundLine {
            product_id,
            quantity,
            unit_cost_cents,
            total_cost_cents: quantity * unit_cost_cents,
        }
    }

    fn outbound(fixture: &Fixture, lines: Vec<OutboundLine>) -> OutboundRequest {
        OutboundRequest {
            movement_type_id: fixture.shrinkage_type_id,
            warehouse_id: fixture.warehouse_id,
            note: String::new(),
            lines,
        }
    }

    fn outbound_line(product_id: i64, quantity: i64) -> OutboundLine {
        OutboundLine {
            product_id,
            quantity,
            unit_cost_cents: 0,
            total_cost_cents: 0,
        }
    }

    #[tokio::test]
    async fn first_entry_into_empty_stock_takes_the_incoming_cost() {
        let fixture = seeded_db().await;
        let rice = fixture.add_product("ARROZ 1KG", 900).await;

        fixture
            .db
            .movement_engine()
            .register_inbound(inbound(&fixture, vec![inbound_line(rice, 100, 500)]))
            .await
            .unwrap();

        let product = fixture.db.products().get_by_id(rice).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 100);
        assert_eq!(product.average_cost_cents, 500);
    }

    #[tokio::test]
    async fn second_entry_blends_the_average_cost() {
        let fixture = seeded_db().await;
        let rice = fixture.add_product("ARROZ 1KG", 900).await;
        fixture.receive_stock(rice, 100, 500).await;

        fixture
            .db
            .movement_engine()
            .register_inbound(inbound(&fixture, vec![inbound_line(rice, 50, 800)]))
            .await
            .unwrap();

        // (100×500 + 50×800) / 150 = 600
        let product = fixture.db.products().get_by_id(rice).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 150);
        assert_eq!(product.average_cost_cents, 600);
    }

    #[tokio::test]
    async fn repeated_product_lines_blend_sequentially() {
        let fixture = seeded_db().await;
        let rice = fixture.add_product("ARROZ 1KG", 900).await;

        fixture
            .db
            .movement_engine()
            .register_inbound(inbound(
                &fixture,
                vec![inbound_line(rice, 100, 500), inbound_line(rice, 50, 800)],
            ))
            .await
            .unwrap();

        // Second line sees the first already applied: same 600 as two
        // separate movements.
        let product = fixture.db.products().get_by_id(rice).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 150);
        assert_eq!(product.average_cost_cents, 600);
    }

    #[tokio::test]
    async fn inbound_with_outbound_type_is_rejected() {
        let fixture = seeded_db().await;
        let rice = fixture.add_product("ARROZ 1KG", 900).await;

        let mut request = inbound(&fixture, vec![inbound_line(rice, 10, 500)]);
        request.movement_type_id = fixture.shrinkage_type_id;

        let result = fixture.db.movement_engine().register_inbound(request).await;

        match result {
            Err(EngineError::Core(CoreError::InvalidMovementType {
                expected, actual, ..
            })) => {
                assert_eq!(expected, MovementDirection::Entrada);
                assert_eq!(actual, MovementDirection::Salida);
            }
            other => panic!("expected InvalidMovementType, got {other:?}"),
        }

        // The rejected batch wrote nothing.
        let product = fixture.db.products().get_by_id(rice).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 0);
        assert!(fixture.db.movements().recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn outbound_with_inbound_type_is_rejected() {
        let fixture = seeded_db().await;
        let rice = fixture.add_product("ARROZ 1KG", 900).await;
        fixture.receive_stock(rice, 10, 500).await;

        let mut request = outbound(&fixture, vec![outbound_line(rice, 1)]);
        request.movement_type_id = fixture.purchase_type_id;

        let result = fixture.db.movement_engine().register_outbound(request).await;

        assert!(matches!(
            result,
            Err(EngineError::Core(CoreError::InvalidMovementType { .. }))
        ));
    }

    #[tokio::test]
    async fn outbound_decrements_without_moving_cost() {
        let fixture = seeded_db().await;
        let rice = fixture.add_product("ARROZ 1KG", 900).await;
        fixture.receive_stock(rice, 100, 500).await;

        let movement_id = fixture
            .db
            .movement_engine()
            .register_outbound(outbound(&fixture, vec![outbound_line(rice, 30)]))
            .await
            .unwrap();

        let product = fixture.db.products().get_by_id(rice).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 70);
        assert_eq!(product.average_cost_cents, 500);

        let ledger = fixture
            .db
            .stock()
            .lookup(rice, fixture.warehouse_id)
            .await
            .unwrap();
        assert_eq!(ledger, 70);

        // The line is valued at the average cost at the time of exit.
        let lines = fixture.db.movements().lines(movement_id).await.unwrap();
        assert_eq!(lines[0].unit_cost_cents, 500);
        assert_eq!(lines[0].total_cost_cents, 15_000);
    }

    #[tokio::test]
    async fn outbound_oversell_is_rejected_atomically() {
        let fixture = seeded_db().await;
        let rice = fixture.add_product("ARROZ 1KG", 900).await;
        let beans = fixture.add_product("FRIJOL 1KG", 1100).await;
        fixture.receive_stock(rice, 10, 500).await;
        fixture.receive_stock(beans, 2, 700).await;

        // rice is fine, beans is short; nothing may be written.
        let result = fixture
            .db
            .movement_engine()
            .register_outbound(outbound(
                &fixture,
                vec![outbound_line(rice, 5), outbound_line(beans, 4)],
            ))
            .await;

        match result {
            Err(EngineError::Core(CoreError::InsufficientStock { shortages })) => {
                assert_eq!(shortages.len(), 1);
                assert_eq!(shortages[0].product_id, beans);
                assert_eq!(shortages[0].available, 2);
                assert_eq!(shortages[0].requested, 4);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let rice_row = fixture.db.products().get_by_id(rice).await.unwrap().unwrap();
        assert_eq!(rice_row.quantity_on_hand, 10);
    }

    #[tokio::test]
    async fn duplicate_outbound_lines_cannot_combine_past_available_stock() {
        let fixture = seeded_db().await;
        let rice = fixture.add_product("ARROZ 1KG", 900).await;
        fixture.receive_stock(rice, 3, 500).await;

        let result = fixture
            .db
            .movement_engine()
            .register_outbound(outbound(
                &fixture,
                vec![outbound_line(rice, 2), outbound_line(rice, 2)],
            ))
            .await;

        match result {
            Err(EngineError::Core(CoreError::InsufficientStock { shortages })) => {
                assert_eq!(shortages.len(), 1);
                assert_eq!(shortages[0].available, 1);
                assert_eq!(shortages[0].requested, 2);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let product = fixture.db.products().get_by_id(rice).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 3);
    }

    #[tokio::test]
    async fn empty_batches_are_rejected() {
        let fixture = seeded_db().await;

        let inbound_result = fixture
            .db
            .movement_engine()
            .register_inbound(inbound(&fixture, vec![]))
            .await;
        assert!(matches!(
            inbound_result,
            Err(EngineError::Core(CoreError::Validation(
                ValidationError::EmptyBatch { .. }
            )))
        ));

        let outbound_result = fixture
            .db
            .movement_engine()
            .register_outbound(outbound(&fixture, vec![]))
            .await;
        assert!(matches!(
            outbound_result,
            Err(EngineError::Core(CoreError::Validation(
                ValidationError::EmptyBatch { .. }
            )))
        ));
    }

    #[tokio::test]
    async fn failure_on_a_later_line_rolls_back_the_whole_batch() {
        let fixture = seeded_db().await;
        let rice = fixture.add_product("ARROZ 1KG", 900).await;

        // First line is fine; the second references a product that does
        // not exist. The header and the first line must both vanish.
        let result = fixture
            .db
            .movement_engine()
            .register_inbound(inbound(
                &fixture,
                vec![inbound_line(rice, 10, 500), inbound_line(9_999, 5, 300)],
            ))
            .await;

        assert!(matches!(
            result,
            Err(EngineError::Core(CoreError::NotFound { .. }))
        ));

        let product = fixture.db.products().get_by_id(rice).await.unwrap().unwrap();
        assert_eq!(product.quantity_on_hand, 0);
        assert_eq!(product.average_cost_cents, 0);
        assert!(fixture.db.movements().recent(10).await.unwrap().is_empty());
        assert_eq!(
            fixture
                .db
                .stock()
                .lookup(rice, fixture.warehouse_id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn unknown_movement_type_is_not_found() {
        let fixture = seeded_db().await;
        let rice = fixture.add_product("ARROZ 1KG", 900).await;

        let mut request = inbound(&fixture, vec![inbound_line(rice, 10, 500)]);
        request.movement_type_id = 9_999;

        let result = fixture.db.movement_engine().register_inbound(request).await;

        assert!(matches!(
            result,
            Err(EngineError::Core(CoreError::NotFound { .. }))
        ));
    }
}
