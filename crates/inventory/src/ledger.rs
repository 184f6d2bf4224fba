//! Pure stock arithmetic. Plans are computed from current quantities and
//! validated before any row is written; the store applies them inside one
//! unit of work.

use chrono::{DateTime, Utc};

use supplyline_core::{DomainError, DomainResult, InventoryItemId, UserId};

use crate::movement::{InventoryMovement, MovementType};
use supplyline_core::MovementId;

/// A validated stock change: the new quantity for the item plus the audit
/// trail snapshot to append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub movement_type: MovementType,
    /// Magnitude of the change, always >= 0.
    pub magnitude: i32,
    pub quantity_before: i32,
    pub quantity_after: i32,
}

impl StockChange {
    /// Materialize the audit trail entry for this change.
    pub fn into_movement(
        self,
        inventory_item_id: InventoryItemId,
        reason: Option<String>,
        reference_type: Option<String>,
        reference_id: Option<String>,
        performed_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> InventoryMovement {
        InventoryMovement {
            id: MovementId::new(),
            inventory_item_id,
            movement_type: self.movement_type,
            quantity: self.magnitude,
            quantity_before: self.quantity_before,
            quantity_after: self.quantity_after,
            reason,
            reference_type,
            reference_id,
            performed_by,
            created_at: now,
        }
    }
}

/// Plan a movement against the current quantity.
///
/// IN and OUT take strict magnitudes; ADJUSTMENT and TRANSFER take a signed
/// delta (callers pre-negate to reduce stock). OUT fails when it would
/// overdraw, signed deltas fail when the result would go negative.
pub fn plan_movement(
    current: i32,
    movement_type: MovementType,
    quantity: i32,
) -> DomainResult<StockChange> {
    match movement_type {
        MovementType::In => {
            if quantity <= 0 {
                return Err(DomainError::validation("quantity must be positive"));
            }
            Ok(StockChange {
                movement_type,
                magnitude: quantity,
                quantity_before: current,
                quantity_after: current + quantity,
            })
        }
        MovementType::Out => {
            if quantity <= 0 {
                return Err(DomainError::validation("quantity must be positive"));
            }
            if quantity > current {
                return Err(DomainError::conflict(format!(
                    "insufficient stock, available: {current}"
                )));
            }
            Ok(StockChange {
                movement_type,
                magnitude: quantity,
                quantity_before: current,
                quantity_after: current - quantity,
            })
        }
        MovementType::Adjustment | MovementType::Transfer => {
            if quantity == 0 {
                return Err(DomainError::validation("quantity cannot be zero"));
            }
            let after = current + quantity;
            if after < 0 {
                return Err(DomainError::conflict(
                    "adjustment would result in negative stock",
                ));
            }
            Ok(StockChange {
                movement_type,
                magnitude: quantity.abs(),
                quantity_before: current,
                quantity_after: after,
            })
        }
    }
}

/// Plan setting an item to an absolute quantity. The audit entry records the
/// delta as IN or OUT depending on direction.
pub fn plan_set_quantity(current: i32, new_quantity: i32) -> DomainResult<StockChange> {
    if new_quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    let delta = new_quantity - current;
    Ok(StockChange {
        movement_type: if delta >= 0 {
            MovementType::In
        } else {
            MovementType::Out
        },
        magnitude: delta.abs(),
        quantity_before: current,
        quantity_after: new_quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_in_adds() {
        let change = plan_movement(10, MovementType::In, 5).unwrap();
        assert_eq!(change.quantity_before, 10);
        assert_eq!(change.quantity_after, 15);
        assert_eq!(change.magnitude, 5);
    }

    #[test]
    fn movement_out_subtracts() {
        let change = plan_movement(10, MovementType::Out, 4).unwrap();
        assert_eq!(change.quantity_after, 6);
    }

    #[test]
    fn movement_out_rejects_overdraw() {
        let err = plan_movement(3, MovementType::Out, 4).unwrap_err();
        match err {
            DomainError::Conflict(msg) => assert!(msg.contains("insufficient stock")),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn movement_in_rejects_non_positive() {
        for q in [0, -3] {
            let err = plan_movement(10, MovementType::In, q).unwrap_err();
            match err {
                DomainError::Validation(_) => {}
                other => panic!("expected Validation, got {other:?}"),
            }
        }
    }

    #[test]
    fn adjustment_accepts_signed_delta() {
        let up = plan_movement(10, MovementType::Adjustment, 5).unwrap();
        assert_eq!(up.quantity_after, 15);
        assert_eq!(up.magnitude, 5);

        let down = plan_movement(10, MovementType::Adjustment, -7).unwrap();
        assert_eq!(down.quantity_after, 3);
        assert_eq!(down.magnitude, 7);
    }

    #[test]
    fn adjustment_rejects_going_negative() {
        let err = plan_movement(4, MovementType::Transfer, -5).unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[test]
    fn adjustment_rejects_zero() {
        let err = plan_movement(4, MovementType::Adjustment, 0).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn set_quantity_records_direction() {
        let up = plan_set_quantity(8, 20).unwrap();
        assert_eq!(up.movement_type, MovementType::In);
        assert_eq!(up.magnitude, 12);

        let down = plan_set_quantity(20, 8).unwrap();
        assert_eq!(down.movement_type, MovementType::Out);
        assert_eq!(down.magnitude, 12);
        assert_eq!(down.quantity_after, 8);
    }

    #[test]
    fn set_quantity_to_same_value_is_zero_in() {
        let change = plan_set_quantity(8, 8).unwrap();
        assert_eq!(change.movement_type, MovementType::In);
        assert_eq!(change.magnitude, 0);
    }

    #[test]
    fn set_quantity_rejects_negative() {
        let err = plan_set_quantity(8, -1).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: every accepted plan satisfies
            /// after = before +/- magnitude according to its type.
            #[test]
            fn plans_balance(
                current in 0i32..100_000,
                quantity in -100_000i32..100_000,
                type_idx in 0usize..4,
            ) {
                let movement_type = [
                    MovementType::In,
                    MovementType::Out,
                    MovementType::Adjustment,
                    MovementType::Transfer,
                ][type_idx];

                if let Ok(change) = plan_movement(current, movement_type, quantity) {
                    prop_assert_eq!(change.quantity_before, current);
                    prop_assert!(change.magnitude >= 0);
                    prop_assert!(change.quantity_after >= 0);
                    let delta = change.quantity_after - change.quantity_before;
                    prop_assert_eq!(delta.abs(), change.magnitude);
                    match change.movement_type {
                        MovementType::In => prop_assert!(delta >= 0),
                        MovementType::Out => prop_assert!(delta <= 0),
                        _ => {}
                    }
                }
            }

            /// Property: set-to-absolute always lands exactly on the target
            /// and its audit entry balances.
            #[test]
            fn set_quantity_lands_on_target(
                current in 0i32..100_000,
                target in 0i32..100_000,
            ) {
                let change = plan_set_quantity(current, target).unwrap();
                prop_assert_eq!(change.quantity_after, target);
                prop_assert_eq!(
                    (change.quantity_after - change.quantity_before).abs(),
                    change.magnitude
                );
            }
        }
    }
}
