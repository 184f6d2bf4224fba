use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplyline_core::{DomainError, DomainResult, InventoryItemId, ProductId, WarehouseId};

/// Stock level of one product in one warehouse. The (product, warehouse)
/// pair is unique; rows are created lazily on the first stock event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: i32,
    pub reserved: i32,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(
        product_id: ProductId,
        warehouse_id: WarehouseId,
        quantity: i32,
        reserved: i32,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if quantity < 0 {
            return Err(DomainError::validation("quantity cannot be negative"));
        }
        if reserved < 0 {
            return Err(DomainError::validation("reserved cannot be negative"));
        }
        Ok(Self {
            id: InventoryItemId::new(),
            product_id,
            warehouse_id,
            quantity,
            reserved,
            last_updated: now,
        })
    }

    /// Empty row for a pair that has no stock yet.
    pub fn empty(
        product_id: ProductId,
        warehouse_id: WarehouseId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InventoryItemId::new(),
            product_id,
            warehouse_id,
            quantity: 0,
            reserved: 0,
            last_updated: now,
        }
    }

    /// Available stock = quantity - reserved.
    pub fn available(&self) -> i32 {
        self.quantity - self.reserved
    }

    pub fn is_low_stock(&self, safety_stock: i32) -> bool {
        self.quantity <= safety_stock
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.available() <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_subtracts_reserved() {
        let item = InventoryItem::new(
            ProductId::new(),
            WarehouseId::new(),
            120,
            20,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(item.available(), 100);
        assert!(!item.is_out_of_stock());
    }

    #[test]
    fn fully_reserved_counts_as_out_of_stock() {
        let item =
            InventoryItem::new(ProductId::new(), WarehouseId::new(), 5, 5, Utc::now()).unwrap();
        assert!(item.is_out_of_stock());
    }

    #[test]
    fn low_stock_compares_against_safety_stock() {
        let item =
            InventoryItem::new(ProductId::new(), WarehouseId::new(), 10, 0, Utc::now()).unwrap();
        assert!(item.is_low_stock(10));
        assert!(!item.is_low_stock(9));
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let err = InventoryItem::new(ProductId::new(), WarehouseId::new(), -1, 0, Utc::now())
            .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
