use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use supplyline_catalog::Product;
use supplyline_core::{
    DomainError, DomainResult, OrderItemId, ProductId, PurchaseOrderId, SupplierId, UserId,
};

use crate::status::OrderStatus;

/// One ordered product line. `unit_price` is a snapshot taken at order time
/// so later catalog price changes never rewrite order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity_ordered: i32,
    pub quantity_received: i32,
    pub unit_price: Decimal,
}

impl PurchaseOrderItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity_ordered)
    }

    pub fn remaining(&self) -> i32 {
        self.quantity_ordered - self.quantity_received
    }

    pub fn is_fully_received(&self) -> bool {
        self.quantity_received >= self.quantity_ordered
    }
}

/// A requested line before product resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
}

/// Resolve a requested line against its catalog product: quantity defaults
/// to 1, price to the product's current catalog price.
pub fn resolve_item(request: &OrderItemRequest, product: &Product) -> DomainResult<PurchaseOrderItem> {
    let quantity = request.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }
    let unit_price = request.unit_price.unwrap_or(product.price);
    if unit_price < Decimal::ZERO {
        return Err(DomainError::validation("unitPrice cannot be negative"));
    }
    Ok(PurchaseOrderItem {
        id: OrderItemId::new(),
        product_id: product.id,
        quantity_ordered: quantity,
        quantity_received: 0,
        unit_price,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub order_number: String,
    pub supplier_id: SupplierId,
    pub created_by: Option<UserId>,
    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub expected_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<PurchaseOrderItem>,
}

impl PurchaseOrder {
    pub fn create(
        order_number: String,
        supplier_id: SupplierId,
        created_by: Option<UserId>,
        status: Option<OrderStatus>,
        expected_date: Option<NaiveDate>,
        items: Vec<PurchaseOrderItem>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if items.is_empty() {
            return Err(DomainError::validation("at least one item is required"));
        }
        let mut order = Self {
            id: PurchaseOrderId::new(),
            order_number,
            supplier_id,
            created_by,
            status: status.unwrap_or(OrderStatus::Draft),
            total_amount: Decimal::ZERO,
            expected_date,
            created_at: now,
            items,
        };
        order.recalculate_total();
        Ok(order)
    }

    /// Keep `total_amount` equal to the sum of line totals. Called after
    /// every item mutation.
    pub fn recalculate_total(&mut self) {
        self.total_amount = self.items.iter().map(|i| i.line_total()).sum();
    }

    /// Replace supplier/date/items wholesale. Only DRAFT orders are editable.
    pub fn apply_edit(
        &mut self,
        supplier_id: SupplierId,
        expected_date: Option<NaiveDate>,
        items: Vec<PurchaseOrderItem>,
    ) -> DomainResult<()> {
        if self.status != OrderStatus::Draft {
            return Err(DomainError::invalid_state(format!(
                "can only edit orders in DRAFT status, current status: {}",
                self.status
            )));
        }
        if items.is_empty() {
            return Err(DomainError::validation("at least one item is required"));
        }
        self.supplier_id = supplier_id;
        self.expected_date = expected_date;
        self.items = items;
        self.recalculate_total();
        Ok(())
    }

    /// Move to `next` if the transition table allows it.
    pub fn transition_to(&mut self, next: OrderStatus) -> DomainResult<()> {
        if !self.status.can_transition(next) {
            return Err(DomainError::invalid_state(format!(
                "cannot change status from {} to {}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }

    pub fn ensure_deletable(&self) -> DomainResult<()> {
        if self.status != OrderStatus::Draft {
            return Err(DomainError::invalid_state(
                "can only delete DRAFT orders",
            ));
        }
        Ok(())
    }

    pub fn item(&self, id: OrderItemId) -> Option<&PurchaseOrderItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn all_items_received(&self) -> bool {
        self.items.iter().all(PurchaseOrderItem::is_fully_received)
    }
}

/// `PO-YYYY-MM-NNN`, where NNN is the 1-based order sequence zero-padded to
/// three digits.
pub fn order_number(now: DateTime<Utc>, sequence: u64) -> String {
    format!("PO-{}-{:03}", now.format("%Y-%m"), sequence)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use supplyline_catalog::NewProduct;

    pub(crate) fn test_product(price: Decimal) -> Product {
        Product::create(
            NewProduct {
                sku: "SKU-001".to_string(),
                name: "Steel Bolt M8".to_string(),
                category: None,
                price,
                safety_stock: 0,
            },
            Utc::now(),
        )
        .unwrap()
    }

    pub(crate) fn test_item(quantity: i32, unit_price: Decimal) -> PurchaseOrderItem {
        PurchaseOrderItem {
            id: OrderItemId::new(),
            product_id: ProductId::new(),
            quantity_ordered: quantity,
            quantity_received: 0,
            unit_price,
        }
    }

    pub(crate) fn test_order(items: Vec<PurchaseOrderItem>) -> PurchaseOrder {
        PurchaseOrder::create(
            "PO-2026-08-001".to_string(),
            SupplierId::new(),
            None,
            None,
            None,
            items,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn create_computes_total_from_lines() {
        let order = test_order(vec![test_item(10, dec!(5.00)), test_item(4, dec!(2.50))]);
        assert_eq!(order.total_amount, dec!(60.00));
        assert_eq!(order.status, OrderStatus::Draft);
    }

    #[test]
    fn create_rejects_empty_items() {
        let err = PurchaseOrder::create(
            "PO-2026-08-001".to_string(),
            SupplierId::new(),
            None,
            None,
            None,
            vec![],
            Utc::now(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn resolve_item_defaults_quantity_and_price() {
        let product = test_product(dec!(3.20));
        let item = resolve_item(
            &OrderItemRequest {
                product_id: product.id,
                quantity: None,
                unit_price: None,
            },
            &product,
        )
        .unwrap();
        assert_eq!(item.quantity_ordered, 1);
        assert_eq!(item.unit_price, dec!(3.20));
    }

    #[test]
    fn resolve_item_keeps_explicit_price() {
        let product = test_product(dec!(3.20));
        let item = resolve_item(
            &OrderItemRequest {
                product_id: product.id,
                quantity: Some(6),
                unit_price: Some(dec!(2.90)),
            },
            &product,
        )
        .unwrap();
        assert_eq!(item.unit_price, dec!(2.90));
        assert_eq!(item.line_total(), dec!(17.40));
    }

    #[test]
    fn resolve_item_rejects_non_positive_quantity() {
        let product = test_product(dec!(3.20));
        let err = resolve_item(
            &OrderItemRequest {
                product_id: product.id,
                quantity: Some(0),
                unit_price: None,
            },
            &product,
        )
        .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn edit_replaces_items_and_recomputes_total() {
        let mut order = test_order(vec![test_item(10, dec!(5.00))]);
        let supplier = order.supplier_id;
        order
            .apply_edit(supplier, None, vec![test_item(2, dec!(1.25))])
            .unwrap();
        assert_eq!(order.total_amount, dec!(2.50));
    }

    #[test]
    fn edit_outside_draft_is_rejected() {
        let mut order = test_order(vec![test_item(1, dec!(1))]);
        order.transition_to(OrderStatus::Sent).unwrap();
        let supplier = order.supplier_id;
        let err = order
            .apply_edit(supplier, None, vec![test_item(2, dec!(1))])
            .unwrap_err();
        match err {
            DomainError::InvalidState(_) => {}
            other => panic!("expected InvalidState, got {other:?}"),
        }
    }

    #[test]
    fn illegal_transition_is_rejected() {
        let mut order = test_order(vec![test_item(1, dec!(1))]);
        let err = order.transition_to(OrderStatus::Received).unwrap_err();
        match err {
            DomainError::InvalidState(_) => {}
            other => panic!("expected InvalidState, got {other:?}"),
        }
        assert_eq!(order.status, OrderStatus::Draft);
    }

    #[test]
    fn delete_guard_allows_draft_only() {
        let mut order = test_order(vec![test_item(1, dec!(1))]);
        assert!(order.ensure_deletable().is_ok());
        order.transition_to(OrderStatus::Sent).unwrap();
        assert!(order.ensure_deletable().is_err());
    }

    #[test]
    fn order_number_is_zero_padded() {
        let now = "2026-08-25T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(order_number(now, 7), "PO-2026-08-007");
        assert_eq!(order_number(now, 123), "PO-2026-08-123");
        assert_eq!(order_number(now, 1234), "PO-2026-08-1234");
    }
}
