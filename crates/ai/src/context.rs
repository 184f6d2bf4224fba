//! Snapshot of the stores, flattened into the text block the model sees.

use rust_decimal::Decimal;

use supplyline_catalog::{Product, Supplier, Warehouse};
use supplyline_store::{ItemView, MovementView, OrderView};

/// Orders included in the context, newest first.
pub const RECENT_ORDERS: usize = 10;
/// Ledger entries included in the context, newest first.
pub const RECENT_MOVEMENTS: usize = 20;

/// Everything the assistant is allowed to know, read in one pass before
/// the call so the prompt reflects a single point in time.
#[derive(Debug, Clone, Default)]
pub struct ContextSnapshot {
    pub products: Vec<Product>,
    pub warehouses: Vec<Warehouse>,
    pub suppliers: Vec<Supplier>,
    pub items: Vec<ItemView>,
    pub orders: Vec<OrderView>,
    pub movements: Vec<MovementView>,
}

/// Render the snapshot as the DATA CONTEXT block. Sections are plain
/// labelled lists; the model handles aggregation questions itself.
pub fn build_context(snapshot: &ContextSnapshot) -> String {
    let mut out = String::new();

    out.push_str(&format!("PRODUCTS (Total: {}):\n", snapshot.products.len()));
    for product in &snapshot.products {
        out.push_str(&format!(
            "- {} (SKU: {}, Price: {}, Category: {}, Safety Stock: {})\n",
            product.name,
            product.sku,
            product.price.round_dp(2),
            product.category.as_deref().unwrap_or("-"),
            product.safety_stock,
        ));
    }
    out.push('\n');

    out.push_str("WAREHOUSES:\n");
    for warehouse in &snapshot.warehouses {
        out.push_str(&format!(
            "- {} ({})\n",
            warehouse.name,
            warehouse.location.as_deref().unwrap_or("-"),
        ));
    }
    out.push('\n');

    let total_quantity: i64 = snapshot.items.iter().map(|i| i64::from(i.quantity)).sum();
    let total_value: Decimal = snapshot
        .items
        .iter()
        .map(|item| {
            let price = snapshot
                .products
                .iter()
                .find(|p| p.id == item.product_id)
                .map(|p| p.price)
                .unwrap_or(Decimal::ZERO);
            price * Decimal::from(item.quantity)
        })
        .sum();
    out.push_str(&format!(
        "INVENTORY SUMMARY: Total Items: {}, Total Value: {} EUR\n",
        total_quantity,
        total_value.round_dp(2),
    ));
    out.push_str("INVENTORY DETAILS:\n");
    for item in &snapshot.items {
        let safety_stock = snapshot
            .products
            .iter()
            .find(|p| p.id == item.product_id)
            .map(|p| p.safety_stock)
            .unwrap_or(0);
        let warning = if item.quantity <= safety_stock {
            " [LOW STOCK WARNING]"
        } else {
            ""
        };
        out.push_str(&format!(
            "- Product: {}, Warehouse: {}, Quantity: {}{}\n",
            item.product_name, item.warehouse_name, item.quantity, warning,
        ));
    }
    out.push('\n');

    out.push_str("SUPPLIERS:\n");
    for supplier in &snapshot.suppliers {
        out.push_str(&format!(
            "- {} (Contact: {}, Email: {})\n",
            supplier.name,
            supplier.contact_person.as_deref().unwrap_or("-"),
            supplier.email.as_deref().unwrap_or("-"),
        ));
    }
    out.push('\n');

    out.push_str("RECENT PURCHASE ORDERS:\n");
    for order in snapshot.orders.iter().take(RECENT_ORDERS) {
        let lines = order
            .items
            .iter()
            .map(|item| format!("{}x {}", item.quantity_ordered, item.product_name))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "- Order #{}: Supplier: {}, Status: {}, Total: {}, Items: [{}]\n",
            order.order_number,
            order.supplier_name,
            order.status,
            order.total_amount.round_dp(2),
            lines,
        ));
    }
    out.push('\n');

    out.push_str("RECENT INVENTORY MOVEMENTS (History):\n");
    for movement in snapshot.movements.iter().take(RECENT_MOVEMENTS) {
        out.push_str(&format!(
            "- {}: {} {} units of {} at {} (Reason: {}, User: {})\n",
            movement.created_at.format("%Y-%m-%d %H:%M"),
            movement.movement_type,
            movement.quantity,
            movement.product_name,
            movement.warehouse_name,
            movement.reason.as_deref().unwrap_or("-"),
            movement.performed_by_name.as_deref().unwrap_or("System"),
        ));
    }

    out
}
