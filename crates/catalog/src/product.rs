use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use supplyline_core::{DomainError, DomainResult, ProductId};

/// Master data for a purchasable, stockable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub safety_stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub safety_stock: i32,
}

/// Partial update: present fields are applied, absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub safety_stock: Option<i32>,
}

impl Product {
    pub fn create(input: NewProduct, now: DateTime<Utc>) -> DomainResult<Self> {
        let sku = required(&input.sku, "sku")?;
        let name = required(&input.name, "name")?;
        if input.price < Decimal::ZERO {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if input.safety_stock < 0 {
            return Err(DomainError::validation("safetyStock cannot be negative"));
        }
        Ok(Self {
            id: ProductId::new(),
            sku,
            name,
            category: optional(input.category),
            price: input.price,
            safety_stock: input.safety_stock,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_update(&mut self, update: ProductUpdate, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(sku) = update.sku {
            self.sku = required(&sku, "sku")?;
        }
        if let Some(name) = update.name {
            self.name = required(&name, "name")?;
        }
        if let Some(category) = update.category {
            self.category = optional(Some(category));
        }
        if let Some(price) = update.price {
            if price < Decimal::ZERO {
                return Err(DomainError::validation("price cannot be negative"));
            }
            self.price = price;
        }
        if let Some(safety_stock) = update.safety_stock {
            if safety_stock < 0 {
                return Err(DomainError::validation("safetyStock cannot be negative"));
            }
            self.safety_stock = safety_stock;
        }
        self.updated_at = now;
        Ok(())
    }
}

pub(crate) fn required(value: &str, field: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn new_product() -> NewProduct {
        NewProduct {
            sku: "SKU-001".to_string(),
            name: "Steel Bolt M8".to_string(),
            category: Some("Fasteners".to_string()),
            price: dec!(0.35),
            safety_stock: 50,
        }
    }

    #[test]
    fn create_trims_and_keeps_fields() {
        let mut input = new_product();
        input.sku = "  SKU-001  ".to_string();
        let product = Product::create(input, Utc::now()).unwrap();
        assert_eq!(product.sku, "SKU-001");
        assert_eq!(product.price, dec!(0.35));
        assert_eq!(product.safety_stock, 50);
    }

    #[test]
    fn create_rejects_blank_sku() {
        let mut input = new_product();
        input.sku = "   ".to_string();
        let err = Product::create(input, Utc::now()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn create_rejects_negative_price() {
        let mut input = new_product();
        input.price = dec!(-1);
        let err = Product::create(input, Utc::now()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn update_applies_only_present_fields() {
        let mut product = Product::create(new_product(), Utc::now()).unwrap();
        let update = ProductUpdate {
            price: Some(dec!(0.40)),
            ..Default::default()
        };
        product.apply_update(update, Utc::now()).unwrap();
        assert_eq!(product.price, dec!(0.40));
        assert_eq!(product.name, "Steel Bolt M8");
        assert_eq!(product.sku, "SKU-001");
    }

    #[test]
    fn update_rejects_blank_name() {
        let mut product = Product::create(new_product(), Utc::now()).unwrap();
        let update = ProductUpdate {
            name: Some("".to_string()),
            ..Default::default()
        };
        let err = product.apply_update(update, Utc::now()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn blank_category_becomes_none() {
        let mut input = new_product();
        input.category = Some("  ".to_string());
        let product = Product::create(input, Utc::now()).unwrap();
        assert_eq!(product.category, None);
    }
}
