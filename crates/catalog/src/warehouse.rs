use core::str::FromStr;

use serde::{Deserialize, Serialize};

use supplyline_core::{DomainError, DomainResult, WarehouseId};

use crate::product::{optional, required};

pub const DEFAULT_CAPACITY: i32 = 10_000;

/// Storage location kind. Virtual warehouses model in-transit or
/// consignment stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarehouseKind {
    Physical,
    Virtual,
}

impl Default for WarehouseKind {
    fn default() -> Self {
        Self::Physical
    }
}

impl WarehouseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarehouseKind::Physical => "PHYSICAL",
            WarehouseKind::Virtual => "VIRTUAL",
        }
    }
}

impl FromStr for WarehouseKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PHYSICAL" => Ok(WarehouseKind::Physical),
            "VIRTUAL" => Ok(WarehouseKind::Virtual),
            other => Err(DomainError::validation(format!(
                "unknown warehouse type: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for WarehouseKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A storage location inventory items live in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub kind: WarehouseKind,
    pub capacity: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewWarehouse {
    pub name: String,
    pub location: Option<String>,
    pub kind: Option<WarehouseKind>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarehouseUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub kind: Option<WarehouseKind>,
    pub capacity: Option<i32>,
}

impl Warehouse {
    pub fn create(input: NewWarehouse) -> DomainResult<Self> {
        let capacity = input.capacity.unwrap_or(DEFAULT_CAPACITY);
        if capacity < 0 {
            return Err(DomainError::validation("capacity cannot be negative"));
        }
        Ok(Self {
            id: WarehouseId::new(),
            name: required(&input.name, "name")?,
            location: optional(input.location),
            kind: input.kind.unwrap_or_default(),
            capacity,
        })
    }

    pub fn apply_update(&mut self, update: WarehouseUpdate) -> DomainResult<()> {
        if let Some(name) = update.name {
            self.name = required(&name, "name")?;
        }
        if let Some(location) = update.location {
            self.location = optional(Some(location));
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(capacity) = update.capacity {
            if capacity < 0 {
                return Err(DomainError::validation("capacity cannot be negative"));
            }
            self.capacity = capacity;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_kind_and_capacity() {
        let warehouse = Warehouse::create(NewWarehouse {
            name: "Central DC".to_string(),
            location: Some("Rotterdam".to_string()),
            kind: None,
            capacity: None,
        })
        .unwrap();
        assert_eq!(warehouse.kind, WarehouseKind::Physical);
        assert_eq!(warehouse.capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn create_rejects_negative_capacity() {
        let err = Warehouse::create(NewWarehouse {
            name: "Central DC".to_string(),
            location: None,
            kind: None,
            capacity: Some(-5),
        })
        .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn kind_serializes_screaming() {
        let json = serde_json::to_string(&WarehouseKind::Physical).unwrap();
        assert_eq!(json, "\"PHYSICAL\"");
    }
}
