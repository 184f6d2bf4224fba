use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use supplyline_core::{DomainResult, SupplierId};

use crate::product::{optional, required};

/// A vendor purchase orders are placed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSupplier {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
}

impl Supplier {
    pub fn create(input: NewSupplier, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: SupplierId::new(),
            name: required(&input.name, "name")?,
            email: optional(input.email),
            phone: optional(input.phone),
            address: optional(input.address),
            contact_person: optional(input.contact_person),
            created_at: now,
        })
    }

    pub fn apply_update(&mut self, update: SupplierUpdate) -> DomainResult<()> {
        if let Some(name) = update.name {
            self.name = required(&name, "name")?;
        }
        if let Some(email) = update.email {
            self.email = optional(Some(email));
        }
        if let Some(phone) = update.phone {
            self.phone = optional(Some(phone));
        }
        if let Some(address) = update.address {
            self.address = optional(Some(address));
        }
        if let Some(contact_person) = update.contact_person {
            self.contact_person = optional(Some(contact_person));
        }
        Ok(())
    }
}
