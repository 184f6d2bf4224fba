use core::str::FromStr;

use serde::{Deserialize, Serialize};

use supplyline_core::DomainError;

/// Coarse access role carried in the JWT. Authorization checks are left to
/// the caller; the role mainly feeds audit context and the profile endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Manager,
    WarehouseOp,
    Procurement,
}

impl Default for Role {
    fn default() -> Self {
        Self::WarehouseOp
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::WarehouseOp => "WAREHOUSE_OP",
            Role::Procurement => "PROCUREMENT",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "WAREHOUSE_OP" => Ok(Role::WarehouseOp),
            "PROCUREMENT" => Ok(Role::Procurement),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
