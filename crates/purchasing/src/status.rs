use core::str::FromStr;

use serde::{Deserialize, Serialize};

use supplyline_core::DomainError;

/// Purchase order lifecycle.
///
/// `can_transition` is the single authority on legal moves; every status
/// write (manual override or receipt completion) goes through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    Sent,
    Received,
    Cancelled,
}

impl OrderStatus {
    pub fn can_transition(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Draft, OrderStatus::Sent)
                | (OrderStatus::Draft, OrderStatus::Cancelled)
                | (OrderStatus::Sent, OrderStatus::Received)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::Sent => "SENT",
            OrderStatus::Received => "RECEIVED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(OrderStatus::Draft),
            "SENT" => Ok(OrderStatus::Sent),
            "RECEIVED" => Ok(OrderStatus::Received),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        assert!(OrderStatus::Draft.can_transition(OrderStatus::Sent));
        assert!(OrderStatus::Draft.can_transition(OrderStatus::Cancelled));
        assert!(OrderStatus::Sent.can_transition(OrderStatus::Received));
    }

    #[test]
    fn illegal_transitions() {
        assert!(!OrderStatus::Draft.can_transition(OrderStatus::Received));
        assert!(!OrderStatus::Sent.can_transition(OrderStatus::Cancelled));
        assert!(!OrderStatus::Sent.can_transition(OrderStatus::Draft));
        assert!(!OrderStatus::Received.can_transition(OrderStatus::Sent));
        assert!(!OrderStatus::Cancelled.can_transition(OrderStatus::Draft));
        // Same-state writes are not transitions.
        assert!(!OrderStatus::Draft.can_transition(OrderStatus::Draft));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for next in [
            OrderStatus::Draft,
            OrderStatus::Sent,
            OrderStatus::Received,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Received.can_transition(next));
            assert!(!OrderStatus::Cancelled.can_transition(next));
        }
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!("SENT".parse::<OrderStatus>().unwrap(), OrderStatus::Sent);
        assert!("sent".parse::<OrderStatus>().is_err());
    }
}
