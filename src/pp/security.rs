//! Security reference data.
//!
//! Transactions only refer to securities by UUID; the client checks that a
//! referenced security exists before attaching a portfolio transaction.

use serde::{Deserialize, Serialize};

use super::common::DEFAULT_CURRENCY;

/// A security (stock, ETF, fund, etc.)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub uuid: String,
    pub name: String,
    pub currency: String,
}

impl Security {
    pub fn new(uuid: String, name: String, currency: String) -> Self {
        Self {
            uuid,
            name,
            currency,
        }
    }
}

impl Default for Security {
    fn default() -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            String::new(),
            DEFAULT_CURRENCY.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_security_creation() {
        let sec = Security::new("test-uuid".to_string(), "Apple Inc.".to_string(), "USD".to_string());
        assert_eq!(sec.uuid, "test-uuid");
        assert_eq!(sec.name, "Apple Inc.");
        assert_eq!(sec.currency, "USD");

        let other = Security::default();
        assert_ne!(other.uuid, sec.uuid);
        assert_eq!(other.currency, "EUR");
    }
}
