//! Portfolio model.
//!
//! Portfolios (Depots) hold securities and track buy/sell transactions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::owner::{sealed, OwnerRef, TransactionOwner};
use super::transaction::{PortfolioTransaction, Transaction};

/// A securities portfolio (Depot)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub uuid: String,
    pub name: String,
    transactions: Vec<PortfolioTransaction>,
}

impl Portfolio {
    pub fn new(uuid: String, name: String) -> Self {
        Self {
            uuid,
            name,
            transactions: Vec::new(),
        }
    }

    /// Calculate holdings (security_uuid → shares)
    pub fn holdings(&self) -> HashMap<String, i64> {
        let mut holdings: HashMap<String, i64> = HashMap::new();

        for tx in &self.transactions {
            if let Some(sec_uuid) = tx.security_uuid() {
                let entry = holdings.entry(sec_uuid.to_string()).or_insert(0);
                if tx.transaction_type().is_purchase() {
                    *entry = entry.saturating_add(tx.shares());
                } else {
                    *entry = entry.saturating_sub(tx.shares());
                }
            }
        }

        // Remove zero holdings
        holdings.retain(|_, &mut shares| shares > 0);
        holdings
    }

    /// Get all transactions for a specific security
    pub fn transactions_for_security(&self, security_uuid: &str) -> Vec<&PortfolioTransaction> {
        self.transactions
            .iter()
            .filter(|tx| tx.security_uuid() == Some(security_uuid))
            .collect()
    }
}

impl TransactionOwner for Portfolio {
    fn owner_ref(&self) -> OwnerRef {
        OwnerRef::Portfolio(self.uuid.clone())
    }

    fn transactions(&self) -> &[PortfolioTransaction] {
        &self.transactions
    }
}

impl sealed::Storage for Portfolio {
    type Tx = PortfolioTransaction;

    fn transactions_vec_mut(&mut self) -> &mut Vec<PortfolioTransaction> {
        &mut self.transactions
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string(), String::new())
    }
}
