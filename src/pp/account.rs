//! Account model.
//!
//! Accounts represent cash/deposit accounts that hold money (not securities).

use serde::{Deserialize, Serialize};

use super::common::DEFAULT_CURRENCY;
use super::owner::{sealed, OwnerRef, TransactionOwner};
use super::transaction::{AccountTransaction, Transaction};

/// A cash/deposit account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub uuid: String,
    pub name: String,
    pub currency: String,
    transactions: Vec<AccountTransaction>,
}

impl Account {
    pub fn new(uuid: String, name: String, currency: String) -> Self {
        Self {
            uuid,
            name,
            currency,
            transactions: Vec::new(),
        }
    }

    /// Calculate current balance from all transactions, saturating at the
    /// bounds of `i64`
    pub fn balance(&self) -> i64 {
        self.transactions.iter().fold(0i64, |acc, tx| {
            if tx.transaction_type().is_credit() {
                acc.saturating_add(tx.amount().amount)
            } else {
                acc.saturating_sub(tx.amount().amount)
            }
        })
    }

    /// Get balance as decimal
    pub fn balance_decimal(&self) -> f64 {
        self.balance() as f64 / super::common::AMOUNT_FACTOR as f64
    }
}

impl TransactionOwner for Account {
    fn owner_ref(&self) -> OwnerRef {
        OwnerRef::Account(self.uuid.clone())
    }

    fn transactions(&self) -> &[AccountTransaction] {
        &self.transactions
    }
}

impl sealed::Storage for Account {
    type Tx = AccountTransaction;

    fn transactions_vec_mut(&mut self) -> &mut Vec<AccountTransaction> {
        &mut self.transactions
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            String::new(),
            DEFAULT_CURRENCY.to_string(),
        )
    }
}
