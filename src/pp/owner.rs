//! Owners hold transactions: accounts hold cash transactions, portfolios
//! hold security transactions.

use serde::{Deserialize, Serialize};

use super::transaction::Transaction;
use crate::errors::AttachmentError;

/// Identifies an owner inside a client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "uuid", rename_all = "camelCase")]
pub enum OwnerRef {
    Account(String),
    Portfolio(String),
}

impl OwnerRef {
    pub fn uuid(&self) -> &str {
        match self {
            Self::Account(uuid) | Self::Portfolio(uuid) => uuid,
        }
    }
}

impl std::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Account(uuid) => write!(f, "account '{}'", uuid),
            Self::Portfolio(uuid) => write!(f, "portfolio '{}'", uuid),
        }
    }
}

pub(super) mod sealed {
    /// Raw storage, not exported; additions go through `add_transaction`
    pub trait Storage {
        type Tx: super::Transaction;

        fn transactions_vec_mut(&mut self) -> &mut Vec<Self::Tx>;
    }
}

/// A container of transactions.
///
/// Insertion order is preserved. Adding a transaction whose uuid is already
/// present and removing one that is absent are both errors.
pub trait TransactionOwner: sealed::Storage {
    fn owner_ref(&self) -> OwnerRef;

    fn transactions(&self) -> &[Self::Tx];

    fn transaction(&self, uuid: &str) -> Option<&Self::Tx> {
        self.transactions().iter().find(|tx| tx.uuid() == uuid)
    }

    fn transaction_mut(&mut self, uuid: &str) -> Option<&mut Self::Tx> {
        self.transactions_vec_mut()
            .iter_mut()
            .find(|tx| tx.uuid() == uuid)
    }

    fn contains(&self, uuid: &str) -> bool {
        self.transaction(uuid).is_some()
    }

    fn add_transaction(&mut self, tx: Self::Tx) -> Result<(), AttachmentError> {
        if self.contains(tx.uuid()) {
            return Err(AttachmentError::Duplicate {
                owner: self.owner_ref(),
                transaction: tx.uuid().to_string(),
            });
        }
        self.transactions_vec_mut().push(tx);
        Ok(())
    }

    fn remove_transaction(&mut self, uuid: &str) -> Result<Self::Tx, AttachmentError> {
        let position = self
            .transactions()
            .iter()
            .position(|tx| tx.uuid() == uuid)
            .ok_or_else(|| AttachmentError::NotFound {
                owner: self.owner_ref(),
                transaction: uuid.to_string(),
            })?;
        Ok(self.transactions_vec_mut().remove(position))
    }
}
