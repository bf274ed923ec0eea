//! Client model - the root of a ledger.
//!
//! The client owns securities, accounts and portfolios, and keeps the index
//! that pairs transactions into cross entries. Anything that touches two
//! owners at once goes through `&mut Client`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::account::Account;
use super::common::DEFAULT_CURRENCY;
use super::cross_entry::CrossEntry;
use super::owner::{OwnerRef, TransactionOwner};
use super::portfolio::Portfolio;
use super::security::Security;
use super::transaction::{AccountTransaction, PortfolioTransaction, Transaction};
use crate::errors::{AttachmentError, LedgerError, Result};

/// The root client object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Base currency (default: EUR)
    pub base_currency: String,
    /// All securities known to the client
    pub securities: Vec<Security>,
    accounts: Vec<Account>,
    portfolios: Vec<Portfolio>,
    /// Transaction uuid → the cross entry that manages it
    cross_entries: HashMap<String, CrossEntry>,
}

impl Client {
    pub fn new(base_currency: impl Into<String>) -> Self {
        Self {
            base_currency: base_currency.into(),
            securities: Vec::new(),
            accounts: Vec::new(),
            portfolios: Vec::new(),
            cross_entries: HashMap::new(),
        }
    }

    pub fn add_security(&mut self, security: Security) {
        self.securities.push(security);
    }

    pub fn add_account(&mut self, account: Account) {
        self.accounts.push(account);
    }

    pub fn add_portfolio(&mut self, portfolio: Portfolio) {
        self.portfolios.push(portfolio);
    }

    /// New empty account in the base currency; returns its uuid
    pub fn create_account(&mut self, name: impl Into<String>) -> String {
        let account = Account::new(
            uuid::Uuid::new_v4().to_string(),
            name.into(),
            self.base_currency.clone(),
        );
        let uuid = account.uuid.clone();
        self.accounts.push(account);
        uuid
    }

    /// New empty portfolio; returns its uuid
    pub fn create_portfolio(&mut self, name: impl Into<String>) -> String {
        let portfolio = Portfolio::new(uuid::Uuid::new_v4().to_string(), name.into());
        let uuid = portfolio.uuid.clone();
        self.portfolios.push(portfolio);
        uuid
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn portfolios(&self) -> &[Portfolio] {
        &self.portfolios
    }

    /// Find a security by UUID
    pub fn find_security(&self, uuid: &str) -> Option<&Security> {
        self.securities.iter().find(|s| s.uuid == uuid)
    }

    /// Find an account by UUID
    pub fn find_account(&self, uuid: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.uuid == uuid)
    }

    pub fn account_mut(&mut self, uuid: &str) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.uuid == uuid)
    }

    /// Find a portfolio by UUID
    pub fn find_portfolio(&self, uuid: &str) -> Option<&Portfolio> {
        self.portfolios.iter().find(|p| p.uuid == uuid)
    }

    pub fn portfolio_mut(&mut self, uuid: &str) -> Option<&mut Portfolio> {
        self.portfolios.iter_mut().find(|p| p.uuid == uuid)
    }

    pub fn has_owner(&self, owner: &OwnerRef) -> bool {
        match owner {
            OwnerRef::Account(uuid) => self.find_account(uuid).is_some(),
            OwnerRef::Portfolio(uuid) => self.find_portfolio(uuid).is_some(),
        }
    }

    pub fn account_transaction(
        &self,
        account: &str,
        uuid: &str,
    ) -> std::result::Result<&AccountTransaction, AttachmentError> {
        let owner = self
            .find_account(account)
            .ok_or_else(|| AttachmentError::UnknownOwner(OwnerRef::Account(account.to_string())))?;
        owner.transaction(uuid).ok_or_else(|| not_found(owner, uuid))
    }

    pub fn account_transaction_mut(
        &mut self,
        account: &str,
        uuid: &str,
    ) -> std::result::Result<&mut AccountTransaction, AttachmentError> {
        let owner = self
            .account_mut(account)
            .ok_or_else(|| AttachmentError::UnknownOwner(OwnerRef::Account(account.to_string())))?;
        let owner_ref = owner.owner_ref();
        owner
            .transaction_mut(uuid)
            .ok_or_else(|| AttachmentError::NotFound {
                owner: owner_ref,
                transaction: uuid.to_string(),
            })
    }

    pub fn portfolio_transaction(
        &self,
        portfolio: &str,
        uuid: &str,
    ) -> std::result::Result<&PortfolioTransaction, AttachmentError> {
        let owner = self.find_portfolio(portfolio).ok_or_else(|| {
            AttachmentError::UnknownOwner(OwnerRef::Portfolio(portfolio.to_string()))
        })?;
        owner.transaction(uuid).ok_or_else(|| not_found(owner, uuid))
    }

    pub fn portfolio_transaction_mut(
        &mut self,
        portfolio: &str,
        uuid: &str,
    ) -> std::result::Result<&mut PortfolioTransaction, AttachmentError> {
        let owner = self.portfolio_mut(portfolio).ok_or_else(|| {
            AttachmentError::UnknownOwner(OwnerRef::Portfolio(portfolio.to_string()))
        })?;
        let owner_ref = owner.owner_ref();
        owner
            .transaction_mut(uuid)
            .ok_or_else(|| AttachmentError::NotFound {
                owner: owner_ref,
                transaction: uuid.to_string(),
            })
    }

    /// Whether the owner currently holds the transaction
    pub fn holds(&self, owner: &OwnerRef, uuid: &str) -> bool {
        match owner {
            OwnerRef::Account(account) => self.account_transaction(account, uuid).is_ok(),
            OwnerRef::Portfolio(portfolio) => self.portfolio_transaction(portfolio, uuid).is_ok(),
        }
    }

    pub(crate) fn attach_account_transaction(
        &mut self,
        account: &str,
        tx: AccountTransaction,
    ) -> std::result::Result<(), AttachmentError> {
        self.account_mut(account)
            .ok_or_else(|| AttachmentError::UnknownOwner(OwnerRef::Account(account.to_string())))?
            .add_transaction(tx)
    }

    pub(crate) fn attach_portfolio_transaction(
        &mut self,
        portfolio: &str,
        tx: PortfolioTransaction,
    ) -> std::result::Result<(), AttachmentError> {
        self.portfolio_mut(portfolio)
            .ok_or_else(|| {
                AttachmentError::UnknownOwner(OwnerRef::Portfolio(portfolio.to_string()))
            })?
            .add_transaction(tx)
    }

    pub(crate) fn detach(
        &mut self,
        owner: &OwnerRef,
        uuid: &str,
    ) -> std::result::Result<(), AttachmentError> {
        match owner {
            OwnerRef::Account(account) => {
                self.account_mut(account)
                    .ok_or_else(|| AttachmentError::UnknownOwner(owner.clone()))?
                    .remove_transaction(uuid)?;
            }
            OwnerRef::Portfolio(portfolio) => {
                self.portfolio_mut(portfolio)
                    .ok_or_else(|| AttachmentError::UnknownOwner(owner.clone()))?
                    .remove_transaction(uuid)?;
            }
        }
        Ok(())
    }

    /// Cross entry managing the given transaction
    pub fn cross_entry(&self, uuid: &str) -> Option<&CrossEntry> {
        self.cross_entries.get(uuid)
    }

    pub(crate) fn is_paired(&self, uuid: &str) -> bool {
        self.cross_entries.contains_key(uuid)
    }

    pub(crate) fn register(&mut self, entry: &CrossEntry) {
        let (a, b) = entry.sides();
        self.cross_entries.insert(a.transaction.clone(), entry.clone());
        self.cross_entries.insert(b.transaction.clone(), entry.clone());
    }

    fn unregister(&mut self, entry: &CrossEntry) {
        let (a, b) = entry.sides();
        self.cross_entries.remove(&a.transaction);
        self.cross_entries.remove(&b.transaction);
    }

    /// Propagate the fields of a paired transaction to its counterpart
    pub fn update_from(&mut self, uuid: &str) -> Result<()> {
        let entry = self
            .cross_entries
            .get(uuid)
            .cloned()
            .ok_or_else(|| LedgerError::Lookup {
                transaction: uuid.to_string(),
            })?;
        entry.update_from(self, uuid)
    }

    /// Delete a transaction from its owner.
    ///
    /// A transaction that is half of a cross entry takes its counterpart with
    /// it. Either both are removed or, on error, neither.
    pub fn delete_transaction(&mut self, owner: &OwnerRef, uuid: &str) -> Result<()> {
        let is_cross = match owner {
            OwnerRef::Account(account) => self.account_transaction(account, uuid)?.is_cross_type(),
            OwnerRef::Portfolio(portfolio) => {
                self.portfolio_transaction(portfolio, uuid)?.is_cross_type()
            }
        };

        if !is_cross {
            self.detach(owner, uuid)?;
            log::debug!("Deleted transaction {} from {}", uuid, owner);
            return Ok(());
        }

        let entry = match self.cross_entries.get(uuid) {
            Some(entry) => entry.clone(),
            None => {
                log::error!("Transaction {} in {} has no cross entry", uuid, owner);
                return Err(LedgerError::Lookup {
                    transaction: uuid.to_string(),
                });
            }
        };

        if entry.side(uuid)?.owner != *owner {
            return Err(LedgerError::InvariantViolation(format!(
                "cross entry places transaction '{}' outside {}",
                uuid, owner
            )));
        }

        let other = entry.cross_side(uuid)?.clone();
        if !self.holds(&other.owner, &other.transaction) {
            return Err(AttachmentError::NotFound {
                owner: other.owner,
                transaction: other.transaction,
            }
            .into());
        }

        self.detach(&other.owner, &other.transaction)?;
        self.detach(owner, uuid)?;
        self.unregister(&entry);

        log::debug!(
            "Deleted {:?} entry: {} from {} and {} from {}",
            entry.kind(),
            uuid,
            owner,
            other.transaction,
            other.owner
        );
        Ok(())
    }

    /// Attached transactions of a cross type that no cross entry manages
    pub fn unpaired_transactions(&self) -> Vec<(OwnerRef, String)> {
        let accounts = self.accounts.iter().flat_map(|account| {
            account
                .transactions()
                .iter()
                .filter(|tx| tx.is_cross_type())
                .map(move |tx| (account.owner_ref(), tx.uuid().to_string()))
        });
        let portfolios = self.portfolios.iter().flat_map(|portfolio| {
            portfolio
                .transactions()
                .iter()
                .filter(|tx| tx.is_cross_type())
                .map(move |tx| (portfolio.owner_ref(), tx.uuid().to_string()))
        });

        accounts
            .chain(portfolios)
            .filter(|(_, uuid)| !self.cross_entries.contains_key(uuid))
            .collect()
    }
}

fn not_found<O: TransactionOwner>(owner: &O, uuid: &str) -> AttachmentError {
    AttachmentError::NotFound {
        owner: owner.owner_ref(),
        transaction: uuid.to_string(),
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY)
    }
}
