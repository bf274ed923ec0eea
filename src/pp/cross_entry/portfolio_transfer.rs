use chrono::NaiveDateTime;

use super::{ensure_security, insert_pair, mirror_portfolio_transfer, CrossEntry, CrossSide};
use crate::errors::Result;
use crate::pp::client::Client;
use crate::pp::common::DEFAULT_CURRENCY;
use crate::pp::owner::OwnerRef;
use crate::pp::portfolio::Portfolio;
use crate::pp::security::Security;
use crate::pp::transaction::{PortfolioTransaction, PortfolioTransactionType, Transaction};

/// Shares of one security moved from one portfolio to another.
#[derive(Debug, Clone)]
pub struct PortfolioTransferEntry {
    source: String,
    target: String,
    source_transaction: PortfolioTransaction,
    target_transaction: PortfolioTransaction,
}

impl PortfolioTransferEntry {
    pub fn new(source: &Portfolio, target: &Portfolio) -> Self {
        Self {
            source: source.uuid.clone(),
            target: target.uuid.clone(),
            source_transaction: PortfolioTransaction::blank(
                PortfolioTransactionType::TransferOut,
                DEFAULT_CURRENCY,
            ),
            target_transaction: PortfolioTransaction::blank(
                PortfolioTransactionType::TransferIn,
                DEFAULT_CURRENCY,
            ),
        }
    }

    pub fn source_transaction(&self) -> &PortfolioTransaction {
        &self.source_transaction
    }

    pub fn target_transaction(&self) -> &PortfolioTransaction {
        &self.target_transaction
    }

    pub fn set_date(&mut self, date: NaiveDateTime) {
        self.source_transaction.set_date(date);
        self.target_transaction.set_date(date);
    }

    pub fn set_amount(&mut self, amount: i64) -> Result<()> {
        self.source_transaction.set_amount(amount)?;
        self.target_transaction.set_amount(amount)?;
        Ok(())
    }

    pub fn set_shares(&mut self, shares: i64) -> Result<()> {
        self.source_transaction.set_shares(shares)?;
        self.target_transaction.set_shares(shares)?;
        Ok(())
    }

    pub fn set_security(&mut self, security: &Security) {
        self.source_transaction
            .set_security(Some(security.uuid.clone()));
        self.target_transaction
            .set_security(Some(security.uuid.clone()));
    }

    pub fn set_currency_code(&mut self, currency: &str) -> Result<()> {
        self.source_transaction.set_currency_code(currency)?;
        self.target_transaction.set_currency_code(currency)?;
        Ok(())
    }

    pub fn set_note(&mut self, note: Option<String>) {
        self.source_transaction.set_note(note.clone());
        self.target_transaction.set_note(note);
    }

    pub fn cross_entry(&self) -> CrossEntry {
        CrossEntry::PortfolioTransfer {
            source: CrossSide::new(
                OwnerRef::Portfolio(self.source.clone()),
                self.source_transaction.uuid(),
            ),
            target: CrossSide::new(
                OwnerRef::Portfolio(self.target.clone()),
                self.target_transaction.uuid(),
            ),
        }
    }

    pub fn cross_owner(&self, uuid: &str) -> Result<OwnerRef> {
        self.cross_entry().cross_owner(uuid).cloned()
    }

    pub fn cross_transaction(&self, uuid: &str) -> Result<String> {
        self.cross_entry().cross_transaction(uuid).map(str::to_string)
    }

    pub fn insert(self, client: &mut Client) -> Result<CrossEntry> {
        let entry = self.cross_entry();
        let Self {
            source,
            target,
            source_transaction,
            mut target_transaction,
        } = self;

        ensure_security(client, &source_transaction)?;
        mirror_portfolio_transfer(&source_transaction, &mut target_transaction)?;

        insert_pair(
            client,
            entry,
            |client| client.attach_portfolio_transaction(&source, source_transaction),
            |client| client.attach_portfolio_transaction(&target, target_transaction),
        )
    }
}
