use chrono::NaiveDateTime;

use super::{ensure_security, insert_pair, mirror_trade_to_account, CrossEntry, CrossSide};
use crate::errors::{Result, ValidationError};
use crate::pp::account::Account;
use crate::pp::client::Client;
use crate::pp::owner::OwnerRef;
use crate::pp::portfolio::Portfolio;
use crate::pp::security::Security;
use crate::pp::transaction::{
    AccountTransaction, AccountTransactionType, PortfolioTransaction, PortfolioTransactionType,
    Transaction,
};

/// A trade: shares move in the portfolio, cash moves on the account.
///
/// The amount is the gross value of the shares and lives on the portfolio
/// transaction together with the fee and tax units. The account receives the
/// net cash amount, derived when the entry is inserted.
#[derive(Debug, Clone)]
pub struct BuySellEntry {
    portfolio: String,
    account: String,
    portfolio_transaction: PortfolioTransaction,
    account_transaction: AccountTransaction,
}

impl BuySellEntry {
    /// A purchase in the account's currency, dated now
    pub fn new(portfolio: &Portfolio, account: &Account) -> Self {
        Self {
            portfolio: portfolio.uuid.clone(),
            account: account.uuid.clone(),
            portfolio_transaction: PortfolioTransaction::blank(
                PortfolioTransactionType::Buy,
                &account.currency,
            ),
            account_transaction: AccountTransaction::blank(
                AccountTransactionType::Buy,
                &account.currency,
            ),
        }
    }

    pub fn portfolio_transaction(&self) -> &PortfolioTransaction {
        &self.portfolio_transaction
    }

    /// For adding fee and tax units before insertion
    pub fn portfolio_transaction_mut(&mut self) -> &mut PortfolioTransaction {
        &mut self.portfolio_transaction
    }

    pub fn account_transaction(&self) -> &AccountTransaction {
        &self.account_transaction
    }

    pub fn set_type(&mut self, transaction_type: PortfolioTransactionType) -> Result<()> {
        let account_type = transaction_type
            .to_account_type()
            .ok_or_else(|| ValidationError::NotATradeType(transaction_type.as_str().to_string()))?;
        self.portfolio_transaction.set_type(transaction_type);
        self.account_transaction.set_type(account_type);
        Ok(())
    }

    pub fn set_date(&mut self, date: NaiveDateTime) {
        self.portfolio_transaction.set_date(date);
        self.account_transaction.set_date(date);
    }

    /// Gross value of the shares
    pub fn set_amount(&mut self, amount: i64) -> Result<()> {
        self.portfolio_transaction.set_amount(amount)?;
        Ok(())
    }

    pub fn set_shares(&mut self, shares: i64) -> Result<()> {
        self.portfolio_transaction.set_shares(shares)?;
        Ok(())
    }

    pub fn set_security(&mut self, security: &Security) {
        self.portfolio_transaction
            .set_security(Some(security.uuid.clone()));
        self.account_transaction
            .set_security(Some(security.uuid.clone()));
    }

    /// Fails without changing either side while fee or tax units are attached
    /// in another currency
    pub fn set_currency_code(&mut self, currency: &str) -> Result<()> {
        self.portfolio_transaction.set_currency_code(currency)?;
        self.account_transaction.set_currency_code(currency)?;
        Ok(())
    }

    pub fn set_note(&mut self, note: Option<String>) {
        self.portfolio_transaction.set_note(note.clone());
        self.account_transaction.set_note(note);
    }

    /// The relation this entry will register on insert
    pub fn cross_entry(&self) -> CrossEntry {
        CrossEntry::BuySell {
            portfolio: CrossSide::new(
                OwnerRef::Portfolio(self.portfolio.clone()),
                self.portfolio_transaction.uuid(),
            ),
            account: CrossSide::new(
                OwnerRef::Account(self.account.clone()),
                self.account_transaction.uuid(),
            ),
        }
    }

    pub fn cross_owner(&self, uuid: &str) -> Result<OwnerRef> {
        self.cross_entry().cross_owner(uuid).cloned()
    }

    pub fn cross_transaction(&self, uuid: &str) -> Result<String> {
        self.cross_entry().cross_transaction(uuid).map(str::to_string)
    }

    /// Derive the cash side and attach both transactions
    pub fn insert(self, client: &mut Client) -> Result<CrossEntry> {
        let entry = self.cross_entry();
        let Self {
            portfolio,
            account,
            portfolio_transaction,
            mut account_transaction,
        } = self;

        ensure_security(client, &portfolio_transaction)?;
        mirror_trade_to_account(&portfolio_transaction, &mut account_transaction)?;

        insert_pair(
            client,
            entry,
            |client| client.attach_portfolio_transaction(&portfolio, portfolio_transaction),
            |client| client.attach_account_transaction(&account, account_transaction),
        )
    }
}
