//! Cross entries pair two transactions held by two different owners.
//!
//! A buy or sell is a portfolio transaction plus the matching cash movement
//! on an account. A transfer is an outbound and an inbound transaction of the
//! same kind. The pair is created, updated and deleted as a unit.
//!
//! Entries are built through one of the staged types ([`BuySellEntry`],
//! [`AccountTransferEntry`], [`PortfolioTransferEntry`]). `insert` moves both
//! transactions into their owners and yields the [`CrossEntry`] relation that
//! the client keeps in its index.

mod account_transfer;
mod buy_sell;
mod portfolio_transfer;

pub use account_transfer::AccountTransferEntry;
pub use buy_sell::BuySellEntry;
pub use portfolio_transfer::PortfolioTransferEntry;

use serde::{Deserialize, Serialize};

use super::client::Client;
use super::owner::OwnerRef;
use super::transaction::{
    AccountTransaction, AccountTransactionType, PortfolioTransaction, PortfolioTransactionType,
    Transaction,
};
use crate::errors::{AttachmentError, LedgerError, Result, ValidationError};

/// Cross-entry type for linked transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossEntryType {
    /// Transfer between portfolios
    PortfolioTransfer,
    /// Transfer between accounts
    AccountTransfer,
    /// Buy/sell pair (portfolio transaction + account transaction)
    BuySell,
}

/// One half of a cross entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossSide {
    pub owner: OwnerRef,
    /// UUID of the transaction held by `owner`
    pub transaction: String,
}

impl CrossSide {
    fn new(owner: OwnerRef, transaction: &str) -> Self {
        Self {
            owner,
            transaction: transaction.to_string(),
        }
    }
}

/// The relation between two paired transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossEntry {
    BuySell {
        portfolio: CrossSide,
        account: CrossSide,
    },
    AccountTransfer {
        source: CrossSide,
        target: CrossSide,
    },
    PortfolioTransfer {
        source: CrossSide,
        target: CrossSide,
    },
}

impl CrossEntry {
    pub fn kind(&self) -> CrossEntryType {
        match self {
            Self::BuySell { .. } => CrossEntryType::BuySell,
            Self::AccountTransfer { .. } => CrossEntryType::AccountTransfer,
            Self::PortfolioTransfer { .. } => CrossEntryType::PortfolioTransfer,
        }
    }

    /// Both sides; the portfolio side or the transfer source comes first
    pub fn sides(&self) -> (&CrossSide, &CrossSide) {
        match self {
            Self::BuySell { portfolio, account } => (portfolio, account),
            Self::AccountTransfer { source, target } | Self::PortfolioTransfer { source, target } => {
                (source, target)
            }
        }
    }

    pub fn contains(&self, uuid: &str) -> bool {
        let (a, b) = self.sides();
        a.transaction == uuid || b.transaction == uuid
    }

    /// The side holding the given transaction
    pub fn side(&self, uuid: &str) -> Result<&CrossSide> {
        self.orient(uuid).map(|(this, _)| this)
    }

    /// The side opposite the given transaction
    pub fn cross_side(&self, uuid: &str) -> Result<&CrossSide> {
        self.orient(uuid).map(|(_, other)| other)
    }

    /// Owner of the counterpart of the given transaction
    pub fn cross_owner(&self, uuid: &str) -> Result<&OwnerRef> {
        self.cross_side(uuid).map(|side| &side.owner)
    }

    /// UUID of the counterpart of the given transaction
    pub fn cross_transaction(&self, uuid: &str) -> Result<&str> {
        self.cross_side(uuid).map(|side| side.transaction.as_str())
    }

    fn orient(&self, uuid: &str) -> Result<(&CrossSide, &CrossSide)> {
        let (a, b) = self.sides();
        if a.transaction == uuid {
            Ok((a, b))
        } else if b.transaction == uuid {
            Ok((b, a))
        } else {
            Err(LedgerError::unmanaged(uuid))
        }
    }

    /// Copy the fields of the given transaction onto its counterpart.
    ///
    /// The counterpart is rebuilt and checked before anything is written, so
    /// an error leaves both transactions as they were.
    pub fn update_from(&self, client: &mut Client, uuid: &str) -> Result<()> {
        let (this, other) = self.orient(uuid)?;

        match self {
            Self::BuySell { portfolio, account } => {
                if this == portfolio {
                    let source = client
                        .portfolio_transaction(portfolio.owner.uuid(), &portfolio.transaction)?
                        .clone();
                    let mut updated = client
                        .account_transaction(account.owner.uuid(), &account.transaction)?
                        .clone();
                    mirror_trade_to_account(&source, &mut updated)?;
                    *client.account_transaction_mut(account.owner.uuid(), &account.transaction)? =
                        updated;
                } else {
                    let source = client
                        .account_transaction(account.owner.uuid(), &account.transaction)?
                        .clone();
                    let mut updated = client
                        .portfolio_transaction(portfolio.owner.uuid(), &portfolio.transaction)?
                        .clone();
                    mirror_trade_to_portfolio(&source, &mut updated)?;
                    ensure_security(client, &updated)?;
                    *client
                        .portfolio_transaction_mut(portfolio.owner.uuid(), &portfolio.transaction)? =
                        updated;
                }
            }
            Self::AccountTransfer { .. } => {
                let source = client
                    .account_transaction(this.owner.uuid(), &this.transaction)?
                    .clone();
                let mut updated = client
                    .account_transaction(other.owner.uuid(), &other.transaction)?
                    .clone();
                mirror_account_transfer(&source, &mut updated)?;
                *client.account_transaction_mut(other.owner.uuid(), &other.transaction)? = updated;
            }
            Self::PortfolioTransfer { .. } => {
                let source = client
                    .portfolio_transaction(this.owner.uuid(), &this.transaction)?
                    .clone();
                let mut updated = client
                    .portfolio_transaction(other.owner.uuid(), &other.transaction)?
                    .clone();
                mirror_portfolio_transfer(&source, &mut updated)?;
                ensure_security(client, &updated)?;
                *client.portfolio_transaction_mut(other.owner.uuid(), &other.transaction)? =
                    updated;
            }
        }

        log::debug!(
            "Updated {} in {} from {}",
            other.transaction,
            other.owner,
            uuid
        );
        Ok(())
    }
}

/// Attach both sides of a new entry, all or nothing.
///
/// `attach_first` and `attach_second` must attach the transactions named by
/// the first and second side of `entry`.
fn insert_pair(
    client: &mut Client,
    entry: CrossEntry,
    attach_first: impl FnOnce(&mut Client) -> std::result::Result<(), AttachmentError>,
    attach_second: impl FnOnce(&mut Client) -> std::result::Result<(), AttachmentError>,
) -> Result<CrossEntry> {
    let (first, second) = entry.sides();

    if first.owner == second.owner {
        return Err(ValidationError::SameOwner(first.owner.clone()).into());
    }
    for side in [first, second] {
        if !client.has_owner(&side.owner) {
            return Err(AttachmentError::UnknownOwner(side.owner.clone()).into());
        }
        if client.is_paired(&side.transaction) {
            return Err(AttachmentError::AlreadyPaired(side.transaction.clone()).into());
        }
    }

    attach_first(client)?;
    if let Err(err) = attach_second(client) {
        log::warn!(
            "Rolling back {} in {}: {}",
            first.transaction,
            first.owner,
            err
        );
        if let Err(rollback) = client.detach(&first.owner, &first.transaction) {
            log::error!("Rollback of {} failed: {}", first.transaction, rollback);
        }
        return Err(err.into());
    }

    client.register(&entry);
    log::debug!(
        "Inserted {:?} entry: {} in {} and {} in {}",
        entry.kind(),
        first.transaction,
        first.owner,
        second.transaction,
        second.owner
    );
    Ok(entry)
}

/// A portfolio transaction must name a security the client knows
fn ensure_security(client: &Client, tx: &PortfolioTransaction) -> Result<()> {
    let security = tx
        .security_uuid()
        .ok_or_else(|| ValidationError::MissingSecurity(tx.uuid().to_string()))?;
    if client.find_security(security).is_none() {
        return Err(ValidationError::UnknownSecurity(security.to_string()).into());
    }
    Ok(())
}

fn trade_type_of_account(
    account_type: AccountTransactionType,
) -> std::result::Result<PortfolioTransactionType, ValidationError> {
    match account_type {
        AccountTransactionType::Buy => Ok(PortfolioTransactionType::Buy),
        AccountTransactionType::Sell => Ok(PortfolioTransactionType::Sell),
        other => Err(ValidationError::NotATradeType(other.as_str().to_string())),
    }
}

/// Cash side of a trade: net amount, type, date, currency, security, note.
///
/// The mirror functions may leave `target` half written on error; callers
/// pass a copy.
fn mirror_trade_to_account(
    source: &PortfolioTransaction,
    target: &mut AccountTransaction,
) -> std::result::Result<(), ValidationError> {
    let account_type = source
        .transaction_type()
        .to_account_type()
        .ok_or_else(|| ValidationError::NotATradeType(source.transaction_type().as_str().to_string()))?;
    let net = source.net_amount()?;

    target.set_type(account_type);
    target.set_date(source.date());
    target.set_currency_code(&net.currency)?;
    target.set_amount(net.amount)?;
    target.set_security(source.security_uuid().map(str::to_string));
    target.set_note(source.note().map(str::to_string));
    Ok(())
}

/// Security side of a trade: gross is derived from the cash amount and the
/// portfolio transaction's own fees and taxes
fn mirror_trade_to_portfolio(
    source: &AccountTransaction,
    target: &mut PortfolioTransaction,
) -> std::result::Result<(), ValidationError> {
    target.set_type(trade_type_of_account(source.transaction_type())?);
    // fees and taxes cannot follow a currency change
    target.set_currency_code(source.currency_code())?;

    let gross = target.gross_for_net(source.amount())?;
    target.set_amount(gross.amount)?;
    target.set_date(source.date());
    target.set_security(source.security_uuid().map(str::to_string));
    target.set_note(source.note().map(str::to_string));
    Ok(())
}

fn mirror_account_transfer(
    source: &AccountTransaction,
    target: &mut AccountTransaction,
) -> std::result::Result<(), ValidationError> {
    target.set_currency_code(source.currency_code())?;
    target.set_amount(source.amount().amount)?;
    target.set_date(source.date());
    target.set_note(source.note().map(str::to_string));
    Ok(())
}

fn mirror_portfolio_transfer(
    source: &PortfolioTransaction,
    target: &mut PortfolioTransaction,
) -> std::result::Result<(), ValidationError> {
    target.set_shares(source.shares())?;
    target.set_currency_code(source.currency_code())?;
    target.set_amount(source.amount().amount)?;
    target.set_date(source.date());
    target.set_security(source.security_uuid().map(str::to_string));
    target.set_note(source.note().map(str::to_string));
    Ok(())
}

/// Client with two accounts, two portfolios and one security
#[cfg(test)]
struct Fixture {
    client: Client,
    accounts: [String; 2],
    portfolios: [String; 2],
    security: super::security::Security,
}

#[cfg(test)]
impl Fixture {
    fn new() -> Self {
        let mut client = Client::default();
        let accounts = [client.create_account("Cash A"), client.create_account("Cash B")];
        let portfolios = [
            client.create_portfolio("Depot A"),
            client.create_portfolio("Depot B"),
        ];
        let security = super::security::Security::new(
            "sec-1".to_string(),
            "Some security".to_string(),
            "EUR".to_string(),
        );
        client.add_security(security.clone());
        Self {
            client,
            accounts,
            portfolios,
            security,
        }
    }

    fn account(&self, i: usize) -> &super::account::Account {
        self.client.find_account(&self.accounts[i]).unwrap()
    }

    fn portfolio(&self, i: usize) -> &super::portfolio::Portfolio {
        self.client.find_portfolio(&self.portfolios[i]).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(owner: OwnerRef, tx: &str) -> CrossSide {
        CrossSide::new(owner, tx)
    }

    fn transfer() -> CrossEntry {
        CrossEntry::AccountTransfer {
            source: side(OwnerRef::Account("a".to_string()), "tx-a"),
            target: side(OwnerRef::Account("b".to_string()), "tx-b"),
        }
    }

    #[test]
    fn test_cross_lookup_is_symmetric() {
        let entry = transfer();
        assert_eq!(entry.kind(), CrossEntryType::AccountTransfer);
        assert_eq!(entry.cross_transaction("tx-a").unwrap(), "tx-b");
        assert_eq!(entry.cross_transaction("tx-b").unwrap(), "tx-a");
        assert_eq!(entry.cross_owner("tx-a").unwrap(), &OwnerRef::Account("b".to_string()));
        assert_eq!(entry.cross_owner("tx-b").unwrap(), &OwnerRef::Account("a".to_string()));
        assert_eq!(entry.side("tx-a").unwrap().owner, OwnerRef::Account("a".to_string()));
        assert!(entry.contains("tx-b"));
        assert!(!entry.contains("tx-c"));
    }

    #[test]
    fn test_unmanaged_transaction_is_invariant_violation() {
        let entry = transfer();
        assert!(matches!(
            entry.cross_owner("tx-c"),
            Err(LedgerError::InvariantViolation(_))
        ));
        assert!(matches!(
            entry.cross_transaction("tx-c"),
            Err(LedgerError::InvariantViolation(_))
        ));
        let mut client = Client::default();
        assert!(matches!(
            entry.update_from(&mut client, "tx-c"),
            Err(LedgerError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_update_from_detached_side_fails() {
        let entry = transfer();
        let mut client = Client::default();
        assert!(matches!(
            entry.update_from(&mut client, "tx-a"),
            Err(LedgerError::Attachment(AttachmentError::UnknownOwner(_)))
        ));
    }

    #[test]
    fn test_cross_entry_json() {
        let json = serde_json::to_value(transfer()).unwrap();
        assert_eq!(json["type"], "ACCOUNT_TRANSFER");
        assert_eq!(json["source"]["transaction"], "tx-a");
        assert_eq!(json["target"]["owner"]["kind"], "account");
        assert_eq!(
            serde_json::to_string(&CrossEntryType::BuySell).unwrap(),
            "\"BUY_SELL\""
        );
    }
}
