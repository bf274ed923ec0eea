//! Portfolio ledger data models.
//!
//! Accounts hold cash transactions, portfolios hold security transactions.
//! Trades and transfers are recorded as cross entries: two transactions in
//! two different owners that are kept consistent with each other.

pub mod account;
pub mod client;
pub mod common;
pub mod cross_entry;
pub mod owner;
pub mod portfolio;
pub mod security;
pub mod transaction;

// Re-export main types for convenience
pub use account::Account;
pub use client::Client;
pub use common::{ForexInfo, Money, AMOUNT_FACTOR, DEFAULT_CURRENCY, SHARES_FACTOR};
pub use cross_entry::{
    AccountTransferEntry, BuySellEntry, CrossEntry, CrossEntryType, CrossSide,
    PortfolioTransferEntry,
};
pub use owner::{OwnerRef, TransactionOwner};
pub use portfolio::Portfolio;
pub use security::Security;
pub use transaction::{
    AccountTransaction, AccountTransactionType, PortfolioTransaction, PortfolioTransactionType,
    Transaction, TransactionUnit, UnitType,
};
