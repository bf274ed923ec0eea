//! Transaction types.
//!
//! Transactions can belong to either accounts (AccountTransaction) or
//! portfolios (PortfolioTransaction). They share common fields, exposed
//! through the [`Transaction`] trait, but have different transaction types.
//! Setters only change the transaction itself; keeping a paired transaction
//! in sync is the job of the cross entry.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::common::{ForexInfo, Money};
use crate::errors::ValidationError;

/// Unit type for transaction components (fees, taxes, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitType {
    /// Broker/transaction fee
    Fee,
    /// Tax amount
    Tax,
    /// Gross transaction value (before fees/taxes)
    GrossValue,
}

/// A single unit (component) of a transaction. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUnit {
    unit_type: UnitType,
    amount: Money,
    /// Forex information if the unit was in a different currency
    forex: Option<ForexInfo>,
}

impl TransactionUnit {
    pub fn new(unit_type: UnitType, amount: Money) -> Self {
        Self {
            unit_type,
            amount,
            forex: None,
        }
    }

    /// Create a unit that was originally booked in a foreign currency.
    ///
    /// The forex amount must be in a different currency than `amount` and
    /// carry a positive exchange rate.
    pub fn with_forex(
        unit_type: UnitType,
        amount: Money,
        forex: ForexInfo,
    ) -> Result<Self, ValidationError> {
        if forex.amount.currency == amount.currency {
            return Err(ValidationError::InvalidForex(amount.currency));
        }
        if !forex.has_rate() {
            return Err(ValidationError::MissingExchangeRate {
                currency: amount.currency,
                forex: forex.amount.currency,
            });
        }
        Ok(Self {
            unit_type,
            amount,
            forex: Some(forex),
        })
    }

    /// Create a fee unit
    pub fn fee(amount: Money) -> Self {
        Self::new(UnitType::Fee, amount)
    }

    /// Create a tax unit
    pub fn tax(amount: Money) -> Self {
        Self::new(UnitType::Tax, amount)
    }

    /// Create a gross value unit
    pub fn gross_value(amount: Money) -> Self {
        Self::new(UnitType::GrossValue, amount)
    }

    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }

    pub fn forex(&self) -> Option<&ForexInfo> {
        self.forex.as_ref()
    }
}

/// Fields shared by account and portfolio transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCore {
    uuid: String,
    date: NaiveDateTime,
    amount: Money,
    security_uuid: Option<String>,
    units: Vec<TransactionUnit>,
    note: Option<String>,
}

impl TransactionCore {
    fn new(date: NaiveDateTime, amount: Money) -> Result<Self, ValidationError> {
        if amount.amount < 0 {
            return Err(ValidationError::NegativeAmount(amount.amount));
        }
        Ok(Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            date,
            amount,
            security_uuid: None,
            units: Vec::new(),
            note: None,
        })
    }

    fn blank(currency: &str) -> Self {
        Self {
            uuid: uuid::Uuid::new_v4().to_string(),
            date: chrono::Local::now().naive_local(),
            amount: Money::zero(currency),
            security_uuid: None,
            units: Vec::new(),
            note: None,
        }
    }
}

mod sealed {
    pub trait HasCore {
        fn core(&self) -> &super::TransactionCore;
        fn core_mut(&mut self) -> &mut super::TransactionCore;
    }
}

/// Behavior shared by both transaction kinds.
pub trait Transaction: sealed::HasCore {
    /// Whether the type of this transaction requires a counterpart
    fn is_cross_type(&self) -> bool;

    fn uuid(&self) -> &str {
        &self.core().uuid
    }

    fn date(&self) -> NaiveDateTime {
        self.core().date
    }

    fn set_date(&mut self, date: NaiveDateTime) {
        self.core_mut().date = date;
    }

    fn amount(&self) -> &Money {
        &self.core().amount
    }

    /// Replace the amount (smallest currency units), keeping the currency
    fn set_amount(&mut self, amount: i64) -> Result<(), ValidationError> {
        if amount < 0 {
            return Err(ValidationError::NegativeAmount(amount));
        }
        self.core_mut().amount.amount = amount;
        Ok(())
    }

    fn currency_code(&self) -> &str {
        &self.core().amount.currency
    }

    /// Change the currency. Fails while units in another currency are attached.
    fn set_currency_code(&mut self, currency: &str) -> Result<(), ValidationError> {
        if let Some(unit) = self.units().iter().find(|u| u.amount.currency != currency) {
            return Err(ValidationError::CurrencyMismatch {
                expected: currency.to_string(),
                actual: unit.amount.currency.clone(),
            });
        }
        self.core_mut().amount.currency = currency.to_string();
        Ok(())
    }

    fn security_uuid(&self) -> Option<&str> {
        self.core().security_uuid.as_deref()
    }

    fn set_security(&mut self, security_uuid: Option<String>) {
        self.core_mut().security_uuid = security_uuid;
    }

    fn note(&self) -> Option<&str> {
        self.core().note.as_deref()
    }

    fn set_note(&mut self, note: Option<String>) {
        self.core_mut().note = note;
    }

    fn units(&self) -> &[TransactionUnit] {
        &self.core().units
    }

    /// Attach a unit; its amount must be in the transaction currency
    fn add_unit(&mut self, unit: TransactionUnit) -> Result<(), ValidationError> {
        if unit.amount.currency != self.currency_code() {
            return Err(ValidationError::CurrencyMismatch {
                expected: self.currency_code().to_string(),
                actual: unit.amount.currency.clone(),
            });
        }
        self.core_mut().units.push(unit);
        Ok(())
    }

    /// First unit of the given type
    fn unit(&self, unit_type: UnitType) -> Option<&TransactionUnit> {
        self.units().iter().find(|u| u.unit_type == unit_type)
    }

    fn remove_units(&mut self, unit_type: UnitType) {
        self.core_mut().units.retain(|u| u.unit_type != unit_type);
    }

    fn clear_units(&mut self) {
        self.core_mut().units.clear();
    }

    /// Sum of all units of a type, zero in the transaction currency if none
    fn unit_sum(&self, unit_type: UnitType) -> Result<Money, ValidationError> {
        self.units()
            .iter()
            .filter(|u| u.unit_type == unit_type)
            .try_fold(Money::zero(self.currency_code()), |sum, u| {
                sum.checked_add(&u.amount)
            })
    }
}

/// Account transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountTransactionType {
    /// Cash deposit
    Deposit,
    /// Cash withdrawal
    Removal,
    /// Interest income
    Interest,
    /// Interest charge (negative)
    InterestCharge,
    /// Dividend payment
    Dividends,
    /// Fee charge
    Fees,
    /// Fee refund
    FeesRefund,
    /// Tax charge
    Taxes,
    /// Tax refund
    TaxRefund,
    /// Buy (debit when paying from cash)
    Buy,
    /// Sell (credit when receiving cash)
    Sell,
    /// Transfer in from another account
    TransferIn,
    /// Transfer out to another account
    TransferOut,
}

impl AccountTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Removal => "REMOVAL",
            Self::Interest => "INTEREST",
            Self::InterestCharge => "INTEREST_CHARGE",
            Self::Dividends => "DIVIDENDS",
            Self::Fees => "FEES",
            Self::FeesRefund => "FEES_REFUND",
            Self::Taxes => "TAXES",
            Self::TaxRefund => "TAX_REFUND",
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::TransferIn => "TRANSFER_IN",
            Self::TransferOut => "TRANSFER_OUT",
        }
    }

    /// Is this a credit (money coming in)?
    pub fn is_credit(&self) -> bool {
        matches!(
            self,
            Self::Deposit
                | Self::Interest
                | Self::Dividends
                | Self::FeesRefund
                | Self::TaxRefund
                | Self::Sell
                | Self::TransferIn
        )
    }

    /// Types that only exist as one half of a cross entry
    pub fn is_cross_type(&self) -> bool {
        matches!(
            self,
            Self::Buy | Self::Sell | Self::TransferIn | Self::TransferOut
        )
    }
}

/// Portfolio transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PortfolioTransactionType {
    /// Purchase of securities
    Buy,
    /// Sale of securities
    Sell,
    /// Transfer in from another portfolio
    TransferIn,
    /// Transfer out to another portfolio
    TransferOut,
    /// Delivery inbound (non-cash inflow)
    DeliveryInbound,
    /// Delivery outbound (non-cash outflow)
    DeliveryOutbound,
}

impl PortfolioTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::TransferIn => "TRANSFER_IN",
            Self::TransferOut => "TRANSFER_OUT",
            Self::DeliveryInbound => "DELIVERY_INBOUND",
            Self::DeliveryOutbound => "DELIVERY_OUTBOUND",
        }
    }

    /// Is this a purchase (shares coming in)?
    pub fn is_purchase(&self) -> bool {
        matches!(self, Self::Buy | Self::TransferIn | Self::DeliveryInbound)
    }

    /// Types that only exist as one half of a cross entry
    pub fn is_cross_type(&self) -> bool {
        matches!(
            self,
            Self::Buy | Self::Sell | Self::TransferIn | Self::TransferOut
        )
    }

    /// The cash side of a trade
    pub fn to_account_type(&self) -> Option<AccountTransactionType> {
        match self {
            Self::Buy => Some(AccountTransactionType::Buy),
            Self::Sell => Some(AccountTransactionType::Sell),
            _ => None,
        }
    }
}

/// Account transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTransaction {
    #[serde(flatten)]
    core: TransactionCore,
    transaction_type: AccountTransactionType,
}

impl AccountTransaction {
    pub fn new(
        date: NaiveDateTime,
        transaction_type: AccountTransactionType,
        amount: Money,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            core: TransactionCore::new(date, amount)?,
            transaction_type,
        })
    }

    /// Zero amount, dated now
    pub(crate) fn blank(transaction_type: AccountTransactionType, currency: &str) -> Self {
        Self {
            core: TransactionCore::blank(currency),
            transaction_type,
        }
    }

    pub fn transaction_type(&self) -> AccountTransactionType {
        self.transaction_type
    }

    pub(crate) fn set_type(&mut self, transaction_type: AccountTransactionType) {
        self.transaction_type = transaction_type;
    }
}

impl sealed::HasCore for AccountTransaction {
    fn core(&self) -> &TransactionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TransactionCore {
        &mut self.core
    }
}

impl Transaction for AccountTransaction {
    fn is_cross_type(&self) -> bool {
        self.transaction_type.is_cross_type()
    }
}

/// Portfolio transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioTransaction {
    #[serde(flatten)]
    core: TransactionCore,
    transaction_type: PortfolioTransactionType,
    /// Number of shares - stored as shares * 10^8
    shares: i64,
}

impl PortfolioTransaction {
    pub fn new(
        date: NaiveDateTime,
        transaction_type: PortfolioTransactionType,
        amount: Money,
        shares: i64,
    ) -> Result<Self, ValidationError> {
        if shares < 0 {
            return Err(ValidationError::NegativeShares(shares));
        }
        Ok(Self {
            core: TransactionCore::new(date, amount)?,
            transaction_type,
            shares,
        })
    }

    /// Zero amount and shares, dated now
    pub(crate) fn blank(transaction_type: PortfolioTransactionType, currency: &str) -> Self {
        Self {
            core: TransactionCore::blank(currency),
            transaction_type,
            shares: 0,
        }
    }

    pub fn transaction_type(&self) -> PortfolioTransactionType {
        self.transaction_type
    }

    pub(crate) fn set_type(&mut self, transaction_type: PortfolioTransactionType) {
        self.transaction_type = transaction_type;
    }

    pub fn shares(&self) -> i64 {
        self.shares
    }

    pub fn set_shares(&mut self, shares: i64) -> Result<(), ValidationError> {
        if shares < 0 {
            return Err(ValidationError::NegativeShares(shares));
        }
        self.shares = shares;
        Ok(())
    }

    /// Get shares as decimal
    pub fn shares_decimal(&self) -> f64 {
        super::common::shares::to_decimal(self.shares)
    }

    /// Fees plus taxes in the transaction currency
    pub fn costs(&self) -> Result<Money, ValidationError> {
        self.unit_sum(UnitType::Fee)?
            .checked_add(&self.unit_sum(UnitType::Tax)?)
    }

    /// Cash that actually changes hands for this transaction.
    ///
    /// The amount is the gross value of the shares. Buying costs gross plus
    /// fees and taxes; selling yields gross minus fees and taxes.
    pub fn net_amount(&self) -> Result<Money, ValidationError> {
        let net = if self.transaction_type.is_purchase() {
            self.amount().checked_add(&self.costs()?)?
        } else {
            self.amount().checked_sub(&self.costs()?)?
        };
        if net.amount < 0 {
            return Err(ValidationError::NegativeAmount(net.amount));
        }
        Ok(net)
    }

    /// Inverse of [`net_amount`](Self::net_amount) using this transaction's units
    pub fn gross_for_net(&self, net: &Money) -> Result<Money, ValidationError> {
        let gross = if self.transaction_type.is_purchase() {
            net.checked_sub(&self.costs()?)?
        } else {
            net.checked_add(&self.costs()?)?
        };
        if gross.amount < 0 {
            return Err(ValidationError::NegativeAmount(gross.amount));
        }
        Ok(gross)
    }
}

impl sealed::HasCore for PortfolioTransaction {
    fn core(&self) -> &TransactionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut TransactionCore {
        &mut self.core
    }
}

impl Transaction for PortfolioTransaction {
    fn is_cross_type(&self) -> bool {
        self.transaction_type.is_cross_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buy(amount: i64) -> PortfolioTransaction {
        PortfolioTransaction::new(
            NaiveDateTime::default(),
            PortfolioTransactionType::Buy,
            Money::new(amount, "EUR"),
            100_000_000,
        )
        .unwrap()
    }

    #[test]
    fn test_portfolio_transaction_type_serialization() {
        // Test that serde serializes to SCREAMING_SNAKE_CASE
        let types = vec![
            (PortfolioTransactionType::Buy, "\"BUY\""),
            (PortfolioTransactionType::Sell, "\"SELL\""),
            (PortfolioTransactionType::DeliveryInbound, "\"DELIVERY_INBOUND\""),
            (PortfolioTransactionType::DeliveryOutbound, "\"DELIVERY_OUTBOUND\""),
            (PortfolioTransactionType::TransferIn, "\"TRANSFER_IN\""),
            (PortfolioTransactionType::TransferOut, "\"TRANSFER_OUT\""),
        ];

        for (tx_type, expected) in types {
            let json = serde_json::to_string(&tx_type).unwrap();
            assert_eq!(json, expected, "Serialization of {:?} failed", tx_type);
            assert_eq!(json.trim_matches('"'), tx_type.as_str());
        }
    }

    #[test]
    fn test_unit_type_serialization() {
        assert_eq!(serde_json::to_string(&UnitType::GrossValue).unwrap(), "\"GROSS_VALUE\"");
        let fee: UnitType = serde_json::from_str("\"FEE\"").unwrap();
        assert_eq!(fee, UnitType::Fee);
    }

    #[test]
    fn test_cross_types() {
        assert!(AccountTransactionType::TransferOut.is_cross_type());
        assert!(AccountTransactionType::Buy.is_cross_type());
        assert!(!AccountTransactionType::Dividends.is_cross_type());
        assert!(AccountTransactionType::Deposit.is_credit());
        assert!(!AccountTransactionType::Removal.is_credit());

        assert!(PortfolioTransactionType::Sell.is_cross_type());
        assert!(!PortfolioTransactionType::DeliveryInbound.is_cross_type());
        assert!(PortfolioTransactionType::Buy.is_purchase());
        assert!(!PortfolioTransactionType::Sell.is_purchase());
        assert_eq!(
            PortfolioTransactionType::Sell.to_account_type(),
            Some(AccountTransactionType::Sell)
        );
        assert_eq!(PortfolioTransactionType::TransferIn.to_account_type(), None);
    }

    #[test]
    fn test_unit_sum() {
        let mut tx = buy(10000);
        assert_eq!(tx.unit_sum(UnitType::Fee), Ok(Money::zero("EUR")));

        tx.add_unit(TransactionUnit::fee(Money::new(1000, "EUR"))).unwrap();
        tx.add_unit(TransactionUnit::fee(Money::new(500, "EUR"))).unwrap();
        tx.add_unit(TransactionUnit::tax(Money::new(200, "EUR"))).unwrap();

        assert_eq!(tx.unit_sum(UnitType::Fee), Ok(Money::new(1500, "EUR")));
        assert_eq!(tx.unit_sum(UnitType::Tax), Ok(Money::new(200, "EUR")));
        assert_eq!(tx.costs(), Ok(Money::new(1700, "EUR")));
        assert_eq!(tx.unit(UnitType::Tax).map(|u| u.amount().amount), Some(200));

        tx.remove_units(UnitType::Fee);
        assert_eq!(tx.units().len(), 1);
        tx.clear_units();
        assert!(tx.units().is_empty());
    }

    #[test]
    fn test_add_unit_rejects_foreign_currency() {
        let mut tx = buy(10000);
        let err = tx
            .add_unit(TransactionUnit::fee(Money::new(100, "USD")))
            .unwrap_err();
        assert!(matches!(err, ValidationError::CurrencyMismatch { .. }));
        assert!(tx.units().is_empty());
    }

    #[test]
    fn test_unit_with_forex() {
        let unit = TransactionUnit::with_forex(
            UnitType::GrossValue,
            Money::new(9200, "EUR"),
            ForexInfo::new(Money::new(10000, "USD"), 0.92),
        )
        .unwrap();
        assert_eq!(unit.forex().map(|f| f.amount.currency.as_str()), Some("USD"));

        let missing_rate = TransactionUnit::with_forex(
            UnitType::GrossValue,
            Money::new(9200, "EUR"),
            ForexInfo::new(Money::new(10000, "USD"), 0.0),
        );
        assert_eq!(
            missing_rate,
            Err(ValidationError::MissingExchangeRate {
                currency: "EUR".to_string(),
                forex: "USD".to_string(),
            })
        );

        let same_currency = TransactionUnit::with_forex(
            UnitType::Fee,
            Money::new(100, "EUR"),
            ForexInfo::new(Money::new(100, "EUR"), 1.0),
        );
        assert_eq!(same_currency, Err(ValidationError::InvalidForex("EUR".to_string())));
    }

    #[test]
    fn test_setters_validate() {
        let mut tx = buy(10000);
        assert_eq!(tx.set_amount(-1), Err(ValidationError::NegativeAmount(-1)));
        assert_eq!(tx.amount().amount, 10000);
        assert_eq!(tx.set_shares(-5), Err(ValidationError::NegativeShares(-5)));
        assert_eq!(tx.shares(), 100_000_000);
        assert_eq!(tx.shares_decimal(), 1.0);

        assert!(AccountTransaction::new(
            NaiveDateTime::default(),
            AccountTransactionType::Deposit,
            Money::new(-10, "EUR"),
        )
        .is_err());
    }

    #[test]
    fn test_net_amount() {
        let mut tx = buy(100000);
        tx.add_unit(TransactionUnit::fee(Money::new(1000, "EUR"))).unwrap();
        tx.add_unit(TransactionUnit::tax(Money::new(1100, "EUR"))).unwrap();
        assert_eq!(tx.net_amount().unwrap(), Money::new(102100, "EUR"));
        assert_eq!(
            tx.gross_for_net(&Money::new(102100, "EUR")).unwrap(),
            Money::new(100000, "EUR")
        );

        tx.set_type(PortfolioTransactionType::Sell);
        assert_eq!(tx.net_amount().unwrap(), Money::new(97900, "EUR"));

        tx.set_amount(1000).unwrap();
        assert_eq!(tx.net_amount(), Err(ValidationError::NegativeAmount(-1100)));
    }

    #[test]
    fn test_currency_change_with_units_is_rejected() {
        let mut tx = buy(100000);
        tx.set_currency_code("USD").unwrap();
        assert_eq!(tx.currency_code(), "USD");
        tx.set_currency_code("EUR").unwrap();

        tx.add_unit(TransactionUnit::fee(Money::new(1000, "EUR"))).unwrap();
        assert_eq!(
            tx.set_currency_code("USD"),
            Err(ValidationError::CurrencyMismatch {
                expected: "USD".to_string(),
                actual: "EUR".to_string(),
            })
        );
        assert_eq!(tx.currency_code(), "EUR");
        assert_eq!(tx.net_amount().unwrap(), Money::new(101000, "EUR"));

        tx.clear_units();
        tx.set_currency_code("USD").unwrap();
        assert_eq!(tx.net_amount().unwrap(), Money::new(100000, "USD"));
    }

    #[test]
    fn test_net_amount_overflow() {
        let mut tx = buy(i64::MAX);
        tx.add_unit(TransactionUnit::fee(Money::new(1000, "EUR"))).unwrap();
        assert!(matches!(tx.net_amount(), Err(ValidationError::AmountOverflow(_))));

        tx.add_unit(TransactionUnit::fee(Money::new(i64::MAX, "EUR"))).unwrap();
        assert!(matches!(
            tx.unit_sum(UnitType::Fee),
            Err(ValidationError::AmountOverflow(_))
        ));
    }

    #[test]
    fn test_transaction_json_is_flat() {
        let tx = AccountTransaction::new(
            NaiveDateTime::default(),
            AccountTransactionType::Deposit,
            Money::new(100, "EUR"),
        )
        .unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["transactionType"], "DEPOSIT");
        assert_eq!(json["uuid"], tx.uuid());
        assert_eq!(json["amount"]["amount"], 100);

        let back: AccountTransaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
