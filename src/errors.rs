//! Error types for the ledger.
//!
//! Validation and attachment errors are recoverable and meant to be shown to
//! the user. Invariant violations and failed cross entry lookups point at a
//! programming error or a corrupted client and should be reported as defects.

use thiserror::Error;

use crate::pp::owner::OwnerRef;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Root error type for ledger operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Invalid value: {0}")]
    Validation(#[from] ValidationError),

    #[error("Attachment failed: {0}")]
    Attachment(#[from] AttachmentError),

    #[error("No cross entry found for transaction '{transaction}'")]
    Lookup { transaction: String },
}

impl LedgerError {
    pub(crate) fn unmanaged(uuid: &str) -> Self {
        Self::InvariantViolation(format!(
            "transaction '{}' is not managed by this cross entry",
            uuid
        ))
    }
}

/// Invalid field values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("amount must not be negative (got {0})")]
    NegativeAmount(i64),

    #[error("amount overflows: {0}")]
    AmountOverflow(String),

    #[error("shares must not be negative (got {0})")]
    NegativeShares(i64),

    #[error("currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    #[error("forex amount in {forex} requires an exchange rate to {currency}")]
    MissingExchangeRate { currency: String, forex: String },

    #[error("forex amount must be in a currency other than {0}")]
    InvalidForex(String),

    #[error("portfolio transaction '{0}' has no security")]
    MissingSecurity(String),

    #[error("security '{0}' is not known to the client")]
    UnknownSecurity(String),

    #[error("{0} is not a buy or sell type")]
    NotATradeType(String),

    #[error("both sides of the entry are owned by {0}")]
    SameOwner(OwnerRef),
}

/// A container refused to attach or detach a transaction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttachmentError {
    #[error("{owner} already holds transaction '{transaction}'")]
    Duplicate { owner: OwnerRef, transaction: String },

    #[error("{owner} does not hold transaction '{transaction}'")]
    NotFound { owner: OwnerRef, transaction: String },

    #[error("{0} does not exist in the client")]
    UnknownOwner(OwnerRef),

    #[error("transaction '{0}' is already part of a cross entry")]
    AlreadyPaired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LedgerError::from(ValidationError::NegativeAmount(-5));
        assert_eq!(err.to_string(), "Invalid value: amount must not be negative (got -5)");

        let err = LedgerError::from(AttachmentError::NotFound {
            owner: OwnerRef::Account("acc-1".to_string()),
            transaction: "tx-1".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Attachment failed: account 'acc-1' does not hold transaction 'tx-1'"
        );
    }

    #[test]
    fn test_unmanaged_is_invariant_violation() {
        assert!(matches!(
            LedgerError::unmanaged("tx-9"),
            LedgerError::InvariantViolation(msg) if msg.contains("tx-9")
        ));
    }
}
