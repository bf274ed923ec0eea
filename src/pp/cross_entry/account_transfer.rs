use chrono::NaiveDateTime;

use super::{insert_pair, mirror_account_transfer, CrossEntry, CrossSide};
use crate::errors::Result;
use crate::pp::account::Account;
use crate::pp::client::Client;
use crate::pp::owner::OwnerRef;
use crate::pp::transaction::{AccountTransaction, AccountTransactionType, Transaction};

/// Cash moved from one account to another.
#[derive(Debug, Clone)]
pub struct AccountTransferEntry {
    source: String,
    target: String,
    source_transaction: AccountTransaction,
    target_transaction: AccountTransaction,
}

impl AccountTransferEntry {
    pub fn new(source: &Account, target: &Account) -> Self {
        Self {
            source: source.uuid.clone(),
            target: target.uuid.clone(),
            source_transaction: AccountTransaction::blank(
                AccountTransactionType::TransferOut,
                &source.currency,
            ),
            target_transaction: AccountTransaction::blank(
                AccountTransactionType::TransferIn,
                &source.currency,
            ),
        }
    }

    pub fn source_transaction(&self) -> &AccountTransaction {
        &self.source_transaction
    }

    pub fn target_transaction(&self) -> &AccountTransaction {
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
        CrossEntry::AccountTransfer {
            source: CrossSide::new(
                OwnerRef::Account(self.source.clone()),
                self.source_transaction.uuid(),
            ),
            target: CrossSide::new(
                OwnerRef::Account(self.target.clone()),
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

        mirror_account_transfer(&source_transaction, &mut target_transaction)?;

        insert_pair(
            client,
            entry,
            |client| client.attach_account_transaction(&source, source_transaction),
            |client| client.attach_account_transaction(&target, target_transaction),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{AttachmentError, LedgerError, ValidationError};
    use crate::pp::common::{Money, AMOUNT_FACTOR};
    use crate::pp::cross_entry::Fixture;
    use crate::pp::owner::TransactionOwner;
    use chrono::NaiveDate;

    #[test]
    fn test_account_transfer_entry() {
        let mut fx = Fixture::new();
        let today = chrono::Local::now().naive_local();

        let mut entry = AccountTransferEntry::new(fx.account(0), fx.account(1));
        entry.set_date(today);
        entry.set_amount(1000 * AMOUNT_FACTOR).unwrap();
        let a = entry.source_transaction().uuid().to_string();
        let b = entry.target_transaction().uuid().to_string();
        let cross = entry.insert(&mut fx.client).unwrap();

        assert_eq!(fx.account(0).transactions().len(), 1);
        assert_eq!(fx.account(1).transactions().len(), 1);

        let tx_a = &fx.account(0).transactions()[0];
        let tx_b = &fx.account(1).transactions()[0];
        assert_eq!(tx_a.transaction_type(), AccountTransactionType::TransferOut);
        assert_eq!(tx_b.transaction_type(), AccountTransactionType::TransferIn);
        assert_eq!(tx_a.security_uuid(), None);
        assert_eq!(tx_b.security_uuid(), None);
        assert_eq!(tx_a.amount(), tx_b.amount());
        assert_eq!(tx_a.date(), today);
        assert_eq!(tx_b.date(), today);

        // check cross entity identification
        let owner_a = OwnerRef::Account(fx.accounts[0].clone());
        let owner_b = OwnerRef::Account(fx.accounts[1].clone());
        assert_eq!(cross.cross_owner(&a).unwrap(), &owner_b);
        assert_eq!(cross.cross_transaction(&a).unwrap(), b);
        assert_eq!(cross.cross_owner(&b).unwrap(), &owner_a);
        assert_eq!(cross.cross_transaction(&b).unwrap(), a);

        // check cross editing
        fx.client
            .account_transaction_mut(&fx.accounts[0], &a)
            .unwrap()
            .set_amount(2000 * AMOUNT_FACTOR)
            .unwrap();
        cross.update_from(&mut fx.client, &a).unwrap();
        assert_eq!(
            fx.client.account_transaction(&fx.accounts[1], &b).unwrap().amount(),
            &Money::of("EUR", 2000)
        );

        let march = NaiveDate::from_ymd_opt(2013, 3, 16)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        fx.client
            .account_transaction_mut(&fx.accounts[1], &b)
            .unwrap()
            .set_date(march);
        cross.update_from(&mut fx.client, &b).unwrap();
        assert_eq!(
            fx.client.account_transaction(&fx.accounts[0], &a).unwrap().date(),
            march
        );
        // the direction is carried by the types, not the sign
        assert_eq!(
            fx.client.account_transaction(&fx.accounts[0], &a).unwrap().transaction_type(),
            AccountTransactionType::TransferOut
        );

        assert_eq!(fx.account(0).balance(), -2000 * AMOUNT_FACTOR);
        assert_eq!(fx.account(1).balance(), 2000 * AMOUNT_FACTOR);

        // check deletion
        fx.client.delete_transaction(&owner_a, &a).unwrap();
        assert_eq!(fx.account(0).transactions().len(), 0);
        assert_eq!(fx.account(1).transactions().len(), 0);
    }

    #[test]
    fn test_delete_from_target_side() {
        let mut fx = Fixture::new();
        let mut entry = AccountTransferEntry::new(fx.account(0), fx.account(1));
        entry.set_amount(500).unwrap();
        let b = entry.target_transaction().uuid().to_string();
        entry.insert(&mut fx.client).unwrap();

        fx.client
            .delete_transaction(&OwnerRef::Account(fx.accounts[1].clone()), &b)
            .unwrap();
        assert!(fx.account(0).transactions().is_empty());
        assert!(fx.account(1).transactions().is_empty());
    }

    #[test]
    fn test_delete_with_missing_counterpart_keeps_transaction() {
        let mut fx = Fixture::new();
        let entry = AccountTransferEntry::new(fx.account(0), fx.account(1));
        let a = entry.source_transaction().uuid().to_string();
        let b = entry.target_transaction().uuid().to_string();
        entry.insert(&mut fx.client).unwrap();

        // counterpart removed behind the client's back
        fx.client
            .account_mut(&fx.accounts[1])
            .unwrap()
            .remove_transaction(&b)
            .unwrap();

        let owner_a = OwnerRef::Account(fx.accounts[0].clone());
        assert_eq!(
            fx.client.delete_transaction(&owner_a, &a),
            Err(LedgerError::Attachment(AttachmentError::NotFound {
                owner: OwnerRef::Account(fx.accounts[1].clone()),
                transaction: b,
            }))
        );
        assert!(fx.client.holds(&owner_a, &a));
    }

    #[test]
    fn test_same_account_is_rejected() {
        let mut fx = Fixture::new();
        let entry = AccountTransferEntry::new(fx.account(0), fx.account(0));
        assert_eq!(
            entry.insert(&mut fx.client),
            Err(LedgerError::Validation(ValidationError::SameOwner(
                OwnerRef::Account(fx.accounts[0].clone())
            )))
        );
        assert!(fx.account(0).transactions().is_empty());
    }

    #[test]
    fn test_unknown_target_account() {
        let mut fx = Fixture::new();
        let stranger = Account::default();
        let entry = AccountTransferEntry::new(fx.account(0), &stranger);
        assert!(matches!(
            entry.insert(&mut fx.client),
            Err(LedgerError::Attachment(AttachmentError::UnknownOwner(_)))
        ));
        assert!(fx.account(0).transactions().is_empty());
    }

    #[test]
    fn test_negative_amount_is_rejected() {
        let fx = Fixture::new();
        let mut entry = AccountTransferEntry::new(fx.account(0), fx.account(1));
        assert_eq!(
            entry.set_amount(-1),
            Err(LedgerError::Validation(ValidationError::NegativeAmount(-1)))
        );
    }
}
