//! Transaction service - add, delete and observe a user's transactions

use chrono::Utc;

use crate::domain::result::Result;
use crate::domain::{NewTransaction, Transaction, User};
use crate::store::{Subscription, UserCollection};

fn sorted(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    Transaction::sort_by_date_desc(&mut transactions);
    transactions
}

/// Transaction service
pub struct TransactionService {
    collection: UserCollection,
}

impl TransactionService {
    pub fn new(collection: UserCollection) -> Self {
        Self { collection }
    }

    /// Validate, stamp with id and timestamp, prepend, persist and notify
    pub fn add_transaction(&self, user: &User, new_tx: NewTransaction) -> Result<Transaction> {
        new_tx.validate()?;
        let tx = new_tx.into_transaction(Utc::now());

        let mut transactions: Vec<Transaction> = self.collection.load(user);
        transactions.insert(0, tx.clone());
        self.collection.persist(user, &transactions)?;

        Ok(tx)
    }

    /// Remove the transaction with `id`; absent ids leave the list as is
    pub fn delete_transaction(&self, user: &User, id: &str) -> Result<()> {
        if !self.collection.is_stored(user)? {
            return Ok(());
        }

        let mut transactions: Vec<Transaction> = self.collection.load(user);
        let before = transactions.len();
        transactions.retain(|t| t.id != id);
        if transactions.len() == before {
            return Ok(());
        }
        self.collection.persist(user, &transactions)
    }

    /// All transactions, newest date first
    pub fn list_transactions(&self, user: &User) -> Vec<Transaction> {
        sorted(self.collection.load(user))
    }

    /// Receive the sorted list now and after every change
    pub fn subscribe(
        &self,
        user: &User,
        callback: impl Fn(Vec<Transaction>) + Send + Sync + 'static,
    ) -> Subscription {
        self.collection.subscribe(user, sorted, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, TransactionType};
    use crate::adapters::MemoryKeyValueStore;
    use crate::ports::KeyValueStore;
    use crate::services::test_support::{collection, collection_on};
    use crate::store::{EntityKind, KeySpace};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::sync::{Arc, Mutex};

    fn user() -> User {
        User::new("Alex", "a@b.com", "USD")
    }

    fn new_tx(amount: i64, date: &str, description: &str) -> NewTransaction {
        NewTransaction::new(
            Decimal::new(amount, 0),
            TransactionType::Expense,
            Category::Groceries,
            description,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        )
    }

    #[test]
    fn test_add_transaction_stamps_id_and_timestamp() {
        let service = TransactionService::new(collection(EntityKind::Transactions));
        let before = Utc::now().timestamp_millis();

        let tx = service
            .add_transaction(&user(), new_tx(50, "2024-01-01", "Milk"))
            .unwrap();

        assert!(!tx.id.is_empty());
        assert!(tx.timestamp >= before);
        assert_eq!(tx.amount, Decimal::new(50, 0));
        assert_eq!(tx.description, "Milk");

        let listed = service.list_transactions(&user());
        assert_eq!(listed, vec![tx]);
    }

    #[test]
    fn test_add_rejects_non_positive_amount() {
        let service = TransactionService::new(collection(EntityKind::Transactions));
        assert!(service
            .add_transaction(&user(), new_tx(0, "2024-01-01", "x"))
            .is_err());
        assert!(service.list_transactions(&user()).is_empty());
    }

    #[test]
    fn test_list_sorted_by_date_desc_ties_newest_first() {
        let service = TransactionService::new(collection(EntityKind::Transactions));
        let old = service
            .add_transaction(&user(), new_tx(1, "2023-12-01", "old"))
            .unwrap();
        let first = service
            .add_transaction(&user(), new_tx(2, "2024-01-01", "first"))
            .unwrap();
        let second = service
            .add_transaction(&user(), new_tx(3, "2024-01-01", "second"))
            .unwrap();

        let ids: Vec<String> = service
            .list_transactions(&user())
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id, old.id]);
    }

    #[test]
    fn test_delete_absent_id_is_noop() {
        let service = TransactionService::new(collection(EntityKind::Transactions));
        service.delete_transaction(&user(), "nope").unwrap();
        assert!(service.list_transactions(&user()).is_empty());

        let tx = service
            .add_transaction(&user(), new_tx(5, "2024-02-02", "x"))
            .unwrap();
        service.delete_transaction(&user(), "nope").unwrap();
        assert_eq!(service.list_transactions(&user()).len(), 1);

        service.delete_transaction(&user(), &tx.id).unwrap();
        assert!(service.list_transactions(&user()).is_empty());
    }

    #[test]
    fn test_subscribe_snapshot_then_updates() {
        let service = TransactionService::new(collection(EntityKind::Transactions));
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let seen2 = seen.clone();

        let sub = service.subscribe(&user(), move |txs| seen2.lock().unwrap().push(txs.len()));
        service
            .add_transaction(&user(), new_tx(1, "2024-01-01", "a"))
            .unwrap();
        service
            .add_transaction(&user(), new_tx(2, "2024-01-02", "b"))
            .unwrap();
        sub.unsubscribe();
        service
            .add_transaction(&user(), new_tx(3, "2024-01-03", "c"))
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_users_do_not_collide() {
        let service = TransactionService::new(collection(EntityKind::Transactions));
        let other = User::new("Sam", "s@b.com", "EUR");
        service
            .add_transaction(&user(), new_tx(1, "2024-01-01", "a"))
            .unwrap();
        assert!(service.list_transactions(&other).is_empty());
    }

    #[test]
    fn test_delete_absent_id_keeps_malformed_document() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let key = KeySpace::default().entity_key(&user().uid, EntityKind::Transactions);
        kv.set(&key, "{not json", "other").unwrap();
        let revision = kv.latest_revision().unwrap();

        let service = TransactionService::new(collection_on(kv.clone(), EntityKind::Transactions));
        service.delete_transaction(&user(), "missing").unwrap();

        assert_eq!(kv.get(&key).unwrap().as_deref(), Some("{not json"));
        assert_eq!(kv.latest_revision().unwrap(), revision);
    }
}
