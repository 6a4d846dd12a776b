//! Budget service - one spending limit per expense category

use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::{Budget, Category, User};
use crate::store::{Subscription, UserCollection};

/// Budget service
pub struct BudgetService {
    collection: UserCollection,
}

impl BudgetService {
    pub fn new(collection: UserCollection) -> Self {
        Self { collection }
    }

    /// Replace the budget for `category` or append a new one
    pub fn save_budget(&self, user: &User, category: Category, limit: Decimal) -> Result<Budget> {
        let budget = Budget::new(category, limit);
        budget.validate()?;

        let mut budgets: Vec<Budget> = self.collection.load(user);
        budget.clone().upsert_into(&mut budgets);
        self.collection.persist(user, &budgets)?;

        Ok(budget)
    }

    pub fn delete_budget(&self, user: &User, category: Category) -> Result<()> {
        if !self.collection.is_stored(user)? {
            return Ok(());
        }

        let mut budgets: Vec<Budget> = self.collection.load(user);
        let before = budgets.len();
        budgets.retain(|b| b.category != category);
        if budgets.len() == before {
            return Ok(());
        }
        self.collection.persist(user, &budgets)
    }

    pub fn list_budgets(&self, user: &User) -> Vec<Budget> {
        self.collection.load(user)
    }

    pub fn subscribe(
        &self,
        user: &User,
        callback: impl Fn(Vec<Budget>) + Send + Sync + 'static,
    ) -> Subscription {
        self.collection.subscribe(user, |budgets: Vec<Budget>| budgets, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryKeyValueStore;
    use crate::domain::result::Error;
    use crate::ports::KeyValueStore;
    use crate::services::test_support::{collection, collection_on};
    use crate::store::{EntityKind, KeySpace};
    use std::sync::Arc;

    fn user() -> User {
        User::new("Alex", "a@b.com", "USD")
    }

    #[test]
    fn test_save_budget_replaces_by_category() {
        let service = BudgetService::new(collection(EntityKind::Budgets));
        service
            .save_budget(&user(), Category::Groceries, Decimal::new(200, 0))
            .unwrap();
        service
            .save_budget(&user(), Category::Housing, Decimal::new(900, 0))
            .unwrap();
        service
            .save_budget(&user(), Category::Groceries, Decimal::new(350, 0))
            .unwrap();

        let budgets = service.list_budgets(&user());
        assert_eq!(budgets.len(), 2);
        let groceries: Vec<&Budget> = budgets
            .iter()
            .filter(|b| b.category == Category::Groceries)
            .collect();
        assert_eq!(groceries.len(), 1);
        assert_eq!(groceries[0].limit, Decimal::new(350, 0));
    }

    #[test]
    fn test_save_budget_rejects_non_positive_limit() {
        let service = BudgetService::new(collection(EntityKind::Budgets));
        assert!(service
            .save_budget(&user(), Category::Other, Decimal::ZERO)
            .is_err());
        assert!(service.list_budgets(&user()).is_empty());
    }

    #[test]
    fn test_delete_budget() {
        let service = BudgetService::new(collection(EntityKind::Budgets));
        service.delete_budget(&user(), Category::Transport).unwrap();

        service
            .save_budget(&user(), Category::Transport, Decimal::new(80, 0))
            .unwrap();
        service.delete_budget(&user(), Category::Transport).unwrap();
        assert!(service.list_budgets(&user()).is_empty());
    }

    #[test]
    fn test_save_budget_rejects_income_category() {
        let service = BudgetService::new(collection(EntityKind::Budgets));
        let err = service
            .save_budget(&user(), Category::Salary, Decimal::new(100, 0))
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(!service.collection.is_stored(&user()).unwrap());
    }

    #[test]
    fn test_delete_missing_budget_leaves_unreadable_document() {
        let kv = Arc::new(MemoryKeyValueStore::new());
        let key = KeySpace::default().entity_key(&user().uid, EntityKind::Budgets);
        let raw = r#"{"version":2,"records":[{"category":"Housing","limit":"900"}]}"#;
        kv.set(&key, raw, "newer-build").unwrap();
        let revision = kv.latest_revision().unwrap();

        let service = BudgetService::new(collection_on(kv.clone(), EntityKind::Budgets));
        service.delete_budget(&user(), Category::Transport).unwrap();

        assert_eq!(kv.get(&key).unwrap().as_deref(), Some(raw));
        assert_eq!(kv.latest_revision().unwrap(), revision);
    }
}
