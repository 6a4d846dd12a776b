//! Savings service - goals with adjustable balances

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{SavingsGoal, User};
use crate::store::{Subscription, UserCollection};

/// Savings goal service
pub struct SavingsService {
    collection: UserCollection,
}

impl SavingsService {
    pub fn new(collection: UserCollection) -> Self {
        Self { collection }
    }

    /// Build a goal with a generated id (not yet saved)
    pub fn new_savings_goal(
        &self,
        name: &str,
        target_amount: Decimal,
        current_amount: Decimal,
        color: Option<&str>,
        deadline: Option<&str>,
    ) -> SavingsGoal {
        let mut goal = SavingsGoal::new(name.trim(), target_amount, current_amount);
        if let Some(c) = color {
            goal = goal.with_color(c);
        }
        if let Some(d) = deadline {
            goal = goal.with_deadline(d);
        }
        goal
    }

    /// Replace the goal with the same id or append it
    pub fn save_savings_goal(&self, user: &User, goal: SavingsGoal) -> Result<SavingsGoal> {
        goal.validate()?;

        let mut goals: Vec<SavingsGoal> = self.collection.load(user);
        goal.clone().upsert_into(&mut goals);
        self.collection.persist(user, &goals)?;

        Ok(goal)
    }

    /// Add `delta` to the goal's balance, flooring at zero
    pub fn adjust_savings_goal(&self, user: &User, id: &str, delta: Decimal) -> Result<SavingsGoal> {
        let mut goals: Vec<SavingsGoal> = self.collection.load(user);
        let goal = goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or_else(|| Error::not_found(format!("Savings goal {}", id)))?;
        goal.adjust(delta);
        let updated = goal.clone();

        self.collection.persist(user, &goals)?;
        Ok(updated)
    }

    pub fn delete_savings_goal(&self, user: &User, id: &str) -> Result<()> {
        if !self.collection.is_stored(user)? {
            return Ok(());
        }

        let mut goals: Vec<SavingsGoal> = self.collection.load(user);
        let before = goals.len();
        goals.retain(|g| g.id.as_str() != id);
        if goals.len() == before {
            return Ok(());
        }
        self.collection.persist(user, &goals)
    }

    pub fn list_savings_goals(&self, user: &User) -> Vec<SavingsGoal> {
        self.collection.load(user)
    }

    pub fn subscribe(
        &self,
        user: &User,
        callback: impl Fn(Vec<SavingsGoal>) + Send + Sync + 'static,
    ) -> Subscription {
        self.collection.subscribe(user, |goals: Vec<SavingsGoal>| goals, callback)
    }
}
