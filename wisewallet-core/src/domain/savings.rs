//! Savings goal domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::{Error, Result};

/// Default goal color (indigo)
pub const DEFAULT_GOAL_COLOR: &str = "#6366f1";

/// A savings target the user is working towards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: String,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    /// Hex color
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl SavingsGoal {
    /// Create a goal with a freshly generated id
    pub fn new(name: impl Into<String>, target_amount: Decimal, current_amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            target_amount,
            current_amount,
            color: DEFAULT_GOAL_COLOR.to_string(),
            deadline: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Goal name is required."));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(Error::validation("Target amount must be greater than zero."));
        }
        if self.current_amount < Decimal::ZERO {
            return Err(Error::validation("Current amount cannot be negative."));
        }
        Ok(())
    }

    /// Add `delta` (may be negative), flooring the balance at zero
    pub fn adjust(&mut self, delta: Decimal) {
        self.current_amount = (self.current_amount + delta).max(Decimal::ZERO);
    }

    /// Percent complete in [0, 100]; a non-positive target counts as 0
    pub fn percentage(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let pct = self.current_amount / self.target_amount * Decimal::ONE_HUNDRED;
        pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
    }

    pub fn is_completed(&self) -> bool {
        self.percentage() >= Decimal::ONE_HUNDRED
    }

    /// Amount still missing; zero once the goal is reached
    pub fn remaining(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    /// Replace the goal with the same id, or append it
    pub fn upsert_into(self, goals: &mut Vec<SavingsGoal>) {
        match goals.iter_mut().find(|g| g.id == self.id) {
            Some(existing) => *existing = self,
            None => goals.push(self),
        }
    }
}
