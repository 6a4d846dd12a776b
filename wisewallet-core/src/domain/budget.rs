//! Budget domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::result::{Error, Result};

/// Monthly spending limit for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub category: Category,
    pub limit: Decimal,
}

impl Budget {
    pub fn new(category: Category, limit: Decimal) -> Self {
        Self { category, limit }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.category.is_expense() {
            return Err(Error::validation(format!(
                "Budgets apply to expense categories only, not {}.",
                self.category
            )));
        }
        if self.limit <= Decimal::ZERO {
            return Err(Error::validation("Budget limit must be greater than zero."));
        }
        Ok(())
    }

    /// Replace the entry for this budget's category, or append it
    pub fn upsert_into(self, budgets: &mut Vec<Budget>) {
        match budgets.iter_mut().find(|b| b.category == self.category) {
            Some(existing) => *existing = self,
            None => budgets.push(self),
        }
    }
}
