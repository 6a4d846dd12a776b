//! Advice provider port - external free-text guidance generator

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{Category, Transaction, TransactionType};

/// Reduced view of a transaction sent to an advice provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdviceEntry {
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    pub amount: Decimal,
    pub description: String,
}

impl From<&Transaction> for AdviceEntry {
    fn from(tx: &Transaction) -> Self {
        Self {
            date: tx.date.format("%Y-%m-%d").to_string(),
            kind: tx.kind,
            category: tx.category,
            amount: tx.amount,
            description: tx.description.clone(),
        }
    }
}

/// Generates financial guidance from recent transactions
///
/// Implementations may fail freely; `AdviceService` turns every failure
/// into a fixed user-facing message.
#[async_trait]
pub trait AdviceProvider: Send + Sync {
    /// Provider name (e.g., "gemini")
    fn name(&self) -> &str;

    /// Produce advice text; an empty string means "nothing to say"
    async fn advise(&self, recent: &[AdviceEntry]) -> Result<String>;
}
