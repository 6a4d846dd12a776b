//! Transaction domain model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::{Category, TransactionType};
use super::result::{Error, Result};

/// A single income or expense entry
///
/// Created once by `TransactionService::add_transaction` and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    pub description: String,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    /// Creation time, unix milliseconds
    pub timestamp: i64,
}

/// User-submitted fields of a transaction (no id, no timestamp yet)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: Category,
    pub description: String,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
}

impl NewTransaction {
    pub fn new(
        amount: Decimal,
        kind: TransactionType,
        category: Category,
        description: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            amount,
            kind,
            category,
            description: description.into(),
            date,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::validation("Amount must be greater than zero."));
        }
        Ok(())
    }

    /// Stamp with a fresh id and creation time
    pub fn into_transaction(self, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id: Uuid::new_v4().to_string(),
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            description: self.description.trim().to_string(),
            date: self.date,
            timestamp: now.timestamp_millis(),
        }
    }
}

impl Transaction {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Sort newest date first; stable, so equal dates keep storage order
    pub fn sort_by_date_desc(transactions: &mut [Transaction]) {
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

/// `YYYY-MM-DD` on write; also accepts RFC 3339 timestamps on read
pub(crate) mod date_format {
    use chrono::{DateTime, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDate, String> {
        let raw = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(raw, FORMAT) {
            return Ok(date);
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.date_naive())
            .map_err(|_| format!("Invalid date: {}", raw))
    }
}

pub use date_format::parse as parse_date;

#[cfg(test)]
mod tests {
    use super::*;

    fn milk() -> NewTransaction {
        NewTransaction::new(
            Decimal::new(50, 0),
            TransactionType::Expense,
            Category::Groceries,
            "Milk",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_into_transaction_assigns_id_and_timestamp() {
        let now = Utc::now();
        let tx = milk().into_transaction(now);
        assert!(!tx.id.is_empty());
        assert!(Uuid::parse_str(&tx.id).is_ok());
        assert_eq!(tx.timestamp, now.timestamp_millis());
        assert_eq!(tx.description, "Milk");
    }

    #[test]
    fn test_validation_rejects_non_positive_amount() {
        let mut new_tx = milk();
        new_tx.amount = Decimal::ZERO;
        assert!(new_tx.validate().is_err());
        new_tx.amount = Decimal::new(-1, 0);
        assert!(new_tx.validate().is_err());
    }

    #[test]
    fn test_wire_format() {
        let tx = milk().into_transaction(Utc::now());
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "Expense");
        assert_eq!(value["category"], "Groceries");
        assert_eq!(value["date"], "2024-01-01");
    }

    #[test]
    fn test_accepts_numeric_amount_and_iso_timestamp_date() {
        let json = r#"{
            "id": "abc", "amount": 12.5, "type": "Income", "category": "Salary",
            "description": "Pay", "date": "2024-03-05T10:00:00.000Z", "timestamp": 1
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount, Decimal::new(125, 1));
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_sort_by_date_desc_is_stable() {
        let now = Utc::now();
        let mut a = milk().into_transaction(now);
        a.description = "a".into();
        let mut b = milk().into_transaction(now);
        b.description = "b".into();
        let mut c = milk().into_transaction(now);
        c.date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let mut list = vec![a.clone(), b.clone(), c.clone()];
        Transaction::sort_by_date_desc(&mut list);
        assert_eq!(list, vec![c, a, b]);
    }
}
