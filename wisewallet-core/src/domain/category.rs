//! Transaction categories and types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Direction of money flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

/// Fixed category set shared by transactions and budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Salary,
    #[serde(rename = "Other Income")]
    OtherIncome,
    Groceries,
    Housing,
    Transport,
    Entertainment,
    Utilities,
    Savings,
    Other,
}

/// Categories offered for income transactions
pub const INCOME_CATEGORIES: &[Category] = &[Category::Salary, Category::OtherIncome];

/// Categories offered for expenses (and budgets)
pub const EXPENSE_CATEGORIES: &[Category] = &[
    Category::Groceries,
    Category::Housing,
    Category::Transport,
    Category::Entertainment,
    Category::Utilities,
    Category::Savings,
    Category::Other,
];

impl Category {
    pub fn all() -> impl Iterator<Item = Category> {
        INCOME_CATEGORIES.iter().chain(EXPENSE_CATEGORIES).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Salary => "Salary",
            Category::OtherIncome => "Other Income",
            Category::Groceries => "Groceries",
            Category::Housing => "Housing",
            Category::Transport => "Transport",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Savings => "Savings",
            Category::Other => "Other",
        }
    }

    /// Display color (hex)
    pub fn color(&self) -> &'static str {
        match self {
            Category::Salary => "#10b981",
            Category::OtherIncome => "#34d399",
            Category::Groceries => "#f43f5e",
            Category::Housing => "#3b82f6",
            Category::Transport => "#f59e0b",
            Category::Entertainment => "#8b5cf6",
            Category::Utilities => "#06b6d4",
            Category::Savings => "#14b8a6",
            Category::Other => "#64748b",
        }
    }

    pub fn is_expense(&self) -> bool {
        EXPENSE_CATEGORIES.contains(self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Case-insensitive; accepts "Other Income", "other-income" and "other_income"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        Category::all()
            .find(|c| c.as_str().replace(' ', "").to_lowercase() == wanted)
            .ok_or_else(|| format!("Unknown category: {}", s.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde_names() {
        let json = serde_json::to_string(&Category::OtherIncome).unwrap();
        assert_eq!(json, "\"Other Income\"");

        let parsed: Category = serde_json::from_str("\"Groceries\"").unwrap();
        assert_eq!(parsed, Category::Groceries);
        assert!(serde_json::from_str::<Category>("\"Gambling\"").is_err());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("other income".parse::<Category>(), Ok(Category::OtherIncome));
        assert_eq!("Other-Income".parse::<Category>(), Ok(Category::OtherIncome));
        assert_eq!("HOUSING".parse::<Category>(), Ok(Category::Housing));
        assert!("nope".parse::<Category>().is_err());
    }

    #[test]
    fn test_expense_split() {
        assert_eq!(Category::all().count(), 9);
        assert!(Category::Groceries.is_expense());
        assert!(!Category::Salary.is_expense());
    }
}
