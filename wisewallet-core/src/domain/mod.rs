//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod budget;
pub mod category;
pub mod currency;
mod savings;
mod transaction;
mod user;
pub mod result;

pub use budget::Budget;
pub use category::{Category, TransactionType, EXPENSE_CATEGORIES, INCOME_CATEGORIES};
pub use currency::{format_amount, CurrencyInfo, CURRENCIES};
pub use savings::{SavingsGoal, DEFAULT_GOAL_COLOR};
pub use transaction::{parse_date, NewTransaction, Transaction};
pub use user::{normalize_email, Argon2Params, Credential, StoredProfile, User};
