//! Analytics service - totals, breakdowns and progress derived from records
//!
//! Everything here is a pure aggregation over the lists the other services
//! return; nothing is persisted.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Budget, Category, SavingsGoal, Transaction, EXPENSE_CATEGORIES};

/// Income, expense and balance over a set of transactions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

/// Share of total expense for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub amount: Decimal,
    pub percentage: Decimal,
    pub color: &'static str,
}

/// Income and expense for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub month: String,
    /// Short label, e.g. `Jan 24`
    pub label: String,
    pub income: Decimal,
    pub expense: Decimal,
    /// Running balance of monthly net up to and including this month
    pub cumulative: Decimal,
}

/// Spending against the budget of one expense category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetUsage {
    pub category: Category,
    pub spent: Decimal,
    /// Zero when no budget is set
    pub limit: Decimal,
    pub percentage: Decimal,
    pub over_budget: bool,
}

/// Progress of one savings goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavingsProgress {
    pub id: String,
    pub name: String,
    pub current_amount: Decimal,
    pub target_amount: Decimal,
    pub remaining: Decimal,
    pub percentage: Decimal,
    pub completed: bool,
}

/// Analytics service
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    pub fn totals(&self, transactions: &[Transaction]) -> Totals {
        let (income, expense) =
            transactions
                .iter()
                .fold((Decimal::ZERO, Decimal::ZERO), |(inc, exp), t| {
                    if t.is_income() {
                        (inc + t.amount, exp)
                    } else {
                        (inc, exp + t.amount)
                    }
                });

        Totals {
            income,
            expense,
            balance: income - expense,
        }
    }

    /// Expenses grouped by category, largest first; empty without expenses
    pub fn expense_breakdown(&self, transactions: &[Transaction]) -> Vec<CategoryShare> {
        let mut by_category: HashMap<Category, Decimal> = HashMap::new();
        for t in transactions.iter().filter(|t| t.is_expense()) {
            *by_category.entry(t.category).or_default() += t.amount;
        }

        let total: Decimal = by_category.values().copied().sum();
        if total.is_zero() {
            return Vec::new();
        }

        let mut shares: Vec<CategoryShare> = by_category
            .into_iter()
            .map(|(category, amount)| CategoryShare {
                category,
                amount,
                percentage: amount / total * Decimal::ONE_HUNDRED,
                color: category.color(),
            })
            .collect();
        shares.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.category.cmp(&b.category)));
        shares
    }

    /// Per-month income and expense in chronological order, with the
    /// running balance of monthly net
    pub fn monthly_series(&self, transactions: &[Transaction]) -> Vec<MonthlyPoint> {
        let mut months: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();
        for t in transactions {
            let entry = months.entry((t.date.year(), t.date.month())).or_default();
            if t.is_income() {
                entry.0 += t.amount;
            } else {
                entry.1 += t.amount;
            }
        }

        let mut running = Decimal::ZERO;
        months
            .into_iter()
            .map(|((year, month), (income, expense))| {
                running += income - expense;
                let label = NaiveDate::from_ymd_opt(year, month, 1)
                    .map(|d| d.format("%b %y").to_string())
                    .unwrap_or_default();
                MonthlyPoint {
                    month: format!("{:04}-{:02}", year, month),
                    label,
                    income,
                    expense,
                    cumulative: running,
                }
            })
            .collect()
    }

    /// Spending per expense category in the month containing `month`
    pub fn budget_usage(
        &self,
        transactions: &[Transaction],
        budgets: &[Budget],
        month: NaiveDate,
    ) -> Vec<BudgetUsage> {
        let mut spent: HashMap<Category, Decimal> = HashMap::new();
        for t in transactions.iter().filter(|t| {
            t.is_expense() && t.date.year() == month.year() && t.date.month() == month.month()
        }) {
            *spent.entry(t.category).or_default() += t.amount;
        }

        EXPENSE_CATEGORIES
            .iter()
            .map(|&category| {
                let spent = spent.get(&category).copied().unwrap_or_default();
                let limit = budgets
                    .iter()
                    .find(|b| b.category == category)
                    .map(|b| b.limit)
                    .unwrap_or_default();
                let percentage = if limit > Decimal::ZERO {
                    (spent / limit * Decimal::ONE_HUNDRED).min(Decimal::ONE_HUNDRED)
                } else {
                    Decimal::ZERO
                };
                BudgetUsage {
                    category,
                    spent,
                    limit,
                    percentage,
                    over_budget: limit > Decimal::ZERO && spent > limit,
                }
            })
            .collect()
    }

    pub fn savings_progress(&self, goals: &[SavingsGoal]) -> Vec<SavingsProgress> {
        goals
            .iter()
            .map(|g| SavingsProgress {
                id: g.id.clone(),
                name: g.name.clone(),
                current_amount: g.current_amount,
                target_amount: g.target_amount,
                remaining: g.remaining(),
                percentage: g.percentage(),
                completed: g.is_completed(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewTransaction, TransactionType};
    use chrono::Utc;

    fn tx(kind: TransactionType, category: Category, amount: i64, date: &str) -> Transaction {
        NewTransaction::new(
            Decimal::new(amount, 0),
            kind,
            category,
            "",
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        )
        .into_transaction(Utc::now())
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx(TransactionType::Income, Category::Salary, 3000, "2024-01-05"),
            tx(TransactionType::Expense, Category::Housing, 1200, "2024-01-06"),
            tx(TransactionType::Expense, Category::Groceries, 300, "2024-01-20"),
            tx(TransactionType::Expense, Category::Groceries, 500, "2024-02-03"),
            tx(TransactionType::Income, Category::OtherIncome, 100, "2024-02-10"),
        ]
    }

    #[test]
    fn test_totals() {
        let totals = AnalyticsService::new().totals(&sample());
        assert_eq!(totals.income, Decimal::new(3100, 0));
        assert_eq!(totals.expense, Decimal::new(2000, 0));
        assert_eq!(totals.balance, Decimal::new(1100, 0));
    }

    #[test]
    fn test_expense_breakdown_sorted_desc() {
        let shares = AnalyticsService::new().expense_breakdown(&sample());
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].category, Category::Housing);
        assert_eq!(shares[0].percentage, Decimal::new(60, 0));
        assert_eq!(shares[1].amount, Decimal::new(800, 0));
        assert_eq!(shares[1].color, Category::Groceries.color());
    }

    #[test]
    fn test_expense_breakdown_empty_without_expenses() {
        let income_only = vec![tx(TransactionType::Income, Category::Salary, 10, "2024-01-01")];
        assert!(AnalyticsService::new().expense_breakdown(&income_only).is_empty());
    }

    #[test]
    fn test_monthly_series_and_cumulative() {
        let series = AnalyticsService::new().monthly_series(&sample());
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].month, "2024-01");
        assert_eq!(series[0].label, "Jan 24");
        assert_eq!(series[0].cumulative, Decimal::new(1500, 0));
        assert_eq!(series[1].income, Decimal::new(100, 0));
        assert_eq!(series[1].cumulative, Decimal::new(1100, 0));
    }

    #[test]
    fn test_budget_usage_for_month() {
        let budgets = vec![
            Budget::new(Category::Groceries, Decimal::new(250, 0)),
            Budget::new(Category::Housing, Decimal::new(2400, 0)),
        ];
        let jan = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let usage = AnalyticsService::new().budget_usage(&sample(), &budgets, jan);
        assert_eq!(usage.len(), EXPENSE_CATEGORIES.len());

        let groceries = usage.iter().find(|u| u.category == Category::Groceries).unwrap();
        assert_eq!(groceries.spent, Decimal::new(300, 0));
        assert_eq!(groceries.percentage, Decimal::ONE_HUNDRED);
        assert!(groceries.over_budget);

        let housing = usage.iter().find(|u| u.category == Category::Housing).unwrap();
        assert_eq!(housing.percentage, Decimal::new(50, 0));
        assert!(!housing.over_budget);

        let transport = usage.iter().find(|u| u.category == Category::Transport).unwrap();
        assert_eq!(transport.limit, Decimal::ZERO);
        assert_eq!(transport.percentage, Decimal::ZERO);
        assert!(!transport.over_budget);
    }

    #[test]
    fn test_savings_progress_clamps() {
        let goals = vec![
            SavingsGoal::new("Done", Decimal::new(100, 0), Decimal::new(150, 0)),
            SavingsGoal::new("Half", Decimal::new(100, 0), Decimal::new(50, 0)),
        ];
        let progress = AnalyticsService::new().savings_progress(&goals);
        assert_eq!(progress[0].percentage, Decimal::ONE_HUNDRED);
        assert!(progress[0].completed);
        assert_eq!(progress[0].remaining, Decimal::ZERO);
        assert_eq!(progress[1].percentage, Decimal::new(50, 0));
    }
}
