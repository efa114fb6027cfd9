//! Display formatting for the expense list and its summary.
use std::{collections::BTreeMap, fmt};

use api_types::{
    Amount, CURRENCY_SYMBOL,
    category::Category,
    expense::Expense,
};
use chrono::NaiveDate;

use crate::fetcher::{ExpensesView, FetchResult};

pub const EMPTY_STATE: &str = "No expenses found. Start adding expenses to track your spending!";

/// `₹50.00`
pub fn format_amount(amount: Amount) -> String {
    format!("{CURRENCY_SYMBOL}{amount}")
}

/// `Feb 1, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRow {
    pub date: String,
    pub category: String,
    pub description: String,
    pub amount: String,
}

impl From<&Expense> for ExpenseRow {
    fn from(expense: &Expense) -> Self {
        Self {
            date: format_date(expense.date),
            category: expense.category.label().to_string(),
            description: expense.description.clone(),
            amount: format_amount(expense.amount),
        }
    }
}

impl fmt::Display for ExpenseRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {} | {}",
            self.date, self.category, self.description, self.amount
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    Loading,
    Empty,
    Table(Vec<ExpenseRow>),
}

impl ListView {
    pub fn of(view: &ExpensesView) -> Self {
        if view.loading {
            return Self::Loading;
        }
        if view.result.expenses.is_empty() {
            return Self::Empty;
        }
        Self::Table(view.result.expenses.iter().map(ExpenseRow::from).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total: Amount,
    pub count: u64,
    pub average: Amount,
}

impl Summary {
    pub fn of(result: &FetchResult) -> Self {
        Self {
            total: result.total,
            count: result.count,
            average: result.total.average(result.count),
        }
    }

    pub fn total_line(&self) -> String {
        format!("Total Expenses: {}", format_amount(self.total))
    }

    pub fn count_line(&self) -> String {
        format!("Count: {}", self.count)
    }

    pub fn average_line(&self) -> String {
        format!("Average: {}", format_amount(self.average))
    }
}

/// Sum of the listed expenses per category, largest first.
pub fn category_breakdown(expenses: &[Expense]) -> Vec<(Category, Amount)> {
    let mut totals: BTreeMap<Category, Amount> = BTreeMap::new();
    for expense in expenses {
        *totals.entry(expense.category).or_default() += expense.amount;
    }

    let mut totals: Vec<_> = totals.into_iter().collect();
    // Stable sort keeps category order for equal amounts.
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}
