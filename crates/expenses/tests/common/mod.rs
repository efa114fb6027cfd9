#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
    },
    time::Duration,
};

use api_types::{
    Amount,
    category::{Category, CategoryOption},
    expense::{Expense, ExpenseNew, ExpenseQuery, ExpenseTotal, FieldErrors, SortOrder},
    health::Health,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use expenses::{ApiError, Created, ExpenseApi, TrackerSettings};
use reqwest::StatusCode;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
}

pub fn settings() -> TrackerSettings {
    TrackerSettings {
        request_timeout: Duration::from_secs(10),
        notice_ttl: Duration::from_secs(3),
        today: Arc::new(today),
    }
}

pub fn expense(id: i64, amount: &str, category: Category, description: &str, date: &str) -> Expense {
    Expense {
        id,
        amount: amount.parse().unwrap(),
        category,
        description: description.to_string(),
        date: date.parse().unwrap(),
        created_at: None,
    }
}

/// In-memory backend with per-category latency and scripted failures.
#[derive(Default)]
pub struct FakeApi {
    expenses: Mutex<Vec<Expense>>,
    next_id: AtomicI64,
    list_delays: Mutex<HashMap<Option<Category>, Duration>>,
    create_delay: Mutex<Duration>,
    reject_with: Mutex<Option<FieldErrors>>,
    fail_fetch: AtomicBool,
    pub list_calls: AtomicUsize,
    pub total_calls: AtomicUsize,
    pub queries: Mutex<Vec<ExpenseQuery>>,
    pub created: Mutex<Vec<(String, ExpenseNew)>>,
}

impl FakeApi {
    pub fn with(expenses: Vec<Expense>) -> Arc<Self> {
        let next_id = expenses.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        Arc::new(Self {
            expenses: Mutex::new(expenses),
            next_id: AtomicI64::new(next_id),
            ..Self::default()
        })
    }

    pub fn delay_list(&self, category: Option<Category>, delay: Duration) {
        self.list_delays.lock().unwrap().insert(category, delay);
    }

    pub fn delay_create(&self, delay: Duration) {
        *self.create_delay.lock().unwrap() = delay;
    }

    pub fn reject_creates(&self, errors: Option<FieldErrors>) {
        *self.reject_with.lock().unwrap() = errors;
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn created_keys(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn matching(&self, query: ExpenseQuery) -> Vec<Expense> {
        let mut expenses: Vec<_> = self
            .expenses
            .lock()
            .unwrap()
            .iter()
            .filter(|e| query.category.is_none_or(|c| e.category == c))
            .cloned()
            .collect();
        match query.sort {
            SortOrder::DateAsc => expenses.sort_by_key(|e| (e.date, e.id)),
            SortOrder::DateDesc => expenses.sort_by_key(|e| std::cmp::Reverse((e.date, e.id))),
        }
        expenses
    }

    fn unavailable() -> ApiError {
        ApiError::Server {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "Service Unavailable".to_string(),
        }
    }
}

#[async_trait]
impl ExpenseApi for FakeApi {
    async fn categories(&self) -> Result<Vec<CategoryOption>, ApiError> {
        Ok(CategoryOption::builtin())
    }

    async fn list_expenses(&self, query: ExpenseQuery) -> Result<Vec<Expense>, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query);
        let delay = self
            .list_delays
            .lock()
            .unwrap()
            .get(&query.category)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        Ok(self.matching(query))
    }

    async fn expense_total(&self, query: ExpenseQuery) -> Result<ExpenseTotal, ApiError> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let expenses = self.matching(query);
        let total = expenses
            .iter()
            .fold(Amount::ZERO, |acc, e| acc + e.amount);
        Ok(ExpenseTotal {
            total,
            count: expenses.len() as u64,
            currency: Some("₹".to_string()),
        })
    }

    async fn create_expense(
        &self,
        payload: &ExpenseNew,
        idempotency_key: &str,
    ) -> Result<Created, ApiError> {
        let delay = *self.create_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.created
            .lock()
            .unwrap()
            .push((idempotency_key.to_string(), payload.clone()));

        if let Some(errors) = self.reject_with.lock().unwrap().clone() {
            return Err(ApiError::Rejected {
                status: StatusCode::BAD_REQUEST,
                errors,
            });
        }

        let expense = Expense {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            amount: payload.amount,
            category: payload.category,
            description: payload.description.clone(),
            date: payload.date,
            created_at: None,
        };
        self.expenses.lock().unwrap().push(expense.clone());
        Ok(Created {
            expense,
            replayed: false,
        })
    }

    async fn health(&self) -> Result<Health, ApiError> {
        Ok(Health {
            status: "ok".to_string(),
            message: None,
        })
    }
}
