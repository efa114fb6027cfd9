//! Validates the expense form locally and posts it.
use std::{sync::Arc, time::Duration};

use api_types::{category::Category, expense::Expense};
use chrono::{NaiveDate, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    api::{Created, ExpenseApi},
    cancel::Report,
    draft::{DraftField, ExpenseDraft, ValidationErrors},
    error::ApiError,
};

pub const SUBMIT_ERROR: &str = "Failed to add expense. Please try again.";
pub const SUBMIT_SUCCESS: &str = "Expense added successfully!";

/// Source of "today" for fresh drafts.
pub type Today = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Result of asking for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitStart {
    /// Posted with this idempotency key.
    Started { idempotency_key: String },
    /// Local validation failed; nothing was sent.
    Invalid,
    /// A previous submission is still in flight.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitEvent {
    Created(Expense),
    Failed(String),
}

#[derive(Debug)]
struct SubmitOutcome {
    idempotency_key: String,
    result: Result<Created, ApiError>,
}

pub struct ExpenseSubmitter<A> {
    api: Arc<A>,
    timeout: Duration,
    today: Today,
    draft: ExpenseDraft,
    errors: ValidationErrors,
    in_flight: Option<String>,
    tx: mpsc::UnboundedSender<SubmitOutcome>,
    rx: mpsc::UnboundedReceiver<SubmitOutcome>,
}

impl<A: ExpenseApi> ExpenseSubmitter<A> {
    pub fn new(api: Arc<A>, timeout: Duration, today: Today) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let draft = ExpenseDraft::new(today());
        Self {
            api,
            timeout,
            today,
            draft,
            errors: ValidationErrors::new(),
            in_flight: None,
            tx,
            rx,
        }
    }

    pub fn draft(&self) -> &ExpenseDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Replaces a text field and clears its error. Ignored while submitting.
    ///
    /// For [`DraftField::Category`] the value is a category name; an empty or
    /// unknown name leaves the draft without a category.
    pub fn update(&mut self, field: DraftField, value: &str) {
        if self.is_submitting() {
            return;
        }
        match field {
            DraftField::Amount => self.draft.amount = value.to_string(),
            DraftField::Description => self.draft.description = value.to_string(),
            DraftField::Date => self.draft.date = value.to_string(),
            DraftField::Category => self.draft.category = value.parse::<Category>().ok(),
        }
        self.errors.remove(&field);
    }

    pub fn set_category(&mut self, category: Category) {
        if self.is_submitting() {
            return;
        }
        self.draft.category = Some(category);
        self.errors.remove(&DraftField::Category);
    }

    /// Validates and, if valid, posts the draft in the background.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&mut self) -> SubmitStart {
        if self.is_submitting() {
            return SubmitStart::Busy;
        }

        let payload = match self.draft.validate() {
            Ok(payload) => payload,
            Err(errors) => {
                tracing::debug!(fields = errors.len(), "expense draft rejected locally");
                self.errors = errors;
                return SubmitStart::Invalid;
            }
        };
        self.errors.clear();

        let idempotency_key = idempotency_key();
        self.in_flight = Some(idempotency_key.clone());

        let report = Report::new(
            self.tx.clone(),
            SubmitOutcome {
                idempotency_key: idempotency_key.clone(),
                result: Err(ApiError::Timeout),
            },
        );
        let api = Arc::clone(&self.api);
        let timeout = self.timeout;
        let key = idempotency_key.clone();
        tracing::debug!(idempotency_key = %key, "submitting expense");

        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, api.create_expense(&payload, &key)).await
            {
                Ok(result) => result,
                Err(_elapsed) => Err(ApiError::Timeout),
            };
            report.send(SubmitOutcome {
                idempotency_key: key,
                result,
            });
        });

        SubmitStart::Started { idempotency_key }
    }

    /// Applies a finished submission, if one arrived, without waiting.
    pub fn poll(&mut self) -> Option<SubmitEvent> {
        let outcome = self.rx.try_recv().ok()?;
        self.apply(outcome)
    }

    /// Waits for the in-flight submission. `None` when nothing is pending.
    pub async fn next_event(&mut self) -> Option<SubmitEvent> {
        while self.is_submitting() {
            let outcome = self.rx.recv().await?;
            if let Some(event) = self.apply(outcome) {
                return Some(event);
            }
        }
        None
    }

    fn apply(&mut self, outcome: SubmitOutcome) -> Option<SubmitEvent> {
        if self.in_flight.as_deref() != Some(outcome.idempotency_key.as_str()) {
            return None;
        }
        self.in_flight = None;

        match outcome.result {
            Ok(Created { expense, replayed }) => {
                tracing::info!(
                    id = expense.id,
                    replayed,
                    idempotency_key = %outcome.idempotency_key,
                    "expense created"
                );
                self.draft = ExpenseDraft::new((self.today)());
                self.errors.clear();
                Some(SubmitEvent::Created(expense))
            }
            Err(err) => {
                tracing::warn!(idempotency_key = %outcome.idempotency_key, "error adding expense: {err}");
                Some(SubmitEvent::Failed(failure_message(&err)))
            }
        }
    }
}

/// Unique per attempt: wall-clock millis plus a random UUID.
pub fn idempotency_key() -> String {
    format!(
        "expense-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

fn failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Rejected { errors, .. } => errors.message().unwrap_or(SUBMIT_ERROR).to_string(),
        _ => SUBMIT_ERROR.to_string(),
    }
}
