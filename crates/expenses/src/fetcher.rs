//! Issues the list+total request pair for a filter and reconciles the result
//! into [`ExpensesView`].
//!
//! The fetcher holds at most one live [`CancelToken`]. Issuing a new pair
//! cancels the previous one first, and outcomes carrying a cancelled token are
//! discarded, so the view never mixes results from different filters.
use std::{sync::Arc, time::Duration};

use api_types::{
    Amount,
    expense::{Expense, ExpenseQuery},
};
use tokio::sync::mpsc;

use crate::{
    api::ExpenseApi,
    cancel::{CancelToken, Report},
    error::ApiError,
    filter::FilterState,
};

pub const FETCH_ERROR: &str = "Failed to load expenses. Please try again.";

/// Everything the list view shows for one filter snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResult {
    pub expenses: Vec<Expense>,
    pub total: Amount,
    pub count: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ExpensesView {
    pub result: FetchResult,
    /// Filter the current `result` was fetched for.
    pub shown_filter: Option<FilterState>,
    pub loading: bool,
    pub error: Option<String>,
}

/// What applying an outcome did to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    Loaded,
    Failed(String),
}

#[derive(Debug)]
enum FetchFailure {
    Cancelled,
    /// The task ended without reporting (panic or abort).
    Aborted,
    Failed(ApiError),
}

#[derive(Debug)]
struct FetchOutcome {
    token: CancelToken,
    filter: FilterState,
    result: Result<FetchResult, FetchFailure>,
}

pub struct ExpenseFetcher<A> {
    api: Arc<A>,
    timeout: Duration,
    live: Option<CancelToken>,
    tx: mpsc::UnboundedSender<FetchOutcome>,
    rx: mpsc::UnboundedReceiver<FetchOutcome>,
    view: ExpensesView,
}

impl<A: ExpenseApi> ExpenseFetcher<A> {
    pub fn new(api: Arc<A>, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            api,
            timeout,
            live: None,
            tx,
            rx,
            view: ExpensesView::default(),
        }
    }

    pub fn view(&self) -> &ExpensesView {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.view.loading
    }

    /// Dismisses the fetch error without touching the results.
    pub fn clear_error(&mut self) {
        self.view.error = None;
    }

    /// Cancels any pending pair and issues a new one for `filter`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fetch(&mut self, filter: FilterState) {
        self.cancel();

        let token = CancelToken::new();
        self.live = Some(token.clone());
        self.view.loading = true;

        let report = Report::new(
            self.tx.clone(),
            FetchOutcome {
                token: token.clone(),
                filter,
                result: Err(FetchFailure::Aborted),
            },
        );
        let api = Arc::clone(&self.api);
        let timeout = self.timeout;
        tracing::debug!(?filter, "fetching expenses");

        tokio::spawn(async move {
            let pair = tokio::time::timeout(timeout, fetch_pair(api.as_ref(), filter.query()));
            let result = match token.run_until_cancelled(pair).await {
                None => Err(FetchFailure::Cancelled),
                Some(Err(_elapsed)) => Err(FetchFailure::Failed(ApiError::Timeout)),
                Some(Ok(Err(err))) => Err(FetchFailure::Failed(err)),
                Some(Ok(Ok(result))) => Ok(result),
            };
            report.send(FetchOutcome {
                token,
                filter,
                result,
            });
        });
    }

    /// Cancels the pending pair, if any. Its outcome will be discarded.
    pub fn cancel(&mut self) {
        if let Some(previous) = self.live.take() {
            previous.cancel();
            tracing::debug!("cancelled superseded expense fetch");
        }
        self.view.loading = false;
    }

    /// Applies outcomes that already arrived, without waiting.
    ///
    /// Returns the event for the live pair if it finished.
    pub fn poll(&mut self) -> Option<FetchEvent> {
        let mut last = None;
        while let Ok(outcome) = self.rx.try_recv() {
            if let Some(event) = self.apply(outcome) {
                last = Some(event);
            }
        }
        last
    }

    /// Waits for the live pair to finish and applies it.
    ///
    /// Returns `None` immediately when nothing is pending.
    pub async fn next_event(&mut self) -> Option<FetchEvent> {
        while self.live.is_some() {
            let outcome = self.rx.recv().await?;
            if let Some(event) = self.apply(outcome) {
                return Some(event);
            }
        }
        None
    }

    fn apply(&mut self, outcome: FetchOutcome) -> Option<FetchEvent> {
        let is_live = self
            .live
            .as_ref()
            .is_some_and(|live| live.same_as(&outcome.token));
        if !is_live || outcome.token.is_cancelled() {
            tracing::debug!(filter = ?outcome.filter, "discarded superseded fetch outcome");
            return None;
        }

        self.live = None;
        self.view.loading = false;

        match outcome.result {
            Ok(result) => {
                tracing::debug!(
                    filter = ?outcome.filter,
                    count = result.count,
                    "expenses loaded"
                );
                self.view.result = result;
                self.view.shown_filter = Some(outcome.filter);
                self.view.error = None;
                Some(FetchEvent::Loaded)
            }
            Err(failure) => {
                // Prior results stay visible; only the error is surfaced.
                match failure {
                    FetchFailure::Failed(err) => {
                        tracing::warn!(filter = ?outcome.filter, "error fetching expenses: {err}");
                    }
                    FetchFailure::Aborted | FetchFailure::Cancelled => {
                        tracing::warn!(filter = ?outcome.filter, "expense fetch ended without a result");
                    }
                }
                self.view.error = Some(FETCH_ERROR.to_string());
                Some(FetchEvent::Failed(FETCH_ERROR.to_string()))
            }
        }
    }
}

/// List first, then the aggregate for the same query.
async fn fetch_pair<A: ExpenseApi + ?Sized>(
    api: &A,
    query: ExpenseQuery,
) -> Result<FetchResult, ApiError> {
    let expenses = api.list_expenses(query).await?;
    let total = api.expense_total(query).await?;
    Ok(FetchResult {
        expenses,
        total: total.total,
        count: total.count,
    })
}
