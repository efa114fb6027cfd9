//! Client-side state for the expense tracker.
//!
//! [`Tracker`] owns three collaborators and is the only thing that mutates
//! their state:
//!
//! - [`FilterStore`]: the category/sort selection. Every change is picked up
//!   on the next [`Tracker::pump`] and triggers a fetch.
//! - [`ExpenseFetcher`]: issues the list+total pair, cancelling the previous
//!   pair first.
//! - [`ExpenseSubmitter`]: validates the form and posts it; success triggers
//!   one refetch and a transient notice.
//!
//! Network calls run on spawned tasks; their outcomes are applied when the
//! owner pumps, so a UI loop never blocks on the backend.
use std::{sync::Arc, time::Duration};

use api_types::category::CategoryOption;
use tokio::{sync::watch, time::Instant};

pub mod api;
pub mod cancel;
pub mod draft;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod notice;
pub mod submitter;
pub mod view;

pub use api::{Created, ExpenseApi, HttpApi};
pub use cancel::CancelToken;
pub use draft::{DraftField, ExpenseDraft, ValidationErrors};
pub use error::ApiError;
pub use fetcher::{ExpenseFetcher, ExpensesView, FetchEvent, FetchResult};
pub use filter::{CategoryFilter, FilterChange, FilterField, FilterState, FilterStore};
pub use notice::{Notice, NoticeLevel, Notices};
pub use submitter::{ExpenseSubmitter, SubmitEvent, SubmitStart, Today};

#[derive(Clone)]
pub struct TrackerSettings {
    /// Upper bound for one fetch pair or one submission.
    pub request_timeout: Duration,
    /// How long the success notice stays up.
    pub notice_ttl: Duration,
    pub today: Today,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            notice_ttl: Duration::from_secs(3),
            today: Arc::new(|| chrono::Local::now().date_naive()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Unknown,
    Ok,
    Down,
}

pub struct Tracker<A> {
    api: Arc<A>,
    filters: FilterStore,
    filter_rx: watch::Receiver<FilterState>,
    fetcher: ExpenseFetcher<A>,
    submitter: ExpenseSubmitter<A>,
    notices: Notices,
    categories: Vec<CategoryOption>,
    connection: Connection,
    notice_ttl: Duration,
}

impl<A: ExpenseApi> Tracker<A> {
    pub fn new(api: Arc<A>, settings: TrackerSettings) -> Self {
        let filters = FilterStore::default();
        let filter_rx = filters.subscribe();
        Self {
            fetcher: ExpenseFetcher::new(Arc::clone(&api), settings.request_timeout),
            submitter: ExpenseSubmitter::new(
                Arc::clone(&api),
                settings.request_timeout,
                settings.today,
            ),
            api,
            filters,
            filter_rx,
            notices: Notices::default(),
            categories: CategoryOption::builtin(),
            connection: Connection::Unknown,
            notice_ttl: settings.notice_ttl,
        }
    }

    /// Health check, category list, then the first fetch.
    pub async fn start(&mut self) {
        self.check_health().await;
        self.load_categories().await;
        self.refresh();
    }

    pub async fn check_health(&mut self) {
        self.connection = match self.api.health().await {
            Ok(health) if health.is_ok() => Connection::Ok,
            Ok(health) => {
                tracing::warn!(status = %health.status, "backend reported unhealthy");
                Connection::Down
            }
            Err(err) => {
                tracing::warn!("health check failed: {err}");
                Connection::Down
            }
        };
    }

    /// Loads category labels once. Keeps the built-in list on failure.
    pub async fn load_categories(&mut self) {
        match self.api.categories().await {
            Ok(categories) if !categories.is_empty() => self.categories = categories,
            Ok(_) => tracing::warn!("backend returned no categories, using built-in list"),
            Err(err) => tracing::error!("failed to fetch categories: {err}"),
        }
    }

    pub fn filters(&self) -> &FilterStore {
        &self.filters
    }

    pub fn filter(&self) -> FilterState {
        self.filters.snapshot()
    }

    pub fn set_filter(&mut self, change: FilterChange) {
        self.filters.set_filter(change);
    }

    /// Re-fetches the current filter.
    pub fn refresh(&mut self) {
        // The snapshot is about to be fetched; don't fetch it again on pump.
        self.filter_rx.mark_unchanged();
        self.fetcher.fetch(self.filters.snapshot());
    }

    pub fn view(&self) -> &ExpensesView {
        self.fetcher.view()
    }

    pub fn submitter(&self) -> &ExpenseSubmitter<A> {
        &self.submitter
    }

    pub fn submitter_mut(&mut self) -> &mut ExpenseSubmitter<A> {
        &mut self.submitter
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn categories(&self) -> &[CategoryOption] {
        &self.categories
    }

    /// Label for a category, preferring the backend's wording.
    pub fn category_label(&self, filter: CategoryFilter) -> String {
        match filter {
            CategoryFilter::All => "All Categories".to_string(),
            CategoryFilter::Only(category) => self
                .categories
                .iter()
                .find(|option| option.value == category)
                .map(|option| option.label.clone())
                .unwrap_or_else(|| category.label().to_string()),
        }
    }

    pub fn connection(&self) -> Connection {
        self.connection
    }

    pub fn is_busy(&self) -> bool {
        self.fetcher.is_loading() || self.submitter.is_submitting()
    }

    pub fn submit(&mut self) -> SubmitStart {
        let start = self.submitter.submit();
        if matches!(start, SubmitStart::Started { .. }) {
            self.notices.dismiss();
        }
        start
    }

    /// Dismisses visible notices and the fetch error.
    pub fn dismiss(&mut self) {
        self.notices.dismiss();
        self.fetcher.clear_error();
    }

    /// Applies everything that is ready without waiting: filter changes,
    /// finished requests and expired notices.
    pub fn pump(&mut self) {
        // Filter changes go first so a pair that finished just before the
        // change is cancelled, not applied.
        if self.filter_rx.has_changed().unwrap_or(false) {
            let filter = *self.filter_rx.borrow_and_update();
            self.fetcher.fetch(filter);
        }
        if let Some(event) = self.fetcher.poll() {
            self.on_fetch(event);
        }
        while let Some(event) = self.submitter.poll() {
            self.on_submit(event);
        }
        self.notices.expire(Instant::now());
    }

    /// Pumps until no request is pending.
    pub async fn settle(&mut self) {
        loop {
            self.pump();
            if self.fetcher.is_loading() {
                if let Some(event) = self.fetcher.next_event().await {
                    self.on_fetch(event);
                }
            } else if self.submitter.is_submitting() {
                if let Some(event) = self.submitter.next_event().await {
                    self.on_submit(event);
                }
            } else {
                break;
            }
        }
    }

    fn on_fetch(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Loaded => self.notices.clear_error(),
            FetchEvent::Failed(message) => self.notices.error(message),
        }
    }

    fn on_submit(&mut self, event: SubmitEvent) {
        match event {
            SubmitEvent::Created(_) => {
                self.notices.clear_error();
                self.notices.success(submitter::SUBMIT_SUCCESS, self.notice_ttl);
                self.refresh();
            }
            SubmitEvent::Failed(message) => self.notices.error(message),
        }
    }
}
