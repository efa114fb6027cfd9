//! Category/sort selection shared by the list view and the fetcher.
//!
//! [`FilterStore`] owns the current [`FilterState`]. Readers get immutable
//! snapshots; dependents subscribe and are notified of every mutation.
use std::{fmt, str::FromStr};

use api_types::{
    category::Category,
    expense::{ExpenseQuery, SortOrder},
};
use thiserror::Error;
use tokio::sync::watch;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Every selectable value, "all" first.
    pub fn choices() -> impl Iterator<Item = CategoryFilter> {
        std::iter::once(Self::All).chain(Category::ALL.into_iter().map(Self::Only))
    }

    pub fn category(self) -> Option<Category> {
        match self {
            Self::All => None,
            Self::Only(category) => Some(category),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(category) => category.as_str(),
        }
    }

    /// The next choice, wrapping around.
    pub fn next(self) -> Self {
        let choices: Vec<_> = Self::choices().collect();
        let index = choices.iter().position(|c| *c == self).unwrap_or(0);
        choices[(index + 1) % choices.len()]
    }

    /// The previous choice, wrapping around.
    pub fn prev(self) -> Self {
        let choices: Vec<_> = Self::choices().collect();
        let index = choices.iter().position(|c| *c == self).unwrap_or(0);
        choices[(index + choices.len() - 1) % choices.len()]
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(Self::All);
        }
        s.parse::<Category>()
            .map(Self::Only)
            .map_err(|_| FilterError::UnknownCategory(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    pub category: CategoryFilter,
    pub sort: SortOrder,
}

impl FilterState {
    /// Query parameters for both the list and total endpoints.
    pub fn query(&self) -> ExpenseQuery {
        ExpenseQuery {
            category: self.category.category(),
            sort: self.sort,
        }
    }
}

/// Replaces exactly one field of a [`FilterState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterChange {
    Category(CategoryFilter),
    Sort(SortOrder),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterField {
    Category,
    Sort,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unknown category filter: {0}")]
    UnknownCategory(String),
    #[error("unknown sort order: {0}")]
    UnknownSort(String),
}

#[derive(Debug)]
pub struct FilterStore {
    state: watch::Sender<FilterState>,
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

impl FilterStore {
    pub fn new(initial: FilterState) -> Self {
        let (state, _) = watch::channel(initial);
        Self { state }
    }

    pub fn snapshot(&self) -> FilterState {
        *self.state.borrow()
    }

    /// Receiver notified after every [`FilterStore::set_filter`].
    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.state.subscribe()
    }

    /// Replaces one field and notifies subscribers, even when the value is
    /// unchanged: re-selecting a filter is an explicit request to refetch.
    pub fn set_filter(&self, change: FilterChange) {
        self.state.send_modify(|state| match change {
            FilterChange::Category(category) => state.category = category,
            FilterChange::Sort(sort) => state.sort = sort,
        });
        tracing::debug!(?change, "filter changed");
    }

    /// String form of [`FilterStore::set_filter`], e.g. `("category", "food")`.
    pub fn set_filter_value(&self, field: FilterField, value: &str) -> Result<(), FilterError> {
        let change = match field {
            FilterField::Category => FilterChange::Category(value.parse()?),
            FilterField::Sort => FilterChange::Sort(match value {
                "date_desc" => SortOrder::DateDesc,
                "date_asc" => SortOrder::DateAsc,
                other => return Err(FilterError::UnknownSort(other.to_string())),
            }),
        };
        self.set_filter(change);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_filter_replaces_one_field() {
        let store = FilterStore::default();
        store.set_filter(FilterChange::Sort(SortOrder::DateAsc));
        store.set_filter(FilterChange::Category(CategoryFilter::Only(Category::Food)));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.sort, SortOrder::DateAsc);
        assert_eq!(snapshot.category, CategoryFilter::Only(Category::Food));

        store.set_filter(FilterChange::Category(CategoryFilter::All));
        assert_eq!(store.snapshot().sort, SortOrder::DateAsc);
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let store = FilterStore::default();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        store.set_filter(FilterChange::Sort(SortOrder::DateDesc));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), FilterState::default());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn string_values_are_checked() {
        let store = FilterStore::default();
        store
            .set_filter_value(FilterField::Category, "transport")
            .unwrap();
        store.set_filter_value(FilterField::Sort, "date_asc").unwrap();
        assert_eq!(
            store.snapshot().query(),
            ExpenseQuery {
                category: Some(Category::Transport),
                sort: SortOrder::DateAsc,
            }
        );

        assert_eq!(
            store.set_filter_value(FilterField::Category, "groceries"),
            Err(FilterError::UnknownCategory("groceries".to_string()))
        );
        assert!(store.set_filter_value(FilterField::Sort, "amount").is_err());
        store.set_filter_value(FilterField::Category, "all").unwrap();
        assert_eq!(store.snapshot().query().category, None);
    }

    #[test]
    fn category_choices_wrap() {
        assert_eq!(CategoryFilter::All.next(), CategoryFilter::Only(Category::Food));
        assert_eq!(CategoryFilter::All.prev(), CategoryFilter::Only(Category::Other));
        assert_eq!(CategoryFilter::Only(Category::Other).next(), CategoryFilter::All);
    }
}
