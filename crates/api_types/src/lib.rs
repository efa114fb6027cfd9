//! Wire types shared between the expense backend contract and its clients.
use serde::{Deserialize, Serialize};

mod amount;

pub use amount::{Amount, AmountError};

/// Symbol used when displaying amounts.
pub const CURRENCY_SYMBOL: &str = "₹";

pub mod category {
    use std::{fmt, str::FromStr};

    use super::*;

    /// Fixed set of categories the backend accepts.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Category {
        Food,
        Transport,
        Entertainment,
        Utilities,
        Shopping,
        Health,
        #[default]
        Other,
    }

    impl Category {
        pub const ALL: [Category; 7] = [
            Self::Food,
            Self::Transport,
            Self::Entertainment,
            Self::Utilities,
            Self::Shopping,
            Self::Health,
            Self::Other,
        ];

        /// Returns the value used in query strings and JSON bodies.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Food => "food",
                Self::Transport => "transport",
                Self::Entertainment => "entertainment",
                Self::Utilities => "utilities",
                Self::Shopping => "shopping",
                Self::Health => "health",
                Self::Other => "other",
            }
        }

        /// Human readable label.
        pub fn label(self) -> &'static str {
            match self {
                Self::Food => "Food",
                Self::Transport => "Transport",
                Self::Entertainment => "Entertainment",
                Self::Utilities => "Utilities",
                Self::Shopping => "Shopping",
                Self::Health => "Health",
                Self::Other => "Other",
            }
        }
    }

    impl fmt::Display for Category {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.as_str())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    #[error("unknown category: {0}")]
    pub struct UnknownCategory(pub String);

    impl FromStr for Category {
        type Err = UnknownCategory;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            Self::ALL
                .into_iter()
                .find(|category| category.as_str() == s)
                .ok_or_else(|| UnknownCategory(s.to_string()))
        }
    }

    /// One entry of `GET /expenses/categories/`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryOption {
        pub value: Category,
        pub label: String,
    }

    impl CategoryOption {
        /// The options the client falls back to when the backend list is
        /// unavailable.
        pub fn builtin() -> Vec<CategoryOption> {
            Category::ALL
                .into_iter()
                .map(|value| CategoryOption {
                    value,
                    label: value.label().to_string(),
                })
                .collect()
        }
    }
}

pub mod expense {
    use chrono::{DateTime, FixedOffset, NaiveDate};

    use super::{category::Category, *};

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SortOrder {
        /// Newest first.
        #[default]
        DateDesc,
        DateAsc,
    }

    impl SortOrder {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::DateDesc => "date_desc",
                Self::DateAsc => "date_asc",
            }
        }

        pub fn label(self) -> &'static str {
            match self {
                Self::DateDesc => "Newest First",
                Self::DateAsc => "Oldest First",
            }
        }
    }

    /// Query string shared by the list and total endpoints.
    ///
    /// `category` is omitted entirely when the filter is "all".
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
    pub struct ExpenseQuery {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub category: Option<Category>,
        pub sort: SortOrder,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Expense {
        pub id: i64,
        pub amount: Amount,
        pub category: Category,
        pub description: String,
        /// ISO calendar date (`2024-02-01`).
        pub date: NaiveDate,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub created_at: Option<DateTime<FixedOffset>>,
    }

    /// Body of `GET /expenses/`: either a bare array or a paginated object.
    #[derive(Debug, Deserialize)]
    #[serde(untagged)]
    pub enum ExpenseListResponse {
        Paginated { results: Vec<Expense> },
        Plain(Vec<Expense>),
    }

    impl ExpenseListResponse {
        pub fn into_expenses(self) -> Vec<Expense> {
            match self {
                Self::Paginated { results } => results,
                Self::Plain(expenses) => expenses,
            }
        }
    }

    /// Body of `GET /expenses/total/`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseTotal {
        pub total: Amount,
        pub count: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub currency: Option<String>,
    }

    /// Body of `POST /expenses/`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub amount: Amount,
        pub category: Category,
        pub description: String,
        pub date: NaiveDate,
    }

    /// Field-keyed error body returned when a create is rejected.
    ///
    /// Field entries are lists of messages; a bare string is accepted too.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FieldErrors {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub detail: Option<String>,
        #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
        pub amount: Vec<String>,
        #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
        pub description: Vec<String>,
        #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
        pub date: Vec<String>,
        #[serde(default, deserialize_with = "one_or_many", skip_serializing_if = "Vec::is_empty")]
        pub category: Vec<String>,
    }

    impl FieldErrors {
        /// Most specific message available, in the order the form surfaces
        /// them: detail, amount, description, date.
        pub fn message(&self) -> Option<&str> {
            self.detail
                .as_deref()
                .or_else(|| self.amount.first().map(String::as_str))
                .or_else(|| self.description.first().map(String::as_str))
                .or_else(|| self.date.first().map(String::as_str))
        }
    }

    fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            One(String),
            Many(Vec<String>),
        }

        Ok(match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(message) => vec![message],
            OneOrMany::Many(messages) => messages,
        })
    }
}

pub mod health {
    use super::*;

    /// Body of the API root health check.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
        #[serde(default)]
        pub message: Option<String>,
    }

    impl Health {
        pub fn is_ok(&self) -> bool {
            self.status == "ok"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        category::{Category, CategoryOption},
        expense::{ExpenseListResponse, ExpenseQuery, ExpenseTotal, FieldErrors, SortOrder},
    };

    #[test]
    fn list_accepts_both_shapes() {
        let body = r#"{"id":1,"amount":"50.00","category":"food","description":"Lunch","date":"2024-02-01","created_at":"2024-02-01T12:00:00.123456Z"}"#;
        let plain: ExpenseListResponse = serde_json::from_str(&format!("[{body}]")).unwrap();
        let paged: ExpenseListResponse =
            serde_json::from_str(&format!(r#"{{"count":1,"next":null,"results":[{body}]}}"#))
                .unwrap();

        let plain = plain.into_expenses();
        assert_eq!(plain.len(), 1);
        assert_eq!(plain[0].amount.minor(), 5000);
        assert_eq!(plain[0].category, Category::Food);
        assert_eq!(paged.into_expenses(), plain);
    }

    #[test]
    fn total_accepts_string_or_number() {
        let a: ExpenseTotal =
            serde_json::from_str(r#"{"total":"12.30","currency":"₹","count":2}"#).unwrap();
        let b: ExpenseTotal = serde_json::from_str(r#"{"total":12.3,"count":2}"#).unwrap();
        assert_eq!(a.total, b.total);
        assert_eq!(a.count, 2);
    }

    #[test]
    fn query_omits_category_for_all() {
        let all = ExpenseQuery {
            category: None,
            sort: SortOrder::DateDesc,
        };
        let food = ExpenseQuery {
            category: Some(Category::Food),
            sort: SortOrder::DateAsc,
        };
        assert_eq!(serde_json::to_string(&all).unwrap(), r#"{"sort":"date_desc"}"#);
        assert_eq!(
            serde_json::to_string(&food).unwrap(),
            r#"{"category":"food","sort":"date_asc"}"#
        );
    }

    #[test]
    fn field_errors_follow_priority() {
        let errors: FieldErrors = serde_json::from_str(
            r#"{"description":["Description cannot be empty."],"amount":["Must be positive"]}"#,
        )
        .unwrap();
        assert_eq!(errors.message(), Some("Must be positive"));

        let errors: FieldErrors =
            serde_json::from_str(r#"{"detail":"Throttled","date":"Date is required."}"#).unwrap();
        assert_eq!(errors.message(), Some("Throttled"));
        assert_eq!(errors.date, vec!["Date is required.".to_string()]);

        let errors: FieldErrors = serde_json::from_str(r#"{"category":["bad"]}"#).unwrap();
        assert_eq!(errors.message(), None);
    }

    #[test]
    fn builtin_options_cover_every_category() {
        let options = CategoryOption::builtin();
        assert_eq!(options.len(), Category::ALL.len());
        assert_eq!(options[0].label, "Food");
        assert_eq!("health".parse::<Category>().unwrap(), Category::Health);
        assert!("groceries".parse::<Category>().is_err());
    }
}
