use std::{collections::BTreeMap, fmt};

use api_types::{
    Amount, AmountError,
    category::Category,
    expense::ExpenseNew,
};
use chrono::NaiveDate;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DraftField {
    Amount,
    Category,
    Description,
    Date,
}

impl DraftField {
    pub const ALL: [DraftField; 4] = [
        Self::Amount,
        Self::Category,
        Self::Description,
        Self::Date,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Amount => "Amount",
            Self::Category => "Category",
            Self::Description => "Description",
            Self::Date => "Date",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-field validation messages. Empty means the draft is valid.
pub type ValidationErrors = BTreeMap<DraftField, String>;

/// The form as typed by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub amount: String,
    pub category: Option<Category>,
    pub description: String,
    /// ISO date text (`YYYY-MM-DD`).
    pub date: String,
}

impl ExpenseDraft {
    /// A blank draft dated `today`, category "other".
    pub fn new(today: NaiveDate) -> Self {
        Self {
            amount: String::new(),
            category: Some(Category::default()),
            description: String::new(),
            date: today.format("%Y-%m-%d").to_string(),
        }
    }

    /// Checks every field and returns the normalized payload.
    pub fn validate(&self) -> Result<ExpenseNew, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let amount = match self.amount.parse::<Amount>() {
            Ok(amount) if amount.is_positive() => Some(amount),
            Err(AmountError::TooManyDecimals) => {
                errors.insert(
                    DraftField::Amount,
                    "Amount can have at most two decimal places".to_string(),
                );
                None
            }
            Ok(_) | Err(_) => {
                errors.insert(
                    DraftField::Amount,
                    "Amount must be greater than zero".to_string(),
                );
                None
            }
        };

        let description = self.description.trim();
        if description.is_empty() {
            errors.insert(DraftField::Description, "Description is required".to_string());
        }

        let date = self.date.trim();
        let date = if date.is_empty() {
            errors.insert(DraftField::Date, "Date is required".to_string());
            None
        } else {
            match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.insert(
                        DraftField::Date,
                        "Date must be in YYYY-MM-DD format".to_string(),
                    );
                    None
                }
            }
        };

        if self.category.is_none() {
            errors.insert(DraftField::Category, "Category is required".to_string());
        }

        match (amount, self.category, date) {
            (Some(amount), Some(category), Some(date)) if errors.is_empty() => Ok(ExpenseNew {
                amount,
                category,
                description: description.to_string(),
                date,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    fn filled() -> ExpenseDraft {
        ExpenseDraft {
            amount: "50".to_string(),
            category: Some(Category::Food),
            description: "  Lunch ".to_string(),
            date: "2024-02-01".to_string(),
        }
    }

    #[test]
    fn new_draft_is_blank_and_dated_today() {
        let draft = ExpenseDraft::new(today());
        assert_eq!(draft.amount, "");
        assert_eq!(draft.description, "");
        assert_eq!(draft.category, Some(Category::Other));
        assert_eq!(draft.date, "2024-02-01");
    }

    #[test]
    fn valid_draft_is_normalized() {
        let payload = filled().validate().unwrap();
        assert_eq!(payload.amount.minor(), 5000);
        assert_eq!(payload.description, "Lunch");
        assert_eq!(payload.category, Category::Food);
        assert_eq!(payload.date, today());
    }

    #[test]
    fn amount_must_be_positive_number() {
        for amount in ["", "0", "-5", "0.00", "abc", "12abc"] {
            let draft = ExpenseDraft {
                amount: amount.to_string(),
                ..filled()
            };
            let errors = draft.validate().unwrap_err();
            assert_eq!(
                errors.get(&DraftField::Amount).map(String::as_str),
                Some("Amount must be greater than zero"),
                "amount {amount:?}"
            );
            assert_eq!(errors.len(), 1);
        }

        let draft = ExpenseDraft {
            amount: "1.234".to_string(),
            ..filled()
        };
        assert!(draft.validate().unwrap_err().contains_key(&DraftField::Amount));
    }

    #[test]
    fn blank_fields_are_reported_together() {
        let draft = ExpenseDraft {
            amount: String::new(),
            category: None,
            description: " \t ".to_string(),
            date: String::new(),
        };
        let errors = draft.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[&DraftField::Description], "Description is required");
        assert_eq!(errors[&DraftField::Date], "Date is required");
        assert_eq!(errors[&DraftField::Category], "Category is required");
    }

    #[test]
    fn date_must_be_iso() {
        let draft = ExpenseDraft {
            date: "01/02/2024".to_string(),
            ..filled()
        };
        assert_eq!(
            draft.validate().unwrap_err()[&DraftField::Date],
            "Date must be in YYYY-MM-DD format"
        );
    }
}
