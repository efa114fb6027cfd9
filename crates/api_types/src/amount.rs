use std::{
    fmt,
    ops::{Add, AddAssign},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Errors produced while parsing an [`Amount`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount")]
    Invalid,
    #[error("too many decimals")]
    TooManyDecimals,
    #[error("amount too large")]
    TooLarge,
}

/// Money amount represented as **integer minor units** (paise).
///
/// The backend stores amounts as decimals with two fractional digits. Keeping
/// them as integers on the client avoids floating-point drift when summing.
///
/// # Examples
///
/// ```rust
/// use api_types::Amount;
///
/// let amount: Amount = "50.5".parse().unwrap();
/// assert_eq!(amount.minor(), 5050);
/// assert_eq!(amount.to_string(), "50.50");
/// assert!("12.345".parse::<Amount>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Creates a new amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Integer division by a count, rounding half away from zero.
    ///
    /// Returns [`Amount::ZERO`] when `count` is 0.
    #[must_use]
    pub fn average(self, count: u64) -> Amount {
        if count == 0 {
            return Amount::ZERO;
        }
        let count = i128::from(count);
        let value = i128::from(self.0);
        let half = count / 2;
        let rounded = if value >= 0 {
            (value + half) / count
        } else {
            (value - half) / count
        };
        Amount(rounded as i64)
    }

    fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let minor = (value * 100.0).round();
        if minor.abs() > i64::MAX as f64 {
            return None;
        }
        Some(Amount(minor as i64))
    }

    fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses a decimal string into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    /// At most two fractional digits are allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped.trim_start())
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped.trim_start())
        } else {
            (false, trimmed)
        };
        if rest.is_empty() {
            return Err(AmountError::Empty);
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let units_str = parts.next().ok_or(AmountError::Invalid)?;
        let frac_str = parts.next();
        if parts.next().is_some() {
            return Err(AmountError::Invalid);
        }

        // ".5" is accepted as 0.50, "5." as 5.00.
        let units: i64 = if units_str.is_empty() {
            if frac_str.is_none_or(str::is_empty) {
                return Err(AmountError::Invalid);
            }
            0
        } else if units_str.chars().all(|c| c.is_ascii_digit()) {
            units_str.parse().map_err(|_| AmountError::TooLarge)?
        } else {
            return Err(AmountError::Invalid);
        };

        let frac: i64 = match frac_str {
            None | Some("") => 0,
            Some(frac) if !frac.chars().all(|c| c.is_ascii_digit()) => {
                return Err(AmountError::Invalid);
            }
            Some(frac) if frac.len() == 1 => frac.parse::<i64>().map_err(|_| AmountError::Invalid)? * 10,
            Some(frac) if frac.len() == 2 => frac.parse::<i64>().map_err(|_| AmountError::Invalid)?,
            Some(_) => return Err(AmountError::TooManyDecimals),
        };

        let total = units
            .checked_mul(100)
            .and_then(|v| v.checked_add(frac))
            .ok_or(AmountError::TooLarge)?;

        Ok(Amount(if negative { -total } else { total }))
    }
}

impl Serialize for Amount {
    /// Amounts go out as JSON numbers (`50.5`), which the backend's decimal
    /// field accepts.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Amount {
    /// Accepts both `"50.00"` and `50` / `50.5`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl de::Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        v.parse().map_err(|err: AmountError| E::custom(format!("{err}: {v:?}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        v.checked_mul(100)
            .map(Amount)
            .ok_or_else(|| E::custom(AmountError::TooLarge))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        i64::try_from(v)
            .ok()
            .and_then(|v| v.checked_mul(100))
            .map(Amount)
            .ok_or_else(|| E::custom(AmountError::TooLarge))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        Amount::from_f64(v).ok_or_else(|| E::custom(AmountError::Invalid))
    }
}
