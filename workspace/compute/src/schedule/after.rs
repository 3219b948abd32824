use chrono::NaiveDate;

use crate::error::{ComputeError, Result};

/// The reference date a payment date is computed from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum After {
    /// The scheduler's notion of today.
    #[default]
    Today,
    Date(NaiveDate),
    /// An ISO `YYYY-MM-DD` string, validated when resolved.
    Iso(String),
}

impl After {
    pub fn resolve(&self, today: NaiveDate) -> Result<NaiveDate> {
        match self {
            After::Today => Ok(today),
            After::Date(date) => Ok(*date),
            After::Iso(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                ComputeError::validation(format!(
                    "invalid reference date '{}', expected YYYY-MM-DD",
                    value
                ))
            }),
        }
    }
}

impl From<NaiveDate> for After {
    fn from(date: NaiveDate) -> Self {
        After::Date(date)
    }
}

impl From<Option<NaiveDate>> for After {
    fn from(date: Option<NaiveDate>) -> Self {
        date.map(After::Date).unwrap_or(After::Today)
    }
}

impl From<&str> for After {
    fn from(value: &str) -> Self {
        After::Iso(value.to_string())
    }
}

impl From<String> for After {
    fn from(value: String) -> Self {
        After::Iso(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let today = NaiveDate::from_ymd_opt(2019, 7, 1).unwrap();
        let date = NaiveDate::from_ymd_opt(2019, 2, 1).unwrap();

        assert_eq!(After::Today.resolve(today).unwrap(), today);
        assert_eq!(After::from(date).resolve(today).unwrap(), date);
        assert_eq!(After::from(None).resolve(today).unwrap(), today);
        assert_eq!(After::from("2019-02-01").resolve(today).unwrap(), date);
    }

    #[test]
    fn test_invalid_iso_string() {
        let today = NaiveDate::from_ymd_opt(2019, 7, 1).unwrap();
        let err = After::from("07/01/2019").resolve(today).unwrap_err();
        assert!(matches!(err, ComputeError::Validation(_)));
        assert!(err.to_string().contains("expected YYYY-MM-DD"));
    }
}
