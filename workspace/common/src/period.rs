use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Number of days in the given month, or `None` for an invalid year/month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let first_of_next = first.checked_add_months(Months::new(1))?;
    first_of_next.pred_opt().map(|d| d.day())
}

/// A calendar month, the period covered by one balance sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
pub struct SheetPeriod {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl SheetPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        if !(1..=12).contains(&month) {
            return Err(format!("month must be in range 1-12, got {}", month));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(format!("year {} is out of range", year));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // Validated in `new`, `of` starts from a real date.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let days = days_in_month(self.year, self.month).unwrap_or(28);
        NaiveDate::from_ymd_opt(self.year, self.month, days).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for SheetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for SheetPeriod {
    type Err = String;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("invalid period '{}', expected YYYY-MM", s))?;
        let year = year
            .parse::<i32>()
            .map_err(|_| format!("invalid year in period '{}'", s))?;
        let month = month
            .parse::<u32>()
            .map_err(|_| format!("invalid month in period '{}'", s))?;
        Self::new(year, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2019, 2), Some(28));
        assert_eq!(days_in_month(2020, 2), Some(29));
        assert_eq!(days_in_month(2019, 6), Some(30));
        assert_eq!(days_in_month(2019, 12), Some(31));
        assert_eq!(days_in_month(2019, 13), None);
    }

    #[test]
    fn test_parse_period() {
        let period: SheetPeriod = "2019-07".parse().unwrap();
        assert_eq!(period, SheetPeriod { year: 2019, month: 7 });
        assert_eq!(period.to_string(), "2019-07");
        assert_eq!(period.first_day(), NaiveDate::from_ymd_opt(2019, 7, 1).unwrap());
        assert_eq!(period.last_day(), NaiveDate::from_ymd_opt(2019, 7, 31).unwrap());

        assert!("2019-13".parse::<SheetPeriod>().is_err());
        assert!("July 2019".parse::<SheetPeriod>().is_err());
    }

    #[test]
    fn test_contains() {
        let period = SheetPeriod::of(NaiveDate::from_ymd_opt(2020, 2, 10).unwrap());
        assert!(period.contains(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap()));
        assert!(!period.contains(NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()));
    }

    #[test]
    fn test_serialize() {
        let period = SheetPeriod::new(2019, 7).unwrap();
        let json = serde_json::to_value(period).unwrap();
        assert_eq!(json["year"], 2019);
        assert_eq!(json["month"], 7);
    }
}
