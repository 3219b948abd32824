//! Next due date of recurring payments.
//!
//! A payment stores only its frequency and an integer anchor day. The anchor
//! is parsed into a [`Schedule`] whose meaning depends on the frequency:
//!
//! | Frequency | day                | next date                                        |
//! |-----------|--------------------|--------------------------------------------------|
//! | Daily     | unused             | the day after the reference date                 |
//! | Weekly    | 0-6, Monday is 0   | next matching weekday, never the reference date  |
//! | Monthly   | 1-31               | this month's day if not passed, else next month  |
//! | Quarterly | packed, see below  | this quarter's day if not passed, else next      |
//! | Yearly    | 1-366              | this year's day if not passed, else next year    |
//!
//! Days past the end of a month clamp to its last day, and day 366 clamps to
//! December 31 in common years. Quarterly days are packed as
//! `day_of_month + 31 * month_offset`, see [`QuarterDay`].

mod after;
mod quarter;

pub use after::After;
pub use quarter::QuarterDay;

use chrono::{Datelike, Days, Months, NaiveDate, Utc, Weekday};
use common::{days_in_month, format_amount};
use model::entities::payment::{self, Frequency};
use tracing::{debug, instrument, trace};

use crate::error::{ComputeError, Result};

/// A parsed payment schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    Daily,
    Weekly(Weekday),
    /// Day of month, 1-31.
    Monthly(u32),
    Quarterly(QuarterDay),
    /// Day of year, 1-366.
    Yearly(u32),
}

impl Schedule {
    /// Validate a frequency and anchor day. Infrequent payments have no schedule.
    pub fn parse(frequency: Frequency, day: Option<i32>) -> Result<Self> {
        match frequency {
            Frequency::Daily => Ok(Schedule::Daily),
            Frequency::Weekly => day
                .filter(|d| (0..=6).contains(d))
                .and_then(|d| Weekday::try_from(d as u8).ok())
                .map(Schedule::Weekly)
                .ok_or_else(|| {
                    ComputeError::validation("weekly frequency requires day of week in range 0-6")
                }),
            Frequency::Monthly => day
                .filter(|d| (1..=31).contains(d))
                .map(|d| Schedule::Monthly(d as u32))
                .ok_or_else(|| {
                    ComputeError::validation(
                        "monthly frequency requires day of month in range 1-31",
                    )
                }),
            Frequency::Quarterly => day
                .and_then(QuarterDay::from_packed)
                .map(Schedule::Quarterly)
                .ok_or_else(|| {
                    ComputeError::validation(
                        "specify day as 1, 15, or 31 times month 1, 2, or 3 for quarterly frequency",
                    )
                }),
            Frequency::Yearly => day
                .filter(|d| (1..=366).contains(d))
                .map(|d| Schedule::Yearly(d as u32))
                .ok_or_else(|| {
                    ComputeError::validation("yearly frequency requires day of year in range 1-366")
                }),
            Frequency::Infrequent => Err(ComputeError::validation(
                "cannot compute next date for infrequent frequency",
            )),
        }
    }

    pub fn frequency(&self) -> Frequency {
        match self {
            Schedule::Daily => Frequency::Daily,
            Schedule::Weekly(_) => Frequency::Weekly,
            Schedule::Monthly(_) => Frequency::Monthly,
            Schedule::Quarterly(_) => Frequency::Quarterly,
            Schedule::Yearly(_) => Frequency::Yearly,
        }
    }

    /// The anchor day in its stored form.
    pub fn day(&self) -> Option<i32> {
        match self {
            Schedule::Daily => None,
            Schedule::Weekly(weekday) => Some(weekday.num_days_from_monday() as i32),
            Schedule::Monthly(day) | Schedule::Yearly(day) => Some(*day as i32),
            Schedule::Quarterly(quarter_day) => Some(quarter_day.packed()),
        }
    }

    /// The first due date on or after `after`. Daily and weekly schedules are
    /// always strictly after it.
    pub fn next_after(&self, after: NaiveDate) -> Result<NaiveDate> {
        match *self {
            Schedule::Daily => add_days(after, 1),
            Schedule::Weekly(weekday) => {
                let current = i64::from(after.weekday().num_days_from_monday());
                let target = i64::from(weekday.num_days_from_monday());
                let delta = (target - current - 1).rem_euclid(7) + 1;
                add_days(after, delta as u64)
            }
            Schedule::Monthly(day) => {
                let month_start = first_of_month(after.year(), after.month())?;
                let target_month = if after.day() <= day {
                    month_start
                } else {
                    add_months(month_start, 1)?
                };
                clamp_to_month(target_month, day)
            }
            Schedule::Quarterly(quarter_day) => {
                let quarter = after.month0() / 3;
                let month_start =
                    first_of_month(after.year(), quarter * 3 + quarter_day.month_offset + 1)?;
                let candidate = clamp_to_month(month_start, quarter_day.day_of_month)?;
                if candidate >= after {
                    Ok(candidate)
                } else {
                    clamp_to_month(add_months(month_start, 3)?, quarter_day.day_of_month)
                }
            }
            Schedule::Yearly(day) => {
                let candidate = day_of_year(after.year(), day)?;
                if candidate >= after {
                    Ok(candidate)
                } else {
                    day_of_year(after.year() + 1, day)
                }
            }
        }
    }
}

fn out_of_range(date: NaiveDate) -> ComputeError {
    ComputeError::Date(format!("next payment date after {} is out of range", date))
}

fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| out_of_range(date))
}

fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| out_of_range(date))
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ComputeError::Date(format!("invalid month {}-{}", year, month)))
}

/// `day` of the month starting at `month_start`, or the month's last day if shorter.
fn clamp_to_month(month_start: NaiveDate, day: u32) -> Result<NaiveDate> {
    let last = days_in_month(month_start.year(), month_start.month())
        .ok_or_else(|| out_of_range(month_start))?;
    month_start
        .with_day(day.min(last))
        .ok_or_else(|| out_of_range(month_start))
}

/// The `ordinal` day of `year`, clamped to December 31.
fn day_of_year(year: i32, ordinal: u32) -> Result<NaiveDate> {
    let last = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| ComputeError::Date(format!("year {} is out of range", year)))?;
    NaiveDate::from_yo_opt(year, ordinal.min(last.ordinal()))
        .ok_or_else(|| ComputeError::Date(format!("invalid day {} of year {}", ordinal, year)))
}

/// Computes payment dates relative to a fixed "today".
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    today: NaiveDate,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::new_with_today(Utc::now().date_naive())
    }

    pub fn new_with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Next date for an ad-hoc frequency and day.
    pub fn next_date(
        &self,
        frequency: Frequency,
        day: Option<i32>,
        after: impl Into<After>,
    ) -> Result<NaiveDate> {
        self.next_date_after(frequency, day, after.into())
    }

    #[instrument(skip(self), fields(today = %self.today))]
    fn next_date_after(&self, frequency: Frequency, day: Option<i32>, after: After) -> Result<NaiveDate> {
        trace!("Computing next payment date");
        let schedule = Schedule::parse(frequency, day)?;
        let after = after.resolve(self.today)?;
        let next = schedule.next_after(after)?;
        debug!(%after, %next, ?schedule, "Computed next payment date");
        Ok(next)
    }

    pub fn next_payment_date(
        &self,
        payment: &payment::Model,
        after: impl Into<After>,
    ) -> Result<NaiveDate> {
        self.next_date(payment.frequency, payment.day, after)
    }

    /// Like [`Scheduler::next_payment_date`] but never fails. Returns the
    /// validation message instead.
    pub fn has_next_payment_date(
        &self,
        payment: &payment::Model,
        after: impl Into<After>,
    ) -> (bool, Option<String>) {
        match self.next_payment_date(payment, after) {
            Ok(_) => (true, None),
            Err(e) => (false, Some(e.to_string())),
        }
    }
}

/// Next due date of `payment` on or after `after`, defaulting to today.
pub fn next_payment_date(payment: &payment::Model, after: impl Into<After>) -> Result<NaiveDate> {
    Scheduler::new().next_payment_date(payment, after)
}

pub fn has_next_payment_date(
    payment: &payment::Model,
    after: impl Into<After>,
) -> (bool, Option<String>) {
    Scheduler::new().has_next_payment_date(payment, after)
}

/// Display text for a payment, e.g. "$250.00 monthly payments from Checking to Visa".
pub fn describe_payment(
    payment: &payment::Model,
    credit_name: &str,
    debit_name: &str,
    currency: &str,
) -> String {
    if let Some(description) = payment
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
    {
        return description.to_string();
    }

    match (payment.frequency, payment.amount) {
        (Frequency::Infrequent, _) => format!("Payments from {} to {}", credit_name, debit_name),
        (frequency, Some(amount)) => format!(
            "{} {} payments from {} to {}",
            format_amount(amount, currency),
            frequency.to_string().to_lowercase(),
            credit_name,
            debit_name
        ),
        (frequency, None) => format!("{} payments from {} to {}", frequency, credit_name, debit_name),
    }
}
