use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use compute::{default_scheduler, schedule::After};
use model::entities::payment::Frequency;
use std::str::FromStr;
use tracing::debug;

/// Next date of an ad-hoc schedule, after `after` or today.
pub fn next_payment(frequency: &str, day: Option<i32>, after: Option<&str>) -> Result<NaiveDate> {
    let frequency = Frequency::from_str(frequency).map_err(|e| anyhow!(e))?;
    let after = after.map(After::from).unwrap_or_default();
    let next = default_scheduler(None).next_date(frequency, day, after)?;
    debug!(%frequency, ?day, %next, "Next payment date");
    Ok(next)
}
