pub mod budget;
pub mod credit;
pub mod error;
pub mod ledger;
pub mod schedule;
pub mod taxes;

use chrono::{NaiveDate, Utc};
use schedule::Scheduler;

/// Returns the scheduler used by the server and the CLI.
///
/// The provided date is used as "today", or the current date if none is provided.
pub fn default_scheduler(today: Option<NaiveDate>) -> Scheduler {
    let today = today.unwrap_or_else(|| Utc::now().date_naive());
    Scheduler::new_with_today(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::entities::payment::Frequency;

    #[test]
    fn test_default_scheduler_uses_given_today() {
        let today = NaiveDate::from_ymd_opt(2019, 7, 10).unwrap();
        let scheduler = default_scheduler(Some(today));
        assert_eq!(scheduler.today(), today);

        // No explicit `after` resolves to the fixed today
        let next = scheduler
            .next_date(Frequency::Monthly, Some(20), schedule::After::Today)
            .unwrap();
        assert_eq!(next, NaiveDate::from_ymd_opt(2019, 7, 20).unwrap());
    }

    #[test]
    fn test_default_scheduler_without_today() {
        let scheduler = default_scheduler(None);
        assert_eq!(scheduler.today(), Utc::now().date_naive());
    }
}
