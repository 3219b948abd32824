use chrono::NaiveDate;
use common::SheetPeriod;
use model::entities::{account, balance, balance_sheet};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect, RelationTrait, JoinType};
use tracing::{debug, instrument};

use crate::error::Result;

/// Sheets dated within this many days of today are considered current.
const ACTIVE_WINDOW_DAYS: i64 = 15;

/// Title used for a sheet that was saved without one.
pub fn default_title(date: NaiveDate) -> String {
    format!("Bills and Banking for {}", date.format("%b %d, %Y"))
}

/// The title to persist for a sheet: the given one, or a title derived from
/// the date when it is missing or blank.
pub fn title_for_sheet(date: NaiveDate, title: Option<&str>) -> String {
    match title.map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => default_title(date),
    }
}

/// Whether a sheet dated `sheet_date` is the current one relative to `today`.
pub fn is_active(sheet_date: NaiveDate, today: NaiveDate) -> bool {
    (today - sheet_date).num_days().abs() < ACTIVE_WINDOW_DAYS
}

/// The sheet whose date falls in the given month.
#[instrument(skip(db))]
pub async fn find_sheet_for_period<C: ConnectionTrait>(
    db: &C,
    period: SheetPeriod,
) -> Result<Option<balance_sheet::Model>> {
    let sheet = balance_sheet::Entity::find()
        .filter(
            Condition::all()
                .add(balance_sheet::Column::Date.gte(period.first_day()))
                .add(balance_sheet::Column::Date.lte(period.last_day())),
        )
        .one(db)
        .await?;
    Ok(sheet)
}

/// Opening and closing totals of a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetTotals {
    pub beginning: Decimal,
    pub ending: Decimal,
}

/// Totals over the balances of active, non-excluded accounts.
#[instrument(skip(db))]
pub async fn sheet_totals<C: ConnectionTrait>(db: &C, sheet_id: i32) -> Result<SheetTotals> {
    let balances = balance::Entity::find()
        .join(JoinType::InnerJoin, balance::Relation::Account.def())
        .filter(
            Condition::all()
                .add(balance::Column::SheetId.eq(sheet_id))
                .add(account::Column::Active.eq(true))
                .add(account::Column::Exclude.eq(false)),
        )
        .all(db)
        .await?;

    let totals = SheetTotals {
        beginning: balances.iter().map(|b| b.beginning).sum::<Decimal>().round_dp(2),
        ending: balances.iter().map(|b| b.ending).sum::<Decimal>().round_dp(2),
    };
    debug!(count = balances.len(), ?totals, "Computed sheet totals");
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_title() {
        assert_eq!(default_title(date(2019, 7, 1)), "Bills and Banking for Jul 01, 2019");
        assert_eq!(default_title(date(2020, 12, 15)), "Bills and Banking for Dec 15, 2020");
    }

    #[test]
    fn test_title_for_sheet_keeps_explicit_title() {
        assert_eq!(title_for_sheet(date(2019, 7, 1), Some("July bills")), "July bills");
        assert_eq!(
            title_for_sheet(date(2019, 7, 1), Some("   ")),
            "Bills and Banking for Jul 01, 2019"
        );
        assert_eq!(
            title_for_sheet(date(2019, 7, 1), None),
            "Bills and Banking for Jul 01, 2019"
        );
    }

    #[test]
    fn test_is_active() {
        let sheet = date(2019, 7, 1);
        assert!(is_active(sheet, date(2019, 7, 1)));
        assert!(is_active(sheet, date(2019, 7, 15)));
        assert!(!is_active(sheet, date(2019, 7, 16)));
        assert!(is_active(sheet, date(2019, 6, 17)));
        assert!(!is_active(sheet, date(2019, 6, 16)));
    }
}
