use anyhow::{anyhow, Result};
use common::{format_amount, SheetPeriod};
use compute::ledger::{service, sheet::find_sheet_for_period};
use model::entities::account;
use sea_orm::EntityTrait;
use tracing::{info, trace};

use crate::config::{connect, Settings};

/// Recomputes the endings of the sheet for `year`-`month` and prints them.
pub async fn recompute(settings: &Settings, year: i32, month: u32) -> Result<()> {
    trace!("Entering recompute function");
    let period = SheetPeriod::new(year, month).map_err(|e| anyhow!(e))?;
    let db = connect(settings).await?;

    let sheet = find_sheet_for_period(&db, period)
        .await?
        .ok_or_else(|| anyhow!("No balance sheet for {}", period))?;
    info!("Recomputing sheet {} ({})", sheet.id, period);

    let balances = service::recompute_sheet(&db, sheet.id).await?;
    for balance in &balances {
        let account = account::Entity::find_by_id(balance.account_id).one(&db).await?;
        let (name, currency) = match account {
            Some(account) => (account.name, account.currency),
            None => (format!("account {}", balance.account_id), "USD".to_string()),
        };
        println!(
            "{:<30} {:>15} -> {:>15}",
            name,
            format_amount(balance.beginning, &currency),
            format_amount(balance.ending, &currency)
        );
    }

    info!("Recomputed {} balances", balances.len());
    Ok(())
}
