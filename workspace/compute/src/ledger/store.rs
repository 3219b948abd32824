use async_trait::async_trait;
use model::entities::{balance, transaction};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::{debug, instrument, trace};

use super::{LedgerStore, TransactionRole};
use crate::error::Result;

#[async_trait]
impl<C> LedgerStore for C
where
    C: ConnectionTrait + Send + Sync,
{
    #[instrument(skip(self))]
    async fn find_balance(&self, sheet_id: i32, account_id: i32) -> Result<Option<balance::Model>> {
        let found = balance::Entity::find()
            .filter(
                Condition::all()
                    .add(balance::Column::SheetId.eq(sheet_id))
                    .add(balance::Column::AccountId.eq(account_id)),
            )
            .one(self)
            .await?;
        trace!(found = found.is_some(), "Balance lookup");
        Ok(found)
    }

    #[instrument(skip(self))]
    async fn balances_for_sheet(&self, sheet_id: i32) -> Result<Vec<balance::Model>> {
        let balances = balance::Entity::find()
            .filter(balance::Column::SheetId.eq(sheet_id))
            .order_by_asc(balance::Column::Id)
            .all(self)
            .await?;
        Ok(balances)
    }

    #[instrument(skip(self))]
    async fn sum_transaction_amounts(
        &self,
        sheet_id: i32,
        account_id: i32,
        role: TransactionRole,
        complete: bool,
    ) -> Result<Decimal> {
        let account_column = match role {
            TransactionRole::Credit => transaction::Column::CreditId,
            TransactionRole::Debit => transaction::Column::DebitId,
        };

        // Summed here rather than with SQL SUM so the result stays a Decimal
        // on every backend.
        let amounts: Vec<Decimal> = transaction::Entity::find()
            .select_only()
            .column(transaction::Column::Amount)
            .filter(
                Condition::all()
                    .add(transaction::Column::SheetId.eq(sheet_id))
                    .add(account_column.eq(account_id))
                    .add(transaction::Column::Complete.eq(complete)),
            )
            .into_tuple()
            .all(self)
            .await?;

        let total = amounts.iter().copied().sum::<Decimal>().round_dp(2);
        debug!(count = amounts.len(), %total, "Summed transaction amounts");
        Ok(total)
    }

    #[instrument(skip(self, balance), fields(balance_id = balance.id))]
    async fn persist_ending(&self, balance: balance::Model, ending: Decimal) -> Result<balance::Model> {
        let mut active = balance.into_active_model();
        active.ending = Set(ending);
        let updated = active.update(self).await?;
        Ok(updated)
    }
}
