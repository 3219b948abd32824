use model::entities::{balance, transaction};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, Set};
use tracing::{debug, info, instrument, trace};

use super::{LedgerStore, TransactionRole};
use crate::error::{ComputeError, Result};

/// Pending and completed totals for one balance, split by side.
///
/// Credit figures are negative since they reduce the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceActivity {
    pub pending_credits: Decimal,
    pub pending_debits: Decimal,
    pub completed_credits: Decimal,
    pub completed_debits: Decimal,
}

/// Sum of credits of the balance's account on its sheet, as a negative amount.
pub async fn credit_amount<S: LedgerStore + ?Sized>(
    store: &S,
    balance: &balance::Model,
    completed: bool,
) -> Result<Decimal> {
    let total = store
        .sum_transaction_amounts(balance.sheet_id, balance.account_id, TransactionRole::Credit, completed)
        .await?;
    Ok(-total)
}

/// Sum of debits of the balance's account on its sheet.
pub async fn debit_amount<S: LedgerStore + ?Sized>(
    store: &S,
    balance: &balance::Model,
    completed: bool,
) -> Result<Decimal> {
    store
        .sum_transaction_amounts(balance.sheet_id, balance.account_id, TransactionRole::Debit, completed)
        .await
}

pub async fn activity<S: LedgerStore + ?Sized>(store: &S, balance: &balance::Model) -> Result<BalanceActivity> {
    Ok(BalanceActivity {
        pending_credits: credit_amount(store, balance, false).await?,
        pending_debits: debit_amount(store, balance, false).await?,
        completed_credits: credit_amount(store, balance, true).await?,
        completed_debits: debit_amount(store, balance, true).await?,
    })
}

async fn compute_ending<S: LedgerStore + ?Sized>(
    store: &S,
    sheet_id: i32,
    account_id: i32,
    beginning: Decimal,
) -> Result<Decimal> {
    let credits = store
        .sum_transaction_amounts(sheet_id, account_id, TransactionRole::Credit, false)
        .await?;
    let debits = store
        .sum_transaction_amounts(sheet_id, account_id, TransactionRole::Debit, false)
        .await?;
    let ending = beginning - credits + debits;
    trace!(%beginning, %credits, %debits, %ending, "Computed ending balance");
    Ok(ending)
}

/// The ending balance implied by the current transactions. Nothing is stored.
#[instrument(skip(store, balance), fields(balance_id = balance.id, sheet_id = balance.sheet_id, account_id = balance.account_id))]
pub async fn recompute<S: LedgerStore + ?Sized>(store: &S, balance: &balance::Model) -> Result<Decimal> {
    compute_ending(store, balance.sheet_id, balance.account_id, balance.beginning).await
}

fn required<T: Clone + Into<sea_orm::Value>>(value: &ActiveValue<T>, field: &str) -> Result<T> {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Ok(v.clone()),
        ActiveValue::NotSet => Err(ComputeError::validation(format!(
            "balance {} must be set before saving",
            field
        ))),
    }
}

/// Overwrites `ending` with the recomputed value. Run before every insert or
/// update of a balance; whatever ending the caller supplied is discarded.
#[instrument(skip(store, balance))]
pub async fn on_balance_save<S: LedgerStore + ?Sized>(
    store: &S,
    mut balance: balance::ActiveModel,
) -> Result<balance::ActiveModel> {
    let sheet_id = required(&balance.sheet_id, "sheet_id")?;
    let account_id = required(&balance.account_id, "account_id")?;
    let beginning = required(&balance.beginning, "beginning")?;

    let ending = compute_ending(store, sheet_id, account_id, beginning).await?;
    debug!(sheet_id, account_id, %ending, "Ending balance set before save");
    balance.ending = Set(ending);
    Ok(balance)
}

/// The state of a transaction before and after a mutation.
///
/// `before` is `None` for a creation and `after` is `None` for a deletion.
#[derive(Debug, Clone, Default)]
pub struct TransactionChange {
    pub before: Option<transaction::Model>,
    pub after: Option<transaction::Model>,
}

impl TransactionChange {
    pub fn created(transaction: transaction::Model) -> Self {
        Self { before: None, after: Some(transaction) }
    }

    pub fn updated(before: transaction::Model, after: transaction::Model) -> Self {
        Self { before: Some(before), after: Some(after) }
    }

    pub fn deleted(transaction: transaction::Model) -> Self {
        Self { before: Some(transaction), after: None }
    }

    /// Distinct (sheet, account) pairs touched by either state, in order of appearance.
    pub fn affected_pairs(&self) -> Vec<(i32, i32)> {
        let mut pairs = Vec::with_capacity(4);
        for t in self.before.iter().chain(self.after.iter()) {
            for pair in [(t.sheet_id, t.credit_id), (t.sheet_id, t.debit_id)] {
                if !pairs.contains(&pair) {
                    pairs.push(pair);
                }
            }
        }
        pairs
    }
}

/// Recomputes and stores the ending of every balance a transaction touched.
///
/// Accounts without a balance on the sheet are skipped. Returns the updated balances.
#[instrument(skip(store, change))]
pub async fn on_transaction_change<S: LedgerStore + ?Sized>(
    store: &S,
    change: &TransactionChange,
) -> Result<Vec<balance::Model>> {
    let mut updated = Vec::new();

    for (sheet_id, account_id) in change.affected_pairs() {
        let Some(existing) = store.find_balance(sheet_id, account_id).await? else {
            debug!(sheet_id, account_id, "No balance for account on sheet, skipping");
            continue;
        };

        let ending = recompute(store, &existing).await?;
        let saved = store.persist_ending(existing, ending).await?;
        info!(balance_id = saved.id, %ending, "Balance recomputed after transaction change");
        updated.push(saved);
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn transaction(id: i32, sheet_id: i32, credit_id: i32, debit_id: i32) -> transaction::Model {
        transaction::Model {
            id,
            sheet_id,
            date: NaiveDate::from_ymd_opt(2019, 7, 1).unwrap(),
            credit_id,
            debit_id,
            amount: Decimal::new(1000, 2),
            memo: None,
            complete: false,
        }
    }

    #[test]
    fn test_affected_pairs_for_creation() {
        let change = TransactionChange::created(transaction(1, 1, 10, 20));
        assert_eq!(change.affected_pairs(), vec![(1, 10), (1, 20)]);
    }

    #[test]
    fn test_affected_pairs_for_update_include_old_accounts() {
        let change = TransactionChange::updated(transaction(1, 1, 10, 20), transaction(1, 1, 10, 30));
        assert_eq!(change.affected_pairs(), vec![(1, 10), (1, 20), (1, 30)]);

        let moved = TransactionChange::updated(transaction(1, 1, 10, 20), transaction(1, 2, 10, 20));
        assert_eq!(moved.affected_pairs(), vec![(1, 10), (1, 20), (2, 10), (2, 20)]);
    }

    #[test]
    fn test_affected_pairs_for_deletion() {
        let change = TransactionChange::deleted(transaction(1, 3, 10, 20));
        assert_eq!(change.affected_pairs(), vec![(3, 10), (3, 20)]);
        assert!(TransactionChange::default().affected_pairs().is_empty());
    }
}
