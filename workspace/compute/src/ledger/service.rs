//! Mutations of sheets, balances and transactions, each in one database
//! transaction together with the recomputation it requires.

use chrono::NaiveDate;
use common::SheetPeriod;
use model::entities::{account, balance, balance_sheet, payment, transaction};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace, warn};

use super::balance::{on_balance_save, on_transaction_change, recompute, TransactionChange};
use super::sheet::title_for_sheet;
use super::LedgerStore;
use crate::error::{ComputeError, Result};
use crate::schedule::Scheduler;

#[derive(Debug, Clone)]
pub struct NewSheet {
    pub date: NaiveDate,
    pub title: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SheetChanges {
    pub date: Option<NaiveDate>,
    /// A blank title is replaced by the derived one.
    pub title: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBalance {
    pub sheet_id: i32,
    pub account_id: i32,
    pub beginning: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct BalanceChanges {
    pub account_id: Option<i32>,
    pub beginning: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub credit_id: i32,
    pub debit_id: i32,
    pub amount: Decimal,
    pub memo: Option<String>,
    pub complete: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    /// Moves the transaction to another sheet.
    pub sheet_id: Option<i32>,
    pub date: Option<NaiveDate>,
    pub credit_id: Option<i32>,
    pub debit_id: Option<i32>,
    pub amount: Option<Decimal>,
    pub memo: Option<String>,
    pub complete: Option<bool>,
}

/// Overrides for a transaction issued from a payment. Missing values fall
/// back to the payment amount and its next date after the sheet date.
#[derive(Debug, Clone)]
pub struct IssuePayment {
    pub sheet_id: i32,
    pub date: Option<NaiveDate>,
    pub amount: Option<Decimal>,
    pub memo: Option<String>,
}

/// A written transaction and the balances recomputed because of it.
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    pub transaction: transaction::Model,
    pub balances: Vec<balance::Model>,
}

async fn ensure_sheet<C: ConnectionTrait>(db: &C, sheet_id: i32) -> Result<balance_sheet::Model> {
    balance_sheet::Entity::find_by_id(sheet_id)
        .one(db)
        .await?
        .ok_or_else(|| ComputeError::not_found(format!("Balance sheet with id {} does not exist", sheet_id)))
}

async fn ensure_account<C: ConnectionTrait>(db: &C, account_id: i32) -> Result<account::Model> {
    account::Entity::find_by_id(account_id)
        .one(db)
        .await?
        .ok_or_else(|| ComputeError::validation(format!("Account with id {} does not exist", account_id)))
}

/// Rejects a sheet date whose month already has a sheet other than `except`.
async fn ensure_month_free<C: ConnectionTrait>(db: &C, date: NaiveDate, except: Option<i32>) -> Result<()> {
    let period = SheetPeriod::of(date);
    let mut condition = Condition::all()
        .add(balance_sheet::Column::Date.gte(period.first_day()))
        .add(balance_sheet::Column::Date.lte(period.last_day()));
    if let Some(sheet_id) = except {
        condition = condition.add(balance_sheet::Column::Id.ne(sheet_id));
    }

    let existing = balance_sheet::Entity::find().filter(condition).one(db).await?;
    match existing {
        Some(sheet) => Err(ComputeError::conflict(format!(
            "A balance sheet for {} already exists (id {})",
            period, sheet.id
        ))),
        None => Ok(()),
    }
}

async fn ensure_balance_free<S: LedgerStore + ?Sized>(store: &S, sheet_id: i32, account_id: i32) -> Result<()> {
    if let Some(existing) = store.find_balance(sheet_id, account_id).await? {
        return Err(ComputeError::conflict(format!(
            "Account {} already has a balance on sheet {} (id {})",
            account_id, sheet_id, existing.id
        )));
    }
    Ok(())
}

#[instrument(skip(db))]
pub async fn create_sheet(db: &DatabaseConnection, new_sheet: NewSheet) -> Result<balance_sheet::Model> {
    trace!("Creating balance sheet");
    let txn = db.begin().await?;

    ensure_month_free(&txn, new_sheet.date, None).await?;

    let sheet = balance_sheet::ActiveModel {
        date: Set(new_sheet.date),
        title: Set(title_for_sheet(new_sheet.date, new_sheet.title.as_deref())),
        memo: Set(new_sheet.memo),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(sheet_id = sheet.id, title = %sheet.title, "Balance sheet created");
    Ok(sheet)
}

#[instrument(skip(db))]
pub async fn update_sheet(
    db: &DatabaseConnection,
    sheet_id: i32,
    changes: SheetChanges,
) -> Result<balance_sheet::Model> {
    let txn = db.begin().await?;
    let existing = ensure_sheet(&txn, sheet_id).await?;

    let date = changes.date.unwrap_or(existing.date);
    if date != existing.date {
        ensure_month_free(&txn, date, Some(sheet_id)).await?;
    }

    let title = match changes.title {
        Some(title) => title_for_sheet(date, Some(&title)),
        None => title_for_sheet(date, Some(&existing.title)),
    };

    let mut active = existing.into_active_model();
    active.date = Set(date);
    active.title = Set(title);
    if let Some(memo) = changes.memo {
        active.memo = Set(Some(memo));
    }
    let sheet = active.update(&txn).await?;

    txn.commit().await?;
    info!(sheet_id = sheet.id, "Balance sheet updated");
    Ok(sheet)
}

#[instrument(skip(db))]
pub async fn create_balance(db: &DatabaseConnection, new_balance: NewBalance) -> Result<balance::Model> {
    let txn = db.begin().await?;
    ensure_sheet(&txn, new_balance.sheet_id).await?;
    ensure_account(&txn, new_balance.account_id).await?;
    ensure_balance_free(&txn, new_balance.sheet_id, new_balance.account_id).await?;

    let active = balance::ActiveModel {
        sheet_id: Set(new_balance.sheet_id),
        account_id: Set(new_balance.account_id),
        beginning: Set(new_balance.beginning),
        ..Default::default()
    };
    let saved = on_balance_save(&txn, active).await?.insert(&txn).await?;

    txn.commit().await?;
    info!(balance_id = saved.id, ending = %saved.ending, "Balance created");
    Ok(saved)
}

#[instrument(skip(db))]
pub async fn update_balance(
    db: &DatabaseConnection,
    sheet_id: i32,
    balance_id: i32,
    changes: BalanceChanges,
) -> Result<balance::Model> {
    let txn = db.begin().await?;
    let existing = balance::Entity::find_by_id(balance_id)
        .filter(balance::Column::SheetId.eq(sheet_id))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            ComputeError::not_found(format!("Balance with id {} does not exist on sheet {}", balance_id, sheet_id))
        })?;

    if let Some(account_id) = changes.account_id.filter(|&id| id != existing.account_id) {
        ensure_account(&txn, account_id).await?;
        ensure_balance_free(&txn, sheet_id, account_id).await?;
    }

    let mut active = existing.into_active_model();
    if let Some(account_id) = changes.account_id {
        active.account_id = Set(account_id);
    }
    if let Some(beginning) = changes.beginning {
        active.beginning = Set(beginning);
    }
    let saved = on_balance_save(&txn, active).await?.update(&txn).await?;

    txn.commit().await?;
    info!(balance_id = saved.id, ending = %saved.ending, "Balance updated");
    Ok(saved)
}

/// Rejects a transaction or payment that moves money from an account into itself.
pub fn ensure_distinct_accounts(credit_id: i32, debit_id: i32) -> Result<()> {
    if credit_id == debit_id {
        return Err(ComputeError::validation(format!(
            "credit and debit accounts must differ, both are {}",
            credit_id
        )));
    }
    Ok(())
}

async fn insert_transaction<C: ConnectionTrait + Send + Sync>(
    txn: &C,
    sheet_id: i32,
    new_transaction: NewTransaction,
) -> Result<TransactionOutcome> {
    ensure_distinct_accounts(new_transaction.credit_id, new_transaction.debit_id)?;
    ensure_account(txn, new_transaction.credit_id).await?;
    ensure_account(txn, new_transaction.debit_id).await?;

    let created = transaction::ActiveModel {
        sheet_id: Set(sheet_id),
        date: Set(new_transaction.date),
        credit_id: Set(new_transaction.credit_id),
        debit_id: Set(new_transaction.debit_id),
        amount: Set(new_transaction.amount),
        memo: Set(new_transaction.memo),
        complete: Set(new_transaction.complete),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let balances = on_transaction_change(txn, &TransactionChange::created(created.clone())).await?;
    Ok(TransactionOutcome { transaction: created, balances })
}

#[instrument(skip(db))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    sheet_id: i32,
    new_transaction: NewTransaction,
) -> Result<TransactionOutcome> {
    let txn = db.begin().await?;
    ensure_sheet(&txn, sheet_id).await?;
    let outcome = insert_transaction(&txn, sheet_id, new_transaction).await?;

    txn.commit().await?;
    info!(transaction_id = outcome.transaction.id, recomputed = outcome.balances.len(), "Transaction created");
    Ok(outcome)
}

async fn find_transaction<C: ConnectionTrait>(
    db: &C,
    sheet_id: i32,
    transaction_id: i32,
) -> Result<transaction::Model> {
    transaction::Entity::find_by_id(transaction_id)
        .filter(transaction::Column::SheetId.eq(sheet_id))
        .one(db)
        .await?
        .ok_or_else(|| {
            ComputeError::not_found(format!(
                "Transaction with id {} does not exist on sheet {}",
                transaction_id, sheet_id
            ))
        })
}

#[instrument(skip(db))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    sheet_id: i32,
    transaction_id: i32,
    changes: TransactionChanges,
) -> Result<TransactionOutcome> {
    let txn = db.begin().await?;
    let before = find_transaction(&txn, sheet_id, transaction_id).await?;

    if let Some(target_sheet) = changes.sheet_id {
        ensure_sheet(&txn, target_sheet).await?;
    }
    for account_id in [changes.credit_id, changes.debit_id].into_iter().flatten() {
        ensure_account(&txn, account_id).await?;
    }

    let mut active = before.clone().into_active_model();
    if let Some(value) = changes.sheet_id {
        active.sheet_id = Set(value);
    }
    if let Some(value) = changes.date {
        active.date = Set(value);
    }
    if let Some(value) = changes.credit_id {
        active.credit_id = Set(value);
    }
    if let Some(value) = changes.debit_id {
        active.debit_id = Set(value);
    }
    if let Some(value) = changes.amount {
        active.amount = Set(value);
    }
    if let Some(value) = changes.memo {
        active.memo = Set(Some(value));
    }
    if let Some(value) = changes.complete {
        active.complete = Set(value);
    }
    ensure_distinct_accounts(
        changes.credit_id.unwrap_or(before.credit_id),
        changes.debit_id.unwrap_or(before.debit_id),
    )?;
    let after = active.update(&txn).await?;

    let balances = on_transaction_change(&txn, &TransactionChange::updated(before, after.clone())).await?;

    txn.commit().await?;
    info!(transaction_id = after.id, recomputed = balances.len(), "Transaction updated");
    Ok(TransactionOutcome { transaction: after, balances })
}

#[instrument(skip(db))]
pub async fn delete_transaction(
    db: &DatabaseConnection,
    sheet_id: i32,
    transaction_id: i32,
) -> Result<Vec<balance::Model>> {
    let txn = db.begin().await?;
    let existing = find_transaction(&txn, sheet_id, transaction_id).await?;

    existing.clone().delete(&txn).await?;
    let balances = on_transaction_change(&txn, &TransactionChange::deleted(existing)).await?;

    txn.commit().await?;
    info!(transaction_id, recomputed = balances.len(), "Transaction deleted");
    Ok(balances)
}

/// Recomputes and stores the ending of every balance on a sheet.
#[instrument(skip(db))]
pub async fn recompute_sheet(db: &DatabaseConnection, sheet_id: i32) -> Result<Vec<balance::Model>> {
    let txn = db.begin().await?;
    ensure_sheet(&txn, sheet_id).await?;

    let mut updated = Vec::new();
    for existing in txn.balances_for_sheet(sheet_id).await? {
        let ending = recompute(&txn, &existing).await?;
        if ending != existing.ending {
            debug!(balance_id = existing.id, old = %existing.ending, new = %ending, "Ending balance changed");
        }
        updated.push(txn.persist_ending(existing, ending).await?);
    }

    txn.commit().await?;
    info!(sheet_id, count = updated.len(), "Sheet balances recomputed");
    Ok(updated)
}

/// Creates a transaction on a sheet from a payment template.
#[instrument(skip(db, scheduler))]
pub async fn issue_payment(
    db: &DatabaseConnection,
    scheduler: &Scheduler,
    payment_id: i32,
    issue: IssuePayment,
) -> Result<TransactionOutcome> {
    let txn = db.begin().await?;
    let payment = payment::Entity::find_by_id(payment_id)
        .one(&txn)
        .await?
        .ok_or_else(|| ComputeError::not_found(format!("Payment with id {} does not exist", payment_id)))?;
    let sheet = ensure_sheet(&txn, issue.sheet_id).await?;

    let amount = issue.amount.or(payment.amount).ok_or_else(|| {
        ComputeError::validation("payment has no default amount, an amount is required")
    })?;
    let date = match issue.date {
        Some(date) => date,
        None => scheduler.next_payment_date(&payment, sheet.date).map_err(|e| {
            warn!(payment_id, "Cannot default the transaction date: {}", e);
            e
        })?,
    };
    let memo = issue.memo.or_else(|| payment.description.clone());

    let outcome = insert_transaction(
        &txn,
        sheet.id,
        NewTransaction {
            date,
            credit_id: payment.credit_id,
            debit_id: payment.debit_id,
            amount,
            memo,
            complete: false,
        },
    )
    .await?;

    txn.commit().await?;
    info!(payment_id, transaction_id = outcome.transaction.id, "Transaction issued from payment");
    Ok(outcome)
}
