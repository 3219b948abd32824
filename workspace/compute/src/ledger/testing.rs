pub mod helpers;
pub mod scenario_monthly_bills;

pub use scenario_monthly_bills::ScenarioMonthlyBills;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Set};

use super::balance::{activity, credit_amount, debit_amount, on_balance_save, recompute};
use super::service::{self, BalanceChanges, IssuePayment, NewBalance, NewSheet, NewTransaction, TransactionChanges};
use super::sheet::{find_sheet_for_period, sheet_totals};
use super::LedgerStore;
use crate::error::{ComputeError, Result as ComputeResult};
use crate::schedule::Scheduler;
use helpers::{cents, new_account, new_company, new_payment, new_sheet, new_transaction};
use migration::{Migrator, MigratorTrait};
use model::entities::account::AccountType;
use model::entities::{account, balance, balance_sheet, payment, transaction};

async fn setup_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Enable foreign keys
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Migrator::up(&db, None).await.expect("Migrations failed.");
    Ok(db)
}

/// Expected ending per account: (account_id, ending).
pub type AssertResult = Vec<(i32, Decimal)>;

/// Prepared test scenario.
pub type TestScenario = (DatabaseConnection, balance_sheet::Model, AssertResult);

#[async_trait]
pub trait TestScenarioBuilder {
    async fn get_scenario(&self) -> Result<TestScenario, DbErr>;
}

/// Recomputes the scenario's sheet and checks every expected ending.
pub async fn run_and_assert_scenario(builder: &dyn TestScenarioBuilder) -> ComputeResult<Vec<balance::Model>> {
    let (db, sheet, expected) = builder.get_scenario().await?;

    let balances = service::recompute_sheet(&db, sheet.id).await?;

    for (account_id, ending) in expected {
        let found = balances
            .iter()
            .find(|b| b.account_id == account_id)
            .unwrap_or_else(|| panic!("no balance for account {}", account_id));
        assert_eq!(found.ending, ending, "ending of account {}", account_id);
    }

    Ok(balances)
}

struct Fixture {
    db: DatabaseConnection,
    sheet: balance_sheet::Model,
    checking: account::Model,
    savings: account::Model,
    visa: account::Model,
    electricity: account::Model,
}

async fn fixture() -> Fixture {
    let db = setup_db().await.unwrap();
    let bank = new_company(&db).await.unwrap();
    let checking = new_account(&db, &bank, "Checking", AccountType::Cash).await.unwrap();
    let savings = new_account(&db, &bank, "Savings", AccountType::Cash).await.unwrap();
    let visa = new_account(&db, &bank, "Visa", AccountType::Credit).await.unwrap();
    let electricity = new_account(&db, &bank, "Electricity", AccountType::Billing).await.unwrap();
    let sheet = new_sheet(&db, NaiveDate::from_ymd_opt(2019, 7, 1).unwrap()).await.unwrap();

    Fixture { db, sheet, checking, savings, visa, electricity }
}

fn new_tx(f: &Fixture, credit: &account::Model, debit: &account::Model, amount_cents: i64) -> NewTransaction {
    NewTransaction {
        date: f.sheet.date,
        credit_id: credit.id,
        debit_id: debit.id,
        amount: cents(amount_cents),
        memo: None,
        complete: false,
    }
}

async fn ending_of(f: &Fixture, account: &account::Model) -> Decimal {
    f.db.find_balance(f.sheet.id, account.id).await.unwrap().unwrap().ending
}

#[tokio::test]
async fn test_scenario_monthly_bills() {
    let scenario = ScenarioMonthlyBills::new();
    let balances = run_and_assert_scenario(&scenario).await.expect("Failed to run scenario");
    assert_eq!(balances.len(), 4);
}

#[tokio::test]
async fn test_monthly_bills_credit_and_debit_amounts() {
    let (db, sheet, _) = ScenarioMonthlyBills::new().get_scenario().await.unwrap();
    let balances = db.balances_for_sheet(sheet.id).await.unwrap();

    // checking, savings, mastercard, visa in insertion order
    let expected_credits = [-557217, -75061, -5374, -78179];
    let expected_debits = [75061, 0, 159833, 371265];

    for (i, b) in balances.iter().enumerate() {
        assert_eq!(credit_amount(&db, b, false).await.unwrap(), cents(expected_credits[i]));
        assert_eq!(debit_amount(&db, b, false).await.unwrap(), cents(expected_debits[i]));
    }
}

#[tokio::test]
async fn test_recompute_is_idempotent() {
    let (db, sheet, _) = ScenarioMonthlyBills::new().get_scenario().await.unwrap();
    let balances = db.balances_for_sheet(sheet.id).await.unwrap();

    for b in &balances {
        let first = recompute(&db, b).await.unwrap();
        let second = recompute(&db, b).await.unwrap();
        assert_eq!(first, second);
    }

    let first_pass = service::recompute_sheet(&db, sheet.id).await.unwrap();
    let second_pass = service::recompute_sheet(&db, sheet.id).await.unwrap();
    assert_eq!(first_pass, second_pass);
}

#[tokio::test]
async fn test_zero_transactions_keeps_beginning() {
    let f = fixture().await;
    let saved = service::create_balance(
        &f.db,
        NewBalance { sheet_id: f.sheet.id, account_id: f.savings.id, beginning: cents(4632221) },
    )
    .await
    .unwrap();

    assert_eq!(saved.ending, cents(4632221));
    assert_eq!(credit_amount(&f.db, &saved, false).await.unwrap(), Decimal::ZERO);
    assert_eq!(debit_amount(&f.db, &saved, true).await.unwrap(), Decimal::ZERO);
}

#[tokio::test]
async fn test_sign_convention() {
    let f = fixture().await;
    for account in [&f.checking, &f.visa] {
        service::create_balance(
            &f.db,
            NewBalance { sheet_id: f.sheet.id, account_id: account.id, beginning: cents(100000) },
        )
        .await
        .unwrap();
    }

    let outcome = service::create_transaction(&f.db, f.sheet.id, new_tx(&f, &f.checking, &f.visa, 25000))
        .await
        .unwrap();

    assert_eq!(outcome.balances.len(), 2);
    assert_eq!(ending_of(&f, &f.checking).await, cents(75000));
    assert_eq!(ending_of(&f, &f.visa).await, cents(125000));
}

#[tokio::test]
async fn test_missing_balance_is_skipped() {
    let f = fixture().await;
    service::create_balance(
        &f.db,
        NewBalance { sheet_id: f.sheet.id, account_id: f.checking.id, beginning: cents(50000) },
    )
    .await
    .unwrap();

    // No balance exists for electricity on the sheet
    let outcome = service::create_transaction(&f.db, f.sheet.id, new_tx(&f, &f.checking, &f.electricity, 10000))
        .await
        .unwrap();

    assert_eq!(outcome.balances.len(), 1);
    assert_eq!(ending_of(&f, &f.checking).await, cents(40000));
    assert!(f.db.find_balance(f.sheet.id, f.electricity.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_completed_transactions_are_excluded_from_ending() {
    let f = fixture().await;
    let checking = service::create_balance(
        &f.db,
        NewBalance { sheet_id: f.sheet.id, account_id: f.checking.id, beginning: cents(50000) },
    )
    .await
    .unwrap();

    let mut completed = new_tx(&f, &f.checking, &f.electricity, 10000);
    completed.complete = true;
    service::create_transaction(&f.db, f.sheet.id, completed).await.unwrap();
    service::create_transaction(&f.db, f.sheet.id, new_tx(&f, &f.checking, &f.electricity, 2500))
        .await
        .unwrap();

    assert_eq!(ending_of(&f, &f.checking).await, cents(47500));

    let figures = activity(&f.db, &checking).await.unwrap();
    assert_eq!(figures.pending_credits, cents(-2500));
    assert_eq!(figures.completed_credits, cents(-10000));
    assert_eq!(figures.pending_debits, Decimal::ZERO);
    assert_eq!(figures.completed_debits, Decimal::ZERO);
}

#[tokio::test]
async fn test_update_transaction_recomputes_old_and_new_accounts() {
    let f = fixture().await;
    for account in [&f.checking, &f.savings, &f.visa] {
        service::create_balance(
            &f.db,
            NewBalance { sheet_id: f.sheet.id, account_id: account.id, beginning: cents(100000) },
        )
        .await
        .unwrap();
    }

    let created = service::create_transaction(&f.db, f.sheet.id, new_tx(&f, &f.checking, &f.visa, 30000))
        .await
        .unwrap()
        .transaction;
    assert_eq!(ending_of(&f, &f.visa).await, cents(130000));

    // Redirect the payment to savings and change the amount
    let outcome = service::update_transaction(
        &f.db,
        f.sheet.id,
        created.id,
        TransactionChanges { debit_id: Some(f.savings.id), amount: Some(cents(20000)), ..Default::default() },
    )
    .await
    .unwrap();

    assert_eq!(outcome.balances.len(), 3);
    assert_eq!(ending_of(&f, &f.checking).await, cents(80000));
    assert_eq!(ending_of(&f, &f.visa).await, cents(100000));
    assert_eq!(ending_of(&f, &f.savings).await, cents(120000));
}

#[tokio::test]
async fn test_complete_flag_update_restores_ending() {
    let f = fixture().await;
    service::create_balance(
        &f.db,
        NewBalance { sheet_id: f.sheet.id, account_id: f.checking.id, beginning: cents(100000) },
    )
    .await
    .unwrap();

    let created = service::create_transaction(&f.db, f.sheet.id, new_tx(&f, &f.checking, &f.electricity, 30000))
        .await
        .unwrap()
        .transaction;
    assert_eq!(ending_of(&f, &f.checking).await, cents(70000));

    service::update_transaction(
        &f.db,
        f.sheet.id,
        created.id,
        TransactionChanges { complete: Some(true), ..Default::default() },
    )
    .await
    .unwrap();
    assert_eq!(ending_of(&f, &f.checking).await, cents(100000));
}

#[tokio::test]
async fn test_delete_transaction_recomputes() {
    let f = fixture().await;
    service::create_balance(
        &f.db,
        NewBalance { sheet_id: f.sheet.id, account_id: f.checking.id, beginning: cents(100000) },
    )
    .await
    .unwrap();

    let created = service::create_transaction(&f.db, f.sheet.id, new_tx(&f, &f.checking, &f.electricity, 12345))
        .await
        .unwrap()
        .transaction;
    assert_eq!(ending_of(&f, &f.checking).await, cents(87655));

    let balances = service::delete_transaction(&f.db, f.sheet.id, created.id).await.unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(ending_of(&f, &f.checking).await, cents(100000));

    let err = service::delete_transaction(&f.db, f.sheet.id, created.id).await.unwrap_err();
    assert!(matches!(err, ComputeError::NotFound(_)));
}

#[tokio::test]
async fn test_on_balance_save_overwrites_supplied_ending() {
    let f = fixture().await;
    new_transaction(&f.db, &f.sheet, &f.savings, &f.checking, 75061, false).await.unwrap();

    let draft = balance::ActiveModel {
        sheet_id: Set(f.sheet.id),
        account_id: Set(f.checking.id),
        beginning: Set(cents(532156)),
        ending: Set(cents(999999999)),
        ..Default::default()
    };
    let saved = on_balance_save(&f.db, draft).await.unwrap().insert(&f.db).await.unwrap();
    assert_eq!(saved.ending, cents(607217));

    let incomplete = balance::ActiveModel { sheet_id: Set(f.sheet.id), ..Default::default() };
    assert!(matches!(
        on_balance_save(&f.db, incomplete).await.unwrap_err(),
        ComputeError::Validation(_)
    ));
}

#[tokio::test]
async fn test_update_balance_recomputes_ending() {
    let f = fixture().await;
    let created = service::create_balance(
        &f.db,
        NewBalance { sheet_id: f.sheet.id, account_id: f.checking.id, beginning: cents(10000) },
    )
    .await
    .unwrap();
    new_transaction(&f.db, &f.sheet, &f.checking, &f.electricity, 2500, false).await.unwrap();

    let updated = service::update_balance(
        &f.db,
        f.sheet.id,
        created.id,
        BalanceChanges { beginning: Some(cents(20000)), ..Default::default() },
    )
    .await
    .unwrap();
    assert_eq!(updated.ending, cents(17500));
}

#[tokio::test]
async fn test_duplicate_balance_is_a_conflict() {
    let f = fixture().await;
    let new_balance = NewBalance { sheet_id: f.sheet.id, account_id: f.checking.id, beginning: cents(100) };
    service::create_balance(&f.db, new_balance.clone()).await.unwrap();

    let err = service::create_balance(&f.db, new_balance).await.unwrap_err();
    assert!(matches!(err, ComputeError::Conflict(_)));
}

#[tokio::test]
async fn test_one_sheet_per_month() {
    let db = setup_db().await.unwrap();

    let july = service::create_sheet(
        &db,
        NewSheet { date: NaiveDate::from_ymd_opt(2019, 7, 1).unwrap(), title: None, memo: None },
    )
    .await
    .unwrap();
    assert_eq!(july.title, "Bills and Banking for Jul 01, 2019");

    let err = service::create_sheet(
        &db,
        NewSheet { date: NaiveDate::from_ymd_opt(2019, 7, 20).unwrap(), title: Some("Again".into()), memo: None },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ComputeError::Conflict(_)));

    let august = service::create_sheet(
        &db,
        NewSheet { date: NaiveDate::from_ymd_opt(2019, 8, 1).unwrap(), title: Some("August".into()), memo: None },
    )
    .await
    .unwrap();

    // Moving August into July is rejected, moving it within August is not
    let err = service::update_sheet(
        &db,
        august.id,
        service::SheetChanges { date: NaiveDate::from_ymd_opt(2019, 7, 2), ..Default::default() },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ComputeError::Conflict(_)));

    let moved = service::update_sheet(
        &db,
        august.id,
        service::SheetChanges { date: NaiveDate::from_ymd_opt(2019, 8, 2), title: Some(String::new()), memo: None },
    )
    .await
    .unwrap();
    assert_eq!(moved.title, "Bills and Banking for Aug 02, 2019");

    let found = find_sheet_for_period(&db, common::SheetPeriod::new(2019, 7).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, july.id);
    assert!(find_sheet_for_period(&db, common::SheetPeriod::new(2019, 9).unwrap())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_sheet_totals_skip_excluded_and_inactive_accounts() {
    let (db, sheet, _) = ScenarioMonthlyBills::new().get_scenario().await.unwrap();
    service::recompute_sheet(&db, sheet.id).await.unwrap();

    let totals = sheet_totals(&db, sheet.id).await.unwrap();
    // 5321.56 + 46322.21 - 1822.49 - 4873.11
    assert_eq!(totals.beginning, cents(4494817));
    // 500.00 + 45571.60 - 277.90 - 1942.25
    assert_eq!(totals.ending, cents(4385145));

    let savings = db.balances_for_sheet(sheet.id).await.unwrap()[1].account_id;
    let mut excluded: account::ActiveModel = account::Entity::find_by_id(savings)
        .one(&db)
        .await
        .unwrap()
        .unwrap()
        .into();
    excluded.exclude = Set(true);
    excluded.update(&db).await.unwrap();

    let totals = sheet_totals(&db, sheet.id).await.unwrap();
    assert_eq!(totals.beginning, cents(4494817 - 4632221));
    assert_eq!(totals.ending, cents(4385145 - 4557160));
}

#[tokio::test]
async fn test_issue_payment_defaults_to_next_date_and_amount() {
    let f = fixture().await;
    service::create_balance(
        &f.db,
        NewBalance { sheet_id: f.sheet.id, account_id: f.checking.id, beginning: cents(100000) },
    )
    .await
    .unwrap();
    let monthly = new_payment(&f.db, &f.checking, &f.electricity, payment::Frequency::Monthly, Some(20), Some(9500))
        .await
        .unwrap();

    let scheduler = Scheduler::new_with_today(NaiveDate::from_ymd_opt(2019, 6, 1).unwrap());
    let outcome = service::issue_payment(
        &f.db,
        &scheduler,
        monthly.id,
        IssuePayment { sheet_id: f.sheet.id, date: None, amount: None, memo: None },
    )
    .await
    .unwrap();

    assert_eq!(outcome.transaction.date, NaiveDate::from_ymd_opt(2019, 7, 20).unwrap());
    assert_eq!(outcome.transaction.amount, cents(9500));
    assert_eq!(ending_of(&f, &f.checking).await, cents(90500));

    let infrequent = new_payment(&f.db, &f.checking, &f.electricity, payment::Frequency::Infrequent, None, None)
        .await
        .unwrap();
    let err = service::issue_payment(
        &f.db,
        &scheduler,
        infrequent.id,
        IssuePayment { sheet_id: f.sheet.id, date: None, amount: Some(cents(100)), memo: None },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ComputeError::Validation(_)));
}

#[tokio::test]
async fn test_partial_update_cannot_collapse_accounts() {
    let f = fixture().await;
    service::create_balance(
        &f.db,
        NewBalance { sheet_id: f.sheet.id, account_id: f.checking.id, beginning: cents(100000) },
    )
    .await
    .unwrap();
    let created = service::create_transaction(&f.db, f.sheet.id, new_tx(&f, &f.checking, &f.visa, 30000))
        .await
        .unwrap()
        .transaction;

    // Only the credit side changes, onto the stored debit account
    let err = service::update_transaction(
        &f.db,
        f.sheet.id,
        created.id,
        TransactionChanges { credit_id: Some(f.visa.id), ..Default::default() },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ComputeError::Validation(_)));

    let stored = transaction::Entity::find_by_id(created.id).one(&f.db).await.unwrap().unwrap();
    assert_eq!(stored.credit_id, f.checking.id);
    assert_eq!(stored.debit_id, f.visa.id);
    assert_eq!(ending_of(&f, &f.checking).await, cents(70000));
}

#[tokio::test]
async fn test_failed_issue_payment_leaves_no_transaction() {
    let f = fixture().await;
    let broken = new_payment(&f.db, &f.checking, &f.checking, payment::Frequency::Monthly, Some(20), Some(9500))
        .await
        .unwrap();

    let scheduler = Scheduler::new_with_today(NaiveDate::from_ymd_opt(2019, 6, 1).unwrap());
    let err = service::issue_payment(
        &f.db,
        &scheduler,
        broken.id,
        IssuePayment { sheet_id: f.sheet.id, date: None, amount: None, memo: None },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ComputeError::Validation(_)));

    let err = service::issue_payment(
        &f.db,
        &scheduler,
        broken.id,
        IssuePayment { sheet_id: f.sheet.id + 100, date: None, amount: None, memo: None },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ComputeError::NotFound(_)));

    let stored = transaction::Entity::find().all(&f.db).await.unwrap();
    assert!(stored.is_empty());
}
