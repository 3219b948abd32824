use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};

use model::entities::{account, balance, balance_sheet, company, payment, transaction};

pub type Result<T> = std::result::Result<T, DbErr>;

/// Amount from a number of cents.
pub fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

pub async fn new_company(db: &DatabaseConnection) -> Result<company::Model> {
    static COMPANY_ID: AtomicU64 = AtomicU64::new(0);
    let current_id = COMPANY_ID.fetch_add(1, Ordering::SeqCst);

    company::ActiveModel {
        name: Set(format!("Test bank {}", current_id)),
        short_name: Set(None),
        url: Set(None),
        active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_account(
    db: &DatabaseConnection,
    company: &company::Model,
    name: &str,
    account_type: account::AccountType,
) -> Result<account::Model> {
    account::ActiveModel {
        account_type: Set(account_type),
        name: Set(name.to_string()),
        company_id: Set(company.id),
        active: Set(true),
        exclude: Set(false),
        currency: Set("USD".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_sheet(db: &DatabaseConnection, date: NaiveDate) -> Result<balance_sheet::Model> {
    balance_sheet::ActiveModel {
        date: Set(date),
        title: Set(format!("Sheet {}", date)),
        memo: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Inserts a balance directly, with `ending` equal to `beginning`.
pub async fn new_balance(
    db: &DatabaseConnection,
    sheet: &balance_sheet::Model,
    account: &account::Model,
    beginning_cents: i64,
) -> Result<balance::Model> {
    balance::ActiveModel {
        sheet_id: Set(sheet.id),
        account_id: Set(account.id),
        beginning: Set(cents(beginning_cents)),
        ending: Set(cents(beginning_cents)),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Inserts a transaction directly, without recomputing any balance.
pub async fn new_transaction(
    db: &DatabaseConnection,
    sheet: &balance_sheet::Model,
    credit: &account::Model,
    debit: &account::Model,
    amount_cents: i64,
    complete: bool,
) -> Result<transaction::Model> {
    transaction::ActiveModel {
        sheet_id: Set(sheet.id),
        date: Set(sheet.date),
        credit_id: Set(credit.id),
        debit_id: Set(debit.id),
        amount: Set(cents(amount_cents)),
        memo: Set(None),
        complete: Set(complete),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn new_payment(
    db: &DatabaseConnection,
    credit: &account::Model,
    debit: &account::Model,
    frequency: payment::Frequency,
    day: Option<i32>,
    amount_cents: Option<i64>,
) -> Result<payment::Model> {
    payment::ActiveModel {
        credit_id: Set(credit.id),
        debit_id: Set(debit.id),
        amount: Set(amount_cents.map(cents)),
        frequency: Set(frequency),
        day: Set(day),
        description: Set(None),
        active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
}
