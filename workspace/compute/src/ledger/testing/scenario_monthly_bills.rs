use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::DbErr;

use super::helpers::{cents, new_account, new_balance, new_company, new_sheet, new_transaction};
use super::{setup_db, TestScenario, TestScenarioBuilder};
use model::entities::account::AccountType;

/// A month of bills paid from two credit cards and a checking account.
///
/// Checking pays two utilities and both cards, and receives a transfer from
/// savings. Bills have no balance on the sheet so only the four bank
/// accounts are recomputed.
pub struct ScenarioMonthlyBills {}

impl ScenarioMonthlyBills {
    pub fn new() -> Self {
        Self {}
    }
}

#[async_trait]
impl TestScenarioBuilder for ScenarioMonthlyBills {
    async fn get_scenario(&self) -> Result<TestScenario, DbErr> {
        let db = setup_db().await?;

        let bank = new_company(&db).await?;
        let checking = new_account(&db, &bank, "Checking", AccountType::Cash).await?;
        let savings = new_account(&db, &bank, "Savings", AccountType::Cash).await?;
        let mastercard = new_account(&db, &bank, "Mastercard", AccountType::Credit).await?;
        let visa = new_account(&db, &bank, "Visa", AccountType::Credit).await?;

        let utilities = new_company(&db).await?;
        let electricity = new_account(&db, &utilities, "Electricity", AccountType::Billing).await?;
        let water = new_account(&db, &utilities, "Water", AccountType::Billing).await?;
        let cable = new_account(&db, &utilities, "Cable", AccountType::Billing).await?;
        let phone = new_account(&db, &utilities, "Phone", AccountType::Billing).await?;
        let trash = new_account(&db, &utilities, "Trash", AccountType::Billing).await?;
        let netflix = new_account(&db, &utilities, "Netflix", AccountType::Billing).await?;
        let newspaper = new_account(&db, &utilities, "Newspaper", AccountType::Billing).await?;
        let donations = new_account(&db, &utilities, "Donations", AccountType::Charitable).await?;

        let sheet = new_sheet(&db, NaiveDate::from_ymd_opt(2019, 7, 1).unwrap()).await?;

        new_balance(&db, &sheet, &checking, 532156).await?;
        new_balance(&db, &sheet, &savings, 4632221).await?;
        new_balance(&db, &sheet, &mastercard, -182249).await?;
        new_balance(&db, &sheet, &visa, -487311).await?;

        // Bills
        new_transaction(&db, &sheet, &checking, &electricity, 19222, false).await?;
        new_transaction(&db, &sheet, &checking, &water, 6897, false).await?;
        new_transaction(&db, &sheet, &visa, &cable, 20869, false).await?;
        new_transaction(&db, &sheet, &visa, &phone, 11254, false).await?;
        new_transaction(&db, &sheet, &visa, &trash, 7511, false).await?;
        new_transaction(&db, &sheet, &visa, &donations, 38545, false).await?;
        new_transaction(&db, &sheet, &mastercard, &netflix, 1499, false).await?;
        new_transaction(&db, &sheet, &mastercard, &newspaper, 3875, false).await?;

        // Card payments and the savings transfer
        new_transaction(&db, &sheet, &checking, &visa, 371265, false).await?;
        new_transaction(&db, &sheet, &checking, &mastercard, 159833, false).await?;
        new_transaction(&db, &sheet, &savings, &checking, 75061, false).await?;

        let expected = vec![
            (checking.id, cents(50000)),
            (savings.id, cents(4557160)),
            (mastercard.id, cents(-27790)),
            (visa.id, cents(-194225)),
        ];

        Ok((db, sheet, expected))
    }
}
