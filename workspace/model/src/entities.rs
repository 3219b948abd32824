//! SeaORM entity modules for the ledger.
//!
//! Companies hold accounts. Each month gets a balance sheet, and every
//! account tracked in that month gets a balance row on the sheet.
//! Transactions move money between two accounts within a sheet and payments
//! describe transfers that repeat on a schedule. Tax returns stand apart
//! from the ledger and are keyed by year.

pub mod account;
pub mod balance;
pub mod balance_sheet;
pub mod budget;
pub mod company;
pub mod credit_score;
pub mod line_item;
pub mod payment;
pub mod tax_return;
pub mod transaction;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::account::Entity as Account;
    pub use super::balance::Entity as Balance;
    pub use super::balance_sheet::Entity as BalanceSheet;
    pub use super::budget::Entity as Budget;
    pub use super::company::Entity as Company;
    pub use super::credit_score::Entity as CreditScore;
    pub use super::line_item::Entity as LineItem;
    pub use super::payment::Entity as Payment;
    pub use super::tax_return::Entity as TaxReturn;
    pub use super::transaction::Entity as Transaction;
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    async fn insert_account(
        db: &DatabaseConnection,
        company_id: i32,
        name: &str,
        account_type: account::AccountType,
    ) -> Result<account::Model, DbErr> {
        account::ActiveModel {
            account_type: Set(account_type),
            name: Set(name.to_string()),
            company_id: Set(company_id),
            active: Set(true),
            exclude: Set(false),
            currency: Set("USD".to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let bank = company::ActiveModel {
            name: Set("First Federal Savings Bank".to_string()),
            short_name: Set(Some("FFSB".to_string())),
            url: Set(None),
            active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        assert_eq!(bank.display_name(), "FFSB");

        let checking = insert_account(&db, bank.id, "Checking", account::AccountType::Cash).await?;
        let visa = insert_account(&db, bank.id, "Visa", account::AccountType::Credit).await?;

        let sheet = balance_sheet::ActiveModel {
            date: Set(NaiveDate::from_ymd_opt(2019, 7, 1).unwrap()),
            title: Set("July".to_string()),
            memo: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        balance::ActiveModel {
            sheet_id: Set(sheet.id),
            account_id: Set(checking.id),
            beginning: Set(Decimal::new(532156, 2)),
            ending: Set(Decimal::new(532156, 2)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        transaction::ActiveModel {
            sheet_id: Set(sheet.id),
            date: Set(NaiveDate::from_ymd_opt(2019, 7, 10).unwrap()),
            credit_id: Set(checking.id),
            debit_id: Set(visa.id),
            amount: Set(Decimal::new(371265, 2)),
            memo: Set(Some("Pay off visa".to_string())),
            complete: Set(false),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        payment::ActiveModel {
            credit_id: Set(checking.id),
            debit_id: Set(visa.id),
            amount: Set(None),
            frequency: Set(payment::Frequency::Monthly),
            day: Set(Some(15)),
            description: Set(None),
            active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back and verify data
        let accounts = Account::find().all(&db).await?;
        assert_eq!(accounts.len(), 2);
        let stored_visa = accounts.iter().find(|a| a.name == "Visa").unwrap();
        assert_eq!(stored_visa.account_type, account::AccountType::Credit);
        assert!(stored_visa.is_liability());

        let balances = sheet.find_related(Balance).all(&db).await?;
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].beginning, Decimal::new(532156, 2));

        let transactions = Transaction::find()
            .filter(transaction::Column::CreditId.eq(checking.id))
            .all(&db)
            .await?;
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, Decimal::new(371265, 2));
        assert!(!transactions[0].complete);

        let payments = Payment::find().all(&db).await?;
        assert_eq!(payments[0].frequency, payment::Frequency::Monthly);
        assert_eq!(payments[0].amount, None);

        // Deleting the sheet cascades to balances and transactions
        BalanceSheet::delete_by_id(sheet.id).exec(&db).await?;
        assert!(Balance::find().all(&db).await?.is_empty());
        assert!(Transaction::find().all(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_balance_unique_per_sheet_and_account() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let bank = company::ActiveModel {
            name: Set("Bank".to_string()),
            active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;
        let checking = insert_account(&db, bank.id, "Checking", account::AccountType::Cash).await?;
        let sheet = balance_sheet::ActiveModel {
            date: Set(NaiveDate::from_ymd_opt(2019, 8, 1).unwrap()),
            title: Set("August".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let new_balance = || balance::ActiveModel {
            sheet_id: Set(sheet.id),
            account_id: Set(checking.id),
            beginning: Set(Decimal::ZERO),
            ending: Set(Decimal::ZERO),
            ..Default::default()
        };

        new_balance().insert(&db).await?;
        assert!(new_balance().insert(&db).await.is_err());

        Ok(())
    }
}
