pub use sea_orm_migration::prelude::*;

pub mod entity_iden;
mod m20180502_000001_create_ledger;
mod m20181004_000001_add_credit_scores;
mod m20190624_000001_add_payments;
mod m20190901_000001_add_budgets;
mod m20200101_000001_add_tax_returns;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20180502_000001_create_ledger::Migration),
            Box::new(m20181004_000001_add_credit_scores::Migration),
            Box::new(m20190624_000001_add_payments::Migration),
            Box::new(m20190901_000001_add_budgets::Migration),
            Box::new(m20200101_000001_add_tax_returns::Migration),
        ]
    }
}
