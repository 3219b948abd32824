use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::tax_return;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

fn amount(column: tax_return::Column) -> ColumnDef {
    decimal(TaxReturn::column(column)).decimal_len(16, 4).to_owned()
}

fn optional_amount(column: tax_return::Column) -> ColumnDef {
    decimal(TaxReturn::column(column)).decimal_len(16, 4).default(0).to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TaxReturn::table())
                    .if_not_exists()
                    .col(pk_auto(TaxReturn::column(tax_return::Column::Id)))
                    .col(integer(TaxReturn::column(tax_return::Column::Year)).unique_key())
                    .col(amount(tax_return::Column::Wages))
                    .col(optional_amount(tax_return::Column::Interest))
                    .col(optional_amount(tax_return::Column::Profit))
                    .col(optional_amount(tax_return::Column::Dividends))
                    .col(optional_amount(tax_return::Column::CapitalGains))
                    .col(optional_amount(tax_return::Column::Royalties))
                    .col(amount(tax_return::Column::Income))
                    .col(amount(tax_return::Column::Agi))
                    .col(amount(tax_return::Column::TaxableIncome))
                    .col(amount(tax_return::Column::FederalTax))
                    .col(amount(tax_return::Column::LocalTax))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaxReturn::table()).to_owned())
            .await
    }
}
