use crate::entity_iden::EntityIden;
use model::entities::credit_score;
use model::entities::prelude::*;
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CreditScore::table())
                    .if_not_exists()
                    .col(pk_auto(CreditScore::column(credit_score::Column::Id)))
                    .col(date(CreditScore::column(credit_score::Column::Date)))
                    .col(integer(CreditScore::column(credit_score::Column::Score)))
                    .col(string_len(CreditScore::column(credit_score::Column::Source), 20))
                    .col(boolean(CreditScore::column(credit_score::Column::Preferred)).default(true))
                    .col(string_null(CreditScore::column(credit_score::Column::Memo)))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CreditScore::table()).to_owned())
            .await
    }
}
