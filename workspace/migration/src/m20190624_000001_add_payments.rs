use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::{account, payment};
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payment::table())
                    .if_not_exists()
                    .col(pk_auto(Payment::column(payment::Column::Id)))
                    .col(integer(Payment::column(payment::Column::CreditId)))
                    .col(integer(Payment::column(payment::Column::DebitId)))
                    .col(decimal_null(Payment::column(payment::Column::Amount)).decimal_len(16, 4))
                    .col(string_len(Payment::column(payment::Column::Frequency), 1).default("M"))
                    .col(integer_null(Payment::column(payment::Column::Day)))
                    .col(string_null(Payment::column(payment::Column::Description)))
                    .col(boolean(Payment::column(payment::Column::Active)).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_credit")
                            .from(Payment::table(), Payment::column(payment::Column::CreditId))
                            .to(Account::table(), Account::column(account::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_debit")
                            .from(Payment::table(), Payment::column(payment::Column::DebitId))
                            .to(Account::table(), Account::column(account::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payment::table()).to_owned())
            .await
    }
}
