use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::{budget, line_item};
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Budget::table())
                    .if_not_exists()
                    .col(pk_auto(Budget::column(budget::Column::Id)))
                    .col(integer(Budget::column(budget::Column::Year)).unique_key())
                    .col(string_null(Budget::column(budget::Column::Description)))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LineItem::table())
                    .if_not_exists()
                    .col(pk_auto(LineItem::column(line_item::Column::Id)))
                    .col(integer(LineItem::column(line_item::Column::BudgetId)))
                    .col(string(LineItem::column(line_item::Column::Name)))
                    .col(decimal(LineItem::column(line_item::Column::Amount)).decimal_len(16, 4))
                    .col(integer(LineItem::column(line_item::Column::Frequency)).default(12))
                    .col(boolean(LineItem::column(line_item::Column::IsIncome)).default(false))
                    .col(text_null(LineItem::column(line_item::Column::Notes)))
                    .col(integer_null(LineItem::column(line_item::Column::DisplayOrder)))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_line_items_budget")
                            .from(LineItem::table(), LineItem::column(line_item::Column::BudgetId))
                            .to(Budget::table(), Budget::column(budget::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LineItem::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budget::table()).to_owned())
            .await
    }
}
