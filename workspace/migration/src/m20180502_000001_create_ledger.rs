use crate::entity_iden::EntityIden;
use model::entities::prelude::*;
use model::entities::{account, balance, balance_sheet, company, transaction};
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Company::table())
                    .if_not_exists()
                    .col(pk_auto(Company::column(company::Column::Id)))
                    .col(string(Company::column(company::Column::Name)).unique_key())
                    .col(string_null(Company::column(company::Column::ShortName)))
                    .col(string_null(Company::column(company::Column::Url)))
                    .col(boolean(Company::column(company::Column::Active)).default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Account::table())
                    .if_not_exists()
                    .col(pk_auto(Account::column(account::Column::Id)))
                    .col(string_len(Account::column(account::Column::AccountType), 2).default("Ca"))
                    .col(string(Account::column(account::Column::Name)))
                    .col(integer(Account::column(account::Column::CompanyId)))
                    .col(string_null(Account::column(account::Column::Number)))
                    .col(boolean(Account::column(account::Column::Active)).default(true))
                    .col(boolean(Account::column(account::Column::Exclude)).default(false))
                    .col(integer_null(Account::column(account::Column::DisplayOrder)))
                    .col(date_null(Account::column(account::Column::OpenedOn)))
                    .col(date_null(Account::column(account::Column::ClosedOn)))
                    .col(string_len(Account::column(account::Column::Currency), 3).default("USD"))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_company")
                            .from(Account::table(), Account::column(account::Column::CompanyId))
                            .to(Company::table(), Company::column(company::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_company_name")
                    .table(Account::table())
                    .col(Account::column(account::Column::CompanyId))
                    .col(Account::column(account::Column::Name))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BalanceSheet::table())
                    .if_not_exists()
                    .col(pk_auto(BalanceSheet::column(balance_sheet::Column::Id)))
                    .col(date(BalanceSheet::column(balance_sheet::Column::Date)))
                    .col(string(BalanceSheet::column(balance_sheet::Column::Title)))
                    .col(text_null(BalanceSheet::column(balance_sheet::Column::Memo)))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Balance::table())
                    .if_not_exists()
                    .col(pk_auto(Balance::column(balance::Column::Id)))
                    .col(integer(Balance::column(balance::Column::SheetId)))
                    .col(integer(Balance::column(balance::Column::AccountId)))
                    .col(decimal(Balance::column(balance::Column::Beginning)).decimal_len(16, 4))
                    .col(decimal(Balance::column(balance::Column::Ending)).decimal_len(16, 4))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_balances_sheet")
                            .from(Balance::table(), Balance::column(balance::Column::SheetId))
                            .to(BalanceSheet::table(), BalanceSheet::column(balance_sheet::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_balances_account")
                            .from(Balance::table(), Balance::column(balance::Column::AccountId))
                            .to(Account::table(), Account::column(account::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_balances_sheet_account")
                    .table(Balance::table())
                    .col(Balance::column(balance::Column::SheetId))
                    .col(Balance::column(balance::Column::AccountId))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transaction::table())
                    .if_not_exists()
                    .col(pk_auto(Transaction::column(transaction::Column::Id)))
                    .col(integer(Transaction::column(transaction::Column::SheetId)))
                    .col(date(Transaction::column(transaction::Column::Date)))
                    .col(integer(Transaction::column(transaction::Column::CreditId)))
                    .col(integer(Transaction::column(transaction::Column::DebitId)))
                    .col(decimal(Transaction::column(transaction::Column::Amount)).decimal_len(16, 4))
                    .col(string_null(Transaction::column(transaction::Column::Memo)))
                    .col(boolean(Transaction::column(transaction::Column::Complete)).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_sheet")
                            .from(Transaction::table(), Transaction::column(transaction::Column::SheetId))
                            .to(BalanceSheet::table(), BalanceSheet::column(balance_sheet::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_credit")
                            .from(Transaction::table(), Transaction::column(transaction::Column::CreditId))
                            .to(Account::table(), Account::column(account::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_debit")
                            .from(Transaction::table(), Transaction::column(transaction::Column::DebitId))
                            .to(Account::table(), Account::column(account::Column::Id))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_sheet")
                    .table(Transaction::table())
                    .col(Transaction::column(transaction::Column::SheetId))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transaction::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Balance::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BalanceSheet::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Account::table()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Company::table()).to_owned())
            .await?;

        Ok(())
    }
}
