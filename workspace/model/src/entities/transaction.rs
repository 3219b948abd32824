use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{account, balance_sheet};

/// A transfer of `amount` from the `credit` account (money leaves) to the
/// `debit` account (money arrives) within one balance sheet.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sheet_id: i32,
    pub date: NaiveDate,
    pub credit_id: i32,
    pub debit_id: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub memo: Option<String>,
    /// Already reflected in the beginning balance of the sheet.
    #[sea_orm(default_value = "false")]
    pub complete: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "balance_sheet::Entity",
        from = "Column::SheetId",
        to = "balance_sheet::Column::Id",
        on_delete = "Cascade"
    )]
    BalanceSheet,
    #[sea_orm(
        belongs_to = "account::Entity",
        from = "Column::CreditId",
        to = "account::Column::Id",
        on_delete = "Cascade"
    )]
    CreditAccount,
    #[sea_orm(
        belongs_to = "account::Entity",
        from = "Column::DebitId",
        to = "account::Column::Id",
        on_delete = "Cascade"
    )]
    DebitAccount,
}

impl Related<balance_sheet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BalanceSheet.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
