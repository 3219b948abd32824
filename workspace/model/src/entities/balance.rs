use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::{account, balance_sheet};

/// The state of one account within one balance sheet.
///
/// `ending` is always derived from `beginning` and the pending transactions
/// of the sheet. It is never written by a client directly.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "balances")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sheet_id: i32,
    pub account_id: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub beginning: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub ending: Decimal,
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
        from = "Column::AccountId",
        to = "account::Column::Id",
        on_delete = "Cascade"
    )]
    Account,
}

impl Related<balance_sheet::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BalanceSheet.def()
    }
}

impl Related<account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
