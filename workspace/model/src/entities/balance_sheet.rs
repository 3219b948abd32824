use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

/// One accounting period, one per calendar month.
///
/// The sheet owns the balances and transactions recorded for that month.
/// The one-sheet-per-month rule is enforced by the service layer since it
/// depends on the year and month of `date` rather than on a column value.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "balance_sheets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The period anchor, usually the first of the month.
    pub date: NaiveDate,
    pub title: String,
    pub memo: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::balance::Entity")]
    Balance,
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transaction,
}

impl Related<super::balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Balance.def()
    }
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
