use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::budget;

/// One income or expense line of a budget.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "line_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub budget_id: i32,
    pub name: String,
    /// Amount paid or received each time.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    /// Number of times per year, 12 for monthly.
    #[sea_orm(default_value = "12")]
    pub frequency: i32,
    #[sea_orm(default_value = "false")]
    pub is_income: bool,
    pub notes: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "budget::Entity",
        from = "Column::BudgetId",
        to = "budget::Column::Id",
        on_delete = "Cascade"
    )]
    Budget,
}

impl Related<budget::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budget.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
