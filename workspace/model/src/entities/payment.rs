use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

use super::account;

/// How often a payment recurs, stored as a single letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum Frequency {
    #[sea_orm(string_value = "D")]
    Daily,
    #[sea_orm(string_value = "W")]
    Weekly,
    #[sea_orm(string_value = "M")]
    Monthly,
    #[sea_orm(string_value = "Q")]
    Quarterly,
    #[sea_orm(string_value = "Y")]
    Yearly,
    #[sea_orm(string_value = "F")]
    Infrequent,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Daily" | "D" => Ok(Frequency::Daily),
            "Weekly" | "W" => Ok(Frequency::Weekly),
            "Monthly" | "M" => Ok(Frequency::Monthly),
            "Quarterly" | "Q" => Ok(Frequency::Quarterly),
            "Yearly" | "Y" => Ok(Frequency::Yearly),
            "Infrequent" | "F" => Ok(Frequency::Infrequent),
            _ => Err(format!("Invalid payment frequency: {}", s)),
        }
    }
}

/// A template for a recurring transaction between two accounts.
///
/// No schedule state is stored, the next due date is computed from
/// `frequency` and `day` whenever it is needed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub credit_id: i32,
    pub debit_id: i32,
    /// Default amount for issued transactions.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub amount: Option<Decimal>,
    pub frequency: Frequency,
    /// Anchor day, its meaning depends on `frequency`.
    pub day: Option<i32>,
    pub description: Option<String>,
    #[sea_orm(default_value = "true")]
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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

impl ActiveModelBehavior for ActiveModel {}
