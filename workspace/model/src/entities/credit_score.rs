use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

/// The credit bureau that produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum CreditBureau {
    #[sea_orm(string_value = "Experian")]
    Experian,
    #[sea_orm(string_value = "Equifax")]
    Equifax,
    #[sea_orm(string_value = "TransUnion")]
    TransUnion,
}

impl std::str::FromStr for CreditBureau {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Experian" => Ok(CreditBureau::Experian),
            "Equifax" => Ok(CreditBureau::Equifax),
            "TransUnion" => Ok(CreditBureau::TransUnion),
            _ => Err(format!("Invalid credit bureau: {}", s)),
        }
    }
}

/// A credit score report.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_scores")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: NaiveDate,
    /// Between 0 and 850.
    pub score: i32,
    pub source: CreditBureau,
    /// Use this score over others reported in the same month.
    #[sea_orm(default_value = "true")]
    pub preferred: bool,
    pub memo: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
