use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// Figures reported on a yearly federal income tax return.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tax_returns")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Tax year the return was filed for.
    #[sea_orm(unique)]
    pub year: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub wages: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub interest: Decimal,
    /// Business income or loss.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub profit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub dividends: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub capital_gains: Decimal,
    /// Rental real estate, royalties and partnerships.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub royalties: Decimal,
    /// Total reported income.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub income: Decimal,
    /// Adjusted gross income.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub agi: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub taxable_income: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub federal_tax: Decimal,
    /// State and local taxes.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub local_tax: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tax Year {}", self.year)
    }
}
