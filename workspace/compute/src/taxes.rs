//! Year over year comparison of tax returns.

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::error::Result;
use model::entities::tax_return;

/// Amounts reported on a tax return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxField {
    Wages,
    Interest,
    Profit,
    Dividends,
    CapitalGains,
    Royalties,
    Income,
    Agi,
    TaxableIncome,
    FederalTax,
    LocalTax,
}

impl TaxField {
    pub const ALL: [TaxField; 11] = [
        TaxField::Wages,
        TaxField::Interest,
        TaxField::Profit,
        TaxField::Dividends,
        TaxField::CapitalGains,
        TaxField::Royalties,
        TaxField::Income,
        TaxField::Agi,
        TaxField::TaxableIncome,
        TaxField::FederalTax,
        TaxField::LocalTax,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TaxField::Wages => "wages",
            TaxField::Interest => "interest",
            TaxField::Profit => "profit",
            TaxField::Dividends => "dividends",
            TaxField::CapitalGains => "capital_gains",
            TaxField::Royalties => "royalties",
            TaxField::Income => "income",
            TaxField::Agi => "agi",
            TaxField::TaxableIncome => "taxable_income",
            TaxField::FederalTax => "federal_tax",
            TaxField::LocalTax => "local_tax",
        }
    }

    pub fn value(&self, tax_return: &tax_return::Model) -> Decimal {
        match self {
            TaxField::Wages => tax_return.wages,
            TaxField::Interest => tax_return.interest,
            TaxField::Profit => tax_return.profit,
            TaxField::Dividends => tax_return.dividends,
            TaxField::CapitalGains => tax_return.capital_gains,
            TaxField::Royalties => tax_return.royalties,
            TaxField::Income => tax_return.income,
            TaxField::Agi => tax_return.agi,
            TaxField::TaxableIncome => tax_return.taxable_income,
            TaxField::FederalTax => tax_return.federal_tax,
            TaxField::LocalTax => tax_return.local_tax,
        }
    }
}

/// Change in `field` from the previous year's return to `current`.
///
/// Zero when there is no previous return to compare against.
pub fn prev_year_change(
    current: &tax_return::Model,
    previous: Option<&tax_return::Model>,
    field: TaxField,
) -> Decimal {
    match previous {
        Some(previous) => field.value(current) - field.value(previous),
        None => Decimal::ZERO,
    }
}

/// Changes for every field, in [`TaxField::ALL`] order.
pub fn prev_year_changes(
    current: &tax_return::Model,
    previous: Option<&tax_return::Model>,
) -> Vec<(TaxField, Decimal)> {
    TaxField::ALL
        .iter()
        .map(|field| (*field, prev_year_change(current, previous, *field)))
        .collect()
}

/// The return filed for the year before `year`, if any.
pub async fn prev_year_return<C: ConnectionTrait>(db: &C, year: i32) -> Result<Option<tax_return::Model>> {
    let previous = tax_return::Entity::find()
        .filter(tax_return::Column::Year.eq(year - 1))
        .one(db)
        .await?;
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(value: i64) -> Decimal {
        Decimal::new(value, 2)
    }

    fn filed(year: i32, wages: i64, federal_tax: i64) -> tax_return::Model {
        tax_return::Model {
            id: year,
            year,
            wages: cents(wages),
            interest: cents(1250),
            profit: Decimal::ZERO,
            dividends: Decimal::ZERO,
            capital_gains: Decimal::ZERO,
            royalties: Decimal::ZERO,
            income: cents(wages + 1250),
            agi: cents(wages + 1250),
            taxable_income: cents(wages + 1250 - 1200000),
            federal_tax: cents(federal_tax),
            local_tax: cents(350000),
        }
    }

    #[test]
    fn test_no_previous_year_is_zero() {
        let current = filed(2018, 8500000, 1250000);
        for field in TaxField::ALL {
            assert_eq!(prev_year_change(&current, None, field), Decimal::ZERO);
        }
    }

    #[test]
    fn test_change_from_previous_year() {
        let previous = filed(2017, 8000000, 1300000);
        let current = filed(2018, 8500000, 1250000);

        assert_eq!(prev_year_change(&current, Some(&previous), TaxField::Wages), cents(500000));
        assert_eq!(prev_year_change(&current, Some(&previous), TaxField::FederalTax), cents(-50000));
        assert_eq!(prev_year_change(&current, Some(&previous), TaxField::LocalTax), Decimal::ZERO);
    }

    #[test]
    fn test_changes_cover_every_field() {
        let previous = filed(2017, 8000000, 1300000);
        let current = filed(2018, 8500000, 1250000);
        let changes = prev_year_changes(&current, Some(&previous));

        assert_eq!(changes.len(), TaxField::ALL.len());
        assert_eq!(changes[0], (TaxField::Wages, cents(500000)));
        let names: Vec<_> = changes.iter().map(|(field, _)| field.name()).collect();
        assert!(names.contains(&"taxable_income"));
    }
}
