//! Budget line-item totals.

use model::entities::line_item;
use rust_decimal::Decimal;
use tracing::debug;

const MONTHS_PER_YEAR: i64 = 12;

/// How often a line item occurs, from its number of times per year.
pub fn frequency_text(times_per_year: i32) -> String {
    match times_per_year {
        1 => "annually".to_string(),
        4 => "quarterly".to_string(),
        12 => "monthly".to_string(),
        24 => "bimonthly".to_string(),
        26 => "biweekly".to_string(),
        52 => "weekly".to_string(),
        365 => "daily".to_string(),
        n => format!("{} times per year", n),
    }
}

/// Yearly total of a line item.
pub fn line_total(item: &line_item::Model) -> Decimal {
    Decimal::from(item.frequency) * item.amount
}

/// Yearly and monthly totals of a budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSummary {
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub monthly_savings: Decimal,
}

fn monthly(total: Decimal) -> Decimal {
    (total / Decimal::from(MONTHS_PER_YEAR)).round_dp(2)
}

impl BudgetSummary {
    pub fn from_items(items: &[line_item::Model]) -> Self {
        let (income, expenses) = items.iter().fold(
            (Decimal::ZERO, Decimal::ZERO),
            |(income, expenses), item| {
                if item.is_income {
                    (income + line_total(item), expenses)
                } else {
                    (income, expenses + line_total(item))
                }
            },
        );
        let savings = income - expenses;
        debug!(items = items.len(), %income, %expenses, %savings, "Summarized budget");

        Self {
            income,
            expenses,
            savings,
            monthly_income: monthly(income),
            monthly_expenses: monthly(expenses),
            monthly_savings: monthly(savings),
        }
    }
}
