//! Currency lookups and formatting backed by the ISO 4217 tables in `rusty_money`.

use rust_decimal::Decimal;
use rusty_money::{iso, Money};
use tracing::trace;

/// Look up an ISO 4217 currency by its alphabetic code, e.g. "USD".
pub fn currency(code: &str) -> Option<&'static iso::Currency> {
    iso::find(&code.trim().to_uppercase())
}

pub fn is_known_currency(code: &str) -> bool {
    currency(code).is_some()
}

/// The display symbol for a currency code. Unknown codes fall back to the code itself.
pub fn symbol(code: &str) -> String {
    match currency(code) {
        Some(currency) => currency.symbol.to_string(),
        None => code.to_string(),
    }
}

/// Format an amount with the currency's symbol, grouping and minor units,
/// e.g. `$1,234.56`.
pub fn format_amount(amount: Decimal, code: &str) -> String {
    trace!(%amount, code, "Formatting amount");
    match currency(code) {
        Some(currency) => Money::from_decimal(amount, currency).to_string(),
        None => format!("{} {}", amount.round_dp(2), code),
    }
}
