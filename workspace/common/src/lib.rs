//! Small value types shared by the compute crate and the HTTP layer.

pub mod money;
pub mod period;

pub use money::{format_amount, is_known_currency, symbol};
pub use period::{days_in_month, SheetPeriod};
