//! Balance recomputation for monthly balance sheets.
//!
//! In this ledger the *credit* side of a transaction is the account money
//! leaves and the *debit* side is the account money arrives in. For every
//! balance on a sheet:
//!
//! ```text
//! ending = beginning - sum(pending credits) + sum(pending debits)
//! ```
//!
//! where pending means `complete == false`. Completed transactions are
//! already part of `beginning`.
//!
//! Recomputation is never implicit. Callers run [`on_balance_save`] before a
//! balance is written and [`on_transaction_change`] after a transaction is
//! written, inside the same database transaction. The functions in
//! [`service`] do exactly that.

pub mod balance;
pub mod service;
pub mod sheet;
mod store;

#[cfg(test)]
pub mod testing;

pub use balance::{
    activity, credit_amount, debit_amount, on_balance_save, on_transaction_change, recompute,
    BalanceActivity, TransactionChange,
};
pub use sheet::{default_title, is_active, sheet_totals, title_for_sheet, SheetTotals};

use async_trait::async_trait;
use model::entities::balance as balance_entity;
use rust_decimal::Decimal;

use crate::error::Result;

/// Which side of a transaction an account is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionRole {
    /// Funds leave the account.
    Credit,
    /// Funds arrive in the account.
    Debit,
}

/// Storage operations the ledger engine needs.
///
/// Implemented for every sea-orm connection, so the same code runs against
/// a plain connection or inside a database transaction.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// The balance of `account_id` on `sheet_id`, if one has been opened.
    async fn find_balance(&self, sheet_id: i32, account_id: i32) -> Result<Option<balance_entity::Model>>;

    /// Every balance on a sheet.
    async fn balances_for_sheet(&self, sheet_id: i32) -> Result<Vec<balance_entity::Model>>;

    /// Sum of the amounts of transactions on `sheet_id` where `account_id` is
    /// on the given side and the complete flag matches. Zero when none match.
    async fn sum_transaction_amounts(
        &self,
        sheet_id: i32,
        account_id: i32,
        role: TransactionRole,
        complete: bool,
    ) -> Result<Decimal>;

    /// Store a new ending for an existing balance.
    async fn persist_ending(&self, balance: balance_entity::Model, ending: Decimal) -> Result<balance_entity::Model>;
}
