pub mod accounts;
pub mod balances;
pub mod budgets;
pub mod companies;
pub mod credit_scores;
pub mod health;
pub mod payments;
pub mod sheets;
pub mod tax_returns;
pub mod transactions;
