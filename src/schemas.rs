use axum::{http::StatusCode, response::Json};
use compute::error::ComputeError;
use compute::ledger::SheetTotals;
use moka::future::Cache;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::{OpenApi, ToSchema};

use crate::handlers::{
    accounts::{AccountResponse, CreateAccountRequest, UpdateAccountRequest},
    balances::{BalanceActivityResponse, BalanceResponse, CreateBalanceRequest, UpdateBalanceRequest},
    budgets::{BudgetResponse, BudgetSummaryResponse, CreateBudgetRequest, CreateLineItemRequest, LineItemResponse},
    companies::{CompanyResponse, CreateCompanyRequest, UpdateCompanyRequest},
    credit_scores::{CreateCreditScoreRequest, CreditScoreResponse},
    payments::{
        CreatePaymentRequest, IssuePaymentRequest, NextDateResponse, PaymentResponse, UpdatePaymentRequest,
    },
    sheets::{CreateSheetRequest, SheetResponse, SheetTotalsResponse, UpdateSheetRequest},
    tax_returns::{CreateTaxReturnRequest, TaxChangeResponse, TaxReturnResponse},
    transactions::{CreateTransactionRequest, TransactionResponse, UpdateTransactionRequest},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for expensive operations
    pub cache: Cache<String, CachedData>,
    /// Bumped whenever cached totals are invalidated
    pub totals_epoch: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, cache: Cache<String, CachedData>) -> Self {
        Self { db, cache, totals_epoch: Arc::new(AtomicU64::new(0)) }
    }
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    SheetTotals(SheetTotals),
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self { data, message: message.into(), success: true }
    }
}

/// Money as the API returns it, always with two decimal places.
pub fn money(value: Decimal) -> Decimal {
    let mut value = value;
    value.rescale(2);
    value
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse { error: message.into(), code: code.to_string(), success: false }),
    )
}

pub fn not_found(message: impl Into<String>) -> ApiError {
    error_response(StatusCode::NOT_FOUND, "NOT_FOUND", message)
}

pub fn validation_error(message: impl Into<String>) -> ApiError {
    error_response(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
}

/// Maps a store error. Unique constraint violations become 409.
pub fn database_error(context: &str, err: DbErr) -> ApiError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            warn!("{}: unique constraint violated: {}", context, detail);
            error_response(StatusCode::CONFLICT, "CONFLICT", format!("{}: record already exists", context))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            warn!("{}: foreign key violated: {}", context, detail);
            validation_error(format!("{}: referenced record does not exist", context))
        }
        _ => {
            error!("{}: {}", context, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR", context.to_string())
        }
    }
}

pub fn compute_error(context: &str, err: ComputeError) -> ApiError {
    match err {
        ComputeError::Validation(message) | ComputeError::Date(message) => validation_error(message),
        ComputeError::NotFound(message) => not_found(message),
        ComputeError::Conflict(message) => error_response(StatusCode::CONFLICT, "CONFLICT", message),
        ComputeError::Database(db_err) => database_error(context, db_err),
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::companies::create_company,
        crate::handlers::companies::get_companies,
        crate::handlers::companies::get_company,
        crate::handlers::companies::update_company,
        crate::handlers::companies::delete_company,
        crate::handlers::accounts::create_account,
        crate::handlers::accounts::get_accounts,
        crate::handlers::accounts::get_account,
        crate::handlers::accounts::update_account,
        crate::handlers::accounts::delete_account,
        crate::handlers::sheets::create_sheet,
        crate::handlers::sheets::get_sheets,
        crate::handlers::sheets::get_sheet,
        crate::handlers::sheets::get_sheet_for_period,
        crate::handlers::sheets::update_sheet,
        crate::handlers::sheets::delete_sheet,
        crate::handlers::sheets::get_sheet_totals,
        crate::handlers::sheets::recompute_sheet,
        crate::handlers::balances::create_balance,
        crate::handlers::balances::get_balances,
        crate::handlers::balances::get_balance,
        crate::handlers::balances::update_balance,
        crate::handlers::balances::delete_balance,
        crate::handlers::balances::get_balance_activity,
        crate::handlers::transactions::create_transaction,
        crate::handlers::transactions::get_transactions,
        crate::handlers::transactions::get_transaction,
        crate::handlers::transactions::update_transaction,
        crate::handlers::transactions::delete_transaction,
        crate::handlers::payments::create_payment,
        crate::handlers::payments::get_payments,
        crate::handlers::payments::get_payment,
        crate::handlers::payments::update_payment,
        crate::handlers::payments::delete_payment,
        crate::handlers::payments::get_next_payment_date,
        crate::handlers::payments::issue_payment_transaction,
        crate::handlers::credit_scores::create_credit_score,
        crate::handlers::credit_scores::get_credit_scores,
        crate::handlers::credit_scores::get_latest_credit_score,
        crate::handlers::budgets::create_budget,
        crate::handlers::budgets::get_budgets,
        crate::handlers::budgets::get_budget,
        crate::handlers::budgets::create_line_item,
        crate::handlers::tax_returns::create_tax_return,
        crate::handlers::tax_returns::get_tax_returns,
        crate::handlers::tax_returns::get_tax_return,
        crate::handlers::tax_returns::delete_tax_return,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            CompanyResponse,
            CreateCompanyRequest,
            UpdateCompanyRequest,
            AccountResponse,
            CreateAccountRequest,
            UpdateAccountRequest,
            SheetResponse,
            CreateSheetRequest,
            UpdateSheetRequest,
            SheetTotalsResponse,
            BalanceResponse,
            BalanceActivityResponse,
            CreateBalanceRequest,
            UpdateBalanceRequest,
            TransactionResponse,
            CreateTransactionRequest,
            UpdateTransactionRequest,
            PaymentResponse,
            CreatePaymentRequest,
            UpdatePaymentRequest,
            IssuePaymentRequest,
            NextDateResponse,
            CreditScoreResponse,
            CreateCreditScoreRequest,
            BudgetResponse,
            BudgetSummaryResponse,
            CreateBudgetRequest,
            LineItemResponse,
            CreateLineItemRequest,
            TaxReturnResponse,
            TaxChangeResponse,
            CreateTaxReturnRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "companies", description = "Banks, card issuers and billers"),
        (name = "accounts", description = "Accounts held at companies"),
        (name = "sheets", description = "Monthly balance sheets"),
        (name = "balances", description = "Per-account balances of a sheet"),
        (name = "transactions", description = "Transactions of a sheet"),
        (name = "payments", description = "Recurring payment templates"),
        (name = "credit-scores", description = "Credit score history"),
        (name = "budgets", description = "Yearly budgets"),
        (name = "tax-returns", description = "Yearly tax returns"),
    ),
    info(
        title = "Ledger API",
        description = "Personal finance ledger: monthly balance sheets, recurring payments, budgets, credit scores and tax returns",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
