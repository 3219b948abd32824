use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::handlers::{
    accounts::{create_account, delete_account, get_account, get_accounts, update_account},
    balances::{create_balance, delete_balance, get_balance, get_balance_activity, get_balances, update_balance},
    budgets::{create_budget, create_line_item, get_budget, get_budgets},
    companies::{create_company, delete_company, get_companies, get_company, update_company},
    credit_scores::{create_credit_score, get_credit_scores, get_latest_credit_score},
    health::health_check,
    payments::{
        create_payment, delete_payment, get_next_payment_date, get_payment, get_payments,
        issue_payment_transaction, update_payment,
    },
    sheets::{
        create_sheet, delete_sheet, get_sheet, get_sheet_for_period, get_sheet_totals, get_sheets,
        recompute_sheet, update_sheet,
    },
    tax_returns::{create_tax_return, delete_tax_return, get_tax_return, get_tax_returns},
    transactions::{create_transaction, delete_transaction, get_transaction, get_transactions, update_transaction},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    create_router_with_timeout(state, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
}

pub fn create_router_with_timeout(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Companies
        .route("/api/v1/companies", post(create_company).get(get_companies))
        .route(
            "/api/v1/companies/:company_id",
            get(get_company).put(update_company).delete(delete_company),
        )
        // Accounts
        .route("/api/v1/accounts", post(create_account).get(get_accounts))
        .route(
            "/api/v1/accounts/:account_id",
            get(get_account).put(update_account).delete(delete_account),
        )
        // Balance sheets
        .route("/api/v1/sheets", post(create_sheet).get(get_sheets))
        .route("/api/v1/sheets/period/:year/:month", get(get_sheet_for_period))
        .route(
            "/api/v1/sheets/:sheet_id",
            get(get_sheet).put(update_sheet).delete(delete_sheet),
        )
        .route("/api/v1/sheets/:sheet_id/totals", get(get_sheet_totals))
        .route("/api/v1/sheets/:sheet_id/recompute", post(recompute_sheet))
        // Balances
        .route("/api/v1/sheets/:sheet_id/balances", post(create_balance).get(get_balances))
        .route(
            "/api/v1/sheets/:sheet_id/balances/:balance_id",
            get(get_balance).put(update_balance).delete(delete_balance),
        )
        .route(
            "/api/v1/sheets/:sheet_id/balances/:balance_id/activity",
            get(get_balance_activity),
        )
        // Transactions
        .route(
            "/api/v1/sheets/:sheet_id/transactions",
            post(create_transaction).get(get_transactions),
        )
        .route(
            "/api/v1/sheets/:sheet_id/transactions/:transaction_id",
            get(get_transaction).put(update_transaction).delete(delete_transaction),
        )
        // Payments
        .route("/api/v1/payments", post(create_payment).get(get_payments))
        .route(
            "/api/v1/payments/:payment_id",
            get(get_payment).put(update_payment).delete(delete_payment),
        )
        .route("/api/v1/payments/:payment_id/next-date", get(get_next_payment_date))
        .route("/api/v1/payments/:payment_id/transactions", post(issue_payment_transaction))
        // Credit scores
        .route("/api/v1/credit-scores", post(create_credit_score).get(get_credit_scores))
        .route("/api/v1/credit-scores/latest", get(get_latest_credit_score))
        // Budgets
        .route("/api/v1/budgets", post(create_budget).get(get_budgets))
        .route("/api/v1/budgets/:year", get(get_budget))
        .route("/api/v1/budgets/:year/line-items", post(create_line_item))
        // Tax returns
        .route("/api/v1/tax-returns", post(create_tax_return).get(get_tax_returns))
        .route("/api/v1/tax-returns/:year", get(get_tax_return).delete(delete_tax_return))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
