use crate::handlers::balances::BalanceResponse;
use crate::handlers::sheets::{find_sheet, invalidate_totals};
use crate::schemas::{
    compute_error, database_error, money, not_found, ApiResponse, AppState, ErrorResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::NaiveDate;
use compute::ledger::service::{self, TransactionOutcome};
use model::entities::transaction;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for creating a transaction on a sheet
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateTransactionRequest {
    /// Defaults to the sheet date
    pub date: Option<NaiveDate>,
    /// Account the money leaves
    pub credit_id: i32,
    /// Account the money arrives in
    pub debit_id: i32,
    pub amount: Decimal,
    #[validate(length(max = 500))]
    pub memo: Option<String>,
    /// Already reflected in the beginning balances (default: false)
    pub complete: Option<bool>,
}

/// Request body for updating a transaction
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateTransactionRequest {
    /// Moves the transaction to another sheet
    pub sheet_id: Option<i32>,
    pub date: Option<NaiveDate>,
    pub credit_id: Option<i32>,
    pub debit_id: Option<i32>,
    pub amount: Option<Decimal>,
    #[validate(length(max = 500))]
    pub memo: Option<String>,
    pub complete: Option<bool>,
}

/// Query parameters for listing transactions
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct TransactionQuery {
    /// Only completed (true) or pending (false) transactions
    pub complete: Option<bool>,
    /// Only transactions touching this account on either side
    pub account_id: Option<i32>,
}

/// Transaction response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i32,
    pub sheet_id: i32,
    pub date: NaiveDate,
    pub credit_id: i32,
    pub debit_id: i32,
    pub amount: Decimal,
    pub memo: Option<String>,
    pub complete: bool,
    /// Balances recomputed by this change, empty on reads
    pub balances: Vec<BalanceResponse>,
}

impl From<transaction::Model> for TransactionResponse {
    fn from(model: transaction::Model) -> Self {
        Self {
            id: model.id,
            sheet_id: model.sheet_id,
            date: model.date,
            credit_id: model.credit_id,
            debit_id: model.debit_id,
            amount: money(model.amount),
            memo: model.memo,
            complete: model.complete,
            balances: Vec::new(),
        }
    }
}

impl From<TransactionOutcome> for TransactionResponse {
    fn from(outcome: TransactionOutcome) -> Self {
        let mut response = TransactionResponse::from(outcome.transaction);
        response.balances = outcome.balances.into_iter().map(BalanceResponse::from).collect();
        response
    }
}

/// Create a transaction and recompute the balances it touches
#[utoipa::path(
    post,
    path = "/api/v1/sheets/{sheet_id}/transactions",
    tag = "transactions",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
    ),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created successfully", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Balance sheet not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_transaction(
    Path(sheet_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateTransactionRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_transaction function for sheet_id: {}", sheet_id);
    let date = match request.date {
        Some(date) => date,
        None => find_sheet(&state, sheet_id).await?.date,
    };

    let outcome = service::create_transaction(
        &state.db,
        sheet_id,
        service::NewTransaction {
            date,
            credit_id: request.credit_id,
            debit_id: request.debit_id,
            amount: request.amount,
            memo: request.memo,
            complete: request.complete.unwrap_or(false),
        },
    )
    .await
    .map_err(|e| compute_error("Failed to create transaction", e))?;

    invalidate_totals(&state, sheet_id).await;
    info!("Transaction created with ID: {}, recomputed {} balances",
          outcome.transaction.id, outcome.balances.len());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(TransactionResponse::from(outcome), "Transaction created successfully")),
    ))
}

/// Get the transactions of a sheet
#[utoipa::path(
    get,
    path = "/api/v1/sheets/{sheet_id}/transactions",
    tag = "transactions",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
        TransactionQuery,
    ),
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = ApiResponse<Vec<TransactionResponse>>),
        (status = 404, description = "Balance sheet not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transactions(
    Path(sheet_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<TransactionQuery>>,
) -> Result<Json<ApiResponse<Vec<TransactionResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    find_sheet(&state, sheet_id).await?;

    let mut select = transaction::Entity::find().filter(transaction::Column::SheetId.eq(sheet_id));
    if let Some(complete) = query.complete {
        select = select.filter(transaction::Column::Complete.eq(complete));
    }
    if let Some(account_id) = query.account_id {
        select = select.filter(
            transaction::Column::CreditId
                .eq(account_id)
                .or(transaction::Column::DebitId.eq(account_id)),
        );
    }

    let transactions = select
        .order_by_asc(transaction::Column::Date)
        .order_by_asc(transaction::Column::Id)
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve transactions", e))?;

    debug!("Retrieved {} transactions of sheet {}", transactions.len(), sheet_id);
    Ok(Json(ApiResponse::ok(
        transactions.into_iter().map(TransactionResponse::from).collect(),
        "Transactions retrieved successfully",
    )))
}

/// Get a transaction
#[utoipa::path(
    get,
    path = "/api/v1/sheets/{sheet_id}/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
        ("transaction_id" = i32, Path, description = "Transaction ID"),
    ),
    responses(
        (status = 200, description = "Transaction retrieved successfully", body = ApiResponse<TransactionResponse>),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transaction(
    Path((sheet_id, transaction_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    match transaction::Entity::find_by_id(transaction_id)
        .filter(transaction::Column::SheetId.eq(sheet_id))
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => Ok(Json(ApiResponse::ok(
            TransactionResponse::from(model),
            "Transaction retrieved successfully",
        ))),
        Ok(None) => {
            warn!("Transaction {} not found on sheet {}", transaction_id, sheet_id);
            Err(not_found(format!("Transaction with ID {} not found on sheet {}", transaction_id, sheet_id)))
        }
        Err(e) => Err(database_error("Failed to retrieve transaction", e)),
    }
}

/// Update a transaction and recompute the balances of its old and new accounts
#[utoipa::path(
    put,
    path = "/api/v1/sheets/{sheet_id}/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
        ("transaction_id" = i32, Path, description = "Transaction ID"),
    ),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated successfully", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_transaction(
    Path((sheet_id, transaction_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateTransactionRequest>>,
) -> Result<Json<ApiResponse<TransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let outcome = service::update_transaction(
        &state.db,
        sheet_id,
        transaction_id,
        service::TransactionChanges {
            sheet_id: request.sheet_id,
            date: request.date,
            credit_id: request.credit_id,
            debit_id: request.debit_id,
            amount: request.amount,
            memo: request.memo,
            complete: request.complete,
        },
    )
    .await
    .map_err(|e| compute_error("Failed to update transaction", e))?;

    invalidate_totals(&state, sheet_id).await;
    if outcome.transaction.sheet_id != sheet_id {
        invalidate_totals(&state, outcome.transaction.sheet_id).await;
    }
    info!("Transaction with ID {} updated, recomputed {} balances", transaction_id, outcome.balances.len());
    Ok(Json(ApiResponse::ok(TransactionResponse::from(outcome), "Transaction updated successfully")))
}

/// Delete a transaction and recompute the balances it touched
#[utoipa::path(
    delete,
    path = "/api/v1/sheets/{sheet_id}/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
        ("transaction_id" = i32, Path, description = "Transaction ID"),
    ),
    responses(
        (status = 200, description = "Transaction deleted, recomputed balances returned", body = ApiResponse<Vec<BalanceResponse>>),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_transaction(
    Path((sheet_id, transaction_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BalanceResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let balances = service::delete_transaction(&state.db, sheet_id, transaction_id)
        .await
        .map_err(|e| compute_error("Failed to delete transaction", e))?;

    invalidate_totals(&state, sheet_id).await;
    info!("Transaction with ID {} deleted, recomputed {} balances", transaction_id, balances.len());
    Ok(Json(ApiResponse::ok(
        balances.into_iter().map(BalanceResponse::from).collect(),
        "Transaction deleted successfully",
    )))
}
