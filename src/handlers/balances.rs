use crate::handlers::sheets::{find_sheet, invalidate_totals};
use crate::schemas::{compute_error, database_error, money, not_found, ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use compute::ledger::{self, service};
use model::entities::balance;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;

/// Request body for adding an account's balance to a sheet
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateBalanceRequest {
    pub account_id: i32,
    /// Balance at the start of the month
    pub beginning: Decimal,
}

/// Request body for updating a balance. The ending balance is never accepted.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateBalanceRequest {
    pub account_id: Option<i32>,
    pub beginning: Option<Decimal>,
}

/// Balance response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    pub id: i32,
    pub sheet_id: i32,
    pub account_id: i32,
    pub beginning: Decimal,
    /// Beginning plus pending debits minus pending credits
    pub ending: Decimal,
}

impl From<balance::Model> for BalanceResponse {
    fn from(model: balance::Model) -> Self {
        Self {
            id: model.id,
            sheet_id: model.sheet_id,
            account_id: model.account_id,
            beginning: money(model.beginning),
            ending: money(model.ending),
        }
    }
}

/// Pending and completed activity of one balance. Credits are negative.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BalanceActivityResponse {
    pub balance_id: i32,
    pub pending_credits: Decimal,
    pub pending_debits: Decimal,
    pub completed_credits: Decimal,
    pub completed_debits: Decimal,
}

async fn find_balance(state: &AppState, sheet_id: i32, balance_id: i32) -> Result<balance::Model, ApiError> {
    match balance::Entity::find_by_id(balance_id)
        .filter(balance::Column::SheetId.eq(sheet_id))
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            warn!("Balance {} not found on sheet {}", balance_id, sheet_id);
            Err(not_found(format!("Balance with ID {} not found on sheet {}", balance_id, sheet_id)))
        }
        Err(e) => Err(database_error("Failed to retrieve balance", e)),
    }
}

/// Add an account's balance to a sheet
#[utoipa::path(
    post,
    path = "/api/v1/sheets/{sheet_id}/balances",
    tag = "balances",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
    ),
    request_body = CreateBalanceRequest,
    responses(
        (status = 201, description = "Balance created with its ending computed", body = ApiResponse<BalanceResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Balance sheet not found", body = ErrorResponse),
        (status = 409, description = "The account already has a balance on this sheet", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_balance(
    Path(sheet_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<CreateBalanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BalanceResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_balance function for sheet_id: {}", sheet_id);

    let saved = service::create_balance(
        &state.db,
        service::NewBalance { sheet_id, account_id: request.account_id, beginning: request.beginning },
    )
    .await
    .map_err(|e| compute_error("Failed to create balance", e))?;

    invalidate_totals(&state, sheet_id).await;
    info!("Balance created with ID: {}, ending: {}", saved.id, saved.ending);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(BalanceResponse::from(saved), "Balance created successfully")),
    ))
}

/// Get all balances of a sheet
#[utoipa::path(
    get,
    path = "/api/v1/sheets/{sheet_id}/balances",
    tag = "balances",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
    ),
    responses(
        (status = 200, description = "Balances retrieved successfully", body = ApiResponse<Vec<BalanceResponse>>),
        (status = 404, description = "Balance sheet not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_balances(
    Path(sheet_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BalanceResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    find_sheet(&state, sheet_id).await?;

    let balances = balance::Entity::find()
        .filter(balance::Column::SheetId.eq(sheet_id))
        .order_by_asc(balance::Column::Id)
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve balances", e))?;

    debug!("Retrieved {} balances of sheet {}", balances.len(), sheet_id);
    Ok(Json(ApiResponse::ok(
        balances.into_iter().map(BalanceResponse::from).collect(),
        "Balances retrieved successfully",
    )))
}

/// Get a balance
#[utoipa::path(
    get,
    path = "/api/v1/sheets/{sheet_id}/balances/{balance_id}",
    tag = "balances",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
        ("balance_id" = i32, Path, description = "Balance ID"),
    ),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = ApiResponse<BalanceResponse>),
        (status = 404, description = "Balance not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_balance(
    Path((sheet_id, balance_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BalanceResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let model = find_balance(&state, sheet_id, balance_id).await?;
    Ok(Json(ApiResponse::ok(BalanceResponse::from(model), "Balance retrieved successfully")))
}

/// Update a balance; its ending is recomputed
#[utoipa::path(
    put,
    path = "/api/v1/sheets/{sheet_id}/balances/{balance_id}",
    tag = "balances",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
        ("balance_id" = i32, Path, description = "Balance ID"),
    ),
    request_body = UpdateBalanceRequest,
    responses(
        (status = 200, description = "Balance updated successfully", body = ApiResponse<BalanceResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Balance not found", body = ErrorResponse),
        (status = 409, description = "The account already has a balance on this sheet", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_balance(
    Path((sheet_id, balance_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    Json(request): Json<UpdateBalanceRequest>,
) -> Result<Json<ApiResponse<BalanceResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let saved = service::update_balance(
        &state.db,
        sheet_id,
        balance_id,
        service::BalanceChanges { account_id: request.account_id, beginning: request.beginning },
    )
    .await
    .map_err(|e| compute_error("Failed to update balance", e))?;

    invalidate_totals(&state, sheet_id).await;
    info!("Balance with ID {} updated, ending: {}", balance_id, saved.ending);
    Ok(Json(ApiResponse::ok(BalanceResponse::from(saved), "Balance updated successfully")))
}

/// Remove a balance from a sheet
#[utoipa::path(
    delete,
    path = "/api/v1/sheets/{sheet_id}/balances/{balance_id}",
    tag = "balances",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
        ("balance_id" = i32, Path, description = "Balance ID"),
    ),
    responses(
        (status = 200, description = "Balance deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Balance not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_balance(
    Path((sheet_id, balance_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let result = balance::Entity::delete_many()
        .filter(balance::Column::Id.eq(balance_id))
        .filter(balance::Column::SheetId.eq(sheet_id))
        .exec(&state.db)
        .await
        .map_err(|e| database_error("Failed to delete balance", e))?;

    if result.rows_affected == 0 {
        warn!("Balance {} not found on sheet {} for deletion", balance_id, sheet_id);
        return Err(not_found(format!("Balance with ID {} not found on sheet {}", balance_id, sheet_id)));
    }

    invalidate_totals(&state, sheet_id).await;
    info!("Balance with ID {} deleted successfully", balance_id);
    Ok(Json(ApiResponse::ok(format!("Balance {} deleted", balance_id), "Balance deleted successfully")))
}

/// Get pending and completed credit and debit totals of a balance
#[utoipa::path(
    get,
    path = "/api/v1/sheets/{sheet_id}/balances/{balance_id}/activity",
    tag = "balances",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
        ("balance_id" = i32, Path, description = "Balance ID"),
    ),
    responses(
        (status = 200, description = "Activity retrieved successfully", body = ApiResponse<BalanceActivityResponse>),
        (status = 404, description = "Balance not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_balance_activity(
    Path((sheet_id, balance_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BalanceActivityResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let model = find_balance(&state, sheet_id, balance_id).await?;

    let activity = ledger::activity(&state.db, &model)
        .await
        .map_err(|e| compute_error("Failed to compute balance activity", e))?;

    debug!(?activity, "Computed balance activity");
    Ok(Json(ApiResponse::ok(
        BalanceActivityResponse {
            balance_id: model.id,
            pending_credits: money(activity.pending_credits),
            pending_debits: money(activity.pending_debits),
            completed_credits: money(activity.completed_credits),
            completed_debits: money(activity.completed_debits),
        },
        "Activity retrieved successfully",
    )))
}
