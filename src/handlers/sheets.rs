use crate::handlers::balances::BalanceResponse;
use crate::schemas::{
    compute_error, database_error, money, not_found, validation_error, ApiError, ApiResponse, AppState, CachedData,
    ErrorResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{NaiveDate, Utc};
use common::SheetPeriod;
use compute::error::ComputeError;
use compute::ledger::{self, service, sheet::find_sheet_for_period, SheetTotals};
use model::entities::balance_sheet;
use rust_decimal::Decimal;
use sea_orm::{DbErr, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a balance sheet
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateSheetRequest {
    /// Sheet date. Only one sheet per calendar month is allowed.
    pub date: NaiveDate,
    /// Title; derived from the date when missing or blank
    #[validate(length(max = 200))]
    pub title: Option<String>,
    pub memo: Option<String>,
}

/// Request body for updating a balance sheet
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateSheetRequest {
    pub date: Option<NaiveDate>,
    /// A blank title is replaced by the derived one
    #[validate(length(max = 200))]
    pub title: Option<String>,
    pub memo: Option<String>,
}

/// Balance sheet response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SheetResponse {
    pub id: i32,
    pub date: NaiveDate,
    /// Month covered by the sheet, `YYYY-MM`
    pub period: String,
    pub title: String,
    pub memo: Option<String>,
    /// Whether the sheet is dated within two weeks of today
    pub is_active: bool,
}

impl SheetResponse {
    fn new(model: balance_sheet::Model, today: NaiveDate) -> Self {
        Self {
            period: SheetPeriod::of(model.date).to_string(),
            is_active: ledger::is_active(model.date, today),
            id: model.id,
            date: model.date,
            title: model.title,
            memo: model.memo,
        }
    }
}

impl From<balance_sheet::Model> for SheetResponse {
    fn from(model: balance_sheet::Model) -> Self {
        Self::new(model, Utc::now().date_naive())
    }
}

/// Sheet totals over active, non-excluded accounts
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SheetTotalsResponse {
    pub sheet_id: i32,
    pub beginning: Decimal,
    pub ending: Decimal,
    /// Whether the totals came from the cache
    pub cached: bool,
}

pub(crate) fn totals_key(sheet_id: i32) -> String {
    format!("sheet_totals:{}", sheet_id)
}

/// Drops the cached totals of a sheet after any change to its balances.
pub(crate) async fn invalidate_totals(state: &AppState, sheet_id: i32) {
    debug!("Invalidating cached totals of sheet {}", sheet_id);
    state.totals_epoch.fetch_add(1, Ordering::SeqCst);
    state.cache.invalidate(&totals_key(sheet_id)).await;
}

/// Drops the cached totals of every sheet.
pub(crate) fn clear_totals(state: &AppState) {
    debug!("Invalidating cached totals of all sheets");
    state.totals_epoch.fetch_add(1, Ordering::SeqCst);
    state.cache.invalidate_all();
}

pub(crate) async fn find_sheet(state: &AppState, sheet_id: i32) -> Result<balance_sheet::Model, ApiError> {
    match balance_sheet::Entity::find_by_id(sheet_id).one(&state.db).await {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            warn!("Balance sheet with ID {} not found", sheet_id);
            Err(not_found(format!("Balance sheet with ID {} not found", sheet_id)))
        }
        Err(e) => Err(database_error("Failed to retrieve balance sheet", e)),
    }
}

/// Create a new balance sheet
#[utoipa::path(
    post,
    path = "/api/v1/sheets",
    tag = "sheets",
    request_body = CreateSheetRequest,
    responses(
        (status = 201, description = "Balance sheet created successfully", body = ApiResponse<SheetResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "A sheet already exists for this month", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_sheet(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateSheetRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<SheetResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_sheet function");

    let sheet = service::create_sheet(
        &state.db,
        service::NewSheet { date: request.date, title: request.title, memo: request.memo },
    )
    .await
    .map_err(|e| compute_error("Failed to create balance sheet", e))?;

    info!("Balance sheet created with ID: {}, title: {}", sheet.id, sheet.title);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(SheetResponse::from(sheet), "Balance sheet created successfully")),
    ))
}

/// Get all balance sheets, newest first
#[utoipa::path(
    get,
    path = "/api/v1/sheets",
    tag = "sheets",
    responses(
        (status = 200, description = "Balance sheets retrieved successfully", body = ApiResponse<Vec<SheetResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sheets(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<SheetResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let sheets = balance_sheet::Entity::find()
        .order_by_desc(balance_sheet::Column::Date)
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve balance sheets", e))?;

    let today = Utc::now().date_naive();
    info!("Successfully retrieved {} balance sheets", sheets.len());
    Ok(Json(ApiResponse::ok(
        sheets.into_iter().map(|s| SheetResponse::new(s, today)).collect(),
        "Balance sheets retrieved successfully",
    )))
}

/// Get a specific balance sheet by ID
#[utoipa::path(
    get,
    path = "/api/v1/sheets/{sheet_id}",
    tag = "sheets",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
    ),
    responses(
        (status = 200, description = "Balance sheet retrieved successfully", body = ApiResponse<SheetResponse>),
        (status = 404, description = "Balance sheet not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sheet(
    Path(sheet_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SheetResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let sheet = find_sheet(&state, sheet_id).await?;
    Ok(Json(ApiResponse::ok(SheetResponse::from(sheet), "Balance sheet retrieved successfully")))
}

/// Get the balance sheet of a month
#[utoipa::path(
    get,
    path = "/api/v1/sheets/period/{year}/{month}",
    tag = "sheets",
    params(
        ("year" = i32, Path, description = "Year, e.g. 2019"),
        ("month" = u32, Path, description = "Month, 1-12"),
    ),
    responses(
        (status = 200, description = "Balance sheet retrieved successfully", body = ApiResponse<SheetResponse>),
        (status = 400, description = "Invalid month", body = ErrorResponse),
        (status = 404, description = "No sheet for this month", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sheet_for_period(
    Path((year, month)): Path<(i32, u32)>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SheetResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let period = SheetPeriod::new(year, month).map_err(validation_error)?;

    match find_sheet_for_period(&state.db, period)
        .await
        .map_err(|e| compute_error("Failed to look up balance sheet", e))?
    {
        Some(sheet) => {
            debug!("Found sheet {} for {}", sheet.id, period);
            Ok(Json(ApiResponse::ok(SheetResponse::from(sheet), "Balance sheet retrieved successfully")))
        }
        None => {
            warn!("No balance sheet for {}", period);
            Err(not_found(format!("No balance sheet for {}", period)))
        }
    }
}

/// Update a balance sheet
#[utoipa::path(
    put,
    path = "/api/v1/sheets/{sheet_id}",
    tag = "sheets",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
    ),
    request_body = UpdateSheetRequest,
    responses(
        (status = 200, description = "Balance sheet updated successfully", body = ApiResponse<SheetResponse>),
        (status = 404, description = "Balance sheet not found", body = ErrorResponse),
        (status = 409, description = "A sheet already exists for the new month", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_sheet(
    Path(sheet_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateSheetRequest>>,
) -> Result<Json<ApiResponse<SheetResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let sheet = service::update_sheet(
        &state.db,
        sheet_id,
        service::SheetChanges { date: request.date, title: request.title, memo: request.memo },
    )
    .await
    .map_err(|e| compute_error("Failed to update balance sheet", e))?;

    info!("Balance sheet with ID {} updated successfully", sheet_id);
    Ok(Json(ApiResponse::ok(SheetResponse::from(sheet), "Balance sheet updated successfully")))
}

/// Delete a balance sheet with its balances and transactions
#[utoipa::path(
    delete,
    path = "/api/v1/sheets/{sheet_id}",
    tag = "sheets",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
    ),
    responses(
        (status = 200, description = "Balance sheet deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Balance sheet not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_sheet(
    Path(sheet_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let result = balance_sheet::Entity::delete_by_id(sheet_id)
        .exec(&state.db)
        .await
        .map_err(|e| database_error("Failed to delete balance sheet", e))?;

    if result.rows_affected == 0 {
        warn!("Balance sheet with ID {} not found for deletion", sheet_id);
        return Err(not_found(format!("Balance sheet with ID {} not found", sheet_id)));
    }

    invalidate_totals(&state, sheet_id).await;
    info!("Balance sheet with ID {} deleted successfully", sheet_id);
    Ok(Json(ApiResponse::ok(format!("Balance sheet {} deleted", sheet_id), "Balance sheet deleted successfully")))
}

/// Get the beginning and ending totals of a sheet
#[utoipa::path(
    get,
    path = "/api/v1/sheets/{sheet_id}/totals",
    tag = "sheets",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
    ),
    responses(
        (status = 200, description = "Totals retrieved successfully", body = ApiResponse<SheetTotalsResponse>),
        (status = 404, description = "Balance sheet not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_sheet_totals(
    Path(sheet_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SheetTotalsResponse>>, (StatusCode, Json<ErrorResponse>)> {
    find_sheet(&state, sheet_id).await?;

    // Concurrent misses on the same sheet share one computation
    let key = totals_key(sheet_id);
    let epoch = state.totals_epoch.load(Ordering::SeqCst);
    let entry = state
        .cache
        .entry(key.clone())
        .or_try_insert_with(async {
            ledger::sheet_totals(&state.db, sheet_id).await.map(CachedData::SheetTotals)
        })
        .await
        .map_err(|e| {
            let err = Arc::try_unwrap(e)
                .unwrap_or_else(|shared| ComputeError::Database(DbErr::Custom(shared.to_string())));
            compute_error("Failed to compute sheet totals", err)
        })?;

    let cached = !entry.is_fresh();
    if !cached && state.totals_epoch.load(Ordering::SeqCst) != epoch {
        // A write landed while computing, so the stored value may predate it
        debug!("Totals of sheet {} raced a write, dropping cached value", sheet_id);
        state.cache.invalidate(&key).await;
    }

    let CachedData::SheetTotals(totals) = entry.into_value();
    if cached {
        debug!("Returning cached totals for sheet {}", sheet_id);
        Ok(Json(ApiResponse::ok(totals_response(sheet_id, totals, true), "Totals retrieved from cache")))
    } else {
        info!("Computed totals for sheet {}", sheet_id);
        Ok(Json(ApiResponse::ok(totals_response(sheet_id, totals, false), "Totals computed successfully")))
    }
}

fn totals_response(sheet_id: i32, totals: SheetTotals, cached: bool) -> SheetTotalsResponse {
    SheetTotalsResponse { sheet_id, beginning: money(totals.beginning), ending: money(totals.ending), cached }
}

/// Recompute every ending balance of a sheet
#[utoipa::path(
    post,
    path = "/api/v1/sheets/{sheet_id}/recompute",
    tag = "sheets",
    params(
        ("sheet_id" = i32, Path, description = "Balance sheet ID"),
    ),
    responses(
        (status = 200, description = "Balances recomputed", body = ApiResponse<Vec<BalanceResponse>>),
        (status = 404, description = "Balance sheet not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn recompute_sheet(
    Path(sheet_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BalanceResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let balances = service::recompute_sheet(&state.db, sheet_id)
        .await
        .map_err(|e| compute_error("Failed to recompute balance sheet", e))?;

    invalidate_totals(&state, sheet_id).await;
    info!("Recomputed {} balances of sheet {}", balances.len(), sheet_id);
    Ok(Json(ApiResponse::ok(
        balances.into_iter().map(BalanceResponse::from).collect(),
        "Balances recomputed successfully",
    )))
}
