use crate::schemas::{database_error, money, not_found, ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use compute::budget::{frequency_text, line_total, BudgetSummary};
use model::entities::{budget, line_item};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a budget
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateBudgetRequest {
    /// Budget year, one budget per year
    #[validate(range(min = 1900, max = 9999))]
    pub year: i32,
    pub description: Option<String>,
}

/// Request body for adding a line item to a budget
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateLineItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Amount paid or received each time
    pub amount: Decimal,
    /// Times per year (default: 12)
    #[validate(range(min = 1, max = 366))]
    pub frequency: Option<i32>,
    pub is_income: Option<bool>,
    pub notes: Option<String>,
    pub display_order: Option<i32>,
}

/// Line item response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LineItemResponse {
    pub id: i32,
    pub name: String,
    pub amount: Decimal,
    pub frequency: i32,
    /// e.g. "monthly" or "6 times per year"
    pub frequency_text: String,
    /// Yearly total
    pub total: Decimal,
    pub is_income: bool,
    pub notes: Option<String>,
    pub display_order: Option<i32>,
}

impl From<line_item::Model> for LineItemResponse {
    fn from(model: line_item::Model) -> Self {
        Self {
            frequency_text: frequency_text(model.frequency),
            total: money(line_total(&model)),
            id: model.id,
            name: model.name,
            amount: money(model.amount),
            frequency: model.frequency,
            is_income: model.is_income,
            notes: model.notes,
            display_order: model.display_order,
        }
    }
}

/// Yearly and monthly totals
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BudgetSummaryResponse {
    pub income: Decimal,
    pub expenses: Decimal,
    pub savings: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub monthly_savings: Decimal,
}

impl From<BudgetSummary> for BudgetSummaryResponse {
    fn from(summary: BudgetSummary) -> Self {
        Self {
            income: money(summary.income),
            expenses: money(summary.expenses),
            savings: money(summary.savings),
            monthly_income: money(summary.monthly_income),
            monthly_expenses: money(summary.monthly_expenses),
            monthly_savings: money(summary.monthly_savings),
        }
    }
}

/// Budget response model with its line items and summary
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BudgetResponse {
    pub id: i32,
    pub year: i32,
    pub description: Option<String>,
    pub line_items: Vec<LineItemResponse>,
    pub summary: BudgetSummaryResponse,
}

impl BudgetResponse {
    fn new(model: budget::Model, items: Vec<line_item::Model>) -> Self {
        let summary = BudgetSummary::from_items(&items).into();
        Self {
            id: model.id,
            year: model.year,
            description: model.description,
            line_items: items.into_iter().map(LineItemResponse::from).collect(),
            summary,
        }
    }
}

async fn find_budget(state: &AppState, year: i32) -> Result<budget::Model, ApiError> {
    match budget::Entity::find()
        .filter(budget::Column::Year.eq(year))
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => Ok(model),
        Ok(None) => {
            warn!("No budget for year {}", year);
            Err(not_found(format!("No budget for year {}", year)))
        }
        Err(e) => Err(database_error("Failed to retrieve budget", e)),
    }
}

async fn line_items(state: &AppState, budget_id: i32) -> Result<Vec<line_item::Model>, ApiError> {
    line_item::Entity::find()
        .filter(line_item::Column::BudgetId.eq(budget_id))
        .order_by_desc(line_item::Column::IsIncome)
        .order_by_asc(line_item::Column::DisplayOrder)
        .order_by_asc(line_item::Column::Id)
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve line items", e))
}

/// Create a budget
#[utoipa::path(
    post,
    path = "/api/v1/budgets",
    tag = "budgets",
    request_body = CreateBudgetRequest,
    responses(
        (status = 201, description = "Budget created", body = ApiResponse<BudgetResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "A budget already exists for this year", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_budget(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateBudgetRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let model = budget::ActiveModel {
        year: Set(request.year),
        description: Set(request.description),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| database_error("Failed to create budget", e))?;

    info!("Budget for {} created with ID {}", model.year, model.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(BudgetResponse::new(model, Vec::new()), "Budget created successfully")),
    ))
}

/// Get all budgets, newest year first
#[utoipa::path(
    get,
    path = "/api/v1/budgets",
    tag = "budgets",
    responses(
        (status = 200, description = "Budgets retrieved", body = ApiResponse<Vec<BudgetResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_budgets(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BudgetResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let budgets = budget::Entity::find()
        .order_by_desc(budget::Column::Year)
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve budgets", e))?;

    let mut responses = Vec::with_capacity(budgets.len());
    for model in budgets {
        let items = line_items(&state, model.id).await?;
        responses.push(BudgetResponse::new(model, items));
    }

    debug!("Retrieved {} budgets", responses.len());
    Ok(Json(ApiResponse::ok(responses, "Budgets retrieved successfully")))
}

/// Get the budget of a year
#[utoipa::path(
    get,
    path = "/api/v1/budgets/{year}",
    tag = "budgets",
    params(
        ("year" = i32, Path, description = "Budget year"),
    ),
    responses(
        (status = 200, description = "Budget retrieved", body = ApiResponse<BudgetResponse>),
        (status = 404, description = "No budget for this year", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_budget(
    Path(year): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BudgetResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let model = find_budget(&state, year).await?;
    let items = line_items(&state, model.id).await?;
    Ok(Json(ApiResponse::ok(BudgetResponse::new(model, items), "Budget retrieved successfully")))
}

/// Add a line item to the budget of a year
#[utoipa::path(
    post,
    path = "/api/v1/budgets/{year}/line-items",
    tag = "budgets",
    params(
        ("year" = i32, Path, description = "Budget year"),
    ),
    request_body = CreateLineItemRequest,
    responses(
        (status = 201, description = "Line item added, updated budget returned", body = ApiResponse<BudgetResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "No budget for this year", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_line_item(
    Path(year): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateLineItemRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let model = find_budget(&state, year).await?;

    let item = line_item::ActiveModel {
        budget_id: Set(model.id),
        name: Set(request.name),
        amount: Set(request.amount),
        frequency: Set(request.frequency.unwrap_or(12)),
        is_income: Set(request.is_income.unwrap_or(false)),
        notes: Set(request.notes),
        display_order: Set(request.display_order),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| database_error("Failed to add line item", e))?;
    info!("Line item {} added to the {} budget", item.id, year);

    let items = line_items(&state, model.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(BudgetResponse::new(model, items), "Line item added successfully")),
    ))
}
