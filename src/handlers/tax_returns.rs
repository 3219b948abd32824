use crate::schemas::{compute_error, database_error, money, not_found, ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use compute::taxes::{self, TaxField};
use model::entities::tax_return;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for recording a tax return
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateTaxReturnRequest {
    #[validate(range(min = 1900, max = 2200))]
    pub year: i32,
    /// Wages, salaries and tips
    pub wages: Decimal,
    /// Taxable and tax-exempt interest (default: 0)
    pub interest: Option<Decimal>,
    /// Business income or loss (default: 0)
    pub profit: Option<Decimal>,
    /// Ordinary and qualified dividends (default: 0)
    pub dividends: Option<Decimal>,
    /// Capital gains or loss (default: 0)
    pub capital_gains: Option<Decimal>,
    /// Rental real estate, royalties and partnerships (default: 0)
    pub royalties: Option<Decimal>,
    /// Total reported income
    pub income: Decimal,
    /// Adjusted gross income
    pub agi: Decimal,
    /// Income after deductions
    pub taxable_income: Decimal,
    pub federal_tax: Decimal,
    /// State and local taxes
    pub local_tax: Decimal,
}

/// Change of one field from the previous year's return
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaxChangeResponse {
    pub field: String,
    pub change: Decimal,
}

/// Tax return response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaxReturnResponse {
    pub id: i32,
    pub year: i32,
    pub title: String,
    pub wages: Decimal,
    pub interest: Decimal,
    pub profit: Decimal,
    pub dividends: Decimal,
    pub capital_gains: Decimal,
    pub royalties: Decimal,
    pub income: Decimal,
    pub agi: Decimal,
    pub taxable_income: Decimal,
    pub federal_tax: Decimal,
    pub local_tax: Decimal,
    /// Whether a return exists for the year before
    pub has_previous_year: bool,
    /// Differences from the previous year, zero when there is none
    pub prev_year_changes: Vec<TaxChangeResponse>,
}

impl TaxReturnResponse {
    fn new(model: tax_return::Model, previous: Option<&tax_return::Model>) -> Self {
        let prev_year_changes = taxes::prev_year_changes(&model, previous)
            .into_iter()
            .map(|(field, change)| TaxChangeResponse { field: field.name().to_string(), change: money(change) })
            .collect();
        let amount = |field: TaxField| money(field.value(&model));

        Self {
            title: model.to_string(),
            wages: amount(TaxField::Wages),
            interest: amount(TaxField::Interest),
            profit: amount(TaxField::Profit),
            dividends: amount(TaxField::Dividends),
            capital_gains: amount(TaxField::CapitalGains),
            royalties: amount(TaxField::Royalties),
            income: amount(TaxField::Income),
            agi: amount(TaxField::Agi),
            taxable_income: amount(TaxField::TaxableIncome),
            federal_tax: amount(TaxField::FederalTax),
            local_tax: amount(TaxField::LocalTax),
            has_previous_year: previous.is_some(),
            prev_year_changes,
            id: model.id,
            year: model.year,
        }
    }
}

async fn find_tax_return(state: &AppState, year: i32) -> Result<tax_return::Model, ApiError> {
    tax_return::Entity::find()
        .filter(tax_return::Column::Year.eq(year))
        .one(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve tax return", e))?
        .ok_or_else(|| {
            warn!("No tax return filed for {}", year);
            not_found(format!("No tax return filed for {}", year))
        })
}

async fn with_previous_year(state: &AppState, model: tax_return::Model) -> Result<TaxReturnResponse, ApiError> {
    let previous = taxes::prev_year_return(&state.db, model.year)
        .await
        .map_err(|e| compute_error("Failed to retrieve previous tax return", e))?;
    Ok(TaxReturnResponse::new(model, previous.as_ref()))
}

/// Record the tax return of a year
#[utoipa::path(
    post,
    path = "/api/v1/tax-returns",
    tag = "tax-returns",
    request_body = CreateTaxReturnRequest,
    responses(
        (status = 201, description = "Tax return recorded", body = ApiResponse<TaxReturnResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "A return for this year already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_tax_return(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateTaxReturnRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<TaxReturnResponse>>), (StatusCode, Json<ErrorResponse>)> {
    let model = tax_return::ActiveModel {
        year: Set(request.year),
        wages: Set(request.wages),
        interest: Set(request.interest.unwrap_or(Decimal::ZERO)),
        profit: Set(request.profit.unwrap_or(Decimal::ZERO)),
        dividends: Set(request.dividends.unwrap_or(Decimal::ZERO)),
        capital_gains: Set(request.capital_gains.unwrap_or(Decimal::ZERO)),
        royalties: Set(request.royalties.unwrap_or(Decimal::ZERO)),
        income: Set(request.income),
        agi: Set(request.agi),
        taxable_income: Set(request.taxable_income),
        federal_tax: Set(request.federal_tax),
        local_tax: Set(request.local_tax),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| database_error("Failed to record tax return", e))?;

    info!("Tax return for {} recorded with ID {}", model.year, model.id);
    let response = with_previous_year(&state, model).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(response, "Tax return recorded successfully"))))
}

/// List tax returns, newest year first
#[utoipa::path(
    get,
    path = "/api/v1/tax-returns",
    tag = "tax-returns",
    responses(
        (status = 200, description = "Tax returns retrieved", body = ApiResponse<Vec<TaxReturnResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_tax_returns(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TaxReturnResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    let returns = tax_return::Entity::find()
        .order_by_desc(tax_return::Column::Year)
        .all(&state.db)
        .await
        .map_err(|e| database_error("Failed to retrieve tax returns", e))?;

    debug!("Retrieved {} tax returns", returns.len());
    let by_year: HashMap<i32, tax_return::Model> = returns.iter().map(|r| (r.year, r.clone())).collect();
    let responses = returns
        .into_iter()
        .map(|model| {
            let previous = by_year.get(&(model.year - 1));
            TaxReturnResponse::new(model, previous)
        })
        .collect();

    Ok(Json(ApiResponse::ok(responses, "Tax returns retrieved successfully")))
}

/// Get the tax return of a year with its changes from the year before
#[utoipa::path(
    get,
    path = "/api/v1/tax-returns/{year}",
    tag = "tax-returns",
    params(
        ("year" = i32, Path, description = "Tax year"),
    ),
    responses(
        (status = 200, description = "Tax return retrieved", body = ApiResponse<TaxReturnResponse>),
        (status = 404, description = "No tax return for this year", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_tax_return(
    Path(year): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TaxReturnResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let model = find_tax_return(&state, year).await?;
    let response = with_previous_year(&state, model).await?;
    Ok(Json(ApiResponse::ok(response, "Tax return retrieved successfully")))
}

/// Delete the tax return of a year
#[utoipa::path(
    delete,
    path = "/api/v1/tax-returns/{year}",
    tag = "tax-returns",
    params(
        ("year" = i32, Path, description = "Tax year"),
    ),
    responses(
        (status = 200, description = "Tax return deleted", body = ApiResponse<String>),
        (status = 404, description = "No tax return for this year", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_tax_return(
    Path(year): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let model = find_tax_return(&state, year).await?;
    tax_return::Entity::delete_by_id(model.id)
        .exec(&state.db)
        .await
        .map_err(|e| database_error("Failed to delete tax return", e))?;

    info!("Tax return for {} deleted", year);
    Ok(Json(ApiResponse::ok(format!("Tax return {} deleted", year), "Tax return deleted successfully")))
}
